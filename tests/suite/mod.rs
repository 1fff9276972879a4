//! Integration suites.

mod catalog;
#[cfg(any(target_os = "linux", target_os = "android"))]
mod isolation;
