//! uidgraph - empirical uid transition model.
//!
//! # Architecture
//!
//! ```text
//! main() -> Settings::resolve(config) -> StateSpace + OperationCatalog
//!                                              |
//!                                              v
//!                 Coordinator<ForkLauncher<OsPrimitives>>::run -> GraphEmitter(stdout)
//! ```
//!
//! Stdout carries the Graphviz digraph and nothing else; logs go to stderr
//! (`RUST_LOG`, default `info`). A complete run exits 0.

use std::io;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use uidgraph_config::{Settings, UidGraphConfig};
use uidgraph_harness::SpawnRetry;
use uidgraph_types::{OperationCatalog, StateSpace};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(io::stderr))
        .with(env_filter)
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let config = UidGraphConfig::load().context("failed to load configuration")?;
    if config.is_some()
        && let Some(path) = UidGraphConfig::path()
    {
        tracing::info!(path = %path.display(), "Loaded configuration");
    }
    let settings = Settings::resolve(config.as_ref()).context("invalid configuration")?;
    tracing::info!(values = ?settings.values.as_slice(), "Value set");

    let states =
        StateSpace::generate(&settings.values).context("failed to build the state space")?;
    let catalog = OperationCatalog::generate(&settings.values)
        .context("failed to build the operation catalog")?;

    run(&states, &catalog, settings.spawn_retry)
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn run(states: &StateSpace, catalog: &OperationCatalog, retry: SpawnRetry) -> Result<()> {
    use uidgraph_dot::GraphEmitter;
    use uidgraph_harness::{Coordinator, ForkLauncher, OsPrimitives};

    let stdout = io::stdout();
    let mut emitter = GraphEmitter::new(stdout.lock());
    let mut coordinator = Coordinator::new(ForkLauncher::new(OsPrimitives), retry);
    coordinator
        .run(states, catalog, &mut emitter)
        .context("enumeration aborted")?;
    Ok(())
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn run(_states: &StateSpace, _catalog: &OperationCatalog, _retry: SpawnRetry) -> Result<()> {
    anyhow::bail!("uidgraph needs getresuid/setresuid, which this platform does not provide")
}
