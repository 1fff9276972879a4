//! Real fork-isolated runs against the host kernel.
//!
//! Unprivileged tests only use the caller's own uid. The full privilege-drop
//! run needs root and is skipped otherwise.

use uidgraph_harness::{ForkLauncher, OsPrimitives};
use uidgraph_types::{IdentityPrimitives, ValueSet};

use crate::common::{edge, edge_lines, node_lines, run_graph};

fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

#[test]
fn own_uid_graph_is_complete_and_self_consistent() {
    let me = OsPrimitives.state().unwrap();
    let uid = me.real.raw();
    let values = ValueSet::new([uid]).unwrap();

    let (text, summary, _) = run_graph(&values, ForkLauncher::new(OsPrimitives));

    assert_eq!(summary.lost, 0);
    assert_eq!(summary.edges, 16);
    assert_eq!(node_lines(&text).len(), 1);
    // The all-unchanged setresuid never moves a context.
    assert!(
        edge_lines(&text)
            .contains(&edge((uid, uid, uid), "setresuid(-1,-1,-1)", (uid, uid, uid)).as_str())
    );
}

#[test]
fn coordinator_identity_survives_a_run() {
    let before = OsPrimitives.state().unwrap();
    let _ = run_graph(&ValueSet::default(), ForkLauncher::new(OsPrimitives));
    assert_eq!(OsPrimitives.state().unwrap(), before);
}

#[test]
fn root_run_observes_setuid_dropping_everything() {
    if !is_root() {
        eprintln!("skipping: requires root");
        return;
    }
    let (text, summary, _) = run_graph(&ValueSet::default(), ForkLauncher::new(OsPrimitives));

    assert_eq!(summary.lost, 0);
    assert_eq!(node_lines(&text).len(), 8);
    let edges = edge_lines(&text);
    assert_eq!(edges.len(), 8 * 42);
    assert!(edges.contains(&edge((0, 0, 0), "setuid(1000)", (1000, 1000, 1000)).as_str()));
    assert!(edges.contains(&edge((0, 0, 0), "seteuid(1000)", (0, 1000, 0)).as_str()));
}
