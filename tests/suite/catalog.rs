//! Generator tests through the public API.

use uidgraph_types::{OperationCatalog, StateSpace, ValueSet};

#[test]
fn default_state_space_labels_in_order() {
    let states = StateSpace::generate(&ValueSet::default()).unwrap();
    let labels: Vec<String> = states.iter().map(ToString::to_string).collect();
    assert_eq!(
        labels,
        [
            "R=0,E=0,S=0",
            "R=0,E=0,S=1000",
            "R=0,E=1000,S=0",
            "R=0,E=1000,S=1000",
            "R=1000,E=0,S=0",
            "R=1000,E=0,S=1000",
            "R=1000,E=1000,S=0",
            "R=1000,E=1000,S=1000",
        ]
    );
}

#[test]
fn first_block_of_default_catalog() {
    let catalog = OperationCatalog::generate(&ValueSet::default()).unwrap();
    let labels: Vec<String> = catalog.iter().take(14).map(ToString::to_string).collect();
    assert_eq!(
        labels,
        [
            "setuid(0)",
            "seteuid(0)",
            "setreuid(0,0)",
            "setreuid(0,1000)",
            "setreuid(0,-1)",
            "setresuid(0,0,0)",
            "setresuid(0,0,1000)",
            "setresuid(0,0,-1)",
            "setresuid(0,1000,0)",
            "setresuid(0,1000,1000)",
            "setresuid(0,1000,-1)",
            "setresuid(0,-1,0)",
            "setresuid(0,-1,1000)",
            "setresuid(0,-1,-1)",
        ]
    );
}

#[test]
fn sentinel_block_comes_last() {
    let catalog = OperationCatalog::generate(&ValueSet::default()).unwrap();
    let labels: Vec<String> = catalog.iter().map(ToString::to_string).collect();
    assert_eq!(labels[28], "setuid(-1)");
    assert_eq!(labels[29], "seteuid(-1)");
    assert_eq!(labels.last().map(String::as_str), Some("setresuid(-1,-1,-1)"));
}

#[test]
fn sizes_grow_combinatorially() {
    let values = ValueSet::new([0, 1, 2, 1000, 32_767]).unwrap();
    assert_eq!(StateSpace::generate(&values).unwrap().len(), 125);
    // m = 6: 12 + 36 + 216
    assert_eq!(OperationCatalog::generate(&values).unwrap().len(), 264);
}
