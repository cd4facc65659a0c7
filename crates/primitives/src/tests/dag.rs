use super::*;
use crate::builder::{DagBuilder, DagLeafBuilder};

fn sample() -> Dag {
    let mut builder = DagBuilder::new();

    let a = builder
        .add(DagLeafBuilder::file("a.txt", b"alpha".to_vec()))
        .expect("a builds");
    let b = builder
        .add(DagLeafBuilder::file("b.txt", b"beta".to_vec()))
        .expect("b builds");
    let nested = builder
        .add(DagLeafBuilder::directory("nested").with_links([a, b]))
        .expect("nested builds");
    let c = builder
        .add(DagLeafBuilder::file("c.txt", b"gamma".to_vec()))
        .expect("c builds");

    builder
        .build(DagLeafBuilder::directory("root").with_links([nested, c]))
        .expect("root builds")
}

#[test]
fn walk_visits_parents_before_children() {
    let dag = sample();
    let order = dag.walk().expect("dag is complete");

    assert_eq!(order.len(), dag.len());

    let (root, parent) = order[0];
    assert_eq!(root.hash, dag.root);
    assert!(parent.is_none());

    for (position, (leaf, parent)) in order.iter().enumerate().skip(1) {
        let parent = parent.expect("non-root leaves have a parent");
        let parent_position = order
            .iter()
            .position(|(candidate, _)| candidate.hash == parent.hash)
            .expect("parent is visited");

        assert!(parent_position < position, "{} visited early", leaf.hash);
        assert!(parent.has_link(&leaf.hash));
    }
}

#[test]
fn complete_dag_verifies() {
    sample().verify().expect("sample verifies");
}

#[test]
fn missing_leaf_is_reported() {
    let mut dag = sample();
    let victim = dag.root_leaf().expect("root").links[1].clone();
    let _ = dag.leaves.remove(&victim);

    assert!(matches!(dag.verify(), Err(DagError::MissingLeaf(hash)) if hash == victim));
}

#[test]
fn stray_leaf_is_unreachable() {
    let mut dag = sample();
    let stray = DagLeafBuilder::file("stray", b"x".to_vec())
        .build_leaf(99)
        .expect("stray builds");
    let _ = dag.leaves.insert(stray.hash.clone(), stray);

    assert!(matches!(dag.verify(), Err(DagError::Unreachable(1))));
}

#[test]
fn tampered_child_fails_verification() {
    let mut dag = sample();
    let victim = dag.root_leaf().expect("root").links[1].clone();

    dag.leaves
        .get_mut(&victim)
        .expect("victim exists")
        .content = Some(b"tampered".to_vec());

    assert!(matches!(dag.verify(), Err(DagError::Leaf { hash, .. }) if hash == victim));
}

#[test]
fn missing_root_is_reported() {
    let mut dag = sample();
    dag.root = "nope".to_owned();

    assert!(matches!(dag.walk(), Err(DagError::MissingRoot(_))));
}
