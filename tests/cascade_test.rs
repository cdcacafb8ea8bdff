//! Cascade behaviour through the public `ConfigTree` surface.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use itertools::iproduct;
use rstest::{fixture, rstest};

use cfgtree::util::testing;
use cfgtree::{ConfigTree, NodeDef};

type Calls = Rc<RefCell<Vec<(String, bool)>>>;

/// Registers a recording listener on every id.
fn record(tree: &mut ConfigTree, ids: &[&str]) -> Calls {
    let calls: Calls = Rc::new(RefCell::new(Vec::new()));
    for id in ids {
        let sink = Rc::clone(&calls);
        let name = id.to_string();
        tree.on_toggle(*id, move |on| {
            sink.borrow_mut().push((name.clone(), on));
            Ok(())
        });
    }
    calls
}

fn ids(affected: &[cfgtree::Affected]) -> Vec<&str> {
    affected.iter().map(|a| a.id.as_str()).collect()
}

/// Enabled children need an enabled parent.
fn assert_coherent(tree: &ConfigTree) {
    for node in tree.all_nodes() {
        if !node.is_enabled() {
            continue;
        }
        if let Some(parent) = tree.store().parent(&node.id) {
            assert!(
                parent.is_enabled(),
                "{} is on but its parent {} is off\n{}",
                node.id,
                parent.id,
                tree.dump()
            );
        }
    }
}

// A
// ├── B
// │   └── C
// └── D
fn build_tree() -> ConfigTree {
    testing::init_test_setup();
    let mut tree = ConfigTree::new();
    tree.add_node(NodeDef::root("A", "Alpha")).unwrap();
    tree.add_node(NodeDef::child("B", "Beta", 2, "A")).unwrap();
    tree.add_node(NodeDef::child("C", "Gamma", 3, "B")).unwrap();
    tree.add_node(NodeDef::child("D", "Delta", 2, "A")).unwrap();
    tree
}

#[fixture]
fn tree() -> ConfigTree {
    build_tree()
}

#[rstest]
fn given_all_off_when_enabling_leaf_then_pulls_ancestors_on(mut tree: ConfigTree) {
    let calls = record(&mut tree, &["A", "B", "C", "D"]);

    let affected = tree.set_enabled("C", true);

    assert_eq!(ids(&affected), vec!["C", "B", "A"]);
    assert!(affected.iter().all(|a| a.enabled && a.changed));
    assert_eq!(calls.borrow().len(), 3);
    assert_eq!(tree.is_enabled("D"), Some(false));
    assert_coherent(&tree);
}

#[rstest]
fn given_all_on_when_disabling_middle_then_only_subtree_goes_off(mut tree: ConfigTree) {
    tree.set_enabled("A", true);
    assert!(tree.all_nodes().iter().all(|n| n.is_enabled()));
    let calls = record(&mut tree, &["A", "B", "C", "D"]);

    let affected = tree.set_enabled("B", false);

    assert_eq!(ids(&affected), vec!["B", "A", "C"]);
    assert_eq!(tree.is_enabled("B"), Some(false));
    assert_eq!(tree.is_enabled("C"), Some(false));
    assert_eq!(tree.is_enabled("A"), Some(true));
    assert_eq!(tree.is_enabled("D"), Some(true));
    assert_eq!(
        *calls.borrow(),
        vec![("B".to_string(), false), ("C".to_string(), false)]
    );
    let a = affected.iter().find(|a| a.id == "A").unwrap();
    assert!(a.enabled && !a.changed);
}

#[rstest]
fn given_node_already_on_when_enabling_then_no_listener_fires(mut tree: ConfigTree) {
    tree.set_enabled("A", true);
    tree.set_enabled("B", false);
    let calls = record(&mut tree, &["A", "B", "C", "D"]);

    let affected = tree.set_enabled("D", true);

    assert_eq!(ids(&affected), vec!["D", "A"]);
    assert!(affected.iter().all(|a| !a.changed));
    assert!(calls.borrow().is_empty());
}

#[rstest]
#[case("C", true)]
#[case("A", true)]
#[case("B", false)]
fn given_same_request_twice_when_setting_then_second_fires_nothing(
    mut tree: ConfigTree,
    #[case] id: &str,
    #[case] desired: bool,
) {
    tree.set_enabled("A", true);
    tree.set_enabled("B", false);
    tree.set_enabled(id, desired);
    let before = tree.enabled_states();
    let calls = record(&mut tree, &["A", "B", "C", "D"]);

    tree.set_enabled(id, desired);

    assert!(calls.borrow().is_empty());
    assert_eq!(tree.enabled_states(), before);
}

#[rstest]
fn given_unknown_id_when_setting_then_warns_and_returns_empty(mut tree: ConfigTree) {
    let calls = record(&mut tree, &["A", "B", "C", "D"]);

    let ((on, off), logs) = testing::capture_warnings(|| {
        (
            tree.set_enabled("does-not-exist", true),
            tree.set_enabled("does-not-exist", false),
        )
    });

    assert!(on.is_empty());
    assert!(off.is_empty());
    assert!(calls.borrow().is_empty());
    assert_eq!(logs.matches("set_enabled on unknown node").count(), 2, "{logs}");
    assert!(logs.contains("does-not-exist"), "{logs}");
}

#[rstest]
fn given_unknown_id_when_looking_up_then_warns_and_yields_nothing(tree: ConfigTree) {
    let ((node, children), logs) =
        testing::capture_warnings(|| (tree.node("nope").is_none(), tree.children("nope").len()));

    assert!(node);
    assert_eq!(children, 0);
    assert_eq!(logs.matches("unknown node").count(), 2, "{logs}");
    assert!(logs.contains("nope"), "{logs}");
}

#[rstest]
fn given_known_id_when_looking_up_then_stays_quiet(tree: ConfigTree) {
    let (found, logs) = testing::capture_warnings(|| {
        tree.node("A").is_some() && tree.children("A").len() == 2
    });

    assert!(found);
    assert!(logs.is_empty(), "{logs}");
}

#[test]
fn given_any_pair_of_requests_when_applied_then_tree_stays_coherent() {
    let ids = ["A", "B", "C", "D"];
    for (first, on1, second, on2) in iproduct!(ids, [true, false], ids, [true, false]) {
        let mut tree = build_tree();
        tree.set_enabled(first, on1);
        assert_coherent(&tree);
        tree.set_enabled(second, on2);
        assert_coherent(&tree);
        assert_eq!(tree.is_enabled(second), Some(on2), "{first}={on1} then {second}={on2}");
    }
}

#[rstest]
fn given_failing_listeners_when_cascading_then_others_still_notified(mut tree: ConfigTree) {
    let calls = record(&mut tree, &["A"]);
    tree.on_toggle("C", |_| Err("listener rejected".into()));
    tree.on_toggle("B", |_| panic!("listener blew up"));

    let affected = tree.set_enabled("C", true);

    assert_eq!(affected.len(), 3);
    assert_eq!(*calls.borrow(), vec![("A".to_string(), true)]);
    assert_coherent(&tree);
}

#[test]
fn given_listener_registered_before_node_when_toggled_then_fires() {
    let mut tree = ConfigTree::new();
    let calls = record(&mut tree, &["late"]);
    tree.add_node(NodeDef::root("late", "Late")).unwrap();

    tree.set_enabled("late", true);

    assert_eq!(*calls.borrow(), vec![("late".to_string(), true)]);
}

#[rstest]
fn given_orphan_when_querying_then_found_by_id_only(mut tree: ConfigTree) {
    tree.add_node(NodeDef::child("x", "Stray", 2, "missing")).unwrap();

    assert!(tree.node("x").is_some());
    assert!(tree.root_nodes().iter().all(|n| n.id != "x"));
    assert!(tree.children("missing").is_empty());
    assert_eq!(tree.orphans().len(), 1);

    let affected = tree.set_enabled("x", true);
    assert_eq!(ids(&affected), vec!["x"]);
    assert_eq!(tree.is_enabled("x"), Some(true));
}

#[rstest]
fn given_saved_states_when_applied_to_fresh_tree_then_reproduced(mut tree: ConfigTree) {
    tree.set_enabled("C", true);
    tree.set_enabled("D", true);
    tree.set_enabled("C", false);
    let saved = tree.enabled_states();

    let mut fresh = build_tree();
    let touched = fresh.apply_states(&saved);

    assert_eq!(fresh.enabled_states(), saved);
    assert!(touched.contains(&"A".to_string()));
    assert_eq!(
        touched.iter().filter(|id| id.as_str() == "A").count(),
        1,
        "each id reported once"
    );
}

#[rstest]
fn given_state_map_with_unknown_id_when_applying_then_skips_it(mut tree: ConfigTree) {
    let states: BTreeMap<String, bool> = [("ghost".to_string(), true), ("B".to_string(), true)]
        .into_iter()
        .collect();

    let touched = tree.apply_states(&states);

    assert_eq!(touched, vec!["B", "A", "C"]);
    assert_eq!(tree.is_enabled("D"), Some(false));
}

#[test]
fn given_saved_states_when_restoring_then_each_real_transition_notifies_once() {
    let mut fresh = build_tree();
    let calls = record(&mut fresh, &["A", "B", "C", "D"]);
    let states: BTreeMap<String, bool> = [("A", true), ("B", false), ("C", false), ("D", true)]
        .into_iter()
        .map(|(id, on)| (id.to_string(), on))
        .collect();

    let touched = fresh.apply_states(&states);

    assert_eq!(fresh.enabled_states(), states);
    assert_eq!(
        *calls.borrow(),
        vec![("A".to_string(), true), ("D".to_string(), true)]
    );
    assert_eq!(touched, vec!["A", "B", "C", "D"]);
}
