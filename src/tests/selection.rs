use super::Selection;
use crate::section::{Section, SectionStore};
use crate::tree::build_tree;

fn section(id: &str, parent_id: Option<&str>) -> Section {
    Section {
        id: id.to_string(),
        title: format!("Section {id}"),
        content: format!("Body of {id}"),
        page_number: 1,
        parent_id: parent_id.map(str::to_string),
        children: vec![],
    }
}

fn sample() -> Vec<Section> {
    vec![
        section("intro", None),
        section("scope", Some("intro")),
        section("methods", None),
        section("data", Some("methods")),
        section("cleaning", Some("data")),
    ]
}

#[test]
fn test_default_current_is_first_in_backend_order() {
    // First element is a child of a later section, so it is not a root.
    let sections = vec![section("child", Some("parent")), section("parent", None)];
    let store = SectionStore::new(sections.clone());
    let forest = build_tree(&sections);
    let selection = Selection::new(&forest);

    assert_eq!(forest[0].section.id, "parent");
    let current = selection.current_section(&store).unwrap();
    assert_eq!(current.id, "child");
}

#[test]
fn test_no_sections_means_no_current() {
    let store = SectionStore::default();
    let selection = Selection::new(&[]);

    assert!(selection.current_section(&store).is_none());
}

#[test]
fn test_select_replaces_and_leaves_expansion_alone() {
    let sections = sample();
    let store = SectionStore::new(sections.clone());
    let forest = build_tree(&sections);
    let mut selection = Selection::new(&forest);

    assert!(selection.toggle("methods"));
    assert!(selection.select_id(&store, "data"));
    assert_eq!(selection.current_section(&store).unwrap().id, "data");
    assert!(!selection.is_expanded("methods"));

    selection.select(sections[0].clone());
    assert_eq!(selection.current_section(&store).unwrap().id, "intro");
}

#[test]
fn test_select_unknown_id_keeps_previous() {
    let sections = sample();
    let store = SectionStore::new(sections.clone());
    let mut selection = Selection::new(&build_tree(&sections));

    assert!(selection.select_id(&store, "scope"));
    assert!(!selection.select_id(&store, "ghost"));
    assert_eq!(selection.selected().unwrap().id, "scope");
}

#[test]
fn test_nodes_with_children_start_expanded() {
    let sections = sample();
    let selection = Selection::new(&build_tree(&sections));

    assert!(selection.is_expanded("intro"));
    assert!(selection.is_expanded("methods"));
    assert!(selection.is_expanded("data"));
    assert!(!selection.is_expanded("scope"));
}

#[test]
fn test_toggle_leaf_is_noop() {
    let sections = sample();
    let mut selection = Selection::new(&build_tree(&sections));

    assert!(!selection.toggle("scope"));
    assert!(!selection.is_expanded("scope"));
    assert!(!selection.toggle("cleaning"));
}

#[test]
fn test_toggle_flips_back_and_forth() {
    let sections = sample();
    let mut selection = Selection::new(&build_tree(&sections));

    assert!(selection.toggle("intro"));
    assert!(!selection.is_expanded("intro"));
    assert!(selection.toggle("intro"));
    assert!(selection.is_expanded("intro"));
}

#[test]
fn test_visible_rows_hide_collapsed_subtrees() {
    let sections = sample();
    let forest = build_tree(&sections);
    let mut selection = Selection::new(&forest);

    let all: Vec<(&str, usize)> = selection
        .visible_rows(&forest)
        .iter()
        .map(|r| (r.node.section.id.as_str(), r.depth))
        .collect();
    assert_eq!(
        all,
        vec![
            ("intro", 0),
            ("scope", 1),
            ("methods", 0),
            ("data", 1),
            ("cleaning", 2)
        ]
    );

    selection.toggle("methods");
    let rows = selection.visible_rows(&forest);
    let shown: Vec<&str> = rows.iter().map(|r| r.node.section.id.as_str()).collect();
    assert_eq!(shown, vec!["intro", "scope", "methods"]);
    assert!(rows[2].is_last);
    assert!(!rows[2].expanded);
}

#[test]
fn test_reveal_expands_ancestors() {
    let sections = sample();
    let forest = build_tree(&sections);
    let mut selection = Selection::new(&forest);
    selection.toggle("methods");
    selection.toggle("data");

    selection.reveal(&forest, "cleaning");

    assert!(selection.is_expanded("methods"));
    assert!(selection.is_expanded("data"));
    let shown = selection.visible_rows(&forest);
    assert!(shown.iter().any(|r| r.node.section.id == "cleaning"));
}
