mod common;

use manos_structure::{
    Editor, InputEvent, Key, KeyPress, ListKind, Node, Point, Range, parse_list_marker,
};
use pretty_assertions::assert_eq;

use common::{caret, li, p, text_node, ul};

#[test]
fn tab_at_start_of_second_item_nests_it() {
    common::init_tracing();
    let mut editor = Editor::from_nodes(&[ul(vec![li("a"), li("b")])]);
    let b = text_node(editor.doc(), "b");
    editor.set_selection(caret(b, 0)).unwrap();

    let outcome = editor.handle_key(&KeyPress::new(Key::Tab)).unwrap();

    assert!(outcome.prevent_default);
    assert_eq!(editor.value(), vec![ul(vec![li("a"), ul(vec![li("b")])])]);
    assert_eq!(editor.selection(), caret(b, 0));
}

#[test]
fn tab_on_first_item_cannot_nest_but_swallows_the_key() {
    let mut editor = Editor::from_nodes(&[ul(vec![li("a"), li("b")])]);
    let a = text_node(editor.doc(), "a");
    editor.set_selection(caret(a, 0)).unwrap();

    let outcome = editor.handle_key(&KeyPress::new(Key::Tab)).unwrap();

    assert!(outcome.prevent_default);
    assert_eq!(editor.value(), vec![ul(vec![li("a"), li("b")])]);
}

#[test]
fn shift_tab_outside_a_list_does_nothing() {
    let mut editor = Editor::from_nodes(&[Node::paragraph("x")]);
    let x = text_node(editor.doc(), "x");
    editor.set_selection(caret(x, 0)).unwrap();

    let outcome = editor.handle_key(&KeyPress::shifted(Key::Tab)).unwrap();

    assert!(!outcome.prevent_default);
    assert_eq!(editor.value(), vec![Node::paragraph("x")]);
}

#[test]
fn declined_shift_tab_keeps_placeholders() {
    let original = vec![p(vec![
        Node::element("B", vec![Node::text("\u{200B}")]),
        Node::text("x"),
    ])];
    let mut editor = Editor::from_nodes(&original);
    let x = text_node(editor.doc(), "x");
    editor.set_selection(caret(x, 0)).unwrap();

    let outcome = editor.handle_key(&KeyPress::shifted(Key::Tab)).unwrap();

    assert!(!outcome.prevent_default);
    assert_eq!(editor.value(), original);
    assert_eq!(editor.selection(), caret(x, 0));
}

#[test]
fn shift_tab_moves_a_nested_item_up() {
    let mut editor = Editor::from_nodes(&[ul(vec![li("a"), ul(vec![li("b")])])]);
    let b = text_node(editor.doc(), "b");
    editor.set_selection(caret(b, 0)).unwrap();

    let outcome = editor.handle_key(&KeyPress::shifted(Key::Tab)).unwrap();

    assert!(outcome.prevent_default);
    assert_eq!(editor.value(), vec![ul(vec![li("a"), li("b")])]);
}

#[test]
fn shift_tab_mid_caret_is_ignored() {
    let mut editor = Editor::from_nodes(&[ul(vec![li("a"), ul(vec![li("bc")])])]);
    let bc = text_node(editor.doc(), "bc");
    editor.set_selection(caret(bc, 1)).unwrap();

    let outcome = editor.handle_key(&KeyPress::shifted(Key::Tab)).unwrap();

    assert!(!outcome.prevent_default);
    assert_eq!(editor.value(), vec![ul(vec![li("a"), ul(vec![li("bc")])])]);
}

#[test]
fn outdenting_a_middle_item_splits_the_list() {
    let mut editor = Editor::from_nodes(&[ul(vec![li("a"), li("b"), li("c")])]);
    let b = text_node(editor.doc(), "b");
    editor.set_selection(caret(b, 0)).unwrap();

    assert!(editor.decrease_list_level().unwrap());

    assert_eq!(
        editor.value(),
        vec![
            ul(vec![li("a")]),
            Node::element("DIV", vec![Node::text("b")]),
            ul(vec![li("c")]),
        ]
    );
}

#[test]
fn list_level_changes_outside_lists_decline() {
    let mut editor = Editor::from_nodes(&[Node::paragraph("x")]);
    assert!(!editor.increase_list_level().unwrap());
    assert!(!editor.decrease_list_level().unwrap());
    assert_eq!(editor.value(), vec![Node::paragraph("x")]);
}

#[test]
fn make_list_wraps_blocks_and_switches_kind() {
    let mut editor = Editor::from_nodes(&[Node::paragraph("a"), Node::paragraph("b")]);
    let a = text_node(editor.doc(), "a");
    let b = text_node(editor.doc(), "b");
    editor
        .set_selection(Range::new(Point::new(a, 0), Point::new(b, 1)))
        .unwrap();

    editor.handle_input(&InputEvent::InsertUnorderedList).unwrap();
    assert_eq!(editor.value(), vec![ul(vec![li("a"), li("b")])]);

    editor.make_list(ListKind::Ordered).unwrap();
    assert_eq!(
        editor.value(),
        vec![Node::element("OL", vec![li("a"), li("b")])]
    );
}

#[test]
fn typed_marker_becomes_a_list_on_tab() {
    let mut editor = Editor::from_nodes(&[Node::paragraph("*")]);
    let star = text_node(editor.doc(), "*");
    editor.set_selection(caret(star, 1)).unwrap();

    let outcome = editor.handle_key(&KeyPress::new(Key::Tab)).unwrap();

    assert!(outcome.prevent_default);
    assert_eq!(
        editor.value(),
        vec![ul(vec![Node::element("LI", vec![Node::br()])])]
    );
}

#[test]
fn numbered_marker_keeps_its_start() {
    let mut editor = Editor::from_nodes(&[Node::paragraph("3.")]);
    let marker = text_node(editor.doc(), "3.");
    editor.set_selection(caret(marker, 2)).unwrap();

    editor.handle_key(&KeyPress::new(Key::Tab)).unwrap();

    assert_eq!(
        editor.value(),
        vec![Node::element_with(
            "OL",
            &[("start", "3")],
            vec![Node::element("LI", vec![Node::br()])]
        )]
    );
}

#[test]
fn list_markers() {
    assert_eq!(parse_list_marker("-"), Some((ListKind::Unordered, 1)));
    assert_eq!(parse_list_marker("12)"), Some((ListKind::Ordered, 12)));
    assert_eq!(parse_list_marker("1"), None);
    assert_eq!(parse_list_marker("a."), None);
}
