mod common;

use std::sync::Arc;

use manos_structure::{
    ConfigOverrides, Document, Editor, InputEvent, Key, KeyPress, Node, TokenHooks,
};
use pretty_assertions::assert_eq;

use common::{caret, p, span, text_node};

#[test]
fn tab_in_a_paragraph_inserts_tab_text() {
    common::init_tracing();
    let mut editor = Editor::from_nodes(&[Node::paragraph("hello")]);
    let text = text_node(editor.doc(), "hello");
    editor.set_selection(caret(text, 0)).unwrap();

    let outcome = editor.handle_key(&KeyPress::new(Key::Tab)).unwrap();

    assert!(outcome.prevent_default);
    assert_eq!(editor.value(), vec![Node::paragraph("   hello")]);
    assert_eq!(editor.selection(), caret(text, 3));
}

#[test]
fn tab_replaces_a_selection() {
    let mut editor = Editor::from_nodes(&[Node::paragraph("abcd")]);
    let text = text_node(editor.doc(), "abcd");
    editor.set_selection(span(text, 1, 3)).unwrap();

    editor.handle_key(&KeyPress::new(Key::Tab)).unwrap();

    assert_eq!(editor.value(), vec![Node::paragraph("a   d")]);
}

#[test]
fn typed_text_with_newlines_splits_blocks() {
    let mut editor = Editor::from_nodes(&[Node::paragraph("ab")]);
    let text = text_node(editor.doc(), "ab");
    editor.set_selection(caret(text, 1)).unwrap();

    editor
        .handle_input(&InputEvent::InsertText("x\ny".to_string()))
        .unwrap();

    assert_eq!(
        editor.value(),
        vec![
            Node::paragraph("ax"),
            Node::element("DIV", vec![Node::text("yb")]),
        ]
    );
}

#[test]
fn unhandled_keys_and_events_pass_through() {
    let mut editor = Editor::from_nodes(&[Node::paragraph("ab")]);

    let key = editor.handle_key(&KeyPress::new(Key::ArrowDown)).unwrap();
    let event = editor
        .handle_input(&InputEvent::Other("historyUndo".to_string()))
        .unwrap();

    assert!(!key.prevent_default);
    assert!(!event.prevent_default);
    assert_eq!(editor.value(), vec![Node::paragraph("ab")]);
}

#[test]
fn placeholders_are_dropped_before_structural_keys() {
    let mut editor = Editor::from_nodes(&[p(vec![
        Node::text("ab"),
        Node::element("B", vec![Node::text("\u{200B}")]),
    ])]);
    let text = text_node(editor.doc(), "ab");
    editor.set_selection(caret(text, 2)).unwrap();

    editor.split_block(false).unwrap();

    assert_eq!(
        editor.value(),
        vec![
            Node::paragraph("ab"),
            Node::element("DIV", vec![Node::br()]),
        ]
    );
}

fn token_editor(nodes: &[Node]) -> Editor {
    let doc = Document::from_nodes(nodes);
    let root = doc.body();
    Editor::new(doc, root, Arc::new(TokenHooks), ConfigOverrides::default()).unwrap()
}

#[test]
fn arrows_skip_a_token_that_opens_a_block() {
    let mut editor = token_editor(&[
        Node::paragraph("above"),
        p(vec![
            Node::element_with("SPAN", &[("sc-type", "chip")], vec![Node::text("tok")]),
            Node::text("rest"),
        ]),
        Node::paragraph("below"),
    ]);
    let tok = text_node(editor.doc(), "tok");

    editor.set_selection(caret(tok, 0)).unwrap();
    let outcome = editor.handle_key(&KeyPress::new(Key::ArrowUp)).unwrap();
    assert!(outcome.prevent_default);
    assert_eq!(editor.selection(), caret(text_node(editor.doc(), "above"), 0));

    editor.set_selection(caret(tok, 0)).unwrap();
    let outcome = editor.handle_key(&KeyPress::new(Key::ArrowDown)).unwrap();
    assert!(outcome.prevent_default);
    assert_eq!(editor.selection(), caret(text_node(editor.doc(), "below"), 0));
}

#[test]
fn arrows_ignore_blocks_without_a_leading_token() {
    let mut editor = token_editor(&[Node::paragraph("above"), Node::paragraph("plain")]);
    let plain = text_node(editor.doc(), "plain");
    editor.set_selection(caret(plain, 0)).unwrap();

    let outcome = editor.handle_key(&KeyPress::new(Key::ArrowUp)).unwrap();

    assert!(!outcome.prevent_default);
    assert_eq!(editor.selection(), caret(plain, 0));
}

#[test]
fn enter_after_a_slashed_word_is_left_to_the_host() {
    let mut editor = token_editor(&[Node::paragraph("see a/b")]);
    let text = text_node(editor.doc(), "see a/b");
    editor.set_selection(caret(text, 7)).unwrap();

    let outcome = editor.handle_input(&InputEvent::InsertParagraph).unwrap();

    assert!(!outcome.prevent_default);
    assert_eq!(editor.value(), vec![Node::paragraph("see a/b")]);
}

#[test]
fn enter_after_a_plain_word_splits_with_token_hooks() {
    let mut editor = token_editor(&[Node::paragraph("see ab")]);
    let text = text_node(editor.doc(), "see ab");
    editor.set_selection(caret(text, 6)).unwrap();

    let outcome = editor.handle_input(&InputEvent::InsertParagraph).unwrap();

    assert!(outcome.prevent_default);
    assert_eq!(
        editor.value(),
        vec![
            Node::paragraph("see ab"),
            Node::element("DIV", vec![Node::br()]),
        ]
    );
}

#[test]
fn input_events_round_trip_through_json() {
    let event: InputEvent =
        serde_json::from_str(r#"{"type":"insert_text","data":"hi"}"#).unwrap();
    assert_eq!(event, InputEvent::InsertText("hi".to_string()));

    let key: KeyPress = serde_json::from_str(r#"{"key":"tab"}"#).unwrap();
    assert_eq!(key, KeyPress::new(Key::Tab));
}
