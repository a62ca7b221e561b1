mod common;

use manos_structure::{
    Document, EditError, Editor, FormatSpec, InputEvent, Node, Point, Range, are_alike,
    change_format, merge_inlines, split_document,
};
use pretty_assertions::assert_eq;

use common::{caret, element, p, span, text_node};

fn size_two() -> FormatSpec {
    FormatSpec::new("span").attr("class", "size-2")
}

#[test]
fn adding_then_removing_a_span_restores_the_tree() {
    common::init_tracing();
    let original = vec![Node::paragraph("hello world")];
    let mut editor = Editor::from_nodes(&original);
    let text = text_node(editor.doc(), "hello world");

    editor
        .change_format_in(Some(&size_two()), None, span(text, 0, 5), true)
        .unwrap();
    assert_eq!(
        editor.value(),
        vec![p(vec![
            Node::element_with("SPAN", &[("class", "size-2")], vec![Node::text("hello")]),
            Node::text(" world"),
        ])]
    );

    let hello = text_node(editor.doc(), "hello");
    editor
        .change_format_in(None, Some(&size_two()), span(hello, 0, 5), true)
        .unwrap();
    assert_eq!(editor.value(), original);
}

#[test]
fn partial_mode_splits_text_while_whole_mode_grows_to_the_node() {
    let mut doc = Document::from_nodes(&[Node::paragraph("hello world")]);
    let root = doc.body();
    let text = text_node(&doc, "hello world");
    let bold = FormatSpec::new("B");

    change_format(&mut doc, root, Some(&bold), None, &span(text, 2, 4), true).unwrap();
    assert_eq!(
        doc.children_to_nodes(root),
        vec![p(vec![
            Node::text("he"),
            Node::element("B", vec![Node::text("ll")]),
            Node::text("o world"),
        ])]
    );

    let mut doc = Document::from_nodes(&[Node::paragraph("hello world")]);
    let root = doc.body();
    let text = text_node(&doc, "hello world");
    change_format(&mut doc, root, Some(&bold), None, &span(text, 2, 4), false).unwrap();
    assert_eq!(
        doc.children_to_nodes(root),
        vec![p(vec![Node::element("B", vec![Node::text("hello world")])])]
    );
}

#[test]
fn adjacent_equal_formats_are_merged() {
    let mut editor = Editor::from_nodes(&[Node::paragraph("hello world")]);
    let text = text_node(editor.doc(), "hello world");
    let bold = FormatSpec::new("B");

    editor
        .change_format_in(Some(&bold), None, span(text, 0, 5), true)
        .unwrap();
    let rest = text_node(editor.doc(), " world");
    editor
        .change_format_in(Some(&bold), None, span(rest, 0, 6), true)
        .unwrap();

    assert_eq!(
        editor.value(),
        vec![p(vec![Node::element("B", vec![Node::text("hello world")])])]
    );
    let merged = text_node(editor.doc(), "hello world");
    assert_eq!(editor.selection(), span(merged, 5, 11));
}

#[test]
fn alike_compares_style_case_insensitively() {
    let doc = Document::from_nodes(&[p(vec![
        Node::element_with("SPAN", &[("style", "COLOR: RED")], Vec::new()),
        Node::element_with("SPAN", &[("style", "color: red")], Vec::new()),
        Node::element_with("SPAN", &[("class", "Red")], Vec::new()),
        Node::element_with("SPAN", &[("class", "red")], Vec::new()),
        Node::element_with("A", &[("href", "#")], Vec::new()),
        Node::element_with("A", &[("href", "#")], Vec::new()),
    ])]);
    let spans = doc.children(element(&doc, "P"));

    assert!(are_alike(&doc, spans[0], spans[1]));
    assert!(!are_alike(&doc, spans[2], spans[3]));
    assert!(!are_alike(&doc, spans[4], spans[5]));
}

#[test]
fn merge_inlines_keeps_the_range_on_the_same_text() {
    let mut doc = Document::from_nodes(&[p(vec![
        Node::element("I", vec![Node::text("ab")]),
        Node::element("I", vec![Node::text("cd")]),
    ])]);
    let block = element(&doc, "P");
    let cd = text_node(&doc, "cd");
    let mut range = caret(cd, 1);

    merge_inlines(&mut doc, block, &mut range).unwrap();

    assert_eq!(
        doc.children_to_nodes(block),
        vec![Node::element("I", vec![Node::text("abcd")])]
    );
    let abcd = text_node(&doc, "abcd");
    assert_eq!(range, caret(abcd, 3));
}

#[test]
fn removing_part_of_a_format_keeps_the_rest_wrapped() {
    let mut doc = Document::from_nodes(&[p(vec![Node::element(
        "B",
        vec![Node::text("abcdef")],
    )])]);
    let root = doc.body();
    let text = text_node(&doc, "abcdef");

    change_format(&mut doc, root, None, Some(&FormatSpec::new("B")), &span(text, 2, 4), true)
        .unwrap();

    assert_eq!(
        doc.children_to_nodes(root),
        vec![p(vec![
            Node::element("B", vec![Node::text("ab")]),
            Node::text("cd"),
            Node::element("B", vec![Node::text("ef")]),
        ])]
    );
}

#[test]
fn multi_range_application_treats_each_range_alone() {
    let mut editor = Editor::from_nodes(&[Node::paragraph("aa"), Node::paragraph("bb")]);
    let aa = text_node(editor.doc(), "aa");
    let bb = text_node(editor.doc(), "bb");
    let italic = FormatSpec::new("I");

    editor
        .change_format_across(Some(&italic), None, &[span(bb, 0, 2), span(aa, 0, 2)], false)
        .unwrap();

    assert_eq!(
        editor.value(),
        vec![
            p(vec![Node::element("I", vec![Node::text("aa")])]),
            p(vec![Node::element("I", vec![Node::text("bb")])]),
        ]
    );
}

#[test]
fn toggle_bold_from_input_events() {
    let mut editor = Editor::from_nodes(&[Node::paragraph("word")]);
    let word = text_node(editor.doc(), "word");
    editor.set_selection(span(word, 0, 4)).unwrap();

    editor.handle_input(&InputEvent::FormatBold).unwrap();
    assert!(editor.has_format(&FormatSpec::new("B")));
    assert_eq!(
        editor.value(),
        vec![p(vec![Node::element("B", vec![Node::text("word")])])]
    );

    editor.handle_input(&InputEvent::FormatBold).unwrap();
    assert!(!editor.has_format(&FormatSpec::new("B")));
    assert_eq!(editor.value(), vec![Node::paragraph("word")]);
}

#[test]
fn collapsed_add_leaves_a_placeholder_for_the_caret() {
    let mut doc = Document::from_nodes(&[Node::paragraph("ab")]);
    let root = doc.body();
    let text = text_node(&doc, "ab");

    let range =
        change_format(&mut doc, root, Some(&FormatSpec::new("U")), None, &caret(text, 1), true)
            .unwrap();

    assert_eq!(
        doc.children_to_nodes(root),
        vec![p(vec![
            Node::text("a"),
            Node::element("U", vec![Node::text("\u{200B}")]),
            Node::text("b"),
        ])]
    );
    let placeholder = text_node(&doc, "\u{200B}");
    assert_eq!(range, Range::collapsed(Point::new(placeholder, 1)));
}

#[test]
fn inverted_ranges_are_rejected() {
    let mut doc = Document::from_nodes(&[Node::paragraph("ab")]);
    let root = doc.body();
    let text = text_node(&doc, "ab");
    let inverted = Range::new(Point::new(text, 2), Point::new(text, 0));

    assert!(change_format(&mut doc, root, Some(&FormatSpec::new("B")), None, &inverted, true).is_err());
    assert_eq!(doc.children_to_nodes(root), vec![Node::paragraph("ab")]);
}

#[test]
fn offsets_past_the_end_are_rejected_without_changes() {
    let mut editor = Editor::from_nodes(&[Node::paragraph("ab")]);
    let text = text_node(editor.doc(), "ab");
    let before = editor.selection();
    let past_end = caret(text, 3);
    let out_of_bounds = EditError::OffsetOutOfBounds { offset: 3, length: 2 };

    assert_eq!(editor.set_selection(past_end).unwrap_err(), out_of_bounds);
    assert_eq!(editor.selection(), before);

    let bold = FormatSpec::new("B");
    assert_eq!(
        editor
            .change_format_in(Some(&bold), None, Range::new(Point::new(text, 0), Point::new(text, 3)), true)
            .unwrap_err(),
        out_of_bounds
    );
    assert_eq!(editor.value(), vec![Node::paragraph("ab")]);
    assert_eq!(editor.selection(), before);

    let mut doc = Document::from_nodes(&[Node::paragraph("ab")]);
    let body = doc.body();
    let text = text_node(&doc, "ab");
    assert_eq!(
        split_document(&mut doc, &caret(text, 3), Some(body), "DIV").unwrap_err(),
        out_of_bounds
    );
    assert_eq!(doc.children_to_nodes(body), vec![Node::paragraph("ab")]);
}
