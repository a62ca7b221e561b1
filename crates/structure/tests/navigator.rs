mod common;

use manos_structure::{
    AncestorScope, Attrs, Document, EditError, Node, has_ancestor_with_id, nearest_ancestor,
    nearest_with_tag, next_block, previous_block,
};
use pretty_assertions::assert_eq;

use common::{element, p, text_node};

fn sample() -> Document {
    Document::from_nodes(&[
        Node::paragraph("a"),
        Node::element_with(
            "DIV",
            &[("id", "quote")],
            vec![p(vec![Node::element_with(
                "SPAN",
                &[("class", "size")],
                vec![Node::text("b")],
            )])],
        ),
        Node::paragraph("c"),
    ])
}

#[test]
fn nearest_ancestor_respects_scope_and_root() {
    let doc = sample();
    let root = doc.body();
    let b = text_node(&doc, "b");
    let span = element(&doc, "SPAN");

    let is_span = |doc: &Document, node| doc.has_tag(node, "SPAN");
    assert_eq!(
        nearest_ancestor(&doc, b, root, AncestorScope::STRICT, is_span).unwrap(),
        Some(span)
    );
    assert_eq!(
        nearest_ancestor(&doc, span, root, AncestorScope::STRICT, is_span).unwrap(),
        None
    );
    assert_eq!(
        nearest_ancestor(&doc, span, root, AncestorScope::INCLUSIVE, is_span).unwrap(),
        Some(span)
    );

    let is_body = |doc: &Document, node| doc.has_tag(node, "BODY");
    assert_eq!(
        nearest_ancestor(&doc, b, root, AncestorScope::INCLUSIVE, is_body).unwrap(),
        None
    );
}

#[test]
fn nearest_ancestor_rejects_nodes_outside_root() {
    let doc = sample();
    let quote = element(&doc, "DIV");
    let a = text_node(&doc, "a");

    let err = nearest_ancestor(&doc, a, quote, AncestorScope::STRICT, |_, _| true).unwrap_err();
    assert_eq!(err, EditError::NodeOutsideRoot { node: a, root: quote });
}

#[test]
fn nearest_with_tag_matches_attributes_exactly() {
    let doc = sample();
    let root = doc.body();
    let b = text_node(&doc, "b");

    let mut size = Attrs::new();
    size.insert("class".to_string(), "size".to_string());
    let mut font = Attrs::new();
    font.insert("class".to_string(), "font".to_string());

    assert_eq!(
        nearest_with_tag(&doc, b, root, "SPAN", Some(&size)).unwrap(),
        Some(element(&doc, "SPAN"))
    );
    assert_eq!(nearest_with_tag(&doc, b, root, "SPAN", Some(&font)).unwrap(), None);
    assert_eq!(nearest_with_tag(&doc, b, root, "BODY", None).unwrap(), None);
}

#[test]
fn ancestor_id_lookup_includes_the_root() {
    let doc = sample();
    let quote = element(&doc, "DIV");
    let b = text_node(&doc, "b");

    assert!(has_ancestor_with_id(&doc, b, doc.body(), "quote").unwrap());
    assert!(has_ancestor_with_id(&doc, b, quote, "quote").unwrap());
    assert!(!has_ancestor_with_id(&doc, text_node(&doc, "a"), doc.body(), "quote").unwrap());
}

#[test]
fn tag_and_id_lookups_reject_nodes_outside_root() {
    let doc = sample();
    let quote = element(&doc, "DIV");
    let a = text_node(&doc, "a");
    let outside = EditError::NodeOutsideRoot { node: a, root: quote };

    assert_eq!(nearest_with_tag(&doc, a, quote, "P", None).unwrap_err(), outside);
    assert_eq!(has_ancestor_with_id(&doc, a, quote, "quote").unwrap_err(), outside);
}

#[test]
fn block_walk_skips_containers_and_inlines() {
    let doc = sample();
    let root = doc.body();
    let blocks: Vec<_> = doc
        .children(root)
        .into_iter()
        .filter(|node| doc.has_tag(*node, "P"))
        .collect();
    let inner = doc.parent(element(&doc, "SPAN")).unwrap();

    assert_eq!(next_block(&doc, blocks[0], root).unwrap(), Some(inner));
    assert_eq!(next_block(&doc, inner, root).unwrap(), Some(blocks[1]));
    assert_eq!(next_block(&doc, blocks[1], root).unwrap(), None);

    assert_eq!(previous_block(&doc, blocks[1], root).unwrap(), Some(inner));
    assert_eq!(previous_block(&doc, inner, root).unwrap(), Some(blocks[0]));
    assert_eq!(
        previous_block(&doc, text_node(&doc, "a"), root).unwrap(),
        Some(blocks[0])
    );
}
