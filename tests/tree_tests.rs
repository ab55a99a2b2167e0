use refcheck::tree::{key_order, Kind};
use refcheck::{Key, Node};
use std::cmp::Ordering;

#[test]
fn test_type_name() {
    assert_eq!(Node::Null.type_name(), "null");
    assert_eq!(Node::Bool(true).type_name(), "boolean");
    assert_eq!(Node::from(42.0).type_name(), "number");
    assert_eq!(Node::from("test").type_name(), "string");
    assert_eq!(Node::object(Vec::<(&str, Node)>::new()).type_name(), "object");
    assert_eq!(Node::Array(vec![]).type_name(), "array");
}

#[test]
fn test_kind() {
    assert_eq!(Node::Array(vec![]).kind(), Kind::Array);
    assert_eq!(Node::object([("a", Node::Null)]).kind(), Kind::Object);
    for scalar in [Node::Null, Node::Bool(false), Node::from(0.0), Node::from("")] {
        assert_eq!(scalar.kind(), Kind::Other);
        assert!(scalar.is_scalar());
    }
}

#[test]
fn test_segment_text() {
    assert_eq!(Node::from("abc").segment_text(), "abc");
    assert_eq!(Node::from(42.0).segment_text(), "42");
    assert_eq!(Node::from(0.5).segment_text(), "0.5");
    assert_eq!(Node::Bool(false).segment_text(), "false");
    assert_eq!(Node::Null.segment_text(), "null");
}

#[test]
fn test_preview_truncates() {
    let node = Node::from("a long string value");
    assert_eq!(node.preview(10), "\"a long...");
    assert_eq!(node.preview(100), "\"a long string value\"");
}

#[test]
fn test_key_order_ranks_types_then_values() {
    assert_eq!(key_order(&Node::Null, &Node::Bool(false)), Ordering::Less);
    assert_eq!(key_order(&Node::from(10.0), &Node::from(9.0)), Ordering::Greater);
    assert_eq!(key_order(&Node::from(99.0), &Node::from("1")), Ordering::Less);
    assert_eq!(key_order(&Node::from("b"), &Node::from("a")), Ordering::Greater);

    let mut values = vec![Node::from("x"), Node::from(2.0), Node::Null, Node::from(1.0)];
    values.sort_by(key_order);
    assert_eq!(
        values,
        vec![Node::Null, Node::from(1.0), Node::from(2.0), Node::from("x")]
    );
}

#[test]
fn test_scalar_keys_are_distinct_from_text_keys() {
    assert_ne!(Key::Scalar("1".to_string()), Key::from("1"));
    assert_eq!(Key::Scalar("1".to_string()).canonical(), Key::from("1"));
    assert_eq!(Key::Scalar("1".to_string()).to_string(), "1");
}
