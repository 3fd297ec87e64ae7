use rcheck_core::{
    equal, sort_notices, trail_cmp, Kind, Notice, Options, Reflect, TrailLog, Type, Value,
};
use std::cell::RefCell;
use std::rc::Rc;

struct T {
    int: i32,
    text: String,
}

impl Reflect for T {
    fn ty() -> Type {
        Type::new("T", Kind::Struct)
    }

    fn reflect(&self) -> Value {
        Value::structure(Self::ty())
            .field("Int", &self.int)
            .field("Str", &self.text)
            .build()
    }
}

struct Node {
    payload: i32,
    other: Option<Rc<RefCell<Node>>>,
}

impl Reflect for Node {
    fn ty() -> Type {
        Type::new("Node", Kind::Struct)
    }

    fn reflect(&self) -> Value {
        Value::structure(Self::ty())
            .field("Payload", &self.payload)
            .field("Other", &self.other)
            .build()
    }
}

/// Two nodes pointing at each other.
fn pair_of_nodes(payload: i32) -> (Rc<RefCell<Node>>, Rc<RefCell<Node>>) {
    let first = Rc::new(RefCell::new(Node {
        payload,
        other: None,
    }));
    let second = Rc::new(RefCell::new(Node {
        payload,
        other: Some(Rc::clone(&first)),
    }));
    first.borrow_mut().other = Some(Rc::clone(&second));
    (first, second)
}

fn break_cycle(node: &Rc<RefCell<Node>>) {
    node.borrow_mut().other = None;
}

#[test]
fn test_equal_ints_log_trail() {
    let log = TrailLog::new();
    let opts = Options::new().with_trail("type.field").with_trail_log(&log);

    assert!(equal(&42, &42, &opts).is_ok());
    assert_eq!(log.entries(), vec!["type.field".to_string()]);
}

#[test]
fn test_mismatched_ints_with_trail() {
    let opts = Options::new().with_trail("type.field");
    let err = equal(&42, &44, &opts).unwrap_err();

    assert_eq!(
        err.to_string(),
        "expected values to be equal:\n  trail: type.field\n   want: 42\n   have: 44"
    );
}

#[test]
fn test_type_mismatch() {
    let err = equal(&42, &"abc", &Options::new()).unwrap_err();

    assert_eq!(
        err.to_string(),
        "expected values to be equal:\n  want type: i32\n  have type: String"
    );
}

#[test]
fn test_slice_length_mismatch() {
    let opts = Options::new().with_trail("type.field");
    let err = equal(&vec![1, 2], &vec![1], &opts).unwrap_err();
    let rendered = err.to_string();

    assert_eq!(err.trail(), "type.field");
    assert!(rendered.contains("want len: 2"), "{rendered}");
    assert!(rendered.contains("have len: 1"), "{rendered}");
    assert_eq!(err.row("want"), Some("Vec<i32>{\n  1,\n  2,\n}"));
    assert_eq!(err.row("have"), Some("Vec<i32>{\n  1,\n}"));

    let diff = err.row("diff").unwrap();
    assert!(diff.starts_with("--- want\n+++ have\n@@ -1,4 +1,3 @@"), "{diff}");
    assert!(diff.ends_with(" }"), "{diff}");
    assert!(rendered.ends_with(" }"));
}

#[test]
fn test_struct_with_two_failing_fields() {
    let want = T {
        int: 42,
        text: "abc".to_string(),
    };
    let have = T {
        int: 44,
        text: "xyz".to_string(),
    };
    let err = equal(&want, &have, &Options::new()).unwrap_err();

    assert_eq!(err.chain_len(), 2);
    assert_eq!(
        err.to_string(),
        concat!(
            "multiple expectations violated:\n",
            "  error: expected values to be equal\n",
            "  trail: T.Int\n",
            "   want: 42\n",
            "   have: 44\n",
            "      ---\n",
            "  error: expected values to be equal\n",
            "  trail: T.Str\n",
            "   want: \"abc\"\n",
            "   have: \"xyz\"",
        )
    );
}

#[test]
fn test_recursive_structs_equal() {
    let (a1, a2) = pair_of_nodes(7);
    let (b1, b2) = pair_of_nodes(7);

    assert!(equal(&a1, &b1, &Options::new()).is_ok());
    assert!(equal(&a1, &a1, &Options::new()).is_ok());

    let (c1, c2) = pair_of_nodes(8);
    let err = equal(&a1, &c1, &Options::new()).unwrap_err();
    assert_eq!(err.trail(), "Node.Payload");

    for node in [&a1, &a2, &b1, &b2, &c1, &c2] {
        break_cycle(node);
    }
}

#[test]
fn test_sort_notice_chain() {
    let head = ["C", "A", "B", "B", "A"]
        .iter()
        .enumerate()
        .map(|(i, trail)| {
            Notice::new(format!("notice {}", i))
                .set_trail(*trail)
                .append("index", i.to_string())
        })
        .reduce(|prev, next| next.chain(prev))
        .unwrap();

    let sorted = sort_notices(head, trail_cmp);
    let order: Vec<(String, String)> = sorted
        .iter()
        .map(|n| (n.trail().to_string(), n.row("index").unwrap().to_string()))
        .collect();
    assert_eq!(
        order
            .iter()
            .map(|(t, i)| (t.as_str(), i.as_str()))
            .collect::<Vec<_>>(),
        vec![("A", "1"), ("A", "4"), ("B", "2"), ("B", "3"), ("C", "0")]
    );
}
