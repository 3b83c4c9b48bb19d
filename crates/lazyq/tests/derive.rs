//! Tests for `#[derive(Record)]`.

use std::collections::HashSet;

use lazyq::{Query, Record as _, Reflect, Value};
use lazyq_macros::Record;

#[derive(Debug, Clone, Record)]
struct Task {
    title: String,
    #[record(rename = "Done")]
    done: bool,
    #[record(skip)]
    scratch: u32,
}

#[derive(Debug, Clone, Record)]
struct Wrapper<T> {
    inner: T,
}

#[derive(Debug, Clone, Record)]
struct Keyword {
    r#type: String,
}

#[derive(Debug, Clone, Record)]
struct Empty {}

fn task(title: &str, done: bool, scratch: u32) -> Task {
    Task {
        title: title.to_string(),
        done,
        scratch,
    }
}

// ============================================================================
// Field constants and lookup
// ============================================================================

#[test]
fn constants_hold_query_names() {
    assert_eq!(Task::TITLE, "title");
    assert_eq!(Task::DONE, "Done");
    assert_eq!(Keyword::TYPE, "type");
}

#[test]
fn field_lookup_returns_current_values() {
    let task = task("write", true, 9);
    assert_eq!(task.field("title"), Some(Value::from("write".to_string())));
    assert_eq!(task.field("Done"), Some(Value::from(true)));
    assert_eq!(task.field("done"), None);
    assert_eq!(task.field("scratch"), None);
    assert_eq!(task.field_names(), &["title", "Done"]);
}

#[test]
fn constants_drive_queries() {
    let tasks = vec![task("a", true, 0), task("b", false, 0), task("c", true, 0)];
    let titles = Query::from_slice(&tasks)
        .filter_field(Task::DONE)
        .select_field(Task::TITLE)
        .to_vec()
        .unwrap();
    assert_eq!(
        titles,
        vec![Value::from("a".to_string()), Value::from("c".to_string())]
    );
}

#[test]
fn generic_records() {
    let wrapped = Wrapper { inner: 5u8 };
    assert_eq!(wrapped.field(Wrapper::<u8>::INNER), Some(Value::from(5u8)));

    let nested = Wrapper {
        inner: task("deep", false, 0),
    };
    let inner = nested.field("inner").unwrap();
    assert_eq!(inner.get("title").unwrap(), Value::from("deep".to_string()));
}

#[test]
fn empty_record_has_no_fields() {
    let empty = Empty {};
    assert!(empty.field_names().is_empty());
    assert!(empty.shape().is_record());
    assert_eq!(Value::new(Empty {}), Value::new(Empty {}));
}

// ============================================================================
// Equality and hashing
// ============================================================================

#[test]
fn equality_ignores_skipped_fields() {
    assert_eq!(Value::new(task("a", true, 1)), Value::new(task("a", true, 2)));
    assert_ne!(Value::new(task("a", true, 1)), Value::new(task("a", false, 1)));
}

#[test]
fn distinct_on_records() {
    let tasks = vec![task("a", true, 1), task("a", true, 2), task("b", true, 3)];
    let unique = Query::from_slice(&tasks).widen().distinct().count().unwrap();
    assert_eq!(unique, 2);

    let set: HashSet<Value> = tasks.into_iter().map(Value::new).collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn different_record_types_never_equal() {
    let a = Wrapper { inner: 1u8 };
    let b = Wrapper { inner: 1u16 };
    assert!(!a.reflect_eq(&b));
    assert!(a.reflect_eq(&a.clone()));
}
