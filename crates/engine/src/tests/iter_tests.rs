use super::helpers::uncached;
use crate::*;
use tempfile::tempdir;

fn text(s: &str) -> Value {
    Value::Text(s.into())
}

#[test]
fn keys_follow_insertion_order() -> Result<()> {
    let dir = tempdir()?;
    let store = Store::open(dir.path().join("db"))?;

    store.set("charlie", "3")?;
    store.set("alpha", "1")?;
    store.set("bravo", "2")?;

    assert_eq!(store.keys(), vec!["charlie", "alpha", "bravo"]);
    Ok(())
}

#[test]
fn updating_a_key_keeps_its_position() -> Result<()> {
    let dir = tempdir()?;
    let store = Store::open(dir.path().join("db"))?;

    store.set("a", "1")?;
    store.set("b", "2")?;
    store.set("c", "3")?;
    store.set("b", "updated")?;

    assert_eq!(store.keys(), vec!["a", "b", "c"]);
    assert_eq!(store.get("b")?, Some(text("updated")));
    Ok(())
}

#[test]
fn delete_preserves_order_of_the_rest() -> Result<()> {
    let dir = tempdir()?;
    let store = Store::open(dir.path().join("db"))?;

    store.set("a", "1")?;
    store.set("b", "2")?;
    store.set("c", "3")?;
    store.set("d", "4")?;
    store.delete("b")?;

    assert_eq!(store.keys(), vec!["a", "c", "d"]);
    Ok(())
}

#[test]
fn deleted_then_reset_key_moves_to_the_end() -> Result<()> {
    let dir = tempdir()?;
    let store = Store::open(dir.path().join("db"))?;

    store.set("a", "1")?;
    store.set("b", "2")?;
    store.set("c", "3")?;
    store.delete("a")?;
    store.set("a", "again")?;

    assert_eq!(store.keys(), vec!["b", "c", "a"]);
    Ok(())
}

#[test]
fn values_and_entries_align_with_keys() -> Result<()> {
    let dir = tempdir()?;
    let store = Store::open(dir.path().join("db"))?;

    store.set("x", "10")?;
    store.set("y", "20")?;
    store.set("z", "30")?;

    assert_eq!(store.values()?, vec![text("10"), text("20"), text("30")]);
    assert_eq!(
        store.entries()?,
        vec![
            ("x".to_string(), text("10")),
            ("y".to_string(), text("20")),
            ("z".to_string(), text("30")),
        ]
    );
    Ok(())
}

#[test]
fn for_each_visits_every_pair_in_order() -> Result<()> {
    let dir = tempdir()?;
    let store = Store::open(dir.path().join("db"))?;

    store.set("one", "1")?;
    store.set("two", "2")?;
    store.set("three", "3")?;

    let mut seen = Vec::new();
    store.for_each(|key, value| {
        seen.push(format!("{}={}", key, value));
    })?;
    assert_eq!(seen, vec!["one=1", "two=2", "three=3"]);
    Ok(())
}

#[test]
fn uncached_iteration_reads_values_back() -> Result<()> {
    let dir = tempdir()?;
    let store = Store::open_with(dir.path().join("db"), uncached())?;

    store.set("a", "first")?;
    store.set("b", "second")?;
    store.set("a", "a value long enough to have been relocated meanwhile")?;

    assert_eq!(
        store.entries()?,
        vec![
            (
                "a".to_string(),
                text("a value long enough to have been relocated meanwhile")
            ),
            ("b".to_string(), text("second")),
        ]
    );
    Ok(())
}

#[test]
fn empty_store_iterates_nothing() -> Result<()> {
    let dir = tempdir()?;
    let store = Store::open(dir.path().join("db"))?;

    assert!(store.keys().is_empty());
    assert!(store.values()?.is_empty());
    assert!(store.entries()?.is_empty());

    let mut called = false;
    store.for_each(|_, _| called = true)?;
    assert!(!called);
    Ok(())
}

#[test]
fn iteration_after_reopen_follows_file_order() -> Result<()> {
    // Without relocations the scan meets blocks in insertion order, so the
    // rebuilt index iterates the same way the writing store did.
    let dir = tempdir()?;
    let path = dir.path().join("db");

    {
        let store = Store::open(&path)?;
        store.set("first", "1")?;
        store.set("second", "2")?;
        store.set("third", "3")?;
    }

    let store = Store::open(&path)?;
    assert_eq!(store.keys(), vec!["first", "second", "third"]);
    Ok(())
}
