use super::helpers::{buffered, uncached};
use crate::*;
use tempfile::tempdir;

#[test]
fn get_missing_key() -> Result<()> {
    let dir = tempdir()?;
    let store = Store::open(dir.path().join("db"))?;

    assert_eq!(store.get("nope")?, None);
    assert!(!store.contains("nope"));
    Ok(())
}

#[test]
fn contains_never_touches_the_file() -> Result<()> {
    let dir = tempdir()?;
    let store = Store::open_with(dir.path().join("db"), uncached())?;

    store.set("k", "v")?;
    assert!(store.contains("k"));
    assert!(!store.contains("K"));
    Ok(())
}

#[test]
fn len_counts_live_keys() -> Result<()> {
    let dir = tempdir()?;
    let store = Store::open(dir.path().join("db"))?;

    assert!(store.is_empty());
    store.set("a", "1")?;
    store.set("b", "2")?;
    store.set("a", "updated")?;
    assert_eq!(store.len(), 2);

    store.delete("b")?;
    assert_eq!(store.len(), 1);
    assert!(!store.is_empty());
    Ok(())
}

#[test]
fn uncached_get_reads_value_back() -> Result<()> {
    let dir = tempdir()?;
    let store = Store::open_with(dir.path().join("db"), uncached())?;

    store.set("k", "stored on disk")?;
    assert_eq!(store.get("k")?, Some(Value::Text("stored on disk".into())));
    assert_eq!(store.get("missing")?, None);
    Ok(())
}

#[test]
fn uncached_get_after_inplace_update() -> Result<()> {
    let dir = tempdir()?;
    let store = Store::open_with(dir.path().join("db"), uncached())?;

    store.set("k", "first")?;
    store.set("k", "again")?;
    assert_eq!(store.get("k")?, Some(Value::Text("again".into())));
    Ok(())
}

#[test]
fn uncached_get_after_relocation() -> Result<()> {
    let dir = tempdir()?;
    let store = Store::open_with(dir.path().join("db"), uncached())?;

    store.set("k", "tiny")?;
    let long = "a replacement value large enough to force a move";
    store.set("k", long)?;
    assert_eq!(store.get("k")?, Some(Value::Text(long.into())));
    Ok(())
}

#[test]
fn uncached_buffered_get() -> Result<()> {
    let dir = tempdir()?;
    let opts = StoreOptions {
        buffer_values: true,
        in_memory_values: false,
    };
    let store = Store::open_with(dir.path().join("db"), opts)?;

    let payload = vec![0xDEu8, 0xAD, 0xBE, 0xEF];
    store.set("k", payload.clone())?;
    assert_eq!(store.get("k")?, Some(Value::Bytes(payload)));
    Ok(())
}

#[test]
fn buffered_store_returns_bytes() -> Result<()> {
    let dir = tempdir()?;
    let store = Store::open_with(dir.path().join("db"), buffered())?;

    let payload = vec![0u8, 255, 128, 7];
    store.set("k", payload.clone())?;
    assert_eq!(store.get("k")?, Some(Value::Bytes(payload)));
    Ok(())
}

#[test]
fn empty_value_roundtrip() -> Result<()> {
    let dir = tempdir()?;
    let store = Store::open(dir.path().join("db"))?;

    store.set("empty", "")?;
    assert_eq!(store.get("empty")?, Some(Value::Text(String::new())));

    let store = Store::open_with(dir.path().join("db2"), uncached())?;
    store.set("empty", "")?;
    assert_eq!(store.get("empty")?, Some(Value::Text(String::new())));
    Ok(())
}

#[test]
fn debug_output_summarizes_state() -> Result<()> {
    let dir = tempdir()?;
    let store = Store::open(dir.path().join("db"))?;
    store.set("k", "v")?;

    let debug = format!("{:?}", store);
    assert!(debug.contains("Store"));
    assert!(debug.contains("entries: 1"));
    Ok(())
}
