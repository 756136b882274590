///! # CLI - CubbyKV Interactive Shell
///!
///! A REPL-style command-line interface for the CubbyKV store. Reads
///! commands from stdin, executes them against the engine, and prints
///! results to stdout. Designed for both interactive use and scripted
///! testing (pipe commands via stdin; the shell ends at end-of-input).
///!
///! ## Commands
///!
///! ```text
///! has key        Print yes/no for key presence
///! get key        Print the value or "<not found>"
///! set key value  Store the pair (value = rest of the line)
///! del key        Delete a key (also: delete)
///! clear          Drop every key and truncate the file
///! size           Print the number of live keys
///! keys           Print every key, one per line
///! vals           Print every value (also: values)
///! list           Print "key: value" pairs (also: l, entries)
///! ```
///!
///! Unknown commands print `Unknown command: <name>`; missing arguments
///! print `Syntax error`.
///!
///! ## Configuration
///!
///! The first positional argument is the database path (default
///! `./test.db`). Store options come from environment variables:
///!
///! ```text
///! CUBBY_BUFFER_VALUES     values are raw bytes      (default: "false")
///! CUBBY_IN_MEMORY_VALUES  cache values in the index (default: "true")
///! ```
///!
///! ## Example
///!
///! ```text
///! $ cargo run -p cli -- scratch.db
///! CubbyKV started (0 keys, path=scratch.db)
///! > set name Alice
///! ok
///! > get name
///! Alice
///! > has name
///! yes
///! > del name
///! ok
///! > get name
///! <not found>
///! ```

use anyhow::Result;
use engine::{Store, StoreOptions};
use std::io::{self, BufRead, Write};
use tracing_subscriber::{fmt, EnvFilter};

/// Reads a configuration value from the environment, falling back to `default`.
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(true).init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "./test.db".to_string());
    let buffer_values: bool = env_or("CUBBY_BUFFER_VALUES", "false").parse().unwrap_or(false);
    let in_memory_values: bool = env_or("CUBBY_IN_MEMORY_VALUES", "true").parse().unwrap_or(true);

    let store = Store::open_with(
        &path,
        StoreOptions {
            buffer_values,
            in_memory_values,
        },
    )?;

    println!(
        "CubbyKV started ({} keys, path={}, buffer_values={}, in_memory_values={})",
        store.len(),
        path,
        buffer_values,
        in_memory_values
    );
    println!("Commands: has key | get key | set key value | del key | clear");
    println!("          size | keys | vals | list");
    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        if let Some(cmd) = parts.next() {
            match cmd {
                "has" => match parts.next() {
                    Some(key) => println!("{}", if store.contains(key) { "yes" } else { "no" }),
                    None => println!("Syntax error"),
                },
                "get" => match parts.next() {
                    Some(key) => match store.get(key) {
                        Ok(Some(value)) => println!("{}", value),
                        Ok(None) => println!("<not found>"),
                        Err(e) => println!("ERR get failed: {}", e),
                    },
                    None => println!("Syntax error"),
                },
                "set" => {
                    if let Some(key) = parts.next() {
                        let value: String = parts.collect::<Vec<&str>>().join(" ");
                        if value.is_empty() {
                            println!("Syntax error");
                        } else {
                            match store.set(key, value.as_str()) {
                                Ok(()) => println!("ok"),
                                Err(e) => println!("ERR set failed: {}", e),
                            }
                        }
                    } else {
                        println!("Syntax error");
                    }
                }
                "del" | "delete" => match parts.next() {
                    Some(key) => match store.delete(key) {
                        Ok(()) => println!("ok"),
                        Err(e) => println!("ERR delete failed: {}", e),
                    },
                    None => println!("Syntax error"),
                },
                "clear" => match store.clear() {
                    Ok(()) => println!("ok"),
                    Err(e) => println!("ERR clear failed: {}", e),
                },
                "size" => println!("{}", store.len()),
                "keys" => {
                    for key in store.keys() {
                        println!("{}", key);
                    }
                }
                "vals" | "values" => match store.values() {
                    Ok(values) => {
                        for value in values {
                            println!("{}", value);
                        }
                    }
                    Err(e) => println!("ERR read failed: {}", e),
                },
                "l" | "list" | "entries" => match store.entries() {
                    Ok(entries) => {
                        for (key, value) in entries {
                            println!("{}: {}", key, value);
                        }
                    }
                    Err(e) => println!("ERR read failed: {}", e),
                },
                other => println!("Unknown command: {}", other),
            }
        }

        print!("> ");
        io::stdout().flush().ok();
    }

    Ok(())
}
