//! Basic usage example for zodiac-schema

use serde_json::json;
use zodiac_schema::prelude::*;

fn main() {
    let user = ObjectSchema::new()
        .field("name", string().min(2))
        .field("email", string().email())
        .field("age", int().gte(0).optional())
        .field("role", enumeration(["admin", "user"]).default("user"));

    match user.parse(json!({"name": "alice", "email": "alice@example.com"})) {
        Ok(parsed) => println!("✓ parsed: {}", Value::Object(parsed)),
        Err(e) => println!("✗ Error: {e}"),
    }

    match user.parse(json!({"name": "a", "email": "nope", "age": -1})) {
        Ok(_) => println!("✓ unexpectedly valid"),
        Err(e) => {
            println!("✗ invalid:");
            for issue in e.issues() {
                println!("  {}: {}", issue.path_string(), issue.message);
            }
            println!("{}", e.to_json());
        }
    }

    let tree = recursive(|this| {
        ObjectSchema::new()
            .field("label", string())
            .field("children", array(this).optional())
    });
    let parsed = tree.parse(json!({"label": "root", "children": [{"label": "leaf"}]}));
    println!("\nrecursive parse ok: {}", parsed.is_ok());
}
