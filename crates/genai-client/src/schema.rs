//! Response schema builders (OpenAPI subset used by `responseSchema`)

use serde_json::{json, Map, Value};

/// A number field with a description
pub fn number(description: &str) -> Value {
    json!({ "type": "NUMBER", "description": description })
}

/// A string field with a description
pub fn string(description: &str) -> Value {
    json!({ "type": "STRING", "description": description })
}

/// A string field restricted to the given values
pub fn string_enum(description: &str, values: &[&str]) -> Value {
    json!({ "type": "STRING", "description": description, "enum": values })
}

/// An object whose listed properties are all required
pub fn object(properties: &[(&str, Value)]) -> Value {
    let mut props = Map::new();
    for (name, schema) in properties {
        props.insert((*name).to_string(), schema.clone());
    }
    let required: Vec<&str> = properties.iter().map(|(name, _)| *name).collect();

    json!({
        "type": "OBJECT",
        "properties": Value::Object(props),
        "required": required,
    })
}
