use crate::definition::{BlockDefinition, ParamValues};
use crate::tokenizer::{TOKEN_CLOSE, TOKEN_OPEN};
use serde_json::Value;
use std::fmt::Write;

/// Compact JSON for a parameter value, safe to place inside a token.
///
/// A `]` inside a string literal is written as `\u005d`, so the token text
/// never contains `]]`. Tokens carry scalars; a value holding an array would
/// need a structural `]` and is written as a string literal of its JSON.
pub fn encode_literal(value: &Value) -> String {
    if has_array(value) {
        return encode_literal(&Value::String(value.to_string()));
    }

    let json = value.to_string();
    if !json.contains(']') {
        return json;
    }

    let mut output = String::with_capacity(json.len() + 8);
    let mut in_string = false;
    let mut escaped = false;
    for c in json.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            } else if c == ']' {
                output.push_str("\\u005d");
                continue;
            }
        } else if c == '"' {
            in_string = true;
        }
        output.push(c);
    }
    output
}

fn has_array(value: &Value) -> bool {
    match value {
        Value::Array(_) => true,
        Value::Object(map) => map.values().any(has_array),
        _ => false,
    }
}

/// Serialize a block usage into its inline token form.
///
/// Declared parameters are emitted in the definition's order, followed by any
/// undeclared keys in key order. Only keys present in `values` are written, so
/// a token that omits parameters serializes back to the same text.
pub fn serialize_token(
    block_id: &str,
    values: &ParamValues,
    definition: Option<&BlockDefinition>,
) -> String {
    let mut output = String::with_capacity(TOKEN_OPEN.len() + block_id.len() + 2);
    output.push_str(TOKEN_OPEN);
    output.push_str(block_id);

    if let Some(def) = definition {
        for key in def.param_keys() {
            if let Some(value) = values.get(key) {
                let _ = write!(output, " {}={}", key, encode_literal(value));
            }
        }
        for (key, value) in values {
            if def.param(key).is_none() {
                let _ = write!(output, " {}={}", key, encode_literal(value));
            }
        }
    } else {
        for (key, value) in values {
            let _ = write!(output, " {}={}", key, encode_literal(value));
        }
    }

    output.push_str(TOKEN_CLOSE);
    output
}

/// Serialize a usage of `definition`
pub fn serialize(definition: &BlockDefinition, values: &ParamValues) -> String {
    serialize_token(&definition.id, values, Some(definition))
}
