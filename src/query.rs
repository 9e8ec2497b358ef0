//! Form encoding with bracketed keys, as used by batch commands
//! and by the form posts the portal sends to event handlers.

use serde_json::{Map, Value};
use url::form_urlencoded;

/// Encode a JSON value as a bracketed query string.
///
/// Nested objects and arrays become `key[sub][0]=value`, booleans are
/// written as `1`/`0` and nulls are skipped.
pub fn build_query(value: &Value) -> String {
    let mut pairs: Vec<(String, String)> = Vec::new();

    match value {
        Value::Object(map) => {
            for (key, item) in map {
                flatten(key.clone(), item, &mut pairs);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten(index.to_string(), item, &mut pairs);
            }
        }
        _ => {}
    }

    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

fn flatten(prefix: String, value: &Value, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => pairs.push((prefix, if *b { "1" } else { "0" }.to_string())),
        Value::Number(n) => pairs.push((prefix, n.to_string())),
        Value::String(s) => pairs.push((prefix, s.clone())),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten(format!("{}[{}]", prefix, index), item, pairs);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                flatten(format!("{}[{}]", prefix, key), item, pairs);
            }
        }
    }
}

/// Decode a bracketed form body into nested JSON objects.
///
/// `a[b]=1` yields `{"a": {"b": "1"}}` and `a[]=x&a[]=y` yields
/// `{"a": ["x", "y"]}`. All scalar values stay strings.
pub fn parse_query(input: &str) -> Value {
    let mut root = Map::new();

    for (key, value) in form_urlencoded::parse(input.trim().as_bytes()) {
        let segments = split_key(&key);
        if segments.is_empty() {
            continue;
        }
        insert(&mut root, &segments, Value::String(value.into_owned()));
    }

    Value::Object(root)
}

fn split_key(key: &str) -> Vec<String> {
    let (head, mut rest) = match key.find('[') {
        Some(pos) if pos > 0 => (&key[..pos], &key[pos..]),
        _ => return if key.is_empty() { Vec::new() } else { vec![key.to_string()] },
    };

    let mut segments = vec![head.to_string()];
    while let Some(stripped) = rest.strip_prefix('[') {
        match stripped.find(']') {
            Some(end) => {
                segments.push(stripped[..end].to_string());
                rest = &stripped[end + 1..];
            }
            None => break,
        }
    }
    segments
}

fn insert(map: &mut Map<String, Value>, segments: &[String], value: Value) {
    let (first, rest) = match segments.split_first() {
        Some(split) => split,
        None => return,
    };

    if rest.is_empty() {
        map.insert(first.clone(), value);
        return;
    }

    let appends = rest[0].is_empty();
    let slot = map.entry(first.clone()).or_insert_with(|| {
        if appends {
            Value::Array(Vec::new())
        } else {
            Value::Object(Map::new())
        }
    });

    insert_into(slot, rest, value);
}

fn insert_into(slot: &mut Value, segments: &[String], value: Value) {
    if segments[0].is_empty() {
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
        if let Value::Array(items) = slot {
            if segments.len() == 1 {
                items.push(value);
            } else {
                let mut nested = Value::Object(Map::new());
                insert_into_object(&mut nested, &segments[1..], value);
                items.push(nested);
            }
        }
        return;
    }

    insert_into_object(slot, segments, value);
}

fn insert_into_object(slot: &mut Value, segments: &[String], value: Value) {
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(map) = slot {
        insert(map, segments, value);
    }
}
