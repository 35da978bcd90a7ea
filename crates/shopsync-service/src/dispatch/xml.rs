//! Key/value XML serialization of handler results.
//!
//! Objects map to elements named after their keys. A sibling key
//! `"<name> attr"` holds the attributes of element `<name>`; for array
//! values it may be an array of attribute objects matched by position.
//! Arrays repeat their element. `null` renders as an empty element and
//! booleans as `1`/`0`.

use std::fmt::Write;

use serde_json::{Map, Value};

const ATTR_SUFFIX: &str = " attr";

/// Render `value` below an XML declaration naming `encoding`.
pub fn serialize(value: &Value, encoding: &str) -> String {
    let mut out = format!("<?xml version=\"1.0\" encoding=\"{encoding}\"?>\n");
    match value {
        Value::Object(map) => write_children(&mut out, map, 0),
        other => out.push_str(&escape(&scalar_text(other))),
    }
    out
}

fn write_children(out: &mut String, map: &Map<String, Value>, depth: usize) {
    for (key, value) in map {
        if key.ends_with(ATTR_SUFFIX) {
            continue;
        }
        let attrs = map.get(&format!("{key}{ATTR_SUFFIX}"));
        match value {
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    let item_attrs = match attrs {
                        Some(Value::Array(list)) => list.get(i),
                        other => other,
                    };
                    write_element(out, key, item, item_attrs, depth);
                }
            }
            _ => write_element(out, key, value, attrs, depth),
        }
    }
}

fn write_element(out: &mut String, name: &str, value: &Value, attrs: Option<&Value>, depth: usize) {
    let indent = "\t".repeat(depth);
    let name = element_name(name);
    let _ = write!(out, "{indent}<{name}");
    if let Some(Value::Object(attrs)) = attrs {
        for (attr, attr_value) in attrs {
            let _ = write!(
                out,
                " {}=\"{}\"",
                element_name(attr),
                escape(&scalar_text(attr_value))
            );
        }
    }

    match value {
        Value::Object(children) => {
            out.push_str(">\n");
            write_children(out, children, depth + 1);
            let _ = writeln!(out, "{indent}</{name}>");
        }
        Value::Null => out.push_str("/>\n"),
        scalar => {
            let _ = writeln!(out, ">{}</{name}>", escape(&scalar_text(scalar)));
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}

/// Numeric keys are not valid element names.
fn element_name(key: &str) -> String {
    let cleaned: String = key
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') { c } else { '_' })
        .collect();
    match cleaned.chars().next() {
        Some(c) if c.is_alphabetic() || c == '_' => cleaned,
        _ => format!("_{cleaned}"),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_nested_with_attributes() {
        let value = json!({
            "kunde": {
                "cName": "Müller & Söhne",
                "nAktiv": true,
                "cFax": null,
            },
            "kunde attr": { "kKunde": 17 },
        });
        let xml = serialize(&value, "UTF-8");
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(xml.contains("<kunde kKunde=\"17\">\n"));
        assert!(xml.contains("\t<cName>Müller &amp; Söhne</cName>\n"));
        assert!(xml.contains("\t<nAktiv>1</nAktiv>\n"));
        assert!(xml.contains("\t<cFax/>\n"));
        assert!(xml.ends_with("</kunde>\n"));
        assert!(!xml.contains("attr"));
    }

    #[test]
    fn test_arrays_repeat_elements() {
        let value = json!({
            "id": [1, 2],
            "id attr": [{ "pos": "a" }, { "pos": "b" }],
        });
        let xml = serialize(&value, "windows-1252");
        assert!(xml.contains("<id pos=\"a\">1</id>\n<id pos=\"b\">2</id>\n"));
    }

    #[test]
    fn test_scalar_root_and_numeric_keys() {
        assert!(serialize(&json!("a<b"), "UTF-8").ends_with("a&lt;b"));
        let xml = serialize(&json!({ "0": "x" }), "UTF-8");
        assert!(xml.contains("<_0>x</_0>"));
    }
}
