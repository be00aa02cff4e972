//! Serializer for the OpenStep property-list text format.

use super::value::{Dict, Value};

const HEADER: &str = "// !$*UTF8*$!";

/// Serialize a document, including the UTF-8 marker line.
pub fn to_string(root: &Value) -> String {
    let mut out = String::with_capacity(64 * 1024);
    out.push_str(HEADER);
    out.push('\n');
    write_value(&mut out, root, 0);
    out.push('\n');
    out
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push_str("(\n");
            for item in items {
                indent(out, depth + 1);
                write_value(out, item, depth + 1);
                out.push_str(",\n");
            }
            indent(out, depth);
            out.push(')');
        }
        Value::Dict(dict) => write_dict(out, dict, depth),
    }
}

fn write_dict(out: &mut String, dict: &Dict, depth: usize) {
    out.push_str("{\n");
    for (key, value) in dict.iter() {
        indent(out, depth + 1);
        write_string(out, key);
        out.push_str(" = ");
        write_value(out, value, depth + 1);
        out.push_str(";\n");
    }
    indent(out, depth);
    out.push('}');
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}

/// Whether `s` must be quoted to read back as the same string.
fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s.contains("//")
        || s.contains("/*")
        || !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '/' | ':' | '.'))
}

fn write_string(out: &mut String, s: &str) {
    if !needs_quotes(s) {
        out.push_str(s);
        return;
    }

    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
}
