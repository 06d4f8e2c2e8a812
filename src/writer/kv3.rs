use super::write_escaped;
use crate::options::KvOptions;
use crate::{Error, KvDocument, KvMap, KvNode, KvValue, Result};

/// Header written in front of every generic KV3 text document.
pub(crate) const KV3_HEADER: &str = "<!-- kv3 encoding:text:version{e21c7f3c-8a33-41c5-9977-a76d3a32aa0d} format:generic:version{7412167c-06e9-4698-aff2-e63eb59037e7} -->";

struct Kv3Writer {
    output: String,
    indent: String,
    indent_level: usize,
}

/// Writes the document's root object. The document name is not part of KV3
/// text and is dropped.
pub(crate) fn write(document: &KvDocument, options: &KvOptions) -> Result<String> {
    let root = document
        .value()
        .as_object()
        .ok_or_else(|| Error::unsupported_type("KV3 documents need an object at the root"))?;

    let mut writer = Kv3Writer {
        output: String::with_capacity(256),
        indent: options.indent.unit(),
        indent_level: 0,
    };
    writer.output.push_str(KV3_HEADER);
    writer.output.push('\n');
    writer.write_object(root);
    writer.output.push('\n');
    Ok(writer.output)
}

/// Keys made only of ASCII alphanumerics, `_` and `.` are written bare.
fn is_bare_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Renders a float so that it reads back as a float.
fn format_float(value: f32) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        // Debug always keeps a '.' or an exponent
        format!("{:?}", value)
    }
}

impl Kv3Writer {
    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str(&self.indent);
        }
    }

    fn write_object(&mut self, map: &KvMap) {
        self.output.push_str("{\n");
        self.indent_level += 1;
        for (key, node) in map {
            self.write_indent();
            if is_bare_key(key) {
                self.output.push_str(key);
            } else {
                write_escaped(&mut self.output, key);
            }
            self.output.push_str(" = ");
            self.write_node(node);
            self.output.push('\n');
        }
        self.indent_level -= 1;
        self.write_indent();
        self.output.push('}');
    }

    fn write_array(&mut self, items: &[KvNode]) {
        if items.is_empty() {
            self.output.push_str("[]");
            return;
        }

        self.output.push_str("[\n");
        self.indent_level += 1;
        for item in items {
            self.write_indent();
            self.write_node(item);
            self.output.push_str(",\n");
        }
        self.indent_level -= 1;
        self.write_indent();
        self.output.push(']');
    }

    fn write_node(&mut self, node: &KvNode) {
        match node {
            KvNode::Value(value) => self.write_value(value),
            KvNode::Object(map) => self.write_object(map),
            KvNode::Array(items) => self.write_array(items),
        }
    }

    fn write_value(&mut self, value: &KvValue) {
        match value {
            KvValue::String(s) => write_escaped(&mut self.output, s),
            KvValue::Int32(i) | KvValue::Pointer(i) => self.output.push_str(&i.to_string()),
            // a bare literal outside i32 would read back as a float
            KvValue::Int64(i) if i32::try_from(*i).is_err() => {
                write_escaped(&mut self.output, &i.to_string())
            }
            KvValue::Int64(i) => self.output.push_str(&i.to_string()),
            KvValue::UInt64(u) => self.output.push_str(&format!("0x{:016X}", u)),
            KvValue::Float(f) => self.output.push_str(&format_float(*f)),
        }
    }
}
