use super::{named_children, write_escaped};
use crate::options::KvOptions;
use crate::{Error, KvDocument, KvNode, Result};

struct Kv1Writer {
    output: String,
    indent: String,
    escapes: bool,
    indent_level: usize,
}

pub(crate) fn write(document: &KvDocument, options: &KvOptions) -> Result<String> {
    let mut writer = Kv1Writer {
        output: String::with_capacity(256),
        indent: options.indent.unit(),
        escapes: options.has_escape_sequences,
        indent_level: 0,
    };
    writer.write_node(document.name(), document.value())?;
    Ok(writer.output)
}

impl Kv1Writer {
    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str(&self.indent);
        }
    }

    fn write_string(&mut self, text: &str) -> Result<()> {
        if self.escapes {
            write_escaped(&mut self.output, text);
            return Ok(());
        }
        if text.contains('"') {
            return Err(Error::unsupported_type(
                "strings containing '\"' need escape sequences enabled",
            ));
        }
        self.output.push('"');
        self.output.push_str(text);
        self.output.push('"');
        Ok(())
    }

    fn write_node(&mut self, name: &str, node: &KvNode) -> Result<()> {
        self.write_indent();
        self.write_string(name)?;

        if let KvNode::Value(value) = node {
            self.output.push_str("\t\t");
            self.write_string(&value.to_string())?;
            self.output.push('\n');
            return Ok(());
        }

        self.output.push('\n');
        self.write_indent();
        self.output.push_str("{\n");
        self.indent_level += 1;
        for (child_name, child) in named_children(node) {
            self.write_node(&child_name, child)?;
        }
        self.indent_level -= 1;
        self.write_indent();
        self.output.push_str("}\n");
        Ok(())
    }
}
