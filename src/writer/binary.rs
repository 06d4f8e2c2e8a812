use super::named_children;
use crate::reader::node_type;
use crate::{Error, KvDocument, KvNode, KvValue, Result};

pub(crate) fn write(document: &KvDocument) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(256);
    write_node(&mut output, document.name(), document.value())?;
    Ok(output)
}

fn write_cstring(output: &mut Vec<u8>, text: &str) -> Result<()> {
    if text.as_bytes().contains(&0) {
        return Err(Error::invalid_argument(
            "binary KeyValues strings cannot contain NUL",
        ));
    }
    output.extend_from_slice(text.as_bytes());
    output.push(0);
    Ok(())
}

fn write_node(output: &mut Vec<u8>, name: &str, node: &KvNode) -> Result<()> {
    let value = match node {
        KvNode::Value(value) => value,
        container => {
            output.push(node_type::OBJECT);
            write_cstring(output, name)?;
            for (child_name, child) in named_children(container) {
                write_node(output, &child_name, child)?;
            }
            output.push(node_type::END);
            return Ok(());
        }
    };

    let kind = match value {
        KvValue::String(_) => node_type::STRING,
        KvValue::Int32(_) => node_type::INT32,
        KvValue::Float(_) => node_type::FLOAT32,
        KvValue::Pointer(_) => node_type::POINTER,
        KvValue::UInt64(_) => node_type::UINT64,
        KvValue::Int64(_) => node_type::INT64,
    };
    output.push(kind);
    write_cstring(output, name)?;

    match value {
        KvValue::String(s) => write_cstring(output, s)?,
        KvValue::Int32(i) | KvValue::Pointer(i) => output.extend_from_slice(&i.to_le_bytes()),
        KvValue::Float(f) => output.extend_from_slice(&f.to_le_bytes()),
        KvValue::UInt64(u) => output.extend_from_slice(&u.to_le_bytes()),
        KvValue::Int64(i) => output.extend_from_slice(&i.to_le_bytes()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv;

    #[test]
    fn test_layout() {
        let doc = KvDocument::new("r", kv!({ "s": "v", "n": 1 }));
        assert_eq!(
            write(&doc).unwrap(),
            vec![
                node_type::OBJECT, b'r', 0,
                node_type::STRING, b's', 0, b'v', 0,
                node_type::INT32, b'n', 0, 1, 0, 0, 0,
                node_type::END,
            ]
        );
    }

    #[test]
    fn test_rejects_nul() {
        let doc = KvDocument::new("r", kv!({ "s": "a\0b" }));
        assert!(matches!(write(&doc), Err(Error::InvalidArgument(_))));
    }
}
