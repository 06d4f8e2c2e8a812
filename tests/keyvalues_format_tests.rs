//! Format-level behavior of the KV1, KV3 and binary readers and writers.

use serde_keyvalues::{
    kv, parse_document, parse_document_slice, read_with_listener, write_document, Error, Event,
    EventRecorder, KvDocument, KvFormat, KvNode, KvOptions, KvValue, ParseErrorKind,
};

const KV3_HEADER: &str = "<!-- kv3 encoding:text:version{e21c7f3c-8a33-41c5-9977-a76d3a32aa0d} format:generic:version{7412167c-06e9-4698-aff2-e63eb59037e7} -->";

fn kv1() -> KvOptions {
    KvOptions::new().with_conditions(["WIN32"])
}

fn kv3() -> KvOptions {
    KvOptions::new().with_format(KvFormat::KeyValues3Text)
}

fn kv3_doc(body: &str) -> String {
    format!("{}\n{}", KV3_HEADER, body)
}

fn events(text: &str, options: &KvOptions) -> Vec<Event> {
    let mut recorder = EventRecorder::new();
    read_with_listener(text, options, &mut recorder).unwrap();
    recorder.into_events()
}

fn error_kind(text: &str, options: &KvOptions) -> ParseErrorKind {
    match parse_document(text, options) {
        Err(Error::Parse { cause, .. }) => cause,
        other => panic!("expected a parse error, got {:?}", other),
    }
}

fn value(node: &KvNode, key: &str) -> KvValue {
    node.get(key)
        .and_then(KvNode::as_value)
        .cloned()
        .unwrap_or_else(|| panic!("missing value for {}", key))
}

// KV1 text

#[test]
fn test_kv1_end_to_end() {
    let doc = parse_document("\"root\"\n{\n\t\"key\"\t\"value\"\n}\n", &kv1()).unwrap();
    assert_eq!(doc.name(), "root");
    let root = doc.value().as_object().unwrap();
    assert_eq!(root.len(), 1);
    assert_eq!(value(doc.value(), "key"), KvValue::String("value".to_string()));
}

#[test]
fn test_kv1_values_are_never_coerced() {
    let doc = parse_document("root { a 42 b \"0x0000000000000001\" c 1.5 }", &kv1()).unwrap();
    assert_eq!(value(doc.value(), "a"), KvValue::from("42"));
    assert_eq!(value(doc.value(), "b"), KvValue::from("0x0000000000000001"));
    assert_eq!(value(doc.value(), "c"), KvValue::from("1.5"));
}

#[test]
fn test_kv1_truncated_after_brace() {
    assert!(matches!(
        error_kind("root\n{\n", &kv1()),
        ParseErrorKind::UnexpectedEndOfInput { .. }
    ));
}

#[test]
fn test_kv1_truncated_inside_string() {
    assert!(matches!(
        error_kind("root\n{\n\"key\" \"val", &kv1()),
        ParseErrorKind::UnexpectedEndOfInput { .. }
    ));
}

#[test]
fn test_kv1_mismatched_close() {
    let kind = error_kind("root\n{\n\"a\" \"b\"\n]\n", &kv1());
    match kind {
        ParseErrorKind::InvalidState { position, .. } => assert_eq!(position.line, 4),
        other => panic!("expected InvalidState, got {:?}", other),
    }
}

#[test]
fn test_kv1_siblings_share_parent() {
    let doc = parse_document("root { a 1 b 2 child { c 3 } d 4 }", &kv1()).unwrap();
    let keys: Vec<&String> = doc.value().as_object().unwrap().keys().collect();
    assert_eq!(keys, ["a", "b", "child", "d"]);
}

#[test]
fn test_kv1_root_level_pair() {
    let doc = parse_document("\"key\" \"value\"", &kv1()).unwrap();
    assert_eq!(doc.name(), "key");
    assert_eq!(doc.value().as_str(), Some("value"));
}

#[test]
fn test_kv1_comments_and_unknown_escape() {
    let doc = parse_document("// header\nroot // trailing\n{\n// inside\nk v\n}", &kv1()).unwrap();
    assert_eq!(value(doc.value(), "k"), KvValue::from("v"));

    assert!(matches!(
        error_kind("root { k \"\\q\" }", &kv1()),
        ParseErrorKind::Syntax { .. }
    ));
    let raw = kv1().with_escape_sequences(false);
    let doc = parse_document("root { k \"C:\\q\" }", &raw).unwrap();
    assert_eq!(value(doc.value(), "k"), KvValue::from("C:\\q"));
}

#[test]
fn test_kv1_duplicate_keys_last_wins() {
    let doc = parse_document("root { a 1 b 2 a 3 }", &kv1()).unwrap();
    let entries: Vec<(&str, &str)> = doc
        .value()
        .as_object()
        .unwrap()
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str().unwrap()))
        .collect();
    assert_eq!(entries, [("a", "3"), ("b", "2")]);
}

#[test]
fn test_kv1_conditional_values() {
    let text = "root {\n\
        \"title\" \"win\" [$WIN32]\n\
        \"title\" \"mac\" [$OSX]\n\
        \"only_mac\" \"yes\" [$OSX]\n\
        \"not_mac\" \"yes\" [!$OSX]\n\
        \"either\" \"yes\" [$OSX || $WIN32]\n\
    }";
    let doc = parse_document(text, &kv1()).unwrap();
    assert_eq!(value(doc.value(), "title"), KvValue::from("win"));
    assert!(doc.value().get("only_mac").is_none());
    assert_eq!(value(doc.value(), "not_mac"), KvValue::from("yes"));
    assert_eq!(value(doc.value(), "either"), KvValue::from("yes"));
}

#[test]
fn test_kv1_conditional_objects() {
    let text = "root { kept [$WIN32] { a 1 } dropped [$X360] { b { c 2 } } after 3 }";
    let doc = parse_document(text, &kv1()).unwrap();
    assert_eq!(value(doc.value().get("kept").unwrap(), "a"), KvValue::from("1"));
    assert!(doc.value().get("dropped").is_none());
    assert_eq!(value(doc.value(), "after"), KvValue::from("3"));
}

#[test]
fn test_kv1_bad_conditional() {
    assert!(matches!(
        error_kind("root { a b [WIN32] }", &kv1()),
        ParseErrorKind::Syntax { .. }
    ));
    assert!(matches!(
        error_kind("root { [$WIN32] }", &kv1()),
        ParseErrorKind::InvalidState { .. }
    ));
}

#[test]
fn test_kv1_excluded_root_is_a_parse_error() {
    for text in [
        "\"root\" [$X360] { \"a\" \"b\" }",
        "\"key\" \"value\" [$X360]",
    ] {
        assert!(matches!(
            error_kind(text, &kv1()),
            ParseErrorKind::Syntax { .. }
        ));
    }
}

#[test]
fn test_kv1_alternate_roots() {
    let text = "\"root\" [$X360] { a 1 }\n\"root\" [!$X360] { a 2 }";
    let doc = parse_document(text, &kv1()).unwrap();
    assert_eq!(doc.name(), "root");
    assert_eq!(value(doc.value(), "a"), KvValue::from("2"));
}

#[test]
fn test_kv1_nesting_limit() {
    let deep = "a {".repeat(100_000);
    let err = parse_document(&deep, &kv1()).unwrap_err();
    assert_eq!(err.to_string(), "Maximum nesting depth exceeded.");
    assert!(matches!(err.kind(), Some(ParseErrorKind::Syntax { .. })));

    let options = kv1().with_max_depth(2);
    assert!(parse_document("root { child { a b } }", &options).is_ok());
    assert!(parse_document("root { child { grandchild { } } }", &options).is_err());
}

// KV3 text

#[test]
fn test_kv3_end_to_end() {
    let text = kv3_doc("{\n\tkey = \"value\"\n\tnums = [1, 2, 3]\n}\n");
    let doc = parse_document(&text, &kv3()).unwrap();
    assert_eq!(doc.name(), "root");
    assert_eq!(value(doc.value(), "key"), KvValue::from("value"));

    let nums = doc.value().get("nums").and_then(KvNode::as_array).unwrap();
    let nums: Vec<&KvValue> = nums.iter().filter_map(KvNode::as_value).collect();
    assert_eq!(
        nums,
        [&KvValue::Int32(1), &KvValue::Int32(2), &KvValue::Int32(3)]
    );
}

#[test]
fn test_kv3_literal_coercion() {
    let text = kv3_doc(
        "{ hex = 0x0000000000000001 int = 42 neg = -7 flt = 42.5 exp = 1e3 \
         big = 3000000000 word = abc quoted = \"42\" nan = NaN inf = -Infinity }",
    );
    let doc = parse_document(&text, &kv3()).unwrap();
    let root = doc.value();
    assert_eq!(value(root, "hex"), KvValue::UInt64(1));
    assert_eq!(value(root, "int"), KvValue::Int32(42));
    assert_eq!(value(root, "neg"), KvValue::Int32(-7));
    assert_eq!(value(root, "flt"), KvValue::Float(42.5));
    assert_eq!(value(root, "exp"), KvValue::Float(1000.0));
    assert_eq!(value(root, "big"), KvValue::Float(3_000_000_000.0));
    assert_eq!(value(root, "word"), KvValue::from("abc"));
    assert_eq!(value(root, "quoted"), KvValue::from("42"));
    assert!(matches!(value(root, "nan"), KvValue::Float(f) if f.is_nan()));
    assert_eq!(value(root, "inf"), KvValue::Float(f32::NEG_INFINITY));
}

#[test]
fn test_kv3_flagged_values() {
    let text = kv3_doc(
        "{\n\tmodel = resource:\"models/dog.vmdl\"\n\tsound = soundevent:\"Dog.Bark\"\n\
         \tcount = 1\n\tparts = [ resource:\"a.vmdl\", 2 ]\n}",
    );
    let doc = parse_document(&text, &kv3()).unwrap();
    assert_eq!(value(doc.value(), "model"), KvValue::from("models/dog.vmdl"));
    assert_eq!(value(doc.value(), "sound"), KvValue::from("Dog.Bark"));
    assert_eq!(value(doc.value(), "count"), KvValue::Int32(1));
    assert_eq!(
        doc.value().get("parts"),
        Some(&KvNode::Array(vec![KvNode::from("a.vmdl"), KvNode::from(2)]))
    );

    let inline = parse_document("{ a = resource:\"x.vmdl\" }", &kv3()).unwrap();
    assert_eq!(value(inline.value(), "a"), KvValue::from("x.vmdl"));
}

#[test]
fn test_kv3_nesting_limit() {
    let objects = format!("{{ {}", "a = { ".repeat(100_000));
    let err = parse_document(&objects, &kv3()).unwrap_err();
    assert_eq!(err.to_string(), "Maximum nesting depth exceeded.");

    let arrays = format!("{{ a = {}", "[".repeat(100_000));
    assert!(matches!(
        error_kind(&arrays, &kv3()),
        ParseErrorKind::Syntax { .. }
    ));

    let options = kv3().with_max_depth(2);
    assert!(parse_document("{ a = { b = 1 } }", &options).is_ok());
    assert!(parse_document("{ a = { b = [] } }", &options).is_err());
}

#[test]
fn test_kv3_braceless_root() {
    let doc = parse_document(&kv3_doc("a = 1\nb = 2\n"), &kv3()).unwrap();
    assert_eq!(doc.value().as_object().map(|m| m.len()), Some(2));
}

#[test]
fn test_kv3_nested_arrays_and_objects() {
    let text = kv3_doc("{ grid = [[1, 2], [3], []] items = [{ id = 1 }, { id = 2 },] }");
    let doc = parse_document(&text, &kv3()).unwrap();
    let grid = doc.value().get("grid").and_then(KvNode::as_array).unwrap();
    assert_eq!(grid.len(), 3);
    assert_eq!(grid[0], kv!([1, 2]));
    assert_eq!(grid[2], kv!([]));

    let items = doc.value().get("items").and_then(KvNode::as_array).unwrap();
    assert_eq!(items[1], kv!({ "id": 2 }));
}

#[test]
fn test_kv3_comments_and_multiline_strings() {
    let text = kv3_doc(
        "{\n// line\n/* block */ a = 1 // after\ndesc = \"\"\"\nline one\nline two\n\"\"\"\n}",
    );
    let doc = parse_document(&text, &kv3()).unwrap();
    assert_eq!(value(doc.value(), "a"), KvValue::Int32(1));
    assert_eq!(value(doc.value(), "desc"), KvValue::from("line one\nline two"));
}

#[test]
fn test_kv3_missing_separator_in_array() {
    assert!(matches!(
        error_kind(&kv3_doc("{ a = [1 2] }"), &kv3()),
        ParseErrorKind::InvalidState { .. }
    ));
}

#[test]
fn test_kv3_truncation() {
    for text in ["{", "{ a = ", "{ a = [1,", "{ a = { b = 1 }"] {
        assert!(
            matches!(
                error_kind(&kv3_doc(text), &kv3()),
                ParseErrorKind::UnexpectedEndOfInput { .. }
            ),
            "{}",
            text
        );
    }
    assert!(matches!(
        error_kind("", &kv3()),
        ParseErrorKind::UnexpectedEndOfInput { .. }
    ));
}

#[test]
fn test_kv3_structural_errors() {
    for text in ["{ = 1 }", "{ a 1 }", "{ a = ] }", "a = 1 }"] {
        assert!(
            matches!(
                error_kind(&kv3_doc(text), &kv3()),
                ParseErrorKind::InvalidState { .. }
            ),
            "{}",
            text
        );
    }
}

#[test]
fn test_depth_consistency() {
    let kv3_text = kv3_doc("{ a = { b = [1, { c = [] }] } d = [[[]]] }");
    let kv1_text = "root { a { b { c 1 } } d { } }";

    for recorded in [events(&kv3_text, &kv3()), events(kv1_text, &kv1())] {
        let mut depth: i64 = 0;
        let mut objects = (0, 0);
        let mut arrays = (0, 0);
        for event in &recorded {
            match event {
                Event::ObjectStart(_) => {
                    objects.0 += 1;
                    depth += 1;
                }
                Event::ObjectEnd => {
                    objects.1 += 1;
                    depth -= 1;
                }
                Event::ArrayStart(_) => {
                    arrays.0 += 1;
                    depth += 1;
                }
                Event::ArrayEnd => {
                    arrays.1 += 1;
                    depth -= 1;
                }
                _ => {}
            }
            assert!(depth >= 0);
        }
        assert_eq!(depth, 0);
        assert_eq!(objects.0, objects.1);
        assert_eq!(arrays.0, arrays.1);
    }
}

#[test]
fn test_error_messages_name_the_position() {
    let err = parse_document("root\n{\n\"a\" \"b\"\n]\n", &kv1()).unwrap_err();
    let cause = std::error::Error::source(&err).unwrap().to_string();
    assert!(cause.contains("line 4, column 1"), "{}", cause);
}

// Writers and round trips

#[test]
fn test_kv3_write_then_read() {
    let doc = KvDocument::new(
        "root",
        kv!({
            "name": "crowbar",
            "damage": 25,
            "spread": 0.25,
            "id": 18446744073709551615u64,
            "tags": ["melee", "starter"],
            "weird key": { "nested": [] }
        }),
    );
    let bytes = write_document(&doc, &kv3()).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.starts_with(KV3_HEADER));
    assert!(text.contains("id = 0xFFFFFFFFFFFFFFFF"));

    let back = parse_document(&text, &kv3()).unwrap();
    assert_eq!(back, doc);
}

#[test]
fn test_kv1_write_then_read() {
    let doc = parse_document("root { a \"x\\ty\" b { c \"quote \\\"d\\\"\" } }", &kv1()).unwrap();
    let bytes = write_document(&doc, &kv1()).unwrap();
    let back = parse_document(&String::from_utf8(bytes).unwrap(), &kv1()).unwrap();
    assert_eq!(back, doc);
}

#[test]
fn test_binary_write_then_read() {
    let options = KvOptions::new().with_format(KvFormat::KeyValues1Binary);
    let mut map = serde_keyvalues::KvMap::new();
    map.insert("s".to_string(), KvNode::from("text"));
    map.insert("i".to_string(), KvNode::from(-5));
    map.insert("f".to_string(), KvNode::from(0.5f32));
    map.insert("u".to_string(), KvNode::from(u64::MAX));
    map.insert("l".to_string(), KvNode::from(i64::MIN));
    map.insert("p".to_string(), KvNode::Value(KvValue::Pointer(64)));
    map.insert("child".to_string(), kv!({ "x": "y" }));
    let doc = KvDocument::new("root", KvNode::Object(map));

    let bytes = write_document(&doc, &options).unwrap();
    let back = parse_document_slice(&bytes, &options).unwrap();
    assert_eq!(back, doc);
}

#[test]
fn test_binary_truncation_reports_offset() {
    let options = KvOptions::new().with_format(KvFormat::KeyValues1Binary);
    let doc = KvDocument::new("root", kv!({ "a": 1 }));
    let bytes = write_document(&doc, &options).unwrap();

    match parse_document_slice(&bytes[..bytes.len() - 1], &options) {
        Err(Error::Parse {
            cause: ParseErrorKind::UnexpectedEndOfInput { position },
            ..
        }) => assert_eq!(position.line, 0),
        other => panic!("expected truncation error, got {:?}", other),
    }
}

#[test]
fn test_binary_nesting_limit() {
    let options = KvOptions::new().with_format(KvFormat::KeyValues1Binary);
    let mut bytes = Vec::new();
    for _ in 0..200_000 {
        bytes.push(0);
        bytes.extend_from_slice(b"a\0");
    }

    match parse_document_slice(&bytes, &options) {
        Err(Error::Parse {
            cause: ParseErrorKind::Syntax { position, .. },
            message,
        }) => {
            assert_eq!(message, "Maximum nesting depth exceeded.");
            assert_eq!(position.line, 0);
        }
        other => panic!("expected depth error, got {:?}", other),
    }
}

#[test]
fn test_binary_requires_bytes() {
    let options = KvOptions::new().with_format(KvFormat::KeyValues1Binary);
    assert!(matches!(
        parse_document("root {}", &options),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn test_invalid_options_rejected_before_parsing() {
    let options = KvOptions::new().with_conditions(["$WIN32"]);
    assert!(matches!(
        parse_document("root { }", &options),
        Err(Error::InvalidArgument(_))
    ));
}
