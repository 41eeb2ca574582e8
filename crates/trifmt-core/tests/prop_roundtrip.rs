/// Property-based roundtrip tests.
///
/// JSON and YAML can represent every finite `Value`, so for them the property
/// is `decode(encode(v)) == v` over arbitrary trees. XML only roundtrips for
/// trees in the canonical shape its decoder produces:
/// - every leaf is a trimmed, non-empty string or null
/// - attributes come first and `#text` last
/// - `#text` appears only next to attributes or children
/// - sequences hold at least two items and never nest directly
use proptest::prelude::*;
use trifmt_core::{
    json, xml, yaml, DecodeOptions, EncodeOptions, Mapping, Number, Value, ATTRIBUTE_PREFIX,
    TEXT_KEY,
};

// ============================================================================
// Strategies for JSON/YAML values
// ============================================================================

/// Strings chosen to stress quoting rules in both JSON and YAML.
fn arb_string() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,20}",
        prop::string::string_regex("[a-zA-Z0-9:,#&*!|>'\"%@`{}\\[\\]\\-\\. ]{0,20}").unwrap(),
        Just(String::new()),
        Just("true".to_string()),
        Just("False".to_string()),
        Just("null".to_string()),
        Just("~".to_string()),
        Just("yes".to_string()),
        Just("off".to_string()),
        Just("42".to_string()),
        Just("-1".to_string()),
        Just("3.14".to_string()),
        Just("1e10".to_string()),
        Just(".inf".to_string()),
        Just("0x1F".to_string()),
        Just("007".to_string()),
        Just(" padded ".to_string()),
        Just("- item".to_string()),
        Just("key: value".to_string()),
        Just("# comment".to_string()),
        Just("caf\u{00e9}".to_string()),
        Just("\u{4f60}\u{597d}".to_string()),
        Just("line1\nline2".to_string()),
        Just("col1\tcol2".to_string()),
        Just("path\\to\\file".to_string()),
        Just("say \"hi\"".to_string()),
        Just("bell\u{7}".to_string()),
    ]
}

/// Floats written as mantissa / 10^n, so their shortest decimal form parses
/// back to the same bits.
fn arb_float() -> impl Strategy<Value = Number> {
    (-100_000_000i64..100_000_000i64, 0u32..5u32)
        .prop_map(|(mantissa, decimals)| Number::Float(mantissa as f64 / 10f64.powi(decimals as i32)))
}

fn arb_number() -> impl Strategy<Value = Number> {
    prop_oneof![
        3 => any::<i64>().prop_map(Number::Int),
        1 => ((i64::MAX as u64 + 1)..=u64::MAX).prop_map(Number::UInt),
        2 => arb_float(),
    ]
}

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        arb_string().prop_map(Value::String),
        arb_number().prop_map(Value::Number),
        any::<bool>().prop_map(Value::Bool),
        Just(Value::Null),
    ]
}

/// Mapping keys: identifiers plus a few that need quoting as keys.
fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-zA-Z_][a-zA-Z0-9_]{0,15}",
        1 => prop::sample::select(vec!["", "true", "42", "null", "key: value", " padded ", "caf\u{00e9}", "a#b"])
            .prop_map(str::to_string),
    ]
}

fn arb_value_inner(depth: u32) -> BoxedStrategy<Value> {
    if depth == 0 {
        arb_scalar().boxed()
    } else {
        prop_oneof![
            4 => arb_scalar(),
            2 => prop::collection::vec((arb_key(), arb_value_inner(depth - 1)), 0..5)
                .prop_map(|pairs| Value::Mapping(pairs.into_iter().collect())),
            2 => prop::collection::vec(arb_value_inner(depth - 1), 0..5)
                .prop_map(Value::Sequence),
        ]
        .boxed()
    }
}

/// Arbitrary finite value up to 3 levels deep.
fn arb_value() -> BoxedStrategy<Value> {
    arb_value_inner(3)
}

// ============================================================================
// Strategies for canonical XML trees
// ============================================================================

fn arb_name() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_.-]{0,8}"
}

/// Element text: no surrounding whitespace, markup characters included.
fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9<>&'\"]([a-zA-Z0-9 <>&'\".,;!?]{0,12}[a-zA-Z0-9<>&'\"])?"
}

/// Attribute values keep inner and surrounding spaces and may be empty.
fn arb_attribute_value() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 <>&'\".]{0,12}"
}

fn arb_element_inner(depth: u32) -> BoxedStrategy<Value> {
    let leaf = prop_oneof![
        3 => arb_text().prop_map(Value::String),
        1 => Just(Value::Null),
    ];
    if depth == 0 {
        return leaf.boxed();
    }

    let child = prop_oneof![
        3 => arb_element_inner(depth - 1),
        1 => prop::collection::vec(arb_element_inner(depth - 1), 2..4).prop_map(Value::Sequence),
    ];
    let structured = (
        prop::collection::vec((arb_name(), arb_attribute_value()), 0..3),
        prop::collection::vec((arb_name(), child), 0..4),
        prop::option::of(arb_text()),
    )
        .prop_filter("element needs attributes or children", |(attributes, children, _)| {
            !attributes.is_empty() || !children.is_empty()
        })
        .prop_map(|(attributes, children, text)| {
            let mut mapping = Mapping::new();
            for (name, value) in attributes {
                mapping.insert(format!("{ATTRIBUTE_PREFIX}{name}"), Value::String(value));
            }
            for (name, value) in children {
                mapping.insert(name, value);
            }
            if let Some(text) = text {
                mapping.insert(TEXT_KEY, Value::String(text));
            }
            Value::Mapping(mapping)
        });

    prop_oneof![
        2 => leaf,
        3 => structured,
    ]
    .boxed()
}

/// A single-root document in canonical XML shape.
fn arb_xml_document() -> impl Strategy<Value = Value> {
    (arb_name(), arb_element_inner(3)).prop_map(|(name, content)| Value::mapping([(name, content)]))
}

// ============================================================================
// Helpers
// ============================================================================

fn compact() -> EncodeOptions {
    EncodeOptions::default().with_indent(0)
}

fn flow() -> EncodeOptions {
    EncodeOptions::default().with_yaml_flow_style(true)
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// JSON holds every finite value, pretty or compact.
    #[test]
    fn json_roundtrip(value in arb_value()) {
        for options in [EncodeOptions::default(), compact()] {
            let bytes = json::encode(&value, &options).unwrap();
            let back = json::decode(&bytes, &DecodeOptions::default()).unwrap();
            prop_assert_eq!(&back, &value, "JSON: {}", String::from_utf8_lossy(&bytes));
        }
    }

    /// Block-style YAML holds every finite value.
    #[test]
    fn yaml_block_roundtrip(value in arb_value()) {
        let bytes = yaml::encode(&value, &EncodeOptions::default()).unwrap();
        let back = yaml::decode(&bytes, &DecodeOptions::default()).unwrap();
        prop_assert_eq!(&back, &value, "YAML: {}", String::from_utf8_lossy(&bytes));
    }

    /// Flow-style YAML holds every finite value on one line.
    #[test]
    fn yaml_flow_roundtrip(value in arb_value()) {
        let bytes = yaml::encode(&value, &flow()).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        prop_assert_eq!(text.matches('\n').count(), 1, "flow output spans lines: {:?}", text);
        let back = yaml::decode(&bytes, &DecodeOptions::default()).unwrap();
        prop_assert_eq!(&back, &value, "YAML flow: {}", text);
    }

    /// JSON → YAML → JSON agrees with the direct decode.
    #[test]
    fn json_yaml_json(value in arb_value()) {
        let yaml_bytes = yaml::encode(&value, &EncodeOptions::default()).unwrap();
        let via_yaml = yaml::decode(&yaml_bytes, &DecodeOptions::default()).unwrap();
        let json_bytes = json::encode(&via_yaml, &compact()).unwrap();
        let back = json::decode(&json_bytes, &DecodeOptions::default()).unwrap();
        prop_assert_eq!(back, value);
    }

    /// Canonical XML trees survive encode/decode, indented or not.
    #[test]
    fn xml_canonical_roundtrip(value in arb_xml_document()) {
        for options in [EncodeOptions::default(), compact().with_xml_declaration(false)] {
            let bytes = xml::encode(&value, &options).unwrap();
            let back = xml::decode(&bytes, &DecodeOptions::default()).unwrap();
            prop_assert_eq!(&back, &value, "XML: {}", String::from_utf8_lossy(&bytes));
        }
    }

    /// Canonical XML trees survive a detour through JSON and YAML.
    #[test]
    fn xml_through_json_and_yaml(value in arb_xml_document()) {
        let json_bytes = json::encode(&value, &EncodeOptions::default()).unwrap();
        let from_json = json::decode(&json_bytes, &DecodeOptions::default()).unwrap();
        let yaml_bytes = yaml::encode(&from_json, &EncodeOptions::default()).unwrap();
        let from_yaml = yaml::decode(&yaml_bytes, &DecodeOptions::default()).unwrap();
        let xml_bytes = xml::encode(&from_yaml, &EncodeOptions::default()).unwrap();
        let back = xml::decode(&xml_bytes, &DecodeOptions::default()).unwrap();
        prop_assert_eq!(back, value);
    }

    /// Every encoder ends its output with exactly one newline.
    #[test]
    fn output_ends_with_newline(value in arb_value()) {
        for options in [EncodeOptions::default(), compact(), flow()] {
            for bytes in [json::encode(&value, &options).unwrap(), yaml::encode(&value, &options).unwrap()] {
                prop_assert!(bytes.ends_with(b"\n"));
            }
        }
    }

    /// The XML encoder never panics, whatever the tree.
    #[test]
    fn xml_encode_never_panics(value in arb_value()) {
        let _ = xml::encode(&Value::mapping([("root", value)]), &EncodeOptions::default());
    }
}
