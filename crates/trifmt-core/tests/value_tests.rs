use trifmt_core::{ConvertOptions, Format, Mapping, Number, Value};

// ============================================================================
// Mapping semantics
// ============================================================================

#[test]
fn mapping_keeps_insertion_order() {
    let m: Mapping = [("z", Value::Null), ("a", Value::Null), ("m", Value::Null)]
        .into_iter()
        .collect();
    let keys: Vec<&str> = m.keys().map(String::as_str).collect();
    assert_eq!(keys, ["z", "a", "m"]);
}

#[test]
fn mapping_reinsert_replaces_value_in_place() {
    let mut m = Mapping::new();
    m.insert("a", Value::from(1));
    m.insert("b", Value::from(2));
    let previous = m.insert("a", Value::from(3));

    assert_eq!(previous, Some(Value::from(1)));
    assert_eq!(m.len(), 2);
    let pairs: Vec<(&str, &Value)> = m.iter().map(|(k, v)| (k.as_str(), v)).collect();
    assert_eq!(pairs, [("a", &Value::from(3)), ("b", &Value::from(2))]);
}

#[test]
fn mapping_equality_is_order_sensitive() {
    let ab = Value::mapping([("a", Value::from(1)), ("b", Value::from(2))]);
    let ba = Value::mapping([("b", Value::from(2)), ("a", Value::from(1))]);
    assert_ne!(ab, ba);
    assert_eq!(ab, ab.clone());
}

#[test]
fn sequence_equality_is_order_sensitive() {
    let a = Value::from(vec![Value::from(1), Value::from(2)]);
    let b = Value::from(vec![Value::from(2), Value::from(1)]);
    assert_ne!(a, b);
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn integer_and_float_are_distinct() {
    assert_ne!(Value::from(3), Value::from(3.0));
    assert_eq!(Value::from(3).type_name(), "integer");
    assert_eq!(Value::from(3.0).type_name(), "float");
}

#[test]
fn u64_normalizes_to_int_when_it_fits() {
    assert_eq!(Number::from(7u64), Number::Int(7));
    assert_eq!(Number::from(u64::MAX), Number::UInt(u64::MAX));
    assert_eq!(Number::UInt(u64::MAX).as_i64(), None);
    assert_eq!(Number::Int(-1).as_u64(), None);
}

#[test]
fn float_display_keeps_fraction() {
    assert_eq!(Number::Float(3.0).to_string(), "3.0");
    assert_eq!(Number::Float(0.5).to_string(), "0.5");
    assert_eq!(Number::Float(-0.25).to_string(), "-0.25");
    assert_eq!(Number::Int(42).to_string(), "42");
    assert_eq!(Number::Float(f64::NAN).to_string(), "NaN");
    assert_eq!(Number::Float(f64::NEG_INFINITY).to_string(), "-inf");
}

#[test]
fn non_finite_floats_are_reported() {
    assert!(Number::Int(1).is_finite());
    assert!(Number::Float(1.5).is_finite());
    assert!(!Number::Float(f64::INFINITY).is_finite());
}

// ============================================================================
// Accessors
// ============================================================================

#[test]
fn accessors_match_variants() {
    let v = Value::mapping([
        ("name", Value::from("Alice")),
        ("tags", Value::from(vec![Value::from("x")])),
        ("admin", Value::from(true)),
        ("missing", Value::from(None::<&str>)),
    ]);

    assert_eq!(v.get("name").and_then(Value::as_str), Some("Alice"));
    assert_eq!(v.get("tags").and_then(Value::as_sequence).map(<[Value]>::len), Some(1));
    assert_eq!(v.get("admin").and_then(Value::as_bool), Some(true));
    assert!(v.get("missing").is_some_and(Value::is_null));
    assert!(v.get("nope").is_none());
    assert!(!v.is_scalar());
    assert!(Value::from("s").is_scalar());
}

// ============================================================================
// Format tags
// ============================================================================

#[test]
fn format_tags_parse_case_insensitively() {
    assert_eq!("xml".parse::<Format>().unwrap(), Format::Xml);
    assert_eq!("JSON".parse::<Format>().unwrap(), Format::Json);
    assert_eq!(" Yaml ".parse::<Format>().unwrap(), Format::Yaml);
    assert_eq!("yml".parse::<Format>().unwrap(), Format::Yaml);
}

#[test]
fn unknown_format_tag_is_named_in_error() {
    let err = "toml".parse::<Format>().unwrap_err();
    assert_eq!(
        err,
        trifmt_core::ConversionError::UnsupportedFormat {
            format: "toml".to_string()
        }
    );
    assert!(err.to_string().contains("'toml'"));
}

#[test]
fn format_names_and_extensions() {
    let names: Vec<String> = Format::ALL.iter().map(ToString::to_string).collect();
    assert_eq!(names, ["xml", "json", "yaml"]);
    assert_eq!(Format::Yaml.extensions(), ["yaml", "yml"]);
}

// ============================================================================
// Options
// ============================================================================

#[test]
fn options_deserialize_with_defaults() {
    let options: ConvertOptions =
        serde_json::from_str(r#"{"encode": {"indent": 2}, "decode": {"first_document_only": true}}"#)
            .unwrap();
    assert_eq!(options.encode.indent, 2);
    assert!(options.encode.xml_declaration);
    assert!(!options.encode.yaml_flow_style);
    assert!(options.decode.first_document_only);

    let empty: ConvertOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(empty, ConvertOptions::default());
    assert_eq!(empty.encode.indent, trifmt_core::DEFAULT_INDENT);
}
