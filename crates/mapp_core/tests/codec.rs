use mapp_core::codec::{self, CodecError, REQUIRED_FIELDS};
use mapp_core::{DateTime, ListResult, ModelId, SingleEnum, SingleModel};
use serde_json::{json, Value};

fn sample_value() -> Value {
    json!({
        "single_bool": true,
        "single_int": 42,
        "single_float": 3.14,
        "single_string": "x",
        "single_enum": "red",
        "single_datetime": "2000-01-11T12:34:56"
    })
}

fn sample_model(id: ModelId) -> SingleModel {
    SingleModel {
        id,
        single_bool: false,
        single_int: -9_000_000_000,
        single_float: 0.1,
        single_string: "quotes \" and\nnewlines".to_string(),
        single_enum: SingleEnum::Blue,
        single_datetime: DateTime::parse("1999-12-31T23:59:59").unwrap(),
    }
}

#[test]
fn encode_then_decode_reproduces_every_field() {
    for id in [ModelId::Unassigned, ModelId::assigned("17")] {
        let model = sample_model(id);
        assert_eq!(codec::decode(&codec::encode(&model)).unwrap(), model);
    }
}

#[test]
fn encode_uses_canonical_field_order_and_omits_unassigned_id() {
    let encoded = codec::encode(&sample_model(ModelId::Unassigned));
    assert!(encoded.starts_with(r#"{"single_bool":false,"single_int":"#));
    assert!(!encoded.contains(r#""id""#));
    assert!(encoded.ends_with(r#""single_enum":"blue","single_datetime":"1999-12-31T23:59:59"}"#));

    let encoded = codec::encode(&sample_model(ModelId::assigned("3")));
    assert!(encoded.starts_with(r#"{"id":"3","single_bool""#));
}

#[test]
fn each_missing_field_is_named() {
    for field in REQUIRED_FIELDS {
        let mut value = sample_value();
        value.as_object_mut().unwrap().remove(field);

        let err = codec::decode(&value.to_string()).unwrap_err();
        assert_eq!(err, CodecError::MissingField(field));
        assert!(err.to_string().contains(field));
    }
}

#[test]
fn null_counts_as_missing() {
    let mut value = sample_value();
    value["single_string"] = Value::Null;
    assert_eq!(
        codec::decode(&value.to_string()).unwrap_err(),
        CodecError::MissingField("single_string")
    );
}

#[test]
fn undeclared_fields_are_rejected() {
    let mut value = sample_value();
    value["colour"] = json!("red");
    let err = codec::decode(&value.to_string()).unwrap_err();
    assert_eq!(err, CodecError::ExtraField("colour".to_string()));
    assert_eq!(err.code(), "extra_field");
}

#[test]
fn missing_fields_are_reported_before_extra_fields() {
    let mut value = sample_value();
    value.as_object_mut().unwrap().remove("single_bool");
    value["colour"] = json!("red");
    assert_eq!(
        codec::decode(&value.to_string()).unwrap_err().code(),
        "missing_field"
    );
}

#[test]
fn enum_outside_declared_set_is_rejected() {
    let mut value = sample_value();
    value["single_enum"] = json!("purple");
    let err = codec::decode(&value.to_string()).unwrap_err();
    assert_eq!(
        err,
        CodecError::InvalidEnum {
            value: "purple".to_string()
        }
    );
    assert!(err.to_string().contains("red, green, blue"));
}

#[test]
fn enum_match_is_case_sensitive() {
    let mut value = sample_value();
    value["single_enum"] = json!("Red");
    assert_eq!(codec::decode(&value.to_string()).unwrap_err().code(), "invalid_enum");
}

#[test]
fn wrong_types_are_invalid_fields() {
    let cases = [
        ("single_bool", json!("true")),
        ("single_int", json!(1.5)),
        ("single_int", json!("42")),
        ("single_float", json!("3.14")),
        ("single_string", json!(12)),
        ("single_datetime", json!("2000-01-11 12:34:56")),
        ("single_datetime", json!("2000-01-11T12:34:56Z")),
        ("single_datetime", json!("2000-01-11T12:34:56.250")),
        ("single_datetime", json!("+10000-01-01T00:00:00")),
        ("single_datetime", json!("-0001-01-01T00:00:00")),
        ("single_datetime", json!("+2000-01-11T12:34:56")),
    ];

    for (field, replacement) in cases {
        let mut value = sample_value();
        value[field] = replacement;
        let err = codec::decode(&value.to_string()).unwrap_err();
        assert_eq!(err.code(), "invalid_field", "field {field}");
        assert!(err.to_string().contains(field));
    }
}

#[test]
fn integer_literal_is_accepted_for_float_field() {
    let mut value = sample_value();
    value["single_float"] = json!(3);
    let model = codec::decode(&value.to_string()).unwrap();
    assert_eq!(model.single_float, 3.0);
}

#[test]
fn non_string_identity_is_rejected() {
    let mut value = sample_value();
    value["id"] = json!(1);
    assert_eq!(codec::decode(&value.to_string()).unwrap_err().code(), "invalid_field");
}

#[test]
fn list_envelope_round_trips() {
    let list = ListResult {
        total: 12,
        items: vec![sample_model(ModelId::assigned("1"))],
    };
    let encoded = codec::encode_list(&list);
    assert!(encoded.starts_with(r#"{"total":12,"items":[{"id":"1""#));
    assert_eq!(codec::decode_list(&encoded).unwrap(), list);
}
