//! Strict JSON codec for `SingleModel`.
//!
//! # Responsibility
//! - Decode untrusted JSON into a fully validated record.
//! - Encode records in canonical field order with the fixed timestamp format.
//!
//! # Invariants
//! - Decoding is deterministic: checks run in a fixed order (structure,
//!   missing fields, extra fields, types, enum) and fields are visited in
//!   canonical order.
//! - `decode(&encode(r)) == Ok(r)` for every valid record.

use crate::model::single_model::{DateTime, ListResult, ModelId, SingleEnum, SingleModel};
use serde_json::{Map, Value};
use thiserror::Error;

const ID_FIELD: &str = "id";

/// Mandatory fields in canonical order.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "single_bool",
    "single_int",
    "single_float",
    "single_string",
    "single_enum",
    "single_datetime",
];

/// Schema validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("invalid JSON: {0}")]
    Parse(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("extra field found: {0}")]
    ExtraField(String),
    #[error("error parsing field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("invalid enum value for single_enum: {value} (must be one of: red, green, blue)")]
    InvalidEnum { value: String },
}

impl CodecError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse_error",
            Self::MissingField(_) => "missing_field",
            Self::ExtraField(_) => "extra_field",
            Self::InvalidField { .. } => "invalid_field",
            Self::InvalidEnum { .. } => "invalid_enum",
        }
    }
}

/// Decodes and validates one record from JSON text.
pub fn decode(text: &str) -> Result<SingleModel, CodecError> {
    let value: Value =
        serde_json::from_str(text).map_err(|err| CodecError::Parse(err.to_string()))?;
    decode_value(value)
}

/// Decodes and validates one record from an already parsed JSON value.
pub fn decode_value(value: Value) -> Result<SingleModel, CodecError> {
    let Value::Object(map) = value else {
        return Err(CodecError::Parse("expected a JSON object".to_string()));
    };

    for field in REQUIRED_FIELDS {
        if matches!(map.get(field), None | Some(Value::Null)) {
            return Err(CodecError::MissingField(field));
        }
    }

    if let Some(extra) = map
        .keys()
        .find(|key| key.as_str() != ID_FIELD && !REQUIRED_FIELDS.contains(&key.as_str()))
    {
        return Err(CodecError::ExtraField(extra.clone()));
    }

    let id = match map.get(ID_FIELD) {
        None | Some(Value::Null) => ModelId::Unassigned,
        Some(Value::String(id)) => ModelId::Assigned(id.clone()),
        Some(_) => return Err(invalid_field(ID_FIELD, "expected string")),
    };

    let single_bool = field(&map, "single_bool")
        .as_bool()
        .ok_or_else(|| invalid_field("single_bool", "expected boolean"))?;
    let single_int = field(&map, "single_int")
        .as_i64()
        .ok_or_else(|| invalid_field("single_int", "expected integer"))?;
    let single_float = field(&map, "single_float")
        .as_f64()
        .filter(|value| value.is_finite())
        .ok_or_else(|| invalid_field("single_float", "expected finite number"))?;
    let single_string = field(&map, "single_string")
        .as_str()
        .ok_or_else(|| invalid_field("single_string", "expected string"))?
        .to_string();
    let enum_text = field(&map, "single_enum")
        .as_str()
        .ok_or_else(|| invalid_field("single_enum", "expected string"))?;
    let datetime_text = field(&map, "single_datetime")
        .as_str()
        .ok_or_else(|| invalid_field("single_datetime", "expected string"))?;
    let single_datetime = DateTime::parse(datetime_text).map_err(|err| {
        invalid_field(
            "single_datetime",
            format!("expected YYYY-MM-DDTHH:MM:SS, got `{datetime_text}` ({err})"),
        )
    })?;

    let single_enum = enum_text
        .parse::<SingleEnum>()
        .map_err(|()| CodecError::InvalidEnum {
            value: enum_text.to_string(),
        })?;

    Ok(SingleModel {
        id,
        single_bool,
        single_int,
        single_float,
        single_string,
        single_enum,
        single_datetime,
    })
}

/// Checks the invariants a programmatically built record must share with a
/// decoded one. JSON has no encoding for NaN or infinities, so `single_float`
/// must be finite.
pub fn validate(model: &SingleModel) -> Result<(), CodecError> {
    if !model.single_float.is_finite() {
        return Err(invalid_field(
            "single_float",
            format!("expected finite number, got {}", model.single_float),
        ));
    }
    Ok(())
}

/// Encodes one record as compact JSON text.
///
/// Records failing `validate` encode `single_float` as `null`.
pub fn encode(model: &SingleModel) -> String {
    to_value(model).to_string()
}

/// Encodes a list result as `{"total": n, "items": [...]}`.
pub fn encode_list(list: &ListResult) -> String {
    list_to_value(list).to_string()
}

/// Canonical JSON value for one record; `id` is omitted while unassigned.
pub fn to_value(model: &SingleModel) -> Value {
    let mut map = Map::new();
    if let Some(id) = model.id.as_deref() {
        map.insert(ID_FIELD.to_string(), Value::from(id));
    }
    map.insert("single_bool".to_string(), Value::from(model.single_bool));
    map.insert("single_int".to_string(), Value::from(model.single_int));
    map.insert("single_float".to_string(), Value::from(model.single_float));
    map.insert(
        "single_string".to_string(),
        Value::from(model.single_string.as_str()),
    );
    map.insert(
        "single_enum".to_string(),
        Value::from(model.single_enum.as_str()),
    );
    map.insert(
        "single_datetime".to_string(),
        Value::from(model.single_datetime.to_string()),
    );
    Value::Object(map)
}

pub fn list_to_value(list: &ListResult) -> Value {
    let mut map = Map::new();
    map.insert("total".to_string(), Value::from(list.total));
    map.insert(
        "items".to_string(),
        Value::Array(list.items.iter().map(to_value).collect()),
    );
    Value::Object(map)
}

/// Decodes a `{"total", "items"}` envelope, validating every item.
pub fn decode_list(text: &str) -> Result<ListResult, CodecError> {
    let value: Value =
        serde_json::from_str(text).map_err(|err| CodecError::Parse(err.to_string()))?;
    let Value::Object(mut map) = value else {
        return Err(CodecError::Parse("expected a JSON object".to_string()));
    };

    let total = map
        .get("total")
        .and_then(Value::as_u64)
        .ok_or_else(|| CodecError::Parse("list field `total` must be a count".to_string()))?;
    let items = match map.remove("items") {
        Some(Value::Array(items)) => items
            .into_iter()
            .map(decode_value)
            .collect::<Result<Vec<_>, _>>()?,
        _ => {
            return Err(CodecError::Parse(
                "list field `items` must be an array".to_string(),
            ))
        }
    };

    Ok(ListResult { total, items })
}

fn field<'a>(map: &'a Map<String, Value>, name: &str) -> &'a Value {
    map.get(name).unwrap_or(&Value::Null)
}

fn invalid_field(field: &'static str, reason: impl Into<String>) -> CodecError {
    CodecError::InvalidField {
        field,
        reason: reason.into(),
    }
}
