//! Structural checks on `{step, data}` request bodies.
//!
//! This is the transport boundary: it rejects bodies that are not shaped like
//! a submission at all. Field-level rules live in `validation` and run only
//! after a payload parses. Only `aadhaar`, `otp` and `pan` are format-checked
//! here (see `shape_error`, which the wizard applies too); other keys in
//! `data` pass through untouched, whatever their JSON type. Keys declared by
//! the schema must still carry strings, checked by `check_declared`.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::SchemaProvider;
use crate::types::FormData;
use crate::validation::ValidationMode;

pub const MIN_STEP: u64 = 1;
pub const MAX_STEP: u64 = 2;

/// Keys whose value format is checked at the boundary.
pub const SHAPE_CHECKED_KEYS: [&str; 3] = ["aadhaar", "otp", "pan"];

const OTP_MIN_LEN: usize = 4;
const OTP_MAX_LEN: usize = 8;

static AADHAAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[2-9]{1}[0-9]{11}$").unwrap());

static PAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[A-Z]{5}[0-9]{4}[A-Z]{1}$").unwrap());

/// Flattened structural errors: top-level messages plus messages keyed by
/// path (`step`, `data`, `data.<key>`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadErrors {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl PayloadErrors {
    pub fn form(message: impl Into<String>) -> Self {
        Self {
            form_errors: vec![message.into()],
            field_errors: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    pub fn field(&self, path: &str) -> Option<&[String]> {
        self.field_errors.get(path).map(Vec::as_slice)
    }

    fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.field_errors
            .entry(path.into())
            .or_default()
            .push(message.into());
    }
}

/// A structurally valid request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub step: u32,
    pub data: FormData,
    /// Non-string values under unchecked keys. Stored in `raw_json`, never validated.
    #[serde(skip)]
    pub extra: BTreeMap<String, Value>,
    /// Only honoured by `/api/validate`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ValidationMode>,
}

impl SubmissionPayload {
    pub fn new(step: u32, data: FormData) -> Self {
        Self {
            step,
            data,
            extra: BTreeMap::new(),
            mode: None,
        }
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode.unwrap_or_default()
    }

    /// Parse and structurally check a raw JSON body.
    pub fn from_json(body: &Value) -> Result<Self, PayloadErrors> {
        let Some(obj) = body.as_object() else {
            return Err(PayloadErrors::form(format!(
                "Expected object, received {}",
                kind(body)
            )));
        };

        let mut errors = PayloadErrors::default();
        let step = parse_step(obj.get("step"), &mut errors);
        let data = parse_data(obj.get("data"), &mut errors);
        let mode = parse_mode(obj.get("mode"), &mut errors);

        match (step, data) {
            (Some(step), Some((data, extra))) if errors.is_empty() => Ok(Self {
                step,
                data,
                extra,
                mode,
            }),
            _ => Err(errors),
        }
    }

    /// Reject non-string values under any key the schema declares.
    pub fn check_declared(&self, provider: &SchemaProvider) -> Result<(), PayloadErrors> {
        let mut errors = PayloadErrors::default();
        for (key, value) in &self.extra {
            if provider.declares(key) {
                errors.push(
                    format!("data.{key}"),
                    format!("Expected string, received {}", kind(value)),
                );
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// The submitted `data` object as received, string and non-string values alike.
    pub fn raw_data(&self) -> serde_json::Map<String, Value> {
        self.data
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .chain(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())))
            .collect()
    }
}

fn parse_step(value: Option<&Value>, errors: &mut PayloadErrors) -> Option<u32> {
    let Some(value) = value else {
        errors.push("step", "Required");
        return None;
    };
    let Value::Number(number) = value else {
        errors.push("step", format!("Expected number, received {}", kind(value)));
        return None;
    };
    let step = match (number.as_u64(), number.as_i64(), number.as_f64()) {
        (Some(step), _, _) => step,
        (None, Some(_), _) => 0,
        // 2.0 counts as an integer; the cast saturates, negatives land on 0
        (None, None, Some(f)) if f.fract() == 0.0 => f as u64,
        _ => {
            errors.push("step", "Expected integer, received float");
            return None;
        }
    };
    if step < MIN_STEP {
        errors.push(
            "step",
            format!("Number must be greater than or equal to {MIN_STEP}"),
        );
        return None;
    }
    if step > MAX_STEP {
        errors.push(
            "step",
            format!("Number must be less than or equal to {MAX_STEP}"),
        );
        return None;
    }
    u32::try_from(step).ok()
}

fn parse_data(
    value: Option<&Value>,
    errors: &mut PayloadErrors,
) -> Option<(FormData, BTreeMap<String, Value>)> {
    let Some(value) = value else {
        errors.push("data", "Required");
        return None;
    };
    let Some(obj) = value.as_object() else {
        errors.push("data", format!("Expected object, received {}", kind(value)));
        return None;
    };

    let mut data = FormData::new();
    let mut extra = BTreeMap::new();
    let mut ok = true;
    for (key, value) in obj {
        let path = format!("data.{key}");
        let Some(text) = value.as_str() else {
            if SHAPE_CHECKED_KEYS.contains(&key.as_str()) {
                errors.push(path, format!("Expected string, received {}", kind(value)));
                ok = false;
            } else {
                extra.insert(key.clone(), value.clone());
            }
            continue;
        };
        if let Some(message) = shape_error(key, text) {
            errors.push(path, message);
            ok = false;
            continue;
        }
        data.insert(key.clone(), text.to_string());
    }
    ok.then_some((data, extra))
}

/// Boundary format check for `aadhaar`, `otp` and `pan`. Other keys always pass.
pub fn shape_error(key: &str, value: &str) -> Option<String> {
    match key {
        "aadhaar" if !AADHAAR_RE.is_match(value) => Some("Invalid".into()),
        "pan" if !PAN_RE.is_match(value) => Some("Invalid".into()),
        "otp" => {
            let len = value.chars().count();
            if len < OTP_MIN_LEN {
                Some(format!(
                    "String must contain at least {OTP_MIN_LEN} character(s)"
                ))
            } else if len > OTP_MAX_LEN {
                Some(format!(
                    "String must contain at most {OTP_MAX_LEN} character(s)"
                ))
            } else {
                None
            }
        }
        _ => None,
    }
}

fn parse_mode(value: Option<&Value>, errors: &mut PayloadErrors) -> Option<ValidationMode> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s == "complete" => Some(ValidationMode::Complete),
        Some(Value::String(s)) if s == "partial" => Some(ValidationMode::Partial),
        Some(_) => {
            errors.push(
                "mode",
                "Invalid enum value. Expected 'complete' | 'partial'",
            );
            None
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
