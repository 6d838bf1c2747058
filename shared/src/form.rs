//! # Form Shaping
//!
//! Converts between raw form control state and typed JSON field mappings.
//! The browser side reads each control into a [`FormControl`]; everything
//! that decides what the JSON looks like lives here so it can be tested
//! without a DOM.

use chrono::NaiveDate;
use serde_json::{Number, Value};

use crate::schema::{EntitySchema, FieldKind};
use crate::{value_is_truthy, value_to_text, Fields, Record};

/// Snapshot of one named form control
#[derive(Debug, Clone, PartialEq)]
pub struct FormControl {
    pub name: String,
    pub kind: FieldKind,
    /// Raw text value as the control reports it
    pub value: String,
    /// Checked state, only meaningful for checkboxes
    pub checked: bool,
}

impl FormControl {
    pub fn new(name: impl Into<String>, kind: FieldKind, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            value: value.into(),
            checked: false,
        }
    }

    pub fn checkbox(name: impl Into<String>, checked: bool) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Checkbox,
            value: "on".to_string(),
            checked,
        }
    }

    /// Applies a value produced by [`populate`] to this control
    pub fn set(&mut self, value: &ControlValue) {
        match value {
            ControlValue::Checked(checked) => self.checked = *checked,
            ControlValue::Text(text) => self.value = text.clone(),
        }
    }
}

/// What to write into a control when populating the form for editing
#[derive(Debug, Clone, PartialEq)]
pub enum ControlValue {
    Checked(bool),
    Text(String),
}

/// Serializes form controls into a typed field mapping.
///
/// Checkboxes become booleans, number and range inputs become numbers (null
/// when blank), date inputs become ISO-8601 date-times (null when blank).
/// Every other control passes its text through unchanged. Unnamed controls
/// are skipped.
pub fn serialize_controls(controls: &[FormControl]) -> Fields {
    let mut json = Fields::new();
    for control in controls.iter().filter(|c| !c.name.is_empty()) {
        let value = match control.kind {
            FieldKind::Checkbox => Value::Bool(control.checked),
            FieldKind::Number | FieldKind::Range => number_input_to_json(&control.value),
            FieldKind::Date => date_input_to_json(&control.value),
            _ => Value::String(control.value.clone()),
        };
        json.insert(control.name.clone(), value);
    }
    json
}

/// Numeric form text to JSON. Blank or unparseable text is null; whole
/// numbers serialize as integers so "7" becomes 7.
pub fn number_input_to_json(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 => {
            Value::from(n as i64)
        }
        Ok(n) => Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null),
        Err(_) => Value::Null,
    }
}

/// Date-only form text (`YYYY-MM-DD`) to a UTC midnight ISO-8601 string.
pub fn date_input_to_json(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => Value::String(format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))),
        Err(_) => Value::Null,
    }
}

/// Date-only prefix of a stored date-time, as a date control expects it
pub fn date_prefix(value: &Value) -> String {
    match value {
        Value::String(s) => s.chars().take(10).collect(),
        _ => String::new(),
    }
}

/// Values to write into the form when editing `record`.
///
/// Only fields with a matching control (as reported by `kind_of`) are
/// returned; the record id comes first so the hidden id control is filled.
pub fn populate<F>(record: &Record, kind_of: F) -> Vec<(String, ControlValue)>
where
    F: Fn(&str) -> Option<FieldKind>,
{
    let id = Value::String(record.id.clone());
    std::iter::once(("id", &id))
        .chain(record.fields.iter().map(|(k, v)| (k.as_str(), v)))
        .filter_map(|(name, value)| {
            let kind = kind_of(name)?;
            let control_value = match kind {
                FieldKind::Checkbox => ControlValue::Checked(value_is_truthy(value)),
                FieldKind::Date => ControlValue::Text(date_prefix(value)),
                _ => ControlValue::Text(value_to_text(value)),
            };
            Some((name.to_string(), control_value))
        })
        .collect()
}

/// Empty controls for a schema, in form order, with the hidden id first
pub fn blank_controls(schema: &EntitySchema) -> Vec<FormControl> {
    std::iter::once(FormControl::new("id", FieldKind::Hidden, ""))
        .chain(schema.fields.iter().map(|spec| match spec.kind {
            FieldKind::Checkbox => FormControl::checkbox(spec.name, false),
            kind => FormControl::new(spec.name, kind, ""),
        }))
        .collect()
}

/// Values that blank every control of a schema, the hidden id included.
///
/// A browser form reset restores hidden inputs to their last assigned value,
/// so after editing a record the id would survive `form.reset()` and turn the
/// next create into an update. Writing these values after a reset prevents
/// that.
pub fn reset_values(schema: &EntitySchema) -> Vec<(String, ControlValue)> {
    blank_controls(schema)
        .into_iter()
        .map(|control| {
            let value = match control.kind {
                FieldKind::Checkbox => ControlValue::Checked(false),
                _ => ControlValue::Text(control.value),
            };
            (control.name, value)
        })
        .collect()
}

/// Extra `<option>` for a stored select value the schema does not list
pub fn option_markup(value: &str) -> String {
    let escaped = ammonia::clean_text(value);
    format!(r#"<option value="{0}">{0}</option>"#, escaped)
}

/// Markup for the form controls of a schema. Labels and options come from
/// the static schema, so nothing here is user-supplied.
pub fn form_markup(schema: &EntitySchema) -> String {
    let mut html = String::from(r#"<input type="hidden" name="id" value="">"#);
    for spec in schema.fields {
        let required = if spec.required { " required" } else { "" };
        let mut bounds = String::new();
        if let Some(min) = spec.min {
            bounds.push_str(&format!(r#" min="{}""#, min));
        }
        if let Some(max) = spec.max {
            bounds.push_str(&format!(r#" max="{}""#, max));
        }

        let control = match spec.kind {
            FieldKind::TextArea => {
                format!(r#"<textarea name="{}"{}></textarea>"#, spec.name, required)
            }
            FieldKind::Select => {
                let mut options = String::from(r#"<option value="">Choose…</option>"#);
                for option in spec.options {
                    options.push_str(&format!(r#"<option value="{0}">{0}</option>"#, option));
                }
                format!(r#"<select name="{}"{}>{}</select>"#, spec.name, required, options)
            }
            kind => format!(
                r#"<input type="{}" name="{}"{}{}>"#,
                kind.input_type(),
                spec.name,
                bounds,
                required
            ),
        };

        let class = if spec.kind == FieldKind::Checkbox {
            "field checkbox"
        } else {
            "field"
        };
        html.push_str(&format!(
            r#"<label class="{}"><span>{}</span>{}</label>"#,
            class, spec.label, control
        ));
    }
    html
}
