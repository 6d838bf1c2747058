//! # List Filtering
//!
//! In-memory filtering of a fetched list by the schema's filter field, plus
//! the state of the filter bar (exactly one option active at a time).

use serde_json::Value;

use crate::schema::EntitySchema;
use crate::Record;

/// The predicate applied to the displayed list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecordFilter {
    #[default]
    All,
    Equals { field: String, value: String },
}

impl RecordFilter {
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        RecordFilter::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            RecordFilter::All => true,
            RecordFilter::Equals { field, value } => {
                matches!(record.get(field), Some(Value::String(s)) if s == value)
            }
        }
    }

    /// Records that pass the filter, keeping their original order
    pub fn apply<'a>(&self, records: &'a [Record]) -> Vec<&'a Record> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// One button of the filter bar
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOption {
    /// Stable key, used as the button's `data-filter` value
    pub key: String,
    pub label: String,
    pub filter: RecordFilter,
}

/// Filter bar state; "all" is selected on creation
#[derive(Debug, Clone, PartialEq)]
pub struct FilterBar {
    options: Vec<FilterOption>,
    active: usize,
}

impl FilterBar {
    /// Builds the bar for a schema with a filter field, `None` otherwise
    pub fn for_schema(schema: &EntitySchema) -> Option<Self> {
        let spec = schema.filter?;
        let mut options = vec![FilterOption {
            key: "all".to_string(),
            label: "All".to_string(),
            filter: RecordFilter::All,
        }];
        options.extend(spec.values.iter().map(|value| FilterOption {
            key: value.to_string(),
            label: capitalize(value),
            filter: RecordFilter::equals(spec.field, *value),
        }));
        Some(Self { options, active: 0 })
    }

    pub fn options(&self) -> &[FilterOption] {
        &self.options
    }

    pub fn active_filter(&self) -> &RecordFilter {
        &self.options[self.active].filter
    }

    pub fn active_key(&self) -> &str {
        &self.options[self.active].key
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.active_key() == key
    }

    /// Makes `key` the active option. Unknown keys leave the selection as is
    /// and return `None`.
    pub fn select(&mut self, key: &str) -> Option<&RecordFilter> {
        let index = self.options.iter().position(|o| o.key == key)?;
        self.active = index;
        Some(&self.options[index].filter)
    }

    /// Button markup; the active option carries the `active` class
    pub fn markup(&self) -> String {
        self.options
            .iter()
            .map(|option| {
                let class = if self.is_active(&option.key) {
                    "filter-btn active"
                } else {
                    "filter-btn"
                };
                format!(
                    r#"<button type="button" class="{}" data-filter="{}">{}</button>"#,
                    class, option.key, option.label
                )
            })
            .collect()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
