//! # Entity Schemas
//!
//! One schema per entity type. A schema names the collection, the field used
//! by search, the headings shown by the form, and the list of fields with the
//! control kind and validation rule for each. The same schema drives form
//! generation, form serialization, validation and card rendering.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Fields;

/// The entity types this application knows how to serve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[default]
    Cats,
    Recipes,
}

impl EntityKind {
    pub fn schema(self) -> &'static EntitySchema {
        match self {
            EntityKind::Cats => &CATS,
            EntityKind::Recipes => &RECIPES,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Cats => "cats",
            EntityKind::Recipes => "recipes",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cats" | "cat" => Ok(EntityKind::Cats),
            "recipes" | "recipe" => Ok(EntityKind::Recipes),
            other => Err(format!("unknown entity '{}', expected 'cats' or 'recipes'", other)),
        }
    }
}

/// Kind of form control backing a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    TextArea,
    Color,
    Number,
    Range,
    Date,
    Checkbox,
    Select,
    Hidden,
}

impl FieldKind {
    /// Maps an `<input type=...>` value (or a tag name for select/textarea)
    /// onto a field kind. Unknown input types are treated as plain text.
    pub fn from_input_type(input_type: &str) -> Self {
        match input_type.to_ascii_lowercase().as_str() {
            "checkbox" => FieldKind::Checkbox,
            "number" => FieldKind::Number,
            "range" => FieldKind::Range,
            "date" => FieldKind::Date,
            "color" => FieldKind::Color,
            "hidden" => FieldKind::Hidden,
            "textarea" => FieldKind::TextArea,
            "select" | "select-one" => FieldKind::Select,
            _ => FieldKind::Text,
        }
    }

    /// The `type` attribute for input-backed kinds
    pub fn input_type(self) -> &'static str {
        match self {
            FieldKind::Text | FieldKind::TextArea | FieldKind::Select => "text",
            FieldKind::Color => "color",
            FieldKind::Number => "number",
            FieldKind::Range => "range",
            FieldKind::Date => "date",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Hidden => "hidden",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, FieldKind::Number | FieldKind::Range)
    }
}

/// One field of an entity schema
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub options: &'static [&'static str],
    /// Values outside `options` are accepted too
    pub open: bool,
}

impl FieldSpec {
    pub const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            min: None,
            max: None,
            options: &[],
            open: false,
        }
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    pub const fn between(self, min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ..self
        }
    }

    pub const fn at_least(self, min: f64) -> Self {
        Self {
            min: Some(min),
            ..self
        }
    }

    pub const fn one_of(self, options: &'static [&'static str]) -> Self {
        Self { options, ..self }
    }

    /// Offers `options` as choices without rejecting other values
    pub const fn suggesting(self, options: &'static [&'static str]) -> Self {
        Self {
            options,
            open: true,
            ..self
        }
    }

    fn check(&self, value: Option<&Value>) -> Result<(), ValidationError> {
        let blank = match value {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        };
        if blank {
            return if self.required {
                Err(ValidationError::Required { field: self.label })
            } else {
                Ok(())
            };
        }

        if self.kind.is_numeric() {
            let Some(number) = value.and_then(Value::as_f64) else {
                return Err(ValidationError::NotANumber { field: self.label });
            };
            let below = self.min.map(|min| number < min).unwrap_or(false);
            let above = self.max.map(|max| number > max).unwrap_or(false);
            if below || above {
                return Err(ValidationError::OutOfRange {
                    field: self.label,
                    value: number,
                    min: self.min,
                    max: self.max,
                });
            }
        }

        if !self.options.is_empty() && !self.open {
            if let Some(Value::String(choice)) = value {
                if !self.options.contains(&choice.as_str()) {
                    return Err(ValidationError::UnknownOption {
                        field: self.label,
                        value: choice.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// The field and recognized values used by the list filter bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSpec {
    pub field: &'static str,
    pub values: &'static [&'static str],
}

/// Everything the client and server need to know about one entity type
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySchema {
    pub kind: EntityKind,
    /// Collection name in the document store
    pub collection: &'static str,
    /// Field matched and ordered by `/search`
    pub search_field: &'static str,
    pub create_heading: &'static str,
    pub edit_heading: &'static str,
    pub delete_prompt: &'static str,
    pub fields: &'static [FieldSpec],
    pub filter: Option<FilterSpec>,
}

impl EntitySchema {
    /// Checks a serialized form against the per-field rules, reporting the
    /// first violation in field order.
    pub fn validate(&self, fields: &Fields) -> Result<(), ValidationError> {
        self.fields
            .iter()
            .try_for_each(|spec| spec.check(fields.get(spec.name)))
    }
}

/// A form value that breaks its field's rule
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be a number")]
    NotANumber { field: &'static str },

    #[error("{field} must be {}, got {value}", describe_range(.min, .max))]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: Option<f64>,
        max: Option<f64>,
    },

    #[error("{field} cannot be '{value}'")]
    UnknownOption { field: &'static str, value: String },
}

fn describe_range(min: &Option<f64>, max: &Option<f64>) -> String {
    match (*min, *max) {
        (Some(min), Some(max)) => format!("between {} and {}", min, max),
        (Some(min), None) => format!("at least {}", min),
        (None, Some(max)) => format!("at most {}", max),
        (None, None) => "a number".to_string(),
    }
}

const CAT_FOODS: &[&str] = &["dry", "wet", "raw"];
const RECIPE_TYPES: &[&str] = &["meal", "drink"];

pub static CATS: EntitySchema = EntitySchema {
    kind: EntityKind::Cats,
    collection: "cats",
    search_field: "name",
    create_heading: "🐈 Share a Cat",
    edit_heading: "🐈 Edit Cat",
    delete_prompt: "Are you sure you want to delete this cat?",
    fields: &[
        FieldSpec::new("name", "Name", FieldKind::Text).required(),
        FieldSpec::new("microchip", "Microchip", FieldKind::Text),
        FieldSpec::new("primaryColor", "Primary colour", FieldKind::Color),
        FieldSpec::new("secondaryColor", "Secondary colour", FieldKind::Color),
        FieldSpec::new("playfulness", "Playfulness", FieldKind::Range).between(0.0, 10.0),
        FieldSpec::new("appetite", "Appetite", FieldKind::Range).between(0.0, 10.0),
        FieldSpec::new("birthDate", "Birth date", FieldKind::Date),
        FieldSpec::new("breed", "Breed", FieldKind::Text),
        FieldSpec::new("food", "Food", FieldKind::Select).one_of(CAT_FOODS),
        FieldSpec::new("isAdopted", "Adopted", FieldKind::Checkbox),
        FieldSpec::new("description", "Description", FieldKind::TextArea),
    ],
    filter: None,
};

pub static RECIPES: EntitySchema = EntitySchema {
    kind: EntityKind::Recipes,
    collection: "recipes",
    search_field: "title",
    create_heading: "🍲 Share a Recipe",
    edit_heading: "🍲 Edit Recipe",
    delete_prompt: "Are you sure you want to delete this recipe?",
    fields: &[
        FieldSpec::new("title", "Title", FieldKind::Text).required(),
        FieldSpec::new("type", "Type", FieldKind::Select)
            .required()
            .suggesting(RECIPE_TYPES),
        FieldSpec::new("calories", "Calories", FieldKind::Number).at_least(0.0),
        FieldSpec::new("proteinGrams", "Protein (g)", FieldKind::Number).at_least(0.0),
        FieldSpec::new("ingredients", "Ingredients (comma separated)", FieldKind::TextArea),
        FieldSpec::new("steps", "Steps", FieldKind::TextArea),
        FieldSpec::new("description", "Description", FieldKind::TextArea),
    ],
    filter: Some(FilterSpec {
        field: "type",
        values: RECIPE_TYPES,
    }),
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().expect("object literal")
    }

    #[test]
    fn test_entity_kind_parsing() {
        assert_eq!("cats".parse::<EntityKind>(), Ok(EntityKind::Cats));
        assert_eq!(" Recipes ".parse::<EntityKind>(), Ok(EntityKind::Recipes));
        assert!("dogs".parse::<EntityKind>().is_err());
        assert_eq!(EntityKind::Recipes.schema().search_field, "title");
        assert_eq!(EntityKind::Cats.schema().search_field, "name");
    }

    #[test]
    fn test_field_kind_from_input_type() {
        assert_eq!(FieldKind::from_input_type("checkbox"), FieldKind::Checkbox);
        assert_eq!(FieldKind::from_input_type("RANGE"), FieldKind::Range);
        assert_eq!(FieldKind::from_input_type("select-one"), FieldKind::Select);
        assert_eq!(FieldKind::from_input_type("email"), FieldKind::Text);
    }

    #[test]
    fn test_validate_required_field() {
        let err = CATS.validate(&fields(json!({"name": "   "}))).unwrap_err();
        assert_eq!(err, ValidationError::Required { field: "Name" });
        assert_eq!(err.to_string(), "Name is required");

        assert!(CATS.validate(&fields(json!({"name": "Tom"}))).is_ok());
    }

    #[test]
    fn test_validate_numeric_range() {
        let err = CATS
            .validate(&fields(json!({"name": "Tom", "playfulness": 11})))
            .unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "Playfulness", .. }));
        assert_eq!(err.to_string(), "Playfulness must be between 0 and 10, got 11");

        // Blank optional numbers serialize to null and are fine
        assert!(CATS
            .validate(&fields(json!({"name": "Tom", "playfulness": null})))
            .is_ok());
    }

    #[test]
    fn test_validate_enum_membership() {
        let err = CATS
            .validate(&fields(json!({"name": "Tom", "food": "kibble"})))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownOption {
                field: "Food",
                value: "kibble".to_string()
            }
        );
        assert!(CATS
            .validate(&fields(json!({"name": "Tom", "food": "raw"})))
            .is_ok());
    }

    #[test]
    fn test_recipe_type_accepts_values_beyond_suggestions() {
        assert!(RECIPES
            .validate(&fields(json!({"title": "Tea", "type": "drink", "calories": 0})))
            .is_ok());
        assert!(RECIPES
            .validate(&fields(json!({"title": "Scones", "type": "dessert"})))
            .is_ok());

        let err = RECIPES.validate(&fields(json!({"title": "Scones", "type": ""}))).unwrap_err();
        assert_eq!(err, ValidationError::Required { field: "Type" });
    }
}
