//! Schema types for the provider, its resources and data sources
//!
//! A [`Schema`] describes the attributes of one object: their type, whether
//! they are required, optional or computed, defaults, validators and plan
//! modifiers. Documents are plain `serde_json::Value` objects keyed by
//! attribute name; `null` means unset or unknown.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::diagnostics::Diagnostics;

/// Value type of an attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttributeKind {
    String,
    Int64,
    /// A list of objects sharing one set of attributes
    ListNested {
        attributes: BTreeMap<String, Attribute>,
    },
}

/// Value constraint checked during validation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Validator {
    /// String length in characters, inclusive
    StringLength { min: usize, max: usize },
    /// String must equal one of the listed values
    OneOf { values: Vec<String> },
    /// List element count, inclusive
    ListSize { min: usize, max: usize },
    /// No two list elements may be equal
    UniqueItems,
    /// String must parse as a UUID
    Uuid,
}

impl Validator {
    pub fn one_of(values: &[&str]) -> Self {
        Validator::OneOf {
            values: values.iter().map(|v| (*v).to_string()).collect(),
        }
    }

    fn check(&self, path: &str, value: &Value, diags: &mut Diagnostics) {
        match (self, value) {
            (Validator::StringLength { min, max }, Value::String(s)) => {
                let len = s.chars().count();
                if len < *min || len > *max {
                    diags.add_attribute_error(
                        path,
                        "Invalid Attribute Value Length",
                        format!(
                            "Attribute {path} string length must be between {min} and {max}, got: {len}"
                        ),
                    );
                }
            }
            (Validator::OneOf { values }, Value::String(s)) => {
                if !values.iter().any(|v| v == s) {
                    let allowed = values
                        .iter()
                        .map(|v| format!("\"{v}\""))
                        .collect::<Vec<_>>()
                        .join(" ");
                    diags.add_attribute_error(
                        path,
                        "Invalid Attribute Value Match",
                        format!("Attribute {path} value must be one of: [{allowed}], got: \"{s}\""),
                    );
                }
            }
            (Validator::ListSize { min, max }, Value::Array(items)) => {
                if items.len() < *min || items.len() > *max {
                    diags.add_attribute_error(
                        path,
                        "Invalid Attribute Value",
                        format!(
                            "Attribute {path} list must contain at least {min} elements and at most {max} elements, got: {}",
                            items.len()
                        ),
                    );
                }
            }
            (Validator::UniqueItems, Value::Array(items)) => {
                let mut seen = HashSet::new();
                for item in items {
                    let key = item.to_string();
                    if !seen.insert(key.clone()) {
                        diags.add_attribute_error(
                            path,
                            "Duplicate List Value",
                            format!("This attribute contains duplicate values of: {key}"),
                        );
                    }
                }
            }
            (Validator::Uuid, Value::String(s)) => {
                if uuid::Uuid::parse_str(s).is_err() {
                    diags.add_attribute_error(
                        path,
                        "Validation error. Ensure the Id is in UUID format.",
                        format!("Attribute {path} value \"{s}\" is not a valid UUID"),
                    );
                }
            }
            _ => {}
        }
    }
}

/// A single attribute of a schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    #[serde(flatten)]
    pub kind: AttributeKind,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub optional: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub computed: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub sensitive: bool,
    /// Changing the value forces the object to be replaced
    #[serde(skip_serializing_if = "is_false")]
    pub requires_replace: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Attribute {
    fn new(kind: AttributeKind, required: bool, optional: bool, computed: bool) -> Self {
        Self {
            kind,
            description: String::new(),
            required,
            optional,
            computed,
            sensitive: false,
            requires_replace: false,
            default: None,
            validators: Vec::new(),
        }
    }

    pub fn required_string() -> Self {
        Self::new(AttributeKind::String, true, false, false)
    }

    pub fn optional_string() -> Self {
        Self::new(AttributeKind::String, false, true, false)
    }

    pub fn computed_string() -> Self {
        Self::new(AttributeKind::String, false, false, true)
    }

    pub fn computed_int64() -> Self {
        Self::new(AttributeKind::Int64, false, false, true)
    }

    /// Optional with a server-side or default value
    pub fn optional_computed_int64() -> Self {
        Self::new(AttributeKind::Int64, false, true, true)
    }

    pub fn required_list(attributes: BTreeMap<String, Attribute>) -> Self {
        Self::new(AttributeKind::ListNested { attributes }, true, false, false)
    }

    pub fn optional_computed_list(attributes: BTreeMap<String, Attribute>) -> Self {
        Self::new(AttributeKind::ListNested { attributes }, false, true, true)
    }

    pub fn computed_list(attributes: BTreeMap<String, Attribute>) -> Self {
        Self::new(AttributeKind::ListNested { attributes }, false, false, true)
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    #[must_use]
    pub fn requires_replace(mut self) -> Self {
        self.requires_replace = true;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    #[must_use]
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Computed and not settable from configuration
    pub fn is_read_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }

    fn type_matches(&self, value: &Value) -> bool {
        match &self.kind {
            AttributeKind::String => value.is_string(),
            AttributeKind::Int64 => value.is_i64(),
            AttributeKind::ListNested { .. } => value.is_array(),
        }
    }

    fn type_name(&self) -> &'static str {
        match &self.kind {
            AttributeKind::String => "string",
            AttributeKind::Int64 => "number",
            AttributeKind::ListNested { .. } => "list of object",
        }
    }
}

/// Schema of one provider, resource or data source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub attributes: BTreeMap<String, Attribute>,
}

impl Schema {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Validate a configuration document against this schema
    pub fn validate(&self, config: &Value) -> Diagnostics {
        let mut diags = Diagnostics::new();
        match config {
            Value::Object(obj) => validate_object(&self.attributes, obj, "", &mut diags),
            Value::Null => validate_object(&self.attributes, &Map::new(), "", &mut diags),
            other => diags.add_error(
                "Invalid Configuration",
                format!("Expected an object, got: {other}"),
            ),
        }
        diags
    }

    /// Fill unset attributes that declare a default
    pub fn apply_defaults(&self, value: &mut Value) {
        let Some(obj) = value.as_object_mut() else {
            return;
        };
        for (name, attr) in &self.attributes {
            if let Some(default) = &attr.default {
                let slot = obj.entry(name.clone()).or_insert(Value::Null);
                if slot.is_null() {
                    *slot = default.clone();
                }
            }
        }
    }

    /// Ensure every attribute is present, inserting `null` where missing
    pub fn complete(&self, value: &mut Value) {
        if let Some(obj) = value.as_object_mut() {
            for name in self.attributes.keys() {
                obj.entry(name.clone()).or_insert(Value::Null);
            }
        }
    }

    /// Attributes marked `requires_replace` whose value differs between documents
    pub fn requires_replace(&self, prior: &Value, planned: &Value) -> Vec<String> {
        self.attributes
            .iter()
            .filter(|(_, attr)| attr.requires_replace)
            .filter(|(name, _)| {
                prior.get(name.as_str()).unwrap_or(&Value::Null)
                    != planned.get(name.as_str()).unwrap_or(&Value::Null)
            })
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Copy of `value` with sensitive attributes masked
    pub fn redact(&self, value: &Value) -> Value {
        redact_object(&self.attributes, value)
    }
}

fn validate_object(
    attributes: &BTreeMap<String, Attribute>,
    obj: &Map<String, Value>,
    prefix: &str,
    diags: &mut Diagnostics,
) {
    for key in obj.keys() {
        if !attributes.contains_key(key) {
            diags.add_attribute_error(
                join_path(prefix, key),
                "Unsupported argument",
                format!("An argument named \"{key}\" is not expected here."),
            );
        }
    }

    for (name, attr) in attributes {
        let path = join_path(prefix, name);
        let value = obj.get(name).unwrap_or(&Value::Null);

        if value.is_null() {
            if attr.required {
                diags.add_attribute_error(
                    &path,
                    "Missing required argument",
                    format!("The argument \"{name}\" is required, but no definition was found."),
                );
            }
            continue;
        }

        if attr.is_read_only() {
            diags.add_attribute_error(
                &path,
                "Invalid Configuration for Read-Only Attribute",
                "Cannot set value for this attribute as the provider has marked it as read-only. \
                 Remove the configuration line setting the value.",
            );
            continue;
        }

        if !attr.type_matches(value) {
            diags.add_attribute_error(
                &path,
                "Incorrect attribute value type",
                format!(
                    "Inappropriate value for attribute \"{name}\": {} required.",
                    attr.type_name()
                ),
            );
            continue;
        }

        for validator in &attr.validators {
            validator.check(&path, value, diags);
        }

        if let (AttributeKind::ListNested { attributes: nested }, Value::Array(items)) =
            (&attr.kind, value)
        {
            for (i, item) in items.iter().enumerate() {
                let item_path = format!("{path}[{i}]");
                match item.as_object() {
                    Some(item_obj) => validate_object(nested, item_obj, &item_path, diags),
                    None => diags.add_attribute_error(
                        &item_path,
                        "Incorrect attribute value type",
                        "Inappropriate value: object required.",
                    ),
                }
            }
        }
    }
}

fn redact_object(attributes: &BTreeMap<String, Attribute>, value: &Value) -> Value {
    let Some(obj) = value.as_object() else {
        return value.clone();
    };
    let mut out = obj.clone();
    for (name, attr) in attributes {
        let Some(slot) = out.get_mut(name) else {
            continue;
        };
        let replacement = if attr.sensitive && !slot.is_null() {
            Some(Value::String("(sensitive)".to_string()))
        } else if let (AttributeKind::ListNested { attributes: nested }, Value::Array(items)) =
            (&attr.kind, &*slot)
        {
            Some(Value::Array(
                items.iter().map(|item| redact_object(nested, item)).collect(),
            ))
        } else {
            None
        };
        if let Some(replacement) = replacement {
            *slot = replacement;
        }
    }
    Value::Object(out)
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Schemas of the provider and everything it serves
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderSchema {
    pub provider: Schema,
    pub resources: BTreeMap<String, Schema>,
    pub data_sources: BTreeMap<String, Schema>,
}

/// Shorthand for building nested attribute maps
pub fn attributes<const N: usize>(items: [(&str, Attribute); N]) -> BTreeMap<String, Attribute> {
    items
        .into_iter()
        .map(|(name, attr)| (name.to_string(), attr))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new("test")
            .with_attribute(
                "name",
                Attribute::required_string()
                    .validator(Validator::StringLength { min: 1, max: 4 })
                    .requires_replace(),
            )
            .with_attribute("limit", Attribute::optional_computed_int64().default_value(10))
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("secret", Attribute::computed_string().sensitive())
            .with_attribute(
                "parts",
                Attribute::optional_computed_list(attributes([(
                    "kind",
                    Attribute::required_string().validator(Validator::one_of(&["a", "b"])),
                )]))
                .validator(Validator::ListSize { min: 1, max: 2 })
                .validator(Validator::UniqueItems),
            )
    }

    fn error_paths(diags: &Diagnostics) -> Vec<String> {
        diags.errors().filter_map(|d| d.attribute.clone()).collect()
    }

    #[test]
    fn test_valid_config() {
        let diags = schema().validate(&json!({"name": "abc", "parts": [{"kind": "a"}]}));
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn test_missing_required_and_read_only() {
        let diags = schema().validate(&json!({"id": "x"}));
        let mut paths = error_paths(&diags);
        paths.sort();
        assert_eq!(paths, vec!["id", "name"]);
    }

    #[test]
    fn test_type_mismatch_and_unknown_argument() {
        let diags = schema().validate(&json!({"name": "abc", "limit": "ten", "extra": 1}));
        let mut paths = error_paths(&diags);
        paths.sort();
        assert_eq!(paths, vec!["extra", "limit"]);
    }

    #[test]
    fn test_nested_validators() {
        let diags = schema().validate(&json!({
            "name": "toolong",
            "parts": [{"kind": "a"}, {"kind": "a"}, {"kind": "c"}]
        }));
        let summaries: Vec<_> = diags.errors().map(|d| d.summary.as_str()).collect();
        assert!(summaries.contains(&"Invalid Attribute Value Length"));
        assert!(summaries.contains(&"Invalid Attribute Value"));
        assert!(summaries.contains(&"Duplicate List Value"));
        assert!(summaries.contains(&"Invalid Attribute Value Match"));
        assert!(error_paths(&diags).contains(&"parts[2].kind".to_string()));
    }

    #[test]
    fn test_apply_defaults_only_fills_unset() {
        let s = schema();
        let mut value = json!({"name": "a"});
        s.apply_defaults(&mut value);
        assert_eq!(value["limit"], 10);

        let mut value = json!({"name": "a", "limit": 3});
        s.apply_defaults(&mut value);
        assert_eq!(value["limit"], 3);
    }

    #[test]
    fn test_requires_replace_detects_change() {
        let s = schema();
        let prior = json!({"name": "a", "limit": 1});
        assert!(s.requires_replace(&prior, &json!({"name": "a", "limit": 2})).is_empty());
        assert_eq!(
            s.requires_replace(&prior, &json!({"name": "b", "limit": 1})),
            vec!["name"]
        );
    }

    #[test]
    fn test_redact_masks_sensitive_values() {
        let s = schema();
        let redacted = s.redact(&json!({"name": "a", "secret": "s3cr3t"}));
        assert_eq!(redacted["secret"], "(sensitive)");
        assert_eq!(redacted["name"], "a");

        let redacted = s.redact(&json!({"secret": null}));
        assert!(redacted["secret"].is_null());
    }

    #[test]
    fn test_uuid_validator() {
        let s = Schema::new("").with_attribute(
            "id",
            Attribute::required_string().validator(Validator::Uuid),
        );
        assert!(s.validate(&json!({"id": "4a5e3c2b-1d0f-4e9a-8b7c-6d5e4f3a2b1c"})).is_empty());
        let diags = s.validate(&json!({"id": "nope"}));
        assert_eq!(
            diags.errors().next().unwrap().summary,
            "Validation error. Ensure the Id is in UUID format."
        );
    }

    #[test]
    fn test_schema_serializes_flags() {
        let value = serde_json::to_value(Attribute::computed_string().sensitive()).unwrap();
        assert_eq!(value, json!({"type": "string", "computed": true, "sensitive": true}));
    }
}
