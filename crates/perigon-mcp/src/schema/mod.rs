//! Declarative tool input schemas.
//!
//! A [`Schema`] is plain data: an ordered list of [`FieldSpec`]s, each with
//! a kind, optionality, a default and a pipeline of [`Step`]s that run in
//! order. Validation collects every failing field into a list of
//! [`FieldError`]s instead of stopping at the first one, so a caller can fix
//! exactly the fields that are wrong.
//!
//! The same data renders the JSON Schema shown to MCP clients, LLMs and the
//! tool inspector UI.

pub mod fragments;
pub mod location;
pub mod query;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

pub use location::{ClassifiedLocation, LocationKind, classify_location, resolve_location};
pub use query::{has_query_syntax, normalize_query};

use crate::error::FieldError;

/// Value type a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A JSON string.
    String,
    /// An integer (integral JSON number or numeric string).
    Integer,
    /// A boolean (or the strings `"true"`/`"false"`).
    Boolean,
    /// A list of strings; a bare string is accepted as a one-element list.
    StringList,
    /// A date string, parsed by [`Step::ParseDate`].
    Date,
    /// One of a fixed set of strings.
    Enum(&'static [&'static str]),
}

impl FieldKind {
    fn label(self) -> &'static str {
        match self {
            Self::String | Self::Date | Self::Enum(_) => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::StringList => "array of strings",
        }
    }
}

/// Default applied when a field is absent after its pipeline ran.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// A fixed value, also advertised in the JSON Schema.
    Static(Value),
    /// Today (UTC) minus N days as `yyyy-mm-dd`, computed at validation time.
    DaysAgo(i64),
}

impl DefaultValue {
    fn resolve(&self) -> Value {
        match self {
            Self::Static(value) => value.clone(),
            Self::DaysAgo(days) => {
                let date = Utc::now().date_naive() - chrono::Duration::days(*days);
                Value::String(date.format("%Y-%m-%d").to_string())
            }
        }
    }
}

/// One stage of a field's validation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Trim surrounding whitespace (strings and list items).
    Trim,
    /// Treat `""` as absent; drop empty list items and treat `[]` as absent.
    EmptyAsAbsent,
    /// ASCII lower-case (strings and list items).
    Lowercase,
    /// ASCII upper-case (strings and list items).
    Uppercase,
    /// Apply [`normalize_query`].
    NormalizeQuery,
    /// Clamp an integer into `[min, max]`.
    Clamp {
        /// Lower bound.
        min: i64,
        /// Upper bound.
        max: i64,
    },
    /// Reject integers below the bound.
    AtLeast(i64),
    /// Reject integers above the bound.
    AtMost(i64),
    /// Require an exact character length (strings and list items).
    Length(usize),
    /// Reject lists longer than the bound.
    MaxItems(usize),
    /// Parse ISO-8601 / `yyyy-mm-dd` and re-emit in canonical form.
    ParseDate,
}

/// Declaration of a single input field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: &'static str,
    kind: FieldKind,
    description: &'static str,
    required: bool,
    default: Option<DefaultValue>,
    steps: Vec<Step>,
}

impl FieldSpec {
    fn new(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self { name, kind, description, required: false, default: None, steps: Vec::new() }
    }

    /// Optional string field.
    #[must_use]
    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldKind::String, description)
    }

    /// Optional integer field.
    #[must_use]
    pub fn integer(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldKind::Integer, description)
    }

    /// Optional boolean field.
    #[must_use]
    pub fn boolean(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldKind::Boolean, description)
    }

    /// Optional list-of-strings field.
    #[must_use]
    pub fn string_list(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldKind::StringList, description)
    }

    /// Optional date field (empty string is absent).
    #[must_use]
    pub fn date(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldKind::Date, description).steps([
            Step::Trim,
            Step::EmptyAsAbsent,
            Step::ParseDate,
        ])
    }

    /// Optional enum field.
    #[must_use]
    pub fn one_of(
        name: &'static str,
        values: &'static [&'static str],
        description: &'static str,
    ) -> Self {
        Self::new(name, FieldKind::Enum(values), description)
    }

    /// Mark the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set a static default.
    #[must_use]
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(DefaultValue::Static(value));
        self
    }

    /// Default to today minus `days`, computed when validating.
    #[must_use]
    pub fn default_days_ago(mut self, days: i64) -> Self {
        self.default = Some(DefaultValue::DaysAgo(days));
        self
    }

    /// Append a pipeline step.
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Append several pipeline steps in order.
    #[must_use]
    pub fn steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Field name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Field kind.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Whether the field is required.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Human-readable description.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        self.description
    }

    /// Run this field against the raw argument object.
    ///
    /// `Ok(None)` means the field is absent with no default.
    fn validate(&self, raw: Option<&Value>) -> Result<Option<Value>, FieldError> {
        let present = raw.filter(|v| !v.is_null());

        let mut slot = match present {
            Some(value) => Some(self.coerce(value)?),
            None => None,
        };

        for step in &self.steps {
            let Some(current) = slot.take() else { break };
            slot = self.apply(*step, current)?;
        }

        if let (Some(Slot::Str(value)), FieldKind::Enum(allowed)) = (&slot, self.kind) {
            if !allowed.contains(&value.as_str()) {
                return Err(self.error(format!(
                    "'{value}' is not one of: {}",
                    allowed.join(", ")
                )));
            }
        }

        match slot {
            Some(value) => Ok(Some(value.into_json())),
            None => match &self.default {
                Some(default) => Ok(Some(default.resolve())),
                None if self.required => Err(self.error("is required")),
                None => Ok(None),
            },
        }
    }

    fn coerce(&self, value: &Value) -> Result<Slot, FieldError> {
        let mismatch = || {
            self.error(format!("expected {}, got {}", self.kind.label(), json_type_name(value)))
        };

        match self.kind {
            FieldKind::String | FieldKind::Date | FieldKind::Enum(_) => {
                value.as_str().map(|s| Slot::Str(s.to_string())).ok_or_else(mismatch)
            }
            FieldKind::Integer => match value {
                Value::Number(n) => n
                    .as_i64()
                    .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                    .map(Slot::Int)
                    .ok_or_else(mismatch),
                Value::String(s) => s.trim().parse().map(Slot::Int).map_err(|_| mismatch()),
                _ => Err(mismatch()),
            },
            FieldKind::Boolean => match value {
                Value::Bool(b) => Ok(Slot::Bool(*b)),
                Value::String(s) if s == "true" => Ok(Slot::Bool(true)),
                Value::String(s) if s == "false" => Ok(Slot::Bool(false)),
                _ => Err(mismatch()),
            },
            FieldKind::StringList => match value {
                Value::String(s) => Ok(Slot::List(vec![s.clone()])),
                Value::Array(items) => items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        item.as_str().map(str::to_string).ok_or_else(|| {
                            self.error(format!(
                                "item {i}: expected string, got {}",
                                json_type_name(item)
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Slot::List),
                _ => Err(mismatch()),
            },
        }
    }

    fn apply(&self, step: Step, slot: Slot) -> Result<Option<Slot>, FieldError> {
        let out = match (step, slot) {
            (Step::Trim, slot) => slot.map_text(|s| s.trim().to_string()),
            (Step::Lowercase, slot) => slot.map_text(|s| s.to_ascii_lowercase()),
            (Step::Uppercase, slot) => slot.map_text(|s| s.to_ascii_uppercase()),
            (Step::EmptyAsAbsent, Slot::Str(s)) if s.is_empty() => return Ok(None),
            (Step::EmptyAsAbsent, Slot::List(items)) => {
                let items: Vec<String> = items.into_iter().filter(|s| !s.is_empty()).collect();
                if items.is_empty() {
                    return Ok(None);
                }
                Slot::List(items)
            }
            (Step::NormalizeQuery, Slot::Str(s)) => Slot::Str(normalize_query(&s)),
            (Step::Clamp { min, max }, Slot::Int(n)) => Slot::Int(n.clamp(min, max)),
            (Step::AtLeast(min), Slot::Int(n)) => {
                if n < min {
                    return Err(self.error(format!("must be at least {min}, got {n}")));
                }
                Slot::Int(n)
            }
            (Step::AtMost(max), Slot::Int(n)) => {
                if n > max {
                    return Err(self.error(format!("must be at most {max}, got {n}")));
                }
                Slot::Int(n)
            }
            (Step::Length(len), Slot::Str(s)) => {
                if s.chars().count() != len {
                    return Err(self.error(format!("must be exactly {len} characters, got '{s}'")));
                }
                Slot::Str(s)
            }
            (Step::Length(len), Slot::List(items)) => {
                if let Some(bad) = items.iter().find(|s| s.chars().count() != len) {
                    return Err(self.error(format!(
                        "every item must be exactly {len} characters, got '{bad}'"
                    )));
                }
                Slot::List(items)
            }
            (Step::MaxItems(max), Slot::List(items)) => {
                if items.len() > max {
                    return Err(
                        self.error(format!("at most {max} items allowed, got {}", items.len()))
                    );
                }
                Slot::List(items)
            }
            (Step::ParseDate, Slot::Str(s)) => match parse_date(&s) {
                Some(date) => Slot::Str(date),
                None => {
                    return Err(self.error(format!(
                        "invalid date '{s}', expected ISO-8601 (2024-01-31T12:00:00Z) or yyyy-mm-dd"
                    )));
                }
            },
            // Steps that do not apply to this value shape are no-ops.
            (_, slot) => slot,
        };
        Ok(Some(out))
    }

    fn error(&self, problem: impl Into<String>) -> FieldError {
        FieldError::new(self.name, problem)
    }

    fn json_schema(&self) -> Value {
        let mut prop = match self.kind {
            FieldKind::String => json!({"type": "string"}),
            FieldKind::Integer => json!({"type": "integer"}),
            FieldKind::Boolean => json!({"type": "boolean"}),
            FieldKind::StringList => json!({"type": "array", "items": {"type": "string"}}),
            FieldKind::Date => json!({"type": "string"}),
            FieldKind::Enum(values) => json!({"type": "string", "enum": values}),
        };

        prop["description"] = json!(self.description);

        if let Some(DefaultValue::Static(value)) = &self.default {
            prop["default"] = value.clone();
        }

        for step in &self.steps {
            match step {
                Step::Clamp { min, max } => {
                    prop["minimum"] = json!(min);
                    prop["maximum"] = json!(max);
                }
                Step::AtLeast(min) => prop["minimum"] = json!(min),
                Step::AtMost(max) => prop["maximum"] = json!(max),
                Step::MaxItems(max) => prop["maxItems"] = json!(max),
                _ => {}
            }
        }

        prop
    }
}

/// In-flight field value while the pipeline runs.
#[derive(Debug, Clone)]
enum Slot {
    Str(String),
    Int(i64),
    Bool(bool),
    List(Vec<String>),
}

impl Slot {
    fn map_text(self, f: impl Fn(&str) -> String) -> Self {
        match self {
            Self::Str(s) => Self::Str(f(&s)),
            Self::List(items) => Self::List(items.iter().map(|s| f(s)).collect()),
            other => other,
        }
    }

    fn into_json(self) -> Value {
        match self {
            Self::Str(s) => Value::String(s),
            Self::Int(n) => json!(n),
            Self::Bool(b) => Value::Bool(b),
            Self::List(items) => json!(items),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parse a caller-supplied date.
///
/// Datetimes come back as RFC 3339 UTC, plain dates as `yyyy-mm-dd`.
#[must_use]
pub fn parse_date(input: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Secs, true));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d").ok().map(|d| d.format("%Y-%m-%d").to_string())
}

/// A tool's input schema.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// Create an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one field.
    #[must_use]
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a shared fragment.
    #[must_use]
    pub fn fragment(mut self, fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Declared fields in order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Look up a field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validate and normalize raw arguments.
    ///
    /// `null` is treated as an empty object. Undeclared fields are dropped.
    pub fn validate(&self, args: &Value) -> Result<Validated, Vec<FieldError>> {
        let empty = Map::new();
        let object = match args {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => {
                return Err(vec![FieldError::new(
                    "arguments",
                    format!("expected an object, got {}", json_type_name(other)),
                )]);
            }
        };

        let mut normalized = Map::new();
        let mut errors = Vec::new();

        for field in &self.fields {
            match field.validate(object.get(field.name)) {
                Ok(Some(value)) => {
                    normalized.insert(field.name.to_string(), value);
                }
                Ok(None) => {}
                Err(err) => errors.push(err),
            }
        }

        if errors.is_empty() { Ok(Validated(normalized)) } else { Err(errors) }
    }

    /// Render as a JSON Schema object.
    #[must_use]
    pub fn json_schema(&self) -> Value {
        let properties: Map<String, Value> =
            self.fields.iter().map(|f| (f.name.to_string(), f.json_schema())).collect();
        let required: Vec<&str> =
            self.fields.iter().filter(|f| f.required).map(|f| f.name).collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// Arguments that passed validation, with defaults applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validated(Map<String, Value>);

impl Validated {
    /// Raw normalized value of a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Normalized string value of a field.
    #[must_use]
    pub fn str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Whether a field is present after normalization.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Deserialize into a typed input struct.
    pub fn into_input<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.0))
    }

    /// Borrow as a JSON object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Schema {
        Schema::new()
            .field(FieldSpec::string("name", "Name").required().step(Step::Trim))
            .field(FieldSpec::integer("size", "Size").default_value(json!(10)).step(
                Step::Clamp { min: 1, max: 1000 },
            ))
            .field(FieldSpec::boolean("flag", "Flag"))
            .field(FieldSpec::one_of("sort", &["date", "relevance"], "Sort").step(Step::Lowercase))
    }

    #[test]
    fn test_defaults_and_stripping() {
        let out = sample().validate(&json!({"name": " x ", "extra": 1})).unwrap();
        assert_eq!(out.str("name"), Some("x"));
        assert_eq!(out.get("size"), Some(&json!(10)));
        assert!(!out.contains("flag"));
        assert!(!out.contains("extra"));
    }

    #[test]
    fn test_reports_every_failing_field() {
        let errors = sample()
            .validate(&json!({"size": "ten", "flag": 3, "sort": "oldest"}))
            .unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "size", "flag", "sort"]);
        assert_eq!(errors[0].problem, "is required");
        assert_eq!(errors[1].problem, "expected integer, got string");
    }

    #[test]
    fn test_integer_coercion() {
        let out = sample().validate(&json!({"name": "a", "size": "25"})).unwrap();
        assert_eq!(out.get("size"), Some(&json!(25)));

        let out = sample().validate(&json!({"name": "a", "size": 5000.0})).unwrap();
        assert_eq!(out.get("size"), Some(&json!(1000)));

        let errors = sample().validate(&json!({"name": "a", "size": 2.5})).unwrap_err();
        assert_eq!(errors[0].field, "size");
    }

    #[test]
    fn test_enum_after_transform() {
        let out = sample().validate(&json!({"name": "a", "sort": "DATE"})).unwrap();
        assert_eq!(out.str("sort"), Some("date"));
    }

    #[test]
    fn test_null_is_absent() {
        let out = sample().validate(&json!({"name": "a", "flag": null})).unwrap();
        assert!(!out.contains("flag"));
        assert!(sample().validate(&Value::Null).is_err());
    }

    #[test]
    fn test_non_object_arguments() {
        let errors = sample().validate(&json!([1, 2])).unwrap_err();
        assert_eq!(errors, vec![FieldError::new("arguments", "expected an object, got array")]);
    }

    #[test]
    fn test_parse_date_forms() {
        assert_eq!(parse_date("2024-01-01").as_deref(), Some("2024-01-01"));
        assert_eq!(parse_date("2024-01-01T10:00:00Z").as_deref(), Some("2024-01-01T10:00:00Z"));
        assert_eq!(
            parse_date("2024-01-01T10:00:00+02:00").as_deref(),
            Some("2024-01-01T08:00:00Z")
        );
        assert_eq!(parse_date("2024-01-01T10:00:00").as_deref(), Some("2024-01-01T10:00:00Z"));
        assert_eq!(parse_date("2024-01-01T10:00:00.250").as_deref(), Some("2024-01-01T10:00:00Z"));
        assert!(parse_date("yesterday").is_none());
        assert!(parse_date("2024-13-01").is_none());
    }

    #[test]
    fn test_days_ago_default_is_computed() {
        let schema = Schema::new().field(FieldSpec::date("from", "From").default_days_ago(7));
        let out = schema.validate(&json!({})).unwrap();
        let expected = (Utc::now().date_naive() - chrono::Duration::days(7)).format("%Y-%m-%d");
        assert_eq!(out.str("from"), Some(expected.to_string().as_str()));
    }

    #[test]
    fn test_json_schema_shape() {
        let schema = sample().json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["name"]));
        assert_eq!(schema["properties"]["size"]["default"], 10);
        assert_eq!(schema["properties"]["size"]["maximum"], 1000);
        assert_eq!(schema["properties"]["sort"]["enum"], json!(["date", "relevance"]));
        assert_eq!(schema["properties"]["name"]["description"], "Name");
    }
}
