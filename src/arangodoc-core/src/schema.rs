//! Declarative document validation.
//!
//! A `Schema` is a list of rules built with chained calls. Presence rules
//! (`must_have` / `should_have`) open a field; the value rules that follow
//! (`not_null`, `of_type`, `min`, `max`, `range`, `size`, `matches`) attach to it.
//!
//! ```
//! use arangodoc_core::{Document, Schema, ValueKind};
//!
//! let mut schema = Schema::new();
//! schema
//!     .must_have("name").of_type(ValueKind::String).min(2)
//!     .should_have("age").of_type(ValueKind::Int).message("age must be a number");
//!
//! let mut doc = Document::new();
//! doc.set("name", "Al").unwrap();
//! doc.set("age", "old").unwrap();
//!
//! let result = schema.validate(&doc);
//! assert!(!result.is_valid());
//! assert_eq!(result.violations[0].violation_message(), "age must be a number");
//! ```

use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::document::Document;
use crate::error::SchemaError;
use crate::value::{Value, ValueKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    MustHave,
    ShouldHave,
    NotNull,
    Type,
    Min,
    Max,
    Range,
    Size,
    Match,
}

impl ConstraintKind {
    pub fn name(&self) -> &'static str {
        match self {
            ConstraintKind::MustHave => "must-have",
            ConstraintKind::ShouldHave => "should-have",
            ConstraintKind::NotNull => "not-null",
            ConstraintKind::Type => "type",
            ConstraintKind::Min => "min",
            ConstraintKind::Max => "max",
            ConstraintKind::Range => "range",
            ConstraintKind::Size => "size",
            ConstraintKind::Match => "match",
        }
    }

    pub fn is_presence(&self) -> bool {
        matches!(self, ConstraintKind::MustHave | ConstraintKind::ShouldHave)
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compiled regular expression plus the source it was built from
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    ignore_case: bool,
}

impl Pattern {
    pub fn new(pattern: &str, ignore_case: bool) -> Result<Self, SchemaError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(ignore_case)
            .build()?;
        Ok(Self { regex, ignore_case })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str() && self.ignore_case == other.ignore_case
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    MustHave,
    ShouldHave,
    NotNull,
    Type(ValueKind),
    Min(i64),
    Max(i64),
    Range(i64, i64),
    Size(i64),
    Match(Pattern),
}

impl Constraint {
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Constraint::MustHave => ConstraintKind::MustHave,
            Constraint::ShouldHave => ConstraintKind::ShouldHave,
            Constraint::NotNull => ConstraintKind::NotNull,
            Constraint::Type(_) => ConstraintKind::Type,
            Constraint::Min(_) => ConstraintKind::Min,
            Constraint::Max(_) => ConstraintKind::Max,
            Constraint::Range(..) => ConstraintKind::Range,
            Constraint::Size(_) => ConstraintKind::Size,
            Constraint::Match(_) => ConstraintKind::Match,
        }
    }

    /// Value predicate; presence constraints always hold for a present field
    fn check(&self, value: &Value) -> bool {
        match self {
            Constraint::MustHave | Constraint::ShouldHave => true,
            Constraint::NotNull => !value.is_null(),
            Constraint::Type(kind) => value.kind() == *kind,
            Constraint::Min(min) => measure(value).is_some_and(|m| m >= *min),
            Constraint::Max(max) => measure(value).is_some_and(|m| m <= *max),
            Constraint::Range(lo, hi) => measure(value).is_some_and(|m| *lo <= m && m <= *hi),
            Constraint::Size(size) => length(value).is_some_and(|len| len == *size),
            Constraint::Match(pattern) => value.as_str().is_some_and(|s| pattern.is_match(s)),
        }
    }
}

fn length(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => Some(s.chars().count() as i64),
        Value::List(items) => Some(items.len() as i64),
        _ => None,
    }
}

/// Quantity compared by min/max/range: string length, integer value or element count
fn measure(value: &Value) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i),
        other => length(other),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub field: String,
    pub constraint: Constraint,
    pub message: Option<String>,
}

impl Rule {
    pub fn kind(&self) -> ConstraintKind {
        self.constraint.kind()
    }

    /// Custom message, or one built from the field path and constraint kind
    pub fn violation_message(&self) -> String {
        match &self.message {
            Some(message) => message.clone(),
            None => format!("field '{}' violates {} constraint", self.field, self.kind()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    pub violations: Vec<Rule>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(Rule::violation_message).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Schema {
    rules: Vec<Rule>,
    current_field: Option<String>,
    current_rule: Option<usize>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    fn upsert(&mut self, field: &str, constraint: Constraint) -> &mut Self {
        let index = match self
            .rules
            .iter()
            .position(|r| r.field == field && r.kind() == constraint.kind())
        {
            Some(i) => {
                self.rules[i].constraint = constraint;
                i
            }
            None => {
                self.rules.push(Rule {
                    field: field.to_string(),
                    constraint,
                    message: None,
                });
                self.rules.len() - 1
            }
        };
        self.current_rule = Some(index);
        self
    }

    fn presence(&mut self, field: &str, constraint: Constraint) -> &mut Self {
        self.current_field = Some(field.to_string());
        self.upsert(field, constraint)
    }

    fn value_rule(&mut self, constraint: Constraint) -> &mut Self {
        match self.current_field.clone() {
            Some(field) => self.upsert(&field, constraint),
            None => {
                tracing::warn!(
                    "Ignoring {} rule declared before any must_have/should_have",
                    constraint.kind()
                );
                self
            }
        }
    }

    /// Field must be present; opens `path` for the value rules that follow
    pub fn must_have(&mut self, path: &str) -> &mut Self {
        self.presence(path, Constraint::MustHave)
    }

    /// Field may be absent; value rules apply only when it is present
    pub fn should_have(&mut self, path: &str) -> &mut Self {
        self.presence(path, Constraint::ShouldHave)
    }

    pub fn not_null(&mut self) -> &mut Self {
        self.value_rule(Constraint::NotNull)
    }

    pub fn of_type(&mut self, kind: ValueKind) -> &mut Self {
        self.value_rule(Constraint::Type(kind))
    }

    pub fn min(&mut self, min: i64) -> &mut Self {
        self.value_rule(Constraint::Min(min))
    }

    pub fn max(&mut self, max: i64) -> &mut Self {
        self.value_rule(Constraint::Max(max))
    }

    pub fn range(&mut self, min: i64, max: i64) -> &mut Self {
        self.value_rule(Constraint::Range(min, max))
    }

    pub fn size(&mut self, size: i64) -> &mut Self {
        self.value_rule(Constraint::Size(size))
    }

    /// On a bad pattern no rule is recorded and a following `message` is ignored
    pub fn matches(
        &mut self,
        pattern: &str,
        ignore_case: bool,
    ) -> Result<&mut Self, SchemaError> {
        match Pattern::new(pattern, ignore_case) {
            Ok(pattern) => Ok(self.value_rule(Constraint::Match(pattern))),
            Err(e) => {
                self.current_rule = None;
                Err(e)
            }
        }
    }

    /// Custom violation message for the most recently declared rule
    pub fn message(&mut self, text: &str) -> &mut Self {
        match self.current_rule {
            Some(i) => self.rules[i].message = Some(text.to_string()),
            None => tracing::warn!("Ignoring message '{}' with no rule declared", text),
        }
        self
    }

    pub fn validate(&self, doc: &Document) -> ValidationResult {
        let mut result = ValidationResult::default();

        // A field may carry both presence kinds; value rules run once per field
        let mut fields: Vec<&str> = Vec::new();
        for presence in self.rules.iter().filter(|r| r.kind().is_presence()) {
            if !fields.contains(&presence.field.as_str()) {
                fields.push(&presence.field);
            }
        }

        for field in fields {
            let value = match doc.get_value(field) {
                Ok(value) => value,
                Err(_) => {
                    let missing = self
                        .rules
                        .iter()
                        .filter(|r| r.field == field && r.kind() == ConstraintKind::MustHave);
                    for rule in missing {
                        tracing::debug!("Schema violation: {}", rule.violation_message());
                        result.violations.push(rule.clone());
                    }
                    continue;
                }
            };

            let failed = self
                .rules
                .iter()
                .filter(|r| r.field == field && !r.kind().is_presence())
                .filter(|r| !r.constraint.check(value));
            for rule in failed {
                tracing::debug!("Schema violation: {}", rule.violation_message());
                result.violations.push(rule.clone());
            }
        }

        result
    }
}
