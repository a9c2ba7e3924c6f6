use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::FormState;

/// Field name -> message for every field that failed. Empty means the step passes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationResult(BTreeMap<String, String>);

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    /// Non-empty string after trimming.
    RequiredString,
    /// String equal to one of the listed values.
    OneOf(Vec<String>),
    /// Integer >= 1, optionally capped.
    PositiveInt { max: Option<i64> },
    /// Array with at least one non-empty identifier.
    Selection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    pub field: String,
    pub check: Check,
    pub message: Option<String>,
}

impl FieldRule {
    pub fn required(field: impl Into<String>) -> Self {
        Self::new(field, Check::RequiredString)
    }

    pub fn one_of<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(field, Check::OneOf(values.into_iter().map(Into::into).collect()))
    }

    pub fn positive_int(field: impl Into<String>, max: Option<i64>) -> Self {
        Self::new(field, Check::PositiveInt { max })
    }

    pub fn selection(field: impl Into<String>) -> Self {
        Self::new(field, Check::Selection)
    }

    fn new(field: impl Into<String>, check: Check) -> Self {
        Self {
            field: field.into(),
            check,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Returns the failure message, or `None` if the field passes.
    pub fn check(&self, form: &FormState) -> Option<String> {
        let failure = check_value(&self.check, form.get(&self.field))?;
        Some(self.message.clone().unwrap_or(failure))
    }
}

fn check_value(check: &Check, value: Option<&Value>) -> Option<String> {
    match check {
        Check::RequiredString => match value.and_then(Value::as_str) {
            Some(s) if !s.trim().is_empty() => None,
            _ => Some("required".to_string()),
        },
        Check::OneOf(allowed) => {
            let s = match value.and_then(Value::as_str).map(str::trim) {
                Some(s) if !s.is_empty() => s,
                _ => return Some("required".to_string()),
            };
            if allowed.iter().any(|a| a == s) {
                None
            } else {
                Some(format!("must be one of: {}", allowed.join(", ")))
            }
        }
        Check::PositiveInt { max } => {
            let n = match value.and_then(Value::as_i64) {
                Some(n) if n >= 1 => n,
                _ => return Some("must be a positive integer".to_string()),
            };
            match max {
                Some(m) if n > *m => Some(format!("must be at most {}", m)),
                _ => None,
            }
        }
        Check::Selection => {
            let selected = value
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter(|v| v.as_str().map(|s| !s.trim().is_empty()).unwrap_or(false))
                        .count()
                })
                .unwrap_or(0);
            if selected > 0 {
                None
            } else {
                Some("select at least one".to_string())
            }
        }
    }
}

pub fn validate(rules: &[FieldRule], form: &FormState) -> ValidationResult {
    let mut out = ValidationResult::new();
    for rule in rules {
        if let Some(message) = rule.check(form) {
            out.insert(rule.field.clone(), message);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(v: serde_json::Value) -> FormState {
        FormState::from_value(v).expect("object")
    }

    #[test]
    fn required_string_rejects_whitespace() {
        let rules = [FieldRule::required("examName")];
        let res = validate(&rules, &form(json!({ "examName": "   " })));
        assert_eq!(res.get("examName"), Some("required"));
        assert!(validate(&rules, &form(json!({ "examName": " Midterm " }))).is_valid());
    }

    #[test]
    fn one_of_distinguishes_missing_from_unknown() {
        let rules = [FieldRule::one_of("method", ["manual", "automatic"])];
        let missing = validate(&rules, &form(json!({})));
        assert_eq!(missing.get("method"), Some("required"));
        let unknown = validate(&rules, &form(json!({ "method": "magic" })));
        assert_eq!(unknown.get("method"), Some("must be one of: manual, automatic"));
    }

    #[test]
    fn positive_int_honors_cap_and_rejects_strings() {
        let rules = [FieldRule::positive_int("totalQuestions", Some(50))];
        assert!(validate(&rules, &form(json!({ "totalQuestions": 10 }))).is_valid());
        assert_eq!(
            validate(&rules, &form(json!({ "totalQuestions": 0 }))).get("totalQuestions"),
            Some("must be a positive integer")
        );
        assert_eq!(
            validate(&rules, &form(json!({ "totalQuestions": "10" }))).get("totalQuestions"),
            Some("must be a positive integer")
        );
        assert_eq!(
            validate(&rules, &form(json!({ "totalQuestions": 51 }))).get("totalQuestions"),
            Some("must be at most 50")
        );
    }

    #[test]
    fn selection_ignores_blank_ids() {
        let rules = [FieldRule::selection("selectedQuestionIds")];
        let blank = validate(&rules, &form(json!({ "selectedQuestionIds": ["", " "] })));
        assert_eq!(blank.get("selectedQuestionIds"), Some("select at least one"));
        assert!(validate(&rules, &form(json!({ "selectedQuestionIds": ["q1"] }))).is_valid());
    }

    #[test]
    fn custom_message_overrides_default() {
        let rules = [FieldRule::required("subject").with_message("pick a subject")];
        let res = validate(&rules, &form(json!({})));
        assert_eq!(res.get("subject"), Some("pick a subject"));
    }
}
