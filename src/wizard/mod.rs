mod validation;

pub use validation::{validate, Check, FieldRule, ValidationResult};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ConfigurationError;

/// The single record a wizard session accumulates. Always a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormState(Map<String, Value>);

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` unless `value` is a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn str_field(&self, field: &str) -> &str {
        self.0.get(field).and_then(Value::as_str).unwrap_or("")
    }

    /// Shallow merge: top-level keys in `patch` overwrite, everything else stays.
    pub fn merge(&mut self, patch: &Map<String, Value>) {
        for (k, v) in patch {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub ordinal: usize,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct StepDefinition {
    pub step: Step,
    pub rules: Vec<FieldRule>,
}

impl StepDefinition {
    pub fn new(ordinal: usize, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            step: Step {
                ordinal,
                name: name.into(),
                description: description.into(),
            },
            rules: Vec::new(),
        }
    }

    pub fn rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn validate(&self, form: &FormState) -> ValidationResult {
        validate(&self.rules, form)
    }
}

/// Linear step controller over one shared `FormState`.
///
/// Forward moves are gated by the current step's rules. `retreat` and `jump_to`
/// are never gated, so a user can revisit any step from the progress bar.
#[derive(Debug, Clone)]
pub struct WizardController {
    steps: Vec<StepDefinition>,
    current: usize,
    form: FormState,
    last_validation: ValidationResult,
}

impl WizardController {
    pub fn new(steps: Vec<StepDefinition>, initial: FormState) -> Result<Self, ConfigurationError> {
        if steps.is_empty() {
            return Err(ConfigurationError::NoSteps);
        }
        for (i, def) in steps.iter().enumerate() {
            if def.step.ordinal != i + 1 {
                return Err(ConfigurationError::OrdinalMismatch {
                    expected: i + 1,
                    found: def.step.ordinal,
                });
            }
        }
        Ok(Self {
            steps,
            current: 1,
            form: initial,
            last_validation: ValidationResult::new(),
        })
    }

    pub fn current_step(&self) -> usize {
        self.current
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn is_final_step(&self) -> bool {
        self.current == self.steps.len()
    }

    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().map(|d| &d.step)
    }

    pub fn definitions(&self) -> &[StepDefinition] {
        &self.steps
    }

    pub fn form_state(&self) -> &FormState {
        &self.form
    }

    /// Result of the most recent blocked or successful `advance`.
    pub fn last_validation(&self) -> &ValidationResult {
        &self.last_validation
    }

    pub fn update_form_state(&mut self, patch: &Map<String, Value>) {
        self.form.merge(patch);
    }

    pub fn validate_current_step(&self) -> ValidationResult {
        self.steps[self.current - 1].validate(&self.form)
    }

    /// Validates the current step and moves forward by one if it passes.
    /// At the last step a passing validation leaves the position unchanged.
    pub fn advance(&mut self) -> &ValidationResult {
        let result = self.validate_current_step();
        if result.is_valid() {
            let from = self.current;
            self.current = (self.current + 1).min(self.steps.len());
            tracing::debug!(from, to = self.current, "wizard advanced");
        } else {
            tracing::debug!(
                step = self.current,
                failed = result.len(),
                "wizard advance blocked by validation"
            );
        }
        self.last_validation = result;
        &self.last_validation
    }

    pub fn retreat(&mut self) {
        let from = self.current;
        self.current = self.current.saturating_sub(1).max(1);
        self.last_validation = ValidationResult::new();
        tracing::debug!(from, to = self.current, "wizard retreated");
    }

    /// Returns whether the position changed.
    pub fn jump_to(&mut self, ordinal: usize) -> bool {
        if !(1..=self.steps.len()).contains(&ordinal) {
            return false;
        }
        let from = self.current;
        self.current = ordinal;
        self.last_validation = ValidationResult::new();
        tracing::debug!(from, to = ordinal, "wizard jumped");
        from != ordinal
    }

    /// Validation for every step, keyed by ordinal. Only failing steps appear.
    pub fn validate_all(&self) -> Vec<(usize, ValidationResult)> {
        self.steps
            .iter()
            .map(|d| (d.step.ordinal, d.validate(&self.form)))
            .filter(|(_, r)| !r.is_valid())
            .collect()
    }
}
