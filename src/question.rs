//! The create-question-set wizard: six steps from question type through
//! question selection, and the record handed to the store at the end.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ConfigurationError;
use crate::wizard::{FieldRule, FormState, StepDefinition, ValidationResult, WizardController};

pub const QUESTION_TYPES: [&str; 3] = ["mcq", "written", "mixed"];
pub const METHODS: [&str; 2] = ["manual", "automatic"];
pub const DEFAULT_MAX_TOTAL_QUESTIONS: i64 = 100;

/// Knobs that come from the workspace `wizard` setup section.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardSettings {
    pub default_question_type: String,
    pub default_method: String,
    pub max_total_questions: i64,
}

impl Default for WizardSettings {
    fn default() -> Self {
        Self {
            default_question_type: String::new(),
            default_method: String::new(),
            max_total_questions: DEFAULT_MAX_TOTAL_QUESTIONS,
        }
    }
}

pub fn step_definitions(settings: &WizardSettings) -> Vec<StepDefinition> {
    vec![
        StepDefinition::new(1, "Question Type", "Choose the kind of questions in this set")
            .rule(FieldRule::one_of("questionType", QUESTION_TYPES)),
        StepDefinition::new(2, "Method", "Pick questions by hand or let them be drawn")
            .rule(FieldRule::one_of("method", METHODS)),
        StepDefinition::new(3, "Exam Details", "Name the exam and who sits it")
            .rule(FieldRule::required("examName"))
            .rule(FieldRule::required("className"))
            .rule(FieldRule::required("group"))
            .rule(FieldRule::required("subject")),
        StepDefinition::new(4, "Chapter", "Narrow the pool to a chapter and question format")
            .rule(FieldRule::required("chapter"))
            .rule(FieldRule::required("questionTypeDetail")),
        StepDefinition::new(5, "Question Count", "How many questions the set holds")
            .rule(FieldRule::positive_int(
                "totalQuestions",
                Some(settings.max_total_questions),
            )),
        StepDefinition::new(6, "Select Questions", "Choose the questions to include")
            .rule(FieldRule::selection("selectedQuestionIds")),
    ]
}

pub fn initial_form_state(settings: &WizardSettings) -> FormState {
    let v = json!({
        "questionType": settings.default_question_type,
        "method": settings.default_method,
        "examName": "",
        "className": "",
        "group": "",
        "subject": "",
        "chapter": "",
        "questionTypeDetail": "",
        "totalQuestions": 0,
        "selectedQuestionIds": [],
    });
    FormState::from_value(v).unwrap_or_default()
}

pub fn new_wizard(settings: &WizardSettings) -> Result<WizardController, ConfigurationError> {
    WizardController::new(step_definitions(settings), initial_form_state(settings))
}

/// What gets persisted when a question set is finalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSetRecord {
    pub question_type: String,
    pub method: String,
    pub exam_name: String,
    pub class_name: String,
    pub group: String,
    pub subject: String,
    pub chapter: String,
    pub question_type_detail: String,
    pub total_questions: i64,
    pub selected_question_ids: Vec<String>,
}

impl QuestionSetRecord {
    /// Builds the record only when every step validates; otherwise returns
    /// the failing steps with their field messages.
    pub fn from_wizard(
        wizard: &WizardController,
    ) -> Result<Self, Vec<(usize, ValidationResult)>> {
        let failures = wizard.validate_all();
        if !failures.is_empty() {
            return Err(failures);
        }
        Ok(Self::from_form(wizard.form_state()))
    }

    fn from_form(form: &FormState) -> Self {
        let selected_question_ids = form
            .get("selectedQuestionIds")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Self {
            question_type: form.str_field("questionType").trim().to_string(),
            method: form.str_field("method").trim().to_string(),
            exam_name: form.str_field("examName").trim().to_string(),
            class_name: form.str_field("className").trim().to_string(),
            group: form.str_field("group").trim().to_string(),
            subject: form.str_field("subject").trim().to_string(),
            chapter: form.str_field("chapter").trim().to_string(),
            question_type_detail: form.str_field("questionTypeDetail").trim().to_string(),
            total_questions: form
                .get("totalQuestions")
                .and_then(Value::as_i64)
                .unwrap_or(0),
            selected_question_ids,
        }
    }
}
