use serde::Serialize;

/// Side effects the front end performs on the daemon's behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum UiCommand {
    Navigate { to: String },
    ApplyHighContrast { enabled: bool },
    ApplyLargeText { enabled: bool },
    ApplyReduceMotion { enabled: bool },
}

impl UiCommand {
    pub fn open_question_set(id: &str) -> Self {
        Self::Navigate {
            to: format!("/question-sets/{}", id),
        }
    }
}
