use crate::commands::UiCommand;
use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::permissions::default_actions;
use crate::question::{WizardSettings, DEFAULT_MAX_TOTAL_QUESTIONS, METHODS, QUESTION_TYPES};
use rusqlite::Connection;
use serde_json::{json, Map, Value};
use std::collections::HashSet;

#[derive(Clone, Copy)]
enum SetupSection {
    Wizard,
    Accessibility,
    Permissions,
}

impl SetupSection {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "wizard" => Some(Self::Wizard),
            "accessibility" => Some(Self::Accessibility),
            "permissions" => Some(Self::Permissions),
            _ => None,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Wizard => "setup.wizard",
            Self::Accessibility => "setup.accessibility",
            Self::Permissions => "setup.permissions",
        }
    }
}

fn default_section(section: SetupSection) -> Value {
    match section {
        SetupSection::Wizard => json!({
            "defaultQuestionType": "",
            "defaultMethod": "",
            "maxTotalQuestions": DEFAULT_MAX_TOTAL_QUESTIONS
        }),
        SetupSection::Accessibility => json!({
            "highContrast": false,
            "largeText": false,
            "reduceMotion": false
        }),
        SetupSection::Permissions => json!({
            "actions": default_actions()
        }),
    }
}

fn as_object_mut(value: &mut Value) -> Result<&mut Map<String, Value>, String> {
    value
        .as_object_mut()
        .ok_or_else(|| "internal setup object must be a JSON object".to_string())
}

fn parse_bool(v: &Value, key: &str) -> Result<bool, String> {
    v.as_bool()
        .ok_or_else(|| format!("{} must be boolean", key))
}

fn parse_i64_range(v: &Value, key: &str, min: i64, max: i64) -> Result<i64, String> {
    let n = v
        .as_i64()
        .ok_or_else(|| format!("{} must be integer", key))?;
    if !(min..=max).contains(&n) {
        return Err(format!("{} must be in {}..={}", key, min, max));
    }
    Ok(n)
}

fn parse_string_max(v: &Value, key: &str, max_len: usize) -> Result<String, String> {
    let s = v.as_str().ok_or_else(|| format!("{} must be string", key))?;
    let s = s.trim();
    if s.len() > max_len {
        return Err(format!("{} length must be <= {}", key, max_len));
    }
    Ok(s.to_string())
}

/// Empty, or one of `allowed` (case-insensitive, stored lowercase).
fn parse_optional_choice(v: &Value, key: &str, allowed: &[&str]) -> Result<String, String> {
    let s = parse_string_max(v, key, 24)?.to_ascii_lowercase();
    if !s.is_empty() && !allowed.contains(&s.as_str()) {
        return Err(format!("{} must be empty or one of: {}", key, allowed.join(", ")));
    }
    Ok(s)
}

fn parse_action_list(v: &Value, key: &str) -> Result<Vec<String>, String> {
    let items = v
        .as_array()
        .ok_or_else(|| format!("{} must be an array", key))?;
    if items.is_empty() || items.len() > 12 {
        return Err(format!("{} must hold 1..=12 entries", key));
    }
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let s = parse_string_max(item, key, 24)?.to_ascii_lowercase();
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_lowercase() || c == '_') {
            return Err(format!("{} entries must be lowercase identifiers", key));
        }
        if !seen.insert(s.clone()) {
            return Err(format!("{} has duplicate entry: {}", key, s));
        }
        out.push(s);
    }
    Ok(out)
}

fn merge_section_patch(
    section: SetupSection,
    current: &mut Value,
    patch: &Map<String, Value>,
) -> Result<(), String> {
    let obj = as_object_mut(current)?;
    for (k, v) in patch {
        match section {
            SetupSection::Wizard => match k.as_str() {
                "defaultQuestionType" => {
                    let s = parse_optional_choice(v, k, &QUESTION_TYPES)?;
                    obj.insert(k.clone(), Value::String(s));
                }
                "defaultMethod" => {
                    let s = parse_optional_choice(v, k, &METHODS)?;
                    obj.insert(k.clone(), Value::String(s));
                }
                "maxTotalQuestions" => {
                    obj.insert(k.clone(), Value::from(parse_i64_range(v, k, 1, 500)?));
                }
                _ => return Err(format!("unknown wizard field: {}", k)),
            },
            SetupSection::Accessibility => match k.as_str() {
                "highContrast" | "largeText" | "reduceMotion" => {
                    obj.insert(k.clone(), Value::Bool(parse_bool(v, k)?));
                }
                _ => return Err(format!("unknown accessibility field: {}", k)),
            },
            SetupSection::Permissions => match k.as_str() {
                "actions" => {
                    obj.insert(k.clone(), json!(parse_action_list(v, k)?));
                }
                _ => return Err(format!("unknown permissions field: {}", k)),
            },
        }
    }
    Ok(())
}

fn load_section(conn: &Connection, section: SetupSection) -> anyhow::Result<Value> {
    let mut current = default_section(section);
    if let Some(saved) = db::settings_get_json(conn, section.key())? {
        if let Some(saved_obj) = saved.as_object() {
            // Best-effort apply: malformed historical values should not block setup UI.
            let _ = merge_section_patch(section, &mut current, saved_obj);
        }
    }
    Ok(current)
}

fn load_or_default(conn: Option<&Connection>, section: SetupSection) -> Value {
    match conn {
        Some(c) => load_section(c, section).unwrap_or_else(|e| {
            tracing::warn!(section = section.key(), error = %e, "falling back to setup defaults");
            default_section(section)
        }),
        None => default_section(section),
    }
}

pub fn wizard_settings(conn: Option<&Connection>) -> WizardSettings {
    let v = load_or_default(conn, SetupSection::Wizard);
    let text = |key: &str| {
        v.get(key)
            .and_then(|x| x.as_str())
            .unwrap_or("")
            .to_string()
    };
    WizardSettings {
        default_question_type: text("defaultQuestionType"),
        default_method: text("defaultMethod"),
        max_total_questions: v
            .get("maxTotalQuestions")
            .and_then(|x| x.as_i64())
            .unwrap_or(DEFAULT_MAX_TOTAL_QUESTIONS),
    }
}

/// The configured ActionFlags names for freshly seeded trees.
pub fn permission_actions(conn: Option<&Connection>) -> Vec<String> {
    let v = load_or_default(conn, SetupSection::Permissions);
    let actions: Vec<String> = v
        .get("actions")
        .and_then(|a| a.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|x| x.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    if actions.is_empty() {
        default_actions()
    } else {
        actions
    }
}

/// Commands for the accessibility flags whose stored value differs between `before` and `after`.
fn accessibility_commands(before: &Value, after: &Value) -> Vec<UiCommand> {
    let mut out = Vec::new();
    for key in ["highContrast", "largeText", "reduceMotion"] {
        let Some(enabled) = after.get(key).and_then(|v| v.as_bool()) else {
            continue;
        };
        if before.get(key).and_then(|v| v.as_bool()) == Some(enabled) {
            continue;
        }
        out.push(match key {
            "highContrast" => UiCommand::ApplyHighContrast { enabled },
            "largeText" => UiCommand::ApplyLargeText { enabled },
            _ => UiCommand::ApplyReduceMotion { enabled },
        });
    }
    out
}

fn handle_setup_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let wizard = match load_section(conn, SetupSection::Wizard) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let accessibility = match load_section(conn, SetupSection::Accessibility) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let permissions = match load_section(conn, SetupSection::Permissions) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    ok(
        &req.id,
        json!({
            "wizard": wizard,
            "accessibility": accessibility,
            "permissions": permissions
        }),
    )
}

fn handle_setup_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(section_raw) = req.params.get("section").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing section", None);
    };
    let Some(section) = SetupSection::parse(section_raw) else {
        return err(&req.id, "bad_params", "unknown section", None);
    };
    let Some(patch_obj) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "patch must be an object", None);
    };

    let mut current = match load_section(conn, section) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let before = current.clone();
    if let Err(msg) = merge_section_patch(section, &mut current, patch_obj) {
        return err(&req.id, "bad_params", msg, None);
    }
    if let Err(e) = db::settings_set_json(conn, section.key(), &current) {
        return err(&req.id, "db_update_failed", e.to_string(), None);
    }
    let commands = match section {
        SetupSection::Accessibility => accessibility_commands(&before, &current),
        _ => Vec::new(),
    };
    ok(&req.id, json!({ "ok": true, "commands": commands }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "setup.get" => Some(handle_setup_get(state, req)),
        "setup.update" => Some(handle_setup_update(state, req)),
        _ => None,
    }
}
