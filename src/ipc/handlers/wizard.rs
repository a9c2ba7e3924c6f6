use crate::commands::UiCommand;
use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::handlers::setup::wizard_settings;
use crate::ipc::helpers::optional_object;
use crate::ipc::types::{AppState, Request};
use crate::question::{self, QuestionSetRecord};
use crate::wizard::WizardController;
use serde_json::{json, Map, Value};

fn view(w: &WizardController) -> Value {
    let steps: Vec<_> = w.steps().collect();
    json!({
        "currentStep": w.current_step(),
        "totalSteps": w.total_steps(),
        "steps": steps,
        "formState": w.form_state(),
        "validation": w.last_validation(),
        "isFinalStep": w.is_final_step(),
    })
}

fn with_extra(mut v: Value, key: &str, extra: Value) -> Value {
    if let Some(obj) = v.as_object_mut() {
        obj.insert(key.to_string(), extra);
    }
    v
}

fn no_wizard(req: &Request) -> Value {
    err(&req.id, "no_wizard", "start a wizard first", None)
}

fn handle_start(state: &mut AppState, req: &Request) -> Value {
    let initial = match optional_object(req, "initial") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let settings = wizard_settings(state.db.as_ref());
    let mut w = match question::new_wizard(&settings) {
        Ok(w) => w,
        Err(e) => return err(&req.id, e.code(), e.to_string(), None),
    };
    if let Some(patch) = initial {
        w.update_form_state(patch);
    }
    if state.wizard.is_some() {
        tracing::info!("replacing unfinished wizard session");
    }
    let resp = ok(&req.id, view(&w));
    state.wizard = Some(w);
    resp
}

fn handle_state(state: &mut AppState, req: &Request) -> Value {
    match state.wizard.as_ref() {
        Some(w) => ok(&req.id, view(w)),
        None => no_wizard(req),
    }
}

fn handle_update(state: &mut AppState, req: &Request) -> Value {
    let Some(w) = state.wizard.as_mut() else {
        return no_wizard(req);
    };
    let Some(patch) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "patch must be an object", None);
    };
    w.update_form_state(patch);
    ok(&req.id, view(w))
}

fn handle_advance(state: &mut AppState, req: &Request) -> Value {
    let Some(w) = state.wizard.as_mut() else {
        return no_wizard(req);
    };
    let before = w.current_step();
    w.advance();
    let advanced = w.current_step() != before;
    ok(&req.id, with_extra(view(w), "advanced", json!(advanced)))
}

fn handle_retreat(state: &mut AppState, req: &Request) -> Value {
    let Some(w) = state.wizard.as_mut() else {
        return no_wizard(req);
    };
    w.retreat();
    ok(&req.id, view(w))
}

fn handle_jump_to(state: &mut AppState, req: &Request) -> Value {
    let Some(step) = req.params.get("step").filter(|v| v.is_i64() || v.is_u64()) else {
        return err(&req.id, "bad_params", "step must be an integer", None);
    };
    let Some(w) = state.wizard.as_mut() else {
        return no_wizard(req);
    };
    // Negative or oversized ordinals are simply out of range.
    let moved = step
        .as_u64()
        .and_then(|s| usize::try_from(s).ok())
        .map(|s| w.jump_to(s))
        .unwrap_or(false);
    ok(&req.id, with_extra(view(w), "moved", json!(moved)))
}

fn failures_details(failures: &[(usize, crate::wizard::ValidationResult)]) -> Value {
    let mut steps = Map::new();
    for (ordinal, result) in failures {
        steps.insert(ordinal.to_string(), json!(result));
    }
    json!({ "steps": steps })
}

fn handle_finalize(state: &mut AppState, req: &Request) -> Value {
    let Some(w) = state.wizard.as_ref() else {
        return no_wizard(req);
    };
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(user) = state.user.as_ref() else {
        return err(&req.id, "not_signed_in", "sign in before saving", None);
    };
    if !w.is_final_step() {
        return err(
            &req.id,
            "not_final_step",
            format!("wizard is at step {} of {}", w.current_step(), w.total_steps()),
            None,
        );
    }
    let record = match QuestionSetRecord::from_wizard(w) {
        Ok(r) => r,
        Err(failures) => {
            return err(
                &req.id,
                "validation_failed",
                "some steps are incomplete",
                Some(failures_details(&failures)),
            )
        }
    };
    let id = match db::question_set_insert(conn, &record, Some(&user.user_id)) {
        Ok(id) => id,
        Err(e) => {
            return err(
                &req.id,
                "db_insert_failed",
                e.to_string(),
                Some(json!({ "table": "question_sets" })),
            )
        }
    };
    tracing::info!(question_set = %id, user = %user.user_id, "question set saved");
    state.wizard = None;
    ok(
        &req.id,
        json!({
            "questionSetId": id,
            "commands": [UiCommand::open_question_set(&id)],
        }),
    )
}

fn handle_cancel(state: &mut AppState, req: &Request) -> Value {
    let cancelled = state.wizard.take().is_some();
    ok(&req.id, json!({ "cancelled": cancelled }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "wizard.start" => Some(handle_start(state, req)),
        "wizard.state" => Some(handle_state(state, req)),
        "wizard.update" => Some(handle_update(state, req)),
        "wizard.advance" => Some(handle_advance(state, req)),
        "wizard.retreat" => Some(handle_retreat(state, req)),
        "wizard.jumpTo" => Some(handle_jump_to(state, req)),
        "wizard.finalize" => Some(handle_finalize(state, req)),
        "wizard.cancel" => Some(handle_cancel(state, req)),
        _ => None,
    }
}
