use crate::ipc::error::{err, ok};
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request, SessionUser};
use serde_json::json;

fn handle_sign_in(state: &mut AppState, req: &Request) -> serde_json::Value {
    let user_id = match required_str(req, "userId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let display_name = match req.params.get("displayName") {
        None | Some(serde_json::Value::Null) => None,
        Some(v) => match v.as_str() {
            Some(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(_) => None,
            None => return err(&req.id, "bad_params", "displayName must be string", None),
        },
    };
    let user = SessionUser {
        user_id,
        display_name,
    };
    tracing::info!(user = %user.user_id, "signed in");
    state.user = Some(user.clone());
    ok(&req.id, json!({ "user": user }))
}

fn handle_sign_out(state: &mut AppState, req: &Request) -> serde_json::Value {
    let was = state.user.take();
    ok(&req.id, json!({ "signedOut": was.is_some() }))
}

fn handle_current_user(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "user": state.user }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "session.signIn" => Some(handle_sign_in(state, req)),
        "session.signOut" => Some(handle_sign_out(state, req)),
        "session.currentUser" => Some(handle_current_user(state, req)),
        _ => None,
    }
}
