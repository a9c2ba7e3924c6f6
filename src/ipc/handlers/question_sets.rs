use crate::db::{self, StoredQuestionSet};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{require_db, required_str};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn to_json(set: &StoredQuestionSet) -> serde_json::Value {
    let mut v = json!(set.record);
    if let Some(obj) = v.as_object_mut() {
        obj.insert("id".into(), json!(set.id));
        obj.insert("createdBy".into(), json!(set.created_by));
        obj.insert("createdAt".into(), json!(set.created_at));
    }
    v
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match require_db(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    match db::question_sets_list(conn) {
        Ok(sets) => {
            let rows: Vec<_> = sets.iter().map(to_json).collect();
            ok(&req.id, json!({ "questionSets": rows }))
        }
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match require_db(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let id = match required_str(req, "questionSetId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match db::question_set_get(conn, &id) {
        Ok(Some(set)) => ok(&req.id, json!({ "questionSet": to_json(&set) })),
        Ok(None) => err(&req.id, "not_found", "question set not found", None),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "questionSets.list" => Some(handle_list(state, req)),
        "questionSets.get" => Some(handle_get(state, req)),
        _ => None,
    }
}
