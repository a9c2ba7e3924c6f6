use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::handlers::setup::permission_actions;
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request, RoleEditor};
use crate::permissions::{default_menu_seed, PermissionNode, PermissionTree};
use rusqlite::Connection;
use serde_json::{json, Value};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Saved tree for `role`, or the default menus built from the configured action set.
fn initial_tree(conn: Option<&Connection>, role: &str) -> anyhow::Result<PermissionTree> {
    if let Some(c) = conn {
        if let Some(nodes) = db::role_permissions_get(c, role)? {
            return Ok(PermissionTree::new(&nodes)?);
        }
    }
    let actions = permission_actions(conn);
    Ok(PermissionTree::new(&default_menu_seed(&actions))?)
}

fn editor<'a>(
    conn: Option<&Connection>,
    roles: &'a mut HashMap<String, RoleEditor>,
    role: &str,
) -> anyhow::Result<&'a mut RoleEditor> {
    match roles.entry(role.to_string()) {
        Entry::Occupied(e) => Ok(e.into_mut()),
        Entry::Vacant(e) => {
            let tree = initial_tree(conn, role)?;
            Ok(e.insert(RoleEditor { tree, dirty: false }))
        }
    }
}

fn parse_path(req: &Request) -> Result<Vec<usize>, Value> {
    let Some(items) = req.params.get("path").and_then(|v| v.as_array()) else {
        return Err(err(&req.id, "bad_params", "path must be an array", None));
    };
    items
        .iter()
        .map(|v| {
            v.as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| {
                    err(
                        &req.id,
                        "bad_params",
                        "path entries must be non-negative integers",
                        None,
                    )
                })
        })
        .collect()
}

fn tree_json(role: &str, ed: &RoleEditor) -> Value {
    json!({
        "role": role,
        "tree": ed.tree.serialize_for_save(),
        "dirty": ed.dirty,
    })
}

fn handle_roles(state: &mut AppState, req: &Request) -> Value {
    let saved = match state.db.as_ref() {
        Some(conn) => match db::role_permissions_list(conn) {
            Ok(rows) => rows,
            Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
        },
        None => Vec::new(),
    };
    let roles: Vec<_> = saved
        .iter()
        .map(|(role, updated_at)| {
            json!({
                "role": role,
                "updatedAt": updated_at,
                "dirty": state.roles.get(role).map(|e| e.dirty).unwrap_or(false),
            })
        })
        .collect();
    ok(&req.id, json!({ "roles": roles }))
}

fn handle_get(state: &mut AppState, req: &Request) -> Value {
    let role = match required_str(req, "role") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match editor(state.db.as_ref(), &mut state.roles, &role) {
        Ok(ed) => ok(&req.id, tree_json(&role, ed)),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_toggle(state: &mut AppState, req: &Request) -> Value {
    let role = match required_str(req, "role") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let action = match required_str(req, "action") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let path = match parse_path(req) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let ed = match editor(state.db.as_ref(), &mut state.roles, &role) {
        Ok(ed) => ed,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    match ed.tree.toggle(&path, &action) {
        Ok(value) => {
            ed.dirty = true;
            ok(
                &req.id,
                json!({ "role": role, "path": path, "action": action, "value": value }),
            )
        }
        Err(e) => err(&req.id, e.code(), e.to_string(), Some(json!({ "path": path }))),
    }
}

fn handle_reset(state: &mut AppState, req: &Request) -> Value {
    let role = match required_str(req, "role") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let seed: Vec<PermissionNode> = match req.params.get("seed") {
        None | Some(Value::Null) => default_menu_seed(&permission_actions(state.db.as_ref())),
        Some(raw) => match serde_json::from_value(raw.clone()) {
            Ok(nodes) => nodes,
            Err(e) => return err(&req.id, "bad_params", format!("invalid seed: {}", e), None),
        },
    };
    let ed = match editor(state.db.as_ref(), &mut state.roles, &role) {
        Ok(ed) => ed,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    if let Err(e) = ed.tree.reset(&seed) {
        return err(&req.id, e.code(), e.to_string(), None);
    }
    ed.dirty = true;
    ok(&req.id, tree_json(&role, ed))
}

fn handle_save(state: &mut AppState, req: &Request) -> Value {
    let role = match required_str(req, "role") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let ed = match editor(Some(conn), &mut state.roles, &role) {
        Ok(ed) => ed,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    match db::role_permissions_set(conn, &role, &ed.tree.serialize_for_save()) {
        Ok(saved_at) => {
            ed.dirty = false;
            tracing::info!(role = %role, "permissions saved");
            ok(&req.id, json!({ "role": role, "savedAt": saved_at }))
        }
        Err(e) => err(&req.id, "db_update_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "permissions.roles" => Some(handle_roles(state, req)),
        "permissions.get" => Some(handle_get(state, req)),
        "permissions.toggle" => Some(handle_toggle(state, req)),
        "permissions.reset" => Some(handle_reset(state, req)),
        "permissions.save" => Some(handle_save(state, req)),
        _ => None,
    }
}
