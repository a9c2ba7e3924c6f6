mod test_support;

use serde_json::json;
use test_support::{error_code, spawn_sidecar, spawn_sidecar_with_env, temp_dir};

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("examdesk-router-smoke");
    let mut sc = spawn_sidecar();

    let calls = [
        ("health", json!({})),
        ("workspace.select", json!({ "path": workspace.to_string_lossy() })),
        ("session.currentUser", json!({})),
        ("session.signIn", json!({ "userId": "smoke" })),
        ("wizard.start", json!({})),
        ("wizard.state", json!({})),
        ("wizard.update", json!({ "patch": {} })),
        ("wizard.advance", json!({})),
        ("wizard.retreat", json!({})),
        ("wizard.jumpTo", json!({ "step": 2 })),
        ("wizard.finalize", json!({})),
        ("wizard.cancel", json!({})),
        ("questionSets.list", json!({})),
        ("questionSets.get", json!({ "questionSetId": "missing" })),
        ("permissions.roles", json!({})),
        ("permissions.get", json!({ "role": "smoke" })),
        ("permissions.toggle", json!({ "role": "smoke", "path": [0], "action": "view" })),
        ("permissions.reset", json!({ "role": "smoke" })),
        ("permissions.save", json!({ "role": "smoke" })),
        ("setup.get", json!({})),
        ("setup.update", json!({ "section": "accessibility", "patch": {} })),
        ("session.signOut", json!({})),
    ];
    for (i, (method, params)) in calls.into_iter().enumerate() {
        let v = sc.request(&i.to_string(), method, params);
        if v.get("ok").and_then(|x| x.as_bool()) == Some(false) {
            let code = v.get("error").map(error_code).unwrap_or("");
            assert_ne!(code, "not_implemented", "unexpected unknown method {}", method);
        }
    }

    let e = sc.request_err("x", "exams.delete", json!({}));
    assert_eq!(error_code(&e), "not_implemented");
}

#[test]
fn malformed_lines_get_bad_json_and_loop_continues() {
    let mut sc = spawn_sidecar();
    let v = sc.write_raw("{not json");
    assert_eq!(v.get("ok").and_then(|x| x.as_bool()), Some(false));
    assert_eq!(v.pointer("/error/code").and_then(|x| x.as_str()), Some("bad_json"));

    let health = sc.request_ok("1", "health", json!({}));
    assert!(health.get("version").and_then(|x| x.as_str()).is_some());
    assert!(health.get("workspacePath").map(|x| x.is_null()).unwrap_or(false));

    let v = sc.write_bytes(b"{\"id\":\"2\",\"method\":\"health\",\"params\":{\"x\":\"\xff\"}}\n");
    assert_eq!(v.pointer("/error/code").and_then(|x| x.as_str()), Some("bad_json"));

    let v = sc.write_bytes(b"{\"id\":\"3\",\"method\":\"health\",\"params\":{}}\r\n");
    assert_eq!(v.get("ok").and_then(|x| x.as_bool()), Some(true));

    let health = sc.request_ok("4", "health", json!({}));
    assert!(health.get("version").and_then(|x| x.as_str()).is_some());
}

#[test]
fn workspace_from_environment_is_opened_at_startup() {
    let workspace = temp_dir("examdesk-env-workspace");
    let path = workspace.to_string_lossy().to_string();
    let mut sc = spawn_sidecar_with_env(&[("EXAMDESKD_WORKSPACE", path.as_str())]);
    let health = sc.request_ok("1", "health", json!({}));
    assert_eq!(
        health.get("workspacePath").and_then(|x| x.as_str()),
        Some(path.as_str())
    );
    assert!(workspace.join("examdesk.sqlite3").is_file());
}

#[test]
fn session_sign_in_and_out() {
    let mut sc = spawn_sidecar();
    let none = sc.request_ok("1", "session.currentUser", json!({}));
    assert!(none.get("user").map(|u| u.is_null()).unwrap_or(false));

    let e = sc.request_err("2", "session.signIn", json!({ "userId": "  " }));
    assert_eq!(error_code(&e), "bad_params");

    sc.request_ok("3", "session.signIn", json!({ "userId": "t-9", "displayName": "Ms. Das" }));
    let me = sc.request_ok("4", "session.currentUser", json!({}));
    assert_eq!(me.pointer("/user/userId").and_then(|x| x.as_str()), Some("t-9"));
    assert_eq!(
        me.pointer("/user/displayName").and_then(|x| x.as_str()),
        Some("Ms. Das")
    );

    let out = sc.request_ok("5", "session.signOut", json!({}));
    assert_eq!(out.get("signedOut").and_then(|x| x.as_bool()), Some(true));
    let none = sc.request_ok("6", "session.currentUser", json!({}));
    assert!(none.get("user").map(|u| u.is_null()).unwrap_or(false));
}
