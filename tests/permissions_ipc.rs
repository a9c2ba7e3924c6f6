mod test_support;

use serde_json::json;
use test_support::{error_code, spawn_sidecar, temp_dir};

#[test]
fn role_matrix_toggle_save_and_reload() {
    let workspace = temp_dir("examdesk-permissions");
    {
        let mut sc = spawn_sidecar();
        sc.request_ok(
            "1",
            "workspace.select",
            json!({ "path": workspace.to_string_lossy() }),
        );

        let initial = sc.request_ok("2", "permissions.get", json!({ "role": "teacher" }));
        assert_eq!(initial.get("dirty").and_then(|v| v.as_bool()), Some(false));
        assert_eq!(
            initial.pointer("/tree/0/name").and_then(|v| v.as_str()),
            Some("Dashboard")
        );
        assert_eq!(
            initial.pointer("/tree/1/submenus/0/name").and_then(|v| v.as_str()),
            Some("Create Question")
        );
        assert_eq!(
            initial
                .pointer("/tree/1/submenus/0/actions/create")
                .and_then(|v| v.as_bool()),
            Some(false)
        );

        let t = sc.request_ok(
            "3",
            "permissions.toggle",
            json!({ "role": "teacher", "path": [1, 0], "action": "create" }),
        );
        assert_eq!(t.get("value").and_then(|v| v.as_bool()), Some(true));
        sc.request_ok(
            "4",
            "permissions.toggle",
            json!({ "role": "teacher", "path": [0], "action": "view" }),
        );

        let after = sc.request_ok("5", "permissions.get", json!({ "role": "teacher" }));
        assert_eq!(after.get("dirty").and_then(|v| v.as_bool()), Some(true));
        assert_eq!(
            after.pointer("/tree/1/actions/create").and_then(|v| v.as_bool()),
            Some(false),
            "parent untouched by submenu toggle"
        );

        let saved = sc.request_ok("6", "permissions.save", json!({ "role": "teacher" }));
        assert!(saved.get("savedAt").and_then(|v| v.as_str()).is_some());

        let roles = sc.request_ok("7", "permissions.roles", json!({}));
        assert_eq!(
            roles.pointer("/roles/0/role").and_then(|v| v.as_str()),
            Some("teacher")
        );
        assert_eq!(
            roles.pointer("/roles/0/dirty").and_then(|v| v.as_bool()),
            Some(false)
        );
    }

    let mut sc = spawn_sidecar();
    sc.request_ok(
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let reloaded = sc.request_ok("2", "permissions.get", json!({ "role": "teacher" }));
    assert_eq!(
        reloaded
            .pointer("/tree/1/submenus/0/actions/create")
            .and_then(|v| v.as_bool()),
        Some(true)
    );
    assert_eq!(
        reloaded.pointer("/tree/0/actions/view").and_then(|v| v.as_bool()),
        Some(true)
    );

    // Other roles still start from the default seed.
    let other = sc.request_ok("3", "permissions.get", json!({ "role": "admin" }));
    assert_eq!(
        other.pointer("/tree/0/actions/view").and_then(|v| v.as_bool()),
        Some(false)
    );
}

#[test]
fn bad_paths_and_actions_are_rejected() {
    let mut sc = spawn_sidecar();
    let before = sc.request_ok("1", "permissions.get", json!({ "role": "staff" }));

    let e = sc.request_err(
        "2",
        "permissions.toggle",
        json!({ "role": "staff", "path": [99], "action": "view" }),
    );
    assert_eq!(error_code(&e), "invalid_path");
    assert_eq!(e.pointer("/details/path"), Some(&json!([99])));

    let e = sc.request_err(
        "3",
        "permissions.toggle",
        json!({ "role": "staff", "path": [], "action": "view" }),
    );
    assert_eq!(error_code(&e), "invalid_path");

    let e = sc.request_err(
        "4",
        "permissions.toggle",
        json!({ "role": "staff", "path": [0], "action": "approve" }),
    );
    assert_eq!(error_code(&e), "unknown_action");

    let e = sc.request_err(
        "5",
        "permissions.toggle",
        json!({ "role": "staff", "path": [-1], "action": "view" }),
    );
    assert_eq!(error_code(&e), "bad_params");

    let after = sc.request_ok("6", "permissions.get", json!({ "role": "staff" }));
    assert_eq!(before.get("tree"), after.get("tree"));
    assert_eq!(after.get("dirty").and_then(|v| v.as_bool()), Some(false));

    // Saving needs somewhere to write.
    let e = sc.request_err("7", "permissions.save", json!({ "role": "staff" }));
    assert_eq!(error_code(&e), "no_workspace");
}

#[test]
fn reset_with_custom_seed_and_back_to_default() {
    let mut sc = spawn_sidecar();
    let seed = json!([
        {
            "name": "Dashboard",
            "actions": { "view": true, "edit": false },
            "submenus": []
        },
        {
            "name": "Reports",
            "actions": { "view": false, "export": false },
            "submenus": [
                { "name": "Monthly", "actions": { "view": false, "export": true }, "submenus": [] }
            ]
        }
    ]);
    let r = sc.request_ok(
        "1",
        "permissions.reset",
        json!({ "role": "auditor", "seed": seed.clone() }),
    );
    assert_eq!(r.get("tree"), Some(&seed));

    sc.request_ok(
        "2",
        "permissions.toggle",
        json!({ "role": "auditor", "path": [1, 0], "action": "view" }),
    );
    let again = sc.request_ok(
        "3",
        "permissions.reset",
        json!({ "role": "auditor", "seed": seed.clone() }),
    );
    assert_eq!(again.get("tree"), Some(&seed));

    let dup = json!([
        { "name": "A", "actions": {}, "submenus": [] },
        { "name": "A", "actions": {}, "submenus": [] }
    ]);
    let e = sc.request_err(
        "4",
        "permissions.reset",
        json!({ "role": "auditor", "seed": dup }),
    );
    assert_eq!(error_code(&e), "duplicate_name");
    let still = sc.request_ok("5", "permissions.get", json!({ "role": "auditor" }));
    assert_eq!(still.get("tree"), Some(&seed));

    let e = sc.request_err(
        "6",
        "permissions.reset",
        json!({ "role": "auditor", "seed": "nope" }),
    );
    assert_eq!(error_code(&e), "bad_params");

    let default = sc.request_ok("7", "permissions.reset", json!({ "role": "auditor" }));
    assert_eq!(
        default.pointer("/tree/0/actions/export").and_then(|v| v.as_bool()),
        Some(false)
    );
    assert_eq!(
        default
            .get("tree")
            .and_then(|v| v.as_array())
            .map(|a| a.len()),
        Some(5)
    );
}
