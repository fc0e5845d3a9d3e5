mod test_support;

use serde_json::json;
use test_support::{error_code, request, spawn_sidecar, temp_dir};

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("labref-router-smoke");
    let bundle_out = workspace.join("smoke.labref.zip");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let methods: Vec<(&str, serde_json::Value)> = vec![
        ("health", json!({})),
        ("workspace.select", json!({ "path": workspace.to_string_lossy() })),
        ("parameters.options", json!({})),
        ("parameters.list", json!({})),
        (
            "parameters.add",
            json!({ "name": "Glucose", "ageGroup": "Adult", "minValue": 70, "maxValue": 110 }),
        ),
        ("parameters.get", json!({ "name": "Glucose", "ageGroup": "Adult" })),
        ("parameters.search", json!({ "name": "glu" })),
        (
            "parameters.update",
            json!({ "name": "Glucose", "ageGroup": "Adult", "patch": { "notes": "fasting" } }),
        ),
        ("parameters.export", json!({})),
        ("import.preview", json!({ "text": "{}" })),
        ("import.apply", json!({ "records": [] })),
        ("settings.get", json!({})),
        ("settings.update", json!({ "patch": {} })),
        (
            "backup.exportWorkspaceBundle",
            json!({ "outPath": bundle_out.to_string_lossy() }),
        ),
        ("parameters.delete", json!({ "name": "Glucose", "ageGroup": "Adult" })),
        ("parameters.purge", json!({})),
    ];

    for (i, (method, params)) in methods.into_iter().enumerate() {
        let resp = request(&mut stdin, &mut reader, &i.to_string(), method, params);
        assert_eq!(
            resp.get("ok").and_then(|v| v.as_bool()),
            Some(true),
            "{} failed: {}",
            method,
            resp
        );
    }

    let unknown = request(&mut stdin, &mut reader, "x", "nope.nothing", json!({}));
    assert_eq!(error_code(&unknown), Some("not_implemented"));

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn store_methods_need_a_workspace() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let health = request(&mut stdin, &mut reader, "1", "health", json!({}));
    assert!(health["result"]["workspacePath"].is_null());

    let add = request(
        &mut stdin,
        &mut reader,
        "2",
        "parameters.add",
        json!({ "name": "Glucose", "ageGroup": "Adult", "minValue": 70, "maxValue": 110 }),
    );
    assert_eq!(error_code(&add), Some("no_workspace"));

    let list = request(&mut stdin, &mut reader, "3", "parameters.list", json!({}));
    assert_eq!(list["result"]["parameters"], json!([]));

    let select = request(&mut stdin, &mut reader, "4", "workspace.select", json!({}));
    assert_eq!(error_code(&select), Some("bad_params"));
}

#[test]
fn bad_json_line_gets_an_error_and_the_loop_continues() {
    use std::io::{BufRead, Write};

    let (_child, mut stdin, mut reader) = spawn_sidecar();
    writeln!(stdin, "this is not json").expect("write");
    stdin.flush().expect("flush");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read");
    let v: serde_json::Value = serde_json::from_str(line.trim()).expect("json");
    assert_eq!(error_code(&v), Some("bad_json"));

    let health = request(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(health["ok"], json!(true));
}
