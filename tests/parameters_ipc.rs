mod test_support;

use serde_json::json;
use test_support::{error_code, request, request_ok, spawn_sidecar, temp_dir};

#[test]
fn parameter_lifecycle_over_ipc() {
    let workspace = temp_dir("labref-ipc-lifecycle");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let added = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "parameters.add",
        json!({
            "name": " Glucose ",
            "ageGroup": "Adult",
            "minValue": "70",
            "maxValue": 110,
            "unit": "mg/dL",
            "category": "Other",
            "notes": ""
        }),
    );
    assert_eq!(added["parameter"]["name"], json!("Glucose"));
    assert_eq!(added["parameter"]["minValue"], json!(70.0));
    assert!(added["parameter"]["notes"].is_null());

    let dup = request(
        &mut stdin,
        &mut reader,
        "3",
        "parameters.add",
        json!({ "name": "Glucose", "ageGroup": "Adult", "minValue": 1, "maxValue": 2 }),
    );
    assert_eq!(error_code(&dup), Some("duplicate_key"));
    assert_eq!(dup["error"]["details"]["ageGroup"], json!("Adult"));

    let bad = request(
        &mut stdin,
        &mut reader,
        "4",
        "parameters.add",
        json!({ "name": "Sodium", "ageGroup": "Adult", "minValue": 10, "maxValue": 5 }),
    );
    assert_eq!(error_code(&bad), Some("validation_failed"));
    assert_eq!(bad["error"]["details"]["field"], json!("minValue"));

    let not_number = request(
        &mut stdin,
        &mut reader,
        "5",
        "parameters.add",
        json!({ "name": "Sodium", "ageGroup": "Adult", "minValue": "abc", "maxValue": 5 }),
    );
    assert_eq!(error_code(&not_number), Some("validation_failed"));

    request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "parameters.add",
        json!({ "name": "Glucose", "ageGroup": "Child", "minValue": 60, "maxValue": 100 }),
    );

    let updated = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "parameters.update",
        json!({
            "name": "Glucose",
            "ageGroup": "Adult",
            "patch": { "maxValue": "100", "notes": "fasting" }
        }),
    );
    assert_eq!(updated["parameter"]["maxValue"], json!(100.0));
    assert_eq!(updated["parameter"]["unit"], json!("mg/dL"));
    assert_eq!(updated["parameter"]["notes"], json!("fasting"));

    let clash = request(
        &mut stdin,
        &mut reader,
        "8",
        "parameters.update",
        json!({ "name": "Glucose", "ageGroup": "Adult", "patch": { "ageGroup": "Child" } }),
    );
    assert_eq!(error_code(&clash), Some("duplicate_key"));

    let missing = request(
        &mut stdin,
        &mut reader,
        "9",
        "parameters.update",
        json!({ "name": "Nope", "ageGroup": "Adult", "patch": { "notes": "x" } }),
    );
    assert_eq!(error_code(&missing), Some("not_found"));

    let found = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "parameters.search",
        json!({ "name": "GLU", "ageGroup": "Child" }),
    );
    let rows = found["parameters"].as_array().expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["maxValue"], json!(100.0));

    request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "parameters.delete",
        json!({ "name": "Glucose", "ageGroup": "Child" }),
    );
    let gone = request(
        &mut stdin,
        &mut reader,
        "12",
        "parameters.get",
        json!({ "name": "Glucose", "ageGroup": "Child" }),
    );
    assert_eq!(error_code(&gone), Some("not_found"));
    let again = request(
        &mut stdin,
        &mut reader,
        "13",
        "parameters.delete",
        json!({ "name": "Glucose", "ageGroup": "Child" }),
    );
    assert_eq!(error_code(&again), Some("not_found"));

    let options = request_ok(&mut stdin, &mut reader, "14", "parameters.options", json!({}));
    let units = options["units"].as_array().expect("units");
    assert!(units.contains(&json!("mg/dL")));
    assert!(options["ageGroups"]
        .as_array()
        .expect("age groups")
        .contains(&json!("Adult")));

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn purge_writes_backup_before_emptying() {
    let workspace = temp_dir("labref-ipc-purge");
    let backup = workspace.join("backups").join("before-purge.txt");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    for (i, name) in ["Sodium", "Potassium", "Chloride"].iter().enumerate() {
        request_ok(
            &mut stdin,
            &mut reader,
            &format!("add-{i}"),
            "parameters.add",
            json!({ "name": name, "ageGroup": "Adult", "minValue": 1, "maxValue": 200 }),
        );
    }

    let purged = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "parameters.purge",
        json!({ "backupPath": backup.to_string_lossy() }),
    );
    assert_eq!(purged["removed"], json!(3));
    let text = std::fs::read_to_string(&backup).expect("backup written");
    assert!(text.contains("Parameter: Potassium"));

    let list = request_ok(&mut stdin, &mut reader, "3", "parameters.list", json!({}));
    assert_eq!(list["parameters"], json!([]));

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn purge_is_skipped_when_backup_fails() {
    let workspace = temp_dir("labref-ipc-purge-fail");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "parameters.add",
        json!({ "name": "Sodium", "ageGroup": "Adult", "minValue": 135, "maxValue": 145 }),
    );

    // The workspace directory itself is not a writable file.
    let purged = request(
        &mut stdin,
        &mut reader,
        "3",
        "parameters.purge",
        json!({ "backupPath": workspace.to_string_lossy() }),
    );
    assert_eq!(error_code(&purged), Some("io_failed"));

    let list = request_ok(&mut stdin, &mut reader, "4", "parameters.list", json!({}));
    assert_eq!(list["parameters"].as_array().map(|a| a.len()), Some(1));

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn export_defaults_to_timestamped_file_in_workspace() {
    let workspace = temp_dir("labref-ipc-export");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "parameters.add",
        json!({ "name": "Sodium", "ageGroup": "Adult", "minValue": 135, "maxValue": 145, "unit": "mmol/L" }),
    );

    let exported = request_ok(&mut stdin, &mut reader, "3", "parameters.export", json!({}));
    assert_eq!(exported["count"], json!(1));
    let path = exported["path"].as_str().expect("path");
    let file_name = std::path::Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .expect("file name");
    assert!(file_name.starts_with("database_export_"), "{file_name}");
    assert!(file_name.ends_with(".txt"), "{file_name}");
    let text = std::fs::read_to_string(path).expect("read export");
    assert!(text.contains("Unit: mmol/L"));

    let _ = std::fs::remove_dir_all(workspace);
}
