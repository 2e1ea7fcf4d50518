use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;
use xliffsync::Xliff;
use xliffsync::traits::Parser;

const CUSTOMER_TABLE: &str = r#"table 50100 "Customer Ext"
{
    Caption = 'Customer Extension';

    fields
    {
        field(1; "No."; Code[20])
        {
            Caption = 'No.';
            ToolTip = 'Specifies the number.';
        }
    }
}
"#;

const EMPTY_DANISH: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<xliff version="1.2" xmlns="urn:oasis:names:tc:xliff:document:1.2">
  <file datatype="xml" source-language="en-US" target-language="da-DK" original="My App">
    <body>
      <group id="body">
      </group>
    </body>
  </file>
</xliff>
"#;

fn setup_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("app.json"),
        r#"{"id": "0d1a", "name": "My App", "publisher": "Me", "version": "1.0.0.0"}"#,
    )
    .unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src").join("Customer.Table.al"), CUSTOMER_TABLE).unwrap();
    fs::create_dir_all(dir.path().join("Translations")).unwrap();
    fs::write(
        dir.path().join("Translations").join("My App.da-DK.xlf"),
        EMPTY_DANISH,
    )
    .unwrap();
    dir
}

fn xliffsync(workspace: &Path, args: &[&str]) -> Output {
    Command::new(assert_cmd::cargo::cargo_bin("xliffsync"))
        .arg("--workspace")
        .arg(workspace)
        .args(args)
        .output()
        .unwrap()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "CLI failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn json_stdout(output: &Output) -> serde_json::Value {
    serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).unwrap()
}

#[test]
fn test_update_master_then_refresh() {
    let dir = setup_workspace();

    let output = xliffsync(dir.path(), &["update-master", "--json"]);
    assert_success(&output);
    assert_eq!(json_stdout(&output)["added"], 3);
    let master_path = dir.path().join("Translations").join("My App.g.xlf");
    let master = Xliff::read_from(&master_path).unwrap();
    assert_eq!(master.trans_units.len(), 3);
    assert_eq!(master.original, "My App");

    let output = xliffsync(dir.path(), &["refresh", "--json"]);
    assert_success(&output);
    let v = json_stdout(&output);
    assert_eq!(v["added"], 3);
    assert_eq!(v["checked_files"], 1);

    let danish =
        Xliff::read_from(dir.path().join("Translations").join("My App.da-DK.xlf")).unwrap();
    assert_eq!(danish.trans_units.len(), 3);
    assert!(danish.trans_units.iter().all(|u| u.has_hint()));

    let output = xliffsync(dir.path(), &["refresh", "--json"]);
    assert_success(&output);
    let v = json_stdout(&output);
    assert_eq!(v["added"], 0);
    assert_eq!(v["removed_units"], 0);
}

#[test]
fn test_refresh_uses_match_file_suggestions() {
    let dir = setup_workspace();
    assert_success(&xliffsync(dir.path(), &["update-master"]));
    let peer = dir.path().join("peer.da-DK.xlf");
    fs::write(
        &peer,
        r#"<?xml version="1.0" encoding="utf-8"?>
<xliff version="1.2" xmlns="urn:oasis:names:tc:xliff:document:1.2">
  <file datatype="xml" source-language="en-US" target-language="da-DK" original="Other App">
    <body>
      <group id="body">
        <trans-unit id="Table 1 - Property 2" translate="yes" xml:space="preserve">
          <source>No.</source>
          <target>Nr.</target>
        </trans-unit>
      </group>
    </body>
  </file>
</xliff>
"#,
    )
    .unwrap();

    let output = xliffsync(
        dir.path(),
        &[
            "refresh",
            "--json",
            "--match-file",
            peer.to_str().unwrap(),
            "--base-app",
            dir.path().join("missing").to_str().unwrap(),
        ],
    );
    assert_success(&output);
    assert_eq!(json_stdout(&output)["suggestions_added"], 1);
}

#[test]
fn test_refresh_without_master_fails() {
    let dir = setup_workspace();
    let output = xliffsync(dir.path(), &["refresh"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: file not found"), "stderr: {}", stderr);
}

#[test]
fn test_status_reports_pending_units() {
    let dir = setup_workspace();
    assert_success(&xliffsync(dir.path(), &["update-master"]));
    assert_success(&xliffsync(dir.path(), &["refresh"]));

    let output = xliffsync(dir.path(), &["status", "--json"]);
    assert_success(&output);
    let v = json_stdout(&output);
    assert_eq!(v["app"], "My App");
    let files = v["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["language"], "da-DK");
    assert_eq!(files[0]["units"], 3);
    assert_eq!(files[0]["needs_attention"], 3);
}

#[test]
fn test_locate_prints_source_line() {
    let dir = setup_workspace();
    assert_success(&xliffsync(dir.path(), &["update-master"]));
    let master =
        Xliff::read_from(dir.path().join("Translations").join("My App.g.xlf")).unwrap();
    let id = master.trans_units[0].id.clone();

    let output = xliffsync(dir.path(), &["locate", &id]);
    assert_success(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Customer.Table.al:"), "stdout: {}", stdout);
    assert!(stdout.contains("Table Customer Ext - Property Caption"));

    let output = xliffsync(dir.path(), &["locate", "Table 1 - Property 2"]);
    assert!(!output.status.success());
}

#[test]
fn test_clear_notes_skips_files_with_tokens() {
    let dir = setup_workspace();
    assert_success(&xliffsync(dir.path(), &["update-master"]));
    assert_success(&xliffsync(dir.path(), &["refresh"]));

    let output = xliffsync(dir.path(), &["clear-notes"]);
    assert_success(&output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("Skipped"));

    assert_success(&xliffsync(dir.path(), &["format", "--mode", "external"]));
    let danish_path = dir.path().join("Translations").join("My App.da-DK.xlf");
    let danish = Xliff::read_from(&danish_path).unwrap();
    assert!(!danish.has_translation_tokens());

    assert_success(&xliffsync(dir.path(), &["clear-notes"]));
    let danish = Xliff::read_from(&danish_path).unwrap();
    assert!(!danish.has_hints());
}

#[test]
fn test_import_requires_managed_mode() {
    let dir = setup_workspace();
    let import = dir.path().join("returned.xlf");
    fs::write(&import, EMPTY_DANISH).unwrap();
    let output = xliffsync(dir.path(), &["import", import.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("managed"));

    fs::write(
        dir.path().join("xliffsync.toml"),
        "translation_mode = \"managed\"\n",
    )
    .unwrap();
    let output = xliffsync(dir.path(), &["import", import.to_str().unwrap()]);
    assert_success(&output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("Imported 0 unit(s)"));
}
