use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;
use tempfile::TempDir;

struct Workspace {
    temp: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            temp: TempDir::new().expect("temp dir"),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.temp.path().join(name)
    }

    fn db_path(&self) -> PathBuf {
        self.path("contacts.sqlite3")
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).expect("write file");
        path
    }

    fn output(&self, args: &[&str]) -> Output {
        cargo_bin_cmd!("dialbook")
            .current_dir(self.temp.path())
            .env("XDG_CONFIG_HOME", self.path("config"))
            .env("XDG_DATA_HOME", self.path("data"))
            .env_remove("RUST_LOG")
            .args(["--db-path", path_str(&self.db_path())])
            .args(args)
            .output()
            .expect("run command")
    }

    fn run(&self, args: &[&str]) -> String {
        let output = self.output(args);
        assert!(output.status.success(), "command failed: {:?}", output);
        String::from_utf8(output.stdout).expect("utf8")
    }

    fn run_json(&self, args: &[&str]) -> Value {
        let mut full = vec!["--json"];
        full.extend_from_slice(args);
        let stdout = self.run(&full);
        serde_json::from_str(&stdout).expect("parse json")
    }
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf8 path")
}

fn by_phone<'a>(items: &'a [Value], phone: &str) -> &'a Value {
    items
        .iter()
        .find(|item| item["phone"] == phone)
        .unwrap_or_else(|| panic!("no contact {phone}"))
}

const SCENARIO: &str = "Mobile,FullName,City\n9000000001,Asha,Pune\n900000000,Ravi,Mumbai\n9000000003,,Nashik\n";

#[test]
fn ingest_stores_valid_rows_and_writes_rejects() {
    let ws = Workspace::new();
    let input = ws.write("leads.csv", SCENARIO);
    let rejects = ws.path("rejects.csv");

    let report = ws.run_json(&[
        "ingest",
        path_str(&input),
        "--rejects-out",
        path_str(&rejects),
    ]);
    assert_eq!(report["rows"], 3);
    assert_eq!(report["inserted"], 2);
    assert_eq!(report["rejected"], 1);
    assert_eq!(report["failed"], 0);
    assert_eq!(report["files"][0]["mapping"]["phone"], "Mobile");

    let list = ws.run_json(&["list"]);
    let items = list.as_array().expect("array");
    assert_eq!(items.len(), 2);

    let asha = by_phone(items, "9000000001");
    assert_eq!(asha["geography_bucket"], "Pune");
    assert_eq!(asha["e164_phone"], "+919000000001");
    assert_eq!(asha["name"], "Asha");

    let third = by_phone(items, "9000000003");
    assert_eq!(third["geography_bucket"], "Other_State");
    assert_eq!(third["city"], "Nashik");
    assert!(third["name"].is_null());

    let rejected = fs::read_to_string(&rejects).expect("rejects file");
    assert_eq!(rejected, "Mobile,FullName,City\n900000000,Ravi,Mumbai\n");
}

#[test]
fn ingesting_twice_leaves_the_store_unchanged() {
    let ws = Workspace::new();
    let input = ws.write("leads.csv", SCENARIO);

    ws.run(&["ingest", path_str(&input)]);
    let before = ws.run_json(&["list", "--all"]);

    let second = ws.run_json(&["ingest", path_str(&input)]);
    assert_eq!(second["inserted"], 0);
    assert_eq!(second["updated"], 2);

    let after = ws.run_json(&["list", "--all"]);
    let strip = |value: &Value| -> Vec<Value> {
        let mut items = value.as_array().expect("array").clone();
        for item in &mut items {
            item.as_object_mut().expect("object").remove("updated_at");
        }
        items.sort_by_key(|item| item["phone"].as_str().unwrap_or_default().to_string());
        items
    };
    assert_eq!(strip(&before), strip(&after));
}

#[test]
fn formatted_variants_of_one_phone_become_one_contact() {
    let ws = Workspace::new();
    let input = ws.write(
        "dupes.csv",
        "phone,name,notes\n9876543210,Asha,first\n+91 98765 43210,,second\n",
    );

    ws.run(&["ingest", path_str(&input)]);

    let count = ws.run_json(&["count"]);
    assert_eq!(count["count"], 1);

    let list = ws.run_json(&["list"]);
    let contact = &list[0];
    assert_eq!(contact["phone"], "9876543210");
    assert_eq!(contact["raw_phone"], "+91 98765 43210");
    assert_eq!(contact["name"], "Asha");
    assert_eq!(contact["other"]["notes"], "second");
}

#[test]
fn short_phone_is_rejected_with_original_values() {
    let ws = Workspace::new();
    let input = ws.write("short.csv", "name,phone,area\nBad Row,12345,\"Pune, India\"\n");

    let output = ws.output(&["ingest", path_str(&input)]);
    assert!(output.status.success(), "command failed: {:?}", output);

    let count = ws.run_json(&["count"]);
    assert_eq!(count["count"], 0);

    let rejected = fs::read_to_string(ws.path("rejected_rows.csv")).expect("rejects file");
    assert_eq!(rejected, "name,phone,area\nBad Row,12345,\"Pune, India\"\n");
}

#[test]
fn count_and_stats_report_buckets() {
    let ws = Workspace::new();
    let input = ws.write(
        "mixed.csv",
        "tel_number,result_name,belong_area,city\n9000000001,A,\"Maharashtra, India\",Pune\n9000000002,B,\"Maharashtra, India\",\n9000000003,C,\"Karnataka, India\",Bengaluru\n",
    );
    ws.run(&["ingest", path_str(&input)]);

    let pune = ws.run_json(&["count", "--bucket", "pune"]);
    assert_eq!(pune["bucket"], "Pune");
    assert_eq!(pune["count"], 1);

    let stats = ws.run_json(&["stats", "--days", "7"]);
    assert_eq!(stats["total"], 3);
    let buckets = stats["buckets"].as_array().expect("buckets");
    let counts: Vec<(String, i64)> = buckets
        .iter()
        .map(|entry| {
            (
                entry["bucket"].as_str().expect("bucket").to_string(),
                entry["count"].as_i64().expect("count"),
            )
        })
        .collect();
    assert_eq!(
        counts,
        vec![
            ("Pune".to_string(), 1),
            ("Maharashtra_Other".to_string(), 1),
            ("Other_State".to_string(), 1),
        ]
    );
    let daily = stats["daily_added"].as_array().expect("daily");
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0]["count"], 3);

    let filtered = ws.run_json(&["list", "--bucket", "Maharashtra_Other", "--bucket", "Other_State"]);
    assert_eq!(filtered.as_array().expect("array").len(), 2);
}

#[test]
fn list_export_writes_csv() {
    let ws = Workspace::new();
    let input = ws.write("leads.csv", SCENARIO);
    ws.run(&["ingest", path_str(&input)]);

    let export = ws.path("export.csv");
    let stdout = ws.run(&["list", "--all", "--export", path_str(&export)]);
    assert!(stdout.contains("Exported 2 contacts"));

    let text = fs::read_to_string(&export).expect("export file");
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("id,phone,raw_phone,e164_phone,name,address,location_text,city,state,country,geography_bucket,other,created_at,updated_at")
    );
    assert_eq!(lines.count(), 2);
}

#[test]
fn dry_run_writes_preview_without_touching_store() {
    let ws = Workspace::new();
    let input = ws.write("leads.csv", SCENARIO);
    let preview = ws.path("preview.csv");

    let report = ws.run_json(&[
        "ingest",
        path_str(&input),
        "--dry-run",
        "--preview-out",
        path_str(&preview),
    ]);
    assert_eq!(report["dry_run"], true);
    assert_eq!(report["valid"], 2);
    assert_eq!(report["inserted"], 0);

    let text = fs::read_to_string(&preview).expect("preview file");
    assert_eq!(text.lines().count(), 3);
    assert!(text.contains("9000000003"));
    assert!(ws.path("rejected_rows.csv").exists());

    let count = ws.run_json(&["count"]);
    assert_eq!(count["count"], 0);
}

#[test]
fn folders_are_expanded_and_parallel_jobs_ingest_every_file() {
    let ws = Workspace::new();
    let drop = ws.path("drop");
    fs::create_dir(&drop).expect("dir");
    fs::write(drop.join("a.csv"), "phone\n9000000001\n9000000002\n").expect("write");
    fs::write(drop.join("b.csv"), "mobile\n9000000002\n9000000003\n").expect("write");
    fs::write(drop.join("skip.txt"), "phone\n9000000009\n").expect("write");

    let report = ws.run_json(&[
        "ingest",
        "--input-folder",
        path_str(&drop),
        "--jobs",
        "2",
        "--batch-size",
        "1",
    ]);
    assert_eq!(report["files"].as_array().expect("files").len(), 2);
    assert_eq!(report["inserted_or_updated"], 4);

    let count = ws.run_json(&["count"]);
    assert_eq!(count["count"], 3);
}

#[test]
fn invalid_bytes_reject_only_the_affected_row() {
    let ws = Workspace::new();
    let input = ws.path("mixed.csv");
    fs::write(&input, b"phone,name\n9000000001,Asha\n9\xff00000002,Bad\n").expect("write");

    let report = ws.run_json(&["ingest", path_str(&input)]);
    assert_eq!(report["failed_files"], 0);
    assert_eq!(report["inserted"], 1);
    assert_eq!(report["rejected"], 1);
    assert!(ws.path("rejected_rows.csv").exists());
}

#[cfg(target_os = "linux")]
#[test]
fn unreadable_file_is_reported_and_others_still_ingest() {
    let ws = Workspace::new();
    let good = ws.write("good.csv", "phone\n9000000001\n");

    // A regular file whose first read fails with EIO.
    let output = ws.output(&["ingest", "/proc/self/mem", path_str(&good)]);
    assert_eq!(output.status.code(), Some(4));

    let count = ws.run_json(&["count"]);
    assert_eq!(count["count"], 1);
}

#[test]
fn dry_run_without_valid_rows_writes_header_only_preview() {
    let ws = Workspace::new();
    let input = ws.write("bad.csv", "phone\n12345\n");
    let preview = ws.path("preview.csv");

    ws.run(&[
        "ingest",
        path_str(&input),
        "--dry-run",
        "--preview-out",
        path_str(&preview),
    ]);
    let text = fs::read_to_string(&preview).expect("preview file");
    assert!(text.starts_with("phone,raw_phone,"));
    assert_eq!(text.lines().count(), 1);
}

#[test]
fn phone_column_is_preferred_over_earlier_contact_column() {
    let ws = Workspace::new();
    let input = ws.write("leads.csv", "Contact,Phone\nRavi Kumar,9876543210\n");

    let report = ws.run_json(&["ingest", path_str(&input)]);
    assert_eq!(report["files"][0]["mapping"]["phone"], "Phone");
    assert_eq!(report["inserted"], 1);
    assert_eq!(report["rejected"], 0);
}

#[test]
fn invalid_config_stops_before_ingesting() {
    let ws = Workspace::new();
    let input = ws.write("leads.csv", SCENARIO);
    let config = ws.write("config.toml", "[ingest]\nbatch_size = 0\n");

    let output = ws.output(&["--config", path_str(&config), "ingest", path_str(&input)]);
    assert_eq!(output.status.code(), Some(3));
    assert!(!ws.db_path().exists());
    assert!(!ws.path("rejected_rows.csv").exists());
}

#[test]
fn config_locale_changes_classification() {
    let ws = Workspace::new();
    let config = ws.write(
        "config.toml",
        "[locale]\nprimary_city = \"Nagpur\"\nprimary_state = \"Maharashtra\"\n",
    );
    let input = ws.write("leads.csv", "phone,city\n9000000001,Nagpur\n9000000002,Pune\n");

    ws.run(&["--config", path_str(&config), "ingest", path_str(&input)]);

    let list = ws.run_json(&["list"]);
    let items = list.as_array().expect("array");
    assert_eq!(by_phone(items, "9000000001")["geography_bucket"], "Pune");
    assert_eq!(by_phone(items, "9000000002")["geography_bucket"], "Other_State");
}

#[test]
fn missing_input_is_invalid() {
    let ws = Workspace::new();
    let output = ws.output(&["ingest", path_str(&ws.path("nope.csv"))]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn completions_are_generated() {
    let output = cargo_bin_cmd!("dialbook")
        .args(["completions", "bash"])
        .output()
        .expect("run command");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("dialbook"));
}
