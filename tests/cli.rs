use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::{Value, json};

use chem_annotator::logging::LOG_FILE;

// Nothing listens on the discard port, so every lookup fails fast.
const OFFLINE: &str = "http://127.0.0.1:9";

fn chem_annotator(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_chem-annotator"))
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap()
}

fn offline_config(dir: &Path) {
    let config = json!({
        "chembl_base": OFFLINE,
        "pubchem_base": OFFLINE,
        "unichem_base": OFFLINE,
        "kegg_base": OFFLINE,
        "uniprot_base": OFFLINE,
        "request_timeout_secs": 5
    });
    fs::write(dir.join("config.json"), config.to_string()).unwrap();
}

#[test]
fn json_mode_prints_only_the_summary() {
    let temp = tempfile::tempdir().unwrap();
    offline_config(temp.path());
    fs::write(temp.path().join("input.csv"), "name,smiles\nethanol,CCO\n").unwrap();

    let output = chem_annotator(
        temp.path(),
        &["-i", "input.csv", "-o", "out", "-f", "smiles", "-c", "config.json", "--json"],
    );

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let summary: Value = serde_json::from_slice(&output.stdout)
        .unwrap_or_else(|err| panic!("{err}: {}", String::from_utf8_lossy(&output.stdout)));
    assert_eq!(summary["compounds"], json!(1));
    assert_eq!(summary["skipped"], json!([1]));
    assert_eq!(summary["outputs"].as_array().map(Vec::len), Some(6));

    let log = fs::read_to_string(temp.path().join(LOG_FILE)).unwrap();
    assert!(log.contains("while processing compound 1"), "{log}");
    assert!(log.contains("Script execution completed successfully."), "{log}");
}

#[test]
fn missing_arguments_exit_with_usage_code() {
    let temp = tempfile::tempdir().unwrap();

    let output = chem_annotator(temp.path(), &["-i", "input.csv"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    assert!(!temp.path().join(LOG_FILE).exists());
}
