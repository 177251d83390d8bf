//! Test harness for the NEON decoder against fixture files.
//!
//! Every .neon file under test/neon/ is decoded and compared, as JSON, with
//! the file of the same stem under test/json/. Every .nay file under test/nay/
//! must fail to decode with the message in the matching .error file.

use std::fs;
use std::path::{Path, PathBuf};

use glob::glob;
use libneon::{decode_with_filename, Value};
use serde_json::Value as Json;

/// Root test directory.
fn test_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("test")
}

/// All files with extension `ext` in a subdirectory of test/, sorted.
fn fixture_files(subdir: &str, ext: &str) -> Vec<PathBuf> {
    let pattern = test_root().join(subdir).join(format!("*.{}", ext));
    let mut files: Vec<PathBuf> = glob(&pattern.to_string_lossy())
        .expect("valid glob pattern")
        .filter_map(|entry| entry.ok())
        .collect();
    files.sort();
    files
}

/// Sibling fixture with the same stem in another subdirectory of test/.
fn companion(path: &Path, subdir: &str, ext: &str) -> PathBuf {
    let stem = path.file_stem().unwrap().to_string_lossy();
    test_root().join(subdir).join(format!("{}.{}", stem, ext))
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().to_string()
}

/// JSON view of a decoded value. Keys use their display text.
fn to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Integer(_) => Json::from(value.as_i64().expect("fixture integers fit in i64")),
        Value::Float(f) => Json::from(*f),
        Value::String(s) => Json::String(s.clone()),
        Value::Sequence(items) => Json::Array(items.iter().map(to_json).collect()),
        Value::Mapping(map) => Json::Object(
            map.iter()
                .map(|(k, v)| (k.to_string(), to_json(v)))
                .collect(),
        ),
    }
}

/// Key order of every object, depth first; JSON map equality ignores it.
fn key_order(json: &Json, out: &mut Vec<String>) {
    match json {
        Json::Array(items) => items.iter().for_each(|item| key_order(item, out)),
        Json::Object(map) => {
            for (key, value) in map {
                out.push(key.clone());
                key_order(value, out);
            }
        }
        _ => {}
    }
}

/// Run a single .neon file (expected to succeed).
fn run_neon_test(path: &Path) -> Result<(), String> {
    let filename = file_name(path);
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", filename, e))?;

    let doc = decode_with_filename(&content, Some(&filename))
        .map_err(|e| format!("{}: Unexpected decode error: {}", filename, e))?;
    let actual = to_json(&Value::Mapping(doc));

    let expected_path = companion(path, "json", "json");
    let expected_text = fs::read_to_string(&expected_path)
        .map_err(|e| format!("{}: Missing expected output: {}", filename, e))?;
    let expected: Json = serde_json::from_str(&expected_text)
        .map_err(|e| format!("{}: Invalid expected output: {}", filename, e))?;

    if actual != expected {
        return Err(format!(
            "{}: Output mismatch\n    expected: {}\n    actual:   {}",
            filename, expected, actual
        ));
    }

    let (mut actual_keys, mut expected_keys) = (Vec::new(), Vec::new());
    key_order(&actual, &mut actual_keys);
    key_order(&expected, &mut expected_keys);
    if actual_keys != expected_keys {
        return Err(format!(
            "{}: Key order mismatch\n    expected: {:?}\n    actual:   {:?}",
            filename, expected_keys, actual_keys
        ));
    }

    println!("  {} => {}", filename, actual);
    Ok(())
}

/// Run a single .nay file (expected to fail with a specific error).
fn run_nay_test(path: &Path) -> Result<(), String> {
    let filename = file_name(path);
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", filename, e))?;

    match decode_with_filename(&content, Some(&filename)) {
        Ok(doc) => Err(format!(
            "{}: Expected decode error, but got success: {:?}",
            filename, doc
        )),
        Err(e) => {
            let actual_error = e.to_string();
            match fs::read_to_string(companion(path, "nay", "error")) {
                Ok(expected) if expected.trim() == actual_error => {
                    println!("  {} => error (as expected)", filename);
                    Ok(())
                }
                Ok(expected) => Err(format!(
                    "{}: Error mismatch\n    expected: {}\n    actual:   {}",
                    filename,
                    expected.trim(),
                    actual_error
                )),
                Err(_) => {
                    println!(
                        "  {} => error: {} (no .error file to compare)",
                        filename, actual_error
                    );
                    Ok(())
                }
            }
        }
    }
}

fn run_all(kind: &str, files: &[PathBuf], run: fn(&Path) -> Result<(), String>) {
    assert!(!files.is_empty(), "no .{} fixtures found", kind);
    println!("\nRunning {} .{} test files:", files.len(), kind);

    let errors: Vec<String> = files.iter().filter_map(|f| run(f).err()).collect();

    println!(
        "\nResults: {} passed, {} failed",
        files.len() - errors.len(),
        errors.len()
    );
    if !errors.is_empty() {
        println!("\nErrors:");
        for error in &errors {
            println!("  - {}", error);
        }
    }

    assert!(errors.is_empty(), "{} .{} tests failed", errors.len(), kind);
}

#[test]
fn test_all_neon_fixtures() {
    run_all("neon", &fixture_files("neon", "neon"), run_neon_test);
}

#[test]
fn test_all_nay_fixtures() {
    run_all("nay", &fixture_files("nay", "nay"), run_nay_test);
}

#[test]
fn test_every_neon_fixture_has_expected_output() {
    for path in fixture_files("neon", "neon") {
        let expected = companion(&path, "json", "json");
        assert!(expected.exists(), "missing {}", expected.display());
    }
}
