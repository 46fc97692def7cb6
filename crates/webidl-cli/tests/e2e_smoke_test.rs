use std::{fs, path::PathBuf};

use tempfile::tempdir;

use webidl::MANIFEST_FILE;
use webidl_cli::{Args, run, summary};

fn demos_path() -> PathBuf {
    // Demos are at workspace root, relative to workspace not the crate
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

/// Collects all .webidl files from a directory
fn collect_webidl_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("webidl")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

fn args(files: &[PathBuf], cache_dir: Option<PathBuf>) -> Args {
    Args {
        files: files
            .iter()
            .map(|path| path.to_string_lossy().to_string())
            .collect(),
        cache_dir: cache_dir.map(|dir| dir.to_string_lossy().to_string()),
        config: None,
        log_level: "off".to_string(),
        verbose: false,
        deny_warnings: false,
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let demos = collect_webidl_files(demos_path());
    assert!(!demos.is_empty(), "No demos found in demos/");

    let definitions = match run(&args(&demos, None)) {
        Ok(definitions) => definitions,
        Err(e) => panic!("Demo corpus failed to parse:\n{}", e.render()),
    };

    let summary = summary(&definitions);
    assert!(summary.contains("interface Window\n"));
    assert!(summary.contains("callback interface EventListener\n"));
    assert!(summary.contains("enum DocumentReadyState\n"));
    assert_eq!(summary.lines().count(), definitions.len());
}

#[test]
fn e2e_smoke_test_writes_manifest() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let cache_dir = temp_dir.path().join("cache");
    let demos = collect_webidl_files(demos_path());

    let definitions = run(&args(&demos, Some(cache_dir.clone()))).expect("Demos should parse");

    let manifest = fs::read_to_string(cache_dir.join(MANIFEST_FILE)).unwrap();
    let manifest: toml::Table = toml::from_str(&manifest).unwrap();
    assert_eq!(manifest.len(), definitions.len());

    let window = manifest["Window"].as_array().unwrap();
    assert!(
        window
            .iter()
            .any(|file| file.as_str().unwrap().ends_with("events.webidl"))
    );
}

#[test]
fn e2e_smoke_test_error_demos() {
    let error_demos = collect_webidl_files(demos_path().join("errors"));

    assert!(
        !error_demos.is_empty(),
        "No error demos found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        if run(&args(std::slice::from_ref(demo_path), None)).is_ok() {
            unexpectedly_succeeded.push(demo_path.clone());
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }
}

#[test]
fn e2e_deny_warnings_flag() {
    let temp_dir = tempdir().unwrap();
    let legacy = temp_dir.path().join("legacy.webidl");
    fs::write(&legacy, "exception Legacy { long code; };\ninterface Modern {};\n").unwrap();

    let lenient = args(std::slice::from_ref(&legacy), None);
    assert_eq!(run(&lenient).unwrap().warnings().len(), 1);

    let mut strict = args(std::slice::from_ref(&legacy), None);
    strict.deny_warnings = true;
    assert!(run(&strict).is_err());
}
