use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Variables that would otherwise leak the developer's setup into the tests.
const ISOLATED_ENV: [&str; 9] = [
    "NUTRISCAN_PROVIDER",
    "OPENAI_MODEL",
    "GEMINI_MODEL",
    "OLLAMA_MODEL",
    "OLLAMA_API_BASE",
    "OPENAI_API_KEY",
    "GEMINI_API_KEY",
    "GOOGLE_API_KEY",
    "RUST_LOG",
];

fn nutriscan_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("nutriscan");
    path
}

/// Config pointing every network call at a closed local port.
fn setup_test_env(extra: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let config_dir = tmp.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[lookup]
base_url = "http://127.0.0.1:9"
timeout_secs = 2

{}
"#,
        extra
    );

    let config_path = config_dir.join("nutriscan.toml");
    fs::write(&config_path, config_content).unwrap();
    (tmp, config_path)
}

fn run_nutriscan(
    config_path: Option<&Path>,
    args: &[&str],
    env: &[(&str, &str)],
) -> (String, String, bool) {
    let binary = nutriscan_binary();
    let mut cmd = Command::new(&binary);
    for key in ISOLATED_ENV {
        cmd.env_remove(key);
    }
    cmd.envs(env.iter().copied());
    if let Some(path) = config_path {
        cmd.arg("--config").arg(path);
    }

    let output = cmd
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run nutriscan binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_provider_defaults_to_openai() {
    let (_tmp, config_path) = setup_test_env("");
    let (stdout, stderr, success) = run_nutriscan(Some(&config_path), &["provider"], &[]);
    assert!(success, "provider failed: {}", stderr);
    assert!(stdout.contains("provider: openai"));
    assert!(stdout.contains("model: gpt-4o-mini"));
}

#[test]
fn test_provider_flag() {
    let (_tmp, config_path) = setup_test_env("");
    let (stdout, _, success) =
        run_nutriscan(Some(&config_path), &["--provider", "gemini", "provider"], &[]);
    assert!(success);
    assert!(stdout.contains("provider: gemini"));
    assert!(stdout.contains("model: gemini-2.0-flash"));
}

#[test]
fn test_provider_from_config_file() {
    let (_tmp, config_path) = setup_test_env(
        "[assistant]\nprovider = \"ollama\"\nmodel = \"llama3\"\nollama_url = \"http://custom:8080/\"\n",
    );
    let (stdout, _, success) = run_nutriscan(Some(&config_path), &["provider"], &[]);
    assert!(success);
    assert!(stdout.contains("provider: ollama"));
    assert!(stdout.contains("model: llama3"));
    assert!(stdout.contains("api_base: http://custom:8080"));
}

#[test]
fn test_provider_from_environment() {
    let (_tmp, config_path) = setup_test_env("");
    let (stdout, _, success) = run_nutriscan(
        Some(&config_path),
        &["provider"],
        &[
            ("NUTRISCAN_PROVIDER", "ollama"),
            ("OLLAMA_API_BASE", "http://custom:8080"),
        ],
    );
    assert!(success);
    assert!(stdout.contains("provider: ollama"));
    assert!(stdout.contains("model: mistral"));
    assert!(stdout.contains("api_base: http://custom:8080"));
}

#[test]
fn test_unknown_provider_falls_back() {
    let (_tmp, config_path) = setup_test_env("");
    let (stdout, _, success) =
        run_nutriscan(Some(&config_path), &["--provider", "mystery", "provider"], &[]);
    assert!(success);
    assert!(stdout.contains("provider: openai"));
}

#[test]
fn test_invalid_config_rejected() {
    let (_tmp, config_path) = setup_test_env("");
    fs::write(&config_path, "[lookup]\npage_size = 0\n").unwrap();
    let (_, stderr, success) = run_nutriscan(Some(&config_path), &["provider"], &[]);
    assert!(!success);
    assert!(stderr.contains("page_size"));
}

#[test]
fn test_explicit_missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("absent.toml");
    let (_, stderr, success) = run_nutriscan(Some(&missing), &["provider"], &[]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}

#[test]
fn test_inspect_edition_record() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("product.json");
    fs::write(
        &file,
        r#"{
  "status": 1,
  "product": {
    "code": "3017620422003",
    "product_name": "Hazelnut spread",
    "nutriscore": { "2021": { "grade": "d" }, "2023": { "grade": "b" } },
    "nova_group": "4",
    "nutriments": { "proteins_100g": 6.3, "fat_100g": "30.9" }
  }
}"#,
    )
    .unwrap();

    let (stdout, stderr, success) = run_nutriscan(None, &["inspect", file.to_str().unwrap()], &[]);
    assert!(success, "inspect failed: {}", stderr);
    assert!(stdout.contains("\"quality_grade\": \"B\""));
    assert!(stdout.contains("\"processing_group\": 4"));
    assert!(stdout.contains("\"brand\": \"unknown brand\""));
    assert!(stdout.contains("Nutri-Score ordinal: 4/5"));
    assert!(stdout.contains("Nutrients per 100g:"));
}

#[test]
fn test_inspect_rejects_invalid_json() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("broken.json");
    fs::write(&file, "{ not json").unwrap();
    let (_, stderr, success) = run_nutriscan(None, &["inspect", file.to_str().unwrap()], &[]);
    assert!(!success);
    assert!(stderr.contains("Invalid JSON"));
}

#[test]
fn test_search_fails_safe_when_offline() {
    let (_tmp, config_path) = setup_test_env("");
    let (stdout, stderr, success) = run_nutriscan(Some(&config_path), &["search", "nutella"], &[]);
    assert!(success, "search failed: {}", stderr);
    assert!(stdout.contains("No products found."));
}

#[test]
fn test_compare_fails_safe_when_offline() {
    let (_tmp, config_path) = setup_test_env("");
    let (stdout, _, success) = run_nutriscan(
        Some(&config_path),
        &["compare", "3017620422003", "3017620422003"],
        &[],
    );
    assert!(success);
    assert!(stdout.contains("3017620422003: product not found"));
    assert!(stdout.contains("No products to compare."));
}

#[test]
fn test_compare_skips_non_barcodes() {
    let (_tmp, config_path) = setup_test_env("");
    let (stdout, _, success) =
        run_nutriscan(Some(&config_path), &["compare", "a/../b", "x?y"], &[]);
    assert!(success);
    assert!(stdout.contains("a/../b: not a barcode, skipped"));
    assert!(stdout.contains("x?y: not a barcode, skipped"));
    assert!(stdout.contains("No products to compare."));
}

#[test]
fn test_search_rejects_out_of_range_limit() {
    let (_tmp, config_path) = setup_test_env("");
    for limit in ["0", "100000"] {
        let (_, stderr, success) = run_nutriscan(
            Some(&config_path),
            &["search", "nutella", "--limit", limit],
            &[],
        );
        assert!(!success, "--limit {} accepted", limit);
        assert!(stderr.contains("--limit must be in [1, 100]"));
    }
}

#[test]
fn test_search_ask_without_results_skips_assistant() {
    let (_tmp, config_path) = setup_test_env("");
    let (stdout, stderr, success) = run_nutriscan(
        Some(&config_path),
        &["search", "nutella", "--ask", "Is it healthy?"],
        &[],
    );
    assert!(success, "search failed: {}", stderr);
    assert!(stdout.contains("No products found."));
    assert!(!stdout.contains("❌"));
}

#[test]
fn test_chat_without_api_key_reports_error() {
    let (_tmp, config_path) = setup_test_env("");
    let (stdout, _, success) = run_nutriscan(Some(&config_path), &["chat", "Is sugar bad?"], &[]);
    assert!(success);
    assert!(stdout.starts_with("❌ Error:"));
    assert!(stdout.contains("OPENAI_API_KEY"));
}

#[test]
fn test_chat_unreachable_ollama_reports_error() {
    let (_tmp, config_path) =
        setup_test_env("[assistant]\nprovider = \"ollama\"\nollama_url = \"http://127.0.0.1:9\"\ntimeout_secs = 2\n");
    let (stdout, _, success) = run_nutriscan(Some(&config_path), &["chat", "Hello"], &[]);
    assert!(success);
    assert!(stdout.starts_with("❌ Error:"));
}

#[test]
fn test_chat_session_on_stdin() {
    use std::io::Write;
    use std::process::Stdio;

    let (_tmp, config_path) = setup_test_env("");
    let mut cmd = Command::new(nutriscan_binary());
    for key in ISOLATED_ENV {
        cmd.env_remove(key);
    }
    let mut child = cmd
        .arg("--config")
        .arg(&config_path)
        .arg("chat")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"/suggest\nHello\n/history\n/quit\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("1. What is the Nutri-Score?"));
    assert!(stdout.contains("❌ Error:"));
    // failed dispatch keeps only the user turn
    assert!(stdout.contains("[user] Hello"));
    assert!(!stdout.contains("[assistant]"));
}
