//! Loader behaviour for `tutorline-config`: defaults, file discovery,
//! environment overrides and limit validation.

use std::fs;
use std::path::{Path, PathBuf};

use serial_test::serial;
use tempfile::TempDir;

use tutorline_config::{load, load_with, AppConfig, ChatConfig, HttpConfig};

const ENV_VARS_TO_RESET: &[&str] = &[
    "TUTORLINE_CONFIG",
    "TUTORLINE__AUTH__SESSION_TTL_SECONDS",
    "TUTORLINE__CHAT__DEFAULT_PAGE_SIZE",
    "TUTORLINE__CHAT__MAX_MESSAGE_LENGTH",
    "TUTORLINE__CHAT__MAX_PAGE_SIZE",
    "TUTORLINE__DATABASE__MAX_CONNECTIONS",
    "TUTORLINE__DATABASE__URL",
    "TUTORLINE__HTTP__ADDRESS",
    "TUTORLINE__HTTP__PORT",
];

struct TestContext {
    vars: Vec<(String, Option<String>)>,
    original_dir: Option<PathBuf>,
}

impl TestContext {
    fn new() -> Self {
        Self {
            vars: Vec::new(),
            original_dir: None,
        }
    }

    fn isolated(dir: &Path) -> Self {
        let mut ctx = Self::new();
        ctx.reset_environment();
        ctx.set_current_dir(dir);
        ctx
    }

    fn reset_environment(&mut self) {
        for key in ENV_VARS_TO_RESET {
            self.remove_var(key);
        }
    }

    fn set_var(&mut self, key: &str, value: impl AsRef<str>) {
        let previous = std::env::var(key).ok();
        std::env::set_var(key, value.as_ref());
        self.vars.push((key.to_string(), previous));
    }

    fn remove_var(&mut self, key: &str) {
        let previous = std::env::var(key).ok();
        std::env::remove_var(key);
        self.vars.push((key.to_string(), previous));
    }

    fn set_current_dir(&mut self, dir: &Path) {
        if self.original_dir.is_none() {
            self.original_dir =
                Some(std::env::current_dir().expect("failed to capture current directory"));
        }
        std::env::set_current_dir(dir).expect("failed to set current directory");
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        if let Some(original) = self.original_dir.take() {
            let _ = std::env::set_current_dir(original);
        }

        while let Some((key, value)) = self.vars.pop() {
            match value {
                Some(val) => std::env::set_var(&key, val),
                None => std::env::remove_var(&key),
            }
        }
    }
}

fn write_config_file(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create config directories");
    }
    fs::write(&path, contents).expect("failed to write config file");
    path
}

#[test]
#[serial]
fn load_uses_default_values_when_no_files_found() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let _ctx = TestContext::isolated(temp_dir.path());

    let config = load().expect("configuration load should succeed without files");
    let defaults = AppConfig::default();

    assert_eq!(config.http.address, defaults.http.address);
    assert_eq!(config.http.port, defaults.http.port);
    assert_eq!(config.database.url, defaults.database.url);
    assert_eq!(
        config.database.max_connections,
        defaults.database.max_connections
    );
    assert_eq!(config.auth.session_ttl_seconds, defaults.auth.session_ttl_seconds);
    assert_eq!(
        config.chat.max_message_length,
        defaults.chat.max_message_length
    );
    assert_eq!(config.chat.default_page_size, defaults.chat.default_page_size);
    assert_eq!(config.chat.max_page_size, defaults.chat.max_page_size);
}

#[test]
#[serial]
fn load_picks_first_available_file_in_search_order() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let _ctx = TestContext::isolated(temp_dir.path());

    write_config_file(
        temp_dir.path(),
        "tutorline.toml",
        r#"
        [http]
        port = 4242
        "#,
    );
    write_config_file(
        temp_dir.path(),
        "config/tutorline.toml",
        r#"
        [http]
        port = 5151
        "#,
    );

    let config = load().expect("configuration load should pick the first file");
    assert_eq!(config.http.port, 4242);
}

#[test]
#[serial]
fn load_merges_partial_file_with_defaults() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let _ctx = TestContext::isolated(temp_dir.path());

    write_config_file(
        temp_dir.path(),
        "tutorline.toml",
        r#"
        [chat]
        max_message_length = 280

        [database]
        max_connections = 50
        "#,
    );

    let config = load().expect("configuration load should succeed");
    let defaults = AppConfig::default();

    assert_eq!(config.chat.max_message_length, 280);
    assert_eq!(config.chat.max_page_size, defaults.chat.max_page_size);
    assert_eq!(config.database.max_connections, 50);
    assert_eq!(config.database.url, defaults.database.url);
    assert_eq!(config.http.port, defaults.http.port);
}

#[test]
#[serial]
fn load_applies_environment_overrides() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::isolated(temp_dir.path());

    write_config_file(
        temp_dir.path(),
        "tutorline.toml",
        r#"
        [http]
        port = 3030
        "#,
    );

    ctx.set_var("TUTORLINE__HTTP__PORT", "8080");
    ctx.set_var("TUTORLINE__CHAT__MAX_PAGE_SIZE", "25");
    ctx.set_var("TUTORLINE__CHAT__DEFAULT_PAGE_SIZE", "10");

    let config = load().expect("configuration load should honour env overrides");
    assert_eq!(config.http.port, 8080);
    assert_eq!(config.chat.max_page_size, 25);
    assert_eq!(config.chat.default_page_size, 10);
}

#[test]
#[serial]
fn load_prefers_explicit_path_over_environment_variable() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::isolated(temp_dir.path());

    let from_env = write_config_file(
        temp_dir.path(),
        "env/tutorline.toml",
        r#"
        [http]
        port = 1111
        "#,
    );
    let explicit = write_config_file(
        temp_dir.path(),
        "cli/tutorline.toml",
        r#"
        [http]
        port = 2222
        "#,
    );
    ctx.set_var("TUTORLINE_CONFIG", from_env.display().to_string());

    let config = load_with(Some(&explicit)).expect("explicit configuration should load");
    assert_eq!(config.http.port, 2222);

    let config = load().expect("env configuration should load");
    assert_eq!(config.http.port, 1111);
}

#[test]
#[serial]
fn load_clamps_default_page_size_to_maximum() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let _ctx = TestContext::isolated(temp_dir.path());

    write_config_file(
        temp_dir.path(),
        "tutorline.toml",
        r#"
        [chat]
        default_page_size = 500
        max_page_size = 40
        "#,
    );

    let config = load().expect("oversized default page size should be clamped");
    assert_eq!(config.chat.default_page_size, 40);
    assert_eq!(config.chat.max_page_size, 40);
}

#[test]
#[serial]
fn load_rejects_zero_message_length() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::isolated(temp_dir.path());

    ctx.set_var("TUTORLINE__CHAT__MAX_MESSAGE_LENGTH", "0");

    let error = load().expect_err("zero message length should be rejected");
    assert!(error.to_string().contains("max_message_length"));
}

#[test]
#[serial]
fn load_clamps_session_ttl_to_i64_maximum() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::isolated(temp_dir.path());

    let oversized = (i64::MAX as u128 + 42).to_string();
    ctx.set_var("TUTORLINE__AUTH__SESSION_TTL_SECONDS", &oversized);

    let config = load().expect("configuration load should succeed with oversized TTL");
    assert_eq!(
        config.auth.session_ttl_seconds,
        i64::MAX as u64,
        "session TTL should be clamped to i64::MAX"
    );
}

#[test]
#[serial]
fn load_errors_on_invalid_toml_contents() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let _ctx = TestContext::isolated(temp_dir.path());

    write_config_file(
        temp_dir.path(),
        "tutorline.toml",
        r#"
        [http]
        port = "not-a-number
        "#,
    );

    let error = load().expect_err("invalid TOML should cause load to fail");
    let message = error.to_string();
    assert!(
        message.contains("invalid configuration") || message.contains("unable to build configuration"),
        "unexpected error message: {message}"
    );
}

#[test]
fn chat_config_defaults_are_within_bounds() {
    let defaults = ChatConfig::default();
    assert_eq!(defaults.default_page_size, 50);
    assert_eq!(defaults.max_page_size, 100);
}

#[test]
fn http_config_defaults_match_expected_host_and_port() {
    let defaults = HttpConfig::default();
    assert_eq!(defaults.address, "127.0.0.1");
    assert_eq!(defaults.port, 7070);
}
