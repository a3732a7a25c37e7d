//! Tests for configuration file loading.

use super::*;
use serial_test::serial;
use std::env;
use std::fs;

#[test]
fn default_config_path_contains_ldaplog_config_toml() {
    let Some(path) = default_config_path() else {
        return;
    };
    let path_str = path.to_string_lossy();
    assert!(
        path_str.contains("ldaplog") && path_str.ends_with("config.toml"),
        "Path should contain 'ldaplog' and end with 'config.toml', got: {}",
        path_str
    );
}

#[test]
fn load_config_file_returns_ok_none_for_missing_file() {
    let result = load_config_file("/nonexistent/path/to/config.toml");
    assert_eq!(
        result,
        Ok(None),
        "Missing config file should return Ok(None), not an error"
    );
}

#[test]
fn load_config_file_parses_valid_toml() {
    let config_path = env::temp_dir().join("ldaplog_test_config.toml");

    let toml_content = r#"
max_string_length = 200
pepper_file = "/etc/ldaplog/pepper"
redact_fields = ["requesterDN", "filter"]
tokenize_fields = ["requesterIP"]
skip_malformed = false
"#;

    fs::write(&config_path, toml_content).expect("Failed to write test config");

    let config = load_config_file(&config_path)
        .expect("Should successfully parse valid TOML")
        .expect("Should return Some(ConfigFile) for existing file");

    assert_eq!(config.max_string_length, Some(200));
    assert_eq!(config.pepper_file, Some(PathBuf::from("/etc/ldaplog/pepper")));
    assert_eq!(
        config.redact_fields,
        Some(vec!["requesterDN".to_string(), "filter".to_string()])
    );
    assert_eq!(config.tokenize_fields, Some(vec!["requesterIP".to_string()]));
    assert_eq!(config.skip_malformed, Some(false));
    assert_eq!(config.log_file_path, None);

    fs::remove_file(config_path).ok();
}

#[test]
fn load_config_file_returns_error_for_invalid_toml() {
    let config_path = env::temp_dir().join("ldaplog_test_invalid.toml");
    fs::write(&config_path, "max_string_length = [").expect("Failed to write test config");

    let result = load_config_file(&config_path);
    assert!(
        matches!(result, Err(ConfigError::ParseError { .. })),
        "Invalid TOML should be a parse error, got {:?}",
        result
    );

    fs::remove_file(config_path).ok();
}

#[test]
fn config_file_rejects_unknown_fields() {
    let result: Result<ConfigFile, _> = toml::from_str("theme = \"dark\"");
    assert!(result.is_err(), "Unknown keys should be rejected");
}

#[test]
fn merge_config_uses_defaults_when_none() {
    assert_eq!(merge_config(None), ResolvedConfig::default());
}

#[test]
fn merge_config_overrides_with_config_file_values() {
    let file = ConfigFile {
        max_string_length: Some(50),
        redact_fields: Some(vec!["dn".to_string()]),
        skip_malformed: Some(false),
        ..ConfigFile::default()
    };

    let resolved = merge_config(Some(file));
    assert_eq!(resolved.max_string_length, 50);
    assert_eq!(resolved.redact_fields, vec!["dn".to_string()]);
    assert!(!resolved.skip_malformed);
    assert!(resolved.tokenize_fields.is_empty());
}

#[test]
fn resolved_config_default_has_expected_values() {
    let config = ResolvedConfig::default();
    assert_eq!(config.max_string_length, 1000);
    assert!(config.skip_malformed);
    assert!(config.pepper.is_none());
    assert!(config.pepper_file.is_none());
}

#[test]
fn cli_overrides_take_precedence() {
    let base = merge_config(Some(ConfigFile {
        redact_fields: Some(vec!["dn".to_string()]),
        ..ConfigFile::default()
    }));

    let resolved = apply_cli_overrides(
        base,
        Some(10),
        Some(vec!["filter".to_string()]),
        None,
        true,
    );
    assert_eq!(resolved.max_string_length, 10);
    assert_eq!(resolved.redact_fields, vec!["filter".to_string()]);
    assert!(resolved.tokenize_fields.is_empty());
    assert!(!resolved.skip_malformed);
}

/// Removes an environment variable on creation and again on drop.
struct EnvGuard(&'static str);

impl EnvGuard {
    fn new(name: &'static str) -> Self {
        env::remove_var(name);
        Self(name)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        env::remove_var(self.0);
    }
}

#[test]
#[serial(ldaplog_pepper)]
fn apply_env_overrides_reads_pepper() {
    let _guard = EnvGuard::new(PEPPER_ENV_VAR);
    env::set_var(PEPPER_ENV_VAR, "from-env");

    let config = apply_env_overrides(ResolvedConfig::default());
    assert_eq!(config.pepper, Some(Pepper::new("from-env")));
}

#[test]
#[serial(ldaplog_pepper)]
fn apply_env_overrides_no_change_when_env_var_not_set() {
    let _guard = EnvGuard::new(PEPPER_ENV_VAR);

    let config = apply_env_overrides(ResolvedConfig::default());
    assert_eq!(config, ResolvedConfig::default());
}

#[test]
fn resolve_pepper_prefers_direct_pepper_over_file() {
    let config = ResolvedConfig {
        pepper: Some(Pepper::new("direct")),
        pepper_file: Some(PathBuf::from("/nonexistent/pepper")),
        ..ResolvedConfig::default()
    };
    assert_eq!(resolve_pepper(&config), Ok(Some(Pepper::new("direct"))));
}

#[test]
fn resolve_pepper_reads_file_and_strips_newline() {
    let path = env::temp_dir().join("ldaplog_test_pepper");
    fs::write(&path, "file-secret\r\n").expect("Failed to write pepper");

    let config = ResolvedConfig {
        pepper_file: Some(path.clone()),
        ..ResolvedConfig::default()
    };
    assert_eq!(resolve_pepper(&config), Ok(Some(Pepper::new("file-secret"))));

    fs::remove_file(path).ok();
}

#[test]
fn resolve_pepper_missing_file_is_error_without_contents() {
    let config = ResolvedConfig {
        pepper_file: Some(PathBuf::from("/nonexistent/ldaplog/pepper")),
        ..ResolvedConfig::default()
    };
    assert!(matches!(
        resolve_pepper(&config),
        Err(ConfigError::PepperRead { .. })
    ));
}

#[test]
fn resolve_pepper_none_when_unconfigured() {
    assert_eq!(resolve_pepper(&ResolvedConfig::default()), Ok(None));
}

#[test]
fn resolved_config_debug_hides_pepper() {
    let config = ResolvedConfig {
        pepper: Some(Pepper::new("hunter2")),
        ..ResolvedConfig::default()
    };
    assert!(!format!("{config:?}").contains("hunter2"));
}

#[test]
#[serial(ldaplog_config)]
fn load_config_with_precedence_prefers_explicit_path() {
    let _guard = EnvGuard::new(CONFIG_ENV_VAR);

    let explicit = env::temp_dir().join("ldaplog_test_explicit.toml");
    let from_env = env::temp_dir().join("ldaplog_test_env.toml");
    fs::write(&explicit, "max_string_length = 1").expect("write explicit");
    fs::write(&from_env, "max_string_length = 2").expect("write env");
    env::set_var(CONFIG_ENV_VAR, &from_env);

    let config = load_config_with_precedence(Some(explicit.clone()))
        .expect("load")
        .expect("some");
    assert_eq!(config.max_string_length, Some(1));

    fs::remove_file(explicit).ok();
    fs::remove_file(from_env).ok();
}

#[test]
#[serial(ldaplog_config)]
fn load_config_with_precedence_uses_env_var_when_no_explicit_path() {
    let _guard = EnvGuard::new(CONFIG_ENV_VAR);

    let from_env = env::temp_dir().join("ldaplog_test_env_only.toml");
    fs::write(&from_env, "max_string_length = 2").expect("write env");
    env::set_var(CONFIG_ENV_VAR, &from_env);

    let config = load_config_with_precedence(None)
        .expect("load")
        .expect("some");
    assert_eq!(config.max_string_length, Some(2));

    fs::remove_file(from_env).ok();
}
