use std::path::{Path, PathBuf};

use {
    serde::{Serialize, de::DeserializeOwned},
    tracing::{debug, warn},
};

use crate::{
    env_subst::substitute_env,
    error::{Context, Error, Result},
    schema::{ApiconfConfig, ProviderSettings},
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "apiconf.toml",
    "apiconf.yaml",
    "apiconf.yml",
    "apiconf.json",
];

/// Load the engine config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<ApiconfConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_document(&substitute_env(&raw), path)
}

/// Load the engine config as an untyped tree, for diagnostics.
pub fn load_config_value(path: &Path) -> Result<serde_json::Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_document(&substitute_env(&raw), path)
}

/// Discover and load the engine config from standard locations.
///
/// Search order:
/// 1. `./apiconf.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/apiconf/apiconf.{toml,yaml,yml,json}` (user-global)
///
/// Returns `ApiconfConfig::default()` if no file is found or it fails to load.
pub fn discover_and_load() -> ApiconfConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    ApiconfConfig::default()
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    if let Some(path) = CONFIG_FILENAMES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
    {
        return Some(path);
    }

    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/apiconf/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "apiconf").map(|d| d.config_dir().to_path_buf())
}

/// Read a persisted provider settings record (`.json`, `.toml`, `.yaml`).
pub fn load_provider_settings(path: &Path) -> Result<ProviderSettings> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_document(&raw, path)
}

/// Write a provider settings record atomically, in the format implied by the
/// file extension.
///
/// The record carries credentials, so the file is created owner-readable only
/// on unix.
pub fn save_provider_settings(path: &Path, settings: &ProviderSettings) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let data = render_document(settings, path)?;

    // Write via temp file + rename so readers never observe a partial record.
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = path.with_extension(format!("tmp.{nanos}"));
    std::fs::write(&temp_path, data)
        .with_context(|| format!("failed to write {}", temp_path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600));
    }
    std::fs::rename(&temp_path, path)
        .with_context(|| format!("failed to replace {}", path.display()))?;

    debug!(path = %path.display(), "saved provider settings");
    Ok(())
}

fn extension(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("toml")
}

fn parse_document<T: DeserializeOwned>(raw: &str, path: &Path) -> Result<T> {
    match extension(path) {
        "toml" => toml::from_str(raw).context("invalid TOML"),
        "yaml" | "yml" => serde_yaml::from_str(raw).context("invalid YAML"),
        "json" => Ok(serde_json::from_str(raw)?),
        ext => Err(Error::message(format!("unsupported config format: .{ext}"))),
    }
}

fn render_document<T: Serialize>(value: &T, path: &Path) -> Result<String> {
    match extension(path) {
        "toml" => toml::to_string_pretty(value).context("serialize TOML"),
        "yaml" | "yml" => serde_yaml::to_string(value).context("serialize YAML"),
        "json" => Ok(serde_json::to_string_pretty(value)?),
        ext => Err(Error::message(format!("unsupported config format: .{ext}"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, apiconf_common::ProviderName};

    #[test]
    fn loads_toml_config_with_env_fallbacks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apiconf.toml");
        std::fs::write(
            &path,
            "[reconcile]\ncatalog_refresh_debounce_ms = ${APICONF_UNSET_WINDOW:-400}\n",
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.reconcile.catalog_refresh_debounce_ms, 400);
        assert_eq!(cfg.reconcile.header_commit_debounce_ms, 300);
    }

    #[test]
    fn loads_yaml_and_json_configs() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("apiconf.yaml");
        std::fs::write(&yaml, "catalog:\n  request_timeout_secs: 3\n").unwrap();
        assert_eq!(load_config(&yaml).unwrap().catalog.request_timeout_secs, 3);

        let json = dir.path().join("apiconf.json");
        std::fs::write(&json, r#"{"reconcile":{"header_commit_debounce_ms":50}}"#).unwrap();
        assert_eq!(
            load_config(&json).unwrap().reconcile.header_commit_debounce_ms,
            50
        );
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apiconf.ini");
        std::fs::write(&path, "x=1").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains(".ini"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_config(Path::new("/nonexistent/apiconf.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/apiconf.toml"));
    }

    #[test]
    fn provider_settings_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = ProviderSettings {
            api_provider: Some(ProviderName::OpenRouter),
            open_router_model_id: Some("anthropic/claude-3.7-sonnet".into()),
            open_router_api_key: Some("sk-or".into()),
            ..Default::default()
        };

        save_provider_settings(&path, &settings).unwrap();
        assert_eq!(load_provider_settings(&path).unwrap(), settings);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"openRouterModelId\""));
        assert!(!raw.contains("apiModelId"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn provider_settings_in_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let settings = ProviderSettings {
            api_provider: Some(ProviderName::Ollama),
            ollama_base_url: Some("http://gpu-box:11434".into()),
            ..Default::default()
        };
        save_provider_settings(&path, &settings).unwrap();
        assert_eq!(load_provider_settings(&path).unwrap(), settings);
    }
}
