//! Diagnostics for the engine config file.
//!
//! Flags unknown/misspelled keys, values that fail to deserialize, and
//! settings that parse but cannot work (zero timeouts, malformed URLs).

use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde_json::Value;

use crate::schema::{ApiconfConfig, CatalogConfig, ReconcileConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// "syntax", "unknown-field", "type-error", "semantic", "file-ref"
    pub category: &'static str,
    /// Dotted path, e.g. "catalog.ollama_url"
    pub path: String,
    pub message: String,
}

/// Outcome of checking one config file.
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl CheckReport {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(
        &mut self,
        severity: Severity,
        category: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(Diagnostic {
            severity,
            category,
            path: path.into(),
            message: message.into(),
        });
    }
}

const TOP_LEVEL_KEYS: &[&str] = &["reconcile", "catalog"];
const RECONCILE_KEYS: &[&str] = &["header_commit_debounce_ms", "catalog_refresh_debounce_ms"];
const CATALOG_KEYS: &[&str] = &[
    "request_timeout_secs",
    "openrouter_url",
    "requesty_url",
    "glama_url",
    "unbound_url",
    "litellm_url",
    "ollama_url",
    "lmstudio_url",
];

/// Debounce windows above this are almost certainly a unit mix-up.
const SLOW_WINDOW_MS: u64 = 10_000;

/// Check the config at `path`, or the discovered config when `None`.
#[must_use]
pub fn check(path: Option<&Path>) -> CheckReport {
    let Some(path) = path
        .map(Path::to_path_buf)
        .or_else(crate::loader::find_config_file)
    else {
        let mut report = CheckReport::default();
        report.push(
            Severity::Info,
            "file-ref",
            "",
            "no config file found; using defaults",
        );
        return report;
    };

    let mut report = match crate::loader::load_config_value(&path) {
        Ok(tree) => check_value(&tree),
        Err(e) => {
            let mut report = CheckReport::default();
            report.push(Severity::Error, "syntax", "", e.to_string());
            report
        },
    };
    report.config_path = Some(path);
    report
}

/// Check an already-parsed config tree.
#[must_use]
pub fn check_value(tree: &Value) -> CheckReport {
    let mut report = CheckReport::default();

    let Some(root) = tree.as_object() else {
        report.push(Severity::Error, "syntax", "", "config root must be a table");
        return report;
    };

    for (key, child) in root {
        let nested = match key.as_str() {
            "reconcile" => RECONCILE_KEYS,
            "catalog" => CATALOG_KEYS,
            _ => {
                report_unknown(&mut report, key, key, TOP_LEVEL_KEYS);
                continue;
            },
        };
        let Some(section) = child.as_object() else {
            report.push(Severity::Error, "type-error", key, "expected a table");
            continue;
        };
        for name in section.keys() {
            if !nested.contains(&name.as_str()) {
                report_unknown(&mut report, &format!("{key}.{name}"), name, nested);
            }
        }
    }

    match serde_json::from_value::<ApiconfConfig>(tree.clone()) {
        Ok(config) => {
            check_reconcile(&config.reconcile, &mut report);
            check_catalog(&config.catalog, &mut report);
        },
        Err(e) => report.push(Severity::Error, "type-error", "", format!("type error: {e}")),
    }

    report
}

fn report_unknown(report: &mut CheckReport, path: &str, key: &str, known: &[&str]) {
    let message = match suggest(key, known) {
        Some(s) => format!("unknown field (did you mean \"{s}\"?)"),
        None => "unknown field".to_string(),
    };
    report.push(Severity::Warning, "unknown-field", path, message);
}

fn check_reconcile(cfg: &ReconcileConfig, report: &mut CheckReport) {
    for (name, value) in [
        ("header_commit_debounce_ms", cfg.header_commit_debounce_ms),
        ("catalog_refresh_debounce_ms", cfg.catalog_refresh_debounce_ms),
    ] {
        let path = format!("reconcile.{name}");
        if value == 0 {
            report.push(
                Severity::Warning,
                "semantic",
                path,
                "a zero window fires on the next tick and no longer coalesces edits",
            );
        } else if value > SLOW_WINDOW_MS {
            report.push(
                Severity::Warning,
                "semantic",
                path,
                format!("{value} ms is unusually long; the value is in milliseconds"),
            );
        }
    }
}

fn check_catalog(cfg: &CatalogConfig, report: &mut CheckReport) {
    if cfg.request_timeout_secs == 0 {
        report.push(
            Severity::Error,
            "semantic",
            "catalog.request_timeout_secs",
            "timeout must be at least one second",
        );
    }

    for (name, raw) in [
        ("openrouter_url", &cfg.openrouter_url),
        ("requesty_url", &cfg.requesty_url),
        ("glama_url", &cfg.glama_url),
        ("unbound_url", &cfg.unbound_url),
        ("litellm_url", &cfg.litellm_url),
        ("ollama_url", &cfg.ollama_url),
        ("lmstudio_url", &cfg.lmstudio_url),
    ] {
        if let Err(reason) = check_http_url(raw) {
            report.push(
                Severity::Error,
                "semantic",
                format!("catalog.{name}"),
                reason,
            );
        }
    }
}

/// Accepts absolute `http`/`https` URLs with a host.
pub fn check_http_url(raw: &str) -> Result<(), String> {
    let parsed = url::Url::parse(raw.trim()).map_err(|e| format!("invalid URL \"{raw}\": {e}"))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(()),
        "http" | "https" => Err(format!("URL \"{raw}\" has no host")),
        other => Err(format!("unsupported URL scheme \"{other}\"")),
    }
}

// ── Suggestions ─────────────────────────────────────────────────────────────

/// Closest known key within an edit distance of 3.
fn suggest<'a>(needle: &str, known: &[&'a str]) -> Option<&'a str> {
    known
        .iter()
        .map(|&candidate| (candidate, edit_distance(needle, candidate)))
        .filter(|&(_, d)| d > 0 && d <= 3)
        .min_by_key(|&(_, d)| d)
        .map(|(candidate, _)| candidate)
}

fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = (diagonal + usize::from(ca != cb))
                .min(above + 1)
                .min(row[j] + 1);
            diagonal = above;
        }
    }
    row[b.len()]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn edit_distance_basics() {
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("catalog", "catalog"), 0);
        assert_eq!(edit_distance("catalgo", "catalog"), 2);
        assert_eq!(edit_distance("ollama_ur", "ollama_url"), 1);
    }

    #[test]
    fn defaults_are_clean() {
        let tree = serde_json::to_value(ApiconfConfig::default()).unwrap();
        let report = check_value(&tree);
        assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    }

    #[test]
    fn unknown_keys_get_suggestions() {
        let report = check_value(&json!({
            "reconcil": {},
            "catalog": { "ollama_ur": "http://localhost:11434" },
        }));
        let paths: Vec<_> = report.diagnostics.iter().map(|d| d.path.as_str()).collect();
        assert!(paths.contains(&"reconcil"));
        assert!(paths.contains(&"catalog.ollama_ur"));
        assert!(
            report
                .diagnostics
                .iter()
                .any(|d| d.message.contains("did you mean \"ollama_url\""))
        );
        assert!(!report.has_errors());
    }

    #[test]
    fn semantic_problems_are_reported() {
        let report = check_value(&json!({
            "reconcile": { "header_commit_debounce_ms": 0, "catalog_refresh_debounce_ms": 60000 },
            "catalog": { "request_timeout_secs": 0, "glama_url": "ftp://glama.ai" },
        }));
        assert_eq!(report.count(Severity::Warning), 2);
        assert_eq!(report.count(Severity::Error), 2);
        assert!(
            report
                .diagnostics
                .iter()
                .any(|d| d.path == "catalog.glama_url" && d.message.contains("ftp"))
        );
    }

    #[test]
    fn type_errors_are_reported() {
        let report = check_value(&json!({ "reconcile": { "header_commit_debounce_ms": "fast" } }));
        assert!(report.has_errors());
        assert!(report.diagnostics.iter().any(|d| d.category == "type-error"));
    }

    #[test]
    fn check_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apiconf.toml");
        std::fs::write(&path, "[catalog]\nlitellm_url = \"not a url\"\n").unwrap();
        let report = check(Some(&path));
        assert_eq!(report.config_path.as_deref(), Some(path.as_path()));
        assert!(report.has_errors());
    }

    #[test]
    fn http_url_check() {
        assert!(check_http_url("http://localhost:4000").is_ok());
        assert!(check_http_url(" https://api.example.com/v1 ").is_ok());
        assert!(check_http_url("localhost:4000").is_err());
        assert!(check_http_url("file:///tmp/x").is_err());
    }
}
