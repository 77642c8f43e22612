//! `check` and `set`: run the reconciliation engine over a settings file.

use std::{collections::BTreeSet, path::Path};

use {
    anyhow::{Context, Result, bail},
    apiconf_config::{ApiconfConfig, ProviderSettings},
    apiconf_providers::{CatalogFetcher, HttpCatalogFetcher},
    apiconf_reconcile::{ReconcileOptions, Reconciler, SettingsPatch, patch::diff},
    serde_json::{Map, Value, json},
    tokio::time::Instant,
    tracing::info,
};

use crate::messages::English;

pub async fn check(config: &ApiconfConfig, file: &Path, fetch: bool, as_json: bool) -> Result<()> {
    let original = apiconf_config::load_provider_settings(file)?;
    let reconciler = reconcile(config, original.clone(), &SettingsPatch::new(), fetch).await?;
    let derived = diff(&original, reconciler.settings())?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report_json(&reconciler, &derived))?);
    } else {
        print_report(&reconciler, &derived);
    }

    if reconciler.validation().is_some() {
        std::process::exit(1);
    }
    Ok(())
}

pub async fn set(
    config: &ApiconfConfig,
    file: &Path,
    assignments: &[String],
    fetch: bool,
) -> Result<()> {
    let original = if file.exists() {
        apiconf_config::load_provider_settings(file)?
    } else {
        ProviderSettings::default()
    };

    let mut patch = SettingsPatch::new();
    for assignment in assignments {
        let (key, value) = parse_assignment(assignment)?;
        patch.insert(key, value);
    }

    let reconciler = reconcile(config, original.clone(), &patch, fetch).await?;
    let changed = diff(&original, reconciler.settings())?;
    if changed.is_empty() {
        println!("No changes.");
    } else {
        apiconf_config::save_provider_settings(file, reconciler.settings())?;
        info!(path = %file.display(), fields = changed.len(), "settings saved");
        println!("Updated {}: {}", file.display(), join(&changed));
    }
    print_validation(&reconciler);
    Ok(())
}

/// Seed a reconciler, apply `patch`, and optionally wait for the catalog.
async fn reconcile(
    config: &ApiconfConfig,
    settings: ProviderSettings,
    patch: &SettingsPatch,
    fetch: bool,
) -> Result<Reconciler> {
    let options = ReconcileOptions::from(&config.reconcile);
    let mut reconciler = Reconciler::new(settings, options, Instant::now())?;
    if !patch.is_empty() {
        reconciler.on_configuration_change(patch, Instant::now())?;
    }
    if fetch {
        let fetcher = HttpCatalogFetcher::new(&config.catalog);
        settle(&mut reconciler, &fetcher).await?;
    }
    Ok(reconciler)
}

/// Drive the debounce timers until nothing is pending, running fetches
/// inline.
async fn settle(reconciler: &mut Reconciler, fetcher: &dyn CatalogFetcher) -> Result<()> {
    while let Some(deadline) = reconciler.next_deadline() {
        tokio::time::sleep_until(deadline).await;
        let outcome = reconciler.poll_timers(Instant::now())?;
        if let Some(request) = outcome.fetch {
            let result = fetcher
                .fetch_catalog(request.provider, &request.params)
                .await;
            if let Err(ref error) = result {
                eprintln!("catalog fetch failed: {error}");
            }
            reconciler.on_catalog_fetched(request.token, request.provider, result);
        }
    }
    Ok(())
}

/// Split `field=value`.
///
/// The value is taken as JSON when it parses and fits the field's type, and
/// as a plain string otherwise, so `openRouterModelId=123` stays a string.
fn parse_assignment(raw: &str) -> Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("expected field=value, got {raw:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("missing field name in {raw:?}");
    }
    let value = match serde_json::from_str::<Value>(value) {
        Ok(parsed) if fits_field(key, &parsed) => parsed,
        _ => Value::String(value.to_string()),
    };
    Ok((key.to_string(), value))
}

/// Whether `value` deserializes as the settings field `key`.
fn fits_field(key: &str, value: &Value) -> bool {
    let mut record = Map::new();
    record.insert(key.to_string(), value.clone());
    serde_json::from_value::<ProviderSettings>(Value::Object(record)).is_ok()
}

fn join(fields: &BTreeSet<String>) -> String {
    fields.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

fn print_report(reconciler: &Reconciler, derived: &BTreeSet<String>) {
    let selection = reconciler.selection();
    let info = &selection.model_info;
    let model = if selection.model_id.is_empty() {
        "(none)"
    } else {
        selection.model_id.as_str()
    };
    println!("provider  {}", selection.provider);
    println!("model     {model} [{}]", selection.source.as_str());
    println!(
        "context   {} tokens, max output {}",
        info.context_window,
        info.max_tokens
            .map_or_else(|| "unset".to_string(), |n| n.to_string())
    );
    if let (Some(input), Some(output)) = (info.input_price, info.output_price) {
        println!("pricing   ${input:.2} in / ${output:.2} out per million tokens");
    }
    if !derived.is_empty() {
        println!("derived   {}", join(derived));
    }
    print_validation(reconciler);
}

fn print_validation(reconciler: &Reconciler) {
    match reconciler.validation() {
        Some(error) => println!("invalid   {}", error.render(&English)),
        None => println!("valid"),
    }
}

fn report_json(reconciler: &Reconciler, derived: &BTreeSet<String>) -> Value {
    let validation = reconciler.validation().as_ref().map(|error| {
        json!({
            "kind": format!("{:?}", error.kind()),
            "key": error.message_key(),
            "params": error.params(),
            "message": error.render(&English),
        })
    });
    json!({
        "selection": reconciler.selection(),
        "derived": derived,
        "validation": validation,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("apiProvider=openrouter", "apiProvider", json!("openrouter"))]
    #[case("modelMaxTokens=4096", "modelMaxTokens", json!(4096))]
    #[case("diffEnabled=true", "diffEnabled", json!(true))]
    #[case("awsCustomArn=null", "awsCustomArn", Value::Null)]
    #[case(r#"openAiHeaders={"X-A":"1"}"#, "openAiHeaders", json!({"X-A": "1"}))]
    #[case("apiKey=sk=with=equals", "apiKey", json!("sk=with=equals"))]
    #[case("openRouterModelId=123", "openRouterModelId", json!("123"))]
    #[case("groqApiKey=12345", "groqApiKey", json!("12345"))]
    #[case("awsUseProfile=true", "awsUseProfile", json!(true))]
    #[case("apiModelId=\"quoted\"", "apiModelId", json!("quoted"))]
    fn assignments_parse(#[case] raw: &str, #[case] key: &str, #[case] value: Value) {
        assert_eq!(parse_assignment(raw).unwrap(), (key.to_string(), value));
    }

    #[rstest]
    #[case("no-equals")]
    #[case("=value")]
    fn bad_assignments_are_rejected(#[case] raw: &str) {
        assert!(parse_assignment(raw).is_err());
    }

    #[tokio::test]
    async fn set_saves_derived_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        set(
            &ApiconfConfig::default(),
            &path,
            &["apiProvider=openrouter".to_string(), "openRouterApiKey=sk-or".to_string()],
            false,
        )
        .await
        .unwrap();

        let saved = apiconf_config::load_provider_settings(&path).unwrap();
        assert_eq!(
            saved.open_router_model_id.as_deref(),
            Some("anthropic/claude-3.7-sonnet")
        );
        assert_eq!(saved.api_model_id, saved.open_router_model_id);
    }

    #[tokio::test]
    async fn numeric_looking_model_ids_are_saved_as_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        set(
            &ApiconfConfig::default(),
            &path,
            &[
                "apiProvider=openrouter".to_string(),
                "openRouterApiKey=42".to_string(),
                "openRouterModelId=123".to_string(),
            ],
            false,
        )
        .await
        .unwrap();

        let saved = apiconf_config::load_provider_settings(&path).unwrap();
        assert_eq!(saved.open_router_api_key.as_deref(), Some("42"));
        assert_eq!(saved.open_router_model_id.as_deref(), Some("123"));
    }

    #[tokio::test]
    async fn json_report_carries_key_and_params() {
        let settings = ProviderSettings {
            api_key: Some("sk".into()),
            api_model_id: Some("claude-9".into()),
            ..Default::default()
        };
        let reconciler = reconcile(&ApiconfConfig::default(), settings, &SettingsPatch::new(), false)
            .await
            .unwrap();
        let report = report_json(&reconciler, &BTreeSet::new());
        assert_eq!(report["validation"]["key"], "settings:validation.modelAvailability");
        assert_eq!(report["validation"]["params"]["modelId"], "claude-9");
        assert_eq!(report["selection"]["provider"], "anthropic");
    }
}
