//! The synchronous reconciliation loop.
//!
//! Every mutation goes through one pass: merge the patch, guard the header
//! buffer, inject switch defaults, mirror the selected model id, observe the
//! refresh key and re-validate. Time is supplied by the caller so the two
//! debounces can be driven by a paused or logical clock.

use std::{collections::BTreeSet, time::Duration};

use {
    apiconf_common::{CatalogSnapshot, ModelCatalog, ProviderName},
    apiconf_config::{ProviderSettings, ReconcileConfig},
    apiconf_providers::{ModelField, connection_params},
    serde::Serialize,
    serde_json::Value,
    tokio::time::Instant,
    tracing::{debug, info, warn},
};

use crate::{
    custom_model::{CustomModelEdit, apply_edit},
    debounce::Debouncer,
    defaults::{custom_arn_is_stale, resolve_switch_default},
    error::Result,
    headers::{self, HeaderPair},
    patch::{SettingsPatch, merge},
    refresh::{FetchRequest, FetchToken, RefreshKey, RefreshScheduler},
    selection::{Selection, select},
    validate::{ValidationResult, validate},
};

const HEADERS_FIELD: &str = "openAiHeaders";
const PROVIDER_FIELD: &str = "apiProvider";
const CUSTOM_INFO_FIELD: &str = "openAiCustomModelInfo";
const CUSTOM_ARN_FIELD: &str = "awsCustomArn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    pub header_commit_window: Duration,
    pub catalog_refresh_window: Duration,
}

impl From<&ReconcileConfig> for ReconcileOptions {
    fn from(config: &ReconcileConfig) -> Self {
        Self {
            header_commit_window: Duration::from_millis(config.header_commit_debounce_ms),
            catalog_refresh_window: Duration::from_millis(config.catalog_refresh_debounce_ms),
        }
    }
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self::from(&ReconcileConfig::default())
    }
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassReport {
    /// Persisted names of every field the pass changed, derived writes
    /// included. Sorted.
    pub changed: Vec<String>,
    /// The header buffer was replaced from the canonical mapping.
    pub headers_reseeded: bool,
    /// The refresh key changed and a catalog refresh is now pending.
    pub refresh_scheduled: bool,
}

impl PassReport {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.changed.is_empty()
    }
}

/// What fired on a timer poll.
#[derive(Debug, Default)]
pub struct TimerOutcome {
    /// Set when the header buffer was committed into the settings.
    pub header_commit: Option<PassReport>,
    /// A catalog fetch the caller must run and report back through
    /// [`Reconciler::on_catalog_fetched`].
    pub fetch: Option<FetchRequest>,
}

#[derive(Debug)]
pub struct Reconciler {
    settings: ProviderSettings,
    catalogs: CatalogSnapshot,
    selection: Selection,
    validation: ValidationResult,
    header_buffer: Vec<HeaderPair>,
    header_timer: Debouncer<()>,
    refresh: RefreshScheduler,
}

impl Reconciler {
    /// Seed from persisted settings and run the initial pass.
    ///
    /// The initial pass may write derived fields (the mirrored model id) and
    /// schedules the first catalog refresh for fetched providers. It does not
    /// inject switch defaults.
    pub fn new(settings: ProviderSettings, options: ReconcileOptions, now: Instant) -> Result<Self> {
        let catalogs = CatalogSnapshot::new();
        let selection = select(&settings, &catalogs);
        let validation = validate(&settings, &catalogs);
        let mut reconciler = Self {
            header_buffer: headers::decode(&settings.headers()),
            settings,
            catalogs,
            selection,
            validation,
            header_timer: Debouncer::new(options.header_commit_window),
            refresh: RefreshScheduler::new(options.catalog_refresh_window),
        };
        reconciler.pass(&SettingsPatch::new(), now)?;
        Ok(reconciler)
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub fn validation(&self) -> &ValidationResult {
        &self.validation
    }

    #[must_use]
    pub fn header_buffer(&self) -> &[HeaderPair] {
        &self.header_buffer
    }

    #[must_use]
    pub fn catalogs(&self) -> &CatalogSnapshot {
        &self.catalogs
    }

    /// The nearest debounce deadline, if any timer is armed.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.header_timer.deadline(), self.refresh.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    #[must_use]
    pub fn is_refresh_pending(&self) -> bool {
        self.refresh.is_pending()
    }

    // ── Entry points ────────────────────────────────────────────────────────

    /// Merge `patch` and run one reconciliation pass.
    ///
    /// A patch that does not fit the settings schema is rejected as a whole
    /// and leaves the state untouched.
    pub fn on_configuration_change(
        &mut self,
        patch: &SettingsPatch,
        now: Instant,
    ) -> Result<PassReport> {
        self.pass(patch, now)
    }

    /// Replace the header edit buffer and restart the commit debounce.
    pub fn set_header_buffer(&mut self, pairs: Vec<HeaderPair>, now: Instant) {
        self.header_buffer = pairs;
        self.header_timer.schedule(now, ());
        let key = self.refresh_key();
        self.refresh.observe(now, key);
    }

    /// Apply one edit of the custom model override and commit it.
    pub fn edit_custom_model_info(
        &mut self,
        edit: &CustomModelEdit,
        now: Instant,
    ) -> Result<PassReport> {
        let info = apply_edit(self.settings.open_ai_custom_model_info.as_ref(), edit);
        let patch = SettingsPatch::new().with(CUSTOM_INFO_FIELD, serde_json::to_value(info)?);
        self.pass(&patch, now)
    }

    /// Restart the refresh debounce with the current parameters.
    ///
    /// Returns false when the active provider has nothing to fetch.
    pub fn request_catalog_refresh(&mut self, now: Instant) -> bool {
        let scheduled = self.refresh.force(now);
        debug!(provider = %self.settings.provider(), scheduled, "catalog refresh requested");
        scheduled
    }

    /// Fire every timer whose deadline is at or before `now`.
    pub fn poll_timers(&mut self, now: Instant) -> Result<TimerOutcome> {
        let mut outcome = TimerOutcome::default();

        if self.header_timer.fire(now).is_some() {
            let encoded = headers::encode(&self.header_buffer);
            if encoded == self.settings.headers() {
                debug!("header buffer matches settings, commit skipped");
            } else {
                info!(count = encoded.len(), "committing header buffer");
                let patch = SettingsPatch::new().with(HEADERS_FIELD, serde_json::to_value(encoded)?);
                outcome.header_commit = Some(self.pass(&patch, now)?);
            }
        }

        if let Some(request) = self.refresh.fire(now) {
            info!(provider = %request.provider, token = ?request.token, "catalog fetch issued");
            outcome.fetch = Some(request);
        }
        Ok(outcome)
    }

    /// Completion of an issued fetch.
    ///
    /// Returns whether the snapshot changed. Completions of superseded
    /// fetches and failures leave the snapshot as it was.
    pub fn on_catalog_fetched(
        &mut self,
        token: FetchToken,
        provider: ProviderName,
        result: std::result::Result<ModelCatalog, apiconf_providers::Error>,
    ) -> bool {
        if !self.refresh.is_current(token) {
            debug!(%provider, ?token, "dropping stale catalog fetch");
            return false;
        }
        match result {
            Ok(catalog) => {
                info!(%provider, models = catalog.len(), "catalog loaded");
                self.catalogs.insert(provider, catalog);
                self.selection = select(&self.settings, &self.catalogs);
                self.validation = validate(&self.settings, &self.catalogs);
                true
            },
            Err(error) => {
                warn!(%provider, %error, "catalog fetch failed");
                false
            },
        }
    }

    // ── Pass ────────────────────────────────────────────────────────────────

    fn pass(&mut self, patch: &SettingsPatch, now: Instant) -> Result<PassReport> {
        let merged = merge(&self.settings, patch)?;
        self.settings = merged.settings;
        let mut changed = merged.changed;

        let headers_reseeded = changed.contains(HEADERS_FIELD) && self.reseed_headers();

        if changed.contains(PROVIDER_FIELD) {
            let provider = self.settings.provider();
            if let Some((field, model_id)) = resolve_switch_default(provider, &self.settings) {
                info!(%provider, field = field.key(), model_id, "injecting default model");
                self.write(field.key(), Value::from(model_id), &mut changed)?;
            }
        }

        let selection = select(&self.settings, &self.catalogs);
        if !selection.model_id.is_empty()
            && self.settings.api_model_id.as_deref() != Some(selection.model_id.as_str())
        {
            self.write(
                ModelField::ApiModelId.key(),
                Value::from(selection.model_id.as_str()),
                &mut changed,
            )?;
        }
        if changed.contains(ModelField::ApiModelId.key()) && custom_arn_is_stale(&self.settings) {
            debug!("clearing custom ARN for catalog model");
            self.write(CUSTOM_ARN_FIELD, Value::Null, &mut changed)?;
        }
        self.selection = select(&self.settings, &self.catalogs);

        let key = self.refresh_key();
        let refresh_scheduled = self.refresh.observe(now, key);

        self.validation = validate(&self.settings, &self.catalogs);

        debug!(
            provider = %self.selection.provider,
            model_id = %self.selection.model_id,
            changed = changed.len(),
            valid = self.validation.is_none(),
            "reconciliation pass"
        );
        Ok(PassReport {
            changed: changed.into_iter().collect(),
            headers_reseeded,
            refresh_scheduled,
        })
    }

    /// Reseed the buffer when the canonical mapping is not what the buffer
    /// already encodes to. Pending local edits are discarded.
    fn reseed_headers(&mut self) -> bool {
        let canonical = self.settings.headers();
        if canonical == headers::encode(&self.header_buffer) {
            return false;
        }
        debug!(count = canonical.len(), "reseeding header buffer");
        self.header_buffer = headers::decode(&canonical);
        self.header_timer.cancel();
        true
    }

    fn write(&mut self, key: &str, value: Value, changed: &mut BTreeSet<String>) -> Result<()> {
        let merged = merge(&self.settings, &SettingsPatch::new().with(key, value))?;
        self.settings = merged.settings;
        changed.extend(merged.changed);
        Ok(())
    }

    fn refresh_key(&self) -> Option<RefreshKey> {
        let provider = self.settings.provider();
        let headers = headers::encode(&self.header_buffer);
        connection_params(provider, &self.settings, &headers)
            .map(|params| RefreshKey { provider, params })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        crate::validate::{ErrorKind, ValidationError},
        apiconf_common::ModelInfo,
        apiconf_providers::CUSTOM_ARN_MODEL_ID,
        serde_json::json,
    };

    const HEADER_WINDOW: Duration = Duration::from_millis(300);
    const REFRESH_WINDOW: Duration = Duration::from_millis(250);

    fn reconciler(settings: ProviderSettings, now: Instant) -> Reconciler {
        Reconciler::new(settings, ReconcileOptions::default(), now).unwrap()
    }

    fn pair(k: &str, v: &str) -> HeaderPair {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn options_follow_config() {
        let options = ReconcileOptions::default();
        assert_eq!(options.header_commit_window, HEADER_WINDOW);
        assert_eq!(options.catalog_refresh_window, REFRESH_WINDOW);
    }

    #[test]
    fn router_switch_injects_default_in_the_same_pass() {
        let t0 = Instant::now();
        let mut r = reconciler(ProviderSettings::default(), t0);
        let report = r
            .on_configuration_change(&SettingsPatch::new().with("apiProvider", "openrouter"), t0)
            .unwrap();

        assert_eq!(
            r.settings().open_router_model_id.as_deref(),
            Some("anthropic/claude-3.7-sonnet")
        );
        assert_eq!(
            r.settings().api_model_id.as_deref(),
            Some("anthropic/claude-3.7-sonnet")
        );
        assert!(report.changed.contains(&"apiProvider".to_string()));
        assert!(report.changed.contains(&"openRouterModelId".to_string()));
        assert!(report.changed.contains(&"apiModelId".to_string()));
        assert!(report.refresh_scheduled);
    }

    #[test]
    fn switch_keeps_an_existing_model_field() {
        let t0 = Instant::now();
        let mut r = reconciler(
            ProviderSettings {
                glama_model_id: Some("openai/gpt-4o".into()),
                ..Default::default()
            },
            t0,
        );
        r.on_configuration_change(&SettingsPatch::new().with("apiProvider", "glama"), t0)
            .unwrap();
        assert_eq!(r.settings().glama_model_id.as_deref(), Some("openai/gpt-4o"));
        assert_eq!(r.selection().model_id, "openai/gpt-4o");
    }

    #[test]
    fn non_router_switch_injects_nothing() {
        let t0 = Instant::now();
        let mut r = reconciler(ProviderSettings::default(), t0);
        let report = r
            .on_configuration_change(&SettingsPatch::new().with("apiProvider", "ollama"), t0)
            .unwrap();
        assert_eq!(r.settings().ollama_model_id, None);
        assert_eq!(report.changed, vec!["apiProvider".to_string()]);
    }

    #[test]
    fn invalid_patch_leaves_state_untouched() {
        let t0 = Instant::now();
        let mut r = reconciler(ProviderSettings::default(), t0);
        let before = r.settings().clone();
        assert!(
            r.on_configuration_change(&SettingsPatch::new().with("modelMaxTokens", "lots"), t0)
                .is_err()
        );
        assert_eq!(r.settings(), &before);
    }

    #[test]
    fn credential_error_wins_over_unknown_model() {
        let t0 = Instant::now();
        let mut r = reconciler(ProviderSettings::default(), t0);
        r.on_configuration_change(
            &SettingsPatch::new()
                .with("apiProvider", "anthropic")
                .with("apiModelId", "claude-unknown"),
            t0,
        )
        .unwrap();
        assert_eq!(
            r.validation().as_ref().map(ValidationError::kind),
            Some(ErrorKind::ConfigurationInvalid)
        );

        r.on_configuration_change(&SettingsPatch::new().with("apiKey", "sk-ant"), t0)
            .unwrap();
        assert_eq!(
            r.validation(),
            &Some(ValidationError::ModelNotFound {
                provider: ProviderName::Anthropic,
                model_id: "claude-unknown".into(),
            })
        );
    }

    #[test]
    fn catalog_model_clears_custom_arn() {
        let t0 = Instant::now();
        let mut r = reconciler(
            ProviderSettings {
                api_provider: Some(ProviderName::Bedrock),
                api_model_id: Some(CUSTOM_ARN_MODEL_ID.into()),
                aws_custom_arn: Some(
                    "arn:aws:bedrock:us-east-1:123456789012:provisioned-model/abc".into(),
                ),
                ..Default::default()
            },
            t0,
        );
        assert!(r.settings().aws_custom_arn.is_some());

        let report = r
            .on_configuration_change(
                &SettingsPatch::new()
                    .with("apiModelId", "anthropic.claude-3-5-haiku-20241022-v1:0"),
                t0,
            )
            .unwrap();
        assert_eq!(r.settings().aws_custom_arn, None);
        assert!(report.changed.contains(&"awsCustomArn".to_string()));
    }

    #[test]
    fn external_header_change_reseeds_buffer() {
        let t0 = Instant::now();
        let mut r = reconciler(ProviderSettings::default(), t0);
        r.set_header_buffer(vec![pair("X-Local", "1")], t0);

        let report = r
            .on_configuration_change(
                &SettingsPatch::new().with("openAiHeaders", json!({"X-Remote": "2"})),
                t0,
            )
            .unwrap();
        assert!(report.headers_reseeded);
        assert_eq!(r.header_buffer(), &[pair("X-Remote", "2")]);
        // The pending local edit was discarded with the reseed.
        let outcome = r.poll_timers(t0 + HEADER_WINDOW).unwrap();
        assert!(outcome.header_commit.is_none());
    }

    #[test]
    fn header_commit_is_debounced_and_suppressed_when_equal() {
        let t0 = Instant::now();
        let mut r = reconciler(
            ProviderSettings {
                open_ai_headers: Some([("X-A".to_string(), "1".to_string())].into()),
                ..Default::default()
            },
            t0,
        );

        r.set_header_buffer(vec![pair("X-A", "2")], t0);
        r.set_header_buffer(vec![pair(" X-A ", " 1 ")], t0 + Duration::from_millis(100));
        let outcome = r.poll_timers(t0 + Duration::from_millis(400)).unwrap();
        assert!(outcome.header_commit.is_none());

        r.set_header_buffer(vec![pair("X-A", "1"), pair("X-B", "2")], t0 + Duration::from_secs(1));
        assert!(
            r.poll_timers(t0 + Duration::from_millis(1_299))
                .unwrap()
                .header_commit
                .is_none()
        );
        let commit = r
            .poll_timers(t0 + Duration::from_millis(1_300))
            .unwrap()
            .header_commit
            .unwrap();
        assert_eq!(commit.changed, vec!["openAiHeaders".to_string()]);
        assert!(!commit.headers_reseeded);
        assert_eq!(r.settings().headers().len(), 2);
        assert_eq!(r.header_buffer().len(), 2);
    }

    #[test]
    fn persisted_header_order_survives_seeding_and_commit() {
        let t0 = Instant::now();
        let settings: ProviderSettings = serde_json::from_value(json!({
            "apiProvider": "openai",
            "openAiHeaders": { "Z-Trace": "1", "Authorization": "x" },
        }))
        .unwrap();
        let mut r = reconciler(settings, t0);
        assert_eq!(r.header_buffer(), [pair("Z-Trace", "1"), pair("Authorization", "x")]);

        r.set_header_buffer(
            vec![pair("Z-Trace", "1"), pair("Authorization", "y"), pair("Accept", "json")],
            t0,
        );
        r.poll_timers(t0 + HEADER_WINDOW).unwrap().header_commit.unwrap();
        let committed: Vec<_> = r.settings().headers().into_keys().collect();
        assert_eq!(committed, ["Z-Trace", "Authorization", "Accept"]);
    }

    #[test]
    fn fetch_completion_updates_selection_and_drops_stale_tokens() {
        let t0 = Instant::now();
        let mut r = reconciler(
            ProviderSettings {
                api_provider: Some(ProviderName::OpenRouter),
                open_router_api_key: Some("sk-or".into()),
                open_router_model_id: Some("vendor/model".into()),
                ..Default::default()
            },
            t0,
        );
        let first = r.poll_timers(t0 + REFRESH_WINDOW).unwrap().fetch.unwrap();
        assert!(r.request_catalog_refresh(t0 + REFRESH_WINDOW));
        let second = r.poll_timers(t0 + REFRESH_WINDOW * 2).unwrap().fetch.unwrap();

        let catalog = ModelCatalog::from([(
            "vendor/model".to_string(),
            ModelInfo::with_context_window(42_000),
        )]);
        assert!(!r.on_catalog_fetched(first.token, first.provider, Ok(catalog.clone())));
        assert!(r.catalogs().is_empty());

        assert!(r.on_catalog_fetched(second.token, second.provider, Ok(catalog)));
        assert_eq!(r.selection().model_info.context_window, 42_000);
        assert_eq!(r.validation(), &None);
    }

    #[test]
    fn failed_fetch_keeps_prior_snapshot() {
        let t0 = Instant::now();
        let mut r = reconciler(
            ProviderSettings {
                api_provider: Some(ProviderName::Ollama),
                ..Default::default()
            },
            t0,
        );
        let request = r.poll_timers(t0 + REFRESH_WINDOW).unwrap().fetch.unwrap();
        let error = apiconf_providers::Error::Unsupported(ProviderName::Ollama);
        assert!(!r.on_catalog_fetched(request.token, request.provider, Err(error)));
        assert!(r.catalogs().is_empty());
    }

    #[test]
    fn static_providers_never_schedule_a_refresh() {
        let t0 = Instant::now();
        let mut r = reconciler(ProviderSettings::default(), t0);
        assert_eq!(r.next_deadline(), None);
        let report = r
            .on_configuration_change(&SettingsPatch::new().with("apiKey", "sk"), t0)
            .unwrap();
        assert!(!report.refresh_scheduled);
        assert!(!r.request_catalog_refresh(t0));
    }

    #[test]
    fn custom_model_edits_commit_through_a_pass() {
        let t0 = Instant::now();
        let mut r = reconciler(
            ProviderSettings {
                api_provider: Some(ProviderName::OpenAi),
                open_ai_model_id: Some("local-model".into()),
                ..Default::default()
            },
            t0,
        );
        let report = r
            .edit_custom_model_info(&CustomModelEdit::ContextWindow("32768".into()), t0)
            .unwrap();
        assert_eq!(report.changed, vec!["openAiCustomModelInfo".to_string()]);
        assert_eq!(r.selection().model_info.context_window, 32_768);

        r.edit_custom_model_info(&CustomModelEdit::ContextWindow("nope".into()), t0)
            .unwrap();
        assert_eq!(r.selection().model_info.context_window, 128_000);
    }
}
