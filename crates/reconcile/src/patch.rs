//! Partial settings updates.
//!
//! A patch is a set of persisted field names (camelCase) with new values.
//! `null` clears a field.

use std::collections::BTreeSet;

use {
    apiconf_common::ProviderName,
    apiconf_config::ProviderSettings,
    serde_json::{Map, Value},
    tracing::warn,
};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    fields: Map<String, Value>,
}

impl SettingsPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`SettingsPatch::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Builder form of [`SettingsPatch::clear`].
    #[must_use]
    pub fn without(mut self, key: impl Into<String>) -> Self {
        self.clear(key);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn clear(&mut self, key: impl Into<String>) {
        self.fields.insert(key.into(), Value::Null);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// The provider identity this patch switches to, if any.
    #[must_use]
    pub fn provider(&self) -> Option<ProviderName> {
        self.fields
            .get("apiProvider")
            .and_then(Value::as_str)
            .and_then(|name| name.parse().ok())
    }
}

impl From<Map<String, Value>> for SettingsPatch {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl TryFrom<Value> for SettingsPatch {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(Error::message(format!(
                "settings patch must be an object, got {other}"
            ))),
        }
    }
}

/// Every set field of `settings` as a patch.
impl TryFrom<&ProviderSettings> for SettingsPatch {
    type Error = Error;

    fn try_from(settings: &ProviderSettings) -> Result<Self> {
        Self::try_from(serde_json::to_value(settings)?)
    }
}

/// Result of merging a patch into a settings record.
#[derive(Debug)]
pub(crate) struct Merged {
    pub settings: ProviderSettings,
    /// Persisted names of fields whose value differs from before.
    pub changed: BTreeSet<String>,
}

/// Merge `patch` into `settings`, leaving `settings` untouched on error.
pub(crate) fn merge(settings: &ProviderSettings, patch: &SettingsPatch) -> Result<Merged> {
    let before = to_fields(settings)?;
    let mut fields = before.clone();
    for (key, value) in &patch.fields {
        if value.is_null() {
            fields.remove(key);
        } else {
            fields.insert(key.clone(), value.clone());
        }
    }

    let merged: ProviderSettings = serde_json::from_value(Value::Object(fields))
        .map_err(|source| Error::InvalidPatch { source })?;
    let after = to_fields(&merged)?;

    for (key, value) in &patch.fields {
        if !value.is_null() && !after.contains_key(key) {
            warn!(field = %key, "ignoring unknown settings field");
        }
    }

    Ok(Merged {
        changed: changed_fields(&before, &after),
        settings: merged,
    })
}

fn to_fields(settings: &ProviderSettings) -> Result<Map<String, Value>> {
    match serde_json::to_value(settings)? {
        Value::Object(map) => Ok(map),
        _ => Err(Error::message("settings did not serialize to an object")),
    }
}

/// Names of fields that differ between two serialized records.
fn changed_fields(
    before: &Map<String, Value>,
    after: &Map<String, Value>,
) -> BTreeSet<String> {
    before
        .keys()
        .chain(after.keys())
        .filter(|key| before.get(*key) != after.get(*key))
        .cloned()
        .collect()
}

/// Field-level diff of two records.
pub fn diff(before: &ProviderSettings, after: &ProviderSettings) -> Result<BTreeSet<String>> {
    Ok(changed_fields(&to_fields(before)?, &to_fields(after)?))
}
