//! Provider settings reconciliation.
//!
//! A [`Reconciler`] owns one provider settings record and keeps the derived
//! state consistent with it: the selected model, the validation result, the
//! header edit buffer and the debounced catalog refresh. [`SettingsSession`]
//! drives it on a tokio runtime.

pub mod custom_model;
pub mod debounce;
pub mod defaults;
pub mod error;
pub mod headers;
pub mod patch;
pub mod reconciler;
pub mod refresh;
pub mod selection;
pub mod session;
pub mod validate;

pub use {
    custom_model::{CustomModelEdit, apply_edit},
    error::{Error, Result},
    headers::HeaderPair,
    patch::SettingsPatch,
    reconciler::{PassReport, ReconcileOptions, Reconciler, TimerOutcome},
    refresh::{FetchRequest, FetchToken},
    selection::{ModelSource, Selection, select},
    session::{SessionSnapshot, SettingsSession},
    validate::{ErrorKind, Translate, ValidationError, ValidationResult, validate},
};
