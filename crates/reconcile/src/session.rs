//! Tokio driver around [`Reconciler`].
//!
//! Mutations run the synchronous pass immediately under a lock. A single
//! driver task sleeps until the nearest debounce deadline, fires due timers
//! and spawns catalog fetches; completions are fed back through the same
//! lock. Every state change is published on a watch channel.

use std::sync::{Arc, Mutex, MutexGuard};

use {
    apiconf_config::{ProviderSettings, ReconcileConfig},
    apiconf_providers::CatalogFetcher,
    tokio::{
        sync::{Notify, watch},
        task::JoinHandle,
        time::Instant,
    },
    tracing::{debug, warn},
};

use crate::{
    custom_model::CustomModelEdit,
    error::Result,
    headers::HeaderPair,
    patch::SettingsPatch,
    reconciler::{PassReport, ReconcileOptions, Reconciler},
    refresh::FetchRequest,
    selection::Selection,
    validate::ValidationResult,
};

/// Published state after each change.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub settings: ProviderSettings,
    pub selection: Selection,
    pub validation: ValidationResult,
    pub header_buffer: Vec<HeaderPair>,
    /// Bumped on every publish.
    pub revision: u64,
}

impl SessionSnapshot {
    fn capture(reconciler: &Reconciler, revision: u64) -> Self {
        Self {
            settings: reconciler.settings().clone(),
            selection: reconciler.selection().clone(),
            validation: reconciler.validation().clone(),
            header_buffer: reconciler.header_buffer().to_vec(),
            revision,
        }
    }
}

struct Shared {
    reconciler: Mutex<Reconciler>,
    fetcher: Arc<dyn CatalogFetcher>,
    wake: Notify,
    snapshot: watch::Sender<SessionSnapshot>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Reconciler> {
        self.reconciler.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self) {
        let reconciler = self.lock();
        self.snapshot.send_modify(|snapshot| {
            *snapshot = SessionSnapshot::capture(&reconciler, snapshot.revision + 1);
        });
    }
}

/// A live settings editing session.
///
/// Must be created inside a tokio runtime. Dropping the session stops the
/// driver; fetches already in flight finish but are no longer polled for.
pub struct SettingsSession {
    shared: Arc<Shared>,
    driver: JoinHandle<()>,
}

impl SettingsSession {
    pub fn spawn(
        settings: ProviderSettings,
        config: &ReconcileConfig,
        fetcher: Arc<dyn CatalogFetcher>,
    ) -> Result<Self> {
        let reconciler = Reconciler::new(settings, ReconcileOptions::from(config), Instant::now())?;
        let (snapshot, _) = watch::channel(SessionSnapshot::capture(&reconciler, 0));
        let shared = Arc::new(Shared {
            reconciler: Mutex::new(reconciler),
            fetcher,
            wake: Notify::new(),
            snapshot,
        });
        let driver = tokio::spawn(drive(Arc::clone(&shared)));
        Ok(Self { shared, driver })
    }

    /// Apply a settings patch. See [`Reconciler::on_configuration_change`].
    pub fn update(&self, patch: &SettingsPatch) -> Result<PassReport> {
        let report = self
            .shared
            .lock()
            .on_configuration_change(patch, Instant::now())?;
        self.changed();
        Ok(report)
    }

    pub fn set_header_buffer(&self, pairs: Vec<HeaderPair>) {
        self.shared.lock().set_header_buffer(pairs, Instant::now());
        self.changed();
    }

    pub fn edit_custom_model_info(&self, edit: &CustomModelEdit) -> Result<PassReport> {
        let report = self
            .shared
            .lock()
            .edit_custom_model_info(edit, Instant::now())?;
        self.changed();
        Ok(report)
    }

    /// Re-trigger the catalog refresh for the current parameters.
    pub fn refresh_catalog(&self) -> bool {
        let scheduled = self.shared.lock().request_catalog_refresh(Instant::now());
        if scheduled {
            self.shared.wake.notify_one();
        }
        scheduled
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.snapshot.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.snapshot.subscribe()
    }

    fn changed(&self) {
        self.shared.publish();
        self.shared.wake.notify_one();
    }
}

impl Drop for SettingsSession {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

async fn drive(shared: Arc<Shared>) {
    loop {
        let deadline = shared.lock().next_deadline();
        match deadline {
            Some(deadline) => {
                tokio::select! {
                    () = tokio::time::sleep_until(deadline) => {},
                    () = shared.wake.notified() => {
                        debug!("session driver woken");
                        continue;
                    },
                }
            },
            None => {
                shared.wake.notified().await;
                continue;
            },
        }

        let outcome = shared.lock().poll_timers(Instant::now());
        match outcome {
            Ok(outcome) => {
                if outcome.header_commit.is_some() {
                    shared.publish();
                }
                if let Some(request) = outcome.fetch {
                    spawn_fetch(&shared, request);
                }
            },
            Err(error) => warn!(%error, "header commit rejected"),
        }
    }
}

fn spawn_fetch(shared: &Arc<Shared>, request: FetchRequest) {
    let shared = Arc::clone(shared);
    tokio::spawn(async move {
        let result = shared
            .fetcher
            .fetch_catalog(request.provider, &request.params)
            .await;
        let changed = shared
            .lock()
            .on_catalog_fetched(request.token, request.provider, result);
        if changed {
            shared.publish();
        }
    });
}
