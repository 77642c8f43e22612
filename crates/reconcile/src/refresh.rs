//! Debounced catalog refresh.
//!
//! The scheduler watches `(provider, connection parameters)`. A change
//! restarts the debounce; when it fires, one fetch is issued with the latest
//! parameters. Each issued fetch gets a fresh token and only the completion
//! of the newest token is accepted.

use std::time::Duration;

use {
    apiconf_common::ProviderName,
    apiconf_providers::ConnectionParams,
    tokio::time::Instant,
    tracing::debug,
};

use crate::debounce::Debouncer;

/// What a catalog refresh depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshKey {
    pub provider: ProviderName,
    pub params: ConnectionParams,
}

/// Identifies one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchToken(u64);

/// A fetch the caller must run and report back.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub token: FetchToken,
    pub provider: ProviderName,
    pub params: ConnectionParams,
}

#[derive(Debug)]
pub struct RefreshScheduler {
    last_key: Option<RefreshKey>,
    timer: Debouncer<RefreshKey>,
    issued: u64,
}

impl RefreshScheduler {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            last_key: None,
            timer: Debouncer::new(window),
            issued: 0,
        }
    }

    /// Record the current key; restarts the debounce when it changed.
    ///
    /// `None` means the active provider has nothing to fetch, which also
    /// cancels a pending refresh. Returns whether a refresh is now pending
    /// because of this call.
    pub fn observe(&mut self, now: Instant, key: Option<RefreshKey>) -> bool {
        if key == self.last_key {
            return false;
        }
        self.last_key = key.clone();
        match key {
            Some(key) => {
                debug!(provider = %key.provider, "catalog refresh scheduled");
                self.timer.schedule(now, key);
                true
            },
            None => {
                self.timer.cancel();
                false
            },
        }
    }

    /// Restart the debounce with the current key even if nothing changed.
    pub fn force(&mut self, now: Instant) -> bool {
        match self.last_key.clone() {
            Some(key) => {
                self.timer.schedule(now, key);
                true
            },
            None => false,
        }
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.timer.pending().is_some()
    }

    /// Issue the pending fetch once its quiet period has elapsed.
    pub fn fire(&mut self, now: Instant) -> Option<FetchRequest> {
        let key = self.timer.fire(now)?;
        self.issued += 1;
        Some(FetchRequest {
            token: FetchToken(self.issued),
            provider: key.provider,
            params: key.params,
        })
    }

    /// Whether `token` belongs to the newest issued fetch.
    #[must_use]
    pub fn is_current(&self, token: FetchToken) -> bool {
        token == FetchToken(self.issued)
    }
}
