//! Outcome of OAuth callbacks, keyed by the signed `state` they carried.
//!
//! The callback records how the flow ended; the page that opened the
//! authorize URL waits on the same `state` instead of watching a popup.
//! Each issued `state` can be claimed by exactly one callback.

use std::time::Duration;

use dashmap::DashMap;
use log::*;
use serde::Serialize;
use tokio::time::{sleep, Instant};

use crate::provider::Provider;

const INITIAL_POLL: Duration = Duration::from_millis(250);
const MAX_POLL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Completion {
    Pending,
    Completed { provider: Provider, success: bool },
    Failed { reason: String },
    /// Never issued, or older than the state TTL.
    Expired,
}

#[derive(Debug)]
struct Entry {
    completion: Completion,
    /// Redirect URI the authorize URL was issued with.
    redirect_uri: String,
    /// Set once a callback has taken the flow over.
    claimed: bool,
    recorded_at: Instant,
}

impl Entry {
    fn is_live(&self, ttl: Duration) -> bool {
        self.recorded_at.elapsed() <= ttl
    }
}

pub struct CompletionTracker {
    entries: DashMap<String, Entry>,
    ttl: Duration,
}

impl CompletionTracker {
    /// Entries older than `ttl` read as expired and are dropped by [`sweep`](Self::sweep).
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Register a freshly issued `state` as pending.
    pub fn issue(&self, state: &str, redirect_uri: &str) {
        self.entries.insert(
            state.to_string(),
            Entry {
                completion: Completion::Pending,
                redirect_uri: redirect_uri.to_string(),
                claimed: false,
                recorded_at: Instant::now(),
            },
        );
    }

    /// Take over a pending flow for its callback.
    ///
    /// Returns the redirect URI the state was issued with, or `None` when the
    /// state is unknown, expired, or already claimed.
    pub fn claim(&self, state: &str) -> Option<String> {
        let mut entry = self.entries.get_mut(state)?;
        if entry.claimed || entry.completion != Completion::Pending || !entry.is_live(self.ttl) {
            return None;
        }
        entry.claimed = true;
        Some(entry.redirect_uri.clone())
    }

    /// Store how a claimed flow ended. Unknown states are ignored.
    pub fn record(&self, state: &str, completion: Completion) {
        debug!("Recording OAuth completion: {completion:?}");
        match self.entries.get_mut(state) {
            Some(mut entry) => {
                entry.completion = completion;
                entry.claimed = true;
                entry.recorded_at = Instant::now();
            }
            None => warn!("Dropping completion for an OAuth state that was never issued"),
        }
    }

    pub fn get(&self, state: &str) -> Completion {
        match self.entries.get(state) {
            Some(entry) if entry.is_live(self.ttl) => entry.completion.clone(),
            _ => Completion::Expired,
        }
    }

    /// Poll until the flow for `state` finishes or `timeout` passes.
    ///
    /// Polls every 250 ms, doubling up to 2 s. Returns `Pending` on timeout
    /// and `Expired` at once for a state that is unknown or has expired.
    pub async fn await_completion(&self, state: &str, timeout: Duration) -> Completion {
        let deadline = Instant::now() + timeout;
        let mut delay = INITIAL_POLL;

        loop {
            let completion = self.get(state);
            if completion != Completion::Pending {
                return completion;
            }

            let now = Instant::now();
            if now >= deadline {
                return Completion::Pending;
            }

            sleep(delay.min(deadline - now)).await;
            delay = (delay * 2).min(MAX_POLL);
        }
    }

    /// Drop expired entries. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.is_live(self.ttl));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!("Swept {removed} expired OAuth completions");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
