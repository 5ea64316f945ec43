//! The integration manager: authorize URLs, OAuth callbacks, connection state
//! and test messages for each (user, provider).
//!
//! A record moves `pending -> connected | error` and only becomes `connected`
//! after a successful validation call. Absence of a record reads as
//! `disconnected`. Writes for one (user, provider) are serialized.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use connector_auth::oauth::{authorization_url, OAuthState, StateSigner};
use dashmap::DashMap;
use log::*;
use serde::Serialize;
use service::config::Config;
use tokio::sync::Mutex;

use crate::completion::{Completion, CompletionTracker};
use crate::credentials::Credentials;
use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use crate::gateway::{build_client, ApiUrls, ConnectorGateway, MessagePayload};
use crate::integration_status::IntegrationStatus;
use crate::oauth_exchange::OAuthExchanger;
use crate::provider::Provider;
use crate::registry::{non_empty, Registry};
use crate::store::{IntegrationRecord, IntegrationStore};

/// Prefix of every message sent by [`IntegrationManager::send_test_message`].
pub const TEST_MESSAGE_PREFIX: &str = "MiniTandem Test: ";

/// Connection status as the dashboard shows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Disconnected,
    Pending,
    Connected,
    Error,
}

impl From<IntegrationStatus> for Status {
    fn from(status: IntegrationStatus) -> Self {
        match status {
            IntegrationStatus::Pending => Status::Pending,
            IntegrationStatus::Connected => Status::Connected,
            IntegrationStatus::Error => Status::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizeUrl {
    pub url: String,
    pub state: String,
}

/// How an OAuth callback ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOutcome {
    pub provider: Provider,
    pub user_id: String,
    pub success: bool,
}

pub struct IntegrationManager {
    registry: Arc<Registry>,
    gateway: Arc<ConnectorGateway>,
    exchanger: Arc<OAuthExchanger>,
    store: Arc<dyn IntegrationStore>,
    signer: StateSigner,
    completions: Arc<CompletionTracker>,
    locks: DashMap<(String, Provider), Arc<Mutex<()>>>,
}

impl IntegrationManager {
    pub fn new(
        registry: Arc<Registry>,
        gateway: Arc<ConnectorGateway>,
        exchanger: Arc<OAuthExchanger>,
        store: Arc<dyn IntegrationStore>,
        signer: StateSigner,
        completions: Arc<CompletionTracker>,
    ) -> Self {
        Self {
            registry,
            gateway,
            exchanger,
            store,
            signer,
            completions,
            locks: DashMap::new(),
        }
    }

    /// Wire every collaborator from configuration around `store`.
    pub fn from_config(config: &Config, store: Arc<dyn IntegrationStore>) -> Result<Self, Error> {
        let client = build_client(config)?;
        let ttl = Duration::from_secs(config.oauth_state_ttl_secs);

        let signer = match non_empty(config.oauth_state_secret()) {
            Some(secret) => StateSigner::new(secret.as_bytes()),
            None => {
                warn!("OAUTH_STATE_SECRET is not set; OAuth state will not survive a restart");
                StateSigner::ephemeral()
            }
        }
        .with_ttl(chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::minutes(10)));

        Ok(Self::new(
            Arc::new(Registry::new(config)),
            Arc::new(ConnectorGateway::with_client(
                client.clone(),
                ApiUrls::from_config(config),
            )),
            Arc::new(OAuthExchanger::new(config, client)),
            store,
            signer,
            Arc::new(CompletionTracker::new(ttl)),
        ))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn gateway(&self) -> &ConnectorGateway {
        &self.gateway
    }

    pub fn exchanger(&self) -> &OAuthExchanger {
        &self.exchanger
    }

    pub fn completions(&self) -> &CompletionTracker {
        &self.completions
    }

    /// Build the provider authorize URL with a signed `state`.
    ///
    /// The provider sends the user back to `{origin}/integrations/callback`.
    pub fn generate_oauth_url(
        &self,
        provider: Provider,
        user_id: &str,
        origin: &str,
    ) -> Result<AuthorizeUrl, Error> {
        if user_id.trim().is_empty() {
            return Err(Error::validation("No user ID provided"));
        }
        let origin = origin.trim().trim_end_matches('/');
        if origin.is_empty() {
            return Err(Error::validation("No origin provided"));
        }

        let integration = self.registry.get(provider);
        let client_id = integration
            .client_id
            .as_deref()
            .ok_or_else(|| Error::config(integration.client_id_variable))?;

        let redirect_uri = format!("{origin}/integrations/callback");
        let state = self.signer.sign(&OAuthState::new(provider.as_str(), user_id))?;
        let url = authorization_url(
            integration.oauth_url,
            client_id,
            &redirect_uri,
            integration.scopes,
            &state,
        )?;

        self.completions.issue(&state, &redirect_uri);
        info!("Issued {provider} authorize URL");

        Ok(AuthorizeUrl { url, state })
    }

    /// Finish an OAuth flow: verify and claim `state`, exchange `code`, then connect.
    ///
    /// A `state` that was never issued, has expired, or was already used by an
    /// earlier callback is rejected before anything is exchanged. Without an
    /// explicit `redirect_uri`, the one the authorize URL was issued with is
    /// used. The outcome is recorded under `state`.
    pub async fn handle_oauth_callback(
        &self,
        code: &str,
        state: &str,
        redirect_uri: Option<&str>,
    ) -> Result<ConnectOutcome, Error> {
        let verified = self.signer.verify(state).map_err(|e| {
            warn!("Rejected OAuth callback: {e}");
            Error::from(e)
        })?;
        let provider: Provider = verified.provider.parse()?;
        let issued_redirect_uri = self.claim(state)?;

        let result = self
            .complete_oauth(
                provider,
                &verified.user_id,
                code,
                redirect_uri.unwrap_or(issued_redirect_uri.as_str()),
            )
            .await;

        match &result {
            Ok(success) => self.completions.record(
                state,
                Completion::Completed {
                    provider,
                    success: *success,
                },
            ),
            Err(e) => self.completions.record(
                state,
                Completion::Failed {
                    reason: e.to_string(),
                },
            ),
        }

        Ok(ConnectOutcome {
            provider,
            user_id: verified.user_id,
            success: result?,
        })
    }

    async fn complete_oauth(
        &self,
        provider: Provider,
        user_id: &str,
        code: &str,
        redirect_uri: &str,
    ) -> Result<bool, Error> {
        let credentials = self
            .exchanger
            .exchange_code(provider, code, redirect_uri)
            .await?;
        self.connect_integration(user_id, provider, credentials)
            .await
    }

    /// Record that the provider sent the user back with an error instead of a code.
    pub fn fail_oauth_callback(&self, state: &str, reason: &str) -> Result<Provider, Error> {
        let verified = self.signer.verify(state)?;
        let provider: Provider = verified.provider.parse()?;
        self.claim(state)?;
        info!("{provider} authorization was not granted: {reason}");
        self.completions.record(
            state,
            Completion::Failed {
                reason: reason.to_string(),
            },
        );
        Ok(provider)
    }

    fn claim(&self, state: &str) -> Result<String, Error> {
        self.completions.claim(state).ok_or_else(|| {
            warn!("Rejected OAuth callback: state is unknown, expired or already used");
            Error::invalid_state()
        })
    }

    /// Persist credentials as pending, validate them, then store the result.
    ///
    /// Empty credentials are not persisted and yield `false`.
    pub async fn connect_integration(
        &self,
        user_id: &str,
        provider: Provider,
        credentials: Credentials,
    ) -> Result<bool, Error> {
        ensure_matches(provider, &credentials)?;
        if credentials.is_empty() {
            info!("Not connecting {provider} for user {user_id}: no credentials provided");
            return Ok(false);
        }

        let lock = self.lock_for(user_id, provider);
        let _guard = lock.lock().await;

        let mut record = self
            .store
            .upsert(IntegrationRecord::new(
                user_id,
                credentials,
                IntegrationStatus::Pending,
            ))
            .await?;

        let connected = self.validate(&record.credentials).await?;
        settle(&mut record, connected);
        self.store.upsert(record).await?;

        info!("Connected {provider} for user {user_id}: {connected}");
        Ok(connected)
    }

    /// Remove the record. Nothing is revoked at the provider.
    pub async fn disconnect_integration(
        &self,
        user_id: &str,
        provider: Provider,
    ) -> Result<bool, Error> {
        let existed = {
            let lock = self.lock_for(user_id, provider);
            let _guard = lock.lock().await;
            self.store.delete(user_id, provider).await
        };
        self.release_lock(user_id, provider);

        let existed = existed?;
        info!("Disconnected {provider} for user {user_id}: {existed}");
        Ok(existed)
    }

    pub async fn get_integration_status(
        &self,
        user_id: &str,
        provider: Provider,
    ) -> Result<Status, Error> {
        Ok(self
            .store
            .find(user_id, provider)
            .await?
            .map_or(Status::Disconnected, |record| record.status.into()))
    }

    /// Test the given credentials, or the stored ones when none are given.
    ///
    /// A stored record of any status is tested and its status updated to the
    /// result. Without credentials or a record the answer is `false`.
    pub async fn test_integration(
        &self,
        user_id: &str,
        provider: Provider,
        credentials: Option<Credentials>,
    ) -> Result<bool, Error> {
        if let Some(credentials) = credentials {
            ensure_matches(provider, &credentials)?;
            return self.validate(&credentials).await;
        }

        let lock = self.lock_for(user_id, provider);
        let _guard = lock.lock().await;

        let Some(mut record) = self.store.find(user_id, provider).await? else {
            debug!("No {provider} integration to test for user {user_id}");
            return Ok(false);
        };

        let connected = self.validate(&record.credentials).await?;
        settle(&mut record, connected);
        self.store.upsert(record).await?;

        Ok(connected)
    }

    /// Send `"MiniTandem Test: {message}"` through a connected integration.
    pub async fn send_test_message(
        &self,
        user_id: &str,
        provider: Provider,
        message: &str,
    ) -> Result<bool, Error> {
        let record = self
            .store
            .find(user_id, provider)
            .await?
            .filter(|record| record.status == IntegrationStatus::Connected)
            .ok_or_else(|| Error::validation("Integration not connected"))?;

        let payload = MessagePayload::new(&format!("{TEST_MESSAGE_PREFIX}{message}"));
        let sent = outcome(
            provider,
            self.gateway
                .send_message(&record.credentials, &payload)
                .await
                .map(|_| ()),
        )?;

        if sent {
            let lock = self.lock_for(user_id, provider);
            let _guard = lock.lock().await;
            if let Some(mut current) = self.store.find(user_id, provider).await? {
                current.last_activity = Some(Utc::now());
                self.store.upsert(current).await?;
            }
        }
        Ok(sent)
    }

    pub async fn list_integrations(&self, user_id: &str) -> Result<Vec<IntegrationRecord>, Error> {
        self.store.list(user_id).await
    }

    async fn validate(&self, credentials: &Credentials) -> Result<bool, Error> {
        outcome(
            credentials.provider(),
            self.gateway
                .test_connection(credentials)
                .await
                .map(|_| ()),
        )
    }

    fn lock_for(&self, user_id: &str, provider: Provider) -> Arc<Mutex<()>> {
        self.locks
            .entry((user_id.to_string(), provider))
            .or_default()
            .clone()
    }

    /// Drop the lock for a key once no other task holds or waits on it.
    fn release_lock(&self, user_id: &str, provider: Provider) {
        self.locks
            .remove_if(&(user_id.to_string(), provider), |_, lock| {
                Arc::strong_count(lock) == 1
            });
    }
}

/// Apply a validation result. `connected_at` moves only on entering `connected`.
fn settle(record: &mut IntegrationRecord, connected: bool) {
    let now = Utc::now();
    if connected {
        if record.status != IntegrationStatus::Connected {
            record.connected_at = Some(now);
        }
        record.status = IntegrationStatus::Connected;
    } else {
        record.status = IntegrationStatus::Error;
    }
    record.last_activity = Some(now);
}

fn ensure_matches(provider: Provider, credentials: &Credentials) -> Result<(), Error> {
    if credentials.provider() == provider {
        Ok(())
    } else {
        Err(Error::validation(&format!(
            "Credentials are for {}, not {provider}",
            credentials.provider()
        )))
    }
}

/// Provider rejections and missing fields read as `false`; anything else is an error.
fn outcome(provider: Provider, result: Result<(), Error>) -> Result<bool, Error> {
    match result {
        Ok(()) => Ok(true),
        Err(e) => match e.error_kind {
            DomainErrorKind::External(_)
            | DomainErrorKind::Internal(InternalErrorKind::Validation(_)) => {
                warn!("{provider} check failed: {e}");
                Ok(false)
            }
            _ => Err(e),
        },
    }
}
