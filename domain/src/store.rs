//! Persistence of integration records, one per (user, provider).
//!
//! [`MemoryIntegrationStore`] keeps records in process memory;
//! [`DbIntegrationStore`] writes them to the `integrations` table, encrypting
//! the credential JSON when a key is configured.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use connector_auth::encryption::Cipher;
use dashmap::DashMap;
use log::*;
use sea_orm::DatabaseConnection;

use crate::credentials::Credentials;
use crate::error::Error;
use crate::integration_status::IntegrationStatus;
use crate::integrations::Model;
use crate::provider::Provider;
use crate::Id;

/// A user's connection to one provider.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationRecord {
    pub id: Id,
    pub user_id: String,
    pub provider: Provider,
    pub status: IntegrationStatus,
    pub credentials: Credentials,
    pub connected_at: Option<DateTime<Utc>>,
    pub last_activity: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IntegrationRecord {
    pub fn new(user_id: &str, credentials: Credentials, status: IntegrationStatus) -> Self {
        let now = Utc::now();
        Self {
            id: Id::new_v4(),
            user_id: user_id.to_string(),
            provider: credentials.provider(),
            status,
            credentials,
            connected_at: matches!(status, IntegrationStatus::Connected).then_some(now),
            last_activity: Some(now),
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
pub trait IntegrationStore: Send + Sync {
    /// Insert or wholly replace the record for `(record.user_id, record.provider)`.
    async fn upsert(&self, record: IntegrationRecord) -> Result<IntegrationRecord, Error>;

    async fn find(
        &self,
        user_id: &str,
        provider: Provider,
    ) -> Result<Option<IntegrationRecord>, Error>;

    async fn list(&self, user_id: &str) -> Result<Vec<IntegrationRecord>, Error>;

    /// Returns whether a record existed.
    async fn delete(&self, user_id: &str, provider: Provider) -> Result<bool, Error>;
}

#[derive(Default)]
pub struct MemoryIntegrationStore {
    records: DashMap<(String, Provider), IntegrationRecord>,
}

impl MemoryIntegrationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IntegrationStore for MemoryIntegrationStore {
    async fn upsert(&self, mut record: IntegrationRecord) -> Result<IntegrationRecord, Error> {
        let key = (record.user_id.clone(), record.provider);
        record.updated_at = Utc::now();
        if let Some(existing) = self.records.get(&key) {
            record.id = existing.id;
            record.created_at = existing.created_at;
        }
        self.records.insert(key, record.clone());
        Ok(record)
    }

    async fn find(
        &self,
        user_id: &str,
        provider: Provider,
    ) -> Result<Option<IntegrationRecord>, Error> {
        Ok(self
            .records
            .get(&(user_id.to_string(), provider))
            .map(|entry| entry.value().clone()))
    }

    async fn list(&self, user_id: &str) -> Result<Vec<IntegrationRecord>, Error> {
        let mut records: Vec<IntegrationRecord> = self
            .records
            .iter()
            .filter(|entry| entry.key().0 == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|record| record.created_at);
        Ok(records)
    }

    async fn delete(&self, user_id: &str, provider: Provider) -> Result<bool, Error> {
        Ok(self
            .records
            .remove(&(user_id.to_string(), provider))
            .is_some())
    }
}

pub struct DbIntegrationStore {
    db: Arc<DatabaseConnection>,
    cipher: Option<Cipher>,
}

impl DbIntegrationStore {
    /// Without a cipher, credentials are stored as plain JSON.
    pub fn new(db: Arc<DatabaseConnection>, cipher: Option<Cipher>) -> Self {
        if cipher.is_none() {
            warn!("ENCRYPTION_KEY is not set; integration credentials will be stored unencrypted");
        }
        Self { db, cipher }
    }

    fn to_model(&self, record: IntegrationRecord) -> Result<Model, Error> {
        let json = serde_json::to_string(&record.credentials)?;
        let (credentials, encrypted) = match &self.cipher {
            Some(cipher) => (cipher.encrypt(&json)?, true),
            None => (json, false),
        };

        Ok(Model {
            id: record.id,
            user_id: record.user_id,
            provider: record.provider,
            status: record.status,
            credentials,
            encrypted,
            connected_at: record.connected_at.map(Into::into),
            last_activity: record.last_activity.map(Into::into),
            created_at: record.created_at.into(),
            updated_at: record.updated_at.into(),
        })
    }

    fn from_model(&self, model: Model) -> Result<IntegrationRecord, Error> {
        let json = match (model.encrypted, &self.cipher) {
            (true, Some(cipher)) => cipher.decrypt(&model.credentials)?,
            (true, None) => {
                warn!(
                    "Integration {} holds encrypted credentials but ENCRYPTION_KEY is not set",
                    model.id
                );
                return Err(Error::config("ENCRYPTION_KEY"));
            }
            (false, _) => model.credentials,
        };
        let credentials: Credentials = serde_json::from_str(&json)?;
        if credentials.provider() != model.provider {
            return Err(Error::other("Stored credentials belong to another provider"));
        }

        Ok(IntegrationRecord {
            id: model.id,
            user_id: model.user_id,
            provider: model.provider,
            status: model.status,
            credentials,
            connected_at: model.connected_at.map(Into::into),
            last_activity: model.last_activity.map(Into::into),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }
}

#[async_trait]
impl IntegrationStore for DbIntegrationStore {
    async fn upsert(&self, record: IntegrationRecord) -> Result<IntegrationRecord, Error> {
        let model = self.to_model(record)?;
        let stored = entity_api::integration::upsert(&self.db, model).await?;
        self.from_model(stored)
    }

    async fn find(
        &self,
        user_id: &str,
        provider: Provider,
    ) -> Result<Option<IntegrationRecord>, Error> {
        entity_api::integration::find_by_user_and_provider(&self.db, user_id, provider)
            .await?
            .map(|model| self.from_model(model))
            .transpose()
    }

    async fn list(&self, user_id: &str) -> Result<Vec<IntegrationRecord>, Error> {
        entity_api::integration::find_by_user(&self.db, user_id)
            .await?
            .into_iter()
            .map(|model| self.from_model(model))
            .collect()
    }

    async fn delete(&self, user_id: &str, provider: Provider) -> Result<bool, Error> {
        Ok(entity_api::integration::delete_by_user_and_provider(&self.db, user_id, provider).await?)
    }
}
