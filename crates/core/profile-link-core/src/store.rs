//! Per-user identity claims storage.

use crate::claims::IdentityClaims;
use crate::error::StoreResult;
use crate::user::LocalUserId;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

/// One claims object per local user.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Stored claims for a user, if any.
    async fn get(&self, user: LocalUserId) -> StoreResult<Option<IdentityClaims>>;

    /// Replace whatever is stored for the user. No merging.
    async fn set(&self, user: LocalUserId, claims: IdentityClaims) -> StoreResult<()>;
}

#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: Arc<RwLock<HashMap<LocalUserId, IdentityClaims>>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.profiles.read().await.is_empty()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get(&self, user: LocalUserId) -> StoreResult<Option<IdentityClaims>> {
        Ok(self.profiles.read().await.get(&user).cloned())
    }

    async fn set(&self, user: LocalUserId, claims: IdentityClaims) -> StoreResult<()> {
        self.profiles.write().await.insert(user, claims);
        Ok(())
    }
}

type ProfileDocument = BTreeMap<String, IdentityClaims>;

/// Claims for all users kept in a single JSON document.
///
/// The document is read on first access and rewritten through a temporary
/// file on every `set`.
pub struct FileProfileStore {
    path: PathBuf,
    cache: RwLock<Option<ProfileDocument>>,
}

impl FileProfileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cache: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> StoreResult<ProfileDocument> {
        match fs::read(&self.path).await {
            Ok(bytes) => {
                let document: ProfileDocument = serde_json::from_slice(&bytes)?;
                info!(
                    "Loaded {} linked profiles from {}",
                    document.len(),
                    self.path.display()
                );
                Ok(document)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No profile file at {}, starting empty", self.path.display());
                Ok(ProfileDocument::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn persist(&self, document: &ProfileDocument) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let contents = serde_json::to_vec_pretty(document)?;
        fs::write(&tmp_path, contents).await?;
        fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for FileProfileStore {
    async fn get(&self, user: LocalUserId) -> StoreResult<Option<IdentityClaims>> {
        {
            let cache = self.cache.read().await;
            if let Some(document) = cache.as_ref() {
                return Ok(document.get(&user.to_string()).cloned());
            }
        }

        let mut cache = self.cache.write().await;
        if cache.is_none() {
            *cache = Some(self.load().await?);
        }
        Ok(cache
            .as_ref()
            .and_then(|document| document.get(&user.to_string()).cloned()))
    }

    #[instrument(skip(self, claims))]
    async fn set(&self, user: LocalUserId, claims: IdentityClaims) -> StoreResult<()> {
        let mut cache = self.cache.write().await;
        let mut document = match cache.as_ref() {
            Some(document) => document.clone(),
            None => self.load().await?,
        };

        document.insert(user.to_string(), claims);
        // The cache only ever mirrors what is on disk.
        self.persist(&document).await?;
        *cache = Some(document);
        Ok(())
    }
}
