//! Session - the context every editor works through.
//!
//! A session owns the document store, the credentials it was opened with
//! and the [`DocumentCache`]. Editors borrow the session, so two editors for
//! the same path always share one cache slot.
//!
//! ## Example
//!
//! ```ignore
//! use folio::{Book, ClientConfig, Credentials, Session};
//!
//! let credentials = Credentials::new(token, "owner/site", "main")?;
//! let session = Session::login(credentials, ClientConfig::default()).await?;
//!
//! let books = session.collection::<Book>();
//! books.load().await?;
//! ```

mod cache;

pub use cache::{CacheSlot, CachedDocument, DocumentCache};

use crate::config::{ClientConfig, Credentials};
use crate::editor::{CollectionEditor, LandingEditor, SingletonEditor};
use crate::record::{Record, Singleton};
#[cfg(feature = "github")]
use crate::store::GitHubStore;
use crate::store::{DocumentStore, StoreError};

pub struct Session<S> {
    store: S,
    credentials: Option<Credentials>,
    config: ClientConfig,
    cache: DocumentCache,
}

#[cfg(feature = "github")]
impl Session<GitHubStore> {
    /// Open a session against GitHub, checking that the token can reach the
    /// repository.
    pub async fn login(
        credentials: Credentials,
        config: ClientConfig,
    ) -> Result<Self, StoreError> {
        let store = GitHubStore::new(credentials.clone(), config.clone())?;
        if let Err(err) = store.verify_access().await {
            tracing::warn!(repository = %credentials.repository(), error = %err, "login failed");
            return Err(err);
        }
        tracing::info!(
            repository = %credentials.repository(),
            branch = credentials.branch(),
            "logged in"
        );
        Ok(Self {
            store,
            credentials: Some(credentials),
            config,
            cache: DocumentCache::new(),
        })
    }
}

impl<S: DocumentStore> Session<S> {
    /// Session over any store, with default configuration and no
    /// credentials.
    pub fn new(store: S) -> Self {
        Self {
            store,
            credentials: None,
            config: ClientConfig::default(),
            cache: DocumentCache::new(),
        }
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach credentials, used to build public file URLs.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cache(&self) -> &DocumentCache {
        &self.cache
    }

    /// The shared cache slot for `path`.
    pub fn slot(&self, path: &str) -> CacheSlot {
        self.cache.slot(path)
    }

    /// Editor for a collection file.
    pub fn collection<R: Record>(&self) -> CollectionEditor<'_, S, R> {
        CollectionEditor::new(self)
    }

    /// Editor for a singleton file.
    pub fn singleton<T: Singleton>(&self) -> SingletonEditor<'_, S, T> {
        SingletonEditor::new(self)
    }

    /// Editor for the landing image boxes.
    pub fn landing(&self) -> LandingEditor<'_, S> {
        LandingEditor::new(self)
    }

    /// End the session. Credentials and every cached document are dropped
    /// with it.
    pub fn logout(self) {
        let cached = self.cache.len();
        self.cache.clear();
        match &self.credentials {
            Some(credentials) => {
                tracing::info!(repository = %credentials.repository(), cached, "logged out")
            }
            None => tracing::info!(cached, "logged out"),
        }
    }
}
