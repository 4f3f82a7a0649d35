//! Process-wide wiring of configuration, session, transport and store.

use crate::api::{HttpTransport, KanbanApi, Transport};
use crate::auth::{AuthFlow, LoginError};
use crate::config::ClientConfig;
use crate::domain::LoginCredentials;
use crate::error::Result;
use crate::routing::{self, Navigation};
use crate::session::{Session, SessionService};
use crate::storage::Storage;
use crate::store::KanbanStore;
use std::sync::Arc;
use tracing::info;

/// One logged-in (or anonymous) client of the kanban backend
pub struct OmniClient {
    session: Arc<SessionService>,
    auth: AuthFlow,
    store: KanbanStore,
}

impl OmniClient {
    /// Client talking HTTP to `config.api_url`, persisting the session in the
    /// JSON file at `config.session_file`
    #[cfg(feature = "file-storage")]
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let storage = Arc::new(crate::storage::FileStorage::new(&config.session_file));
        Self::new(config, storage)
    }

    pub fn new(config: &ClientConfig, storage: Arc<dyn Storage>) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(config)?);
        Ok(Self::with_transport(config, storage, transport))
    }

    pub fn with_transport(
        config: &ClientConfig,
        storage: Arc<dyn Storage>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let session = Arc::new(SessionService::new(storage, config.cookie_max_age));
        let api = KanbanApi::new(transport).with_token_source(session.clone());
        Self {
            auth: AuthFlow::new(api.clone(), session.clone()),
            store: KanbanStore::new(api),
            session,
        }
    }

    /// Restores the persisted session; call once before anything else
    pub async fn start(&self) -> Result<Session> {
        let session = self.session.restore().await?;
        info!(authenticated = session.is_authenticated(), "client started");
        Ok(session)
    }

    pub fn session(&self) -> &Arc<SessionService> {
        &self.session
    }

    pub fn auth(&self) -> &AuthFlow {
        &self.auth
    }

    pub fn store(&self) -> &KanbanStore {
        &self.store
    }

    /// Evaluates the route guard for `path` against the current session
    pub fn navigate(&self, path: &str) -> Navigation {
        routing::guard(path, self.session.as_ref())
    }

    pub async fn login(
        &self,
        credentials: &LoginCredentials,
    ) -> std::result::Result<Navigation, LoginError> {
        self.auth.login(credentials).await
    }

    /// Logs out and drops every cached query of the previous user
    pub async fn logout(&self) -> Navigation {
        let navigation = self.auth.logout().await;
        self.store.cache().clear().await;
        navigation
    }
}
