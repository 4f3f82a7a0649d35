//! Persisted authentication session.
//!
//! [`SessionService`] is the single authority for "who is logged in". It
//! keeps the session in memory, persists it to durable [`Storage`], and
//! mirrors the access token into a short-lived cookie record that the route
//! guard consults through [`AccessCookie`].

use crate::api::AccessTokenSource;
use crate::domain::{AuthTokens, User, UserPatch};
use crate::error::Result;
use crate::routing::AccessCookie as AccessCookieCheck;
use crate::storage::Storage;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, warn};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const SESSION_KEY: &str = "auth-storage";
pub const ACCESS_COOKIE_KEY: &str = "cookie:access_token";

/// Authentication state
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated { user: User, tokens: AuthTokens },
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated { user, .. } => Some(user),
            Self::Anonymous => None,
        }
    }

    pub fn tokens(&self) -> Option<&AuthTokens> {
        match self {
            Self::Authenticated { tokens, .. } => Some(tokens),
            Self::Anonymous => None,
        }
    }
}

/// Cookie mirror of the access token, valid until `expires_at`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessCookie {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessCookie {
    pub fn is_present_at(&self, now: DateTime<Utc>) -> bool {
        !self.value.is_empty() && now < self.expires_at
    }
}

#[derive(Debug, Default)]
struct SessionState {
    session: Session,
    cookie: Option<AccessCookie>,
}

pub struct SessionService {
    storage: Arc<dyn Storage>,
    cookie_max_age: Duration,
    state: RwLock<SessionState>,
}

impl SessionService {
    pub fn new(storage: Arc<dyn Storage>, cookie_max_age: std::time::Duration) -> Self {
        Self {
            storage,
            cookie_max_age: Duration::from_std(cookie_max_age).unwrap_or(Duration::hours(1)),
            state: RwLock::new(SessionState::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reloads the persisted session and cookie.
    ///
    /// An unreadable session record is discarded and the service starts
    /// anonymous.
    pub async fn restore(&self) -> Result<Session> {
        self.storage.initialize().await?;

        let session = match self.storage.get(SESSION_KEY).await? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Discarding unreadable persisted session: {}", e);
                Session::Anonymous
            }),
            None => Session::Anonymous,
        };
        let cookie = match self.storage.get(ACCESS_COOKIE_KEY).await? {
            Some(raw) => serde_json::from_str(&raw).ok(),
            None => None,
        };

        let mut state = self.write();
        state.session = session.clone();
        state.cookie = cookie;
        if session.is_authenticated() {
            info!("Restored authenticated session");
        }
        Ok(session)
    }

    pub fn get_session(&self) -> Session {
        self.read().session.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().session.is_authenticated()
    }

    /// Persists the user and token pair and marks the session authenticated
    pub async fn set_session(&self, user: User, tokens: AuthTokens) -> Result<()> {
        let cookie = AccessCookie {
            value: tokens.access.clone(),
            expires_at: Utc::now() + self.cookie_max_age,
        };
        let session = Session::Authenticated { user, tokens };

        if let Some(tokens) = session.tokens() {
            self.storage.set(ACCESS_TOKEN_KEY, &tokens.access).await?;
            self.storage.set(REFRESH_TOKEN_KEY, &tokens.refresh).await?;
        }
        self.storage
            .set(SESSION_KEY, &serde_json::to_string(&session)?)
            .await?;
        self.storage
            .set(ACCESS_COOKIE_KEY, &serde_json::to_string(&cookie)?)
            .await?;

        let mut state = self.write();
        state.session = session;
        state.cookie = Some(cookie);
        info!("Session authenticated");
        Ok(())
    }

    /// Clears memory, cookie and storage.
    ///
    /// Memory and cookie are cleared before storage is touched, so the
    /// session is anonymous afterwards even when storage fails.
    pub async fn clear_session(&self) -> Result<()> {
        {
            let mut state = self.write();
            state.session = Session::Anonymous;
            state.cookie = None;
        }
        info!("Session cleared");

        let mut first_error = None;
        for key in [
            ACCESS_TOKEN_KEY,
            REFRESH_TOKEN_KEY,
            SESSION_KEY,
            ACCESS_COOKIE_KEY,
        ] {
            if let Err(e) = self.storage.remove(key).await {
                warn!("Failed to remove {} from storage: {}", key, e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Merges profile fields into the current user; no-op when anonymous
    pub async fn update_user(&self, patch: UserPatch) -> Result<()> {
        let session = {
            let mut state = self.write();
            match &mut state.session {
                Session::Authenticated { user, .. } => user.apply(patch),
                Session::Anonymous => return Ok(()),
            }
            state.session.clone()
        };
        self.storage
            .set(SESSION_KEY, &serde_json::to_string(&session)?)
            .await
    }

    pub fn access_cookie(&self) -> Option<AccessCookie> {
        self.read().cookie.clone()
    }

    pub fn has_access_cookie_at(&self, now: DateTime<Utc>) -> bool {
        self.read()
            .cookie
            .as_ref()
            .map(|c| c.is_present_at(now))
            .unwrap_or(false)
    }
}

impl AccessCookieCheck for SessionService {
    fn has_access_cookie(&self) -> bool {
        self.has_access_cookie_at(Utc::now())
    }
}

#[async_trait]
impl AccessTokenSource for SessionService {
    async fn access_token(&self) -> Option<String> {
        self.read().session.tokens().map(|t| t.access.clone())
    }
}
