use crate::api::{KanbanApi, TransportError};
use crate::domain::{AuthTokens, LoginCredentials, User};
use crate::error::{KanbanError, Result};
use crate::routing::{Navigation, BOARDS_PATH, LOGIN_PATH};
use crate::session::SessionService;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const LOGIN_FAILED_MESSAGE: &str = "Login failed. Please check your credentials.";
pub const UNREACHABLE_MESSAGE: &str =
    "Unable to connect to the server. Please check if the backend is running.";

/// Where a login attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    /// The server answered with an error status
    Rejected,
    /// The server could not be reached
    Unreachable,
    /// The attempt failed before anything was sent, or after on the client
    Local,
}

/// User-facing login error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginError {
    pub kind: LoginFailure,
    pub message: String,
}

impl fmt::Display for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LoginError {}

impl From<KanbanError> for LoginError {
    fn from(err: KanbanError) -> Self {
        match err {
            KanbanError::Transport(transport) => {
                let kind = match &transport {
                    TransportError::Rejected { .. } => LoginFailure::Rejected,
                    TransportError::Unreachable(_) => LoginFailure::Unreachable,
                    TransportError::Request(_) => LoginFailure::Local,
                };
                let message = match &transport {
                    TransportError::Rejected { .. } => transport
                        .detail()
                        .unwrap_or(LOGIN_FAILED_MESSAGE)
                        .to_string(),
                    TransportError::Unreachable(_) => UNREACHABLE_MESSAGE.to_string(),
                    TransportError::Request(msg) if !msg.is_empty() => msg.clone(),
                    TransportError::Request(_) => LOGIN_FAILED_MESSAGE.to_string(),
                };
                Self { kind, message }
            }
            other => Self {
                kind: LoginFailure::Local,
                message: other.to_string(),
            },
        }
    }
}

/// Login, logout and token refresh on top of the session service
pub struct AuthFlow {
    api: KanbanApi,
    session: Arc<SessionService>,
}

impl AuthFlow {
    pub fn new(api: KanbanApi, session: Arc<SessionService>) -> Self {
        Self { api, session }
    }

    pub fn session(&self) -> &Arc<SessionService> {
        &self.session
    }

    /// Exchanges credentials for tokens and authenticates the session.
    ///
    /// On success returns the redirect to the board list. On failure the
    /// session stays as it was; there is no retry.
    pub async fn login(
        &self,
        credentials: &LoginCredentials,
    ) -> std::result::Result<Navigation, LoginError> {
        let tokens = self.api.login(credentials).await.map_err(|e| {
            warn!("Login failed: {}", e);
            LoginError::from(e)
        })?;

        let user = User::from_login_email(&credentials.email);
        self.session.set_session(user, tokens).await?;

        info!(email = %credentials.email, "Logged in");
        Ok(Navigation::redirect(BOARDS_PATH))
    }

    /// Logs out and returns the redirect to the login page.
    ///
    /// The server call is best effort. Local state is cleared whatever
    /// happens to it.
    pub async fn logout(&self) -> Navigation {
        if let Err(e) = self.api.logout().await {
            error!("Logout error: {}", e);
        }
        if let Err(e) = self.session.clear_session().await {
            error!("Failed to clear persisted session: {}", e);
        }
        Navigation::redirect(LOGIN_PATH)
    }

    /// Trades the stored refresh token for a new access token.
    ///
    /// Never called automatically; an expired access token is not retried.
    pub async fn refresh(&self) -> Result<AuthTokens> {
        let (user, refresh) = match self.session.get_session() {
            crate::session::Session::Authenticated { user, tokens } => (user, tokens.refresh),
            crate::session::Session::Anonymous => return Err(KanbanError::NotAuthenticated),
        };

        let tokens = self.api.refresh_token(&refresh).await?;
        self.session.set_session(user, tokens.clone()).await?;
        Ok(tokens)
    }
}
