use serde::{Deserialize, Serialize};

server_id!(
    /// Server-assigned user identifier
    UserId
);

/// Authenticated user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(deserialize_with = "super::decimal::deserialize")]
    pub wallet_balance: f64,
    #[serde(deserialize_with = "super::decimal::deserialize")]
    pub penalty_per_miss: f64,
}

impl User {
    /// Builds the profile used right after login.
    ///
    /// The token endpoint returns no profile, so the user is derived from the
    /// email: the username is the local part before `@`.
    pub fn from_login_email(email: &str) -> Self {
        let username = email.split('@').next().unwrap_or_default().to_string();
        Self {
            id: UserId(1),
            email: email.to_string(),
            username,
            first_name: None,
            last_name: None,
            wallet_balance: 0.0,
            penalty_per_miss: 5.0,
        }
    }

    /// Applies the fields present in `patch`
    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(username) = patch.username {
            self.username = username;
        }
        if let Some(first_name) = patch.first_name {
            self.first_name = Some(first_name);
        }
        if let Some(last_name) = patch.last_name {
            self.last_name = Some(last_name);
        }
        if let Some(balance) = patch.wallet_balance {
            self.wallet_balance = balance;
        }
        if let Some(penalty) = patch.penalty_per_miss {
            self.penalty_per_miss = penalty;
        }
    }
}

/// Partial profile update
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub wallet_balance: Option<f64>,
    pub penalty_per_miss: Option<f64>,
}

/// Access/refresh token pair issued by the token endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}
