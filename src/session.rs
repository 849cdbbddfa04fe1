use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::error::{CasaError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Anonymous,
    Authenticated {
        user: String,
        expires_at: DateTime<Utc>,
    },
    LoggedOut,
}

/// Who is writing to the ledger. Passed explicitly to every store call;
/// the store stamps the user onto each row it writes.
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
}

impl Session {
    #[allow(dead_code)]
    pub fn anonymous() -> Self {
        Self {
            state: SessionState::Anonymous,
        }
    }

    pub fn authenticate(user: &str, ttl: Duration) -> Result<Self> {
        Self::authenticate_at(user, ttl, Utc::now())
    }

    pub fn authenticate_at(user: &str, ttl: Duration, now: DateTime<Utc>) -> Result<Self> {
        let user = user.trim();
        if user.is_empty() {
            return Err(CasaError::Unauthenticated);
        }
        if ttl <= Duration::zero() {
            return Err(CasaError::Settings(format!(
                "session lifetime must be positive, got {ttl}"
            )));
        }
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            CasaError::Settings(format!("session lifetime {ttl} is out of range"))
        })?;
        info!(user, %expires_at, "session started");
        Ok(Self {
            state: SessionState::Authenticated {
                user: user.to_string(),
                expires_at,
            },
        })
    }

    pub fn logout(&mut self) {
        if let SessionState::Authenticated { user, .. } = &self.state {
            info!(user = %user, "session ended");
        }
        self.state = SessionState::LoggedOut;
    }

    #[allow(dead_code)]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The signed-in user, valid at `now`.
    pub fn user_at(&self, now: DateTime<Utc>) -> Result<&str> {
        match &self.state {
            SessionState::Authenticated { user, expires_at } if now < *expires_at => Ok(user),
            SessionState::Authenticated { user, .. } => {
                Err(CasaError::SessionExpired(user.clone()))
            }
            SessionState::Anonymous | SessionState::LoggedOut => Err(CasaError::Unauthenticated),
        }
    }

    pub fn user(&self) -> Result<&str> {
        self.user_at(Utc::now())
    }
}
