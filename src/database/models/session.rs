use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Session {
    pub id: i32,
    pub token: String,
    pub user_id: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// True when the session ends within `window` of `now`
    pub fn expires_within(&self, window: Duration, now: DateTime<Utc>) -> bool {
        self.expires_at < now + window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_expiring_at(expires_at: DateTime<Utc>) -> Session {
        let now = Utc::now();
        Session {
            id: 1,
            token: "a".repeat(96),
            user_id: 1,
            expires_at,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn fresh_session_is_outside_renew_window() {
        let now = Utc::now();
        let session = session_expiring_at(now + Duration::days(30));
        assert!(!session.expires_within(Duration::days(21), now));
    }

    #[test]
    fn old_session_is_inside_renew_window() {
        let now = Utc::now();
        let session = session_expiring_at(now + Duration::days(20));
        assert!(session.expires_within(Duration::days(21), now));
    }
}
