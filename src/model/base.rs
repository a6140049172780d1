use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity and timestamps shared by every client and flow artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Base {
    pub id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Base {
    pub fn new() -> Self {
        let now = Utc::now().timestamp();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Advance `updated_at`; `id` and `created_at` never change.
    pub fn touch(&mut self, now: i64) {
        self.updated_at = self.updated_at.max(now);
    }
}

impl Default for Base {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_base_has_uuid_and_equal_timestamps() {
        let base = Base::new();
        assert!(Uuid::parse_str(&base.id).is_ok());
        assert_eq!(base.created_at, base.updated_at);
    }

    #[test]
    fn test_touch_only_moves_updated_at_forward() {
        let mut base = Base::new();
        let created = base.created_at;
        base.touch(created + 10);
        assert_eq!(base.updated_at, created + 10);
        base.touch(created - 10);
        assert_eq!(base.updated_at, created + 10);
        assert_eq!(base.created_at, created);
    }
}
