use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::geometry::Polygon;
use crate::models::{NewUser, User};

/// Persistence trait for users and their fence queries.
///
/// The HTTP layer and the fence-query service operate exclusively through
/// this trait, so the PostGIS store and the in-memory store are
/// interchangeable. Implementations are shared across concurrent requests
/// and hold no per-request state.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; the store assigns identity and timestamps.
    async fn insert_user(&self, user: NewUser) -> Result<User>;

    /// Return every live user whose location lies inside or on the boundary
    /// of `fence`.
    ///
    /// Runs as one unit of work: a fence record named after `label` is
    /// created, used as the containment operand and removed again before
    /// commit. Any failure rolls the whole unit back.
    async fn query_within_fence(&self, label: &str, fence: &Polygon) -> Result<Vec<User>>;
}

/// Fence record name: the label plus a token unique to this invocation
pub fn fence_name(label: &str) -> String {
    format!("{}_{}", label, Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fence_names_keep_label_prefix() {
        let name = fence_name("test");
        assert!(name.starts_with("test_"));
        assert_eq!(name.len(), "test_".len() + 32);
    }

    #[test]
    fn test_fence_names_do_not_collide() {
        let names: HashSet<String> = (0..1000).map(|_| fence_name("test")).collect();
        assert_eq!(names.len(), 1000);
    }
}
