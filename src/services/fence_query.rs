//! Fence query service
//!
//! Thin coordination over [`UserStore::query_within_fence`]. Label and
//! polygon are supplied per call by the request layer; the service keeps no
//! state between calls.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{Result, ValidationError};
use crate::geometry::Polygon;
use crate::models::User;
use crate::store::UserStore;

/// Label of the built-in fence served by `GET /api/v1/users/`
pub const DEFAULT_FENCE_NAME: &str = "test";

/// Vertices of the built-in fence, as `[longitude, latitude]`
pub const DEFAULT_FENCE_VERTICES: [[f64; 2]; 5] = [
    [-73.9819, 40.7682],
    [-73.9589, 40.7647],
    [-73.9497, 40.7829],
    [-73.9733, 40.7854],
    [-73.9819, 40.7682],
];

/// The built-in fence (a block of midtown Manhattan)
pub fn default_fence() -> std::result::Result<Polygon, ValidationError> {
    Polygon::from_xy_pairs(&DEFAULT_FENCE_VERTICES)
}

pub struct FenceQueryService {
    store: Arc<dyn UserStore>,
}

impl FenceQueryService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Users inside `fence`, in the store's order; errors are passed through
    pub async fn users_within_fence(&self, label: &str, fence: &Polygon) -> Result<Vec<User>> {
        match self.store.query_within_fence(label, fence).await {
            Ok(users) => {
                info!(
                    "Fence query '{}' ({} vertices) returned {} users",
                    label,
                    fence.len(),
                    users.len()
                );
                Ok(users)
            }
            Err(e) => {
                warn!("Fence query '{}' failed: {}", label, e);
                Err(e)
            }
        }
    }

    /// Users inside the built-in fence
    pub async fn users_within_default_fence(&self) -> Result<Vec<User>> {
        let fence = default_fence()?;
        self.users_within_fence(DEFAULT_FENCE_NAME, &fence).await
    }
}
