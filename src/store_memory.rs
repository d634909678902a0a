//! In-memory user store
//!
//! Same contract as the PostGIS store: identity and timestamps assigned on
//! insert, fence queries run as a single unit of work, boundary-inclusive
//! containment. Useful for tests and for running the server without a
//! database.

use async_trait::async_trait;
use chrono::Utc;
use geo::Intersects;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{GeofenceError, Result};
use crate::geometry::{encode_polygon, parse_polygon_wkt, Polygon};
use crate::models::{GeoFence, NewUser, User};
use crate::store::{fence_name, UserStore};

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<User>,
    fences: Vec<GeoFence>,
}

/// Record counts at the start of a unit of work
#[derive(Debug, Clone, Copy)]
struct Savepoint {
    users: usize,
    fences: usize,
}

impl MemoryState {
    fn savepoint(&self) -> Savepoint {
        Savepoint {
            users: self.users.len(),
            fences: self.fences.len(),
        }
    }

    /// Drop every record appended since `savepoint`
    fn rollback_to(&mut self, savepoint: Savepoint) {
        self.users.truncate(savepoint.users);
        self.fences.truncate(savepoint.fences);
    }
}

/// User store backed by process memory
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    state: Mutex<MemoryState>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored user, including soft-deleted ones
    pub async fn users(&self) -> Vec<User> {
        self.state.lock().await.users.clone()
    }

    /// Number of fence records currently visible
    pub async fn fence_count(&self) -> usize {
        self.state.lock().await.fences.len()
    }

    /// Run `work` with the lock held, so units of work are serialized. On
    /// failure everything `work` appended is discarded.
    ///
    /// Units of work only append records (and may remove their own appends),
    /// which is what lets the rollback be a truncation.
    async fn unit_of_work<T>(
        &self,
        work: impl FnOnce(&mut MemoryState) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.state.lock().await;
        let savepoint = state.savepoint();

        match work(&mut *state) {
            Ok(value) => Ok(value),
            Err(e) => {
                state.rollback_to(savepoint);
                warn!("Rolled back in-memory unit of work: {}", e);
                Err(e)
            }
        }
    }
}

fn users_within(state: &MemoryState, fence_id: Uuid) -> Result<Vec<User>> {
    let fence = state
        .fences
        .iter()
        .find(|f| f.id == fence_id)
        .ok_or_else(|| GeofenceError::persistence(format!("fence {} not found", fence_id)))?;
    let polygon = parse_polygon_wkt(&fence.geo)?;

    let mut users: Vec<User> = state
        .users
        .iter()
        .filter(|u| u.deleted_at.is_none())
        .filter(|u| polygon.intersects(&geo_types::Point::from(u.location)))
        .cloned()
        .collect();
    users.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
    Ok(users)
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let created = self
            .unit_of_work(|state| {
                let now = Utc::now();
                let created = User {
                    id: Uuid::new_v4(),
                    name: user.name,
                    location: user.location,
                    created_at: now,
                    updated_at: now,
                    deleted_at: None,
                };
                state.users.push(created.clone());
                Ok(created)
            })
            .await?;

        info!("Created user: {} ({})", created.name, created.id);
        Ok(created)
    }

    async fn query_within_fence(&self, label: &str, fence: &Polygon) -> Result<Vec<User>> {
        let name = fence_name(label);
        let geo = encode_polygon(&fence.closed())?;
        debug!("Fence {} encoded as {}", name, geo);

        let record_name = name.clone();
        let users = self
            .unit_of_work(move |state| {
                let now = Utc::now();
                let record = GeoFence {
                    id: Uuid::new_v4(),
                    name: record_name,
                    geo,
                    created_at: now,
                    updated_at: now,
                    deleted_at: None,
                };
                let fence_id = record.id;
                state.fences.push(record);

                let users = users_within(state, fence_id)?;

                state.fences.retain(|f| f.id != fence_id);
                Ok(users)
            })
            .await?;

        info!("Fence {} matched {} users", name, users.len());
        Ok(users)
    }
}
