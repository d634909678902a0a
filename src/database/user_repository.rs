//! PostGIS-backed user store
//!
//! Locations are written through `ST_GeomFromText` and read back as
//! `CONCAT(ST_X(location), ',', ST_Y(location))`, so both directions go
//! through the geometry codec with longitude as x. All SQL is
//! runtime-checked (sqlx::query, not sqlx::query!) to avoid a compile-time
//! database requirement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{GeofenceError, Result};
use crate::geometry::{decode_point, encode_point, encode_polygon, Polygon, SRID};
use crate::models::{NewUser, User};
use crate::store::{fence_name, UserStore};

/// Row shape shared by every user query; `location` is the `x,y` rendering
#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    location: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = GeofenceError;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: row.id,
            name: row.name,
            location: decode_point(&row.location)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

/// Postgres-backed user store
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Steps run inside the fence-query transaction: persist the fence,
    /// select the users it covers, remove the fence again.
    async fn fence_query_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        fence_name: &str,
        geo: &str,
    ) -> Result<Vec<User>> {
        let fence_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO geofences (name, geo)
            VALUES ($1, ST_GeomFromText($2, $3))
            RETURNING id
            "#,
        )
        .bind(fence_name)
        .bind(geo)
        .bind(SRID)
        .fetch_one(&mut **tx)
        .await?;

        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.name,
                   CONCAT(ST_X(u.location), ',', ST_Y(u.location)) AS location,
                   u.created_at, u.updated_at, u.deleted_at
            FROM users u
            JOIN geofences f ON f.id = $1
            WHERE u.deleted_at IS NULL
              AND ST_Covers(f.geo, u.location)
            ORDER BY u.created_at, u.id
            "#,
        )
        .bind(fence_id)
        .fetch_all(&mut **tx)
        .await?;

        let users = rows
            .into_iter()
            .map(User::try_from)
            .collect::<Result<Vec<_>>>()?;

        sqlx::query("DELETE FROM geofences WHERE id = $1")
            .bind(fence_id)
            .execute(&mut **tx)
            .await?;

        Ok(users)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, location)
            VALUES ($1, ST_GeomFromText($2, $3))
            RETURNING id, name,
                      CONCAT(ST_X(location), ',', ST_Y(location)) AS location,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(&user.name)
        .bind(encode_point(&user.location))
        .bind(SRID)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!("Failed to insert user {}: {}", user.name, e);
            GeofenceError::from(e)
        })?;

        let created = User::try_from(row)?;
        info!("Created user: {} ({})", created.name, created.id);
        Ok(created)
    }

    async fn query_within_fence(&self, label: &str, fence: &Polygon) -> Result<Vec<User>> {
        let name = fence_name(label);
        let geo = encode_polygon(&fence.closed())?;
        debug!("Fence {} encoded as {}", name, geo);

        let mut tx = self.pool.begin().await?;

        match Self::fence_query_in_tx(&mut tx, &name, &geo).await {
            Ok(users) => {
                tx.commit().await.map_err(|e| {
                    warn!("Commit failed for fence {}: {}", name, e);
                    GeofenceError::from(e)
                })?;
                info!("Fence {} matched {} users", name, users.len());
                Ok(users)
            }
            Err(e) => {
                warn!("Fence query {} failed, rolling back: {}", name, e);
                if let Err(rollback_err) = tx.rollback().await {
                    warn!("Rollback failed for fence {}: {}", name, rollback_err);
                }
                Err(e)
            }
        }
    }
}
