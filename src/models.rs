//! Domain records and inbound request DTOs
//!
//! `User` and `GeoFence` mirror the `users` and `geofences` tables. The
//! request types carry optional fields so that a missing value can be told
//! apart from a zero coordinate; `validate` turns them into core inputs or a
//! [`ValidationError`] before any store call is made.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::geometry::{Point, Polygon};

/// Label used when a fence request does not name its fence
pub const DEFAULT_FENCE_LABEL: &str = "fence";

/// A point-located user as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub location: Point,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A user that has not been assigned identity or timestamps yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub location: Point,
}

/// Ephemeral fence record used as the operand of a containment query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoFence {
    pub id: Uuid,
    pub name: String,
    /// Polygon as well-known text
    pub geo: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Body of `POST /api/v1/users/create`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<NewUser, ValidationError> {
        let mut errors = ValidationError::new();

        let name = self.name.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            errors.push("name", "required");
        }
        check_coordinate(&mut errors, "lat", self.lat, 90.0);
        check_coordinate(&mut errors, "lng", self.lng, 180.0);
        errors.into_result()?;

        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Ok(NewUser {
                name: name.to_string(),
                location: Point::new(lng, lat),
            }),
            _ => Err(ValidationError::single("lat", "required")),
        }
    }
}

/// Body of `POST /api/v1/users/within`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FenceRequest {
    pub label: Option<String>,
    /// `[longitude, latitude]` pairs
    #[serde(default)]
    pub vertices: Vec<[f64; 2]>,
}

impl FenceRequest {
    pub fn validate(&self) -> Result<(String, Polygon), ValidationError> {
        let mut errors = ValidationError::new();

        if self.vertices.len() < Polygon::MIN_VERTICES {
            errors.push("vertices", "min");
        }
        for (i, [lng, lat]) in self.vertices.iter().enumerate() {
            if !in_range(*lng, 180.0) {
                errors.push(format!("vertices[{}][0]", i), "range");
            }
            if !in_range(*lat, 90.0) {
                errors.push(format!("vertices[{}][1]", i), "range");
            }
        }
        errors.into_result()?;

        let label = match self.label.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => DEFAULT_FENCE_LABEL.to_string(),
        };
        Ok((label, Polygon::from_xy_pairs(&self.vertices)?))
    }
}

fn check_coordinate(errors: &mut ValidationError, field: &str, value: Option<f64>, limit: f64) {
    match value {
        None => errors.push(field, "required"),
        Some(v) if !in_range(v, limit) => errors.push(field, "range"),
        Some(_) => {}
    }
}

fn in_range(value: f64, limit: f64) -> bool {
    value.is_finite() && (-limit..=limit).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: Option<&str>, lat: Option<f64>, lng: Option<f64>) -> CreateUserRequest {
        CreateUserRequest {
            name: name.map(str::to_string),
            lat,
            lng,
        }
    }

    #[test]
    fn test_valid_request_maps_lat_lng_onto_point() {
        let user = request(Some("Alice"), Some(40.785091), Some(-73.968285))
            .validate()
            .unwrap();
        assert_eq!(user.name, "Alice");
        assert_eq!(user.location.latitude, 40.785091);
        assert_eq!(user.location.longitude, -73.968285);
    }

    #[test]
    fn test_zero_coordinates_are_not_missing() {
        assert!(request(Some("Null Island"), Some(0.0), Some(0.0))
            .validate()
            .is_ok());
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let err = request(Some("   "), Some(1.0), Some(1.0))
            .validate()
            .unwrap_err();
        assert_eq!(err.field_names(), vec!["name"]);
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let err = request(None, None, None).validate().unwrap_err();
        assert_eq!(err.field_names(), vec!["name", "lat", "lng"]);
        assert!(err.to_string().contains("Field 'lat' failed on the 'required' tag"));
    }

    #[test]
    fn test_out_of_range_coordinates_are_rejected() {
        let err = request(Some("Bob"), Some(91.0), Some(-180.5))
            .validate()
            .unwrap_err();
        assert_eq!(err.field_names(), vec!["lat", "lng"]);

        let err = request(Some("Bob"), Some(f64::NAN), Some(0.0))
            .validate()
            .unwrap_err();
        assert_eq!(err.field_names(), vec!["lat"]);
    }

    #[test]
    fn test_fence_request_defaults_label() {
        let fence = FenceRequest {
            label: Some("  ".into()),
            vertices: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
        };
        let (label, polygon) = fence.validate().unwrap();
        assert_eq!(label, DEFAULT_FENCE_LABEL);
        assert_eq!(polygon.len(), 3);
    }

    #[test]
    fn test_fence_request_checks_vertex_count_and_range() {
        let short = FenceRequest {
            label: Some("downtown".into()),
            vertices: vec![[0.0, 0.0], [1.0, 0.0]],
        };
        assert_eq!(short.validate().unwrap_err().field_names(), vec!["vertices"]);

        let out_of_range = FenceRequest {
            label: None,
            vertices: vec![[0.0, 0.0], [200.0, 0.0], [1.0, -95.0]],
        };
        assert_eq!(
            out_of_range.validate().unwrap_err().field_names(),
            vec!["vertices[1][0]", "vertices[2][1]"]
        );
    }

    #[test]
    fn test_fence_request_rejects_degenerate_rings() {
        let closed_segment = FenceRequest {
            label: Some("sliver".into()),
            vertices: vec![[0.0, 0.0], [1.0, 1.0], [0.0, 0.0]],
        };
        let err = closed_segment.validate().unwrap_err();
        assert_eq!(err.field_names(), vec!["vertices"]);
        assert_eq!(err.fields[0].rule, "min");

        let collinear = FenceRequest {
            label: None,
            vertices: vec![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [0.0, 0.0]],
        };
        assert_eq!(collinear.validate().unwrap_err().fields[0].rule, "area");
    }

    #[test]
    fn test_create_request_deserializes_original_field_names() {
        let req: CreateUserRequest =
            serde_json::from_str(r#"{"name":"Charlie","lat":40.774671,"lng":-73.971771}"#).unwrap();
        assert_eq!(req.name.as_deref(), Some("Charlie"));
        assert_eq!(req.lat, Some(40.774671));
    }
}
