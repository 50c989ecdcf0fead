//! Core data types: user records in, group records out.

use crate::error::{GroupingError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Backing-store user identifier.
pub type UserId = i64;

/// One user's interest weights and optional location. Immutable input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub traits: BTreeMap<String, f64>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl UserRecord {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Set a trait weight. A repeated name overwrites the earlier weight.
    pub fn with_trait(mut self, name: impl Into<String>, weight: f64) -> Self {
        self.traits.insert(name.into(), weight);
        self
    }

    pub fn with_location(mut self, lat: f64, lon: f64) -> Self {
        self.lat = Some(lat);
        self.lon = Some(lon);
        self
    }

    /// Both coordinates, only when both are present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lon)
    }

    /// Reject non-finite weights and coordinates.
    pub fn validate(&self) -> Result<()> {
        for (name, &value) in &self.traits {
            if !value.is_finite() {
                return Err(GroupingError::NonFiniteWeight {
                    user_id: self.id,
                    name: name.clone(),
                    value,
                });
            }
        }
        for (field, value) in [("latitude", self.lat), ("longitude", self.lon)] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(GroupingError::InvalidCoordinate {
                        user_id: self.id,
                        field,
                        found: v.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Exported group, in the shape the transport collaborator expects.
///
/// Field names, order and nullability are part of the downstream contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    pub group_id: u64,
    pub users: Vec<UserId>,
    pub top_traits: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl GroupRecord {
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
