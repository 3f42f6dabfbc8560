//! Canonical domain identifiers: policy areas, dimensions, and clusters.
//!
//! Each id is a validated newtype rather than a bare `String` so that an
//! out-of-range value (e.g. `DIM07`) is rejected at construction instead of
//! surfacing as a silent routing miss several phases downstream.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::{PipelineError, Result};

/// Number of canonical policy areas.
pub const POLICY_AREA_COUNT: usize = 10;
/// Number of canonical analytical dimensions.
pub const DIMENSION_COUNT: usize = 6;
/// Number of canonical thematic clusters.
pub const CLUSTER_COUNT: usize = 4;

/// One of the ten canonical topical buckets, `PA01`..`PA10`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PolicyAreaId(String);

/// One of the six canonical analytical axes, `DIM01`..`DIM06`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DimensionId(String);

/// One of the four canonical thematic groupings, `CL01`..`CL04`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClusterId(String);

macro_rules! canonical_id {
    ($ty:ident, $prefix:literal, $count:expr, $label:literal) => {
        impl $ty {
            /// Construct from a canonical `{prefix}NN` string, validating
            /// both the prefix and the numeric range.
            pub fn new(raw: impl ToString) -> Result<Self> {
                let raw = raw.to_string();
                let normalized = Self::normalize(&raw);
                if !Self::is_canonical(&normalized) {
                    return Err(PipelineError::validation(
                        0,
                        format!("{} is not a canonical {} id", raw, $label),
                    ));
                }
                Ok(Self(normalized))
            }

            /// Normalizes a loose form (e.g. a bare digit `7` or lowercase
            /// `dim7`) into the canonical `{prefix}NN` shape. Normalization
            /// never validates range; call [`Self::new`] for that.
            pub fn normalize(raw: &str) -> String {
                let raw = raw.trim();
                if let Ok(n) = raw.parse::<u32>() {
                    return format!("{}{:02}", $prefix, n);
                }
                let upper = raw.to_uppercase();
                if upper.starts_with($prefix) {
                    return upper;
                }
                format!("{}{}", $prefix, upper)
            }

            fn is_canonical(normalized: &str) -> bool {
                let Some(digits) = normalized.strip_prefix($prefix) else {
                    return false;
                };
                match digits.parse::<usize>() {
                    Ok(n) if n >= 1 && n <= $count => digits.len() == 2,
                    _ => false,
                }
            }

            /// Returns every canonical id in ascending order.
            pub fn canonical_set() -> Vec<Self> {
                (1..=$count)
                    .map(|n| Self(format!("{}{:02}", $prefix, n)))
                    .collect()
            }

            /// The underlying canonical string, e.g. `"PA03"`.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $ty {
            type Err = PipelineError;

            fn from_str(s: &str) -> Result<Self> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = PipelineError;

            fn try_from(value: String) -> Result<Self> {
                Self::new(value)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> String {
                value.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

canonical_id!(PolicyAreaId, "PA", POLICY_AREA_COUNT, "policy area");
canonical_id!(DimensionId, "DIM", DIMENSION_COUNT, "dimension");
canonical_id!(ClusterId, "CL", CLUSTER_COUNT, "cluster");

/// The `(policy_area, dimension)` pairing used as the grid/routing key.
/// `Ord`-derived so sorted iteration gives phase 4/5's deterministic order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridKey {
    /// Policy area component of the key.
    pub policy_area_id: PolicyAreaId,
    /// Dimension component of the key.
    pub dimension_id: DimensionId,
}

impl GridKey {
    /// Build a grid key from its two components.
    pub fn new(policy_area_id: PolicyAreaId, dimension_id: DimensionId) -> Self {
        Self {
            policy_area_id,
            dimension_id,
        }
    }
}

impl fmt::Display for GridKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.policy_area_id, self.dimension_id)
    }
}
