//! Integer discriminators stored on every report row.
//!
//! The storage schema keeps these as plain integers.  They are modelled as
//! closed enums so that decoding handles exactly the known codes.

use std::fmt;

use crate::{CoreError, CoreResult};

/// Statistical role of the quantities carried by a report row.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum QuantityType {
    /// Mean estimate.  Also the only role used by ensemble members.
    Mean,
    /// Standard deviation around the mean estimate.
    StdDev,
}

impl QuantityType {
    /// Storage code of this role.
    pub const fn code(self) -> i64 {
        match self {
            QuantityType::Mean   => 2,
            QuantityType::StdDev => 4,
        }
    }

    /// Map a storage code back to a role.  `None` for codes outside the set.
    pub const fn from_code(code: i64) -> Option<QuantityType> {
        match code {
            2 => Some(QuantityType::Mean),
            4 => Some(QuantityType::StdDev),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QuantityType::Mean   => "mean",
            QuantityType::StdDev => "std_dev",
        }
    }
}

impl TryFrom<i64> for QuantityType {
    type Error = CoreError;
    fn try_from(code: i64) -> CoreResult<QuantityType> {
        QuantityType::from_code(code).ok_or(CoreError::UnknownQuantityType(code))
    }
}

impl fmt::Display for QuantityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Temporal aggregation applied to the quantities of a report row.
///
/// Only raw (unaggregated) estimator output is produced today.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AggregationType {
    #[default]
    Raw,
}

impl AggregationType {
    pub const fn code(self) -> i64 {
        match self {
            AggregationType::Raw => 1,
        }
    }

    pub const fn from_code(code: i64) -> Option<AggregationType> {
        match code {
            1 => Some(AggregationType::Raw),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AggregationType::Raw => "raw",
        }
    }
}

impl TryFrom<i64> for AggregationType {
    type Error = CoreError;
    fn try_from(code: i64) -> CoreResult<AggregationType> {
        AggregationType::from_code(code).ok_or(CoreError::UnknownAggregationType(code))
    }
}

impl fmt::Display for AggregationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
