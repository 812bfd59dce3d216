use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::error::AppError;

/// Converts drive-time minutes into the km figure the filter compares against.
pub const KM_PER_DRIVE_MINUTE: f64 = 0.06;

/// One row of the merged dataset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Place {
    /// Business or attraction classification; absent when the source cell is blank
    pub category: Option<String>,
    pub name: String,
    pub address: String,
    /// Derived from `drive_time_minutes`, never measured
    pub distance_km: Option<f64>,
    pub drive_time_minutes: Option<f64>,
    pub walk_time_minutes: Option<f64>,
}

impl Place {
    pub fn new(
        category: Option<String>,
        name: impl Into<String>,
        address: impl Into<String>,
        drive_time_minutes: Option<f64>,
        walk_time_minutes: Option<f64>,
    ) -> Self {
        Self {
            category,
            name: name.into(),
            address: address.into(),
            distance_km: drive_time_minutes.map(|minutes| minutes * KM_PER_DRIVE_MINUTE),
            drive_time_minutes,
            walk_time_minutes,
        }
    }

    pub fn is_within(&self, bound_km: f64) -> bool {
        self.distance_km.is_some_and(|km| km <= bound_km)
    }
}

/// Coarse "how much time do you have" selector, mapped to a km ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeBucket {
    TenMinutes,
    TwentyMinutes,
    ThirtyMinutes,
    WithinAnHour,
}

impl TimeBucket {
    pub const ALL: [TimeBucket; 4] = [
        TimeBucket::TenMinutes,
        TimeBucket::TwentyMinutes,
        TimeBucket::ThirtyMinutes,
        TimeBucket::WithinAnHour,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TimeBucket::TenMinutes => "10분",
            TimeBucket::TwentyMinutes => "20분",
            TimeBucket::ThirtyMinutes => "30분",
            TimeBucket::WithinAnHour => "1시간 이내",
        }
    }

    /// Inclusive upper bound on `Place::distance_km`
    pub fn max_distance_km(&self) -> f64 {
        match self {
            TimeBucket::TenMinutes => 1.0,
            TimeBucket::TwentyMinutes => 2.0,
            TimeBucket::ThirtyMinutes => 3.0,
            TimeBucket::WithinAnHour => 5.0,
        }
    }
}

impl Display for TimeBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for TimeBucket {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "10분" | "10min" => Ok(TimeBucket::TenMinutes),
            "20분" | "20min" => Ok(TimeBucket::TwentyMinutes),
            "30분" | "30min" => Ok(TimeBucket::ThirtyMinutes),
            "1시간 이내" | "within 1 hour" => Ok(TimeBucket::WithinAnHour),
            other => Err(AppError::InvalidInput(format!(
                "Unknown time bucket: {:?}",
                other
            ))),
        }
    }
}

impl Serialize for TimeBucket {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}
