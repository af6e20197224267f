//! Record Types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One daily weather reading at a station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub station: String,
    pub date: NaiveDate,
    /// Millimetres; missing readings are kept as `None`
    pub precipitation: Option<f64>,
    pub temperature: i64,
}

impl Observation {
    pub fn new(
        station: impl Into<String>,
        date: NaiveDate,
        precipitation: Option<f64>,
        temperature: i64,
    ) -> Self {
        Self {
            station: station.into(),
            date,
            precipitation,
            temperature,
        }
    }
}

/// Date and precipitation projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PrecipitationReading {
    pub date: String,
    pub precipitation: Option<f64>,
}

/// Date and temperature projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TemperatureReading {
    pub date: String,
    /// `None` where the row has no recorded temperature
    pub temperature: Option<i64>,
}

/// Min / max / mean temperature over a date filter.
///
/// All fields are `None` when no observation matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TemperatureStats {
    pub min_temp: Option<i64>,
    pub max_temp: Option<i64>,
    pub avg_temp: Option<f64>,
}

impl TemperatureStats {
    pub fn is_empty(&self) -> bool {
        self.min_temp.is_none() && self.max_temp.is_none() && self.avg_temp.is_none()
    }
}

/// Observation count for a single station
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct StationActivity {
    pub station: String,
    pub observations: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stats_serialize_as_nulls() {
        let stats = TemperatureStats {
            min_temp: None,
            max_temp: None,
            avg_temp: None,
        };
        assert!(stats.is_empty());
        assert_eq!(
            serde_json::to_string(&stats).unwrap(),
            r#"{"min_temp":null,"max_temp":null,"avg_temp":null}"#
        );
    }

    #[test]
    fn test_stats_serialize_integer_bounds() {
        let stats = TemperatureStats {
            min_temp: Some(50),
            max_temp: Some(52),
            avg_temp: Some(51.0),
        };
        assert_eq!(
            serde_json::to_string(&stats).unwrap(),
            r#"{"min_temp":50,"max_temp":52,"avg_temp":51.0}"#
        );
    }
}
