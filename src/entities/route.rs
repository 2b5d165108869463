use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrafficLevel {
    #[serde(alias = "light")]
    Light,
    #[serde(alias = "moderate")]
    Moderate,
    #[serde(alias = "heavy")]
    Heavy,
}

impl TrafficLevel {
    /// Unknown labels read as `Light`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "heavy" => Self::Heavy,
            "moderate" => Self::Moderate,
            _ => Self::Light,
        }
    }

    /// Classifies congestion from the ratio of in-traffic to free-flow duration.
    pub fn from_delay_ratio(ratio: f64) -> Self {
        if ratio > 1.3 {
            Self::Heavy
        } else if ratio > 1.15 {
            Self::Moderate
        } else {
            Self::Light
        }
    }
}

impl Default for TrafficLevel {
    fn default() -> Self {
        Self::Light
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteInfo {
    pub distance_meters: f64,
    pub duration_minutes: f64,
    pub traffic_level: TrafficLevel,
}

impl RouteInfo {
    pub fn new(distance_meters: f64, duration_minutes: f64, traffic_level: TrafficLevel) -> Self {
        Self {
            distance_meters,
            duration_minutes,
            traffic_level,
        }
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1000.0
    }
}

#[test]
fn traffic_from_label_test() {
    assert_eq!(TrafficLevel::from_label("Heavy"), TrafficLevel::Heavy);
    assert_eq!(TrafficLevel::from_label(" moderate "), TrafficLevel::Moderate);
    assert_eq!(TrafficLevel::from_label("gridlock"), TrafficLevel::Light);
}

#[test]
fn traffic_from_delay_ratio_test() {
    assert_eq!(TrafficLevel::from_delay_ratio(1.0), TrafficLevel::Light);
    assert_eq!(TrafficLevel::from_delay_ratio(1.2), TrafficLevel::Moderate);
    assert_eq!(TrafficLevel::from_delay_ratio(1.5), TrafficLevel::Heavy);
}
