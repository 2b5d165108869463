use serde::{Deserialize, Serialize};

use crate::entities::{Location, RouteInfo, TrafficLevel};
use crate::error::{invalid_coordinates_error, invalid_input_error, missing_location_error, Error};
use crate::pricing::geo::AVERAGE_CITY_SPEED_KMH;

/// Longest trip priced, in metres.
const MAX_DISTANCE_METERS: f64 = 1_000_000.0;

/// Longest trip priced, in minutes.
const MAX_DURATION_MINUTES: f64 = 24.0 * 60.0;

/// Fare comparison input as it arrives over HTTP. Everything is optional
/// until `validate` has run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareRequest {
    pub pickup: Option<Location>,
    pub dropoff: Option<Location>,
    /// Metres.
    #[serde(default)]
    pub distance: Option<f64>,
    /// Minutes.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub traffic: Option<String>,
}

/// A request that passed validation. `route` is set when the caller
/// supplied its own distance.
#[derive(Clone, Debug)]
pub struct Search {
    pub pickup: Location,
    pub dropoff: Location,
    pub route: Option<RouteInfo>,
}

impl FareRequest {
    pub fn new(pickup: Location, dropoff: Location) -> Self {
        Self {
            pickup: Some(pickup),
            dropoff: Some(dropoff),
            ..Default::default()
        }
    }

    pub fn with_route(mut self, route: &RouteInfo) -> Self {
        self.distance = Some(route.distance_meters);
        self.duration = Some(route.duration_minutes);
        self.traffic = Some(format!("{:?}", route.traffic_level));
        self
    }

    pub fn validate(self) -> Result<Search, Error> {
        let (pickup, dropoff) = match (self.pickup, self.dropoff) {
            (Some(pickup), Some(dropoff)) => (pickup, dropoff),
            _ => return Err(missing_location_error()),
        };

        if !pickup.has_valid_coordinates() || !dropoff.has_valid_coordinates() {
            return Err(invalid_coordinates_error());
        }

        let bounded = [
            (self.distance, MAX_DISTANCE_METERS),
            (self.duration, MAX_DURATION_MINUTES),
        ];
        for (value, max) in bounded {
            match value {
                Some(value) if !value.is_finite() || value < 0.0 || value > max => {
                    return Err(invalid_input_error());
                }
                _ => {}
            }
        }

        let traffic = self
            .traffic
            .as_deref()
            .map(TrafficLevel::from_label)
            .unwrap_or_default();

        let route = self.distance.map(|distance_meters| {
            let duration_minutes = self
                .duration
                .unwrap_or(distance_meters / 1000.0 / AVERAGE_CITY_SPEED_KMH * 60.0);

            RouteInfo::new(distance_meters, duration_minutes, traffic)
        });

        Ok(Search {
            pickup,
            dropoff,
            route,
        })
    }
}

#[test]
fn validate_requires_both_locations_test() {
    let request = FareRequest {
        pickup: Some(Location::new("Connaught Place, Delhi", 28.6315, 77.2167)),
        ..Default::default()
    };

    assert_eq!(request.validate().unwrap_err().code, 102);
}

#[test]
fn validate_rejects_out_of_range_coordinates_test() {
    let request = FareRequest::new(
        Location::new("nowhere", 91.0, 0.0),
        Location::new("Delhi", 28.6, 77.2),
    );

    assert_eq!(request.validate().unwrap_err().code, 103);
}

#[test]
fn validate_rejects_negative_distance_test() {
    let mut request = FareRequest::new(
        Location::new("Delhi", 28.6139, 77.209),
        Location::new("Delhi", 28.7041, 77.1025),
    );
    request.distance = Some(-5.0);

    assert_eq!(request.validate().unwrap_err().code, 101);
}

#[test]
fn validate_fills_missing_duration_test() {
    let mut request = FareRequest::new(
        Location::new("Delhi", 28.6139, 77.209),
        Location::new("Delhi", 28.7041, 77.1025),
    );
    request.distance = Some(12_500.0);
    request.traffic = Some("Heavy".into());

    let route = request.validate().unwrap().route.unwrap();
    assert_eq!(route.duration_minutes, 30.0);
    assert_eq!(route.traffic_level, TrafficLevel::Heavy);
}

#[test]
fn validate_rejects_implausible_trip_test() {
    let mut request = FareRequest::new(
        Location::new("Delhi", 28.6139, 77.209),
        Location::new("Delhi", 28.7041, 77.1025),
    );
    request.distance = Some(13_900.0);
    request.duration = Some(1e8);

    assert_eq!(request.clone().validate().unwrap_err().code, 101);

    request.duration = Some(45.0);
    request.distance = Some(5e7);
    assert_eq!(request.validate().unwrap_err().code, 101);
}
