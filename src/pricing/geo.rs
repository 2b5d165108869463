use geo_types::Point;

use super::config::{CityProfile, PricingConfig};
use crate::entities::{Coordinates, Location, RouteInfo, TrafficLevel};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Average speed assumed when no live routing data is available.
pub const AVERAGE_CITY_SPEED_KMH: f64 = 25.0;

/// In-traffic slowdown applied to the geometric estimate.
const ESTIMATED_TRAFFIC_DELAY: f64 = 1.2;

/// Great-circle distance between two points, in kilometres.
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    if a == b {
        return 0.0;
    }

    let a: Point<f64> = a.into();
    let b: Point<f64> = b.into();

    let lat_a = a.y().to_radians();
    let lat_b = b.y().to_radians();
    let delta_lat = (b.y() - a.y()).to_radians();
    let delta_lng = (b.x() - a.x()).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (delta_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

pub fn eta_minutes(distance_km: f64, speed_kmh: f64) -> f64 {
    if speed_kmh <= 0.0 {
        return 0.0;
    }

    distance_km / speed_kmh * 60.0
}

/// Case-insensitive keyword match over the ordered city table.
pub fn detect_city<'a>(config: &'a PricingConfig, address: &str) -> Option<&'a CityProfile> {
    let address = address.to_lowercase();

    config.cities.iter().find(|city| {
        city.keywords
            .iter()
            .any(|keyword| address.contains(keyword.as_str()))
    })
}

pub fn detect_city_from_coordinates<'a>(
    config: &'a PricingConfig,
    coordinates: Coordinates,
) -> Option<&'a CityProfile> {
    config.cities.iter().find(|city| match city.center {
        Some(center) => {
            (coordinates.lat - center.lat).abs() < center.radius_deg
                && (coordinates.lng - center.lng).abs() < center.radius_deg
        }
        None => false,
    })
}

/// Address text first, then coordinates, then the default profile.
pub fn resolve_city<'a>(config: &'a PricingConfig, location: &Location) -> &'a CityProfile {
    detect_city(config, &location.address)
        .or_else(|| detect_city_from_coordinates(config, location.coordinates()))
        .unwrap_or(&config.default_city)
}

pub fn city_multiplier(config: &PricingConfig, city: &str) -> f64 {
    config.city(city).multiplier
}

/// Straight-line route at average city speed, for when live routing is
/// unavailable.
#[derive(Clone, Copy, Debug, Default)]
pub struct GeometricRouteEstimator;

impl GeometricRouteEstimator {
    pub fn estimate(&self, pickup: &Location, dropoff: &Location) -> RouteInfo {
        let distance_km = distance_km(pickup.coordinates(), dropoff.coordinates());
        let free_flow = eta_minutes(distance_km, AVERAGE_CITY_SPEED_KMH);
        let in_traffic = free_flow * ESTIMATED_TRAFFIC_DELAY;

        let traffic_level = if free_flow > 0.0 {
            TrafficLevel::from_delay_ratio(in_traffic / free_flow)
        } else {
            TrafficLevel::Light
        };

        RouteInfo::new(distance_km * 1000.0, in_traffic.round(), traffic_level)
    }
}

#[test]
fn distance_is_symmetric_test() {
    let connaught = Coordinates {
        lat: 28.6139,
        lng: 77.209,
    };
    let rohini = Coordinates {
        lat: 28.7041,
        lng: 77.1025,
    };

    let there = distance_km(connaught, rohini);
    let back = distance_km(rohini, connaught);

    assert!((there - back).abs() < 1e-9);
    assert!(there > 13.0 && there < 16.0, "got {}", there);
    assert_eq!(distance_km(connaught, connaught), 0.0);
}

#[test]
fn detect_city_keywords_test() {
    let config = PricingConfig::default();

    let city = detect_city(&config, "DLF Cyber City, Gurugram, Haryana").unwrap();
    assert_eq!(city.id, "delhi");

    let city = detect_city(&config, "Koramangala 5th Block").unwrap();
    assert_eq!(city.id, "bangalore");

    assert!(detect_city(&config, "Shimla Mall Road").is_none());
}

#[test]
fn resolve_city_falls_back_to_coordinates_test() {
    let config = PricingConfig::default();

    let pin = Location::new("Dropped pin", 19.1, 72.9);
    assert_eq!(resolve_city(&config, &pin).id, "mumbai");

    let remote = Location::new("Dropped pin", 31.1, 77.17);
    assert_eq!(resolve_city(&config, &remote).id, "default");
}

#[test]
fn city_multiplier_default_test() {
    let config = PricingConfig::default();

    assert_eq!(city_multiplier(&config, "mumbai"), 1.3);
    assert_eq!(city_multiplier(&config, "shimla"), 0.9);
}

#[test]
fn geometric_estimate_test() {
    let pickup = Location::new("Delhi", 28.6139, 77.209);
    let dropoff = Location::new("Delhi", 28.7041, 77.1025);

    let route = GeometricRouteEstimator.estimate(&pickup, &dropoff);
    assert_eq!(route.traffic_level, TrafficLevel::Moderate);
    assert!(route.duration_minutes > 38.0 && route.duration_minutes < 45.0);

    let still = GeometricRouteEstimator.estimate(&pickup, &pickup);
    assert_eq!(still.distance_meters, 0.0);
    assert_eq!(still.duration_minutes, 0.0);
    assert_eq!(still.traffic_level, TrafficLevel::Light);
}
