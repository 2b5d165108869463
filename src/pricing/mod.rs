mod config;
mod generator;
mod selector;
mod surge;
mod tables;
mod tariff;

pub mod geo;

use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use std::sync::Arc;

pub use config::{
    CityCenter, CityProfile, CityTier, CityTiers, DiscountOffer, DistanceDamping, HourWindow,
    NightTariff, PeakConfig, PricingConfig, ProviderProfile, SimulationProfile, Span, StaticRate,
    SurgeConfig, Tariff, TierSettings, TierTimeouts, VehicleClass,
};
pub use generator::{ride_eta, ProviderQuoteGenerator};
pub use selector::{select, Selection};
pub use surge::{round_tenth, SurgeContext, SurgeModel};
pub use tariff::{round_half_up, PricingRule};

use crate::entities::{Location, RouteInfo};
use crate::random::RandomSource;

/// Everything known about one search once the route is settled. Each provider
/// pipeline gets its own copy carrying a forked random source.
pub struct QuoteContext {
    pub pickup: Location,
    pub dropoff: Location,
    pub route: RouteInfo,
    pub city: CityProfile,
    pub now: DateTime<FixedOffset>,
    pub weather_event: bool,
    pub config: Arc<PricingConfig>,
    pub random: Arc<dyn RandomSource>,
}

impl QuoteContext {
    pub fn new(
        config: Arc<PricingConfig>,
        random: Arc<dyn RandomSource>,
        pickup: Location,
        dropoff: Location,
        route: RouteInfo,
        now: DateTime<FixedOffset>,
    ) -> Self {
        let city = geo::resolve_city(&config, &pickup).clone();
        let weather_event = SurgeModel::new(&config.surge).roll_weather(random.as_ref());

        Self {
            pickup,
            dropoff,
            route,
            city,
            now,
            weather_event,
            config,
            random,
        }
    }

    /// Same search, different random stream. The weather roll is kept.
    pub fn with_random(&self, random: Arc<dyn RandomSource>) -> Self {
        Self {
            pickup: self.pickup.clone(),
            dropoff: self.dropoff.clone(),
            route: self.route.clone(),
            city: self.city.clone(),
            now: self.now,
            weather_event: self.weather_event,
            config: self.config.clone(),
            random,
        }
    }

    pub fn distance_km(&self) -> f64 {
        self.route.distance_km()
    }

    pub fn duration_minutes(&self) -> f64 {
        self.route.duration_minutes
    }

    pub fn hour(&self) -> u32 {
        self.now.hour()
    }

    pub fn is_night(&self) -> bool {
        self.config.night.contains(self.hour())
    }

    pub fn peak_multiplier(&self) -> f64 {
        let hour = self.hour();

        if self.config.peak.windows.iter().any(|w| w.contains(hour)) {
            self.config.peak.multiplier
        } else {
            1.0
        }
    }

    pub fn tier_settings(&self) -> &TierSettings {
        self.config.tier_settings(self.city.tier)
    }

    pub fn surge_context(&self) -> SurgeContext {
        SurgeContext {
            hour_of_day: self.hour(),
            day_of_week: self.now.weekday(),
            traffic_level: self.route.traffic_level,
            distance_km: self.distance_km(),
            city_surge_factor: self.tier_settings().surge_factor,
            weather_event: self.weather_event,
        }
    }
}
