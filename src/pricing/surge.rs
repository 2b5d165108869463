use chrono::Weekday;

use super::config::{ProviderProfile, SurgeConfig};
use crate::entities::TrafficLevel;
use crate::random::RandomSource;

/// Demand signals for one search. The weather roll is made once per request
/// so every provider sees the same sky.
#[derive(Clone, Debug)]
pub struct SurgeContext {
    pub hour_of_day: u32,
    pub day_of_week: Weekday,
    pub traffic_level: TrafficLevel,
    pub distance_km: f64,
    pub city_surge_factor: f64,
    pub weather_event: bool,
}

pub struct SurgeModel<'a> {
    config: &'a SurgeConfig,
}

impl<'a> SurgeModel<'a> {
    pub fn new(config: &'a SurgeConfig) -> Self {
        Self { config }
    }

    pub fn roll_weather(&self, random: &dyn RandomSource) -> bool {
        random.chance(self.config.weather_probability)
    }

    /// Shared multiplier before provider damping and jitter.
    pub fn base_multiplier(&self, ctx: &SurgeContext) -> f64 {
        let config = self.config;
        let hour = ctx.hour_of_day;
        let mut multiplier = 1.0;

        if config.peak_windows.iter().any(|w| w.contains(hour)) {
            multiplier *= config.peak_factor;
        } else if config.shoulder_windows.iter().any(|w| w.contains(hour)) {
            multiplier *= config.shoulder_factor;
        }

        if is_weekend(ctx.day_of_week) {
            if config.weekend_midday.contains(hour) {
                multiplier *= config.weekend_midday_factor;
            }
            if config.weekend_night.contains(hour) {
                multiplier *= config.weekend_night_factor;
            }
        }

        multiplier *= match ctx.traffic_level {
            TrafficLevel::Heavy => config.heavy_traffic_factor,
            TrafficLevel::Moderate => config.moderate_traffic_factor,
            TrafficLevel::Light => 1.0,
        };

        multiplier *= ctx.city_surge_factor;

        if ctx.weather_event {
            multiplier *= config.weather_factor;
        }

        if let Some(damping) = config
            .long_trip
            .iter()
            .find(|damping| ctx.distance_km > damping.over_km)
        {
            multiplier *= damping.factor;
        }

        multiplier
    }

    #[tracing::instrument(level = "debug", skip_all, fields(provider = %provider.id))]
    pub fn multiplier(
        &self,
        ctx: &SurgeContext,
        provider: &ProviderProfile,
        random: &dyn RandomSource,
    ) -> f64 {
        let jitter = self.config.jitter.sample(random);
        let raw = self.base_multiplier(ctx) * provider.surge_damping * jitter;
        let surge = round_tenth(raw).max(self.config.floor);

        tracing::debug!(raw, surge, "surge computed");

        surge
    }

    /// Applies a vehicle class's surge scale without dropping below the floor.
    pub fn scaled(&self, surge: f64, scale: f64) -> f64 {
        round_tenth(surge * scale).max(self.config.floor)
    }
}

pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PricingConfig;
    use crate::random::FixedRandom;

    fn context(hour: u32, day: Weekday, traffic: TrafficLevel, km: f64) -> SurgeContext {
        SurgeContext {
            hour_of_day: hour,
            day_of_week: day,
            traffic_level: traffic,
            distance_km: km,
            city_surge_factor: 1.1,
            weather_event: false,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn quiet_night_stays_at_floor() {
        let config = PricingConfig::default();
        let model = SurgeModel::new(&config.surge);
        let rapido = config.provider("rapido").unwrap();

        let mut ctx = context(3, Weekday::Wed, TrafficLevel::Light, 4.0);
        ctx.city_surge_factor = 1.0;

        assert_eq!(model.multiplier(&ctx, rapido, &FixedRandom(0.5)), 1.0);
    }

    #[test]
    fn peak_heavy_traffic_in_metro() {
        let config = PricingConfig::default();
        let model = SurgeModel::new(&config.surge);
        let uber = config.provider("uber").unwrap();

        let ctx = context(9, Weekday::Wed, TrafficLevel::Heavy, 5.0);
        assert!(close(model.multiplier(&ctx, uber, &FixedRandom(0.5)), 1.7));

        let stormy = SurgeContext {
            weather_event: true,
            ..ctx
        };
        assert!(close(model.multiplier(&stormy, uber, &FixedRandom(0.5)), 2.4));
    }

    #[test]
    fn long_trips_are_dampened() {
        let config = PricingConfig::default();
        let model = SurgeModel::new(&config.surge);
        let uber = config.provider("uber").unwrap();

        let medium = context(9, Weekday::Wed, TrafficLevel::Heavy, 20.0);
        assert!(close(model.multiplier(&medium, uber, &FixedRandom(0.5)), 1.5));

        let long = context(9, Weekday::Wed, TrafficLevel::Heavy, 30.0);
        assert!(close(model.multiplier(&long, uber, &FixedRandom(0.5)), 1.4));
    }

    #[test]
    fn weekend_midday_surges_more_than_weekday() {
        let config = PricingConfig::default();
        let model = SurgeModel::new(&config.surge);

        let weekday = context(12, Weekday::Wed, TrafficLevel::Light, 5.0);
        let saturday = context(12, Weekday::Sat, TrafficLevel::Light, 5.0);

        assert!(model.base_multiplier(&saturday) > model.base_multiplier(&weekday));
    }

    #[test]
    fn never_below_floor() {
        let config = PricingConfig::default();
        let model = SurgeModel::new(&config.surge);
        let days = [Weekday::Mon, Weekday::Fri, Weekday::Sat, Weekday::Sun];

        for provider in config.providers.iter() {
            for day in days {
                for hour in 0..24 {
                    let ctx = context(hour, day, TrafficLevel::Light, 40.0);
                    let surge = model.multiplier(&ctx, provider, &FixedRandom(0.0));

                    assert!(surge >= config.surge.floor, "{} at {}h", provider.id, hour);
                    assert!(model.scaled(surge, 0.9) >= config.surge.floor);
                }
            }
        }
    }

    #[test]
    fn weather_roll_uses_probability() {
        let config = PricingConfig::default();
        let model = SurgeModel::new(&config.surge);

        assert!(model.roll_weather(&FixedRandom(0.1)));
        assert!(!model.roll_weather(&FixedRandom(0.5)));
    }
}
