use chrono::Weekday;
use proptest::prelude::*;

use fareline::entities::{Coordinates, TrafficLevel};
use fareline::pricing::geo::distance_km;
use fareline::pricing::{round_half_up, PricingConfig, PricingRule, SurgeContext, SurgeModel};
use fareline::random::FixedRandom;

fn coordinates() -> impl Strategy<Value = Coordinates> {
    (8.0f64..35.0, 68.0f64..97.0).prop_map(|(lat, lng)| Coordinates { lat, lng })
}

fn traffic() -> impl Strategy<Value = TrafficLevel> {
    prop_oneof![
        Just(TrafficLevel::Light),
        Just(TrafficLevel::Moderate),
        Just(TrafficLevel::Heavy),
    ]
}

fn weekday() -> impl Strategy<Value = Weekday> {
    (0u8..7).prop_map(|d| match d {
        0 => Weekday::Mon,
        1 => Weekday::Tue,
        2 => Weekday::Wed,
        3 => Weekday::Thu,
        4 => Weekday::Fri,
        5 => Weekday::Sat,
        _ => Weekday::Sun,
    })
}

proptest! {
    #[test]
    fn distance_is_symmetric_and_non_negative(a in coordinates(), b in coordinates()) {
        let there = distance_km(a, b);
        let back = distance_km(b, a);

        prop_assert!(there >= 0.0);
        prop_assert!((there - back).abs() < 1e-6);
    }

    #[test]
    fn every_tariff_prices_a_sane_band(
        provider in 0usize..3,
        class in 0usize..4,
        km in 0.0f64..120.0,
        minutes in 0.0f64..240.0,
        surge in 1.0f64..3.0,
        peak in prop_oneof![Just(1.0f64), Just(1.15f64)],
        city in 0.8f64..1.3,
        night in proptest::bool::ANY,
    ) {
        let config = PricingConfig::default();
        let classes = &config.providers[provider].classes;
        let tariff = classes[class % classes.len()].tariff.as_ref().unwrap();
        let rule = PricingRule::new(tariff, night, config.variance);

        let band = rule.price(km, minutes, surge, peak, city);

        prop_assert!(band.min > 0);
        prop_assert!(band.min <= band.max);
        prop_assert!(band.min >= round_half_up(rule.minimum_fare(city)));
    }

    #[test]
    fn fare_never_drops_as_surge_rises(
        km in 0.0f64..80.0,
        minutes in 0.0f64..180.0,
        low in 1.0f64..2.5,
        bump in 0.0f64..1.5,
    ) {
        let config = PricingConfig::default();
        let tariff = config.providers[0].classes[1].tariff.as_ref().unwrap();
        let rule = PricingRule::new(tariff, false, config.variance);

        let calm = rule.fare(km, minutes, low, 1.0, 1.0);
        let busy = rule.fare(km, minutes, low + bump, 1.0, 1.0);

        prop_assert!(busy >= calm);
    }

    #[test]
    fn surge_never_below_floor(
        hour in 0u32..24,
        day in weekday(),
        traffic_level in traffic(),
        km in 0.0f64..60.0,
        weather_event in proptest::bool::ANY,
        jitter in 0.0f64..1.0,
        provider in 0usize..3,
    ) {
        let config = PricingConfig::default();
        let model = SurgeModel::new(&config.surge);
        let ctx = SurgeContext {
            hour_of_day: hour,
            day_of_week: day,
            traffic_level,
            distance_km: km,
            city_surge_factor: 1.0,
            weather_event,
        };

        let surge = model.multiplier(&ctx, &config.providers[provider], &FixedRandom(jitter));

        prop_assert!(surge >= config.surge.floor);
        prop_assert!(model.scaled(surge, 0.9) >= config.surge.floor);
    }
}
