use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use fareline::api::FareAPI;
use fareline::clock::FixedClock;
use fareline::engine::{Engine, ProviderPipeline};
use fareline::entities::{FareRequest, Location, RouteInfo, Tier, TrafficLevel};
use fareline::error::ProviderError;
use fareline::pricing::{round_half_up, PricingConfig, ProviderProfile, QuoteContext};
use fareline::providers::{FareSource, MarketSource, ProviderRawResponse};
use fareline::random::{FixedRandom, SeededRandom};

struct FailingSource {
    tier: Tier,
    calls: Arc<AtomicUsize>,
}

impl FailingSource {
    fn new(tier: Tier) -> Self {
        Self {
            tier,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl FareSource for FailingSource {
    fn tier(&self) -> Tier {
        self.tier
    }

    async fn fetch(
        &self,
        _provider: &ProviderProfile,
        _ctx: &QuoteContext,
    ) -> Result<ProviderRawResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ProviderError::Upstream("service unavailable".into()))
    }
}

/// Wednesday 10 January 2024, 13:00 IST.
fn wednesday_afternoon() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(330 * 60)
        .unwrap()
        .with_ymd_and_hms(2024, 1, 10, 13, 0, 0)
        .unwrap()
}

fn profile(config: &PricingConfig, id: &str) -> Arc<ProviderProfile> {
    Arc::new(config.provider(id).unwrap().clone())
}

fn engine() -> Engine {
    Engine::builder(PricingConfig::default())
        .clock(FixedClock(wednesday_afternoon()))
        .random(FixedRandom(0.5))
        .build()
}

fn delhi_request() -> FareRequest {
    FareRequest::new(
        Location::new("Connaught Place, New Delhi", 28.6139, 77.209),
        Location::new("Rohini, Delhi", 28.7041, 77.1025),
    )
}

#[tokio::test]
async fn compares_every_provider_in_delhi() {
    let config = PricingConfig::default();
    let result = engine().compare_fares(delhi_request()).await.unwrap();

    let names: Vec<&str> = result
        .quotes
        .iter()
        .map(|q| q.provider_name.as_str())
        .collect();
    assert_eq!(names, vec!["Ola", "Rapido", "Uber"]);

    let delhi = config.city("delhi");
    for quote in result.quotes.iter() {
        assert_eq!(quote.source, Tier::Official);
        assert!(!quote.rides.is_empty());

        let provider = config
            .providers
            .iter()
            .find(|p| p.name == quote.provider_name)
            .unwrap();

        for ride in quote.rides.iter() {
            let class = provider
                .classes
                .iter()
                .find(|c| c.name == ride.vehicle_class)
                .unwrap();
            let minimum = class.tariff.as_ref().unwrap().minimum_fare as f64 / 100.0;

            assert!(ride.price_range.min <= ride.price_range.max);
            assert!(
                ride.price_range.min >= round_half_up(minimum * delhi.multiplier * class.city_scale)
            );
            assert!(ride.surge_multiplier >= 1.0);
            assert!((1.0..=5.0).contains(&ride.rating));
        }
    }

    let cheapest = result.cheapest.unwrap();
    let lowest = result
        .quotes
        .iter()
        .flat_map(|q| q.rides.iter())
        .map(|r| r.price_range.min)
        .min()
        .unwrap();
    assert_eq!(cheapest.ride.price_range.min, lowest);
    assert!(result.fastest.is_some());
}

#[tokio::test]
async fn identical_points_price_at_the_minimum_fare() {
    let config = PricingConfig::default();
    let spot = Location::new("Connaught Place, New Delhi", 28.6139, 77.209);
    let request = FareRequest::new(spot.clone(), spot);

    let result = engine().compare_fares(request).await.unwrap();
    let delhi = config.city("delhi");

    assert_eq!(result.quotes.len(), 3);
    for quote in result.quotes.iter() {
        let provider = config
            .providers
            .iter()
            .find(|p| p.name == quote.provider_name)
            .unwrap();

        for ride in quote.rides.iter() {
            let class = provider
                .classes
                .iter()
                .find(|c| c.name == ride.vehicle_class)
                .unwrap();
            let minimum = class.tariff.as_ref().unwrap().minimum_fare as f64 / 100.0;

            assert_eq!(
                ride.price_range.min,
                round_half_up(minimum * delhi.multiplier * class.city_scale),
                "{}",
                ride.vehicle_class
            );
        }
    }
}

#[tokio::test]
async fn caller_supplied_route_skips_resolution() {
    let route = RouteInfo::new(22_000.0, 55.0, TrafficLevel::Heavy);
    let request = delhi_request().with_route(&route);

    let result = engine().compare_fares(request).await.unwrap();
    let short = engine().compare_fares(delhi_request()).await.unwrap();

    let fare = |r: &fareline::entities::AggregatedResult| {
        r.quotes
            .iter()
            .find(|q| q.provider_name == "Uber")
            .unwrap()
            .rides[0]
            .price_range
            .max
    };
    assert!(fare(&result) > fare(&short));
}

#[tokio::test]
async fn failing_provider_is_left_out() {
    let config = PricingConfig::default();
    let pipelines = vec![
        ProviderPipeline::standard(profile(&config, "uber")),
        ProviderPipeline::new(
            profile(&config, "ola"),
            vec![
                Box::new(FailingSource::new(Tier::Official)),
                Box::new(FailingSource::new(Tier::Static)),
            ],
        ),
        ProviderPipeline::standard(profile(&config, "rapido")),
    ];
    let engine = Engine::builder(config)
        .clock(FixedClock(wednesday_afternoon()))
        .random(FixedRandom(0.5))
        .pipelines(pipelines)
        .build();

    let result = engine.compare_fares(delhi_request()).await.unwrap();

    let names: Vec<&str> = result
        .quotes
        .iter()
        .map(|q| q.provider_name.as_str())
        .collect();
    assert_eq!(names, vec!["Rapido", "Uber"]);
    assert!(result.cheapest.is_some());
    assert!(result.fastest.is_some());
}

#[tokio::test]
async fn every_provider_failing_yields_empty_result() {
    let config = PricingConfig::default();
    let pipelines = config
        .providers
        .iter()
        .map(|p| {
            ProviderPipeline::new(
                Arc::new(p.clone()),
                vec![Box::new(FailingSource::new(Tier::Official)) as Box<dyn FareSource>],
            )
        })
        .collect();
    let engine = Engine::builder(config)
        .clock(FixedClock(wednesday_afternoon()))
        .random(FixedRandom(0.5))
        .pipelines(pipelines)
        .build();

    let result = engine.compare_fares(delhi_request()).await.unwrap();

    assert!(result.quotes.is_empty());
    assert!(result.cheapest.is_none());
    assert!(result.fastest.is_none());
}

#[tokio::test]
async fn invalid_request_never_reaches_providers() {
    let config = PricingConfig::default();
    let source = FailingSource::new(Tier::Official);
    let calls = source.calls.clone();
    let engine = Engine::builder(config.clone())
        .pipelines(vec![ProviderPipeline::new(
            profile(&config, "uber"),
            vec![Box::new(source)],
        )])
        .build();

    let missing = FareRequest {
        pickup: Some(Location::new("Andheri, Mumbai", 19.1136, 72.8697)),
        ..Default::default()
    };
    assert_eq!(engine.compare_fares(missing).await.unwrap_err().code, 102);

    let out_of_range = FareRequest::new(
        Location::new("Andheri, Mumbai", 19.1136, 72.8697),
        Location::new("Bandra, Mumbai", -95.0, 72.8295),
    );
    assert_eq!(engine.compare_fares(out_of_range).await.unwrap_err().code, 103);

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn implausible_trip_is_rejected() {
    let mut request = delhi_request();
    request.distance = Some(13_900.0);
    request.duration = Some(1e8);

    let err = engine().compare_fares(request).await.unwrap_err();

    assert_eq!(err.code, 101);
}

#[tokio::test]
async fn seeded_runs_replay_exactly() {
    let seeded = || {
        Engine::builder(PricingConfig::default())
            .clock(FixedClock(wednesday_afternoon()))
            .random(SeededRandom::new(7))
            .build()
    };

    let first = seeded().compare_fares(delhi_request()).await.unwrap();
    let second = seeded().compare_fares(delhi_request()).await.unwrap();

    assert!(!first.quotes.is_empty());
    assert_eq!(first.quotes, second.quotes);
}

#[tokio::test]
async fn official_outage_degrades_to_market() {
    let config = PricingConfig::default();
    let pipelines = vec![ProviderPipeline::new(
        profile(&config, "uber"),
        vec![
            Box::new(FailingSource::new(Tier::Official)),
            Box::new(MarketSource),
        ],
    )];
    let engine = Engine::builder(config)
        .clock(FixedClock(wednesday_afternoon()))
        .random(FixedRandom(0.5))
        .pipelines(pipelines)
        .build();

    let result = engine.compare_fares(delhi_request()).await.unwrap();

    assert_eq!(result.quotes.len(), 1);
    assert_eq!(result.quotes[0].source, Tier::Market);
    assert_eq!(result.quotes[0].rides.len(), 4);
}
