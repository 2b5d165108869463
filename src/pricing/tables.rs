//! Built-in tables for the Indian market. Rupee amounts are written as
//! rupees and stored as paise.

use super::config::{
    CityCenter, CityProfile, CityTier, CityTiers, DiscountOffer, DistanceDamping, HourWindow,
    NightTariff, PeakConfig, PricingConfig, ProviderProfile, SimulationProfile, Span, StaticRate,
    SurgeConfig, Tariff, TierSettings, TierTimeouts, VehicleClass,
};
use crate::entities::RideAvailability;

const METROS: [&str; 3] = ["mumbai", "delhi", "bangalore"];
const TIER_ONE: [&str; 7] = [
    "mumbai",
    "delhi",
    "bangalore",
    "hyderabad",
    "pune",
    "chennai",
    "kolkata",
];

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            cities: cities(),
            default_city: CityProfile {
                id: "default".into(),
                keywords: vec![],
                center: None,
                multiplier: 0.9,
                tier: CityTier::Other,
            },
            tiers: CityTiers {
                metro: tier_settings(1.1, 1.3, 0.05, 2.0, 1.5),
                major: tier_settings(1.0, 1.1, 0.05, 1.0, 1.0),
                tier2: tier_settings(1.0, 1.1, 0.1, 1.0, 1.0),
                other: tier_settings(1.0, 1.1, 0.15, 1.0, 1.0),
            },
            surge: SurgeConfig {
                peak_windows: vec![HourWindow::new(8, 11), HourWindow::new(17, 21)],
                peak_factor: 1.25,
                shoulder_windows: vec![HourWindow::new(11, 15), HourWindow::new(21, 24)],
                shoulder_factor: 1.1,
                weekend_midday: HourWindow::new(10, 15),
                weekend_midday_factor: 1.15,
                weekend_night: HourWindow::new(19, 3),
                weekend_night_factor: 1.3,
                moderate_traffic_factor: 1.1,
                heavy_traffic_factor: 1.25,
                weather_probability: 0.15,
                weather_factor: 1.4,
                long_trip: vec![
                    DistanceDamping {
                        over_km: 25.0,
                        factor: 0.8,
                    },
                    DistanceDamping {
                        over_km: 15.0,
                        factor: 0.9,
                    },
                ],
                jitter: Span::new(0.95, 1.05),
                floor: 1.0,
            },
            peak: PeakConfig {
                windows: vec![HourWindow::new(8, 11), HourWindow::new(17, 21)],
                multiplier: 1.15,
            },
            night: HourWindow::new(22, 6),
            variance: 0.08,
            timeouts: TierTimeouts {
                official_ms: 1500,
                market_ms: 800,
                scrape_ms: 2500,
                scrape_strategy_ms: 700,
                static_ms: 200,
            },
            providers: vec![uber(), ola(), rapido()],
        }
    }
}

fn rupees(amount: f64) -> u32 {
    (amount * 100.0).round() as u32
}

fn tariff(base: f64, per_km: f64, per_minute: f64, minimum: f64, fee: f64, tax: f64) -> Tariff {
    Tariff {
        base_fare: rupees(base),
        per_km: rupees(per_km),
        per_minute: rupees(per_minute),
        minimum_fare: rupees(minimum),
        booking_fee: rupees(fee),
        tax_rate: tax,
        night: None,
    }
}

fn with_night(mut tariff: Tariff, base: f64, per_km: f64) -> Tariff {
    tariff.night = Some(NightTariff {
        base_fare: rupees(base),
        per_km: rupees(per_km),
    });
    tariff
}

fn static_rate(base: f64, low: f64, high: f64, rating: f64, review_count: u32) -> StaticRate {
    StaticRate {
        base_fare: rupees(base),
        per_km_low: rupees(low),
        per_km_high: rupees(high),
        rating,
        review_count,
    }
}

fn tier_settings(surge: f64, eta: f64, limited: f64, reviews: f64, wait: f64) -> TierSettings {
    TierSettings {
        surge_factor: surge,
        eta_factor: eta,
        limited_probability: limited,
        review_scale: reviews,
        wait_scale: wait,
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn city(
    id: &str,
    keywords: &[&str],
    multiplier: f64,
    tier: CityTier,
    center: Option<(f64, f64, f64)>,
) -> CityProfile {
    CityProfile {
        id: id.into(),
        keywords: strings(keywords),
        center: center.map(|(lat, lng, radius_deg)| CityCenter {
            lat,
            lng,
            radius_deg,
        }),
        multiplier,
        tier,
    }
}

fn cities() -> Vec<CityProfile> {
    use CityTier::*;

    vec![
        city(
            "mumbai",
            &["mumbai", "bombay", "andheri", "bandra", "juhu", "worli", "colaba", "powai"],
            1.3,
            Metro,
            Some((19.076, 72.8777, 0.5)),
        ),
        city(
            "delhi",
            &[
                "delhi",
                "new delhi",
                "connaught",
                "karol bagh",
                "lajpat",
                "dwarka",
                "rohini",
                "gurgaon",
                "gurugram",
                "noida",
                "faridabad",
                "ghaziabad",
            ],
            1.2,
            Metro,
            Some((28.6139, 77.209, 0.5)),
        ),
        city(
            "bangalore",
            &[
                "bangalore",
                "bengaluru",
                "koramangala",
                "whitefield",
                "electronic city",
                "indiranagar",
                "jayanagar",
            ],
            1.25,
            Metro,
            Some((12.9716, 77.5946, 0.3)),
        ),
        city(
            "hyderabad",
            &[
                "hyderabad",
                "secunderabad",
                "hitech city",
                "gachibowli",
                "jubilee hills",
                "banjara hills",
            ],
            1.15,
            Major,
            Some((17.385, 78.4867, 0.3)),
        ),
        city(
            "pune",
            &["pune", "pimpri", "chinchwad", "hinjewadi", "kothrud", "viman nagar"],
            1.1,
            Major,
            Some((18.5204, 73.8567, 0.3)),
        ),
        city(
            "chennai",
            &["chennai", "madras", "anna nagar", "velachery", "tambaram", "adyar"],
            1.15,
            Major,
            Some((13.0827, 80.2707, 0.3)),
        ),
        city(
            "kolkata",
            &["kolkata", "calcutta", "salt lake", "park street", "howrah"],
            1.05,
            Major,
            Some((22.5726, 88.3639, 0.3)),
        ),
        city("ahmedabad", &["ahmedabad", "gandhinagar"], 1.0, Tier2, None),
        city("jaipur", &["jaipur", "pink city"], 0.95, Tier2, None),
        city("surat", &["surat"], 0.9, Tier2, None),
        city("lucknow", &["lucknow"], 0.9, Tier2, None),
        city("kanpur", &["kanpur"], 0.85, Tier2, None),
        city("nagpur", &["nagpur"], 0.9, Tier2, None),
        city("indore", &["indore"], 0.9, Tier2, None),
        city("thane", &["thane"], 1.2, Other, None),
        city("bhopal", &["bhopal"], 0.85, Other, None),
        city("visakhapatnam", &["visakhapatnam", "vizag"], 0.9, Other, None),
        city("patna", &["patna"], 0.8, Other, None),
        city("vadodara", &["vadodara", "baroda"], 0.9, Other, None),
        city("ludhiana", &["ludhiana"], 0.85, Other, None),
        city("agra", &["agra"], 0.8, Other, None),
        city("nashik", &["nashik"], 0.85, Other, None),
        city("meerut", &["meerut"], 0.8, Other, None),
        city("rajkot", &["rajkot"], 0.85, Other, None),
    ]
}

struct ClassRow {
    id: &'static str,
    name: &'static str,
    speed: f64,
    rating: (f64, f64),
    reviews: (f64, f64),
    wait: (f64, f64),
    features: &'static [&'static str],
}

fn class(row: ClassRow, tariff: Tariff, rate: StaticRate) -> VehicleClass {
    VehicleClass {
        id: row.id.into(),
        name: row.name.into(),
        tariff: Some(tariff),
        static_rate: Some(rate),
        speed_factor: row.speed,
        city_scale: 1.0,
        surge_scale: 1.0,
        surge_threshold: 1.0,
        rating: Span::new(row.rating.0, row.rating.1),
        reviews: Span::new(row.reviews.0, row.reviews.1),
        wait_minutes: Span::new(row.wait.0, row.wait.1),
        features: strings(row.features),
        discount: None,
        availability: None,
        only_in: vec![],
    }
}

fn discount(probability: f64, min: f64, max: f64) -> Option<DiscountOffer> {
    Some(DiscountOffer {
        probability,
        percent: Span::new(min, max),
    })
}

fn uber() -> ProviderProfile {
    let mut go = class(
        ClassRow {
            id: "go",
            name: "UberGo",
            speed: 0.8,
            rating: (4.0, 4.5),
            reviews: (500.0, 3000.0),
            wait: (2.0, 8.0),
            features: &["AC", "4 Seats", "GPS Tracking", "Digital Payment"],
        },
        tariff(50.0, 12.0, 2.0, 80.0, 5.0, 0.05),
        static_rate(50.0, 12.0, 15.0, 4.2, 1250),
    );
    go.discount = discount(0.3, 5.0, 20.0);

    let x = class(
        ClassRow {
            id: "x",
            name: "UberX",
            speed: 0.9,
            rating: (4.3, 4.7),
            reviews: (300.0, 2000.0),
            wait: (3.0, 10.0),
            features: &["Premium", "AC", "4 Seats", "Professional Driver"],
        },
        tariff(60.0, 15.0, 2.5, 100.0, 8.0, 0.05),
        static_rate(65.0, 15.6, 19.5, 4.5, 890),
    );

    let mut xl = class(
        ClassRow {
            id: "xl",
            name: "UberXL",
            speed: 1.1,
            rating: (4.2, 4.6),
            reviews: (200.0, 1200.0),
            wait: (4.0, 12.0),
            features: &["SUV", "6 Seats", "Extra Space", "AC"],
        },
        tariff(80.0, 18.0, 3.0, 150.0, 10.0, 0.05),
        static_rate(90.0, 21.6, 27.0, 4.4, 456),
    );
    xl.only_in = strings(&METROS);

    let mut premier = class(
        ClassRow {
            id: "premier",
            name: "Uber Premier",
            speed: 1.0,
            rating: (4.5, 4.9),
            reviews: (150.0, 900.0),
            wait: (5.0, 14.0),
            features: &["Luxury Sedan", "AC", "Top Rated Driver", "Bottled Water"],
        },
        tariff(100.0, 22.0, 3.5, 200.0, 15.0, 0.05),
        static_rate(110.0, 26.4, 33.0, 4.6, 320),
    );
    premier.only_in = strings(&METROS);

    ProviderProfile {
        id: "uber".into(),
        name: "Uber".into(),
        logo: "🚗".into(),
        booking_url: "https://m.uber.com/looking".into(),
        surge_damping: 1.0,
        limited_probability: None,
        simulation: SimulationProfile {
            official_latency_ms: Span::new(80.0, 250.0),
            official_failure_rate: 0.05,
            official_cities: vec![],
            market_latency_ms: Span::new(20.0, 80.0),
            market_failure_rate: 0.05,
            scrape_block_rate: 0.35,
        },
        classes: vec![go, x, xl, premier],
    }
}

fn ola() -> ProviderProfile {
    let mut mini = class(
        ClassRow {
            id: "mini",
            name: "Ola Mini",
            speed: 0.85,
            rating: (3.8, 4.3),
            reviews: (800.0, 5000.0),
            wait: (2.0, 9.0),
            features: &["AC", "4 Seats", "Economy", "Digital Payment"],
        },
        tariff(45.0, 10.0, 1.8, 75.0, 4.0, 0.05),
        static_rate(45.0, 9.0, 11.7, 4.0, 2100),
    );
    mini.discount = discount(0.4, 10.0, 30.0);

    let prime = class(
        ClassRow {
            id: "prime",
            name: "Ola Prime",
            speed: 0.95,
            rating: (4.1, 4.5),
            reviews: (400.0, 3000.0),
            wait: (3.0, 11.0),
            features: &["Premium", "AC", "4 Seats", "Sedan"],
        },
        tariff(55.0, 13.0, 2.2, 95.0, 6.0, 0.05),
        static_rate(60.0, 12.0, 15.6, 4.3, 1680),
    );

    let mut auto = class(
        ClassRow {
            id: "auto",
            name: "Ola Auto",
            speed: 0.7,
            rating: (3.6, 4.1),
            reviews: (1000.0, 6000.0),
            wait: (1.0, 6.0),
            features: &["3 Wheeler", "Open Air", "Quick", "Affordable"],
        },
        tariff(20.0, 7.0, 1.2, 35.0, 2.0, 0.03),
        static_rate(40.0, 6.4, 8.0, 3.9, 3200),
    );
    auto.city_scale = 0.9;
    auto.surge_scale = 0.9;
    auto.surge_threshold = 1.2;

    let mut lux = class(
        ClassRow {
            id: "lux",
            name: "Ola Lux",
            speed: 1.0,
            rating: (4.4, 4.8),
            reviews: (100.0, 800.0),
            wait: (5.0, 15.0),
            features: &["Luxury", "AC", "Premium Sedan", "Professional Driver"],
        },
        tariff(90.0, 20.0, 3.2, 180.0, 12.0, 0.05),
        static_rate(100.0, 20.0, 26.0, 4.5, 380),
    );
    lux.only_in = strings(&METROS);

    ProviderProfile {
        id: "ola".into(),
        name: "Ola".into(),
        logo: "🟢".into(),
        booking_url: "https://book.olacabs.com".into(),
        surge_damping: 0.95,
        limited_probability: None,
        simulation: SimulationProfile {
            official_latency_ms: Span::new(100.0, 300.0),
            official_failure_rate: 0.1,
            official_cities: strings(&TIER_ONE),
            market_latency_ms: Span::new(20.0, 80.0),
            market_failure_rate: 0.05,
            scrape_block_rate: 0.4,
        },
        classes: vec![mini, prime, auto, lux],
    }
}

fn rapido() -> ProviderProfile {
    let mut bike = class(
        ClassRow {
            id: "bike",
            name: "Rapido Bike",
            speed: 0.6,
            rating: (3.9, 4.4),
            reviews: (2000.0, 10000.0),
            wait: (1.0, 5.0),
            features: &["Fast", "Eco-friendly", "Beat Traffic", "Helmet Provided"],
        },
        with_night(tariff(20.0, 15.5, 1.0, 30.0, 2.0, 0.03), 25.0, 18.35),
        static_rate(35.0, 4.2, 5.6, 4.1, 5600),
    );
    bike.city_scale = 0.8;
    bike.discount = discount(0.5, 15.0, 35.0);
    bike.availability = Some(RideAvailability::High);

    let mut auto = class(
        ClassRow {
            id: "auto",
            name: "Rapido Auto",
            speed: 0.75,
            rating: (3.7, 4.2),
            reviews: (800.0, 5000.0),
            wait: (2.0, 7.0),
            features: &["3 Wheeler", "Affordable", "Quick", "Digital Payment"],
        },
        with_night(tariff(30.0, 24.5, 1.3, 45.0, 3.0, 0.03), 35.0, 28.78),
        static_rate(42.5, 7.65, 9.35, 3.8, 2800),
    );
    auto.city_scale = 0.85;
    auto.surge_scale = 0.95;
    auto.surge_threshold = 1.1;
    auto.availability = Some(RideAvailability::Medium);

    let mut cab = class(
        ClassRow {
            id: "cab",
            name: "Rapido Cab",
            speed: 0.9,
            rating: (4.0, 4.4),
            reviews: (300.0, 2000.0),
            wait: (3.0, 9.0),
            features: &["AC", "4 Seats", "Budget Cab", "Digital Payment"],
        },
        with_night(tariff(45.0, 30.0, 1.5, 80.0, 4.0, 0.05), 50.0, 35.42),
        static_rate(55.0, 9.9, 12.1, 4.0, 1400),
    );
    cab.availability = Some(RideAvailability::Low);

    ProviderProfile {
        id: "rapido".into(),
        name: "Rapido".into(),
        logo: "🏍️".into(),
        booking_url: "https://rapido.bike".into(),
        surge_damping: 0.85,
        limited_probability: Some(0.03),
        simulation: SimulationProfile {
            official_latency_ms: Span::new(60.0, 200.0),
            official_failure_rate: 0.08,
            official_cities: vec![],
            market_latency_ms: Span::new(20.0, 80.0),
            market_failure_rate: 0.05,
            scrape_block_rate: 0.25,
        },
        classes: vec![bike, auto, cab],
    }
}

#[test]
fn builtin_tables_validate_test() {
    PricingConfig::default().validate().unwrap();
}

#[test]
fn builtin_providers_test() {
    let config = PricingConfig::default();
    let ids: Vec<&str> = config.providers.iter().map(|p| p.id.as_str()).collect();

    assert_eq!(ids, vec!["uber", "ola", "rapido"]);
    assert_eq!(config.provider("rapido").unwrap().classes.len(), 3);
    assert!(config
        .provider("rapido")
        .unwrap()
        .classes
        .iter()
        .all(|class| class.tariff.as_ref().unwrap().night.is_some()));
}
