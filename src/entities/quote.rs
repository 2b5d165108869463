use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Fallback tier that produced a quote, in the order they are attempted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Official,
    Market,
    Scrape,
    Static,
}

impl Tier {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Official => "official",
            Self::Market => "market",
            Self::Scrape => "scrape",
            Self::Static => "static",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whole rupees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: u32,
    pub max: u32,
}

impl PriceRange {
    pub fn is_valid(&self) -> bool {
        self.min > 0 && self.min <= self.max
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderAvailability {
    Available,
    Limited,
    Unavailable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RideAvailability {
    High,
    Medium,
    Low,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideOption {
    pub vehicle_class: String,
    pub price_range: PriceRange,
    pub eta_minutes: u32,
    pub surge_active: bool,
    pub surge_multiplier: f64,
    pub rating: f64,
    pub review_count: u32,
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_time_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub night_fare_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<RideAvailability>,
}

impl RideOption {
    pub fn is_valid(&self) -> bool {
        self.price_range.is_valid()
            && (1.0..=5.0).contains(&self.rating)
            && self.surge_multiplier.is_finite()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareQuote {
    pub provider_name: String,
    pub logo: String,
    pub availability: ProviderAvailability,
    pub booking_url: String,
    pub rides: Vec<RideOption>,
    pub source: Tier,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestOption {
    pub provider_name: String,
    #[serde(flatten)]
    pub ride: RideOption,
}

impl BestOption {
    pub fn new(provider_name: &str, ride: &RideOption) -> Self {
        Self {
            provider_name: provider_name.into(),
            ride: ride.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub token: Uuid,
    pub quotes: Vec<FareQuote>,
    pub cheapest: Option<BestOption>,
    pub fastest: Option<BestOption>,
}

impl AggregatedResult {
    pub fn new(
        quotes: Vec<FareQuote>,
        cheapest: Option<BestOption>,
        fastest: Option<BestOption>,
    ) -> Self {
        Self {
            token: Uuid::new_v4(),
            quotes,
            cheapest,
            fastest,
        }
    }
}
