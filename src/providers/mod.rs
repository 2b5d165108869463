mod fallback;
mod market;
mod normalize;
mod official;
mod scrape;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use fallback::StaticRateSource;
pub use market::MarketSource;
pub use normalize::normalize;
pub use official::OfficialSource;
pub use scrape::{
    extract_html_fares, AggregatorStrategy, HtmlPatternStrategy, PageFetcher, PageFormat,
    ScrapeKind, ScrapeSource, ScrapeStrategy, SimulatedPages, StructuredApiStrategy,
};

use crate::entities::{RideAvailability, Tier};
use crate::error::ProviderError;
use crate::pricing::{ProviderProfile, QuoteContext, Span};
use crate::random::RandomSource;

/// One tier of a provider's fallback chain.
#[async_trait]
pub trait FareSource: Send + Sync {
    fn tier(&self) -> Tier;

    async fn fetch(
        &self,
        provider: &ProviderProfile,
        ctx: &QuoteContext,
    ) -> Result<ProviderRawResponse, ProviderError>;
}

/// What a tier hands back before normalization. Each shape has its own
/// normalizer.
#[derive(Clone, Debug)]
pub enum ProviderRawResponse {
    Official(OfficialEstimate),
    Market(MarketEstimate),
    Scrape(ScrapedListing),
}

/// Shaped after a provider's price-estimates endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OfficialEstimate {
    pub availability: String,
    pub currency_code: String,
    pub products: Vec<OfficialProduct>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OfficialProduct {
    pub product_id: String,
    pub display_name: String,
    pub low_estimate: f64,
    pub high_estimate: f64,
    pub eta_seconds: u32,
    pub surge_multiplier: f64,
    pub surge_active: bool,
    pub rating: f64,
    pub review_count: u32,
    pub features: Vec<String>,
    pub wait_time_minutes: Option<u32>,
    pub discount_percent: Option<u32>,
    pub night_fare_active: Option<bool>,
    pub availability: Option<RideAvailability>,
}

/// Market-model output: prices and ETAs only. Ratings and features come
/// from the vehicle class tables during normalization.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarketEstimate {
    pub limited: bool,
    pub fares: Vec<MarketFare>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarketFare {
    pub class_id: String,
    pub low: u32,
    pub high: u32,
    pub eta_minutes: u32,
    pub surge_multiplier: f64,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u32>,
}

#[derive(Clone, Debug)]
pub struct ScrapedListing {
    pub strategy: ScrapeKind,
    pub fares: Vec<ScrapedFare>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScrapedFare {
    pub label: String,
    pub min: u32,
    pub max: u32,
    pub eta_minutes: Option<u32>,
}

/// Sleeps for a simulated upstream round trip.
async fn simulate_latency(latency_ms: Span, random: &dyn RandomSource) {
    let millis = latency_ms.sample(random).max(0.0) as u64;
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

/// The standard chain: official, market, scrape, then the static rate card.
pub fn standard_sources() -> Vec<Box<dyn FareSource>> {
    vec![
        Box::new(OfficialSource),
        Box::new(MarketSource),
        Box::new(ScrapeSource::standard()),
        Box::new(StaticRateSource),
    ]
}
