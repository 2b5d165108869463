use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use tokio::time;

use super::{simulate_latency, FareSource, ProviderRawResponse, ScrapedFare, ScrapedListing};
use crate::entities::{RideOption, Tier};
use crate::error::ProviderError;
use crate::pricing::{PricingRule, ProviderProfile, ProviderQuoteGenerator, QuoteContext};

const FARE_CARD_PATTERN: &str = r#"(?s)data-product="([^"]+)".*?<span class="eta">(\d+) min</span>.*?₹\s*([\d,]+)(?:\s*-\s*₹\s*([\d,]+))?"#;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeKind {
    StructuredApi,
    HtmlPattern,
    Aggregator,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageFormat {
    Json,
    Html,
}

/// Where scrape strategies get their pages from.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(
        &self,
        provider: &ProviderProfile,
        ctx: &QuoteContext,
        format: PageFormat,
    ) -> Result<String, ProviderError>;
}

/// Renders the provider's web pages from the pricing model. Blocks at the
/// provider's configured rate.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimulatedPages;

#[async_trait]
impl PageFetcher for SimulatedPages {
    async fn fetch_page(
        &self,
        provider: &ProviderProfile,
        ctx: &QuoteContext,
        format: PageFormat,
    ) -> Result<String, ProviderError> {
        if ctx.random.chance(provider.simulation.scrape_block_rate) {
            return Err(ProviderError::Blocked);
        }

        simulate_latency(provider.simulation.market_latency_ms, ctx.random.as_ref()).await;

        let rides = ProviderQuoteGenerator::new(provider)
            .generate(ctx, Tier::Scrape)
            .rides;

        match format {
            PageFormat::Json => render_json(&rides),
            PageFormat::Html => Ok(render_html(&rides)),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct FarePage {
    fares: Vec<FareEntry>,
}

#[derive(Serialize, Deserialize)]
struct FareEntry {
    name: String,
    fare: FareBand,
    #[serde(default)]
    eta: Option<f64>,
}

#[derive(Serialize, Deserialize)]
struct FareBand {
    min: f64,
    max: f64,
}

fn render_json(rides: &[RideOption]) -> Result<String, ProviderError> {
    let page = FarePage {
        fares: rides
            .iter()
            .map(|ride| FareEntry {
                name: ride.vehicle_class.clone(),
                fare: FareBand {
                    min: ride.price_range.min as f64,
                    max: ride.price_range.max as f64,
                },
                eta: Some(ride.eta_minutes as f64),
            })
            .collect(),
    };

    serde_json::to_string(&page).map_err(|e| ProviderError::Malformed(e.to_string()))
}

fn render_html(rides: &[RideOption]) -> String {
    let cards: String = rides
        .iter()
        .map(|ride| {
            format!(
                r#"<div class="ride-card" data-product="{name}"><h3>{name}</h3><span class="eta">{eta} min</span><span class="fare">₹{min} - ₹{max}</span></div>"#,
                name = ride.vehicle_class,
                eta = ride.eta_minutes,
                min = group_thousands(ride.price_range.min),
                max = group_thousands(ride.price_range.max),
            )
        })
        .collect();

    format!("<html><body><section class=\"fares\">{}</section></body></html>", cards)
}

fn group_thousands(amount: u32) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    grouped
}

/// Pulls fare cards out of a rendered page. A card with a single price
/// gets a zero-width band.
pub fn extract_html_fares(html: &str) -> Result<Vec<ScrapedFare>, ProviderError> {
    static FARE_CARD: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

    let pattern = FARE_CARD
        .get_or_init(|| Regex::new(FARE_CARD_PATTERN))
        .as_ref()
        .map_err(|e| ProviderError::Malformed(e.to_string()))?;

    let amount = |raw: &str| -> Result<u32, ProviderError> {
        raw.replace(',', "")
            .parse()
            .map_err(|_| ProviderError::Malformed(format!("bad amount {:?}", raw)))
    };

    let mut fares = Vec::new();
    for caps in pattern.captures_iter(html) {
        let min = amount(&caps[3])?;
        let max = match caps.get(4) {
            Some(m) => amount(m.as_str())?,
            None => min,
        };

        fares.push(ScrapedFare {
            label: caps[1].to_string(),
            min,
            max,
            eta_minutes: caps[2].parse().ok(),
        });
    }

    Ok(fares)
}

/// One way of getting fares off a provider's web surface.
#[async_trait]
pub trait ScrapeStrategy: Send + Sync {
    fn kind(&self) -> ScrapeKind;

    async fn scrape(
        &self,
        provider: &ProviderProfile,
        ctx: &QuoteContext,
    ) -> Result<Vec<ScrapedFare>, ProviderError>;
}

/// Reads the JSON the provider's web app loads its fare cards from.
pub struct StructuredApiStrategy {
    fetcher: Arc<dyn PageFetcher>,
}

impl StructuredApiStrategy {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl ScrapeStrategy for StructuredApiStrategy {
    fn kind(&self) -> ScrapeKind {
        ScrapeKind::StructuredApi
    }

    async fn scrape(
        &self,
        provider: &ProviderProfile,
        ctx: &QuoteContext,
    ) -> Result<Vec<ScrapedFare>, ProviderError> {
        let body = self
            .fetcher
            .fetch_page(provider, ctx, PageFormat::Json)
            .await?;
        let page: FarePage =
            serde_json::from_str(&body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

        Ok(page
            .fares
            .into_iter()
            .map(|entry| ScrapedFare {
                label: entry.name,
                min: entry.fare.min.max(0.0).round() as u32,
                max: entry.fare.max.max(0.0).round() as u32,
                eta_minutes: entry.eta.map(|eta| eta.max(0.0).round() as u32),
            })
            .collect())
    }
}

/// Pattern-matches rupee amounts out of the booking page markup.
pub struct HtmlPatternStrategy {
    fetcher: Arc<dyn PageFetcher>,
}

impl HtmlPatternStrategy {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl ScrapeStrategy for HtmlPatternStrategy {
    fn kind(&self) -> ScrapeKind {
        ScrapeKind::HtmlPattern
    }

    async fn scrape(
        &self,
        provider: &ProviderProfile,
        ctx: &QuoteContext,
    ) -> Result<Vec<ScrapedFare>, ProviderError> {
        let body = self
            .fetcher
            .fetch_page(provider, ctx, PageFormat::Html)
            .await?;

        extract_html_fares(&body)
    }
}

/// Third-party comparison listings: published tariffs, no surge and no ETA.
#[derive(Clone, Copy, Debug, Default)]
pub struct AggregatorStrategy;

#[async_trait]
impl ScrapeStrategy for AggregatorStrategy {
    fn kind(&self) -> ScrapeKind {
        ScrapeKind::Aggregator
    }

    async fn scrape(
        &self,
        provider: &ProviderProfile,
        ctx: &QuoteContext,
    ) -> Result<Vec<ScrapedFare>, ProviderError> {
        let floor = ctx.config.surge.floor;

        Ok(provider
            .classes
            .iter()
            .filter(|class| class.offered_in(&ctx.city.id))
            .filter_map(|class| class.tariff.as_ref().map(|tariff| (class, tariff)))
            .map(|(class, tariff)| {
                let band = PricingRule::new(tariff, ctx.is_night(), ctx.config.variance).price(
                    ctx.distance_km(),
                    ctx.duration_minutes(),
                    floor,
                    ctx.peak_multiplier(),
                    ctx.city.multiplier * class.city_scale,
                );

                ScrapedFare {
                    label: class.name.clone(),
                    min: band.min,
                    max: band.max,
                    eta_minutes: None,
                }
            })
            .collect())
    }
}

/// Tries each strategy in order under its own time budget. The first
/// non-empty listing wins.
pub struct ScrapeSource {
    strategies: Vec<Box<dyn ScrapeStrategy>>,
}

impl ScrapeSource {
    pub fn new(strategies: Vec<Box<dyn ScrapeStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn standard() -> Self {
        let pages: Arc<dyn PageFetcher> = Arc::new(SimulatedPages);

        Self::new(vec![
            Box::new(StructuredApiStrategy::new(pages.clone())),
            Box::new(HtmlPatternStrategy::new(pages)),
            Box::new(AggregatorStrategy),
        ])
    }
}

#[async_trait]
impl FareSource for ScrapeSource {
    fn tier(&self) -> Tier {
        Tier::Scrape
    }

    #[tracing::instrument(skip_all, fields(provider = %provider.id))]
    async fn fetch(
        &self,
        provider: &ProviderProfile,
        ctx: &QuoteContext,
    ) -> Result<ProviderRawResponse, ProviderError> {
        let budget = ctx.config.timeouts.scrape_strategy();
        let mut last_error = ProviderError::Empty;

        for strategy in self.strategies.iter() {
            let error = match time::timeout(budget, strategy.scrape(provider, ctx)).await {
                Ok(Ok(fares)) if !fares.is_empty() => {
                    return Ok(ProviderRawResponse::Scrape(ScrapedListing {
                        strategy: strategy.kind(),
                        fares,
                    }));
                }
                Ok(Ok(_)) => ProviderError::Empty,
                Ok(Err(e)) => e,
                Err(_) => ProviderError::Timeout(budget),
            };

            tracing::debug!(strategy = ?strategy.kind(), %error, "scrape strategy failed");
            last_error = error;
        }

        Err(last_error)
    }
}
