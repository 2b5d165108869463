use async_trait::async_trait;

use super::{simulate_latency, FareSource, MarketEstimate, MarketFare, ProviderRawResponse};
use crate::entities::{ProviderAvailability, Tier};
use crate::error::ProviderError;
use crate::pricing::{ProviderProfile, ProviderQuoteGenerator, QuoteContext};

/// Market-model simulation: same pricing math as the official tier but
/// only prices, ETAs and surge come back.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarketSource;

#[async_trait]
impl FareSource for MarketSource {
    fn tier(&self) -> Tier {
        Tier::Market
    }

    #[tracing::instrument(skip_all, fields(provider = %provider.id))]
    async fn fetch(
        &self,
        provider: &ProviderProfile,
        ctx: &QuoteContext,
    ) -> Result<ProviderRawResponse, ProviderError> {
        let simulation = &provider.simulation;

        simulate_latency(simulation.market_latency_ms, ctx.random.as_ref()).await;

        if ctx.random.chance(simulation.market_failure_rate) {
            return Err(ProviderError::Upstream("market feed is stale".into()));
        }

        let generator = ProviderQuoteGenerator::new(provider);
        let fares = generator
            .priced_classes(ctx)
            .into_iter()
            .map(|(class, ride)| MarketFare {
                class_id: class.id.clone(),
                low: ride.price_range.min,
                high: ride.price_range.max,
                eta_minutes: ride.eta_minutes,
                surge_multiplier: ride.surge_multiplier,
                rating: None,
                review_count: None,
            })
            .collect();

        Ok(ProviderRawResponse::Market(MarketEstimate {
            limited: generator.availability(ctx) == ProviderAvailability::Limited,
            fares,
        }))
    }
}
