use async_trait::async_trait;

use super::{FareSource, MarketEstimate, MarketFare, ProviderRawResponse};
use crate::entities::Tier;
use crate::error::ProviderError;
use crate::pricing::{round_half_up, ProviderProfile, QuoteContext};

/// Last resort: the published rate card scaled for the city. No network
/// and no randomness, so it only comes up empty when a provider has no
/// rate card for any class running in the city.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticRateSource;

fn to_rupees(paise: u32) -> f64 {
    paise as f64 / 100.0
}

#[async_trait]
impl FareSource for StaticRateSource {
    fn tier(&self) -> Tier {
        Tier::Static
    }

    #[tracing::instrument(skip_all, fields(provider = %provider.id))]
    async fn fetch(
        &self,
        provider: &ProviderProfile,
        ctx: &QuoteContext,
    ) -> Result<ProviderRawResponse, ProviderError> {
        let distance_km = ctx.distance_km();
        let peak = ctx.peak_multiplier();
        let floor = ctx.config.surge.floor;

        let fares = provider
            .classes
            .iter()
            .filter(|class| class.offered_in(&ctx.city.id))
            .filter_map(|class| class.static_rate.as_ref().map(|rate| (class, rate)))
            .map(|(class, rate)| {
                let scale = ctx.city.multiplier * class.city_scale * peak;
                let base = to_rupees(rate.base_fare);

                let low = round_half_up((base + distance_km * to_rupees(rate.per_km_low)) * scale);
                let high =
                    round_half_up((base + distance_km * to_rupees(rate.per_km_high)) * scale);

                MarketFare {
                    class_id: class.id.clone(),
                    low: low.max(1),
                    high: high.max(low).max(1),
                    eta_minutes: round_half_up(ctx.duration_minutes() * class.speed_factor).max(1),
                    surge_multiplier: floor,
                    rating: Some(rate.rating),
                    review_count: Some(rate.review_count),
                }
            })
            .collect();

        Ok(ProviderRawResponse::Market(MarketEstimate {
            limited: false,
            fares,
        }))
    }
}
