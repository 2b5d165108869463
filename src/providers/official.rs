use async_trait::async_trait;

use super::{simulate_latency, FareSource, OfficialEstimate, OfficialProduct, ProviderRawResponse};
use crate::entities::{ProviderAvailability, RideOption, Tier};
use crate::error::ProviderError;
use crate::pricing::{ProviderProfile, ProviderQuoteGenerator, QuoteContext};

/// Simulated provider estimates endpoint. Answers with the full metadata
/// set, refuses cities outside the provider's service list, and fails at
/// the configured rate.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfficialSource;

#[async_trait]
impl FareSource for OfficialSource {
    fn tier(&self) -> Tier {
        Tier::Official
    }

    #[tracing::instrument(skip_all, fields(provider = %provider.id))]
    async fn fetch(
        &self,
        provider: &ProviderProfile,
        ctx: &QuoteContext,
    ) -> Result<ProviderRawResponse, ProviderError> {
        let simulation = &provider.simulation;

        if !simulation.official_cities.is_empty()
            && !simulation.official_cities.contains(&ctx.city.id)
        {
            return Err(ProviderError::UnsupportedCity(ctx.city.id.clone()));
        }

        simulate_latency(simulation.official_latency_ms, ctx.random.as_ref()).await;

        if ctx.random.chance(simulation.official_failure_rate) {
            return Err(ProviderError::Upstream(
                "estimates endpoint returned 503".into(),
            ));
        }

        let generator = ProviderQuoteGenerator::new(provider);
        let products = generator
            .priced_classes(ctx)
            .into_iter()
            .map(|(class, ride)| product(class.id.clone(), ride))
            .collect();

        Ok(ProviderRawResponse::Official(OfficialEstimate {
            availability: availability_label(generator.availability(ctx)).into(),
            currency_code: "INR".into(),
            products,
        }))
    }
}

fn product(product_id: String, ride: RideOption) -> OfficialProduct {
    OfficialProduct {
        product_id,
        display_name: ride.vehicle_class,
        low_estimate: ride.price_range.min as f64,
        high_estimate: ride.price_range.max as f64,
        eta_seconds: ride.eta_minutes.saturating_mul(60),
        surge_multiplier: ride.surge_multiplier,
        surge_active: ride.surge_active,
        rating: ride.rating,
        review_count: ride.review_count,
        features: ride.features,
        wait_time_minutes: ride.wait_time_minutes,
        discount_percent: ride.discount_percent,
        night_fare_active: ride.night_fare_active,
        availability: ride.availability,
    }
}

fn availability_label(availability: ProviderAvailability) -> &'static str {
    match availability {
        ProviderAvailability::Available => "available",
        ProviderAvailability::Limited => "limited",
        ProviderAvailability::Unavailable => "unavailable",
    }
}
