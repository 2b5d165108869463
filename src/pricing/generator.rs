use super::config::{ProviderProfile, VehicleClass};
use super::surge::{round_tenth, SurgeModel};
use super::tariff::{round_half_up, PricingRule};
use super::QuoteContext;
use crate::entities::{FareQuote, ProviderAvailability, RideOption, Tier};
use crate::random::RandomSource;

/// Prices every vehicle class of one provider and wraps the rides with the
/// provider's metadata. Never fails: a class that cannot be priced is left
/// out of the quote.
pub struct ProviderQuoteGenerator<'a> {
    provider: &'a ProviderProfile,
}

impl<'a> ProviderQuoteGenerator<'a> {
    pub fn new(provider: &'a ProviderProfile) -> Self {
        Self { provider }
    }

    pub fn surge(&self, ctx: &QuoteContext) -> f64 {
        SurgeModel::new(&ctx.config.surge).multiplier(
            &ctx.surge_context(),
            self.provider,
            ctx.random.as_ref(),
        )
    }

    pub fn availability(&self, ctx: &QuoteContext) -> ProviderAvailability {
        let probability = self
            .provider
            .limited_probability
            .unwrap_or(ctx.tier_settings().limited_probability);

        if ctx.random.chance(probability) {
            ProviderAvailability::Limited
        } else {
            ProviderAvailability::Available
        }
    }

    /// Every class that could be priced, paired with its ride.
    #[tracing::instrument(skip_all, fields(provider = %self.provider.id, city = %ctx.city.id))]
    pub fn priced_classes(&self, ctx: &QuoteContext) -> Vec<(&'a VehicleClass, RideOption)> {
        let surge = self.surge(ctx);
        let provider = self.provider;

        let priced: Vec<(&'a VehicleClass, RideOption)> = provider
            .classes
            .iter()
            .filter_map(|class| self.ride(ctx, class, surge).map(|ride| (class, ride)))
            .collect();

        tracing::debug!(surge, rides = priced.len(), "priced vehicle classes");

        priced
    }

    pub fn generate(&self, ctx: &QuoteContext, source: Tier) -> FareQuote {
        let rides = self
            .priced_classes(ctx)
            .into_iter()
            .map(|(_, ride)| ride)
            .collect();

        FareQuote {
            provider_name: self.provider.name.clone(),
            logo: self.provider.logo.clone(),
            availability: self.availability(ctx),
            booking_url: self.provider.booking_url.clone(),
            rides,
            source,
        }
    }

    fn ride(&self, ctx: &QuoteContext, class: &VehicleClass, surge: f64) -> Option<RideOption> {
        if !class.offered_in(&ctx.city.id) {
            tracing::debug!(class = %class.id, "class not offered in city");
            return None;
        }

        let tariff = match &class.tariff {
            Some(tariff) => tariff,
            None => {
                tracing::debug!(class = %class.id, "no tariff, skipping class");
                return None;
            }
        };

        let random = ctx.random.as_ref();
        let tier = ctx.tier_settings();

        let class_surge = SurgeModel::new(&ctx.config.surge).scaled(surge, class.surge_scale);
        let rule = PricingRule::new(tariff, ctx.is_night(), ctx.config.variance);
        let price_range = rule.price(
            ctx.distance_km(),
            ctx.duration_minutes(),
            class_surge,
            ctx.peak_multiplier(),
            ctx.city.multiplier * class.city_scale,
        );

        let discount_percent = class
            .discount
            .as_ref()
            .filter(|offer| random.chance(offer.probability))
            .map(|offer| offer.percent.sample(random).floor() as u32);

        Some(RideOption {
            vehicle_class: class.name.clone(),
            price_range,
            eta_minutes: ride_eta(
                ctx.duration_minutes(),
                class.speed_factor,
                tier.eta_factor,
                random,
            ),
            surge_active: surge > class.surge_threshold,
            surge_multiplier: class_surge,
            rating: round_tenth(class.rating.sample(random)),
            review_count: (class.reviews.sample(random) * tier.review_scale).floor() as u32,
            features: class.features.clone(),
            wait_time_minutes: Some(
                (class.wait_minutes.sample(random) * tier.wait_scale).floor() as u32,
            ),
            discount_percent,
            night_fare_active: tariff.night.as_ref().map(|_| rule.uses_night_table()),
            availability: class.availability,
        })
    }
}

/// Trip duration scaled by the class's speed and the city's congestion,
/// plus up to four minutes of jitter.
pub fn ride_eta(
    duration_min: f64,
    speed_factor: f64,
    eta_factor: f64,
    random: &dyn RandomSource,
) -> u32 {
    let eta = round_half_up(duration_min * speed_factor * eta_factor);
    eta.saturating_add(random.between_int(0, 4)).max(1)
}
