use super::{MarketEstimate, OfficialEstimate, ProviderRawResponse, ScrapedListing};
use crate::entities::{FareQuote, PriceRange, ProviderAvailability, RideOption, Tier};
use crate::error::ProviderError;
use crate::pricing::{round_half_up, round_tenth, ProviderProfile, QuoteContext, VehicleClass};

/// Turns whatever a tier returned into the common quote shape. Rides that
/// fail validation are dropped; a quote left with no rides is an error so
/// the pipeline falls through to the next tier.
pub fn normalize(
    raw: ProviderRawResponse,
    provider: &ProviderProfile,
    ctx: &QuoteContext,
    source: Tier,
) -> Result<FareQuote, ProviderError> {
    let (availability, rides) = match raw {
        ProviderRawResponse::Official(estimate) => official(estimate)?,
        ProviderRawResponse::Market(estimate) => market(estimate, provider),
        ProviderRawResponse::Scrape(listing) => scraped(listing, provider, ctx),
    };

    let rides: Vec<RideOption> = rides
        .into_iter()
        .filter(|ride| {
            let valid = ride.is_valid();
            if !valid {
                tracing::warn!(
                    provider = %provider.id,
                    class = %ride.vehicle_class,
                    "dropping invalid ride"
                );
            }
            valid
        })
        .collect();

    if rides.is_empty() {
        return Err(ProviderError::Empty);
    }

    Ok(FareQuote {
        provider_name: provider.name.clone(),
        logo: provider.logo.clone(),
        availability,
        booking_url: provider.booking_url.clone(),
        rides,
        source,
    })
}

fn parse_availability(label: &str) -> Result<ProviderAvailability, ProviderError> {
    match label.to_ascii_lowercase().as_str() {
        "available" => Ok(ProviderAvailability::Available),
        "limited" => Ok(ProviderAvailability::Limited),
        "unavailable" => Ok(ProviderAvailability::Unavailable),
        other => Err(ProviderError::Malformed(format!(
            "unknown availability {:?}",
            other
        ))),
    }
}

fn official(
    estimate: OfficialEstimate,
) -> Result<(ProviderAvailability, Vec<RideOption>), ProviderError> {
    if estimate.currency_code != "INR" {
        return Err(ProviderError::Malformed(format!(
            "unexpected currency {}",
            estimate.currency_code
        )));
    }

    let availability = parse_availability(&estimate.availability)?;

    let rides = estimate
        .products
        .into_iter()
        .map(|product| RideOption {
            vehicle_class: product.display_name,
            price_range: PriceRange {
                min: round_half_up(product.low_estimate),
                max: round_half_up(product.high_estimate),
            },
            eta_minutes: product.eta_seconds.saturating_add(59) / 60,
            surge_active: product.surge_active,
            surge_multiplier: product.surge_multiplier,
            rating: product.rating,
            review_count: product.review_count,
            features: product.features,
            wait_time_minutes: product.wait_time_minutes,
            discount_percent: product.discount_percent,
            night_fare_active: product.night_fare_active,
            availability: product.availability,
        })
        .collect();

    Ok((availability, rides))
}

/// Ride metadata the lower tiers don't report, taken from the class tables.
fn class_ride(class: &VehicleClass, price_range: PriceRange, eta_minutes: u32) -> RideOption {
    RideOption {
        vehicle_class: class.name.clone(),
        price_range,
        eta_minutes,
        surge_active: false,
        surge_multiplier: 1.0,
        rating: round_tenth(class.rating.midpoint()),
        review_count: class.reviews.midpoint().floor() as u32,
        features: class.features.clone(),
        wait_time_minutes: None,
        discount_percent: None,
        night_fare_active: None,
        availability: class.availability,
    }
}

fn market(
    estimate: MarketEstimate,
    provider: &ProviderProfile,
) -> (ProviderAvailability, Vec<RideOption>) {
    let availability = if estimate.limited {
        ProviderAvailability::Limited
    } else {
        ProviderAvailability::Available
    };

    let rides = estimate
        .fares
        .into_iter()
        .filter_map(|fare| {
            let class = match provider.class(&fare.class_id) {
                Some(class) => class,
                None => {
                    tracing::debug!(class = %fare.class_id, "unknown vehicle class in market feed");
                    return None;
                }
            };

            let mut ride = class_ride(
                class,
                PriceRange {
                    min: fare.low,
                    max: fare.high,
                },
                fare.eta_minutes,
            );
            ride.surge_multiplier = fare.surge_multiplier;
            ride.surge_active = fare.surge_multiplier > class.surge_threshold;
            if let Some(rating) = fare.rating {
                ride.rating = rating;
            }
            if let Some(reviews) = fare.review_count {
                ride.review_count = reviews;
            }

            Some(ride)
        })
        .collect();

    (availability, rides)
}

fn scraped(
    listing: ScrapedListing,
    provider: &ProviderProfile,
    ctx: &QuoteContext,
) -> (ProviderAvailability, Vec<RideOption>) {
    let eta_factor = ctx.tier_settings().eta_factor;
    let floor = ctx.config.surge.floor;

    let rides = listing
        .fares
        .into_iter()
        .filter_map(|fare| {
            let class = provider
                .classes
                .iter()
                .find(|class| class.matches_label(&fare.label))?;

            let eta = fare.eta_minutes.unwrap_or_else(|| {
                round_half_up(ctx.duration_minutes() * class.speed_factor * eta_factor).max(1)
            });

            let mut ride = class_ride(
                class,
                PriceRange {
                    min: fare.min,
                    max: fare.max,
                },
                eta,
            );
            ride.surge_multiplier = floor;

            Some(ride)
        })
        .collect();

    tracing::debug!(strategy = ?listing.strategy, "normalized scraped listing");

    (ProviderAvailability::Available, rides)
}
