use crate::entities::{BestOption, FareQuote, RideOption};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    pub cheapest: Option<BestOption>,
    pub fastest: Option<BestOption>,
}

/// Cheapest ride by lower price bound and fastest by ETA across every
/// provider. The first ride seen wins a tie.
pub fn select(quotes: &[FareQuote]) -> Selection {
    let mut cheapest: Option<(&str, &RideOption)> = None;
    let mut fastest: Option<(&str, &RideOption)> = None;

    for quote in quotes.iter() {
        for ride in quote.rides.iter() {
            let provider = quote.provider_name.as_str();

            if cheapest.map_or(true, |(_, best)| ride.price_range.min < best.price_range.min) {
                cheapest = Some((provider, ride));
            }

            if fastest.map_or(true, |(_, best)| ride.eta_minutes < best.eta_minutes) {
                fastest = Some((provider, ride));
            }
        }
    }

    Selection {
        cheapest: cheapest.map(|(provider, ride)| BestOption::new(provider, ride)),
        fastest: fastest.map(|(provider, ride)| BestOption::new(provider, ride)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{PriceRange, ProviderAvailability, Tier};

    fn ride(name: &str, min: u32, eta: u32) -> RideOption {
        RideOption {
            vehicle_class: name.into(),
            price_range: PriceRange { min, max: min + 20 },
            eta_minutes: eta,
            surge_active: false,
            surge_multiplier: 1.0,
            rating: 4.2,
            review_count: 100,
            features: vec![],
            wait_time_minutes: None,
            discount_percent: None,
            night_fare_active: None,
            availability: None,
        }
    }

    fn quote(provider: &str, rides: Vec<RideOption>) -> FareQuote {
        FareQuote {
            provider_name: provider.into(),
            logo: String::new(),
            availability: ProviderAvailability::Available,
            booking_url: String::new(),
            rides,
            source: Tier::Official,
        }
    }

    #[test]
    fn empty_input_selects_nothing() {
        assert_eq!(select(&[]), Selection::default());
        assert_eq!(select(&[quote("Ola", vec![])]), Selection::default());
    }

    #[test]
    fn picks_across_providers() {
        let quotes = vec![
            quote("Ola", vec![ride("Ola Mini", 180, 22), ride("Ola Auto", 120, 25)]),
            quote("Rapido", vec![ride("Rapido Bike", 95, 14)]),
            quote("Uber", vec![ride("UberGo", 190, 20)]),
        ];

        let selection = select(&quotes);
        let cheapest = selection.cheapest.unwrap();
        let fastest = selection.fastest.unwrap();

        assert_eq!(cheapest.provider_name, "Rapido");
        assert_eq!(cheapest.ride.vehicle_class, "Rapido Bike");
        assert_eq!(fastest.ride.eta_minutes, 14);
    }

    #[test]
    fn first_seen_wins_ties() {
        let quotes = vec![
            quote("Ola", vec![ride("Ola Mini", 150, 18)]),
            quote("Uber", vec![ride("UberGo", 150, 18)]),
        ];

        let selection = select(&quotes);

        assert_eq!(selection.cheapest.unwrap().provider_name, "Ola");
        assert_eq!(selection.fastest.unwrap().provider_name, "Ola");
    }
}
