use super::config::Tariff;
use crate::entities::PriceRange;

/// Standard round-half-up to a whole rupee.
pub fn round_half_up(value: f64) -> u32 {
    (value + 0.5).floor().max(0.0) as u32
}

fn to_rupees(paise: u32) -> f64 {
    paise as f64 / 100.0
}

/// A tariff bound to the time-of-day table (night or day) and the price band
/// to spread around the computed fare.
#[derive(Clone, Copy, Debug)]
pub struct PricingRule<'a> {
    tariff: &'a Tariff,
    night: bool,
    variance: f64,
}

impl<'a> PricingRule<'a> {
    pub fn new(tariff: &'a Tariff, night: bool, variance: f64) -> Self {
        Self {
            tariff,
            night,
            variance,
        }
    }

    pub fn uses_night_table(&self) -> bool {
        self.night && self.tariff.night.is_some()
    }

    fn base_and_per_km(&self) -> (f64, f64) {
        match (&self.tariff.night, self.night) {
            (Some(night), true) => (to_rupees(night.base_fare), to_rupees(night.per_km)),
            _ => (to_rupees(self.tariff.base_fare), to_rupees(self.tariff.per_km)),
        }
    }

    /// City-scaled minimum fare, in rupees.
    pub fn minimum_fare(&self, city_multiplier: f64) -> f64 {
        to_rupees(self.tariff.minimum_fare) * city_multiplier
    }

    /// Point fare before the variance band, never under the city-scaled
    /// minimum.
    pub fn fare(
        &self,
        distance_km: f64,
        duration_min: f64,
        surge_multiplier: f64,
        peak_multiplier: f64,
        city_multiplier: f64,
    ) -> f64 {
        let (base_fare, per_km) = self.base_and_per_km();
        let subtotal =
            base_fare + distance_km * per_km + duration_min * to_rupees(self.tariff.per_minute);

        let city_adjusted = subtotal * city_multiplier;
        let surged = city_adjusted * surge_multiplier * peak_multiplier;
        let with_fee = surged + to_rupees(self.tariff.booking_fee);
        let with_tax = with_fee * (1.0 + self.tariff.tax_rate);

        with_tax.max(self.minimum_fare(city_multiplier))
    }

    pub fn price(
        &self,
        distance_km: f64,
        duration_min: f64,
        surge_multiplier: f64,
        peak_multiplier: f64,
        city_multiplier: f64,
    ) -> PriceRange {
        let floor = self.minimum_fare(city_multiplier);
        let fare = self.fare(
            distance_km,
            duration_min,
            surge_multiplier,
            peak_multiplier,
            city_multiplier,
        );
        let spread = fare * self.variance;

        let min = round_half_up((fare - spread).max(floor)).max(1);
        let max = round_half_up(fare + spread).max(min);

        PriceRange { min, max }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::config::NightTariff;

    fn uber_go() -> Tariff {
        Tariff {
            base_fare: 5000,
            per_km: 1200,
            per_minute: 200,
            minimum_fare: 8000,
            booking_fee: 500,
            tax_rate: 0.05,
            night: None,
        }
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(round_half_up(10.5), 11);
        assert_eq!(round_half_up(10.49), 10);
        assert_eq!(round_half_up(-3.0), 0);
    }

    #[test]
    fn zero_distance_prices_at_minimum() {
        let tariff = uber_go();
        let rule = PricingRule::new(&tariff, false, 0.08);

        let range = rule.price(0.0, 0.0, 1.0, 1.0, 1.0);
        assert_eq!(range.min, 80);
        assert_eq!(range.max, 86);
    }

    #[test]
    fn ten_kilometre_fare() {
        let tariff = uber_go();
        let rule = PricingRule::new(&tariff, false, 0.08);

        // (50 + 120 + 40) + 5 = 215, taxed to 225.75
        let fare = rule.fare(10.0, 20.0, 1.0, 1.0, 1.0);
        assert!((fare - 225.75).abs() < 1e-9);

        let range = rule.price(10.0, 20.0, 1.0, 1.0, 1.0);
        assert_eq!(range.min, 208);
        assert_eq!(range.max, 244);
    }

    #[test]
    fn city_scales_minimum() {
        let tariff = uber_go();
        let rule = PricingRule::new(&tariff, false, 0.08);

        let range = rule.price(0.0, 0.0, 1.0, 1.0, 1.2);
        assert_eq!(range.min, 96);
    }

    #[test]
    fn night_table_applies_only_at_night() {
        let mut tariff = uber_go();
        tariff.night = Some(NightTariff {
            base_fare: 6000,
            per_km: 1500,
        });

        let day = PricingRule::new(&tariff, false, 0.0).fare(10.0, 0.0, 1.0, 1.0, 1.0);
        let night = PricingRule::new(&tariff, true, 0.0).fare(10.0, 0.0, 1.0, 1.0, 1.0);

        assert!(night > day);
        assert!(PricingRule::new(&tariff, true, 0.0).uses_night_table());
        assert!(!PricingRule::new(&uber_go(), true, 0.0).uses_night_table());
    }

    #[test]
    fn surge_never_lowers_price() {
        let tariff = uber_go();
        let rule = PricingRule::new(&tariff, false, 0.08);

        let calm = rule.price(8.0, 25.0, 1.0, 1.15, 1.25);
        let busy = rule.price(8.0, 25.0, 1.6, 1.15, 1.25);

        assert!(busy.min >= calm.min);
        assert!(busy.max >= calm.max);
    }
}
