use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::entities::{RideAvailability, Tier};
use crate::error::{invalid_config_error, Error};
use crate::random::RandomSource;

/// Every table the pricing engine reads. Built once at startup and shared
/// read-only behind an `Arc`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Ordered; the first city whose keywords match an address wins.
    pub cities: Vec<CityProfile>,
    pub default_city: CityProfile,
    pub tiers: CityTiers,
    pub surge: SurgeConfig,
    pub peak: PeakConfig,
    pub night: HourWindow,
    /// Half-width of the price band around a computed fare.
    pub variance: f64,
    pub timeouts: TierTimeouts,
    pub providers: Vec<ProviderProfile>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn sample(&self, random: &dyn RandomSource) -> f64 {
        random.between(self.min, self.max)
    }

    fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// Hours `start..end` on a 24h clock; wraps past midnight when `end <= start`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourWindow {
    pub start: u32,
    pub end: u32,
}

impl HourWindow {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, hour: u32) -> bool {
        if self.start < self.end {
            hour >= self.start && hour < self.end
        } else {
            hour >= self.start || hour < self.end
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CityTier {
    Metro,
    Major,
    Tier2,
    Other,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TierSettings {
    pub surge_factor: f64,
    pub eta_factor: f64,
    pub limited_probability: f64,
    pub review_scale: f64,
    pub wait_scale: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CityTiers {
    pub metro: TierSettings,
    pub major: TierSettings,
    pub tier2: TierSettings,
    pub other: TierSettings,
}

impl CityTiers {
    pub fn get(&self, tier: CityTier) -> &TierSettings {
        match tier {
            CityTier::Metro => &self.metro,
            CityTier::Major => &self.major,
            CityTier::Tier2 => &self.tier2,
            CityTier::Other => &self.other,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CityCenter {
    pub lat: f64,
    pub lng: f64,
    /// Match radius, in degrees on both axes.
    pub radius_deg: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CityProfile {
    pub id: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub center: Option<CityCenter>,
    pub multiplier: f64,
    pub tier: CityTier,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DistanceDamping {
    pub over_km: f64,
    pub factor: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SurgeConfig {
    pub peak_windows: Vec<HourWindow>,
    pub peak_factor: f64,
    pub shoulder_windows: Vec<HourWindow>,
    pub shoulder_factor: f64,
    pub weekend_midday: HourWindow,
    pub weekend_midday_factor: f64,
    pub weekend_night: HourWindow,
    pub weekend_night_factor: f64,
    pub moderate_traffic_factor: f64,
    pub heavy_traffic_factor: f64,
    pub weather_probability: f64,
    pub weather_factor: f64,
    /// Checked in order; the first threshold exceeded applies.
    pub long_trip: Vec<DistanceDamping>,
    pub jitter: Span,
    pub floor: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PeakConfig {
    pub windows: Vec<HourWindow>,
    pub multiplier: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TierTimeouts {
    pub official_ms: u64,
    pub market_ms: u64,
    pub scrape_ms: u64,
    pub scrape_strategy_ms: u64,
    pub static_ms: u64,
}

impl TierTimeouts {
    pub fn budget(&self, tier: Tier) -> Duration {
        let millis = match tier {
            Tier::Official => self.official_ms,
            Tier::Market => self.market_ms,
            Tier::Scrape => self.scrape_ms,
            Tier::Static => self.static_ms,
        };

        Duration::from_millis(millis)
    }

    pub fn scrape_strategy(&self) -> Duration {
        Duration::from_millis(self.scrape_strategy_ms)
    }
}

/// Behaviour of the simulated upstreams for one provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationProfile {
    pub official_latency_ms: Span,
    pub official_failure_rate: f64,
    /// Cities the official endpoint answers for; empty means all of them.
    #[serde(default)]
    pub official_cities: Vec<String>,
    pub market_latency_ms: Span,
    pub market_failure_rate: f64,
    pub scrape_block_rate: f64,
}

/// Monetary fields are paise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tariff {
    pub base_fare: u32,
    pub per_km: u32,
    pub per_minute: u32,
    pub minimum_fare: u32,
    pub booking_fee: u32,
    pub tax_rate: f64,
    #[serde(default)]
    pub night: Option<NightTariff>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NightTariff {
    pub base_fare: u32,
    pub per_km: u32,
}

/// Published rate card used when every live tier is down. Paise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaticRate {
    pub base_fare: u32,
    pub per_km_low: u32,
    pub per_km_high: u32,
    pub rating: f64,
    pub review_count: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscountOffer {
    pub probability: f64,
    pub percent: Span,
}

fn unit() -> f64 {
    1.0
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VehicleClass {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tariff: Option<Tariff>,
    #[serde(default)]
    pub static_rate: Option<StaticRate>,
    pub speed_factor: f64,
    #[serde(default = "unit")]
    pub city_scale: f64,
    #[serde(default = "unit")]
    pub surge_scale: f64,
    /// Surge counts as active once the provider multiplier exceeds this.
    #[serde(default = "unit")]
    pub surge_threshold: f64,
    pub rating: Span,
    pub reviews: Span,
    pub wait_minutes: Span,
    pub features: Vec<String>,
    #[serde(default)]
    pub discount: Option<DiscountOffer>,
    #[serde(default)]
    pub availability: Option<RideAvailability>,
    /// Cities the class runs in; empty means everywhere.
    #[serde(default)]
    pub only_in: Vec<String>,
}

impl VehicleClass {
    pub fn offered_in(&self, city: &str) -> bool {
        self.only_in.is_empty() || self.only_in.iter().any(|id| id == city)
    }

    /// Matches a scraped label such as "UberGo" or "uber go" to this class.
    pub fn matches_label(&self, label: &str) -> bool {
        let wanted = squash(label);
        wanted == squash(&self.name) || wanted == squash(&self.id)
    }
}

fn squash(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderProfile {
    pub id: String,
    pub name: String,
    pub logo: String,
    pub booking_url: String,
    /// Scales the shared surge; budget providers surge less.
    pub surge_damping: f64,
    /// Overrides the city tier's probability of reporting `limited`.
    #[serde(default)]
    pub limited_probability: Option<f64>,
    pub simulation: SimulationProfile,
    pub classes: Vec<VehicleClass>,
}

impl ProviderProfile {
    pub fn class(&self, id: &str) -> Option<&VehicleClass> {
        self.classes.iter().find(|class| class.id == id)
    }
}

impl PricingConfig {
    #[tracing::instrument(name = "PricingConfig::load")]
    pub fn load(path: &Path) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;

        config.validate()?;

        tracing::info!(
            providers = config.providers.len(),
            cities = config.cities.len(),
            "loaded pricing config"
        );

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(0.0..1.0).contains(&self.variance) {
            return Err(invalid_config_error("variance must be in [0, 1)"));
        }

        if self.surge.floor <= 0.0 || !self.surge.jitter.is_valid() {
            return Err(invalid_config_error("surge floor and jitter"));
        }

        for city in self.cities.iter().chain(std::iter::once(&self.default_city)) {
            if !(city.multiplier > 0.0) {
                return Err(invalid_config_error(format!("city {} multiplier", city.id)));
            }
        }

        if self.providers.is_empty() {
            return Err(invalid_config_error("no providers configured"));
        }

        for provider in self.providers.iter() {
            if !(provider.surge_damping > 0.0) {
                return Err(invalid_config_error(format!(
                    "provider {} surge damping",
                    provider.id
                )));
            }

            for class in provider.classes.iter() {
                validate_class(provider, class)?;
            }
        }

        Ok(())
    }

    pub fn city(&self, id: &str) -> &CityProfile {
        self.cities
            .iter()
            .find(|city| city.id == id)
            .unwrap_or(&self.default_city)
    }

    pub fn tier_settings(&self, tier: CityTier) -> &TierSettings {
        self.tiers.get(tier)
    }

    pub fn provider(&self, id: &str) -> Option<&ProviderProfile> {
        self.providers.iter().find(|provider| provider.id == id)
    }
}

fn validate_class(provider: &ProviderProfile, class: &VehicleClass) -> Result<(), Error> {
    let label = format!("{}/{}", provider.id, class.id);

    if let Some(tariff) = &class.tariff {
        if tariff.minimum_fare == 0 {
            return Err(invalid_config_error(format!("{} minimum fare", label)));
        }

        if !tariff.tax_rate.is_finite() || tariff.tax_rate < 0.0 {
            return Err(invalid_config_error(format!("{} tax rate", label)));
        }
    }

    if let Some(rate) = &class.static_rate {
        if rate.per_km_low > rate.per_km_high || rate.base_fare == 0 {
            return Err(invalid_config_error(format!("{} static rate", label)));
        }
    }

    let spans = [class.rating, class.reviews, class.wait_minutes];
    if !spans.iter().all(Span::is_valid) || class.rating.min < 1.0 || class.rating.max > 5.0 {
        return Err(invalid_config_error(format!("{} metadata ranges", label)));
    }

    if !(class.speed_factor > 0.0 && class.city_scale > 0.0 && class.surge_scale > 0.0) {
        return Err(invalid_config_error(format!("{} scaling factors", label)));
    }

    Ok(())
}

#[test]
fn hour_window_wraps_midnight_test() {
    let night = HourWindow::new(22, 6);

    assert!(night.contains(23));
    assert!(night.contains(0));
    assert!(night.contains(5));
    assert!(!night.contains(6));
    assert!(!night.contains(14));

    let peak = HourWindow::new(8, 11);
    assert!(peak.contains(10));
    assert!(!peak.contains(11));
}

#[test]
fn class_label_matching_test() {
    let config = PricingConfig::default();
    let uber = config.provider("uber").unwrap();
    let go = uber.class("go").unwrap();

    assert!(go.matches_label("UberGo"));
    assert!(go.matches_label("uber go"));
    assert!(go.matches_label("GO"));
    assert!(!go.matches_label("UberXL"));
}

#[test]
fn validate_rejects_zero_minimum_fare_test() {
    let mut config = PricingConfig::default();
    config.providers[0].classes[0]
        .tariff
        .as_mut()
        .unwrap()
        .minimum_fare = 0;

    assert_eq!(config.validate().unwrap_err().code, 6);
}

#[test]
fn load_round_trips_builtin_tables_test() {
    let path = std::env::temp_dir().join(format!("fareline-pricing-{}.json", std::process::id()));
    let builtin = PricingConfig::default();
    std::fs::write(&path, serde_json::to_string_pretty(&builtin).unwrap()).unwrap();

    let loaded = PricingConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.providers.len(), builtin.providers.len());
    assert_eq!(loaded.city("delhi"), builtin.city("delhi"));
}
