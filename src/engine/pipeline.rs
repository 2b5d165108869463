use std::sync::Arc;
use tokio::time;

use crate::entities::{FareQuote, Tier};
use crate::error::ProviderError;
use crate::pricing::{ProviderProfile, QuoteContext};
use crate::providers::{normalize, standard_sources, FareSource};

/// How one provider's fallback chain ended.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// The first tier answered.
    Success(FareQuote),
    /// A lower tier answered after the ones above it failed.
    Degraded {
        quote: FareQuote,
        failures: Vec<(Tier, ProviderError)>,
    },
    Failed(Vec<(Tier, ProviderError)>),
}

impl PipelineOutcome {
    pub fn into_quote(self) -> Option<FareQuote> {
        match self {
            Self::Success(quote) | Self::Degraded { quote, .. } => Some(quote),
            Self::Failed(_) => None,
        }
    }

    pub fn failures(&self) -> &[(Tier, ProviderError)] {
        match self {
            Self::Success(_) => &[],
            Self::Degraded { failures, .. } | Self::Failed(failures) => failures,
        }
    }
}

/// Walks a provider's sources in order, each under its tier's time budget,
/// and stops at the first one that yields a usable quote.
pub struct ProviderPipeline {
    profile: Arc<ProviderProfile>,
    sources: Vec<Box<dyn FareSource>>,
}

impl ProviderPipeline {
    pub fn new(profile: Arc<ProviderProfile>, sources: Vec<Box<dyn FareSource>>) -> Self {
        Self { profile, sources }
    }

    pub fn standard(profile: Arc<ProviderProfile>) -> Self {
        Self::new(profile, standard_sources())
    }

    #[tracing::instrument(name = "ProviderPipeline::run", skip_all, fields(provider = %self.profile.id))]
    pub async fn run(&self, ctx: &QuoteContext) -> PipelineOutcome {
        let mut failures = Vec::new();

        for (index, source) in self.sources.iter().enumerate() {
            let tier = source.tier();
            let budget = ctx.config.timeouts.budget(tier);

            let attempt = match time::timeout(budget, source.fetch(&self.profile, ctx)).await {
                Ok(Ok(raw)) => normalize(raw, &self.profile, ctx, tier),
                Ok(Err(e)) => Err(e),
                Err(_) => Err(ProviderError::Timeout(budget)),
            };

            match attempt {
                Ok(quote) if index == 0 => return PipelineOutcome::Success(quote),
                Ok(quote) => {
                    tracing::info!(%tier, fallbacks = failures.len(), "served from fallback tier");
                    return PipelineOutcome::Degraded { quote, failures };
                }
                Err(e) => {
                    tracing::warn!(%tier, error = %e, "fare source failed");
                    failures.push((tier, e));
                }
            }
        }

        tracing::warn!("every fare source failed");

        PipelineOutcome::Failed(failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Location, RouteInfo, TrafficLevel};
    use crate::pricing::PricingConfig;
    use crate::providers::{MarketSource, ProviderRawResponse, StaticRateSource};
    use crate::random::FixedRandom;
    use async_trait::async_trait;
    use chrono::{FixedOffset, TimeZone};
    use std::time::Duration;

    struct Failing(Tier);

    #[async_trait]
    impl FareSource for Failing {
        fn tier(&self) -> Tier {
            self.0
        }

        async fn fetch(
            &self,
            _provider: &ProviderProfile,
            _ctx: &QuoteContext,
        ) -> Result<ProviderRawResponse, ProviderError> {
            Err(ProviderError::Upstream("down".into()))
        }
    }

    struct Stalled;

    #[async_trait]
    impl FareSource for Stalled {
        fn tier(&self) -> Tier {
            Tier::Official
        }

        async fn fetch(
            &self,
            _provider: &ProviderProfile,
            _ctx: &QuoteContext,
        ) -> Result<ProviderRawResponse, ProviderError> {
            time::sleep(Duration::from_secs(60)).await;
            Err(ProviderError::Empty)
        }
    }

    fn context() -> QuoteContext {
        let now = FixedOffset::east_opt(19800)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 10, 13, 0, 0)
            .unwrap();

        QuoteContext::new(
            Arc::new(PricingConfig::default()),
            Arc::new(FixedRandom(0.5)),
            Location::new("Koramangala, Bangalore", 12.9352, 77.6245),
            Location::new("Indiranagar, Bangalore", 12.9784, 77.6408),
            RouteInfo::new(5_500.0, 19.0, TrafficLevel::Moderate),
            now,
        )
    }

    fn uber(ctx: &QuoteContext) -> Arc<ProviderProfile> {
        Arc::new(ctx.config.provider("uber").unwrap().clone())
    }

    #[tokio::test]
    async fn first_tier_success() {
        let ctx = context();
        let pipeline = ProviderPipeline::new(uber(&ctx), vec![Box::new(StaticRateSource)]);

        let outcome = pipeline.run(&ctx).await;

        assert!(outcome.failures().is_empty());
        assert_eq!(outcome.into_quote().unwrap().source, Tier::Static);
    }

    #[tokio::test]
    async fn falls_back_and_records_failures() {
        let ctx = context();
        let pipeline = ProviderPipeline::new(
            uber(&ctx),
            vec![Box::new(Failing(Tier::Official)), Box::new(MarketSource)],
        );

        let outcome = pipeline.run(&ctx).await;

        assert_eq!(outcome.failures().len(), 1);
        assert_eq!(outcome.failures()[0].0, Tier::Official);
        assert_eq!(outcome.into_quote().unwrap().source, Tier::Market);
    }

    #[tokio::test]
    async fn stalled_tier_is_cut_off() {
        let ctx = context();
        let pipeline = ProviderPipeline::new(
            uber(&ctx),
            vec![Box::new(Stalled), Box::new(StaticRateSource)],
        );

        let outcome = pipeline.run(&ctx).await;

        assert!(matches!(
            outcome.failures()[0].1,
            ProviderError::Timeout(budget) if budget == Duration::from_millis(1500)
        ));
        assert_eq!(outcome.into_quote().unwrap().source, Tier::Static);
    }

    #[tokio::test]
    async fn unserved_city_skips_official_tier() {
        let now = FixedOffset::east_opt(19800)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 10, 13, 0, 0)
            .unwrap();
        let ctx = QuoteContext::new(
            Arc::new(PricingConfig::default()),
            Arc::new(FixedRandom(0.5)),
            Location::new("MI Road, Jaipur", 26.9124, 75.7873),
            Location::new("Malviya Nagar, Jaipur", 26.8549, 75.8243),
            RouteInfo::new(8_200.0, 24.0, TrafficLevel::Moderate),
            now,
        );
        let ola = Arc::new(ctx.config.provider("ola").unwrap().clone());

        let outcome = ProviderPipeline::standard(ola).run(&ctx).await;

        assert_eq!(
            outcome.failures()[0],
            (
                Tier::Official,
                ProviderError::UnsupportedCity("jaipur".into())
            )
        );
        assert_eq!(outcome.into_quote().unwrap().source, Tier::Market);
    }

    #[tokio::test]
    async fn every_tier_failing() {
        let ctx = context();
        let pipeline = ProviderPipeline::new(
            uber(&ctx),
            vec![Box::new(Failing(Tier::Official)), Box::new(Failing(Tier::Static))],
        );

        let outcome = pipeline.run(&ctx).await;

        assert_eq!(outcome.failures().len(), 2);
        assert!(outcome.into_quote().is_none());
    }
}
