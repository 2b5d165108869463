mod fare_api;
mod pipeline;
mod route_api;

use std::sync::Arc;
use std::time::Duration;

pub use pipeline::{PipelineOutcome, ProviderPipeline};

use crate::api::{RouteResolver, API};
use crate::clock::{Clock, SystemClock};
use crate::pricing::PricingConfig;
use crate::random::{RandomSource, ThreadRandom};

const DEFAULT_ROUTE_TIMEOUT: Duration = Duration::from_millis(2500);

pub struct Engine {
    config: Arc<PricingConfig>,
    clock: Arc<dyn Clock>,
    random: Arc<dyn RandomSource>,
    pipelines: Vec<ProviderPipeline>,
    routes: Option<Arc<dyn RouteResolver>>,
    route_timeout: Duration,
}

impl Engine {
    /// Live clock, thread-local randomness and the standard four-tier
    /// pipeline for every configured provider.
    #[tracing::instrument(name = "Engine::new", skip_all)]
    pub fn new(config: PricingConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: PricingConfig) -> EngineBuilder {
        EngineBuilder {
            config,
            clock: None,
            random: None,
            pipelines: None,
            routes: None,
            route_timeout: DEFAULT_ROUTE_TIMEOUT,
        }
    }
}

pub struct EngineBuilder {
    config: PricingConfig,
    clock: Option<Arc<dyn Clock>>,
    random: Option<Arc<dyn RandomSource>>,
    pipelines: Option<Vec<ProviderPipeline>>,
    routes: Option<Arc<dyn RouteResolver>>,
    route_timeout: Duration,
}

impl EngineBuilder {
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn random(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Some(Arc::new(random));
        self
    }

    pub fn pipelines(mut self, pipelines: Vec<ProviderPipeline>) -> Self {
        self.pipelines = Some(pipelines);
        self
    }

    pub fn route_resolver(mut self, resolver: impl RouteResolver + 'static) -> Self {
        self.routes = Some(Arc::new(resolver));
        self
    }

    pub fn route_timeout(mut self, timeout: Duration) -> Self {
        self.route_timeout = timeout;
        self
    }

    pub fn build(self) -> Engine {
        let pipelines = match self.pipelines {
            Some(pipelines) => pipelines,
            None => self
                .config
                .providers
                .iter()
                .map(|provider| ProviderPipeline::standard(Arc::new(provider.clone())))
                .collect(),
        };

        tracing::info!(providers = pipelines.len(), "fare engine ready");

        Engine {
            config: Arc::new(self.config),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock::default())),
            random: self.random.unwrap_or_else(|| Arc::new(ThreadRandom)),
            pipelines,
            routes: self.routes,
            route_timeout: self.route_timeout,
        }
    }
}

impl API for Engine {}
