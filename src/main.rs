use fareline::clock::SystemClock;
use fareline::config::Config;
use fareline::engine::Engine;
use fareline::error::Error;
use fareline::external::DistanceMatrix;
use fareline::pricing::PricingConfig;
use fareline::random::SeededRandom;
use fareline::server::serve;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "fareline exited");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Error> {
    let config = Config::from_env()?;

    let pricing = match &config.pricing_config {
        Some(path) => PricingConfig::load(path)?,
        None => {
            let builtin = PricingConfig::default();
            builtin.validate()?;
            builtin
        }
    };

    let mut engine = Engine::builder(pricing)
        .clock(SystemClock::new(config.utc_offset))
        .route_timeout(config.route_timeout);

    if let Some(seed) = config.random_seed {
        tracing::info!(seed, "using seeded random source");
        engine = engine.random(SeededRandom::new(seed));
    }

    match &config.google_maps {
        Some(maps) => {
            engine = engine.route_resolver(DistanceMatrix::new(&maps.api_base, &maps.api_key));
        }
        None => tracing::info!("no maps key configured, routes will be estimated"),
    }

    serve(engine.build(), config.addr).await
}
