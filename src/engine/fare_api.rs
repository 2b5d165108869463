use super::Engine;

use async_trait::async_trait;
use futures::future::join_all;

use crate::{
    api::{FareAPI, RouteAPI},
    entities::{AggregatedResult, FareQuote, FareRequest},
    error::Error,
    pricing::{select, QuoteContext},
};

#[async_trait]
impl FareAPI for Engine {
    #[tracing::instrument(skip_all)]
    async fn compare_fares(&self, request: FareRequest) -> Result<AggregatedResult, Error> {
        let search = request.validate()?;

        let route = match search.route {
            Some(route) => route,
            None => {
                self.resolve_route(search.pickup.clone(), search.dropoff.clone())
                    .await?
            }
        };

        let ctx = QuoteContext::new(
            self.config.clone(),
            self.random.clone(),
            search.pickup,
            search.dropoff,
            route,
            self.clock.now(),
        );

        tracing::info!(
            city = %ctx.city.id,
            distance_km = ctx.distance_km(),
            weather = ctx.weather_event,
            "comparing fares"
        );

        let contexts: Vec<QuoteContext> = (0..self.pipelines.len())
            .map(|stream| ctx.with_random(self.random.fork(stream as u64)))
            .collect();

        let outcomes = join_all(
            self.pipelines
                .iter()
                .zip(contexts.iter())
                .map(|(pipeline, ctx)| pipeline.run(ctx)),
        )
        .await;

        let mut quotes: Vec<FareQuote> = outcomes
            .into_iter()
            .filter_map(|outcome| outcome.into_quote())
            .collect();
        quotes.sort_by(|a, b| a.provider_name.cmp(&b.provider_name));

        let selection = select(&quotes);

        if quotes.is_empty() {
            tracing::warn!("no provider returned a quote");
        }

        Ok(AggregatedResult::new(
            quotes,
            selection.cheapest,
            selection.fastest,
        ))
    }
}
