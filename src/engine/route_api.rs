use super::Engine;

use async_trait::async_trait;
use tokio::time;

use crate::{
    api::RouteAPI,
    entities::{Location, RouteInfo},
    error::{invalid_coordinates_error, Error},
    pricing::geo::GeometricRouteEstimator,
};

#[async_trait]
impl RouteAPI for Engine {
    #[tracing::instrument(skip_all)]
    async fn resolve_route(&self, pickup: Location, dropoff: Location) -> Result<RouteInfo, Error> {
        if !pickup.has_valid_coordinates() || !dropoff.has_valid_coordinates() {
            return Err(invalid_coordinates_error());
        }

        if let Some(resolver) = &self.routes {
            match time::timeout(self.route_timeout, resolver.resolve(&pickup, &dropoff)).await {
                Ok(Ok(route)) => return Ok(route),
                Ok(Err(e)) => tracing::warn!(error = %e, "route lookup failed, estimating"),
                Err(_) => tracing::warn!(
                    timeout_ms = self.route_timeout.as_millis() as u64,
                    "route lookup timed out, estimating"
                ),
            }
        }

        Ok(GeometricRouteEstimator.estimate(&pickup, &dropoff))
    }
}
