use async_trait::async_trait;
use std::sync::Arc;

use crate::entities::{AggregatedResult, FareRequest, Location, RouteInfo};
use crate::error::Error;

#[async_trait]
pub trait FareAPI {
    async fn compare_fares(&self, request: FareRequest) -> Result<AggregatedResult, Error>;
}

#[async_trait]
pub trait RouteAPI {
    async fn resolve_route(&self, pickup: Location, dropoff: Location) -> Result<RouteInfo, Error>;
}

pub trait API: FareAPI + RouteAPI {}

pub type DynAPI = Arc<dyn API + Send + Sync>;

/// Supplies road distance and live travel time for a pair of points.
#[async_trait]
pub trait RouteResolver: Send + Sync {
    async fn resolve(&self, pickup: &Location, dropoff: &Location) -> Result<RouteInfo, Error>;
}
