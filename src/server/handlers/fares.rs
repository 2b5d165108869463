use axum::extract::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::DynAPI;
use crate::entities::{BestOption, FareQuote, FareRequest};
use crate::error::{no_fares_error, Error};

#[derive(Debug, Serialize, Deserialize)]
pub struct CompareResponse {
    token: Uuid,
    fares: Vec<FareQuote>,
    cheapest: Option<BestOption>,
    fastest: Option<BestOption>,
}

pub async fn compare(
    Extension(api): Extension<DynAPI>,
    Json(request): Json<FareRequest>,
) -> Result<Json<CompareResponse>, Error> {
    let result = api.compare_fares(request).await?;

    if result.quotes.is_empty() {
        return Err(no_fares_error());
    }

    Ok(CompareResponse {
        token: result.token,
        fares: result.quotes,
        cheapest: result.cheapest,
        fastest: result.fastest,
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FareAPI, RouteAPI, API};
    use crate::entities::{AggregatedResult, Location, RouteInfo, TrafficLevel};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Unavailable;

    #[async_trait]
    impl FareAPI for Unavailable {
        async fn compare_fares(&self, _: FareRequest) -> Result<AggregatedResult, Error> {
            Ok(AggregatedResult::new(vec![], None, None))
        }
    }

    #[async_trait]
    impl RouteAPI for Unavailable {
        async fn resolve_route(&self, _: Location, _: Location) -> Result<RouteInfo, Error> {
            Ok(RouteInfo::new(0.0, 0.0, TrafficLevel::Light))
        }
    }

    impl API for Unavailable {}

    #[tokio::test]
    async fn empty_comparison_is_an_error() {
        let api = Arc::new(Unavailable) as DynAPI;
        let request = FareRequest::new(
            Location::new("Baner, Pune", 18.559, 73.7868),
            Location::new("Hinjewadi, Pune", 18.5913, 73.7389),
        );

        let err = compare(Extension(api), Json(request)).await.unwrap_err();

        assert_eq!(err.code, 200);
    }
}
