use axum::extract::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::DynAPI;
use crate::entities::{Location, RouteInfo};
use crate::error::Error;

#[derive(Serialize, Deserialize)]
pub struct ResolveParams {
    pickup: Location,
    dropoff: Location,
}

pub async fn resolve(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<ResolveParams>,
) -> Result<Json<RouteInfo>, Error> {
    let route = api.resolve_route(params.pickup, params.dropoff).await?;

    Ok(route.into())
}
