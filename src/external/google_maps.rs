use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    api::RouteResolver,
    entities::{Location, RouteInfo, TrafficLevel},
    error::{invalid_input_error, upstream_error, Error},
};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Response {
    status: String,
    #[serde(default)]
    rows: Vec<Row>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Row {
    elements: Vec<Element>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Element {
    status: String,
    distance: Option<Value>,
    duration: Option<Value>,
    duration_in_traffic: Option<Value>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct Value {
    value: f64,
}

/// Google Distance Matrix client. Traffic is graded from how much longer
/// the in-traffic duration is than the free-flow one.
#[derive(Clone, Debug)]
pub struct DistanceMatrix {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl DistanceMatrix {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
            api_key: api_key.into(),
        }
    }

    #[tracing::instrument(skip_all)]
    pub async fn find_route(&self, pickup: &Location, dropoff: &Location) -> Result<RouteInfo, Error> {
        let origin: String = pickup.coordinates().into();
        let destination: String = dropoff.coordinates().into();

        let url = format!(
            "{}/maps/api/distancematrix/json",
            self.api_base.trim_end_matches('/')
        );

        let res = self
            .client
            .get(url)
            .query(&[("origins", origin)])
            .query(&[("destinations", destination)])
            .query(&[("departure_time", "now")])
            .query(&[("traffic_model", "best_guess")])
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status_code = res.status().as_u16();

        if (400..500).contains(&status_code) {
            return Err(invalid_input_error());
        } else if status_code != 200 {
            return Err(upstream_error());
        }

        let data: Response = res.json().await?;

        if data.status != "OK" {
            tracing::warn!(status = %data.status, "distance matrix refused request");
            return Err(upstream_error());
        }

        let element = data
            .rows
            .into_iter()
            .next()
            .and_then(|row| row.elements.into_iter().next())
            .ok_or_else(upstream_error)?;

        if element.status != "OK" {
            return Err(upstream_error());
        }

        let distance = element.distance.ok_or_else(upstream_error)?.value;
        let free_flow = element.duration.ok_or_else(upstream_error)?.value;
        let in_traffic = element.duration_in_traffic.map_or(free_flow, |d| d.value);

        let traffic_level = if free_flow > 0.0 {
            TrafficLevel::from_delay_ratio(in_traffic / free_flow)
        } else {
            TrafficLevel::Light
        };

        Ok(RouteInfo::new(distance, in_traffic / 60.0, traffic_level))
    }
}

#[async_trait]
impl RouteResolver for DistanceMatrix {
    async fn resolve(&self, pickup: &Location, dropoff: &Location) -> Result<RouteInfo, Error> {
        self.find_route(pickup, dropoff).await
    }
}
