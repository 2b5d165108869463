mod location;
mod quote;
mod request;
mod route;

pub use location::{Coordinates, Location};
pub use quote::{
    AggregatedResult, BestOption, FareQuote, PriceRange, ProviderAvailability, RideAvailability,
    RideOption, Tier,
};
pub use request::{FareRequest, Search};
pub use route::{RouteInfo, TrafficLevel};
