pub mod fares;
pub mod routes;
