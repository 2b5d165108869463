pub mod api;
pub mod clock;
pub mod config;
pub mod engine;
pub mod entities;
pub mod error;
pub mod external;
pub mod pricing;
pub mod providers;
pub mod random;
pub mod server;
