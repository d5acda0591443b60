//! MongoDB client bootstrap and readiness probe

mod config;
mod connector;
mod health;

pub use config::MongoConfig;
pub use connector::{client_options, connect, connect_with_retry};
pub use health::{HealthStatus, check_health, ping};

pub use mongodb::{Client, Collection, Database};
