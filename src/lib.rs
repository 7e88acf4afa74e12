pub mod aggregate;
pub mod config;
pub mod derived;
pub mod error;
pub mod export;
pub mod joiner;
pub mod loader;
pub mod pairing;
pub mod possession;
pub mod records;
pub mod timeline;

pub use error::{StatsError, StatsResult};
