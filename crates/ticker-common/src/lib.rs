#![doc = "Common types shared across the Ticker workspace."]

pub mod config;
pub mod error;
pub mod metrics;
pub mod rate;
pub mod time;

pub use config::*;
pub use error::*;
pub use metrics::*;
pub use rate::*;
pub use time::*;
