pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod interfaces;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{InMemoryBreweryStore, InMemoryVisitStore, ManualClock, SystemClock};
pub use config::AppConfig;
pub use crate::core::{checkin::CheckInPolicy, history::VisitHistory};
pub use domain::geo::{distance_meters, is_within_range};
pub use interfaces::{ApiEvent, ApiHandler, ApiReply};
pub use utils::error::{BeerLogError, ErrorKind, Result};
