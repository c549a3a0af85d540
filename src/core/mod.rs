pub mod checkin;
pub mod history;

pub use crate::domain::model::{Brewery, CheckInRequest, Coordinate, NewVisit, Visit};
pub use crate::domain::ports::{BreweryStore, Clock, Page, VisitStore};
pub use crate::utils::error::Result;
