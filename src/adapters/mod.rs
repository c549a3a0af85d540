// Adapters layer: ports 的具體實作。目前提供記憶體儲存與時鐘，資料庫實作不在此 crate 內。

pub mod clock;
pub mod memory;

pub use clock::{ManualClock, SystemClock};
pub use memory::{InMemoryBreweryStore, InMemoryVisitStore};
