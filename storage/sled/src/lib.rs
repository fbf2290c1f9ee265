pub mod engine;
pub mod error;
pub mod index;
pub mod planner_integration;
pub mod scan_index;

pub use engine::{EngineConfig, SledStorageEngine};
pub use error::IndexError;
pub use index::{IndexManager, IndexRecord, SledIndex};
pub use scan_index::SledIndexCursor;
