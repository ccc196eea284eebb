//! Candle records, timeframes and the static sample dataset.

pub mod entities;
pub mod sample_data;
pub mod value_objects;

pub use entities::*;
pub use sample_data::SampleDataStore;
pub use value_objects::*;
