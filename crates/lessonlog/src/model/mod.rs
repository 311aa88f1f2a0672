//! The domain record and its seed values.

pub mod record;
pub mod seed;

pub use record::{
    CounterGroup, ExperienceCone, Extracurricular, FormData, ResourceRooms, SchoolInfo,
    StrategyUsage,
};
