//! `lessonlog` - a local record book for teaching activity
//!
//! This library keeps a teacher's lesson, strategy and activity counts in a
//! small local store, derives report charts from them and asks a
//! text-generation service for descriptions, suggestions and summaries.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod app;
pub mod cli;
pub mod config;
pub mod confirm;
pub mod error;
pub mod generation;
pub mod logging;
pub mod model;
pub mod notify;
pub mod reducer;
pub mod report;
pub mod sort;
pub mod storage;
pub mod view;

pub use app::{App, AppState, Snapshot};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use storage::{Store, StoreStats};
pub use view::View;
