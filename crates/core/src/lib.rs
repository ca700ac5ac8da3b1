//! Core types, classification, and statistics fold for the usage analytics service.

pub mod error;
pub mod keys;
pub mod limits;
pub mod record;
pub mod retention;
pub mod stats;
pub mod user_agent;

pub use error::{Error, Result, StoreErrorCode, ValidationErrorCode};
pub use record::*;
pub use stats::*;
pub use user_agent::{Browser, Device};
