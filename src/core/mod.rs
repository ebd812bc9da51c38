//! Core data models, quota normalization and display rules

mod display;
mod error;
mod models;
mod normalize;
mod provider;

pub use display::*;
pub use error::*;
pub use models::*;
pub use normalize::*;
pub use provider::*;
