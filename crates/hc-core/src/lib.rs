//! hc-core: shared foundation for the HVAC configuration compiler.
//!
//! Contains:
//! - ids (compact handles for resolved entities)
//! - time (time-of-day keys used by schedules)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod time;

pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use time::{MINUTES_PER_DAY, TimeOfDay};
