//! hc-schedule: day-type step functions and weekly calendars.
//!
//! A day profile holds its value from one breakpoint up to the next
//! (zero-order hold). The weekly calendar maps each weekday to a day profile
//! by evaluating schedule rules in declaration order.

pub mod calendar;
pub mod compile;
pub mod error;
pub mod profile;

pub use calendar::WeeklyCalendar;
pub use compile::{CompiledSchedule, compile_schedule, compile_schedules};
pub use error::UnresolvedScheduleError;
pub use profile::DayProfile;
