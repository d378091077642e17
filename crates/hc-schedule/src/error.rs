use chrono::Weekday;

/// A weekday no rule covers, in a schedule without a `default_day`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("schedule '{schedule}': no day profile applies on {weekday}")]
pub struct UnresolvedScheduleError {
    pub schedule: String,
    pub weekday: Weekday,
}
