//! Time-of-day keys for daily schedule profiles.

use core::fmt;
use core::str::FromStr;

use crate::error::CoreError;

/// Minutes in one day; `24:00` is the exclusive end of every daily profile.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A time of day with minute resolution, in `[00:00, 24:00]`.
///
/// `24:00` is representable so a profile can name its end of day, but it is
/// never a valid breakpoint key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    pub const END_OF_DAY: TimeOfDay = TimeOfDay(MINUTES_PER_DAY);

    /// Build from hour and minute; `24:00` is accepted, anything later is not.
    pub fn from_hm(hour: u8, minute: u8) -> Option<Self> {
        if minute >= 60 {
            return None;
        }
        let minutes = u16::from(hour) * 60 + u16::from(minute);
        (minutes <= MINUTES_PER_DAY).then_some(Self(minutes))
    }

    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes <= MINUTES_PER_DAY).then_some(Self(minutes))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u8 {
        (self.0 / 60) as u8
    }

    pub fn minute(self) -> u8 {
        (self.0 % 60) as u8
    }

    /// True for `24:00`.
    pub fn is_end_of_day(self) -> bool {
        self.0 == MINUTES_PER_DAY
    }
}

impl FromStr for TimeOfDay {
    type Err = CoreError;

    /// Parse `H:MM` or `HH:MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| CoreError::InvalidTime {
            text: s.to_string(),
            reason,
        };

        let (h, m) = s.split_once(':').ok_or_else(|| invalid("expected HH:MM"))?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(invalid("expected HH:MM"));
        }
        if !h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid("hour and minute must be digits"));
        }

        let hour: u8 = h.parse().map_err(|_| invalid("hour out of range"))?;
        let minute: u8 = m.parse().map_err(|_| invalid("minute out of range"))?;
        if minute >= 60 {
            return Err(invalid("minute out of range"));
        }
        TimeOfDay::from_hm(hour, minute).ok_or_else(|| invalid("past 24:00"))
    }
}

impl fmt::Debug for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeOfDay({})", self)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TimeOfDay {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TimeOfDay {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = <String as serde::Deserialize>::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn display_parse_round_trip(minutes in 0_u16..=MINUTES_PER_DAY) {
            let t = TimeOfDay::from_minutes(minutes).unwrap();
            let parsed: TimeOfDay = t.to_string().parse().unwrap();
            prop_assert_eq!(parsed, t);
        }
    }
}
