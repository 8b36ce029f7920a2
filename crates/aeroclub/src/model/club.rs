//! Club-wide booking settings.

use serde::{Deserialize, Serialize};

/// Default opening hour for reservations.
pub const DEFAULT_START_HOUR: u32 = 7;

/// Default closing hour for reservations.
pub const DEFAULT_END_HOUR: u32 = 21;

/// Hours of the day, in club local time, during which aircraft can be booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingHours {
    /// First hour a reservation may start in (0-23).
    pub start_hour: u32,
    /// Hour at which reservations must have ended (0-23).
    pub end_hour: u32,
}

impl OperatingHours {
    /// Create operating hours from explicit bounds.
    #[must_use]
    pub fn new(start_hour: u32, end_hour: u32) -> Self {
        Self {
            start_hour,
            end_hour,
        }
    }
}

impl Default for OperatingHours {
    fn default() -> Self {
        Self::new(DEFAULT_START_HOUR, DEFAULT_END_HOUR)
    }
}

impl std::fmt::Display for OperatingHours {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}h00 - {}h00", self.start_hour, self.end_hour)
    }
}
