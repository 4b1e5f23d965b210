use serde::{Deserialize, Serialize};

/// In-game time of day. Hours run 0..24; days start at 1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Clock {
    pub hour: u32,
    pub day: u32,
}

impl Default for Clock {
    fn default() -> Self {
        Self { hour: 8, day: 1 }
    }
}

impl Clock {
    /// Move forward `hours`. Returns the number of day boundaries crossed.
    pub fn advance(&mut self, hours: u32) -> u32 {
        let total = self.hour + hours;
        let days = total / 24;
        self.hour = total % 24;
        self.day += days;
        days
    }

    pub fn is_night(&self) -> bool {
        self.hour >= 20 || self.hour < 6
    }

    /// e.g. `Day 3, 9:00 PM`.
    pub fn label(&self) -> String {
        format!("Day {}, {}", self.day, format_hour(self.hour))
    }
}

pub fn format_hour(hour: u32) -> String {
    let ampm = if hour >= 12 { "PM" } else { "AM" };
    let mut h = hour % 12;
    if h == 0 {
        h = 12;
    }
    format!("{}:00 {}", h, ampm)
}
