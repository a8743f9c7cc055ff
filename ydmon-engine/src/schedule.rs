//! Adaptive polling interval.
//!
//! Idle polling backs off geometrically (1, 2, 4, 8, … units). Busy polling is
//! pinned to a short fixed interval. Activity on the daemon log resets the
//! interval to one unit. Once the interval reaches the ceiling the timer is no
//! longer rearmed, and only log activity brings polling back.

use crate::paths::{BUSY_INTERVAL, POLL_CEILING};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSchedule {
    interval: u32,
    busy_interval: u32,
    ceiling: u32,
}

impl PollSchedule {
    pub fn new(busy_interval: u32, ceiling: u32) -> Self {
        Self {
            interval: 1,
            busy_interval,
            ceiling,
        }
    }

    /// Current interval, in units.
    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// The daemon touched its activity log.
    pub fn on_activity(&mut self) {
        self.interval = 1;
    }

    /// The poll timer fired.
    pub fn on_tick(&mut self, busy: bool) {
        self.interval = if busy {
            self.busy_interval
        } else {
            self.interval.saturating_mul(2)
        };
    }

    /// Units until the next poll, or `None` when polling is suspended.
    pub fn next_delay(&self) -> Option<u32> {
        (self.interval < self.ceiling).then_some(self.interval)
    }
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self::new(BUSY_INTERVAL, POLL_CEILING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_backoff_stops_at_ceiling() {
        let mut schedule = PollSchedule::default();
        let mut delays = vec![schedule.next_delay()];
        for _ in 0..4 {
            schedule.on_tick(false);
            delays.push(schedule.next_delay());
        }
        assert_eq!(delays, [Some(1), Some(2), Some(4), Some(8), None]);
        assert_eq!(schedule.interval(), 16);
    }

    #[test]
    fn activity_resets_from_any_point() {
        let mut schedule = PollSchedule::default();
        for _ in 0..6 {
            schedule.on_tick(false);
        }
        assert_eq!(schedule.next_delay(), None);

        schedule.on_activity();
        assert_eq!(schedule.next_delay(), Some(1));
        schedule.on_tick(false);
        assert_eq!(schedule.next_delay(), Some(2));
    }

    #[test]
    fn busy_pins_the_interval() {
        let mut schedule = PollSchedule::default();
        for _ in 0..3 {
            schedule.on_tick(false);
        }
        assert_eq!(schedule.interval(), 8);

        schedule.on_tick(true);
        assert_eq!(schedule.next_delay(), Some(2));
        schedule.on_tick(true);
        assert_eq!(schedule.next_delay(), Some(2));

        schedule.on_tick(false);
        assert_eq!(schedule.next_delay(), Some(4));
    }

    #[test]
    fn doubling_saturates() {
        let mut schedule = PollSchedule::new(2, u32::MAX);
        for _ in 0..40 {
            schedule.on_tick(false);
        }
        assert_eq!(schedule.interval(), u32::MAX);
        assert_eq!(schedule.next_delay(), None);
    }
}
