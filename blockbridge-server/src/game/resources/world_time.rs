use std::time::Duration;

use bevy::prelude::Resource;
use blockbridge_game_common::messages::server;

pub const TICKS_PER_SECOND: i64 = 20;
pub const TICKS_PER_DAY: i64 = 24000;
pub const TICK_DURATION: Duration = Duration::from_millis(1000 / TICKS_PER_SECOND as u64);

#[derive(Resource, Debug)]
pub struct WorldTime {
    pub world_age: i64,
    pub time_of_day: i64,
    pub frozen: bool,
    pub time_since_last_tick: Duration,
}

impl WorldTime {
    pub fn new() -> Self {
        Self {
            world_age: 0,
            time_of_day: 0,
            frozen: false,
            time_since_last_tick: Duration::ZERO,
        }
    }

    /// Runs every whole tick in `delta`. Returns true when a second
    /// boundary was crossed and clients are due an update.
    pub fn advance(&mut self, delta: Duration) -> bool {
        self.time_since_last_tick += delta;

        let mut broadcast = false;
        while self.time_since_last_tick >= TICK_DURATION {
            self.time_since_last_tick -= TICK_DURATION;
            self.world_age += 1;
            if !self.frozen {
                self.time_of_day = (self.time_of_day + 1) % TICKS_PER_DAY;
            }
            if self.world_age % TICKS_PER_SECOND == 0 {
                broadcast = true;
            }
        }
        broadcast
    }

    pub fn set_time_of_day(&mut self, ticks: i64, frozen: bool) {
        self.time_of_day = ticks.rem_euclid(TICKS_PER_DAY);
        self.frozen = frozen;
    }

    pub fn snapshot(&self) -> server::WorldTime {
        server::WorldTime {
            world_age: self.world_age,
            time_of_day: self.time_of_day,
            frozen: self.frozen,
        }
    }
}

impl Default for WorldTime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_at_twenty_per_second() {
        let mut time = WorldTime::new();
        assert!(!time.advance(Duration::from_millis(120)));
        assert_eq!(time.world_age, 2);
        assert_eq!(time.time_of_day, 2);

        assert!(time.advance(Duration::from_millis(900)));
        assert_eq!(time.world_age, 20);
    }

    #[test]
    fn each_schedule_run_is_one_tick() {
        assert_eq!(TICK_DURATION, Duration::from_millis(50));

        let mut time = WorldTime::new();
        let broadcasts = (0..TICKS_PER_SECOND)
            .filter(|_| time.advance(TICK_DURATION))
            .count();
        assert_eq!(time.world_age, TICKS_PER_SECOND);
        assert_eq!(broadcasts, 1);
    }

    #[test]
    fn frozen_time_of_day_stays_put() {
        let mut time = WorldTime::new();
        time.set_time_of_day(6000, true);
        time.advance(Duration::from_secs(2));
        assert_eq!(time.time_of_day, 6000);
        assert_eq!(time.world_age, 40);
        assert!(time.snapshot().frozen);
    }

    #[test]
    fn day_wraps() {
        let mut time = WorldTime::new();
        time.set_time_of_day(TICKS_PER_DAY - 1, false);
        time.advance(Duration::from_millis(100));
        assert_eq!(time.time_of_day, 1);

        time.set_time_of_day(-1000, false);
        assert_eq!(time.time_of_day, TICKS_PER_DAY - 1000);
    }
}
