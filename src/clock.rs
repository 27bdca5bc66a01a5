use crate::constants::{DAYS_PER_YEAR, HOURS_PER_DAY, MINUTES_PER_HOUR, SECONDS_PER_MINUTE};

/// Fraction of a minute within which accumulated seconds count as a full
/// minute. Absorbs rounding drift from summing non-binary tick lengths.
const CARRY_TOLERANCE: f64 = 1.0e-9;

/// Simulated time elapsed since the world was created.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ElapsedTime {
    pub years: u64,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    /// Always in `[0, 60)`.
    pub seconds: f64,
}

impl ElapsedTime {
    /// Adds `dt` simulated seconds, carrying into minutes, hours, days and years.
    pub fn advance(&mut self, dt: f64) {
        if !(dt > 0.0) {
            return;
        }

        let tolerance = SECONDS_PER_MINUTE * CARRY_TOLERANCE;
        self.seconds += dt;
        if self.seconds < SECONDS_PER_MINUTE - tolerance {
            return;
        }

        let whole_minutes = ((self.seconds + tolerance) / SECONDS_PER_MINUTE).floor();
        self.seconds -= whole_minutes * SECONDS_PER_MINUTE;
        if self.seconds < tolerance {
            self.seconds = 0.0;
        }

        let minutes = self.minutes as u64 + whole_minutes as u64;
        self.minutes = (minutes % MINUTES_PER_HOUR as u64) as u32;

        let hours = self.hours as u64 + minutes / MINUTES_PER_HOUR as u64;
        self.hours = (hours % HOURS_PER_DAY as u64) as u32;

        let days = self.days as u64 + hours / HOURS_PER_DAY as u64;
        self.days = (days % DAYS_PER_YEAR as u64) as u32;

        self.years += days / DAYS_PER_YEAR as u64;
    }

    pub fn total_seconds(&self) -> f64 {
        let days = self.years as f64 * DAYS_PER_YEAR as f64 + self.days as f64;
        let hours = days * HOURS_PER_DAY as f64 + self.hours as f64;
        let minutes = hours * MINUTES_PER_HOUR as f64 + self.minutes as f64;
        minutes * SECONDS_PER_MINUTE + self.seconds
    }
}

impl std::fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}y {}d {:02}:{:02}:{:05.2}",
            self.years, self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Simulated seconds per tick, ramped linearly toward a target instead of
/// jumping to it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeScale {
    current: f64,
    from: f64,
    target: f64,
    step: u32,
    ramp_ticks: u32,
}

impl TimeScale {
    pub fn new(seconds_per_tick: f64) -> Self {
        let seconds_per_tick = seconds_per_tick.max(0.0);
        Self {
            current: seconds_per_tick,
            from: seconds_per_tick,
            target: seconds_per_tick,
            step: 0,
            ramp_ticks: 0,
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_ramping(&self) -> bool {
        self.step < self.ramp_ticks
    }

    /// Starts a ramp from the current value to `target` over `ramp_ticks`
    /// ticks. Negative targets clamp to zero.
    pub fn set_target(&mut self, target: f64, ramp_ticks: u32) {
        self.from = self.current;
        self.target = target.max(0.0);
        self.step = 0;
        self.ramp_ticks = ramp_ticks;
        if ramp_ticks == 0 {
            self.current = self.target;
        }
    }

    /// Moves one tick along the ramp and returns the seconds this tick covers.
    pub fn advance(&mut self) -> f64 {
        if self.is_ramping() {
            self.step += 1;
            let progress = self.step as f64 / self.ramp_ticks as f64;
            self.current = self.from + (self.target - self.from) * progress;
        }
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_day_of_minutes() {
        let mut t = ElapsedTime::default();
        for _ in 0..1440 {
            t.advance(60.0);
        }
        assert_eq!(t.days, 1);
        assert_eq!((t.hours, t.minutes), (0, 0));
        assert_eq!(t.seconds, 0.0);
    }

    #[test]
    fn realtime_ticks_roll_over_one_day() {
        let mut t = ElapsedTime::default();
        for _ in 0..86_400 * 60 {
            t.advance(1.0 / 60.0);
        }
        assert_eq!(t.days, 1);
        assert_eq!((t.hours, t.minutes), (0, 0));
        assert_eq!(t.seconds, 0.0);
    }

    #[test]
    fn tenth_second_ticks_roll_over_one_day() {
        let mut t = ElapsedTime::default();
        for _ in 0..864_000 {
            t.advance(0.1);
        }
        assert_eq!(t.days, 1);
        assert_eq!((t.hours, t.minutes), (0, 0));
        assert_eq!(t.seconds, 0.0);
    }

    #[test]
    fn carries_into_years() {
        let mut t = ElapsedTime::default();
        t.advance(365.0 * 86_400.0 + 3_661.5);
        assert_eq!(t.years, 1);
        assert_eq!(t.days, 0);
        assert_eq!((t.hours, t.minutes), (1, 1));
        assert!((t.seconds - 1.5).abs() < 1e-9);
        assert!((t.total_seconds() - (365.0 * 86_400.0 + 3_661.5)).abs() < 1e-6);
    }

    #[test]
    fn ignores_non_positive_steps() {
        let mut t = ElapsedTime::default();
        t.advance(-5.0);
        t.advance(f64::NAN);
        assert_eq!(t, ElapsedTime::default());
    }

    #[test]
    fn display() {
        let mut t = ElapsedTime::default();
        t.advance(90_061.0);
        assert_eq!(t.to_string(), "0y 1d 01:01:01.00");
    }

    #[test]
    fn ramps_linearly() {
        let mut scale = TimeScale::new(1.0);
        scale.set_target(5.0, 4);
        assert_eq!(scale.advance(), 2.0);
        assert_eq!(scale.advance(), 3.0);
        assert_eq!(scale.advance(), 4.0);
        assert_eq!(scale.advance(), 5.0);
        assert!(!scale.is_ramping());
        assert_eq!(scale.advance(), 5.0);
    }

    #[test]
    fn zero_ramp_snaps() {
        let mut scale = TimeScale::new(1.0);
        scale.set_target(-3.0, 0);
        assert_eq!(scale.current(), 0.0);
        assert_eq!(scale.advance(), 0.0);
    }
}
