//! Physical constants and unit conversions.

/// The gravitational constant in m³ kg⁻¹ s⁻².
pub const G: f64 = 6.674e-11;

/// One earth g of acceleration in m/s².
pub const G_FORCE: f64 = 9.80665;

/// One astronomical unit in meters.
pub const AU: f64 = 149_597_870_700.0;

pub const TWO_PI: f64 = std::f64::consts::TAU;
pub const HALF_PI: f64 = std::f64::consts::FRAC_PI_2;

/// Used in volume of a sphere calculations.
pub const THREE_OVER_FOUR_PI: f64 = 3.0 / (4.0 * std::f64::consts::PI);

pub const SECONDS_PER_MINUTE: f64 = 60.0;
pub const MINUTES_PER_HOUR: u32 = 60;
pub const HOURS_PER_DAY: u32 = 24;
pub const DAYS_PER_YEAR: u32 = 365;
pub const SECONDS_PER_DAY: f64 = 86_400.0;
