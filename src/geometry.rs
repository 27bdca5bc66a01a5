//! Pure geometry and orbital helpers shared by bodies, ships and the world.

use crate::constants::{HALF_PI, SECONDS_PER_DAY, TWO_PI};

use ultraviolet::DVec2;

/// When one radius exceeds the other by this factor the intersection of two
/// circles is approximated with the tangent line of the larger one.
const TANGENT_APPROXIMATION_RATIO: f64 = 8192.0;

/// Wraps an angle into `[0, 2π)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let angle = angle % TWO_PI;
    if angle < 0.0 { angle + TWO_PI } else { angle }
}

/// Bearing in radians from `from` to `to`.
pub fn bearing(from: DVec2, to: DVec2) -> f64 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Tests whether `angle` lies on the arc running counterclockwise from
/// `start` to `end`. Arcs may wrap through zero, e.g. `start = 7π/4`,
/// `end = π/4`.
pub fn is_angle_in_range(angle: f64, start: f64, end: f64) -> bool {
    let angle = normalize_angle(angle);
    let start = normalize_angle(start);
    let end = normalize_angle(end);

    if start < end {
        angle >= start && angle <= end
    } else {
        // arc through zero
        angle <= end || angle >= start
    }
}

pub fn circle_intersects_circle(a: DVec2, ar: f64, b: DVec2, br: f64) -> bool {
    let r = ar + br;
    (b - a).mag_sq() < r * r
}

pub fn circle_contains_circle(a: DVec2, ar: f64, b: DVec2, br: f64) -> bool {
    let r = ar - br;
    ar >= br && (b - a).mag_sq() <= r * r
}

/// Closest point on the circle `(center, r)` to `point`. A point at the exact
/// center maps to the center itself.
pub fn closest_point_on_circle(center: DVec2, r: f64, point: DVec2) -> DVec2 {
    let d = point - center;
    let distance = d.mag();
    if distance == 0.0 {
        center
    } else {
        center + d * (r / distance)
    }
}

/// Intersection points of two circles, or `None` when they don't intersect
/// or share a center. Tangent circles yield the same point twice.
pub fn intersection_of_two_circles(p1: DVec2, r1: f64, p2: DVec2, r2: f64) -> Option<[DVec2; 2]> {
    if r1 > TANGENT_APPROXIMATION_RATIO * r2 {
        let angle = bearing(p1, p2) - HALF_PI;
        let offset = DVec2::new(angle.cos(), angle.sin()) * r2;
        return Some([p2 + offset, p2 - offset]);
    }
    if r2 > TANGENT_APPROXIMATION_RATIO * r1 {
        let angle = bearing(p2, p1) - HALF_PI;
        let offset = DVec2::new(angle.cos(), angle.sin()) * r1;
        return Some([p1 + offset, p1 - offset]);
    }

    let d = p1 - p2;
    let big_r = d.mag();
    if big_r == 0.0 {
        return None;
    }
    if !((r1 - r2).abs() <= big_r && big_r <= r1 + r2) {
        return None;
    }

    let r_sq = big_r * big_r;
    let r2r2 = r1 * r1 - r2 * r2;
    let a = r2r2 / (2.0 * r_sq);
    let c = (2.0 * (r1 * r1 + r2 * r2) / r_sq - (r2r2 * r2r2) / (r_sq * r_sq) - 1.0)
        .max(0.0)
        .sqrt();

    let f = (p1 + p2) * 0.5 + (p2 - p1) * a;
    let g = DVec2::new(p2.y - p1.y, p1.x - p2.x) * (c * 0.5);
    Some([f + g, f - g])
}

/// Converts an orbit radius (meters) and period (days) to meters/second.
pub fn speed_for_radius_and_period(r: f64, period_days: f64) -> f64 {
    (TWO_PI * r) / (period_days * SECONDS_PER_DAY)
}

/// Speed of a satellite on a circular orbit: `v = sqrt(G (m1 + m2) / r)`.
pub fn speed_for_circular_orbit(g: f64, satellite_mass: f64, center_mass: f64, r: f64) -> f64 {
    (g * (satellite_mass + center_mass) / r).sqrt()
}

/// Position and velocity placing a satellite on a circular orbit of radius
/// `r` around a center moving with `center_vel`, at phase `angle`.
/// Retrograde orbits run clockwise.
pub fn circular_orbit(
    center_pos: DVec2,
    center_vel: DVec2,
    r: f64,
    angle: f64,
    speed: f64,
    retrograde: bool,
) -> (DVec2, DVec2) {
    let (sin, cos) = angle.sin_cos();
    let tangent = angle + HALF_PI;
    let reverse = if retrograde { -1.0 } else { 1.0 };

    let pos = center_pos + DVec2::new(cos, sin) * r;
    let vel = center_vel + DVec2::new(tangent.cos(), tangent.sin()) * (speed * reverse);
    (pos, vel)
}
