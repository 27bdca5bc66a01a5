//! Two-body collision math: contact time, elastic bounce, inelastic merge.

use crate::body::{Body, BodyBuilder, BodyKind};

use ultraviolet::DVec2;

/// How a colliding pair was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollisionKind {
    Elastic,
    Inelastic,
}

/// Classifies a collision by relative speed.
pub fn classify(relative_speed: f64, elastic_threshold: f64) -> CollisionKind {
    if relative_speed <= elastic_threshold {
        CollisionKind::Elastic
    } else {
        CollisionKind::Inelastic
    }
}

/// Earlier root `t` of `|d + v t|² = r²`, the moment two circles separated
/// by `d` with relative velocity `v` touch. Overlapping circles get a
/// negative `t`. Falls back to `0` when there is no relative motion or the
/// circles never touch.
pub fn contact_time(d: DVec2, v: DVec2, r: f64) -> f64 {
    let a = v.mag_sq();
    if a == 0.0 {
        return 0.0;
    }
    let b = 2.0 * d.dot(v);
    let c = d.mag_sq() - r * r;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return 0.0;
    }
    let t = (-b - discriminant.sqrt()) / (2.0 * a);
    if t.is_finite() { t } else { 0.0 }
}

/// Mass weights `(m2 / M, m1 / M)` used to split a correction between two
/// bodies. Massless pairs split evenly.
fn weights(m1: f64, m2: f64) -> (f64, f64) {
    let total = m1 + m2;
    if total > 0.0 {
        (m2 / total, m1 / total)
    } else {
        (0.5, 0.5)
    }
}

/// Elastic bounce of two overlapping bodies.
///
/// Both bodies are rolled back to the moment of contact, the velocity
/// components along the contact normal are exchanged with the 1-D elastic
/// collision formula (conserving momentum and kinetic energy), then both are
/// advanced again by the same amount of time with their new velocities.
/// Bodies already moving apart are only pushed out of each other.
pub fn bounce(a: &mut Body, b: &mut Body) {
    let r = a.radius() + b.radius();
    let (m1, m2) = (a.mass(), b.mass());
    let (w1, w2) = weights(m1, m2);

    let mut d = b.pos - a.pos;
    if d == DVec2::zero() {
        // coincident centers, separate along +x
        let push = DVec2::new(r.max(f64::MIN_POSITIVE), 0.0);
        a.pos -= push * w1;
        b.pos += push * w2;
        d = b.pos - a.pos;
    }

    let v = b.vel - a.vel;
    let d_dot_v = d.dot(v);
    if d_dot_v >= 0.0 {
        let distance = d.mag();
        if distance < r {
            let tmp = d * (r / distance - 1.0);
            a.pos -= tmp * w1;
            b.pos += tmp * w2;
        }
        return;
    }

    let t = contact_time(d, v, r);
    a.pos += a.vel * t;
    b.pos += b.vel * t;

    let contact = b.pos - a.pos;
    let n = if contact == DVec2::zero() { d.normalized() } else { contact.normalized() };

    let v1n = a.vel.dot(n);
    let v2n = b.vel.dot(n);
    let total = m1 + m2;
    let (v1n_after, v2n_after) = if total > 0.0 {
        (
            (v1n * (m1 - m2) + 2.0 * m2 * v2n) / total,
            (v2n * (m2 - m1) + 2.0 * m1 * v1n) / total,
        )
    } else {
        (v2n, v1n)
    };

    a.vel += n * (v1n_after - v1n);
    b.vel += n * (v2n_after - v2n);

    a.pos -= a.vel * t;
    b.pos -= b.vel * t;
}

/// Construction parameters for the body replacing `a` and `b` after an
/// inelastic collision. Mass is summed, density, position and velocity are
/// mass-weighted, everything else comes from the more massive body.
pub fn merged(a: &Body, b: &Body) -> BodyBuilder {
    let (ma, mb) = (a.mass(), b.mass());
    let heavier = if ma > mb { a } else { b };
    let mass = ma + mb;
    let (ra, rb) = if mass > 0.0 { (ma / mass, mb / mass) } else { (0.5, 0.5) };

    let mut kind = heavier.kind.clone();
    if let BodyKind::Ship(ship) = &mut kind {
        ship.release_all();
    }

    BodyBuilder::new(kind)
        .named(&heavier.label)
        .with_mass(mass)
        .with_density(a.density() * ra + b.density() * rb)
        .with_position(a.pos * ra + b.pos * rb)
        .with_velocity(a.vel * ra + b.vel * rb)
        .with_angle(heavier.angle)
        .with_angular_velocity(heavier.va)
}
