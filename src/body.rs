use crate::{
    constants::THREE_OVER_FOUR_PI,
    geometry::{self, normalize_angle},
    ship::Ship,
};

use ultraviolet::DVec2;

slotmap::new_key_type! {
    /// Handle of a body inside a [`Spacetime`](crate::spacetime::Spacetime).
    /// A removed body's id never becomes valid again.
    pub struct BodyId;
}

/// Coarse classification exposed to renderers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyType {
    Star,
    Planet,
    Moon,
    Asteroid,
    Ship,
}

impl BodyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Star => "star",
            Self::Planet => "planet",
            Self::Moon => "moon",
            Self::Asteroid => "asteroid",
            Self::Ship => "ship",
        }
    }
}

impl std::fmt::Display for BodyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a body is. Ships carry their propulsion, docks and landing gear.
#[derive(Clone, Debug)]
pub enum BodyKind {
    Star,
    Planet,
    Moon,
    Asteroid,
    Ship(Ship),
}

impl BodyKind {
    pub fn body_type(&self) -> BodyType {
        match self {
            Self::Star => BodyType::Star,
            Self::Planet => BodyType::Planet,
            Self::Moon => BodyType::Moon,
            Self::Asteroid => BodyType::Asteroid,
            Self::Ship(_) => BodyType::Ship,
        }
    }
}

/// One sample of acceleration acting on the focus body, kept for vector overlays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceSample {
    /// Magnitude in m/s².
    pub force: f64,
    /// Direction in radians.
    pub angle: f64,
    /// Body exerting the force. A ship's own engines list the ship itself.
    pub source: BodyId,
}

/// The part of a gravitating body other bodies need to feel its pull.
#[derive(Clone, Copy, Debug)]
pub struct GravitySource {
    pub id: BodyId,
    pub pos: DVec2,
    pub mass: f64,
}

/// A simulated object: star, planet, moon, asteroid or ship.
#[derive(Clone, Debug)]
pub struct Body {
    id: BodyId,
    /// Display name.
    pub label: String,
    pub kind: BodyKind,
    /// Position in meters.
    pub pos: DVec2,
    /// Velocity in m/s.
    pub vel: DVec2,
    /// Heading in radians, kept in `[0, 2π)`.
    pub angle: f64,
    /// Angular velocity in rad/s.
    pub va: f64,

    mass: f64,
    density: f64,
    density_scaling: f64,
    volume: f64,
    radius: f64,
    radius_sq: f64,

    /// Velocity change per second accumulated during the current tick.
    pub(crate) dv: DVec2,
    pub(crate) forces: Vec<ForceSample>,

    pub(crate) parent: Option<BodyId>,
    /// Rigid offset from the parent's position while attached.
    pub(crate) offset: DVec2,
}

impl Body {
    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn body_type(&self) -> BodyType {
        self.kind.body_type()
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn radius_sq(&self) -> f64 {
        self.radius_sq
    }

    /// Body this one is attached to, if docked or landed.
    pub fn parent(&self) -> Option<BodyId> {
        self.parent
    }

    pub fn offset(&self) -> DVec2 {
        self.offset
    }

    pub fn is_child(&self) -> bool {
        self.parent.is_some()
    }

    /// Force samples recorded during the last tick. Empty unless this body is the focus.
    pub fn forces(&self) -> &[ForceSample] {
        &self.forces
    }

    pub fn dv(&self) -> DVec2 {
        self.dv
    }

    pub fn ship(&self) -> Option<&Ship> {
        match &self.kind {
            BodyKind::Ship(ship) => Some(ship),
            _ => None,
        }
    }

    pub fn ship_mut(&mut self) -> Option<&mut Ship> {
        match &mut self.kind {
            BodyKind::Ship(ship) => Some(ship),
            _ => None,
        }
    }

    pub fn is_ship(&self) -> bool {
        matches!(self.kind, BodyKind::Ship(_))
    }

    /// Clamps to zero and recomputes the derived volume and radius.
    pub(crate) fn set_mass(&mut self, mass: f64) {
        self.mass = mass.max(0.0);
        self.calculate_volume_and_radius();
    }

    /// Clamps to zero and recomputes the derived volume and radius.
    pub(crate) fn set_density(&mut self, density: f64) {
        self.density = density.max(0.0);
        self.calculate_volume_and_radius();
    }

    fn calculate_volume_and_radius(&mut self) {
        // zero density has no meaningful volume
        self.volume = if self.density > 0.0 {
            (self.mass / self.density) * self.density_scaling
        } else {
            0.0
        };
        self.radius = (self.volume * THREE_OVER_FOUR_PI).cbrt();
        self.radius_sq = self.radius * self.radius;
    }

    pub fn as_source(&self) -> GravitySource {
        GravitySource {
            id: self.id,
            pos: self.pos,
            mass: self.mass,
        }
    }

    pub fn speed(&self) -> f64 {
        self.vel.mag()
    }

    pub fn momentum(&self) -> DVec2 {
        self.vel * self.mass
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.vel.mag_sq()
    }

    pub fn distance_centers_squared(&self, other: &Body) -> f64 {
        (other.pos - self.pos).mag_sq()
    }

    pub fn distance_centers(&self, other: &Body) -> f64 {
        self.distance_centers_squared(other).sqrt()
    }

    /// Surface to surface distance. Negative while overlapping.
    pub fn distance(&self, other: &Body) -> f64 {
        self.distance_centers(other) - self.radius - other.radius
    }

    /// Velocity of `other` as seen from this body.
    pub fn relative_velocity(&self, other: &Body) -> DVec2 {
        other.vel - self.vel
    }

    pub fn relative_speed(&self, other: &Body) -> f64 {
        self.relative_velocity(other).mag()
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        geometry::circle_intersects_circle(self.pos, self.radius, other.pos, other.radius)
    }

    /// Clears the per-tick velocity delta and force samples.
    pub fn reset_forces(&mut self) {
        self.dv = DVec2::zero();
        self.forces.clear();
    }

    /// Adds the gravitational acceleration `G m / d²` toward `source` onto this
    /// tick's velocity delta. With a `display_threshold` the contribution is
    /// also recorded as a force sample when it exceeds the threshold.
    pub fn increment_delta_v(&mut self, source: &GravitySource, g: f64, display_threshold: Option<f64>) {
        let d = source.pos - self.pos;
        let d_sq = d.mag_sq();
        if d_sq == 0.0 {
            return;
        }

        let angle = d.y.atan2(d.x);
        let dv = g * source.mass / d_sq;
        self.dv += DVec2::new(angle.cos(), angle.sin()) * dv;

        if let Some(threshold) = display_threshold {
            if dv > threshold {
                self.forces.push(ForceSample {
                    force: dv,
                    angle,
                    source: source.id,
                });
            }
        }
    }

    /// Integrates the accumulated velocity delta over `dt` seconds. Ships add
    /// their main and lateral thrust first.
    pub fn apply_deltas(&mut self, dt: f64, display_threshold: Option<f64>) {
        if let BodyKind::Ship(ship) = &self.kind {
            let samples = ship.thrust_samples(self.angle);
            for (force, angle) in samples {
                self.dv += DVec2::new(angle.cos(), angle.sin()) * force;
                if let Some(threshold) = display_threshold {
                    if force.abs() > threshold {
                        self.forces.push(ForceSample {
                            force: force.abs(),
                            angle: if force < 0.0 { normalize_angle(angle + std::f64::consts::PI) } else { angle },
                            source: self.id,
                        });
                    }
                }
            }
        }

        self.vel += self.dv * dt;
        self.pos += self.vel * dt;
        self.angle = normalize_angle(self.angle + self.va * dt);
    }

    /// Places this body on a circular orbit of radius `r` around `center`.
    pub fn give_circular_orbit(&mut self, center: &Body, r: f64, angle: f64, retrograde: bool, g: f64) {
        let speed = geometry::speed_for_circular_orbit(g, self.mass, center.mass, r);
        let (pos, vel) = geometry::circular_orbit(center.pos, center.vel, r, angle, speed, retrograde);
        self.pos = pos;
        self.vel = vel;
    }

    /// Snaps this body rigidly onto its parent.
    pub(crate) fn follow(&mut self, parent_pos: DVec2, parent_vel: DVec2) {
        self.pos = parent_pos + self.offset;
        self.vel = parent_vel;
    }

    pub(crate) fn attach_to(&mut self, parent: &Body) {
        self.parent = Some(parent.id);
        self.offset = self.pos - parent.pos;
        self.vel = parent.vel;
    }

    pub(crate) fn detach(&mut self) {
        self.parent = None;
        self.offset = DVec2::zero();
    }
}

/// Circular orbit request resolved when the body is added to a world.
#[derive(Clone, Copy, Debug)]
pub struct OrbitRequest {
    pub center: BodyId,
    pub radius: f64,
    pub angle: f64,
    pub retrograde: bool,
}

/// Typed construction parameters for a [`Body`].
#[derive(Clone, Debug)]
pub struct BodyBuilder {
    pub(crate) label: String,
    pub(crate) kind: BodyKind,
    pub(crate) pos: DVec2,
    pub(crate) vel: DVec2,
    pub(crate) angle: f64,
    pub(crate) va: f64,
    pub(crate) mass: f64,
    pub(crate) density: f64,
    pub(crate) orbit: Option<OrbitRequest>,
}

impl BodyBuilder {
    pub fn new(kind: BodyKind) -> Self {
        Self {
            label: String::new(),
            kind,
            pos: DVec2::zero(),
            vel: DVec2::zero(),
            angle: 0.0,
            va: 0.0,
            mass: 1.0,
            density: 1.0,
            orbit: None,
        }
    }

    pub fn star() -> Self {
        Self::new(BodyKind::Star)
    }

    pub fn planet() -> Self {
        Self::new(BodyKind::Planet)
    }

    pub fn moon() -> Self {
        Self::new(BodyKind::Moon)
    }

    pub fn asteroid() -> Self {
        Self::new(BodyKind::Asteroid)
    }

    pub fn ship(ship: Ship) -> Self {
        Self::new(BodyKind::Ship(ship))
    }

    pub fn named(mut self, label: &str) -> Self {
        self.label = String::from(label);
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    pub fn with_position(mut self, pos: DVec2) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_velocity(mut self, vel: DVec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_angular_velocity(mut self, va: f64) -> Self {
        self.va = va;
        self
    }

    /// Overrides position and velocity with a circular orbit around `center`
    /// once the body is added.
    pub fn orbiting(mut self, center: BodyId, radius: f64, angle: f64, retrograde: bool) -> Self {
        self.orbit = Some(OrbitRequest {
            center,
            radius,
            angle,
            retrograde,
        });
        self
    }

    pub(crate) fn build(self, id: BodyId, density_scaling: f64) -> Body {
        let mut body = Body {
            id,
            label: self.label,
            kind: self.kind,
            pos: self.pos,
            vel: self.vel,
            angle: normalize_angle(self.angle),
            va: self.va,
            mass: self.mass.max(0.0),
            density: self.density.max(0.0),
            density_scaling,
            volume: 0.0,
            radius: 0.0,
            radius_sq: 0.0,
            dv: DVec2::zero(),
            forces: Vec::new(),
            parent: None,
            offset: DVec2::zero(),
        };
        body.calculate_volume_and_radius();
        body
    }
}
