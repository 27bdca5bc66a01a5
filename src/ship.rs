//! Ship propulsion, docks and landing gear.

use crate::{
    body::{Body, BodyId},
    constants::HALF_PI,
    geometry::{bearing, is_angle_in_range},
};

use std::f64::consts::PI;
use ultraviolet::DVec2;

/// Thrust change while accelerating away from zero.
pub const THRUST_STEP: f64 = 0.12;
/// Thrust change while braking back toward zero.
pub const BRAKE_STEP: f64 = 0.03;
/// Thrust or strafe closer to zero than this snaps to zero.
pub const THRUST_SNAP: f64 = 0.005;
/// Angular velocity change per rotate command, per simulated second of tick.
pub const ROTATION_STEP: f64 = 0.01;
pub const ROTATION_SNAP: f64 = 0.005;

/// A docking port on the hull, spanning an arc relative to the ship's heading.
#[derive(Clone, Debug, PartialEq)]
pub struct Dock {
    pub id: usize,
    pub angular_start: f64,
    pub angular_end: f64,
    pub enabled: bool,
    pub(crate) occupied_by: Option<BodyId>,
}

impl Dock {
    pub fn occupied_by(&self) -> Option<BodyId> {
        self.occupied_by
    }

    pub fn status(&self) -> DockStatus {
        if self.occupied_by.is_some() {
            DockStatus::Docked
        } else if self.enabled {
            DockStatus::Enabled
        } else {
            DockStatus::Disabled
        }
    }

    fn accepts(&self, relative_bearing: f64) -> bool {
        self.enabled
            && self.occupied_by.is_none()
            && is_angle_in_range(relative_bearing, self.angular_start, self.angular_end)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LandingGear {
    pub angular_start: f64,
    pub angular_end: f64,
    pub enabled: bool,
    pub(crate) landed_on: Option<BodyId>,
}

impl LandingGear {
    pub fn landed_on(&self) -> Option<BodyId> {
        self.landed_on
    }

    pub fn status(&self) -> GearStatus {
        if self.landed_on.is_some() {
            GearStatus::Landed
        } else if self.enabled {
            GearStatus::Enabled
        } else {
            GearStatus::Disabled
        }
    }
}

impl Default for LandingGear {
    /// Gear on the tail, retracted.
    fn default() -> Self {
        Self {
            angular_start: 3.0 * PI / 4.0,
            angular_end: 5.0 * PI / 4.0,
            enabled: false,
            landed_on: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DockStatus {
    Enabled,
    Disabled,
    Docked,
}

impl DockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::Docked => "docked",
        }
    }
}

impl std::fmt::Display for DockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GearStatus {
    Enabled,
    Disabled,
    Landed,
}

impl GearStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::Landed => "landed",
        }
    }
}

impl std::fmt::Display for GearStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Control inputs an input layer pushes at a ship between ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShipCommand {
    IncreaseThrust,
    DecreaseThrust,
    StrafeLeft,
    StrafeRight,
    RotateLeft,
    RotateRight,
}

/// Ship-specific state of a [`Body`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ship {
    thrust: f64,
    strafe: f64,
    docks: Vec<Dock>,
    landing_gear: LandingGear,
}

impl Ship {
    /// A ship with no docks and retracted tail gear.
    pub fn new() -> Self {
        Self::default()
    }

    /// A ship with an enabled dock on the nose and another on the tail.
    pub fn with_standard_docks() -> Self {
        Self::new()
            .with_dock(-PI / 8.0, PI / 8.0)
            .with_dock(PI - PI / 8.0, PI + PI / 8.0)
    }

    pub fn with_dock(mut self, angular_start: f64, angular_end: f64) -> Self {
        let id = self.docks.len();
        self.docks.push(Dock {
            id,
            angular_start,
            angular_end,
            enabled: true,
            occupied_by: None,
        });
        self
    }

    pub fn with_landing_gear(mut self, angular_start: f64, angular_end: f64, enabled: bool) -> Self {
        self.landing_gear = LandingGear {
            angular_start,
            angular_end,
            enabled,
            landed_on: None,
        };
        self
    }

    pub fn thrust(&self) -> f64 {
        self.thrust
    }

    pub fn strafe(&self) -> f64 {
        self.strafe
    }

    pub fn docks(&self) -> &[Dock] {
        &self.docks
    }

    pub fn dock(&self, index: usize) -> Option<&Dock> {
        self.docks.get(index)
    }

    pub fn landing_gear(&self) -> &LandingGear {
        &self.landing_gear
    }

    pub fn is_docked(&self) -> bool {
        self.docks.iter().any(|dock| dock.occupied_by.is_some())
    }

    pub fn is_landed(&self) -> bool {
        self.landing_gear.landed_on.is_some()
    }

    /// No thrust, no strafe and no spin.
    pub fn is_idle(&self, va: f64) -> bool {
        self.thrust == 0.0 && self.strafe == 0.0 && va == 0.0
    }

    pub fn dock_status(&self, index: usize) -> Option<DockStatus> {
        self.docks.get(index).map(Dock::status)
    }

    pub fn gear_status(&self) -> GearStatus {
        self.landing_gear.status()
    }

    pub fn increase_thrust(&mut self) {
        self.thrust = step_up(self.thrust);
    }

    pub fn decrease_thrust(&mut self) {
        self.thrust = step_down(self.thrust);
    }

    pub fn strafe_right(&mut self) {
        self.strafe = step_up(self.strafe);
    }

    pub fn strafe_left(&mut self) {
        self.strafe = step_down(self.strafe);
    }

    pub(crate) fn cut_engines(&mut self) {
        self.thrust = 0.0;
        self.strafe = 0.0;
    }

    /// Main and lateral engine output as `(acceleration, direction)` pairs.
    pub(crate) fn thrust_samples(&self, angle: f64) -> [(f64, f64); 2] {
        [(self.thrust, angle), (self.strafe, angle + HALF_PI)]
    }

    pub fn thrust_vector(&self, angle: f64) -> DVec2 {
        self.thrust_samples(angle)
            .iter()
            .fold(DVec2::zero(), |acc, (force, dir)| acc + DVec2::new(dir.cos(), dir.sin()) * *force)
    }

    pub(crate) fn set_dock_enabled(&mut self, index: usize, enabled: bool) -> bool {
        match self.docks.get_mut(index) {
            Some(dock) if enabled || dock.occupied_by.is_none() => {
                dock.enabled = enabled;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn set_gear_enabled(&mut self, enabled: bool) -> bool {
        if !enabled && self.is_landed() {
            return false;
        }
        self.landing_gear.enabled = enabled;
        true
    }

    pub(crate) fn occupy_dock(&mut self, index: usize, other: BodyId) {
        if let Some(dock) = self.docks.get_mut(index) {
            dock.occupied_by = Some(other);
        }
    }

    /// Frees whichever dock `other` occupies, returning its index.
    pub(crate) fn release_dock_of(&mut self, other: BodyId) -> Option<usize> {
        let dock = self.docks.iter_mut().find(|dock| dock.occupied_by == Some(other))?;
        dock.occupied_by = None;
        Some(dock.id)
    }

    pub(crate) fn set_landed_on(&mut self, target: Option<BodyId>) {
        self.landing_gear.landed_on = target;
    }

    /// Frees every dock and the landing gear, returning the partners involved.
    pub(crate) fn release_all(&mut self) -> Vec<BodyId> {
        let mut partners: Vec<BodyId> = self.docks.iter_mut().filter_map(|dock| dock.occupied_by.take()).collect();
        partners.extend(self.landing_gear.landed_on.take());
        partners
    }
}

/// Thrust one notch up: full step while accelerating forward, brake step
/// while coming back from reverse.
pub fn step_up(value: f64) -> f64 {
    let value = if value >= 0.0 {
        (value + THRUST_STEP).max(0.0)
    } else {
        (value + BRAKE_STEP).min(0.0)
    };
    snap(value, THRUST_SNAP)
}

pub fn step_down(value: f64) -> f64 {
    let value = if value > 0.0 {
        (value - THRUST_STEP).max(0.0)
    } else {
        (value - BRAKE_STEP).min(0.0)
    };
    snap(value, THRUST_SNAP)
}

/// One rotation notch. The step is divided by the simulated seconds per tick
/// so the turn rate looks the same at every time scale.
pub fn rotation_step(va: f64, clockwise: bool, seconds_per_tick: f64) -> f64 {
    let time_scaling = if seconds_per_tick > 0.0 { 1.0 / seconds_per_tick } else { 1.0 };
    let step = if clockwise { ROTATION_STEP } else { -ROTATION_STEP };
    snap(va + step * time_scaling, ROTATION_SNAP * time_scaling)
}

fn snap(value: f64, epsilon: f64) -> f64 {
    if value.abs() < epsilon { 0.0 } else { value }
}

/// Bearing from `this` to `other`, relative to this body's heading.
fn relative_bearing(this: &Body, other: &Body) -> f64 {
    bearing(this.pos, other.pos) - this.angle
}

/// Index of the first dock on `this` that can take `other` right now.
pub fn dock_slot_for(this: &Body, other: &Body) -> Option<usize> {
    let ship = this.ship()?;
    if this.id() == other.id()
        || this.is_child()
        || other.parent() == Some(this.id())
        || ship.is_landed()
        || !ship.is_idle(this.va)
    {
        return None;
    }
    let relative = relative_bearing(this, other);
    ship.docks.iter().position(|dock| dock.accepts(relative))
}

/// Whether `this` may dock with `other`. With `check_reciprocal` the other
/// ship must agree as well.
pub fn can_dock_with(this: &Body, other: &Body, check_reciprocal: bool) -> bool {
    if dock_slot_for(this, other).is_none() {
        return false;
    }
    !check_reciprocal || (other.is_ship() && can_dock_with(other, this, false))
}

/// Whether the ship `this` may set down on `target`. Ships only land on
/// independent bodies that aren't ships themselves; ships meet by docking.
pub fn can_land_on(this: &Body, target: &Body) -> bool {
    let Some(ship) = this.ship() else {
        return false;
    };
    let gear = &ship.landing_gear;
    this.id() != target.id()
        && !this.is_child()
        && !target.is_ship()
        && !target.is_child()
        && gear.enabled
        && gear.landed_on.is_none()
        && ship.strafe == 0.0
        && this.va == 0.0
        && is_angle_in_range(relative_bearing(this, target), gear.angular_start, gear.angular_end)
}

/// Whether a landed ship's current thrust beats the pull of the body it sits
/// on: one tick of thrust plus gravity must carry it farther away than it is now.
pub fn can_launch(this: &Body, landed_on: &Body, g: f64, dt: f64) -> bool {
    let Some(ship) = this.ship() else {
        return false;
    };
    if ship.landing_gear.landed_on != Some(landed_on.id()) {
        return false;
    }

    let rel = this.pos - landed_on.pos;
    let d_sq = rel.mag_sq();
    if d_sq == 0.0 {
        return false;
    }
    let d = d_sq.sqrt();

    let pull = -rel / d * (g * landed_on.mass() / d_sq);
    let accel = ship.thrust_vector(this.angle) + pull;
    let moved = rel + accel * (dt * dt);
    moved.mag_sq() > d_sq
}
