use crate::{
    body::{Body, BodyBuilder, BodyId, GravitySource},
    clock::{ElapsedTime, TimeScale},
    collision::{self, CollisionKind},
    config::SpacetimeConfig,
    geometry,
    ship::{self, DockStatus, GearStatus, Ship, ShipCommand},
};

use broccoli::aabb::Rect;
use slotmap::SlotMap;
use tracing::{debug, info, trace};
use ultraviolet::DVec2;

use std::collections::{HashMap, VecDeque};

/// Surface gap, as a fraction of the combined radii, within which two bodies
/// count as touching for explicit dock and land requests.
const CONTACT_RANGE: f64 = 0.1;

/// Bodies an external collaborator (camera, input layer, UI) points at.
/// Removing a body clears every designation that names it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Designations {
    /// The camera center. Only this body records force samples.
    pub focus: Option<BodyId>,
    /// The ship the player controls and respawns at.
    pub player_ship: Option<BodyId>,
    pub highlighted: Option<BodyId>,
    pub selected: Option<BodyId>,
}

impl Designations {
    fn clear(&mut self, id: BodyId) {
        for slot in [&mut self.focus, &mut self.player_ship, &mut self.highlighted, &mut self.selected] {
            if *slot == Some(id) {
                *slot = None;
            }
        }
    }
}

/// How [`Spacetime::resolve_collision`] settled a pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollisionOutcome {
    Bounced,
    Docked,
    Landed,
    /// Both bodies were replaced by the given one.
    Merged(BodyId),
}

/// The simulated world: every body, the gravity/collision loop and the clock.
///
/// A single-threaded, fixed-rate simulation. An external driver calls
/// [`tick`](Self::tick) (or [`advance`](Self::advance)) at a constant cadence;
/// commands and body additions/removals happen between ticks.
#[derive(Debug)]
pub struct Spacetime {
    config: SpacetimeConfig,
    bodies: SlotMap<BodyId, Body>,
    /// Bodies heavy enough to exert gravity.
    gravitating: Vec<BodyId>,
    /// Bodies that only feel gravity.
    react_only: Vec<BodyId>,
    /// Bodies rigidly attached to a parent.
    children: Vec<BodyId>,
    by_label: HashMap<String, Vec<BodyId>>,
    designations: Designations,
    running: bool,
    elapsed: ElapsedTime,
    time_scale: TimeScale,
    ticks_since_collision_pass: u32,
    /// Ticks run so far.
    frame: u64,
}

impl Default for Spacetime {
    fn default() -> Self {
        Self::new()
    }
}

impl Spacetime {
    pub fn new() -> Self {
        Self::with_config(SpacetimeConfig::default())
    }

    pub fn with_config(config: SpacetimeConfig) -> Self {
        let time_scale = TimeScale::new(config.initial_seconds_per_tick);
        Self {
            config,
            bodies: SlotMap::with_key(),
            gravitating: Vec::new(),
            react_only: Vec::new(),
            children: Vec::new(),
            by_label: HashMap::new(),
            designations: Designations::default(),
            running: false,
            elapsed: ElapsedTime::default(),
            time_scale,
            ticks_since_collision_pass: 0,
            frame: 0,
        }
    }

    pub fn config(&self) -> &SpacetimeConfig {
        &self.config
    }

    // Time //////////////////////////////////////////////////////////////////

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            info!("spacetime started");
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            info!("spacetime stopped");
        }
    }

    pub fn toggle(&mut self) {
        if self.running { self.stop() } else { self.start() }
    }

    pub fn elapsed(&self) -> ElapsedTime {
        self.elapsed
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Simulated seconds covered by one tick right now.
    pub fn seconds_per_tick(&self) -> f64 {
        self.time_scale.current()
    }

    pub fn time_scale(&self) -> &TimeScale {
        &self.time_scale
    }

    /// Ramps the simulated seconds per tick toward `seconds_per_tick` over the
    /// configured transition window.
    pub fn set_time_scale(&mut self, seconds_per_tick: f64) {
        let ramp_ticks = self.config.time_scale_ramp_ticks();
        self.time_scale.set_target(seconds_per_tick, ramp_ticks);
        info!(seconds_per_tick, ramp_ticks, "time scale change");
    }

    /// Runs one tick at the current point of the time-scale ramp. Returns the
    /// seconds the tick covered.
    pub fn advance(&mut self) -> f64 {
        let dt = self.time_scale.advance();
        self.tick(dt);
        dt
    }

    /// Advances the world by `dt` simulated seconds. Does nothing while stopped.
    pub fn tick(&mut self, dt: f64) {
        if !self.running {
            return;
        }

        self.ticks_since_collision_pass += 1;
        if self.ticks_since_collision_pass >= self.config.collision_interval {
            self.ticks_since_collision_pass = 0;
            self.resolve_collisions();
        }

        self.reset_forces();
        self.accumulate_gravity();
        self.integrate(dt);
        self.sync_children();

        self.elapsed.advance(dt);
        self.frame += 1;
    }

    fn reset_forces(&mut self) {
        for body in self.bodies.values_mut() {
            body.reset_forces();
        }
    }

    /// Every independent body feels every gravitating body but itself.
    fn accumulate_gravity(&mut self) {
        let g = self.config.gravitational_constant;
        let threshold = self.config.force_display_threshold;
        let focus = self.designations.focus;

        let sources = self
            .gravitating
            .iter()
            .filter_map(|id| self.bodies.get(*id))
            .filter(|body| !body.is_child())
            .map(Body::as_source)
            .collect::<Vec<GravitySource>>();

        for (id, body) in self.bodies.iter_mut() {
            if body.is_child() {
                continue;
            }
            let display = (focus == Some(id)).then_some(threshold);
            for source in sources.iter().filter(|source| source.id != id) {
                body.increment_delta_v(source, g, display);
            }
        }
    }

    fn integrate(&mut self, dt: f64) {
        let threshold = self.config.force_display_threshold;
        let focus = self.designations.focus;

        for (id, body) in self.bodies.iter_mut() {
            if !body.is_child() {
                body.apply_deltas(dt, (focus == Some(id)).then_some(threshold));
            }
        }
    }

    /// Snaps every child onto its parent, parents before their children.
    fn sync_children(&mut self) {
        let mut order = self
            .children
            .iter()
            .map(|&id| (self.depth(id), id))
            .collect::<Vec<_>>();
        order.sort_by_key(|(depth, _)| *depth);

        for (_, id) in order {
            let Some(parent) = self.bodies.get(id).and_then(Body::parent) else {
                continue;
            };
            let Some((pos, vel)) = self.bodies.get(parent).map(|p| (p.pos, p.vel)) else {
                continue;
            };
            if let Some(child) = self.bodies.get_mut(id) {
                child.follow(pos, vel);
            }
        }
    }

    /// Whether `ancestor` appears on the parent chain of `id`.
    fn descends_from(&self, id: BodyId, ancestor: BodyId) -> bool {
        let mut current = id;
        for _ in 0..=self.children.len() {
            match self.bodies.get(current).and_then(Body::parent) {
                Some(parent) if parent == ancestor => return true,
                Some(parent) => current = parent,
                None => return false,
            }
        }
        false
    }

    fn depth(&self, id: BodyId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.bodies.get(current).and_then(Body::parent) {
            depth += 1;
            current = parent;
            if depth > self.children.len() {
                break;
            }
        }
        depth
    }

    // Collisions ////////////////////////////////////////////////////////////

    /// Finds and resolves every overlapping pair of independent bodies.
    /// Bodies destroyed by a merge are never matched again; the merged body
    /// is checked against everything still alive. Returns the number of
    /// collisions resolved.
    pub fn resolve_collisions(&mut self) -> usize {
        let snapshot = self
            .bodies
            .iter()
            .filter(|(_, body)| !body.is_child())
            .map(|(id, _)| id)
            .collect::<Vec<_>>();
        if snapshot.len() < 2 {
            return 0;
        }

        let mut rects = snapshot
            .iter()
            .enumerate()
            .map(|(index, id)| {
                let body = &self.bodies[*id];
                let min = body.pos - DVec2::broadcast(body.radius());
                let max = body.pos + DVec2::broadcast(body.radius());
                (Rect::new(min.x, max.x, min.y, max.y), index)
            })
            .collect::<Vec<_>>();

        let mut pairs = Vec::new();
        let mut broccoli = broccoli::Tree::new(&mut rects);
        broccoli.find_colliding_pairs(|i, j| {
            let i = *i.unpack_inner();
            let j = *j.unpack_inner();
            pairs.push((i.min(j), i.max(j)));
        });
        pairs.sort_unstable();

        let mut queue = pairs
            .into_iter()
            .map(|(i, j)| (snapshot[i], snapshot[j]))
            .collect::<VecDeque<_>>();

        let mut count = 0;
        while let Some((a, b)) = queue.pop_front() {
            let overlapping = match (self.bodies.get(a), self.bodies.get(b)) {
                (Some(body_a), Some(body_b)) => body_a.overlaps(body_b),
                // destroyed earlier in this pass
                _ => false,
            };
            if !overlapping {
                continue;
            }

            match self.resolve_collision(a, b) {
                Some(CollisionOutcome::Merged(merged)) => {
                    count += 1;
                    if let Some(body) = self.bodies.get(merged) {
                        queue.extend(
                            self.bodies
                                .iter()
                                .filter(|(id, other)| *id != merged && !other.is_child() && body.overlaps(other))
                                .map(|(id, _)| (merged, id)),
                        );
                    }
                }
                Some(_) => count += 1,
                None => {}
            }
        }

        if count > 0 {
            trace!(collisions = count, "collision pass");
        }
        count
    }

    /// Resolves a collision between `a` and `b`, which are assumed to be in
    /// contact. Slow contacts bounce elastically and may end in docking or
    /// landing; fast ones merge both bodies into one. Returns `None` when the
    /// pair can't collide (missing, identical, or attached bodies).
    pub fn resolve_collision(&mut self, a: BodyId, b: BodyId) -> Option<CollisionOutcome> {
        let (body_a, body_b) = (self.bodies.get(a)?, self.bodies.get(b)?);
        if a == b || body_a.is_child() || body_b.is_child() {
            return None;
        }

        let relative_speed = body_a.relative_speed(body_b);
        match collision::classify(relative_speed, self.config.elastic_collision_threshold) {
            CollisionKind::Elastic => {
                let [body_a, body_b] = self.bodies.get_disjoint_mut([a, b])?;
                collision::bounce(body_a, body_b);

                let speed = body_a.relative_speed(body_b);
                let (a_is_ship, b_is_ship) = (body_a.is_ship(), body_b.is_ship());

                if a_is_ship && b_is_ship && speed <= self.config.docking_threshold {
                    if self.link_dock(a, b) || self.link_dock(b, a) {
                        return Some(CollisionOutcome::Docked);
                    }
                } else if a_is_ship != b_is_ship && speed <= self.config.landing_threshold {
                    let (ship, target) = if a_is_ship { (a, b) } else { (b, a) };
                    if self.link_landing(ship, target) {
                        return Some(CollisionOutcome::Landed);
                    }
                }
                Some(CollisionOutcome::Bounced)
            }
            CollisionKind::Inelastic => self.merge(a, b).map(CollisionOutcome::Merged),
        }
    }

    /// Replaces `a` and `b` with a single body, see [`collision::merged`].
    fn merge(&mut self, a: BodyId, b: BodyId) -> Option<BodyId> {
        self.release_links(a);
        self.release_links(b);

        let builder = collision::merged(self.bodies.get(a)?, self.bodies.get(b)?);
        let inherits = |slot: Option<BodyId>| slot == Some(a) || slot == Some(b);
        let focus = inherits(self.designations.focus);
        let player_ship = inherits(self.designations.player_ship);

        let merged = self.add(builder);
        self.remove(a);
        self.remove(b);

        if focus {
            self.designations.focus = Some(merged);
        }
        if player_ship {
            self.designations.player_ship = Some(merged);
        }

        if let Some(body) = self.bodies.get(merged) {
            debug!(label = %body.label, mass = body.mass(), "bodies merged");
        }
        Some(merged)
    }

    // Registry //////////////////////////////////////////////////////////////

    /// Adds a body and returns its id. An orbit request is resolved against
    /// the current state of its center; a missing center leaves the
    /// builder's position and velocity untouched.
    pub fn add(&mut self, mut builder: BodyBuilder) -> BodyId {
        if let Some(orbit) = builder.orbit.take() {
            if let Some(center) = self.bodies.get(orbit.center) {
                let speed = geometry::speed_for_circular_orbit(
                    self.config.gravitational_constant,
                    builder.mass.max(0.0),
                    center.mass(),
                    orbit.radius,
                );
                let (pos, vel) = geometry::circular_orbit(
                    center.pos,
                    center.vel,
                    orbit.radius,
                    orbit.angle,
                    speed,
                    orbit.retrograde,
                );
                builder.pos = pos;
                builder.vel = vel;
            }
        }

        let density_scaling = self.config.density_scaling;
        let id = self.bodies.insert_with_key(|id| builder.build(id, density_scaling));

        let body = &self.bodies[id];
        if body.mass() >= self.config.react_only_threshold {
            self.gravitating.push(id);
        } else {
            self.react_only.push(id);
        }
        self.by_label.entry(body.label.clone()).or_default().push(id);
        id
    }

    /// Removes a body, detaching anything docked or landed on it and clearing
    /// any designation that names it.
    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        if !self.bodies.contains_key(id) {
            return None;
        }
        self.release_links(id);

        self.gravitating.retain(|other| *other != id);
        self.react_only.retain(|other| *other != id);
        self.children.retain(|other| *other != id);

        let body = self.bodies.remove(id)?;
        if let Some(ids) = self.by_label.get_mut(&body.label) {
            ids.retain(|other| *other != id);
            if ids.is_empty() {
                self.by_label.remove(&body.label);
            }
        }
        self.designations.clear(id);

        debug!(label = %body.label, "body removed");
        Some(body)
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.bodies.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    /// First body registered under `label`.
    pub fn body_by_label(&self, label: &str) -> Option<&Body> {
        let id = *self.by_label.get(label)?.first()?;
        self.bodies.get(id)
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.values()
    }

    pub fn gravitating(&self) -> &[BodyId] {
        &self.gravitating
    }

    pub fn react_only(&self) -> &[BodyId] {
        &self.react_only
    }

    pub fn children(&self) -> &[BodyId] {
        &self.children
    }

    /// Body whose center is closest to `point`.
    pub fn nearest_body(&self, point: DVec2) -> Option<BodyId> {
        self.bodies
            .iter()
            .min_by(|(_, a), (_, b)| (a.pos - point).mag_sq().total_cmp(&(b.pos - point).mag_sq()))
            .map(|(id, _)| id)
    }

    /// Sets a body's mass (clamped at zero), moving it between the
    /// gravitating and react-only sets if it crosses the threshold.
    pub fn set_mass(&mut self, id: BodyId, mass: f64) -> bool {
        let Some(body) = self.bodies.get_mut(id) else {
            return false;
        };
        body.set_mass(mass);
        let gravitating = body.mass() >= self.config.react_only_threshold;

        self.gravitating.retain(|other| *other != id);
        self.react_only.retain(|other| *other != id);
        if gravitating {
            self.gravitating.push(id);
        } else {
            self.react_only.push(id);
        }
        true
    }

    pub fn set_density(&mut self, id: BodyId, density: f64) -> bool {
        match self.bodies.get_mut(id) {
            Some(body) => {
                body.set_density(density);
                true
            }
            None => false,
        }
    }

    /// Places `satellite` on a circular orbit around `center`.
    pub fn give_circular_orbit(&mut self, satellite: BodyId, center: BodyId, r: f64, angle: f64, retrograde: bool) -> bool {
        let g = self.config.gravitational_constant;
        match self.bodies.get_disjoint_mut([satellite, center]) {
            Some([satellite, center]) if !satellite.is_child() => {
                satellite.give_circular_orbit(center, r, angle, retrograde, g);
                true
            }
            _ => false,
        }
    }

    pub fn total_mass(&self) -> f64 {
        self.bodies.values().map(Body::mass).sum()
    }

    pub fn total_momentum(&self) -> DVec2 {
        self.bodies.values().fold(DVec2::zero(), |acc, body| acc + body.momentum())
    }

    pub fn total_kinetic_energy(&self) -> f64 {
        self.bodies.values().map(Body::kinetic_energy).sum()
    }

    // Designations //////////////////////////////////////////////////////////

    pub fn designations(&self) -> &Designations {
        &self.designations
    }

    pub fn set_focus(&mut self, id: Option<BodyId>) -> bool {
        self.designate(id, |d| &mut d.focus)
    }

    pub fn set_player_ship(&mut self, id: Option<BodyId>) -> bool {
        self.designate(id, |d| &mut d.player_ship)
    }

    pub fn set_highlighted(&mut self, id: Option<BodyId>) -> bool {
        self.designate(id, |d| &mut d.highlighted)
    }

    pub fn set_selected(&mut self, id: Option<BodyId>) -> bool {
        self.designate(id, |d| &mut d.selected)
    }

    fn designate(&mut self, id: Option<BodyId>, slot: impl FnOnce(&mut Designations) -> &mut Option<BodyId>) -> bool {
        if id.is_some_and(|id| !self.bodies.contains_key(id)) {
            return false;
        }
        *slot(&mut self.designations) = id;
        true
    }

    // Ships /////////////////////////////////////////////////////////////////

    /// Applies a control input to a ship. Returns `false` when the input is
    /// not legal right now: thrust needs a running world and free docks,
    /// strafe and rotation need the ship neither docked nor landed.
    ///
    /// Landed ships keep their main engine, since thrust is what lets
    /// [`can_launch`](Self::can_launch) succeed.
    pub fn command(&mut self, id: BodyId, command: ShipCommand) -> bool {
        let running = self.running;
        let seconds_per_tick = self.time_scale.current();

        let Some(body) = self.bodies.get_mut(id) else {
            return false;
        };
        let va = body.va;
        let Some(ship) = body.ship_mut() else {
            return false;
        };
        let (docked, landed) = (ship.is_docked(), ship.is_landed());

        match command {
            ShipCommand::IncreaseThrust | ShipCommand::DecreaseThrust => {
                // landed ships keep their engines to be able to launch
                if !running || docked {
                    return false;
                }
                if command == ShipCommand::IncreaseThrust {
                    ship.increase_thrust();
                } else {
                    ship.decrease_thrust();
                }
            }
            ShipCommand::StrafeLeft | ShipCommand::StrafeRight => {
                if docked || landed {
                    return false;
                }
                if command == ShipCommand::StrafeRight {
                    ship.strafe_right();
                } else {
                    ship.strafe_left();
                }
            }
            ShipCommand::RotateLeft | ShipCommand::RotateRight => {
                if docked || landed {
                    return false;
                }
                body.va = ship::rotation_step(va, command == ShipCommand::RotateRight, seconds_per_tick);
            }
        }
        true
    }

    fn ship(&self, id: BodyId) -> Option<&Ship> {
        self.bodies.get(id).and_then(Body::ship)
    }

    pub fn can_dock(&self, ship: BodyId, other: BodyId) -> bool {
        match (self.bodies.get(ship), self.bodies.get(other)) {
            (Some(ship), Some(other)) => ship::can_dock_with(ship, other, true),
            _ => false,
        }
    }

    /// Docks `ship` to `other`, making `ship` a child of `other`. The ships
    /// must be touching, nearly at rest relative to each other, and agree on
    /// a free dock facing each other.
    pub fn dock(&mut self, ship: BodyId, other: BodyId) -> bool {
        if !self.in_contact(ship, other, self.config.docking_threshold) {
            return false;
        }
        self.link_dock(ship, other)
    }

    fn link_dock(&mut self, ship: BodyId, other: BodyId) -> bool {
        if self.descends_from(other, ship) {
            return false;
        }
        let (Some(ship_body), Some(other_body)) = (self.bodies.get(ship), self.bodies.get(other)) else {
            return false;
        };
        if !ship::can_dock_with(ship_body, other_body, true) {
            return false;
        }
        let (Some(slot), Some(other_slot)) = (
            ship::dock_slot_for(ship_body, other_body),
            ship::dock_slot_for(other_body, ship_body),
        ) else {
            return false;
        };

        let Some([ship_body, other_body]) = self.bodies.get_disjoint_mut([ship, other]) else {
            return false;
        };
        if let Some(s) = ship_body.ship_mut() {
            s.occupy_dock(slot, other);
        }
        if let Some(s) = other_body.ship_mut() {
            s.occupy_dock(other_slot, ship);
        }
        ship_body.attach_to(other_body);
        self.children.push(ship);

        debug!(ship = %ship_body.label, to = %other_body.label, slot, "docked");
        true
    }

    /// Frees the dock at `index` on `ship` and whatever occupies it.
    pub fn undock(&mut self, ship: BodyId, index: usize) -> bool {
        let Some(partner) = self.ship(ship).and_then(|s| s.dock(index)).and_then(|dock| dock.occupied_by()) else {
            return false;
        };

        for (id, other) in [(ship, partner), (partner, ship)] {
            if let Some(s) = self.bodies.get_mut(id).and_then(Body::ship_mut) {
                s.release_dock_of(other);
            }
            if self.bodies.get(id).and_then(Body::parent) == Some(other) {
                self.unlink(id);
            }
        }

        debug!(index, "undocked");
        true
    }

    /// Enables or disables a dock. An occupied dock can't be disabled.
    pub fn set_dock_enabled(&mut self, ship: BodyId, index: usize, enabled: bool) -> bool {
        self.bodies
            .get_mut(ship)
            .and_then(Body::ship_mut)
            .is_some_and(|s| s.set_dock_enabled(index, enabled))
    }

    pub fn dock_status(&self, ship: BodyId, index: usize) -> Option<DockStatus> {
        self.ship(ship)?.dock_status(index)
    }

    /// Extends or retracts the landing gear. Can't retract while landed.
    pub fn set_landing_gear_enabled(&mut self, ship: BodyId, enabled: bool) -> bool {
        self.bodies
            .get_mut(ship)
            .and_then(Body::ship_mut)
            .is_some_and(|s| s.set_gear_enabled(enabled))
    }

    pub fn gear_status(&self, ship: BodyId) -> Option<GearStatus> {
        Some(self.ship(ship)?.gear_status())
    }

    pub fn can_land(&self, ship: BodyId, target: BodyId) -> bool {
        match (self.bodies.get(ship), self.bodies.get(target)) {
            (Some(ship), Some(target)) => ship::can_land_on(ship, target),
            _ => false,
        }
    }

    /// Sets `ship` down on `target`, which must be touching and nearly at
    /// rest relative to it.
    pub fn land(&mut self, ship: BodyId, target: BodyId) -> bool {
        if !self.in_contact(ship, target, self.config.landing_threshold) {
            return false;
        }
        self.link_landing(ship, target)
    }

    fn link_landing(&mut self, ship: BodyId, target: BodyId) -> bool {
        if !self.can_land(ship, target) || self.descends_from(target, ship) {
            return false;
        }
        let Some([ship_body, target_body]) = self.bodies.get_disjoint_mut([ship, target]) else {
            return false;
        };
        ship_body.attach_to(target_body);
        if let Some(s) = ship_body.ship_mut() {
            s.set_landed_on(Some(target));
            s.cut_engines();
        }
        self.children.push(ship);

        debug!(ship = %ship_body.label, on = %target_body.label, "landed");
        true
    }

    /// Whether the landed `ship` would pull away from its surface under its
    /// current thrust.
    pub fn can_launch(&self, ship: BodyId) -> bool {
        let Some(body) = self.bodies.get(ship) else {
            return false;
        };
        let Some(target) = body.ship().and_then(|s| s.landing_gear().landed_on()) else {
            return false;
        };
        match self.bodies.get(target) {
            Some(target) => ship::can_launch(
                body,
                target,
                self.config.gravitational_constant,
                self.time_scale.current(),
            ),
            None => false,
        }
    }

    pub fn launch(&mut self, ship: BodyId) -> bool {
        if !self.can_launch(ship) {
            return false;
        }
        if let Some(s) = self.bodies.get_mut(ship).and_then(Body::ship_mut) {
            s.set_landed_on(None);
        }
        self.unlink(ship);
        debug!("launched");
        true
    }

    fn in_contact(&self, a: BodyId, b: BodyId, max_speed: f64) -> bool {
        match (self.bodies.get(a), self.bodies.get(b)) {
            (Some(a), Some(b)) => {
                a.distance(b) <= CONTACT_RANGE * (a.radius() + b.radius()) && a.relative_speed(b) <= max_speed
            }
            _ => false,
        }
    }

    fn unlink(&mut self, child: BodyId) {
        if let Some(body) = self.bodies.get_mut(child) {
            body.detach();
        }
        self.children.retain(|other| *other != child);
    }

    /// Drops every dock, landing and parent link involving `id`. Detached
    /// bodies keep their current velocity.
    fn release_links(&mut self, id: BodyId) {
        let partners = self
            .bodies
            .get_mut(id)
            .and_then(Body::ship_mut)
            .map(Ship::release_all)
            .unwrap_or_default();
        for partner in partners {
            if let Some(s) = self.bodies.get_mut(partner).and_then(Body::ship_mut) {
                s.release_dock_of(id);
            }
        }

        let dependents = self
            .children
            .iter()
            .copied()
            .filter(|child| self.bodies.get(*child).and_then(Body::parent) == Some(id))
            .collect::<Vec<_>>();
        for child in dependents {
            if let Some(s) = self.bodies.get_mut(child).and_then(Body::ship_mut) {
                s.release_dock_of(id);
                if s.landing_gear().landed_on() == Some(id) {
                    s.set_landed_on(None);
                }
            }
            self.unlink(child);
        }

        if self.bodies.get(id).is_some_and(Body::is_child) {
            self.unlink(id);
        }
    }
}
