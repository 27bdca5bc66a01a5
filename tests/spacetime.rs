use gravity_spacetime::{
    constants::G, BodyBuilder, BodyId, CollisionOutcome, DVec2, DockStatus, GearStatus, Ship, ShipCommand, Spacetime,
    SpacetimeConfig,
};
use std::f64::consts::{PI, TAU};

/// A docking-capable 1e6 kg ship at `pos` heading `angle`.
fn add_ship(world: &mut Spacetime, label: &str, pos: DVec2, angle: f64) -> BodyId {
    world.add(
        BodyBuilder::ship(Ship::with_standard_docks())
            .named(label)
            .with_mass(1.0e6)
            .with_density(100.0)
            .with_position(pos)
            .with_angle(angle),
    )
}

fn expected_radius(mass: f64, density: f64, scaling: f64) -> f64 {
    ((mass / density) * scaling * 3.0 / (4.0 * PI)).cbrt()
}

fn close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol * a.abs().max(b.abs()).max(1.0)
}

// ==================================================================================
// Bodies
// ==================================================================================

#[test]
fn radius_follows_mass_and_density_mutations() {
    let mut world = Spacetime::with_config(SpacetimeConfig {
        density_scaling: 2.0,
        ..Default::default()
    });
    let id = world.add(BodyBuilder::planet().with_mass(5.972e24).with_density(5514.0));
    assert!(close(world.body(id).unwrap().radius(), expected_radius(5.972e24, 5514.0, 2.0), 1e-12));

    world.set_mass(id, 1.0e20);
    assert!(close(world.body(id).unwrap().radius(), expected_radius(1.0e20, 5514.0, 2.0), 1e-12));

    world.set_density(id, 300.0);
    assert!(close(world.body(id).unwrap().radius(), expected_radius(1.0e20, 300.0, 2.0), 1e-12));

    // negative inputs clamp instead of producing NaN
    world.set_mass(id, -1.0);
    assert_eq!(world.body(id).unwrap().mass(), 0.0);
    assert_eq!(world.body(id).unwrap().radius(), 0.0);
}

#[test]
fn circular_orbit_is_tangential_at_the_right_speed() {
    let mut world = Spacetime::new();
    let sun = world.add(BodyBuilder::star().with_mass(1.989e30).with_density(1410.0));
    let r = 1.496e11;
    let prograde = world.add(BodyBuilder::asteroid().with_mass(1.0).orbiting(sun, r, 0.0, false));
    let retrograde = world.add(BodyBuilder::asteroid().with_mass(1.0).orbiting(sun, r, 0.0, true));

    let expected = (G * 1.989e30 / r).sqrt();
    let sun_pos = world.body(sun).unwrap().pos;
    let a = world.body(prograde).unwrap();
    let b = world.body(retrograde).unwrap();

    assert!(close(a.speed(), expected, 1e-9));
    assert!(a.vel.dot(a.pos - sun_pos).abs() / (a.speed() * r) < 1e-12);
    assert!(a.vel.y > 0.0);
    assert!((a.vel + b.vel).mag() < 1e-9 * expected);
}

#[test]
fn give_circular_orbit_after_the_fact() {
    let mut world = Spacetime::new();
    let earth = world.add(
        BodyBuilder::planet()
            .with_mass(5.972e24)
            .with_density(5514.0)
            .with_velocity(DVec2::new(0.0, 29_780.0)),
    );
    let rock = world.add(BodyBuilder::asteroid().with_mass(1.0));
    assert!(world.give_circular_orbit(rock, earth, 1.0e7, PI / 2.0, false));

    let rock = world.body(rock).unwrap();
    assert!(close(rock.pos.y, 1.0e7, 1e-12));
    let relative = rock.vel - DVec2::new(0.0, 29_780.0);
    assert!(close(relative.mag(), (G * 5.972e24 / 1.0e7).sqrt(), 1e-9));
    assert!(relative.x < 0.0);
}

// ==================================================================================
// Collisions
// ==================================================================================

#[test]
fn equal_masses_exchange_velocities() {
    let mut world = Spacetime::new();
    let a = world.add(
        BodyBuilder::asteroid()
            .with_mass(1.0e6)
            .with_density(1000.0)
            .with_velocity(DVec2::new(2.0, 0.0)),
    );
    let r = world.body(a).unwrap().radius();
    let b = world.add(
        BodyBuilder::asteroid()
            .with_mass(1.0e6)
            .with_density(1000.0)
            .with_position(DVec2::new(2.0 * r, 0.0)),
    );

    let p0 = world.total_momentum();
    let e0 = world.total_kinetic_energy();
    assert_eq!(world.resolve_collision(a, b), Some(CollisionOutcome::Bounced));

    assert!(world.body(a).unwrap().vel.mag() < 1e-9);
    assert!((world.body(b).unwrap().vel - DVec2::new(2.0, 0.0)).mag() < 1e-9);
    assert!((world.total_momentum() - p0).mag() < 1e-6);
    assert!(close(world.total_kinetic_energy(), e0, 1e-9));
}

#[test]
fn fast_collision_merges_and_cleans_registries() {
    let mut world = Spacetime::with_config(SpacetimeConfig {
        collision_interval: 1,
        ..Default::default()
    });
    let light = world.add(
        BodyBuilder::planet()
            .named("Light")
            .with_mass(1.0e22)
            .with_density(3000.0)
            .with_velocity(DVec2::new(500.0, 0.0)),
    );
    let heavy = world.add(
        BodyBuilder::planet()
            .named("Heavy")
            .with_mass(3.0e22)
            .with_density(3000.0)
            .with_position(DVec2::new(1.0e5, 0.0))
            .with_velocity(DVec2::new(-100.0, 0.0)),
    );
    world.set_focus(Some(light));
    world.set_selected(Some(heavy));

    let p0 = world.total_momentum();
    let Some(CollisionOutcome::Merged(merged)) = world.resolve_collision(light, heavy) else {
        panic!("expected a merge");
    };

    assert_eq!(world.len(), 1);
    assert!(world.body(light).is_none() && world.body(heavy).is_none());
    assert_eq!(world.gravitating(), &[merged]);
    assert!(world.react_only().is_empty());
    assert!(world.body_by_label("Light").is_none());
    assert_eq!(world.body_by_label("Heavy").map(|b| b.id()), Some(merged));
    assert_eq!(world.designations().focus, Some(merged));
    assert_eq!(world.designations().selected, None);

    let body = world.body(merged).unwrap();
    assert!(close(body.mass(), 4.0e22, 1e-15));
    assert!(close(body.vel.x, (1.0e22 * 500.0 - 3.0e22 * 100.0) / 4.0e22, 1e-12));
    assert!((world.total_momentum() - p0).mag() <= 1e-12 * p0.mag().max(1.0));
}

// ==================================================================================
// Docking, landing and children
// ==================================================================================

#[test]
fn dock_requires_idle_ships_and_matching_bearing() {
    let mut world = Spacetime::new();
    let a = add_ship(&mut world, "A", DVec2::zero(), 0.0);
    let b = add_ship(&mut world, "B", DVec2::new(30.0, 0.0), PI);
    let c = add_ship(&mut world, "C", DVec2::new(0.0, 30.0), 3.0 * PI / 2.0);
    assert!(world.can_dock(a, b));
    assert!(world.can_dock(b, a));
    // C sits at 90 degrees off A's nose
    assert!(!world.can_dock(c, a));

    world.start();
    assert!(world.command(a, ShipCommand::IncreaseThrust));
    assert!(!world.can_dock(a, b));
    assert!(!world.can_dock(b, a));
    assert!(world.command(a, ShipCommand::DecreaseThrust));
    assert!(world.can_dock(a, b));

    assert!(world.command(b, ShipCommand::StrafeLeft));
    assert!(!world.can_dock(a, b));
    assert!(world.command(b, ShipCommand::StrafeRight));

    assert!(world.command(b, ShipCommand::RotateLeft));
    assert!(!world.can_dock(a, b));
}

#[test]
fn dock_arc_wraps_past_two_pi() {
    let mut world = Spacetime::new();
    // A's nose arc [-π/8, π/8] straddles zero
    let a = add_ship(&mut world, "A", DVec2::zero(), TAU - 0.05);
    let toward = DVec2::new(0.05f64.cos(), 0.05f64.sin()) * 30.0;
    let b = add_ship(&mut world, "B", toward, PI + 0.05);
    assert!(world.can_dock(a, b));

    for bearing in [0.5, PI / 2.0, PI - 0.5, 3.0 * PI / 2.0] {
        let mut world = Spacetime::new();
        let a = add_ship(&mut world, "A", DVec2::zero(), TAU - 0.05);
        let pos = DVec2::new(bearing.cos(), bearing.sin()) * 30.0;
        let b = add_ship(&mut world, "B", pos, bearing + PI);
        assert!(!world.can_dock(a, b), "bearing {bearing} docked");
    }
}

#[test]
fn slow_contact_docks_and_children_follow_parent() {
    let mut world = Spacetime::with_config(SpacetimeConfig {
        collision_interval: 1,
        ..Default::default()
    });
    let a = add_ship(&mut world, "A", DVec2::zero(), 0.0);
    let r = world.body(a).unwrap().radius();
    let b = world.add(
        BodyBuilder::ship(Ship::with_standard_docks())
            .named("B")
            .with_mass(1.0e6)
            .with_density(100.0)
            .with_position(DVec2::new(2.0 * r - 0.5, 0.0))
            .with_velocity(DVec2::new(-0.5, 0.0))
            .with_angle(PI),
    );

    assert_eq!(world.resolve_collision(a, b), Some(CollisionOutcome::Docked));
    let (child, parent) = if world.body(a).unwrap().is_child() { (a, b) } else { (b, a) };
    assert_eq!(world.body(child).unwrap().parent(), Some(parent));
    assert_eq!(world.dock_status(a, 0), Some(DockStatus::Docked));
    assert_eq!(world.dock_status(b, 0), Some(DockStatus::Docked));
    assert!(!world.set_dock_enabled(a, 0, false));

    // docked ships can't steer
    world.start();
    assert!(!world.command(child, ShipCommand::RotateLeft));
    assert!(!world.command(parent, ShipCommand::IncreaseThrust));

    let earth = world.add(
        BodyBuilder::planet()
            .with_mass(5.972e24)
            .with_density(5514.0)
            .with_position(DVec2::new(0.0, -1.0e7)),
    );
    for _ in 0..60 {
        world.tick(10.0);
        let (c, p) = (world.body(child).unwrap(), world.body(parent).unwrap());
        assert_eq!(c.pos, p.pos + c.offset());
        assert_eq!(c.vel, p.vel);
    }
    assert!(world.body(parent).unwrap().vel.y < 0.0);

    // ships are too light to pull back
    assert!(world.body(earth).unwrap().vel.mag() < 1e-9);

    assert!(world.undock(a, 0));
    assert!(!world.body(child).unwrap().is_child());
    assert_eq!(world.dock_status(a, 0), Some(DockStatus::Enabled));
    assert_eq!(world.dock_status(b, 0), Some(DockStatus::Enabled));
    assert!(world.children().is_empty());
}

#[test]
fn land_and_launch() {
    let mut world = Spacetime::new();
    let rock = world.add(BodyBuilder::asteroid().named("Rock").with_mass(1.0e12).with_density(2000.0));
    let rock_radius = world.body(rock).unwrap().radius();
    let ship_radius = expected_radius(1.0e6, 100.0, 1.0);
    // nose away from the rock, gear on the tail
    let ship = world.add(
        BodyBuilder::ship(Ship::with_standard_docks())
            .named("Lander")
            .with_mass(1.0e6)
            .with_density(100.0)
            .with_position(DVec2::new(rock_radius + ship_radius - 0.5, 0.0))
            .with_velocity(DVec2::new(-2.0, 0.0)),
    );
    world.start();

    assert!(!world.can_land(ship, rock));
    assert!(world.set_landing_gear_enabled(ship, true));
    assert_eq!(world.gear_status(ship), Some(GearStatus::Enabled));
    assert!(world.can_land(ship, rock));

    assert_eq!(world.resolve_collision(ship, rock), Some(CollisionOutcome::Landed));
    assert_eq!(world.gear_status(ship), Some(GearStatus::Landed));
    assert!(world.body(ship).unwrap().is_child());
    assert!(!world.set_landing_gear_enabled(ship, false));
    assert!(!world.command(ship, ShipCommand::StrafeLeft));

    // no thrust, no way up
    assert!(!world.can_launch(ship));
    assert!(!world.launch(ship));
    assert!(world.command(ship, ShipCommand::IncreaseThrust));
    assert!(world.can_launch(ship));
    assert!(world.launch(ship));
    assert!(!world.body(ship).unwrap().is_child());
    assert_eq!(world.gear_status(ship), Some(GearStatus::Enabled));
}

#[test]
fn removing_a_parent_frees_its_children() {
    let mut world = Spacetime::new();
    let a = add_ship(&mut world, "A", DVec2::zero(), 0.0);
    let r = world.body(a).unwrap().radius();
    let b = add_ship(&mut world, "B", DVec2::new(2.0 * r, 0.0), PI);
    assert!(world.dock(a, b));
    assert_eq!(world.children(), &[a]);

    world.remove(b);
    assert!(world.children().is_empty());
    let a = world.body(a).unwrap();
    assert!(!a.is_child());
    assert!(!a.ship().unwrap().is_docked());
}

#[test]
fn ships_never_become_each_others_parent() {
    let mut world = Spacetime::new();
    let lander = |label: &str, pos: DVec2, angle: f64| {
        BodyBuilder::ship(Ship::with_standard_docks().with_landing_gear(3.0 * PI / 4.0, 5.0 * PI / 4.0, true))
            .named(label)
            .with_mass(1.0e6)
            .with_density(100.0)
            .with_position(pos)
            .with_angle(angle)
    };
    let r = expected_radius(1.0e6, 100.0, 1.0);
    // tails facing each other, noses pointing apart
    let a = world.add(lander("A", DVec2::zero(), 0.0));
    let b = world.add(lander("B", DVec2::new(-2.0 * r, 0.0), PI));

    assert!(!world.can_land(a, b));
    assert!(!world.land(a, b));
    assert!(!world.land(b, a));
    assert!(world.children().is_empty());

    // a docked ship can't take its own parent as a child
    let c = add_ship(&mut world, "C", DVec2::new(2.0 * r, 0.0), PI);
    assert!(world.dock(c, a));
    assert_eq!(world.body(c).unwrap().parent(), Some(a));
    assert!(!world.can_dock(a, c));
    assert!(!world.dock(a, c));
    assert!(!world.body(a).unwrap().is_child());

    world.add(
        BodyBuilder::planet()
            .with_mass(5.972e24)
            .with_density(5514.0)
            .with_position(DVec2::new(0.0, -1.0e7)),
    );
    world.start();
    for _ in 0..10 {
        world.tick(10.0);
    }
    assert!(world.body(a).unwrap().pos.y < 0.0);
    assert!(world.body(b).unwrap().pos.y < 0.0);
    assert_eq!(world.body(c).unwrap().pos.y, world.body(a).unwrap().pos.y + world.body(c).unwrap().offset().y);
}

// ==================================================================================
// Time
// ==================================================================================

#[test]
fn one_day_of_ticks() {
    let mut world = Spacetime::new();
    world.start();
    for _ in 0..3_600 {
        world.tick(24.0);
    }
    let elapsed = world.elapsed();
    assert_eq!(elapsed.days, 1);
    assert_eq!((elapsed.hours, elapsed.minutes), (0, 0));
    assert_eq!(elapsed.seconds, 0.0);
    assert_eq!(world.frame(), 3_600);
}

#[test]
fn thrust_requires_a_running_world() {
    let mut world = Spacetime::new();
    let ship = add_ship(&mut world, "A", DVec2::zero(), 0.0);
    assert!(!world.command(ship, ShipCommand::IncreaseThrust));
    world.start();
    assert!(world.command(ship, ShipCommand::IncreaseThrust));
    world.tick(1.0);
    let body = world.body(ship).unwrap();
    assert!(close(body.vel.x, 0.12, 1e-12));
}
