//! Ready-made worlds for demos, benchmarks and tests.

use crate::{
    body::{BodyBuilder, BodyId},
    constants::{AU, TWO_PI},
    ship::Ship,
    spacetime::Spacetime,
};

use tracing::debug;

/// Parameters of a ring of asteroids on circular orbits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeltParams {
    pub count: usize,
    pub inner_radius: f64,
    pub outer_radius: f64,
    /// Each asteroid's mass is drawn from `[average / 10, average * 10]`.
    pub average_mass: f64,
    pub density: f64,
    pub seed: u64,
}

impl Default for BeltParams {
    fn default() -> Self {
        Self {
            count: 500,
            inner_radius: 2.2 * AU,
            outer_radius: 3.2 * AU,
            average_mass: 1.0e15,
            density: 2000.0,
            seed: 0,
        }
    }
}

/// Adds `params.count` asteroids orbiting `center`, uniformly spread over the
/// annulus between the inner and outer radius. The same seed always yields
/// the same belt.
pub fn asteroid_belt(world: &mut Spacetime, center: BodyId, params: &BeltParams) -> Vec<BodyId> {
    let mut rng = fastrand::Rng::with_seed(params.seed);
    let inner = params.inner_radius.min(params.outer_radius);
    let outer = params.inner_radius.max(params.outer_radius);
    let min_mass = params.average_mass / 10.0;
    let max_mass = params.average_mass * 10.0;

    let ids = (0..params.count)
        .map(|i| {
            let angle = rng.f64() * TWO_PI;
            // uniform over the annulus area
            let t = inner / outer;
            let r = outer * (rng.f64() * (1.0 - t * t) + t * t).sqrt();
            let mass = min_mass + rng.f64() * (max_mass - min_mass);

            world.add(
                BodyBuilder::asteroid()
                    .named(&format!("Asteroid {i}"))
                    .with_mass(mass)
                    .with_density(params.density)
                    .orbiting(center, r, angle, false),
            )
        })
        .collect::<Vec<_>>();

    debug!(count = ids.len(), "asteroid belt generated");
    ids
}

/// A star with an asteroid belt around it.
pub fn star_with_belt(world: &mut Spacetime, params: &BeltParams) -> (BodyId, Vec<BodyId>) {
    let sun = world.add(BodyBuilder::star().named("Sun").with_mass(1.989e30).with_density(1410.0));
    let belt = asteroid_belt(world, sun, params);
    (sun, belt)
}

/// Bodies added by [`earth_moon_system`].
#[derive(Clone, Debug)]
pub struct EarthMoon {
    pub earth: BodyId,
    pub moon: BodyId,
    pub ships: Vec<BodyId>,
}

/// Altitude of the starting ships' orbit, measured from Earth's center.
pub const SHIP_ORBIT_RADIUS: f64 = 1.30e7;

/// Earth, its moon and `ships` docking-capable ships in a shared low orbit.
/// The first ship becomes the player ship and the camera focus.
pub fn earth_moon_system(world: &mut Spacetime, ships: usize) -> EarthMoon {
    let earth = world.add(
        BodyBuilder::planet()
            .named("Earth")
            .with_mass(5.972e24)
            .with_density(5514.0),
    );
    let moon = world.add(
        BodyBuilder::moon()
            .named("Moon")
            .with_mass(7.342e22)
            .with_density(3344.0)
            .orbiting(earth, 3.844e8, 0.0, false),
    );

    let ships = (0..ships)
        .map(|i| {
            // a few hundred meters apart along the orbit
            let angle = i as f64 * 5.0e-5;
            world.add(
                BodyBuilder::ship(Ship::with_standard_docks())
                    .named(&format!("Ship {}", i + 1))
                    .with_mass(1.0e6)
                    .with_density(100.0)
                    .orbiting(earth, SHIP_ORBIT_RADIUS, angle, false),
            )
        })
        .collect::<Vec<_>>();

    if let Some(&player) = ships.first() {
        world.set_player_ship(Some(player));
        world.set_focus(Some(player));
    }

    EarthMoon { earth, moon, ships }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_belt(seed: u64) -> BeltParams {
        BeltParams {
            count: 50,
            seed,
            ..Default::default()
        }
    }

    #[test]
    fn belt_is_deterministic_and_in_range() {
        let mut a = Spacetime::new();
        let mut b = Spacetime::new();
        let (sun_a, belt_a) = star_with_belt(&mut a, &small_belt(7));
        let (_, belt_b) = star_with_belt(&mut b, &small_belt(7));
        assert_eq!(belt_a.len(), 50);

        let params = small_belt(7);
        let sun = a.body(sun_a).unwrap();
        for (ia, ib) in belt_a.iter().zip(&belt_b) {
            let (x, y) = (a.body(*ia).unwrap(), b.body(*ib).unwrap());
            assert_eq!(x.pos, y.pos);
            assert_eq!(x.mass(), y.mass());

            let r = x.distance_centers(sun);
            assert!(r >= params.inner_radius * (1.0 - 1e-9) && r <= params.outer_radius * (1.0 + 1e-9));
            assert!(x.mass() >= params.average_mass / 10.0 && x.mass() <= params.average_mass * 10.0);
        }
        // far below the react-only threshold
        assert_eq!(a.react_only().len(), 50);
        assert_eq!(a.gravitating(), &[sun_a]);
    }

    #[test]
    fn earth_moon_designates_first_ship() {
        let mut world = Spacetime::new();
        let system = earth_moon_system(&mut world, 2);
        assert_eq!(system.ships.len(), 2);
        assert_eq!(world.designations().player_ship, Some(system.ships[0]));
        assert_eq!(world.designations().focus, Some(system.ships[0]));

        let earth = world.body(system.earth).unwrap();
        let ship = world.body(system.ships[1]).unwrap();
        assert!((ship.distance_centers(earth) - SHIP_ORBIT_RADIUS).abs() < 1e-3);
        assert!(!ship.overlaps(world.body(system.ships[0]).unwrap()));
    }
}
