pub mod body;
pub mod c_api;
pub mod clock;
pub mod collision;
pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod scenario;
pub mod ship;
pub mod spacetime;

pub use body::{Body, BodyBuilder, BodyId, BodyKind, BodyType};
pub use clock::{ElapsedTime, TimeScale};
pub use config::SpacetimeConfig;
pub use error::ConfigError;
pub use ship::{DockStatus, GearStatus, Ship, ShipCommand};
pub use spacetime::{CollisionOutcome, Designations, Spacetime};
pub use ultraviolet::DVec2;
