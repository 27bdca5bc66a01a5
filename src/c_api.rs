use crate::{
    body::{Body, BodyId},
    ship::ShipCommand,
    spacetime::Spacetime,
};

use slotmap::{Key, KeyData};

/// Flat view of a body for an embedding renderer.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct BodySnapshot {
    /// Opaque handle, valid for [`Spacetime_Command`] and friends.
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub angle: f64,
    pub mass: f64,
    pub radius: f64,
    /// 0 star, 1 planet, 2 moon, 3 asteroid, 4 ship.
    pub body_type: u32,
    pub is_child: u32,
    pub thrust: f64,
    pub strafe: f64,
}

impl From<&Body> for BodySnapshot {
    fn from(body: &Body) -> Self {
        let (thrust, strafe) = body.ship().map_or((0.0, 0.0), |s| (s.thrust(), s.strafe()));
        Self {
            id: body.id().data().as_ffi(),
            x: body.pos.x,
            y: body.pos.y,
            vx: body.vel.x,
            vy: body.vel.y,
            angle: body.angle,
            mass: body.mass(),
            radius: body.radius(),
            body_type: body.body_type() as u32,
            is_child: body.is_child() as u32,
            thrust,
            strafe,
        }
    }
}

fn body_id(id: u64) -> BodyId {
    KeyData::from_ffi(id).into()
}

fn ship_command(command: u32) -> Option<ShipCommand> {
    Some(match command {
        0 => ShipCommand::IncreaseThrust,
        1 => ShipCommand::DecreaseThrust,
        2 => ShipCommand::StrafeLeft,
        3 => ShipCommand::StrafeRight,
        4 => ShipCommand::RotateLeft,
        5 => ShipCommand::RotateRight,
        _ => return None,
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn Spacetime_Create() -> *mut Spacetime {
    Box::into_raw(Box::new(Spacetime::new()))
}

/// # Safety
/// `handle` must come from [`Spacetime_Create`] and not be used afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Spacetime_Destroy(handle: *mut Spacetime) {
    if !handle.is_null() {
        unsafe { drop(Box::from_raw(handle)) };
    }
}

/// # Safety
/// `handle` must be null or a live pointer from [`Spacetime_Create`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Spacetime_Start(handle: *mut Spacetime) {
    if let Some(world) = unsafe { handle.as_mut() } {
        world.start();
    }
}

/// # Safety
/// `handle` must be null or a live pointer from [`Spacetime_Create`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Spacetime_Stop(handle: *mut Spacetime) {
    if let Some(world) = unsafe { handle.as_mut() } {
        world.stop();
    }
}

/// Runs one tick. Returns the simulated seconds it covered.
///
/// # Safety
/// `handle` must be null or a live pointer from [`Spacetime_Create`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Spacetime_Advance(handle: *mut Spacetime) -> f64 {
    unsafe { handle.as_mut() }.map_or(0.0, Spacetime::advance)
}

/// # Safety
/// `handle` must be null or a live pointer from [`Spacetime_Create`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Spacetime_SetTimeScale(handle: *mut Spacetime, seconds_per_tick: f64) {
    if let Some(world) = unsafe { handle.as_mut() } {
        world.set_time_scale(seconds_per_tick);
    }
}

/// # Safety
/// `handle` must be null or a live pointer from [`Spacetime_Create`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Spacetime_GetBodyCount(handle: *const Spacetime) -> usize {
    unsafe { handle.as_ref() }.map_or(0, Spacetime::len)
}

/// Copies up to `capacity` snapshots into `out`, returning how many were written.
///
/// # Safety
/// `handle` must be null or a live pointer from [`Spacetime_Create`], and
/// `out` must be null or valid for `capacity` writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Spacetime_CopyBodies(handle: *const Spacetime, out: *mut BodySnapshot, capacity: usize) -> usize {
    let Some(world) = (unsafe { handle.as_ref() }) else {
        return 0;
    };
    if out.is_null() || capacity == 0 {
        return 0;
    }
    let out = unsafe { std::slice::from_raw_parts_mut(out, capacity) };

    let mut written = 0;
    for (slot, body) in out.iter_mut().zip(world.bodies()) {
        *slot = BodySnapshot::from(body);
        written += 1;
    }
    written
}

/// Applies a ship command (0 thrust up, 1 thrust down, 2 strafe left,
/// 3 strafe right, 4 rotate left, 5 rotate right). Returns 1 if applied.
///
/// # Safety
/// `handle` must be null or a live pointer from [`Spacetime_Create`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Spacetime_Command(handle: *mut Spacetime, ship: u64, command: u32) -> u32 {
    match (unsafe { handle.as_mut() }, ship_command(command)) {
        (Some(world), Some(command)) => world.command(body_id(ship), command) as u32,
        _ => 0,
    }
}

/// Returns the player ship's id, or 0 if there is none.
///
/// # Safety
/// `handle` must be null or a live pointer from [`Spacetime_Create`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Spacetime_GetPlayerShip(handle: *const Spacetime) -> u64 {
    unsafe { handle.as_ref() }
        .and_then(|world| world.designations().player_ship)
        .map_or(0, |id| id.data().as_ffi())
}
