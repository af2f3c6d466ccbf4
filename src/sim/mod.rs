//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod components;
pub mod explosion;
pub mod input;
pub mod kinematics;
pub mod player;
pub mod schedule;
pub mod state;
pub mod tick;
pub mod trail;
pub mod tween;

pub use collision::{Obb, obb_overlap};
pub use components::{Collidable, InputReceiver, Positionable, Rotatable};
pub use explosion::Explosion;
pub use input::{InputLatch, Key};
pub use kinematics::{apply_motion, integrate, wrap_position};
pub use player::{Control, LifeState, Livery, Player};
pub use schedule::{ScheduledTask, Scheduler, Task, TaskHandle};
pub use state::{GameEvent, GamePhase, PlayerSpec, World};
pub use tick::tick;
pub use trail::{Trail, should_emit};
pub use tween::{Easing, Tween};
