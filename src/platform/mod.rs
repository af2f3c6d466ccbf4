//! Platform abstraction layer
//!
//! Host-side pieces that sit between the browser and the simulation:
//! - Frame clock (variable frame time in, fixed ticks out)
//! - Keyboard mapping (DOM key names to simulation keys and host commands)

pub mod clock;
pub mod keyboard;

pub use clock::FixedStepClock;
pub use keyboard::{HostCommand, map_key};
