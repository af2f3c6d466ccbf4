//! Browser keyboard mapping

use crate::sim::Key;

/// What a DOM key press means to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    /// Forward to the controllable bike's latch
    Steer(Key),
    TogglePause,
}

/// Map a `KeyboardEvent.key` value, falling back to the legacy `keyCode`
pub fn map_key(name: &str, key_code: u32) -> Option<HostCommand> {
    if name == "Escape" || key_code == 27 {
        return Some(HostCommand::TogglePause);
    }
    Key::from_key_name(name)
        .or_else(|| Key::from_key_code(key_code))
        .map(HostCommand::Steer)
}

impl HostCommand {
    /// Whether the browser's default action (scrolling) should be suppressed
    pub fn prevents_default(self) -> bool {
        matches!(self, HostCommand::Steer(_))
    }
}
