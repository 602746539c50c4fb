//! Gamepad event vocabulary.
//!
//! Gamepad input is addressed per *user* (seat), not per pointer; routing
//! only ever delivers it to that user's registered captor widget.

/// Identifies one local player / input seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct GamepadUser(pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamepadButton {
    South,
    East,
    West,
    North,
    LeftShoulder,
    RightShoulder,
    LeftTrigger,
    RightTrigger,
    Select,
    Start,
    LeftStick,
    RightStick,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamepadAxis {
    LeftStickX,
    LeftStickY,
    RightStickX,
    RightStickY,
    LeftTrigger,
    RightTrigger,
}

/// A gamepad button or analog event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GamepadEvent {
    pub user: GamepadUser,
    pub button: Option<GamepadButton>,
    pub axis: Option<(GamepadAxis, f64)>,
    /// True for auto-repeated button downs.
    pub repeat: bool,
}

impl GamepadEvent {
    pub fn button(user: GamepadUser, button: GamepadButton) -> Self {
        Self {
            user,
            button: Some(button),
            axis: None,
            repeat: false,
        }
    }

    pub fn analog(user: GamepadUser, axis: GamepadAxis, value: f64) -> Self {
        Self {
            user,
            button: None,
            axis: Some((axis, value)),
            repeat: false,
        }
    }
}
