//! Rising-edge detection for the push button.

/// One-bit latch remembering the button level seen on the previous tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonEdgeState {
    was_pressed: bool,
}

impl ButtonEdgeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the level sampled on this tick. Returns `true` only on a
    /// released-to-pressed transition; holding the button returns `false`.
    pub fn update(&mut self, pressed: bool) -> bool {
        let rising = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        rising
    }

    pub fn was_pressed(&self) -> bool {
        self.was_pressed
    }
}
