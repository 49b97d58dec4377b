use crate::theme::Theme;

/// Influence radius of the pointer, in simulation units
pub const POINTER_RADIUS: f64 = 150.0;

/// Application state
#[derive(Clone, Debug)]
pub struct AppState {
    /// Active theme
    pub theme: Theme,
    /// Enable debug mode
    pub debug: bool,
    /// Simulation paused
    pub paused: bool,
}

impl AppState {
    pub fn new(theme: Theme) -> Self {
        AppState {
            theme,
            debug: false,
            paused: false,
        }
    }
}

/// Last known pointer position; read by every particle update
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerState {
    /// `None` until the first pointer movement is seen
    pub position: Option<[f64; 2]>,
    pub radius: f64,
}

impl Default for PointerState {
    fn default() -> Self {
        PointerState {
            position: None,
            radius: POINTER_RADIUS,
        }
    }
}

impl PointerState {
    pub fn at(position: [f64; 2]) -> Self {
        PointerState {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn move_to(&mut self, position: [f64; 2]) {
        self.position = Some(position);
    }

    /// Forgets the pointer position
    pub fn reset(&mut self) {
        self.position = None;
    }
}
