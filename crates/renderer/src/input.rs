use wavefield::Vec2;
use winit::dpi::{PhysicalPosition, PhysicalSize};

/// Maps a cursor position in window pixels (origin top-left, y down) to
/// normalised device coordinates (x right, y up, both in `[-1, 1]`).
pub fn normalize_pointer(position: PhysicalPosition<f64>, size: PhysicalSize<u32>) -> Vec2 {
    let width = size.width.max(1) as f64;
    let height = size.height.max(1) as f64;
    let x = 2.0 * position.x / width - 1.0;
    let y = 1.0 - 2.0 * position.y / height;
    Vec2::new(x.clamp(-1.0, 1.0) as f32, y.clamp(-1.0, 1.0) as f32)
}

/// Tracks the pointer uniform for an interactive preview.
///
/// The pointer keeps its last value when the cursor leaves the window.
#[derive(Debug, Clone, Copy)]
pub struct PointerState {
    position: Vec2,
    has_moved: bool,
}

impl PointerState {
    pub fn new(initial: Vec2) -> Self {
        Self {
            position: initial,
            has_moved: false,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn has_moved(&self) -> bool {
        self.has_moved
    }

    /// Records a cursor move. Returns `true` when the uniform changed.
    pub fn update(&mut self, position: PhysicalPosition<f64>, size: PhysicalSize<u32>) -> bool {
        let next = normalize_pointer(position, size);
        self.has_moved = true;
        if next == self.position {
            return false;
        }
        self.position = next;
        true
    }
}
