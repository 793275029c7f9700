//! Pointer gesture classification.
//!
//! Turns canonical canvas-local pointer and wheel input into navigation
//! [`Intent`]s:
//!
//! - dragging with the pointer down pans by the distance moved since the last
//!   move event
//! - releasing the pointer exactly where it was pressed is a click, which
//!   zooms in at that position
//! - a negative wheel delta zooms in at the pointer, a positive one zooms out
//!
//! A drag that leaves the canvas keeps going: moves and the release reported
//! by the surrounding window are honoured until the pointer re-enters.

use serde::Serialize;

use crate::geometry::Point;

/// A navigation request derived from user input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Intent {
    /// Move the image by a canvas-space delta
    Pan { dx: f64, dy: f64 },

    /// Zoom one level in, keeping the given canvas point fixed
    ZoomInAt(Point),

    /// Zoom one level out, keeping the given canvas point fixed
    ZoomOutAt(Point),

    /// Zoom one level in around the canvas centre
    ZoomInCentre,

    /// Zoom one level out around the canvas centre
    ZoomOutCentre,
}

/// Click-versus-drag state machine for one canvas.
#[derive(Debug, Clone, Default)]
pub struct GestureClassifier {
    /// Position where the pointer went down, while it is held
    down_at: Option<Point>,

    /// Position of the previous move event during a drag
    last_move: Point,

    /// Last known pointer position
    pointer: Point,

    /// The pointer left the canvas while held
    left_while_down: bool,
}

impl GestureClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while the pointer is held down.
    pub fn is_dragging(&self) -> bool {
        self.down_at.is_some()
    }

    /// Last known pointer position.
    pub fn pointer(&self) -> Point {
        self.pointer
    }

    pub fn pointer_down(&mut self, position: Point) {
        self.down_at = Some(position);
        self.last_move = position;
        self.pointer = position;
        self.left_while_down = false;
    }

    /// Pointer moved over the canvas. Pans while the pointer is held.
    pub fn pointer_move(&mut self, position: Point) -> Option<Intent> {
        self.pointer = position;
        if self.down_at.is_none() {
            return None;
        }

        let dx = position.x - self.last_move.x;
        let dy = position.y - self.last_move.y;
        self.last_move = position;

        if dx == 0.0 && dy == 0.0 {
            None
        } else {
            Some(Intent::Pan { dx, dy })
        }
    }

    /// Pointer released over the canvas. A release at exactly the press
    /// position is a click and zooms in there.
    pub fn pointer_up(&mut self, position: Point) -> Option<Intent> {
        self.pointer = position;
        self.left_while_down = false;
        let down_at = self.down_at.take()?;

        (down_at == position).then_some(Intent::ZoomInAt(position))
    }

    /// Pointer left the canvas.
    pub fn pointer_leave(&mut self) {
        if self.down_at.is_some() {
            self.left_while_down = true;
        }
    }

    /// Pointer re-entered the canvas.
    pub fn pointer_enter(&mut self) {
        self.left_while_down = false;
    }

    /// Pointer moved somewhere in the window. Only continues a drag that
    /// left the canvas; moves over the canvas arrive via
    /// [`GestureClassifier::pointer_move`].
    pub fn window_pointer_move(&mut self, position: Point) -> Option<Intent> {
        if self.left_while_down {
            self.pointer_move(position)
        } else {
            None
        }
    }

    /// Pointer released somewhere in the window. Only ends a drag that left
    /// the canvas.
    pub fn window_pointer_up(&mut self, position: Point) -> Option<Intent> {
        if self.left_while_down {
            self.pointer_up(position)
        } else {
            None
        }
    }

    /// Wheel turned with the pointer at `position`.
    pub fn wheel(&mut self, delta: f64, position: Point) -> Option<Intent> {
        self.pointer = position;
        if delta < 0.0 {
            Some(Intent::ZoomInAt(position))
        } else if delta > 0.0 {
            Some(Intent::ZoomOutAt(position))
        } else {
            None
        }
    }
}
