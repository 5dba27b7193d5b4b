//! Drag-to-zoom gesture state.
//!
//! One [`GestureState`] is shared by every pane of a dashboard, so at most
//! one drag is active at a time. Positions are logical X coordinates.

use std::time::{Duration, Instant};

/// Activations on the same pane closer together than this reset the zoom
pub const DOUBLE_ACTIVATION_WINDOW: Duration = Duration::from_millis(300);

/// Drags narrower than this many logical pixels are treated as clicks
pub const MIN_DRAG_WIDTH: f64 = 20.0;

/// Input device that started a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureSource {
    Pointer,
    Touch,
}

/// Current drag phase
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging {
        pane: usize,
        start_x: f64,
        current_x: f64,
        source: GestureSource,
    },
}

/// What an activation (press or touch start) turned into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// A drag started on the pane
    DragStarted,
    /// Second activation inside the window; the zoom should reset
    DoubleActivation,
    /// A drag is already in progress
    Ignored,
}

/// A completed drag wide enough to zoom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSpan {
    pub pane: usize,
    /// Left edge, clamped to the plot area
    pub left: f64,
    /// Right edge, clamped to the plot area
    pub right: f64,
}

/// Gesture state shared by all panes of a dashboard
#[derive(Debug, Clone, Default)]
pub struct GestureState {
    phase: DragPhase,
    last_activation: Option<(usize, Instant)>,
}

impl GestureState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging { .. })
    }

    /// Pane that owns the active drag
    pub fn owner(&self) -> Option<usize> {
        match self.phase {
            DragPhase::Dragging { pane, .. } => Some(pane),
            DragPhase::Idle => None,
        }
    }

    /// Handle a press or touch start at logical `x`.
    ///
    /// Every accepted activation refreshes the last-activation record, so a
    /// third quick press after a reset starts a new double-activation pair.
    pub fn activate(
        &mut self,
        pane: usize,
        x: f64,
        source: GestureSource,
        now: Instant,
    ) -> Activation {
        // A second finger or button never restarts or resets an active drag
        if self.owner().is_some() {
            return Activation::Ignored;
        }

        let is_double = matches!(
            self.last_activation,
            Some((last_pane, at)) if last_pane == pane
                && now.saturating_duration_since(at) < DOUBLE_ACTIVATION_WINDOW
        );
        self.last_activation = Some((pane, now));

        if is_double {
            self.phase = DragPhase::Idle;
            Activation::DoubleActivation
        } else {
            self.phase = DragPhase::Dragging {
                pane,
                start_x: x,
                current_x: x,
                source,
            };
            Activation::DragStarted
        }
    }

    /// Track movement of the owning pane; returns false if `pane` does not own the drag
    pub fn update(&mut self, pane: usize, x: f64) -> bool {
        match &mut self.phase {
            DragPhase::Dragging {
                pane: owner,
                current_x,
                ..
            } if *owner == pane => {
                if x.is_finite() {
                    *current_x = x;
                }
                true
            }
            _ => false,
        }
    }

    /// Finish the drag owned by `pane`.
    ///
    /// `x` (when given) is the release position. Returns the clamped span if
    /// it is at least [`MIN_DRAG_WIDTH`] wide; otherwise the gesture is
    /// dropped as a click. Releases from other panes leave the drag intact.
    pub fn release(
        &mut self,
        pane: usize,
        x: Option<f64>,
        clamp: impl Fn(f64) -> f64,
    ) -> Option<DragSpan> {
        let DragPhase::Dragging {
            pane: owner,
            start_x,
            current_x,
            ..
        } = self.phase
        else {
            return None;
        };
        if owner != pane {
            return None;
        }
        self.phase = DragPhase::Idle;

        let end_x = x.filter(|v| v.is_finite()).unwrap_or(current_x);
        let a = clamp(start_x);
        let b = clamp(end_x);
        let (left, right) = if a <= b { (a, b) } else { (b, a) };

        (right - left >= MIN_DRAG_WIDTH).then_some(DragSpan { pane, left, right })
    }

    /// Drop any active drag without producing a zoom
    pub fn cancel(&mut self) {
        self.phase = DragPhase::Idle;
    }
}
