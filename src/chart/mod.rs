//! Headless multi-pane time-series chart engine
//!
//! Everything in this module is plain data in, logical-pixel geometry out.
//! Nothing here touches egui's input or painting; the frontend feeds pointer
//! and touch events into a [`ChartDashboard`] and paints the
//! [`PaneGeometry`] it gets back.
//!
//! # Components
//!
//! - [`domain`] - Value/time domains with degenerate-span widening
//! - [`downsample`] - Stride downsampling to a point budget
//! - [`mapper`] - Logical viewport, data-to-pixel mapping and render scale
//! - [`axis`] - Value ticks, time ticks and local-midnight boundaries
//! - [`theme`] - Dark/light palettes and series colors
//! - [`series`] - Per-pane point extraction from raw samples
//! - [`pane`] - One chart pane and its cached geometry
//! - [`gesture`] - Drag-to-zoom and double-activation state machine
//! - [`hover`] - Nearest-sample lookup and tooltip placement
//! - [`dashboard`] - The shared zoom extent and the panes that follow it

pub mod axis;
pub mod dashboard;
pub mod domain;
pub mod downsample;
pub mod gesture;
pub mod hover;
pub mod mapper;
pub mod pane;
pub mod series;
pub mod theme;

pub use axis::{AxisTick, WallClock};
pub use dashboard::{ChartDashboard, DashboardOptions, Selection, TouchResponse};
pub use domain::Domain;
pub use downsample::downsample;
pub use gesture::{Activation, DragPhase, GestureSource, GestureState};
pub use hover::{HoverHit, HoverMarker, Tooltip};
pub use mapper::{Point, RenderScale, Viewport};
pub use pane::{Pane, PaneGeometry, PaneStatus, Polyline};
pub use series::PanePoint;
pub use theme::{SeriesColor, Theme, ThemeColors};
