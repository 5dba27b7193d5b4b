//! Pane painting and input translation
//!
//! Geometry comes from the chart engine in logical viewport pixels; a
//! [`RenderScale`] fitted to the allocated rect maps it to screen space.
//! Text is drawn in screen space so it keeps its nominal size however the
//! pane is stretched.

use crate::chart::dashboard::{ChartDashboard, Selection};
use crate::chart::hover::{place_tooltip, HoverMarker};
use crate::chart::mapper::{Point, RenderScale, Viewport};
use crate::chart::pane::{Pane, PaneStatus};
use egui::{
    pos2, vec2, Align2, Event, FontId, Id, LayerId, Order, Painter, Pos2, Rect, Response, Sense,
    Shape, Stroke, StrokeKind, TouchId, TouchPhase, Ui,
};
use std::time::Instant;

/// Height limits for one pane on screen
pub const MIN_PANE_HEIGHT: f32 = 120.0;
pub const MAX_PANE_HEIGHT: f32 = 260.0;

const LINE_WIDTH: f32 = 1.5;
const AXIS_FONT_SIZE: f32 = 11.0;
const TOOLTIP_FONT_SIZE: f32 = 12.0;
const TOOLTIP_PADDING: f32 = 6.0;
const MARKER_RADIUS: f32 = 3.5;

/// Screen height for a pane of the given width, keeping roughly the
/// viewport's aspect ratio
pub fn pane_height(width: f32, viewport: &Viewport) -> f32 {
    if !(width.is_finite() && viewport.width > 0.0) {
        return MIN_PANE_HEIGHT;
    }
    let aspect = (viewport.height / viewport.width) as f32;
    (width * aspect).clamp(MIN_PANE_HEIGHT, MAX_PANE_HEIGHT)
}

/// Per-pane input bookkeeping carried between frames
#[derive(Debug, Clone, Copy, Default)]
pub struct PaneInputState {
    /// Pointer was over the pane last frame
    pub hovered: bool,
    /// Touch driving this pane's gesture; later fingers are ignored
    pub touch: Option<TouchId>,
    /// Screen rect allocated last frame
    pub rect: Option<Rect>,
}

impl PaneInputState {
    /// Decide whether a touch event belongs to this pane's gesture.
    ///
    /// Only the first finger to land inside the pane is followed until it
    /// lifts or is cancelled.
    pub fn accept_touch(&mut self, id: TouchId, phase: TouchPhase, inside: bool) -> bool {
        match phase {
            TouchPhase::Start => {
                if self.touch.is_some() || !inside {
                    return false;
                }
                self.touch = Some(id);
                true
            }
            TouchPhase::Move => self.touch == Some(id),
            TouchPhase::End | TouchPhase::Cancel => {
                if self.touch != Some(id) {
                    return false;
                }
                self.touch = None;
                true
            }
        }
    }
}

/// True when this frame's events start a touch on any pane laid out last
/// frame, so scrolling can be locked before the panes run.
pub fn touch_starts_on_pane(events: &[Event], inputs: &[PaneInputState]) -> bool {
    events.iter().any(|e| match e {
        Event::Touch {
            phase: TouchPhase::Start,
            pos,
            ..
        } => inputs
            .iter()
            .any(|input| input.rect.is_some_and(|r| r.contains(*pos))),
        _ => false,
    })
}

/// Show pane `index`: title, chart and input. Returns true when a touch
/// gesture on this pane should suppress scrolling.
pub fn show_pane(
    ui: &mut Ui,
    dashboard: &mut ChartDashboard,
    index: usize,
    input: &mut PaneInputState,
) -> bool {
    let Some(pane) = dashboard.pane(index) else {
        return false;
    };
    let title = if pane.spec().unit.is_empty() {
        pane.spec().title.clone()
    } else {
        format!("{} ({})", pane.spec().title, pane.spec().unit)
    };
    let viewport = *pane.viewport();

    ui.label(egui::RichText::new(title).strong());

    let width = ui.available_width();
    let size = vec2(width, pane_height(width, &viewport));
    let (response, painter) = ui.allocate_painter(size, Sense::click_and_drag());
    let rect = response.rect;
    input.rect = Some(rect);
    let scale = RenderScale::fit(
        &viewport,
        rect.left() as f64,
        rect.top() as f64,
        rect.width() as f64,
        rect.height() as f64,
    );

    let consume = handle_input(ui, &response, &scale, dashboard, index, input);

    if let Some(pane) = dashboard.pane(index) {
        paint_pane(
            &painter,
            pane,
            &scale,
            dashboard.selection().filter(|s| s.pane == index),
            dashboard.highlight_for(index),
        );
    }
    consume
}

fn handle_input(
    ui: &Ui,
    response: &Response,
    scale: &RenderScale,
    dashboard: &mut ChartDashboard,
    index: usize,
    input: &mut PaneInputState,
) -> bool {
    let logical_x = |pos: Pos2| scale.to_logical(pos.x as f64, pos.y as f64).x;

    let (touches, any_touches, pressed, released, latest) = ui.input(|i| {
        let touches: Vec<(TouchId, TouchPhase, Pos2)> = i
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Touch { id, phase, pos, .. } => Some((*id, *phase, *pos)),
                _ => None,
            })
            .collect();
        (
            touches,
            i.any_touches(),
            i.pointer.primary_pressed(),
            i.pointer.primary_released(),
            i.pointer.latest_pos(),
        )
    });

    // egui mirrors touches as pointer events; handle them once, as touches
    if any_touches || !touches.is_empty() {
        let mut consume = false;
        for (id, phase, pos) in touches {
            if !input.accept_touch(id, phase, response.rect.contains(pos)) {
                continue;
            }
            let reply = match phase {
                TouchPhase::Start => {
                    dashboard.on_touch_start(index, logical_x(pos), Instant::now())
                }
                TouchPhase::Move => dashboard.on_touch_move(index, logical_x(pos)),
                TouchPhase::End => dashboard.on_touch_end(index, Some(logical_x(pos))),
                TouchPhase::Cancel => dashboard.on_touch_cancel(index),
            };
            consume |= reply.consume_default;
        }
        return consume || dashboard.selection().is_some_and(|s| s.pane == index);
    }

    let hovered = response.contains_pointer();
    if let Some(pos) = latest {
        if pressed && hovered {
            dashboard.on_pointer_down(index, logical_x(pos), Instant::now());
        }
        if hovered {
            dashboard.on_pointer_move(index, logical_x(pos));
        }
        if released {
            dashboard.on_pointer_up(index, logical_x(pos));
        }
    }
    if input.hovered && !hovered {
        dashboard.on_pointer_leave(index);
    }
    input.hovered = hovered;

    if response.double_clicked() {
        dashboard.on_double_activate(index);
    }
    false
}

fn to_pos(scale: &RenderScale, x: f64, y: f64) -> Pos2 {
    let p = scale.to_screen(Point::new(x, y));
    pos2(p.x as f32, p.y as f32)
}

/// Paint a pane's cached geometry plus the transient selection and highlight
pub fn paint_pane(
    painter: &Painter,
    pane: &Pane,
    scale: &RenderScale,
    selection: Option<Selection>,
    highlight: Option<&HoverMarker>,
) {
    let vp = pane.viewport();
    let geometry = pane.geometry();
    let colors = geometry.colors;
    let axis_font = FontId::proportional(AXIS_FONT_SIZE);

    let plot_rect = Rect::from_min_max(
        to_pos(scale, vp.x_left(), vp.y_top()),
        to_pos(scale, vp.x_right(), vp.y_bottom()),
    );
    painter.rect_filled(plot_rect, 0.0, colors.background);

    if pane.status() == PaneStatus::NoData {
        painter.text(
            plot_rect.center(),
            Align2::CENTER_CENTER,
            "No data available",
            FontId::proportional(13.0),
            colors.axes,
        );
        return;
    }

    for tick in &geometry.value_ticks {
        let left = to_pos(scale, vp.x_left(), tick.pos);
        let right = to_pos(scale, vp.x_right(), tick.pos);
        painter.line_segment([left, right], Stroke::new(1.0, colors.grid));
        painter.text(
            left - vec2(6.0, 0.0),
            Align2::RIGHT_CENTER,
            &tick.label,
            axis_font.clone(),
            colors.axes,
        );
    }

    for x in &geometry.boundaries {
        let top = to_pos(scale, *x, vp.y_top());
        let bottom = to_pos(scale, *x, vp.y_bottom());
        painter.extend(Shape::dashed_line(
            &[top, bottom],
            Stroke::new(1.0, colors.midnight),
            4.0,
            4.0,
        ));
    }

    let axis_stroke = Stroke::new(1.0, colors.axes);
    painter.line_segment([plot_rect.left_top(), plot_rect.left_bottom()], axis_stroke);
    painter.line_segment([plot_rect.left_bottom(), plot_rect.right_bottom()], axis_stroke);

    for tick in &geometry.time_ticks {
        let base = to_pos(scale, tick.pos, vp.y_bottom());
        painter.line_segment([base, base + vec2(0.0, 4.0)], axis_stroke);
        painter.text(
            base + vec2(0.0, 5.0),
            Align2::CENTER_TOP,
            &tick.label,
            axis_font.clone(),
            colors.axes,
        );
    }

    let clipped = painter.with_clip_rect(plot_rect.expand(1.0));
    for line in &geometry.polylines {
        let points: Vec<Pos2> = line
            .points
            .iter()
            .map(|p| to_pos(scale, p.x, p.y))
            .collect();
        match points.as_slice() {
            [] => {}
            [single] => {
                clipped.circle_filled(*single, LINE_WIDTH, line.color);
            }
            _ => {
                clipped.add(Shape::line(points, Stroke::new(LINE_WIDTH, line.color)));
            }
        }
    }

    if let Some(sel) = selection {
        let rect = Rect::from_min_max(
            to_pos(scale, sel.left, vp.y_top()),
            to_pos(scale, sel.right, vp.y_bottom()),
        );
        painter.rect_filled(rect, 0.0, colors.primary_line.gamma_multiply(0.15));
        painter.rect_stroke(
            rect,
            0.0,
            Stroke::new(1.0, colors.primary_line.gamma_multiply(0.6)),
            StrokeKind::Inside,
        );
    }

    if let Some(marker) = highlight {
        let top = to_pos(scale, marker.x, vp.y_top());
        let bottom = to_pos(scale, marker.x, vp.y_bottom());
        painter.line_segment([top, bottom], Stroke::new(1.0, colors.axes));
        for dot in &marker.dots {
            clipped.circle_filled(to_pos(scale, dot.point.x, dot.point.y), MARKER_RADIUS, dot.color);
        }
    }
}

/// Paint the hover tooltip, if any, above everything else in `container`
pub fn paint_tooltip(ctx: &egui::Context, dashboard: &ChartDashboard, container: Rect) {
    let Some(hit) = dashboard.tooltip() else {
        return;
    };
    let Some(pointer) = ctx.pointer_latest_pos() else {
        return;
    };

    let painter = ctx.layer_painter(LayerId::new(Order::Tooltip, Id::new("chart_tooltip")));
    let colors = dashboard.theme().colors();
    let font = FontId::proportional(TOOLTIP_FONT_SIZE);

    let mut galleys = vec![painter.layout_no_wrap(
        hit.tooltip.time_label.clone(),
        font.clone(),
        colors.axes,
    )];
    for line in &hit.tooltip.lines {
        galleys.push(painter.layout_no_wrap(line.text.clone(), font.clone(), line.color));
    }

    let line_gap = 2.0;
    let width = galleys.iter().map(|g| g.size().x).fold(0.0, f32::max) + 2.0 * TOOLTIP_PADDING;
    let height = galleys.iter().map(|g| g.size().y + line_gap).sum::<f32>() - line_gap
        + 2.0 * TOOLTIP_PADDING;

    let (x, y) = place_tooltip(
        (
            (pointer.x - container.min.x) as f64,
            (pointer.y - container.min.y) as f64,
        ),
        (width as f64, height as f64),
        (container.width() as f64, container.height() as f64),
    );
    let rect = Rect::from_min_size(
        pos2(container.min.x + x as f32, container.min.y + y as f32),
        vec2(width, height),
    );

    painter.rect_filled(rect, 4.0, colors.background);
    painter.rect_stroke(rect, 4.0, Stroke::new(1.0, colors.grid), StrokeKind::Inside);

    let mut cursor = rect.min + vec2(TOOLTIP_PADDING, TOOLTIP_PADDING);
    for galley in galleys {
        let h = galley.size().y;
        painter.galley(cursor, galley, colors.axes);
        cursor.y += h + line_gap;
    }
}
