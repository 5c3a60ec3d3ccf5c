use std::{cell::RefCell, rc::Rc};

use egui::{Color32, Rect, Response, Sense, Stroke, Vec2};
use walkers::{Plugin, Projector};

use crate::state::{MapCallbacks, SelectionState};
use crate::types::Point;

/// Points passing the coordinate-validity rule: both coordinates present and
/// finite. `(0, 0)` is a real location and stays in.
pub fn visible_points(points: &[Point]) -> Vec<&Point> {
    points.iter().filter(|p| p.position().is_some()).collect()
}

/// How many points the validity rule excluded, reported for diagnostics.
pub fn skipped_point_count(points: &[Point]) -> usize {
    points.iter().filter(|p| p.position().is_none()).count()
}

/// Marker radius in screen pixels, monotonic in zoom so pins grow as the
/// user moves closer.
pub fn marker_radius(zoom: f64) -> f32 {
    (3.0 + (zoom - 4.0) * 0.9).clamp(3.0, 14.0) as f32
}

/// Draws one marker per coordinate-valid point. Markers are recreated every
/// frame; the rendered set always equals the valid subset of the input list.
pub struct PointMarkers<'a> {
    points: &'a [Point],
    selected_point_id: Option<String>,
    zoom: f64,
    selection_state: Rc<RefCell<SelectionState>>,
    callbacks: Rc<MapCallbacks>,
}

impl<'a> PointMarkers<'a> {
    pub fn new(
        points: &'a [Point],
        selected_point_id: Option<String>,
        zoom: f64,
        selection_state: Rc<RefCell<SelectionState>>,
        callbacks: Rc<MapCallbacks>,
    ) -> Self {
        Self {
            points,
            selected_point_id,
            zoom,
            selection_state,
            callbacks,
        }
    }
}

impl Plugin for PointMarkers<'_> {
    fn run(self: Box<Self>, ui: &mut egui::Ui, _response: &Response, projector: &Projector) {
        let radius = marker_radius(self.zoom);
        for point in visible_points(self.points) {
            let Some(position) = point.position() else {
                continue;
            };
            let screen_position = projector.project(position).to_pos2();

            let hit_size = Vec2::splat((radius * 2.0).max(16.0));
            let clickable_area = Rect::from_center_size(screen_position, hit_size);
            let response = ui.allocate_rect(clickable_area, Sense::click());
            let clicked = response.clicked();

            let selected = self.selected_point_id.as_deref() == Some(point.id.as_str());
            let fill = if selected {
                Color32::from_rgb(214, 69, 65)
            } else if response.hovered() {
                Color32::from_rgb(240, 147, 43)
            } else {
                Color32::from_rgb(230, 103, 34)
            };

            let painter = ui.painter();
            painter.circle_filled(screen_position, radius, fill);
            painter.circle_stroke(screen_position, radius, Stroke::new(1.5, Color32::WHITE));
            if selected {
                painter.circle_stroke(screen_position, radius + 3.0, Stroke::new(2.0, fill));
            }

            response.on_hover_text(&point.name);

            if clicked {
                self.selection_state.borrow_mut().toggle_point_selection(point);
                (self.callbacks.on_point_click)(point);
            }
        }
    }
}
