use egui::{Color32, Pos2, Response, Shape, Stroke};
use walkers::{Plugin, Position, Projector};

use crate::catalog::{BoundaryKind, JurisdictionBoundary};

/// Draws the single effective boundary polygon, if any. The effective
/// boundary is resolved upstream by the catalog's ward-before-district
/// priority rule, so at most one polygon ever reaches this plugin.
pub struct BoundaryHighlight<'a> {
    boundary: Option<&'a JurisdictionBoundary>,
}

impl<'a> BoundaryHighlight<'a> {
    pub fn new(boundary: Option<&'a JurisdictionBoundary>) -> Self {
        Self { boundary }
    }
}

impl Plugin for BoundaryHighlight<'_> {
    fn run(self: Box<Self>, ui: &mut egui::Ui, _response: &Response, projector: &Projector) {
        let Some(boundary) = self.boundary else {
            return;
        };
        if !boundary.has_polygon() {
            return;
        }

        let screen: Vec<Pos2> = boundary
            .polygon
            .iter()
            .map(|(lat, lon)| {
                projector
                    .project(Position::from_lat_lon(*lat, *lon))
                    .to_pos2()
            })
            .collect();

        let color = match boundary.kind {
            BoundaryKind::Ward => Color32::from_rgb(31, 119, 212),
            BoundaryKind::District => Color32::from_rgb(92, 88, 196),
            BoundaryKind::Province => Color32::from_rgb(120, 82, 180),
        };
        ui.painter()
            .add(Shape::closed_line(screen, Stroke::new(2.5, color)));
    }
}
