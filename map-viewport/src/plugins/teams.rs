use std::rc::Rc;

use egui::{Align2, Color32, FontId, Rect, Response, Sense, Stroke, Vec2};
use walkers::{Plugin, Position, Projector};

use crate::catalog::BoundaryCatalog;
use crate::state::MapCallbacks;
use crate::types::Team;

use super::points::marker_radius;

/// Marker position for a team: the arithmetic mean of its managed
/// jurisdictions' centroids. A managed jurisdiction without its own catalog
/// entry borrows the parent district's centroid; teams where nothing
/// resolves get no marker.
pub fn team_centroid(team: &Team, catalog: &BoundaryCatalog) -> Option<Position> {
    let mut lat_sum = 0.0;
    let mut lon_sum = 0.0;
    let mut count = 0usize;
    for jurisdiction_id in &team.managed_jurisdictions {
        let centroid = catalog.get(jurisdiction_id).and_then(|boundary| {
            boundary.centroid.or_else(|| {
                boundary
                    .parent_district
                    .as_ref()
                    .and_then(|district_id| catalog.centroid_of(district_id))
            })
        });
        if let Some(position) = centroid {
            lat_sum += position.lat();
            lon_sum += position.lon();
            count += 1;
        }
    }
    if count == 0 {
        return None;
    }
    Some(Position::from_lat_lon(
        lat_sum / count as f64,
        lon_sum / count as f64,
    ))
}

/// One aggregate marker per inspection team, or only the active team's when
/// one is set. Hover shows the roster; a click reports the team's first
/// managed jurisdiction to the host.
pub struct TeamMarkers<'a> {
    teams: &'a [Team],
    active_team_id: Option<String>,
    catalog: &'a BoundaryCatalog,
    zoom: f64,
    callbacks: Rc<MapCallbacks>,
}

impl<'a> TeamMarkers<'a> {
    pub fn new(
        teams: &'a [Team],
        active_team_id: Option<String>,
        catalog: &'a BoundaryCatalog,
        zoom: f64,
        callbacks: Rc<MapCallbacks>,
    ) -> Self {
        Self {
            teams,
            active_team_id,
            catalog,
            zoom,
            callbacks,
        }
    }

    fn report_first_jurisdiction(&self, team: &Team) {
        let Some(first_id) = team.managed_jurisdictions.first() else {
            return;
        };
        let ward = self.catalog.get(first_id);
        let ward_name = ward.map(|b| b.name.as_str()).unwrap_or(first_id.as_str());
        let district_name = ward
            .and_then(|b| b.parent_district.as_ref())
            .and_then(|district_id| self.catalog.get(district_id))
            .map(|b| b.name.as_str())
            .unwrap_or("");
        (self.callbacks.on_jurisdiction_marker_click)(ward_name, district_name);
    }
}

impl Plugin for TeamMarkers<'_> {
    fn run(self: Box<Self>, ui: &mut egui::Ui, _response: &Response, projector: &Projector) {
        let radius = marker_radius(self.zoom) + 3.0;
        for team in self.teams {
            if self
                .active_team_id
                .as_deref()
                .is_some_and(|id| id != team.id.as_str())
            {
                continue;
            }
            let Some(position) = team_centroid(team, self.catalog) else {
                continue;
            };
            let screen_position = projector.project(position).to_pos2();

            let hit_size = Vec2::splat((radius * 2.0).max(18.0));
            let clickable_area = Rect::from_center_size(screen_position, hit_size);
            let response = ui.allocate_rect(clickable_area, Sense::click());
            let clicked = response.clicked();

            let fill = if response.hovered() {
                Color32::from_rgb(72, 126, 230)
            } else {
                Color32::from_rgb(41, 98, 214)
            };
            let painter = ui.painter();
            painter.circle_filled(screen_position, radius, fill);
            painter.circle_stroke(screen_position, radius, Stroke::new(1.5, Color32::WHITE));
            painter.text(
                screen_position,
                Align2::CENTER_CENTER,
                team.roster.len().to_string(),
                FontId::proportional((radius * 1.2).max(10.0)),
                Color32::WHITE,
            );

            response.on_hover_ui(|ui| {
                ui.strong(&team.name);
                ui.label(format!(
                    "{} jurisdictions managed",
                    team.managed_jurisdictions.len()
                ));
                for member in &team.roster {
                    ui.label(member);
                }
            });

            if clicked {
                self.report_first_jurisdiction(team);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BoundaryKind, JurisdictionBoundary};

    fn square(base_lat: f64, base_lon: f64) -> Vec<(f64, f64)> {
        vec![
            (base_lat, base_lon),
            (base_lat, base_lon + 0.2),
            (base_lat + 0.2, base_lon + 0.2),
            (base_lat + 0.2, base_lon),
        ]
    }

    fn team(managed: &[&str]) -> Team {
        Team {
            id: "t1".to_string(),
            name: "Doi 1".to_string(),
            managed_jurisdictions: managed.iter().map(|s| s.to_string()).collect(),
            roster: vec!["An".to_string()],
        }
    }

    #[test]
    fn centroid_is_the_mean_of_managed_jurisdictions() {
        let mut catalog = BoundaryCatalog::new();
        catalog.insert(JurisdictionBoundary::from_polygon(
            "w1",
            BoundaryKind::Ward,
            "Ward 1",
            None,
            square(21.0, 105.8),
        ));
        catalog.insert(JurisdictionBoundary::from_polygon(
            "w2",
            BoundaryKind::Ward,
            "Ward 2",
            None,
            square(21.4, 106.0),
        ));

        let centroid = team_centroid(&team(&["w1", "w2"]), &catalog).unwrap();
        assert!((centroid.lat() - 21.3).abs() < 1e-9);
        assert!((centroid.lon() - 106.0).abs() < 1e-9);
    }

    #[test]
    fn ward_without_centroid_borrows_the_parent_district() {
        let mut catalog = BoundaryCatalog::new();
        catalog.insert(JurisdictionBoundary::from_polygon(
            "w1",
            BoundaryKind::Ward,
            "Ward 1",
            Some("d1".to_string()),
            Vec::new(),
        ));
        catalog.insert(JurisdictionBoundary::from_polygon(
            "d1",
            BoundaryKind::District,
            "District 1",
            None,
            square(21.0, 105.8),
        ));

        let centroid = team_centroid(&team(&["w1"]), &catalog).unwrap();
        assert!((centroid.lat() - 21.1).abs() < 1e-9);
        assert!((centroid.lon() - 105.9).abs() < 1e-9);
    }

    #[test]
    fn team_with_no_resolvable_centroid_is_skipped() {
        let catalog = BoundaryCatalog::new();
        assert!(team_centroid(&team(&["w1", "w2"]), &catalog).is_none());
    }
}
