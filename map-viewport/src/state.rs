use crate::types::{JurisdictionSelection, Point, Team};

/// Which marker family currently owns the surface. A single tagged variant
/// plus [`MapInputs::show_points_on_team_layer`] replaces the boolean triad
/// the layer toggles would otherwise need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveLayer {
    #[default]
    Points,
    Teams,
}

/// The state slice supplied by the hosting collaborator. Points arrive
/// already filtered by category, business type, jurisdiction, and search;
/// the dashboard filters them only by coordinate validity.
#[derive(Debug, Clone, Default)]
pub struct MapInputs {
    pub points: Vec<Point>,
    pub selected_point_id: Option<String>,
    pub search_text: String,
    pub selection: JurisdictionSelection,
    pub teams: Vec<Team>,
    pub active_team_id: Option<String>,
    pub active_layer: ActiveLayer,
    /// Keep point markers visible while the team layer is active.
    pub show_points_on_team_layer: bool,
}

impl MapInputs {
    pub fn points_layer_visible(&self) -> bool {
        match self.active_layer {
            ActiveLayer::Points => true,
            ActiveLayer::Teams => self.show_points_on_team_layer,
        }
    }
}

/// Tracks the point picked on the map itself.
pub struct SelectionState {
    pub point: Option<Point>,
}

impl SelectionState {
    pub fn new() -> SelectionState {
        Self { point: None }
    }

    /// If the provided point is already selected, it will be deselected.
    /// Otherwise, it will be selected.
    pub fn toggle_point_selection(&mut self, point: &Point) {
        if let Some(selected) = &self.point {
            if *selected == *point {
                self.point = None;
            } else {
                self.point = Some(point.clone());
            }
        } else {
            self.point = Some(point.clone());
        }
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Host callbacks, injected at construction time. Map-drawn content calls
/// back through these instead of any process-wide registry.
pub struct MapCallbacks {
    pub on_point_click: Box<dyn Fn(&Point)>,
    pub on_jurisdiction_marker_click: Box<dyn Fn(&str, &str)>,
    pub on_request_fullscreen: Box<dyn Fn()>,
}

impl Default for MapCallbacks {
    fn default() -> Self {
        Self {
            on_point_click: Box::new(|_| {}),
            on_jurisdiction_marker_click: Box::new(|_, _| {}),
            on_request_fullscreen: Box::new(|| {}),
        }
    }
}
