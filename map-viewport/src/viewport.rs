use std::time::{Duration, Instant};

use logger::Logger;
use walkers::Position;

use crate::catalog::{BoundaryCatalog, BoundaryKind};
use crate::plugins::points::visible_points;
use crate::plugins::teams::team_centroid;
use crate::resolver::{CoordinateResolver, JurisdictionLookup};
use crate::state::{ActiveLayer, MapInputs};
use crate::types::{JurisdictionSelection, MapBounds};

pub const DEFAULT_CENTER_LAT: f64 = 21.028511;
pub const DEFAULT_CENTER_LON: f64 = 105.804817;
/// City-level view shown on boot and after a cleared search.
pub const DEFAULT_ZOOM: f64 = 11.0;
pub const POINT_ZOOM: f64 = 16.0;
pub const WARD_ZOOM: f64 = 15.0;
pub const DISTRICT_ZOOM: f64 = 13.0;
pub const PROVINCE_ZOOM: f64 = 10.0;
pub const TEAM_ZOOM: f64 = 13.0;
pub const FIT_PADDING: f64 = 0.15;

/// Wait before resolving a changed jurisdiction, so intermediate selections
/// never reach the coordinate service.
pub const RESOLVE_SETTLE: Duration = Duration::from_millis(400);
/// Wait before focusing a newly activated team.
pub const TEAM_SETTLE: Duration = Duration::from_millis(250);
/// Wait between centering on a point and opening its callout, so the camera
/// move is visually settled first.
pub const CALLOUT_SETTLE: Duration = Duration::from_millis(300);

pub fn default_center() -> Position {
    Position::from_lat_lon(DEFAULT_CENTER_LAT, DEFAULT_CENTER_LON)
}

/// An instruction to move the camera. Produced by the controller, consumed
/// immediately by the render surface, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportCommand {
    Center { position: Position, zoom: f64 },
    Fit { bounds: MapBounds, padding: f64 },
}

/// What a controller cycle asks the hosting shell to do.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportEffect {
    Camera(ViewportCommand),
    OpenCallout { point_id: String },
}

/// Blocks automatic camera movement after the user pans or zooms by hand,
/// until an explicit trigger resets it.
#[derive(Debug, Default)]
pub struct InteractionGuard {
    user_has_navigated: bool,
}

impl InteractionGuard {
    /// Called by the surface's raw input listeners only.
    pub fn note_user_navigation(&mut self) {
        self.user_has_navigated = true;
    }

    pub fn reset(&mut self) {
        self.user_has_navigated = false;
    }

    pub fn permits_auto_navigation(&self) -> bool {
        !self.user_has_navigated
    }
}

/// Previous-value snapshots used to detect each trigger's edge.
#[derive(Debug, Default)]
struct TriggerSnapshots {
    search_text: String,
    selected_point_id: Option<String>,
    selection: JurisdictionSelection,
    team_id: Option<String>,
    layer: ActiveLayer,
    effective_boundary: Option<String>,
}

#[derive(Debug, Clone)]
struct ScheduledResolution {
    due: Instant,
    generation: u64,
    jurisdiction_id: String,
    kind: BoundaryKind,
}

#[derive(Debug, Clone)]
struct ScheduledCallout {
    due: Instant,
    point_id: String,
}

#[derive(Debug, Clone)]
struct ScheduledTeamFocus {
    due: Instant,
    team_id: String,
}

/// Watches the five camera triggers (selected point, search text,
/// jurisdiction selection, team selection, layer-activation edge) and issues
/// camera commands through the interaction guard.
///
/// A genuine input edge is an explicit trigger: it clears the guard and
/// proceeds. Commands whose issue is deferred behind a settle delay consult
/// the guard again when they fire, so a manual gesture arriving in between
/// wins. Snapshots always advance, even when a command is withheld, so stale
/// history never mis-fires a later trigger.
pub struct ViewportController {
    guard: InteractionGuard,
    snaps: TriggerSnapshots,
    pending_resolution: Option<ScheduledResolution>,
    pending_callout: Option<ScheduledCallout>,
    pending_team_focus: Option<ScheduledTeamFocus>,
    generation: u64,
    logger: Option<Logger>,
}

impl ViewportController {
    pub fn new() -> Self {
        Self {
            guard: InteractionGuard::default(),
            snaps: TriggerSnapshots::default(),
            pending_resolution: None,
            pending_callout: None,
            pending_team_focus: None,
            generation: 0,
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Forwarded from the surface's pointer/zoom listeners. Programmatic
    /// camera moves never go through here.
    pub fn note_user_navigation(&mut self) {
        self.guard.note_user_navigation();
    }

    pub fn user_has_navigated(&self) -> bool {
        !self.guard.permits_auto_navigation()
    }

    /// True while a settle delay is running; the shell uses this to keep
    /// frames coming.
    pub fn has_pending_work(&self) -> bool {
        self.pending_resolution.is_some()
            || self.pending_callout.is_some()
            || self.pending_team_focus.is_some()
    }

    /// One update cycle. Evaluates the trigger edges in priority order, then
    /// fires whichever scheduled tasks have come due.
    pub fn tick<L: JurisdictionLookup>(
        &mut self,
        inputs: &MapInputs,
        catalog: &BoundaryCatalog,
        resolver: &mut CoordinateResolver<L>,
        now: Instant,
    ) -> Vec<ViewportEffect> {
        let mut effects = Vec::new();

        let point_fired = self.check_selected_point(inputs, now, &mut effects);
        self.check_search(inputs, point_fired, &mut effects);
        self.check_jurisdiction(inputs, now);
        self.check_team(inputs, now);
        self.check_layer_edge(inputs, &mut effects);
        self.check_boundary_fit(inputs, catalog, &mut effects);

        self.fire_due_callout(inputs, now, &mut effects);
        self.fire_due_team_focus(inputs, catalog, now, &mut effects);
        self.fire_due_resolution(inputs, resolver, now, &mut effects);

        effects
    }

    /// Trigger 1: the selected point changed and its marker is on screen.
    fn check_selected_point(
        &mut self,
        inputs: &MapInputs,
        now: Instant,
        effects: &mut Vec<ViewportEffect>,
    ) -> bool {
        if inputs.selected_point_id == self.snaps.selected_point_id {
            return false;
        }
        self.snaps.selected_point_id = inputs.selected_point_id.clone();
        self.pending_callout = None;

        let Some(id) = inputs.selected_point_id.clone() else {
            return false;
        };
        if !inputs.points_layer_visible() {
            return false;
        }
        let Some(position) = visible_points(&inputs.points)
            .into_iter()
            .find(|p| p.id == id)
            .and_then(|p| p.position())
        else {
            return false;
        };

        self.guard.reset();
        effects.push(ViewportEffect::Camera(ViewportCommand::Center {
            position,
            zoom: POINT_ZOOM,
        }));
        self.pending_callout = Some(ScheduledCallout {
            due: now + CALLOUT_SETTLE,
            point_id: id,
        });
        true
    }

    /// Trigger 2: the search text changed. Suppressed for the cycle when the
    /// selected-point trigger already fired, but the snapshot still advances.
    fn check_search(
        &mut self,
        inputs: &MapInputs,
        suppressed: bool,
        effects: &mut Vec<ViewportEffect>,
    ) {
        if inputs.search_text == self.snaps.search_text {
            return;
        }
        let previous = std::mem::replace(&mut self.snaps.search_text, inputs.search_text.clone());
        if suppressed {
            return;
        }

        if inputs.search_text.is_empty() {
            if !previous.is_empty() {
                self.guard.reset();
                effects.push(ViewportEffect::Camera(ViewportCommand::Center {
                    position: default_center(),
                    zoom: DEFAULT_ZOOM,
                }));
            }
            return;
        }

        let positions: Vec<Position> = visible_points(&inputs.points)
            .into_iter()
            .filter_map(|p| p.position())
            .collect();
        match positions.as_slice() {
            [] => {}
            [single] => {
                self.guard.reset();
                effects.push(ViewportEffect::Camera(ViewportCommand::Center {
                    position: *single,
                    zoom: POINT_ZOOM,
                }));
            }
            many => {
                if let Some(bounds) = MapBounds::from_positions(many.iter().copied()) {
                    self.guard.reset();
                    effects.push(ViewportEffect::Camera(ViewportCommand::Fit {
                        bounds,
                        padding: FIT_PADDING,
                    }));
                }
            }
        }
    }

    /// Trigger 3: the ward or province selection changed. The resolution is
    /// scheduled behind a settle delay and the snapshot advances only when
    /// it fires, so a rapid second change supersedes the first.
    fn check_jurisdiction(&mut self, inputs: &MapInputs, now: Instant) {
        let ward_changed = inputs.selection.ward_id != self.snaps.selection.ward_id;
        let province_changed = inputs.selection.province_id != self.snaps.selection.province_id;
        if !ward_changed && !province_changed {
            return;
        }

        let target = if ward_changed {
            inputs
                .selection
                .ward_id
                .clone()
                .map(|id| (id, BoundaryKind::Ward))
        } else {
            None
        }
        .or_else(|| {
            if province_changed {
                inputs
                    .selection
                    .province_id
                    .clone()
                    .map(|id| (id, BoundaryKind::Province))
            } else {
                None
            }
        });

        match target {
            Some((jurisdiction_id, kind)) => {
                let already_pending = self
                    .pending_resolution
                    .as_ref()
                    .is_some_and(|p| p.jurisdiction_id == jurisdiction_id && p.kind == kind);
                if !already_pending {
                    self.generation += 1;
                    self.pending_resolution = Some(ScheduledResolution {
                        due: now + RESOLVE_SETTLE,
                        generation: self.generation,
                        jurisdiction_id,
                        kind,
                    });
                    self.guard.reset();
                }
            }
            None => {
                // deselection: nothing to resolve, drop any scheduled work
                self.generation += 1;
                self.pending_resolution = None;
                self.snaps.selection.ward_id = inputs.selection.ward_id.clone();
                self.snaps.selection.province_id = inputs.selection.province_id.clone();
            }
        }
    }

    /// Trigger 4: the active team changed while the team layer is showing.
    fn check_team(&mut self, inputs: &MapInputs, now: Instant) {
        if inputs.active_team_id == self.snaps.team_id {
            return;
        }
        self.snaps.team_id = inputs.active_team_id.clone();
        if inputs.active_layer != ActiveLayer::Teams {
            return;
        }
        match inputs.active_team_id.clone() {
            Some(team_id) => {
                self.guard.reset();
                self.pending_team_focus = Some(ScheduledTeamFocus {
                    due: now + TEAM_SETTLE,
                    team_id,
                });
            }
            None => {
                self.pending_team_focus = None;
            }
        }
    }

    /// Trigger 5: the layer selector transitioned into the points layer.
    fn check_layer_edge(&mut self, inputs: &MapInputs, effects: &mut Vec<ViewportEffect>) {
        if inputs.active_layer == self.snaps.layer {
            return;
        }
        self.snaps.layer = inputs.active_layer;
        if inputs.active_layer == ActiveLayer::Points {
            self.guard.reset();
            effects.push(ViewportEffect::Camera(ViewportCommand::Center {
                position: default_center(),
                zoom: DEFAULT_ZOOM,
            }));
        }
    }

    /// Camera-fit to the effective boundary, only when it actually changed
    /// and the guard currently permits auto-navigation. Not one of the five
    /// triggers: it never clears the guard.
    fn check_boundary_fit(
        &mut self,
        inputs: &MapInputs,
        catalog: &BoundaryCatalog,
        effects: &mut Vec<ViewportEffect>,
    ) {
        self.snaps.selection.district_id = inputs.selection.district_id.clone();

        let effective = catalog.resolve_effective(&inputs.selection);
        let effective_id = effective.map(|b| b.id.clone());
        if effective_id == self.snaps.effective_boundary {
            return;
        }
        self.snaps.effective_boundary = effective_id;

        let Some(bounds) = effective.and_then(|b| b.bbox) else {
            return;
        };
        if !self.guard.permits_auto_navigation() {
            return;
        }
        effects.push(ViewportEffect::Camera(ViewportCommand::Fit {
            bounds,
            padding: FIT_PADDING,
        }));
    }

    fn fire_due_callout(
        &mut self,
        inputs: &MapInputs,
        now: Instant,
        effects: &mut Vec<ViewportEffect>,
    ) {
        let due = self
            .pending_callout
            .as_ref()
            .is_some_and(|pending| now >= pending.due);
        if !due {
            return;
        }
        if let Some(pending) = self.pending_callout.take() {
            if inputs.selected_point_id.as_deref() == Some(pending.point_id.as_str()) {
                effects.push(ViewportEffect::OpenCallout {
                    point_id: pending.point_id,
                });
            }
        }
    }

    fn fire_due_team_focus(
        &mut self,
        inputs: &MapInputs,
        catalog: &BoundaryCatalog,
        now: Instant,
        effects: &mut Vec<ViewportEffect>,
    ) {
        let due = self
            .pending_team_focus
            .as_ref()
            .is_some_and(|pending| now >= pending.due);
        if !due {
            return;
        }
        let Some(pending) = self.pending_team_focus.take() else {
            return;
        };
        if !self.guard.permits_auto_navigation() {
            return;
        }
        let centroid = inputs
            .teams
            .iter()
            .find(|t| t.id == pending.team_id)
            .and_then(|team| team_centroid(team, catalog));
        match centroid {
            Some(position) => effects.push(ViewportEffect::Camera(ViewportCommand::Center {
                position,
                zoom: TEAM_ZOOM,
            })),
            None => self.log_warn(&format!(
                "team {} has no resolvable centroid",
                pending.team_id
            )),
        }
    }

    fn fire_due_resolution<L: JurisdictionLookup>(
        &mut self,
        inputs: &MapInputs,
        resolver: &mut CoordinateResolver<L>,
        now: Instant,
        effects: &mut Vec<ViewportEffect>,
    ) {
        let due = self
            .pending_resolution
            .as_ref()
            .is_some_and(|pending| now >= pending.due);
        if !due {
            return;
        }
        let Some(pending) = self.pending_resolution.take() else {
            return;
        };
        if pending.generation != self.generation {
            // superseded while waiting; its result must never apply
            return;
        }

        // the snapshot advances now, not at schedule time
        self.snaps.selection.ward_id = inputs.selection.ward_id.clone();
        self.snaps.selection.province_id = inputs.selection.province_id.clone();

        match resolver.resolve_jurisdiction_center(&pending.jurisdiction_id, &inputs.points) {
            Some(resolved) => {
                if !self.guard.permits_auto_navigation() {
                    return;
                }
                let command = match resolved.bounds {
                    Some(bounds) => ViewportCommand::Fit {
                        bounds,
                        padding: FIT_PADDING,
                    },
                    None => ViewportCommand::Center {
                        position: resolved.center,
                        zoom: zoom_for_kind(pending.kind),
                    },
                };
                effects.push(ViewportEffect::Camera(command));
            }
            None => self.log_warn(&format!(
                "no usable location for jurisdiction {}",
                pending.jurisdiction_id
            )),
        }
    }

    fn log_warn(&self, message: &str) {
        if let Some(log) = &self.logger {
            let _ = log.warn(message, false);
        }
    }
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new()
    }
}

fn zoom_for_kind(kind: BoundaryKind) -> f64 {
    match kind {
        BoundaryKind::Ward => WARD_ZOOM,
        BoundaryKind::District => DISTRICT_ZOOM,
        BoundaryKind::Province => PROVINCE_ZOOM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::JurisdictionBoundary;
    use crate::resolver::{LookupError, LookupRecord};
    use crate::types::{Point, Team};
    use std::collections::HashMap;

    struct FakeLookup {
        records: HashMap<String, LookupRecord>,
        calls: Vec<String>,
    }

    impl FakeLookup {
        fn empty() -> Self {
            Self {
                records: HashMap::new(),
                calls: Vec::new(),
            }
        }

        fn with_center(id: &str, lat: f64, lon: f64) -> Self {
            let mut lookup = Self::empty();
            lookup.records.insert(
                id.to_string(),
                LookupRecord {
                    center: Position::from_lat_lon(lat, lon),
                    bounds: None,
                },
            );
            lookup
        }
    }

    impl JurisdictionLookup for FakeLookup {
        fn lookup(&mut self, jurisdiction_id: &str) -> Result<Option<LookupRecord>, LookupError> {
            self.calls.push(jurisdiction_id.to_string());
            Ok(self.records.get(jurisdiction_id).cloned())
        }
    }

    fn point(id: &str, lat: f64, lng: f64) -> Point {
        Point {
            id: id.to_string(),
            name: id.to_string(),
            lat: Some(lat),
            lng: Some(lng),
            category: "restaurant".to_string(),
            business_type: "food".to_string(),
            ward_id: None,
            district_id: None,
            province_id: None,
        }
    }

    fn square(base_lat: f64, base_lon: f64) -> Vec<(f64, f64)> {
        vec![
            (base_lat, base_lon),
            (base_lat, base_lon + 0.1),
            (base_lat + 0.1, base_lon + 0.1),
            (base_lat + 0.1, base_lon),
        ]
    }

    fn catalog() -> BoundaryCatalog {
        let mut catalog = BoundaryCatalog::new();
        catalog.insert(JurisdictionBoundary::from_polygon(
            "w1",
            BoundaryKind::Ward,
            "Phuong Hang Bac",
            Some("d1".to_string()),
            square(21.03, 105.85),
        ));
        catalog.insert(JurisdictionBoundary::from_polygon(
            "d1",
            BoundaryKind::District,
            "Quan Hoan Kiem",
            None,
            square(21.0, 105.8),
        ));
        catalog
    }

    fn camera_commands(effects: &[ViewportEffect]) -> Vec<&ViewportCommand> {
        effects
            .iter()
            .filter_map(|e| match e {
                ViewportEffect::Camera(cmd) => Some(cmd),
                _ => None,
            })
            .collect()
    }

    struct Harness {
        controller: ViewportController,
        catalog: BoundaryCatalog,
        resolver: CoordinateResolver<FakeLookup>,
        inputs: MapInputs,
        now: Instant,
    }

    impl Harness {
        fn new(lookup: FakeLookup) -> Self {
            Self {
                controller: ViewportController::new(),
                catalog: catalog(),
                resolver: CoordinateResolver::new(lookup),
                inputs: MapInputs::default(),
                now: Instant::now(),
            }
        }

        fn tick(&mut self) -> Vec<ViewportEffect> {
            self.controller
                .tick(&self.inputs, &self.catalog, &mut self.resolver, self.now)
        }

        fn advance(&mut self, d: Duration) {
            self.now += d;
        }
    }

    #[test]
    fn selected_point_centers_and_opens_callout_after_settle() {
        let mut h = Harness::new(FakeLookup::empty());
        h.inputs.points = vec![point("1", 21.03, 105.85)];
        h.tick();

        h.inputs.selected_point_id = Some("1".to_string());
        let effects = h.tick();
        assert_eq!(
            camera_commands(&effects),
            vec![&ViewportCommand::Center {
                position: Position::from_lat_lon(21.03, 105.85),
                zoom: POINT_ZOOM,
            }]
        );
        assert!(h.controller.has_pending_work());

        h.advance(CALLOUT_SETTLE + Duration::from_millis(10));
        let effects = h.tick();
        assert_eq!(
            effects,
            vec![ViewportEffect::OpenCallout {
                point_id: "1".to_string()
            }]
        );
    }

    #[test]
    fn selected_point_without_rendered_marker_moves_nothing() {
        let mut h = Harness::new(FakeLookup::empty());
        h.inputs.points = vec![Point {
            lat: Some(f64::NAN),
            ..point("1", 0.0, 0.0)
        }];
        h.tick();

        h.inputs.selected_point_id = Some("1".to_string());
        let effects = h.tick();
        assert!(effects.is_empty());

        // snapshot advanced: the same selection never re-fires
        let effects = h.tick();
        assert!(effects.is_empty());
    }

    #[test]
    fn search_with_single_match_centers_tightly() {
        let mut h = Harness::new(FakeLookup::empty());
        h.inputs.points = vec![point("1", 21.03, 105.85)];
        h.tick();

        h.inputs.search_text = "Pho".to_string();
        let effects = h.tick();
        assert_eq!(
            camera_commands(&effects),
            vec![&ViewportCommand::Center {
                position: Position::from_lat_lon(21.03, 105.85),
                zoom: POINT_ZOOM,
            }]
        );
    }

    #[test]
    fn search_with_many_matches_fits_their_bounds() {
        let mut h = Harness::new(FakeLookup::empty());
        h.inputs.points = vec![point("1", 21.0, 105.8), point("2", 21.2, 106.0)];
        h.tick();

        h.inputs.search_text = "Pho".to_string();
        let effects = h.tick();
        let commands = camera_commands(&effects);
        assert_eq!(commands.len(), 1);
        match commands[0] {
            ViewportCommand::Fit { bounds, padding } => {
                assert_eq!(bounds.min_lat, 21.0);
                assert_eq!(bounds.max_lat, 21.2);
                assert_eq!(*padding, FIT_PADDING);
            }
            other => panic!("expected a bounds fit, got {:?}", other),
        }
    }

    #[test]
    fn clearing_the_search_returns_to_the_default_view() {
        let mut h = Harness::new(FakeLookup::empty());
        h.inputs.points = vec![point("1", 21.03, 105.85)];
        h.inputs.search_text = "Pho".to_string();
        h.tick();

        h.inputs.search_text = String::new();
        let effects = h.tick();
        assert_eq!(
            camera_commands(&effects),
            vec![&ViewportCommand::Center {
                position: default_center(),
                zoom: DEFAULT_ZOOM,
            }]
        );
    }

    #[test]
    fn search_trigger_overrides_manual_navigation() {
        // scenario: user zooms by hand, then types a search that matches one point
        let mut h = Harness::new(FakeLookup::empty());
        h.inputs.points = vec![point("1", 21.03, 105.85)];
        h.tick();

        h.controller.note_user_navigation();
        h.inputs.search_text = "Pho".to_string();
        let effects = h.tick();
        assert_eq!(camera_commands(&effects).len(), 1);
        assert!(!h.controller.user_has_navigated());
    }

    #[test]
    fn manual_navigation_blocks_everything_until_a_real_edge() {
        let mut h = Harness::new(FakeLookup::empty());
        h.inputs.points = vec![point("1", 21.03, 105.85)];
        h.tick();

        h.controller.note_user_navigation();
        for _ in 0..3 {
            h.advance(Duration::from_millis(500));
            assert!(h.tick().is_empty());
        }
        assert!(h.controller.user_has_navigated());
    }

    #[test]
    fn rapid_jurisdiction_changes_resolve_only_the_last_one() {
        // scenario: province A then province B inside the settle delay
        let mut h = Harness::new(FakeLookup::with_center("pB", 20.5, 106.3));
        h.resolver.lookup_mut().records.insert(
            "pA".to_string(),
            LookupRecord {
                center: Position::from_lat_lon(10.0, 106.0),
                bounds: None,
            },
        );
        h.tick();

        h.inputs.selection.province_id = Some("pA".to_string());
        h.tick();
        h.advance(Duration::from_millis(100));
        h.inputs.selection.province_id = Some("pB".to_string());
        h.tick();

        // past pA's original deadline but not pB's
        h.advance(Duration::from_millis(350));
        assert!(h.tick().is_empty());

        h.advance(Duration::from_millis(100));
        let effects = h.tick();
        assert_eq!(
            camera_commands(&effects),
            vec![&ViewportCommand::Center {
                position: Position::from_lat_lon(20.5, 106.3),
                zoom: PROVINCE_ZOOM,
            }]
        );
        assert_eq!(h.resolver.lookup().calls, vec!["pB".to_string()]);
    }

    #[test]
    fn ward_resolution_uses_point_centroid_before_the_service() {
        let mut h = Harness::new(FakeLookup::empty());
        h.inputs.points = vec![point("1", 21.0, 105.8), point("2", 21.2, 106.0)];
        h.tick();

        h.inputs.selection.ward_id = Some("w9".to_string());
        h.tick();
        h.advance(RESOLVE_SETTLE + Duration::from_millis(10));
        let effects = h.tick();
        assert_eq!(
            camera_commands(&effects),
            vec![&ViewportCommand::Center {
                position: Position::from_lat_lon(21.1, 105.9),
                zoom: WARD_ZOOM,
            }]
        );
        assert!(h.resolver.lookup().calls.is_empty());
    }

    #[test]
    fn manual_gesture_during_settle_blocks_the_resolved_command() {
        let mut h = Harness::new(FakeLookup::with_center("pA", 20.5, 106.3));
        h.tick();

        h.inputs.selection.province_id = Some("pA".to_string());
        h.tick();
        h.controller.note_user_navigation();

        h.advance(RESOLVE_SETTLE + Duration::from_millis(10));
        assert!(h.tick().is_empty());

        // bookkeeping still happened: the selection never re-fires
        h.advance(RESOLVE_SETTLE);
        assert!(h.tick().is_empty());
    }

    #[test]
    fn failed_resolution_is_absorbed_silently() {
        let mut h = Harness::new(FakeLookup::empty());
        h.tick();

        h.inputs.selection.province_id = Some("p404".to_string());
        h.tick();
        h.advance(RESOLVE_SETTLE + Duration::from_millis(10));
        assert!(h.tick().is_empty());
    }

    #[test]
    fn selecting_the_same_ward_twice_fits_only_once() {
        let mut h = Harness::new(FakeLookup::empty());
        h.tick();

        h.inputs.selection.ward_id = Some("w1".to_string());
        let effects = h.tick();
        let fits = camera_commands(&effects)
            .into_iter()
            .filter(|c| matches!(c, ViewportCommand::Fit { .. }))
            .count();
        assert_eq!(fits, 1);

        // same id again: the no-change rule keeps the camera still
        h.advance(RESOLVE_SETTLE + Duration::from_millis(10));
        let effects = h.tick();
        assert!(camera_commands(&effects)
            .into_iter()
            .all(|c| !matches!(c, ViewportCommand::Fit { .. })));
        let effects = h.tick();
        assert!(effects.is_empty());
    }

    #[test]
    fn district_change_with_guard_up_redraws_without_moving() {
        let mut h = Harness::new(FakeLookup::empty());
        h.tick();

        h.controller.note_user_navigation();
        h.inputs.selection.district_id = Some("d1".to_string());
        let effects = h.tick();
        assert!(effects.is_empty());
        // the overlay change was still recorded
        assert!(h.controller.user_has_navigated());
    }

    #[test]
    fn entering_the_points_layer_restores_the_city_view() {
        let mut h = Harness::new(FakeLookup::empty());
        h.inputs.active_layer = ActiveLayer::Teams;
        h.tick();

        h.inputs.active_layer = ActiveLayer::Points;
        let effects = h.tick();
        assert_eq!(
            camera_commands(&effects),
            vec![&ViewportCommand::Center {
                position: default_center(),
                zoom: DEFAULT_ZOOM,
            }]
        );
    }

    #[test]
    fn activating_a_team_centers_on_its_centroid_after_settle() {
        let mut h = Harness::new(FakeLookup::empty());
        h.inputs.active_layer = ActiveLayer::Teams;
        h.inputs.teams = vec![Team {
            id: "t1".to_string(),
            name: "Doi 1".to_string(),
            managed_jurisdictions: vec!["w1".to_string()],
            roster: vec!["An".to_string(), "Binh".to_string()],
        }];
        h.tick();

        h.inputs.active_team_id = Some("t1".to_string());
        assert!(h.tick().is_empty());

        h.advance(TEAM_SETTLE + Duration::from_millis(10));
        let effects = h.tick();
        let commands = camera_commands(&effects);
        assert_eq!(commands.len(), 1);
        match commands[0] {
            ViewportCommand::Center { zoom, .. } => assert_eq!(*zoom, TEAM_ZOOM),
            other => panic!("expected a center command, got {:?}", other),
        }
    }

    #[test]
    fn team_changes_are_ignored_while_the_points_layer_is_active() {
        let mut h = Harness::new(FakeLookup::empty());
        h.inputs.teams = vec![Team {
            id: "t1".to_string(),
            name: "Doi 1".to_string(),
            managed_jurisdictions: vec!["w1".to_string()],
            roster: Vec::new(),
        }];
        h.tick();

        h.inputs.active_team_id = Some("t1".to_string());
        h.tick();
        h.advance(TEAM_SETTLE + Duration::from_millis(10));
        assert!(h.tick().is_empty());
    }
}
