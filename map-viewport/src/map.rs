use std::{
    cell::RefCell,
    rc::Rc,
    time::{Duration, Instant},
};

use egui::Context;
use logger::{Color, Logger};

use crate::{
    catalog::BoundaryCatalog,
    plugins::{points::skipped_point_count, BoundaryHighlight, PointMarkers, TeamMarkers},
    resolver::{CoordinateResolver, JurisdictionLookup},
    state::{ActiveLayer, MapCallbacks, MapInputs, SelectionState},
    surface::{RenderSurface, SurfaceError},
    viewport::{default_center, ViewportController, ViewportEffect},
    widgets::WidgetPointCallout,
    windows,
};

const UPDATE_TICK_MS: u64 = 1000;
/// Faster cadence while a settle delay is counting down.
const PENDING_TICK_MS: u64 = 50;

/// The dashboard shell: mounts the render surface once, feeds the viewport
/// controller every frame, and hosts the marker, team, and boundary plugins
/// plus the callout and map controls.
pub struct MapDashboard<L: JurisdictionLookup> {
    surface: RenderSurface,
    controller: ViewportController,
    resolver: CoordinateResolver<L>,
    catalog: BoundaryCatalog,
    inputs: MapInputs,
    selection_state: Rc<RefCell<SelectionState>>,
    callbacks: Rc<MapCallbacks>,
    callout: Option<WidgetPointCallout>,
    logger: Option<Logger>,
    last_skipped_count: usize,
}

impl<L: JurisdictionLookup> MapDashboard<L> {
    /// Creates the dashboard and initializes the render surface. Surface
    /// construction failure is the one fatal error and propagates.
    pub fn new(
        egui_ctx: Context,
        catalog: BoundaryCatalog,
        lookup: L,
        callbacks: MapCallbacks,
        logger: Option<Logger>,
    ) -> Result<Self, SurfaceError> {
        let mut surface = RenderSurface::new();
        surface.initialize(&egui_ctx)?;

        let mut controller = ViewportController::new();
        let mut resolver = CoordinateResolver::new(lookup);
        if let Some(log) = logger.clone() {
            controller = controller.with_logger(log);
        }
        if let Some(log) = logger.clone() {
            resolver = resolver.with_logger(log);
        }

        Ok(Self {
            surface,
            controller,
            resolver,
            catalog,
            inputs: MapInputs::default(),
            selection_state: Rc::new(RefCell::new(SelectionState::new())),
            callbacks: Rc::new(callbacks),
            callout: None,
            logger,
            last_skipped_count: 0,
        })
    }

    /// Replaces the collaborator-supplied state slice wholesale.
    pub fn set_inputs(&mut self, inputs: MapInputs) {
        let selected = inputs
            .selected_point_id
            .as_deref()
            .and_then(|id| inputs.points.iter().find(|p| p.id == id))
            .cloned();
        self.selection_state.borrow_mut().point = selected;
        self.inputs = inputs;
    }

    /// Releases the render surface; the host calls this on unmount so a
    /// later remount initializes cleanly.
    pub fn unmount(&mut self, ctx: &Context) {
        self.surface.teardown(ctx);
    }

    fn log_skipped_points(&mut self) {
        let skipped = skipped_point_count(&self.inputs.points);
        if skipped == self.last_skipped_count {
            return;
        }
        self.last_skipped_count = skipped;
        if skipped > 0 {
            if let Some(log) = &self.logger {
                let _ = log.info(
                    &format!("{} points without usable coordinates", skipped),
                    Color::Yellow,
                    false,
                );
            }
        }
    }
}

impl<L: JurisdictionLookup + 'static> eframe::App for MapDashboard<L> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // a click on a marker is the freshest selection source
        let clicked = self.selection_state.borrow().point.clone();
        self.inputs.selected_point_id = clicked.map(|p| p.id);

        let now = Instant::now();
        let effects = self
            .controller
            .tick(&self.inputs, &self.catalog, &mut self.resolver, now);
        for effect in &effects {
            match effect {
                ViewportEffect::Camera(command) => self.surface.apply(command),
                ViewportEffect::OpenCallout { point_id } => {
                    if let Some(point) = self.inputs.points.iter().find(|p| &p.id == point_id) {
                        self.callout = Some(WidgetPointCallout::new(point.clone()));
                    }
                }
            }
        }

        self.log_skipped_points();

        let cadence = if self.controller.has_pending_work() {
            PENDING_TICK_MS
        } else {
            UPDATE_TICK_MS
        };
        ctx.request_repaint_after(Duration::from_millis(cadence));

        let rimless = egui::Frame {
            fill: ctx.style().visuals.panel_fill,
            ..Default::default()
        };

        egui::CentralPanel::default()
            .frame(rimless)
            .show(ctx, |ui| {
                let zoom = self.surface.zoom();
                let effective = self.catalog.resolve_effective(&self.inputs.selection);

                let mut map = self
                    .surface
                    .widget(default_center())
                    .with_plugin(BoundaryHighlight::new(effective));
                if self.inputs.active_layer == ActiveLayer::Teams {
                    map = map.with_plugin(TeamMarkers::new(
                        &self.inputs.teams,
                        self.inputs.active_team_id.clone(),
                        &self.catalog,
                        zoom,
                        self.callbacks.clone(),
                    ));
                }
                if self.inputs.points_layer_visible() {
                    map = map.with_plugin(PointMarkers::new(
                        &self.inputs.points,
                        self.inputs.selected_point_id.clone(),
                        zoom,
                        self.selection_state.clone(),
                        self.callbacks.clone(),
                    ));
                }

                let response = ui.add(map);

                // only real user gestures may set the guard; programmatic
                // camera commands never pass through here
                let wheel_zoomed = response.hovered()
                    && ui.input(|i| i.raw_scroll_delta.y != 0.0 || i.zoom_delta() != 1.0);
                if response.dragged() || wheel_zoomed {
                    self.controller.note_user_navigation();
                }

                if let Some(widget) = &mut self.callout {
                    let keep = widget.show(ctx);
                    let still_selected = self.inputs.selected_point_id.as_deref()
                        == Some(widget.point.id.as_str());
                    if !keep {
                        // closing the callout also drops the selection
                        self.inputs.selected_point_id = None;
                        self.selection_state.borrow_mut().point = None;
                        self.callout = None;
                    } else if !still_selected {
                        self.callout = None;
                    }
                }

                if windows::zoom(ui, self.surface.memory_mut()) {
                    self.controller.note_user_navigation();
                }
                windows::fullscreen(ui, &self.callbacks);
            });
    }
}
