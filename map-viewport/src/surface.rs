use egui::Context;
use walkers::{HttpOptions, HttpTiles, Map, MapMemory, Position, Tiles};

use crate::types::MapBounds;
use crate::viewport::{ViewportCommand, DEFAULT_ZOOM};

const MIN_ZOOM: f64 = 3.0;
const MAX_ZOOM: f64 = 17.0;

/// Owns the single underlying map canvas: the tile source and the camera
/// memory. Created exactly once per mounted lifecycle; a second
/// initialization attempt is a no-op, guarded both by the internal flag and
/// by a mount marker stored in the egui context data.
pub struct RenderSurface {
    tiles: Option<Box<dyn Tiles>>,
    memory: MapMemory,
    initialized: bool,
}

impl RenderSurface {
    pub fn new() -> Self {
        Self {
            tiles: None,
            memory: MapMemory::default(),
            initialized: false,
        }
    }

    fn mount_flag_id() -> egui::Id {
        egui::Id::new("render_surface_mounted")
    }

    /// Creates the canvas exactly once. Failure here is the one fatal error
    /// of the subsystem and propagates to the hosting collaborator.
    pub fn initialize(&mut self, ctx: &Context) -> Result<(), SurfaceError> {
        let mounted = ctx.data(|d| d.get_temp::<bool>(Self::mount_flag_id()).unwrap_or(false));
        if self.initialized || mounted {
            return Ok(());
        }

        self.memory
            .set_zoom(DEFAULT_ZOOM)
            .map_err(|_| SurfaceError::InvalidZoom(DEFAULT_ZOOM))?;
        self.tiles = Some(Box::new(HttpTiles::with_options(
            walkers::sources::OpenStreetMap,
            HttpOptions::default(),
            ctx.to_owned(),
        )));
        ctx.data_mut(|d| d.insert_temp(Self::mount_flag_id(), true));
        self.initialized = true;
        Ok(())
    }

    /// Releases the canvas and clears the mount marker so a later remount
    /// initializes cleanly.
    pub fn teardown(&mut self, ctx: &Context) {
        self.tiles = None;
        self.initialized = false;
        ctx.data_mut(|d| d.remove::<bool>(Self::mount_flag_id()));
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn zoom(&self) -> f64 {
        self.memory.zoom()
    }

    pub fn memory_mut(&mut self) -> &mut MapMemory {
        &mut self.memory
    }

    /// The map widget for this frame, centered on `default_center` until the
    /// camera detaches.
    pub fn widget(&mut self, default_center: Position) -> Map<'_, '_, '_> {
        let tiles = self
            .tiles
            .as_deref_mut()
            .map(|tiles| tiles as &mut dyn Tiles);
        Map::new(tiles, &mut self.memory, default_center)
    }

    /// Applies a camera command to the underlying map memory.
    pub fn apply(&mut self, command: &ViewportCommand) {
        match command {
            ViewportCommand::Center { position, zoom } => {
                self.memory.center_at(*position);
                let _ = self.memory.set_zoom(zoom.clamp(MIN_ZOOM, MAX_ZOOM));
            }
            ViewportCommand::Fit { bounds, padding } => {
                self.memory.center_at(bounds.center());
                let _ = self.memory.set_zoom(zoom_for_bounds(bounds, *padding));
            }
        }
    }
}

impl Default for RenderSurface {
    fn default() -> Self {
        Self::new()
    }
}

/// Approximate zoom whose visible span covers the given bounds, padded by
/// the given fraction. Each slippy-map zoom step halves the visible span,
/// hence the log2.
pub fn zoom_for_bounds(bounds: &MapBounds, padding: f64) -> f64 {
    let lat_span = (bounds.lat_span() * (1.0 + padding)).max(1e-6);
    let lon_span = (bounds.lon_span() * (1.0 + padding)).max(1e-6);
    let zoom_for_lat = (180.0 / lat_span).log2();
    let zoom_for_lon = (360.0 / lon_span).log2();
    zoom_for_lat.min(zoom_for_lon).clamp(MIN_ZOOM, MAX_ZOOM)
}

#[derive(Debug)]
pub enum SurfaceError {
    InvalidZoom(f64),
}

impl std::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceError::InvalidZoom(zoom) => {
                write!(f, "Map rejected initial zoom level {}", zoom)
            }
        }
    }
}

impl std::error::Error for SurfaceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wider_bounds_get_a_lower_zoom() {
        let city = MapBounds {
            min_lat: 21.0,
            max_lat: 21.1,
            min_lon: 105.8,
            max_lon: 105.9,
        };
        let province = MapBounds {
            min_lat: 20.0,
            max_lat: 22.0,
            min_lon: 105.0,
            max_lon: 107.0,
        };
        assert!(zoom_for_bounds(&city, 0.15) > zoom_for_bounds(&province, 0.15));
    }

    #[test]
    fn zoom_stays_within_the_valid_range() {
        let tiny = MapBounds {
            min_lat: 21.0,
            max_lat: 21.0,
            min_lon: 105.8,
            max_lon: 105.8,
        };
        let world = MapBounds {
            min_lat: -80.0,
            max_lat: 80.0,
            min_lon: -179.0,
            max_lon: 179.0,
        };
        assert_eq!(zoom_for_bounds(&tiny, 0.15), MAX_ZOOM);
        assert_eq!(zoom_for_bounds(&world, 0.15), MIN_ZOOM);
    }

    #[test]
    fn padding_widens_the_fitted_area() {
        let bounds = MapBounds {
            min_lat: 20.5,
            max_lat: 21.5,
            min_lon: 105.0,
            max_lon: 106.0,
        };
        assert!(zoom_for_bounds(&bounds, 0.5) <= zoom_for_bounds(&bounds, 0.0));
    }
}
