pub mod catalog;
mod map;
pub mod plugins;
pub mod resolver;
pub mod state;
pub mod surface;
pub mod types;
pub mod viewport;
mod widgets;
mod windows;

pub use map::MapDashboard;

use crate::catalog::BoundaryCatalog;
use crate::resolver::TableLookup;
use crate::state::MapCallbacks;

/// Boots the dashboard window. The catalog, coordinate lookup, and host
/// callbacks come from the hosting collaborator.
pub fn run(
    catalog: BoundaryCatalog,
    lookup: TableLookup,
    callbacks: MapCallbacks,
    logger: Option<logger::Logger>,
) -> Result<(), eframe::Error> {
    eframe::run_native(
        "Field Inspection Map",
        Default::default(),
        Box::new(move |cc| {
            let app = MapDashboard::new(cc.egui_ctx.clone(), catalog, lookup, callbacks, logger)?;
            Ok(Box::new(app))
        }),
    )
}
