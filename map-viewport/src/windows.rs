use egui::{Align2, RichText, Ui, Window};
use walkers::MapMemory;

use crate::state::MapCallbacks;

/// Zoom controls overlaid on the map. Returns `true` when the user clicked
/// either button, which counts as manual navigation.
pub fn zoom(ui: &Ui, map_memory: &mut MapMemory) -> bool {
    let mut changed = false;

    Window::new("Zoom")
        .collapsible(false)
        .resizable(false)
        .title_bar(false)
        .anchor(Align2::LEFT_BOTTOM, [10.0, -10.0])
        .show(ui.ctx(), |ui| {
            ui.horizontal(|ui| {
                if ui.button(RichText::new("+").heading()).clicked() {
                    let zoom = map_memory.zoom();
                    changed |= map_memory.set_zoom(zoom + 1.0).is_ok();
                }
                if ui.button(RichText::new("-").heading()).clicked() {
                    let zoom = map_memory.zoom();
                    changed |= map_memory.set_zoom(zoom - 1.0).is_ok();
                }
            });
        });

    changed
}

/// Fullscreen button, wired to the host's callback.
pub fn fullscreen(ui: &Ui, callbacks: &MapCallbacks) {
    egui::Area::new("fullscreen_button".into())
        .anchor(Align2::RIGHT_BOTTOM, [-10.0, -10.0])
        .show(ui.ctx(), |ui| {
            if ui.button("Fullscreen").clicked() {
                (callbacks.on_request_fullscreen)();
            }
        });
}
