use crate::types::Point;

/// Callout window for the selected point, opened once the camera move has
/// visually settled.
pub struct WidgetPointCallout {
    pub point: Point,
}

impl WidgetPointCallout {
    pub fn new(point: Point) -> Self {
        Self { point }
    }

    /// Shows the callout. Returns `false` once the user closed it.
    pub fn show(&mut self, ctx: &egui::Context) -> bool {
        let mut open = true;

        egui::Window::new(self.point.name.clone())
            .resizable(false)
            .collapsible(true)
            .open(&mut open)
            .fixed_pos([20.0, 20.0])
            .show(ctx, |ui| {
                ui.add_space(10.0);
                ui.vertical(|ui| {
                    ui.label(egui::RichText::new(format!("Id: {}", self.point.id)).size(16.0));
                    ui.label(
                        egui::RichText::new(format!("Category: {}", self.point.category))
                            .size(16.0),
                    );
                    ui.label(
                        egui::RichText::new(format!(
                            "Business type: {}",
                            self.point.business_type
                        ))
                        .size(16.0),
                    );
                    if let Some(ward) = &self.point.ward_id {
                        ui.label(egui::RichText::new(format!("Ward: {}", ward)).size(16.0));
                    }
                });
            });

        open
    }
}
