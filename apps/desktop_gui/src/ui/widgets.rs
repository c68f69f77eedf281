//! Gauge and bar painting.

use client_core::FeatureRow;
use eframe::egui;
use shared::domain::StressTier;

const TRACK_COLOR: egui::Color32 = egui::Color32::from_rgb(0x2b, 0x2d, 0x31);
const BAR_COLOR: egui::Color32 = egui::Color32::from_rgb(0x58, 0x65, 0xf2);

pub fn tier_color(tier: StressTier) -> egui::Color32 {
    match tier {
        StressTier::Low => egui::Color32::from_rgb(0x3b, 0xa5, 0x5d),
        StressTier::Moderate => egui::Color32::from_rgb(0xfa, 0xa6, 0x1a),
        StressTier::High => egui::Color32::from_rgb(0xed, 0x42, 0x45),
    }
}

/// Horizontal track filled to `fraction` of its width. Fractions above 1 run
/// into the clip rect rather than being clamped.
fn filled_track(ui: &mut egui::Ui, height: f32, fraction: f32, fill: egui::Color32) {
    let width = ui.available_width();
    let (rect, _) = ui.allocate_exact_size(egui::vec2(width, height), egui::Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 4.0, TRACK_COLOR);
    let fill_rect =
        egui::Rect::from_min_size(rect.min, egui::vec2(width * fraction.max(0.0), height));
    painter.rect_filled(fill_rect, 4.0, fill);
}

pub fn score_gauge(ui: &mut egui::Ui, fill_percent: f64, tier: StressTier) {
    filled_track(ui, 18.0, (fill_percent / 100.0) as f32, tier_color(tier));
}

pub fn feature_bar(ui: &mut egui::Ui, row: &FeatureRow, fraction: f32) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(&row.label).strong());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(&row.percent_text);
        });
    });
    filled_track(ui, 10.0, fraction, BAR_COLOR);
    ui.add_space(6.0);
}
