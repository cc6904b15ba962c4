use egui::Color32;
use egui_extras::{Column, TableBuilder};

use crate::data::record::{Record, REQUIRED_COLUMNS};
use crate::processing::deviation::DeviationRecord;
use crate::processing::pipeline::DeviceStatistics;
use crate::processing::statistics::SampleStatistics;
use crate::state::theme::Theme;

/// Placeholder for values that are undefined.
pub const MISSING: &str = "\u{2013}";
pub const WARNING_GLYPH: &str = "\u{26a0}";

const ROW_HEIGHT: f32 = 18.0;
const MAX_TABLE_HEIGHT: f32 = 320.0;

fn fmt2(v: f64) -> String {
    format!("{v:.2}")
}

/// Cell texts for one device row: device, count, mean, SD, CV%.
pub fn device_row_cells(device_id: &str, stats: &SampleStatistics) -> [String; 5] {
    let sd = stats.displayable_sd().map_or_else(|| MISSING.to_string(), fmt2);
    let cv = match stats.coefficient_of_variation.filter(|cv| !cv.is_nan()) {
        Some(cv) if stats.cv_flagged() => format!("{cv:.2} {WARNING_GLYPH}"),
        Some(cv) => fmt2(cv),
        None => MISSING.to_string(),
    };
    [device_id.to_string(), stats.count.to_string(), fmt2(stats.mean), sd, cv]
}

/// Cell texts for one deviation row: date, device, result, z, deviation %.
pub fn deviation_row_cells(d: &DeviationRecord) -> [String; 5] {
    [
        d.record.date.clone(),
        d.record.device_id.clone(),
        d.record.result.to_string(),
        fmt2(d.z_score),
        fmt2(d.percent_deviation),
    ]
}

fn cell_label(ui: &mut egui::Ui, text: &str, color: Option<Color32>) {
    let mut rich = egui::RichText::new(text);
    if let Some(c) = color {
        rich = rich.color(c);
    }
    ui.label(rich);
}

/// Per-device statistics. Devices with fewer than two readings are muted,
/// devices with CV above the threshold are highlighted.
pub fn show_device_stats_table(ui: &mut egui::Ui, devices: &[DeviceStatistics], theme: &Theme) {
    if devices.is_empty() {
        ui.label(egui::RichText::new("No devices for this selection.").weak());
        return;
    }

    ui.push_id("device_stats_table", |ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .columns(Column::auto().at_least(90.0), 5)
            .max_scroll_height(MAX_TABLE_HEIGHT)
            .header(20.0, |mut header| {
                for title in ["Device", "Count", "Mean", "SD", "CV%"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, devices.len(), |mut row| {
                    let device = &devices[row.index()];
                    let color = if !device.stats.has_sufficient_data() {
                        Some(theme.muted_color())
                    } else if device.stats.cv_flagged() {
                        Some(theme.flag_color())
                    } else {
                        None
                    };
                    for text in device_row_cells(&device.device_id, &device.stats) {
                        row.col(|ui| cell_label(ui, &text, color));
                    }
                });
            });
    });
}

/// Per-record deviations from the peer mean; outliers highlighted.
pub fn show_deviation_table(ui: &mut egui::Ui, deviations: &[DeviationRecord], theme: &Theme) {
    if deviations.is_empty() {
        ui.label(egui::RichText::new("No readings for this selection.").weak());
        return;
    }

    ui.push_id("deviation_table", |ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .columns(Column::auto().at_least(90.0), 5)
            .max_scroll_height(MAX_TABLE_HEIGHT)
            .header(20.0, |mut header| {
                for title in ["Date", "Device", "Result", "Z-score", "Deviation %"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, deviations.len(), |mut row| {
                    let d = &deviations[row.index()];
                    let color = d.is_flagged().then(|| theme.flag_color());
                    for text in deviation_row_cells(d) {
                        row.col(|ui| cell_label(ui, &text, color));
                    }
                });
            });
    });
}

/// The first rows of the loaded file, as read.
pub fn show_record_preview(ui: &mut egui::Ui, records: &[Record]) {
    ui.push_id("record_preview_table", |ui| {
        TableBuilder::new(ui)
            .striped(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .columns(Column::auto().at_least(90.0), REQUIRED_COLUMNS.len())
            .header(20.0, |mut header| {
                for title in REQUIRED_COLUMNS {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, records.len(), |mut row| {
                    let r = &records[row.index()];
                    let result = r.result.to_string();
                    for text in [&r.test_name, &r.device_id, &r.date, &result] {
                        row.col(|ui| {
                            ui.label(text.as_str());
                        });
                    }
                });
            });
    });
}
