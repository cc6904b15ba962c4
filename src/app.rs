use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use eframe::egui;

use crate::data::loader::{self, LoadedData};
use crate::export::report;
use crate::export::workbook::Workbook;
use crate::processing::pipeline::Analysis;
use crate::state::app_state::{AppState, SESSION_EXTENSION, VERSION};
use crate::state::session::AnalysisSession;
use crate::ui::{charts, tables};

/// Records shown in the preview above the analysis.
const PREVIEW_ROWS: usize = 5;

/// Pending async file load result.
struct PendingLoad {
    path: PathBuf,
    result: Arc<Mutex<Option<Result<LoadedData, String>>>>,
}

/// User requests collected while drawing, applied after the frame's UI.
enum AppAction {
    OpenFile,
    SaveSession,
    LoadSession,
    SelectTest(Option<String>),
    ToggleTheme,
    ExportWorkbook,
    SaveReport,
    SaveTemplate,
    CopyReport,
    CloseDataset,
}

/// The EQAPlot viewer.
pub struct EqaPlotApp {
    pub state: AppState,
    /// Last pipeline output; `None` when the dataset or filter changed.
    analysis: Option<Analysis>,
    /// An error message shown in the footer until dismissed.
    pub error_message: Option<String>,
    /// Informational message shown in the footer (last load/export).
    pub status_message: Option<String>,
    pub show_about: bool,
    pending_load: Option<PendingLoad>,
}

impl EqaPlotApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let state = AppState::new();

        let ctx = &cc.egui_ctx;
        let mut style = (*ctx.style()).clone();
        style.text_styles.insert(egui::TextStyle::Body, egui::FontId::proportional(15.0));
        style.text_styles.insert(egui::TextStyle::Button, egui::FontId::proportional(14.5));
        style.text_styles.insert(egui::TextStyle::Heading, egui::FontId::proportional(22.0));
        style.text_styles.insert(egui::TextStyle::Small, egui::FontId::proportional(12.0));
        style.spacing.button_padding = egui::vec2(10.0, 5.0);
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        style.visuals.window_corner_radius = egui::CornerRadius::same(8);
        ctx.set_style(style);
        ctx.set_visuals(state.theme.visuals());

        Self {
            state,
            analysis: None,
            error_message: None,
            status_message: None,
            show_about: false,
            pending_load: None,
        }
    }

    fn open_file_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Result Files", &loader::SUPPORTED_EXTENSIONS)
            .add_filter("All Files", &["*"])
            .pick_file()
        {
            self.load_file(&path);
        }
    }

    /// Parse a data file on a worker thread so the UI stays responsive.
    fn load_file(&mut self, path: &Path) {
        let path_buf = path.to_path_buf();
        let result: Arc<Mutex<Option<Result<LoadedData, String>>>> = Arc::new(Mutex::new(None));
        let result_clone = Arc::clone(&result);

        let worker_path = path_buf.clone();
        std::thread::spawn(move || {
            let loaded = loader::load_file(&worker_path).map_err(|e| e.to_string());
            if let Ok(mut slot) = result_clone.lock() {
                *slot = Some(loaded);
            }
        });

        self.pending_load = Some(PendingLoad { path: path_buf, result });
    }

    fn poll_pending_load(&mut self) {
        let finished = match &self.pending_load {
            Some(pending) => match pending.result.lock() {
                Ok(mut slot) => slot.take(),
                Err(_) => Some(Err("file loader panicked".to_string())),
            },
            None => None,
        };
        let Some(result) = finished else {
            return;
        };
        let Some(pending) = self.pending_load.take() else {
            return;
        };

        match result {
            Ok(loaded) => {
                let quarantined = loaded.quarantined.len();
                let count = loaded.records.len();
                self.state.session = AnalysisSession::from_loaded(loaded, pending.path);
                self.analysis = None;
                self.error_message = None;
                self.status_message = Some(if quarantined > 0 {
                    format!("Loaded {count} records, {quarantined} rows skipped (missing fields)")
                } else {
                    format!("Loaded {count} records")
                });
            }
            Err(e) => {
                tracing::error!("Failed to load file: {e}");
                self.error_message = Some(format!("Failed to load file: {e}"));
            }
        }
    }

    fn save_session(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name(format!("session.{SESSION_EXTENSION}"))
            .add_filter("EQAPlot Session", &["json"])
            .save_file()
        {
            if let Err(e) = self.state.save(&path) {
                tracing::error!("Failed to save session: {e}");
                self.error_message = Some(format!("Failed to save session: {e}"));
            }
        }
    }

    fn load_session(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("EQAPlot Session", &["json"])
            .pick_file()
        {
            match AppState::load(&path) {
                Ok(state) => {
                    self.state = state;
                    self.analysis = None;
                }
                Err(e) => {
                    tracing::error!("Failed to load session: {e}");
                    self.error_message = Some(format!("Failed to load session: {e}"));
                }
            }
        }
    }

    /// Export the workbook as one `.xlsx` file. A `.json` target gets a
    /// single JSON document and a `.csv` target one CSV file per sheet next
    /// to the chosen name.
    fn export_workbook(&mut self) {
        let Some(analysis) = self.analysis.as_ref() else {
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .set_file_name("report.xlsx")
            .add_filter("Excel Workbook", &["xlsx"])
            .add_filter("CSV Sheets", &["csv"])
            .add_filter("JSON Workbook", &["json"])
            .save_file()
        else {
            return;
        };

        let workbook = Workbook::from_analysis(&self.state.session.records, analysis);
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        let outcome = match ext.as_str() {
            "json" => workbook
                .to_json()
                .and_then(|json| std::fs::write(&path, json).map_err(Into::into))
                .map(|()| format!("Workbook saved to {}", path.display())),
            "csv" => {
                let dir = path.parent().unwrap_or_else(|| Path::new("."));
                let stem = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("report")
                    .to_string();
                workbook
                    .write_csv_sheets(dir, &stem)
                    .map(|files| format!("Workbook saved as {} CSV sheets", files.len()))
            }
            _ => workbook
                .write_xlsx(&path)
                .map(|()| format!("Workbook saved to {}", path.display())),
        };

        match outcome {
            Ok(msg) => self.status_message = Some(msg),
            Err(e) => {
                tracing::error!("Failed to export workbook: {e}");
                self.error_message = Some(format!("Failed to export workbook: {e}"));
            }
        }
    }

    fn save_report(&mut self) {
        let Some(analysis) = self.analysis.as_ref() else {
            return;
        };
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name("report.pdf")
            .add_filter("PDF Report", &["pdf"])
            .add_filter("Text Report", &["txt"])
            .save_file()
        {
            let is_text = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("txt"));
            let written = if is_text {
                report::write_text_report(analysis, &path)
            } else {
                report::write_pdf_report(analysis, &path)
            };
            if let Err(e) = written {
                tracing::error!("Failed to save report: {e}");
                self.error_message = Some(format!("Failed to save report: {e}"));
            }
        }
    }

    fn save_template(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name("eqa_template.csv")
            .add_filter("CSV Files", &["csv"])
            .save_file()
        {
            match loader::write_template_csv(&path) {
                Ok(()) => self.status_message = Some(format!("Template saved to {}", path.display())),
                Err(e) => {
                    tracing::error!("Failed to save template: {e}");
                    self.error_message = Some(format!("Failed to save template: {e}"));
                }
            }
        }
    }

    fn copy_report(&mut self) {
        let Some(analysis) = self.analysis.as_ref() else {
            return;
        };
        let text = report::text_report(analysis);
        match arboard::Clipboard::new() {
            Ok(mut clipboard) => {
                if let Err(e) = clipboard.set_text(text) {
                    self.error_message = Some(format!("Failed to copy to clipboard: {e}"));
                } else {
                    tracing::info!("Copied report to clipboard");
                    self.status_message = Some("Report copied to clipboard".to_string());
                }
            }
            Err(e) => {
                self.error_message = Some(format!("Failed to access clipboard: {e}"));
            }
        }
    }

    fn apply(&mut self, action: AppAction) {
        match action {
            AppAction::OpenFile => self.open_file_dialog(),
            AppAction::SaveSession => self.save_session(),
            AppAction::LoadSession => self.load_session(),
            AppAction::SelectTest(test) => {
                self.state.session.select_test(test);
                self.analysis = None;
            }
            AppAction::ToggleTheme => self.state.theme = self.state.theme.toggle(),
            AppAction::ExportWorkbook => self.export_workbook(),
            AppAction::SaveReport => self.save_report(),
            AppAction::SaveTemplate => self.save_template(),
            AppAction::CopyReport => self.copy_report(),
            AppAction::CloseDataset => {
                self.state.session = AnalysisSession::default();
                self.analysis = None;
                self.status_message = None;
            }
        }
    }
}

fn show_analysis(
    ui: &mut egui::Ui,
    analysis: &Analysis,
    state: &AppState,
    actions: &mut Vec<AppAction>,
) {
    let theme = &state.theme;
    let title = analysis.selected_test.as_deref().unwrap_or("Results");

    egui::CollapsingHeader::new(format!("Preview (first {PREVIEW_ROWS} rows)"))
        .default_open(false)
        .show(ui, |ui| {
            tables::show_record_preview(ui, state.session.preview(PREVIEW_ROWS));
        });
    ui.add_space(8.0);

    ui.heading("Device Statistics");
    ui.label(
        egui::RichText::new(format!(
            "Peer: n={}, mean={:.2}, sd={}",
            analysis.peer.count,
            analysis.peer.mean,
            analysis
                .peer
                .displayable_sd()
                .map_or_else(|| tables::MISSING.to_string(), |sd| format!("{sd:.2}")),
        ))
        .weak(),
    );
    tables::show_device_stats_table(ui, &analysis.device_stats, theme);

    ui.add_space(12.0);
    ui.heading("Distribution by Device");
    charts::show_box_plot(ui, &analysis.distribution, title);

    ui.add_space(12.0);
    ui.heading("Results over Time");
    charts::show_line_chart(ui, &analysis.time_series);

    ui.add_space(12.0);
    ui.heading("Deviation from Peer Mean");
    let flagged = analysis.flagged_records().count();
    if flagged > 0 {
        ui.colored_label(theme.flag_color(), format!("{flagged} readings with |z| > 2"));
    }
    tables::show_deviation_table(ui, &analysis.deviations, theme);

    ui.add_space(12.0);
    ui.horizontal(|ui| {
        if ui.button("Export Workbook").clicked() {
            actions.push(AppAction::ExportWorkbook);
        }
        if ui.button("Save Report").clicked() {
            actions.push(AppAction::SaveReport);
        }
        if ui.button("Copy Report").clicked() {
            actions.push(AppAction::CopyReport);
        }
    });
}

impl eframe::App for EqaPlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut vis = self.state.theme.visuals();
        vis.window_corner_radius = egui::CornerRadius::same(8);
        ctx.set_visuals(vis);

        // ------------------------------------------------------------------
        // 1. Dropped files and finished loads
        // ------------------------------------------------------------------
        let mut dropped: Option<PathBuf> = None;
        ctx.input(|i| {
            for file in &i.raw.dropped_files {
                if let Some(path) = &file.path {
                    if loader::supported_extension(path).is_some() {
                        dropped = Some(path.clone());
                    }
                }
            }
        });
        if let Some(path) = dropped {
            self.load_file(&path);
        }
        self.poll_pending_load();

        let analysis = match self.analysis.take() {
            Some(a) => a,
            None => self.state.session.analyze(),
        };
        let mut actions: Vec<AppAction> = Vec::new();

        // ------------------------------------------------------------------
        // 2. Header: file/session actions and test selector
        // ------------------------------------------------------------------
        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(16, 8)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let heading = ui.heading("EQAPlot");
                    heading.context_menu(|ui| {
                        if ui.button("About EQAPlot").clicked() {
                            self.show_about = true;
                            ui.close_menu();
                        }
                        if ui.button("Save Template CSV").clicked() {
                            actions.push(AppAction::SaveTemplate);
                            ui.close_menu();
                        }
                        if ui.button("Close Dataset").clicked() {
                            actions.push(AppAction::CloseDataset);
                            ui.close_menu();
                        }
                    });

                    ui.separator();
                    if ui.button("Open File").clicked() {
                        actions.push(AppAction::OpenFile);
                    }
                    if ui.button("Save Session").clicked() {
                        actions.push(AppAction::SaveSession);
                    }
                    if ui.button("Load Session").clicked() {
                        actions.push(AppAction::LoadSession);
                    }

                    if !analysis.tests.is_empty() {
                        ui.separator();
                        ui.label("Test:");
                        let mut choice = analysis.selected_test.clone();
                        egui::ComboBox::from_id_salt("test_selector")
                            .selected_text(choice.clone().unwrap_or_else(|| "All".to_string()))
                            .width(220.0)
                            .show_ui(ui, |ui| {
                                ui.selectable_value(&mut choice, None, "All");
                                for test in &analysis.tests {
                                    ui.selectable_value(&mut choice, Some(test.clone()), test.as_str());
                                }
                            });
                        if choice != analysis.selected_test {
                            actions.push(AppAction::SelectTest(choice));
                        }
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button(self.state.theme.toggle_label()).clicked() {
                            actions.push(AppAction::ToggleTheme);
                        }
                        ui.separator();
                        ui.small(format!("v{VERSION}"));
                    });
                });
            });

        // ------------------------------------------------------------------
        // 3. Footer: dataset summary and messages
        // ------------------------------------------------------------------
        egui::TopBottomPanel::bottom("footer")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(16, 6)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let session = &self.state.session;
                    let source = session
                        .source
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| "no file".to_string());
                    ui.label(
                        egui::RichText::new(format!(
                            "{source}: {} records, {} shown, {} devices",
                            session.records.len(),
                            analysis.record_count,
                            analysis.device_stats.len(),
                        ))
                        .weak(),
                    );
                    if !session.quarantined.is_empty() {
                        ui.separator();
                        ui.label(format!("{} rows skipped", session.quarantined.len()))
                            .on_hover_text(
                                session
                                    .quarantined
                                    .iter()
                                    .map(|q| format!("row {}: {}", q.line, q.reason))
                                    .collect::<Vec<_>>()
                                    .join("\n"),
                            );
                    }
                    if let Some(msg) = &self.status_message {
                        ui.separator();
                        ui.label(msg.as_str());
                    }
                    if let Some(msg) = &self.error_message {
                        ui.separator();
                        ui.colored_label(egui::Color32::from_rgb(255, 80, 80), msg.as_str());
                        if ui.small_button("dismiss").clicked() {
                            self.error_message = None;
                        }
                    }
                });
            });

        // ------------------------------------------------------------------
        // 4. Central panel: tables and charts
        // ------------------------------------------------------------------
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.session.is_empty() {
                ui.add_space(80.0);
                ui.vertical_centered(|ui| {
                    ui.heading("Welcome to EQAPlot");
                    ui.add_space(12.0);
                    ui.label(
                        egui::RichText::new(
                            "Open or drag-and-drop a CSV / Excel result file with Test Name, Device ID, Date and Result columns.",
                        )
                        .weak(),
                    );
                    ui.add_space(12.0);
                    if ui.button("Save Template CSV").clicked() {
                        actions.push(AppAction::SaveTemplate);
                    }
                });
                return;
            }

            egui::ScrollArea::vertical().show(ui, |ui| {
                show_analysis(ui, &analysis, &self.state, &mut actions);
            });
        });

        // Loading indicator
        if self.pending_load.is_some() {
            egui::Window::new("Loading")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading file...");
                    });
                });
            ctx.request_repaint();
        }

        if self.show_about {
            egui::Window::new("About EQAPlot")
                .open(&mut self.show_about)
                .collapsible(false)
                .resizable(false)
                .default_width(320.0)
                .show(ctx, |ui| {
                    ui.heading("EQAPlot");
                    ui.label(format!("Version: {VERSION}"));
                    ui.add_space(4.0);
                    ui.label("Peer comparison of external quality assessment results.");
                    ui.add_space(10.0);
                    ui.label("  \u{2022} Devices with CV above 5% are highlighted");
                    ui.label("  \u{2022} Readings with |z| above 2 are highlighted");
                    ui.label("  \u{2022} Devices with a single reading have no SD");
                });
        }

        // ------------------------------------------------------------------
        // 5. Apply collected actions
        // ------------------------------------------------------------------
        self.analysis = Some(analysis);
        for action in actions {
            self.apply(action);
        }
    }
}
