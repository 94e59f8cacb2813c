//! Control Panel Widget
//! Left side panel with data source, analysis settings and export controls.

use crate::config::{AppConfig, MissingTotalPolicy};
use egui::{Color32, ComboBox, RichText};

/// Left side control panel; edits a copy of the application config.
pub struct ControlPanel {
    pub settings: AppConfig,
    pub progress: f32,
    pub status: String,
    pub export_enabled: bool,
}

impl ControlPanel {
    pub fn new(settings: AppConfig) -> Self {
        Self {
            settings,
            progress: 0.0,
            status: "Ready".to_string(),
            export_enabled: false,
        }
    }

    fn section_header(ui: &mut egui::Ui, text: &str) {
        ui.label(RichText::new(text).size(14.0).strong());
        ui.add_space(5.0);
    }

    fn separator(ui: &mut egui::Ui) {
        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui, busy: bool) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🗳 Powiaty 2025")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Wyniki vs. gęstość zaludnienia")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        Self::section_header(ui, "📁 Data Source");

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let dir = self.settings.data.dir.display().to_string();
                    ui.label(RichText::new(&dir).size(12.0));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseDataDir;
                        }
                    });
                });
                let data = &self.settings.data;
                for file in [&data.demographics, &data.candidates, &data.results] {
                    ui.label(
                        RichText::new(file.display().to_string())
                            .size(11.0)
                            .color(Color32::GRAY),
                    );
                }
            });

        Self::separator(ui);

        // ===== Analysis Section =====
        Self::section_header(ui, "⚙️ Analysis");

        egui::Grid::new("analysis_settings")
            .num_columns(2)
            .spacing([10.0, 6.0])
            .show(ui, |ui| {
                let analysis = &mut self.settings.analysis;
                ui.label("Total votes (candidate no.)");
                ui.add(egui::DragValue::new(&mut analysis.total_candidate).range(0..=99));
                ui.end_row();

                ui.label("Candidate A");
                ui.add(egui::DragValue::new(&mut analysis.candidate_a).range(0..=99));
                ui.end_row();

                ui.label("Candidate B");
                ui.add(egui::DragValue::new(&mut analysis.candidate_b).range(0..=99));
                ui.end_row();

                ui.label("Missing total");
                ComboBox::from_id_salt("missing_total_policy")
                    .selected_text(match analysis.missing_total {
                        MissingTotalPolicy::Drop => "Drop county",
                        MissingTotalPolicy::Error => "Abort",
                    })
                    .show_ui(ui, |ui| {
                        ui.selectable_value(
                            &mut analysis.missing_total,
                            MissingTotalPolicy::Drop,
                            "Drop county",
                        );
                        ui.selectable_value(
                            &mut analysis.missing_total,
                            MissingTotalPolicy::Error,
                            "Abort",
                        );
                    });
                ui.end_row();
            });

        ui.add_space(10.0);

        ui.add_enabled_ui(!busy, |ui| {
            let button = egui::Button::new(RichText::new("▶ Load & Calculate").size(14.0))
                .min_size(egui::vec2(200.0, 30.0));
            if ui.add(button).clicked() {
                action = ControlPanelAction::Calculate;
            }
        });

        Self::separator(ui);

        // ===== Export Section =====
        Self::section_header(ui, "🖼 Export");
        ui.label(
            RichText::new(self.settings.render.output_dir.display().to_string())
                .size(11.0)
                .color(Color32::GRAY),
        );
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.add_enabled_ui(self.export_enabled && !busy, |ui| {
                if ui.button(RichText::new("💾 Export PNG").size(14.0)).clicked() {
                    action = ControlPanelAction::ExportPng;
                }
            });
            if ui.button(RichText::new("📂 Open folder").size(14.0)).clicked() {
                action = ControlPanelAction::OpenOutput;
            }
        });

        Self::separator(ui);

        // ===== Progress Section =====
        Self::section_header(ui, "📊 Progress");

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.progress > 0.0 && self.progress < 100.0),
        );

        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Complete") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseDataDir,
    Calculate,
    ExportPng,
    OpenOutput,
}
