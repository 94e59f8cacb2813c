//! Chart Viewer Widget
//! Scrollable central panel: the input tables, county scatter plots side by
//! side, then the nationwide bar and pie charts.

use crate::analysis::ElectionAnalysis;
use crate::charts::{ChartPlotter, SCATTER_TITLE};
use crate::data::Candidate;
use egui::{RichText, ScrollArea};

const CHART_SPACING: f32 = 15.0;
const SCATTER_HEIGHT: f32 = 380.0;
const SUMMARY_HEIGHT: f32 = 360.0;

#[derive(Default)]
pub struct ChartViewer {
    pub analysis: Option<ElectionAnalysis>,
    pub marker_divisor: f64,
    pub pie_label_min_pct: f64,
}

impl ChartViewer {
    pub fn new(marker_divisor: f64, pie_label_min_pct: f64) -> Self {
        Self {
            analysis: None,
            marker_divisor,
            pie_label_min_pct,
        }
    }

    pub fn clear(&mut self) {
        self.analysis = None;
    }

    pub fn set_analysis(&mut self, analysis: ElectionAnalysis) {
        self.analysis = Some(analysis);
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        let Some(analysis) = &self.analysis else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for preview in &analysis.tables {
                    egui::CollapsingHeader::new(RichText::new(&preview.name).strong())
                        .id_salt(("input_table", &preview.name))
                        .show(ui, |ui| ChartPlotter::draw_table_preview(ui, preview));
                }
                ui.separator();

                ui.label(RichText::new(SCATTER_TITLE).size(16.0).strong());
                if !analysis.counties.excluded.is_empty() {
                    ui.label(
                        RichText::new(format!(
                            "Pominięte powiaty bez sumy głosów ważnych: {}",
                            analysis.counties.excluded.join(", ")
                        ))
                        .size(11.0)
                        .color(egui::Color32::GRAY),
                    );
                }
                ui.add_space(8.0);

                let half = (ui.available_width() - CHART_SPACING) / 2.0;
                ui.horizontal(|ui| {
                    for (idx, candidate) in Candidate::BOTH.into_iter().enumerate() {
                        ui.vertical(|ui| {
                            ui.set_width(half);
                            ui.label(RichText::new(&analysis.labels[idx]).size(14.0).strong());
                            ChartPlotter::draw_county_scatter(
                                ui,
                                analysis,
                                candidate,
                                self.marker_divisor,
                                SCATTER_HEIGHT,
                            );
                        });
                        if idx == 0 {
                            ui.add_space(CHART_SPACING);
                        }
                    }
                });

                ui.add_space(CHART_SPACING);
                ChartPlotter::draw_stats_table(ui, &analysis.stats);
                ui.add_space(CHART_SPACING);
                ui.separator();

                ui.horizontal(|ui| {
                    ui.vertical(|ui| {
                        ui.set_width(half);
                        ui.label(RichText::new("Procent głosów").size(14.0).strong());
                        ChartPlotter::draw_national_bar(ui, &analysis.national, SUMMARY_HEIGHT);
                    });
                    ui.add_space(CHART_SPACING);
                    ui.vertical(|ui| {
                        ui.set_width(half);
                        ui.label(RichText::new("Udział w głosach").size(14.0).strong());
                        ChartPlotter::draw_national_pie(
                            ui,
                            &analysis.national,
                            self.pie_label_min_pct,
                            SUMMARY_HEIGHT,
                        );
                    });
                });
            });
    }
}
