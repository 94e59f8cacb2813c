//! Powiaty Main Application
//! Main window with control panel and chart viewer.

use crate::analysis::ElectionAnalysis;
use crate::charts::StaticChartRenderer;
use crate::config::AppConfig;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use egui::SidePanel;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread;
use tracing::{error, info};

/// Calculation result from background thread
enum CalcResult {
    Progress(f32, String),
    Complete(Box<ElectionAnalysis>),
    Error(String),
}

/// Main application window.
pub struct ElectionApp {
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async load + calculation
    calc_rx: Option<Receiver<CalcResult>>,
    is_calculating: bool,
}

impl ElectionApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let chart_viewer =
            ChartViewer::new(config.render.marker_divisor, config.render.pie_label_min_pct);
        let mut app = Self {
            control_panel: ControlPanel::new(config),
            chart_viewer,
            calc_rx: None,
            is_calculating: false,
        };
        // The data lives at a fixed location, so start right away
        app.start_calculation();
        app
    }

    /// Pick a different data directory
    fn handle_browse_data_dir(&mut self) {
        if let Some(dir) = rfd::FileDialog::new()
            .set_directory(&self.control_panel.settings.data.dir)
            .pick_folder()
        {
            self.chart_viewer.clear();
            self.control_panel.export_enabled = false;
            self.control_panel.settings.data.dir = dir;
            self.control_panel.set_progress(0.0, "Data directory changed");
        }
    }

    /// Start loading + calculation in background thread
    fn start_calculation(&mut self) {
        if self.is_calculating {
            return;
        }

        let config = self.control_panel.settings.clone();
        if let Err(e) = config.validate() {
            self.control_panel
                .set_progress(0.0, &format!("Error: {}", e));
            return;
        }

        let (tx, rx) = channel();
        self.calc_rx = Some(rx);
        self.is_calculating = true;
        self.control_panel.set_progress(5.0, "Loading data...");

        thread::spawn(move || {
            Self::run_calculation(tx, config);
        });
    }

    /// Run calculation (called from background thread)
    fn run_calculation(tx: Sender<CalcResult>, config: AppConfig) {
        let _ = tx.send(CalcResult::Progress(
            10.0,
            "Reading Parquet files...".to_string(),
        ));

        match ElectionAnalysis::run(&config) {
            Ok(analysis) => {
                let _ = tx.send(CalcResult::Complete(Box::new(analysis)));
            }
            Err(e) => {
                error!(error = %e, "analysis failed");
                let _ = tx.send(CalcResult::Error(e.to_string()));
            }
        }
    }

    /// Check for calculation results
    fn check_calculation_results(&mut self) {
        // Take the receiver temporarily to avoid borrow issues
        let rx = self.calc_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            loop {
                let result = match rx.try_recv() {
                    Ok(result) => result,
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        // Worker is gone without a final message
                        if should_keep_receiver {
                            error!("calculation thread stopped unexpectedly");
                            self.control_panel
                                .set_progress(0.0, "Error: calculation stopped unexpectedly");
                            self.is_calculating = false;
                            should_keep_receiver = false;
                        }
                        break;
                    }
                };

                match result {
                    CalcResult::Progress(progress, status) => {
                        self.control_panel.set_progress(progress, &status);
                    }
                    CalcResult::Complete(analysis) => {
                        let counties = analysis.counties.len();
                        self.chart_viewer.set_analysis(*analysis);
                        self.control_panel.export_enabled = true;
                        self.control_panel.set_progress(
                            100.0,
                            &format!("Complete! {} counties", counties),
                        );
                        self.is_calculating = false;
                        should_keep_receiver = false;
                    }
                    CalcResult::Error(error) => {
                        self.control_panel
                            .set_progress(0.0, &format!("Error: {}", error));
                        self.is_calculating = false;
                        should_keep_receiver = false;
                    }
                }
            }

            // Put receiver back if still needed
            if should_keep_receiver {
                self.calc_rx = Some(rx);
            }
        }
    }

    /// Render all charts to PNG files in the output directory
    fn handle_export_png(&mut self) {
        let Some(analysis) = &self.chart_viewer.analysis else {
            self.control_panel.set_progress(0.0, "No charts to export");
            return;
        };

        self.control_panel.set_progress(50.0, "Rendering charts...");
        match StaticChartRenderer::export_all(analysis, &self.control_panel.settings.render) {
            Ok(paths) => {
                info!(files = paths.len(), "charts exported");
                self.control_panel
                    .set_progress(100.0, &format!("Complete! {} PNG files written", paths.len()));
            }
            Err(e) => {
                error!(error = %e, "export failed");
                self.control_panel
                    .set_progress(0.0, &format!("Error: {}", e));
            }
        }
    }

    fn handle_open_output(&mut self) {
        let dir = self.control_panel.settings.render.output_dir.clone();
        if let Err(e) = open::that(&dir) {
            self.control_panel
                .set_progress(0.0, &format!("Error: cannot open {}: {}", dir.display(), e));
        }
    }
}

impl eframe::App for ElectionApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_calculation_results();

        // Request repaint while calculating
        if self.is_calculating {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui, self.is_calculating);

                    match action {
                        ControlPanelAction::BrowseDataDir => self.handle_browse_data_dir(),
                        ControlPanelAction::Calculate => self.start_calculation(),
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::OpenOutput => self.handle_open_output(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle_app() -> ElectionApp {
        ElectionApp {
            control_panel: ControlPanel::new(AppConfig::default()),
            chart_viewer: ChartViewer::default(),
            calc_rx: None,
            is_calculating: false,
        }
    }

    #[test]
    fn lost_worker_unlocks_calculation() {
        let mut app = idle_app();
        let (tx, rx) = channel::<CalcResult>();
        app.calc_rx = Some(rx);
        app.is_calculating = true;

        let worker = thread::spawn(move || {
            let _ = tx.send(CalcResult::Progress(10.0, "Reading".to_string()));
            panic!("worker failed");
        });
        assert!(worker.join().is_err());

        app.check_calculation_results();
        assert!(!app.is_calculating);
        assert!(app.calc_rx.is_none());
        assert!(app.control_panel.status.starts_with("Error"));
    }

    #[test]
    fn completed_worker_is_not_reported_as_lost() {
        let mut app = idle_app();
        let (tx, rx) = channel();
        app.calc_rx = Some(rx);
        app.is_calculating = true;

        tx.send(CalcResult::Error("missing file".to_string())).unwrap();
        drop(tx);

        app.check_calculation_results();
        assert!(!app.is_calculating);
        assert_eq!(app.control_panel.status, "Error: missing file");
    }
}
