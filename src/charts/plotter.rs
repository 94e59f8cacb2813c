//! Chart Plotter Module
//! Interactive versions of the election figures using egui_plot.

use crate::analysis::ElectionAnalysis;
use crate::charts::{
    legend_label, marker_radius, pct_axis_max, pie_label, pie_wedges, CANDIDATE_COLORS,
    DENSITY_AXIS, PCT_AXIS, TAB20,
};
use crate::data::{Candidate, NationalResult, TablePreview};
use crate::stats::CandidateStats;
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoint, Points, Polygon, Text};

const TABLE_MAX_HEIGHT: f32 = 240.0;

/// Markers are drawn smaller on screen than in the exported PNG
const SCREEN_MARKER_SCALE: f64 = 0.5;
const MAX_MARKER_RADIUS: f32 = 15.0;

pub fn color32((r, g, b): (u8, u8, u8)) -> Color32 {
    Color32::from_rgb(r, g, b)
}

/// Color for the n-th nationwide result.
pub fn palette_color(idx: usize) -> Color32 {
    color32(TAB20[idx % TAB20.len()])
}

/// Tick label for a log10 axis position, shown as the original density.
fn density_tick(log_value: f64) -> String {
    let density = 10f64.powf(log_value);
    if density >= 1.0 {
        format!("{:.0}", density)
    } else {
        format!("{:.2}", density)
    }
}

/// Plot id of a county scatter; labels can repeat, candidates cannot.
fn scatter_plot_id(candidate: Candidate) -> egui::Id {
    egui::Id::new(("county_scatter", candidate))
}

/// Creates the interactive charts.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Vote share vs. density for one candidate; x is plotted as log10(density).
    pub fn draw_county_scatter(
        ui: &mut egui::Ui,
        analysis: &ElectionAnalysis,
        candidate: Candidate,
        marker_divisor: f64,
        height: f32,
    ) {
        let idx = match candidate {
            Candidate::A => 0,
            Candidate::B => 1,
        };
        let color = color32(CANDIDATE_COLORS[idx]).gamma_multiply(0.7);
        let y_max = pct_axis_max(analysis.counties.all_pcts());

        Plot::new(scatter_plot_id(candidate))
            .height(height)
            .allow_scroll(false)
            .x_axis_label(DENSITY_AXIS)
            .y_axis_label(PCT_AXIS)
            .include_y(0.0)
            .include_y(y_max)
            .x_axis_formatter(|mark, _range| density_tick(mark.value))
            .label_formatter(|_name, point| {
                format!("{:.0} os./km²\n{:.2}%", 10f64.powf(point.x), point.y)
            })
            .show(ui, |plot_ui| {
                for (density, pct, population) in analysis.counties.series(candidate) {
                    if density <= 0.0 || !pct.is_finite() {
                        continue;
                    }
                    let radius = (marker_radius(population, marker_divisor) * SCREEN_MARKER_SCALE)
                        as f32;
                    plot_ui.points(
                        Points::new(vec![[density.log10(), pct]])
                            .radius(radius.clamp(1.0, MAX_MARKER_RADIUS))
                            .filled(true)
                            .color(color),
                    );
                }
            });
    }

    /// Nationwide results as a bar chart, highest first.
    pub fn draw_national_bar(ui: &mut egui::Ui, national: &[NationalResult], height: f32) {
        let bars: Vec<Bar> = national
            .iter()
            .enumerate()
            .map(|(i, r)| {
                Bar::new(i as f64, r.pct)
                    .width(0.8)
                    .fill(palette_color(i))
                    .name(legend_label(&r.surname, r.pct))
            })
            .collect();
        let names: Vec<String> = national.iter().map(|r| r.surname.clone()).collect();

        Plot::new("national_bar")
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .y_axis_label(PCT_AXIS)
            .include_y(0.0)
            .legend(Legend::default())
            .x_axis_formatter(move |mark, _range| {
                let value = mark.value;
                if (value - value.round()).abs() > 1e-6 || value < 0.0 {
                    return String::new();
                }
                names.get(value.round() as usize).cloned().unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
            });
    }

    /// Nationwide results as a pie; small slices are left unlabelled.
    pub fn draw_national_pie(
        ui: &mut egui::Ui,
        national: &[NationalResult],
        label_min_pct: f64,
        height: f32,
    ) {
        let shares: Vec<f64> = national.iter().map(|r| r.pct).collect();
        let wedges = pie_wedges(&shares);

        Plot::new("national_pie")
            .height(height)
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                for (i, &(start, end)) in wedges.iter().enumerate() {
                    let steps = ((end - start).to_degrees().ceil() as usize).max(1);
                    let mut points = vec![[0.0, 0.0]];
                    points.extend((0..=steps).map(|s| {
                        let angle = start + (end - start) * s as f64 / steps as f64;
                        [angle.cos(), angle.sin()]
                    }));

                    let result = &national[i];
                    plot_ui.polygon(
                        Polygon::new(points)
                            .fill_color(palette_color(i))
                            .stroke(egui::Stroke::new(1.0, Color32::WHITE))
                            .name(legend_label(&result.surname, result.pct)),
                    );

                    if let Some(text) = pie_label(&result.surname, result.pct, label_min_pct) {
                        let mid = (start + end) / 2.0;
                        plot_ui.text(Text::new(
                            PlotPoint::new(1.3 * mid.cos(), 1.3 * mid.sin()),
                            RichText::new(text).size(11.0),
                        ));
                    }
                }
            });
    }

    /// Head of one input table, with a scroll area of its own.
    pub fn draw_table_preview(ui: &mut egui::Ui, preview: &TablePreview) {
        ui.label(
            RichText::new(format!(
                "{} wierszy, pokazano {}",
                preview.height,
                preview.rows.len()
            ))
            .size(11.0)
            .color(Color32::GRAY),
        );

        egui::ScrollArea::both()
            .id_salt(("table_preview_scroll", &preview.name))
            .max_height(TABLE_MAX_HEIGHT)
            .show(ui, |ui| {
                egui::Grid::new(("table_preview", &preview.name))
                    .striped(true)
                    .spacing([12.0, 2.0])
                    .show(ui, |ui| {
                        for column in &preview.columns {
                            ui.label(RichText::new(column).strong().size(11.0));
                        }
                        ui.end_row();

                        for row in &preview.rows {
                            for cell in row {
                                ui.label(RichText::new(cell).size(11.0));
                            }
                            ui.end_row();
                        }
                    });
            });
    }

    /// Statistics of both analysed candidates.
    pub fn draw_stats_table(ui: &mut egui::Ui, stats: &[CandidateStats]) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("candidate_stats_table")
                    .striped(true)
                    .min_col_width(55.0)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        for header in [
                            "Kandydat", "N", "Mean", "Median", "Std", "Min", "Max", "P05",
                            "P95", "r(log)", "P-value",
                        ] {
                            ui.label(RichText::new(header).strong().size(11.0));
                        }
                        ui.end_row();

                        let default_text_color = ui.visuals().text_color();
                        for (idx, cs) in stats.iter().enumerate() {
                            let name_color = CANDIDATE_COLORS
                                .get(idx)
                                .map(|&c| color32(c))
                                .unwrap_or(default_text_color);
                            ui.label(RichText::new(&cs.label).size(11.0).color(name_color));
                            ui.label(RichText::new(cs.count.to_string()).size(11.0));
                            for value in [
                                cs.mean, cs.median, cs.std, cs.min, cs.max, cs.p05, cs.p95,
                                cs.correlation,
                            ] {
                                ui.label(RichText::new(format!("{:.3}", value)).size(11.0));
                            }

                            let p_color = if cs.is_significant {
                                Color32::from_rgb(220, 53, 69)
                            } else {
                                default_text_color
                            };
                            ui.label(
                                RichText::new(format!("{:.4}", cs.p_value))
                                    .size(11.0)
                                    .color(p_color),
                            );
                            ui.end_row();
                        }
                    });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn density_ticks_undo_the_log() {
        assert_eq!(density_tick(2.0), "100");
        assert_eq!(density_tick(0.0), "1");
        assert_eq!(density_tick(-1.0), "0.10");
    }

    #[test]
    fn scatter_ids_differ_per_candidate() {
        assert_ne!(scatter_plot_id(Candidate::A), scatter_plot_id(Candidate::B));
    }

    #[test]
    fn palette_wraps_around() {
        assert_eq!(palette_color(0), palette_color(20));
        assert_eq!(palette_color(1), Color32::from_rgb(174, 199, 232));
    }
}
