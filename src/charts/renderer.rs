//! Static Chart Renderer
//! Renders the four election figures to PNG with plotters.
//!
//! Figures:
//! 1. County scatter: two panels (candidate A, candidate B) sharing the
//!    y range, vote share vs. density on a log axis, marker area ~ population
//! 2. Nationwide bar chart, candidates in descending order
//! 3. Nationwide pie chart with the same legend as the bar chart

use crate::analysis::ElectionAnalysis;
use crate::charts::{
    legend_label, log_axis_range, marker_radius, pct_axis_max, pie_label, pie_wedges,
    CANDIDATE_COLORS, DENSITY_AXIS, NATIONAL_TITLE, PCT_AXIS, SCATTER_TITLE, TAB20,
};
use crate::config::RenderConfig;
use crate::data::Candidate;
use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Drawing(String),
    #[error("Pixel buffer does not match the image size")]
    Buffer,
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Drawing(e.to_string())
    }
}

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Output file names
pub const SCATTER_FILE: &str = "skaterplot_powiaty.png";
pub const BAR_FILE: &str = "wyniki_slupkowy.png";
pub const PIE_FILE: &str = "wyniki_kolowy.png";

const FONT: &str = "sans-serif";

fn rgb((r, g, b): (u8, u8, u8)) -> RGBColor {
    RGBColor(r, g, b)
}

fn palette(idx: usize) -> RGBColor {
    rgb(TAB20[idx % TAB20.len()])
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Draw into an RGB buffer and encode it as PNG bytes.
    fn render_png<F>(width: u32, height: u32, draw: F) -> Result<Vec<u8>, RenderError>
    where
        F: FnOnce(&Area<'_>) -> Result<(), RenderError>,
    {
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE)?;
            draw(&root)?;
            root.present()?;
        }

        let img = RgbImage::from_raw(width, height, buffer).ok_or(RenderError::Buffer)?;
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Two scatter panels, one per analysed candidate.
    pub fn render_county_scatter(
        analysis: &ElectionAnalysis,
        render: &RenderConfig,
    ) -> Result<Vec<u8>, RenderError> {
        let rows = &analysis.counties.rows;
        let densities: Vec<f64> = rows.iter().map(|r| r.density).collect();
        let x_range = log_axis_range(&densities).unwrap_or(1.0..10.0);
        let y_max = pct_axis_max(analysis.counties.all_pcts());

        Self::render_png(render.width, render.height, |root| {
            let root = root.titled(SCATTER_TITLE, (FONT, 20))?;
            let panels = root.split_evenly((1, 2));

            for (idx, (panel, candidate)) in panels.iter().zip(Candidate::BOTH).enumerate() {
                // Only the left panel carries the shared y axis label
                let y_desc = if idx == 0 { PCT_AXIS } else { "" };
                let points: Vec<(f64, f64, f64)> = analysis
                    .counties
                    .series(candidate)
                    .into_iter()
                    .filter(|&(density, pct, _)| density > 0.0 && pct.is_finite())
                    .collect();

                let mut chart = ChartBuilder::on(panel)
                    .caption(&analysis.labels[idx], (FONT, 18))
                    .margin(10)
                    .x_label_area_size(40)
                    .y_label_area_size(50)
                    .build_cartesian_2d(x_range.clone().log_scale(), 0.0..y_max)?;

                chart
                    .configure_mesh()
                    .x_desc(DENSITY_AXIS)
                    .y_desc(y_desc)
                    .draw()?;

                let color = rgb(CANDIDATE_COLORS[idx]);
                chart.draw_series(points.iter().map(|&(density, pct, population)| {
                    let radius = marker_radius(population, render.marker_divisor).round() as u32;
                    Circle::new((density, pct), radius, color.mix(0.7).filled())
                }))?;
            }
            Ok(())
        })
    }

    /// Nationwide percentage per candidate as bars.
    pub fn render_national_bar(
        analysis: &ElectionAnalysis,
        render: &RenderConfig,
    ) -> Result<Vec<u8>, RenderError> {
        let national = &analysis.national;
        let n = national.len().max(1) as i32;
        let y_max = pct_axis_max(national.iter().map(|r| r.pct));

        Self::render_png(render.summary_width, render.summary_height, |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(NATIONAL_TITLE, (FONT, 20))
                .margin(15)
                .x_label_area_size(110)
                .y_label_area_size(50)
                .build_cartesian_2d((0..n).into_segmented(), 0.0..y_max)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(national.len().max(1))
                .x_label_style(
                    (FONT, 13)
                        .into_font()
                        .transform(FontTransform::Rotate90),
                )
                .x_label_formatter(&|x| match x {
                    SegmentValue::CenterOf(i) => national
                        .get(*i as usize)
                        .map(|r| r.surname.clone())
                        .unwrap_or_default(),
                    _ => String::new(),
                })
                .y_desc(PCT_AXIS)
                .draw()?;

            for (i, result) in national.iter().enumerate() {
                let color = palette(i);
                let x = i as i32;
                chart
                    .draw_series(std::iter::once(Rectangle::new(
                        [
                            (SegmentValue::Exact(x), 0.0),
                            (SegmentValue::Exact(x + 1), result.pct),
                        ],
                        color.filled(),
                    )))?
                    .label(legend_label(&result.surname, result.pct))
                    .legend(move |(lx, ly)| {
                        Rectangle::new([(lx, ly - 5), (lx + 12, ly + 5)], color.filled())
                    });
            }

            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(&WHITE.mix(0.85))
                .border_style(&BLACK)
                .label_font((FONT, 12))
                .draw()?;
            Ok(())
        })
    }

    /// Nationwide percentage per candidate as a pie.
    pub fn render_national_pie(
        analysis: &ElectionAnalysis,
        render: &RenderConfig,
    ) -> Result<Vec<u8>, RenderError> {
        let national = &analysis.national;
        let shares: Vec<f64> = national.iter().map(|r| r.pct).collect();
        let wedges = pie_wedges(&shares);

        Self::render_png(render.summary_width, render.summary_height, |root| {
            let root = root.titled(NATIONAL_TITLE, (FONT, 20))?;
            let (width, height) = root.dim_in_pixel();

            // Pie on the left two thirds, legend on the right
            let pie_width = width as f64 * 2.0 / 3.0;
            let cx = pie_width / 2.0;
            let cy = height as f64 / 2.0;
            let radius = (pie_width.min(height as f64) / 2.0 - 40.0).max(10.0);

            for (i, &(start, end)) in wedges.iter().enumerate() {
                root.draw(&Polygon::new(
                    Self::wedge_points(cx, cy, radius, start, end),
                    palette(i).filled(),
                ))?;
            }

            let label_style = TextStyle::from((FONT, 13).into_font())
                .pos(Pos::new(HPos::Center, VPos::Center));
            for (i, &(start, end)) in wedges.iter().enumerate() {
                let result = &national[i];
                let Some(label) = pie_label(&result.surname, result.pct, render.pie_label_min_pct)
                else {
                    continue;
                };
                let mid = (start + end) / 2.0;
                let lx = cx + (radius + 28.0) * mid.cos();
                let ly = cy - (radius + 28.0) * mid.sin();
                for (line_idx, line) in label.lines().enumerate() {
                    let y = ly as i32 + (line_idx as i32 * 15) - 7;
                    root.draw(&Text::new(line.to_string(), (lx as i32, y), label_style.clone()))?;
                }
            }

            let legend_x = pie_width as i32 + 10;
            let legend_font = (FONT, 12).into_font();
            for (i, result) in national.iter().enumerate() {
                let y = 20 + i as i32 * 20;
                root.draw(&Rectangle::new(
                    [(legend_x, y), (legend_x + 14, y + 12)],
                    palette(i).filled(),
                ))?;
                root.draw(&Text::new(
                    legend_label(&result.surname, result.pct),
                    (legend_x + 20, y),
                    legend_font.clone(),
                ))?;
            }
            Ok(())
        })
    }

    /// Polygon outline of a wedge in pixel coordinates (y grows downwards).
    fn wedge_points(cx: f64, cy: f64, radius: f64, start: f64, end: f64) -> Vec<(i32, i32)> {
        let steps = (((end - start) / std::f64::consts::TAU) * 180.0).ceil().max(1.0) as usize;
        let mut points = Vec::with_capacity(steps + 2);
        points.push((cx.round() as i32, cy.round() as i32));
        for s in 0..=steps {
            let angle = start + (end - start) * s as f64 / steps as f64;
            points.push((
                (cx + radius * angle.cos()).round() as i32,
                (cy - radius * angle.sin()).round() as i32,
            ));
        }
        points
    }

    fn write_png(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf, RenderError> {
        let path = dir.join(name);
        std::fs::write(&path, bytes).map_err(|source| RenderError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Render all figures into `render.output_dir`, returning the written paths.
    pub fn export_all(
        analysis: &ElectionAnalysis,
        render: &RenderConfig,
    ) -> Result<Vec<PathBuf>, RenderError> {
        let dir = render.output_dir.as_path();
        std::fs::create_dir_all(dir).map_err(|source| RenderError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let figures = [
            (SCATTER_FILE, Self::render_county_scatter(analysis, render)?),
            (BAR_FILE, Self::render_national_bar(analysis, render)?),
            (PIE_FILE, Self::render_national_pie(analysis, render)?),
        ];

        let mut written = Vec::with_capacity(figures.len());
        for (name, bytes) in &figures {
            let path = Self::write_png(dir, name, bytes)?;
            info!(path = %path.display(), bytes = bytes.len(), "chart written");
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CountyResult, CountyResults, NationalResult};

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn empty_analysis() -> ElectionAnalysis {
        ElectionAnalysis {
            national: Vec::new(),
            counties: CountyResults::default(),
            labels: ["A".to_string(), "B".to_string()],
            stats: Vec::new(),
            tables: Vec::new(),
        }
    }

    fn sample_analysis() -> ElectionAnalysis {
        let county = |teryt: &str, density: f64, population: f64, a: Option<f64>, b: f64| {
            CountyResult {
                teryt: teryt.to_string(),
                density,
                population,
                pct_a: a,
                pct_b: Some(b),
            }
        };
        let national = |surname: &str, pct: f64| NationalResult {
            surname: surname.to_string(),
            pct,
        };

        ElectionAnalysis {
            national: vec![
                national("TRZASKOWSKI", 31.36),
                national("NAWROCKI", 29.54),
                national("MENTZEN", 14.81),
                national("BARTOSZEWICZ", 0.49),
            ],
            counties: CountyResults {
                rows: vec![
                    county("0201", 110.0, 120.5, Some(45.0), 40.0),
                    county("0202", 55.5, 80.0, None, 25.0),
                    county("0261", 2300.0, 640.0, Some(21.2), 50.3),
                ],
                excluded: vec!["0203".to_string()],
            },
            labels: ["NAWROCKI".to_string(), "TRZASKOWSKI".to_string()],
            stats: Vec::new(),
            tables: Vec::new(),
        }
    }

    fn export_into(dir: &Path, analysis: &ElectionAnalysis) -> Vec<PathBuf> {
        let render = RenderConfig {
            output_dir: dir.join("charts"),
            ..Default::default()
        };
        StaticChartRenderer::export_all(analysis, &render).unwrap()
    }

    fn assert_pngs(paths: &[PathBuf]) {
        let names: Vec<_> = paths
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, [SCATTER_FILE, BAR_FILE, PIE_FILE]);
        for path in paths {
            let bytes = std::fs::read(path).unwrap();
            assert!(bytes.starts_with(&PNG_SIGNATURE), "{} is not a PNG", path.display());
        }
    }

    #[test]
    fn exports_three_png_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let paths = export_into(dir.path(), &sample_analysis());
        assert_pngs(&paths);
    }

    #[test]
    fn exports_an_empty_analysis() {
        let dir = tempfile::TempDir::new().unwrap();
        let paths = export_into(dir.path(), &empty_analysis());
        assert_pngs(&paths);
    }

    #[test]
    fn scatter_has_the_configured_size() {
        let render = RenderConfig {
            width: 640,
            height: 320,
            ..Default::default()
        };
        let bytes = StaticChartRenderer::render_county_scatter(&sample_analysis(), &render).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (640, 320));
    }

    #[test]
    fn wedge_outline_starts_at_center() {
        let points =
            StaticChartRenderer::wedge_points(100.0, 100.0, 50.0, 0.0, std::f64::consts::FRAC_PI_2);
        assert_eq!(points[0], (100, 100));
        assert_eq!(points[1], (150, 100));
        assert_eq!(*points.last().unwrap(), (100, 50));
    }

    #[test]
    fn export_reports_unwritable_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let render = RenderConfig {
            output_dir: file.path().join("charts"),
            ..Default::default()
        };

        let err = StaticChartRenderer::export_all(&empty_analysis(), &render).unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
    }
}
