//! Charts module - Chart rendering

mod plotter;
mod renderer;

pub use plotter::ChartPlotter;
pub use renderer::StaticChartRenderer;

/// Figure titles
pub const SCATTER_TITLE: &str =
    "Wyniki 1. tury wyborów 2025 w podziale na powiaty, w zależności od gęstości zaludnienia";
pub const NATIONAL_TITLE: &str = "Procent głosów na poszczególnych kandydatów";
pub const PCT_AXIS: &str = "Procent głosów";
pub const DENSITY_AXIS: &str = "Osób/km^2";

/// Scatter colors of candidate A and candidate B
pub const CANDIDATE_COLORS: [(u8, u8, u8); 2] = [(31, 119, 180), (255, 0, 0)];

/// Categorical palette for the nationwide charts (matplotlib tab20)
pub const TAB20: [(u8, u8, u8); 20] = [
    (31, 119, 180),
    (174, 199, 232),
    (255, 127, 14),
    (255, 187, 120),
    (44, 160, 44),
    (152, 223, 138),
    (214, 39, 40),
    (255, 152, 150),
    (148, 103, 189),
    (197, 176, 213),
    (140, 86, 75),
    (196, 156, 148),
    (227, 119, 194),
    (247, 182, 210),
    (127, 127, 127),
    (199, 199, 199),
    (188, 189, 34),
    (219, 219, 141),
    (23, 190, 207),
    (158, 218, 229),
];

/// Legend entry for a nationwide result, e.g. `NAWROCKI: 29.54%`.
pub fn legend_label(surname: &str, pct: f64) -> String {
    format!("{}: {}%", surname, pct)
}

/// Inline pie label, only for slices above `min_pct`.
pub fn pie_label(surname: &str, pct: f64, min_pct: f64) -> Option<String> {
    (pct > min_pct).then(|| format!("{}:\n{}%", surname, pct))
}

/// Marker radius in pixels; the marker area follows the population.
pub fn marker_radius(population: f64, divisor: f64) -> f64 {
    if !population.is_finite() || population <= 0.0 {
        return 1.0;
    }
    (population / divisor).sqrt().max(1.0)
}

/// Decade-aligned log axis range covering all positive densities.
pub fn log_axis_range(densities: &[f64]) -> Option<std::ops::Range<f64>> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &d in densities {
        if d.is_finite() && d > 0.0 {
            min = min.min(d);
            max = max.max(d);
        }
    }
    if min.is_infinite() {
        return None;
    }

    let lo = 10f64.powf(min.log10().floor());
    let mut hi = 10f64.powf(max.log10().ceil());
    if hi <= lo {
        hi = lo * 10.0;
    }
    Some(lo..hi)
}

/// Upper bound of a percentage axis: next multiple of 10, within (0, 100].
pub fn pct_axis_max(values: impl IntoIterator<Item = f64>) -> f64 {
    let max = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(0.0f64, f64::max);
    ((max / 10.0).ceil() * 10.0).clamp(10.0, 100.0)
}

/// Pie wedges as (start, end) angles in radians, counter-clockwise from
/// 3 o'clock, proportional to each share.
pub fn pie_wedges(shares: &[f64]) -> Vec<(f64, f64)> {
    let total: f64 = shares.iter().filter(|s| **s > 0.0).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut start = 0.0;
    shares
        .iter()
        .map(|&share| {
            let sweep = share.max(0.0) / total * std::f64::consts::TAU;
            let wedge = (start, start + sweep);
            start += sweep;
            wedge
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legend_labels_combine_surname_and_percent() {
        assert_eq!(legend_label("NAWROCKI", 29.54), "NAWROCKI: 29.54%");
        assert_eq!(pie_label("NAWROCKI", 29.54, 4.0).as_deref(), Some("NAWROCKI:\n29.54%"));
        assert_eq!(pie_label("MACIAK", 0.19, 4.0), None);
        assert_eq!(pie_label("EDGE", 4.0, 4.0), None);
    }

    #[test]
    fn marker_area_follows_population() {
        assert!((marker_radius(600.0, 6.0) - 10.0).abs() < 1e-12);
        assert_eq!(marker_radius(0.0, 6.0), 1.0);
        assert_eq!(marker_radius(f64::NAN, 6.0), 1.0);
        let small = marker_radius(24.0, 6.0);
        let big = marker_radius(96.0, 6.0);
        assert!((big / small - 2.0).abs() < 1e-12);
    }

    #[test]
    fn log_range_is_decade_aligned() {
        let range = log_axis_range(&[18.0, 0.0, 3400.0, -1.0]).unwrap();
        assert!((range.start - 10.0).abs() < 1e-9);
        assert!((range.end - 10000.0).abs() < 1e-6);

        let exact = log_axis_range(&[100.0]).unwrap();
        assert!((exact.start - 100.0).abs() < 1e-9);
        assert!((exact.end - 1000.0).abs() < 1e-6);

        assert!(log_axis_range(&[0.0, f64::NAN]).is_none());
    }

    #[test]
    fn pct_axis_rounds_up_to_tens() {
        assert_eq!(pct_axis_max([45.2, 61.0, 12.0]), 70.0);
        assert_eq!(pct_axis_max([0.0]), 10.0);
        assert_eq!(pct_axis_max([100.0, f64::NAN]), 100.0);
    }

    #[test]
    fn wedges_cover_a_full_turn() {
        let wedges = pie_wedges(&[31.36, 29.54, 14.81, 24.29]);
        assert_eq!(wedges.len(), 4);
        assert_eq!(wedges[0].0, 0.0);
        for pair in wedges.windows(2) {
            assert!((pair[0].1 - pair[1].0).abs() < 1e-12);
        }
        assert!((wedges[3].1 - std::f64::consts::TAU).abs() < 1e-9);
        assert!(pie_wedges(&[0.0, 0.0]).is_empty());
    }
}
