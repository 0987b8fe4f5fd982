//! Plotters-powered forecast chart widget for Ratatui.
//!
//! Plotters output is drawn into the Ratatui buffer through
//! `plotters-ratatui-backend`.

use chrono::NaiveDate;
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::ResampledSeries;

use super::Palette;

/// Render-only chart description. Series and bounds are computed up front.
pub struct ForecastChart<'a> {
    grid: &'a [NaiveDate],
    predicted: Vec<(f64, f64)>,
    actual: Vec<(f64, f64)>,
    anomalies: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    palette: Palette,
}

impl<'a> ForecastChart<'a> {
    pub(super) fn new(chart: &'a ResampledSeries, palette: Palette) -> Self {
        let predicted: Vec<(f64, f64)> = chart
            .predicted
            .iter()
            .enumerate()
            .map(|(i, &y)| (i as f64, y))
            .collect();
        let actual: Vec<(f64, f64)> = chart
            .actual
            .iter()
            .enumerate()
            .map(|(i, &y)| (i as f64, y))
            .collect();
        let anomalies = chart
            .anomaly_grid_indices
            .iter()
            .filter_map(|&i| chart.actual.get(i).map(|&y| (i as f64, y)))
            .collect();

        let (x_bounds, y_bounds) = chart_bounds(chart);
        Self {
            grid: &chart.grid,
            predicted,
            actual,
            anomalies,
            x_bounds,
            y_bounds,
            palette,
        }
    }

    fn date_label(&self, x: f64) -> String {
        let i = x.round();
        if i < 0.0 {
            return String::new();
        }
        self.grid
            .get(i as usize)
            .map(|d| d.format("%m-%d").to_string())
            .unwrap_or_default()
    }
}

/// X spans the grid index range; y spans both series with 5% padding.
fn chart_bounds(chart: &ResampledSeries) -> ([f64; 2], [f64; 2]) {
    let n = chart.len();
    let x_bounds = if n > 1 { [0.0, (n - 1) as f64] } else { [-0.5, 0.5] };

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &y in chart.predicted.iter().chain(&chart.actual) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    }
    if y_max <= y_min {
        y_min -= 1.0;
        y_max += 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    (x_bounds, [y_min - pad, y_max + pad])
}

fn rgb((r, g, b): (u8, u8, u8)) -> RGBColor {
    RGBColor(r, g, b)
}

impl<'a> Widget for ForecastChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters cannot lay out a chart in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;

        let widget = widget_fn(move |root| {
            let text_color = rgb(self.palette.plot_text);
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(6)
                .y_labels(5)
                .x_label_formatter(&|v| self.date_label(*v))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&text_color))
                .axis_style(&text_color)
                .bold_line_style(&text_color)
                .draw()?;

            chart.draw_series(LineSeries::new(
                self.predicted.iter().copied(),
                &rgb(self.palette.plot_predicted),
            ))?;
            chart.draw_series(LineSeries::new(
                self.actual.iter().copied(),
                &rgb(self.palette.plot_actual),
            ))?;

            // Pixel markers: the ratatui backend scales `Circle` radii wrongly.
            let anomaly_color = rgb(self.palette.plot_anomaly);
            chart.draw_series(
                self.anomalies
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), anomaly_color)),
            )?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn chart(actual: Vec<f64>, predicted: Vec<f64>) -> ResampledSeries {
        let d0 = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        ResampledSeries {
            grid: d0.iter_days().take(actual.len()).collect(),
            predicted,
            actual,
            anomaly_grid_indices: BTreeSet::from([1]),
        }
    }

    #[test]
    fn bounds_cover_both_series_with_padding() {
        let c = chart(vec![10.0, 30.0, 20.0], vec![12.0, 18.0, 50.0]);
        let (x, y) = chart_bounds(&c);
        assert_eq!(x, [0.0, 2.0]);
        assert_eq!(y, [8.0, 52.0]);
    }

    #[test]
    fn single_day_and_flat_series_get_usable_bounds() {
        let c = chart(vec![5.0], vec![5.0]);
        let (x, y) = chart_bounds(&c);
        assert_eq!(x, [-0.5, 0.5]);
        assert!(y[0] < 5.0 && y[1] > 5.0);
    }

    #[test]
    fn x_labels_show_grid_dates() {
        let c = chart(vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0]);
        let widget = ForecastChart::new(&c, super::super::Theme::Dark.palette());
        assert_eq!(widget.date_label(0.0), "12-01");
        assert_eq!(widget.date_label(2.2), "12-03");
        assert_eq!(widget.date_label(7.0), "");
        assert_eq!(widget.anomalies, vec![(1.0, 2.0)]);
    }
}
