//! ASCII/Unicode plotting for terminal output.
//!
//! Fixed-size character grid with deterministic output (used in golden tests).
//!
//! Plot elements:
//! - predicted units: `-` line
//! - actual units: `o`
//! - anomaly days: `A` (drawn at the actual value)

use crate::domain::ResampledSeries;

/// Render a resampled chart. The x axis is the grid index (one column band per day).
pub fn render_ascii_chart(chart: &ResampledSeries, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (first, last) = match (chart.grid.first(), chart.grid.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return "Plot: no data\n".to_string(),
    };

    let x_max = (chart.len() - 1) as f64;
    let (y_min, y_max) = y_range(chart).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Line first so points overlay it.
    let line: Vec<(f64, f64)> = chart
        .predicted
        .iter()
        .enumerate()
        .map(|(i, &y)| (i as f64, y))
        .collect();
    draw_series_line(&mut grid, &line, x_max, y_min, y_max);

    for (i, &y) in chart.actual.iter().enumerate() {
        let x = map_x(i as f64, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][x] = if chart.anomaly_grid_indices.contains(&i) { 'A' } else { 'o' };
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {first} .. {last} ({} days) | units=[{y_min:.2}, {y_max:.2}]\n",
        chart.len()
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn y_range(chart: &ResampledSeries) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &y in chart.predicted.iter().chain(&chart.actual) {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    if !(min_y.is_finite() && max_y.is_finite()) {
        return None;
    }
    if max_y > min_y {
        Some((min_y, max_y))
    } else {
        // Flat series: centre it.
        Some((min_y - 1.0, max_y + 1.0))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    if x_max <= 0.0 {
        return 0;
    }
    let u = (x / x_max).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // Row 0 is the top (y_max).
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_series_line(grid: &mut [Vec<char>], points: &[(f64, f64)], x_max: f64, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid.first().map_or(0, Vec::len);
    if width == 0 {
        return;
    }

    let mut prev = None;
    for &(x, y) in points {
        let col = map_x(x, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        match prev {
            Some((c0, r0)) => draw_line(grid, c0, r0, col, row, '-'),
            None => grid[row][col] = '-',
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham). Only writes blank cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if let Some(cell) = grid
            .get_mut(y0 as usize)
            .and_then(|row| row.get_mut(x0 as usize))
            .filter(|c| **c == ' ')
        {
            *cell = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
