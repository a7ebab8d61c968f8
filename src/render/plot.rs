use anyhow::{Context, Result};
use image::RgbaImage;
use std::path::Path;

use super::canvas::{Canvas, Rgba, WHITE};
use crate::audio::analysis::Analysis;
use crate::audio::features::SampleBuffer;

const WAVEFORM_COLOR: Rgba = [31, 119, 180, 180];
const ENERGY_COLOR: Rgba = [255, 127, 14, 255];
const FLOOR_COLOR: Rgba = [120, 120, 120, 255];
const CEILING_COLOR: Rgba = [214, 39, 40, 255];
const GRID_COLOR: Rgba = [0, 0, 0, 40];
const FRAME_COLOR: Rgba = [0, 0, 0, 255];

/// Viridis anchor colours, evenly spaced over 0.0-1.0.
const VIRIDIS: [[u8; 3]; 9] = [
    [68, 1, 84],
    [71, 44, 122],
    [59, 81, 139],
    [44, 113, 142],
    [33, 144, 141],
    [39, 173, 129],
    [92, 200, 99],
    [170, 220, 50],
    [253, 231, 37],
];

#[derive(Clone, Copy, Debug)]
pub struct PlotOptions {
    pub width: u32,
    pub height: u32,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            width: 1500,
            height: 1000,
        }
    }
}

/// Plot area of one panel, in pixels.
#[derive(Clone, Copy, Debug)]
struct Panel {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl Panel {
    fn width(&self) -> i32 {
        self.right - self.left
    }

    fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Horizontal pixel for `t` seconds out of `span`.
    fn x_at(&self, t: f64, span: f64) -> i32 {
        let frac = if span > 0.0 { (t / span).clamp(0.0, 1.0) } else { 0.0 };
        self.left + (frac * self.width() as f64).round() as i32
    }

    /// Vertical pixel for `value` within `[lo, hi]`, larger values higher up.
    fn y_at(&self, value: f64, lo: f64, hi: f64) -> i32 {
        let frac = if hi > lo { ((value - lo) / (hi - lo)).clamp(0.0, 1.0) } else { 0.5 };
        self.bottom - (frac * self.height() as f64).round() as i32
    }
}

/// Map 0.0-1.0 onto the viridis ramp.
pub fn viridis(t: f64) -> Rgba {
    let pos = t.clamp(0.0, 1.0) * (VIRIDIS.len() - 1) as f64;
    let idx = (pos.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = pos - idx as f64;
    let (a, b) = (VIRIDIS[idx], VIRIDIS[idx + 1]);
    let mix = |c: usize| (a[c] as f64 + (b[c] as f64 - a[c] as f64) * frac).round() as u8;
    [mix(0), mix(1), mix(2), 255]
}

fn layout(options: &PlotOptions) -> [Panel; 3] {
    let margin_x = (options.width as i32 / 20).max(4);
    let margin_y = (options.height as i32 / 25).max(4);
    let gap = margin_y;
    let usable = options.height as i32 - 2 * margin_y - 2 * gap;
    let panel_h = (usable / 3).max(1);

    let panel = |row: i32| {
        let top = margin_y + row * (panel_h + gap);
        Panel {
            left: margin_x,
            top,
            right: options.width as i32 - margin_x,
            bottom: top + panel_h,
        }
    };
    [panel(0), panel(1), panel(2)]
}

/// Grid spacing in seconds that keeps vertical grid lines readable.
fn time_grid_step(span: f64) -> f64 {
    [0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 15.0, 30.0, 60.0, 120.0, 300.0]
        .into_iter()
        .find(|step| span / step <= 20.0)
        .unwrap_or(600.0)
}

fn draw_frame(canvas: &mut Canvas, panel: &Panel, span: f64, lo: f64, hi: f64, rows: usize) {
    let step = time_grid_step(span);
    let mut t = step;
    while t < span {
        canvas.vline(panel.x_at(t, span), panel.top, panel.bottom, GRID_COLOR);
        t += step;
    }
    for i in 1..rows {
        let value = lo + (hi - lo) * i as f64 / rows as f64;
        canvas.hline(panel.left, panel.right, panel.y_at(value, lo, hi), GRID_COLOR);
    }

    canvas.hline(panel.left, panel.right, panel.top, FRAME_COLOR);
    canvas.hline(panel.left, panel.right, panel.bottom, FRAME_COLOR);
    canvas.vline(panel.left, panel.top, panel.bottom, FRAME_COLOR);
    canvas.vline(panel.right, panel.top, panel.bottom, FRAME_COLOR);
}

fn draw_waveform(canvas: &mut Canvas, panel: &Panel, samples: &[f32], span: f64, sample_rate: u32) {
    if samples.is_empty() || sample_rate == 0 {
        return;
    }
    let per_second = sample_rate as f64;
    let columns = panel.width().max(1);

    for col in 0..columns {
        let t0 = span * col as f64 / columns as f64;
        let t1 = span * (col + 1) as f64 / columns as f64;
        let start = ((t0 * per_second) as usize).min(samples.len());
        let end = ((t1 * per_second).ceil() as usize).min(samples.len());
        if start >= end {
            continue;
        }

        let (lo, hi) = samples[start..end]
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &s| (lo.min(s), hi.max(s)));
        let x = panel.left + col;
        canvas.vline(
            x,
            panel.y_at(hi as f64, -1.0, 1.0),
            panel.y_at(lo as f64, -1.0, 1.0),
            WAVEFORM_COLOR,
        );
    }
}

fn energy_bounds(analysis: &Analysis) -> (f64, f64) {
    let (lo, hi) = analysis
        .energy
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), &db| (lo.min(db), hi.max(db)));
    let pad = ((hi - lo) * 0.05).max(1.0);
    (lo - pad, hi + pad)
}

fn draw_energy(canvas: &mut Canvas, panel: &Panel, analysis: &Analysis, span: f64) {
    let (lo, hi) = energy_bounds(analysis);
    let window = analysis.window;

    canvas.dashed_hline(panel.left, panel.right, panel.y_at(analysis.range.noise_floor, lo, hi), 6, FLOOR_COLOR);
    canvas.dashed_hline(panel.left, panel.right, panel.y_at(analysis.range.ceiling, lo, hi), 6, CEILING_COLOR);

    let points: Vec<(i32, i32)> = analysis
        .energy
        .iter()
        .enumerate()
        .map(|(i, &db)| (panel.x_at(window.frame_start_seconds(i), span), panel.y_at(db, lo, hi)))
        .collect();

    match points.as_slice() {
        [] => {}
        [(x, y)] => canvas.blend(*x, *y, ENERGY_COLOR),
        _ => {
            for pair in points.windows(2) {
                let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
                canvas.line(x0, y0, x1, y1, ENERGY_COLOR);
            }
        }
    }
}

fn draw_brightness(canvas: &mut Canvas, panel: &Panel, analysis: &Analysis, span: f64) {
    let window = analysis.window;
    for (i, &level) in analysis.brightness.iter().enumerate() {
        if level == 0 {
            continue;
        }
        let x0 = panel.x_at(window.frame_start_seconds(i), span);
        let x1 = (panel.x_at(window.frame_start_seconds(i + 1), span) - 1).max(x0);
        let top = panel.y_at(level as f64, 0.0, 255.0);
        let mut color = viridis(level as f64 / 255.0);
        color[3] = 204;
        canvas.fill_rect(x0, top, x1, panel.bottom, color);
    }
}

/// Waveform, energy curve and brightness bars stacked on a shared time axis.
pub fn render_analysis_plot(buffer: &SampleBuffer, analysis: &Analysis, options: &PlotOptions) -> RgbaImage {
    let mut canvas = Canvas::new(options.width, options.height, WHITE);
    let [wave_panel, energy_panel, brightness_panel] = layout(options);
    let span = buffer.duration_seconds().max(analysis.duration_seconds());

    draw_waveform(&mut canvas, &wave_panel, &buffer.samples, span, buffer.sample_rate);
    draw_frame(&mut canvas, &wave_panel, span, -1.0, 1.0, 4);

    let (lo, hi) = energy_bounds(analysis);
    draw_energy(&mut canvas, &energy_panel, analysis, span);
    draw_frame(&mut canvas, &energy_panel, span, lo, hi, 4);

    draw_brightness(&mut canvas, &brightness_panel, analysis, span);
    draw_frame(&mut canvas, &brightness_panel, span, 0.0, 255.0, 5);

    canvas.into_image()
}

pub fn save_analysis_plot(
    path: &Path,
    buffer: &SampleBuffer,
    analysis: &Analysis,
    options: &PlotOptions,
) -> Result<()> {
    render_analysis_plot(buffer, analysis, options)
        .save(path)
        .with_context(|| format!("Failed to save visualization: {}", path.display()))?;

    log::info!("Visualization saved: {}", path.display());
    Ok(())
}
