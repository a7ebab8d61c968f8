use clap::Parser;
use std::path::PathBuf;

use crate::audio::brightness::DEFAULT_SMOOTHING_WINDOW;
use crate::audio::window::DEFAULT_WINDOW_MS;

pub const DEFAULT_HEADER: &str = "brightness_data.h";

#[derive(Parser, Debug)]
#[command(name = "brightline", about = "Convert audio into LED brightness data for Arduino firmware")]
pub struct Cli {
    /// Input audio file (WAV, MP3, FLAC, OGG)
    pub input: PathBuf,

    /// Output C header file
    #[arg(short, long, default_value = DEFAULT_HEADER)]
    pub output: PathBuf,

    /// Time resolution of the brightness curve, in milliseconds
    #[arg(short, long, default_value_t = DEFAULT_WINDOW_MS)]
    pub window_ms: u32,

    /// Moving-average width used against flicker (odd, 1 disables)
    #[arg(short, long, default_value_t = DEFAULT_SMOOTHING_WINDOW)]
    pub smoothing_window: usize,

    /// Visualization PNG path (default: <input stem>_analysis.png)
    #[arg(long, conflicts_with = "no_plot")]
    pub plot: Option<PathBuf>,

    /// Skip the visualization
    #[arg(long)]
    pub no_plot: bool,

    /// Also write a JSON analysis report
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Config file (default: ./brightline.toml or the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Where the visualization goes, if anywhere.
    pub fn plot_path(&self) -> Option<PathBuf> {
        if self.no_plot {
            return None;
        }
        if let Some(ref plot) = self.plot {
            return Some(plot.clone());
        }
        let stem = self
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());
        Some(PathBuf::from(format!("{}_analysis.png", stem)))
    }
}
