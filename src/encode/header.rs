use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::audio::window::WindowSpec;

pub const VALUES_PER_ROW: usize = 16;

/// Write `levels` as an AVR `PROGMEM` byte array, 16 values per row with the
/// row's start time as a trailing comment. Firmware parses this layout, so the
/// spacing is fixed.
pub fn write_header<W: Write>(out: &mut W, levels: &[u8], window: WindowSpec) -> std::io::Result<()> {
    writeln!(out, "#ifndef BRIGHTNESS_DATA_H")?;
    writeln!(out, "#define BRIGHTNESS_DATA_H")?;
    writeln!(out, "#include <avr/pgmspace.h>")?;
    writeln!(out)?;
    writeln!(out, "const unsigned char brightnessArray[] PROGMEM = {{")?;

    for (row_idx, row) in levels.chunks(VALUES_PER_ROW).enumerate() {
        let start = row_idx * VALUES_PER_ROW;
        let values = row
            .iter()
            .map(|b| format!("{:3}", b))
            .collect::<Vec<_>>()
            .join(", ");
        let time = window.frame_start_seconds(start);

        if start + VALUES_PER_ROW < levels.len() {
            writeln!(out, "    {},  // {:.1}s", values, time)?;
        } else {
            writeln!(out, "    {}   // {:.1}s", values, time)?;
        }
    }

    writeln!(out, "}};")?;
    writeln!(out, "const int arraySize = {};", levels.len())?;
    writeln!(out, "const int ms = {};", window.window_ms)?;
    writeln!(out)?;
    writeln!(out, "#endif")?;
    Ok(())
}

pub fn export_header(path: &Path, levels: &[u8], window: WindowSpec) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create header file: {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write_header(&mut out, levels, window)
        .and_then(|_| out.flush())
        .with_context(|| format!("Failed to write header file: {}", path.display()))?;

    log::info!("Arduino data exported: {}", path.display());
    Ok(())
}
