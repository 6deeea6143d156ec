use std::path::Path;

use anyhow::{Context, Result, ensure};

/// Encode tightly packed RGBA8 `pixels` as PNG and write them to `path`.
pub fn write_png(path: &Path, pixels: &[u8], width: u32, height: u32) -> Result<()> {
    let expected = width as usize * height as usize * 4;
    ensure!(
        pixels.len() == expected,
        "pixel buffer holds {} bytes, {width}x{height} RGBA8 needs {expected}",
        pixels.len()
    );

    image::save_buffer_with_format(
        path,
        pixels,
        width,
        height,
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(())
}
