use crate::utils::error::Result;
use image::{GenericImageView, ImageFormat};
use std::io::Cursor;

pub const EMU_PER_INCH: u32 = 914_400;

/// 頁首 LOGO 寬度：1 inch
pub const LOGO_WIDTH_EMU: u32 = EMU_PER_INCH;

/// 每日插圖寬度：1.7 inch
pub const ILLUSTRATION_WIDTH_EMU: u32 = EMU_PER_INCH * 17 / 10;

/// 解碼後重新編碼為 PNG 的圖片，附帶固定寬度下的顯示尺寸
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub png: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
    pub width_emu: u32,
    pub height_emu: u32,
}

/// 以指定寬度（EMU）準備圖片，高度依原圖比例縮放
pub fn prepare_image(bytes: &[u8], width_emu: u32) -> Result<PreparedImage> {
    let img = image::load_from_memory(bytes)?;
    let (width_px, height_px) = img.dimensions();

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

    tracing::debug!(
        "Prepared {}x{} image ({} bytes as PNG)",
        width_px,
        height_px,
        png.len()
    );

    Ok(PreparedImage {
        png,
        width_px,
        height_px,
        width_emu,
        height_emu: scaled_height(width_px, height_px, width_emu),
    })
}

fn scaled_height(width_px: u32, height_px: u32, width_emu: u32) -> u32 {
    if width_px == 0 {
        return 0;
    }
    (u64::from(width_emu) * u64::from(height_px) / u64::from(width_px)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 40, 40]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
        buf
    }

    #[test]
    fn test_height_follows_aspect_ratio() {
        let prepared = prepare_image(&encode(4, 2, ImageFormat::Png), ILLUSTRATION_WIDTH_EMU).unwrap();
        assert_eq!(prepared.width_emu, 1_554_480);
        assert_eq!(prepared.height_emu, 777_240);
        assert_eq!((prepared.width_px, prepared.height_px), (4, 2));
    }

    #[test]
    fn test_jpeg_is_reencoded_as_png() {
        let prepared = prepare_image(&encode(8, 8, ImageFormat::Jpeg), LOGO_WIDTH_EMU).unwrap();
        assert_eq!(&prepared.png[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(prepared.height_emu, LOGO_WIDTH_EMU);
    }

    #[test]
    fn test_garbage_bytes_fail() {
        assert!(prepare_image(b"definitely not an image", LOGO_WIDTH_EMU).is_err());
    }
}
