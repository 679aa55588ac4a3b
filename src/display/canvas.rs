// Canvas - The pixel buffer shown in the window
//
// A canvas is always stored as RGBA8, row-major. The adapters below convert
// from raw byte buffers, normalized numeric arrays and decoded images. They are
// the only place pixel contents are ever inspected.

use super::geometry::Dimensions;
use crate::error::{Result, ViewerError};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Layout of a raw byte buffer handed to [`Canvas::from_bytes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelMode {
    /// 8-bit grayscale
    Luma,
    /// 8-bit grayscale with alpha
    LumaAlpha,
    /// 8-bit red, green, blue
    Rgb,
    /// 8-bit red, green, blue, alpha
    Rgba,
    /// 8-bit blue, green, red, alpha
    Bgra,
}

impl PixelMode {
    /// Bytes per pixel
    pub fn channels(self) -> usize {
        match self {
            PixelMode::Luma => 1,
            PixelMode::LumaAlpha => 2,
            PixelMode::Rgb => 3,
            PixelMode::Rgba | PixelMode::Bgra => 4,
        }
    }

    #[inline]
    fn to_rgba(self, px: &[u8]) -> [u8; 4] {
        match self {
            PixelMode::Luma => [px[0], px[0], px[0], 0xFF],
            PixelMode::LumaAlpha => [px[0], px[0], px[0], px[1]],
            PixelMode::Rgb => [px[0], px[1], px[2], 0xFF],
            PixelMode::Rgba => [px[0], px[1], px[2], px[3]],
            PixelMode::Bgra => [px[2], px[1], px[0], px[3]],
        }
    }
}

/// Accepts the short mode names image libraries use ("L", "RGB", ...)
impl FromStr for PixelMode {
    type Err = ViewerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" | "LUMA" => Ok(PixelMode::Luma),
            "LA" | "LUMA_ALPHA" => Ok(PixelMode::LumaAlpha),
            "RGB" => Ok(PixelMode::Rgb),
            "RGBA" | "RGBX" => Ok(PixelMode::Rgba),
            "BGRA" => Ok(PixelMode::Bgra),
            _ => Err(ViewerError::UnsupportedPixelMode(s.to_string())),
        }
    }
}

/// Memory order of a normalized sample array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleOrder {
    /// Index `(y * width + x) * channels`
    #[default]
    RowMajor,
    /// Index `(x * height + y) * channels`
    ColumnMajor,
}

/// A floating-point sample in the unit range
pub trait UnitSample: Copy {
    fn to_unit(self) -> f64;
}

impl UnitSample for f32 {
    #[inline]
    fn to_unit(self) -> f64 {
        self as f64
    }
}

impl UnitSample for f64 {
    #[inline]
    fn to_unit(self) -> f64 {
        self
    }
}

/// Map a unit sample to a byte, clamping out-of-range and NaN values
#[inline]
fn unit_to_byte<T: UnitSample>(sample: T) -> u8 {
    let v = sample.to_unit();
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0) as u8
}

/// Resampling filter used when the canvas is scaled to the destination size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleFilter {
    #[default]
    Nearest,
    Triangle,
    CatmullRom,
    Lanczos3,
}

impl ScaleFilter {
    fn filter_type(self) -> FilterType {
        match self {
            ScaleFilter::Nearest => FilterType::Nearest,
            ScaleFilter::Triangle => FilterType::Triangle,
            ScaleFilter::CatmullRom => FilterType::CatmullRom,
            ScaleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl fmt::Display for ScaleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScaleFilter::Nearest => "nearest",
            ScaleFilter::Triangle => "triangle",
            ScaleFilter::CatmullRom => "catmull-rom",
            ScaleFilter::Lanczos3 => "lanczos3",
        };
        f.write_str(name)
    }
}

impl FromStr for ScaleFilter {
    type Err = ViewerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "nearest" => Ok(ScaleFilter::Nearest),
            "triangle" | "bilinear" => Ok(ScaleFilter::Triangle),
            "catmull-rom" | "catmullrom" | "bicubic" => Ok(ScaleFilter::CatmullRom),
            "lanczos3" | "lanczos" => Ok(ScaleFilter::Lanczos3),
            _ => Err(ViewerError::InvalidFilter(s.to_string())),
        }
    }
}

/// Pixel buffer shown by the presenter
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// Create an opaque black canvas
    pub fn blank(size: Dimensions) -> Self {
        Self {
            image: RgbaImage::from_pixel(size.width, size.height, Rgba([0, 0, 0, 0xFF])),
        }
    }

    /// Wrap an already decoded RGBA image
    pub fn from_rgba(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Convert any decoded image
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            image: image.into_rgba8(),
        }
    }

    /// Decode an image file (PNG, JPEG, BMP, GIF)
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let image = image::open(path)?;
        Ok(Self::from_image(image))
    }

    /// Convert a tightly packed row-major byte buffer
    ///
    /// # Arguments
    /// * `width` - Width in pixels
    /// * `height` - Height in pixels
    /// * `mode` - Layout of each pixel
    /// * `data` - Exactly `width * height * mode.channels()` bytes
    pub fn from_bytes(width: u32, height: u32, mode: PixelMode, data: &[u8]) -> Result<Self> {
        let stride = (width as usize)
            .checked_mul(mode.channels())
            .ok_or(ViewerError::BufferTooLarge { width, height })?;
        Self::from_bytes_with_stride(width, height, mode, stride, data)
    }

    /// Convert a row-major byte buffer whose rows may be padded
    ///
    /// `stride` is the distance in bytes between the start of two rows. The
    /// final row does not need to carry padding.
    pub fn from_bytes_with_stride(
        width: u32,
        height: u32,
        mode: PixelMode,
        stride: usize,
        data: &[u8],
    ) -> Result<Self> {
        let too_large = ViewerError::BufferTooLarge { width, height };
        let channels = mode.channels();
        let row_len = (width as usize).checked_mul(channels).ok_or(too_large)?;
        if stride < row_len {
            return Err(ViewerError::InvalidStride { stride, row_len });
        }

        let expected = if height == 0 {
            0
        } else {
            stride
                .checked_mul(height as usize - 1)
                .and_then(|n| n.checked_add(row_len))
                .ok_or(ViewerError::BufferTooLarge { width, height })?
        };
        // Padded buffers may also carry the last row's padding
        let padded = stride.checked_mul(height as usize);
        if data.len() != expected && Some(data.len()) != padded {
            return Err(ViewerError::BufferSize {
                expected,
                actual: data.len(),
            });
        }

        let mut image = RgbaImage::new(width, height);
        if row_len > 0 {
            for (y, row) in data.chunks(stride).take(height as usize).enumerate() {
                for (x, px) in row[..row_len].chunks_exact(channels).enumerate() {
                    image.put_pixel(x as u32, y as u32, Rgba(mode.to_rgba(px)));
                }
            }
        }

        Ok(Self { image })
    }

    /// Convert an array of samples in `[0, 1]`
    ///
    /// Each sample is scaled to `[0, 255]` and truncated; values outside the
    /// unit range are clamped.
    ///
    /// # Arguments
    /// * `channels` - 1 (grayscale), 3 (RGB) or 4 (RGBA)
    /// * `order` - Whether consecutive pixels run along rows or columns
    pub fn from_normalized<T: UnitSample>(
        width: u32,
        height: u32,
        channels: usize,
        order: SampleOrder,
        data: &[T],
    ) -> Result<Self> {
        if !matches!(channels, 1 | 3 | 4) {
            return Err(ViewerError::UnsupportedChannels(channels));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(channels))
            .ok_or(ViewerError::BufferTooLarge { width, height })?;
        if data.len() != expected {
            return Err(ViewerError::BufferSize {
                expected,
                actual: data.len(),
            });
        }

        let image = RgbaImage::from_fn(width, height, |x, y| {
            let index = match order {
                SampleOrder::RowMajor => y as usize * width as usize + x as usize,
                SampleOrder::ColumnMajor => x as usize * height as usize + y as usize,
            } * channels;
            let px = &data[index..index + channels];
            match channels {
                1 => {
                    let v = unit_to_byte(px[0]);
                    Rgba([v, v, v, 0xFF])
                }
                3 => Rgba([
                    unit_to_byte(px[0]),
                    unit_to_byte(px[1]),
                    unit_to_byte(px[2]),
                    0xFF,
                ]),
                _ => Rgba([
                    unit_to_byte(px[0]),
                    unit_to_byte(px[1]),
                    unit_to_byte(px[2]),
                    unit_to_byte(px[3]),
                ]),
            }
        });

        Ok(Self { image })
    }

    /// Width and height in pixels
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.image.width(), self.image.height())
    }

    /// Borrow the underlying RGBA image
    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Unwrap into the underlying RGBA image
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Raw RGBA bytes, row-major
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Resample the whole canvas to `size`
    pub fn scaled(&self, size: Dimensions, filter: ScaleFilter) -> RgbaImage {
        imageops::resize(&self.image, size.width, size.height, filter.filter_type())
    }

    /// Resample the region `(x, y, width, height)` of the canvas to `size`
    ///
    /// The region is clipped to the canvas bounds.
    pub fn scaled_region(
        &self,
        region: (u32, u32, u32, u32),
        size: Dimensions,
        filter: ScaleFilter,
    ) -> RgbaImage {
        let (x, y, width, height) = region;
        if (x, y) == (0, 0) && Dimensions::new(width, height) == self.dimensions() {
            return self.scaled(size, filter);
        }
        let crop = imageops::crop_imm(&self.image, x, y, width, height).to_image();
        imageops::resize(&crop, size.width, size.height, filter.filter_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_rgb() {
        let data = [255, 0, 0, 0, 255, 0, 0, 0, 255, 10, 20, 30];
        let canvas = Canvas::from_bytes(2, 2, PixelMode::Rgb, &data).unwrap();

        assert_eq!(canvas.dimensions(), Dimensions::new(2, 2));
        assert_eq!(canvas.as_image().get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(canvas.as_image().get_pixel(1, 0).0, [0, 255, 0, 255]);
        assert_eq!(canvas.as_image().get_pixel(0, 1).0, [0, 0, 255, 255]);
        assert_eq!(canvas.as_image().get_pixel(1, 1).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_from_bytes_luma_and_bgra() {
        let luma = Canvas::from_bytes(1, 1, PixelMode::Luma, &[0x40]).unwrap();
        assert_eq!(luma.pixels(), &[0x40, 0x40, 0x40, 0xFF]);

        let bgra = Canvas::from_bytes(1, 1, PixelMode::Bgra, &[1, 2, 3, 4]).unwrap();
        assert_eq!(bgra.pixels(), &[3, 2, 1, 4]);

        let la = Canvas::from_bytes(1, 1, PixelMode::LumaAlpha, &[9, 7]).unwrap();
        assert_eq!(la.pixels(), &[9, 9, 9, 7]);
    }

    #[test]
    fn test_from_bytes_wrong_length() {
        let err = Canvas::from_bytes(2, 2, PixelMode::Rgba, &[0; 15]).unwrap_err();
        assert!(matches!(
            err,
            ViewerError::BufferSize {
                expected: 16,
                actual: 15
            }
        ));
    }

    #[test]
    fn test_from_bytes_with_stride_skips_padding() {
        // Two RGB pixels per row, two bytes of padding
        let data = [1, 1, 1, 2, 2, 2, 0xEE, 0xEE, 3, 3, 3, 4, 4, 4];
        let canvas = Canvas::from_bytes_with_stride(2, 2, PixelMode::Rgb, 8, &data).unwrap();

        assert_eq!(canvas.as_image().get_pixel(1, 0).0, [2, 2, 2, 255]);
        assert_eq!(canvas.as_image().get_pixel(0, 1).0, [3, 3, 3, 255]);
        assert_eq!(canvas.as_image().get_pixel(1, 1).0, [4, 4, 4, 255]);
    }

    #[test]
    fn test_from_bytes_with_stride_accepts_trailing_padding() {
        let data = [5, 6, 7, 0, 8, 9, 10, 0];
        let canvas = Canvas::from_bytes_with_stride(1, 2, PixelMode::Rgb, 4, &data).unwrap();
        assert_eq!(canvas.as_image().get_pixel(0, 1).0, [8, 9, 10, 255]);
    }

    #[test]
    fn test_stride_shorter_than_row_is_rejected() {
        let err = Canvas::from_bytes_with_stride(4, 1, PixelMode::Rgba, 8, &[0; 16]).unwrap_err();
        assert!(matches!(
            err,
            ViewerError::InvalidStride {
                stride: 8,
                row_len: 16
            }
        ));
    }

    #[test]
    fn test_huge_stride_is_an_error() {
        let err = Canvas::from_bytes_with_stride(1, 3, PixelMode::Rgb, usize::MAX / 2, &[0; 3])
            .unwrap_err();
        assert!(matches!(
            err,
            ViewerError::BufferTooLarge {
                width: 1,
                height: 3
            }
        ));
    }

    #[test]
    fn test_huge_normalized_size_is_an_error() {
        let err = Canvas::from_normalized(u32::MAX, u32::MAX, 4, SampleOrder::RowMajor, &[] as &[f32])
            .unwrap_err();
        assert!(matches!(err, ViewerError::BufferTooLarge { .. }));
    }

    #[test]
    fn test_from_normalized_scales_and_truncates() {
        let data = [0.0f32, 0.5, 1.0];
        let canvas = Canvas::from_normalized(1, 1, 3, SampleOrder::RowMajor, &data).unwrap();
        assert_eq!(canvas.pixels(), &[0, 127, 255, 255]);
    }

    #[test]
    fn test_from_normalized_clamps_out_of_range() {
        let data = [-0.5f64, 2.0, f64::NAN, 1.0];
        let canvas = Canvas::from_normalized(1, 1, 4, SampleOrder::RowMajor, &data).unwrap();
        assert_eq!(canvas.pixels(), &[0, 255, 0, 255]);
    }

    #[test]
    fn test_from_normalized_grayscale() {
        let data = [0.2f32; 6];
        let canvas = Canvas::from_normalized(3, 2, 1, SampleOrder::RowMajor, &data).unwrap();
        assert_eq!(canvas.dimensions(), Dimensions::new(3, 2));
        assert_eq!(canvas.as_image().get_pixel(2, 1).0, [51, 51, 51, 255]);
    }

    #[test]
    fn test_from_normalized_column_major() {
        // 2 wide, 1 tall, laid out column by column
        let data = [1.0f32, 0.0, 0.0, 0.0, 0.0, 1.0];
        let canvas = Canvas::from_normalized(2, 1, 3, SampleOrder::ColumnMajor, &data).unwrap();
        assert_eq!(canvas.as_image().get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(canvas.as_image().get_pixel(1, 0).0, [0, 0, 255, 255]);

        // 1 wide, 2 tall: column-major equals row-major
        let data = [0.0f32, 1.0];
        let cols = Canvas::from_normalized(1, 2, 1, SampleOrder::ColumnMajor, &data).unwrap();
        let rows = Canvas::from_normalized(1, 2, 1, SampleOrder::RowMajor, &data).unwrap();
        assert_eq!(cols, rows);
    }

    #[test]
    fn test_from_normalized_rejects_bad_channels() {
        let err = Canvas::from_normalized(1, 1, 2, SampleOrder::RowMajor, &[0.0f32; 2]).unwrap_err();
        assert!(matches!(err, ViewerError::UnsupportedChannels(2)));
    }

    #[test]
    fn test_from_normalized_rejects_wrong_length() {
        let err = Canvas::from_normalized(2, 2, 3, SampleOrder::RowMajor, &[0.0f32; 11]).unwrap_err();
        assert!(matches!(
            err,
            ViewerError::BufferSize {
                expected: 12,
                actual: 11
            }
        ));
    }

    #[test]
    fn test_zero_sized_buffers_are_accepted() {
        let canvas = Canvas::from_bytes(0, 5, PixelMode::Rgb, &[]).unwrap();
        assert!(canvas.dimensions().is_empty());
    }

    #[test]
    fn test_pixel_mode_names() {
        assert_eq!("L".parse::<PixelMode>().unwrap(), PixelMode::Luma);
        assert_eq!("rgb".parse::<PixelMode>().unwrap(), PixelMode::Rgb);
        assert_eq!("RGBA".parse::<PixelMode>().unwrap(), PixelMode::Rgba);
        assert!(matches!(
            "CMYK".parse::<PixelMode>(),
            Err(ViewerError::UnsupportedPixelMode(_))
        ));
    }

    #[test]
    fn test_scaled_nearest() {
        let canvas = Canvas::from_bytes(1, 1, PixelMode::Rgb, &[9, 8, 7]).unwrap();
        let scaled = canvas.scaled(Dimensions::new(3, 2), ScaleFilter::Nearest);
        assert_eq!(scaled.dimensions(), (3, 2));
        assert!(scaled.pixels().all(|p| p.0 == [9, 8, 7, 255]));
    }

    #[test]
    fn test_scaled_region_uses_only_the_crop() {
        // Left pixel red, right pixel blue
        let canvas = Canvas::from_bytes(2, 1, PixelMode::Rgb, &[255, 0, 0, 0, 0, 255]).unwrap();

        let right = canvas.scaled_region((1, 0, 1, 1), Dimensions::new(3, 3), ScaleFilter::Nearest);
        assert_eq!(right.dimensions(), (3, 3));
        assert!(right.pixels().all(|p| p.0 == [0, 0, 255, 255]));

        let whole = canvas.scaled_region((0, 0, 2, 1), Dimensions::new(4, 1), ScaleFilter::Nearest);
        assert_eq!(whole, canvas.scaled(Dimensions::new(4, 1), ScaleFilter::Nearest));
    }

    #[test]
    fn test_scale_filter_names() {
        assert_eq!("catmull_rom".parse::<ScaleFilter>().unwrap(), ScaleFilter::CatmullRom);
        assert_eq!("Bilinear".parse::<ScaleFilter>().unwrap(), ScaleFilter::Triangle);
        for filter in [
            ScaleFilter::Nearest,
            ScaleFilter::Triangle,
            ScaleFilter::CatmullRom,
            ScaleFilter::Lanczos3,
        ] {
            assert_eq!(filter.to_string().parse::<ScaleFilter>().unwrap(), filter);
        }
        assert!("sharp".parse::<ScaleFilter>().is_err());
    }
}
