//! Pixel buffer to image conversion

use contracts::{ColorMode, ResampleFilter};
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, Rgba, RgbImage, RgbaImage};

use crate::error::{Result, SceneError};
use crate::vision::PixelBuffer;

/// Derived image request
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImageRequest {
    pub mode: ColorMode,
    /// Target (width, height); `None` keeps the native resolution
    pub size: Option<(u32, u32)>,
    pub filter: ResampleFilter,
    /// Flip rows, for servers that deliver frames bottom-up
    pub flip_vertical: bool,
}

impl ImageRequest {
    pub fn new(mode: ColorMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn resized(mut self, width: u32, height: u32, filter: ResampleFilter) -> Self {
        self.size = Some((width, height));
        self.filter = filter;
        self
    }

    pub fn flipped(mut self) -> Self {
        self.flip_vertical = true;
        self
    }
}

/// Decode, convert and resize `pixels` as described by `request`
pub fn render(pixels: &PixelBuffer, request: &ImageRequest) -> Result<DynamicImage> {
    let native = DynamicImage::ImageRgb8(decode(pixels)?);
    let mut image = convert(native, request.mode);

    if let Some((width, height)) = request.size {
        if (width, height) != (image.width(), image.height()) {
            image = resize(&image, width, height, request.filter)?;
        }
    }

    if request.flip_vertical {
        image = image.flipv();
    }
    Ok(image)
}

/// Wrap raw RGB bytes as an image
pub fn decode(pixels: &PixelBuffer) -> Result<RgbImage> {
    let (width, height) = (pixels.width() as u32, pixels.height() as u32);
    RgbImage::from_raw(width, height, pixels.as_bytes().to_vec()).ok_or_else(|| {
        SceneError::image(format!(
            "{} bytes do not fill a {width}x{height} RGB image",
            pixels.as_bytes().len()
        ))
    })
}

pub fn convert(image: DynamicImage, mode: ColorMode) -> DynamicImage {
    match mode {
        ColorMode::Rgb => DynamicImage::ImageRgb8(image.to_rgb8()),
        ColorMode::Rgba => DynamicImage::ImageRgba8(image.to_rgba8()),
        ColorMode::Luma => DynamicImage::ImageLuma8(image.to_luma8()),
        ColorMode::LumaAlpha => DynamicImage::ImageLumaA8(image.to_luma_alpha8()),
    }
}

/// Resample to exactly `width` x `height`, keeping the color layout
pub fn resize(
    image: &DynamicImage,
    width: u32,
    height: u32,
    filter: ResampleFilter,
) -> Result<DynamicImage> {
    if width == 0 || height == 0 {
        return Err(SceneError::invalid_argument(
            "size",
            format!("{width}x{height}"),
        ));
    }

    let filter_type = match filter {
        ResampleFilter::Nearest => FilterType::Nearest,
        ResampleFilter::Bilinear => FilterType::Triangle,
        ResampleFilter::Bicubic => FilterType::CatmullRom,
        ResampleFilter::Lanczos => FilterType::Lanczos3,
        // Same one-pixel support as bilinear; closest filter the image crate offers
        ResampleFilter::Hamming => FilterType::Triangle,
        ResampleFilter::Box => return Ok(box_resize(image, width, height)),
    };
    Ok(image.resize_exact(width, height, filter_type))
}

/// Area average: each target pixel is the mean of the source pixels it covers
fn box_resize(image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    let source = image.to_rgba8();
    let (src_w, src_h) = (source.width() as u64, source.height() as u64);
    let (dst_w, dst_h) = (width as u64, height as u64);

    let span = |index: u64, src: u64, dst: u64| {
        let start = index * src / dst;
        let end = ((index + 1) * src).div_ceil(dst).max(start + 1).min(src);
        (start as u32, end as u32)
    };

    let resized = RgbaImage::from_fn(width, height, |x, y| {
        let (x0, x1) = span(x as u64, src_w, dst_w);
        let (y0, y1) = span(y as u64, src_h, dst_h);

        let mut sum = [0u64; 4];
        for sy in y0..y1 {
            for sx in x0..x1 {
                let pixel = source.get_pixel(sx, sy);
                for (acc, channel) in sum.iter_mut().zip(pixel.0) {
                    *acc += channel as u64;
                }
            }
        }

        let count = ((x1 - x0) as u64 * (y1 - y0) as u64).max(1);
        Rgba(sum.map(|acc| ((acc + count / 2) / count) as u8))
    });

    restore_layout(DynamicImage::ImageRgba8(resized), image.color())
}

fn restore_layout(image: DynamicImage, layout: ColorType) -> DynamicImage {
    match layout {
        ColorType::L8 => DynamicImage::ImageLuma8(image.to_luma8()),
        ColorType::La8 => DynamicImage::ImageLumaA8(image.to_luma_alpha8()),
        ColorType::Rgb8 => DynamicImage::ImageRgb8(image.to_rgb8()),
        _ => image,
    }
}
