//! Reading images into RGBA buffers and writing flattened canvases out.

use crate::error::EditorError;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::path::Path;

pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, EditorError> {
    let img = image::load_from_memory(bytes).map_err(EditorError::Decode)?;
    Ok(img.to_rgba8())
}

pub fn open_image(path: impl AsRef<Path>) -> Result<RgbaImage, EditorError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| EditorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let img = decode_image(&bytes)?;
    log::info!("Opened {} ({}x{})", path.display(), img.width(), img.height());
    Ok(img)
}

/// Writes `image` in the format implied by the file extension. JPEG has no
/// alpha channel, so it is dropped before encoding.
pub fn save_image(image: &RgbaImage, path: impl AsRef<Path>) -> Result<(), EditorError> {
    let path = path.as_ref();
    let encode_err = |source| EditorError::Encode {
        path: path.to_path_buf(),
        source,
    };
    let format = ImageFormat::from_path(path).map_err(encode_err)?;
    let written = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgba8(image.clone())
            .to_rgb8()
            .save_with_format(path, format),
        _ => image.save_with_format(path, format),
    };
    written.map_err(encode_err)?;
    log::info!("Saved {}x{} image to {}", image.width(), image.height(), path.display());
    Ok(())
}

/// Placement of an image scaled to fit a canvas.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Fit {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Largest size with the image's aspect ratio that fits the canvas, centered.
pub fn fit_rect(image_w: u32, image_h: u32, canvas_w: u32, canvas_h: u32) -> Fit {
    if image_w == 0 || image_h == 0 {
        return Fit {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
        };
    }
    let ratio = (canvas_w as f64 / image_w as f64).min(canvas_h as f64 / image_h as f64);
    let width = ((image_w as f64 * ratio).round() as u32).clamp(1, canvas_w.max(1));
    let height = ((image_h as f64 * ratio).round() as u32).clamp(1, canvas_h.max(1));
    Fit {
        x: (canvas_w as i64 - width as i64) / 2,
        y: (canvas_h as i64 - height as i64) / 2,
        width,
        height,
    }
}

/// Scales `image` to fit a `canvas_w` x `canvas_h` canvas and returns it with
/// its centered offset.
pub fn fit_into(image: &RgbaImage, canvas_w: u32, canvas_h: u32) -> (RgbaImage, Fit) {
    let fit = fit_rect(image.width(), image.height(), canvas_w, canvas_h);
    let scaled = if (fit.width, fit.height) == image.dimensions() {
        image.clone()
    } else {
        imageops::resize(image, fit.width, fit.height, FilterType::Triangle)
    };
    (scaled, fit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::io::Cursor;

    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_png() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 4]));
        let decoded = decode_image(&png_bytes(&img)).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn garbage_is_decode_error() {
        assert!(matches!(decode_image(b"nope"), Err(EditorError::Decode(_))));
    }

    #[test]
    fn fit_wide_image() {
        let fit = fit_rect(200, 100, 100, 100);
        assert_eq!(fit, Fit { x: 0, y: 25, width: 100, height: 50 });
    }

    #[test]
    fn fit_scales_small_images_up() {
        let fit = fit_rect(10, 20, 100, 100);
        assert_eq!(fit, Fit { x: 25, y: 0, width: 50, height: 100 });
    }

    #[test]
    fn fit_into_resizes() {
        let img = RgbaImage::from_pixel(40, 20, Rgba([9, 9, 9, 255]));
        let (scaled, fit) = fit_into(&img, 10, 10);
        assert_eq!(scaled.dimensions(), (10, 5));
        assert_eq!((fit.x, fit.y), (0, 2));
        assert_eq!(*scaled.get_pixel(5, 2), Rgba([9, 9, 9, 255]));
    }

    #[test]
    fn save_and_reopen_png() {
        let dir = std::env::temp_dir().join(format!("arspaint-io-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("roundtrip.png");
        let img = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        save_image(&img, &path).unwrap();
        assert_eq!(open_image(&path).unwrap(), img);

        let jpeg = dir.join("flat.jpg");
        save_image(&img, &jpeg).unwrap();
        assert_eq!(open_image(&jpeg).unwrap().dimensions(), (4, 4));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unknown_extension_is_encode_error() {
        let img = RgbaImage::new(1, 1);
        let err = save_image(&img, std::env::temp_dir().join("x.unknownext")).unwrap_err();
        assert!(matches!(err, EditorError::Encode { .. }));
    }
}
