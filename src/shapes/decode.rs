//! In-memory decoding of PDF image streams to 8-bit grayscale.

use std::io::Read;

use flate2::read::ZlibDecoder;
use image::{DynamicImage, GrayImage, ImageBuffer, RgbImage};

use crate::error::{Error, Result};
use crate::model::{ColorModel, ImageAsset, ImageFormat, Predictor, SampleLayout};

/// Decode an image asset to luma.
pub fn decode_luma(asset: &ImageAsset) -> Result<GrayImage> {
    match &asset.format {
        ImageFormat::Jpeg => decode_with(&asset.data, Some(image::ImageFormat::Jpeg)),
        ImageFormat::Encoded(_) => decode_with(&asset.data, None),
        ImageFormat::Jpeg2000 => Err(Error::ImageDecode(
            "JPEG 2000 images are not supported".to_string(),
        )),
        ImageFormat::Flate(layout) => {
            let inflated = inflate(&asset.data)?;
            let samples = match layout.predictor {
                Some(predictor) => unpredict(&inflated, predictor)?,
                None => inflated,
            };
            samples_to_luma(&samples, layout)
        }
        ImageFormat::Raw(layout) => samples_to_luma(&asset.data, layout),
        ImageFormat::Unsupported(filter) => Err(Error::ImageDecode(format!(
            "unsupported image encoding: {}",
            filter
        ))),
    }
}

/// Decode a self-describing image (PNG, JPEG) to luma.
pub fn decode_encoded_luma(data: &[u8]) -> Result<GrayImage> {
    decode_with(data, None)
}

fn decode_with(data: &[u8], format: Option<image::ImageFormat>) -> Result<GrayImage> {
    let img = match format {
        Some(format) => image::load_from_memory_with_format(data, format)?,
        None => image::load_from_memory(data)?,
    };
    Ok(img.to_luma8())
}

fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| Error::ImageDecode(format!("flate stream: {}", e)))?;
    Ok(out)
}

/// Reverse PNG row prediction. Every row starts with its own filter tag.
fn unpredict(data: &[u8], predictor: Predictor) -> Result<Vec<u8>> {
    let row_len =
        (predictor.columns * predictor.colors * predictor.bits_per_component).div_ceil(8);
    let bpp = (predictor.colors * predictor.bits_per_component).div_ceil(8).max(1);
    let stride = row_len + 1;

    if row_len == 0 || data.len() < stride {
        return Err(Error::ImageDecode("predictor row is empty".to_string()));
    }

    let rows = data.len() / stride;
    let mut out = vec![0u8; rows * row_len];

    for row in 0..rows {
        let tag = data[row * stride];
        let src = &data[row * stride + 1..(row + 1) * stride];
        let (done, rest) = out.split_at_mut(row * row_len);
        let prev = if row == 0 {
            None
        } else {
            Some(&done[(row - 1) * row_len..])
        };
        let cur = &mut rest[..row_len];

        for i in 0..row_len {
            let left = if i >= bpp { cur[i - bpp] } else { 0 };
            let up = prev.map_or(0, |p| p[i]);
            let up_left = match prev {
                Some(p) if i >= bpp => p[i - bpp],
                _ => 0,
            };
            let base = match tag {
                0 => 0,
                1 => left,
                2 => up,
                3 => ((left as u16 + up as u16) / 2) as u8,
                4 => paeth(left, up, up_left),
                other => {
                    return Err(Error::ImageDecode(format!(
                        "invalid PNG predictor tag {}",
                        other
                    )))
                }
            };
            cur[i] = src[i].wrapping_add(base);
        }
    }

    Ok(out)
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = a as i16 + b as i16 - c as i16;
    let pa = (p - a as i16).abs();
    let pb = (p - b as i16).abs();
    let pc = (p - c as i16).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

/// Unpack image samples and convert them to luma.
fn samples_to_luma(data: &[u8], layout: &SampleLayout) -> Result<GrayImage> {
    let (width, height) = (layout.width, layout.height);
    if width == 0 || height == 0 {
        return Err(Error::ImageDecode("image has no pixels".to_string()));
    }
    if !matches!(layout.bits_per_component, 1 | 2 | 4 | 8 | 16) {
        return Err(Error::ImageDecode(format!(
            "unsupported bits per component: {}",
            layout.bits_per_component
        )));
    }

    let row_bytes = layout.row_bytes();
    let needed = row_bytes * height as usize;
    if data.len() < needed {
        return Err(Error::ImageDecode(format!(
            "image data too short: {} bytes, expected {}",
            data.len(),
            needed
        )));
    }

    let components = layout.components();
    let bpc = layout.bits_per_component;
    let scale = |v: u16| -> u8 {
        match bpc {
            8 => v as u8,
            16 => (v >> 8) as u8,
            _ => (v as u32 * 255 / ((1u32 << bpc) - 1)) as u8,
        }
    };

    let pixels = width as usize * height as usize;
    let mut rgb = Vec::with_capacity(pixels * 3);
    let mut gray = Vec::with_capacity(pixels);

    for row in data[..needed].chunks(row_bytes) {
        let samples = unpack_row(row, bpc, width as usize * components);
        for px in samples.chunks(components) {
            match &layout.color {
                ColorModel::Gray => gray.push(scale(px[0])),
                ColorModel::Rgb => rgb.extend(px.iter().map(|&v| scale(v))),
                ColorModel::Cmyk => {
                    let [c, m, y, k] = [scale(px[0]), scale(px[1]), scale(px[2]), scale(px[3])];
                    rgb.extend([cmyk_channel(c, k), cmyk_channel(m, k), cmyk_channel(y, k)]);
                }
                ColorModel::Indexed { palette } => {
                    let idx = px[0] as usize * 3;
                    match palette.get(idx..idx + 3) {
                        Some(entry) => rgb.extend_from_slice(entry),
                        None => rgb.extend([0, 0, 0]),
                    }
                }
            }
        }
    }

    if matches!(layout.color, ColorModel::Gray) {
        return ImageBuffer::from_raw(width, height, gray)
            .ok_or_else(|| Error::ImageDecode("gray buffer size mismatch".to_string()));
    }

    let img: RgbImage = ImageBuffer::from_raw(width, height, rgb)
        .ok_or_else(|| Error::ImageDecode("RGB buffer size mismatch".to_string()))?;
    Ok(DynamicImage::ImageRgb8(img).to_luma8())
}

fn cmyk_channel(v: u8, k: u8) -> u8 {
    ((255 - v as u16) * (255 - k as u16) / 255) as u8
}

/// Split a packed row into `count` raw sample values.
fn unpack_row(row: &[u8], bpc: u8, count: usize) -> Vec<u16> {
    match bpc {
        8 => row.iter().take(count).map(|&b| b as u16).collect(),
        16 => row
            .chunks_exact(2)
            .take(count)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
            .collect(),
        _ => {
            let per_byte = 8 / bpc as usize;
            let mask = (1u16 << bpc) - 1;
            (0..count)
                .map(|i| {
                    let byte = row[i / per_byte] as u16;
                    let shift = 8 - bpc as usize * (i % per_byte + 1);
                    (byte >> shift) & mask
                })
                .collect()
        }
    }
}
