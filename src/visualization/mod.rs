//! Confusion-matrix rendering
//!
//! Draws the confusion matrix as a heat map, encodes it as PNG in memory and
//! returns a `data:image/png;base64,` URI suitable for embedding directly in
//! a JSON response. Rendering is stateless; a failure here never invalidates
//! the training results it accompanies.

use crate::error::{PipelineError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use std::io::Cursor;

const CELL_SIZE: u32 = 96;
const MARGIN: u32 = 24;
const GLYPH_SCALE: u32 = 4;

/// 3x5 bitmaps for the digits, row-major, one bit per pixel
const DIGIT_GLYPHS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111], // 0
    [0b010, 0b110, 0b010, 0b010, 0b111], // 1
    [0b111, 0b001, 0b111, 0b100, 0b111], // 2
    [0b111, 0b001, 0b111, 0b001, 0b111], // 3
    [0b101, 0b101, 0b111, 0b001, 0b001], // 4
    [0b111, 0b100, 0b111, 0b001, 0b111], // 5
    [0b111, 0b100, 0b111, 0b101, 0b111], // 6
    [0b111, 0b001, 0b010, 0b010, 0b010], // 7
    [0b111, 0b101, 0b111, 0b101, 0b111], // 8
    [0b111, 0b101, 0b111, 0b001, 0b111], // 9
];

/// Render the confusion matrix as a PNG data URI.
pub fn confusion_matrix_data_uri(matrix: &[Vec<u64>]) -> Result<String> {
    let png = render_png(matrix)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

fn render_png(matrix: &[Vec<u64>]) -> Result<Vec<u8>> {
    let n = matrix.len();
    if n == 0 || matrix.iter().any(|row| row.len() != n) {
        return Err(PipelineError::ComputationError(
            "confusion matrix must be square and non-empty".to_string(),
        ));
    }

    let side = n as u32 * CELL_SIZE + 2 * MARGIN;
    let mut img = RgbImage::from_pixel(side, side, Rgb([255, 255, 255]));

    let max_count = matrix.iter().flatten().copied().max().unwrap_or(0).max(1);

    for (row, counts) in matrix.iter().enumerate() {
        for (col, &count) in counts.iter().enumerate() {
            let x0 = MARGIN + col as u32 * CELL_SIZE;
            let y0 = MARGIN + row as u32 * CELL_SIZE;

            let intensity = count as f64 / max_count as f64;
            let fill = heat_color(intensity);
            for dy in 0..CELL_SIZE {
                for dx in 0..CELL_SIZE {
                    let edge = dx == 0 || dy == 0 || dx == CELL_SIZE - 1 || dy == CELL_SIZE - 1;
                    let pixel = if edge { Rgb([255, 255, 255]) } else { fill };
                    img.put_pixel(x0 + dx, y0 + dy, pixel);
                }
            }

            // Dark text on light cells, light text on dark cells
            let text = if intensity > 0.5 {
                Rgb([245, 245, 245])
            } else {
                Rgb([30, 30, 30])
            };
            draw_count(&mut img, x0, y0, count, text);
        }
    }

    let mut buf = Cursor::new(Vec::new());
    PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), side, side, ExtendedColorType::Rgb8)
        .map_err(|e| PipelineError::ComputationError(format!("PNG encoding failed: {}", e)))?;
    Ok(buf.into_inner())
}

/// White-to-blue ramp, matching the usual heat-map palette
fn heat_color(intensity: f64) -> Rgb<u8> {
    let t = intensity.clamp(0.0, 1.0);
    let lerp = |from: f64, to: f64| (from + (to - from) * t) as u8;
    Rgb([lerp(247.0, 8.0), lerp(251.0, 48.0), lerp(255.0, 107.0)])
}

/// Draw a count centered in its cell using the built-in digit glyphs
fn draw_count(img: &mut RgbImage, x0: u32, y0: u32, count: u64, color: Rgb<u8>) {
    let digits: Vec<usize> = count
        .to_string()
        .bytes()
        .map(|b| (b - b'0') as usize)
        .collect();

    let glyph_w = 3 * GLYPH_SCALE;
    let glyph_h = 5 * GLYPH_SCALE;
    let spacing = GLYPH_SCALE;
    let text_w = digits.len() as u32 * glyph_w + (digits.len() as u32 - 1) * spacing;

    // Counts too wide for the cell are dropped rather than clipped
    if text_w + 2 > CELL_SIZE {
        return;
    }

    let mut x = x0 + (CELL_SIZE - text_w) / 2;
    let y = y0 + (CELL_SIZE - glyph_h) / 2;

    for &digit in &digits {
        let glyph = &DIGIT_GLYPHS[digit];
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..3u32 {
                if bits & (0b100 >> col) != 0 {
                    for dy in 0..GLYPH_SCALE {
                        for dx in 0..GLYPH_SCALE {
                            img.put_pixel(
                                x + col * GLYPH_SCALE + dx,
                                y + row as u32 * GLYPH_SCALE + dy,
                                color,
                            );
                        }
                    }
                }
            }
        }
        x += glyph_w + spacing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_prefix() {
        let matrix = vec![vec![10, 2], vec![3, 15]];
        let uri = confusion_matrix_data_uri(&matrix).unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_png_magic_bytes() {
        let matrix = vec![vec![1, 0], vec![0, 1]];
        let png = render_png(&matrix).unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, 0x0a]);
    }

    #[test]
    fn test_rejects_non_square() {
        assert!(render_png(&[]).is_err());
        assert!(render_png(&[vec![1, 2]]).is_err());
    }

    #[test]
    fn test_all_zero_matrix_renders() {
        let matrix = vec![vec![0, 0], vec![0, 0]];
        assert!(confusion_matrix_data_uri(&matrix).is_ok());
    }

    #[test]
    fn test_multiclass_matrix() {
        let matrix = vec![
            vec![100, 2, 0],
            vec![5, 80, 1],
            vec![0, 3, 120],
        ];
        assert!(confusion_matrix_data_uri(&matrix).is_ok());
    }
}
