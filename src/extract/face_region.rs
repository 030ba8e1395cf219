use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::{KithError, KithResult};

/// Target number of grid cells along the shorter image side.
const GRID_CELLS: u32 = 24;
/// Fraction of sampled pixels that must be skin for a cell to count.
const SKIN_CELL_THRESHOLD: f32 = 0.4;
const MIN_REGION_CELLS: usize = 2;
/// Added on every side of the detected box, relative to its larger side.
const MARGIN: f32 = 0.25;
const FALLBACK_SIDE: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    #[default]
    Rgba,
    Rgb,
}

impl PixelFormat {
    fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba => 4,
            PixelFormat::Rgb => 3,
        }
    }
}

/// A square crop in pixel coordinates. `confidence` is 0 for the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceRegion {
    pub x: u32,
    pub y: u32,
    pub size: u32,
    pub confidence: f32,
}

struct Grid {
    cell: u32,
    cols: u32,
    rows: u32,
    skin: Vec<bool>,
}

/// Picks a square crop likely to contain a face, for suggesting a profile
/// photo. This is a skin-tone heuristic, not a detector.
pub fn select_face_region(
    pixels: &[u8],
    width: u32,
    height: u32,
    format: PixelFormat,
) -> KithResult<FaceRegion> {
    if width == 0 || height == 0 {
        return Err(KithError::invalid("width", "image has no pixels"));
    }
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(format.bytes_per_pixel()));
    if expected != Some(pixels.len()) {
        return Err(KithError::invalid(
            "pixels",
            format!("expected {}x{} {:?} pixels", width, height, format),
        ));
    }

    let grid = classify(pixels, width, height, format);
    Ok(match largest_region(&grid) {
        Some(cells) if cells.len() >= MIN_REGION_CELLS => square_around(&grid, &cells, width, height),
        _ => fallback(width, height),
    })
}

fn classify(pixels: &[u8], width: u32, height: u32, format: PixelFormat) -> Grid {
    let cell = (width.min(height) / GRID_CELLS).max(1);
    let cols = width.div_ceil(cell);
    let rows = height.div_ceil(cell);
    let stride = (cell / 4).max(1);
    let bpp = format.bytes_per_pixel();

    let mut skin = Vec::with_capacity((cols * rows) as usize);
    for row in 0..rows {
        for col in 0..cols {
            let (mut sampled, mut hits) = (0u32, 0u32);
            let mut y = row * cell;
            while y < ((row + 1) * cell).min(height) {
                let mut x = col * cell;
                while x < ((col + 1) * cell).min(width) {
                    let offset = (y as usize * width as usize + x as usize) * bpp;
                    let px = &pixels[offset..offset + bpp];
                    sampled += 1;
                    if is_skin(px) {
                        hits += 1;
                    }
                    x += stride;
                }
                y += stride;
            }
            skin.push(sampled > 0 && hits as f32 / sampled as f32 >= SKIN_CELL_THRESHOLD);
        }
    }
    Grid {
        cell,
        cols,
        rows,
        skin,
    }
}

/// RGB skin rule for daylight photos; transparent pixels never count.
fn is_skin(px: &[u8]) -> bool {
    if px.len() == 4 && px[3] < 128 {
        return false;
    }
    let (r, g, b) = (px[0] as i32, px[1] as i32, px[2] as i32);
    let spread = r.max(g).max(b) - r.min(g).min(b);
    r > 95 && g > 40 && b > 20 && spread > 15 && (r - g).abs() > 15 && r > g && r > b
}

/// Cell indices of the largest 4-connected group of skin cells.
fn largest_region(grid: &Grid) -> Option<Vec<usize>> {
    let mut seen = vec![false; grid.skin.len()];
    let mut best: Option<Vec<usize>> = None;

    for start in 0..grid.skin.len() {
        if !grid.skin[start] || seen[start] {
            continue;
        }
        let mut region = Vec::new();
        let mut queue = VecDeque::from([start]);
        seen[start] = true;
        while let Some(idx) = queue.pop_front() {
            region.push(idx);
            let (col, row) = (idx as u32 % grid.cols, idx as u32 / grid.cols);
            let neighbours = [
                (col > 0).then(|| idx - 1),
                (col + 1 < grid.cols).then(|| idx + 1),
                (row > 0).then(|| idx - grid.cols as usize),
                (row + 1 < grid.rows).then(|| idx + grid.cols as usize),
            ];
            for next in neighbours.into_iter().flatten() {
                if grid.skin[next] && !seen[next] {
                    seen[next] = true;
                    queue.push_back(next);
                }
            }
        }
        if best.as_ref().map_or(true, |b| region.len() > b.len()) {
            best = Some(region);
        }
    }
    best
}

fn square_around(grid: &Grid, cells: &[usize], width: u32, height: u32) -> FaceRegion {
    let cols = cells.iter().map(|&i| i as u32 % grid.cols);
    let rows = cells.iter().map(|&i| i as u32 / grid.cols);
    let (min_col, max_col) = (cols.clone().min().unwrap_or(0), cols.max().unwrap_or(0));
    let (min_row, max_row) = (rows.clone().min().unwrap_or(0), rows.max().unwrap_or(0));

    let x0 = min_col * grid.cell;
    let y0 = min_row * grid.cell;
    let x1 = ((max_col + 1) * grid.cell).min(width);
    let y1 = ((max_row + 1) * grid.cell).min(height);

    let side = (x1 - x0).max(y1 - y0) as f32 * (1.0 + 2.0 * MARGIN);
    let size = (side.round() as u32).clamp(1, width.min(height));
    let center_x = (x0 + x1) / 2;
    let center_y = (y0 + y1) / 2;

    let box_cells = (max_col - min_col + 1) * (max_row - min_row + 1);
    let fill = cells.len() as f32 / box_cells as f32;

    FaceRegion {
        x: clamp_origin(center_x, size, width),
        y: clamp_origin(center_y, size, height),
        size,
        confidence: (fill * 100.0).round() / 100.0,
    }
}

/// Upper-center square used when no skin region is found.
fn fallback(width: u32, height: u32) -> FaceRegion {
    let size = ((width.min(height) as f32 * FALLBACK_SIDE).round() as u32).max(1);
    FaceRegion {
        x: clamp_origin(width / 2, size, width),
        y: clamp_origin(height / 3, size, height),
        size,
        confidence: 0.0,
    }
}

/// Origin of a `size`-long span centered on `center`, kept inside `0..limit`.
fn clamp_origin(center: u32, size: u32, limit: u32) -> u32 {
    center.saturating_sub(size / 2).min(limit.saturating_sub(size))
}
