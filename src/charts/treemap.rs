//! Squarified treemap layout.

/// One laid-out cell, in the same units as the area passed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreemapCell {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl TreemapCell {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

#[derive(Clone, Copy)]
struct Free {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

/// Lay out `values` (largest first works best) inside a `width` x `height`
/// rectangle, one cell per value with area proportional to it.
///
/// Returns `None` when the area is degenerate or the values do not have a
/// positive, finite total.
pub fn treemap_layout(values: &[f64], width: f64, height: f64) -> Option<Vec<TreemapCell>> {
    let total: f64 = values.iter().sum();
    if !(width > 0.0 && height > 0.0 && total.is_finite() && total > 0.0) {
        return None;
    }
    if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return None;
    }

    let scale = width * height / total;
    let areas: Vec<f64> = values.iter().map(|v| v * scale).collect();

    let mut cells = Vec::with_capacity(areas.len());
    let mut free = Free {
        x: 0.0,
        y: 0.0,
        width,
        height,
    };
    let mut row: Vec<f64> = Vec::new();
    let mut i = 0;

    while i < areas.len() {
        let side = free.width.min(free.height);
        let mut candidate = row.clone();
        candidate.push(areas[i]);

        if row.is_empty() || worst_ratio(&candidate, side) <= worst_ratio(&row, side) {
            row = candidate;
            i += 1;
        } else {
            place_row(&row, &mut free, &mut cells);
            row.clear();
        }
    }
    if !row.is_empty() {
        place_row(&row, &mut free, &mut cells);
    }

    Some(cells)
}

/// Largest aspect ratio in `row` when laid along a side of length `side`.
fn worst_ratio(row: &[f64], side: f64) -> f64 {
    let sum: f64 = row.iter().sum();
    let max = row.iter().copied().fold(0.0, f64::max);
    let min = row.iter().copied().fold(f64::INFINITY, f64::min);
    if sum <= 0.0 || min <= 0.0 {
        return f64::INFINITY;
    }
    let side2 = side * side;
    let sum2 = sum * sum;
    (side2 * max / sum2).max(sum2 / (side2 * min))
}

fn place_row(row: &[f64], free: &mut Free, cells: &mut Vec<TreemapCell>) {
    let sum: f64 = row.iter().sum();

    if free.width >= free.height {
        // Column along the left edge
        let col_width = if free.height > 0.0 { sum / free.height } else { 0.0 };
        let mut y = free.y;
        for &area in row {
            let h = if col_width > 0.0 { area / col_width } else { 0.0 };
            cells.push(TreemapCell {
                x: free.x,
                y,
                width: col_width,
                height: h,
            });
            y += h;
        }
        free.x += col_width;
        free.width = (free.width - col_width).max(0.0);
    } else {
        // Row along the top edge
        let row_height = if free.width > 0.0 { sum / free.width } else { 0.0 };
        let mut x = free.x;
        for &area in row {
            let w = if row_height > 0.0 { area / row_height } else { 0.0 };
            cells.push(TreemapCell {
                x,
                y: free.y,
                width: w,
                height: row_height,
            });
            x += w;
        }
        free.y += row_height;
        free.height = (free.height - row_height).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    #[test]
    fn test_cells_cover_the_area() {
        let values = [6.0, 6.0, 4.0, 3.0, 2.0, 2.0, 1.0];
        let cells = treemap_layout(&values, 600.0, 400.0).unwrap();

        assert_eq!(cells.len(), values.len());
        let covered: f64 = cells.iter().map(TreemapCell::area).sum();
        assert!((covered - 240_000.0).abs() < 1e-3);

        for (cell, value) in cells.iter().zip(values) {
            assert!((cell.area() - value * 10_000.0).abs() < 1e-3);
            assert!(cell.x >= -EPS && cell.y >= -EPS);
            assert!(cell.x + cell.width <= 600.0 + EPS);
            assert!(cell.y + cell.height <= 400.0 + EPS);
        }
    }

    #[test]
    fn test_two_equal_values_split_evenly() {
        let cells = treemap_layout(&[1.0, 1.0], 2.0, 1.0).unwrap();
        assert_eq!(cells.len(), 2);
        for cell in &cells {
            assert!((cell.width - 1.0).abs() < EPS);
            assert!((cell.height - 1.0).abs() < EPS);
        }
    }

    #[test]
    fn test_degenerate_input() {
        assert!(treemap_layout(&[], 100.0, 100.0).is_none());
        assert!(treemap_layout(&[0.0, 0.0], 100.0, 100.0).is_none());
        assert!(treemap_layout(&[1.0, 2.0], 0.0, 100.0).is_none());
        assert!(treemap_layout(&[1.0, f64::NAN], 100.0, 100.0).is_none());
    }
}
