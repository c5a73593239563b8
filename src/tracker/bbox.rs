use std::fmt;

use nalgebra::Vector2;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in TLBR format with inclusive pixel coordinates.
///
/// A box spanning `x1..=x2` is `x2 - x1 + 1` pixels wide, so `(0, 0, 9, 9)`
/// covers a 10x10 area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BBox {
    /// Top-left x coordinate
    pub x1: i64,
    /// Top-left y coordinate
    pub y1: i64,
    /// Bottom-right x coordinate
    pub x2: i64,
    /// Bottom-right y coordinate
    pub y2: i64,
}

impl BBox {
    #[inline]
    pub fn new(x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Build a box from a `[x1, y1, x2, y2]` slice chunk.
    #[inline]
    pub fn from_tlbr(tlbr: [i64; 4]) -> Self {
        Self::new(tlbr[0], tlbr[1], tlbr[2], tlbr[3])
    }

    #[inline]
    pub fn to_tlbr(&self) -> [i64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Inclusive width, `None` on overflow.
    #[inline]
    pub fn width(&self) -> Option<i64> {
        self.x2.checked_sub(self.x1)?.checked_add(1)
    }

    /// Inclusive height, `None` on overflow.
    #[inline]
    pub fn height(&self) -> Option<i64> {
        self.y2.checked_sub(self.y1)?.checked_add(1)
    }

    /// Inclusive area. `None` for zero or negative extents and on overflow.
    pub fn area(&self) -> Option<i64> {
        let width = self.width()?;
        let height = self.height()?;
        if width <= 0 || height <= 0 {
            return None;
        }
        width.checked_mul(height)
    }

    /// Top-left corner, the reference point used for speed estimates.
    #[inline]
    pub fn corner(&self) -> Vector2<f64> {
        Vector2::new(self.x1 as f64, self.y1 as f64)
    }

    #[inline]
    pub fn center(&self) -> Vector2<f64> {
        Vector2::new(
            (self.x1 as f64 + self.x2 as f64) / 2.0,
            (self.y1 as f64 + self.y2 as f64) / 2.0,
        )
    }

    /// Intersection over Union with another box.
    ///
    /// Returns `None` when either box is degenerate or the arithmetic
    /// overflows; callers treat that as "no overlap".
    pub fn iou(&self, other: &BBox) -> Option<f64> {
        let area_a = self.area()?;
        let area_b = other.area()?;

        let intersection = BBox::new(
            self.x1.max(other.x1),
            self.y1.max(other.y1),
            self.x2.min(other.x2),
            self.y2.min(other.y2),
        );
        let inter_width = intersection.width()?.max(0);
        let inter_height = intersection.height()?.max(0);
        let inter_area = inter_width.checked_mul(inter_height)?;

        let union_area = area_a.checked_add(area_b)?.checked_sub(inter_area)?;
        if union_area <= 0 {
            return None;
        }
        Some(inter_area as f64 / union_area as f64)
    }
}

impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x1, self.y1, self.x2, self.y2)
    }
}

/// Calculate the IoU matrix between two sets of boxes.
///
/// Returns a matrix of shape (M, N) where M is the length of `boxes_a` and N
/// is the length of `boxes_b`. Undefined overlaps are stored as `0.0`.
pub fn iou_batch(boxes_a: &[BBox], boxes_b: &[BBox]) -> Array2<f64> {
    let mut ious = Array2::zeros((boxes_a.len(), boxes_b.len()));
    for (i, a) in boxes_a.iter().enumerate() {
        for (j, b) in boxes_b.iter().enumerate() {
            ious[[i, j]] = a.iou(b).unwrap_or(0.0);
        }
    }
    ious
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_inclusive_extents() {
        let b = BBox::new(0, 0, 9, 19);
        assert_eq!(b.width(), Some(10));
        assert_eq!(b.height(), Some(20));
        assert_eq!(b.area(), Some(200));
    }

    #[test]
    fn test_iou_partial_overlap() {
        let a = BBox::new(0, 0, 9, 9);
        let b = BBox::new(5, 5, 14, 14);

        // Intersection: 5x5 = 25
        // Union: 100 + 100 - 25 = 175
        assert_abs_diff_eq!(a.iou(&b).unwrap(), 25.0 / 175.0, epsilon = 1e-12);
    }

    #[test]
    fn test_iou_same_box() {
        let a = BBox::new(0, 0, 10, 10);
        assert_abs_diff_eq!(a.iou(&a).unwrap(), 1.0);
    }

    #[test]
    fn test_iou_no_overlap() {
        let a = BBox::new(0, 0, 10, 10);
        let b = BBox::new(20, 20, 30, 30);
        assert_eq!(a.iou(&b), Some(0.0));
    }

    #[test]
    fn test_touching_edge_counts_one_pixel() {
        let a = BBox::new(0, 0, 9, 9);
        let b = BBox::new(9, 0, 18, 9);
        // Shared column x == 9 is 1x10 pixels.
        assert_abs_diff_eq!(a.iou(&b).unwrap(), 10.0 / 190.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_boxes_have_no_iou() {
        let good = BBox::new(0, 0, 10, 10);
        let inverted = BBox::new(10, 10, 0, 0);
        let flat = BBox::new(0, 5, 10, 3);
        assert_eq!(good.iou(&inverted), None);
        assert_eq!(inverted.iou(&good), None);
        assert_eq!(good.iou(&flat), None);
    }

    #[test]
    fn test_overflow_has_no_iou() {
        let huge = BBox::new(i64::MIN, i64::MIN, i64::MAX, i64::MAX);
        let small = BBox::new(0, 0, 10, 10);
        assert_eq!(huge.iou(&small), None);
    }

    #[test]
    fn test_iou_batch_shape() {
        let a = [BBox::new(0, 0, 9, 9), BBox::new(100, 100, 109, 109)];
        let b = [BBox::new(0, 0, 9, 9), BBox::new(5, 5, 0, 0), BBox::new(100, 100, 109, 109)];
        let ious = iou_batch(&a, &b);
        assert_eq!(ious.dim(), (2, 3));
        assert_abs_diff_eq!(ious[[0, 0]], 1.0);
        assert_abs_diff_eq!(ious[[0, 1]], 0.0);
        assert_abs_diff_eq!(ious[[1, 2]], 1.0);
    }

    #[test]
    fn test_corner_and_center() {
        let b = BBox::new(2, 4, 6, 10);
        assert_eq!(b.corner(), Vector2::new(2.0, 4.0));
        assert_eq!(b.center(), Vector2::new(4.0, 7.0));
    }
}
