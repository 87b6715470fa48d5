//! Strip Geometry
//!
//! Lays the strip out in 2-D by walking a virtual pen along the path.
//! The pen starts at the origin heading 0 degrees and advances
//! `length / num_leds` per element. Bends turn the pen after a fixed
//! run of elements.
//!
//! Layout never touches the bend list: a cursor walks the slice, so the
//! same inputs always produce the same points.

use serde::{Deserialize, Serialize};

/// A direction change along the strip
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bend {
    /// Distance along the path before the bend
    pub length: f64,
    /// Degrees turned at the bend
    pub angle: f64,
}

impl Bend {
    pub fn new(length: f64, angle: f64) -> Self {
        Self { length, angle }
    }
}

/// Position of one element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    /// Heading in degrees the element was placed with
    pub heading: f64,
}

/// Number of elements placed between consecutive bends
fn bend_stride(num_leds: usize, bends: usize) -> usize {
    if bends == 0 {
        return 0;
    }
    (num_leds / bends).max(1)
}

/// Compute the position of every element.
///
/// Bend `k` fires right after element `(k + 1) * stride - 1` is placed,
/// where `stride = max(1, num_leds / bends.len())`. Bends past the last
/// element never fire.
pub fn layout(length: f64, num_leds: usize, bends: &[Bend]) -> Vec<Point> {
    if num_leds == 0 {
        return Vec::new();
    }

    let step = length / num_leds as f64;
    let stride = bend_stride(num_leds, bends.len());

    let mut points = Vec::with_capacity(num_leds);
    let mut x = 0.0;
    let mut y = 0.0;
    let mut heading = 0.0_f64;
    let mut cursor = 0;

    for i in 0..num_leds {
        points.push(Point { x, y, heading });

        let radians = heading.to_radians();
        x += radians.cos() * step;
        y += radians.sin() * step;

        if cursor < bends.len() && i + 1 == (cursor + 1) * stride {
            heading += bends[cursor].angle;
            cursor += 1;
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_empty_strip() {
        assert!(layout(100.0, 0, &[Bend::new(1.0, 90.0)]).is_empty());
    }

    #[test]
    fn test_straight_strip() {
        let points = layout(10.0, 5, &[]);
        assert_eq!(points.len(), 5);
        for (i, p) in points.iter().enumerate() {
            assert!(close(p.x, i as f64 * 2.0));
            assert!(close(p.y, 0.0));
            assert!(close(p.heading, 0.0));
        }
    }

    #[test]
    fn test_single_right_angle() {
        // Stride 4: four elements along x, then the pen turns to +y
        let points = layout(8.0, 4, &[Bend::new(4.0, 90.0)]);
        assert_eq!(points.len(), 4);
        assert!(close(points[3].x, 6.0));
        assert!(close(points[3].heading, 0.0));

        let points = layout(8.0, 8, &[Bend::new(4.0, 90.0), Bend::new(4.0, 90.0)]);
        assert!(close(points[3].heading, 0.0));
        assert!(close(points[4].heading, 90.0));
        assert!(close(points[4].x, 4.0));
        assert!(close(points[5].x, 4.0));
        assert!(close(points[5].y, 1.0));
    }

    #[test]
    fn test_layout_is_idempotent() {
        let bends = vec![
            Bend::new(2.0, 45.0),
            Bend::new(2.0, -30.0),
            Bend::new(2.0, 90.0),
        ];
        let first = layout(30.0, 10, &bends);
        let second = layout(30.0, 10, &bends);
        assert_eq!(first, second);
        assert_eq!(bends.len(), 3);
    }

    #[test]
    fn test_more_bends_than_elements() {
        let bends = vec![Bend::new(1.0, 10.0); 5];
        let points = layout(3.0, 3, &bends);
        assert_eq!(points.len(), 3);
        assert!(close(points[0].heading, 0.0));
        assert!(close(points[1].heading, 10.0));
        assert!(close(points[2].heading, 20.0));
    }

    #[test]
    fn test_dodecagon_closes() {
        let length = 12.0;
        let bends = vec![Bend::new(length / 12.0, 30.0); 12];
        let points = layout(length, 12, &bends);
        assert_eq!(points.len(), 12);

        // Every side has the same length, including the closing one
        let step = length / 12.0;
        for i in 0..12 {
            let a = points[i];
            let b = points[(i + 1) % 12];
            let side = ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt();
            assert!((side - step).abs() < 1e-6, "side {} was {}", i, side);
        }
        assert!(close(points[11].heading, 330.0));
    }
}
