//! Collected-point bitmap carried in every snapshot.
//!
//! Bit `i` describes the `i`-th starting point of the map in row-major order,
//! most significant bit first within each byte. A set bit means the point has
//! been collected; bits past the last point are always zero.

use crate::Coord;
use std::collections::BTreeMap;

pub const POINTS_BITMAP_LEN: usize = 5;
pub const MAX_POINTS: usize = POINTS_BITMAP_LEN * 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointsBitmap([u8; POINTS_BITMAP_LEN]);

impl PointsBitmap {
    pub fn from_bytes(bytes: [u8; POINTS_BITMAP_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; POINTS_BITMAP_LEN] {
        &self.0
    }

    /// Builds a bitmap from per-point "collected" flags, in starting-point
    /// order. Flags beyond [`MAX_POINTS`] are ignored.
    pub fn from_collected<I>(collected: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let mut bitmap = Self::default();
        for (index, flag) in collected.into_iter().take(MAX_POINTS).enumerate() {
            if flag {
                bitmap.0[index / 8] |= 0x80 >> (index % 8);
            }
        }
        bitmap
    }

    /// Builds a bitmap from a presence map (`true` = point still on the map).
    /// `BTreeMap` iterates coordinates row-major, matching the order the
    /// client derives from its own copy of the map.
    pub fn from_presence(points: &BTreeMap<Coord, bool>) -> Self {
        Self::from_collected(points.values().map(|present| !present))
    }

    pub fn is_collected(&self, index: usize) -> bool {
        if index >= MAX_POINTS {
            return false;
        }
        self.0[index / 8] & (0x80 >> (index % 8)) != 0
    }

    pub fn collected_count(&self) -> u32 {
        self.0.iter().map(|byte| byte.count_ones()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msb_first_layout() {
        let flags = (0..10).map(|i| i == 0 || i == 9);
        let bitmap = PointsBitmap::from_collected(flags);
        assert_eq!(bitmap.as_bytes(), &[0x80, 0x40, 0, 0, 0]);
        assert!(bitmap.is_collected(0));
        assert!(!bitmap.is_collected(1));
        assert!(bitmap.is_collected(9));
    }

    #[test]
    fn test_presence_round_trip() {
        let mut points = BTreeMap::new();
        for i in 0..13u8 {
            points.insert(Coord::new(i / 4, i % 4 * 2), i % 3 != 0);
        }

        let bitmap = PointsBitmap::from_presence(&points);

        for (index, present) in points.values().enumerate() {
            assert_eq!(bitmap.is_collected(index), !present, "point {}", index);
        }
        for index in points.len()..MAX_POINTS {
            assert!(!bitmap.is_collected(index));
        }
        assert_eq!(bitmap.collected_count(), 5);
    }

    #[test]
    fn test_presence_uses_row_major_order() {
        let mut points = BTreeMap::new();
        points.insert(Coord::new(1, 0), true);
        points.insert(Coord::new(0, 9), false);

        // (0, 9) comes first even though it was inserted second
        let bitmap = PointsBitmap::from_presence(&points);
        assert_eq!(bitmap.as_bytes()[0], 0x80);
    }

    #[test]
    fn test_full_bitmap() {
        let bitmap = PointsBitmap::from_collected(std::iter::repeat(true).take(50));
        assert_eq!(bitmap.as_bytes(), &[0xFF; POINTS_BITMAP_LEN]);
        assert_eq!(bitmap.collected_count(), 40);
        assert!(!bitmap.is_collected(40));
    }
}
