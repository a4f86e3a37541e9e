use std::ops::AddAssign;

use crate::math::Vec3;

/// Axis-aligned bounding box.
///
/// The empty box has `min = +inf` and `max = -inf`, so that the union with any
/// point or box yields that point or box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for BBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl BBox {
    pub const fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Extent along each axis; zero for an empty box.
    pub fn size(&self) -> Vec3 {
        (self.max - self.min).max(Vec3::ZERO)
    }

    pub fn center(&self) -> Vec3 {
        (self.max + self.min) / 2.0
    }
}

impl AddAssign<Vec3> for BBox {
    fn add_assign(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }
}

impl AddAssign<BBox> for BBox {
    fn add_assign(&mut self, other: BBox) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_box_has_zero_size() {
        let b = BBox::empty();
        assert!(b.is_empty());
        assert_eq!(b.size(), Vec3::ZERO);
    }

    #[test]
    fn union_with_points_and_boxes() {
        let mut a = BBox::empty();
        a += Vec3::new(1.0, 2.0, 3.0);
        assert!(!a.is_empty());
        assert_eq!(a.size(), Vec3::ZERO);

        let mut b = BBox::empty();
        b += Vec3::new(-1.0, 0.0, 5.0);
        a += b;
        assert_eq!(a.min, Vec3::new(-1.0, 0.0, 3.0));
        assert_eq!(a.max, Vec3::new(1.0, 2.0, 5.0));
        assert_eq!(a.center(), Vec3::new(0.0, 1.0, 4.0));
    }

    #[test]
    fn union_with_empty_is_identity() {
        let mut a = BBox::empty();
        a += Vec3::ONE;
        let before = a;
        a += BBox::empty();
        assert_eq!(a, before);
    }
}
