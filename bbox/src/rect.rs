use super::TLBR;
use crate::{common::*, HW};

/// The generic rectangle in image coordinates.
///
/// The `t`/`b` edges run along the y axis and `l`/`r` edges along the x axis.
pub trait Rect {
    type Type;

    fn t(&self) -> Self::Type;
    fn l(&self) -> Self::Type;
    fn b(&self) -> Self::Type;
    fn r(&self) -> Self::Type;
    fn h(&self) -> Self::Type;
    fn w(&self) -> Self::Type;

    fn try_from_tlbr(tlbr: [Self::Type; 4]) -> Result<Self>
    where
        Self: Sized;
}

pub trait RectNum: Rect
where
    Self::Type: Num + PartialOrd,
{
    fn from_tlbr(tlbr: [Self::Type; 4]) -> Self
    where
        Self: Sized,
    {
        Self::try_from_tlbr(tlbr).unwrap()
    }

    fn tlbr(&self) -> [Self::Type; 4] {
        [self.t(), self.l(), self.b(), self.r()]
    }

    fn hw(&self) -> [Self::Type; 2] {
        [self.h(), self.w()]
    }

    fn size(&self) -> HW<Self::Type>
    where
        Self::Type: Copy,
    {
        HW::from_hw(self.hw())
    }

    /// Check if the rectangle has strictly positive height and width.
    fn is_proper(&self) -> bool {
        self.b() > self.t() && self.r() > self.l()
    }

    fn area(&self) -> <Self::Type as Mul<Self::Type>>::Output
    where
        Self::Type: Mul<Self::Type>,
    {
        self.h() * self.w()
    }
}

pub trait RectFloat: RectNum
where
    Self::Type: Float,
{
    fn intersect_with<R>(&self, other: &R) -> Option<TLBR<Self::Type>>
    where
        R: Rect<Type = Self::Type>,
    {
        let t = self.t().max(other.t());
        let l = self.l().max(other.l());
        let b = self.b().min(other.b());
        let r = self.r().min(other.r());
        (b > t && r > l).then(|| TLBR { t, l, b, r })
    }

    fn intersection_area_with<R>(&self, other: &R) -> Self::Type
    where
        R: Rect<Type = Self::Type>,
    {
        self.intersect_with(other)
            .map(|rect| rect.area())
            .unwrap_or_else(Self::Type::zero)
    }

    /// The fraction of `other`'s own area that falls inside this rectangle.
    ///
    /// The denominator is the area of `other` alone, not the union, so a small
    /// box fully inside a large region scores 1.0. A zero-area `other` scores 0.0.
    fn coverage_of<R>(&self, other: &R) -> Self::Type
    where
        R: Rect<Type = Self::Type>,
    {
        let other_area = other.area();
        if other_area <= Self::Type::zero() {
            return Self::Type::zero();
        }
        self.intersection_area_with(other) / other_area
    }

    /// Clamp each edge into the `[0, h] x [0, w]` extent.
    fn clamp_within(&self, extent: &HW<Self::Type>) -> TLBR<Self::Type> {
        let zero = Self::Type::zero();
        let clamp = |value: Self::Type, max: Self::Type| value.max(zero).min(max);
        TLBR {
            t: clamp(self.t(), extent.h()),
            l: clamp(self.l(), extent.w()),
            b: clamp(self.b(), extent.h()),
            r: clamp(self.r(), extent.w()),
        }
    }
}

impl<T> RectNum for T
where
    T: Rect,
    T::Type: Num + PartialOrd,
{
}

impl<T> RectFloat for T
where
    T: Rect,
    T::Type: Float,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn rect_intersection() {
        let lhs = TLBR::from_tlbr([0.0, 0.0, 100.0, 100.0]);
        let rhs = TLBR::from_tlbr([50.0, 50.0, 200.0, 200.0]);
        assert_eq!(
            lhs.intersect_with(&rhs),
            Some(TLBR::from_tlbr([50.0, 50.0, 100.0, 100.0]))
        );
        assert_abs_diff_eq!(lhs.intersection_area_with(&rhs), 2500.0);

        let far = TLBR::from_tlbr([300.0, 300.0, 400.0, 400.0]);
        assert_eq!(lhs.intersect_with(&far), None);
        assert_abs_diff_eq!(lhs.intersection_area_with(&far), 0.0);
    }

    #[test]
    fn rect_coverage_of_other_area() {
        let window = TLBR::from_tlbr([0.0, 0.0, 100.0, 100.0]);
        let partial = TLBR::from_tlbr([50.0, 50.0, 200.0, 200.0]);
        let inner = TLBR::from_tlbr([40.0, 40.0, 90.0, 90.0]);

        assert_abs_diff_eq!(window.coverage_of(&partial), 2500.0 / 22500.0);
        assert_abs_diff_eq!(window.coverage_of(&inner), 1.0);
        assert_abs_diff_eq!(inner.coverage_of(&window), 0.25);
    }

    #[test]
    fn rect_coverage_of_empty_rect() {
        let window = TLBR::from_tlbr([0.0, 0.0, 100.0, 100.0]);
        let flat = TLBR::from_tlbr([10.0, 10.0, 10.0, 50.0]);
        assert_abs_diff_eq!(window.coverage_of(&flat), 0.0);
        assert_abs_diff_eq!(flat.intersection_area_with(&window), 0.0);
    }

    #[test]
    fn rect_clamp() {
        let rect = TLBR::from_tlbr([-5.0, -10.0, 40.0, 60.0]);
        let clamped = rect.clamp_within(&HW::from_hw([50.0, 50.0]));
        assert_eq!(clamped.tlbr(), [0.0, 0.0, 40.0, 50.0]);
    }

    #[test]
    fn rect_proper() {
        assert!(TLBR::from_tlbr([0.0, 0.0, 1.0, 1.0]).is_proper());
        assert!(!TLBR::from_tlbr([0.0, 0.0, 0.0, 1.0]).is_proper());
    }
}
