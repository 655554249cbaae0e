//! Labeled boxes and class name bookkeeping.

mod class_map;
pub use class_map::*;

use bbox::{Rect, Transform, TLBR};
use num_traits::Num;
use std::ops::Mul;

/// A rectangle tagged with a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label<R, C>
where
    R: Rect,
{
    pub rect: R,
    pub class: C,
}

impl<'a, T, C> Mul<&'a Label<TLBR<T>, C>> for &'a Transform<T>
where
    T: Copy + Num + PartialOrd,
    C: Copy,
{
    type Output = Label<TLBR<T>, C>;

    fn mul(self, rhs: &'a Label<TLBR<T>, C>) -> Self::Output {
        Label {
            rect: self * &rhs.rect,
            class: rhs.class,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bbox::RectNum;

    #[test]
    fn transform_keeps_class() {
        let label = Label {
            rect: TLBR::from_tlbr([10.0, 20.0, 30.0, 40.0]),
            class: 3usize,
        };
        let moved = &Transform::to_local_frame(10.0, 20.0) * &label;
        assert_eq!(moved.rect.tlbr(), [0.0, 0.0, 20.0, 20.0]);
        assert_eq!(moved.class, 3);
    }
}
