use super::TLBR;
use crate::common::*;

/// Axis-aligned scale and translation.
///
/// A point `(y, x)` maps to `(y * sy + ty, x * sx + tx)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transform<T> {
    pub sy: T,
    pub sx: T,
    pub ty: T,
    pub tx: T,
}

impl<T> Transform<T>
where
    T: Copy + Num + PartialOrd,
{
    /// The pure translation by `(ty, tx)`.
    pub fn translation(ty: T, tx: T) -> Self {
        Self {
            sy: T::one(),
            sx: T::one(),
            ty,
            tx,
        }
    }
}

impl<T> Transform<T>
where
    T: Copy + Num + PartialOrd + Neg<Output = T>,
{
    /// Map global coordinates into the frame whose origin sits at `(t, l)`.
    pub fn to_local_frame(t: T, l: T) -> Self {
        Self::translation(-t, -l)
    }
}

impl<T> Mul<&TLBR<T>> for &Transform<T>
where
    T: Copy + Num,
{
    type Output = TLBR<T>;

    fn mul(self, rhs: &TLBR<T>) -> Self::Output {
        rhs.transform(self)
    }
}
