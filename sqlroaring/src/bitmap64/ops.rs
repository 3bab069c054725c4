use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Sub, SubAssign};

use super::Bitmap64;

impl fmt::Debug for Bitmap64 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let cardinality = self.cardinality();
        match (self.minimum(), self.maximum()) {
            (Some(min), Some(max)) if cardinality >= 32 => write!(
                f,
                "Bitmap64<{:?} values between {:?} and {:?}>",
                cardinality, min, max
            ),
            _ => write!(f, "Bitmap64<{:?}>", self.to_vec()),
        }
    }
}

impl From<&'_ [u64]> for Bitmap64 {
    #[inline]
    fn from(values: &[u64]) -> Self {
        Self::of(values)
    }
}

impl<const N: usize> From<[u64; N]> for Bitmap64 {
    #[inline]
    fn from(values: [u64; N]) -> Self {
        Self::of(&values)
    }
}

/// Implements a binary operator for owned and borrowed operands; an owned
/// left side is updated in place
macro_rules! impl_binop {
    (
        $(#[$attr:meta])*
        impl $trait_name:ident, $fn_name:ident => $method:ident, $inplace:ident
    ) => {
        impl $trait_name for Bitmap64 {
            type Output = Bitmap64;

            $(#[$attr])*
            #[inline]
            fn $fn_name(mut self, other: Bitmap64) -> Bitmap64 {
                self.$inplace(&other);
                self
            }
        }

        impl $trait_name<&Bitmap64> for Bitmap64 {
            type Output = Bitmap64;

            #[inline]
            fn $fn_name(mut self, other: &Bitmap64) -> Bitmap64 {
                self.$inplace(other);
                self
            }
        }

        impl $trait_name<&Bitmap64> for &Bitmap64 {
            type Output = Bitmap64;

            #[inline]
            fn $fn_name(self, other: &Bitmap64) -> Bitmap64 {
                self.$method(other)
            }
        }
    };
}

macro_rules! impl_binop_assign {
    (
        $(#[$attr:meta])*
        impl $trait_name:ident, $fn_name:ident => $inplace:ident
    ) => {
        impl $trait_name for Bitmap64 {
            $(#[$attr])*
            #[inline]
            fn $fn_name(&mut self, other: Bitmap64) {
                self.$inplace(&other)
            }
        }

        impl $trait_name<&Bitmap64> for Bitmap64 {
            #[inline]
            fn $fn_name(&mut self, other: &Bitmap64) {
                self.$inplace(other)
            }
        }
    };
}

impl_binop! {
    /// Syntactic sugar for `.and`
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let bitmap1 = Bitmap64::of(&[1, 1 << 40]);
    /// let bitmap2 = Bitmap64::of(&[1, 2]);
    ///
    /// let bitmap3 = &bitmap1 & &bitmap2;
    /// assert_eq!(bitmap3.to_vec(), [1]);
    ///
    /// let bitmap4 = bitmap1 & bitmap2;
    /// assert_eq!(bitmap3, bitmap4);
    /// ```
    impl BitAnd, bitand => and, and_inplace
}

impl_binop! {
    /// Syntatic sugar for `.or`
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let bitmap1 = Bitmap64::of(&[15]);
    /// let bitmap2 = Bitmap64::of(&[u64::MAX]);
    ///
    /// let bitmap3 = bitmap1 | bitmap2;
    ///
    /// assert_eq!(bitmap3.cardinality(), 2);
    /// assert!(bitmap3.contains(15));
    /// assert!(bitmap3.contains(u64::MAX));
    /// ```
    impl BitOr, bitor => or, or_inplace
}

impl_binop! {
    /// Syntatic sugar for `.xor`
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let bitmap1 = Bitmap64::of(&[15, 25]);
    /// let bitmap2 = Bitmap64::of(&[25, 35]);
    ///
    /// assert_eq!((bitmap1 ^ bitmap2).to_vec(), [15, 35]);
    /// ```
    impl BitXor, bitxor => xor, xor_inplace
}

impl_binop! {
    /// Syntatic sugar for `.andnot`
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let bitmap1 = Bitmap64::of(&[15, 25]);
    /// let bitmap2 = Bitmap64::of(&[25, 35]);
    ///
    /// assert_eq!((&bitmap1 - &bitmap2).to_vec(), [15]);
    /// ```
    impl Sub, sub => andnot, andnot_inplace
}

impl_binop_assign! {
    /// Syntactic sugar for `.and_inplace`
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let mut bitmap1 = Bitmap64::of(&[15]);
    /// let bitmap2 = Bitmap64::of(&[25]);
    ///
    /// bitmap1 &= bitmap2;
    ///
    /// assert!(bitmap1.is_empty());
    /// ```
    impl BitAndAssign, bitand_assign => and_inplace
}

impl_binop_assign! {
    /// Syntatic sugar for `.or_inplace`
    impl BitOrAssign, bitor_assign => or_inplace
}

impl_binop_assign! {
    /// Syntatic sugar for `.xor_inplace`
    impl BitXorAssign, bitxor_assign => xor_inplace
}

impl_binop_assign! {
    /// Syntatic sugar for `.andnot_inplace`
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap64;
    ///
    /// let mut bitmap1 = Bitmap64::of(&[15, 1 << 33]);
    /// bitmap1 -= &Bitmap64::of(&[1 << 33]);
    ///
    /// assert_eq!(bitmap1.to_vec(), [15]);
    /// ```
    impl SubAssign, sub_assign => andnot_inplace
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output() {
        assert_eq!(format!("{:?}", Bitmap64::of(&[1, 2])), "Bitmap64<[1, 2]>");
        let large: Bitmap64 = (0..100).collect();
        assert_eq!(
            format!("{:?}", large),
            "Bitmap64<100 values between 0 and 99>"
        );
    }

    #[test]
    fn from_array() {
        assert_eq!(Bitmap64::from([3, 1]), Bitmap64::of(&[1, 3]));
    }
}
