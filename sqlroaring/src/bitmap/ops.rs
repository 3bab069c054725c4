use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Sub, SubAssign};

use crate::container::Container;

use super::Bitmap;

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let cardinality = self.cardinality();
        match (self.minimum(), self.maximum()) {
            (Some(min), Some(max)) if cardinality >= 32 => write!(
                f,
                "Bitmap<{:?} values between {:?} and {:?}>",
                cardinality, min, max
            ),
            _ => write!(f, "Bitmap<{:?}>", self.to_vec()),
        }
    }
}

fn same_members(lhs: &Container, rhs: &Container) -> bool {
    match (lhs, rhs) {
        (Container::Array(a), Container::Array(b)) => a == b,
        (Container::Bitmap(a), Container::Bitmap(b)) => a == b,
        (Container::Run(a), Container::Run(b)) => a == b,
        _ => lhs.len() == rhs.len() && lhs.iter().eq(rhs.iter()),
    }
}

impl PartialEq for Bitmap {
    /// Two bitmaps are equal when they hold the same members, whatever
    /// representation their containers use
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let mut bitmap1: Bitmap = (0..10_000).collect();
    /// let bitmap2 = bitmap1.clone();
    /// bitmap1.run_optimize();
    ///
    /// assert_eq!(bitmap1, bitmap2);
    /// ```
    fn eq(&self, other: &Bitmap) -> bool {
        let (lhs, rhs) = (self.containers(), other.containers());
        lhs.len() == rhs.len()
            && lhs
                .iter()
                .zip(rhs)
                .all(|((k1, c1), (k2, c2))| k1 == k2 && same_members(c1, c2))
    }
}

impl Eq for Bitmap {}

impl BitAnd for Bitmap {
    type Output = Bitmap;

    /// Syntactic sugar for `.and`
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let mut bitmap1 = Bitmap::create();
    /// bitmap1.add(1);
    ///
    /// let mut bitmap2 = Bitmap::create();
    /// bitmap2.add(1);
    /// bitmap2.add(2);
    ///
    /// let bitmap3 = bitmap1 & bitmap2;
    ///
    /// assert!(bitmap3.contains(1));
    /// assert!(!bitmap3.contains(2));
    /// ```
    #[inline]
    fn bitand(mut self, other: Bitmap) -> Bitmap {
        self.and_inplace(&other);
        self
    }
}

impl<'a> BitAnd<&'a Bitmap> for Bitmap {
    type Output = Bitmap;

    #[inline]
    fn bitand(mut self, other: &'a Bitmap) -> Bitmap {
        self.and_inplace(other);
        self
    }
}

impl<'a, 'b> BitAnd<&'a Bitmap> for &'b Bitmap {
    type Output = Bitmap;

    /// Syntactic sugar for `.and`
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[1, 2, 3]);
    /// let bitmap2 = Bitmap::of(&[2, 3, 4]);
    ///
    /// assert_eq!((&bitmap1 & &bitmap2).to_vec(), [2, 3]);
    /// ```
    #[inline]
    fn bitand(self, other: &'a Bitmap) -> Bitmap {
        self.and(other)
    }
}

impl BitAndAssign for Bitmap {
    /// Syntactic sugar for `.and_inplace`
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let mut bitmap1 = Bitmap::of(&[15]);
    /// let bitmap2 = Bitmap::of(&[25]);
    /// let mut bitmap3 = Bitmap::of(&[15]);
    /// let bitmap4 = Bitmap::of(&[15, 25]);
    ///
    /// bitmap1 &= bitmap2;
    ///
    /// assert!(bitmap1.cardinality() == 0);
    /// assert!(!bitmap1.contains(15));
    /// assert!(!bitmap1.contains(25));
    ///
    /// bitmap3 &= bitmap4;
    ///
    /// assert!(bitmap3.cardinality() == 1);
    /// assert!(bitmap3.contains(15));
    /// assert!(!bitmap3.contains(25));
    /// ```
    #[inline]
    fn bitand_assign(&mut self, other: Bitmap) {
        self.and_inplace(&other);
    }
}

impl<'a> BitAndAssign<&'a Bitmap> for Bitmap {
    #[inline]
    fn bitand_assign(&mut self, other: &'a Bitmap) {
        self.and_inplace(other);
    }
}

impl BitOr for Bitmap {
    type Output = Bitmap;

    /// Syntatic sugar for `.or`
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[15]);
    /// let bitmap2 = Bitmap::of(&[25]);
    ///
    /// let bitmap3 = bitmap1 | bitmap2;
    ///
    /// assert!(bitmap3.cardinality() == 2);
    /// assert!(bitmap3.contains(15));
    /// assert!(bitmap3.contains(25));
    /// ```
    #[inline]
    fn bitor(mut self, other: Bitmap) -> Bitmap {
        self.or_inplace(&other);
        self
    }
}

impl<'a> BitOr<&'a Bitmap> for Bitmap {
    type Output = Bitmap;

    #[inline]
    fn bitor(mut self, other: &'a Bitmap) -> Bitmap {
        self.or_inplace(other);
        self
    }
}

impl<'a, 'b> BitOr<&'a Bitmap> for &'b Bitmap {
    type Output = Bitmap;

    #[inline]
    fn bitor(self, other: &'a Bitmap) -> Bitmap {
        self.or(other)
    }
}

impl BitOrAssign for Bitmap {
    /// Syntatic sugar for `.or_inplace`
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let mut bitmap1 = Bitmap::of(&[15]);
    /// let bitmap2 = Bitmap::of(&[25]);
    ///
    /// bitmap1 |= bitmap2;
    ///
    /// assert!(bitmap1.cardinality() == 2);
    /// assert!(bitmap1.contains(15));
    /// assert!(bitmap1.contains(25));
    /// ```
    #[inline]
    fn bitor_assign(&mut self, other: Bitmap) {
        self.or_inplace(&other);
    }
}

impl<'a> BitOrAssign<&'a Bitmap> for Bitmap {
    #[inline]
    fn bitor_assign(&mut self, other: &'a Bitmap) {
        self.or_inplace(other);
    }
}

impl BitXor for Bitmap {
    type Output = Bitmap;

    /// Syntatic sugar for `.xor`
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[15, 25]);
    /// let bitmap2 = Bitmap::of(&[25, 35]);
    ///
    /// let bitmap3 = bitmap1 ^ bitmap2;
    ///
    /// assert!(bitmap3.cardinality() == 2);
    /// assert!(bitmap3.contains(15));
    /// assert!(!bitmap3.contains(25));
    /// assert!(bitmap3.contains(35));
    /// ```
    #[inline]
    fn bitxor(mut self, other: Bitmap) -> Bitmap {
        self.xor_inplace(&other);
        self
    }
}

impl<'a> BitXor<&'a Bitmap> for Bitmap {
    type Output = Bitmap;

    #[inline]
    fn bitxor(mut self, other: &'a Bitmap) -> Bitmap {
        self.xor_inplace(other);
        self
    }
}

impl<'a, 'b> BitXor<&'a Bitmap> for &'b Bitmap {
    type Output = Bitmap;

    #[inline]
    fn bitxor(self, other: &'a Bitmap) -> Bitmap {
        self.xor(other)
    }
}

impl BitXorAssign for Bitmap {
    /// Syntatic sugar for `.xor_inplace`
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let mut bitmap1 = Bitmap::of(&[15, 25]);
    /// let bitmap2 = Bitmap::of(&[25, 35]);
    ///
    /// bitmap1 ^= bitmap2;
    ///
    /// assert!(bitmap1.cardinality() == 2);
    /// assert!(bitmap1.contains(15));
    /// assert!(!bitmap1.contains(25));
    /// assert!(bitmap1.contains(35));
    /// ```
    #[inline]
    fn bitxor_assign(&mut self, other: Bitmap) {
        self.xor_inplace(&other);
    }
}

impl<'a> BitXorAssign<&'a Bitmap> for Bitmap {
    #[inline]
    fn bitxor_assign(&mut self, other: &'a Bitmap) {
        self.xor_inplace(other);
    }
}

impl Sub for Bitmap {
    type Output = Bitmap;

    /// Syntatic sugar for `.andnot`
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[15, 25]);
    /// let bitmap2 = Bitmap::of(&[25, 35]);
    ///
    /// let bitmap3 = bitmap1 - bitmap2;
    ///
    /// assert_eq!(bitmap3.cardinality(), 1);
    /// assert!(bitmap3.contains(15));
    /// assert!(!bitmap3.contains(25));
    /// assert!(!bitmap3.contains(35));
    /// ```
    #[inline]
    fn sub(mut self, other: Bitmap) -> Bitmap {
        self.andnot_inplace(&other);
        self
    }
}

impl<'a> Sub<&'a Bitmap> for Bitmap {
    type Output = Bitmap;

    #[inline]
    fn sub(mut self, other: &'a Bitmap) -> Bitmap {
        self.andnot_inplace(other);
        self
    }
}

impl<'a, 'b> Sub<&'a Bitmap> for &'b Bitmap {
    type Output = Bitmap;

    #[inline]
    fn sub(self, other: &'a Bitmap) -> Bitmap {
        self.andnot(other)
    }
}

impl SubAssign for Bitmap {
    /// Syntatic sugar for `.andnot_inplace`
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlroaring::Bitmap;
    ///
    /// let mut bitmap1 = Bitmap::of(&[15, 25]);
    /// let bitmap2 = Bitmap::of(&[25, 35]);
    ///
    /// bitmap1 -= bitmap2;
    ///
    /// assert_eq!(bitmap1.cardinality(), 1);
    /// assert!(bitmap1.contains(15));
    /// assert!(!bitmap1.contains(25));
    /// assert!(!bitmap1.contains(35));
    /// ```
    #[inline]
    fn sub_assign(&mut self, other: Bitmap) {
        self.andnot_inplace(&other);
    }
}

impl<'a> SubAssign<&'a Bitmap> for Bitmap {
    #[inline]
    fn sub_assign(&mut self, other: &'a Bitmap) {
        self.andnot_inplace(other);
    }
}
