#![allow(missing_docs)]
//! Types for representing simulated time, data sizes, and bandwidth.

use ordered_float::OrderedFloat;

macro_rules! unit_u64 {
    ($name: ident) => {
        #[derive(
            Debug,
            Default,
            Copy,
            Clone,
            PartialOrd,
            Ord,
            PartialEq,
            Eq,
            Hash,
            derive_more::Add,
            derive_more::Sub,
            derive_more::AddAssign,
            derive_more::SubAssign,
            derive_more::Sum,
            derive_more::FromStr,
            serde::Serialize,
            serde::Deserialize,
        )]
        pub struct $name(u64);

        impl $name {
            pub const ZERO: $name = Self::new(0);
            pub const ONE: $name = Self::new(1);
            pub const MAX: $name = Self::new(u64::MAX);

            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn into_u64(self) -> u64 {
                self.0
            }

            pub const fn into_f64(self) -> f64 {
                self.0 as f64
            }

            pub const fn into_usize(self) -> usize {
                self.0 as usize
            }
        }

        impl From<$name> for f64 {
            fn from(val: $name) -> Self {
                val.into_f64()
            }
        }
    };
}

macro_rules! unit_f64 {
    ($name: ident) => {
        #[derive(
            Debug,
            Default,
            Copy,
            Clone,
            PartialOrd,
            Ord,
            PartialEq,
            Eq,
            Hash,
            derive_more::Add,
            derive_more::Sub,
            derive_more::AddAssign,
            derive_more::SubAssign,
            serde::Serialize,
            serde::Deserialize,
        )]
        pub struct $name(OrderedFloat<f64>);

        impl $name {
            pub const ZERO: $name = Self::new(0.0);

            pub const fn new(value: f64) -> Self {
                Self(OrderedFloat(value))
            }

            pub fn into_f64(self) -> f64 {
                self.0.into_inner()
            }

            pub fn is_finite(self) -> bool {
                self.into_f64().is_finite()
            }
        }

        impl From<$name> for f64 {
            fn from(val: $name) -> Self {
                val.into_f64()
            }
        }
    };
}

/// A size, in bytes.
unit_u64!(Bytes);

impl std::fmt::Display for Bytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}B", self.0)
    }
}

/// A simulated point in time or a duration, in seconds.
///
/// Wraps an [`OrderedFloat`] rather than a bare `f64` so that `Seconds` can be used as a
/// priority-queue key and, via [`Event`](crate::event::Event), as a hashable dedup key.
unit_f64!(Seconds);

impl Seconds {
    /// Returns `self + other`, but never below [`Seconds::ZERO`].
    pub fn saturating_add(self, other: Self) -> Self {
        Self::new((self.into_f64() + other.into_f64()).max(0.0))
    }
}

impl std::fmt::Display for Seconds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s", self.into_f64())
    }
}

/// A bandwidth, in bits per simulated second. May be [`BitsPerSec::INFINITE`] to model a link
/// with zero serialization delay.
unit_f64!(BitsPerSec);

impl BitsPerSec {
    /// A bandwidth of positive infinity: transmitting any number of bytes takes zero time.
    pub const INFINITE: BitsPerSec = Self::new(f64::INFINITY);

    /// The amount of simulated time it takes to serialize `size` at this bandwidth.
    ///
    /// Returns [`Seconds::ZERO`] when `self` is [`BitsPerSec::INFINITE`].
    pub fn serialization_time(&self, size: Bytes) -> Seconds {
        if *self == BitsPerSec::INFINITE {
            return Seconds::ZERO;
        }
        assert!(self.into_f64() > 0.0, "bandwidth must be strictly positive");
        let bits = size.into_f64() * 8.0;
        Seconds::new(bits / self.into_f64())
    }
}

impl std::fmt::Display for BitsPerSec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if *self == BitsPerSec::INFINITE {
            write!(f, "inf bps")
        } else {
            write!(f, "{}bps", self.into_f64())
        }
    }
}
