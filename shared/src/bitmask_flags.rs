use std::{fmt, marker::PhantomData};

use num_traits::{One, PrimInt, Zero};

/// Trait implemented by flag enums declared with [`define_bitmask_flags!`].
///
/// The enum's discriminant (via `#[repr(u8)]`) determines the bit index.
/// The backing integer type is chosen via the associated `Storage`.
pub trait FlagBitmask {
    type Storage: PrimInt;

    fn bit_index(&self) -> u8;

    fn mask(&self) -> Self::Storage {
        // NOTE: `bit_index()` must be < number of bits in `Storage`.
        Self::Storage::one() << (self.bit_index() as usize)
    }
}

/// A small set of flags of one enum `F`, packed into `F::Storage`.
///
/// Sets of different flag enums are different types, so a `Feature` cannot
/// be added to a set of `MoveAction`s.
pub struct BitmaskFlags<F: FlagBitmask> {
    pub bits: F::Storage,
    _flags: PhantomData<fn() -> F>,
}

impl<F: FlagBitmask> BitmaskFlags<F> {
    pub fn new(bits: F::Storage) -> Self {
        Self {
            bits,
            _flags: PhantomData,
        }
    }

    pub fn from_slice(tags: &[F]) -> Self
    where
        F: Copy,
    {
        let mut flags = Self::default();
        flags.add_many(tags);
        flags
    }

    pub fn add(&mut self, tag: F) {
        self.bits = self.bits | tag.mask();
    }

    pub fn remove(&mut self, tag: F) {
        self.bits = self.bits & !tag.mask();
    }

    /// Add or remove `tag` depending on `on`.
    pub fn set(&mut self, tag: F, on: bool) {
        if on {
            self.add(tag);
        } else {
            self.remove(tag);
        }
    }

    pub fn has(&self, tag: F) -> bool {
        (self.bits & tag.mask()) != F::Storage::zero()
    }

    pub fn add_many(&mut self, tags: &[F])
    where
        F: Copy,
    {
        for &tag in tags {
            self.add(tag);
        }
    }

    pub fn has_any(&self, tags: &[F]) -> bool {
        if tags.is_empty() {
            return false;
        }
        let combined = tags
            .iter()
            .fold(F::Storage::zero(), |acc, t| acc | t.mask());
        (self.bits & combined) != F::Storage::zero()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits == F::Storage::zero()
    }

    pub fn clear(&mut self) {
        self.bits = F::Storage::zero();
    }
}

impl<F: FlagBitmask> Default for BitmaskFlags<F> {
    fn default() -> Self {
        Self::new(F::Storage::zero())
    }
}

impl<F: FlagBitmask> Clone for BitmaskFlags<F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F: FlagBitmask> Copy for BitmaskFlags<F> {}

impl<F: FlagBitmask> PartialEq for BitmaskFlags<F> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<F: FlagBitmask> Eq for BitmaskFlags<F> {}

impl<F: FlagBitmask> fmt::Debug for BitmaskFlags<F>
where
    F::Storage: fmt::Binary,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitmaskFlags({:#010b})", self.bits)
    }
}

/// Declare a bitmask-backed enum and implement `FlagBitmask` for it.
///
/// Example:
/// ```rust
/// crypt_shared::define_bitmask_flags!(Toggle, u8, {
///     Fog,
///     Music,
/// });
/// ```
#[macro_export]
macro_rules! define_bitmask_flags {
    ($name:ident, $storage:ty, { $($(#[$meta:meta])* $variant:ident),* $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum $name {
            $($(#[$meta])* $variant),*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),*];
        }

        impl $crate::bitmask_flags::FlagBitmask for $name {
            type Storage = $storage;

            fn bit_index(&self) -> u8 {
                *self as u8
            }
        }
    };
}

define_bitmask_flags!(MoveAction, u8, {
    Forward,
    Back,
    Left,
    Right,
    Interact,
});

define_bitmask_flags!(Feature, u8, {
    /// Stronger damping while standing on a floor.
    GroundDetection,
    /// Report the nearest point of interest every frame.
    PoiProximity,
});

/// Logical actions currently held down.
pub type ActionSet = BitmaskFlags<MoveAction>;

/// Optional controller behaviors.
///
/// ```compile_fail
/// use crypt_shared::{FeatureSet, MoveAction};
/// let mut features = FeatureSet::default();
/// features.add(MoveAction::Forward);
/// ```
pub type FeatureSet = BitmaskFlags<Feature>;
