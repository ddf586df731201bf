use num_traits::{One, PrimInt, Zero};

/// Trait implemented by flag enums declared with [`define_flags!`].
///
/// The enum's discriminant (via `#[repr(u8)]`) is the bit index. The backing
/// integer is chosen through the associated `Storage`.
pub trait Flag: Copy {
    type Storage: PrimInt + std::fmt::Debug + std::hash::Hash;

    fn bit_index(self) -> u8;

    fn mask(self) -> Self::Storage {
        // NOTE: `bit_index()` must stay below the bit width of `Storage`.
        Self::Storage::one() << (self.bit_index() as usize)
    }
}

/// A typed set of [`Flag`]s packed into one integer.
///
/// `F` pins the set to a single flag enum so pair flags and debug flags can't
/// be mixed up, while the storage stays a plain integer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FlagSet<F: Flag> {
    bits: F::Storage,
}

impl<F: Flag> Default for FlagSet<F> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<F: Flag> FlagSet<F> {
    pub fn empty() -> Self {
        Self {
            bits: F::Storage::zero(),
        }
    }

    pub fn from_bits(bits: F::Storage) -> Self {
        Self { bits }
    }

    pub fn of(flags: &[F]) -> Self {
        let mut set = Self::empty();
        for &flag in flags {
            set.insert(flag);
        }
        set
    }

    pub fn bits(&self) -> F::Storage {
        self.bits
    }

    pub fn insert(&mut self, flag: F) {
        self.bits = self.bits | flag.mask();
    }

    pub fn remove(&mut self, flag: F) {
        self.bits = self.bits & !flag.mask();
    }

    /// Builder-style [`FlagSet::insert`].
    pub fn with(mut self, flag: F) -> Self {
        self.insert(flag);
        self
    }

    pub fn contains(&self, flag: F) -> bool {
        (self.bits & flag.mask()) != F::Storage::zero()
    }

    pub fn contains_all(&self, other: Self) -> bool {
        (self.bits & other.bits) == other.bits
    }

    pub fn intersects(&self, other: Self) -> bool {
        (self.bits & other.bits) != F::Storage::zero()
    }

    pub fn is_empty(&self) -> bool {
        self.bits == F::Storage::zero()
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    pub fn clear(&mut self) {
        self.bits = F::Storage::zero();
    }
}

impl<F: Flag> std::ops::BitOr for FlagSet<F> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl<F: Flag> From<F> for FlagSet<F> {
    fn from(flag: F) -> Self {
        Self::empty().with(flag)
    }
}

/// Declare a flag enum and implement [`Flag`] for it.
///
/// ```ignore
/// define_flags!(SceneDebugFlag, u8, {
///     TransmitConstraints,
///     TransmitContacts,
/// });
/// ```
#[macro_export]
macro_rules! define_flags {
    ($(#[$meta:meta])* $name:ident, $storage:ty, { $($(#[$vmeta:meta])* $variant:ident),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum $name {
            $($(#[$vmeta])* $variant),*
        }

        impl $crate::flags::Flag for $name {
            type Storage = $storage;

            fn bit_index(self) -> u8 {
                self as u8
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    define_flags!(Probe, u16, { A, B, C });

    #[test]
    fn insert_remove_and_contains() {
        let mut set = FlagSet::<Probe>::empty();
        assert!(set.is_empty());

        set.insert(Probe::B);
        assert!(set.contains(Probe::B));
        assert!(!set.contains(Probe::A));
        assert_eq!(set.bits(), 0b010);

        set.remove(Probe::B);
        assert!(set.is_empty());
    }

    #[test]
    fn contains_all_needs_every_flag() {
        let set = FlagSet::of(&[Probe::A, Probe::C]);
        assert!(set.contains_all(FlagSet::of(&[Probe::A, Probe::C])));
        assert!(!set.contains_all(FlagSet::of(&[Probe::A, Probe::B])));
        assert!(set.intersects(FlagSet::of(&[Probe::B, Probe::C])));
        // The empty set is contained in anything.
        assert!(set.contains_all(FlagSet::empty()));
    }

    #[test]
    fn bitor_unions_sets() {
        let set = FlagSet::from(Probe::A) | FlagSet::from(Probe::C);
        assert_eq!(set.bits(), 0b101);
    }
}
