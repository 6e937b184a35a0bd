//! String interning for type and member names.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use std::fmt;

/// An interned type or member name.
///
/// `Name` is a `u32` handle; the string lives in the [`Interner`] that
/// produced it. The symbol index keys every table by `Name`, so a lookup
/// key like (owner type, member) is two integers instead of two strings.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Name(u32);

impl Name {
    #[inline]
    pub(crate) const fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Get the raw index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

/// String interner shared by everything that builds index keys.
///
/// Thread-safe via internal locking. Interning is insert-only: a name stays
/// valid for the lifetime of the interner, which is one run.
#[derive(Default)]
pub struct Interner {
    inner: RwLock<InternerInner>,
}

#[derive(Default)]
struct InternerInner {
    map: FxHashMap<SmolStr, u32>,
    strings: Vec<SmolStr>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its `Name`.
    pub fn intern(&self, s: &str) -> Name {
        if let Some(name) = self.find(s) {
            return name;
        }

        let mut inner = self.inner.write();
        // Another writer may have won the race between the two locks.
        if let Some(&index) = inner.map.get(s) {
            return Name::from_raw(index);
        }

        let smol = SmolStr::new(s);
        let index = inner.strings.len() as u32;
        inner.strings.push(smol.clone());
        inner.map.insert(smol, index);
        Name::from_raw(index)
    }

    /// Look up the `Name` of an already interned string without inserting.
    ///
    /// Queries use this so that asking about an unknown type never grows
    /// the interner.
    pub fn find(&self, s: &str) -> Option<Name> {
        self.inner.read().map.get(s).map(|&index| Name::from_raw(index))
    }

    /// Look up the string for a `Name`.
    ///
    /// Returns `None` if the `Name` was created by a different interner.
    pub fn lookup(&self, name: Name) -> Option<SmolStr> {
        self.inner.read().strings.get(name.0 as usize).cloned()
    }

    /// Look up the string for a `Name`, falling back to an empty string for
    /// foreign names.
    pub fn resolve(&self, name: Name) -> SmolStr {
        self.lookup(name).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Interner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interner")
            .field("count", &self.len())
            .finish()
    }
}
