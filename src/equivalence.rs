//! Disjoint-set-like equivalence classes over an arbitrary element type (§3 "Equivalence
//! class"). Used by layout and search to group elements that should be treated as one
//! unit; not on the hot path of any `O(log n)` port lookup.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// A class tag. Opaque beyond equality/ordering; callers never construct one directly,
/// they come back from [`Equivalence::class_of`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ClassId(usize);

/// Keeps `elements -> class tag` and `class tag -> set of elements` mutually consistent.
///
/// Removing an element may delete its class if it becomes empty (§3).
#[derive(Clone, Debug, Default)]
pub struct Equivalence<T> {
    class_of: HashMap<T, ClassId>,
    members: HashMap<ClassId, HashSet<T>>,
    next_class: usize,
}

impl<T: Clone + Eq + Hash> Equivalence<T> {
    /// An equivalence relation with no elements.
    pub fn new() -> Self {
        Self {
            class_of: HashMap::new(),
            members: HashMap::new(),
            next_class: 0,
        }
    }

    /// The class tag of `element`, if it has been inserted.
    pub fn class_of(&self, element: &T) -> Option<ClassId> {
        self.class_of.get(element).copied()
    }

    /// All elements equivalent to `element` (including itself), or `None` if `element`
    /// hasn't been inserted.
    pub fn class_members(&self, element: &T) -> Option<&HashSet<T>> {
        let class = self.class_of(element)?;
        self.members.get(&class)
    }

    /// Insert `element` as its own singleton class, if not already present. Returns the
    /// element's class either way.
    pub fn insert(&mut self, element: T) -> ClassId {
        if let Some(class) = self.class_of.get(&element) {
            return *class;
        }
        let class = ClassId(self.next_class);
        self.next_class += 1;
        self.class_of.insert(element.clone(), class);
        self.members.entry(class).or_default().insert(element);
        class
    }

    /// Identify `a` and `b`: after this call they (and everything already equivalent to
    /// either) share one class. Inserts both if absent.
    pub fn union(&mut self, a: T, b: T) {
        let ca = self.insert(a);
        let cb = self.insert(b);
        if ca == cb {
            return;
        }
        self.merge(ca, cb);
    }

    /// Merge two existing classes into one. §9's "second open question" calls out
    /// `Equivalence.merge` as a placeholder in the source; here it is simply the union
    /// step factored out of [`Self::union`] so it can also be used directly on two known
    /// class tags.
    pub fn merge(&mut self, a: ClassId, b: ClassId) {
        if a == b {
            return;
        }
        let Some(moved) = self.members.remove(&b) else {
            return;
        };
        for element in &moved {
            self.class_of.insert(element.clone(), a);
        }
        self.members.entry(a).or_default().extend(moved);
    }

    /// Remove `element` entirely. Deletes its class if it becomes empty.
    pub fn remove(&mut self, element: &T) {
        let Some(class) = self.class_of.remove(element) else {
            return;
        };
        if let Some(set) = self.members.get_mut(&class) {
            set.remove(element);
            if set.is_empty() {
                self.members.remove(&class);
            }
        }
    }

    /// Whether `a` and `b` are in the same class. `false` if either is absent.
    pub fn are_equivalent(&self, a: &T, b: &T) -> bool {
        matches!((self.class_of(a), self.class_of(b)), (Some(x), Some(y)) if x == y)
    }

    /// Number of elements tracked.
    pub fn len(&self) -> usize {
        self.class_of.len()
    }

    /// Whether no elements are tracked.
    pub fn is_empty(&self) -> bool {
        self.class_of.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_classes_by_default() {
        let mut eq: Equivalence<u32> = Equivalence::new();
        eq.insert(1);
        eq.insert(2);
        assert!(!eq.are_equivalent(&1, &2));
    }

    #[test]
    fn union_joins_classes() {
        let mut eq: Equivalence<u32> = Equivalence::new();
        eq.union(1, 2);
        eq.union(2, 3);
        assert!(eq.are_equivalent(&1, &3));
        assert_eq!(eq.class_members(&1).unwrap().len(), 3);
    }

    #[test]
    fn removing_last_member_deletes_class() {
        let mut eq: Equivalence<u32> = Equivalence::new();
        eq.insert(1);
        eq.remove(&1);
        assert_eq!(eq.class_of(&1), None);
        assert_eq!(eq.len(), 0);
    }

    #[test]
    fn removing_one_of_several_keeps_class() {
        let mut eq: Equivalence<u32> = Equivalence::new();
        eq.union(1, 2);
        eq.remove(&1);
        assert!(eq.class_of(&2).is_some());
        assert_eq!(eq.class_members(&2).unwrap().len(), 1);
    }
}
