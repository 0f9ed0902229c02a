//! Ordered collection with staged (deferred) adds and removals.
//!
//! Systems walk a `DeferredList` and stage changes for the items they visit;
//! the staged changes only touch the backing storage at an explicit commit.
//! Staging goes through `&self`, so it is legal in the middle of an `iter()`
//! loop over the same list.
//!
//! Iteration is always filtered: an item staged for removal is skipped from
//! the moment it is staged, including by iterators that are already running.
//! Staged additions stay invisible until `add_commit`. There is no unfiltered
//! view.
//!
//! Items cannot be null. The failure mode for bad requests (adding a key that
//! is already present, removing one that is not) is a `false` return.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use crate::error::InvariantViolation;

/// Items stored in a [`DeferredList`] are identified by a key.
pub trait Keyed {
    type Key: Copy + Eq + Hash + fmt::Debug;

    fn key(&self) -> Self::Key;
}

#[derive(Debug)]
struct Staging<T: Keyed> {
    removals: RefCell<HashSet<T::Key>>,
    additions: RefCell<Vec<T>>,
}

impl<T: Keyed> Default for Staging<T> {
    fn default() -> Self {
        Self {
            removals: RefCell::new(HashSet::new()),
            additions: RefCell::new(Vec::new()),
        }
    }
}

impl<T: Keyed> Staging<T> {
    fn stage_removal(&self, key: T::Key) -> bool {
        self.removals.borrow_mut().insert(key)
    }

    fn stage_addition(&self, item: T) -> bool {
        let mut additions = self.additions.borrow_mut();
        let key = item.key();
        if additions.iter().any(|staged| staged.key() == key) {
            return false;
        }
        additions.push(item);
        true
    }

    fn is_removing(&self, key: &T::Key) -> bool {
        self.removals.borrow().contains(key)
    }
}

/// Ordered container supporting immediate and deferred mutation.
#[derive(Debug)]
pub struct DeferredList<T: Keyed> {
    items: Vec<T>,
    staging: Staging<T>,
}

impl<T: Keyed> Default for DeferredList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            staging: Staging::default(),
        }
    }
}

impl<T: Keyed> DeferredList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item immediately, cancelling any staged addition or removal of
    /// the same key.
    ///
    /// Returns `false` if an item with the same key is visible. An item that
    /// is stored but staged for removal counts as absent: the staged removal
    /// is dropped and `item` takes the stored item's place.
    pub fn add(&mut self, item: T) -> bool {
        let key = item.key();
        let position = self.items.iter().position(|existing| existing.key() == key);
        let was_removing = self.staging.removals.get_mut().remove(&key);
        if position.is_some() && !was_removing {
            return false;
        }
        self.staging
            .additions
            .get_mut()
            .retain(|staged| staged.key() != key);
        match position {
            Some(index) => self.items[index] = item,
            None => self.items.push(item),
        }
        true
    }

    /// Remove an item immediately, cancelling any staged addition or removal
    /// of the same key.
    pub fn remove(&mut self, key: T::Key) -> Option<T> {
        self.staging.removals.get_mut().remove(&key);
        self.staging
            .additions
            .get_mut()
            .retain(|staged| staged.key() != key);
        let index = self.items.iter().position(|item| item.key() == key)?;
        Some(self.items.remove(index))
    }

    /// Stage an addition for the next [`add_commit`](Self::add_commit).
    ///
    /// Returns `false` if the key is visible in the list or already staged.
    pub fn add_later(&self, item: T) -> bool {
        if self.contains(item.key()) {
            return false;
        }
        self.staging.stage_addition(item)
    }

    /// Stage a removal for the next [`remove_commit`](Self::remove_commit).
    ///
    /// Returns `false` if the key is not visible in the list.
    pub fn remove_later(&self, key: T::Key) -> bool {
        if !self.contains(key) {
            return false;
        }
        self.staging.stage_removal(key)
    }

    /// Stage a swap: the stored item with the same key is removed and `item`
    /// takes its place in the same commit batch.
    pub fn replace_later(&self, item: T) -> bool {
        let key = item.key();
        if !self.remove_later(key) {
            return false;
        }
        self.staging.stage_addition(item)
    }

    /// Apply staged removals. Returns how many items were removed.
    pub fn remove_commit(&mut self) -> usize {
        let removals = std::mem::take(self.staging.removals.get_mut());
        if removals.is_empty() {
            return 0;
        }
        let before = self.items.len();
        self.items.retain(|item| !removals.contains(&item.key()));
        before - self.items.len()
    }

    /// Apply staged additions. Returns how many items were added.
    pub fn add_commit(&mut self) -> usize {
        let additions = std::mem::take(self.staging.additions.get_mut());
        let mut added = 0;
        for item in additions {
            let key = item.key();
            if self.items.iter().any(|existing| existing.key() == key) {
                tracing::warn!(?key, "dropping staged addition of a key already present");
                continue;
            }
            self.items.push(item);
            added += 1;
        }
        added
    }

    /// Apply staged removals, then staged additions.
    pub fn commit_all(&mut self) {
        debug_assert!(self.check_invariant().is_ok());
        self.remove_commit();
        self.add_commit();
    }

    /// Verify the staging bookkeeping.
    ///
    /// Every staged removal must be stored; every staged addition must be
    /// absent from the list once staged removals are applied, and staged at
    /// most once.
    pub fn check_invariant(&self) -> Result<(), InvariantViolation> {
        let removals = self.staging.removals.borrow();
        for key in removals.iter() {
            if !self.items.iter().any(|item| item.key() == *key) {
                return Err(InvariantViolation::RemovalMissing(format!("{key:?}")));
            }
        }
        let additions = self.staging.additions.borrow();
        let mut seen = HashSet::with_capacity(additions.len());
        for staged in additions.iter() {
            let key = staged.key();
            if !seen.insert(key) {
                return Err(InvariantViolation::DuplicateAddition(format!("{key:?}")));
            }
            let stored = self.items.iter().any(|item| item.key() == key);
            if stored && !removals.contains(&key) {
                return Err(InvariantViolation::AdditionPresent(format!("{key:?}")));
            }
        }
        Ok(())
    }

    /// Visible item with the given key.
    pub fn get(&self, key: T::Key) -> Option<&T> {
        if self.staging.is_removing(&key) {
            return None;
        }
        self.items.iter().find(|item| item.key() == key)
    }

    pub fn get_mut(&mut self, key: T::Key) -> Option<&mut T> {
        if self.staging.is_removing(&key) {
            return None;
        }
        self.items.iter_mut().find(|item| item.key() == key)
    }

    pub fn contains(&self, key: T::Key) -> bool {
        self.get(key).is_some()
    }

    /// Number of visible items.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn pending_removals(&self) -> usize {
        self.staging.removals.borrow().len()
    }

    pub fn pending_additions(&self) -> usize {
        self.staging.additions.borrow().len()
    }

    /// Iterate visible items in insertion order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.items.iter(),
            staging: &self.staging,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            inner: self.items.iter_mut(),
            staging: &self.staging,
        }
    }

    /// Mutable iteration plus a handle for staging changes during it.
    pub fn split_mut(&mut self) -> (IterMut<'_, T>, Stage<'_, T>) {
        let staging = &self.staging;
        (
            IterMut {
                inner: self.items.iter_mut(),
                staging,
            },
            Stage { staging },
        )
    }
}

/// Staging handle handed out by [`DeferredList::split_mut`].
///
/// The handle cannot see the stored items, so it does not check presence;
/// `check_invariant` reports misuse.
pub struct Stage<'a, T: Keyed> {
    staging: &'a Staging<T>,
}

impl<T: Keyed> Stage<'_, T> {
    pub fn remove_later(&self, key: T::Key) -> bool {
        self.staging.stage_removal(key)
    }

    pub fn add_later(&self, item: T) -> bool {
        self.staging.stage_addition(item)
    }

    pub fn replace_later(&self, item: T) -> bool {
        self.staging.stage_removal(item.key()) && self.staging.stage_addition(item)
    }
}

pub struct Iter<'a, T: Keyed> {
    inner: std::slice::Iter<'a, T>,
    staging: &'a Staging<T>,
}

impl<'a, T: Keyed> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        loop {
            let item = self.inner.next()?;
            if !self.staging.is_removing(&item.key()) {
                return Some(item);
            }
        }
    }
}

pub struct IterMut<'a, T: Keyed> {
    inner: std::slice::IterMut<'a, T>,
    staging: &'a Staging<T>,
}

impl<'a, T: Keyed> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        loop {
            let item = self.inner.next()?;
            if !self.staging.is_removing(&item.key()) {
                return Some(item);
            }
        }
    }
}

impl<'a, T: Keyed> IntoIterator for &'a DeferredList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T: Keyed> FromIterator<T> for DeferredList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        for item in iter {
            list.add(item);
        }
        list
    }
}
