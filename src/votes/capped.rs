//! Fixed-capacity sequences with an explicit insertion/eviction policy.
//!
//! Reactions and feedback both keep "the last five", but they do it from opposite
//! ends: reactions are prepended and fall off the back, feedback is appended and
//! falls off the front. The policy is part of the type so the two can't be mixed up.

use std::{collections::VecDeque, fmt, marker::PhantomData};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub trait CapPolicy {
    fn insert<T>(items: &mut VecDeque<T>, item: T, capacity: usize);

    /// Trim a sequence loaded from storage down to `capacity`, keeping the newest entries.
    fn trim<T>(items: &mut VecDeque<T>, capacity: usize);
}

/// Newest at index 0; the oldest entry is evicted from the back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NewestFirst;

/// Newest at the end; the oldest entry is evicted from the front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OldestFirst;

impl CapPolicy for NewestFirst {
    fn insert<T>(items: &mut VecDeque<T>, item: T, capacity: usize) {
        items.push_front(item);
        Self::trim(items, capacity);
    }

    fn trim<T>(items: &mut VecDeque<T>, capacity: usize) {
        items.truncate(capacity);
    }
}

impl CapPolicy for OldestFirst {
    fn insert<T>(items: &mut VecDeque<T>, item: T, capacity: usize) {
        items.push_back(item);
        Self::trim(items, capacity);
    }

    fn trim<T>(items: &mut VecDeque<T>, capacity: usize) {
        while items.len() > capacity {
            items.pop_front();
        }
    }
}

pub struct CappedList<T, P, const N: usize> {
    items: VecDeque<T>,
    _policy: PhantomData<P>,
}

impl<T, P: CapPolicy, const N: usize> CappedList<T, P, N> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::with_capacity(N),
            _policy: PhantomData,
        }
    }

    pub fn from_items(items: impl IntoIterator<Item = T>) -> Self {
        let mut items: VecDeque<T> = items.into_iter().collect();
        P::trim(&mut items, N);
        Self {
            items,
            _policy: PhantomData,
        }
    }

    pub fn push(&mut self, item: T) {
        P::insert(&mut self.items, item, N);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Items in storage order (index 0 first).
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.iter().cloned().collect()
    }
}

impl<T, P: CapPolicy, const N: usize> Default for CappedList<T, P, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, P, const N: usize> Clone for CappedList<T, P, N> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            _policy: PhantomData,
        }
    }
}

impl<T: PartialEq, P, const N: usize> PartialEq for CappedList<T, P, N> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: fmt::Debug, P, const N: usize> fmt::Debug for CappedList<T, P, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<T: Serialize, P, const N: usize> Serialize for CappedList<T, P, N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.iter())
    }
}

impl<'de, T: Deserialize<'de>, P: CapPolicy, const N: usize> Deserialize<'de>
    for CappedList<T, P, N>
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<T>::deserialize(deserializer)?;
        Ok(Self::from_items(items))
    }
}
