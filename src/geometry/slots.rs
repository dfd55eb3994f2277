// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Dense slot storage with descriptor reuse
//!
//! Slots are never shrunk. Removing an element only flags it and queues its
//! descriptor; the next allocation hands queued descriptors back out.

use super::descriptor::Descriptor;
use crate::error::{KernelError, Result};
use std::collections::VecDeque;
use std::marker::PhantomData;

#[derive(Debug, Clone)]
pub(crate) struct Slots<D: Descriptor, T> {
    data: Vec<T>,
    removed: Vec<bool>,
    free: VecDeque<D>,
    _descriptor: PhantomData<D>,
}

impl<D: Descriptor, T> Slots<D, T> {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            removed: Vec::new(),
            free: VecDeque::new(),
            _descriptor: PhantomData,
        }
    }

    pub fn reserve(&mut self, additional: usize) {
        self.data.reserve(additional);
        self.removed.reserve(additional);
    }

    /// Number of slots ever allocated
    #[inline]
    pub fn internal_len(&self) -> usize {
        self.data.len()
    }

    /// Number of slots waiting for reuse
    #[inline]
    pub fn removed_len(&self) -> usize {
        self.free.len()
    }

    #[inline]
    pub fn live_len(&self) -> usize {
        self.internal_len() - self.removed_len()
    }

    #[inline]
    pub fn is_live(&self, d: D) -> bool {
        let i = d.index();
        !d.is_null() && i < self.data.len() && !self.removed[i]
    }

    /// True only for allocated slots that are currently flagged removed
    #[inline]
    pub fn is_removed(&self, d: D) -> bool {
        let i = d.index();
        !d.is_null() && i < self.data.len() && self.removed[i]
    }

    pub fn check(&self, d: D) -> Result<()> {
        if d.is_null() {
            return Err(KernelError::NullDescriptor { kind: D::KIND });
        }
        if !self.is_live(d) {
            return Err(KernelError::removed(D::KIND, d.index()));
        }
        Ok(())
    }

    #[inline]
    pub fn get(&self, d: D) -> &T {
        debug_assert!(self.is_live(d), "access to dead {} {:?}", D::KIND, d);
        &self.data[d.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, d: D) -> &mut T {
        debug_assert!(self.is_live(d), "access to dead {} {:?}", D::KIND, d);
        &mut self.data[d.index()]
    }

    /// Store `value` in the oldest freed slot, or in a fresh one
    pub fn insert_oldest(&mut self, value: T) -> D {
        match self.free.pop_front() {
            Some(d) => self.revive(d, value),
            None => self.push(value),
        }
    }

    /// Store `value` in the most recently freed slot, or in a fresh one
    pub fn insert_newest(&mut self, value: T) -> D {
        match self.free.pop_back() {
            Some(d) => self.revive(d, value),
            None => self.push(value),
        }
    }

    /// Flag a live slot as removed and queue it for reuse
    pub fn release(&mut self, d: D) {
        debug_assert!(self.is_live(d));
        self.removed[d.index()] = true;
        self.free.push_back(d);
    }

    /// Live descriptors in slot order
    pub fn iter(&self) -> impl Iterator<Item = D> + '_ {
        self.removed
            .iter()
            .enumerate()
            .filter(|(_, removed)| !**removed)
            .map(|(i, _)| D::from_index(i))
    }

    fn revive(&mut self, d: D, value: T) -> D {
        let i = d.index();
        self.data[i] = value;
        self.removed[i] = false;
        d
    }

    fn push(&mut self, value: T) -> D {
        let d = D::from_index(self.data.len());
        self.data.push(value);
        self.removed.push(false);
        d
    }
}

impl<D: Descriptor, T> Default for Slots<D, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::descriptor::VertexDescriptor;

    #[test]
    fn test_fifo_reuse() {
        let mut slots: Slots<VertexDescriptor, u8> = Slots::new();
        let a = slots.insert_oldest(0);
        let b = slots.insert_oldest(1);
        let c = slots.insert_oldest(2);

        slots.release(c);
        slots.release(a);
        assert_eq!(slots.live_len(), 1);
        assert_eq!(slots.iter().collect::<Vec<_>>(), vec![b]);

        assert_eq!(slots.insert_oldest(9), c);
        assert_eq!(slots.insert_oldest(9), a);
        assert_eq!(slots.insert_oldest(9), VertexDescriptor::new(3));
    }

    #[test]
    fn test_newest_reuse() {
        let mut slots: Slots<VertexDescriptor, u8> = Slots::new();
        let a = slots.insert_oldest(0);
        let b = slots.insert_oldest(1);
        slots.release(a);
        slots.release(b);
        assert_eq!(slots.insert_newest(5), b);
        assert_eq!(*slots.get(b), 5);
    }

    #[test]
    fn test_check() {
        let mut slots: Slots<VertexDescriptor, u8> = Slots::new();
        let a = slots.insert_oldest(0);
        assert!(slots.check(a).is_ok());
        assert!(matches!(
            slots.check(VertexDescriptor::null()),
            Err(KernelError::NullDescriptor { kind: "vertex" })
        ));
        slots.release(a);
        assert!(slots.is_removed(a));
        assert!(matches!(
            slots.check(a),
            Err(KernelError::RemovedDescriptor { index: 0, .. })
        ));
        assert!(slots.check(VertexDescriptor::new(10)).is_err());
    }
}
