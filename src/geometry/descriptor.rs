// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Strongly typed element descriptors
//!
//! A descriptor is a dense `u32` slot index into one mesh's element arena.
//! `u32::MAX` is reserved as the null value of every category.

use serde::{Deserialize, Serialize};
use std::fmt;

const NULL_INDEX: u32 = u32::MAX;

/// Vertex handle
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct VertexDescriptor(u32);

/// Edge handle (undirected)
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct EdgeDescriptor(u32);

/// Half-edge handle (directed)
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct HalfedgeDescriptor(u32);

/// Face handle
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct FaceDescriptor(u32);

/// Common operations shared by all descriptor kinds
pub trait Descriptor: Copy + Eq + fmt::Debug {
    /// Category name used in error messages
    const KIND: &'static str;

    fn from_index(index: usize) -> Self;

    fn index(self) -> usize;

    fn null() -> Self;

    fn is_null(self) -> bool {
        self == Self::null()
    }
}

macro_rules! impl_descriptor {
    ($name:ident, $kind:literal, $short:literal) => {
        impl $name {
            /// Create a descriptor from a raw slot index
            #[inline]
            pub fn new(index: usize) -> Self {
                debug_assert!(index < NULL_INDEX as usize, "slot index {} overflows descriptor", index);
                Self(index as u32)
            }

            /// The null descriptor of this category
            #[inline]
            pub const fn null() -> Self {
                Self(NULL_INDEX)
            }

            /// Raw slot index
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub fn is_null(self) -> bool {
                self.0 == NULL_INDEX
            }
        }

        impl Descriptor for $name {
            const KIND: &'static str = $kind;

            #[inline]
            fn from_index(index: usize) -> Self {
                Self::new(index)
            }

            #[inline]
            fn index(self) -> usize {
                $name::index(self)
            }

            #[inline]
            fn null() -> Self {
                $name::null()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::null()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_null() {
                    write!(f, "{}(null)", $short)
                } else {
                    write!(f, "{}({})", $short, self.0)
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self, f)
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                Self::new(index)
            }
        }
    };
}

impl_descriptor!(VertexDescriptor, "vertex", "v");
impl_descriptor!(EdgeDescriptor, "edge", "e");
impl_descriptor!(HalfedgeDescriptor, "halfedge", "h");
impl_descriptor!(FaceDescriptor, "face", "f");
