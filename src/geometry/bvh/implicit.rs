// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Index arithmetic for implicit (pointer-free) binary trees
//!
//! Nodes are numbered as in a complete binary tree: the root is 0 and the
//! children of `i` are `2i + 1` and `2i + 2`. With `t` leaves, only the
//! subtree spanning the first `t` slots of the leaf level is backed by
//! storage ("real" nodes); the rest of the complete tree is virtual. Real
//! nodes are packed level by level, root first.

/// Level of the leaves for `t` real leaves: `log2(next_pow2(t))`
#[inline]
pub fn get_leaf_level_from_real_leaf_count(t: usize) -> usize {
    debug_assert!(t >= 1);
    t.next_power_of_two().trailing_zeros() as usize
}

/// Level of an implicit index: `floor(log2(i + 1))`.
///
/// `usize::MAX` maps to level `usize::BITS`, below any representable leaf level.
#[inline]
pub fn get_level_from_implicit_idx(node: usize) -> usize {
    match node.checked_add(1) {
        Some(n) => n.ilog2() as usize,
        None => usize::BITS as usize,
    }
}

/// Number of real nodes in an implicit tree with `t` leaves
#[inline]
pub fn get_ostensibly_implicit_bvh_size(t: usize) -> usize {
    debug_assert!(t >= 1);
    2 * t - 1 + (t.next_power_of_two() - t).count_ones() as usize
}

/// Leftmost implicit index on a level
#[inline]
pub fn get_level_leftmost_node(level: usize) -> usize {
    (1usize << level) - 1
}

/// Implicit index of the last real leaf
#[inline]
pub fn get_rightmost_real_leaf(leaf_level: usize, t: usize) -> usize {
    get_level_leftmost_node(leaf_level) + t - 1
}

/// Implicit index of the ancestor of `node` that sits on `ancestor_level`.
///
/// Equivalent to `floor((node + 1) / 2^d) - 1` with `d` the level distance.
#[inline]
pub fn get_node_ancestor(node: usize, node_level: usize, ancestor_level: usize) -> usize {
    debug_assert!(ancestor_level <= node_level);
    ((node + 1) >> (node_level - ancestor_level)) - 1
}

/// Rightmost real node on `level`
#[inline]
pub fn get_level_rightmost_real_node(
    rightmost_real_leaf: usize,
    leaf_level: usize,
    level: usize,
) -> usize {
    get_node_ancestor(rightmost_real_leaf, leaf_level, level)
}

/// Whether `node` is backed by storage in a tree with `t` real leaves
pub fn is_real_implicit_tree_node_id(node: usize, t: usize) -> bool {
    if node == 0 {
        return true;
    }
    let leaf_level = get_leaf_level_from_real_leaf_count(t);
    let level = get_level_from_implicit_idx(node);
    if level > leaf_level {
        return false;
    }
    let rightmost_leaf = get_rightmost_real_leaf(leaf_level, t);
    node <= get_level_rightmost_real_node(rightmost_leaf, leaf_level, level)
}

/// Storage slot of a real node, given the bounds of the real range on its level
#[inline]
pub fn get_node_mem_index(
    node: usize,
    leftmost_on_level: usize,
    base_offset: usize,
    rightmost_real_on_level: usize,
) -> usize {
    debug_assert!(leftmost_on_level <= node && node <= rightmost_real_on_level);
    let real_on_level = rightmost_real_on_level - leftmost_on_level + 1;
    base_offset + get_ostensibly_implicit_bvh_size(real_on_level) - 1
        - (rightmost_real_on_level - node)
}

/// Precomputed shape of an implicit tree for a fixed leaf count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImplicitLayout {
    leaf_count: usize,
    leaf_level: usize,
    rightmost_leaf: usize,
    size: usize,
}

impl ImplicitLayout {
    /// Layout for `leaf_count >= 1` leaves
    pub fn new(leaf_count: usize) -> Self {
        let leaf_level = get_leaf_level_from_real_leaf_count(leaf_count);
        Self {
            leaf_count,
            leaf_level,
            rightmost_leaf: get_rightmost_real_leaf(leaf_level, leaf_count),
            size: get_ostensibly_implicit_bvh_size(leaf_count),
        }
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    pub fn leaf_level(&self) -> usize {
        self.leaf_level
    }

    /// Number of real nodes
    pub fn size(&self) -> usize {
        self.size
    }

    /// Implicit index of leaf `j` (in leaf order)
    pub fn leaf_node(&self, j: usize) -> usize {
        debug_assert!(j < self.leaf_count);
        get_level_leftmost_node(self.leaf_level) + j
    }

    pub fn rightmost_real_on_level(&self, level: usize) -> usize {
        get_level_rightmost_real_node(self.rightmost_leaf, self.leaf_level, level)
    }

    pub fn is_real(&self, node: usize) -> bool {
        if node == 0 {
            return true;
        }
        let level = get_level_from_implicit_idx(node);
        level <= self.leaf_level && node <= self.rightmost_real_on_level(level)
    }

    /// Real leaves all sit on the last level
    pub fn is_leaf(&self, node: usize) -> bool {
        self.is_real(node) && get_level_from_implicit_idx(node) == self.leaf_level
    }

    /// Storage slot of `node`, or `None` for virtual nodes
    pub fn mem_index(&self, node: usize) -> Option<usize> {
        if !self.is_real(node) {
            return None;
        }
        let level = get_level_from_implicit_idx(node);
        Some(get_node_mem_index(
            node,
            get_level_leftmost_node(level),
            0,
            self.rightmost_real_on_level(level),
        ))
    }

    /// Real children of `node`
    pub fn children(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        let first = node.checked_mul(2).and_then(|n| n.checked_add(1));
        [first, first.and_then(|c| c.checked_add(1))]
            .into_iter()
            .flatten()
            .filter(move |&c| self.is_real(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    /// Every ancestor of every real leaf, found by walking parent links
    fn brute_force_real_nodes(t: usize) -> BTreeSet<usize> {
        let leaf_level = (0..).find(|l| (1usize << l) >= t).unwrap();
        let first = (1usize << leaf_level) - 1;
        let mut real = BTreeSet::new();
        for leaf in first..first + t {
            let mut node = leaf;
            real.insert(node);
            while node > 0 {
                node = (node - 1) / 2;
                real.insert(node);
            }
        }
        real
    }

    #[test]
    fn test_size_matches_brute_force() {
        for t in 1..=16 {
            assert_eq!(
                get_ostensibly_implicit_bvh_size(t),
                brute_force_real_nodes(t).len(),
                "t = {}",
                t
            );
        }
    }

    #[test]
    fn test_size_known_values() {
        assert_eq!(get_ostensibly_implicit_bvh_size(1), 1);
        assert_eq!(get_ostensibly_implicit_bvh_size(2), 3);
        assert_eq!(get_ostensibly_implicit_bvh_size(3), 6);
        assert_eq!(get_ostensibly_implicit_bvh_size(5), 11);
        assert_eq!(get_ostensibly_implicit_bvh_size(8), 15);
        assert_eq!(get_ostensibly_implicit_bvh_size(9), 20);
    }

    #[test]
    fn test_real_node_classification() {
        for t in [1, 3, 5, 7, 9, 16, 17] {
            let real = brute_force_real_nodes(t);
            let size = get_ostensibly_implicit_bvh_size(t);
            let layout = ImplicitLayout::new(t);
            for node in 0..size + 2 * t + 8 {
                let expected = real.contains(&node);
                assert_eq!(is_real_implicit_tree_node_id(node, t), expected, "t = {}, node = {}", t, node);
                assert_eq!(layout.is_real(node), expected, "t = {}, node = {}", t, node);
            }
        }
    }

    #[test]
    fn test_levels() {
        assert_eq!(get_level_from_implicit_idx(0), 0);
        assert_eq!(get_level_from_implicit_idx(1), 1);
        assert_eq!(get_level_from_implicit_idx(2), 1);
        assert_eq!(get_level_from_implicit_idx(6), 2);
        assert_eq!(get_level_from_implicit_idx(7), 3);
        assert_eq!(get_level_leftmost_node(3), 7);
        assert_eq!(get_leaf_level_from_real_leaf_count(1), 0);
        assert_eq!(get_leaf_level_from_real_leaf_count(5), 3);
        assert_eq!(get_leaf_level_from_real_leaf_count(8), 3);
        assert_eq!(get_rightmost_real_leaf(3, 5), 11);
    }

    #[test]
    fn test_node_ancestor() {
        assert_eq!(get_node_ancestor(11, 3, 2), 5);
        assert_eq!(get_node_ancestor(11, 3, 1), 2);
        assert_eq!(get_node_ancestor(11, 3, 0), 0);
        assert_eq!(get_node_ancestor(7, 3, 3), 7);
        // deep trees stay exact
        let leaf_level = 40;
        let node = get_level_leftmost_node(leaf_level) + (1usize << 39) + 12345;
        assert_eq!(get_node_ancestor(node, leaf_level, 1), 2);
    }

    #[test]
    fn test_mem_index_is_dense_breadth_first() {
        for t in 1..=33 {
            let layout = ImplicitLayout::new(t);
            let mut slots: Vec<usize> = brute_force_real_nodes(t)
                .into_iter()
                .map(|node| layout.mem_index(node).unwrap())
                .collect();
            let ordered = slots.clone();
            slots.sort_unstable();
            assert_eq!(slots, (0..layout.size()).collect::<Vec<_>>(), "t = {}", t);
            // nodes visited in implicit order occupy increasing slots
            assert_eq!(ordered, slots, "t = {}", t);
        }
    }

    #[test]
    fn test_single_leaf_layout() {
        let layout = ImplicitLayout::new(1);
        assert_eq!(layout.size(), 1);
        assert!(layout.is_leaf(0));
        assert_eq!(layout.mem_index(0), Some(0));
        assert_eq!(layout.mem_index(1), None);
        assert_eq!(layout.children(0).count(), 0);
    }

    #[test]
    fn test_children_of_partial_node() {
        let layout = ImplicitLayout::new(3);
        assert_eq!(layout.children(2).collect::<Vec<_>>(), vec![5]);
        assert_eq!(layout.children(1).collect::<Vec<_>>(), vec![3, 4]);
    }

    #[test]
    fn test_largest_indices_are_virtual() {
        assert_eq!(get_level_from_implicit_idx(usize::MAX), usize::BITS as usize);
        assert_eq!(get_level_from_implicit_idx(usize::MAX - 1), usize::BITS as usize - 1);

        for t in [1usize, 3, 1 << 20, usize::MAX / 2] {
            assert!(!is_real_implicit_tree_node_id(usize::MAX, t), "t = {}", t);
            assert!(!is_real_implicit_tree_node_id(usize::MAX - 1, t), "t = {}", t);
        }

        let layout = ImplicitLayout::new(5);
        assert!(!layout.is_real(usize::MAX));
        assert_eq!(layout.mem_index(usize::MAX), None);
        assert_eq!(layout.children(usize::MAX).count(), 0);
        assert_eq!(layout.children(usize::MAX / 2).count(), 0);
    }
}
