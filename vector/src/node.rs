use std::sync::Arc;

use imbl_sized_chunks::Chunk;

use crate::{
    error::{Error, Result},
    Const, ValidBranchingConstant,
};

pub(crate) type Children<T, const N: usize> = Chunk<Arc<Node<T, N>>, N>;
type Sizes<const N: usize> = Chunk<usize, N>;

/// The trie has three kinds of nodes, and every operation dispatches on them.
///
/// Each node is addressed with a `shift`: the number of index bits that remain
/// to be decoded below it. Leaves live at shift zero, and a branch at shift `s`
/// has children at shift `s - log2(N)`. A full child of such a branch holds
/// `2^s` elements, and the branch itself holds at most `2^(s + log2(N))`.
///
/// Nodes are never modified once built. Pushing copies the nodes on the path
/// to the affected leaf and reuses every other child by bumping its refcount.
#[derive(Debug, Clone)]
pub(crate) enum Node<T, const N: usize> {
    /// A leaf, holding up to `N` elements.
    Content { data: Chunk<T, N> },
    /// A branch whose children are all full, except possibly the last one.
    /// Children are found by pure bit arithmetic on the index.
    Regular { children: Children<T, N> },
    /// A branch with unevenly-sized children. `sizes[i]` is the number of
    /// elements in `children[..=i]`, so the last entry is the size of the
    /// whole subtree.
    Relaxed {
        children: Children<T, N>,
        sizes: Sizes<N>,
    },
}

/// The number of index bits decoded by each level of the tree.
pub(crate) const fn bits<const N: usize>() -> u32 {
    N.ilog2()
}

/// The number of elements a full node at height `shift` can hold.
pub(crate) fn capacity<const N: usize>(shift: u32) -> usize {
    1 << (shift + bits::<N>())
}

/// `idx` is an index relative to some bit-addressed node at height `shift`.
/// Which of its children does the index belong to?
fn extract_index<const N: usize>(idx: usize, shift: u32) -> usize {
    (idx >> shift) & (N - 1)
}

/// The smallest height at which a packed tree has room for `length + 1`
/// elements.
pub(crate) fn minimum_shift<const N: usize>(length: usize) -> u32 {
    length.max(1).ilog(N) * bits::<N>()
}

/// Finds the child of a relaxed node that contains `idx`.
fn offset(sizes: &[usize], idx: usize) -> Result<usize> {
    sizes
        .iter()
        .position(|&size| size > idx)
        .ok_or(Error::IndexOutOfRange {
            index: idx,
            len: sizes.last().copied().unwrap_or(0),
        })
}

impl<T, const N: usize> Node<T, N> {
    pub(crate) fn empty() -> Self {
        Node::Content { data: Chunk::new() }
    }

    pub(crate) fn is_relaxed(&self) -> bool {
        matches!(self, Node::Relaxed { .. })
    }
}

impl<T: Clone, const N: usize> Node<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    fn leaf(elt: T) -> Self {
        Node::Content {
            data: Chunk::unit(elt),
        }
    }

    /// Wraps a new leaf holding just `elt` in single-child regular nodes, until
    /// it reaches height `shift`.
    pub(crate) fn regular_path(elt: T, shift: u32) -> Self {
        let mut node = Node::leaf(elt);
        for _ in 0..shift / bits::<N>() {
            node = Node::Regular {
                children: Chunk::unit(Arc::new(node)),
            };
        }
        node
    }

    /// Like [`Node::regular_path`], but the new branches are relaxed.
    pub(crate) fn relaxed_path(elt: T, shift: u32) -> Self {
        let mut node = Node::leaf(elt);
        for _ in 0..shift / bits::<N>() {
            node = Node::Relaxed {
                children: Chunk::unit(Arc::new(node)),
                sizes: Chunk::unit(1),
            };
        }
        node
    }

    /// Builds a branch from a full size table, dropping the table if the
    /// children turned out to be perfectly packed.
    fn relaxed_or_regular(children: Children<T, N>, sizes: Sizes<N>, shift: u32) -> Self {
        debug_assert_eq!(children.len(), sizes.len());
        if children.is_full() && sizes.last() == Some(&capacity::<N>(shift)) {
            log::trace!("relaxed node at shift {shift} is packed, making it regular");
            Node::Regular { children }
        } else {
            Node::Relaxed { children, sizes }
        }
    }

    /// The number of elements in this subtree, which sits at height `shift`.
    pub(crate) fn len(&self, shift: u32) -> usize {
        match self {
            Node::Content { data } => data.len(),
            Node::Regular { children } => match children.split_last() {
                Some((last, full)) => full.len() * (1 << shift) + last.len(shift - bits::<N>()),
                None => 0,
            },
            Node::Relaxed { sizes, .. } => sizes.last().copied().unwrap_or(0),
        }
    }

    /// Can a front push into this node be absorbed without growing a new level
    /// above it?
    pub(crate) fn has_front_room(&self, shift: u32) -> bool {
        match self {
            Node::Content { data } => !data.is_full(),
            Node::Regular { children } => !children.is_full(),
            Node::Relaxed { children, .. } => {
                !children.is_full() || children[0].has_front_room(shift - bits::<N>())
            }
        }
    }

    /// Gets the element at `idx`, which is relative to the start of this
    /// subtree.
    ///
    /// Returns `Ok(None)` if `idx` lands past the end of a leaf, and an error
    /// if it lands past the end of a relaxed node's size table.
    pub(crate) fn get(&self, idx: usize, shift: u32) -> Result<Option<&T>> {
        match self {
            Node::Content { data } => {
                debug_assert_eq!(shift, 0);
                Ok(data.get(extract_index::<N>(idx, 0)))
            }
            Node::Regular { children } => match children.get(extract_index::<N>(idx, shift)) {
                Some(child) => child.get(idx, shift - bits::<N>()),
                None => Ok(None),
            },
            Node::Relaxed { children, sizes } => {
                let slot = offset(sizes, idx)?;
                let before = if slot == 0 { 0 } else { sizes[slot - 1] };
                children[slot].get(idx - before, shift - bits::<N>())
            }
        }
    }

    /// Returns a copy of this subtree with `elt` prepended.
    ///
    /// The caller must have checked [`Node::has_front_room`].
    pub(crate) fn push_front(&self, elt: T, shift: u32) -> Self {
        debug_assert!(self.has_front_room(shift));
        match self {
            Node::Content { data } => {
                let mut data = data.clone();
                data.push_front(elt);
                Node::Content { data }
            }
            Node::Regular { children } => {
                // All children but the last are full, so the size table follows
                // from the total.
                let span = 1 << shift;
                let len = self.len(shift);
                let mut sizes = Sizes::<N>::unit(1);
                sizes.extend((1..=children.len()).map(|i| 1 + (i * span).min(len)));

                let mut children = children.clone();
                children.push_front(Arc::new(Node::relaxed_path(elt, shift - bits::<N>())));
                Node::relaxed_or_regular(children, sizes, shift)
            }
            Node::Relaxed { children, sizes } => {
                let child_shift = shift - bits::<N>();
                let mut children = children.clone();
                let mut sizes: Sizes<N> = sizes.iter().map(|size| size + 1).collect();

                if children[0].has_front_room(child_shift) {
                    let first = Arc::new(children[0].push_front(elt, child_shift));
                    children[0] = first;
                } else {
                    children.push_front(Arc::new(Node::relaxed_path(elt, child_shift)));
                    sizes.push_front(1);
                }
                Node::relaxed_or_regular(children, sizes, shift)
            }
        }
    }

    /// Returns a copy of this subtree with `elt` appended. `idx` is the index
    /// that `elt` will have, relative to this subtree.
    ///
    /// The caller must ensure that this subtree isn't full.
    pub(crate) fn push_back(&self, idx: usize, elt: T, shift: u32) -> Result<Self> {
        match self {
            Node::Content { data } => {
                debug_assert_eq!(shift, 0);
                debug_assert!(!data.is_full());
                let mut data = data.clone();
                data.push_back(elt);
                Ok(Node::Content { data })
            }
            Node::Regular { children } => {
                let bucket_idx = extract_index::<N>(idx, shift);
                let child_shift = shift - bits::<N>();
                let mut children = children.clone();
                if bucket_idx == children.len() {
                    debug_assert!(!children.is_full());
                    children.push_back(Arc::new(Node::regular_path(elt, child_shift)));
                } else {
                    let child = Arc::new(children[bucket_idx].push_back(idx, elt, child_shift)?);
                    children[bucket_idx] = child;
                }
                Ok(Node::Regular { children })
            }
            Node::Relaxed { .. } => Err(Error::UnsupportedShapeTransition),
        }
    }

    /// Counts the elements by walking the whole subtree, asserting the node
    /// shape invariants along the way.
    pub(crate) fn check_invariants(&self, shift: u32) -> usize {
        assert!(shift % bits::<N>() == 0, "misaligned shift {shift}");
        let len = match self {
            Node::Content { data } => {
                assert_eq!(shift, 0, "leaf above the bottom level");
                data.len()
            }
            Node::Regular { children } => {
                assert!(shift > 0, "branch at the bottom level");
                assert!(!children.is_empty(), "empty interior node");
                let child_shift = shift - bits::<N>();
                let lens: Vec<usize> = children
                    .iter()
                    .map(|c| c.check_invariants(child_shift))
                    .collect();
                let (_, full) = lens.split_last().unwrap();
                assert!(full.iter().all(|&len| len == 1 << shift), "unpacked regular node");
                lens.iter().sum()
            }
            Node::Relaxed { children, sizes } => {
                assert!(shift > 0, "branch at the bottom level");
                assert!(!children.is_empty(), "empty interior node");
                assert_eq!(children.len(), sizes.len());
                let child_shift = shift - bits::<N>();
                let mut total = 0;
                for (child, &size) in children.iter().zip(sizes.iter()) {
                    let child_len = child.check_invariants(child_shift);
                    assert!(child_len > 0, "empty child");
                    total += child_len;
                    assert_eq!(total, size, "wrong cumulative size");
                }
                assert!(
                    !(children.is_full() && total == capacity::<N>(shift)),
                    "packed relaxed node"
                );
                total
            }
        };
        assert!(len <= capacity::<N>(shift), "overfull node");
        len
    }
}
