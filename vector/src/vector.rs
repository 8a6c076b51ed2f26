use std::{fmt, ops::Index, sync::Arc};

use imbl_sized_chunks::Chunk;

use crate::{
    error::{Error, Result},
    node::{bits, minimum_shift, Node},
    Const, ValidBranchingConstant,
};

/// An immutable, persistent vector.
///
/// Every update returns a new vector and leaves `self` untouched; the two share
/// all the subtrees that the update didn't need to rebuild. Cloning is cheap.
///
/// This is implemented internally as a tree, and the parameter `N` controls its
/// branching factor. It must be a power of 2, and defaults to 32.
pub struct Vector<T, const N: usize = 32>
where
    Const<N>: ValidBranchingConstant,
{
    root: Arc<Node<T, N>>,
    // The number of index bits that the root decodes, counting its own level.
    // A multiple of `log2(N)`.
    shift: u32,
    length: usize,
}

impl<T, const N: usize> Clone for Vector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    fn clone(&self) -> Self {
        Self {
            root: Arc::clone(&self.root),
            shift: self.shift,
            length: self.length,
        }
    }
}

impl<T, const N: usize> Vector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    /// The empty vector: a single empty leaf.
    pub fn empty() -> Self {
        Self {
            root: Arc::new(Node::empty()),
            shift: 0,
            length: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn iter(&self) -> Iter<'_, T, N> {
        self.into_iter()
    }
}

impl<T: Clone, const N: usize> Vector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    /// Gets the element at `index`.
    ///
    /// Indices past the end are absent (`Ok(None)`) as long as the vector has
    /// only grown at the back. After a front insertion reshaped the root,
    /// they fail with [`Error::IndexOutOfRange`] instead.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use trie_vector::{Error, Vector};
    /// let vec: Vector<u32> = (0..40).collect();
    /// assert_eq!(vec.get(39), Ok(Some(&39)));
    /// assert_eq!(vec.get(40), Ok(None));
    ///
    /// let vec = vec.push_front(7);
    /// assert_eq!(vec.get(0), Ok(Some(&7)));
    /// assert_eq!(vec.get(41), Err(Error::IndexOutOfRange { index: 41, len: 41 }));
    /// ```
    pub fn get(&self, index: usize) -> Result<Option<&T>> {
        // Bit-addressed trees would wrap around past their capacity.
        if index >= self.length && !self.root.is_relaxed() {
            return Ok(None);
        }
        self.root
            .get(index, self.shift)
            .map_err(|_| Error::IndexOutOfRange {
                index,
                len: self.length,
            })
    }

    /// Returns a copy of this vector with `elt` prepended.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use trie_vector::Vector;
    /// let vec = Vector::<char>::empty().push_front('b').push_front('a');
    /// assert_eq!(vec.iter().collect::<String>(), "ab");
    /// ```
    pub fn push_front(&self, elt: T) -> Self {
        let length = self.length + 1;

        if minimum_shift::<N>(self.length) > self.shift || !self.root.has_front_room(self.shift) {
            // No room at the front: put the old tree and a new path side by side
            // under a new root. The new path is nowhere near full, so the new
            // root is relaxed.
            let shift = self.shift + bits::<N>();
            log::trace!(
                "growing vector of length {} at the front, shift {} -> {shift}",
                self.length,
                self.shift
            );
            let path = Node::relaxed_path(elt, self.shift);
            let root = Node::Relaxed {
                children: Chunk::pair(Arc::new(path), Arc::clone(&self.root)),
                sizes: Chunk::pair(1, length),
            };
            return Self {
                root: Arc::new(root),
                shift,
                length,
            };
        }

        Self {
            root: Arc::new(self.root.push_front(elt, self.shift)),
            shift: self.shift,
            length,
        }
    }

    /// Returns a copy of this vector with `elt` appended.
    ///
    /// Fails with [`Error::UnsupportedShapeTransition`] if the vector has been
    /// relaxed by [`Vector::push_front`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use trie_vector::{Error, Vector};
    /// let vec = Vector::<u32>::empty().push_back(1)?.push_back(2)?;
    /// assert_eq!(vec.get(1), Ok(Some(&2)));
    ///
    /// let relaxed = (0..32).collect::<Vector<u32>>().push_front(0);
    /// assert_eq!(relaxed.push_back(3).err(), Some(Error::UnsupportedShapeTransition));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn push_back(&self, elt: T) -> Result<Self> {
        let length = self.length + 1;

        if minimum_shift::<N>(self.length) > self.shift {
            // The tree is packed full. Full relaxed nodes are always turned back
            // into regular ones, so the old root can be addressed by bits.
            debug_assert!(!self.root.is_relaxed());
            let shift = self.shift + bits::<N>();
            log::trace!(
                "growing vector of length {} at the back, shift {} -> {shift}",
                self.length,
                self.shift
            );
            let path = Node::regular_path(elt, self.shift);
            let root = Node::Regular {
                children: Chunk::pair(Arc::clone(&self.root), Arc::new(path)),
            };
            return Ok(Self {
                root: Arc::new(root),
                shift,
                length,
            });
        }

        Ok(Self {
            root: Arc::new(self.root.push_back(self.length, elt, self.shift)?),
            shift: self.shift,
            length,
        })
    }

    /// Walks the whole tree and panics if any structural invariant is broken.
    pub fn check_invariants(&self) {
        assert!(self.shift % bits::<N>() == 0);
        assert_eq!(self.length, self.root.check_invariants(self.shift));
        assert_eq!(self.length, self.root.len(self.shift));
        if self.length == 0 {
            assert_eq!(self.shift, 0);
            assert!(matches!(self.root.as_ref(), Node::Content { .. }));
        }
    }
}

#[derive(Debug)]
pub struct Iter<'a, T, const N: usize> {
    stack: Vec<std::slice::Iter<'a, Arc<Node<T, N>>>>,
    leaf: std::slice::Iter<'a, T>,
    remaining: usize,
}

impl<T, const N: usize> Clone for Iter<'_, T, N> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
            leaf: self.leaf.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, T, const N: usize> Iter<'a, T, N> {
    // Pushes the leftmost path below `node` onto the stack, stopping at a leaf.
    fn descend(&mut self, mut node: &'a Node<T, N>) {
        loop {
            match node {
                Node::Content { data } => {
                    self.leaf = data.iter();
                    return;
                }
                Node::Regular { children } | Node::Relaxed { children, .. } => {
                    let mut children_iter = children.iter();
                    node = children_iter.next().expect("empty interior node").as_ref();
                    self.stack.push(children_iter);
                }
            }
        }
    }
}

impl<'a, T, const N: usize> Iterator for Iter<'a, T, N> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(ret) = self.leaf.next() {
                self.remaining -= 1;
                return Some(ret);
            }

            let next = loop {
                match self.stack.last_mut() {
                    Some(iter) => {
                        if let Some(next) = iter.next() {
                            break next;
                        } else {
                            self.stack.pop();
                        }
                    }
                    None => {
                        return None;
                    }
                }
            };
            self.descend(next);
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, const N: usize> ExactSizeIterator for Iter<'_, T, N> {}

impl<'a, T, const N: usize> IntoIterator for &'a Vector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T, N>;

    fn into_iter(self) -> Self::IntoIter {
        let mut iter = Iter {
            stack: Vec::new(),
            leaf: [].iter(),
            remaining: self.length,
        };
        iter.descend(&self.root);
        iter
    }
}

impl<T, const N: usize> Default for Vector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Clone, const N: usize> FromIterator<T> for Vector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        iter.into_iter().fold(Vector::empty(), |vec, elt| {
            vec.push_back(elt)
                .expect("a vector built at the back is never relaxed")
        })
    }
}

impl<T: Clone, const N: usize> Index<usize> for Vector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        match self.get(index) {
            Ok(Some(elt)) => elt,
            _ => panic!("index {index} out of range for length {}", self.len()),
        }
    }
}

impl<T: PartialEq, const N: usize> PartialEq for Vector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, const N: usize> Eq for Vector<T, N> where Const<N>: ValidBranchingConstant {}

impl<T: fmt::Debug, const N: usize> fmt::Debug for Vector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: serde::Serialize, const N: usize> serde::Serialize for Vector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;

        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for elt in self.iter() {
            seq.serialize_element(elt)?;
        }
        seq.end()
    }
}

impl<'de, T: Clone + serde::Deserialize<'de>, const N: usize> serde::Deserialize<'de>
    for Vector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let vec: Vec<T> = Vec::deserialize(deserializer)?;
        Ok(vec.into_iter().collect())
    }
}
