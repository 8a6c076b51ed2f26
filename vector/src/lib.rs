//! This crate provides an immutable, persistent sequence with structural
//! sharing.
//!
//! [`Vector`] is a bitmapped vector trie: leaves hold up to `N` elements, and
//! every interior node has up to `N` children. Updates never touch an existing
//! node. Instead, [`Vector::push_back`] and [`Vector::push_front`] copy the path
//! from the root to the affected leaf and return a new vector, which shares
//! every other subtree with the old one.
//!
//! Appending at the back keeps the tree perfectly packed, so lookups decode the
//! index a few bits at a time. Prepending at the front can't keep every subtree
//! full, so the affected interior nodes become "relaxed": they carry a table of
//! cumulative sizes and lookups through them search that table instead.
//!
//! ```rust
//! use trie_vector::Vector;
//!
//! let vec: Vector<u32> = (0..100).collect();
//! let longer = vec.push_front(42);
//!
//! assert_eq!(vec.get(0), Ok(Some(&0)));
//! assert_eq!(longer.get(0), Ok(Some(&42)));
//! assert_eq!(longer.get(100), Ok(Some(&99)));
//! assert_eq!(longer.len(), 101);
//! ```
//!
//! Once the front of a vector has been relaxed, appending at the back is not
//! supported and fails with [`Error::UnsupportedShapeTransition`].

// Not yet implemented:
// - removal (from either end)
// - back insertion through relaxed nodes
// - mutable builders

mod error;
mod node;
pub mod vector;

/// [`Vector`] takes a "branching factor" parameter, which must be a
/// reasonably-sized power of two. We use this trait to enforce that.
pub trait ValidBranchingConstant {}
pub struct Const<const N: usize> {}

impl ValidBranchingConstant for Const<2> {}
impl ValidBranchingConstant for Const<4> {}
impl ValidBranchingConstant for Const<8> {}
impl ValidBranchingConstant for Const<16> {}
impl ValidBranchingConstant for Const<32> {}
impl ValidBranchingConstant for Const<64> {}
impl ValidBranchingConstant for Const<128> {}

pub use error::{Error, Result};
pub use vector::{Iter, Vector};
