/// An error returned by a [`Vector`](crate::Vector) operation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("index {index} is out of range for a vector of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// The vector's root was reshaped by front insertion, and appending at
    /// the back of a relaxed node is not supported. Retrying won't help.
    #[error("cannot push to the back of a vector that was relaxed by front insertion")]
    UnsupportedShapeTransition,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
