//! Minimal edit scripts between two sequences under a caller-supplied equality.
//!
//! [`align`] computes a longest common subsequence of two slices using only deletions and
//! insertions, in `O((N + M) * D)` time and `O(min(N, M))` working space, where `D` is the
//! edit distance. The equality predicate is fallible: the first error it returns aborts
//! the whole alignment, since the divide-and-conquer search has no meaningful partial
//! result.
//!
//! The session compares symbol tables of two different images, where every comparison
//! must pair one baseline element with one candidate element. [`SideIndex`] tags each
//! element with the sequence it came from so a predicate can detect misuse and report
//! [`crate::Error::PredicateContract`].
//!
//! # Examples
//!
//! ```rust
//! use abcscope::diff::{align, RunKind};
//!
//! let old = ["a", "b", "c"];
//! let new = ["a", "c"];
//! let script = align(&old, &new, |x, y| Ok(x == y))?;
//!
//! assert_eq!(script.distance(), 1);
//! assert_eq!(script.runs()[1].kind, RunKind::Deleted);
//! assert_eq!(script.runs()[1].old_start, 1);
//! assert_eq!(script.apply(&old, &new), new);
//! # Ok::<(), abcscope::Error>(())
//! ```

mod myers;
mod script;

pub use script::{EditScript, Run, RunKind};

use strum::Display;

use crate::{Error, Result};

/// The sequence an element was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    /// The old image
    Baseline,
    /// The new image
    Candidate,
}

/// An element position tagged with the sequence it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SideIndex {
    /// Which sequence
    pub side: Side,
    /// Position inside that sequence
    pub index: usize,
}

impl SideIndex {
    /// A position in the baseline sequence.
    #[must_use]
    pub fn baseline(index: usize) -> Self {
        SideIndex {
            side: Side::Baseline,
            index,
        }
    }

    /// A position in the candidate sequence.
    #[must_use]
    pub fn candidate(index: usize) -> Self {
        SideIndex {
            side: Side::Candidate,
            index,
        }
    }

    /// Checks that `a` is a baseline element and `b` a candidate element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PredicateContract`] naming the side both elements share, or the
    /// side of `a` if the pair is reversed.
    pub fn check_pair(a: SideIndex, b: SideIndex) -> Result<(usize, usize)> {
        match (a.side, b.side) {
            (Side::Baseline, Side::Candidate) => Ok((a.index, b.index)),
            (side, _) => Err(Error::PredicateContract(side)),
        }
    }
}

/// Aligns `a` against `b` under `eq`.
///
/// `eq` is always called with an element of `a` first and an element of `b` second. It
/// must be a pure function of its arguments for the result to be reproducible.
///
/// # Errors
///
/// Returns the first error produced by `eq`.
pub fn align<T, F>(a: &[T], b: &[T], mut eq: F) -> Result<EditScript>
where
    F: FnMut(&T, &T) -> Result<bool>,
{
    align_indices(a.len(), b.len(), |i, j| eq(&a[i], &b[j]))
}

/// Aligns two sequences known only by their lengths.
///
/// `eq(i, j)` compares position `i` of the first sequence with position `j` of the second.
///
/// # Errors
///
/// Returns the first error produced by `eq`.
pub fn align_indices<F>(n: usize, m: usize, mut eq: F) -> Result<EditScript>
where
    F: FnMut(usize, usize) -> Result<bool>,
{
    let marks = myers::shortest_edit(n, m, &mut eq)?;
    Ok(EditScript::from_marks(&marks))
}
