use super::myers::Marks;

/// Classification of a run of an [`EditScript`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunKind {
    /// Elements present in both sequences
    Kept,
    /// Elements only present in the old sequence
    Deleted,
    /// Elements only present in the new sequence
    Inserted,
}

/// A maximal block of consecutive elements sharing one [`RunKind`].
///
/// `old_start` and `new_start` are the positions in the old and new sequence at which the
/// run begins. A deleted run does not advance the new position and an inserted run does
/// not advance the old one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Run {
    /// What happened to the elements
    pub kind: RunKind,
    /// First affected position in the old sequence
    pub old_start: usize,
    /// First affected position in the new sequence
    pub new_start: usize,
    /// Number of elements
    pub len: usize,
}

/// Ordered runs transforming one sequence into another.
///
/// Runs cover both sequences completely and in order. Between two kept runs, deleted
/// elements are always listed before inserted ones, and adjacent runs never share a kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditScript {
    runs: Vec<Run>,
    old_len: usize,
    new_len: usize,
}

impl EditScript {
    pub(super) fn from_marks(marks: &Marks) -> Self {
        let (n, m) = (marks.deleted.len(), marks.inserted.len());
        let mut script = EditScript {
            runs: Vec::new(),
            old_len: n,
            new_len: m,
        };

        let (mut x, mut y) = (0, 0);
        while x < n || y < m {
            if x < n && marks.deleted[x] {
                script.push(RunKind::Deleted, x, y);
                x += 1;
            } else if y < m && marks.inserted[y] {
                script.push(RunKind::Inserted, x, y);
                y += 1;
            } else {
                debug_assert!(x < n && y < m, "unbalanced kept elements");
                script.push(RunKind::Kept, x, y);
                x += 1;
                y += 1;
            }
        }

        script
    }

    fn push(&mut self, kind: RunKind, old_start: usize, new_start: usize) {
        if let Some(last) = self.runs.last_mut() {
            if last.kind == kind {
                last.len += 1;
                return;
            }
        }
        self.runs.push(Run {
            kind,
            old_start,
            new_start,
            len: 1,
        });
    }

    /// The runs in sequence order.
    #[must_use]
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Length of the old sequence.
    #[must_use]
    pub fn old_len(&self) -> usize {
        self.old_len
    }

    /// Length of the new sequence.
    #[must_use]
    pub fn new_len(&self) -> usize {
        self.new_len
    }

    fn count(&self, kind: RunKind) -> usize {
        self.runs
            .iter()
            .filter(|run| run.kind == kind)
            .map(|run| run.len)
            .sum()
    }

    /// Number of elements in kept runs (the common subsequence length).
    #[must_use]
    pub fn kept_len(&self) -> usize {
        self.count(RunKind::Kept)
    }

    /// Number of deleted elements.
    #[must_use]
    pub fn deleted(&self) -> usize {
        self.count(RunKind::Deleted)
    }

    /// Number of inserted elements.
    #[must_use]
    pub fn inserted(&self) -> usize {
        self.count(RunKind::Inserted)
    }

    /// Edit distance: deletions plus insertions.
    #[must_use]
    pub fn distance(&self) -> usize {
        self.deleted() + self.inserted()
    }

    /// True if the script contains no edits.
    ///
    /// Identical sequences produce a single kept run (or no run at all when both are
    /// empty).
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.runs.iter().all(|run| run.kind == RunKind::Kept)
    }

    /// Every kept `(old, new)` position pair, in order.
    pub fn kept_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.runs
            .iter()
            .filter(|run| run.kind == RunKind::Kept)
            .flat_map(|run| (0..run.len).map(move |k| (run.old_start + k, run.new_start + k)))
    }

    /// Replays the script: kept elements are taken from `old`, inserted ones from `new`.
    ///
    /// Under plain equality the result equals `new`.
    ///
    /// # Panics
    ///
    /// Panics if `old` or `new` is shorter than the sequences the script was computed for.
    #[must_use]
    pub fn apply<T: Clone>(&self, old: &[T], new: &[T]) -> Vec<T> {
        let mut out = Vec::with_capacity(self.new_len);
        for run in &self.runs {
            match run.kind {
                RunKind::Kept => out.extend_from_slice(&old[run.old_start..run.old_start + run.len]),
                RunKind::Inserted => {
                    out.extend_from_slice(&new[run.new_start..run.new_start + run.len]);
                }
                RunKind::Deleted => {}
            }
        }
        out
    }
}
