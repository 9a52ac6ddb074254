//! Sequence alignment integration tests.
//!
//! These tests exercise `abcscope::diff` through its public API on sequences large enough
//! to force several levels of divide-and-conquer recursion.

use abcscope::{
    diff::{align, align_indices, RunKind, Side, SideIndex},
    Error, Result,
};

/// Deterministic pseudo-random sequence over a small alphabet.
fn sequence(len: usize, seed: u64, alphabet: u64) -> Vec<u64> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (state >> 33) % alphabet
        })
        .collect()
}

/// Reference LCS length by dynamic programming.
fn lcs_len(a: &[u64], b: &[u64]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for x in a {
        let mut diagonal = 0;
        for (j, y) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if x == y {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }
    row[b.len()]
}

#[test]
fn test_random_sequences_are_minimal() -> Result<()> {
    for seed in 0..20 {
        let a = sequence(60 + seed as usize, seed, 4);
        let b = sequence(50, seed + 100, 4);

        let script = align(&a, &b, |x, y| Ok(x == y))?;
        assert_eq!(script.kept_len(), lcs_len(&a, &b), "seed {seed}");
        assert_eq!(script.apply(&a, &b), b, "seed {seed}");
    }
    Ok(())
}

#[test]
fn test_large_table_with_few_edits() -> Result<()> {
    let a: Vec<u64> = (0..5000).collect();
    let mut b = a.clone();
    b.remove(4000);
    b.insert(10, 99_999);
    b.retain(|&v| v != 2500);

    let mut calls = 0usize;
    let script = align(&a, &b, |x, y| {
        calls += 1;
        Ok(x == y)
    })?;

    assert_eq!(script.deleted(), 2);
    assert_eq!(script.inserted(), 1);
    assert_eq!(script.apply(&a, &b), b);
    // far below the N * M comparisons a table-based LCS would make
    assert!(calls < 200_000, "{calls} predicate calls");
    Ok(())
}

#[test]
fn test_runs_cover_both_sequences() -> Result<()> {
    let a = sequence(300, 7, 3);
    let b = sequence(280, 8, 3);
    let script = align(&a, &b, |x, y| Ok(x == y))?;

    let (mut old, mut new) = (0, 0);
    for run in script.runs() {
        assert_eq!((run.old_start, run.new_start), (old, new));
        match run.kind {
            RunKind::Kept => {
                old += run.len;
                new += run.len;
            }
            RunKind::Deleted => old += run.len,
            RunKind::Inserted => new += run.len,
        }
    }
    assert_eq!((old, new), (a.len(), b.len()));

    for pair in script.runs().windows(2) {
        assert_ne!(pair[0].kind, pair[1].kind);
        assert!(!(pair[0].kind == RunKind::Inserted && pair[1].kind == RunKind::Deleted));
    }
    Ok(())
}

#[test]
fn test_predicate_error_aborts() {
    let a: Vec<SideIndex> = (0..10).map(SideIndex::baseline).collect();
    let b: Vec<SideIndex> = (0..10).map(SideIndex::baseline).collect();

    let result = align(&a, &b, |x, y| {
        let (i, j) = SideIndex::check_pair(*x, *y)?;
        Ok(i == j)
    });
    assert!(matches!(result, Err(Error::PredicateContract(Side::Baseline))));
}

#[test]
fn test_alignment_is_deterministic() -> Result<()> {
    let a = sequence(400, 1, 5);
    let b = sequence(410, 2, 5);

    let first = align_indices(a.len(), b.len(), |i, j| Ok(a[i] == b[j]))?;
    let second = align_indices(a.len(), b.len(), |i, j| Ok(a[i] == b[j]))?;
    assert_eq!(first, second);
    Ok(())
}
