//! Linear-space divide-and-conquer shortest edit script.
//!
//! This is Myers' middle-snake algorithm: a forward and a backward frontier search meet
//! in the middle of the edit graph, the snake where they meet is kept, and the two
//! remaining sub-problems are solved recursively. Only the two frontier vectors are
//! allocated per call, sized `2 * min(N, M) + 2`, and every sub-problem covers a disjoint
//! range of both sequences, so no element pair is ever re-examined by a later call.
//!
//! The recursion records its result as two membership vectors (deleted elements of `a`,
//! inserted elements of `b`); [`EditScript`](super::EditScript) turns them into runs.

use crate::Result;

pub(super) struct Marks {
    pub deleted: Vec<bool>,
    pub inserted: Vec<bool>,
}

struct Search<'p, P> {
    eq: &'p mut P,
    marks: Marks,
}

#[inline]
fn wrap(k: isize, z: isize) -> usize {
    k.rem_euclid(z) as usize
}

/// Computes the deleted/inserted marks for sequences of length `n` and `m`.
///
/// `eq(i, j)` compares element `i` of the first sequence with element `j` of the second.
/// The first error returned by `eq` aborts the search.
pub(super) fn shortest_edit<P>(n: usize, m: usize, eq: &mut P) -> Result<Marks>
where
    P: FnMut(usize, usize) -> Result<bool>,
{
    let mut search = Search {
        eq,
        marks: Marks {
            deleted: vec![false; n],
            inserted: vec![false; m],
        },
    };
    search.run(0, n, 0, m)?;
    Ok(search.marks)
}

impl<P> Search<'_, P>
where
    P: FnMut(usize, usize) -> Result<bool>,
{
    /// Solves the sub-problem `a[i..i + n]` against `b[j..j + m]`.
    fn run(&mut self, i: usize, n: usize, j: usize, m: usize) -> Result<()> {
        if n == 0 {
            self.marks.inserted[j..j + m].fill(true);
            return Ok(());
        }
        if m == 0 {
            self.marks.deleted[i..i + n].fill(true);
            return Ok(());
        }

        let (big_n, big_m) = (n as isize, m as isize);
        let total = big_n + big_m;
        let z = 2 * big_n.min(big_m) + 2;
        let delta = big_n - big_m;

        let mut forward = vec![0isize; z as usize];
        let mut backward = vec![0isize; z as usize];

        let h_max = total / 2 + total % 2;
        for h in 0..=h_max {
            for pass in 0..2 {
                // o = 1 searches forward from the top-left corner, o = 0 backward from the
                // bottom-right corner; `sign` maps frontier offsets back to indices.
                let (c, d, o, sign): (&mut [isize], &[isize], isize, isize) = if pass == 0 {
                    (&mut forward, &backward, 1, 1)
                } else {
                    (&mut backward, &forward, 0, -1)
                };

                let k_lo = -(h - 2 * (h - big_m).max(0));
                let k_hi = h - 2 * (h - big_n).max(0);

                let mut k = k_lo;
                while k <= k_hi {
                    let (below, above) = (c[wrap(k - 1, z)], c[wrap(k + 1, z)]);
                    let mut a = if k == -h || (k != h && below < above) {
                        above
                    } else {
                        below + 1
                    };
                    let mut b = a - k;
                    let (s, t) = (a, b);

                    while a < big_n && b < big_m {
                        let x = (1 - o) * big_n + sign * a + (o - 1);
                        let y = (1 - o) * big_m + sign * b + (o - 1);
                        if !(self.eq)(i + x as usize, j + y as usize)? {
                            break;
                        }
                        a += 1;
                        b += 1;
                    }

                    c[wrap(k, z)] = a;
                    let opposite = -(k - delta);

                    if total % 2 == o
                        && opposite >= -(h - o)
                        && opposite <= h - o
                        && c[wrap(k, z)] + d[wrap(opposite, z)] >= big_n
                    {
                        let (distance, x, y, u, v) = if o == 1 {
                            (2 * h - 1, s, t, a, b)
                        } else {
                            (2 * h, big_n - a, big_m - b, big_n - s, big_m - t)
                        };

                        if distance > 1 || (x != u && y != v) {
                            self.run(i, x as usize, j, y as usize)?;
                            self.run(
                                i + u as usize,
                                (big_n - u) as usize,
                                j + v as usize,
                                (big_m - v) as usize,
                            )?;
                        } else if m > n {
                            self.run(i + n, 0, j + n, m - n)?;
                        } else if m < n {
                            self.run(i + m, n - m, j + m, 0)?;
                        }
                        return Ok(());
                    }

                    k += 2;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marks(a: &str, b: &str) -> (String, String) {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let mut eq = |i: usize, j: usize| -> Result<bool> { Ok(a[i] == b[j]) };
        let marks = shortest_edit(a.len(), b.len(), &mut eq).unwrap();

        let render = |m: &[bool]| -> String { m.iter().map(|&x| if x { '1' } else { '0' }).collect() };
        (render(&marks.deleted), render(&marks.inserted))
    }

    #[test]
    fn test_trivial_cases() {
        assert_eq!(marks("", ""), (String::new(), String::new()));
        assert_eq!(marks("abc", ""), ("111".to_string(), String::new()));
        assert_eq!(marks("", "ab"), (String::new(), "11".to_string()));
        assert_eq!(marks("abc", "abc"), ("000".to_string(), "000".to_string()));
    }

    #[test]
    fn test_single_edits() {
        assert_eq!(marks("abc", "ac"), ("010".to_string(), "00".to_string()));
        assert_eq!(marks("ac", "abc"), ("00".to_string(), "010".to_string()));
        assert_eq!(marks("abc", "abd"), ("001".to_string(), "001".to_string()));
    }

    #[test]
    fn test_edit_distance_is_minimal() {
        // classic example from Myers' paper: D = 5
        let (deleted, inserted) = marks("abcabba", "cbabac");
        let ones = |s: &str| s.chars().filter(|&c| c == '1').count();
        assert_eq!(ones(&deleted) + ones(&inserted), 5);
    }

    #[test]
    fn test_error_aborts() {
        let mut calls = 0;
        let mut eq = |_: usize, _: usize| -> Result<bool> {
            calls += 1;
            Err(crate::Error::Error("boom".to_string()))
        };
        assert!(shortest_edit(3, 3, &mut eq).is_err());
        assert_eq!(calls, 1);
    }
}
