//! Longest-common-subsequence sequence diff.
//!
//! Produces an edit script of coalesced runs between two sequences. The
//! reordering engine only consumes the `Insert` runs; `Remove` runs are the
//! same identifiers seen from their old positions.

/// One run of an edit script, borrowing from the input sequences.
#[derive(Debug, PartialEq, Eq)]
pub enum Change<'a, T> {
    /// Elements of the common subsequence.
    Keep(&'a [T]),
    /// Elements of `before` absent from the common subsequence.
    Remove(&'a [T]),
    /// Elements of `after` absent from the common subsequence.
    Insert(&'a [T]),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Step {
    Keep,
    Remove,
    Insert,
}

/// Compute the LCS length table for two slices.
fn lcs_table<T: PartialEq>(a: &[T], b: &[T]) -> Vec<Vec<u32>> {
    let m = a.len();
    let n = b.len();
    let mut table = vec![vec![0u32; n + 1]; m + 1];

    for i in 1..=m {
        for j in 1..=n {
            if a[i - 1] == b[j - 1] {
                table[i][j] = table[i - 1][j - 1] + 1;
            } else {
                table[i][j] = table[i - 1][j].max(table[i][j - 1]);
            }
        }
    }

    table
}

/// Length of the longest common subsequence of `a` and `b`.
pub fn lcs_len<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    lcs_table(a, b)[a.len()][b.len()] as usize
}

/// Edit script transforming `before` into `after`, in left-to-right order.
///
/// A shared prefix and suffix are peeled off before the quadratic table is
/// built; in the common case (a few tabs out of place) that keeps the table
/// small.
pub fn diff<'a, T: PartialEq>(before: &'a [T], after: &'a [T]) -> Vec<Change<'a, T>> {
    let prefix = before
        .iter()
        .zip(after.iter())
        .take_while(|(x, y)| x == y)
        .count();
    let suffix = before[prefix..]
        .iter()
        .rev()
        .zip(after[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    let a = &before[prefix..before.len() - suffix];
    let b = &after[prefix..after.len() - suffix];

    let mut steps = vec![Step::Keep; prefix];
    steps.extend(backtrack(a, b));
    steps.extend(std::iter::repeat(Step::Keep).take(suffix));

    coalesce(before, after, &steps)
}

fn backtrack<T: PartialEq>(a: &[T], b: &[T]) -> Vec<Step> {
    let table = lcs_table(a, b);
    let mut steps = Vec::with_capacity(a.len() + b.len());

    let mut i = a.len();
    let mut j = b.len();

    while i > 0 || j > 0 {
        if i > 0 && j > 0 && a[i - 1] == b[j - 1] {
            steps.push(Step::Keep);
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || table[i][j - 1] >= table[i - 1][j]) {
            steps.push(Step::Insert);
            j -= 1;
        } else {
            steps.push(Step::Remove);
            i -= 1;
        }
    }

    steps.reverse();
    steps
}

fn coalesce<'a, T>(before: &'a [T], after: &'a [T], steps: &[Step]) -> Vec<Change<'a, T>> {
    let mut changes = Vec::new();
    let (mut i, mut j) = (0usize, 0usize);
    let mut k = 0;

    while k < steps.len() {
        let step = steps[k];
        let run = steps[k..].iter().take_while(|s| **s == step).count();
        match step {
            Step::Keep => {
                changes.push(Change::Keep(&before[i..i + run]));
                i += run;
                j += run;
            }
            Step::Remove => {
                changes.push(Change::Remove(&before[i..i + run]));
                i += run;
            }
            Step::Insert => {
                changes.push(Change::Insert(&after[j..j + run]));
                j += run;
            }
        }
        k += run;
    }

    changes
}
