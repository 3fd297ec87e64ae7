//! Longest common subsequence by a two-sided Myers search, and the edit
//! scripts and unified diffs built from it.

mod common;
mod edits;
mod twosided;
mod unified;

pub use common::Diag;
pub use edits::{apply_edits, to_edits, Edit};
pub use unified::ctx_to_unified;

use twosided::EditGraph;

/// Rounds of the search before settling for a partial result.
pub const DEFAULT_LIMIT: usize = 50;

/// Lines of context around each hunk of a unified diff.
pub const DEFAULT_CONTEXT: usize = 2;

pub fn compute_lcs<T: PartialEq>(a: &[T], b: &[T]) -> Vec<Diag> {
    compute_lcs_limited(a, b, DEFAULT_LIMIT)
}

pub fn compute_lcs_limited<T: PartialEq>(a: &[T], b: &[T], limit: usize) -> Vec<Diag> {
    EditGraph::new(a, b, limit).lcs()
}

/// Edits between two sequences.
pub fn diff<T: PartialEq>(a: &[T], b: &[T]) -> Vec<Edit> {
    to_edits(&compute_lcs(a, b), a.len(), b.len())
}

/// Edits between the `\n` separated lines of two strings; indexes are line numbers.
pub fn diff_lines(a: &str, b: &str) -> Vec<Edit> {
    let a: Vec<&str> = a.split('\n').collect();
    let b: Vec<&str> = b.split('\n').collect();
    diff(&a, &b)
}

/// Edits between two byte strings.
pub fn diff_bytes(a: &[u8], b: &[u8]) -> Vec<Edit> {
    diff(a, b)
}

/// Edits between two strings; indexes are char positions.
pub fn diff_chars(a: &str, b: &str) -> Vec<Edit> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    diff(&a, &b)
}

/// Unified line diff of two texts labelled `from` and `to`.
pub fn unified(from: &str, to: &str, a: &str, b: &str, ctx: usize) -> String {
    let a_lines: Vec<&str> = a.split('\n').collect();
    let b_lines: Vec<&str> = b.split('\n').collect();
    let edits = diff(&a_lines, &b_lines);
    ctx_to_unified(from, to, &a_lines, &b_lines, &edits, ctx)
}
