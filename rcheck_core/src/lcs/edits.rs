use super::common::Diag;

/// Replace `a[start..end]` with `b[repl_start..repl_end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub repl_start: usize,
    pub repl_end: usize,
}

impl Edit {
    pub fn new(start: usize, end: usize, repl_start: usize, repl_end: usize) -> Self {
        Self {
            start,
            end,
            repl_start,
            repl_end,
        }
    }

    pub fn is_delete(&self) -> bool {
        self.repl_start == self.repl_end
    }

    pub fn is_insert(&self) -> bool {
        self.start == self.end
    }
}

/// Turn an ordered common subsequence of `a` (length `n`) and `b`
/// (length `m`) into the edits covering every gap between its diagonals.
pub fn to_edits(diags: &[Diag], n: usize, m: usize) -> Vec<Edit> {
    let mut edits = Vec::new();
    let (mut x, mut y) = (0, 0);
    for d in diags {
        if d.x > x || d.y > y {
            edits.push(Edit::new(x, d.x, y, d.y));
        }
        x = d.x + d.len;
        y = d.y + d.len;
    }
    if x < n || y < m {
        edits.push(Edit::new(x, n, y, m));
    }
    edits
}

/// Rebuild `b` from `a` and the edits produced by [`to_edits`].
pub fn apply_edits<T: Clone>(a: &[T], b: &[T], edits: &[Edit]) -> Vec<T> {
    let mut out = Vec::with_capacity(b.len());
    let mut pos = 0;
    for e in edits {
        out.extend_from_slice(&a[pos..e.start]);
        out.extend_from_slice(&b[e.repl_start..e.repl_end]);
        pos = e.end;
    }
    out.extend_from_slice(&a[pos..]);
    out
}
