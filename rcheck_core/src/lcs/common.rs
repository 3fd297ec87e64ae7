/// A run of matching elements: `a[x..x + len] == b[y..y + len]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Diag {
    pub x: usize,
    pub y: usize,
    pub len: usize,
}

impl Diag {
    pub fn new(x: usize, y: usize, len: usize) -> Self {
        Self { x, y, len }
    }

    /// Whether `self` lies strictly before `other` in both sequences.
    pub fn precedes(&self, other: &Diag) -> bool {
        self.x + self.len <= other.x && self.y + self.len <= other.y
    }
}

/// Resolve overlaps between diagonals found by the forward and backward
/// passes.
///
/// Longer diagonals win. Shorter ones are cut down to the parts that fit
/// before or after every diagonal already kept. The result is ordered by `x`
/// and is increasing in both coordinates.
pub(crate) fn fix(mut diags: Vec<Diag>) -> Vec<Diag> {
    diags.retain(|d| d.len > 0);
    diags.sort_by(|a, b| b.len.cmp(&a.len));

    let mut kept: Vec<Diag> = Vec::with_capacity(diags.len());
    for diag in diags {
        let mut pending = vec![diag];
        for k in &kept {
            pending = pending.into_iter().flat_map(|d| trim(d, k)).collect();
            if pending.is_empty() {
                break;
            }
        }
        kept.extend(pending);
    }

    kept.sort_by_key(|d| d.x);
    kept
}

/// The parts of `d` that do not conflict with `k`.
fn trim(d: Diag, k: &Diag) -> Vec<Diag> {
    if d.precedes(k) || k.precedes(&d) {
        return vec![d];
    }

    let mut out = Vec::with_capacity(2);

    let before = k
        .x
        .saturating_sub(d.x)
        .min(k.y.saturating_sub(d.y))
        .min(d.len);
    if before > 0 {
        out.push(Diag::new(d.x, d.y, before));
    }

    let after = (k.x + k.len)
        .saturating_sub(d.x)
        .max((k.y + k.len).saturating_sub(d.y));
    if after < d.len {
        out.push(Diag::new(d.x + after, d.y + after, d.len - after));
    }

    out
}
