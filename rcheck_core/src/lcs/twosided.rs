use super::common::{fix, Diag};

const NONE: isize = isize::MIN;

/// Furthest-reaching x per diagonal, one row per edit distance.
struct Labels {
    limit: usize,
    rows: Vec<Vec<isize>>,
}

impl Labels {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            rows: Vec::with_capacity(limit),
        }
    }

    fn push_row(&mut self) {
        self.rows.push(vec![NONE; 2 * self.limit + 1]);
    }

    fn get(&self, d: usize, k: isize) -> isize {
        if k.unsigned_abs() > d {
            return NONE;
        }
        match self.rows.get(d) {
            Some(row) => row[(k + self.limit as isize) as usize],
            None => NONE,
        }
    }

    fn set(&mut self, d: usize, k: isize, x: isize) {
        let idx = (k + self.limit as isize) as usize;
        self.rows[d][idx] = x;
    }
}

/// Where the forward and backward searches met.
#[derive(Debug, Clone, Copy)]
struct Meet {
    df: usize,
    kf: isize,
    db: usize,
    kb: isize,
}

/// Myers edit graph searched from both corners at once.
///
/// Diagonal `k` holds the points with `x - y == k`. The backward search
/// indexes its diagonals relative to `delta = n - m` so both label tables
/// are centered on their own start corner.
pub(crate) struct EditGraph<'a, T> {
    a: &'a [T],
    b: &'a [T],
    n: isize,
    m: isize,
    delta: isize,
    limit: usize,
    fwd: Labels,
    bwd: Labels,
}

impl<'a, T: PartialEq> EditGraph<'a, T> {
    pub(crate) fn new(a: &'a [T], b: &'a [T], limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            a,
            b,
            n: a.len() as isize,
            m: b.len() as isize,
            delta: a.len() as isize - b.len() as isize,
            limit,
            fwd: Labels::new(limit),
            bwd: Labels::new(limit),
        }
    }

    /// Longest common subsequence as ordered diagonals.
    ///
    /// Gives up after `limit` rounds and returns the best partial result,
    /// which is still a valid common subsequence.
    pub(crate) fn lcs(mut self) -> Vec<Diag> {
        if self.a.is_empty() || self.b.is_empty() {
            return Vec::new();
        }

        for d in 0..self.limit {
            self.forward_step(d);
            if let Some(meet) = self.overlap_after_forward(d) {
                return self.join(meet);
            }
            self.backward_step(d);
            if let Some(meet) = self.overlap_after_backward(d) {
                return self.join(meet);
            }
        }

        self.best_effort()
    }

    fn in_grid(&self, x: isize, k: isize) -> bool {
        let y = x - k;
        (0..=self.n).contains(&x) && (0..=self.m).contains(&y)
    }

    /// Start of the snake on diagonal `k` at distance `d`, and the diagonal
    /// it came from. Moving down keeps x, moving right adds one; the larger
    /// x wins and ties go down.
    fn forward_move(&self, d: usize, k: isize) -> Option<(isize, isize)> {
        if d == 0 {
            return (k == 0).then_some((0, 0));
        }

        let mut best = None;
        let down = self.fwd.get(d - 1, k + 1);
        if down != NONE && self.in_grid(down, k) {
            best = Some((down, k + 1));
        }
        let right = self.fwd.get(d - 1, k - 1);
        if right != NONE && self.in_grid(right + 1, k) {
            match best {
                Some((x, _)) if x >= right + 1 => {}
                _ => best = Some((right + 1, k - 1)),
            }
        }
        best
    }

    /// Mirror of [`Self::forward_move`]: moving left subtracts one from x,
    /// moving up keeps it; the smaller x wins and ties go up. `kb` is
    /// relative to `delta`.
    fn backward_move(&self, d: usize, kb: isize) -> Option<(isize, isize)> {
        if d == 0 {
            return (kb == 0).then_some((self.n, 0));
        }

        let k = kb + self.delta;
        let mut best = None;
        let left = self.bwd.get(d - 1, kb + 1);
        if left != NONE && self.in_grid(left - 1, k) {
            best = Some((left - 1, kb + 1));
        }
        let up = self.bwd.get(d - 1, kb - 1);
        if up != NONE && self.in_grid(up, k) {
            match best {
                Some((x, _)) if x < up => {}
                _ => best = Some((up, kb - 1)),
            }
        }
        best
    }

    fn snake_forward(&self, mut x: isize, k: isize) -> isize {
        let mut y = x - k;
        while x < self.n && y < self.m && self.a[x as usize] == self.b[y as usize] {
            x += 1;
            y += 1;
        }
        x
    }

    fn snake_backward(&self, mut x: isize, k: isize) -> isize {
        let mut y = x - k;
        while x > 0 && y > 0 && self.a[(x - 1) as usize] == self.b[(y - 1) as usize] {
            x -= 1;
            y -= 1;
        }
        x
    }

    fn forward_step(&mut self, d: usize) {
        self.fwd.push_row();
        let d_signed = d as isize;
        let mut k = -d_signed;
        while k <= d_signed {
            if let Some((start, _)) = self.forward_move(d, k) {
                let x = self.snake_forward(start, k);
                self.fwd.set(d, k, x);
            }
            k += 2;
        }
    }

    fn backward_step(&mut self, d: usize) {
        self.bwd.push_row();
        let d_signed = d as isize;
        let mut kb = -d_signed;
        while kb <= d_signed {
            if let Some((start, _)) = self.backward_move(d, kb) {
                let x = self.snake_backward(start, kb + self.delta);
                self.bwd.set(d, kb, x);
            }
            kb += 2;
        }
    }

    fn overlap_after_forward(&self, d: usize) -> Option<Meet> {
        if d == 0 {
            return None;
        }
        let db = d - 1;
        let d_signed = d as isize;
        let mut k = -d_signed;
        while k <= d_signed {
            let kb = k - self.delta;
            if kb.unsigned_abs() <= db && (kb + db as isize) % 2 == 0 {
                let xf = self.fwd.get(d, k);
                let xb = self.bwd.get(db, kb);
                if xf != NONE && xb != NONE && xb <= xf {
                    return Some(Meet { df: d, kf: k, db, kb });
                }
            }
            k += 2;
        }
        None
    }

    fn overlap_after_backward(&self, d: usize) -> Option<Meet> {
        let d_signed = d as isize;
        let mut kb = -d_signed;
        while kb <= d_signed {
            let k = kb + self.delta;
            if k.unsigned_abs() <= d && (k + d_signed) % 2 == 0 {
                let xf = self.fwd.get(d, k);
                let xb = self.bwd.get(d, kb);
                if xf != NONE && xb != NONE && xb <= xf {
                    return Some(Meet { df: d, kf: k, db: d, kb });
                }
            }
            kb += 2;
        }
        None
    }

    fn join(&self, meet: Meet) -> Vec<Diag> {
        let mut diags = self.forward_lcs(meet.df, meet.kf);

        // Only the part of the backward path past the forward end point.
        let xf = self.fwd.get(meet.df, meet.kf);
        let (xf, yf) = (xf as usize, (xf - meet.kf) as usize);
        diags.extend(
            self.backward_lcs(meet.db, meet.kb)
                .into_iter()
                .filter_map(|d| {
                    let skip = xf.saturating_sub(d.x).max(yf.saturating_sub(d.y));
                    (skip < d.len).then(|| Diag::new(d.x + skip, d.y + skip, d.len - skip))
                }),
        );
        fix(diags)
    }

    /// Diagonals on the forward path ending at `(d, k)`, in order.
    fn forward_lcs(&self, mut d: usize, mut k: isize) -> Vec<Diag> {
        let mut out = Vec::new();
        loop {
            let end = self.fwd.get(d, k);
            let Some((start, prev)) = self.forward_move(d, k) else {
                break;
            };
            if end != NONE && end > start {
                out.push(Diag::new(
                    start as usize,
                    (start - k) as usize,
                    (end - start) as usize,
                ));
            }
            if d == 0 {
                break;
            }
            d -= 1;
            k = prev;
        }
        out.reverse();
        out
    }

    /// Diagonals on the backward path ending at `(d, kb)`.
    fn backward_lcs(&self, mut d: usize, mut kb: isize) -> Vec<Diag> {
        let mut out = Vec::new();
        loop {
            let k = kb + self.delta;
            let end = self.bwd.get(d, kb);
            let Some((start, prev)) = self.backward_move(d, kb) else {
                break;
            };
            if end != NONE && start > end {
                out.push(Diag::new(
                    end as usize,
                    (end - k) as usize,
                    (start - end) as usize,
                ));
            }
            if d == 0 {
                break;
            }
            d -= 1;
            kb = prev;
        }
        out
    }

    /// Combine the furthest forward point with the furthest backward point
    /// of the last round.
    fn best_effort(&self) -> Vec<Diag> {
        let d = self.limit - 1;
        let d_signed = d as isize;

        let mut forward: Option<(isize, isize)> = None;
        let mut backward: Option<(isize, isize)> = None;
        let mut k = -d_signed;
        while k <= d_signed {
            let xf = self.fwd.get(d, k);
            if xf != NONE && forward.map_or(true, |(best, _)| 2 * xf - k > best) {
                forward = Some((2 * xf - k, k));
            }
            let xb = self.bwd.get(d, k);
            let kf = k + self.delta;
            if xb != NONE && backward.map_or(true, |(best, _)| 2 * xb - kf < best) {
                backward = Some((2 * xb - kf, k));
            }
            k += 2;
        }

        let mut diags = Vec::new();
        if let Some((_, k)) = forward {
            diags.extend(self.forward_lcs(d, k));
        }
        if let Some((_, kb)) = backward {
            diags.extend(self.backward_lcs(d, kb));
        }
        fix(diags)
    }
}
