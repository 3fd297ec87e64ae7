use super::edits::Edit;

/// Render line edits as a unified diff with `ctx` lines of context.
///
/// Returns an empty string when there are no edits. Hunks whose context
/// would touch or overlap are merged.
pub fn ctx_to_unified(
    from: &str,
    to: &str,
    a: &[&str],
    b: &[&str],
    edits: &[Edit],
    ctx: usize,
) -> String {
    if edits.is_empty() {
        return String::new();
    }

    let mut out = format!("--- {}\n+++ {}\n", from, to);
    for hunk in hunks(edits, ctx) {
        render_hunk(&mut out, a, b, hunk, ctx);
    }
    out
}

fn hunks(edits: &[Edit], ctx: usize) -> Vec<&[Edit]> {
    let mut groups = Vec::new();
    let mut first = 0;
    for i in 1..edits.len() {
        if edits[i].start - edits[i - 1].end > 2 * ctx {
            groups.push(&edits[first..i]);
            first = i;
        }
    }
    groups.push(&edits[first..]);
    groups
}

fn render_hunk(out: &mut String, a: &[&str], b: &[&str], hunk: &[Edit], ctx: usize) {
    let (Some(first), Some(last)) = (hunk.first(), hunk.last()) else {
        return;
    };

    let a_start = first.start.saturating_sub(ctx);
    let a_end = (last.end + ctx).min(a.len());
    let b_start = first.repl_start - (first.start - a_start);
    let b_end = last.repl_end + (a_end - last.end);

    out.push_str(&format!(
        "@@ -{} +{} @@\n",
        range(a_start, a_end - a_start),
        range(b_start, b_end - b_start)
    ));

    let mut pos = a_start;
    for e in hunk {
        for line in &a[pos..e.start] {
            push_line(out, ' ', line);
        }
        for line in &a[e.start..e.end] {
            push_line(out, '-', line);
        }
        for line in &b[e.repl_start..e.repl_end] {
            push_line(out, '+', line);
        }
        pos = e.end;
    }
    for line in &a[pos..a_end] {
        push_line(out, ' ', line);
    }
}

fn push_line(out: &mut String, tag: char, line: &str) {
    out.push(tag);
    out.push_str(line);
    out.push('\n');
}

fn range(start: usize, len: usize) -> String {
    if len == 0 {
        format!("{},0", start)
    } else {
        format!("{},{}", start + 1, len)
    }
}
