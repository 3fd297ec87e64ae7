use std::any::Any;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Sentinel cause of every notice that does not wrap another error.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("expectation violated")]
pub struct NoticeSentinel;

static SENTINEL: NoticeSentinel = NoticeSentinel;

/// Header used by multi-notice renderings.
pub const MULTI_HEADER: &str = "multiple expectations violated";

type Cause = Box<dyn Error + Send + Sync + 'static>;

/// A named row of a notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    name: String,
    value: String,
}

impl Row {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// One notice of a chain
#[derive(Clone)]
struct Entry {
    header: String,
    trail: String,
    rows: Vec<Row>,
    meta: HashMap<String, Arc<dyn Any + Send + Sync>>,
    cause: Option<Arc<dyn Error + Send + Sync + 'static>>,
}

impl Entry {
    fn new(header: String) -> Self {
        Self {
            header,
            trail: String::new(),
            rows: Vec::new(),
            meta: HashMap::new(),
            cause: None,
        }
    }
}

/// Structured assertion failure.
///
/// Notices form a doubly linked chain. A `Notice` is one position in its
/// chain: accessors and builders act on the notice at that position,
/// [`Notice::prev`] and [`Notice::next`] move along the chain, and the
/// rendering always covers the whole chain starting at its head.
///
/// Positions share the chain until one of them is modified, so moving
/// around is cheap.
#[derive(Clone)]
pub struct Notice {
    chain: Arc<Vec<Entry>>,
    at: usize,
}

impl Notice {
    pub fn new(header: impl Into<String>) -> Self {
        Self::from_entries(vec![Entry::new(header.into())], 0)
    }

    fn from_entries(entries: Vec<Entry>, at: usize) -> Self {
        Self {
            chain: Arc::new(entries),
            at,
        }
    }

    fn into_entries(self) -> Vec<Entry> {
        Arc::try_unwrap(self.chain).unwrap_or_else(|chain| (*chain).clone())
    }

    fn entry(&self) -> &Entry {
        &self.chain[self.at]
    }

    fn entry_mut(&mut self) -> &mut Entry {
        &mut Arc::make_mut(&mut self.chain)[self.at]
    }

    fn moved(&self, at: usize) -> Notice {
        Notice {
            chain: Arc::clone(&self.chain),
            at,
        }
    }

    /// Promote any error to a notice.
    ///
    /// An error that already is a notice keeps its rows and gets its header
    /// prefixed with `[prefix]`. Any other error becomes the cause of a new
    /// `assertion error` notice.
    pub fn from_error(err: Cause, prefix: Option<&str>) -> Self {
        match err.downcast::<Notice>() {
            Ok(notice) => {
                let mut notice = *notice;
                if let Some(prefix) = prefix {
                    let entry = notice.entry_mut();
                    entry.header = format!("[{}] {}", prefix, entry.header);
                }
                notice
            }
            Err(err) => {
                let header = match prefix {
                    Some(prefix) => format!("[{}] assertion error", prefix),
                    None => "assertion error".to_string(),
                };
                Notice::new(header).wrap(err)
            }
        }
    }

    pub fn header(&self) -> &str {
        &self.entry().header
    }

    pub fn set_header(mut self, header: impl Into<String>) -> Self {
        self.entry_mut().header = header.into();
        self
    }

    pub fn trail(&self) -> &str {
        &self.entry().trail
    }

    pub fn set_trail(mut self, trail: impl Into<String>) -> Self {
        self.entry_mut().trail = trail.into();
        self
    }

    /// Replace the cause of this notice.
    pub fn wrap(mut self, err: impl Into<Cause>) -> Self {
        let cause: Cause = err.into();
        self.entry_mut().cause = Some(Arc::from(cause));
        self
    }

    /// The wrapped cause, or [`NoticeSentinel`] when nothing was wrapped.
    pub fn cause(&self) -> &(dyn Error + Send + Sync + 'static) {
        match &self.entry().cause {
            Some(cause) => cause.as_ref(),
            None => &SENTINEL,
        }
    }

    /// Whether the cause is of type `E`.
    pub fn is<E: Error + 'static>(&self) -> bool {
        self.cause().downcast_ref::<E>().is_some()
    }

    /// Set a row, replacing the value of an existing row in place.
    pub fn append(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let (name, value) = (name.into(), value.into());
        let rows = &mut self.entry_mut().rows;
        match rows.iter_mut().find(|r| r.name == name) {
            Some(row) => row.value = value,
            None => rows.push(Row { name, value }),
        }
        self
    }

    /// Insert a row first, or replace the value of an existing row in place.
    pub fn prepend(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let (name, value) = (name.into(), value.into());
        let rows = &mut self.entry_mut().rows;
        match rows.iter_mut().find(|r| r.name == name) {
            Some(row) => row.value = value,
            None => rows.insert(0, Row { name, value }),
        }
        self
    }

    pub fn append_row(mut self, rows: impl IntoIterator<Item = Row>) -> Self {
        for row in rows {
            self = self.append(row.name, row.value);
        }
        self
    }

    pub fn remove(mut self, name: &str) -> Self {
        self.entry_mut().rows.retain(|r| r.name != name);
        self
    }

    pub fn want(self, value: impl Into<String>) -> Self {
        self.append("want", value)
    }

    pub fn have(self, value: impl Into<String>) -> Self {
        self.append("have", value)
    }

    pub fn rows(&self) -> &[Row] {
        &self.entry().rows
    }

    pub fn row(&self, name: &str) -> Option<&str> {
        self.rows()
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.value.as_str())
    }

    pub fn meta_set(mut self, key: impl Into<String>, value: impl Any + Send + Sync) -> Self {
        self.entry_mut().meta.insert(key.into(), Arc::new(value));
        self
    }

    pub fn meta_lookup(&self, key: &str) -> Option<&(dyn Any + Send + Sync)> {
        self.entry().meta.get(key).map(|v| v.as_ref())
    }

    /// Typed access to a metadata entry.
    pub fn meta<T: Any>(&self, key: &str) -> Option<&T> {
        self.meta_lookup(key).and_then(|v| v.downcast_ref::<T>())
    }

    /// First notice of the chain. It has no previous notice.
    pub fn head(&self) -> Notice {
        self.moved(0)
    }

    /// Last notice of the chain. It has no next notice.
    pub fn tail(&self) -> Notice {
        self.moved(self.chain.len() - 1)
    }

    pub fn prev(&self) -> Option<Notice> {
        self.at.checked_sub(1).map(|at| self.moved(at))
    }

    pub fn next(&self) -> Option<Notice> {
        let at = self.at + 1;
        (at < self.chain.len()).then(|| self.moved(at))
    }

    /// Index of this notice in its chain, the head being 0.
    pub fn position(&self) -> usize {
        self.at
    }

    /// Every notice of the chain, head first.
    pub fn iter(&self) -> Iter {
        Iter {
            chain: Arc::clone(&self.chain),
            next: 0,
        }
    }

    /// Number of notices in the chain.
    pub fn chain_len(&self) -> usize {
        self.chain.len()
    }

    /// Link this notice's chain after the tail of `prev`. Returns this
    /// notice, positioned in the combined chain.
    pub fn chain(self, prev: Notice) -> Notice {
        let at = prev.chain_len() + self.at;
        let mut entries = prev.into_entries();
        entries.extend(self.into_entries());
        Notice::from_entries(entries, at)
    }
}

impl Entry {
    fn render_rows(&self, longest: usize) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        if !self.trail.is_empty() {
            lines.push(render_row("trail", &self.trail, longest));
        }
        for row in &self.rows {
            lines.push(render_row(&row.name, &row.value, longest));
        }
        lines
    }
}

fn render_row(name: &str, value: &str, longest: usize) -> String {
    if !value.contains('\n') {
        return format!("  {:>width$}: {}", name, value, width = longest);
    }

    let indent = " ".repeat(longest + 4);
    let mut out = format!("  {:>width$}:", name, width = longest);
    for (i, line) in value.split('\n').enumerate() {
        if i == 0 && line.is_empty() {
            continue;
        }
        out.push('\n');
        if !line.is_empty() {
            out.push_str(&indent);
            out.push_str(line);
        }
    }
    out
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nodes = self.chain.as_slice();
        let multi = nodes.len() > 1;

        let mut longest = if multi { "error".len() } else { 0 };
        for node in nodes {
            if !node.trail.is_empty() {
                longest = longest.max("trail".len());
            }
            for row in &node.rows {
                longest = longest.max(row.name.chars().count());
            }
        }

        if !multi {
            let node = &nodes[0];
            let lines = node.render_rows(longest);
            if lines.is_empty() {
                return f.write_str(&node.header);
            }
            return write!(f, "{}:\n{}", node.header, lines.join("\n"));
        }

        let blocks: Vec<String> = nodes
            .iter()
            .map(|node| {
                let mut lines = vec![render_row("error", &node.header, longest)];
                lines.extend(node.render_rows(longest));
                lines.join("\n")
            })
            .collect();
        let separator = format!("\n{:>width$}\n", "---", width = longest + 4);
        write!(f, "{}:\n{}", MULTI_HEADER, blocks.join(&separator))
    }
}

impl fmt::Debug for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notice")
            .field("header", &self.header())
            .field("trail", &self.trail())
            .field("rows", &self.rows())
            .field("position", &self.at)
            .field("chain_len", &self.chain_len())
            .finish_non_exhaustive()
    }
}

impl Error for Notice {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.cause())
    }
}

/// Iterator over a notice chain, head first
pub struct Iter {
    chain: Arc<Vec<Entry>>,
    next: usize,
}

impl Iterator for Iter {
    type Item = Notice;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.chain.len() {
            return None;
        }
        let notice = Notice {
            chain: Arc::clone(&self.chain),
            at: self.next,
        };
        self.next += 1;
        Some(notice)
    }
}

impl IntoIterator for &Notice {
    type Item = Notice;
    type IntoIter = Iter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Chain notices in order, skipping `None`. Chains passed in are kept
/// whole. Returns the tail of the result.
pub fn join<I>(notices: I) -> Option<Notice>
where
    I: IntoIterator,
    I::Item: Into<Option<Notice>>,
{
    let entries: Vec<Entry> = notices
        .into_iter()
        .filter_map(Into::into)
        .flat_map(Notice::into_entries)
        .collect();
    let tail = entries.len().checked_sub(1)?;
    Some(Notice::from_entries(entries, tail))
}

/// Stable sort of the chain `notice` belongs to. Returns the new tail.
pub fn sort_notices<F>(notice: Notice, mut cmp: F) -> Notice
where
    F: FnMut(&Notice, &Notice) -> Ordering,
{
    let mut nodes: Vec<Notice> = notice
        .into_entries()
        .into_iter()
        .map(|entry| Notice::from_entries(vec![entry], 0))
        .collect();
    nodes.sort_by(|a, b| cmp(a, b));

    let entries: Vec<Entry> = nodes.into_iter().flat_map(Notice::into_entries).collect();
    let tail = entries.len() - 1;
    Notice::from_entries(entries, tail)
}

/// Order notices by trail.
pub fn trail_cmp(a: &Notice, b: &Notice) -> Ordering {
    a.trail().cmp(b.trail())
}
