use crate::dump::{bytes_dumper, Dump};
use crate::notice::{join, Notice};
use crate::options::Options;
use crate::reflect::Reflect;
use crate::trail;
use crate::value::{Data, Field, Kind, Value};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

pub const HEADER_EQUAL: &str = "expected values to be equal";
pub const HEADER_NOT_EQUAL: &str = "expected values not to be equal";
pub const HEADER_CANNOT_COMPARE: &str = "cannot compare values";

const BYTE_TYPES: [&str; 2] = ["Vec<u8>", "&[u8]"];

/// Deep equality of `want` and `have`.
///
/// Every mismatch found inside compound values is reported; the returned
/// notice is a chain with one entry per mismatch.
pub fn equal<W, H>(want: &W, have: &H, opts: &Options) -> Result<(), Notice>
where
    W: Reflect + ?Sized,
    H: Reflect + ?Sized,
{
    let want = want.reflect().unwrap_interface();
    let have = have.reflect().unwrap_interface();
    equal_values(&want, &have, opts)
}

/// [`equal`] for already reflected values.
pub fn equal_values(want: &Value, have: &Value, opts: &Options) -> Result<(), Notice> {
    Walker::new(opts).walk(want, have, opts.trail().to_string(), true)
}

pub fn not_equal<W, H>(want: &W, have: &H, opts: &Options) -> Result<(), Notice>
where
    W: Reflect + ?Sized,
    H: Reflect + ?Sized,
{
    let want = want.reflect().unwrap_interface();
    let have = have.reflect().unwrap_interface();
    if equal_values(&want, &have, opts).is_err() {
        return Ok(());
    }

    let dump = compare_dump(opts);
    Err(Notice::new(HEADER_NOT_EQUAL)
        .set_trail(opts.trail())
        .want(dump.value(&want))
        .have(dump.value(&have)))
}

/// Check that `have` has length `want`. The observed length is kept in the
/// notice metadata under `len`.
pub fn equal_len<T: Reflect + ?Sized>(want: usize, have: &T, opts: &Options) -> Result<(), Notice> {
    let have = have.reflect().unwrap_interface();
    let Some(len) = have.len() else {
        return Err(Notice::new(HEADER_CANNOT_COMPARE)
            .set_trail(opts.trail())
            .append("cause", format!("value of type {} has no length", have.ty()))
            .append("hint", "use a string, slice, array or map"));
    };
    if len == want {
        return Ok(());
    }

    let dump = compare_dump(opts);
    Err(Notice::new("expected value to have length")
        .set_trail(opts.trail())
        .append("want len", want.to_string())
        .append("have len", len.to_string())
        .have(dump.value(&have))
        .meta_set("len", len))
}

/// The dumper used for comparison output: the configured one plus the
/// byte dumper when none is registered for byte slices.
pub(crate) fn compare_dump(opts: &Options) -> Dump {
    let mut cfg = opts.dump_config().clone();
    for name in BYTE_TYPES {
        if !cfg.has_dumper(name) {
            cfg = cfg.with_dumper_fn(name, bytes_dumper());
        }
    }
    Dump::new(cfg)
}

struct Walker<'a> {
    opts: &'a Options,
    dump: Dump,
    keys: Dump,
    visited: HashSet<(usize, usize, String)>,
}

impl<'a> Walker<'a> {
    fn new(opts: &'a Options) -> Self {
        let dump = compare_dump(opts);
        let keys = dump.reconfigure(|cfg| cfg.flat = true);
        Self {
            opts,
            dump,
            keys,
            visited: HashSet::new(),
        }
    }

    fn walk(&mut self, want: &Value, have: &Value, trail: String, exported: bool) -> Result<(), Notice> {
        if self.opts.is_skipped(&trail) || (!exported && self.opts.skip_unexported()) {
            debug!(trail = %trail, "skipping");
            self.opts.log_trail(&trail::skipped(&trail));
            return Ok(());
        }

        match (want.is_untyped_nil(), have.is_untyped_nil()) {
            (true, true) => {
                self.opts.log_trail(&trail);
                return Ok(());
            }
            (true, false) | (false, true) => {
                self.opts.log_trail(&trail);
                return Err(self.equal_error(want, have, &trail));
            }
            (false, false) => {}
        }

        if want.kind() == Kind::Opaque || have.kind() == Kind::Opaque {
            self.opts.log_trail(&trail);
            return Err(cannot_compare(&trail));
        }

        if want.ty() != have.ty() {
            if self.opts.cmp_base_types() && want.kind() == have.kind() && want.kind().is_primitive() {
                return self.walk(&want.base(), &have.base(), trail, exported);
            }
            self.opts.log_trail(&trail);
            return Err(Notice::new(HEADER_EQUAL)
                .set_trail(&trail)
                .append("want type", want.ty().name())
                .append("have type", have.ty().name()));
        }

        if want.kind() == Kind::Pointer {
            if let (Some(w), Some(h)) = (want.addr(), have.addr()) {
                if !self.visited.insert((w, h, want.ty().name().to_string())) {
                    trace!(trail = %trail, "already visited");
                    return Ok(());
                }
            }
        }

        let checker = self
            .opts
            .trail_checker(&trail)
            .or_else(|| self.opts.type_checker(want.ty()))
            .cloned();
        if let Some(checker) = checker {
            debug!(trail = %trail, type_name = want.ty().name(), "custom checker");
            self.opts.log_trail(&trail);
            return checker(want, have, &self.opts.at_trail(&trail));
        }

        self.dispatch(want, have, trail)
    }

    fn dispatch(&mut self, want: &Value, have: &Value, trail: String) -> Result<(), Notice> {
        match (want.data(), have.data()) {
            (Data::Pointer(w), Data::Pointer(h)) => {
                if w.is_none() && h.is_none() {
                    self.opts.log_trail(&trail);
                    return Ok(());
                }
                let w = w.as_ref().map_or_else(Value::nil, |p| p.load());
                let h = h.as_ref().map_or_else(Value::nil, |p| p.load());
                self.walk(&w, &h, trail, true)
            }
            (Data::Interface(w), Data::Interface(h)) => {
                let nil = Value::nil();
                let w = w.as_deref().unwrap_or(&nil);
                let h = h.as_deref().unwrap_or(&nil);
                self.walk(w, h, trail, true)
            }
            (Data::Struct(w), Data::Struct(h)) => self.structure(want, w, h, trail),
            (Data::List { items: w, addr: wa }, Data::List { items: h, addr: ha }) => {
                if w.len() != h.len() {
                    self.opts.log_trail(&trail);
                    return Err(self.len_error(want, have, w.len(), h.len(), &trail));
                }
                if want.kind() == Kind::Slice && wa.is_some() && wa == ha && want.identical(have) {
                    self.opts.log_trail(&trail);
                    return Ok(());
                }
                self.list(want.kind(), w, h, &trail)
            }
            (Data::Map { entries: w, addr: wa }, Data::Map { entries: h, addr: ha }) => {
                let w = w.as_deref().unwrap_or(&[]);
                let h = h.as_deref().unwrap_or(&[]);
                if w.len() != h.len() {
                    self.opts.log_trail(&trail);
                    return Err(self.len_error(want, have, w.len(), h.len(), &trail));
                }
                if wa.is_some() && wa == ha && want.identical(have) {
                    self.opts.log_trail(&trail);
                    return Ok(());
                }
                self.map(w, h, &trail)
            }
            (Data::Chan(w), Data::Chan(h)) | (Data::Func(w), Data::Func(h)) => {
                self.opts.log_trail(&trail);
                if w == h {
                    Ok(())
                } else {
                    Err(self.address_error(want, have, &trail))
                }
            }
            (Data::Raw(w), Data::Raw(h)) => {
                self.opts.log_trail(&trail);
                if w == h {
                    Ok(())
                } else {
                    Err(self.address_error(want, have, &trail))
                }
            }
            (Data::Time(w), Data::Time(h)) => self.leaf(w == h && w.offset() == h.offset(), want, have, &trail),
            (Data::Duration(w), Data::Duration(h)) => self.leaf(w == h, want, have, &trail),
            (Data::Zone(w), Data::Zone(h)) => self.leaf(w == h, want, have, &trail),
            (Data::Bool(w), Data::Bool(h)) => self.leaf(w == h, want, have, &trail),
            (Data::Int(w), Data::Int(h)) => self.leaf(w == h, want, have, &trail),
            (Data::Uint(w), Data::Uint(h)) => self.leaf(w == h, want, have, &trail),
            (Data::Float(w), Data::Float(h)) => self.leaf(w == h, want, have, &trail),
            (Data::Complex(wr, wi), Data::Complex(hr, hi)) => {
                self.leaf(wr == hr && wi == hi, want, have, &trail)
            }
            (Data::Char(w), Data::Char(h)) => self.leaf(w == h, want, have, &trail),
            (Data::Str(w), Data::Str(h)) => self.leaf(w == h, want, have, &trail),
            _ => {
                self.opts.log_trail(&trail);
                Err(cannot_compare(&trail))
            }
        }
    }

    fn leaf(&self, equal: bool, want: &Value, have: &Value, trail: &str) -> Result<(), Notice> {
        self.opts.log_trail(trail);
        if equal {
            Ok(())
        } else {
            Err(self.equal_error(want, have, trail))
        }
    }

    fn structure(&mut self, want: &Value, w: &[Field], h: &[Field], trail: String) -> Result<(), Notice> {
        let nil = Value::nil();
        let mut errs = Vec::new();
        for i in 0..w.len().max(h.len()) {
            let (wf, hf) = (w.get(i), h.get(i));
            let Some(field) = wf.or(hf) else {
                continue;
            };
            let sub = trail::field(&trail, want.ty().name(), field.name());
            let wv = wf.map_or(&nil, Field::value);
            let hv = hf.map_or(&nil, Field::value);
            if let Err(e) = self.walk(wv, hv, sub, field.exported()) {
                errs.push(e);
            }
        }
        join(errs).map_or(Ok(()), Err)
    }

    fn list(&mut self, kind: Kind, w: &[Value], h: &[Value], trail: &str) -> Result<(), Notice> {
        let mut errs = Vec::new();
        for (i, (wv, hv)) in w.iter().zip(h).enumerate() {
            if let Err(e) = self.walk(wv, hv, trail::index(trail, kind, i), true) {
                errs.push(e);
            }
        }
        join(errs).map_or(Ok(()), Err)
    }

    /// Entries are paired by structural key equality. The flat dump of a key
    /// only orders the entries and names them in trails.
    fn map(&mut self, w: &[(Value, Value)], h: &[(Value, Value)], trail: &str) -> Result<(), Notice> {
        let mut wanted: Vec<(String, &Value, &Value)> =
            w.iter().map(|(k, v)| (self.keys.value(k), k, v)).collect();
        wanted.sort_by(|a, b| a.0.cmp(&b.0));

        let mut haves: HashMap<String, Vec<&(Value, Value)>> = HashMap::new();
        for entry in h {
            haves.entry(self.keys.value(&entry.0)).or_default().push(entry);
        }

        let nil = Value::nil();
        let mut errs = Vec::new();
        for (name, key, wv) in wanted {
            let sub = trail::key(trail, &name);
            match take_entry(&mut haves, &name, key) {
                Some((_, hv)) => {
                    if let Err(e) = self.walk(wv, hv, sub, true) {
                        errs.push(e);
                    }
                }
                None => {
                    self.opts.log_trail(&sub);
                    errs.push(self.equal_error(wv, &nil, &sub));
                }
            }
        }
        join(errs).map_or(Ok(()), Err)
    }

    fn equal_error(&self, want: &Value, have: &Value, trail: &str) -> Notice {
        let (w, h, diff) = self.dump.diff(want, have);
        let mut notice = Notice::new(HEADER_EQUAL).set_trail(trail).want(w).have(h);
        if want.ty() != have.ty() && !want.is_untyped_nil() && !have.is_untyped_nil() {
            notice = notice
                .append("want type", want.ty().name())
                .append("have type", have.ty().name());
        }
        if !diff.is_empty() {
            notice = notice.append("diff", diff);
        }
        notice
    }

    fn len_error(&self, want: &Value, have: &Value, w: usize, h: usize, trail: &str) -> Notice {
        let (wd, hd, diff) = self.dump.diff(want, have);
        let mut notice = Notice::new(HEADER_EQUAL)
            .set_trail(trail)
            .append("want len", w.to_string())
            .append("have len", h.to_string())
            .want(wd)
            .have(hd);
        if !diff.is_empty() {
            notice = notice.append("diff", diff);
        }
        notice
    }

    fn address_error(&self, want: &Value, have: &Value, trail: &str) -> Notice {
        let revealed = self.dump.reconfigure(|cfg| cfg.ptr_addr = true);
        Notice::new(HEADER_EQUAL)
            .set_trail(trail)
            .want(revealed.value(want))
            .have(revealed.value(have))
    }
}

/// Remove and return the entry whose key is identical to `key`, looking in
/// the bucket of keys dumped as `name` first.
fn take_entry<'v>(
    haves: &mut HashMap<String, Vec<&'v (Value, Value)>>,
    name: &str,
    key: &Value,
) -> Option<&'v (Value, Value)> {
    if let Some(bucket) = haves.get_mut(name) {
        if let Some(i) = bucket.iter().position(|(k, _)| key.identical(k)) {
            return Some(bucket.swap_remove(i));
        }
    }
    haves.values_mut().find_map(|bucket| {
        let i = bucket.iter().position(|(k, _)| key.identical(k))?;
        Some(bucket.swap_remove(i))
    })
}

fn cannot_compare(trail: &str) -> Notice {
    Notice::new(HEADER_CANNOT_COMPARE)
        .set_trail(trail)
        .append("cause", "value cannot be used without panicking")
        .append("hint", "skip the trail or use skip_unexported")
}
