use crate::lcs;
use crate::reflect::Reflect;
use crate::value::{Data, Kind, Pointee, Type, Value, ANY_TYPE};
use chrono::{DateTime, FixedOffset};
use rcheck_common::{DumpSettings, DurationFormat};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Write};
use std::sync::Arc;
use std::time::Duration;

/// Custom rendering for one type. Receives the dumper, the nesting level
/// and the value.
pub type DumperFn = Arc<dyn Fn(&Dump, usize, &Value) -> String + Send + Sync>;

/// Time format token rendering Unix seconds.
pub const TIME_AS_UNIX: &str = "<unix>";

/// Time format token rendering the `Display` form of the time.
pub const TIME_AS_DISPLAY: &str = "<display>";

const TIME_TYPES: [&str; 3] = [
    "DateTime<Utc>",
    "DateTime<FixedOffset>",
    "DateTime<Local>",
];
const ZONE_TYPES: [&str; 3] = ["Utc", "FixedOffset", "Local"];
const DURATION_TYPE: &str = "Duration";

/// Dumper configuration
#[derive(Clone)]
pub struct DumpConfig {
    pub flat: bool,
    pub flat_strings: usize,
    pub compact: bool,
    pub ptr_addr: bool,
    pub time_format: String,
    pub duration_format: DurationFormat,
    pub print_type: bool,
    pub use_any: bool,
    pub max_depth: usize,
    pub indent: usize,
    pub tab_width: usize,
    pub private_fields: bool,
    dumpers: HashMap<String, DumperFn>,
}

impl DumpConfig {
    pub fn new() -> Self {
        Self::from_settings(&DumpSettings::default())
    }

    pub fn from_settings(settings: &DumpSettings) -> Self {
        Self {
            flat: settings.flat,
            flat_strings: settings.flat_strings,
            compact: settings.compact,
            ptr_addr: settings.ptr_addr,
            time_format: settings.time_format.clone(),
            duration_format: settings.duration_format,
            print_type: settings.print_type,
            use_any: settings.use_any,
            max_depth: settings.max_depth,
            indent: settings.indent,
            tab_width: settings.tab_width,
            private_fields: settings.private_fields,
            dumpers: HashMap::new(),
        }
    }

    pub fn with_flat(mut self, flat: bool) -> Self {
        self.flat = flat;
        self
    }

    pub fn with_flat_strings(mut self, flat_strings: usize) -> Self {
        self.flat_strings = flat_strings;
        self
    }

    /// Compact output implies flat output.
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    pub fn with_ptr_addr(mut self, ptr_addr: bool) -> Self {
        self.ptr_addr = ptr_addr;
        self
    }

    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    pub fn with_duration_format(mut self, format: DurationFormat) -> Self {
        self.duration_format = format;
        self
    }

    pub fn with_print_type(mut self, print_type: bool) -> Self {
        self.print_type = print_type;
        self
    }

    pub fn with_use_any(mut self, use_any: bool) -> Self {
        self.use_any = use_any;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width;
        self
    }

    pub fn with_private_fields(mut self, private_fields: bool) -> Self {
        self.private_fields = private_fields;
        self
    }

    /// Register a dumper for values of type `T`.
    pub fn with_dumper<T, F>(self, f: F) -> Self
    where
        T: Reflect,
        F: Fn(&Dump, usize, &Value) -> String + Send + Sync + 'static,
    {
        self.with_dumper_fn(T::ty().name(), Arc::new(f))
    }

    /// Register a dumper for values whose type is named `name`.
    pub fn with_dumper_fn(mut self, name: impl Into<String>, f: DumperFn) -> Self {
        self.dumpers.insert(name.into(), f);
        self
    }

    pub fn has_dumper(&self, name: &str) -> bool {
        self.dumpers.contains_key(name)
    }

    fn is_flat(&self) -> bool {
        self.flat || self.compact
    }
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DumpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dumpers: Vec<&String> = self.dumpers.keys().collect();
        dumpers.sort();
        f.debug_struct("DumpConfig")
            .field("flat", &self.flat)
            .field("flat_strings", &self.flat_strings)
            .field("compact", &self.compact)
            .field("ptr_addr", &self.ptr_addr)
            .field("time_format", &self.time_format)
            .field("duration_format", &self.duration_format)
            .field("print_type", &self.print_type)
            .field("use_any", &self.use_any)
            .field("max_depth", &self.max_depth)
            .field("indent", &self.indent)
            .field("tab_width", &self.tab_width)
            .field("private_fields", &self.private_fields)
            .field("dumpers", &dumpers)
            .finish()
    }
}

/// Renders values as deterministic, human-readable text.
#[derive(Debug, Clone)]
pub struct Dump {
    cfg: DumpConfig,
    /// Addresses of the pointees on the path being rendered
    path: RefCell<Vec<usize>>,
}

impl Dump {
    pub fn new(mut cfg: DumpConfig) -> Self {
        let time: DumperFn = Arc::new(dump_time);
        let zone: DumperFn = Arc::new(dump_zone);
        let duration: DumperFn = Arc::new(dump_duration);

        for name in TIME_TYPES {
            cfg.dumpers
                .entry(name.to_string())
                .or_insert_with(|| Arc::clone(&time));
        }
        for name in ZONE_TYPES {
            cfg.dumpers
                .entry(name.to_string())
                .or_insert_with(|| Arc::clone(&zone));
        }
        cfg.dumpers
            .entry(DURATION_TYPE.to_string())
            .or_insert(duration);

        Self {
            cfg,
            path: RefCell::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &DumpConfig {
        &self.cfg
    }

    /// A dumper with a modified copy of this configuration. It starts on
    /// the same rendering path, so map keys still see enclosing pointees.
    pub fn reconfigure(&self, f: impl FnOnce(&mut DumpConfig)) -> Dump {
        let mut cfg = self.cfg.clone();
        f(&mut cfg);
        Dump {
            cfg,
            path: self.path.clone(),
        }
    }

    pub fn any<T: Reflect + ?Sized>(&self, v: &T) -> String {
        self.value(&v.reflect())
    }

    pub fn value(&self, v: &Value) -> String {
        self.render(0, v)
    }

    /// Render `v` found at nesting `level`, honoring registered dumpers.
    pub fn render(&self, level: usize, v: &Value) -> String {
        if level > self.cfg.max_depth {
            return "<...>".to_string();
        }
        match self.cfg.dumpers.get(v.ty().name()) {
            Some(dumper) => dumper(self, level, v),
            None => self.render_default(level, v),
        }
    }

    /// Render `v` by its kind, ignoring any dumper registered for its type.
    pub fn render_default(&self, level: usize, v: &Value) -> String {
        match v.data() {
            Data::Nil => "nil".to_string(),
            Data::Bool(b) => b.to_string(),
            Data::Int(i) => i.to_string(),
            Data::Uint(u) if v.kind() == Kind::U8 => dump_byte(*u as u8),
            Data::Uint(u) => u.to_string(),
            Data::Float(f) if v.kind() == Kind::F32 => (*f as f32).to_string(),
            Data::Float(f) => f.to_string(),
            Data::Complex(re, im) if v.kind() == Kind::Complex64 => {
                format!("({}{:+}i)", *re as f32, *im as f32)
            }
            Data::Complex(re, im) => format!("({}{:+}i)", re, im),
            Data::Char(c) => format!("{:?}", c),
            Data::Str(s) => self.string(s),
            Data::List { items, .. } => {
                let items = items.iter().map(|i| self.render(level + 1, i)).collect();
                self.composite(level, v.ty(), items)
            }
            Data::Map { entries: None, .. } => format!("{}(nil)", self.type_name(v.ty())),
            Data::Map {
                entries: Some(entries),
                ..
            } => self.map(level, v.ty(), entries),
            Data::Struct(fields) => {
                let sep = self.key_separator();
                let items = fields
                    .iter()
                    .filter(|f| f.exported() || self.cfg.private_fields)
                    .map(|f| format!("{}{}{}", f.name(), sep, self.render(level + 1, f.value())))
                    .collect();
                self.composite(level, v.ty(), items)
            }
            Data::Interface(None) | Data::Pointer(None) => "nil".to_string(),
            Data::Interface(Some(inner)) => self.render(level, inner),
            Data::Pointer(Some(target)) => self.pointee(level, target),
            Data::Chan(addr) => format!("({})({})", self.type_name(v.ty()), self.addr(*addr)),
            Data::Func(addr) => format!("<func>({})", self.addr(*addr)),
            Data::Raw(addr) => format!("({})({})", self.type_name(v.ty()), self.addr(Some(*addr))),
            Data::Time(_) => dump_time(self, level, v),
            Data::Duration(_) => dump_duration(self, level, v),
            Data::Zone(_) => dump_zone(self, level, v),
            Data::Opaque => format!("<opaque {}>", self.type_name(v.ty())),
        }
    }

    /// Render `want` and `have` and, when both renderings span several
    /// lines, a unified diff between them.
    pub fn diff(&self, want: &Value, have: &Value) -> (String, String, String) {
        let mut w = self.value(want);
        let mut h = self.value(have);
        if w == h || w == "nil" || h == "nil" {
            return (w, h, String::new());
        }

        let multiline = |s: &str| s.contains('\n');
        if multiline(&w) != multiline(&h) {
            let expanded = self.for_diff();
            w = expanded.value(want);
            h = expanded.value(have);
        }
        if !multiline(&w) || !multiline(&h) {
            return (w, h, String::new());
        }

        let expanded = self.for_diff();
        let diff = lcs::unified(
            "want",
            "have",
            &expanded.diff_text(want),
            &expanded.diff_text(have),
            lcs::DEFAULT_CONTEXT,
        );
        (w, h, diff.trim_end_matches('\n').to_string())
    }

    /// Pointers render their target; a target already on the current path
    /// is a cycle and renders as `<...>`.
    fn pointee(&self, level: usize, target: &Pointee) -> String {
        let Some(addr) = target.addr() else {
            return self.render(level, &target.load());
        };
        if self.path.borrow().contains(&addr) {
            return "<...>".to_string();
        }

        self.path.borrow_mut().push(addr);
        let out = self.render(level, &target.load());
        self.path.borrow_mut().pop();
        out
    }

    fn for_diff(&self) -> Dump {
        self.reconfigure(|cfg| {
            cfg.flat = false;
            cfg.compact = false;
            cfg.flat_strings = 0;
        })
    }

    /// Top level strings are diffed by their content, not their quoted form.
    fn diff_text(&self, v: &Value) -> String {
        match v.data() {
            Data::Str(s) => s.clone(),
            _ => self.value(v),
        }
    }

    fn type_name(&self, ty: &Type) -> String {
        if self.cfg.use_any {
            ty.name().replace(ANY_TYPE, "any")
        } else {
            ty.name().to_string()
        }
    }

    fn key_separator(&self) -> &'static str {
        if self.cfg.compact {
            ":"
        } else {
            ": "
        }
    }

    /// Indentation for lines at `level`.
    pub fn pad(&self, level: usize) -> String {
        " ".repeat((self.cfg.indent + level) * self.cfg.tab_width)
    }

    fn addr(&self, addr: Option<usize>) -> String {
        match addr {
            None => "nil".to_string(),
            Some(addr) if self.cfg.ptr_addr => format!("{:#x}", addr),
            Some(_) => "<addr>".to_string(),
        }
    }

    fn string(&self, s: &str) -> String {
        if !self.cfg.is_flat() && s.contains('\n') && s.len() > self.cfg.flat_strings {
            s.to_string()
        } else {
            format!("{:?}", s)
        }
    }

    fn map(&self, level: usize, ty: &Type, entries: &[(Value, Value)]) -> String {
        let keys = self.reconfigure(|cfg| cfg.flat = true);
        let mut rows: Vec<(String, &Value)> =
            entries.iter().map(|(k, v)| (keys.value(k), v)).collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        let sep = self.key_separator();
        let items = rows
            .into_iter()
            .map(|(k, v)| format!("{}{}{}", k, sep, self.render(level + 1, v)))
            .collect();
        self.composite(level, ty, items)
    }

    /// Wrap already rendered elements in `TYPE{...}`.
    pub fn composite(&self, level: usize, ty: &Type, items: Vec<String>) -> String {
        let name = if self.cfg.print_type {
            self.type_name(ty)
        } else {
            String::new()
        };
        if items.is_empty() {
            return format!("{}{{}}", name);
        }
        if self.cfg.is_flat() {
            let sep = if self.cfg.compact { "," } else { ", " };
            return format!("{}{{{}}}", name, items.join(sep));
        }

        let inner = self.pad(level + 1);
        let mut out = format!("{}{{\n", name);
        for item in items {
            out.push_str(&inner);
            out.push_str(&item);
            out.push_str(",\n");
        }
        out.push_str(&self.pad(level));
        out.push('}');
        out
    }
}

impl Default for Dump {
    fn default() -> Self {
        Self::new(DumpConfig::default())
    }
}

fn dump_byte(b: u8) -> String {
    if (32..=126).contains(&b) {
        format!("0x{:02x} ('{}')", b, b as char)
    } else {
        format!("0x{:02x}", b)
    }
}

fn dump_time(dump: &Dump, level: usize, v: &Value) -> String {
    let Data::Time(t) = v.data() else {
        return dump.render_default(level, v);
    };
    format_time(t, &dump.cfg.time_format)
}

fn format_time(t: &DateTime<FixedOffset>, format: &str) -> String {
    match format {
        TIME_AS_UNIX => t.timestamp().to_string(),
        TIME_AS_DISPLAY => format!("{:?}", t.to_string()),
        format => {
            let mut out = String::new();
            if write!(out, "{}", t.format(format)).is_err() {
                return format!("<invalid time format {:?}>", format);
            }
            format!("{:?}", out)
        }
    }
}

fn dump_duration(dump: &Dump, level: usize, v: &Value) -> String {
    let Data::Duration(d) = v.data() else {
        return dump.render_default(level, v);
    };
    format_duration(d, dump.cfg.duration_format)
}

fn format_duration(d: &Duration, format: DurationFormat) -> String {
    match format {
        DurationFormat::String => format!("{:?}", format!("{:?}", d)),
        DurationFormat::Seconds => d.as_secs_f64().to_string(),
    }
}

fn dump_zone(dump: &Dump, level: usize, v: &Value) -> String {
    match v.data() {
        Data::Zone(name) => format!("{:?}", name),
        _ => dump.render_default(level, v),
    }
}

/// Dumper for byte slices: hex in flat mode, a hex dump otherwise.
pub fn bytes_dumper() -> DumperFn {
    Arc::new(dump_bytes)
}

fn dump_bytes(dump: &Dump, level: usize, v: &Value) -> String {
    let Data::List { items, .. } = v.data() else {
        return dump.render_default(level, v);
    };
    let bytes: Vec<u8> = items
        .iter()
        .filter_map(|i| match i.data() {
            Data::Uint(u) => u8::try_from(*u).ok(),
            _ => None,
        })
        .collect();

    let name = if dump.cfg.print_type {
        dump.type_name(v.ty())
    } else {
        String::new()
    };
    if bytes.is_empty() {
        return format!("{}{{}}", name);
    }
    if dump.cfg.is_flat() {
        return format!("{}{{0x{}}}", name, hex::encode(&bytes));
    }

    let inner = dump.pad(level + 1);
    let mut out = format!("{}{{\n", name);
    for (i, chunk) in bytes.chunks(16).enumerate() {
        let mut hex_part = String::with_capacity(49);
        for j in 0..16 {
            if j == 8 {
                hex_part.push(' ');
            }
            match chunk.get(j) {
                Some(b) => {
                    hex_part.push_str(&hex::encode([*b]));
                    hex_part.push(' ');
                }
                None => hex_part.push_str("   "),
            }
        }
        let ascii: String = chunk
            .iter()
            .map(|&b| if (32..=126).contains(&b) { b as char } else { '.' })
            .collect();
        out.push_str(&format!("{}{:08x}  {} |{}|\n", inner, i * 16, hex_part, ascii));
    }
    out.push_str(&dump.pad(level));
    out.push('}');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::rc::Rc;

    fn test_struct() -> Value {
        Value::structure(Type::new("T", Kind::Struct))
            .field("Int", &42i32)
            .field("Str", &"abc")
            .private("secret", &1u16)
            .build()
    }

    #[test]
    fn test_primitives() {
        let dump = Dump::default();
        assert_eq!(dump.any(&42i64), "42");
        assert_eq!(dump.any(&-1i8), "-1");
        assert_eq!(dump.any(&true), "true");
        assert_eq!(dump.any(&1.5f64), "1.5");
        assert_eq!(dump.any(&0.1f32), "0.1");
        assert_eq!(dump.any(&'a'), "'a'");
        assert_eq!(dump.any(&"abc"), "\"abc\"");
        assert_eq!(dump.any(&123u8), "0x7b ('{')");
        assert_eq!(dump.any(&7u8), "0x07");
    }

    #[test]
    fn test_complex() {
        let dump = Dump::default();
        let v = Value::complex(Type::base(Kind::Complex128), 1.0, -2.5);
        assert_eq!(dump.value(&v), "(1-2.5i)");
    }

    #[test]
    fn test_struct_multiline_and_flat() {
        let v = test_struct();

        let dump = Dump::default();
        assert_eq!(dump.value(&v), "T{\n  Int: 42,\n  Str: \"abc\",\n}");

        let flat = Dump::new(DumpConfig::new().with_flat(true));
        assert_eq!(flat.value(&v), "T{Int: 42, Str: \"abc\"}");

        let compact = Dump::new(DumpConfig::new().with_compact(true));
        assert_eq!(compact.value(&v), "T{Int:42,Str:\"abc\"}");

        let private = Dump::new(DumpConfig::new().with_flat(true).with_private_fields(true));
        assert_eq!(private.value(&v), "T{Int: 42, Str: \"abc\", secret: 1}");
    }

    #[test]
    fn test_nested_indent() {
        let dump = Dump::default();
        let v = vec![vec![1, 2]];
        assert_eq!(
            dump.any(&v),
            "Vec<Vec<i32>>{\n  Vec<i32>{\n    1,\n    2,\n  },\n}"
        );

        let indented = Dump::new(DumpConfig::new().with_indent(1).with_tab_width(4));
        assert_eq!(indented.any(&vec![1]), "Vec<i32>{\n        1,\n    }");
    }

    #[test]
    fn test_without_type() {
        let dump = Dump::new(DumpConfig::new().with_flat(true).with_print_type(false));
        assert_eq!(dump.any(&vec![1, 2]), "{1, 2}");
        assert_eq!(dump.any(&Vec::<i32>::new()), "{}");
    }

    #[test]
    fn test_map_keys_sorted() {
        let mut m = HashMap::new();
        m.insert("b", 2);
        m.insert("a", 1);
        m.insert("c", 3);

        let dump = Dump::new(DumpConfig::new().with_flat(true));
        assert_eq!(
            dump.any(&m),
            "HashMap<String, i32>{\"a\": 1, \"b\": 2, \"c\": 3}"
        );

        let nil = Value::nil_map(Type::new("HashMap<String, i32>", Kind::Map));
        assert_eq!(dump.value(&nil), "HashMap<String, i32>(nil)");
    }

    #[test]
    fn test_max_depth() {
        let dump = Dump::new(DumpConfig::new().with_flat(true).with_max_depth(1));
        assert_eq!(dump.any(&vec![vec![vec![1]]]), "Vec<Vec<Vec<i32>>>{Vec<Vec<i32>>{<...>}}");
    }

    #[test]
    fn test_pointers() {
        let dump = Dump::default();
        assert_eq!(dump.any(&Some(5u16)), "5");
        assert_eq!(dump.any(&None::<u16>), "nil");
        assert_eq!(dump.value(&Value::nil()), "nil");

        let raw = Value::raw(Type::new("*const i32", Kind::RawPointer), 0x10);
        assert_eq!(dump.value(&raw), "(*const i32)(<addr>)");
        let revealed = Dump::new(DumpConfig::new().with_ptr_addr(true));
        assert_eq!(revealed.value(&raw), "(*const i32)(0x10)");

        let func = Value::func(Type::new("fn()", Kind::Func), Some(0x20));
        assert_eq!(dump.value(&func), "<func>(<addr>)");
        let chan = Value::chan(Type::new("Sender<i32>", Kind::Chan), None);
        assert_eq!(dump.value(&chan), "(Sender<i32>)(nil)");

        let lazy = Value::pointer(
            Type::new("Rc<i32>", Kind::Pointer),
            Some(Pointee::lazy(Some(1), || 3i32.reflect())),
        );
        assert_eq!(dump.value(&lazy), "3");
    }

    #[test]
    fn test_pointer_cycle_is_elided() {
        let cell: Rc<RefCell<Box<dyn Reflect>>> = Rc::new(RefCell::new(Box::new(0i32)));
        *cell.borrow_mut() = Box::new(Rc::clone(&cell));

        assert_eq!(Dump::default().any(&cell), "<...>");
        let flat = Dump::new(DumpConfig::new().with_flat(true));
        assert_eq!(flat.any(&vec![Rc::clone(&cell)]), "Vec<Rc<Box<dyn Reflect>>>{<...>}");

        // Break the cycle so the test does not leak.
        *cell.borrow_mut() = Box::new(1i32);
    }

    #[test]
    fn test_shared_pointer_is_not_a_cycle() {
        let shared = Rc::new(7u16);
        let dump = Dump::new(DumpConfig::new().with_flat(true));
        assert_eq!(
            dump.any(&vec![Rc::clone(&shared), shared]),
            "Vec<Rc<u16>>{7, 7}"
        );
    }

    #[test]
    fn test_multiline_strings() {
        let dump = Dump::new(DumpConfig::new().with_flat_strings(3));
        assert_eq!(dump.any(&"a\nb"), "\"a\\nb\"");
        assert_eq!(dump.any(&"abc\ndef"), "abc\ndef");
    }

    #[test]
    fn test_use_any() {
        let items: Vec<Box<dyn Reflect>> = vec![Box::new(1i32), Box::new("x")];
        let dump = Dump::new(DumpConfig::new().with_flat(true).with_use_any(true));
        assert_eq!(dump.any(&items), "Vec<any>{1, \"x\"}");
    }

    #[test]
    fn test_time_formats() {
        let t = DateTime::parse_from_rfc3339("2022-01-02T03:04:05+00:00").unwrap();
        let dump = Dump::default();
        assert_eq!(dump.any(&t), "\"2022-01-02T03:04:05.000000000+00:00\"");

        let unix = Dump::new(DumpConfig::new().with_time_format(TIME_AS_UNIX));
        assert_eq!(unix.any(&t), "1641092645");

        let custom = Dump::new(DumpConfig::new().with_time_format("%Y"));
        assert_eq!(custom.any(&t), "\"2022\"");
    }

    #[test]
    fn test_durations_and_zones() {
        let d = Duration::from_millis(1500);
        assert_eq!(Dump::default().any(&d), "\"1.5s\"");
        let secs = Dump::new(DumpConfig::new().with_duration_format(DurationFormat::Seconds));
        assert_eq!(secs.any(&d), "1.5");
        assert_eq!(Dump::default().any(&chrono::Utc), "\"UTC\"");
    }

    #[test]
    fn test_custom_dumper_wins() {
        let cfg = DumpConfig::new().with_dumper::<Duration, _>(|_, _, _| "<duration>".to_string());
        assert_eq!(Dump::new(cfg).any(&Duration::from_secs(1)), "<duration>");
    }

    #[test]
    fn test_bytes_dumper() {
        let bytes = b"hello, world! 0123".to_vec();
        let flat = Dump::new(
            DumpConfig::new()
                .with_flat(true)
                .with_dumper_fn("Vec<u8>", bytes_dumper()),
        );
        assert_eq!(flat.any(&vec![0xabu8, 0x01]), "Vec<u8>{0xab01}");

        let multi = Dump::new(DumpConfig::new().with_dumper_fn("Vec<u8>", bytes_dumper()));
        assert_eq!(
            multi.any(&bytes),
            "Vec<u8>{\n  \
             00000000  68 65 6c 6c 6f 2c 20 77  6f 72 6c 64 21 20 30 31  |hello, world! 01|\n  \
             00000010  32 33                                             |23|\n}"
        );
    }

    #[test]
    fn test_diff_multiline() {
        let dump = Dump::default();
        let (w, h, diff) = dump.diff(&vec![1, 2].reflect(), &vec![1].reflect());
        assert_eq!(w, "Vec<i32>{\n  1,\n  2,\n}");
        assert_eq!(h, "Vec<i32>{\n  1,\n}");
        assert_eq!(
            diff,
            "--- want\n+++ have\n@@ -1,4 +1,3 @@\n Vec<i32>{\n   1,\n-  2,\n }"
        );
    }

    #[test]
    fn test_diff_single_line_has_none() {
        let dump = Dump::default();
        let (w, h, diff) = dump.diff(&42i32.reflect(), &44i32.reflect());
        assert_eq!((w.as_str(), h.as_str()), ("42", "44"));
        assert!(diff.is_empty());

        let (_, _, diff) = dump.diff(&Value::nil(), &vec![1].reflect());
        assert!(diff.is_empty());
    }

    #[test]
    fn test_diff_expands_flat_side() {
        let dump = Dump::new(DumpConfig::new().with_flat_strings(100));
        let (w, h, diff) = dump.diff(&"a\nb".reflect(), &"a\nc".reflect());
        assert_eq!(w, "\"a\\nb\"");
        assert_eq!(h, "\"a\\nc\"");
        assert!(diff.is_empty());

        let long = "x\n".repeat(60);
        let (w, h, diff) = dump.diff(&long.reflect(), &"x\ny".reflect());
        assert!(w.contains('\n'));
        assert_eq!(h, "x\ny");
        assert!(diff.starts_with("--- want\n+++ have\n"));
    }
}
