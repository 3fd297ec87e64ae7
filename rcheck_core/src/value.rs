use crate::reflect::Reflect;
use chrono::{DateTime, FixedOffset};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Name of the universal interface type.
pub const ANY_TYPE: &str = "Box<dyn Reflect>";

/// Category of a reflected value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Invalid,
    Bool,
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    Complex64,
    Complex128,
    Char,
    String,
    Array,
    Slice,
    Map,
    Struct,
    Interface,
    Pointer,
    Chan,
    Func,
    RawPointer,
    /// A value that cannot be inspected
    Opaque,
}

impl Kind {
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Kind::I8 | Kind::I16 | Kind::I32 | Kind::I64 | Kind::I128 | Kind::Isize
        )
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            Kind::U8 | Kind::U16 | Kind::U32 | Kind::U64 | Kind::U128 | Kind::Usize
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, Kind::F32 | Kind::F64)
    }

    pub fn is_complex(self) -> bool {
        matches!(self, Kind::Complex64 | Kind::Complex128)
    }

    /// Kinds compared by value at the leaves of a walk
    pub fn is_primitive(self) -> bool {
        self.is_signed()
            || self.is_unsigned()
            || self.is_float()
            || self.is_complex()
            || matches!(self, Kind::Bool | Kind::Char | Kind::String)
    }

    /// Name of the built-in type backing this kind
    pub fn base_name(self) -> &'static str {
        match self {
            Kind::Invalid => "nil",
            Kind::Bool => "bool",
            Kind::I8 => "i8",
            Kind::I16 => "i16",
            Kind::I32 => "i32",
            Kind::I64 => "i64",
            Kind::I128 => "i128",
            Kind::Isize => "isize",
            Kind::U8 => "u8",
            Kind::U16 => "u16",
            Kind::U32 => "u32",
            Kind::U64 => "u64",
            Kind::U128 => "u128",
            Kind::Usize => "usize",
            Kind::F32 => "f32",
            Kind::F64 => "f64",
            Kind::Complex64 => "Complex<f32>",
            Kind::Complex128 => "Complex<f64>",
            Kind::Char => "char",
            Kind::String => "String",
            Kind::Array => "array",
            Kind::Slice => "slice",
            Kind::Map => "map",
            Kind::Struct => "struct",
            Kind::Interface => "interface",
            Kind::Pointer => "pointer",
            Kind::Chan => "chan",
            Kind::Func => "func",
            Kind::RawPointer => "raw pointer",
            Kind::Opaque => "opaque",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base_name())
    }
}

/// Runtime type of a reflected value. Identity is name and kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Type {
    name: String,
    kind: Kind,
}

impl Type {
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// The built-in type for `kind`, e.g. `i64` for [`Kind::I64`].
    pub fn base(kind: Kind) -> Self {
        Self::new(kind.base_name(), kind)
    }

    /// Type of the untyped nil.
    pub fn nil() -> Self {
        Self::base(Kind::Invalid)
    }

    /// The universal interface type.
    pub fn any() -> Self {
        Self::new(ANY_TYPE, Kind::Interface)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Clone)]
enum Target {
    Ready(Rc<Value>),
    Lazy(Rc<dyn Fn() -> Value>),
}

/// What a non-nil pointer points at.
///
/// Shared pointers load their target lazily so cyclic graphs can be
/// reflected without recursing forever.
#[derive(Clone)]
pub struct Pointee {
    addr: Option<usize>,
    target: Target,
}

impl Pointee {
    pub fn ready(addr: Option<usize>, value: Value) -> Self {
        Self {
            addr,
            target: Target::Ready(Rc::new(value)),
        }
    }

    pub fn lazy<F>(addr: Option<usize>, load: F) -> Self
    where
        F: Fn() -> Value + 'static,
    {
        Self {
            addr,
            target: Target::Lazy(Rc::new(load)),
        }
    }

    /// Address identifying the pointee, when it has a stable one.
    pub fn addr(&self) -> Option<usize> {
        self.addr
    }

    pub fn load(&self) -> Value {
        match &self.target {
            Target::Ready(value) => Value::clone(value),
            Target::Lazy(load) => load(),
        }
    }
}

impl fmt::Debug for Pointee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pointee")
            .field("addr", &self.addr)
            .finish_non_exhaustive()
    }
}

/// A named struct field
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    exported: bool,
    value: Value,
}

impl Field {
    pub fn new(name: impl Into<String>, exported: bool, value: Value) -> Self {
        Self {
            name: name.into(),
            exported,
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the field is part of the public surface of its type
    pub fn exported(&self) -> bool {
        self.exported
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Payload of a reflected value, one variant per category the dumper and
/// the comparator dispatch on.
#[derive(Debug, Clone)]
pub enum Data {
    /// The untyped nil
    Nil,
    Bool(bool),
    Int(i128),
    Uint(u128),
    Float(f64),
    Complex(f64, f64),
    Char(char),
    Str(String),
    /// Arrays and slices; `addr` is the address of the first element.
    ///
    /// List and map addresses may belong to storage freed since it was
    /// reflected, so they only hint at identity; see [`Value::identical`].
    List {
        items: Vec<Value>,
        addr: Option<usize>,
    },
    /// `entries` is `None` for a nil map
    Map {
        entries: Option<Vec<(Value, Value)>>,
        addr: Option<usize>,
    },
    Struct(Vec<Field>),
    Interface(Option<Box<Value>>),
    Pointer(Option<Pointee>),
    Chan(Option<usize>),
    Func(Option<usize>),
    Raw(usize),
    Time(DateTime<FixedOffset>),
    Duration(Duration),
    /// Time zone, by name
    Zone(String),
    Opaque,
}

/// A reflected runtime value
#[derive(Debug, Clone)]
pub struct Value {
    ty: Type,
    data: Data,
}

impl Value {
    pub fn new(ty: Type, data: Data) -> Self {
        Self { ty, data }
    }

    /// The untyped nil.
    pub fn nil() -> Self {
        Self::new(Type::nil(), Data::Nil)
    }

    /// Re-type `value` under `name`, keeping its kind and payload.
    pub fn named(name: impl Into<String>, value: Value) -> Self {
        let kind = value.ty.kind;
        Self::new(Type::new(name, kind), value.data)
    }

    /// The same payload typed as the built-in type of its kind.
    pub fn base(&self) -> Self {
        Self::new(Type::base(self.ty.kind), self.data.clone())
    }

    pub fn structure(ty: Type) -> StructBuilder {
        StructBuilder {
            ty,
            fields: Vec::new(),
        }
    }

    pub fn list(ty: Type, items: Vec<Value>, addr: Option<usize>) -> Self {
        Self::new(ty, Data::List { items, addr })
    }

    pub fn map(ty: Type, entries: Vec<(Value, Value)>, addr: Option<usize>) -> Self {
        Self::new(
            ty,
            Data::Map {
                entries: Some(entries),
                addr,
            },
        )
    }

    pub fn nil_map(ty: Type) -> Self {
        Self::new(
            ty,
            Data::Map {
                entries: None,
                addr: None,
            },
        )
    }

    pub fn pointer(ty: Type, target: Option<Pointee>) -> Self {
        Self::new(ty, Data::Pointer(target))
    }

    pub fn interface(ty: Type, inner: Option<Value>) -> Self {
        Self::new(ty, Data::Interface(inner.map(Box::new)))
    }

    pub fn chan(ty: Type, addr: Option<usize>) -> Self {
        Self::new(ty, Data::Chan(addr))
    }

    pub fn func(ty: Type, addr: Option<usize>) -> Self {
        Self::new(ty, Data::Func(addr))
    }

    pub fn raw(ty: Type, addr: usize) -> Self {
        Self::new(ty, Data::Raw(addr))
    }

    pub fn complex(ty: Type, re: f64, im: f64) -> Self {
        Self::new(ty, Data::Complex(re, im))
    }

    pub fn time(ty: Type, time: DateTime<FixedOffset>) -> Self {
        Self::new(ty, Data::Time(time))
    }

    pub fn duration(ty: Type, duration: Duration) -> Self {
        Self::new(ty, Data::Duration(duration))
    }

    pub fn zone(ty: Type, name: impl Into<String>) -> Self {
        Self::new(ty, Data::Zone(name.into()))
    }

    /// A value of type `name` that cannot be inspected.
    pub fn opaque(name: impl Into<String>) -> Self {
        Self::new(Type::new(name, Kind::Opaque), Data::Opaque)
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn kind(&self) -> Kind {
        self.ty.kind
    }

    pub fn data(&self) -> &Data {
        &self.data
    }

    pub fn is_untyped_nil(&self) -> bool {
        matches!(self.data, Data::Nil)
    }

    /// Strip interface wrappers; a nil interface becomes the untyped nil.
    pub fn unwrap_interface(self) -> Value {
        match self.data {
            Data::Interface(Some(inner)) => inner.unwrap_interface(),
            Data::Interface(None) => Value::nil(),
            _ => self,
        }
    }

    /// Identity of the value's backing storage, if it has one.
    pub fn addr(&self) -> Option<usize> {
        match &self.data {
            Data::Pointer(Some(target)) => target.addr(),
            Data::List { addr, .. } | Data::Map { addr, .. } => *addr,
            Data::Chan(addr) | Data::Func(addr) => *addr,
            Data::Raw(addr) => Some(*addr),
            _ => None,
        }
    }

    /// Length of strings (in bytes), lists and maps.
    pub fn len(&self) -> Option<usize> {
        match &self.data {
            Data::Str(s) => Some(s.len()),
            Data::List { items, .. } => Some(items.len()),
            Data::Map { entries, .. } => Some(entries.as_ref().map_or(0, Vec::len)),
            _ => None,
        }
    }

    pub fn fields(&self) -> &[Field] {
        match &self.data {
            Data::Struct(fields) => fields,
            _ => &[],
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields()
            .iter()
            .find(|f| f.name == name)
            .map(Field::value)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.data {
            Data::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_i128(&self) -> Option<i128> {
        match self.data {
            Data::Int(i) => Some(i),
            Data::Uint(u) => i128::try_from(u).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.data {
            Data::Float(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.data {
            Data::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<DateTime<FixedOffset>> {
        match self.data {
            Data::Time(t) => Some(t),
            _ => None,
        }
    }

    /// Plain structural equality: same types and same payloads, with no
    /// checkers involved.
    ///
    /// Pointers with the same address are identical; other pointers are
    /// identical when their targets are. Opaque values are never identical.
    pub fn identical(&self, other: &Value) -> bool {
        identical(self, other, &mut HashSet::new())
    }
}

fn identical(a: &Value, b: &Value, seen: &mut HashSet<(usize, usize)>) -> bool {
    if a.ty != b.ty {
        return false;
    }
    match (&a.data, &b.data) {
        (Data::Nil, Data::Nil) => true,
        (Data::Bool(x), Data::Bool(y)) => x == y,
        (Data::Int(x), Data::Int(y)) => x == y,
        (Data::Uint(x), Data::Uint(y)) => x == y,
        (Data::Float(x), Data::Float(y)) => x == y,
        (Data::Complex(xr, xi), Data::Complex(yr, yi)) => xr == yr && xi == yi,
        (Data::Char(x), Data::Char(y)) => x == y,
        (Data::Str(x), Data::Str(y)) => x == y,
        (Data::List { items: x, .. }, Data::List { items: y, .. }) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| identical(x, y, seen))
        }
        (Data::Map { entries: None, .. }, Data::Map { entries: None, .. }) => true,
        (Data::Map { entries: Some(x), .. }, Data::Map { entries: Some(y), .. }) => {
            identical_entries(x, y, seen)
        }
        (Data::Struct(x), Data::Struct(y)) => {
            x.len() == y.len()
                && x.iter().zip(y).all(|(x, y)| {
                    x.name == y.name && x.exported == y.exported && identical(&x.value, &y.value, seen)
                })
        }
        (Data::Interface(None), Data::Interface(None)) => true,
        (Data::Interface(Some(x)), Data::Interface(Some(y))) => identical(x, y, seen),
        (Data::Pointer(None), Data::Pointer(None)) => true,
        (Data::Pointer(Some(x)), Data::Pointer(Some(y))) => match (x.addr(), y.addr()) {
            (Some(xa), Some(ya)) if xa == ya => true,
            // A pair already being compared further up is assumed identical.
            (Some(xa), Some(ya)) if !seen.insert((xa, ya)) => true,
            _ => identical(&x.load(), &y.load(), seen),
        },
        (Data::Chan(x), Data::Chan(y)) | (Data::Func(x), Data::Func(y)) => x == y,
        (Data::Raw(x), Data::Raw(y)) => x == y,
        (Data::Time(x), Data::Time(y)) => x == y && x.offset() == y.offset(),
        (Data::Duration(x), Data::Duration(y)) => x == y,
        (Data::Zone(x), Data::Zone(y)) => x == y,
        _ => false,
    }
}

/// Entries of the same map come back in the same order, so try that first.
fn identical_entries(
    x: &[(Value, Value)],
    y: &[(Value, Value)],
    seen: &mut HashSet<(usize, usize)>,
) -> bool {
    if x.len() != y.len() {
        return false;
    }
    let same_order = x
        .iter()
        .zip(y)
        .all(|((xk, xv), (yk, yv))| identical(xk, yk, seen) && identical(xv, yv, seen));
    if same_order {
        return true;
    }

    let mut used = vec![false; y.len()];
    x.iter().all(|(xk, xv)| {
        let found = y
            .iter()
            .enumerate()
            .position(|(i, (yk, _))| !used[i] && identical(xk, yk, seen));
        match found {
            Some(i) if identical(xv, &y[i].1, seen) => {
                used[i] = true;
                true
            }
            _ => false,
        }
    })
}

/// Builds struct values field by field
#[derive(Debug)]
pub struct StructBuilder {
    ty: Type,
    fields: Vec<Field>,
}

impl StructBuilder {
    /// Add an exported field.
    pub fn field<T: Reflect + ?Sized>(self, name: &str, value: &T) -> Self {
        self.value(name, true, value.reflect())
    }

    /// Add a field that is not part of the public surface.
    pub fn private<T: Reflect + ?Sized>(self, name: &str, value: &T) -> Self {
        self.value(name, false, value.reflect())
    }

    pub fn value(mut self, name: &str, exported: bool, value: Value) -> Self {
        self.fields.push(Field::new(name, exported, value));
        self
    }

    pub fn build(self) -> Value {
        Value::new(self.ty, Data::Struct(self.fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_named_keeps_kind_and_base_restores_it() {
        let meters = Value::named("Meters", 5i64.reflect());
        assert_eq!(meters.ty().name(), "Meters");
        assert_eq!(meters.kind(), Kind::I64);

        let base = meters.base();
        assert_eq!(base.ty(), &Type::base(Kind::I64));
        assert_eq!(base.as_i128(), Some(5));
    }

    #[test]
    fn test_unwrap_interface() {
        let wrapped = Value::interface(Type::any(), Some(42i32.reflect()));
        assert_eq!(wrapped.unwrap_interface().ty().name(), "i32");

        let nil = Value::interface(Type::any(), None);
        assert!(nil.unwrap_interface().is_untyped_nil());
    }

    #[test]
    fn test_len() {
        assert_eq!("abc".reflect().len(), Some(3));
        assert_eq!(vec![1, 2].reflect().len(), Some(2));
        assert_eq!(Value::nil_map(Type::new("HashMap<i32, i32>", Kind::Map)).len(), Some(0));
        assert_eq!(42i32.reflect().len(), None);
    }

    #[test]
    fn test_struct_builder() {
        let v = Value::structure(Type::new("T", Kind::Struct))
            .field("Int", &42i32)
            .private("secret", &"x")
            .build();

        assert_eq!(v.fields().len(), 2);
        assert!(v.fields()[0].exported());
        assert!(!v.fields()[1].exported());
        assert_eq!(v.field("Int").and_then(Value::as_i128), Some(42));
        assert!(v.field("Missing").is_none());
    }

    #[test]
    fn test_lazy_pointee_loads_on_demand() {
        let target = Pointee::lazy(Some(0x10), || 7u8.reflect());
        assert_eq!(target.addr(), Some(0x10));
        assert_eq!(target.load().as_i128(), Some(7));
    }

    #[test]
    fn test_identical_ignores_list_addresses() {
        let ty = Type::new("Vec<i32>", Kind::Slice);
        let a = Value::list(ty.clone(), vec![1i32.reflect()], Some(0x10));
        let b = Value::list(ty, vec![2i32.reflect()], Some(0x10));
        assert!(!a.identical(&b));
        assert!(a.identical(&vec![1i32].reflect()));
        assert!(!a.identical(&Value::named("Ints", vec![1i32].reflect())));
    }

    #[test]
    fn test_identical_maps_in_any_order() {
        let ty = Type::new("HashMap<i32, i32>", Kind::Map);
        let entry = |k: i32, v: i32| (k.reflect(), v.reflect());
        let a = Value::map(ty.clone(), vec![entry(1, 10), entry(2, 20)], None);
        let b = Value::map(ty.clone(), vec![entry(2, 20), entry(1, 10)], None);
        let c = Value::map(ty.clone(), vec![entry(2, 21), entry(1, 10)], None);
        assert!(a.identical(&b));
        assert!(!a.identical(&c));
        assert!(!a.identical(&Value::nil_map(ty)));
    }

    #[test]
    fn test_identical_terminates_on_cycles() {
        let a: Rc<RefCell<Box<dyn Reflect>>> = Rc::new(RefCell::new(Box::new(0i32)));
        let b: Rc<RefCell<Box<dyn Reflect>>> = Rc::new(RefCell::new(Box::new(0i32)));
        *a.borrow_mut() = Box::new(Rc::clone(&a));
        *b.borrow_mut() = Box::new(Rc::clone(&b));

        assert!(a.reflect().identical(&b.reflect()));
        assert!(a.reflect().identical(&a.reflect()));

        *b.borrow_mut() = Box::new(1i32);
        assert!(!a.reflect().identical(&b.reflect()));
        *a.borrow_mut() = Box::new(1i32);
    }
}
