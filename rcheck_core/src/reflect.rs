use crate::value::{Data, Kind, Pointee, Type, Value};
use chrono::{DateTime, FixedOffset, Local, Offset, TimeZone, Utc};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

/// Types that can describe themselves as a [`Value`].
///
/// `ty` is only available on sized types so the trait stays usable as
/// `dyn Reflect`.
pub trait Reflect {
    fn ty() -> Type
    where
        Self: Sized;

    fn reflect(&self) -> Value;
}

/// Reflects as the untyped nil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Nil;

impl Reflect for Nil {
    fn ty() -> Type {
        Type::nil()
    }

    fn reflect(&self) -> Value {
        Value::nil()
    }
}

macro_rules! reflect_primitive {
    ($variant:ident, $conv:ty, $($t:ty => $kind:ident),+ $(,)?) => {$(
        impl Reflect for $t {
            fn ty() -> Type {
                Type::base(Kind::$kind)
            }

            fn reflect(&self) -> Value {
                Value::new(Self::ty(), Data::$variant(*self as $conv))
            }
        }
    )+};
}

reflect_primitive!(Int, i128, i8 => I8, i16 => I16, i32 => I32, i64 => I64, i128 => I128, isize => Isize);
reflect_primitive!(Uint, u128, u8 => U8, u16 => U16, u32 => U32, u64 => U64, u128 => U128, usize => Usize);
reflect_primitive!(Float, f64, f32 => F32, f64 => F64);

impl Reflect for bool {
    fn ty() -> Type {
        Type::base(Kind::Bool)
    }

    fn reflect(&self) -> Value {
        Value::new(Self::ty(), Data::Bool(*self))
    }
}

impl Reflect for char {
    fn ty() -> Type {
        Type::base(Kind::Char)
    }

    fn reflect(&self) -> Value {
        Value::new(Self::ty(), Data::Char(*self))
    }
}

impl Reflect for String {
    fn ty() -> Type {
        Type::base(Kind::String)
    }

    fn reflect(&self) -> Value {
        Value::new(Self::ty(), Data::Str(self.clone()))
    }
}

impl Reflect for &str {
    fn ty() -> Type {
        Type::base(Kind::String)
    }

    fn reflect(&self) -> Value {
        Value::new(Self::ty(), Data::Str((*self).to_string()))
    }
}

impl<T: Reflect> Reflect for &T {
    fn ty() -> Type {
        T::ty()
    }

    fn reflect(&self) -> Value {
        (**self).reflect()
    }
}

impl<T: Reflect> Reflect for &[T] {
    fn ty() -> Type {
        Type::new(format!("&[{}]", T::ty()), Kind::Slice)
    }

    fn reflect(&self) -> Value {
        let items = self.iter().map(Reflect::reflect).collect();
        Value::list(Self::ty(), items, Some(self.as_ptr() as usize))
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn ty() -> Type {
        Type::new(format!("Vec<{}>", T::ty()), Kind::Slice)
    }

    fn reflect(&self) -> Value {
        let items = self.iter().map(Reflect::reflect).collect();
        Value::list(Self::ty(), items, Some(self.as_ptr() as usize))
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn ty() -> Type {
        Type::new(format!("[{}; {}]", T::ty(), N), Kind::Array)
    }

    fn reflect(&self) -> Value {
        let items = self.iter().map(Reflect::reflect).collect();
        Value::list(Self::ty(), items, None)
    }
}

impl<K: Reflect, V: Reflect, S> Reflect for HashMap<K, V, S> {
    fn ty() -> Type {
        Type::new(format!("HashMap<{}, {}>", K::ty(), V::ty()), Kind::Map)
    }

    fn reflect(&self) -> Value {
        let entries = self.iter().map(|(k, v)| (k.reflect(), v.reflect())).collect();
        Value::map(Self::ty(), entries, Some(self as *const Self as usize))
    }
}

impl<K: Reflect, V: Reflect> Reflect for BTreeMap<K, V> {
    fn ty() -> Type {
        Type::new(format!("BTreeMap<{}, {}>", K::ty(), V::ty()), Kind::Map)
    }

    fn reflect(&self) -> Value {
        let entries = self.iter().map(|(k, v)| (k.reflect(), v.reflect())).collect();
        Value::map(Self::ty(), entries, Some(self as *const Self as usize))
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn ty() -> Type {
        Type::new(format!("Option<{}>", T::ty()), Kind::Pointer)
    }

    fn reflect(&self) -> Value {
        let target = self.as_ref().map(|v| Pointee::ready(None, v.reflect()));
        Value::pointer(Self::ty(), target)
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn ty() -> Type {
        Type::new(format!("Box<{}>", T::ty()), Kind::Pointer)
    }

    // A box is never shared, so its address carries no identity.
    fn reflect(&self) -> Value {
        Value::pointer(Self::ty(), Some(Pointee::ready(None, (**self).reflect())))
    }
}

impl<T: Reflect + 'static> Reflect for Rc<T> {
    fn ty() -> Type {
        Type::new(format!("Rc<{}>", T::ty()), Kind::Pointer)
    }

    fn reflect(&self) -> Value {
        let target = Rc::clone(self);
        let addr = Rc::as_ptr(self) as usize;
        Value::pointer(
            Self::ty(),
            Some(Pointee::lazy(Some(addr), move || target.reflect())),
        )
    }
}

impl<T: Reflect + 'static> Reflect for Arc<T> {
    fn ty() -> Type {
        Type::new(format!("Arc<{}>", T::ty()), Kind::Pointer)
    }

    fn reflect(&self) -> Value {
        let target = Arc::clone(self);
        let addr = Arc::as_ptr(self) as usize;
        Value::pointer(
            Self::ty(),
            Some(Pointee::lazy(Some(addr), move || target.reflect())),
        )
    }
}

impl<T: Reflect> Reflect for RefCell<T> {
    fn ty() -> Type {
        T::ty()
    }

    fn reflect(&self) -> Value {
        match self.try_borrow() {
            Ok(inner) => inner.reflect(),
            Err(_) => Value::opaque(T::ty().name()),
        }
    }
}

impl Reflect for Box<dyn Reflect> {
    fn ty() -> Type {
        Type::any()
    }

    fn reflect(&self) -> Value {
        Value::interface(Self::ty(), Some((**self).reflect()))
    }
}

impl Reflect for &dyn Reflect {
    fn ty() -> Type {
        Type::any()
    }

    fn reflect(&self) -> Value {
        Value::interface(Self::ty(), Some((**self).reflect()))
    }
}

impl Reflect for () {
    fn ty() -> Type {
        Type::new("()", Kind::Struct)
    }

    fn reflect(&self) -> Value {
        Value::structure(Self::ty()).build()
    }
}

macro_rules! reflect_tuple {
    ($($name:ident . $idx:tt),+) => {
        impl<$($name: Reflect),+> Reflect for ($($name,)+) {
            fn ty() -> Type {
                let names: Vec<String> = vec![$($name::ty().name().to_string()),+];
                let name = if names.len() == 1 {
                    format!("({},)", names[0])
                } else {
                    format!("({})", names.join(", "))
                };
                Type::new(name, Kind::Struct)
            }

            fn reflect(&self) -> Value {
                Value::structure(Self::ty())
                    $(.field(stringify!($idx), &self.$idx))+
                    .build()
            }
        }
    };
}

reflect_tuple!(A.0);
reflect_tuple!(A.0, B.1);
reflect_tuple!(A.0, B.1, C.2);
reflect_tuple!(A.0, B.1, C.2, D.3);

impl<T: Reflect> Reflect for *const T {
    fn ty() -> Type {
        Type::new(format!("*const {}", T::ty()), Kind::RawPointer)
    }

    fn reflect(&self) -> Value {
        Value::raw(Self::ty(), *self as usize)
    }
}

impl<T: Reflect> Reflect for *mut T {
    fn ty() -> Type {
        Type::new(format!("*mut {}", T::ty()), Kind::RawPointer)
    }

    fn reflect(&self) -> Value {
        Value::raw(Self::ty(), *self as usize)
    }
}

impl<R: Reflect> Reflect for fn() -> R {
    fn ty() -> Type {
        Type::new(format!("fn() -> {}", R::ty()), Kind::Func)
    }

    fn reflect(&self) -> Value {
        Value::func(Self::ty(), Some(*self as usize))
    }
}

impl<A: Reflect, R: Reflect> Reflect for fn(A) -> R {
    fn ty() -> Type {
        Type::new(format!("fn({}) -> {}", A::ty(), R::ty()), Kind::Func)
    }

    fn reflect(&self) -> Value {
        Value::func(Self::ty(), Some(*self as usize))
    }
}

impl<A: Reflect, B: Reflect, R: Reflect> Reflect for fn(A, B) -> R {
    fn ty() -> Type {
        Type::new(
            format!("fn({}, {}) -> {}", A::ty(), B::ty(), R::ty()),
            Kind::Func,
        )
    }

    fn reflect(&self) -> Value {
        Value::func(Self::ty(), Some(*self as usize))
    }
}

fn fixed<Tz: TimeZone>(time: &DateTime<Tz>) -> DateTime<FixedOffset> {
    time.with_timezone(&time.offset().fix())
}

macro_rules! reflect_datetime {
    ($($tz:ty => $name:literal),+) => {$(
        impl Reflect for DateTime<$tz> {
            fn ty() -> Type {
                Type::new(concat!("DateTime<", $name, ">"), Kind::Struct)
            }

            fn reflect(&self) -> Value {
                Value::time(Self::ty(), fixed(self))
            }
        }
    )+};
}

reflect_datetime!(Utc => "Utc", FixedOffset => "FixedOffset", Local => "Local");

impl Reflect for Utc {
    fn ty() -> Type {
        Type::new("Utc", Kind::Struct)
    }

    fn reflect(&self) -> Value {
        Value::zone(Self::ty(), "UTC")
    }
}

impl Reflect for FixedOffset {
    fn ty() -> Type {
        Type::new("FixedOffset", Kind::Struct)
    }

    fn reflect(&self) -> Value {
        Value::zone(Self::ty(), self.to_string())
    }
}

impl Reflect for Local {
    fn ty() -> Type {
        Type::new("Local", Kind::Struct)
    }

    fn reflect(&self) -> Value {
        Value::zone(Self::ty(), "Local")
    }
}

impl Reflect for Duration {
    fn ty() -> Type {
        Type::new("Duration", Kind::Struct)
    }

    fn reflect(&self) -> Value {
        Value::duration(Self::ty(), *self)
    }
}

#[cfg(feature = "json")]
impl Reflect for serde_json::Value {
    fn ty() -> Type {
        Type::new("Value", Kind::Interface)
    }

    fn reflect(&self) -> Value {
        use serde_json::Value as Json;

        let inner = match self {
            Json::Null => None,
            Json::Bool(b) => Some(b.reflect()),
            Json::Number(n) => Some(if let Some(i) = n.as_i64() {
                i.reflect()
            } else if let Some(u) = n.as_u64() {
                u.reflect()
            } else {
                n.as_f64().unwrap_or(f64::NAN).reflect()
            }),
            Json::String(s) => Some(s.reflect()),
            Json::Array(items) => Some(Value::list(
                Type::new("Vec<Value>", Kind::Slice),
                items.iter().map(Reflect::reflect).collect(),
                Some(items.as_ptr() as usize),
            )),
            Json::Object(map) => Some(Value::map(
                Type::new("Map<String, Value>", Kind::Map),
                map.iter().map(|(k, v)| (k.reflect(), v.reflect())).collect(),
                Some(map as *const _ as usize),
            )),
        };
        Value::interface(Self::ty(), inner)
    }
}
