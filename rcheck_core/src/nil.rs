use crate::reflect::Reflect;
use crate::value::{Data, Value};

/// Returns `(is_nil, is_wrapped)`.
///
/// `is_nil` holds for the untyped nil and for typed nil pointers, maps,
/// channels and functions. `is_wrapped` only holds for the typed case.
pub fn is_nil(v: &Value) -> (bool, bool) {
    match v.data() {
        Data::Nil | Data::Interface(None) => (true, false),
        Data::Interface(Some(inner)) => {
            let (nil, _) = is_nil(inner);
            (nil, nil)
        }
        Data::Pointer(None)
        | Data::Map { entries: None, .. }
        | Data::Chan(None)
        | Data::Func(None) => (true, true),
        _ => (false, false),
    }
}

pub fn is_nil_any<T: Reflect + ?Sized>(v: &T) -> (bool, bool) {
    is_nil(&v.reflect())
}
