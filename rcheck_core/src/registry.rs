use crate::notice::Notice;
use crate::options::Checker;
use crate::reflect::Reflect;
use crate::value::{Type, Value};
use rcheck_common::{CheckError, Result};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};
use tracing::{error, info};

/// Process wide type checkers, copied into every new `Options`.
static TYPE_CHECKERS: LazyLock<RwLock<HashMap<Type, Checker>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Register a checker used for every value of type `T`.
///
/// Registering a second checker for the same type is an error; the first
/// registration stays in place.
pub fn register_type_checker<T, F>(checker: F) -> Result<()>
where
    T: Reflect,
    F: Fn(&Value, &Value, &crate::Options) -> std::result::Result<(), Notice>
        + Send
        + Sync
        + 'static,
{
    register_type_checker_for(T::ty(), Arc::new(checker))
}

/// Register a checker for values of type `ty`. Both the name and the kind
/// of a value's type must match for the checker to run.
pub fn register_type_checker_for(ty: Type, checker: Checker) -> Result<()> {
    let mut checkers = TYPE_CHECKERS
        .write()
        .unwrap_or_else(PoisonError::into_inner);

    if checkers.contains_key(&ty) {
        error!(
            target: "rcheck::registry",
            type_name = ty.name(),
            kind = %ty.kind(),
            "type checker already registered"
        );
        return Err(CheckError::Registry(format!(
            "type checker for {} ({}) already registered",
            ty,
            ty.kind()
        )));
    }

    info!(
        target: "rcheck::registry",
        type_name = ty.name(),
        kind = %ty.kind(),
        "registered type checker"
    );
    checkers.insert(ty, checker);
    Ok(())
}

/// Whether a global checker exists for `ty`.
pub fn is_registered(ty: &Type) -> bool {
    TYPE_CHECKERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains_key(ty)
}

/// Copy of the global checkers.
pub(crate) fn snapshot() -> HashMap<Type, Checker> {
    TYPE_CHECKERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}
