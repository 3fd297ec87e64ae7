use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

/// Payload of a captured panic
#[derive(Debug)]
pub enum PanicValue {
    /// `panic!` with a message
    Message(String),
    /// `std::panic::panic_any(())`, the closest thing to panicking with nil
    Nil,
    Other(Box<dyn Any + Send>),
}

impl PanicValue {
    fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let payload = match payload.downcast::<&'static str>() {
            Ok(msg) => return PanicValue::Message((*msg).to_string()),
            Err(payload) => payload,
        };
        let payload = match payload.downcast::<String>() {
            Ok(msg) => return PanicValue::Message(*msg),
            Err(payload) => payload,
        };
        if payload.is::<()>() {
            PanicValue::Nil
        } else {
            PanicValue::Other(payload)
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            PanicValue::Message(msg) => Some(msg),
            _ => None,
        }
    }
}

impl fmt::Display for PanicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanicValue::Message(msg) => f.write_str(msg),
            PanicValue::Nil => f.write_str("panic called with nil argument"),
            PanicValue::Other(_) => f.write_str("panic with non-string payload"),
        }
    }
}

thread_local! {
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
    static STACK: RefCell<Option<String>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

/// Chain a panic hook that records the stack of panics raised inside
/// [`will_panic`] and defers to the previous hook otherwise.
fn install_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CAPTURING.with(Cell::get) {
                let stack = Backtrace::force_capture().to_string();
                STACK.with(|s| *s.borrow_mut() = Some(stack));
            } else {
                previous(info);
            }
        }));
    });
}

/// Run `f` and report whether it panicked.
///
/// Returns `(None, "")` when `f` completes. Otherwise returns the panic
/// payload and the stack captured when the panic was raised.
pub fn will_panic<F: FnOnce()>(f: F) -> (Option<PanicValue>, String) {
    install_hook();

    let outer = CAPTURING.with(|c| c.replace(true));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    CAPTURING.with(|c| c.set(outer));

    let stack = STACK.with(|s| s.borrow_mut().take());
    match result {
        Ok(()) => (None, String::new()),
        Err(payload) => {
            let stack = stack
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| Backtrace::force_capture().to_string());
            (Some(PanicValue::from_payload(payload)), stack)
        }
    }
}
