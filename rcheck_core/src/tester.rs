//! Bridge between notices and the hosting test runner.

use crate::compare::{equal, not_equal};
use crate::options::Options;
use crate::reflect::Reflect;
use std::cell::{Cell, RefCell};
use std::fmt::{self, Display};

/// The part of a test runner assertions report to.
pub trait Tester {
    /// Record a non-fatal error and mark the test as failed.
    fn error(&self, args: &[&dyn Display]);

    fn errorf(&self, args: fmt::Arguments<'_>);

    /// Record a failure. Implementations should not return control to the
    /// test body.
    fn fatal(&self, args: &[&dyn Display]);

    fn fatalf(&self, args: fmt::Arguments<'_>);

    fn helper(&self) {}

    fn failed(&self) -> bool;
}

fn join_args(args: &[&dyn Display]) -> String {
    args.iter()
        .map(|arg| arg.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Records everything reported to it.
#[derive(Debug, Default)]
pub struct Spy {
    buf: RefCell<String>,
    reported_error: Cell<bool>,
    triggered_failure: Cell<bool>,
}

impl Spy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything logged so far, one message per line.
    pub fn log(&self) -> String {
        self.buf.borrow().clone()
    }

    pub fn reported_error(&self) -> bool {
        self.reported_error.get()
    }

    pub fn triggered_failure(&self) -> bool {
        self.triggered_failure.get()
    }

    fn record(&self, msg: &str) {
        let mut buf = self.buf.borrow_mut();
        buf.push_str(msg);
        buf.push('\n');
    }
}

impl Tester for Spy {
    fn error(&self, args: &[&dyn Display]) {
        self.reported_error.set(true);
        self.record(&join_args(args));
    }

    fn errorf(&self, args: fmt::Arguments<'_>) {
        self.reported_error.set(true);
        self.record(&args.to_string());
    }

    fn fatal(&self, args: &[&dyn Display]) {
        self.triggered_failure.set(true);
        self.record(&join_args(args));
    }

    fn fatalf(&self, args: fmt::Arguments<'_>) {
        self.triggered_failure.set(true);
        self.record(&args.to_string());
    }

    fn failed(&self) -> bool {
        self.reported_error.get() || self.triggered_failure.get()
    }
}

/// Tester for plain `#[test]` functions.
///
/// Errors go to stderr and fail the test when the tester is dropped; fatal
/// failures panic right away.
#[derive(Debug, Default)]
pub struct StdTester {
    failed: Cell<bool>,
}

impl StdTester {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tester for StdTester {
    fn error(&self, args: &[&dyn Display]) {
        self.failed.set(true);
        eprintln!("{}", join_args(args));
    }

    fn errorf(&self, args: fmt::Arguments<'_>) {
        self.failed.set(true);
        eprintln!("{}", args);
    }

    fn fatal(&self, args: &[&dyn Display]) {
        self.failed.set(true);
        panic!("{}", join_args(args));
    }

    fn fatalf(&self, args: fmt::Arguments<'_>) {
        self.failed.set(true);
        panic!("{}", args);
    }

    fn failed(&self) -> bool {
        self.failed.get()
    }
}

impl Drop for StdTester {
    fn drop(&mut self) {
        if self.failed.get() && !std::thread::panicking() {
            panic!("test reported errors");
        }
    }
}

/// Report to `t` unless `want` and `have` are deeply equal. Returns whether
/// they were.
pub fn assert_equal<T, W, H>(t: &T, want: &W, have: &H, opts: &Options) -> bool
where
    T: Tester + ?Sized,
    W: Reflect + ?Sized,
    H: Reflect + ?Sized,
{
    t.helper();
    match equal(want, have, opts) {
        Ok(()) => true,
        Err(notice) => {
            t.errorf(format_args!("{}", notice));
            false
        }
    }
}

pub fn assert_not_equal<T, W, H>(t: &T, want: &W, have: &H, opts: &Options) -> bool
where
    T: Tester + ?Sized,
    W: Reflect + ?Sized,
    H: Reflect + ?Sized,
{
    t.helper();
    match not_equal(want, have, opts) {
        Ok(()) => true,
        Err(notice) => {
            t.errorf(format_args!("{}", notice));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::will_panic;

    #[test]
    fn test_spy_records_messages() {
        let spy = Spy::new();
        spy.error(&[&"a", &1, &'c']);
        spy.errorf(format_args!("n={}", 2));

        assert_eq!(spy.log(), "a 1 c\nn=2\n");
        assert!(spy.reported_error());
        assert!(!spy.triggered_failure());
        assert!(spy.failed());
    }

    #[test]
    fn test_spy_fatal() {
        let spy = Spy::new();
        spy.fatalf(format_args!("stop"));
        assert!(spy.triggered_failure());
        assert!(!spy.reported_error());
        assert_eq!(spy.log(), "stop\n");
    }

    #[test]
    fn test_assert_equal_forwards_notice() {
        let spy = Spy::new();
        assert!(assert_equal(&spy, &1, &1, &Options::new()));
        assert!(!spy.failed());

        assert!(!assert_equal(&spy, &42, &44, &Options::new()));
        assert_eq!(
            spy.log(),
            "expected values to be equal:\n  want: 42\n  have: 44\n"
        );
    }

    #[test]
    fn test_assert_not_equal() {
        let spy = Spy::new();
        assert!(assert_not_equal(&spy, &1, &2, &Options::new()));
        assert!(!assert_not_equal(&spy, &1, &1, &Options::new()));
        assert!(spy.log().starts_with("expected values not to be equal:"));
    }

    #[test]
    fn test_std_tester_fatal_panics() {
        let (value, _) = will_panic(|| {
            let t = StdTester::new();
            t.fatal(&[&"boom"]);
        });
        assert_eq!(value.map(|v| v.to_string()), Some("boom".to_string()));
    }

    #[test]
    fn test_std_tester_panics_on_drop_after_error() {
        let (value, _) = will_panic(|| {
            let t = StdTester::new();
            t.errorf(format_args!("recorded"));
        });
        assert_eq!(
            value.map(|v| v.to_string()),
            Some("test reported errors".to_string())
        );

        let (value, _) = will_panic(|| {
            let _t = StdTester::new();
        });
        assert!(value.is_none());
    }
}
