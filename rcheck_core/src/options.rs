use crate::dump::DumpConfig;
use crate::notice::Notice;
use crate::reflect::Reflect;
use crate::registry;
use crate::value::{Type, Value};
use chrono::{DateTime, TimeDelta, Utc};
use rcheck_common::{Settings, DEFAULT_PARSE_FORMAT, DEFAULT_RECENT_MS};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::trace;

/// Custom comparison for a type or a trail.
pub type Checker = Arc<dyn Fn(&Value, &Value, &Options) -> Result<(), Notice> + Send + Sync>;

/// Clock used by time checks.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Append-only record of every trail a comparison visits.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct TrailLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl TrailLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, trail: impl Into<String>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(trail.into());
    }

    /// Snapshot of the recorded trails, in visitation order.
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Comparison options
#[derive(Clone)]
pub struct Options {
    trail: String,
    trail_log: Option<TrailLog>,
    skip_trails: HashSet<String>,
    skip_unexported: bool,
    type_checkers: HashMap<Type, Checker>,
    trail_checkers: HashMap<String, Checker>,
    cmp_base_types: bool,
    time_format: String,
    recent: TimeDelta,
    now: Clock,
    dump: DumpConfig,
}

impl Options {
    /// Default options, with the type checkers registered globally at the
    /// time of the call.
    pub fn new() -> Self {
        Self {
            trail: String::new(),
            trail_log: None,
            skip_trails: HashSet::new(),
            skip_unexported: false,
            type_checkers: registry::snapshot(),
            trail_checkers: HashMap::new(),
            cmp_base_types: false,
            time_format: DEFAULT_PARSE_FORMAT.to_string(),
            recent: TimeDelta::milliseconds(DEFAULT_RECENT_MS as i64),
            now: Arc::new(Utc::now),
            dump: DumpConfig::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let compare = &settings.compare;
        Self::new()
            .with_skip_unexported(compare.skip_unexported)
            .with_cmp_base_types(compare.cmp_base_types)
            .with_skip_trails(compare.skip_trails.iter().cloned())
            .with_time_format(compare.time_format.clone())
            .with_recent(TimeDelta::milliseconds(
                i64::try_from(compare.recent_ms).unwrap_or(i64::MAX),
            ))
            .with_dump(DumpConfig::from_settings(&settings.dump))
    }

    pub fn with_trail(mut self, trail: impl Into<String>) -> Self {
        self.trail = trail.into();
        self
    }

    pub fn with_trail_log(mut self, log: &TrailLog) -> Self {
        self.trail_log = Some(log.clone());
        self
    }

    /// Trails to skip. Adds to previously skipped trails.
    pub fn with_skip_trails<I, S>(mut self, trails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_trails.extend(trails.into_iter().map(Into::into));
        self
    }

    pub fn with_skip_unexported(mut self, skip: bool) -> Self {
        self.skip_unexported = skip;
        self
    }

    /// Compare values of type `T` with `checker` in this comparison only.
    pub fn with_type_checker<T, F>(self, checker: F) -> Self
    where
        T: Reflect,
        F: Fn(&Value, &Value, &Options) -> Result<(), Notice> + Send + Sync + 'static,
    {
        self.with_type_checker_for(T::ty(), Arc::new(checker))
    }

    /// Compare values of type `ty`, matched on name and kind, with `checker`.
    pub fn with_type_checker_for(mut self, ty: Type, checker: Checker) -> Self {
        self.type_checkers.insert(ty, checker);
        self
    }

    /// Compare the values found at `trail` with `checker`. Takes precedence
    /// over type checkers.
    pub fn with_trail_checker<F>(mut self, trail: impl Into<String>, checker: F) -> Self
    where
        F: Fn(&Value, &Value, &Options) -> Result<(), Notice> + Send + Sync + 'static,
    {
        self.trail_checkers.insert(trail.into(), Arc::new(checker));
        self
    }

    pub fn with_cmp_base_types(mut self, cmp: bool) -> Self {
        self.cmp_base_types = cmp;
        self
    }

    /// chrono format used to parse string timestamps.
    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    pub fn with_recent(mut self, recent: TimeDelta) -> Self {
        self.recent = recent;
        self
    }

    pub fn with_now<F>(mut self, now: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.now = Arc::new(now);
        self
    }

    pub fn with_dump(mut self, dump: DumpConfig) -> Self {
        self.dump = dump;
        self
    }

    pub fn trail(&self) -> &str {
        &self.trail
    }

    pub fn trail_log(&self) -> Option<&TrailLog> {
        self.trail_log.as_ref()
    }

    pub fn is_skipped(&self, trail: &str) -> bool {
        self.skip_trails.contains(trail)
    }

    pub fn skip_unexported(&self) -> bool {
        self.skip_unexported
    }

    pub fn type_checker(&self, ty: &Type) -> Option<&Checker> {
        self.type_checkers.get(ty)
    }

    pub fn trail_checker(&self, trail: &str) -> Option<&Checker> {
        self.trail_checkers.get(trail)
    }

    pub fn cmp_base_types(&self) -> bool {
        self.cmp_base_types
    }

    pub fn time_format(&self) -> &str {
        &self.time_format
    }

    pub fn recent(&self) -> TimeDelta {
        self.recent
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.now)()
    }

    pub fn dump_config(&self) -> &DumpConfig {
        &self.dump
    }

    /// Copy of these options positioned at `trail`.
    pub fn at_trail(&self, trail: &str) -> Options {
        self.clone().with_trail(trail)
    }

    pub(crate) fn log_trail(&self, trail: &str) {
        trace!(trail, "visited");
        if let Some(log) = &self.trail_log {
            log.push(trail);
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut type_checkers: Vec<String> = self
            .type_checkers
            .keys()
            .map(|ty| format!("{} ({})", ty, ty.kind()))
            .collect();
        type_checkers.sort();
        let mut trail_checkers: Vec<&String> = self.trail_checkers.keys().collect();
        trail_checkers.sort();
        f.debug_struct("Options")
            .field("trail", &self.trail)
            .field("trail_log", &self.trail_log)
            .field("skip_trails", &self.skip_trails)
            .field("skip_unexported", &self.skip_unexported)
            .field("type_checkers", &type_checkers)
            .field("trail_checkers", &trail_checkers)
            .field("cmp_base_types", &self.cmp_base_types)
            .field("time_format", &self.time_format)
            .field("recent", &self.recent)
            .field("dump", &self.dump)
            .finish_non_exhaustive()
    }
}
