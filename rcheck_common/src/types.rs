use serde::{Deserialize, Serialize};

/// Default timestamp rendering format (RFC 3339 with nanoseconds).
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9f%:z";

/// Default parse format for string timestamps (RFC 3339).
pub const DEFAULT_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

/// Default window, in milliseconds, within which a timestamp counts as recent.
pub const DEFAULT_RECENT_MS: u64 = 10_000;

/// How durations are rendered by the dumper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationFormat {
    /// Human readable form, e.g. `1.5s`
    #[default]
    String,
    /// Floating point number of seconds, e.g. `1.5`
    Seconds,
}

/// Dumper settings as read from `rcheck.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DumpSettings {
    /// Render everything on a single line
    pub flat: bool,
    /// Multiline strings shorter than this are still rendered quoted
    pub flat_strings: usize,
    /// Drop all inner whitespace (implies flat)
    pub compact: bool,
    /// Reveal pointer addresses instead of `<addr>`
    pub ptr_addr: bool,
    /// chrono format string; `<unix>` and `<display>` are special tokens
    pub time_format: String,
    pub duration_format: DurationFormat,
    /// Prefix composites with their type name
    pub print_type: bool,
    /// Render the universal interface type as `any`
    pub use_any: bool,
    pub max_depth: usize,
    pub indent: usize,
    pub tab_width: usize,
    /// Render private struct fields
    pub private_fields: bool,
}

impl Default for DumpSettings {
    fn default() -> Self {
        Self {
            flat: false,
            flat_strings: 200,
            compact: false,
            ptr_addr: false,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            duration_format: DurationFormat::String,
            print_type: true,
            use_any: false,
            max_depth: 6,
            indent: 0,
            tab_width: 2,
            private_fields: false,
        }
    }
}

/// Comparison settings as read from `rcheck.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareSettings {
    pub skip_unexported: bool,
    pub cmp_base_types: bool,
    pub skip_trails: Vec<String>,
    /// chrono parse format for string timestamps
    pub time_format: String,
    pub recent_ms: u64,
}

impl Default for CompareSettings {
    fn default() -> Self {
        Self {
            skip_unexported: false,
            cmp_base_types: false,
            skip_trails: Vec::new(),
            time_format: DEFAULT_PARSE_FORMAT.to_string(),
            recent_ms: DEFAULT_RECENT_MS,
        }
    }
}

/// Top level settings file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub dump: DumpSettings,

    #[serde(default)]
    pub compare: CompareSettings,
}

impl Settings {
    pub fn from_toml_str(data: &str) -> crate::Result<Self> {
        toml::from_str(data).map_err(|e| crate::CheckError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults_from_empty_document() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.dump.max_depth, 6);
        assert_eq!(settings.dump.tab_width, 2);
        assert!(settings.dump.print_type);
        assert_eq!(settings.compare.recent_ms, DEFAULT_RECENT_MS);
    }

    #[test]
    fn test_settings_partial_document() {
        let data = r#"
[dump]
flat = true
duration_format = "seconds"

[compare]
skip_trails = ["T.Secret"]
"#;
        let settings = Settings::from_toml_str(data).unwrap();
        assert!(settings.dump.flat);
        assert_eq!(settings.dump.duration_format, DurationFormat::Seconds);
        assert_eq!(settings.dump.flat_strings, 200);
        assert_eq!(settings.compare.skip_trails, vec!["T.Secret".to_string()]);
        assert!(!settings.compare.cmp_base_types);
    }

    #[test]
    fn test_settings_invalid_document() {
        let err = Settings::from_toml_str("[dump]\nflat = 3").unwrap_err();
        assert!(matches!(err, crate::CheckError::Serialization(_)));
    }
}
