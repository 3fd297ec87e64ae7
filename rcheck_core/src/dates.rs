//! Timestamp checks.
//!
//! Both helpers accept chrono timestamps, strings parsed with the
//! configured time format, and integers holding Unix seconds.

use crate::compare::compare_dump;
use crate::notice::Notice;
use crate::options::Options;
use crate::reflect::Reflect;
use crate::value::{Data, Value};
use chrono::{DateTime, FixedOffset, TimeDelta};
use rcheck_common::DEFAULT_PARSE_FORMAT;

pub const HEADER_EQUAL_DATES: &str = "expected equal dates";
pub const HEADER_RECENT: &str = "expected time to be recent";

/// Check that `want` and `have` denote the same instant.
pub fn time_equal<W, H>(want: &W, have: &H, opts: &Options) -> Result<(), Notice>
where
    W: Reflect + ?Sized,
    H: Reflect + ?Sized,
{
    let want = to_time(&want.reflect().unwrap_interface(), opts)?;
    let have = to_time(&have.reflect().unwrap_interface(), opts)?;
    if want == have {
        return Ok(());
    }

    let dump = compare_dump(opts);
    let diff = have.signed_duration_since(want);
    Err(Notice::new(HEADER_EQUAL_DATES)
        .set_trail(opts.trail())
        .want(dump.any(&want))
        .have(dump.any(&have))
        .append("diff", format_delta(diff)))
}

/// Check that `have` lies within the recent window around the options clock.
pub fn recent<T: Reflect + ?Sized>(have: &T, opts: &Options) -> Result<(), Notice> {
    let have = to_time(&have.reflect().unwrap_interface(), opts)?;
    let now = opts.now().fixed_offset();
    let diff = now.signed_duration_since(have);
    if diff.abs() <= opts.recent() {
        return Ok(());
    }

    let dump = compare_dump(opts);
    Err(Notice::new(HEADER_RECENT)
        .set_trail(opts.trail())
        .have(dump.any(&have))
        .append("now", dump.any(&now))
        .append("max diff", format_delta(opts.recent()))
        .append("diff", format_delta(diff)))
}

fn to_time(v: &Value, opts: &Options) -> Result<DateTime<FixedOffset>, Notice> {
    match v.data() {
        Data::Time(t) => Ok(*t),
        Data::Str(s) => parse_time(s, opts.time_format()).map_err(|err| {
            Notice::new("failed to parse time")
                .set_trail(opts.trail())
                .append("format", opts.time_format())
                .append("value", s.as_str())
                .wrap(err)
        }),
        Data::Int(_) | Data::Uint(_) => v
            .as_i128()
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|t| t.fixed_offset())
            .ok_or_else(|| {
                Notice::new("timestamp out of range")
                    .set_trail(opts.trail())
                    .append("value", compare_dump(opts).value(v))
            }),
        _ => Err(Notice::new("cannot compare values")
            .set_trail(opts.trail())
            .append("cause", format!("value of type {} is not a time", v.ty()))),
    }
}

fn parse_time(s: &str, format: &str) -> chrono::ParseResult<DateTime<FixedOffset>> {
    if format == DEFAULT_PARSE_FORMAT {
        DateTime::parse_from_rfc3339(s)
    } else {
        DateTime::parse_from_str(s, format)
    }
}

fn format_delta(d: TimeDelta) -> String {
    let sign = if d < TimeDelta::zero() { "-" } else { "" };
    match d.abs().to_std() {
        Ok(d) => format!("{}{:?}", sign, d),
        Err(_) => d.to_string(),
    }
}
