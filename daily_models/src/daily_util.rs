use smallvec::SmallVec;
use stack_string::{format_sstr, StackString};
use time::{macros::format_description, Date, PrimitiveDateTime};

use daily_lib::errors::DailyError as Error;

pub const MINUTES_PER_HOUR: f64 = 60.0;
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Convert a `H:MM:SS`, `M:SS` or `SS` duration string to decimal hours.
/// # Errors
/// Return `FormatError` if the string doesn't have one to three integer
/// fields
pub fn convert_duration_to_hours(duration_str: &str) -> Result<f64, Error> {
    let entries: SmallVec<[&str; 3]> = duration_str.trim().split(':').collect();
    let (h, m, s) = match entries.as_slice() {
        [h, m, s] => (*h, *m, *s),
        [m, s] => ("0", *m, *s),
        [s] => ("0", "0", *s),
        _ => {
            return Err(Error::FormatError(format_sstr!(
                "Duration format not recognized: {duration_str}"
            )))
        }
    };
    let parse = |field: &str| -> Result<u32, Error> {
        field.trim().parse().map_err(|e| {
            Error::FormatError(format_sstr!("Invalid duration {duration_str:?}: {e}"))
        })
    };
    let (h, m, s) = (parse(h)?, parse(m)?, parse(s)?);
    Ok(f64::from(h) + f64::from(m) / MINUTES_PER_HOUR + f64::from(s) / SECONDS_PER_HOUR)
}

/// Parse a sample timestamp such as `18 Oct 2026 at 23:10`.
/// # Errors
/// Return `FormatError` if the string doesn't match
pub fn parse_sample_datetime(datetime_str: &str) -> Result<PrimitiveDateTime, Error> {
    PrimitiveDateTime::parse(
        datetime_str.trim(),
        format_description!(
            "[day padding:none] [month repr:short] [year] at [hour padding:none]:[minute]"
        ),
    )
    .map_err(|e| Error::FormatError(format_sstr!("Invalid date {datetime_str:?}: {e}")))
}

/// Title used for a daily page, e.g. `October 05, 2026`.
/// # Errors
/// Return error if formatting fails
pub fn format_title_date(date: Date) -> Result<StackString, Error> {
    date.format(format_description!("[month repr:long] [day], [year]"))
        .map(Into::into)
        .map_err(Into::into)
}

/// # Errors
/// Return error if formatting fails
pub fn format_property_date(date: Date) -> Result<StackString, Error> {
    date.format(format_description!("[year]-[month]-[day]"))
        .map(Into::into)
        .map_err(Into::into)
}

/// Parse the date part of a date property start, which is either
/// `YYYY-MM-DD` or a full ISO 8601 datetime.
/// # Errors
/// Return `FormatError` if the leading `YYYY-MM-DD` can't be parsed
pub fn parse_property_date(date_str: &str) -> Result<Date, Error> {
    let date_part = date_str.get(..10).unwrap_or(date_str);
    Date::parse(date_part, format_description!("[year]-[month]-[day]"))
        .map_err(|e| Error::FormatError(format_sstr!("Invalid date {date_str:?}: {e}")))
}
