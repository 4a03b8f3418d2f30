use derive_more::Display;
use serde::{Deserialize, Serialize};
use stack_string::{format_sstr, StackString};
use std::{convert::Infallible, str::FromStr};
use time::{Date, PrimitiveDateTime, Time};

use daily_lib::errors::DailyError as Error;

use crate::{
    daily_util::parse_sample_datetime,
    raw_record::{cell_as_str, RawTable},
};

pub const SLEEP_START_DATE: &str = "sleep_start_date";
pub const SLEEP_END_DATE: &str = "sleep_end_date";
pub const SLEEP_LABEL: &str = "sleep_label";

/// Hour before which a sample ending yesterday belongs to an earlier night.
pub const NIGHT_CUTOFF_HOUR: u8 = 12;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(into = "StackString", from = "StackString")]
pub enum SleepLabel {
    #[display("REM")]
    Rem,
    #[display("Core")]
    Core,
    #[display("Deep")]
    Deep,
    #[display("In Bed")]
    InBed,
    #[display("Awake")]
    Awake,
    #[display("Asleep")]
    Asleep,
    #[display("{_0}")]
    Other(StackString),
}

impl SleepLabel {
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "REM" | "Rem" | "rem" => Self::Rem,
            "Core" | "core" => Self::Core,
            "Deep" | "deep" => Self::Deep,
            "In Bed" | "InBed" | "in bed" => Self::InBed,
            "Awake" | "awake" => Self::Awake,
            "Asleep" | "asleep" => Self::Asleep,
            other => Self::Other(other.into()),
        }
    }

    /// REM, Core and Deep count as actual sleep.
    #[must_use]
    pub fn is_sleep_stage(&self) -> bool {
        matches!(self, Self::Rem | Self::Core | Self::Deep)
    }
}

impl FromStr for SleepLabel {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}

impl From<StackString> for SleepLabel {
    fn from(item: StackString) -> Self {
        Self::from_label(&item)
    }
}

impl From<SleepLabel> for StackString {
    fn from(item: SleepLabel) -> Self {
        format_sstr!("{item}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepSample {
    pub label: SleepLabel,
    pub start: PrimitiveDateTime,
    pub end: PrimitiveDateTime,
    pub duration_minutes: f64,
}

impl SleepSample {
    #[must_use]
    pub fn new(label: SleepLabel, start: PrimitiveDateTime, end: PrimitiveDateTime) -> Self {
        let duration_minutes = (end - start).as_seconds_f64() / 60.0;
        Self {
            label,
            start,
            end,
            duration_minutes,
        }
    }

    /// Build samples from the sleep table. A table without a
    /// `sleep_start_date` column carries no samples.
    /// # Errors
    /// Return `FormatError` if a row lacks a start, end or label, or if a
    /// date doesn't parse
    pub fn from_table(table: &RawTable) -> Result<Vec<Self>, Error> {
        if !table.has_column(SLEEP_START_DATE) {
            return Ok(Vec::new());
        }
        table
            .rows()
            .map(|(index, row)| -> Result<Self, Error> {
                let cell = |column: &str| {
                    row.get(column).ok_or_else(|| {
                        Error::FormatError(format_sstr!("sample {index} has no {column}"))
                    })
                };
                let start = parse_sample_datetime(cell_as_str(
                    SLEEP_START_DATE,
                    cell(SLEEP_START_DATE)?,
                )?)?;
                let end =
                    parse_sample_datetime(cell_as_str(SLEEP_END_DATE, cell(SLEEP_END_DATE)?)?)?;
                let label = SleepLabel::from_label(cell_as_str(SLEEP_LABEL, cell(SLEEP_LABEL)?)?);
                Ok(Self::new(label, start, end))
            })
            .collect()
    }

    /// Whether the sample belongs to last night relative to `today`: samples
    /// ending yesterday before noon are from an earlier session.
    #[must_use]
    pub fn in_last_night(&self, today: Date) -> bool {
        let cutoff = Time::from_hms(NIGHT_CUTOFF_HOUR, 0, 0).unwrap_or(Time::MIDNIGHT);
        match today.previous_day() {
            Some(yesterday) => !(self.end.date() == yesterday && self.end.time() < cutoff),
            None => true,
        }
    }
}
