use derive_more::Display;
use log::debug;
use serde::{Deserialize, Serialize};
use stack_string::format_sstr;
use time::Date;

use daily_lib::errors::DailyError as Error;

use crate::{
    daily_util::{convert_duration_to_hours, parse_sample_datetime, MINUTES_PER_HOUR},
    raw_record::{cell_as_i64, cell_as_str, RawRecord, RawTable},
    sleep_sample::{SleepLabel, SleepSample, SLEEP_END_DATE},
};

pub const SLEEP_DURATION: &str = "sleep_duration";
pub const STEPS_VALUE: &str = "steps_value";

/// Figures written to the daily page, computed once per run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Display)]
#[display(
    "sleep_end_date={sleep_end_date} total_daily_sleep={total_daily_sleep_hours:.2}h \
     last_night_sleep={last_night_sleep_hours:.2}h \
     time_in_bed={last_night_time_in_bed_hours:.2}h total_steps={total_steps}"
)]
pub struct DailySummary {
    pub sleep_end_date: Date,
    pub total_daily_sleep_hours: f64,
    pub total_steps: i64,
    pub last_night_sleep_hours: f64,
    pub last_night_time_in_bed_hours: f64,
}

impl DailySummary {
    /// # Errors
    /// Return error if `data` isn't a JSON object or any field fails to parse
    pub fn from_json(data: &str, today: Date) -> Result<Self, Error> {
        let record = RawRecord::from_json(data)?;
        Self::from_raw_record(&record, today)
    }

    /// Aggregate the payload relative to `today`: only samples from last
    /// night count, REM/Core/Deep time is the sleep total unless there is
    /// none, in which case time in bed is used instead. A payload without
    /// samples falls back on `sleep_duration` and a scalar `sleep_end_date`.
    /// # Errors
    /// Return `FormatError` if any sample, duration or step count fails to
    /// parse
    pub fn from_raw_record(record: &RawRecord, today: Date) -> Result<Self, Error> {
        let (sleep, steps) = record.partition();

        let all_samples = SleepSample::from_table(&sleep)?;
        let has_samples = !all_samples.is_empty();
        let samples: Vec<_> = all_samples
            .into_iter()
            .filter(|sample| sample.in_last_night(today))
            .collect();
        debug!("{} sleep samples from last night", samples.len());

        let last_night_sleep = samples
            .iter()
            .filter(|sample| sample.label.is_sleep_stage())
            .fold(0.0, |total, sample| total + sample.duration_minutes);
        let last_night_time_in_bed = samples
            .iter()
            .filter(|sample| sample.label == SleepLabel::InBed)
            .fold(0.0, |total, sample| total + sample.duration_minutes);

        let last_night_sleep_hours = last_night_sleep / MINUTES_PER_HOUR;
        let last_night_time_in_bed_hours = last_night_time_in_bed / MINUTES_PER_HOUR;

        let total_daily_sleep_hours = match record.get(SLEEP_DURATION) {
            Some(duration) if !has_samples => {
                convert_duration_to_hours(cell_as_str(SLEEP_DURATION, duration)?)?
            }
            _ if last_night_sleep == 0.0 => last_night_time_in_bed_hours,
            _ => last_night_sleep_hours,
        };

        let sleep_end_date = match samples.iter().map(|sample| sample.end).max() {
            Some(end) => end.date(),
            None if !has_samples => Self::fallback_end_date(&sleep)?.unwrap_or(today),
            None => today,
        };

        Ok(Self {
            sleep_end_date,
            total_daily_sleep_hours,
            total_steps: Self::sum_steps(&steps)?,
            last_night_sleep_hours,
            last_night_time_in_bed_hours,
        })
    }

    fn fallback_end_date(sleep: &RawTable) -> Result<Option<Date>, Error> {
        sleep
            .column(SLEEP_END_DATE)
            .last()
            .map(|cell| {
                let end = parse_sample_datetime(cell_as_str(SLEEP_END_DATE, cell)?)?;
                Ok(end.date())
            })
            .transpose()
    }

    /// # Errors
    /// Return `FormatError` if a step count isn't numeric or the total
    /// overflows
    pub fn sum_steps(steps: &RawTable) -> Result<i64, Error> {
        steps.column(STEPS_VALUE).try_fold(0_i64, |total, cell| {
            let value = cell_as_i64(STEPS_VALUE, cell)?;
            total.checked_add(value).ok_or_else(|| {
                Error::FormatError(format_sstr!("{STEPS_VALUE}: total overflows at {value}"))
            })
        })
    }
}
