use log::SetLoggerError;
use reqwest::{header::InvalidHeaderValue, Error as ReqwestError, StatusCode};
use serde_json::Error as SerdeJsonError;
use stack_string::StackString;
use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;
use time::error::{
    ComponentRange as TimeComponentRange, Format as TimeFormatError, Parse as TimeParseError,
};
use url::ParseError as UrlParseError;

#[derive(Error, Debug)]
pub enum DailyError {
    #[error("FormatError {0}")]
    FormatError(StackString),
    #[error("RemoteCallError {status}: {message}")]
    RemoteCallError {
        status: StatusCode,
        message: StackString,
    },
    #[error("LookupError {0}")]
    LookupError(StackString),
    #[error("ReqwestError {0}")]
    ReqwestError(#[from] ReqwestError),
    #[error("InvalidHeaderValue {0}")]
    InvalidHeaderValue(#[from] InvalidHeaderValue),
    #[error("SerdeJsonError {0}")]
    SerdeJsonError(#[from] SerdeJsonError),
    #[error("TimeComponentRange {0}")]
    TimeComponentRange(Box<TimeComponentRange>),
    #[error("TimeFormatError {0}")]
    TimeFormatError(#[from] TimeFormatError),
    #[error("TimeParseError {0}")]
    TimeParseError(Box<TimeParseError>),
    #[error("ParseIntError {0}")]
    ParseIntError(#[from] ParseIntError),
    #[error("ParseFloatError {0}")]
    ParseFloatError(#[from] ParseFloatError),
    #[error("UrlParseError {0}")]
    UrlParseError(#[from] UrlParseError),
    #[error("SetLoggerError {0}")]
    SetLoggerError(#[from] SetLoggerError),
    #[error("io Error {0}")]
    IoError(#[from] std::io::Error),
    #[error("{0}")]
    StaticCustomError(&'static str),
    #[error("{0}")]
    CustomError(StackString),
}

impl From<TimeComponentRange> for DailyError {
    fn from(value: TimeComponentRange) -> Self {
        Self::TimeComponentRange(value.into())
    }
}

impl From<TimeParseError> for DailyError {
    fn from(value: TimeParseError) -> Self {
        Self::TimeParseError(value.into())
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use std::num::ParseIntError;

    use crate::errors::DailyError as Error;

    #[test]
    fn test_error_display() {
        let err = Error::FormatError("Duration format not recognized: 1:2:3:4".into());
        assert_eq!(
            err.to_string(),
            "FormatError Duration format not recognized: 1:2:3:4"
        );

        let err = Error::RemoteCallError {
            status: StatusCode::BAD_REQUEST,
            message: "body failed validation".into(),
        };
        assert_eq!(
            err.to_string(),
            "RemoteCallError 400 Bad Request: body failed validation"
        );

        let err = Error::LookupError("no page dated 2026-10-18".into());
        assert_eq!(err.to_string(), "LookupError no page dated 2026-10-18");
    }

    #[test]
    fn test_error_from() {
        let parse_err: ParseIntError = "AB".parse::<i64>().unwrap_err();
        let err: Error = parse_err.into();
        assert_eq!(
            err.to_string(),
            "ParseIntError invalid digit found in string"
        );
    }

    #[test]
    fn test_error_size() {
        println!("StackString {}", std::mem::size_of::<stack_string::StackString>());
        println!("StatusCode {}", std::mem::size_of::<StatusCode>());
        println!("io Error {}", std::mem::size_of::<std::io::Error>());
        println!("DailyError {}", std::mem::size_of::<Error>());
        assert!(std::mem::size_of::<Error>() <= 64);
    }
}
