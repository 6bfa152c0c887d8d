use csv::Error as CsvError;
use envy::Error as EnvyError;
use quick_xml::{events::attributes::AttrError, Error as QuickXmlError};
use reqwest::{header::InvalidHeaderValue, Error as ReqwestError};
use stack_string::StackString;
use std::{fmt::Debug, num::TryFromIntError};
use thiserror::Error;
use time::error::Parse as TimeParseError;
use url::ParseError as UrlParseError;

#[derive(Error, Debug)]
pub enum HealthError {
    #[error("io Error {0}")]
    IoError(#[from] std::io::Error),
    #[error("CsvError {0}")]
    CsvError(#[from] CsvError),
    #[error("QuickXmlError {0}")]
    QuickXmlError(Box<QuickXmlError>),
    #[error("XmlAttrError {0}")]
    XmlAttrError(#[from] AttrError),
    #[error("ReqwestError {0}")]
    ReqwestError(#[from] ReqwestError),
    #[error("InvalidHeaderValue {0}")]
    InvalidHeaderValue(#[from] InvalidHeaderValue),
    #[error("UrlParseError {0}")]
    UrlParseError(#[from] UrlParseError),
    #[error("EnvyError {0}")]
    EnvyError(#[from] EnvyError),
    #[error("TimeParseError {0}")]
    TimeParseError(Box<TimeParseError>),
    #[error("TryFromIntError {0}")]
    TryFromIntError(#[from] TryFromIntError),
    #[error("data source already exists: {0}")]
    DataSourceExists(StackString),
    #[error("api request failed with status {status}: {body}")]
    ApiError { status: u16, body: StackString },
    #[error("no data to import")]
    NoDataToImport,
    #[error("No {0} specified")]
    MissingConfig(&'static str),
    #[error("{0}")]
    StaticCustomError(&'static str),
    #[error("{0}")]
    CustomError(StackString),
}

impl From<QuickXmlError> for HealthError {
    fn from(value: QuickXmlError) -> Self {
        Self::QuickXmlError(value.into())
    }
}

impl From<TimeParseError> for HealthError {
    fn from(value: TimeParseError) -> Self {
        Self::TimeParseError(value.into())
    }
}
