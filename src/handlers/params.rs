//! Query-string and body parsing shared by the resource handlers.

use crate::error::AppError;
use crate::query::{Page, DEFAULT_LIMIT, MAX_LIMIT};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

pub type QueryParams = HashMap<String, String>;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn text(params: &QueryParams, key: &str) -> String {
    params.get(key).cloned().unwrap_or_default()
}

/// Absent or empty is `None`; anything else must be an integer.
pub fn optional_i64(params: &QueryParams, key: &str) -> Result<Option<i64>, AppError> {
    match params.get(key).map(|s| s.trim()) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("{} must be an integer", key))),
    }
}

pub fn optional_date(params: &QueryParams, key: &str) -> Result<Option<NaiveDate>, AppError> {
    match params.get(key).map(|s| s.trim()) {
        None | Some("") => Ok(None),
        Some(s) => parse_date(key, s).map(Some),
    }
}

fn parse_date(field: &str, s: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|_| AppError::BadRequest(format!("{} must be a date (YYYY-MM-DD)", field)))
}

pub fn page(params: &QueryParams) -> Result<Page, AppError> {
    let offset = match params.get("offset").map(|s| s.trim()) {
        None | Some("") => 0,
        Some(s) => s
            .parse::<u32>()
            .map_err(|_| AppError::BadRequest("offset must be a non-negative integer".into()))?,
    };
    let limit = match params.get("limit").map(|s| s.trim()) {
        None | Some("") => DEFAULT_LIMIT,
        Some(s) => s
            .parse::<u32>()
            .map_err(|_| AppError::BadRequest(format!("limit must be between 1 and {}", MAX_LIMIT)))?,
    };
    Page::new(offset, limit)
}

pub fn path_id(raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("invalid id '{}'", raw)))
}

/// Deserialize a JSON body; shape errors are validation failures.
pub fn body<T: DeserializeOwned>(value: Value) -> Result<T, AppError> {
    if !value.is_object() {
        return Err(AppError::Validation("body must be a JSON object".into()));
    }
    serde_json::from_value(value).map_err(|e| AppError::Validation(e.to_string()))
}

/// An id sent either as a JSON number or as a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IntOrString {
    Int(i64),
    Text(String),
}

impl IntOrString {
    pub fn to_i64(&self, field: &str) -> Result<i64, AppError> {
        match self {
            IntOrString::Int(n) => Ok(*n),
            IntOrString::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| AppError::Validation(format!("{} must be an integer", field))),
        }
    }
}

/// A date carried as `YYYY-MM-DD` text in a request body.
pub fn body_date(field: &str, s: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| AppError::Validation(format!("{} must be a date (YYYY-MM-DD)", field)))
}
