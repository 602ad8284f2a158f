//! # Request Parameter Parsing
//!
//! Query strings arrive as a raw map and are parsed here so every failure
//! carries the parameter name. Body fields are checked for presence.

use std::collections::HashMap;
use std::str::FromStr;

use crate::reviews::SortOrder;
use crate::text::Capitalization;

use super::errors::{ApiError, ApiResult};

/// Raw query string map
pub type RawQuery = HashMap<String, String>;

/// Optional parameter parsed with `FromStr`. Empty values count as absent.
pub fn parse_optional<T>(params: &RawQuery, key: &str) -> ApiResult<Option<T>>
where
    T: FromStr,
{
    match params.get(key).map(|v| v.trim()) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ApiError::InvalidQueryParam(format!("{}: '{}'", key, raw))),
    }
}

/// `sort` parameter: ASC, DESC or absent
pub fn parse_sort(params: &RawQuery) -> ApiResult<Option<SortOrder>> {
    match params.get("sort").map(|v| v.trim()) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(ApiError::InvalidQueryParam),
    }
}

/// `capitalization` parameter: UPPER, LOWER or absent
pub fn parse_capitalization(params: &RawQuery) -> ApiResult<Option<Capitalization>> {
    match params.get("capitalization").map(|v| v.trim()) {
        None | Some("") => Ok(None),
        Some(raw) => Ok(Some(raw.parse()?)),
    }
}

/// Record-count parameter (`max_records`, `count`).
///
/// Parsed as signed first so a negative value gets a specific message.
pub fn parse_count(params: &RawQuery, key: &str) -> ApiResult<Option<usize>> {
    match parse_optional::<i64>(params, key)? {
        None => Ok(None),
        Some(n) if n < 0 => Err(ApiError::InvalidQueryParam(format!(
            "{} must not be negative, got {}",
            key, n
        ))),
        Some(n) => usize::try_from(n)
            .map(Some)
            .map_err(|_| ApiError::InvalidQueryParam(format!("{}: '{}'", key, n))),
    }
}

/// Required body field
pub fn required<T>(value: Option<T>, name: &str) -> ApiResult<T> {
    value.ok_or_else(|| ApiError::MissingParam(name.to_string()))
}

/// Required text body field; blank strings count as missing
pub fn required_text(value: Option<String>, name: &str) -> ApiResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::MissingParam(name.to_string())),
    }
}
