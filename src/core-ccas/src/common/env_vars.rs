use std::{str::FromStr, time::Duration};

use crate::common::config::ConfigError;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TimeUnit {
    Seconds,
    Minutes,
}

impl TimeUnit {
    /// `None` when the amount doesn't fit in a `Duration` of seconds.
    pub fn duration(&self, amount: u64) -> Option<Duration> {
        match self {
            TimeUnit::Seconds => Some(Duration::from_secs(amount)),
            TimeUnit::Minutes => amount.checked_mul(60).map(Duration::from_secs),
        }
    }
}

/// Reads a variable through `lookup`. Unset and whitespace-only values both count as absent.
pub fn non_empty_var<F>(lookup: &F, var_name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var_name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// The variable's value, or a configuration error naming it when it's unset or empty.
pub fn required_var<F>(lookup: &F, var_name: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty_var(lookup, var_name).ok_or_else(|| ConfigError::MissingVariable(var_name.to_string()))
}

pub fn var_or<F>(lookup: &F, var_name: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    non_empty_var(lookup, var_name).unwrap_or_else(|| default.to_string())
}

/// Parses the variable as a number, using `default` when it's absent.
pub fn number_var<F, T>(lookup: &F, var_name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty_var(lookup, var_name) {
        Some(value) => value.parse::<T>().map_err(|e| ConfigError::InvalidNumber {
            var_name: var_name.to_string(),
            value,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Retrieves the value of the variable as a duration in the given units.
pub fn duration_var<F>(lookup: &F, units: TimeUnit, var_name: &str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let amount: u64 = number_var(lookup, var_name, default)?;
    units.duration(amount).ok_or_else(|| ConfigError::InvalidNumber {
        var_name: var_name.to_string(),
        value: amount.to_string(),
        reason: "duration is too large".to_string(),
    })
}
