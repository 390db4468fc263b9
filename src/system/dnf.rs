//! Package manager retention limit (`installonly_limit`)

use thiserror::Error;

use crate::constants::{DEFAULT_INSTALLONLY_LIMIT, INSTALLONLY_LIMIT_KEY, INSTALLONLY_LIMIT_RANGE};

/// Rejected operator input for a new limit
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LimitError {
    #[error("'{0}' is not a whole number")]
    NotANumber(String),
    #[error("{value} is outside the allowed range {min}..={max}")]
    OutOfRange { value: u32, min: u32, max: u32 },
}

/// Where the effective limit came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitSource {
    Configured,
    Default,
}

/// Limit as read from the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct InstallLimit {
    pub value: u32,
    pub source: LimitSource,
}

impl InstallLimit {
    /// Interpret the output of a filtered read of the config file.
    ///
    /// The last `installonly_limit=` line wins. A missing or unparseable
    /// value falls back to the package manager's default.
    pub fn from_config_output(output: &str) -> Self {
        let configured = output
            .lines()
            .filter_map(|line| {
                let (key, value) = line.trim().split_once('=')?;
                (key.trim() == INSTALLONLY_LIMIT_KEY).then(|| value.trim())
            })
            .last()
            .and_then(|value| value.parse::<u32>().ok());

        match configured {
            Some(value) => Self {
                value,
                source: LimitSource::Configured,
            },
            None => Self::default(),
        }
    }
}

impl Default for InstallLimit {
    fn default() -> Self {
        Self {
            value: DEFAULT_INSTALLONLY_LIMIT,
            source: LimitSource::Default,
        }
    }
}

impl std::fmt::Display for InstallLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.source {
            LimitSource::Configured => write!(f, "{}", self.value),
            LimitSource::Default => write!(f, "{} (default)", self.value),
        }
    }
}

/// Validate operator input for a new limit
pub fn validate_install_limit(input: &str) -> Result<u32, LimitError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(LimitError::NotANumber(trimmed.to_string()));
    }
    let value: u32 = trimmed
        .parse()
        .map_err(|_| LimitError::NotANumber(trimmed.to_string()))?;

    if !INSTALLONLY_LIMIT_RANGE.contains(&value) {
        return Err(LimitError::OutOfRange {
            value,
            min: *INSTALLONLY_LIMIT_RANGE.start(),
            max: *INSTALLONLY_LIMIT_RANGE.end(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_limit() {
        let limit = InstallLimit::from_config_output("installonly_limit=5\n");
        assert_eq!(limit.value, 5);
        assert_eq!(limit.source, LimitSource::Configured);
        assert_eq!(limit.to_string(), "5");
    }

    #[test]
    fn test_missing_key_uses_default() {
        let limit = InstallLimit::from_config_output("");
        assert_eq!(limit, InstallLimit::default());
        assert_eq!(limit.value, 3);
        assert_eq!(limit.to_string(), "3 (default)");
    }

    #[test]
    fn test_garbage_value_uses_default() {
        let limit = InstallLimit::from_config_output("installonly_limit=lots\n");
        assert_eq!(limit.source, LimitSource::Default);
    }

    #[test]
    fn test_spaces_around_equals_and_last_wins() {
        let output = "installonly_limit = 2\ninstallonly_limit=7\n";
        assert_eq!(InstallLimit::from_config_output(output).value, 7);
    }

    #[test]
    fn test_similar_key_not_matched() {
        let output = "installonly_limit_extra=9\n";
        assert_eq!(
            InstallLimit::from_config_output(output).source,
            LimitSource::Default
        );
    }

    #[test]
    fn test_validate_accepts_range() {
        assert_eq!(validate_install_limit("1"), Ok(1));
        assert_eq!(validate_install_limit(" 10 "), Ok(10));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert_eq!(
            validate_install_limit("0"),
            Err(LimitError::OutOfRange {
                value: 0,
                min: 1,
                max: 10
            })
        );
        assert!(matches!(
            validate_install_limit("11"),
            Err(LimitError::OutOfRange { value: 11, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_non_numbers() {
        for input in ["", "abc", "-3", "+3", "2.5", "99999999999"] {
            assert!(validate_install_limit(input).is_err(), "{:?}", input);
        }
    }
}
