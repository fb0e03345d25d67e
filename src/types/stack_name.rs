// ABOUTME: Validated CloudFormation stack name newtype.
// ABOUTME: Enforces the orchestration service's stack naming rules.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StackNameError {
    #[error("stack name cannot be empty")]
    Empty,

    #[error("stack name exceeds maximum length of 128 characters")]
    TooLong,

    #[error("stack name must start with a letter")]
    MustStartWithLetter,

    #[error("invalid character in stack name: '{0}'")]
    InvalidChar(char),
}

/// A validated stack name.
///
/// Stack names are 1-128 characters, start with a letter, and contain only
/// ASCII letters, digits, and hyphens.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StackName(String);

impl StackName {
    pub fn new(value: &str) -> Result<Self, StackNameError> {
        if value.is_empty() {
            return Err(StackNameError::Empty);
        }

        if value.len() > 128 {
            return Err(StackNameError::TooLong);
        }

        let first = value.chars().next().unwrap();
        if !first.is_ascii_alphabetic() {
            return Err(StackNameError::MustStartWithLetter);
        }

        for c in value.chars() {
            if !c.is_ascii_alphanumeric() && c != '-' {
                return Err(StackNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StackName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
