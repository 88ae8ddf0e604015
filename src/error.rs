// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

/// The broad category of an error. None of these are transient: the core
/// performs no I/O, so nothing it reports is worth retrying.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorKind {
    /// Malformed or out-of-domain input.
    Validation,
    /// A card identity is not in the registry.
    NotFound,
    /// An invalid parameter set.
    Configuration,
    /// A failure in the hosting program (files, terminal).
    Host,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ErrorReport {
    kind: ErrorKind,
    message: String,
}

impl ErrorReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Host, message)
    }

    pub fn with_kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for ErrorReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "error: {}", self.message)
    }
}

impl Error for ErrorReport {}

impl From<std::io::Error> for ErrorReport {
    fn from(value: std::io::Error) -> Self {
        ErrorReport::new(format!("I/O error: {value}"))
    }
}

impl From<serde_json::Error> for ErrorReport {
    fn from(value: serde_json::Error) -> Self {
        ErrorReport::with_kind(ErrorKind::Validation, format!("malformed JSON: {value}"))
    }
}

impl From<toml::de::Error> for ErrorReport {
    fn from(value: toml::de::Error) -> Self {
        ErrorReport::with_kind(
            ErrorKind::Configuration,
            format!("malformed configuration: {value}"),
        )
    }
}

pub type Fallible<T> = Result<T, ErrorReport>;

pub fn fail<T>(message: impl Into<String>) -> Fallible<T> {
    Err(ErrorReport::new(message))
}

pub fn invalid<T>(message: impl Into<String>) -> Fallible<T> {
    Err(ErrorReport::with_kind(ErrorKind::Validation, message))
}

pub fn not_found<T>(message: impl Into<String>) -> Fallible<T> {
    Err(ErrorReport::with_kind(ErrorKind::NotFound, message))
}

pub fn misconfigured<T>(message: impl Into<String>) -> Fallible<T> {
    Err(ErrorReport::with_kind(ErrorKind::Configuration, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ErrorReport::new("directory does not exist.");
        assert_eq!(err.to_string(), "error: directory does not exist.");
    }

    #[test]
    fn test_helpers_set_kind() {
        let err: ErrorReport = invalid::<()>("bad").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err: ErrorReport = not_found::<()>("missing").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err: ErrorReport = misconfigured::<()>("alpha").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        let err: ErrorReport = fail::<()>("io").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Host);
        assert_eq!(err.message(), "io");
    }

    #[test]
    fn test_json_errors_are_validation_errors() {
        let err: ErrorReport = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
