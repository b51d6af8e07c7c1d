use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinnerErrorKind {
    PrimitiveCreation,
    AlreadyRegistered,
    ForeignHandle,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinnerError {
    pub kind: SpinnerErrorKind,
    pub message: String,
}

impl SpinnerError {
    pub fn new(kind: SpinnerErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for SpinnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SpinnerError {}

pub fn primitive_creation(message: impl Into<String>) -> SpinnerError {
    SpinnerError::new(SpinnerErrorKind::PrimitiveCreation, message)
}

pub fn already_registered(message: impl Into<String>) -> SpinnerError {
    SpinnerError::new(SpinnerErrorKind::AlreadyRegistered, message)
}

pub fn foreign_handle(message: impl Into<String>) -> SpinnerError {
    SpinnerError::new(SpinnerErrorKind::ForeignHandle, message)
}

pub fn internal_error(message: impl Into<String>) -> SpinnerError {
    SpinnerError::new(SpinnerErrorKind::Internal, message)
}
