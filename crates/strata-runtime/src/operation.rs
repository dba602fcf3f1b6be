//! Request and response envelopes for contract operations.
//!
//! A workload is one end-to-end unit of work, such as a single inbound
//! request. Every operation performed for it carries the same workload id,
//! so calls logged by behaviors at different depths can be correlated.
//! Responses collect [`ServiceError`]s instead of failing outright; only
//! [`ErrorSeverity::Error`] entries make a response unsuccessful.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Identity of one operation within a workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestHeader {
    /// Shared by every operation of the same workload.
    pub workload_id: Uuid,
    /// Name of the workload the operation belongs to.
    pub workload_name: String,
    /// Name of the requested operation.
    pub operation_name: String,
    /// Creation time in Unix milliseconds, UTC.
    pub invocation_timestamp_utc: i64,
}

impl RequestHeader {
    /// Reads the header of a serialized request, ignoring its payload.
    ///
    /// Returns `None` for values that are not requests.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Self::deserialize(value).ok()
    }
}

/// A call into a contract operation, tagged with its workload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OperationRequest<T> {
    /// Workload and operation identity.
    #[serde(flatten)]
    pub header: RequestHeader,
    /// Data the operation needs, if any.
    pub payload: Option<T>,
}

impl<T> OperationRequest<T> {
    /// Starts a new workload with a fresh id.
    #[must_use]
    pub fn new(
        workload_name: impl Into<String>,
        operation_name: impl Into<String>,
        payload: Option<T>,
    ) -> Self {
        Self {
            header: RequestHeader {
                workload_id: Uuid::new_v4(),
                workload_name: workload_name.into(),
                operation_name: operation_name.into(),
                invocation_timestamp_utc: Utc::now().timestamp_millis(),
            },
            payload,
        }
    }

    /// Creates a request for a downstream operation of `parent`'s workload.
    ///
    /// The workload id and name are inherited; the timestamp is taken now.
    #[must_use]
    pub fn child<P>(
        parent: &OperationRequest<P>,
        operation_name: impl Into<String>,
        payload: Option<T>,
    ) -> Self {
        Self {
            header: RequestHeader {
                workload_id: parent.header.workload_id,
                workload_name: parent.header.workload_name.clone(),
                operation_name: operation_name.into(),
                invocation_timestamp_utc: Utc::now().timestamp_millis(),
            },
            payload,
        }
    }

    /// Workload id shared with every related operation.
    #[must_use]
    pub const fn workload_id(&self) -> Uuid {
        self.header.workload_id
    }

    /// Name of the requested operation.
    #[must_use]
    pub fn operation_name(&self) -> &str {
        &self.header.operation_name
    }
}

/// How serious a [`ServiceError`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorSeverity {
    /// The operation can continue but later steps may be affected.
    Warning,
    /// The operation should stop.
    Error,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A problem reported by an operation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[error("{severity} at {site} ({error_kind}): {message}")]
pub struct ServiceError {
    /// Where the problem was detected, e.g. `Service1.DoSomething`.
    #[serde(default)]
    pub site: String,
    /// Short classification, e.g. `Validation`.
    #[serde(default)]
    pub error_kind: String,
    /// Human-readable description.
    #[serde(default)]
    pub message: String,
    /// Whether the problem stops the operation.
    pub severity: ErrorSeverity,
}

impl ServiceError {
    /// Creates an [`ErrorSeverity::Error`] entry.
    #[must_use]
    pub fn error(
        site: impl Into<String>,
        error_kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            site: site.into(),
            error_kind: error_kind.into(),
            message: message.into(),
            severity: ErrorSeverity::Error,
        }
    }

    /// Creates an [`ErrorSeverity::Warning`] entry.
    #[must_use]
    pub fn warning(
        site: impl Into<String>,
        error_kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: ErrorSeverity::Warning,
            ..Self::error(site, error_kind, message)
        }
    }
}

/// Result of an operation: the payload plus any errors collected on the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OperationResponse<T> {
    /// Header of the request this answers.
    pub request: RequestHeader,
    /// Operation result, if one was produced.
    pub payload: Option<T>,
    #[serde(default)]
    errors: Vec<ServiceError>,
}

impl<T> OperationResponse<T> {
    /// Answers `request` with `payload` and no errors.
    #[must_use]
    pub fn new<R>(request: &OperationRequest<R>, payload: Option<T>) -> Self {
        Self {
            request: request.header.clone(),
            payload,
            errors: Vec::new(),
        }
    }

    /// Records one error.
    pub fn add_error(&mut self, error: ServiceError) {
        self.errors.push(error);
    }

    /// Copies every error from a downstream response.
    pub fn add_errors<U>(&mut self, donor: &OperationResponse<U>) {
        self.errors.extend(donor.errors.iter().cloned());
    }

    /// Errors collected so far, warnings included.
    #[must_use]
    pub fn errors(&self) -> &[ServiceError] {
        &self.errors
    }

    /// Returns whether any warning was recorded.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.errors.iter().any(|e| e.severity == ErrorSeverity::Warning)
    }

    /// Returns whether any error-severity entry was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(|e| e.severity == ErrorSeverity::Error)
    }

    /// A payload is present and no error-severity entry was recorded.
    #[must_use]
    pub fn is_successful(&self) -> bool {
        !self.has_errors() && self.payload.is_some()
    }
}

impl OperationResponse<Value> {
    /// Reads a serialized response, keeping its payload as raw JSON.
    ///
    /// Returns `None` for values that are not responses.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Self::deserialize(value).ok()
    }
}
