use serde::Serialize;

/// Outcome of one work item, tagged with the origin it was produced for.
///
/// Work functions return exactly one of these per item. The aggregating
/// driver tells the variants apart by matching, or through [`is_error`] and
/// [`error_message`] when only the capability methods are at hand.
///
/// [`is_error`]: ScanResult::is_error
/// [`error_message`]: ScanResult::error_message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanResult<R> {
    /// Resources discovered for `origin`, in discovery order
    Resources { origin: String, resources: Vec<R> },
    /// The work for `origin` failed with `message`
    Error { origin: String, message: String },
}

impl<R> ScanResult<R> {
    /// Create an empty success result for `origin`
    pub fn new(origin: impl Into<String>) -> Self {
        Self::Resources {
            origin: origin.into(),
            resources: Vec::new(),
        }
    }

    pub fn with_resources(origin: impl Into<String>, resources: Vec<R>) -> Self {
        Self::Resources {
            origin: origin.into(),
            resources,
        }
    }

    pub fn error(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// Convert a fallible listing into a result for `origin`.
    ///
    /// The error chain is flattened into the message so nothing is lost when
    /// the error crosses the thread boundary.
    pub fn from_outcome(origin: impl Into<String>, outcome: anyhow::Result<Vec<R>>) -> Self {
        match outcome {
            Ok(resources) => Self::with_resources(origin, resources),
            Err(e) => Self::error(origin, format!("{e:#}")),
        }
    }

    pub fn origin(&self) -> &str {
        match self {
            Self::Resources { origin, .. } | Self::Error { origin, .. } => origin,
        }
    }

    /// Resources carried by this result; always empty for errors
    pub fn resources(&self) -> &[R] {
        match self {
            Self::Resources { resources, .. } => resources,
            Self::Error { .. } => &[],
        }
    }

    pub fn into_resources(self) -> Vec<R> {
        match self {
            Self::Resources { resources, .. } => resources,
            Self::Error { .. } => Vec::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { message, .. } => Some(message),
            Self::Resources { .. } => None,
        }
    }

    /// Append a resource to a success result.
    ///
    /// Error results carry no resources, so the call is ignored for them.
    pub fn add_resource(&mut self, resource: R) {
        if let Self::Resources { resources, .. } = self {
            resources.push(resource);
        }
    }
}
