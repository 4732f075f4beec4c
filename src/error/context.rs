//! Context attached to errors for debugging.

use chrono::{DateTime, Utc};

/// Where and when an error happened.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    /// The API operation that failed (`list`, `create`, `stream`, ...).
    pub operation: String,

    /// Organization parameterized name, if the operation targets a flow.
    pub organization: Option<String>,

    /// Flow parameterized name, if the operation targets a flow.
    pub flow: Option<String>,

    /// Message id for single-message operations.
    pub message_id: Option<i64>,

    /// Timestamp when the error occurred.
    pub timestamp: DateTime<Utc>,

    /// Component where the error originated.
    pub component: Option<String>,
}

impl ErrorContext {
    /// Create a new ErrorContext for an operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            organization: None,
            flow: None,
            message_id: None,
            timestamp: Utc::now(),
            component: None,
        }
    }

    /// Set the organization and flow this operation targeted.
    pub fn with_flow(mut self, organization: impl Into<String>, flow: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self.flow = Some(flow.into());
        self
    }

    /// Set the message id this operation targeted.
    pub fn with_message_id(mut self, id: i64) -> Self {
        self.message_id = Some(id);
        self
    }

    /// Set the component for this context.
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Get a `key=value` string suitable for logging.
    pub fn to_log_string(&self) -> String {
        let mut parts = vec![format!("operation={}", self.operation)];

        if let Some(ref organization) = self.organization {
            parts.push(format!("organization={}", organization));
        }

        if let Some(ref flow) = self.flow {
            parts.push(format!("flow={}", flow));
        }

        if let Some(id) = self.message_id {
            parts.push(format!("message_id={}", id));
        }

        if let Some(ref component) = self.component {
            parts.push(format!("component={}", component));
        }

        parts.push(format!("timestamp={}", self.timestamp.to_rfc3339()));

        parts.join(" ")
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new("unknown")
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.operation)?;

        if let (Some(organization), Some(flow)) = (&self.organization, &self.flow) {
            write!(f, " flow={}/{}", organization, flow)?;
        }

        if let Some(id) = self.message_id {
            write!(f, " message={}", id)?;
        }

        Ok(())
    }
}
