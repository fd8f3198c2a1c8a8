use std::collections::BTreeMap;
use std::fmt;
use tracing::{Level, Span};

/// Logging capability handed to the orchestrators.
///
/// Every operation runs inside the span produced by [`LogContext::span`], so each log line it
/// emits carries the component and operation names.
#[derive(Debug, Clone)]
pub struct LogContext {
    /// Component that is generating the log
    pub component: String,
    /// Operation or action being performed
    pub operation: Option<String>,
    /// Additional contextual fields
    pub fields: BTreeMap<String, String>,
}

impl LogContext {
    /// Create a new log context with just the component name
    pub fn new<S: Into<String>>(component: S) -> Self {
        LogContext {
            component: component.into(),
            operation: None,
            fields: BTreeMap::new(),
        }
    }

    /// Derive a context for one operation of this component, keeping its fields
    pub fn for_operation<T: Into<String>>(&self, operation: T) -> Self {
        LogContext {
            component: self.component.clone(),
            operation: Some(operation.into()),
            fields: self.fields.clone(),
        }
    }

    /// Add a field to the context
    pub fn with_field<S: Into<String>, T: Into<String>>(mut self, key: S, value: T) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    fn fields_display(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Create a span with this context's information
    pub fn span(&self, level: Level) -> Span {
        let op = self.operation.as_deref().unwrap_or("-");
        let fields = self.fields_display();
        match level {
            Level::TRACE => tracing::trace_span!("leadbridge", component = %self.component, operation = %op, fields = %fields),
            Level::DEBUG => tracing::debug_span!("leadbridge", component = %self.component, operation = %op, fields = %fields),
            Level::INFO => tracing::info_span!("leadbridge", component = %self.component, operation = %op, fields = %fields),
            Level::WARN => tracing::warn_span!("leadbridge", component = %self.component, operation = %op, fields = %fields),
            Level::ERROR => tracing::error_span!("leadbridge", component = %self.component, operation = %op, fields = %fields),
        }
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.component)?;

        if let Some(op) = &self.operation {
            write!(f, "[{}]", op)?;
        }

        for (key, value) in &self.fields {
            write!(f, "[{}={}]", key, value)?;
        }

        Ok(())
    }
}
