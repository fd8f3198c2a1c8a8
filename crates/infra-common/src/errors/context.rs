use crate::errors::types::Error;
use std::fmt;

/// Where an error happened: component, operation and optional details
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Component where the error occurred
    pub component: String,
    /// Operation that was being performed
    pub operation: String,
    /// Additional context information
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new<S: Into<String>, T: Into<String>>(component: S, operation: T) -> Self {
        ErrorContext {
            component: component.into(),
            operation: operation.into(),
            details: None,
        }
    }

    /// Add details to the context
    pub fn with_details<S: Into<String>>(mut self, details: S) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "in component '{}' during operation '{}'", self.component, self.operation)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

/// Extension trait for attaching an [`ErrorContext`] to errors and results
pub trait ErrorExt<T> {
    /// Attach a full context
    fn context(self, ctx: ErrorContext) -> std::result::Result<T, Error>;

    /// Attach a context built from component and operation names
    fn with_context<S: Into<String>, O: Into<String>>(
        self,
        component: S,
        operation: O,
    ) -> std::result::Result<T, Error>;
}

impl Error {
    /// Fold a context into this error, keeping the variant where it carries a message
    pub fn in_context(self, ctx: &ErrorContext) -> Error {
        match self {
            Error::Config(msg) => Error::Config(format!("{} [{}]", msg, ctx)),
            Error::Transport(msg) => Error::Transport(format!("{} [{}]", msg, ctx)),
            Error::Registry(msg) => Error::Registry(format!("{} [{}]", msg, ctx)),
            Error::Custom(msg) => Error::Custom(format!("{} [{}]", msg, ctx)),
            other => Error::Custom(format!("{} [{}]", other, ctx)),
        }
    }
}

impl<T> ErrorExt<T> for std::result::Result<T, Error> {
    fn context(self, ctx: ErrorContext) -> std::result::Result<T, Error> {
        self.map_err(|e| e.in_context(&ctx))
    }

    fn with_context<S: Into<String>, O: Into<String>>(
        self,
        component: S,
        operation: O,
    ) -> std::result::Result<T, Error> {
        self.context(ErrorContext::new(component, operation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_display() {
        let ctx = ErrorContext::new("registry", "register").with_details("crm_connector");
        assert_eq!(
            ctx.to_string(),
            "in component 'registry' during operation 'register' (crm_connector)"
        );
    }

    #[test]
    fn test_context_keeps_variant() {
        let res: std::result::Result<(), Error> = Err(Error::Registry("HTTP 503".into()));
        let err = res.with_context("registry", "register").unwrap_err();
        match err {
            Error::Registry(msg) => {
                assert!(msg.starts_with("HTTP 503 ["));
                assert!(msg.contains("operation 'register'"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_context_passes_ok_through() {
        let res: std::result::Result<u8, Error> = Ok(7);
        assert_eq!(res.with_context("a", "b").unwrap(), 7);
    }
}
