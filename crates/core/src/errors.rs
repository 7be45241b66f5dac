use thiserror::Error;

/// Failures that abort a catalog query. No variant is retried.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog provider unavailable: {message}")]
    ProviderUnavailable { message: String },
    #[error("catalog provider did not respond within {timeout_secs}s")]
    ProviderTimeout { timeout_secs: u64 },
    #[error("catalog provider returned a bad response: {message}")]
    ProviderBadResponse { status: Option<u16>, message: String },
}

impl CatalogError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::ProviderUnavailable { message: message.into() }
    }

    pub fn bad_status(status: u16) -> Self {
        Self::ProviderBadResponse { status: Some(status), message: format!("HTTP status {status}") }
    }

    pub fn bad_body(message: impl Into<String>) -> Self {
        Self::ProviderBadResponse { status: None, message: message.into() }
    }

    pub fn error_class(&self) -> &'static str {
        match self {
            Self::ProviderUnavailable { .. } => "provider_unavailable",
            Self::ProviderTimeout { .. } => "provider_timeout",
            Self::ProviderBadResponse { .. } => "provider_bad_response",
        }
    }

    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::UpstreamRejected { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

/// A recommendation total or difference left the range `Decimal` can represent.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("catalog amounts exceed the representable range")]
pub struct AmountOverflow;

impl From<AmountOverflow> for CatalogError {
    fn from(error: AmountOverflow) -> Self {
        Self::bad_body(error.to_string())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("upstream rejected request: {message}")]
    UpstreamRejected { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn correlation_id(&self) -> &str {
        match self {
            Self::ServiceUnavailable { correlation_id, .. }
            | Self::UpstreamRejected { correlation_id, .. } => correlation_id,
        }
    }

    /// Caller-facing text. Names the upstream cause and nothing deeper.
    pub fn user_message(&self) -> String {
        match self {
            Self::ServiceUnavailable { message, .. } => {
                format!("The product catalog is temporarily unavailable ({message}). Please retry shortly.")
            }
            Self::UpstreamRejected { message, .. } => {
                format!("The product catalog returned an unusable response ({message}).")
            }
        }
    }
}

impl From<CatalogError> for InterfaceError {
    fn from(value: CatalogError) -> Self {
        match value {
            CatalogError::ProviderUnavailable { message } => {
                Self::ServiceUnavailable { message, correlation_id: "unassigned".to_owned() }
            }
            timeout @ CatalogError::ProviderTimeout { .. } => Self::ServiceUnavailable {
                message: timeout.to_string(),
                correlation_id: "unassigned".to_owned(),
            },
            CatalogError::ProviderBadResponse { message, .. } => {
                Self::UpstreamRejected { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{AmountOverflow, CatalogError, InterfaceError};

    #[test]
    fn unavailable_maps_to_service_unavailable_with_correlation_id() {
        let interface = CatalogError::unavailable("connection refused").into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::ServiceUnavailable {
                ref correlation_id,
                ..
            } if correlation_id == "req-1"
        ));
        assert!(interface.user_message().contains("connection refused"));
    }

    #[test]
    fn timeout_is_distinct_and_names_the_limit() {
        let error = CatalogError::ProviderTimeout { timeout_secs: 10 };
        assert_eq!(error.error_class(), "provider_timeout");

        let interface = error.into_interface("req-2");
        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
        assert!(interface.user_message().contains("10s"));
    }

    #[test]
    fn bad_status_keeps_the_status_code() {
        let error = CatalogError::bad_status(503);
        assert!(matches!(error, CatalogError::ProviderBadResponse { status: Some(503), .. }));

        let interface = error.into_interface("req-3");
        assert_eq!(interface.correlation_id(), "req-3");
        assert!(interface.user_message().contains("HTTP status 503"));
    }

    #[test]
    fn bad_body_has_no_status() {
        let error = CatalogError::bad_body("expected value at line 1 column 1");
        assert_eq!(error.error_class(), "provider_bad_response");
        assert!(matches!(error, CatalogError::ProviderBadResponse { status: None, .. }));
    }

    #[test]
    fn amount_overflow_is_an_unusable_response() {
        let error = CatalogError::from(AmountOverflow);
        assert_eq!(error.error_class(), "provider_bad_response");
        assert!(error.into_interface("req-4").user_message().contains("representable range"));
    }
}
