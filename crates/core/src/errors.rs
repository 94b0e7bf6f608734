use thiserror::Error;

use crate::flows::DialogueTransitionError;
use crate::gateway::GatewayError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error(transparent)]
    DialogueTransition(#[from] DialogueTransitionError),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("no stored credential for user `{user_id}`")]
    AuthMissing { user_id: String },
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("downstream failure: {0}")]
    Downstream(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl From<GatewayError> for ApplicationError {
    fn from(value: GatewayError) -> Self {
        Self::Downstream(value.to_string())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("login required: {message}")]
    LoginRequired { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "No pude entender eso. ¿Puedes decirlo de otra forma?",
            Self::LoginRequired { .. } => {
                "Primero necesito acceso a tu cuenta de Google. Envía /login para conectarla."
            }
            Self::ServiceUnavailable { .. } => {
                "No pude completar la operación. Intenta de nuevo en un momento."
            }
            Self::Internal { .. } => "Ocurrió un error inesperado.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::LoginRequired { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::LoginRequired { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let unassigned = "unassigned".to_owned();
        match value {
            ApplicationError::Domain(DomainError::DialogueTransition(_))
            | ApplicationError::Domain(DomainError::InvariantViolation(_)) => Self::BadRequest {
                message: "dialogue validation failed".to_owned(),
                correlation_id: unassigned,
            },
            ApplicationError::AuthMissing { user_id } => Self::LoginRequired {
                message: format!("user {user_id} has no credential"),
                correlation_id: unassigned,
            },
            ApplicationError::Persistence(message) | ApplicationError::Downstream(message) => {
                Self::ServiceUnavailable { message, correlation_id: unassigned }
            }
            ApplicationError::Configuration(message) => {
                Self::Internal { message, correlation_id: unassigned }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ApplicationError, DomainError, InterfaceError};
    use crate::gateway::GatewayError;

    #[test]
    fn domain_error_maps_to_bad_request_interface_error() {
        let interface = ApplicationError::from(DomainError::InvariantViolation(
            "pending meeting without title".to_owned(),
        ))
        .into_interface("upd-1");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest {
                ref correlation_id,
                ..
            } if correlation_id == "upd-1"
        ));
    }

    #[test]
    fn auth_missing_prompts_login() {
        let interface =
            ApplicationError::AuthMissing { user_id: "42".to_owned() }.into_interface("upd-2");

        assert!(matches!(interface, InterfaceError::LoginRequired { .. }));
        assert!(interface.user_message().contains("/login"));
    }

    #[test]
    fn gateway_failures_map_to_service_unavailable() {
        let interface = ApplicationError::from(GatewayError::Api {
            status: 503,
            message: "backend error".to_owned(),
        })
        .into_interface("upd-3");

        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
        assert_eq!(interface.correlation_id(), "upd-3");
        assert_eq!(
            interface.user_message(),
            "No pude completar la operación. Intenta de nuevo en un momento."
        );
    }

    #[test]
    fn configuration_error_maps_to_internal() {
        let interface = ApplicationError::Configuration("missing google client id".to_owned())
            .into_interface("upd-4");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.user_message(), "Ocurrió un error inesperado.");
    }
}
