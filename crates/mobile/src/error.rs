use larder_core::CoreError;

#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum MobileError {
    #[error("{0}")]
    DataUnavailable(String),
    #[error("{0}")]
    PermissionDenied(String),
    #[error("{0}")]
    Storage(String),
    #[error("{0}")]
    Location(String),
    #[error("{0}")]
    Notification(String),
    #[error("{0}")]
    Config(String),
    #[error("{0}")]
    Link(String),
    #[error("{0}")]
    Runtime(String),
    /// The host's side of a callback failed in a way it did not declare.
    #[error("{0}")]
    Callback(String),
}

impl From<CoreError> for MobileError {
    fn from(e: CoreError) -> Self {
        let message = e.to_string();
        match e {
            CoreError::DataUnavailable(_) => MobileError::DataUnavailable(message),
            CoreError::PermissionDenied(_) => MobileError::PermissionDenied(message),
            CoreError::Persistence(_) => MobileError::Storage(message),
            CoreError::Location(_) => MobileError::Location(message),
            CoreError::Notification(_) => MobileError::Notification(message),
            CoreError::Config(_) => MobileError::Config(message),
            CoreError::Link(_) => MobileError::Link(message),
        }
    }
}

impl From<uniffi::UnexpectedUniFFICallbackError> for MobileError {
    fn from(e: uniffi::UnexpectedUniFFICallbackError) -> Self {
        MobileError::Callback(e.reason)
    }
}

impl From<tokio::task::JoinError> for MobileError {
    fn from(e: tokio::task::JoinError) -> Self {
        MobileError::Runtime(e.to_string())
    }
}
