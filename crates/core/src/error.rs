use larder_sites::SiteError;

/// A platform permission the app asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Permission {
    Location,
    Notifications,
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Permission::Location => f.write_str("location"),
            Permission::Notifications => f.write_str("notifications"),
        }
    }
}

/// Everything that can go wrong in the core. None of these end the session; each
/// caller degrades the affected feature and logs.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("data unavailable: {0}")]
    DataUnavailable(#[source] SiteError),

    #[error("{0} permission denied")]
    PermissionDenied(Permission),

    #[error("persistence failed: {0}")]
    Persistence(#[source] SiteError),

    #[error("location service: {0}")]
    Location(String),

    #[error("notification service: {0}")]
    Notification(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("could not open link: {0}")]
    Link(String),
}

impl From<rusqlite::Error> for CoreError {
    fn from(e: rusqlite::Error) -> Self {
        CoreError::Persistence(SiteError::Storage(e.to_string()))
    }
}
