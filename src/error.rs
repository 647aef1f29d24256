/// Possible errors from reading the namespaced resources data source.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Dynamic client could not be built from the connection handle
    #[error(transparent)]
    ClientConstruction(kube::Error),

    /// List request was rejected by, or never reached, the API server
    #[error(transparent)]
    ApiRequest(kube::Error),

    /// Data source configuration is missing or malformed
    #[error("invalid data source configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// HTTP status code reported by the API server, if the failure came from it.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::ApiRequest(kube::Error::Api(status)) => Some(status.code),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
