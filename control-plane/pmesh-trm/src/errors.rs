use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("locating existing traffic policy for host '{host}': {source}")]
    Lookup {
        host: String,
        #[source]
        source: StoreError,
    },

    #[error("creating traffic policy for host '{host}': {source}")]
    Create {
        host: String,
        #[source]
        source: StoreError,
    },

    #[error("no active service hosts for environment '{0}'")]
    NoActiveHosts(String),
}
