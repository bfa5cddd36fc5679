use pjsk_sekai::api::MasterDataError;

/// Fatal errors of a sync run. Asset failures never surface here.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A master collection could not be fetched or decoded.
    #[error("fetch {collection}: {source}")]
    Fetch {
        collection: &'static str,
        #[source]
        source: MasterDataError,
    },

    /// A store statement or transaction failed.
    #[error("Database error: {0}")]
    Store(#[from] sqlx::Error),

    /// The run was interrupted before it finished.
    #[error("Sync cancelled")]
    Cancelled,
}
