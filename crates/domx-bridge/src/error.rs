//! Bridge errors

use genx_dom::DomError;

/// Bridge error
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The shared document is borrowed elsewhere
    #[error("Document is already borrowed")]
    DocumentBusy,

    /// The observer the bridge was connected to no longer exists
    #[error("Mutation observer {0:?} is gone")]
    NoObserver(genx_dom::ObserverId),

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),
}
