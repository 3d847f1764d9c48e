use thiserror::Error;

/// Structural problems that make a build unusable.
#[derive(Error, Debug)]
pub enum Corruption {
    #[error("duplicate token {token:?} reached the postings store")]
    DuplicateToken { token: String },
    #[error("malformed document ({document}): {reason}")]
    MalformedDocument { document: String, reason: String },
}

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("index corruption")]
    Corruption(#[from] Corruption),
    #[error("an index build is already in progress")]
    BuildInProgress,
    #[error("no index generation has been published")]
    NotPublished,
    #[error("reading documents")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IndexError {
    pub fn malformed(document: impl Into<String>, reason: impl Into<String>) -> Self {
        Corruption::MalformedDocument { document: document.into(), reason: reason.into() }.into()
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("token {0:?} already present in postings store")]
    DuplicateKey(String),
    #[error("sled storage error")]
    Sled(#[from] sled::Error),
    #[error("postings codec error")]
    Codec(#[from] bincode::Error),
}
