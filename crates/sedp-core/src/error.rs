use sedp_db::StoreError;
use sedp_types::Status;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("mobile number {mobile} is already registered")]
    DuplicateRegistration { mobile: String },

    #[error("no {kind} with id '{id}'")]
    NotFound { kind: &'static str, id: String },

    #[error("registration is already {from}; cannot mark it {to}")]
    InvalidTransition { from: Status, to: Status },

    #[error("invalid credentials")]
    Authentication,

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),

    #[error("could not encode {slot}: {source}")]
    Encode {
        slot: sedp_db::Slot,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
