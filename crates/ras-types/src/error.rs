use thiserror::Error;

/// Error taxonomy for the RAS core.
///
/// Validation sub-failures (`NonceMismatch` .. `ImaMismatch`) are reported to
/// the caller and never torn down the connection; they are never persisted.
#[derive(Debug, Error)]
pub enum RasError {
    #[error("unsupported crypto algorithm/mode combination")]
    Unsupported,

    #[error("client already registered under this IK certificate")]
    AlreadyRegistered,

    #[error("operation references an unknown client id")]
    NotRegistered,

    #[error("report nonce does not match the cached challenge")]
    NonceMismatch,

    #[error("quote signature verification failed")]
    BadSignature,

    #[error("recomputed PCR digest does not match the quote")]
    PcrMismatch,

    #[error("BIOS event log replay does not match the baseline")]
    BiosMismatch,

    #[error("IMA event log replay does not match the baseline")]
    ImaMismatch,

    #[error("cached entry is missing its parsed IK certificate")]
    IKCertNull,

    #[error("malformed input, missing field, or manager not initialised")]
    ParameterWrong,

    #[cfg(feature = "db")]
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

pub type RasResult<T> = Result<T, RasError>;
