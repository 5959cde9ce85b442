#[derive(thiserror::Error, Debug)]
pub enum MQCryptoError {
    /// A capability the concrete generator did not override. Callers must be
    /// able to tell this apart from a domain failure.
    #[error("NotImplemented: generator does not provide '{capability}'")]
    NotImplemented { capability: &'static str },
    /// Error when asking for a variable role this generator does not define.
    #[error("UnknownRole: no variable role named '{0}'")]
    UnknownRole(String),
    /// Error when resolving a name or handle that is not a variable of the ring.
    #[error("UnknownVariable: '{0}' is not a variable of this ring")]
    UnknownVariable(String),

    /// Error when creating a field with a non-prime order.
    #[error("InvalidFieldOrder: {0}")]
    InvalidFieldOrder(String),
    /// Error when trying to invert an element with no inverse (only 0 in a field).
    #[error("NoInverse: {0}")]
    NoInverse(String),

    #[error("LengthMismatch: {0}")]
    LengthMismatch(String),
    #[error("ElementOutOfRange: {element} is not an element of GF({order})")]
    ElementOutOfRange { element: i64, order: u64 },

    #[error("InvalidSBox: {0}")]
    InvalidSBox(String),
    #[error("InvalidParameters: {0}")]
    InvalidParameters(String),
    #[error("InternalError: {0}")]
    InternalError(String),

    #[error("Data serialization: {0}")]
    SerializationError(#[from] serde_json::Error),
}
