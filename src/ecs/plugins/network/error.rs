use thiserror::Error;

/// Inbound payload could not be turned into a [`Message`](super::codec::Message).
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Missing, mistyped or unrecognised `type` field.
    #[error("unknown message type {0:?}")]
    UnknownType(Option<String>),
}

/// Inbound message is well formed but arrived in a phase that cannot accept it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("initial snapshot received while already synced")]
    DuplicateInitial,

    #[error("initial snapshot received before it was requested")]
    UnsolicitedInitial,

    #[error("state update received before the initial snapshot")]
    UpdateBeforeSnapshot,

    #[error("operation requires a synced session")]
    NotSynced,

    #[error("a session is already in progress")]
    SessionActive,
}

/// Send or receive failure reported by the datagram transport.
#[derive(Debug, Error)]
pub enum TransportFailure {
    #[error("could not bind local socket: {0}")]
    Bind(#[source] std::io::Error),

    #[error("could not resolve server address {0}")]
    Resolve(String),

    #[error("could not start the netcode client: {0}")]
    Connect(String),

    #[error("send failed: {0}")]
    Send(String),

    #[error("transport is closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Protocol(#[from] ProtocolViolation),

    #[error(transparent)]
    Transport(#[from] TransportFailure),
}
