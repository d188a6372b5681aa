use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("Participant list is empty")]
    EmptyParticipants,

    #[error("Invalid user id in participant list: {0}")]
    InvalidUserId(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Unknown message type: {0}")]
    UnknownMessageType(String),

    #[error("Invalid display_recipient: {0}")]
    InvalidDisplayRecipient(&'static str),

    #[error("Stream message without stream_id")]
    MissingStreamId,

    #[error("Reaction without a reacting user")]
    MissingReactionUser,

    #[error("Invalid muted topic entry")]
    InvalidMutedTopic,

    #[error("Type error: {0}")]
    Type(#[from] TypeError),
}
