pub type Result<T> = std::result::Result<T, Error>;

/// An error while talking to the adapter or decoding what it sent
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An error occurred in the [Transport](crate::device::Transport)
    #[error("Device error: `{0:?}`")]
    Device(DeviceError),

    /// The adapter never printed its prompt after the command (partial response attached)
    #[error("Timed out waiting for response to `{command}` (got {partial:?})")]
    Timeout { command: String, partial: String },

    /// A four character trouble code token that is not hex
    #[error("Malformed trouble code token `{0}`")]
    MalformedToken(String),

    /// A trouble code whose leading digit has no category in the prefix table
    #[error("Unknown trouble code prefix `{0}`")]
    UnknownPrefix(char),

    /// The VIN payload could not be decoded
    #[error("Invalid VIN data: `{0}`")]
    InvalidVin(String),

    /// A settle wait was cancelled before it elapsed
    #[error("Settle period cancelled")]
    Cancelled,

    /// The trouble code description table could not be loaded
    #[error("Description table error: `{0}`")]
    Table(String),

    /// Writing the session's output failed
    #[error("Output error: `{0}`")]
    Output(#[from] std::io::Error),

    /// Another error occurred
    #[error("Other OBD2 error: `{0}`")]
    Other(String),
}

#[derive(Debug)]
pub struct DeviceError(crate::device::Error);

impl From<crate::device::Error> for Error {
    fn from(e: crate::device::Error) -> Self {
        Error::Device(DeviceError(e))
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(e: std::string::FromUtf8Error) -> Self {
        Error::InvalidVin(format!("invalid string received: {:?}", e))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Table(e.to_string())
    }
}
