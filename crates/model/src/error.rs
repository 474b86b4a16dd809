/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The service is unusable because a required configuration value
    /// (typically the API credential) is missing.
    Configuration,
    /// The request could not be transported, or the service answered
    /// with a non-success status.
    Transport,
    /// The response arrived but carried no usable reply text.
    MalformedResponse,
    /// The request was cancelled before it settled.
    ///
    /// This is a control-flow signal, not a user-visible error: callers
    /// are expected to consume it silently.
    Cancelled,
}
