use companion_model::ErrorKind;
use serde::{Deserialize, Serialize};

/// A scripted outcome for one completion request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetOutcome {
    /// The request settles successfully with the given reply text.
    #[serde(rename = "reply")]
    Reply(String),
    /// The request settles with an error of the given kind and message.
    #[serde(rename = "failure")]
    Failure {
        /// The error kind to report.
        kind: PresetErrorKind,
        /// The human-readable error text.
        message: String,
    },
    /// The request never settles on its own; it stays pending until its
    /// cancellation token fires and then reports cancellation.
    #[serde(rename = "stall")]
    Stall,
}

impl PresetOutcome {
    /// Creates a transport-failure outcome with the given message.
    #[inline]
    pub fn transport_failure<S: Into<String>>(message: S) -> Self {
        PresetOutcome::Failure {
            kind: PresetErrorKind::Transport,
            message: message.into(),
        }
    }
}

/// Serializable mirror of [`ErrorKind`] for scripted failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetErrorKind {
    /// See [`ErrorKind::Configuration`].
    Configuration,
    /// See [`ErrorKind::Transport`].
    Transport,
    /// See [`ErrorKind::MalformedResponse`].
    MalformedResponse,
}

impl From<PresetErrorKind> for ErrorKind {
    fn from(kind: PresetErrorKind) -> Self {
        match kind {
            PresetErrorKind::Configuration => ErrorKind::Configuration,
            PresetErrorKind::Transport => ErrorKind::Transport,
            PresetErrorKind::MalformedResponse => ErrorKind::MalformedResponse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_deserialize() {
        let outcomes = vec![
            PresetOutcome::Reply("Hello, world!".to_string()),
            PresetOutcome::transport_failure("server error"),
            PresetOutcome::Stall,
        ];

        let serialized = serde_json::to_string(&outcomes).unwrap();
        let deserialized: Vec<PresetOutcome> =
            serde_json::from_str(&serialized).unwrap();

        assert_eq!(outcomes, deserialized);
    }
}
