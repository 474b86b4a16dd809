/// A settled reply from the completion service.
///
/// Providers must only produce a reply whose text is non-empty after
/// trimming; a response without usable text is a
/// [`MalformedResponse`](crate::ErrorKind::MalformedResponse) error
/// instead.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CompletionReply {
    /// The generated assistant text, already trimmed.
    pub text: String,
}
