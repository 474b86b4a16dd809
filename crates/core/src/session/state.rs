use companion_model::{
    CompletionReply, CompletionRequest, PromptMessage, ProviderError,
};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use super::builder::{IdleCallback, MessageCallback, UpdateCallback};
use super::{REPLY_ERROR_PREFIX, Snapshot};
use crate::conversation::{ConversationStore, Message};
use crate::model_client::ModelClient;

/// The single live request handle.
///
/// There is at most one per session, not one per conversation: issuing a
/// new request cancels and replaces the previous one, whichever
/// conversation it was for.
pub(super) struct InFlightRequest {
    id: u64,
    conversation_id: String,
    cancel: CancellationToken,
}

#[derive(Debug)]
pub(super) enum Command {
    Submit(String),
    Select(String),
    Snapshot(oneshot::Sender<Snapshot>),
    Settled {
        request_id: u64,
        conversation_id: String,
        result: Result<CompletionReply, Box<dyn ProviderError>>,
    },
}

pub(super) struct SessionState {
    pub(super) store: ConversationStore,
    pub(super) model_client: ModelClient,
    pub(super) system_prompt: String,
    pub(super) typing: bool,
    pub(super) in_flight: Option<InFlightRequest>,
    pub(super) next_request_id: u64,
    pub(super) on_update: Option<UpdateCallback>,
    pub(super) on_message: Option<MessageCallback>,
    pub(super) on_idle: Option<IdleCallback>,
}

impl SessionState {
    fn handle_command(
        &mut self,
        command: Command,
        command_tx: &mpsc::WeakUnboundedSender<Command>,
    ) {
        match command {
            Command::Submit(text) => self.submit(text, command_tx),
            Command::Select(id) => self.select_conversation(id),
            Command::Snapshot(reply_tx) => {
                reply_tx.send(self.snapshot()).ok();
            }
            Command::Settled {
                request_id,
                conversation_id,
                result,
            } => self.finish_request(request_id, conversation_id, result),
        }
    }

    /// Handles a user submission: appends the user message, then issues
    /// a completion request carrying the full log of the conversation,
    /// superseding any request still in flight.
    fn submit(
        &mut self,
        text: String,
        command_tx: &mpsc::WeakUnboundedSender<Command>,
    ) {
        let text = text.trim();
        if text.is_empty() {
            trace!("ignoring blank submission");
            return;
        }

        let conversation_id = self.store.active_id().to_owned();
        let (request, user_message) = {
            let Some(conversation) =
                self.store.append_user_message(&conversation_id, text)
            else {
                warn!("active conversation {conversation_id} is unknown");
                return;
            };

            // The payload is built before anything can suspend: one
            // system entry followed by the full log in append order.
            let mut messages =
                Vec::with_capacity(conversation.messages().len() + 1);
            messages
                .push(PromptMessage::System(self.system_prompt.clone()));
            messages.extend(
                conversation.messages().iter().map(Message::to_prompt),
            );
            let user_message = conversation
                .messages()
                .last()
                .expect("internal state is inconsistent")
                .clone();
            (CompletionRequest { messages }, user_message)
        };
        self.emit_message(&conversation_id, &user_message);

        self.typing = true;
        if let Some(superseded) = self.in_flight.take() {
            debug!(
                "request {} for conversation {} is superseded, cancelling",
                superseded.id, superseded.conversation_id
            );
            superseded.cancel.cancel();
        }

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        let cancel = CancellationToken::new();
        self.in_flight = Some(InFlightRequest {
            id: request_id,
            conversation_id: conversation_id.clone(),
            cancel: cancel.clone(),
        });

        let model_client = self.model_client.clone();
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            let result = model_client.send_request(request, cancel).await;
            // The session may have shut down while the request was in
            // flight; its settlement has nowhere to go then.
            let Some(command_tx) = command_tx.upgrade() else {
                return;
            };
            command_tx
                .send(Command::Settled {
                    request_id,
                    conversation_id,
                    result,
                })
                .ok();
        });

        self.notify_update();
    }

    /// Makes a conversation active. Switching context always hides the
    /// typing indicator, even while a request is still in flight, and
    /// switching back does not resurrect it.
    fn select_conversation(&mut self, id: String) {
        self.typing = false;
        if !self.store.select(&id) {
            warn!("ignoring selection of unknown conversation {id}");
        }
        self.notify_update();
    }

    /// Reconciles a settled request back into the store.
    fn finish_request(
        &mut self,
        request_id: u64,
        conversation_id: String,
        result: Result<CompletionReply, Box<dyn ProviderError>>,
    ) {
        let reply_text = match result {
            // A superseded request must leave no trace: the submission
            // that cancelled it owns the typing indicator and the
            // in-flight handle.
            Err(err) if err.is_cancelled() => {
                trace!("request {request_id} was superseded, dropping it");
                return;
            }
            Ok(reply) => reply.text,
            Err(err) => {
                error!("request {request_id} failed: {err}");
                format!("{REPLY_ERROR_PREFIX}{err}")
            }
        };

        // The reply lands in the conversation the request was issued
        // for, whether or not the user is still looking at it.
        match self
            .store
            .append_assistant_message(&conversation_id, &reply_text)
        {
            Some(message) => {
                let message = message.clone();
                self.emit_message(&conversation_id, &message);
            }
            None => {
                warn!(
                    "conversation {conversation_id} no longer exists, \
                     dropping the reply"
                );
            }
        }

        if self
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.id == request_id)
        {
            self.in_flight = None;
            // Only hide the indicator if the user is still looking at
            // the conversation this request was for.
            if self.store.active_id() == conversation_id {
                self.typing = false;
            }
        }
        self.notify_update();

        if self.in_flight.is_none() {
            if let Some(on_idle) = &self.on_idle {
                on_idle();
            }
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            conversations: self.store.conversations().to_vec(),
            active_id: self.store.active_id().to_owned(),
            typing: self.typing,
        }
    }

    fn emit_message(&self, conversation_id: &str, message: &Message) {
        if let Some(on_message) = &self.on_message {
            on_message(conversation_id, message);
        }
    }

    fn notify_update(&self) {
        if let Some(on_update) = &self.on_update {
            on_update(self.snapshot());
        }
    }
}

pub(super) async fn run_session(
    mut state: SessionState,
    mut command_rx: mpsc::UnboundedReceiver<Command>,
    command_tx: mpsc::WeakUnboundedSender<Command>,
) {
    debug!("session started");
    while let Some(command) = command_rx.recv().await {
        trace!("received command: {command:?}");
        state.handle_command(command, &command_tx);
    }
    // Every handle is gone; a request still in flight can be aborted.
    if let Some(in_flight) = state.in_flight.take() {
        debug!("cancelling request {} on shutdown", in_flight.id);
        in_flight.cancel.cancel();
    }
    debug!("session will terminate");
}
