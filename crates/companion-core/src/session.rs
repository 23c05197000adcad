//! Chat session controller
//!
//! Owns the transcript of one conversation and drives the request/response
//! cycle of each user turn. Drawing is delegated to a [`ChatView`], the network
//! to a [`CompanionService`], so the controller runs headless in tests.

use tracing::debug;

use crate::api::CompanionService;
use crate::error::{CompanionError, Result};
use crate::models::{TransformRequest, TransformResponse, UserMemory};
use crate::state::{ChatTurn, Transcript};

/// Render/notify surface the controller calls but does not implement
pub trait ChatView {
    fn render_turn(&mut self, turn: &ChatTurn);
    fn show_typing(&mut self);
    fn hide_typing(&mut self);
    /// Blocking notification to the user
    fn notify_error(&mut self, error: &CompanionError);
}

/// Result of the first half of a turn
#[derive(Debug, Clone, PartialEq)]
pub enum TurnStart {
    /// Message was empty after trimming; nothing happened
    Ignored,
    /// Another turn is still waiting for its reply; nothing happened
    Busy,
    /// User turn recorded; send this request and hand the answer to `complete_turn`
    Started(TransformRequest),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Ignored,
    Busy,
    Replied(ChatTurn),
}

#[derive(Debug, Default)]
pub struct ChatSession {
    transcript: Transcript,
    in_flight: bool,
    context: Option<UserMemory>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Memory sent as `context` with every following request, if any
    pub fn set_context(&mut self, context: Option<UserMemory>) {
        self.context = context;
    }

    pub fn context(&self) -> Option<&UserMemory> {
        self.context.as_ref()
    }

    /// Record the user's turn and show it, then return the request to send.
    ///
    /// The request's `history` is the transcript as it was before this turn.
    pub fn begin_turn<V>(&mut self, message: &str, personality: &str, view: &mut V) -> TurnStart
    where
        V: ChatView + ?Sized,
    {
        let message = message.trim();
        if message.is_empty() {
            return TurnStart::Ignored;
        }
        if self.in_flight {
            debug!("turn rejected, previous reply still pending");
            return TurnStart::Busy;
        }

        let turn = self.transcript.push(ChatTurn::user(message));
        view.render_turn(turn);
        let history = self.transcript.before_last().to_vec();

        view.show_typing();
        self.in_flight = true;
        debug!(personality, history = history.len(), "turn started");

        TurnStart::Started(TransformRequest {
            message: message.to_string(),
            personality: personality.to_string(),
            history,
            context: self.context.clone(),
        })
    }

    /// Apply the service's answer to the pending turn.
    ///
    /// On failure the user's turn stays in the transcript without a reply.
    pub fn complete_turn<V>(
        &mut self,
        result: Result<TransformResponse>,
        view: &mut V,
    ) -> Result<ChatTurn>
    where
        V: ChatView + ?Sized,
    {
        self.in_flight = false;
        view.hide_typing();

        match result {
            Ok(response) => {
                let turn = self
                    .transcript
                    .push(ChatTurn::ai(
                        response.transformed_response,
                        response.personality_used,
                    ))
                    .clone();
                view.render_turn(&turn);
                debug!(transcript = self.transcript.len(), "turn completed");
                Ok(turn)
            }
            Err(err) => {
                view.notify_error(&err);
                Err(err)
            }
        }
    }

    /// Run a whole turn against `service`
    pub async fn submit<S, V>(
        &mut self,
        service: &S,
        message: &str,
        personality: &str,
        view: &mut V,
    ) -> Result<SubmitOutcome>
    where
        S: CompanionService + ?Sized,
        V: ChatView + ?Sized,
    {
        let request = match self.begin_turn(message, personality, view) {
            TurnStart::Ignored => return Ok(SubmitOutcome::Ignored),
            TurnStart::Busy => return Ok(SubmitOutcome::Busy),
            TurnStart::Started(request) => request,
        };

        let result = service.transform(&request).await;
        self.complete_turn(result, view).map(SubmitOutcome::Replied)
    }
}
