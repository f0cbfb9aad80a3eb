//! Chat command dispatcher
//!
//! One control loop owns the busy slot. It multiplexes the inbound message
//! stream, the completion of the in-flight workflow and the shutdown token.
//! Workflows run in their own task and hand their result back through a
//! one-shot channel, so the slot is only ever touched by the loop itself.

use crate::command::Command;
use crate::sink::{ChatNotifier, ChatSink};
use crate::telegram::Message;
use droplift_core::{LifecycleError, Notifier, Workflow, WorkflowRunner};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub const NOT_PERMITTED: &str = "I'm not permitted to work with you";
pub const BUSY: &str = "I'm busy";
pub const DONE: &str = "Done!";
pub const PONG: &str = "pong";
pub const IDLE: &str = "Idle";

/// A text message received from some chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: i64,
    pub text: String,
}

impl InboundMessage {
    pub fn new(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
        }
    }

    /// Keep only messages that carry text
    pub fn from_message(message: Message) -> Option<Self> {
        let text = message.text?;
        Some(Self {
            chat_id: message.chat.id,
            text,
        })
    }
}

type Outcome = Result<Result<(), LifecycleError>, oneshot::error::RecvError>;

struct InFlight {
    workflow: Workflow,
    result: oneshot::Receiver<Result<(), LifecycleError>>,
}

pub struct Dispatcher {
    target_chat: i64,
    bot_username: String,
    sink: Arc<dyn ChatSink>,
    runner: Arc<dyn WorkflowRunner>,
    in_flight: Option<InFlight>,
}

impl Dispatcher {
    pub fn new(
        target_chat: i64,
        bot_username: impl Into<String>,
        sink: Arc<dyn ChatSink>,
        runner: Arc<dyn WorkflowRunner>,
    ) -> Self {
        Self {
            target_chat,
            bot_username: bot_username.into(),
            sink,
            runner,
            in_flight: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Reply to `/status`
    pub fn status_line(&self) -> String {
        match &self.in_flight {
            Some(in_flight) => format!("Busy: {} is running", in_flight.workflow),
            None => IDLE.to_string(),
        }
    }

    /// Serve until `shutdown` fires or the inbound stream ends
    ///
    /// A workflow still running at that point is awaited and its result
    /// reported before returning.
    pub async fn run(
        mut self,
        mut inbound: mpsc::Receiver<InboundMessage>,
        shutdown: CancellationToken,
    ) {
        info!("Dispatcher serving chat {}", self.target_chat);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                (workflow, outcome) = completion(&mut self.in_flight) => {
                    self.in_flight = None;
                    self.report(workflow, outcome).await;
                }
                message = inbound.recv() => match message {
                    Some(message) => self.handle(message).await,
                    None => {
                        debug!("Inbound stream closed");
                        break;
                    }
                },
            }
        }

        if let Some(in_flight) = self.in_flight.take() {
            info!("Waiting for {} to stop", in_flight.workflow);
            let outcome = in_flight.result.await;
            self.report(in_flight.workflow, outcome).await;
        }

        info!("Dispatcher stopped");
    }

    /// Route one inbound message
    pub async fn handle(&mut self, message: InboundMessage) {
        let Some(command) = Command::parse(&message.text, &self.bot_username) else {
            debug!("Ignoring message from chat {}", message.chat_id);
            return;
        };

        if message.chat_id != self.target_chat {
            warn!("Rejected {} from chat {}", command, message.chat_id);
            self.sink.send(message.chat_id, NOT_PERMITTED).await;
            return;
        }

        match command {
            Command::Ping => self.sink.send(message.chat_id, PONG).await,
            Command::Status => {
                let status = self.status_line();
                self.sink.send(message.chat_id, &status).await;
            }
            Command::Up => self.start(Workflow::Up).await,
            Command::Down => self.start(Workflow::Down).await,
        }
    }

    async fn start(&mut self, workflow: Workflow) {
        if let Some(in_flight) = &self.in_flight {
            info!("Refusing {} while {} is running", workflow, in_flight.workflow);
            self.sink.send(self.target_chat, BUSY).await;
            return;
        }

        info!("Starting {}", workflow);

        let (tx, rx) = oneshot::channel();
        let runner = self.runner.clone();
        let notifier: Arc<dyn Notifier> =
            Arc::new(ChatNotifier::new(self.sink.clone(), self.target_chat));

        tokio::spawn(async move {
            let result = runner.run(workflow, notifier).await;
            // the dispatcher may already be gone
            let _ = tx.send(result);
        });

        self.in_flight = Some(InFlight {
            workflow,
            result: rx,
        });
    }

    async fn report(&self, workflow: Workflow, outcome: Outcome) {
        let text = match outcome {
            Ok(Ok(())) => {
                info!("{} finished", workflow);
                DONE.to_string()
            }
            Ok(Err(e)) if e.is_cancelled() => {
                warn!("{} stopped on shutdown: {}", workflow, e);
                e.to_string()
            }
            Ok(Err(e)) => {
                error!("{} failed: {}", workflow, e);
                e.to_string()
            }
            Err(_) => {
                error!("{} task ended without a result", workflow);
                format!("{} stopped unexpectedly", workflow)
            }
        };

        self.sink.send(self.target_chat, &text).await;
    }
}

/// Resolves when the in-flight workflow finishes; never resolves when idle
async fn completion(slot: &mut Option<InFlight>) -> (Workflow, Outcome) {
    match slot {
        Some(in_flight) => (in_flight.workflow, (&mut in_flight.result).await),
        None => std::future::pending().await,
    }
}
