//! Request/response transport between contexts.
//!
//! Every context runs as a task on the current `LocalSet` and owns its handler;
//! other contexts reach it only through a [`ContextHandle`]. Requests are handled
//! one at a time in arrival order.
use async_trait::async_trait;
use copytools_core::{Request, Response, SenderInfo};
use copytools_logging::{copy_debug, copy_trace};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("{0} context is not running")]
    Disconnected(&'static str),
    #[error("{0} context dropped the request without replying")]
    NoResponse(&'static str),
}

#[async_trait(?Send)]
pub trait MessageHandler {
    fn context_name(&self) -> &'static str;

    /// Handles a validated request. Actions owned by another context must be
    /// answered with [`Response::unknown_action`].
    async fn handle(&mut self, request: Request, sender: &SenderInfo) -> Response;
}

/// Validates a raw JSON request and hands it to `handler`.
pub async fn dispatch_json(
    handler: &mut dyn MessageHandler,
    raw: Value,
    sender: &SenderInfo,
) -> Response {
    match Request::from_value(raw) {
        Ok(request) => handler.handle(request, sender).await,
        Err(err) => {
            copy_debug!("{} rejected request: {}", handler.context_name(), err);
            err.into()
        }
    }
}

struct Envelope {
    request: Request,
    sender: SenderInfo,
    reply: oneshot::Sender<Response>,
}

/// Sending side of a running context.
#[derive(Debug, Clone)]
pub struct ContextHandle {
    name: &'static str,
    tx: Option<mpsc::UnboundedSender<Envelope>>,
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("action", &self.request.action())
            .finish()
    }
}

impl ContextHandle {
    /// Starts `handler` on the current `LocalSet`. Must be called from within one.
    pub fn spawn_local<H>(handler: H) -> Self
    where
        H: MessageHandler + 'static,
    {
        let name = handler.context_name();
        let (tx, mut rx) = mpsc::unbounded_channel::<Envelope>();
        tokio::task::spawn_local(async move {
            let mut handler = handler;
            while let Some(envelope) = rx.recv().await {
                let action = envelope.request.action();
                let response = handler.handle(envelope.request, &envelope.sender).await;
                if envelope.reply.send(response).is_err() {
                    copy_trace!("{} reply to {} was not awaited", name, action);
                }
            }
            copy_debug!("{} context stopped", name);
        });
        Self { name, tx: Some(tx) }
    }

    /// A handle to a context that never started; every send fails.
    pub fn detached(name: &'static str) -> Self {
        Self { name, tx: None }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_connected(&self) -> bool {
        self.tx.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    pub async fn send(
        &self,
        request: Request,
        sender: &SenderInfo,
    ) -> Result<Response, TransportError> {
        let tx = self
            .tx
            .as_ref()
            .ok_or(TransportError::Disconnected(self.name))?;
        let (reply, response) = oneshot::channel();
        tx.send(Envelope {
            request,
            sender: sender.clone(),
            reply,
        })
        .map_err(|_| TransportError::Disconnected(self.name))?;
        response
            .await
            .map_err(|_| TransportError::NoResponse(self.name))
    }

    /// Sends raw JSON, validating it first. Invalid requests are answered
    /// locally without reaching the context.
    pub async fn send_json(
        &self,
        raw: Value,
        sender: &SenderInfo,
    ) -> Result<Response, TransportError> {
        match Request::from_value(raw) {
            Ok(request) => self.send(request, sender).await,
            Err(err) => Ok(err.into()),
        }
    }
}
