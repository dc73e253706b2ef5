//! The in-flight state of one logical operation.
//!
//! ```text
//!                ┌──────────────────┐
//!                │ AwaitingPrimary  │── transport error ──────────────┐
//!                └──────────────────┘                                 │
//!                   │            │                                    │
//!   body present, or status      │ empty body + 201/202/204           │
//!   not in 201/202/204, or       │ + operation eligible               │
//!   operation not eligible       ▼                                    ▼
//!                   │   ┌──────────────────┐  transport error   ┌──────────┐
//!                   │   │ AwaitingFollowUp │ ─────────────────▶ │ Rejected │
//!                   │   └──────────────────┘                    └──────────┘
//!                   ▼            │ any 2xx
//!                ┌──────────┐    │
//!                │ Resolved │ ◀──┘
//!                └──────────┘
//! ```
//!
//! Both terminal states fire exactly one caller callback. The follow-up is a
//! plain GET with the same headers as the primary request and is never itself
//! followed up.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::FusedFuture;
use serde_json::Value;
use tastypie_client::{Request, Response, Transport, TransportFuture};
use tracing::{debug, Span};

use crate::error::{Error, ErrorKind, Result};
use crate::operation::Operation;
use crate::options::{ErrorCallback, SuccessCallback};

/// Statuses meaning "succeeded, but the body was left out".
pub const EMPTY_BODY_STATUSES: [u16; 3] = [201, 202, 204];

/// The resolved outcome of an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncResponse {
    /// The operation that produced this response.
    pub operation: Operation,
    /// Parsed JSON body, `None` when the server sent none.
    pub payload: Option<Value>,
    /// Status of the response the payload came from.
    pub status: u16,
    /// Headers of the response the payload came from, keyed by lowercase name.
    pub headers: HashMap<String, String>,
    /// URL of the request the payload came from.
    pub url: String,
    /// True if the payload came from the follow-up fetch.
    pub followed_up: bool,
    /// The caller's context value, if one was given.
    pub context: Option<Value>,
}

/// Where an operation is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingPrimary,
    AwaitingFollowUp,
    Resolved,
    Rejected,
}

/// What the follow-up fetch needs, fixed when the primary request is built.
#[derive(Debug, Clone)]
pub(crate) struct FollowUpPlan {
    pub(crate) eligible: bool,
    pub(crate) fallback_url: Option<String>,
    pub(crate) headers: BTreeMap<String, String>,
    pub(crate) query: Vec<(String, String)>,
}

enum State {
    /// Rejected before anything was sent.
    Failed(Error),
    AwaitingPrimary(TransportFuture),
    AwaitingFollowUp { url: String, future: TransportFuture },
    Done(Phase),
}

enum Step {
    Resolve(SyncResponse),
    Reject(Error),
    FollowUp(String),
}

/// A single-resolution handle for one logical operation.
///
/// Resolves once, with the final [`SyncResponse`] or the [`Error`] that ended
/// the operation, after firing the matching callback from
/// [`SyncOptions`](crate::SyncOptions). Like any future it does nothing
/// unless polled; use [`SyncAdapter::spawn`](crate::SyncAdapter::spawn) to run
/// it in the background.
#[must_use = "futures do nothing unless polled"]
pub struct PendingOperation {
    operation: Operation,
    state: State,
    transport: Arc<dyn Transport>,
    primary_url: String,
    follow_up: FollowUpPlan,
    context: Option<Value>,
    on_success: Option<SuccessCallback>,
    on_error: Option<ErrorCallback>,
    span: Span,
}

impl std::fmt::Debug for PendingOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingOperation")
            .field("operation", &self.operation)
            .field("phase", &self.phase())
            .field("primary_url", &self.primary_url)
            .finish_non_exhaustive()
    }
}

/// Everything needed to start an operation.
pub(crate) struct Start {
    pub(crate) operation: Operation,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) follow_up: FollowUpPlan,
    pub(crate) context: Option<Value>,
    pub(crate) on_success: Option<SuccessCallback>,
    pub(crate) on_error: Option<ErrorCallback>,
    pub(crate) span: Span,
}

impl PendingOperation {
    /// Send the primary request and wait for it.
    pub(crate) fn send(start: Start, request: Request) -> Self {
        let primary_url = request.url().to_string();
        let future = start.transport.send(request);
        Self::with_state(start, primary_url, State::AwaitingPrimary(future))
    }

    /// An operation that failed before a request could be built.
    pub(crate) fn failed(start: Start, error: Error) -> Self {
        Self::with_state(start, String::new(), State::Failed(error))
    }

    fn with_state(start: Start, primary_url: String, state: State) -> Self {
        Self {
            operation: start.operation,
            state,
            transport: start.transport,
            primary_url,
            follow_up: start.follow_up,
            context: start.context,
            on_success: start.on_success,
            on_error: start.on_error,
            span: start.span,
        }
    }

    /// The operation being performed.
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// The current lifecycle phase.
    pub fn phase(&self) -> Phase {
        match &self.state {
            State::Failed(_) => Phase::Rejected,
            State::AwaitingPrimary(_) => Phase::AwaitingPrimary,
            State::AwaitingFollowUp { .. } => Phase::AwaitingFollowUp,
            State::Done(phase) => *phase,
        }
    }

    fn after_primary(&mut self, response: Response) -> Step {
        let payload = match read_payload(&response) {
            Ok(payload) => payload,
            Err(err) => return Step::Reject(err),
        };

        let status = response.status();
        if payload.is_none() && self.follow_up.eligible && EMPTY_BODY_STATUSES.contains(&status) {
            let target = response
                .location()
                .map(str::to_string)
                .or_else(|| self.follow_up.fallback_url.clone());

            return match target {
                Some(url) => {
                    debug!(status, url = %url, "Empty response body, fetching resource");
                    Step::FollowUp(url)
                }
                None => Step::Reject(Error::new(ErrorKind::MissingUrl(Operation::Read))),
            };
        }

        let url = self.primary_url.clone();
        let resolved = self.response(response, payload, url, false);
        Step::Resolve(resolved)
    }

    fn follow_up_request(&self, url: &str) -> Request {
        let mut request = Request::get(url).headers(self.follow_up.headers.clone());
        for (name, value) in &self.follow_up.query {
            request = request.query(name.clone(), value.clone());
        }
        request
    }

    fn response(
        &mut self,
        response: Response,
        payload: Option<Value>,
        url: String,
        followed_up: bool,
    ) -> SyncResponse {
        SyncResponse {
            operation: self.operation,
            payload,
            status: response.status(),
            headers: response.headers().clone(),
            url,
            followed_up,
            context: self.context.take(),
        }
    }

    fn resolve(&mut self, response: SyncResponse) -> Result<SyncResponse> {
        debug!(
            status = response.status,
            followed_up = response.followed_up,
            "Operation resolved"
        );
        self.state = State::Done(Phase::Resolved);
        self.on_error = None;
        if let Some(callback) = self.on_success.take() {
            callback(&response);
        }
        Ok(response)
    }

    fn reject(&mut self, error: Error) -> Result<SyncResponse> {
        debug!(error = %error, status = ?error.status(), "Operation rejected");
        self.state = State::Done(Phase::Rejected);
        self.on_success = None;
        if let Some(callback) = self.on_error.take() {
            callback(&error);
        }
        Err(error)
    }
}

impl Future for PendingOperation {
    type Output = Result<SyncResponse>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let span = this.span.clone();
        let _enter = span.enter();

        loop {
            match std::mem::replace(&mut this.state, State::Done(Phase::Rejected)) {
                State::Failed(error) => return Poll::Ready(this.reject(error)),
                State::AwaitingPrimary(mut future) => match future.as_mut().poll(cx) {
                    Poll::Pending => {
                        this.state = State::AwaitingPrimary(future);
                        return Poll::Pending;
                    }
                    Poll::Ready(Err(error)) => return Poll::Ready(this.reject(error.into())),
                    Poll::Ready(Ok(response)) => match this.after_primary(response) {
                        Step::Resolve(response) => return Poll::Ready(this.resolve(response)),
                        Step::Reject(error) => return Poll::Ready(this.reject(error)),
                        Step::FollowUp(url) => {
                            let future = this.transport.send(this.follow_up_request(&url));
                            this.state = State::AwaitingFollowUp { url, future };
                        }
                    },
                },
                State::AwaitingFollowUp { url, mut future } => match future.as_mut().poll(cx) {
                    Poll::Pending => {
                        this.state = State::AwaitingFollowUp { url, future };
                        return Poll::Pending;
                    }
                    Poll::Ready(Err(error)) => return Poll::Ready(this.reject(error.into())),
                    Poll::Ready(Ok(response)) => {
                        let outcome = match read_payload(&response) {
                            Ok(payload) => {
                                let resolved = this.response(response, payload, url, true);
                                this.resolve(resolved)
                            }
                            Err(error) => this.reject(error),
                        };
                        return Poll::Ready(outcome);
                    }
                },
                State::Done(_) => panic!("PendingOperation polled after completion"),
            }
        }
    }
}

impl FusedFuture for PendingOperation {
    fn is_terminated(&self) -> bool {
        matches!(self.state, State::Done(_))
    }
}

/// The JSON body, with empty bodies, `null` and `""` all read as absent.
fn read_payload(response: &Response) -> Result<Option<Value>> {
    if response.is_empty_body() {
        return Ok(None);
    }
    let payload: Value = serde_json::from_slice(response.body())?;
    Ok(Some(payload).filter(|value| match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }))
}
