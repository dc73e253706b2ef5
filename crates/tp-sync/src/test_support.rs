//! In-memory transports for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use futures::channel::oneshot;
use serde_json::Value;
use tastypie_client::{Error, ErrorKind, Request, Response, Result, Transport, TransportFuture};

/// An empty response with the given status.
pub(crate) fn empty(status: u16) -> Response {
    Response::with_status(status, "")
}

/// A JSON response with the given status.
pub(crate) fn json_response(status: u16, body: Value) -> Result<Response> {
    Ok(Response::with_status(status, body.to_string())
        .with_header("Content-Type", "application/json"))
}

fn exhausted() -> Error {
    Error::new(ErrorKind::Other("no scripted response left".to_string()))
}

/// Replays queued responses in order and records every request.
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<Response>>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub(crate) fn new(responses: Vec<Result<Response>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests seen so far, in send order.
    pub(crate) fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: Request) -> TransportFuture {
        self.requests.lock().unwrap().push(request);
        let next = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted()));
        Box::pin(futures::future::ready(next))
    }
}

/// Holds every response until the test releases it through its sender.
pub(crate) struct GatedTransport {
    gates: Mutex<VecDeque<oneshot::Receiver<Result<Response>>>>,
    sent: Mutex<usize>,
}

impl GatedTransport {
    pub(crate) fn new(count: usize) -> (Self, Vec<oneshot::Sender<Result<Response>>>) {
        let (senders, receivers): (Vec<_>, VecDeque<_>) =
            (0..count).map(|_| oneshot::channel()).unzip();
        let transport = Self {
            gates: Mutex::new(receivers),
            sent: Mutex::new(0),
        };
        (transport, senders)
    }

    /// Number of requests handed to the transport.
    pub(crate) fn sent(&self) -> usize {
        *self.sent.lock().unwrap()
    }
}

impl Transport for GatedTransport {
    fn send(&self, _request: Request) -> TransportFuture {
        *self.sent.lock().unwrap() += 1;
        let gate = self.gates.lock().unwrap().pop_front();
        Box::pin(async move {
            match gate {
                Some(gate) => gate.await.unwrap_or_else(|_| Err(exhausted())),
                None => Err(exhausted()),
            }
        })
    }
}
