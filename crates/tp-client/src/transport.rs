//! Transport abstraction consumed by the sync adapter.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::Result;
use crate::request::Request;
use crate::response::Response;

/// Future returned by [`Transport::send`].
pub type TransportFuture = BoxFuture<'static, Result<Response>>;

/// Something that can carry a [`Request`] to a server and bring back a
/// [`Response`].
///
/// Implementations must resolve to `Err` for any non-success HTTP status so
/// callers only ever see 2xx responses on the `Ok` side. The returned future
/// owns everything it needs, which lets a caller chain a second request after
/// the first completes without borrowing the transport across awaits.
pub trait Transport: Send + Sync + 'static {
    /// Send a request.
    fn send(&self, request: Request) -> TransportFuture;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: Request) -> TransportFuture {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: Request) -> TransportFuture {
        (**self).send(request)
    }
}
