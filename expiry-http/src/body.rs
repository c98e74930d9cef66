//! Response body produced by the middleware.
//!
//! Matched-stale requests stream the file server's body through untouched.
//! Responses the middleware answers itself (`304 Not Modified`, the debug
//! snapshot) carry an in-memory body instead.

use bytes::{Buf, Bytes};
use http_body::{Body as HttpBody, Frame, SizeHint};
use pin_project::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};

#[pin_project(project = ExpiryBodyProj)]
#[derive(Debug)]
pub enum ExpiryBody<B> {
    /// Body of the inner service's response.
    Upstream(#[pin] B),
    /// Body built by the middleware. `None` once it has been yielded.
    Complete(Option<Bytes>),
}

impl<B> ExpiryBody<B> {
    pub fn empty() -> Self {
        ExpiryBody::Complete(None)
    }

    pub fn complete(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        if bytes.is_empty() {
            ExpiryBody::Complete(None)
        } else {
            ExpiryBody::Complete(Some(bytes))
        }
    }
}

impl<B> HttpBody for ExpiryBody<B>
where
    B: HttpBody,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match self.project() {
            ExpiryBodyProj::Upstream(body) => match body.poll_frame(cx) {
                Poll::Ready(Some(Ok(frame))) => {
                    let frame = frame.map_data(|mut data| data.copy_to_bytes(data.remaining()));
                    Poll::Ready(Some(Ok(frame)))
                }
                Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(e))),
                Poll::Ready(None) => Poll::Ready(None),
                Poll::Pending => Poll::Pending,
            },
            ExpiryBodyProj::Complete(data) => {
                Poll::Ready(data.take().map(|bytes| Ok(Frame::data(bytes))))
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            ExpiryBody::Upstream(body) => body.is_end_stream(),
            ExpiryBody::Complete(data) => data.is_none(),
        }
    }

    fn size_hint(&self) -> SizeHint {
        match self {
            ExpiryBody::Upstream(body) => body.size_hint(),
            ExpiryBody::Complete(Some(bytes)) => SizeHint::with_exact(bytes.len() as u64),
            ExpiryBody::Complete(None) => SizeHint::with_exact(0),
        }
    }
}
