use std::pin::Pin;
use std::task::{Context, Poll};

use expiry_http::ExpiryBody;
use futures::Future;
use futures::future::{Ready, ready};
use http::{HeaderMap, Response};
use pin_project::pin_project;

/// Either a response built by the middleware or the inner service's future
/// plus the cache headers to add to its response.
#[pin_project(project = ExpiryFutureProj)]
pub enum ExpiryFuture<F, ResBody, E> {
    /// Answered without calling the inner service.
    Respond {
        /// The finished response.
        #[pin]
        response: Ready<Result<Response<ExpiryBody<ResBody>>, E>>,
    },
    /// Waiting for the inner service.
    Upstream {
        /// The inner service's future.
        #[pin]
        inner: F,
        /// Headers that overwrite the inner response's headers.
        headers: Option<HeaderMap>,
    },
}

impl<F, ResBody, E> ExpiryFuture<F, ResBody, E> {
    pub(crate) fn respond(response: Response<ExpiryBody<ResBody>>) -> Self {
        ExpiryFuture::Respond {
            response: ready(Ok(response)),
        }
    }

    pub(crate) fn upstream(inner: F, headers: Option<HeaderMap>) -> Self {
        ExpiryFuture::Upstream { inner, headers }
    }
}

impl<F, ResBody, E> Future for ExpiryFuture<F, ResBody, E>
where
    F: Future<Output = Result<Response<ResBody>, E>>,
{
    type Output = Result<Response<ExpiryBody<ResBody>>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.project() {
            ExpiryFutureProj::Respond { response } => response.poll(cx),
            ExpiryFutureProj::Upstream { inner, headers } => {
                let response = futures::ready!(inner.poll(cx))?;
                let (parts, body) = response.into_parts();
                let mut response = Response::from_parts(parts, ExpiryBody::Upstream(body));

                if let Some(headers) = headers.take() {
                    let target = response.headers_mut();
                    for (name, value) in headers.iter() {
                        target.insert(name, value.clone());
                    }
                }
                Poll::Ready(Ok(response))
            }
        }
    }
}
