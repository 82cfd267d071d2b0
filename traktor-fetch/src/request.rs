//! Cancellable request futures.
//!
//! Every endpoint call returns a [`CancellableRequest`]: a boxed future paired
//! with the [`CancellationToken`] that aborts it. Cancelling resolves the
//! future with [`ClientError::Aborted`] and drops the in-flight transport
//! future, which aborts the HTTP request. Futures derived with
//! [`CancellableRequest::then`] or [`CancellableRequest::map`] share the token,
//! so cancelling any link of the chain aborts all of it.

use futures::future::{BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio_util::sync::CancellationToken;

use crate::error::ClientError;

/// A request future that can be cancelled.
pub struct CancellableRequest<T> {
    inner: BoxFuture<'static, Result<T, ClientError>>,
    token: CancellationToken,
}

impl<T: Send + 'static> CancellableRequest<T> {
    /// Wraps a future with a fresh cancellation token.
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        Self::with_token(CancellationToken::new(), future)
    }

    /// Wraps a future with an existing cancellation token.
    pub fn with_token<F>(token: CancellationToken, future: F) -> Self
    where
        F: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        let signal = token.clone();
        let inner = async move {
            tokio::select! {
                biased;
                () = signal.cancelled() => Err(ClientError::Aborted),
                result = future => result,
            }
        }
        .boxed();

        Self { inner, token }
    }

    /// A request that is already finished.
    pub fn ready(result: Result<T, ClientError>) -> Self {
        Self::new(futures::future::ready(result))
    }

    /// Chains an async step; the derived request shares this token.
    pub fn then<U, F, Fut>(self, f: F) -> CancellableRequest<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Fut + Send + 'static,
        Fut: Future<Output = Result<U, ClientError>> + Send + 'static,
    {
        let Self { inner, token } = self;
        CancellableRequest::with_token(token, async move {
            let value = inner.await?;
            f(value).await
        })
    }

    /// Maps the successful value; the derived request shares this token.
    pub fn map<U, F>(self, f: F) -> CancellableRequest<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.then(|value| futures::future::ready(Ok(f(value))))
    }
}

impl<T> CancellableRequest<T> {
    /// Aborts the request.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// The abort signal of this request.
    pub fn signal(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Returns true once the request has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl<T> Future for CancellableRequest<T> {
    type Output = Result<T, ClientError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl<T> fmt::Debug for CancellableRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellableRequest")
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
