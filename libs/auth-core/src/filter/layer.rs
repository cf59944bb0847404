//! Tower middleware running the request authenticator over HTTP requests.
//!
//! On success the verified principal is attached to the request's
//! extensions for handlers to read; on failure the request is
//! short-circuited with the rejection's status code and an empty body.
//! Verifier errors never reach the inner service.

use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use http::{header::AUTHORIZATION, Request, Response, StatusCode};
use tower::{Layer, Service};

use crate::error::AuthError;
use crate::filter::{AuthRequirement, RequestAuthenticator};

/// Layer applying bearer-token authentication to an HTTP service.
#[derive(Clone)]
pub struct AuthLayer {
    authenticator: Arc<RequestAuthenticator>,
    requirement: AuthRequirement,
}

impl AuthLayer {
    /// Require a valid access token on every request.
    #[must_use]
    pub fn new(authenticator: Arc<RequestAuthenticator>) -> Self {
        Self {
            authenticator,
            requirement: AuthRequirement::Required,
        }
    }

    /// Allow anonymous requests through; presented tokens must still
    /// verify.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.requirement = AuthRequirement::Optional;
        self
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            authenticator: self.authenticator.clone(),
            requirement: self.requirement,
        }
    }
}

/// Service produced by [`AuthLayer`].
#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    authenticator: Arc<RequestAuthenticator>,
    requirement: AuthRequirement,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for AuthService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Error: Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: Default + Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let authenticator = Arc::clone(&self.authenticator);
        let requirement = self.requirement;

        // Take the ready inner service, leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let authorization = req
                .headers()
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);

            match authenticator
                .authenticate_header(authorization.as_deref(), requirement)
                .await
            {
                Ok(Some(principal)) => {
                    req.extensions_mut().insert(principal);
                }
                Ok(None) => {}
                Err(err) => return Ok(rejection_response(&err)),
            }

            inner.call(req).await
        })
    }
}

fn rejection_response<B: Default>(err: &AuthError) -> Response<B> {
    let status = StatusCode::from_u16(err.rejection().status_code())
        .unwrap_or(StatusCode::UNAUTHORIZED);

    let mut response = Response::new(B::default());
    *response.status_mut() = status;
    response
}
