//! Scripted transport and runtime helpers for Overpass tests.
use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;

use async_trait::async_trait;

use super::{Endpoint, QueryTransport, RequestMethod, TransportError, TransportResponse};

/// Reply served by [`StubTransport`] for one request.
pub type StubReply = Result<TransportResponse, TransportError>;

/// A request observed by [`StubTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Endpoint URL the request targeted.
    pub endpoint: String,
    /// Method used.
    pub method: RequestMethod,
    /// Query text sent.
    pub query: String,
}

/// [`QueryTransport`] that serves scripted replies in request order.
///
/// Once the script is exhausted every request receives the fallback reply.
#[derive(Debug)]
pub struct StubTransport {
    replies: RefCell<VecDeque<StubReply>>,
    fallback: StubReply,
    requests: RefCell<Vec<RecordedRequest>>,
}

impl StubTransport {
    /// A transport whose unscripted replies all carry `status` and no body.
    #[must_use]
    pub fn failing_with_status(status: u16) -> Self {
        Self::with_fallback(Ok(TransportResponse::new(status, Vec::new())))
    }

    /// A transport whose unscripted replies are `fallback`.
    #[must_use]
    pub fn with_fallback(fallback: StubReply) -> Self {
        Self {
            replies: RefCell::new(VecDeque::new()),
            fallback,
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Queue a reply.
    #[must_use]
    pub fn then(self, reply: StubReply) -> Self {
        self.replies.borrow_mut().push_back(reply);
        self
    }

    /// Queue a reply with `status` and an empty body.
    #[must_use]
    pub fn then_status(self, status: u16) -> Self {
        self.then(Ok(TransportResponse::new(status, Vec::new())))
    }

    /// Queue a reply with `status` and `body`.
    #[must_use]
    pub fn then_json(self, status: u16, body: &str) -> Self {
        self.then(Ok(TransportResponse::new(status, body.as_bytes())))
    }

    /// Requests observed so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }

    fn serve(&self, endpoint: &Endpoint, method: RequestMethod, query: &str) -> StubReply {
        self.requests.borrow_mut().push(RecordedRequest {
            endpoint: endpoint.as_str().to_owned(),
            method,
            query: query.to_owned(),
        });
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait(?Send)]
impl QueryTransport for StubTransport {
    async fn post_form(
        &self,
        endpoint: &Endpoint,
        query: &str,
    ) -> Result<TransportResponse, TransportError> {
        self.serve(endpoint, RequestMethod::Post, query)
    }

    async fn get_query(
        &self,
        endpoint: &Endpoint,
        query: &str,
    ) -> Result<TransportResponse, TransportError> {
        self.serve(endpoint, RequestMethod::Get, query)
    }
}

/// Drive `future` to completion on a fresh current-thread runtime.
///
/// # Panics
/// Panics if the runtime cannot be built.
pub fn block_on_for_tests<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("test runtime should build")
        .block_on(future)
}
