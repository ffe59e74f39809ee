// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Tower layer that traces ledger RPC traffic.
//!
//! Each request gets a `tokenops.rpc` span carrying the method and the
//! elapsed time. Payloads are never logged: `eth_sendRawTransaction` carries
//! the full signed transaction.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};

use alloy_json_rpc::{RequestPacket, ResponsePacket};
use alloy_transport::TransportError;
use tower::Layer;
use tracing::{debug, info, warn, Instrument};

/// Method whose completion is logged at `info`.
const SEND_RAW_TRANSACTION: &str = "eth_sendRawTransaction";

/// Wraps each request in a `tokenops.rpc` span.
///
/// # Example
///
/// ```rust,ignore
/// use tokenops::transport::LoggingLayer;
/// use alloy_rpc_client::ClientBuilder;
///
/// let client = ClientBuilder::default()
///     .layer(LoggingLayer::new())
///     .http(node_url);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingLayer;

impl LoggingLayer {
    /// Creates the layer.
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = LoggingService<S>;

    fn layer(&self, service: S) -> Self::Service {
        LoggingService { service }
    }
}

/// Service produced by [`LoggingLayer`].
#[derive(Clone, Debug)]
pub struct LoggingService<S> {
    service: S,
}

impl<S> tower::Service<RequestPacket> for LoggingService<S>
where
    S: tower::Service<RequestPacket, Response = ResponsePacket, Error = TransportError>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
{
    type Response = ResponsePacket;
    type Error = TransportError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, request: RequestPacket) -> Self::Future {
        let mut service = self.service.clone();
        let method = method_label(&request);
        let submits = submits_transaction(&request);
        let span = tracing::debug_span!(
            "tokenops.rpc",
            method = %method,
            duration_ms = tracing::field::Empty,
        );

        Box::pin(
            async move {
                let start = Instant::now();
                let result = service.call(request).await;
                let elapsed = start.elapsed().as_millis() as u64;
                tracing::Span::current().record("duration_ms", elapsed);

                match &result {
                    Ok(response) if response.is_error() => {
                        debug!(elapsed_ms = elapsed, "Node returned an error reply");
                    }
                    Ok(_) if submits => {
                        info!(elapsed_ms = elapsed, "Raw transaction accepted by node");
                    }
                    Ok(_) => debug!(elapsed_ms = elapsed, "RPC completed"),
                    Err(e) => warn!(error = %e, elapsed_ms = elapsed, "RPC transport error"),
                }
                result
            }
            .instrument(span),
        )
    }
}

/// Returns `true` if the packet submits a signed transaction.
fn submits_transaction(request: &RequestPacket) -> bool {
    match request {
        RequestPacket::Single(req) => req.method() == SEND_RAW_TRANSACTION,
        RequestPacket::Batch(reqs) => reqs.iter().any(|req| req.method() == SEND_RAW_TRANSACTION),
    }
}

/// Method name for a single request; batches are summarised by size.
fn method_label(request: &RequestPacket) -> String {
    match request {
        RequestPacket::Single(req) => req.method().to_string(),
        RequestPacket::Batch(reqs) if reqs.len() == 1 => reqs[0].method().to_string(),
        RequestPacket::Batch(reqs) => format!("batch({})", reqs.len()),
    }
}
