// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Socket server and connection handling.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use bx_adapters::{MetricsAdapter, ProcessAdapter};
use bx_core::{ArchiveFormat, UploadResult};
use bx_daemon::protocol::{self, Request, Response, DEFAULT_TIMEOUT, PROTOCOL_VERSION};
use bx_engine::Executor;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

/// State shared by every connection task
pub struct ServerContext<P, M> {
    pub executor: Executor<P, M>,
    pub start_time: Instant,
    /// Upload, prepare and execute requests in flight
    requests_active: AtomicUsize,
    /// Signalled when a client asks the daemon to stop
    pub shutdown: Notify,
}

impl<P, M> ServerContext<P, M> {
    pub fn new(executor: Executor<P, M>) -> Self {
        Self {
            executor,
            start_time: Instant::now(),
            requests_active: AtomicUsize::new(0),
            shutdown: Notify::new(),
        }
    }

    pub fn requests_active(&self) -> usize {
        self.requests_active.load(Ordering::SeqCst)
    }

    fn track(&self) -> ActiveGuard<'_> {
        self.requests_active.fetch_add(1, Ordering::SeqCst);
        ActiveGuard(&self.requests_active)
    }
}

struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Handle a single client connection
pub async fn handle_connection<P, M, S>(
    ctx: &ServerContext<P, M>,
    stream: S,
) -> Result<(), ServerError>
where
    P: ProcessAdapter,
    M: MetricsAdapter,
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut reader, mut writer) = tokio::io::split(stream);

    // Read request with timeout
    let request = match protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await {
        Ok(req) => req,
        Err(protocol::ProtocolError::Timeout) => {
            error!("Request read timeout");
            return Err(ServerError::Timeout);
        }
        Err(protocol::ProtocolError::ConnectionClosed) => {
            debug!("Client disconnected before sending request");
            return Ok(());
        }
        Err(e @ (protocol::ProtocolError::Json(_) | protocol::ProtocolError::MessageTooLarge { .. })) => {
            warn!(error = %e, "rejecting malformed request");
            let response = Response::Error {
                message: format!("invalid request: {}", e),
            };
            protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT).await?;
            return Ok(());
        }
        Err(e) => {
            error!("Failed to read request: {}", e);
            return Err(ServerError::Protocol(e));
        }
    };

    debug!(kind = request.kind(), "Received request");

    let response = handle_request(ctx, request).await;

    protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT)
        .await
        .map_err(ServerError::Protocol)?;

    Ok(())
}

/// Handle a single request and return a response
pub async fn handle_request<P, M>(ctx: &ServerContext<P, M>, request: Request) -> Response
where
    P: ProcessAdapter,
    M: MetricsAdapter,
{
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version: _ } => Response::Hello {
            version: PROTOCOL_VERSION.to_string(),
        },

        Request::Status => Response::Status {
            uptime_secs: ctx.start_time.elapsed().as_secs(),
            requests_active: ctx.requests_active(),
            version: PROTOCOL_VERSION.to_string(),
        },

        Request::Shutdown => {
            info!("Shutdown requested via IPC");
            ctx.shutdown.notify_one();
            Response::ShuttingDown
        }

        Request::Upload {
            identity,
            archive_format,
            data,
        } => {
            let _active = ctx.track();
            let format = match archive_format.parse::<ArchiveFormat>() {
                Ok(format) => format,
                Err(message) => {
                    return Response::Upload {
                        result: UploadResult::failed(message),
                    }
                }
            };
            let bytes = match protocol::decode_archive(&data) {
                Ok(bytes) => bytes,
                Err(e) => {
                    return Response::Upload {
                        result: UploadResult::failed(format!("archive is not valid base64: {}", e)),
                    }
                }
            };
            Response::Upload {
                result: ctx.executor.upload(&identity, format, bytes).await,
            }
        }

        Request::Prepare { identity, manifest } => {
            let _active = ctx.track();
            Response::Prepare {
                result: ctx.executor.prepare(&identity, &manifest).await,
            }
        }

        Request::Execute { identity, request } => {
            let _active = ctx.track();
            Response::Execute {
                result: ctx.executor.execute(&identity, &request).await,
            }
        }
    }
}

/// Server errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),

    #[error("Request timeout")]
    Timeout,
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
