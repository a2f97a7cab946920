//! Runs transport calls off the UI thread.
//!
//! Each request gets its own short-lived worker; replies come back over a
//! channel and are applied by the event loop, so the application state is
//! only ever touched from one thread.

use super::transport::ApiTransport;
use crate::domain::{ApiError, ApiRequest, ApiResponse};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

pub struct Dispatcher {
    transport: Arc<dyn ApiTransport>,
    tx: Sender<ApiResponse>,
    rx: Receiver<ApiResponse>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { transport, tx, rx }
    }

    pub fn dispatch(&self, request: ApiRequest) {
        let transport = Arc::clone(&self.transport);
        let tx = self.tx.clone();
        let (seq, action, background) = (request.seq, request.action, request.background);

        let spawned = thread::Builder::new()
            .name(format!("api-{}-{}", action.as_str(), seq))
            .spawn(move || {
                let result = transport.post_api_form(&request.payload);
                // The receiver only goes away when the app is shutting down.
                let _ = tx.send(request.respond(result));
            });

        if let Err(e) = spawned {
            tracing::error!(seq, error = %e, "failed to spawn request worker");
            let _ = self.tx.send(ApiResponse {
                seq,
                action,
                background,
                result: Err(ApiError::transport(e.to_string())),
            });
        }
    }

    /// Replies that have arrived since the last call, without blocking.
    pub fn drain(&self) -> Vec<ApiResponse> {
        self.rx.try_iter().collect()
    }

    #[cfg(test)]
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<ApiResponse> {
        self.rx.recv_timeout(timeout).ok()
    }
}
