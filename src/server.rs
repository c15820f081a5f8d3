//! HTTP listener lifecycle.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::RedirectorError;
use crate::redirector::RedirectHandler;

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server listens on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

/// Serves a [`RedirectHandler`] over HTTP/1 and HTTP/2.
pub struct RedirectServer {
    listener: std::net::TcpListener,
    handler: Arc<RedirectHandler>,
}

impl RedirectServer {
    /// Binds the listener right away so the caller learns about port
    /// conflicts (and the real port when binding to port 0) before serving.
    pub fn bind(addr: SocketAddr, handler: Arc<RedirectHandler>) -> Result<Self, RedirectorError> {
        let listener = std::net::TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        Ok(Self { listener, handler })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, RedirectorError> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves requests until `shutdown` resolves, then drains in-flight
    /// requests.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), RedirectorError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.listener.local_addr()?;
        let handler = self.handler;

        let make_svc = make_service_fn(move |_conn| {
            let handler = Arc::clone(&handler);

            async move {
                Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                    let handler = Arc::clone(&handler);
                    async move { Ok::<_, Infallible>(handler.handle(req).await) }
                }))
            }
        });

        info!(%addr, "HTTP redirector listening");
        hyper::Server::from_tcp(self.listener)?
            .serve(make_svc)
            .with_graceful_shutdown(shutdown)
            .await?;
        info!(%addr, "HTTP redirector stopped");
        Ok(())
    }
}
