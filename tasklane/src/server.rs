use std::pin::Pin;
use std::task::{Context, Poll};

use axum::extract::connect_info::Connected;
use axum::Router;
use futures::ready;
use hyper::server::accept::Accept;
use tokio::net::{UnixListener, UnixStream};

use super::Error;
use crate::config::BindableAddr;

struct UdsAccept(UnixListener);

impl UdsAccept {
	#[inline]
	fn new(path: &std::path::Path) -> std::io::Result<Self> {
		UnixListener::bind(path).map(Self)
	}
}

impl Accept for UdsAccept {
	type Conn = UnixStream;
	type Error = std::io::Error;

	fn poll_accept(
		self: Pin<&mut Self>,
		cx: &mut Context<'_>,
	) -> Poll<Option<Result<Self::Conn, Self::Error>>> {
		let (stream, _addr) = ready!(self.0.poll_accept(cx))?;
		Poll::Ready(Some(Ok(stream)))
	}
}

#[derive(Clone, Copy, Debug)]
struct UdsConnectInfo;

impl Connected<&UnixStream> for UdsConnectInfo {
	fn connect_info(_target: &UnixStream) -> Self {
		Self
	}
}

/// Resolves on ctrl-c so in-flight requests can finish before the process exits.
async fn shutdown_signal() {
	if let Err(error) = tokio::signal::ctrl_c().await {
		tracing::error!(%error, "could not listen for ctrl-c; only a hard kill will stop the server");
		std::future::pending::<()>().await;
	}
	tracing::info!("shutting down");
}

pub async fn run(app: Router, addr: &BindableAddr) -> Result<(), Error> {
	match addr {
		BindableAddr::Tcp(socket_addr) => {
			axum::Server::try_bind(socket_addr)
				.map_err(Error::RunServer)?
				.serve(app.into_make_service())
				.with_graceful_shutdown(shutdown_signal())
				.await
		}
		BindableAddr::Unix(path) => {
			let incoming = UdsAccept::new(path).map_err(|err| Error::BindUnix(err, path.clone()))?;
			axum::Server::builder(incoming)
				.serve(app.into_make_service_with_connect_info::<UdsConnectInfo>())
				.with_graceful_shutdown(shutdown_signal())
				.await
		}
	}
	.map_err(Error::RunServer)
}
