//! TLS Termination
//!
//! Loads a PEM key/certificate/chain into a rustls server config and
//! exposes a [`TlsListener`] usable with `axum::serve`.
//!
//! Handshakes run in one task per connection; only completed streams are
//! handed to the server.

use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rustls::ServerConfig;
use rustls_pki_types::pem::PemObject;
use rustls_pki_types::{CertificateDer, PrivateKeyDer};
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_rustls::TlsAcceptor;
use tokio_rustls::server::TlsStream;

/// Upper bound for a single TLS handshake
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Completed handshakes waiting to be served
const ACCEPT_BACKLOG: usize = 64;

/// TLS setup errors
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("Cannot read PEM file {path}: {reason}")]
    Pem { path: PathBuf, reason: String },

    #[error("No certificates found in {0}")]
    NoCertificates(PathBuf),

    #[error("Invalid TLS configuration: {0}")]
    Rustls(#[from] rustls::Error),
}

/// PEM files for the TLS listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsFiles {
    /// Private key (PKCS#8, PKCS#1 or SEC1)
    pub key: PathBuf,
    /// Leaf certificate
    pub cert: PathBuf,
    /// Intermediate chain, appended after the leaf
    pub chain: PathBuf,
}

fn pem_error(path: &Path) -> impl FnOnce(rustls_pki_types::pem::Error) -> TlsError + '_ {
    move |e| TlsError::Pem {
        path: path.to_path_buf(),
        reason: format!("{e:?}"),
    }
}

fn read_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    CertificateDer::pem_file_iter(path)
        .map_err(pem_error(path))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(pem_error(path))
}

/// Build a rustls server config (ring provider, HTTP/1.1 ALPN)
pub fn load_server_config(files: &TlsFiles) -> Result<Arc<ServerConfig>, TlsError> {
    let mut certs = read_certs(&files.cert)?;
    if certs.is_empty() {
        return Err(TlsError::NoCertificates(files.cert.clone()));
    }
    certs.extend(read_certs(&files.chain)?);

    let key = PrivateKeyDer::from_pem_file(&files.key).map_err(pem_error(&files.key))?;

    let mut config =
        ServerConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()?
            .with_no_client_auth()
            .with_single_cert(certs, key)?;
    config.alpn_protocols = vec![b"http/1.1".to_vec()];

    tracing::debug!(
        cert = %files.cert.display(),
        chain = %files.chain.display(),
        "TLS configuration loaded"
    );

    Ok(Arc::new(config))
}

/// TCP listener that yields TLS streams
pub struct TlsListener {
    local_addr: SocketAddr,
    incoming: mpsc::Receiver<(TlsStream<TcpStream>, SocketAddr)>,
}

impl TlsListener {
    /// Bind `addr` and start accepting in the background
    pub async fn bind(addr: SocketAddr, config: Arc<ServerConfig>) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let (tx, rx) = mpsc::channel(ACCEPT_BACKLOG);

        tokio::spawn(accept_loop(listener, TlsAcceptor::from(config), tx));

        Ok(Self {
            local_addr,
            incoming: rx,
        })
    }
}

async fn accept_loop(
    listener: TcpListener,
    acceptor: TlsAcceptor,
    tx: mpsc::Sender<(TlsStream<TcpStream>, SocketAddr)>,
) {
    loop {
        if tx.is_closed() {
            break;
        }

        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                // Typically fd exhaustion
                tracing::warn!(error = %e, "TCP accept failed");
                tokio::time::sleep(Duration::from_millis(50)).await;
                continue;
            }
        };

        let acceptor = acceptor.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            match tokio::time::timeout(HANDSHAKE_TIMEOUT, acceptor.accept(stream)).await {
                Ok(Ok(tls)) => {
                    let _ = tx.send((tls, peer)).await;
                }
                Ok(Err(e)) => tracing::debug!(%peer, error = %e, "TLS handshake failed"),
                Err(_) => tracing::debug!(%peer, "TLS handshake timed out"),
            }
        });
    }
}

impl axum::serve::Listener for TlsListener {
    type Io = TlsStream<TcpStream>;
    type Addr = SocketAddr;

    async fn accept(&mut self) -> (Self::Io, Self::Addr) {
        match self.incoming.recv().await {
            Some(conn) => conn,
            // Accept loop is gone; nothing will ever arrive
            None => std::future::pending().await,
        }
    }

    fn local_addr(&self) -> io::Result<Self::Addr> {
        Ok(self.local_addr)
    }
}
