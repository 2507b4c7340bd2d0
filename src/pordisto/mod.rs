//! RADIUS front end.
//!
//! Wire-level decode/encode (packet parsing, User-Password decryption, the
//! response authenticator) is owned by the `radius` crate; this module only
//! wires the UDP server to the authentication gateway.

mod handler;

use crate::auth::orchestrator::Gateway;
use anyhow::{anyhow, Result};
use radius::server::{SecretProvider, SecretProviderError, Server};
use secrecy::{ExposeSecret, SecretString};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

use handler::AccessRequestHandler;

/// All clients share the one configured secret.
struct StaticSecretProvider {
    secret: SecretString,
}

impl SecretProvider for StaticSecretProvider {
    fn fetch_secret(&self, _remote_addr: SocketAddr) -> Result<Vec<u8>, SecretProviderError> {
        Ok(self.secret.expose_secret().as_bytes().to_vec())
    }
}

/// Bind the UDP listener and serve until interrupted.
///
/// # Errors
///
/// Returns an error if the socket cannot be bound or the server loop
/// terminates abnormally.
pub async fn new(port: u16, secret: SecretString, gateway: Arc<Gateway>) -> Result<()> {
    let mut server = Server::listen(
        "0.0.0.0",
        port,
        AccessRequestHandler::new(gateway),
        StaticSecretProvider { secret },
    )
    .await
    .map_err(|err| anyhow!("failed to bind RADIUS listener on port {port}: {err:?}"))?;

    server.set_skip_authenticity_validation(false);

    info!(port, "RADIUS server listening");

    if let Err(err) = server.run(signal::ctrl_c()).await {
        return Err(anyhow!("RADIUS server terminated: {err:?}"));
    }

    Ok(())
}
