//! Maps Access-Request packets onto the authentication gateway.
//!
//! Rejections are identical on the wire regardless of cause: a bare
//! Access-Reject with no reason-bearing attributes. The reason codes live in
//! the logs only.

use async_trait::async_trait;
use radius::core::code::Code;
use radius::core::request::Request;
use radius::core::rfc2865;
use radius::server::RequestHandler;
use secrecy::SecretString;
use std::io;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

use crate::auth::orchestrator::{AuthRequest, Gateway};

pub(super) struct AccessRequestHandler {
    gateway: Arc<Gateway>,
}

impl AccessRequestHandler {
    pub(super) fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }
}

async fn respond(conn: &UdpSocket, req: &Request, code: Code) -> Result<(), io::Error> {
    let encoded = req
        .get_packet()
        .make_response_packet(code)
        .encode()
        .map_err(io::Error::other)?;
    conn.send_to(&encoded, req.get_remote_addr()).await?;
    Ok(())
}

#[async_trait]
impl RequestHandler<(), io::Error> for AccessRequestHandler {
    async fn handle_radius_request(
        &self,
        conn: &UdpSocket,
        req: &Request,
    ) -> Result<(), io::Error> {
        let packet = req.get_packet();

        if !matches!(packet.get_code(), Code::AccessRequest) {
            warn!(
                code = ?packet.get_code(),
                client = %req.get_remote_addr(),
                "ignoring non Access-Request packet"
            );
            return Ok(());
        }

        let Some(Ok(username)) = rfc2865::lookup_user_name(packet) else {
            warn!(client = %req.get_remote_addr(), "Access-Request without a usable User-Name");
            return respond(conn, req, Code::AccessReject).await;
        };

        // The codec already decrypted User-Password with the shared secret.
        let password = match rfc2865::lookup_user_password(packet) {
            Some(Ok(bytes)) => match String::from_utf8(bytes) {
                Ok(password) => SecretString::from(password),
                Err(_) => {
                    warn!(client = %req.get_remote_addr(), "User-Password is not valid UTF-8");
                    return respond(conn, req, Code::AccessReject).await;
                }
            },
            _ => {
                warn!(client = %req.get_remote_addr(), "Access-Request without a usable User-Password");
                return respond(conn, req, Code::AccessReject).await;
            }
        };

        let request = AuthRequest {
            username,
            password,
            client_addr: req.get_remote_addr(),
        };

        let verdict = self.gateway.authenticate(&request).await;

        let code = if verdict.success {
            Code::AccessAccept
        } else {
            Code::AccessReject
        };
        debug!(code = ?code, client = %req.get_remote_addr(), "sending response");

        respond(conn, req, code).await
    }
}
