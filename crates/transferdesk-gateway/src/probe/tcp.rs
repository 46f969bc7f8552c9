//! SFTP reachability probe.
//!
//! Only checks that a TCP connection to host:port can be established. No SSH
//! handshake is attempted and the stored credentials are not used.

use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::debug;
use transferdesk_core::{ConnectionKind, ConnectionTarget};

use super::{EndpointProbe, ProbeArtifacts, ProbeError};
use crate::describe_timeout;

pub struct TcpProbe {
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl EndpointProbe for TcpProbe {
    fn kind(&self) -> ConnectionKind {
        ConnectionKind::Sftp
    }

    async fn probe(
        &self,
        target: &ConnectionTarget,
        _artifacts: &mut ProbeArtifacts,
    ) -> Result<(), ProbeError> {
        let ConnectionTarget::Sftp(target) = target else {
            return Err(ProbeError::KindMismatch {
                probe: self.kind(),
                target: target.kind(),
            });
        };

        let unreachable = |reason: String| ProbeError::Unreachable {
            host: target.host.clone(),
            port: target.port,
            reason,
        };

        let connect = TcpStream::connect((target.host.as_str(), target.port));
        match tokio::time::timeout(self.timeout, connect).await {
            Ok(Ok(stream)) => {
                debug!(
                    "[Probe] TCP connection to {}:{} established",
                    target.host, target.port
                );
                drop(stream);
                Ok(())
            }
            Ok(Err(e)) => Err(unreachable(e.to_string())),
            Err(_) => Err(unreachable(format!(
                "timed out after {}",
                describe_timeout(self.timeout)
            ))),
        }
    }
}
