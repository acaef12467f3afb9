// Identity Resolution - who is claiming

use super::constants::{MAX_CLIENT_TOKEN_LEN, MAX_ORIGIN_SIGNAL_LEN};
use crate::domain::{ClientToken, OriginSignal};
use crate::port::TokenProvider;
use std::sync::Arc;
use tracing::debug;

/// Rate-limit identity of one claim attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub origin_signal: Option<OriginSignal>,
    pub client_token: ClientToken,
    /// Token was generated for this request and must be handed back to the client
    pub is_new_token: bool,
}

/// Combines the transport's origin signal with the client's durable token.
/// Never touches storage.
pub struct IdentityResolver {
    token_provider: Arc<dyn TokenProvider>,
}

impl IdentityResolver {
    pub fn new(token_provider: Arc<dyn TokenProvider>) -> Self {
        Self { token_provider }
    }

    /// Resolve the identity for a request.
    ///
    /// Blank or oversized values count as absent. A missing token is replaced
    /// by a fresh one and flagged with `is_new_token`.
    pub fn resolve(&self, origin: Option<&str>, token: Option<&str>) -> ResolvedIdentity {
        let origin_signal = origin
            .map(str::trim)
            .filter(|o| !o.is_empty() && o.len() <= MAX_ORIGIN_SIGNAL_LEN)
            .map(str::to_string);

        let supplied = token
            .map(str::trim)
            .filter(|t| !t.is_empty() && t.len() <= MAX_CLIENT_TOKEN_LEN);

        match supplied {
            Some(t) => ResolvedIdentity {
                origin_signal,
                client_token: t.to_string(),
                is_new_token: false,
            },
            None => {
                let client_token = self.token_provider.generate_token();
                debug!(origin = ?origin_signal, "Issued new client token");
                ResolvedIdentity {
                    origin_signal,
                    client_token,
                    is_new_token: true,
                }
            }
        }
    }
}
