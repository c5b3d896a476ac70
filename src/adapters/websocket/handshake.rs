//! STOMP CONNECT handshake.
//!
//! The CONNECT frame must carry `Authorization: Bearer <access>` and a
//! `channelHeader` naming one of the configured channels. On success the
//! principal is registered as a member of that channel.

use thiserror::Error;

use super::stomp::{Command, Frame, StompError};
use crate::domain::auth::{Principal, TokenError, TokenKind};
use crate::domain::catalog::{ChannelName, ChannelSet};
use crate::domain::foundation::{ConnectionId, ValidationError};
use crate::ports::{CacheError, MembershipRegistry, TokenCodec};

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const CHANNEL_HEADER: &str = "channelHeader";

const BEARER_PREFIX: &str = "Bearer ";

/// An accepted socket connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketSession {
    pub connection_id: ConnectionId,
    pub principal: Principal,
    pub channel: ChannelName,
}

#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("unreadable frame: {0}")]
    Frame(#[from] StompError),

    #[error("expected CONNECT, got {0}")]
    NotConnect(Command),

    #[error("missing bearer credential")]
    MissingCredential,

    #[error("credential rejected: {0}")]
    Credential(#[from] TokenError),

    #[error("missing channelHeader header")]
    MissingChannel,

    #[error("invalid channel: {0}")]
    InvalidChannel(#[from] ValidationError),

    #[error("membership registry unavailable: {0}")]
    Registry(#[from] CacheError),
}

impl HandshakeError {
    /// Text for the ERROR frame sent back to the client.
    pub fn client_message(&self) -> &'static str {
        match self {
            HandshakeError::Frame(_) | HandshakeError::NotConnect(_) => "CONNECT frame expected",
            HandshakeError::MissingCredential | HandshakeError::Credential(_) => {
                "Invalid or missing access token"
            }
            HandshakeError::MissingChannel | HandshakeError::InvalidChannel(_) => {
                "Invalid or missing channelHeader"
            }
            HandshakeError::Registry(_) => "Unknown error. Please contact the administrator.",
        }
    }
}

/// Verify a CONNECT frame and join the requested channel.
pub async fn handshake(
    frame: &Frame,
    codec: &dyn TokenCodec,
    channels: &ChannelSet,
    registry: &dyn MembershipRegistry,
) -> Result<SocketSession, HandshakeError> {
    if !matches!(frame.command, Command::Connect | Command::Stomp) {
        return Err(HandshakeError::NotConnect(frame.command));
    }

    let token = frame
        .get(AUTHORIZATION_HEADER)
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .ok_or(HandshakeError::MissingCredential)?;

    let claims = codec.verify(token, TokenKind::Access)?;

    let channel = frame
        .get(CHANNEL_HEADER)
        .filter(|value| !value.trim().is_empty())
        .ok_or(HandshakeError::MissingChannel)?;
    let channel = channels.resolve(channel)?;

    let principal = claims.principal();
    registry.join(&channel, principal.id).await?;

    let session = SocketSession {
        connection_id: ConnectionId::new(),
        principal,
        channel,
    };
    tracing::info!(
        connection_id = %session.connection_id,
        user_id = %session.principal.id,
        channel = %session.channel,
        "Socket joined channel"
    );
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySharedCache;
    use crate::adapters::token::HmacTokenCodec;
    use crate::domain::auth::{Claims, Role};
    use crate::domain::foundation::{Timestamp, UserId};
    use secrecy::SecretString;

    fn codec() -> HmacTokenCodec {
        HmacTokenCodec::new("market-live", &SecretString::new("k".repeat(64))).unwrap()
    }

    fn channels() -> ChannelSet {
        ChannelSet::new(["apm", "dong"].map(|name| ChannelName::new(name).unwrap()))
    }

    fn principal() -> Principal {
        Principal {
            id: UserId::new(7),
            role: Role::Retailer,
            name: "Kim".into(),
            email: "kim@example.com".into(),
        }
    }

    fn token(codec: &HmacTokenCodec, kind: TokenKind) -> String {
        let claims = Claims::for_principal(&principal(), kind, "market-live", Timestamp::now(), 1800);
        codec.sign(&claims).unwrap()
    }

    fn connect(token: &str, channel: Option<&str>) -> Frame {
        let frame = Frame::new(Command::Connect)
            .header("accept-version", "1.2")
            .header(AUTHORIZATION_HEADER, format!("Bearer {}", token));
        match channel {
            Some(channel) => frame.header(CHANNEL_HEADER, channel),
            None => frame,
        }
    }

    #[tokio::test]
    async fn valid_connect_joins_channel() {
        let codec = codec();
        let registry = InMemorySharedCache::new();
        let frame = connect(&token(&codec, TokenKind::Access), Some("apm"));

        let session = handshake(&frame, &codec, &channels(), &registry).await.unwrap();

        assert_eq!(session.principal, principal());
        assert_eq!(session.channel.as_str(), "apm");
        assert_eq!(
            registry.list(&session.channel).await.unwrap(),
            vec![UserId::new(7)]
        );
    }

    #[tokio::test]
    async fn missing_channel_aborts_without_joining() {
        let codec = codec();
        let registry = InMemorySharedCache::new();
        let frame = connect(&token(&codec, TokenKind::Access), None);

        let err = handshake(&frame, &codec, &channels(), &registry).await.unwrap_err();

        assert!(matches!(err, HandshakeError::MissingChannel));
        let apm = ChannelName::new("apm").unwrap();
        assert!(registry.list(&apm).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn refresh_credential_is_rejected() {
        let codec = codec();
        let registry = InMemorySharedCache::new();
        let frame = connect(&token(&codec, TokenKind::Refresh), Some("apm"));

        let err = handshake(&frame, &codec, &channels(), &registry).await.unwrap_err();
        assert!(matches!(err, HandshakeError::Credential(TokenError::WrongKind)));
    }

    #[tokio::test]
    async fn missing_bearer_prefix_is_rejected() {
        let codec = codec();
        let registry = InMemorySharedCache::new();
        let frame = Frame::new(Command::Connect)
            .header(AUTHORIZATION_HEADER, token(&codec, TokenKind::Access))
            .header(CHANNEL_HEADER, "apm");

        let err = handshake(&frame, &codec, &channels(), &registry).await.unwrap_err();
        assert!(matches!(err, HandshakeError::MissingCredential));
    }

    #[tokio::test]
    async fn non_connect_frame_is_rejected() {
        let codec = codec();
        let registry = InMemorySharedCache::new();
        let frame = Frame::new(Command::Send).header("destination", "/apm");

        let err = handshake(&frame, &codec, &channels(), &registry).await.unwrap_err();
        assert!(matches!(err, HandshakeError::NotConnect(Command::Send)));
    }

    #[tokio::test]
    async fn unconfigured_channel_aborts_without_joining() {
        let codec = codec();
        let registry = InMemorySharedCache::new();
        let frame = connect(&token(&codec, TokenKind::Access), Some("not-a-mall"));

        let err = handshake(&frame, &codec, &channels(), &registry)
            .await
            .unwrap_err();

        assert!(matches!(err, HandshakeError::InvalidChannel(_)));
        let unknown = ChannelName::new("not-a-mall").unwrap();
        assert!(registry.list(&unknown).await.unwrap().is_empty());
    }
}
