//! Identity chain carried by the login packet. Signatures are not checked:
//! the server runs in offline mode and trusts the self-signed chain.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("invalid login chain: {0}")]
    InvalidChain(#[from] serde_json::Error),

    #[error("malformed token in login chain")]
    MalformedToken,

    #[error("login chain has no identity")]
    MissingIdentity,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginIdentity {
    pub display_name: String,
    pub identity: Option<Uuid>,
    pub xuid: String,
}

#[derive(Serialize, Deserialize)]
struct ChainDocument {
    chain: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct ChainClaims {
    #[serde(rename = "extraData", default, skip_serializing_if = "Option::is_none")]
    extra_data: Option<ExtraData>,
}

#[derive(Serialize, Deserialize)]
struct ExtraData {
    #[serde(rename = "displayName")]
    display_name: String,
    #[serde(default)]
    identity: Option<String>,
    #[serde(rename = "XUID", default)]
    xuid: String,
}

fn token_claims(token: &str) -> Result<ChainClaims, LoginError> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next()) {
        (Some(_header), Some(payload)) => payload,
        _ => return Err(LoginError::MalformedToken),
    };
    let payload = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| LoginError::MalformedToken)?;
    Ok(serde_json::from_slice(&payload)?)
}

/// The last token carrying `extraData` wins; the client's own token comes
/// after any authority tokens.
pub fn parse_login_chain(chain: &str) -> Result<LoginIdentity, LoginError> {
    let document: ChainDocument = serde_json::from_str(chain)?;

    let mut found = None;
    for token in document.chain.iter() {
        if let Some(extra_data) = token_claims(token)?.extra_data {
            found = Some(extra_data);
        }
    }

    let extra_data = found.ok_or(LoginError::MissingIdentity)?;
    if extra_data.display_name.is_empty() {
        return Err(LoginError::MissingIdentity);
    }

    Ok(LoginIdentity {
        identity: extra_data
            .identity
            .as_deref()
            .and_then(|identity| Uuid::parse_str(identity).ok()),
        display_name: extra_data.display_name,
        xuid: extra_data.xuid,
    })
}

/// Builds an unsigned chain the way an offline client would, for bots and
/// tests.
pub fn offline_login_chain(display_name: &str, identity: Uuid) -> Result<String, LoginError> {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"ES384"}"#);
    let claims = ChainClaims {
        extra_data: Some(ExtraData {
            display_name: display_name.to_string(),
            identity: Some(identity.hyphenated().to_string()),
            xuid: String::new(),
        }),
    };
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
    let document = ChainDocument {
        chain: vec![format!("{}.{}.", header, payload)],
    };
    Ok(serde_json::to_string(&document)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_chain_names_the_player() {
        let identity = Uuid::from_u128(0x1234);
        let chain = offline_login_chain("Alex", identity).unwrap();
        let login = parse_login_chain(&chain).unwrap();
        assert_eq!(login.display_name, "Alex");
        assert_eq!(login.identity, Some(identity));
        assert!(login.xuid.is_empty());
    }

    #[test]
    fn identity_comes_from_the_last_claim() {
        let authority = format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(br#"{"alg":"ES384"}"#),
            URL_SAFE_NO_PAD.encode(br#"{"certificateAuthority":true}"#)
        );
        let client = format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(br#"{"alg":"ES384"}"#),
            URL_SAFE_NO_PAD.encode(
                br#"{"extraData":{"displayName":"Steve","identity":"not-a-uuid","XUID":"2535"}}"#
            )
        );
        let chain = serde_json::json!({ "chain": [authority, client] }).to_string();
        let login = parse_login_chain(&chain).unwrap();
        assert_eq!(login.display_name, "Steve");
        assert_eq!(login.identity, None);
        assert_eq!(login.xuid, "2535");
    }

    #[test]
    fn chains_without_identity_are_rejected() {
        assert!(matches!(
            parse_login_chain(r#"{"chain":[]}"#),
            Err(LoginError::MissingIdentity)
        ));
        assert!(matches!(
            parse_login_chain(r#"{"chain":["no-dots"]}"#),
            Err(LoginError::MalformedToken)
        ));
        assert!(matches!(
            parse_login_chain("not json"),
            Err(LoginError::InvalidChain(_))
        ));
    }
}
