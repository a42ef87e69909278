//! Bearer token claims
//!
//! Signatures are NOT verified here. The gateway authorizer validates tokens
//! before a request reaches a handler; this module only decodes the payload to
//! learn who the caller is.

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde_json::{Map, Value};
use thiserror::Error;

const CREDENTIALS_CLAIM: &str = "verified_credentials";
const BLOCKCHAIN_FORMAT: &str = "blockchain";

/// Why a caller identity could not be recovered from a token
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ClaimsError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("token could not be decoded: {0}")]
    Malformed(String),

    #[error("failed to parse verified_credentials from claims")]
    MissingCredentials,

    #[error("blockchain credential not found")]
    MissingCredential,

    #[error("failed to parse {0} from verified_credentials")]
    InvalidField(&'static str),
}

/// Identity of the caller as asserted by the token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// Wallet address, one leading `0x` removed
    pub wallet: String,
    /// Opaque holder id from the identity provider
    pub uuid: String,
}

/// Strips the `Bearer ` scheme from an `Authorization` header value
pub fn bearer_token(header: Option<&str>) -> Result<&str, ClaimsError> {
    let raw = header.unwrap_or_default().trim();
    let token = match raw.get(..6) {
        Some(scheme) if scheme.eq_ignore_ascii_case("bearer") => raw[6..].trim(),
        _ => raw,
    };
    if token.is_empty() {
        return Err(ClaimsError::MissingToken);
    }
    Ok(token)
}

/// Decodes the claims of a JWT without checking its signature or expiry
pub fn decode_unverified(token: &str) -> Result<Map<String, Value>, ClaimsError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<Map<String, Value>>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| ClaimsError::Malformed(e.to_string()))
}

/// Finds the first blockchain credential and returns its wallet and holder id
pub fn identity_from_claims(claims: &Map<String, Value>) -> Result<CallerIdentity, ClaimsError> {
    let credentials = claims
        .get(CREDENTIALS_CLAIM)
        .and_then(Value::as_array)
        .ok_or(ClaimsError::MissingCredentials)?;

    let credential = credentials
        .iter()
        .filter_map(Value::as_object)
        .find(|c| c.get("format").and_then(Value::as_str) == Some(BLOCKCHAIN_FORMAT))
        .ok_or(ClaimsError::MissingCredential)?;

    let address = credential
        .get("address")
        .and_then(Value::as_str)
        .ok_or(ClaimsError::InvalidField("address"))?;
    let uuid = credential
        .get("id")
        .and_then(Value::as_str)
        .ok_or(ClaimsError::InvalidField("id"))?;

    Ok(CallerIdentity {
        wallet: address.strip_prefix("0x").unwrap_or(address).to_string(),
        uuid: uuid.to_string(),
    })
}

/// Recovers the caller identity from an `Authorization` header value
pub fn identity_from_header(header: Option<&str>) -> Result<CallerIdentity, ClaimsError> {
    let token = bearer_token(header)?;
    let claims = decode_unverified(token)?;
    identity_from_claims(&claims)
}
