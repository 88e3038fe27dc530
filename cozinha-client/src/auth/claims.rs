//! Local inspection of access-token claims
//!
//! The payload segment is decoded without checking the signature. This is a
//! convenience check that lets checkout fail fast on a malformed token; it is
//! not a security boundary and the backend stays the authority on whether a
//! token is valid.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Map, Value};

use crate::{ClientError, ClientResult};

/// Claims that carry the user identifier, in lookup order
const SUBJECT_CLAIMS: [&str; 3] = [
    "sub",
    "nameid",
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier",
];

/// Decodes the (unverified) payload of a JWT
pub fn decode_payload(token: &str) -> ClientResult<Map<String, Value>> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
        _ => return Err(ClientError::Auth("Token de acesso malformado".into())),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| ClientError::Auth("Token de acesso malformado".into()))?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(claims)) => Ok(claims),
        _ => Err(ClientError::Auth("Token de acesso malformado".into())),
    }
}

/// Returns the user identifier claim of the token
pub fn subject(token: &str) -> ClientResult<String> {
    let claims = decode_payload(token)?;
    SUBJECT_CLAIMS
        .iter()
        .find_map(|name| match claims.get(*name) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
        .ok_or_else(|| ClientError::Auth("Token sem identificação do usuário".into()))
}

#[cfg(test)]
pub(crate) fn encode_test_token(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.signature", header, payload)
}
