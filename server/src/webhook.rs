//! Payment webhook signature verification.
//!
//! The provider signs `"{timestamp}.{body}"` with HMAC-SHA256 and sends
//! `Stripe-Signature: t=<unix>,v1=<hex>`. Several `v1` entries may appear
//! during secret rotation; any one matching is enough. Verification must
//! run against the raw request body, before JSON parsing.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature header is malformed")]
    Malformed,
    #[error("signature timestamp is outside the tolerance window")]
    Expired,
    #[error("signature does not match")]
    Mismatch,
}

pub fn verify(
    secret: &str,
    header: &str,
    body: &str,
    tolerance_secs: i64,
    now: DateTime<Utc>,
) -> Result<(), SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => {
                if let Ok(raw) = hex::decode(value) {
                    signatures.push(raw);
                }
            }
            _ => {}
        }
    }
    let timestamp = timestamp.ok_or(SignatureError::Malformed)?;
    if signatures.is_empty() {
        return Err(SignatureError::Malformed);
    }
    if (now.timestamp() - timestamp).abs() > tolerance_secs {
        return Err(SignatureError::Expired);
    }

    let payload = format!("{timestamp}.{body}");
    for candidate in signatures {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| SignatureError::Malformed)?;
        mac.update(payload.as_bytes());
        // verify_slice compares in constant time
        if mac.verify_slice(&candidate).is_ok() {
            return Ok(());
        }
    }
    Err(SignatureError::Mismatch)
}

#[cfg(test)]
pub(crate) fn sign(secret: &str, body: &str, at: DateTime<Utc>) -> String {
    let timestamp = at.timestamp();
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{timestamp}.{body}").as_bytes());
    format!(
        "t={},v1={}",
        timestamp,
        hex::encode(mac.finalize().into_bytes())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";
    const BODY: &str = r#"{"id":"evt_1"}"#;

    #[test]
    fn test_valid_signature_verifies() {
        let now = Utc::now();
        let header = sign(SECRET, BODY, now);
        assert_eq!(verify(SECRET, &header, BODY, 300, now), Ok(()));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let now = Utc::now();
        let header = sign("whsec_other", BODY, now);
        assert_eq!(
            verify(SECRET, &header, BODY, 300, now),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_tampered_body_rejected() {
        let now = Utc::now();
        let header = sign(SECRET, BODY, now);
        assert_eq!(
            verify(SECRET, &header, r#"{"id":"evt_2"}"#, 300, now),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let now = Utc::now();
        let header = sign(SECRET, BODY, now - chrono::Duration::seconds(301));
        assert_eq!(
            verify(SECRET, &header, BODY, 300, now),
            Err(SignatureError::Expired)
        );
        // Future-dated timestamps are just as suspect
        let header = sign(SECRET, BODY, now + chrono::Duration::seconds(400));
        assert_eq!(
            verify(SECRET, &header, BODY, 300, now),
            Err(SignatureError::Expired)
        );
    }

    #[test]
    fn test_malformed_headers_rejected() {
        let now = Utc::now();
        assert_eq!(
            verify(SECRET, "", BODY, 300, now),
            Err(SignatureError::Malformed)
        );
        assert_eq!(
            verify(SECRET, "t=notanumber,v1=abcd", BODY, 300, now),
            Err(SignatureError::Malformed)
        );
        assert_eq!(
            verify(SECRET, &format!("t={}", now.timestamp()), BODY, 300, now),
            Err(SignatureError::Malformed)
        );
        // Garbage hex in v1 leaves no usable signature
        assert_eq!(
            verify(
                SECRET,
                &format!("t={},v1=zzzz", now.timestamp()),
                BODY,
                300,
                now
            ),
            Err(SignatureError::Malformed)
        );
    }

    #[test]
    fn test_rotated_secret_second_signature_accepted() {
        let now = Utc::now();
        let stale = sign("whsec_old", BODY, now);
        let fresh = sign(SECRET, BODY, now);
        let v1 = fresh.split("v1=").nth(1).unwrap();
        let header = format!("{stale},v1={v1}");
        assert_eq!(verify(SECRET, &header, BODY, 300, now), Ok(()));
    }
}
