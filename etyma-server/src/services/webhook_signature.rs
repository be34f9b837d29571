//! Payment webhook signature verification
//!
//! The processor signs each delivery with a `Stripe-Signature` header of
//! the form `t=<unix seconds>,v1=<hex hmac>[,v1=<hex hmac>...]`. The HMAC is
//! SHA-256 over `"<t>.<raw body>"` keyed by the endpoint's webhook secret.
//! Several `v1` entries appear while a secret is being rolled; any match
//! is accepted.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature
pub const SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Malformed signature header")]
    MalformedHeader,

    #[error("No v1 signatures in header")]
    NoSignatures,

    #[error("Timestamp {timestamp} outside tolerance (now {now})")]
    TimestampOutsideTolerance { timestamp: i64, now: i64 },

    #[error("Signature mismatch")]
    Mismatch,

    #[error("Unusable webhook secret")]
    InvalidSecret,
}

/// Verify a webhook payload against its signature header
///
/// `now` is the current unix time in seconds; deliveries signed more than
/// `tolerance_secs` ago are rejected to limit replay.
pub fn verify(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
    tolerance_secs: i64,
) -> Result<(), SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    // Parts without `=` (stray commas, whitespace) are skipped
    for (key, value) in header.split(',').filter_map(|part| part.trim().split_once('=')) {
        match key {
            "t" => {
                timestamp = Some(
                    value
                        .parse::<i64>()
                        .map_err(|_| SignatureError::MalformedHeader)?,
                )
            }
            // Unknown schemes (v0, test markers) are ignored
            "v1" => {
                if let Ok(bytes) = hex::decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MalformedHeader)?;
    if signatures.is_empty() {
        return Err(SignatureError::NoSignatures);
    }

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::InvalidSecret)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    // verify_slice compares in constant time
    let matched = signatures
        .iter()
        .any(|expected| mac.clone().verify_slice(expected).is_ok());
    if !matched {
        return Err(SignatureError::Mismatch);
    }

    if timestamp < now - tolerance_secs {
        return Err(SignatureError::TimestampOutsideTolerance { timestamp, now });
    }

    Ok(())
}

/// Compute the hex `v1` signature for a payload
pub fn sign(payload: &[u8], secret: &str, timestamp: i64) -> Result<String, SignatureError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::InvalidSecret)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Build a complete signature header, as the processor would send it
pub fn signature_header(
    payload: &[u8],
    secret: &str,
    timestamp: i64,
) -> Result<String, SignatureError> {
    Ok(format!("t={},v1={}", timestamp, sign(payload, secret, timestamp)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const BODY: &[u8] = br#"{"id":"evt_1","type":"checkout.session.completed"}"#;
    const NOW: i64 = 1_760_000_000;

    #[test]
    fn test_valid_signature() {
        let header = signature_header(BODY, SECRET, NOW).unwrap();
        assert_eq!(verify(BODY, &header, SECRET, NOW, 300), Ok(()));
    }

    #[test]
    fn test_sign_is_deterministic() {
        let digest = sign(b"x", "key", 1).unwrap();
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, sign(b"x", "key", 1).unwrap());
        assert_ne!(digest, sign(b"x", "key", 2).unwrap());
    }

    #[test]
    fn test_tampered_body() {
        let header = signature_header(BODY, SECRET, NOW).unwrap();
        assert_eq!(
            verify(b"{\"id\":\"evt_2\"}", &header, SECRET, NOW, 300),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_wrong_secret() {
        let header = signature_header(BODY, "whsec_other", NOW).unwrap();
        assert_eq!(
            verify(BODY, &header, SECRET, NOW, 300),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_rolled_secret_second_signature_matches() {
        let header = format!(
            "t={},v1={},v1={}",
            NOW,
            sign(BODY, "whsec_old", NOW).unwrap(),
            sign(BODY, SECRET, NOW).unwrap()
        );
        assert_eq!(verify(BODY, &header, SECRET, NOW, 300), Ok(()));
    }

    #[test]
    fn test_stale_timestamp() {
        let header = signature_header(BODY, SECRET, NOW - 301).unwrap();
        assert_eq!(
            verify(BODY, &header, SECRET, NOW, 300),
            Err(SignatureError::TimestampOutsideTolerance {
                timestamp: NOW - 301,
                now: NOW
            })
        );
        let header = signature_header(BODY, SECRET, NOW - 300).unwrap();
        assert_eq!(verify(BODY, &header, SECRET, NOW, 300), Ok(()));
    }

    #[test]
    fn test_parts_without_equals_are_skipped() {
        let header = signature_header(BODY, SECRET, NOW).unwrap();
        for variant in [
            format!("{},", header),
            format!(", {}", header),
            header.replace(",", ",,"),
            format!("{},extra", header),
        ] {
            assert_eq!(verify(BODY, &variant, SECRET, NOW, 300), Ok(()), "{}", variant);
        }
    }

    #[test]
    fn test_malformed_headers() {
        assert_eq!(
            verify(BODY, "garbage", SECRET, NOW, 300),
            Err(SignatureError::MalformedHeader)
        );
        assert_eq!(
            verify(BODY, "v1=abcd", SECRET, NOW, 300),
            Err(SignatureError::MalformedHeader)
        );
        assert_eq!(
            verify(BODY, "t=notanumber,v1=abcd", SECRET, NOW, 300),
            Err(SignatureError::MalformedHeader)
        );
        assert_eq!(
            verify(BODY, &format!("t={},v0=abcd", NOW), SECRET, NOW, 300),
            Err(SignatureError::NoSignatures)
        );
    }
}
