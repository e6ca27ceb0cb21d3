//! Razorpay checkout signatures: lowercase hex HMAC-SHA256 of
//! `{order_id}|{payment_id}` under the key secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

pub fn sign(order_id: &str, payment_id: &str, secret: &str) -> String {
    // HMAC accepts keys of any length, so this cannot fail.
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(format!("{order_id}|{payment_id}").as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time comparison against the expected signature. Anything that is
/// not 64 hex characters is rejected before comparing.
pub fn verify(order_id: &str, payment_id: &str, signature: &str, secret: &str) -> bool {
    let signature = signature.trim().to_ascii_lowercase();
    if signature.len() != 64 || !signature.bytes().all(|b| b.is_ascii_hexdigit()) {
        return false;
    }
    let expected = sign(order_id, payment_id, secret);
    bool::from(expected.as_bytes().ct_eq(signature.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-gateway-secret";

    #[test]
    fn test_known_vector() {
        // echo -n "order_1|pay_1" | openssl dgst -sha256 -hmac "secret"
        assert_eq!(
            sign("order_1", "pay_1", "secret"),
            "52115a0d3400de9e86aade1f1b6eba9e8974604f4e267a9e9a16633a4c8dd2cb"
        );
    }

    #[test]
    fn test_accepts_correct_signature() {
        let sig = sign("order_abc", "pay_xyz", SECRET);
        assert!(verify("order_abc", "pay_xyz", &sig, SECRET));
        assert!(verify("order_abc", "pay_xyz", &sig.to_uppercase(), SECRET));
    }

    #[test]
    fn test_rejects_forged_signature() {
        let forged = sign("order_abc", "pay_xyz", "attacker-secret");
        assert!(!verify("order_abc", "pay_xyz", &forged, SECRET));
    }

    #[test]
    fn test_rejects_signature_for_another_order() {
        let sig = sign("order_other", "pay_xyz", SECRET);
        assert!(!verify("order_abc", "pay_xyz", &sig, SECRET));
    }

    #[test]
    fn test_rejects_malformed_signature() {
        assert!(!verify("order_abc", "pay_xyz", "", SECRET));
        assert!(!verify("order_abc", "pay_xyz", "not-hex", SECRET));
        let sig = sign("order_abc", "pay_xyz", SECRET);
        assert!(!verify("order_abc", "pay_xyz", &sig[..63], SECRET));
        let mut bad = sig.clone();
        bad.replace_range(0..1, "z");
        assert!(!verify("order_abc", "pay_xyz", &bad, SECRET));
    }
}
