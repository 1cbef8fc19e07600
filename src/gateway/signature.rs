//! Payment signature verification
//!
//! The gateway signs `"{order_id}|{payment_id}"` with the merchant secret
//! (HMAC-SHA256, hex). Recomputing that signature server-side and comparing
//! it in constant time is the sole authority for marking an order paid.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub fn payment_signature(order_id: &str, payment_id: &str, secret: &str) -> String {
    // HMAC-SHA256 accepts keys of any length.
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac key");
    mac.update(format!("{order_id}|{payment_id}").as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

pub fn verify_payment_signature(order_id: &str, payment_id: &str, supplied: &str, secret: &str) -> bool {
    constant_time_eq(&payment_signature(order_id, payment_id, secret), supplied)
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() { return false; }
    let mut res = 0u8;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) { res |= x ^ y; }
    res == 0
}
