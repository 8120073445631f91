//! Test fixtures: RSA key pairs and an RS256 token minter.
//!
//! `site_*` is the key pair the gate trusts; `rogue_*` is an unrelated pair.

use base64::{Engine, engine::general_purpose::STANDARD};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;

use super::AuthGate;

pub const SITE_URL: &str = "https://example.com";

pub const SITE_PRIVATE_PEM: &str = include_str!("../../../tests/fixtures/site_private.pem");
pub const SITE_PUBLIC_PEM: &str = include_str!("../../../tests/fixtures/site_public.pem");
pub const ROGUE_PRIVATE_PEM: &str = include_str!("../../../tests/fixtures/rogue_private.pem");
pub const ROGUE_PUBLIC_PEM: &str = include_str!("../../../tests/fixtures/rogue_public.pem");

pub fn site_public_key_base64() -> String {
    STANDARD.encode(SITE_PUBLIC_PEM)
}

pub fn rogue_public_key_base64() -> String {
    STANDARD.encode(ROGUE_PUBLIC_PEM)
}

/// Gate trusting the site key and expecting `SITE_URL`.
pub fn site_gate() -> AuthGate {
    AuthGate::new(&site_public_key_base64(), SITE_URL, 60).unwrap()
}

pub fn sign_rs256<T: Serialize>(claims: &T, private_pem: &str) -> String {
    let key = EncodingKey::from_rsa_pem(private_pem.as_bytes()).unwrap();
    let mut header = Header::new(Algorithm::RS256);
    header.typ = Some("JWT".to_string());
    jsonwebtoken::encode(&header, claims, &key).unwrap()
}

pub fn sign_with_site_key<T: Serialize>(claims: &T) -> String {
    sign_rs256(claims, SITE_PRIVATE_PEM)
}
