//! Bearer JWT gate (FramerAuth)
//!
//! 1. `Authorization` ヘッダから credential を取り出す
//! 2. RS256 で署名検証 (exp/nbf は載っていれば検証)
//! 3. `aud` が期待するサイト URL と完全一致するか確認
//!
//! 最初に失敗したところで止める。gate 自身はログも I/O も行わない (ログは middleware 側)。

use axum::http::{HeaderMap, header};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use thiserror::Error;

use super::claims::Claims;
use super::key::{self, PublicKeyError};

/// gate が返す per-request の失敗
///
/// 署名不正と `aud` 不一致はどちらも `InvalidToken` で、クライアントからは区別できない。
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no authorization included in request")]
    MissingCredentials,

    #[error("invalid credentials structure")]
    MalformedCredentials,

    /// `cause` はログ用。レスポンスには載せない。
    #[error("token verification failure")]
    InvalidToken {
        #[source]
        cause: Option<jsonwebtoken::errors::Error>,
    },
}

impl AuthError {
    /// RFC 6750 の `error` パラメータ
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingCredentials | Self::MalformedCredentials => "invalid_request",
            Self::InvalidToken { .. } => "invalid_token",
        }
    }

    /// RFC 6750 の `error_description` パラメータ
    pub fn description(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "no authorization included in request",
            Self::MalformedCredentials => "invalid credentials structure",
            Self::InvalidToken { .. } => "token verification failure",
        }
    }
}

/// `Authorization: <scheme> <token>` から token 部分を取り出す。
///
/// - ヘッダなし (または空白のみ) → `MissingCredentials`
/// - 空白区切りでちょうど 2 つにならない → `MalformedCredentials`
/// - 2 つに分かれたが token が ASCII でない → `InvalidToken` (JWT になり得ない)
///
/// scheme の文字列自体は見ない。分割は生のバイト列に対して行う。
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .as_bytes();

    let mut parts = value
        .split(|b| b.is_ascii_whitespace())
        .filter(|part| !part.is_empty());

    match (parts.next(), parts.next(), parts.next()) {
        (None, _, _) => Err(AuthError::MissingCredentials),
        (Some(_scheme), Some(token), None) => std::str::from_utf8(token)
            .ok()
            .filter(|token| token.is_ascii())
            .ok_or(AuthError::InvalidToken { cause: None }),
        _ => Err(AuthError::MalformedCredentials),
    }
}

/// RS256 access-token gate for a single site.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct AuthGate {
    decoding_key: DecodingKey,
    validation: Validation,
    audience: String,
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("AuthGate")
            .field("audience", &self.audience)
            .field("validation", &self.validation)
            .finish()
    }
}

impl AuthGate {
    /// `public_key_base64` は PEM を base64 で包んだもの (FRAMERAUTH_PUBLIC_KEY の形式)
    pub fn new(
        public_key_base64: &str,
        audience: impl Into<String>,
        leeway_seconds: u64,
    ) -> Result<Self, PublicKeyError> {
        let pem = key::decode_pem(public_key_base64)?;
        Self::from_pem(&pem, audience, leeway_seconds)
    }

    pub fn from_pem(
        public_key_pem: &str,
        audience: impl Into<String>,
        leeway_seconds: u64,
    ) -> Result<Self, PublicKeyError> {
        let decoding_key = key::rsa_decoding_key(public_key_pem)?;

        let mut validation = Validation::new(Algorithm::RS256);
        // exp/nbf は任意 (載っていれば検証する)
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        validation.validate_nbf = true;
        // aud は decode 後に完全一致で比較する
        validation.validate_aud = false;
        validation.leeway = leeway_seconds;

        Ok(Self {
            decoding_key,
            validation,
            audience: audience.into(),
        })
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// ヘッダ抽出 → 署名検証 → aud チェック
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Claims, AuthError> {
        let token = extract_bearer(headers)?;
        self.verify(token)
    }

    /// Verify signature/time claims, then the audience.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::InvalidToken { cause: Some(e) })?;

        // Validation は iat を見ないので、未来に発行されたトークンはここで落とす
        if self.issued_in_future(&data.claims) {
            return Err(AuthError::InvalidToken { cause: None });
        }

        if data.claims.aud() != Some(self.audience.as_str()) {
            return Err(AuthError::InvalidToken { cause: None });
        }

        Ok(data.claims)
    }

    fn issued_in_future(&self, claims: &Claims) -> bool {
        let latest = jsonwebtoken::get_current_timestamp().saturating_add(self.validation.leeway);
        claims
            .get("iat")
            .and_then(serde_json::Value::as_f64)
            .is_some_and(|iat| iat > latest as f64)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use jsonwebtoken::errors::ErrorKind;
    use jsonwebtoken::{EncodingKey, Header, get_current_timestamp};
    use serde_json::{Value, json};

    use super::*;
    use crate::services::auth::testing::{
        ROGUE_PRIVATE_PEM, SITE_PUBLIC_PEM, SITE_URL, rogue_public_key_base64, sign_rs256,
        sign_with_site_key, site_gate,
    };

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    fn ada(aud: &str) -> Value {
        json!({"aud": aud, "first_name": "Ada", "last_name": "Lovelace"})
    }

    #[test]
    fn missing_header_is_missing_credentials() {
        let err = extract_bearer(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));
        assert_eq!(err.error_code(), "invalid_request");
    }

    #[test]
    fn blank_header_is_missing_credentials() {
        let err = extract_bearer(&headers_with("")).unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));
    }

    #[test]
    fn wrong_part_count_is_malformed() {
        for value in ["Bearer", "abc", "Token abc def", "Bearer a b c d"] {
            let err = extract_bearer(&headers_with(value)).unwrap_err();
            assert!(
                matches!(err, AuthError::MalformedCredentials),
                "{value:?} should be malformed"
            );
            assert_eq!(err.error_code(), "invalid_request");
        }
    }

    #[test]
    fn non_ascii_token_is_invalid_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xfftoken").unwrap(),
        );
        let err = extract_bearer(&headers).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { cause: None }));
        assert_eq!(err.error_code(), "invalid_token");
    }

    #[test]
    fn non_ascii_header_with_wrong_part_count_is_malformed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xe9abc extra").unwrap(),
        );
        assert!(matches!(
            extract_bearer(&headers),
            Err(AuthError::MalformedCredentials)
        ));
    }

    #[test]
    fn second_part_is_the_token() {
        assert_eq!(extract_bearer(&headers_with("Bearer abc")).unwrap(), "abc");
        assert_eq!(extract_bearer(&headers_with("Bearer\tabc")).unwrap(), "abc");
        // scheme is not inspected
        assert_eq!(extract_bearer(&headers_with("Token abc")).unwrap(), "abc");
    }

    #[test]
    fn valid_token_yields_exact_payload() {
        let payload = json!({
            "aud": SITE_URL,
            "first_name": "Ada",
            "last_name": "Lovelace",
            "sub": "user_123",
            "plan": {"tier": "pro", "seats": 3}
        });
        let token = sign_with_site_key(&payload);

        let claims = site_gate().authenticate(&bearer(&token)).unwrap();

        assert_eq!(serde_json::to_value(&claims).unwrap(), payload);
    }

    #[test]
    fn verifying_twice_yields_same_claims() {
        let gate = site_gate();
        let token = sign_with_site_key(&ada(SITE_URL));

        let first = gate.verify(&token).unwrap();
        let second = gate.verify(&token).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn wrong_audience_is_invalid_token_without_cause() {
        let token = sign_with_site_key(&ada("https://other.com"));

        let err = site_gate().authenticate(&bearer(&token)).unwrap_err();

        assert!(matches!(err, AuthError::InvalidToken { cause: None }));
        assert_eq!(err.error_code(), "invalid_token");
    }

    #[test]
    fn missing_or_array_audience_is_invalid_token() {
        let gate = site_gate();

        let no_aud = sign_with_site_key(&json!({"first_name": "Ada"}));
        assert!(matches!(
            gate.verify(&no_aud),
            Err(AuthError::InvalidToken { cause: None })
        ));

        let array_aud = sign_with_site_key(&json!({"aud": [SITE_URL]}));
        assert!(matches!(
            gate.verify(&array_aud),
            Err(AuthError::InvalidToken { .. })
        ));
    }

    #[test]
    fn foreign_signature_is_invalid_token_with_cause() {
        let token = sign_rs256(&ada(SITE_URL), ROGUE_PRIVATE_PEM);

        let err = site_gate().verify(&token).unwrap_err();

        match err {
            AuthError::InvalidToken { cause: Some(cause) } => {
                assert!(matches!(cause.kind(), ErrorKind::InvalidSignature));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn bad_signature_and_wrong_audience_look_the_same() {
        let gate = site_gate();
        let forged = gate
            .verify(&sign_rs256(&ada(SITE_URL), ROGUE_PRIVATE_PEM))
            .unwrap_err();
        let other_site = gate
            .verify(&sign_with_site_key(&ada("https://other.com")))
            .unwrap_err();

        assert_eq!(forged.error_code(), other_site.error_code());
        assert_eq!(forged.description(), other_site.description());
        assert_eq!(forged.to_string(), other_site.to_string());
    }

    #[test]
    fn garbage_token_is_invalid_token() {
        let gate = site_gate();
        for token in ["abc", "a.b.c", ""] {
            assert!(matches!(
                gate.verify(token),
                Err(AuthError::InvalidToken { cause: Some(_) })
            ));
        }
    }

    #[test]
    fn hmac_token_is_rejected() {
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &ada(SITE_URL),
            &EncodingKey::from_secret(SITE_PUBLIC_PEM.as_bytes()),
        )
        .unwrap();

        let err = site_gate().verify(&token).unwrap_err();
        match err {
            AuthError::InvalidToken { cause: Some(cause) } => {
                assert!(matches!(cause.kind(), ErrorKind::InvalidAlgorithm));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut payload = ada(SITE_URL);
        payload["exp"] = json!(get_current_timestamp() - 3600);

        let err = site_gate()
            .verify(&sign_with_site_key(&payload))
            .unwrap_err();
        match err {
            AuthError::InvalidToken { cause: Some(cause) } => {
                assert!(matches!(cause.kind(), ErrorKind::ExpiredSignature));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn not_yet_valid_token_is_rejected() {
        let mut payload = ada(SITE_URL);
        payload["nbf"] = json!(get_current_timestamp() + 3600);

        let err = site_gate()
            .verify(&sign_with_site_key(&payload))
            .unwrap_err();
        match err {
            AuthError::InvalidToken { cause: Some(cause) } => {
                assert!(matches!(cause.kind(), ErrorKind::ImmatureSignature));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn future_iat_is_rejected() {
        let mut payload = ada(SITE_URL);
        payload["iat"] = json!(get_current_timestamp() + 3600);

        let err = site_gate()
            .verify(&sign_with_site_key(&payload))
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { cause: None }));
    }

    #[test]
    fn past_iat_within_leeway_is_accepted() {
        let gate = site_gate();

        let mut issued = ada(SITE_URL);
        issued["iat"] = json!(get_current_timestamp() - 60);
        assert!(gate.verify(&sign_with_site_key(&issued)).is_ok());

        // clock skew up to the leeway is tolerated
        let mut skewed = ada(SITE_URL);
        skewed["iat"] = json!(get_current_timestamp() + 10);
        assert!(gate.verify(&sign_with_site_key(&skewed)).is_ok());
    }

    #[test]
    fn unexpired_token_is_accepted() {
        let mut payload = ada(SITE_URL);
        payload["exp"] = json!(get_current_timestamp() + 3600);

        assert!(site_gate().verify(&sign_with_site_key(&payload)).is_ok());
    }

    #[test]
    fn gates_with_distinct_keys_and_audiences_coexist() {
        let site = site_gate();
        let rogue = AuthGate::new(&rogue_public_key_base64(), "https://other.com", 60).unwrap();

        let site_token = sign_with_site_key(&ada(SITE_URL));
        let rogue_token = sign_rs256(&ada("https://other.com"), ROGUE_PRIVATE_PEM);

        assert!(site.verify(&site_token).is_ok());
        assert!(rogue.verify(&rogue_token).is_ok());
        assert!(site.verify(&rogue_token).is_err());
        assert!(rogue.verify(&site_token).is_err());
        assert_eq!(rogue.audience(), "https://other.com");
    }

    #[test]
    fn malformed_key_fails_construction() {
        assert!(AuthGate::new("", SITE_URL, 60).is_err());
        assert!(AuthGate::new("%%%", SITE_URL, 60).is_err());
        assert!(AuthGate::from_pem("not a pem", SITE_URL, 60).is_err());
    }

    #[test]
    fn debug_output_hides_key_material() {
        let rendered = format!("{:?}", site_gate());
        assert!(rendered.contains("AuthGate"));
        assert!(!rendered.contains("BEGIN PUBLIC KEY"));
    }
}
