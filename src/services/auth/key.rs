//! FramerAuth 公開鍵の読み込み
//!
//! 設定値は「PEM を base64 でさらに包んだ文字列」なので、
//! base64 → UTF-8 (PEM テキスト) → `DecodingKey` の順に戻す。
//! どこで失敗しても起動時エラー (ConfigError) として扱い、リクエスト処理までは進ませない。

use base64::{Engine, engine::general_purpose::STANDARD};
use jsonwebtoken::DecodingKey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublicKeyError {
    #[error("public key is empty")]
    Empty,
    #[error("public key is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("decoded public key is not UTF-8 text: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("decoded public key is not an RSA public key PEM: {0}")]
    Pem(#[from] jsonwebtoken::errors::Error),
}

/// base64 文字列 → PEM テキスト
pub fn decode_pem(public_key_base64: &str) -> Result<String, PublicKeyError> {
    // env ファイルで折り返された値も受け付ける
    let compact: String = public_key_base64
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if compact.is_empty() {
        return Err(PublicKeyError::Empty);
    }

    let bytes = STANDARD.decode(compact.as_bytes())?;
    Ok(String::from_utf8(bytes)?)
}

/// PEM テキスト → RS256 検証用の `DecodingKey`
pub fn rsa_decoding_key(pem: &str) -> Result<DecodingKey, PublicKeyError> {
    if pem.trim().is_empty() {
        return Err(PublicKeyError::Empty);
    }
    Ok(DecodingKey::from_rsa_pem(pem.as_bytes())?)
}
