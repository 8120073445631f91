/*
 * Responsibility
 * - GET /          (公開)
 * - GET /protected (bearer gate の後ろ。payload の first_name / last_name で挨拶する)
 */
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::api::extractors::JwtPayload;
use crate::services::auth::Claims;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Hello World".to_string(),
    })
}

pub async fn protected(JwtPayload(claims): JwtPayload) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: format!("Hello {}", full_name(&claims)),
    })
}

// 欠けている claim は飛ばす。文字列以外は JSON 表記のまま。
fn full_name(claims: &Claims) -> String {
    ["first_name", "last_name"]
        .iter()
        .filter_map(|name| match claims.get(name) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        })
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
