/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (401 は RFC 6750 の WWW-Authenticate + "Unauthorized" 本文、それ以外は JSON)
 * - 認証失敗 (AuthError) を challenge に変換する
 */
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::auth::AuthError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// `WWW-Authenticate: Bearer realm="...",error="...",error_description="..."`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerChallenge {
    pub realm: String,
    pub error: &'static str,
    pub error_description: &'static str,
}

impl BearerChallenge {
    pub fn new(realm: impl Into<String>, err: &AuthError) -> Self {
        Self {
            realm: realm.into(),
            error: err.error_code(),
            error_description: err.description(),
        }
    }

    pub fn header_value(&self) -> HeaderValue {
        let full = format!(
            "Bearer realm=\"{}\",error=\"{}\",error_description=\"{}\"",
            quote(&self.realm),
            self.error,
            self.error_description
        );

        // realm はリクエスト由来なので、ヘッダに載せられない場合は realm を落とす
        HeaderValue::from_str(&full).unwrap_or_else(|_| {
            let fallback = format!(
                "Bearer error=\"{}\",error_description=\"{}\"",
                self.error, self.error_description
            );
            HeaderValue::from_str(&fallback).unwrap_or(HeaderValue::from_static("Bearer"))
        })
    }
}

// quoted-string escape
fn quote(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized: {}", .0.error_description)]
    Unauthorized(BearerChallenge),
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn unauthorized(realm: impl Into<String>, err: &AuthError) -> Self {
        Self::Unauthorized(BearerChallenge::new(realm, err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthorized(challenge) => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, challenge.header_value())],
                "Unauthorized",
            )
                .into_response(),
            AppError::Internal => {
                let body = ErrorResponse {
                    error: ErrorBody {
                        code: "INTERNAL_SERVER_ERROR",
                        message: "internal server error".into(),
                    },
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}
