/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」(検証済み JWT payload) の extractor
 * - middleware::auth::bearer が request extensions に Claims を insert 済みである前提
 */
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::Claims;

/// 見つからない場合は gate が掛かっていないルートなので、クライアントの問題ではなく 500 を返す
pub struct JwtPayload(pub Claims);

impl<S> FromRequestParts<S> for JwtPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(JwtPayload)
            .ok_or_else(|| {
                tracing::error!(
                    uri = %parts.uri,
                    "JwtPayload requested on a route without the bearer gate"
                );
                AppError::Internal
            })
    }
}
