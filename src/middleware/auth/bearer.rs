//! Bearer JWT (FramerAuth) 検証 → Claims を extensions に入れる
//!
//! - 検証そのものは `AuthGate::authenticate` (HTTP フレームワーク非依存) に任せる
//! - ここでは「失敗 → 401 + WWW-Authenticate」「成功 → extensions に Claims」の配線だけを行う
//! - gate はログを出さないので、拒否理由 (cause 含む) はここで warn に残す

use std::error::Error as _;

use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::{HeaderMap, Request, Uri, header},
    middleware::{self, Next},
    response::Response,
};
use url::Url;

use crate::error::AppError;
use crate::state::AppState;

/// 保護したいルートだけを持つ Router に gate を掛ける。
///
/// `route_layer` なので、マッチしないパスは 401 ではなく 404 のまま。
///
/// ```ignore
/// let protected = Router::new().route("/protected", get(protected));
/// let protected = middleware::auth::bearer::apply(protected, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(state, bearer_middleware))
}

async fn bearer_middleware(
    State(state): State<AppState>,
    OriginalUri(original_uri): OriginalUri,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let claims = match state.auth.authenticate(req.headers()) {
        Ok(claims) => claims,
        Err(err) => {
            let realm = request_url(
                state.public_base_url.as_ref(),
                req.headers(),
                &original_uri,
            );
            tracing::warn!(
                error = %err,
                cause = ?err.source(),
                realm = %realm,
                "bearer authentication failed"
            );
            return Err(AppError::unauthorized(realm, &err));
        }
    };

    tracing::debug!(sub = claims.get_str("sub"), "bearer authentication succeeded");

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// リクエスト自身の URL (challenge の realm 用)
///
/// 優先順位:
/// 1. PUBLIC_BASE_URL + path/query (base の path はプレフィックスとして残す)
/// 2. 絶対形式の URI
/// 3. http://<Host> + path/query
/// 4. URI そのまま
fn request_url(base: Option<&Url>, headers: &HeaderMap, uri: &Uri) -> String {
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

    if let Some(base) = base {
        // Url::join は使わない (プレフィックスが消える / `//host` が別ホストとして解決される)
        return format!(
            "{}{}{}",
            base.origin().ascii_serialization(),
            base.path().trim_end_matches('/'),
            path_and_query
        );
    }

    if uri.scheme().is_some() {
        return uri.to_string();
    }

    match headers.get(header::HOST).and_then(|v| v.to_str().ok()) {
        Some(host) => format!("http://{host}{path_and_query}"),
        None => uri.to_string(),
    }
}
