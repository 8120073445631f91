/*
 * Responsibility
 * - URL 構造を定義
 * - bearer gate が必要な範囲 (/protected) だけに route_layer で掛ける
 */
use axum::{Router, routing::get};

use crate::api::handlers::{
    health::health,
    hello::{protected, root},
};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let gated = Router::new().route("/protected", get(protected));
    let gated = middleware::auth::bearer::apply(gated, state);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(gated)
}
