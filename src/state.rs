/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - auth: 起動時に一度だけ組み立てた AuthGate (公開鍵 + 期待する aud、以後 read-only)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use url::Url;

use crate::services::auth::AuthGate;

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<AuthGate>,
    pub public_base_url: Option<Url>,
}

impl AppState {
    pub fn new(auth: Arc<AuthGate>, public_base_url: Option<Url>) -> Self {
        Self {
            auth,
            public_base_url,
        }
    }
}
