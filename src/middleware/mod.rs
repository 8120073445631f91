/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth::bearer (保護ルート用), cors / http (全ルート共通)
 */
pub mod auth;
pub mod cors;
pub mod http;
