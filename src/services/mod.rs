/*
 * Responsibility
 * - HTTP に依存しないドメインロジック (認証 gate など)
 */
pub mod auth;
