/*!
 * Authentication context extractor
 *
 * - types: AuthCtx (plain data)
 * - core: axum extractor
 */

mod core;
mod types;

pub use core::AuthCtxExtractor;
pub use types::AuthCtx;
