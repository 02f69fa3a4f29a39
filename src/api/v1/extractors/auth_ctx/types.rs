/*
 * Responsibility
 * - The authenticated context handlers see
 * - Inserted into request extensions by the authorize middleware on Allow
 */
use std::sync::Arc;

use crate::services::authz::{AuthoritySet, SessionId};

#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub session_id: SessionId,
    pub authorities: Arc<AuthoritySet>,
}

impl AuthCtx {
    pub fn new(session_id: SessionId, authorities: Arc<AuthoritySet>) -> Self {
        Self {
            session_id,
            authorities,
        }
    }
}
