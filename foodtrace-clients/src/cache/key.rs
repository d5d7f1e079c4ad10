//! Request fingerprints for the response cache
//!
//! A fingerprint covers exactly the inputs that determine a response for a
//! given ingredient snapshot: the current user message, the model id and the
//! rendered context. Conversation history is not part of it, so identical
//! questions against identical data share an entry whatever came before.

use crate::cache::types::CacheKey;
use sha2::{Digest, Sha256};

/// Namespace prefix used unless configured otherwise
pub const DEFAULT_NAMESPACE: &str = "llm_cache";

/// ASCII unit separator between hashed fields
const FIELD_SEPARATOR: &[u8] = &[0x1f];

/// Derives namespaced SHA-256 fingerprints
#[derive(Debug, Clone)]
pub struct CacheKeyDeriver {
    namespace: String,
}

impl Default for CacheKeyDeriver {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl CacheKeyDeriver {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `<namespace>:<lowercase hex sha256(message 0x1f model 0x1f context)>`
    pub fn derive_key(&self, user_message: &str, model_id: &str, context: &str) -> CacheKey {
        let mut hasher = Sha256::new();
        hasher.update(user_message.as_bytes());
        hasher.update(FIELD_SEPARATOR);
        hasher.update(model_id.as_bytes());
        hasher.update(FIELD_SEPARATOR);
        hasher.update(context.as_bytes());

        format!("{}:{}", self.namespace, hex::encode(hasher.finalize()))
    }
}

/// Derive a key in the default namespace.
pub fn derive_key(user_message: &str, model_id: &str, context: &str) -> CacheKey {
    CacheKeyDeriver::default().derive_key(user_message, model_id, context)
}
