//! Session codec
//!
//! Decides what the session layer stores for an authenticated identity.
//! Nothing is persisted; the record only lives for the callback request.

use super::identity::Identity;

/// Converts identities to and from the session record
pub trait SessionCodec: Send + Sync {
    fn serialize(&self, identity: Identity) -> Identity;

    fn deserialize(&self, record: Identity) -> Identity;
}

/// Stores and restores the full identity verbatim
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughCodec;

impl SessionCodec for PassThroughCodec {
    fn serialize(&self, identity: Identity) -> Identity {
        identity
    }

    fn deserialize(&self, record: Identity) -> Identity {
        record
    }
}
