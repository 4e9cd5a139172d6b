#![forbid(unsafe_code)]

use std::collections::HashMap;

/// A resolved calling principal. The identity provider itself (session
/// handling, token verification) is an external collaborator; the engine
/// only consumes the resolved result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub token_identifier: String,
    pub display_name: String,
}

pub trait IdentitySource {
    /// None means the principal could not be authenticated.
    fn resolve(&self, principal: &str) -> Option<Identity>;
}

/// Fixed principal → identity table, for embedding and tests.
#[derive(Clone, Debug, Default)]
pub struct StaticIdentitySource {
    identities: HashMap<String, Identity>,
}

impl StaticIdentitySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, principal: impl Into<String>, name: impl Into<String>) {
        let principal = principal.into();
        let identity = Identity {
            token_identifier: format!("token:{principal}"),
            display_name: name.into(),
        };
        self.identities.insert(principal, identity);
    }
}

impl IdentitySource for StaticIdentitySource {
    fn resolve(&self, principal: &str) -> Option<Identity> {
        self.identities.get(principal).cloned()
    }
}
