use std::collections::HashSet;

/// Result of an access control check.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AccessResult {
    /// Client may be served.
    Allow,
    /// Client is on the deny list.
    Deny,
    /// Restriction is on and the client is not on a non-empty allow list.
    Restrict,
}

/// Static allow/deny lists for the time server.
///
/// Client addresses are compared as exact strings (`"10.0.0.1"`), no
/// prefix or wildcard matching. Evaluation order is fixed:
///
/// 1. A client on the deny list is rejected, even if it is also allowed.
/// 2. With `restrict_queries` on and a non-empty allow list, only listed
///    clients are served.
/// 3. With `restrict_queries` on and an empty allow list, everyone is served.
/// 4. Otherwise everyone is served.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AccessRules {
    restrict_queries: bool,
    allowed: HashSet<String>,
    denied: HashSet<String>,
}

impl AccessRules {
    /// Create rules from a restriction toggle and the two client lists.
    pub fn new<A, D>(restrict_queries: bool, allowed: A, denied: D) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        AccessRules {
            restrict_queries,
            allowed: allowed.into_iter().map(Into::into).collect(),
            denied: denied.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the allow list is enforced.
    pub fn restrict_queries(&self) -> bool {
        self.restrict_queries
    }

    /// Clients on the allow list.
    pub fn allowed(&self) -> &HashSet<String> {
        &self.allowed
    }

    /// Clients on the deny list.
    pub fn denied(&self) -> &HashSet<String> {
        &self.denied
    }

    /// Classify `client` against the rules.
    pub fn check(&self, client: &str) -> AccessResult {
        // Deny list checked first.
        if self.denied.contains(client) {
            return AccessResult::Deny;
        }
        if self.restrict_queries && !self.allowed.is_empty() && !self.allowed.contains(client) {
            return AccessResult::Restrict;
        }
        AccessResult::Allow
    }

    /// Shorthand for [`is_allowed`] with these rules.
    pub fn is_allowed(&self, client: &str) -> bool {
        is_allowed(client, self)
    }
}

/// Whether `client` may be served under `rules`.
pub fn is_allowed(client: &str, rules: &AccessRules) -> bool {
    rules.check(client) == AccessResult::Allow
}
