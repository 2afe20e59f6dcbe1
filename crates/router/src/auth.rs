use crate::route::Security;

/// Decides whether the current requester satisfies a route's security requirement.
#[cfg_attr(test, mockall::automock)]
pub trait Authorizer: Send + Sync {
    fn is_authorized(&self, security: &Security) -> bool;
}

/// A requester without a session: every secured route is refused.
#[derive(Debug, Default, Clone, Copy)]
pub struct Anonymous;

impl Authorizer for Anonymous {
    fn is_authorized(&self, _security: &Security) -> bool {
        false
    }
}
