//! Conflict policies.
//!
//! When a module that is already resolved is requested again at a different
//! version, the resolver asks its [`ConflictPolicy`] whether to keep the
//! resolved version or replace it.

use std::fmt;

/// Outcome of a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Keep the version already resolved.
    Keep,
    /// Switch to the newly requested version.
    Replace,
}

/// One side of a version conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request<'a> {
    pub version: &'a str,
    pub requestor: &'a str,
}

/// Decides between an already-resolved version and a new request.
pub trait ConflictPolicy: fmt::Debug {
    fn decide(&self, module: &str, resolved: Request<'_>, requested: Request<'_>) -> Decision;
}

/// Keep whichever version was resolved first.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreezeFirst;

impl ConflictPolicy for FreezeFirst {
    fn decide(&self, _module: &str, _resolved: Request<'_>, _requested: Request<'_>) -> Decision {
        Decision::Keep
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freeze_first_keeps() {
        let decision = FreezeFirst.decide(
            "zlib",
            Request {
                version: "1.0",
                requestor: "package.bru",
            },
            Request {
                version: "2.0",
                requestor: "libpng",
            },
        );
        assert_eq!(decision, Decision::Keep);
    }
}
