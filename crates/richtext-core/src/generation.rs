//! Generation tokens for discarding stale sanitization results.

/// Identifier minted once per content change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenerationToken(u64);

/// Tracks which token, if any, may still commit.
///
/// Every content change mints a new token and makes the previous one stale
/// immediately. Once retired (on unmount) no token is ever current again.
#[derive(Debug, Default)]
pub struct GenerationGuard {
    next: u64,
    current: Option<GenerationToken>,
    retired: bool,
}

impl GenerationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh token and mark it current.
    ///
    /// After [`retire`](Self::retire) the returned token is never current.
    pub fn mint(&mut self) -> GenerationToken {
        self.next += 1;
        let token = GenerationToken(self.next);
        if !self.retired {
            self.current = Some(token);
        }
        token
    }

    /// Whether a result produced under `token` may be committed.
    pub fn is_current(&self, token: GenerationToken) -> bool {
        !self.retired && self.current == Some(token)
    }

    /// The current token, if the guard is still live.
    pub fn current(&self) -> Option<GenerationToken> {
        if self.retired { None } else { self.current }
    }

    /// Permanently kill the current token.
    pub fn retire(&mut self) {
        self.retired = true;
        self.current = None;
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_strictly_increase() {
        let mut guard = GenerationGuard::new();
        let a = guard.mint();
        let b = guard.mint();
        let c = guard.mint();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_only_latest_is_current() {
        let mut guard = GenerationGuard::new();
        let first = guard.mint();
        assert!(guard.is_current(first));

        let second = guard.mint();
        assert!(!guard.is_current(first));
        assert!(guard.is_current(second));
        assert_eq!(guard.current(), Some(second));
    }

    #[test]
    fn test_retire_kills_current() {
        let mut guard = GenerationGuard::new();
        let token = guard.mint();
        guard.retire();

        assert!(guard.is_retired());
        assert!(!guard.is_current(token));
        assert_eq!(guard.current(), None);

        // Minting after teardown never revives the guard
        let late = guard.mint();
        assert!(!guard.is_current(late));
    }

    #[test]
    fn test_fresh_guard_has_no_current() {
        let guard = GenerationGuard::new();
        assert_eq!(guard.current(), None);
        assert!(!guard.is_retired());
    }
}
