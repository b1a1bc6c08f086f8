/// Issue token of one asynchronous check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ValidationToken(u64);

/// Monotonic counter for one kind of check.
///
/// A result is applied only while its token is still the latest issued;
/// anything older is stale.
#[derive(Debug, Default)]
pub(crate) struct IssueCounter {
    latest: u64,
}

impl IssueCounter {
    pub(crate) fn issue(&mut self) -> ValidationToken {
        self.latest += 1;
        ValidationToken(self.latest)
    }

    /// Make every outstanding token stale without issuing a call.
    pub(crate) fn invalidate(&mut self) {
        self.latest += 1;
    }

    pub(crate) fn is_current(&self, token: ValidationToken) -> bool {
        token.0 == self.latest
    }
}

/// Counters for each check kind
#[derive(Debug, Default)]
pub(crate) struct IssueTokens {
    pub(crate) name: IssueCounter,
    pub(crate) credentials: IssueCounter,
    pub(crate) projects: IssueCounter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_is_current() {
        let mut counter = IssueCounter::default();
        let first = counter.issue();
        let second = counter.issue();

        assert!(first < second);
        assert!(!counter.is_current(first));
        assert!(counter.is_current(second));
    }

    #[test]
    fn test_invalidate_stales_outstanding() {
        let mut counter = IssueCounter::default();
        let token = counter.issue();
        counter.invalidate();
        assert!(!counter.is_current(token));

        let next = counter.issue();
        assert!(counter.is_current(next));
    }
}
