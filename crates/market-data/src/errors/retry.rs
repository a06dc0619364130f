/// Classification for retry policy.
///
/// Used to determine how [`RetryPolicy`](crate::RetryPolicy) and the sourcing
/// pipeline respond to errors from providers.
///
/// | Class | Call same provider again? | Try next provider? |
/// |-------|---------------------------|--------------------|
/// | `WithBackoff` | Yes, after a growing delay | Once attempts run out |
/// | `NextProvider` | No | Yes |
/// | `Never` | No | Yes |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// The request is invalid for this provider (unknown symbol, malformed payload).
    Never,

    /// Transient network failure, timeout or rate limit.
    WithBackoff,

    /// The provider refused or had no data, another provider might succeed.
    NextProvider,
}

impl RetryClass {
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::WithBackoff)
    }
}
