/// Latch that lets exactly one completion through per armed countdown.
///
/// The latch closes when a completion begins and stays closed until the
/// machine arms a fresh countdown (start, switch, reset, clear, or a settings
/// change that reloads the clock). A second completion request for the same
/// zero crossing therefore finds the latch closed and is dropped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CompletionGuard {
    #[default]
    Open,
    Latched,
}

impl CompletionGuard {
    /// Close the latch. Returns `false` if it was already closed.
    pub fn try_acquire(&mut self) -> bool {
        match self {
            CompletionGuard::Open => {
                *self = CompletionGuard::Latched;
                true
            }
            CompletionGuard::Latched => false,
        }
    }

    pub fn release(&mut self) {
        *self = CompletionGuard::Open;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_refused_until_release() {
        let mut guard = CompletionGuard::default();
        assert!(guard.try_acquire());
        assert!(!guard.try_acquire());
        assert_eq!(guard, CompletionGuard::Latched);
        guard.release();
        assert!(guard.try_acquire());
    }
}
