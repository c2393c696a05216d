//! Compile configuration.

/// How instance thunks treat their receiver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ReceiverPolicy {
    /// Cast the receiver to the declaring type before the member runs, so a
    /// receiver of the wrong type fails with an invalid-cast error up front.
    #[default]
    Checked,
    /// Pass the receiver through unchecked. A wrong receiver is still
    /// rejected, but only when the member body or field access touches it.
    Trusted,
}

/// Configuration for the thunk compilers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileConfig {
    /// Receiver handling for instance methods and instance fields.
    /// Defaults to [`ReceiverPolicy::Checked`].
    pub receiver: ReceiverPolicy,
}

impl CompileConfig {
    /// Create a config with the specified receiver policy.
    pub fn with_receiver(receiver: ReceiverPolicy) -> Self {
        Self { receiver }
    }

    pub(crate) fn casts_receiver(self) -> bool {
        self.receiver == ReceiverPolicy::Checked
    }
}

#[cfg(test)]
mod tests;
