//! Formatting error types.

/// Internal formatting failure.
///
/// Malformed markup never produces an error; the tokenizer degrades in place.
/// The only error condition is a violated tokenizer invariant, and the
/// pipeline recovers from it by stripping markup instead of escaping.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FormatError {
    /// The tokenizer tried to save an enclosing state while the save slot
    /// was already occupied. Link sub-states never nest, so this cannot be
    /// reached through any input.
    #[error("tokenizer save slot already occupied at character {offset}")]
    SaveSlotOccupied {
        /// Character offset at which the collision was detected.
        offset: usize,
    },
}
