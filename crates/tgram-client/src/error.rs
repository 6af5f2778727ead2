//! Delivery error types.

/// A failed send attempt.
///
/// Transport failures and API rejections are unified here: the delivery
/// cascade treats either as the signal to demote the formatting tier. The
/// distinction still matters one level down, where transport failures may be
/// retried with the same payload and rejections never are.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SendFailure {
    /// The request never produced an HTTP response (connect failure,
    /// timeout, broken stream).
    #[error("transport error: {message}")]
    Transport {
        /// Human-readable cause.
        message: String,
    },

    /// The API received the payload and declined it.
    #[error("API rejection ({status}): {description}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Description from the API error envelope.
        description: String,
    },
}

impl SendFailure {
    /// Whether this failure happened below the HTTP layer.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

impl From<ureq::Error> for SendFailure {
    fn from(err: ureq::Error) -> Self {
        Self::Transport {
            message: err.to_string(),
        }
    }
}
