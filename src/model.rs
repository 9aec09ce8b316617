/// Outcome of a successful call to the generative model.
///
/// Transport and API failures are reported through the surrounding
/// `anyhow::Result`; this type only distinguishes whether the model
/// produced usable text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    Text(String),
    /// The call succeeded but returned no text, e.g. because the prompt or
    /// the candidate was blocked.
    Empty { reason: Option<String> },
}

impl Generation {
    pub fn empty(reason: Option<impl Into<String>>) -> Self {
        Self::Empty {
            reason: reason.map(Into::into),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Empty { .. } => None,
        }
    }
}
