/// Broad category of a [`PlotError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A named column is absent from the observation table.
    MissingColumn,
    /// A named variable is absent from the posterior.
    MissingVariable,
    /// A named row is absent from the summary table.
    MissingRow,
    /// Array or table dimensions do not line up.
    Shape,
    /// Out-of-range parameter or non-finite data.
    InvalidInput,
    /// The drawing backend failed.
    Render,
    /// Writing an export failed.
    Io,
}

#[derive(Clone)]
pub struct PlotError {
    kind: ErrorKind,
    message: String,
}

impl PlotError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub(crate) fn render(err: impl std::fmt::Display) -> Self {
        Self::new(ErrorKind::Render, format!("Chart rendering failed: {err}"))
    }
}

impl std::fmt::Display for PlotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for PlotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlotError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for PlotError {}
