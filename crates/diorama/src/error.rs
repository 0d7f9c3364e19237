use gpu::RenderError;
use scene::UnknownSeason;

#[derive(Debug)]
pub enum DioramaError {
    /// A host element the diorama needs is absent (canvas, context, label root).
    MissingElement(String),
    Config(String),
    UnknownSeason(String),
    Render(String),
}

impl std::fmt::Display for DioramaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DioramaError::MissingElement(what) => write!(f, "missing element: {what}"),
            DioramaError::Config(msg) => write!(f, "config error: {msg}"),
            DioramaError::UnknownSeason(name) => write!(f, "unknown season: {name:?}"),
            DioramaError::Render(msg) => write!(f, "render error: {msg}"),
        }
    }
}

impl std::error::Error for DioramaError {}

impl From<UnknownSeason> for DioramaError {
    fn from(err: UnknownSeason) -> Self {
        DioramaError::UnknownSeason(err.0)
    }
}

impl From<RenderError> for DioramaError {
    fn from(err: RenderError) -> Self {
        DioramaError::Render(err.0)
    }
}

impl From<serde_json::Error> for DioramaError {
    fn from(err: serde_json::Error) -> Self {
        DioramaError::Config(err.to_string())
    }
}
