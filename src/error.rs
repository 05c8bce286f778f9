use std::fmt;
use std::path::PathBuf;

/// The type of error that can occur when loading a configuration or writing a corpus.
///
/// Generation itself never fails: a malformed configuration only biases the grammar.
#[derive(Debug)]
pub struct Error(pub(crate) ErrorRepr);

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.0 {
            ErrorRepr::Io { source, .. } => Some(source),
            ErrorRepr::Profile(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub(crate) enum ErrorRepr {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    UnknownPreset(String),
    Profile(toml::de::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            ErrorRepr::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            ErrorRepr::UnknownPreset(name) => write!(
                f,
                "Unknown preset: {}, available presets: {}",
                name,
                crate::Preset::all()
                    .map(|p| p.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            ErrorRepr::Profile(e) => write!(f, "Invalid profile: {}", e),
        }
    }
}
