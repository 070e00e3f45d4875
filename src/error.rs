use thiserror::Error;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GET {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("XML parsing failed: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Malformed document: {message}")]
    Document { message: String },
}

impl From<quick_xml::events::attributes::AttrError> for RosterError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        RosterError::Xml(err.into())
    }
}

impl RosterError {
    /// Prefix a missing-field path with the node it was read under.
    pub fn in_context(self, context: impl std::fmt::Display) -> Self {
        match self {
            RosterError::MissingField(field) => {
                RosterError::MissingField(format!("{context}/{field}"))
            }
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, RosterError>;
