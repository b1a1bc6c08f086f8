use thiserror::Error;

#[derive(Error, Debug)]
pub enum WizardError {
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid issue query: {0}")]
    InvalidQuery(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("profile '{0}' not found")]
    ProfileNotFound(String),

    #[error("profile name '{0}' is already in use")]
    NameTaken(String),

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("{0}")]
    Other(String),
}

impl WizardError {
    /// Whether the failure came from the transport rather than the server's answer.
    pub fn is_network(&self) -> bool {
        match self {
            WizardError::Network(_) => true,
            WizardError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, WizardError>;
