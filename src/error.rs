use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Package string cannot be empty")]
    EmptyInput,

    #[error("No valid packages found in input string")]
    NoValidPackages,

    #[error("Failed to install {packages}: {details}")]
    Install { packages: String, details: String },

    #[error("AWS region not found. Set AWS_DEFAULT_REGION or AWS_REGION environment variable")]
    MissingRegion,

    #[error("AWS credentials not found. Configure AWS credentials via environment variables")]
    MissingCredentials,

    #[error("Invalid layer parameters: {0}")]
    InvalidParameter(String),

    #[error("Rate limit exceeded. Please try again later")]
    RateLimit,

    #[error("Layer conflict: {0}")]
    Conflict(String),

    #[error("AWS error ({code}): {message}")]
    Publish { code: String, message: String },

    #[error("Not a Lambda layer version ARN: {0}")]
    InvalidArn(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Stable name of the error category, reported as `error_type` in JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Io(_) => "IoError",
            Error::Walk(_) => "IoError",
            Error::Archive(_) => "ArchiveError",
            Error::Json(_) => "JsonError",
            Error::TomlDe(_) => "ConfigError",
            Error::EmptyInput => "EmptyInputError",
            Error::NoValidPackages => "NoValidPackagesError",
            Error::Install { .. } => "InstallError",
            Error::MissingRegion => "MissingRegionError",
            Error::MissingCredentials => "MissingCredentialsError",
            Error::InvalidParameter(_) => "InvalidParameterError",
            Error::RateLimit => "RateLimitError",
            Error::Conflict(_) => "ConflictError",
            Error::Publish { .. } => "PublishError",
            Error::InvalidArn(_) => "InvalidArnError",
            Error::Other(_) => "Error",
        }
    }
}
