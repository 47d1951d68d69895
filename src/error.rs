use thiserror::Error;

// Enum for handling various application-level errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Config(#[from] ConfigError), // Startup configuration problems, fatal.

    #[error("{0}")]
    AI(#[from] AIError), // Errors related to the completion client, per turn.

    #[error("{0}")]
    Persona(#[from] PersonaError),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Logger error: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error("The Game Master is still answering your last message")]
    SessionBusy, // A turn was started while the previous one is still pending.
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing API key: set GEMINI_API_KEY or OPENAI_API_KEY")]
    MissingApiKey,

    #[error("Missing base URL: set BASE_URL")]
    MissingBaseUrl,

    #[error("Unsupported API shape: {0}, only chat_completions is available")]
    UnsupportedApiShape(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

// Errors related to AI operations are separated into their own enum for clarity.
#[derive(Debug, Error)]
pub enum AIError {
    #[error("OpenAI API error: {0}")]
    OpenAI(#[from] async_openai::error::OpenAIError), // Transport, auth and rate limit failures.

    #[error("Timeout occurred")]
    Timeout,

    #[error("No message found")]
    NoMessageFound, // The model answered with neither text nor a handoff.

    #[error("Unknown handoff target: {0}")]
    UnknownHandoff(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PersonaError {
    #[error("Persona not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
