use thiserror::Error;

#[derive(Error, Debug)]
pub enum BeerLogError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Invalid coordinate: latitude={latitude}, longitude={longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Brewery not found: {id}")]
    BreweryNotFound { id: i64 },

    #[error("Too far from brewery for check-in: {distance_meters:.1}m > {max_distance_meters:.1}m")]
    TooFarForCheckIn {
        distance_meters: f64,
        max_distance_meters: f64,
    },

    #[error("Already checked in within the last hour (brewery {brewery_id})")]
    DuplicateCheckIn { brewery_id: i64 },

    #[error("Visit not found: {id}")]
    VisitNotFound { id: i64 },

    #[error("Access denied")]
    AccessDenied,

    #[error("Store error: {message}")]
    StoreError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// 錯誤分類，供外層（HTTP / Lambda）決定回應方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    InvalidCoordinate,
    BreweryNotFound,
    TooFarForCheckIn,
    DuplicateCheckIn,
    VisitNotFound,
    AccessDenied,
    Internal,
}

impl BeerLogError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::InvalidCoordinate { .. } => ErrorKind::InvalidCoordinate,
            Self::BreweryNotFound { .. } => ErrorKind::BreweryNotFound,
            Self::TooFarForCheckIn { .. } => ErrorKind::TooFarForCheckIn,
            Self::DuplicateCheckIn { .. } => ErrorKind::DuplicateCheckIn,
            Self::VisitNotFound { .. } => ErrorKind::VisitNotFound,
            Self::AccessDenied => ErrorKind::AccessDenied,
            Self::StoreError { .. }
            | Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::IoError(_)
            | Self::SerializationError(_) => ErrorKind::Internal,
        }
    }

    /// 對應的 HTTP 狀態碼
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::InvalidArgument
            | ErrorKind::InvalidCoordinate
            | ErrorKind::TooFarForCheckIn
            | ErrorKind::DuplicateCheckIn => 400,
            ErrorKind::AccessDenied => 403,
            ErrorKind::BreweryNotFound | ErrorKind::VisitNotFound => 404,
            ErrorKind::Internal => 500,
        }
    }

    /// 回應中使用的穩定錯誤代碼
    pub fn error_code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::InvalidArgument => "INVALID_REQUEST",
            ErrorKind::InvalidCoordinate => "INVALID_COORDINATE",
            ErrorKind::BreweryNotFound => "BREWERY_NOT_FOUND",
            ErrorKind::TooFarForCheckIn => "LOCATION_TOO_FAR",
            ErrorKind::DuplicateCheckIn => "DUPLICATE_CHECKIN",
            ErrorKind::VisitNotFound => "VISIT_NOT_FOUND",
            ErrorKind::AccessDenied => "FORBIDDEN",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }

    /// 給使用者看的訊息；內部錯誤不外洩細節
    pub fn user_friendly_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => "Internal server error".to_string(),
            ErrorKind::BreweryNotFound => "Brewery not found".to_string(),
            ErrorKind::TooFarForCheckIn => "Too far from brewery for check-in".to_string(),
            ErrorKind::DuplicateCheckIn => "Already checked in within the last hour".to_string(),
            ErrorKind::VisitNotFound => "Visit not found".to_string(),
            ErrorKind::AccessDenied => "Access denied".to_string(),
            ErrorKind::InvalidArgument | ErrorKind::InvalidCoordinate => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BeerLogError>;
