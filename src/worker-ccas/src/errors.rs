use data_model_ccas::db::ConnectionPoolError;

#[derive(Debug)]
pub enum Error {
    RecordNotFound,
    DbError(diesel::result::Error),
    DbPoolError(String),
    ConnectionError(ConnectionPoolError),
    CoreError(core_ccas::Error),
    ConfigError(core_ccas::ConfigError),
    CsvError(csv::Error),
    IoError(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RecordNotFound => write!(f, "Record not found in database."),
            Self::DbError(diesel_error) => write!(f, "Database error: {}", diesel_error),
            Self::DbPoolError(pool_error_desc) => write!(f, "Database pool error: {}", pool_error_desc),
            Self::ConnectionError(connection_error) => write!(f, "{}", connection_error),
            Self::CoreError(core_error) => write!(f, "{}", core_error),
            Self::ConfigError(config_error) => write!(f, "Configuration error: {}", config_error),
            Self::CsvError(csv_error) => write!(f, "CSV error: {}", csv_error),
            Self::IoError(io_error) => write!(f, "I/O error: {}", io_error),
        }
    }
}

impl std::error::Error for Error {}

impl From<diesel::result::Error> for Error {
    fn from(error: diesel::result::Error) -> Self {
        match error {
            diesel::result::Error::NotFound => Self::RecordNotFound,
            _ => Self::DbError(error),
        }
    }
}

// PoolError
impl<E: std::fmt::Debug> From<deadpool::managed::PoolError<E>> for Error {
    fn from(error: deadpool::managed::PoolError<E>) -> Self {
        Self::DbPoolError(format!("{:?}", error))
    }
}

impl From<ConnectionPoolError> for Error {
    fn from(error: ConnectionPoolError) -> Self {
        Self::ConnectionError(error)
    }
}

impl From<core_ccas::Error> for Error {
    fn from(error: core_ccas::Error) -> Self {
        Self::CoreError(error)
    }
}

impl From<core_ccas::ConfigError> for Error {
    fn from(error: core_ccas::ConfigError) -> Self {
        Self::ConfigError(error)
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::CsvError(error)
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::IoError(error)
    }
}
