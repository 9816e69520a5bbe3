use thiserror::Error;

use acc_core::CoreError;
use acc_network::NetworkError;
use acc_search::SearchError;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("run configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("invalid network input: {0}")]
    Network(#[from] NetworkError),

    #[error("invalid search settings: {0}")]
    Search(#[from] SearchError),

    #[error("could not start worker pool: {0}")]
    ThreadPool(String),
}

pub type RunResult<T> = Result<T, RunError>;
