use std::sync::Arc;

use crate::api::ClientError;

/// `{data, is_loading, error}` view of one query
#[derive(Debug, Clone)]
pub enum QueryState<T> {
    /// Gate closed, nothing requested
    Idle,
    Loading,
    Ready(T),
    Failed(Arc<ClientError>),
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        QueryState::Idle
    }
}

impl<T> QueryState<T> {
    pub fn from_result(result: Result<T, ClientError>) -> Self {
        match result {
            Ok(value) => QueryState::Ready(value),
            Err(err) => QueryState::Failed(Arc::new(err)),
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            QueryState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            QueryState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ClientError> {
        match self {
            QueryState::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, QueryState::Idle)
    }
}
