//! Tri-state result wrapper emitted by repository fetches.

use std::future::Future;

use futures::StreamExt;
use futures::stream::{self, BoxStream};

/// Errors a fetch can report through `Resource::Error`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Request never produced a response.
    #[error("Network error: {reason}")]
    Network {
        /// The reason for the network error
        reason: String,
    },

    /// Response body could not be decoded.
    #[error("Parse error: {reason}")]
    Parse {
        /// The reason for the parse error
        reason: String,
    },

    /// Server answered with a non-success status.
    #[error("Request rejected with status {status}: {reason}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Message reported by the server
        reason: String,
    },

    /// Requested resource does not exist.
    #[error("Not found: {what}")]
    NotFound {
        /// Path or identifier that was looked up
        what: String,
    },

    /// Source cannot serve requests right now (rate limit, missing key).
    #[error("Unavailable: {reason}")]
    Unavailable {
        /// The reason the source is unavailable
        reason: String,
    },
}

/// One emission of a fetch: in-flight flag, payload, or failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource<T> {
    Loading(bool),
    Success(T),
    Error(FetchError),
}

impl<T> Resource<T> {
    /// Maps the success payload, leaving other variants untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resource<U> {
        match self {
            Resource::Loading(flag) => Resource::Loading(flag),
            Resource::Success(value) => Resource::Success(f(value)),
            Resource::Error(error) => Resource::Error(error),
        }
    }
}

impl<T> From<Result<T, FetchError>> for Resource<T> {
    fn from(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(value) => Resource::Success(value),
            Err(error) => Resource::Error(error),
        }
    }
}

/// Stream of emissions for a single fetch.
pub type ResourceStream<T> = BoxStream<'static, Resource<T>>;

/// Wraps a fetch as `Loading(true)`, its outcome, `Loading(false)`.
///
/// The closing `Loading(false)` is emitted after failures too.
pub fn resource_stream<T, F>(fetch: F) -> ResourceStream<T>
where
    T: Send + 'static,
    F: Future<Output = Result<T, FetchError>> + Send + 'static,
{
    stream::once(async { Resource::Loading(true) })
        .chain(stream::once(async move { Resource::from(fetch.await) }))
        .chain(stream::once(async { Resource::Loading(false) }))
        .boxed()
}

/// Emits a value that is already at hand with the usual loading bracket.
pub fn cached_stream<T>(value: T) -> ResourceStream<T>
where
    T: Send + 'static,
{
    stream::iter([
        Resource::Loading(true),
        Resource::Success(value),
        Resource::Loading(false),
    ])
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resource_stream_success() {
        let emissions: Vec<_> = resource_stream(async { Ok::<_, FetchError>(7) })
            .collect()
            .await;

        assert_eq!(
            emissions,
            vec![
                Resource::Loading(true),
                Resource::Success(7),
                Resource::Loading(false)
            ]
        );
    }

    #[tokio::test]
    async fn test_resource_stream_error_still_clears_loading() {
        let emissions: Vec<Resource<u32>> = resource_stream(async {
            Err(FetchError::Network {
                reason: "connection reset".to_string(),
            })
        })
        .collect()
        .await;

        assert_eq!(emissions.len(), 3);
        assert!(matches!(emissions[1], Resource::Error(_)));
        assert_eq!(emissions[2], Resource::Loading(false));
    }

    #[tokio::test]
    async fn test_cached_stream() {
        let emissions: Vec<_> = cached_stream("cached").collect().await;
        assert_eq!(emissions[1], Resource::Success("cached"));
        assert_eq!(emissions.last(), Some(&Resource::Loading(false)));
    }

    #[test]
    fn test_map_keeps_non_success() {
        let loading: Resource<u32> = Resource::Loading(true);
        assert_eq!(loading.map(|v| v * 2), Resource::Loading(true));
        assert_eq!(Resource::Success(2).map(|v| v * 2), Resource::Success(4));
    }
}
