//! Concurrent publish fan-out.

use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};

use cron2mqtt_protocols::MultiError;

/// One independent publish operation.
pub type PublishOp<'a, E> = BoxFuture<'a, Result<(), E>>;

/// Run every operation with at most `limit` in flight, wait for all of them,
/// and collect every failure.
///
/// A failure never cancels its siblings. There are no retries.
pub async fn multi_publish<'a, E, I>(limit: usize, ops: I) -> Result<(), MultiError<E>>
where
    I: IntoIterator<Item = PublishOp<'a, E>>,
    E: Send + 'a,
{
    let errors: MultiError<E> = stream::iter(ops)
        .buffer_unordered(limit.max(1))
        .filter_map(|outcome| async move { outcome.err() })
        .collect()
        .await;
    errors.into_result()
}
