/// Live-update notifier
///
/// Watches one discussion thread for newly created comments and likes and
/// pushes them to a connected client as a server-sent event stream. One
/// feed exists per open connection; it owns no cross-connection state:
/// just the thread id and two high-water marks.
///
/// Each tick polls for rows created strictly after the respective
/// watermark, oldest first, bounded by the batch size. A null watermark has
/// no lower bound, so a client connecting to a thread with history receives
/// up to one batch of the oldest existing rows on the first tick that finds
/// them. That backfill matches the behavior clients were built against; do
/// not change it silently.
use crate::db::thread_repo;
use crate::error::Result;
use crate::metrics;
use crate::models::{CommentThread, LikeEntry, LiveUpdatePayload};
use actix_web::web::Bytes;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::Stream;
use sqlx::PgPool;
use std::convert::Infallible;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

/// Read access to one thread's comments and likes.
///
/// The live-update feed talks to the data store through this seam so the
/// polling behavior can be exercised without a database.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ThreadStore: Send + Sync + 'static {
    /// Top-level comments created strictly after `after` (all when `None`),
    /// oldest first, with reply subtrees, at most `limit` rows.
    async fn comments_since(
        &self,
        post_id: Uuid,
        after: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<CommentThread>>;

    /// Likes created strictly after `after`, same ordering and limit policy.
    async fn likes_since(
        &self,
        post_id: Uuid,
        after: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<LikeEntry>>;
}

/// PostgreSQL-backed thread store.
pub struct PgThreadStore {
    pool: PgPool,
}

impl PgThreadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ThreadStore for PgThreadStore {
    async fn comments_since(
        &self,
        post_id: Uuid,
        after: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<CommentThread>> {
        Ok(thread_repo::comment_threads_since(&self.pool, post_id, after, limit).await?)
    }

    async fn likes_since(
        &self,
        post_id: Uuid,
        after: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<LikeEntry>> {
        Ok(thread_repo::likes_since(&self.pool, post_id, after, limit).await?)
    }
}

/// Per-session high-water marks. Each timestamp only ever moves forward.
#[derive(Debug, Default, Clone, Copy)]
struct Watermarks {
    comments: Option<DateTime<Utc>>,
    likes: Option<DateTime<Utc>>,
}

impl Watermarks {
    /// Advance each series to the newest row it returned this tick.
    /// Rows arrive oldest-first and strictly above the current mark, so
    /// taking the last row's timestamp keeps both marks non-decreasing.
    fn advance(&mut self, payload: &LiveUpdatePayload) {
        if let Some(last) = payload.comments.last() {
            self.comments = Some(last.comment.created_at);
        }
        if let Some(last) = payload.likes.last() {
            self.likes = Some(last.created_at);
        }
    }
}

/// One client's live-update session over a single thread.
pub struct LiveUpdateFeed<S> {
    store: S,
    post_id: Uuid,
    poll_interval: Duration,
    batch_size: i64,
}

impl<S: ThreadStore> LiveUpdateFeed<S> {
    pub fn new(store: S, post_id: Uuid, poll_interval: Duration, batch_size: i64) -> Self {
        Self {
            store,
            post_id,
            poll_interval,
            batch_size,
        }
    }

    /// Turn the session into an SSE byte stream.
    ///
    /// The interval lives inside the stream state: dropping the response
    /// body on client disconnect drops the timer with it, so no further
    /// store queries happen after disconnect. Ticks cannot overlap: the
    /// poll is awaited on the stream's own task before the next tick is
    /// taken, and ticks missed behind a slow query are skipped.
    pub fn into_stream(self) -> impl Stream<Item = std::result::Result<Bytes, Infallible>> {
        let Self {
            store,
            post_id,
            poll_interval,
            batch_size,
        } = self;

        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        futures::stream::unfold(
            (store, Watermarks::default(), ticker),
            move |(store, mut marks, mut ticker)| async move {
                loop {
                    ticker.tick().await;
                    if let Some(payload) =
                        poll_once(&store, post_id, batch_size, &mut marks).await
                    {
                        return Some((Ok(sse_event(&payload)), (store, marks, ticker)));
                    }
                }
            },
        )
    }
}

/// One poll cycle. Returns a payload only when something new exists.
///
/// A store failure is logged and treated as zero new records for both
/// series: the watermarks stay put and the session survives. A transient
/// data-store error must not kill a long-lived client connection.
async fn poll_once<S: ThreadStore>(
    store: &S,
    post_id: Uuid,
    batch_size: i64,
    marks: &mut Watermarks,
) -> Option<LiveUpdatePayload> {
    let comments = store.comments_since(post_id, marks.comments, batch_size).await;
    let likes = store.likes_since(post_id, marks.likes, batch_size).await;

    let (comments, likes) = match (comments, likes) {
        (Ok(comments), Ok(likes)) => (comments, likes),
        (Err(e), _) | (_, Err(e)) => {
            metrics::LIVE_POLL_TICKS.with_label_values(&["error"]).inc();
            tracing::warn!(%post_id, "live update poll failed: {}", e);
            return None;
        }
    };

    if comments.is_empty() && likes.is_empty() {
        metrics::LIVE_POLL_TICKS.with_label_values(&["empty"]).inc();
        return None;
    }

    let payload = LiveUpdatePayload { comments, likes };
    marks.advance(&payload);
    metrics::LIVE_POLL_TICKS
        .with_label_values(&["emitted"])
        .inc();
    Some(payload)
}

/// Encode one payload as a server-sent event frame.
fn sse_event(payload: &LiveUpdatePayload) -> Bytes {
    let body = serde_json::to_string(payload).unwrap_or_else(|e| {
        tracing::error!("failed to encode live update payload: {}", e);
        r#"{"comments":[],"likes":[]}"#.to_string()
    });
    Bytes::from(format!("data: {}\n\n", body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{CommentView, UserSummary};
    use chrono::TimeZone;
    use futures::StreamExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::timeout;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn author() -> UserSummary {
        UserSummary {
            id: Uuid::new_v4(),
            username: "raras".to_string(),
            display_name: Some("Raras".to_string()),
            avatar_url: None,
        }
    }

    fn thread(post_id: Uuid, created_at: DateTime<Utc>) -> CommentThread {
        CommentThread {
            comment: CommentView {
                id: Uuid::new_v4(),
                post_id,
                content: "halo".to_string(),
                parent_comment_id: None,
                created_at,
                author: author(),
            },
            replies: vec![],
        }
    }

    fn like(post_id: Uuid, created_at: DateTime<Utc>) -> LikeEntry {
        LikeEntry {
            id: Uuid::new_v4(),
            post_id,
            created_at,
            user: author(),
        }
    }

    fn parse_frame(frame: &Bytes) -> serde_json::Value {
        let text = std::str::from_utf8(frame).unwrap();
        assert!(text.starts_with("data: "), "missing SSE data prefix: {text}");
        assert!(text.ends_with("\n\n"), "missing SSE frame terminator");
        serde_json::from_str(text.trim_start_matches("data: ").trim_end()).unwrap()
    }

    #[test]
    fn sse_event_frames_payload_as_single_data_line() {
        let payload = LiveUpdatePayload {
            comments: vec![],
            likes: vec![like(Uuid::new_v4(), ts(1))],
        };

        let frame = sse_event(&payload);
        let value = parse_frame(&frame);
        assert_eq!(value["likes"].as_array().unwrap().len(), 1);
        assert_eq!(value["comments"].as_array().unwrap().len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_backfills_existing_rows_oldest_first() {
        let post_id = Uuid::new_v4();
        let mut store = MockThreadStore::new();

        let backfill = vec![thread(post_id, ts(1)), thread(post_id, ts(2)), thread(post_id, ts(3))];
        store
            .expect_comments_since()
            .returning(move |_, after, limit| {
                assert_eq!(limit, 3);
                if after.is_none() {
                    Ok(backfill.clone())
                } else {
                    Ok(vec![])
                }
            });
        store.expect_likes_since().returning(|_, _, _| Ok(vec![]));

        let feed = LiveUpdateFeed::new(store, post_id, Duration::from_secs(10), 3);
        let mut stream = Box::pin(feed.into_stream());

        let frame = stream.next().await.unwrap().unwrap();
        let value = parse_frame(&frame);
        let comments = value["comments"].as_array().unwrap();
        assert_eq!(comments.len(), 3);
        let returned: Vec<&str> = comments
            .iter()
            .map(|c| c["created_at"].as_str().unwrap())
            .collect();
        let mut sorted = returned.clone();
        sorted.sort();
        assert_eq!(returned, sorted, "backfill must be oldest-first");
    }

    #[tokio::test(start_paused = true)]
    async fn watermarks_advance_and_rows_are_delivered_once() {
        let post_id = Uuid::new_v4();
        let mut store = MockThreadStore::new();

        let c1 = thread(post_id, ts(1));
        let c2 = thread(post_id, ts(2));
        let c3 = thread(post_id, ts(3));
        let (c1_id, c2_id, c3_id) = (c1.comment.id, c2.comment.id, c3.comment.id);
        let l1 = like(post_id, ts(5));

        store
            .expect_comments_since()
            .returning(move |_, after, _| match after {
                None => Ok(vec![c1.clone(), c2.clone()]),
                Some(mark) if mark == ts(2) => Ok(vec![c3.clone()]),
                Some(_) => Ok(vec![]),
            });
        store
            .expect_likes_since()
            .returning(move |_, after, _| match after {
                None => Ok(vec![l1.clone()]),
                // Once delivered, the like watermark must exclude l1 forever.
                Some(mark) => {
                    assert_eq!(mark, ts(5));
                    Ok(vec![])
                }
            });

        let feed = LiveUpdateFeed::new(store, post_id, Duration::from_secs(10), 3);
        let mut stream = Box::pin(feed.into_stream());

        let first = parse_frame(&stream.next().await.unwrap().unwrap());
        let ids: Vec<&str> = first["comments"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec![c1_id.to_string(), c2_id.to_string()]);
        assert_eq!(first["likes"].as_array().unwrap().len(), 1);

        let second = parse_frame(&stream.next().await.unwrap().unwrap());
        let ids: Vec<&str> = second["comments"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec![c3_id.to_string()], "old rows must not re-deliver");
        assert_eq!(second["likes"].as_array().unwrap().len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn quiet_thread_emits_no_events() {
        let post_id = Uuid::new_v4();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut store = MockThreadStore::new();

        let seen = calls.clone();
        store.expect_comments_since().returning(move |_, _, _| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        });
        store.expect_likes_since().returning(|_, _, _| Ok(vec![]));

        let feed = LiveUpdateFeed::new(store, post_id, Duration::from_secs(10), 3);
        let mut stream = Box::pin(feed.into_stream());

        // Several ticks elapse; with nothing new, not a single event fires.
        let emitted = timeout(Duration::from_secs(35), stream.next()).await;
        assert!(emitted.is_err(), "no empty-payload event may be sent");
        assert!(calls.load(Ordering::SeqCst) >= 2, "polling should continue");
    }

    #[tokio::test(start_paused = true)]
    async fn store_failure_is_swallowed_and_watermarks_hold() {
        let post_id = Uuid::new_v4();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut store = MockThreadStore::new();

        let c1 = thread(post_id, ts(1));
        let seen = calls.clone();
        store.expect_comments_since().returning(move |_, after, _| {
            let call = seen.fetch_add(1, Ordering::SeqCst);
            if call == 0 {
                Err(AppError::DatabaseError("connection reset".to_string()))
            } else {
                // The failed tick must not have advanced the watermark.
                assert!(after.is_none());
                Ok(vec![c1.clone()])
            }
        });
        store.expect_likes_since().returning(|_, _, _| Ok(vec![]));

        let feed = LiveUpdateFeed::new(store, post_id, Duration::from_secs(10), 3);
        let mut stream = Box::pin(feed.into_stream());

        let frame = parse_frame(&stream.next().await.unwrap().unwrap());
        assert_eq!(frame["comments"].as_array().unwrap().len(), 1);
        assert!(calls.load(Ordering::SeqCst) >= 2, "session must survive the failure");
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_stream_stops_polling() {
        let post_id = Uuid::new_v4();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut store = MockThreadStore::new();

        let seen = calls.clone();
        store.expect_comments_since().returning(move |_, _, _| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        });
        store.expect_likes_since().returning(|_, _, _| Ok(vec![]));

        let feed = LiveUpdateFeed::new(store, post_id, Duration::from_secs(10), 3);
        let mut stream = Box::pin(feed.into_stream());

        let _ = timeout(Duration::from_secs(25), stream.next()).await;
        let polled_while_open = calls.load(Ordering::SeqCst);
        assert!(polled_while_open >= 2);

        drop(stream);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(
            calls.load(Ordering::SeqCst),
            polled_while_open,
            "no store queries may run after disconnect"
        );
    }
}
