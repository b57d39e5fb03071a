/// Database access layer for community-service
///
/// Repositories are free async functions over `&PgPool`. `thread_repo`
/// holds the author-joined queries shared by the comment listing and the
/// live-update notifier.
pub mod comment_repo;
pub mod follow_repo;
pub mod like_repo;
pub mod post_repo;
pub mod thread_repo;
