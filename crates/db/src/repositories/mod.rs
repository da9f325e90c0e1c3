//! Database repositories.

pub mod blocking;
pub mod comment;
pub mod following;
pub mod notification;
pub mod post;
pub mod post_like;
pub mod report;
pub mod user;

pub use blocking::BlockingRepository;
pub use comment::CommentRepository;
pub use following::FollowingRepository;
pub use notification::NotificationRepository;
pub use post::PostRepository;
pub use post_like::PostLikeRepository;
pub use report::ReportRepository;
pub use user::UserRepository;
