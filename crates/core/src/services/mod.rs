//! Business logic services.

pub mod blocking;
pub mod comment;
pub mod feed;
pub mod following;
pub mod moderation;
pub mod notification;
pub mod post;
pub mod user;

pub use blocking::BlockingService;
pub use comment::CommentService;
pub use feed::FeedService;
pub use following::FollowingService;
pub use moderation::ModerationService;
pub use notification::{NotificationEvent, NotificationService};
pub use post::PostService;
pub use user::UserService;
