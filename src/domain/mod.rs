pub mod mapper;
pub mod notification;
pub mod page;

pub use mapper::NotificationMapper;
pub use notification::{format_timestamp, parse_timestamp, Notification, PublicNotification};
pub use page::{Link, NotificationPage};
