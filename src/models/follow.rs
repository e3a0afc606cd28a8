use serde::Serialize;
use uuid::Uuid;

/// Directed edge: `user_id` receives `author_id`'s posts in the follow feed.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub struct Follow {
    pub user_id: Uuid,
    pub author_id: Uuid,
}

#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq, Eq)]
pub struct FollowCounts {
    pub followers: u64,
    pub following: u64,
}
