use serde::Serialize;

use crate::models::follow::FollowCounts;
use crate::models::group::Group;
use crate::models::user::UserPublic;
use crate::services::feed_cache::FeedPage;

#[derive(Debug, Serialize)]
pub struct GroupFeedOut {
    pub group: Group,
    pub page: FeedPage,
}

#[derive(Debug, Serialize)]
pub struct ProfileOut {
    pub author: UserPublic,
    /// Whether the caller follows this author. Always false for anonymous
    /// callers and for the author's own profile.
    pub following: bool,
    pub counts: FollowCounts,
    pub page: FeedPage,
}

#[derive(Debug, Serialize)]
pub struct FollowOut {
    pub author: UserPublic,
    pub following: bool,
    /// False when the call did not change the graph.
    pub changed: bool,
}
