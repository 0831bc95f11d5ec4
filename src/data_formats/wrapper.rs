use serde::{Deserialize, Serialize};

use super::response::{CommentResponse, PostResponse, ProfileResponse};

#[derive(Debug, Deserialize, Serialize)]
pub struct UserWrapper<T> {
    pub user: T,
}

impl<T> UserWrapper<T> {
    pub fn wrap_with_user_data(request: T) -> UserWrapper<T> {
        UserWrapper { user: request }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MultiplePostsWrapper {
    pub posts: Vec<PostResponse>,
    #[serde(rename = "postsCount")]
    pub posts_count: usize,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PostDetailWrapper {
    pub post: PostResponse,
    pub comments: Vec<CommentResponse>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ProfilePageWrapper {
    pub profile: ProfileResponse,
    pub posts: Vec<PostResponse>,
    #[serde(rename = "postsCount")]
    pub posts_count: usize,
}
