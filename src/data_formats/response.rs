use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{CommentWithAuthor, FeedPost, User};

#[derive(Deserialize, Serialize, Debug)]
pub struct UserResponse {
    pub email: String,
    pub token: String,
    pub username: String,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ProfileResponse {
    pub username: String,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
}

impl From<&User> for ProfileResponse {
    fn from(user: &User) -> Self {
        ProfileResponse {
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct CategoryResponse {
    pub title: String,
    pub slug: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub image: Option<String>,
    #[serde(rename = "pubDate")]
    pub pub_date: DateTime<Utc>,
    #[serde(rename = "isPublished")]
    pub is_published: bool,
    #[serde(rename = "createdAt")]
    pub created_at: NaiveDateTime,
    pub author: String,
    pub category: Option<CategoryResponse>,
    pub location: Option<String>,
    #[serde(rename = "commentCount")]
    pub comment_count: i64,
}

impl From<FeedPost> for PostResponse {
    fn from(post: FeedPost) -> Self {
        let category = match (post.category_title, post.category_slug) {
            (Some(title), Some(slug)) => Some(CategoryResponse { title, slug }),
            _ => None,
        };
        PostResponse {
            id: post.id,
            title: post.title,
            text: post.text,
            image: post.image,
            pub_date: post.pub_date,
            is_published: post.is_published,
            created_at: post.created_at,
            author: post.author_username,
            category,
            location: post.location_name,
            comment_count: post.comment_count,
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct CommentResponse {
    pub id: i64,
    pub text: String,
    #[serde(rename = "createdAt")]
    pub created_at: NaiveDateTime,
    pub author: String,
}

impl From<CommentWithAuthor> for CommentResponse {
    fn from(comment: CommentWithAuthor) -> Self {
        CommentResponse {
            id: comment.id,
            text: comment.text,
            created_at: comment.created_at,
            author: comment.author_username,
        }
    }
}
