use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ----------------- User Requests -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

/// Profile edits always target the requester; there is intentionally no way
/// to name a different user here.
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

// ----------------- Post Requests -----------------

/// No author field: authorship is bound server-side from the token, so a
/// client cannot publish as somebody else.
#[derive(Deserialize, Serialize, Debug)]
pub struct CreatePostRequest {
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub image: Option<String>,
    /// Future dates schedule the post; absent means "now".
    #[serde(default)]
    pub pub_date: Option<DateTime<Utc>>,
    #[serde(default = "default_published")]
    pub is_published: bool,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub location_id: Option<i64>,
}

fn default_published() -> bool {
    true
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub text: Option<String>,
    pub image: Option<String>,
    pub pub_date: Option<DateTime<Utc>>,
    pub is_published: Option<bool>,
    pub category_id: Option<i64>,
    pub location_id: Option<i64>,
}

// ----------------- Comment Requests -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct CommentRequest {
    pub text: String,
}
