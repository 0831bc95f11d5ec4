use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::{StatusCode, Uri},
    response::Redirect,
    Extension, Json,
};
use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    authentication::{get_jwt_token, hash_password_argon2, verify_password_argon2, AuthUser, MaybeUser},
    data_formats::{
        CommentRequest, CreatePostRequest, LoginRequest, MultiplePostsWrapper, PageQuery,
        PostDetailWrapper, ProfilePageWrapper, ProfileResponse, RegisterRequest,
        UpdatePostRequest, UpdateProfileRequest, UserResponse, UserWrapper,
    },
    db_helpers::{
        create_comment_in_db, create_post_in_db, delete_comment_in_db, delete_post_in_db,
        get_comment_by_id, get_comments_for_post, get_post_by_id, get_post_with_meta,
        get_published_category_by_slug, get_user_by_email, get_user_by_id, get_user_by_username,
        insert_user, list_posts, update_comment_in_db, update_post_in_db, update_profile_in_db,
        FeedContext,
    },
    errors::RequestError,
    policy::{self, CommentDecision},
};

type UserJson = UserWrapper<UserResponse>;

fn post_detail_url(post_id: i64) -> String {
    format!("/posts/{}", post_id)
}

fn profile_url(username: &str) -> String {
    format!("/profiles/{}", username)
}

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> Result<(), (StatusCode, String)> {
    Err((
        StatusCode::NOT_FOUND,
        format!("URL {} provided was not found", uri),
    ))
}

// ----------------- User Handlers -----------------
pub async fn register_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(UserWrapper { mut user }): Json<UserWrapper<RegisterRequest>>,
) -> Result<Json<UserJson>, RequestError> {
    user.password = hash_password_argon2(user.password)
        .await
        .map_err(|_| RequestError::RunTimeError("Could not register user"))?;

    let user = insert_user(&pool, &user).await.map_err(|e| {
        if let RequestError::DatabaseError(sqlx::Error::Database(e)) = &e {
            if e.message().contains("UNIQUE constraint failed") {
                return RequestError::RunTimeError("Username or email already exists");
            }
        }
        e
    })?;

    let token = get_jwt_token(user.id)
        .map_err(|_| RequestError::RunTimeError("Could not generate token\nTry again later"))?;
    let result = UserResponse {
        email: user.email,
        token,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
    };
    Ok(Json(UserWrapper::wrap_with_user_data(result)))
}

pub async fn login_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(UserWrapper { user: request }): Json<UserWrapper<LoginRequest>>,
) -> Result<Json<UserJson>, RequestError> {
    let user = match get_user_by_email(&pool, &request.email).await? {
        Some(user) => user,
        None => return Err(RequestError::RunTimeError("Email not found")),
    };
    let is_password_correct = verify_password_argon2(request.password, &user.password)
        .await
        .map_err(|_| RequestError::RunTimeError("Could not login\nPlease try again"))?;
    if !is_password_correct {
        return Err(RequestError::RunTimeError("Incorrect password"));
    }
    let token = get_jwt_token(user.id).map_err(|_| RequestError::ServerError)?;
    let result = UserResponse {
        email: user.email,
        token,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
    };
    Ok(Json(UserWrapper::wrap_with_user_data(result)))
}

pub async fn get_current_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
) -> Result<Json<UserJson>, RequestError> {
    let AuthUser { id, token } = maybe_user.require_user()?;
    let user = match get_user_by_id(&pool, id).await? {
        Some(user) => user,
        None => return Err(RequestError::NotFound),
    };
    let result = UserResponse {
        email: user.email,
        token,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
    };
    Ok(Json(UserWrapper::wrap_with_user_data(result)))
}

/// Always edits the requester's own record; any client-supplied target is
/// structurally impossible to express.
pub async fn update_profile(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(UserWrapper { user }): Json<UserWrapper<UpdateProfileRequest>>,
) -> Result<Redirect, RequestError> {
    let AuthUser { id, .. } = maybe_user.require_user()?;
    update_profile_in_db(&pool, id, user).await?;
    Ok(Redirect::to("/posts"))
}

// ----------------- Feed Handlers -----------------
pub async fn global_feed(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Query(PageQuery { page }): Query<PageQuery>,
) -> Result<Json<MultiplePostsWrapper>, RequestError> {
    let posts = list_posts(&pool, FeedContext::Global, maybe_user.viewer(), page).await?;
    let posts: Vec<_> = posts.into_iter().map(Into::into).collect();
    Ok(Json(MultiplePostsWrapper {
        posts_count: posts.len(),
        posts,
    }))
}

pub async fn category_feed(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(slug): Path<String>,
    Query(PageQuery { page }): Query<PageQuery>,
) -> Result<Json<MultiplePostsWrapper>, RequestError> {
    let category = get_published_category_by_slug(&pool, &slug)
        .await?
        .ok_or(RequestError::NotFound)?;
    let posts = list_posts(
        &pool,
        FeedContext::Category(&category.slug),
        maybe_user.viewer(),
        page,
    )
    .await?;
    let posts: Vec<_> = posts.into_iter().map(Into::into).collect();
    Ok(Json(MultiplePostsWrapper {
        posts_count: posts.len(),
        posts,
    }))
}

pub async fn profile_page(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(username): Path<String>,
    Query(PageQuery { page }): Query<PageQuery>,
) -> Result<Json<ProfilePageWrapper>, RequestError> {
    let owner = get_user_by_username(&pool, &username)
        .await?
        .ok_or(RequestError::NotFound)?;
    let posts = list_posts(
        &pool,
        FeedContext::Profile {
            username: &owner.username,
            owner_id: owner.id,
        },
        maybe_user.viewer(),
        page,
    )
    .await?;
    let posts: Vec<_> = posts.into_iter().map(Into::into).collect();
    Ok(Json(ProfilePageWrapper {
        profile: ProfileResponse::from(&owner),
        posts_count: posts.len(),
        posts,
    }))
}

// ----------------- Post Handlers -----------------

/// A post that exists but is invisible to this viewer answers exactly like a
/// post that does not exist.
pub async fn get_post_detail(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(post_id): Path<i64>,
) -> Result<Json<PostDetailWrapper>, RequestError> {
    let post = get_post_with_meta(&pool, post_id)
        .await?
        .ok_or(RequestError::NotFound)?;
    if !policy::is_post_visible(&post, maybe_user.viewer(), Utc::now()) {
        return Err(RequestError::NotFound);
    }
    let comments = get_comments_for_post(&pool, post_id).await?;
    Ok(Json(PostDetailWrapper {
        post: post.into(),
        comments: comments.into_iter().map(Into::into).collect(),
    }))
}

pub async fn create_post(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(request): Json<CreatePostRequest>,
) -> Result<Redirect, RequestError> {
    let AuthUser { id, .. } = maybe_user.require_user()?;
    if request.title.trim().is_empty() || request.text.trim().is_empty() {
        return Err(RequestError::RunTimeError("Title and text are required"));
    }
    create_post_in_db(&pool, id, request).await?;
    let author = get_user_by_id(&pool, id)
        .await?
        .ok_or(RequestError::ServerError)?;
    Ok(Redirect::to(&profile_url(&author.username)))
}

pub async fn update_post(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(post_id): Path<i64>,
    Json(request): Json<UpdatePostRequest>,
) -> Result<Redirect, RequestError> {
    let post = get_post_by_id(&pool, post_id)
        .await?
        .ok_or(RequestError::NotFound)?;
    if !policy::can_mutate_post(post.author_id, maybe_user.viewer()) {
        return Err(RequestError::Redirect(post_detail_url(post_id)));
    }
    update_post_in_db(&pool, post_id, request).await?;
    Ok(Redirect::to(&post_detail_url(post_id)))
}

pub async fn delete_post(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(post_id): Path<i64>,
) -> Result<Redirect, RequestError> {
    let post = get_post_by_id(&pool, post_id)
        .await?
        .ok_or(RequestError::NotFound)?;
    if !policy::can_mutate_post(post.author_id, maybe_user.viewer()) {
        return Err(RequestError::Redirect(post_detail_url(post_id)));
    }
    delete_post_in_db(&pool, post_id).await?;
    let author = get_user_by_id(&pool, post.author_id)
        .await?
        .ok_or(RequestError::ServerError)?;
    Ok(Redirect::to(&profile_url(&author.username)))
}

// ----------------- Comment Handlers -----------------
pub async fn create_comment(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(post_id): Path<i64>,
    Json(request): Json<CommentRequest>,
) -> Result<Redirect, RequestError> {
    let AuthUser { id, .. } = maybe_user.require_user()?;
    if request.text.trim().is_empty() {
        return Err(RequestError::RunTimeError("Comment text is required"));
    }
    create_comment_in_db(&pool, post_id, id, request).await?;
    Ok(Redirect::to(&post_detail_url(post_id)))
}

async fn resolve_comment_mutation(
    pool: &SqlitePool,
    maybe_user: &MaybeUser,
    post_id: i64,
    comment_id: i64,
) -> Result<i64, RequestError> {
    let comment = get_comment_by_id(pool, comment_id)
        .await?
        .ok_or(RequestError::NotFound)?;
    if get_post_by_id(pool, post_id).await?.is_none() {
        return Err(RequestError::NotFound);
    }
    match policy::check_comment_mutation(&comment, post_id, maybe_user.viewer()) {
        CommentDecision::Allow => Ok(comment.id),
        CommentDecision::NotFound => Err(RequestError::NotFound),
        CommentDecision::Denied => Err(RequestError::Redirect(post_detail_url(post_id))),
    }
}

pub async fn update_comment(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path((post_id, comment_id)): Path<(i64, i64)>,
    Json(request): Json<CommentRequest>,
) -> Result<Redirect, RequestError> {
    let comment_id = resolve_comment_mutation(&pool, &maybe_user, post_id, comment_id).await?;
    if request.text.trim().is_empty() {
        return Err(RequestError::RunTimeError("Comment text is required"));
    }
    update_comment_in_db(&pool, comment_id, request).await?;
    Ok(Redirect::to(&post_detail_url(post_id)))
}

pub async fn delete_comment(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> Result<Redirect, RequestError> {
    let comment_id = resolve_comment_mutation(&pool, &maybe_user, post_id, comment_id).await?;
    delete_comment_in_db(&pool, comment_id).await?;
    Ok(Redirect::to(&post_detail_url(post_id)))
}
