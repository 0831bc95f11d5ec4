//! Visibility and authorization decisions.
//!
//! Every listing, detail view and mutation workflow calls into this module
//! explicitly; nothing else in the crate decides who may see or change what.
//! All functions are pure so the rules stay testable without a database.

use chrono::{DateTime, Utc};

use crate::models::{Comment, FeedPost};

/// The identity making the current request, as handed to us by the
/// authentication layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    User(i64),
}

impl Viewer {
    pub fn id(&self) -> Option<i64> {
        match self {
            Viewer::Anonymous => None,
            Viewer::User(id) => Some(*id),
        }
    }

    pub fn is(&self, user_id: i64) -> bool {
        matches!(self, Viewer::User(id) if *id == user_id)
    }
}

impl From<Option<i64>> for Viewer {
    fn from(id: Option<i64>) -> Self {
        match id {
            Some(id) => Viewer::User(id),
            None => Viewer::Anonymous,
        }
    }
}

/// Whether a post may be shown to `viewer` at all.
///
/// Authors always see their own posts, drafts and scheduled ones included.
/// Everyone else only sees a post once it is published, its publication date
/// has passed and its category (if any) is itself published.
pub fn is_post_visible(post: &FeedPost, viewer: Viewer, now: DateTime<Utc>) -> bool {
    if viewer.is(post.author_id) {
        return true;
    }
    post.is_published
        && post.pub_date <= now
        && post.category_is_published.unwrap_or(true)
}

/// Edit and delete are owner-only; create only needs an authenticated viewer,
/// which the extractor enforces before this module is ever reached.
pub fn can_mutate_post(author_id: i64, viewer: Viewer) -> bool {
    viewer.is(author_id)
}

/// Outcome of a comment edit/delete check. The two denial shapes are
/// deliberately different: a comment that does not belong to the post named
/// in the request path must look like it does not exist, while a comment
/// owned by someone else is turned away with a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentDecision {
    Allow,
    NotFound,
    Denied,
}

pub fn check_comment_mutation(
    comment: &Comment,
    path_post_id: i64,
    viewer: Viewer,
) -> CommentDecision {
    if comment.post_id != path_post_id {
        return CommentDecision::NotFound;
    }
    if !viewer.is(comment.author_id) {
        return CommentDecision::Denied;
    }
    CommentDecision::Allow
}

/// The only context where the public predicate is lifted: a profile feed
/// viewed by its owner. Global and category feeds never get a bypass.
pub fn feed_owner_bypass(owner_id: i64, viewer: Viewer) -> Option<i64> {
    viewer.is(owner_id).then_some(owner_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn post(
        author_id: i64,
        is_published: bool,
        pub_date: DateTime<Utc>,
        category_is_published: Option<bool>,
    ) -> FeedPost {
        FeedPost {
            id: 1,
            title: "title".to_owned(),
            text: "text".to_owned(),
            image: None,
            pub_date,
            is_published,
            created_at: pub_date.naive_utc(),
            author_id,
            author_username: "author".to_owned(),
            category_id: category_is_published.map(|_| 7),
            category_title: category_is_published.map(|_| "cat".to_owned()),
            category_slug: category_is_published.map(|_| "cat".to_owned()),
            category_is_published,
            location_id: None,
            location_name: None,
            comment_count: 0,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn published_past_post_is_visible_to_everyone() {
        let p = post(1, true, now() - Duration::hours(1), Some(true));
        assert!(is_post_visible(&p, Viewer::Anonymous, now()));
        assert!(is_post_visible(&p, Viewer::User(2), now()));
    }

    #[test]
    fn unpublished_post_is_hidden_from_others() {
        let p = post(1, false, now() - Duration::hours(1), Some(true));
        assert!(!is_post_visible(&p, Viewer::Anonymous, now()));
        assert!(!is_post_visible(&p, Viewer::User(2), now()));
    }

    #[test]
    fn scheduled_post_is_hidden_until_pub_date() {
        let p = post(1, true, now() + Duration::hours(1), Some(true));
        assert!(!is_post_visible(&p, Viewer::User(2), now()));
        assert!(is_post_visible(&p, Viewer::User(2), now() + Duration::hours(2)));
    }

    #[test]
    fn post_in_hidden_category_is_hidden_from_others() {
        let p = post(1, true, now() - Duration::hours(1), Some(false));
        assert!(!is_post_visible(&p, Viewer::User(2), now()));
    }

    #[test]
    fn post_without_category_only_needs_own_flags() {
        let p = post(1, true, now() - Duration::hours(1), None);
        assert!(is_post_visible(&p, Viewer::Anonymous, now()));
    }

    #[test]
    fn author_sees_own_post_regardless_of_flags() {
        for p in [
            post(1, false, now() - Duration::hours(1), Some(true)),
            post(1, true, now() + Duration::days(30), Some(true)),
            post(1, false, now() + Duration::days(30), Some(false)),
        ] {
            assert!(is_post_visible(&p, Viewer::User(1), now()));
        }
    }

    #[test]
    fn only_the_author_may_mutate_a_post() {
        assert!(can_mutate_post(1, Viewer::User(1)));
        assert!(!can_mutate_post(1, Viewer::User(2)));
        assert!(!can_mutate_post(1, Viewer::Anonymous));
    }

    fn comment(author_id: i64, post_id: i64) -> Comment {
        Comment {
            id: 5,
            text: "hi".to_owned(),
            created_at: now().naive_utc(),
            post_id,
            author_id,
        }
    }

    #[test]
    fn comment_owner_on_matching_post_is_allowed() {
        let c = comment(3, 10);
        assert_eq!(check_comment_mutation(&c, 10, Viewer::User(3)), CommentDecision::Allow);
    }

    #[test]
    fn cross_post_comment_looks_missing_even_to_its_owner() {
        let c = comment(3, 10);
        assert_eq!(check_comment_mutation(&c, 11, Viewer::User(3)), CommentDecision::NotFound);
        assert_eq!(check_comment_mutation(&c, 11, Viewer::User(4)), CommentDecision::NotFound);
    }

    #[test]
    fn wrong_author_on_matching_post_is_denied() {
        let c = comment(3, 10);
        assert_eq!(check_comment_mutation(&c, 10, Viewer::User(4)), CommentDecision::Denied);
        assert_eq!(check_comment_mutation(&c, 10, Viewer::Anonymous), CommentDecision::Denied);
    }

    #[test]
    fn bypass_only_for_the_profile_owner() {
        assert_eq!(feed_owner_bypass(1, Viewer::User(1)), Some(1));
        assert_eq!(feed_owner_bypass(1, Viewer::User(2)), None);
        assert_eq!(feed_owner_bypass(1, Viewer::Anonymous), None);
    }
}
