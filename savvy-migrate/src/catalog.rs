//! The SmartSavvy entity catalog.
//!
//! Declares, in the historical migration order, every entity type found in
//! the document exports: its export file, its target table, the fields copied
//! into columns and the foreign keys that must be remapped. Column names match
//! `savvy-migrate-repository/src/postgres/migrations`.
use savvy_migrate_shared::types::ColumnKind::{Boolean, Float, Integer, Json, Text, Timestamp};
use savvy_migrate_shared::types::EntitySpec;

/// Returns the full SmartSavvy catalog in declaration order.
pub fn smartsavvy() -> Vec<EntitySpec> {
    vec![
        EntitySpec::new("users", "users.json", "users")
            .column("name", "name", Text)
            .column("email", "email", Text)
            .column("emailVerified", "email_verified", Timestamp)
            .column("image", "image", Text)
            .column("role", "role", Text)
            .column("createdAt", "created_at", Timestamp)
            .column("updatedAt", "updated_at", Timestamp),
        EntitySpec::new("accounts", "accounts.json", "accounts")
            .requires("userId", "user_id", "users")
            .column("type", "type", Text)
            .column("provider", "provider", Text)
            .column("providerAccountId", "provider_account_id", Text)
            .column("refresh_token", "refresh_token", Text)
            .column("access_token", "access_token", Text)
            .column("expires_at", "expires_at", Integer)
            .column("token_type", "token_type", Text)
            .column("scope", "scope", Text)
            .column("id_token", "id_token", Text),
        EntitySpec::new("sessions", "sessions.json", "sessions")
            .requires("userId", "user_id", "users")
            .column("sessionToken", "session_token", Text)
            .column("expires", "expires", Timestamp),
        EntitySpec::new("genres", "genres.json", "genres")
            .column("name", "name", Text)
            .column("slug", "slug", Text),
        EntitySpec::new("links", "links.json", "links")
            .requires("userId", "user_id", "users")
            .optional("genreId", "genre_id", "genres")
            .column("title", "title", Text)
            .column("artistName", "artist_name", Text)
            .column("songName", "song_name", Text)
            .column("slug", "slug", Text)
            .column("url", "url", Text)
            .column("image", "image", Text)
            .column("pixelId", "pixel_id", Text)
            .column("platforms", "platforms", Json)
            .column("clicks", "clicks", Integer)
            .column("visits", "visits", Integer)
            .column("createdAt", "created_at", Timestamp)
            .column("updatedAt", "updated_at", Timestamp),
        EntitySpec::new("conversion_logs", "conversionlogs.json", "conversion_logs")
            .requires("linkId", "link_id", "links")
            .column("platform", "platform", Text)
            .column("event", "event", Text)
            .column("ip", "ip", Text)
            .column("userAgent", "user_agent", Text)
            .column("createdAt", "created_at", Timestamp),
        EntitySpec::new("link_trackings", "linktrackings.json", "link_trackings")
            .requires("linkId", "link_id", "links")
            .column("platform", "platform", Text)
            .column("clicks", "clicks", Integer)
            .column("date", "date", Timestamp)
            .disabled_by_default(),
        EntitySpec::new("projects", "projects.json", "projects")
            .requires("userId", "user_id", "users")
            .column("name", "name", Text)
            .column("description", "description", Text)
            .column("budget", "budget", Float)
            .column("createdAt", "created_at", Timestamp)
            .column("updatedAt", "updated_at", Timestamp),
        EntitySpec::new("campaigns", "campaigns.json", "campaigns")
            .requires("projectId", "project_id", "projects")
            .optional("userId", "user_id", "users")
            .column("name", "name", Text)
            .column("platform", "platform", Text)
            .column("objective", "objective", Text)
            .column("budget", "budget", Float)
            .column("spent", "spent", Float)
            .column("startDate", "start_date", Timestamp)
            .column("endDate", "end_date", Timestamp)
            .column("status", "status", Text)
            .column("metaCampaignId", "meta_campaign_id", Text)
            .column("createdAt", "created_at", Timestamp),
        EntitySpec::new("posts", "posts.json", "posts")
            .requires("campaignId", "campaign_id", "campaigns")
            .column("platform", "platform", Text)
            .column("content", "content", Text)
            .column("url", "url", Text)
            .column("spend", "spend", Float)
            .column("impressions", "impressions", Integer)
            .column("clicks", "clicks", Integer)
            .column("publishedAt", "published_at", Timestamp),
        EntitySpec::new("forum_threads", "forumthreads.json", "forum_threads")
            .requires("userId", "user_id", "users")
            .column("title", "title", Text)
            .column("body", "body", Text)
            .column("category", "category", Text)
            .column("pinned", "pinned", Boolean)
            .column("createdAt", "created_at", Timestamp),
        EntitySpec::new("comments", "comments.json", "comments")
            .requires("threadId", "thread_id", "forum_threads")
            .requires("userId", "user_id", "users")
            .optional("parentId", "parent_id", "comments")
            .column("body", "body", Text)
            .column("createdAt", "created_at", Timestamp)
            .disabled_by_default(),
        EntitySpec::new("comment_votes", "commentvotes.json", "comment_votes")
            .requires("commentId", "comment_id", "comments")
            .requires("userId", "user_id", "users")
            .column("value", "value", Integer)
            .disabled_by_default(),
        EntitySpec::new("blog_posts", "blogposts.json", "blog_posts")
            .optional("authorId", "author_id", "users")
            .column("title", "title", Text)
            .column("slug", "slug", Text)
            .column("excerpt", "excerpt", Text)
            .column("content", "content", Text)
            .column("coverImage", "cover_image", Text)
            .column("tags", "tags", Json)
            .column("publishedAt", "published_at", Timestamp),
        EntitySpec::new("roadmap_items", "roadmapitems.json", "roadmap_items")
            .column("title", "title", Text)
            .column("description", "description", Text)
            .column("status", "status", Text)
            .column("votes", "votes", Integer)
            .column("eta", "eta", Timestamp),
        EntitySpec::new("courses", "courses.json", "courses")
            .column("title", "title", Text)
            .column("slug", "slug", Text)
            .column("description", "description", Text)
            .column("price", "price", Float)
            .column("published", "published", Boolean)
            .column("createdAt", "created_at", Timestamp),
        EntitySpec::new("course_videos", "coursevideos.json", "course_videos")
            .requires("courseId", "course_id", "courses")
            .column("title", "title", Text)
            .column("description", "description", Text)
            .column("videoUrl", "video_url", Text)
            .column("duration", "duration", Integer)
            .column("position", "position", Integer),
        EntitySpec::new(
            "course_video_to_users",
            "coursevideotousers.json",
            "course_video_to_users",
        )
        .requires("courseVideoId", "course_video_id", "course_videos")
        .requires("userId", "user_id", "users")
        .column("completed", "completed", Boolean)
        .column("progress", "progress", Float)
        .column("updatedAt", "updated_at", Timestamp)
        .disabled_by_default(),
        EntitySpec::new("contact_submissions", "contacts.json", "contact_submissions")
            .column("name", "name", Text)
            .column("email", "email", Text)
            .column("subject", "subject", Text)
            .column("message", "message", Text)
            .column("createdAt", "created_at", Timestamp),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_names_files_and_tables_are_unique() {
        let catalog = smartsavvy();
        let names: HashSet<_> = catalog.iter().map(|spec| spec.name).collect();
        let files: HashSet<_> = catalog.iter().map(|spec| spec.file).collect();
        let tables: HashSet<_> = catalog.iter().map(|spec| spec.table).collect();

        assert_eq!(catalog.len(), 19);
        assert_eq!(names.len(), catalog.len());
        assert_eq!(files.len(), catalog.len());
        assert_eq!(tables.len(), catalog.len());
    }

    #[test]
    fn test_foreign_keys_point_backwards_in_declaration_order() {
        let catalog = smartsavvy();
        for (index, spec) in catalog.iter().enumerate() {
            for dependency in spec.dependencies() {
                let position = catalog
                    .iter()
                    .position(|other| other.name == dependency)
                    .unwrap_or_else(|| panic!("{} references unknown {dependency}", spec.name));
                assert!(position < index, "{} must come after {dependency}", spec.name);
            }
        }
    }

    #[test]
    fn test_default_exclusions() {
        let disabled: Vec<_> = smartsavvy()
            .into_iter()
            .filter(|spec| !spec.enabled_by_default)
            .map(|spec| spec.name)
            .collect();

        assert_eq!(
            disabled,
            vec![
                "link_trackings",
                "comments",
                "comment_votes",
                "course_video_to_users"
            ]
        );
    }

    #[test]
    fn test_self_reference_is_optional() {
        let catalog = smartsavvy();
        let comments = catalog.iter().find(|spec| spec.name == "comments").unwrap();
        let parent = comments
            .foreign_keys
            .iter()
            .find(|fk| fk.references == "comments")
            .unwrap();
        assert!(!parent.required);
        assert_eq!(comments.dependencies().collect::<Vec<_>>(), vec!["forum_threads", "users"]);
    }
}
