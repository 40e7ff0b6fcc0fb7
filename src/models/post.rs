use chrono::{DateTime, Local, SecondsFormat, TimeZone, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use super::{PostTag, Tag, User};

#[derive(Debug, Clone, FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub user_id: i64,
}

#[derive(Debug, Clone)]
pub struct PostFields {
    pub title: String,
    pub content: String,
}

pub struct PostWithTags {
    pub post: Post,
    pub author: User,
    pub tags: Vec<Tag>,
}

pub struct RecentPost {
    pub post: Post,
    pub author_name: String,
}

/// Post joined with its author's name, for the homepage listing
#[derive(FromRow)]
struct PostWithAuthorRow {
    id: i64,
    title: String,
    content: String,
    created_at: String,
    user_id: i64,
    first_name: String,
    last_name: String,
}

impl PostWithAuthorRow {
    fn into_recent_post(self) -> RecentPost {
        RecentPost {
            author_name: format!("{} {}", self.first_name, self.last_name),
            post: Post {
                id: self.id,
                title: self.title,
                content: self.content,
                created_at: self.created_at,
                user_id: self.user_id,
            },
        }
    }
}

/// Timestamp for a new post. Fixed-width so that text order is time order.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Formats as e.g. "Mon Jan 5 2026, 3:07 PM".
pub fn format_friendly<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%a %b %-d %Y, %-I:%M %p").to_string()
}

impl Post {
    /// Creation time in local time, formatted for display.
    pub fn friendly_date(&self) -> String {
        match DateTime::parse_from_rfc3339(&self.created_at) {
            Ok(at) => format_friendly(&at.with_timezone(&Local)),
            Err(_) => self.created_at.clone(),
        }
    }

    /// Creates a post for `user_id` and links it to whichever of `tag_ids`
    /// exist. Unknown tag ids are dropped.
    pub async fn create(
        db: &SqlitePool,
        user_id: i64,
        fields: &PostFields,
        tag_ids: &[i64],
    ) -> Result<Post, sqlx::Error> {
        let mut tx = db.begin().await?;

        let post: Post = sqlx::query_as(
            r#"
            INSERT INTO posts (title, content, created_at, user_id)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.content)
        .bind(timestamp_now())
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let tags = Tag::find_many(&mut *tx, tag_ids).await?;
        PostTag::replace_for_post(&mut *tx, post.id, &tags).await?;

        tx.commit().await?;

        tracing::info!(post_id = post.id, user_id, tags = tags.len(), "created post");
        Ok(post)
    }

    pub async fn find(db: &SqlitePool, id: i64) -> Result<Option<Post>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Posts whose id is in `ids`, in id order. Missing ids are skipped.
    pub async fn find_many<'c, E>(executor: E, ids: &[i64]) -> Result<Vec<Post>, sqlx::Error>
    where
        E: sqlx::Executor<'c, Database = Sqlite>,
    {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM posts WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY id");

        query.build_query_as::<Post>().fetch_all(executor).await
    }

    pub async fn list(db: &SqlitePool) -> Result<Vec<Post>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM posts ORDER BY id")
            .fetch_all(db)
            .await
    }

    /// The `limit` most recently created posts with their authors, newest first.
    pub async fn recent(db: &SqlitePool, limit: i64) -> Result<Vec<RecentPost>, sqlx::Error> {
        let rows: Vec<PostWithAuthorRow> = sqlx::query_as(
            r#"
            SELECT p.*, u.first_name, u.last_name
            FROM posts p
            JOIN users u ON u.id = p.user_id
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(db)
        .await?;

        Ok(rows.into_iter().map(PostWithAuthorRow::into_recent_post).collect())
    }

    /// Overwrites title and content and replaces the tag set.
    pub async fn update(
        db: &SqlitePool,
        id: i64,
        fields: &PostFields,
        tag_ids: &[i64],
    ) -> Result<Option<Post>, sqlx::Error> {
        let mut tx = db.begin().await?;

        let post: Option<Post> = sqlx::query_as(
            "UPDATE posts SET title = ?, content = ? WHERE id = ? RETURNING *",
        )
        .bind(&fields.title)
        .bind(&fields.content)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(post) = post else {
            return Ok(None);
        };

        let tags = Tag::find_many(&mut *tx, tag_ids).await?;
        PostTag::replace_for_post(&mut *tx, post.id, &tags).await?;

        tx.commit().await?;

        tracing::info!(post_id = id, tags = tags.len(), "updated post");
        Ok(Some(post))
    }

    pub async fn delete(db: &SqlitePool, id: i64) -> Result<Option<Post>, sqlx::Error> {
        let mut tx = db.begin().await?;
        let post: Option<Post> = sqlx::query_as("DELETE FROM posts WHERE id = ? RETURNING *")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;

        if post.is_some() {
            tracing::info!(post_id = id, "deleted post");
        }
        Ok(post)
    }

    pub async fn with_tags(db: &SqlitePool, id: i64) -> Result<Option<PostWithTags>, sqlx::Error> {
        let Some(post) = Post::find(db, id).await? else {
            return Ok(None);
        };

        // posts.user_id is NOT NULL with a cascading foreign key, so the author exists
        let author: User = sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(post.user_id)
            .fetch_one(db)
            .await?;

        let tags: Vec<Tag> = sqlx::query_as(
            r#"
            SELECT t.* FROM tags t
            JOIN posts_tags pt ON pt.tag_id = t.id
            WHERE pt.post_id = ?
            ORDER BY t.name
            "#,
        )
        .bind(id)
        .fetch_all(db)
        .await?;

        Ok(Some(PostWithTags { post, author, tags }))
    }
}
