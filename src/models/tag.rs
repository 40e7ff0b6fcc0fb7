use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use super::Post;

#[derive(Debug, Clone, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PostTag {
    pub post_id: i64,
    pub tag_id: i64,
}

pub struct TagWithPosts {
    pub tag: Tag,
    pub posts: Vec<Post>,
}

impl Tag {
    /// Creates a tag linked to whichever of `post_ids` exist. A duplicate
    /// name fails on the `UNIQUE` constraint.
    pub async fn create(db: &SqlitePool, name: &str, post_ids: &[i64]) -> Result<Tag, sqlx::Error> {
        let mut tx = db.begin().await?;

        let tag: Tag = sqlx::query_as("INSERT INTO tags (name) VALUES (?) RETURNING *")
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;

        let posts = Post::find_many(&mut *tx, post_ids).await?;
        PostTag::replace_for_tag(&mut *tx, tag.id, &posts).await?;

        tx.commit().await?;

        tracing::info!(tag_id = tag.id, posts = posts.len(), "created tag");
        Ok(tag)
    }

    pub async fn find(db: &SqlitePool, id: i64) -> Result<Option<Tag>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM tags WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Tags whose id is in `ids`, in id order. Missing ids are skipped.
    pub async fn find_many<'c, E>(executor: E, ids: &[i64]) -> Result<Vec<Tag>, sqlx::Error>
    where
        E: sqlx::Executor<'c, Database = Sqlite>,
    {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM tags WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY id");

        query.build_query_as::<Tag>().fetch_all(executor).await
    }

    pub async fn list(db: &SqlitePool) -> Result<Vec<Tag>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM tags ORDER BY id")
            .fetch_all(db)
            .await
    }

    /// Renames the tag and replaces its post set.
    pub async fn update(
        db: &SqlitePool,
        id: i64,
        name: &str,
        post_ids: &[i64],
    ) -> Result<Option<Tag>, sqlx::Error> {
        let mut tx = db.begin().await?;

        let tag: Option<Tag> = sqlx::query_as("UPDATE tags SET name = ? WHERE id = ? RETURNING *")
            .bind(name)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(tag) = tag else {
            return Ok(None);
        };

        let posts = Post::find_many(&mut *tx, post_ids).await?;
        PostTag::replace_for_tag(&mut *tx, tag.id, &posts).await?;

        tx.commit().await?;

        tracing::info!(tag_id = id, posts = posts.len(), "updated tag");
        Ok(Some(tag))
    }

    /// Deletes the tag and its join rows. Tagged posts are left alone.
    pub async fn delete(db: &SqlitePool, id: i64) -> Result<Option<Tag>, sqlx::Error> {
        let mut tx = db.begin().await?;
        let tag: Option<Tag> = sqlx::query_as("DELETE FROM tags WHERE id = ? RETURNING *")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;

        if tag.is_some() {
            tracing::info!(tag_id = id, "deleted tag");
        }
        Ok(tag)
    }

    pub async fn with_posts(db: &SqlitePool, id: i64) -> Result<Option<TagWithPosts>, sqlx::Error> {
        let Some(tag) = Tag::find(db, id).await? else {
            return Ok(None);
        };

        let posts: Vec<Post> = sqlx::query_as(
            r#"
            SELECT p.* FROM posts p
            JOIN posts_tags pt ON pt.post_id = p.id
            WHERE pt.tag_id = ?
            ORDER BY p.created_at DESC, p.id DESC
            "#,
        )
        .bind(id)
        .fetch_all(db)
        .await?;

        Ok(Some(TagWithPosts { tag, posts }))
    }
}

impl PostTag {
    /// Replaces every join row of `post_id` with one row per tag in `tags`.
    pub async fn replace_for_post(
        conn: &mut SqliteConnection,
        post_id: i64,
        tags: &[Tag],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM posts_tags WHERE post_id = ?")
            .bind(post_id)
            .execute(&mut *conn)
            .await?;

        for tag in tags {
            sqlx::query("INSERT INTO posts_tags (post_id, tag_id) VALUES (?, ?)")
                .bind(post_id)
                .bind(tag.id)
                .execute(&mut *conn)
                .await?;
        }

        Ok(())
    }

    /// Replaces every join row of `tag_id` with one row per post in `posts`.
    pub async fn replace_for_tag(
        conn: &mut SqliteConnection,
        tag_id: i64,
        posts: &[Post],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM posts_tags WHERE tag_id = ?")
            .bind(tag_id)
            .execute(&mut *conn)
            .await?;

        for post in posts {
            sqlx::query("INSERT INTO posts_tags (post_id, tag_id) VALUES (?, ?)")
                .bind(post.id)
                .bind(tag_id)
                .execute(&mut *conn)
                .await?;
        }

        Ok(())
    }
}
