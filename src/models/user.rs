use sqlx::{FromRow, SqlitePool};

use super::Post;

pub const DEFAULT_IMAGE_URL: &str =
    "https://www.freeiconspng.com/uploads/icon-user-blue-symbol-people-person-generic--public-domain--21.png";

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub image_url: String,
}

/// Mutable user fields as submitted by the user forms.
#[derive(Debug, Clone)]
pub struct UserFields {
    pub first_name: String,
    pub last_name: String,
    pub image_url: String,
}

impl UserFields {
    /// The image URL to store: the submitted one, or the placeholder when blank.
    pub fn image_url_or_default(&self) -> &str {
        let url = self.image_url.trim();
        if url.is_empty() { DEFAULT_IMAGE_URL } else { url }
    }
}

pub struct UserWithPosts {
    pub user: User,
    pub posts: Vec<Post>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub async fn create(db: &SqlitePool, fields: &UserFields) -> Result<User, sqlx::Error> {
        let mut tx = db.begin().await?;
        let user: User = sqlx::query_as(
            "INSERT INTO users (first_name, last_name, image_url) VALUES (?, ?, ?) RETURNING *",
        )
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(fields.image_url_or_default())
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::info!(user_id = user.id, "created user");
        Ok(user)
    }

    pub async fn find(db: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// All users ordered by last name, then first name.
    pub async fn list(db: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM users ORDER BY last_name ASC, first_name ASC, id ASC")
            .fetch_all(db)
            .await
    }

    pub async fn update(
        db: &SqlitePool,
        id: i64,
        fields: &UserFields,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut tx = db.begin().await?;
        let user: Option<User> = sqlx::query_as(
            r#"
            UPDATE users SET first_name = ?, last_name = ?, image_url = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(fields.image_url_or_default())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;

        if user.is_some() {
            tracing::info!(user_id = id, "updated user");
        }
        Ok(user)
    }

    /// Deletes the user. Posts owned by the user go with it through the
    /// `ON DELETE CASCADE` on `posts.user_id`, and their tag links with them.
    pub async fn delete(db: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
        let mut tx = db.begin().await?;
        let user: Option<User> = sqlx::query_as("DELETE FROM users WHERE id = ? RETURNING *")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;

        if user.is_some() {
            tracing::info!(user_id = id, "deleted user and their posts");
        }
        Ok(user)
    }

    pub async fn with_posts(db: &SqlitePool, id: i64) -> Result<Option<UserWithPosts>, sqlx::Error> {
        let Some(user) = User::find(db, id).await? else {
            return Ok(None);
        };

        let posts: Vec<Post> = sqlx::query_as(
            "SELECT * FROM posts WHERE user_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(id)
        .fetch_all(db)
        .await?;

        Ok(Some(UserWithPosts { user, posts }))
    }
}
