use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use sqlx::{SqliteConnection, SqlitePool};
use std::fs;

use crate::models::post::timestamp_now;
use crate::models::UserFields;

#[derive(Deserialize)]
struct SeedData {
    #[serde(default)]
    users: Vec<SeedUser>,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Deserialize)]
struct SeedUser {
    first_name: String,
    last_name: String,
    #[serde(default)]
    image_url: String,
    #[serde(default)]
    posts: Vec<SeedPost>,
}

#[derive(Deserialize)]
struct SeedPost {
    title: String,
    content: String,
    created_at: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub posts: usize,
    pub tags: usize,
}

pub async fn seed_file(pool: &SqlitePool, file_path: &str) -> Result<SeedSummary, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(file_path)?;
    seed_json(pool, &content).await
}

/// Loads a seed document in a single transaction. Tags are looked up by
/// name and created on first use, so reseeding never duplicates a tag.
pub async fn seed_json(pool: &SqlitePool, content: &str) -> Result<SeedSummary, Box<dyn std::error::Error>> {
    let data: SeedData = serde_json::from_str(content)?;

    let mut summary = SeedSummary::default();
    let mut tx = pool.begin().await?;

    for tag_name in &data.tags {
        if tag_id_for(&mut *tx, tag_name, &mut summary).await?.is_none() {
            tracing::warn!("skipping blank tag name");
        }
    }

    for user in data.users {
        let fields = UserFields {
            first_name: user.first_name,
            last_name: user.last_name,
            image_url: user.image_url,
        };

        let (user_id,): (i64,) = sqlx::query_as(
            "INSERT INTO users (first_name, last_name, image_url) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(fields.image_url_or_default())
        .fetch_one(&mut *tx)
        .await?;
        summary.users += 1;

        for post in user.posts {
            let created_at = match post.created_at.as_deref() {
                Some(raw) => normalize_timestamp(raw)?,
                None => timestamp_now(),
            };
            let (post_id,): (i64,) = sqlx::query_as(
                "INSERT INTO posts (title, content, created_at, user_id) VALUES (?, ?, ?, ?) RETURNING id",
            )
            .bind(&post.title)
            .bind(&post.content)
            .bind(&created_at)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
            summary.posts += 1;

            for tag_name in &post.tags {
                let Some(tag_id) = tag_id_for(&mut *tx, tag_name, &mut summary).await? else {
                    continue;
                };
                sqlx::query("INSERT OR IGNORE INTO posts_tags (post_id, tag_id) VALUES (?, ?)")
                    .bind(post_id)
                    .bind(tag_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }
    }

    tx.commit().await?;
    tracing::info!(
        users = summary.users,
        posts = summary.posts,
        tags = summary.tags,
        "seeded database"
    );
    Ok(summary)
}

/// Rewrites any RFC 3339 timestamp in the fixed-width UTC form posts are
/// stored in, so seeded posts sort alongside ones created through the app.
fn normalize_timestamp(raw: &str) -> Result<String, chrono::ParseError> {
    let at = DateTime::parse_from_rfc3339(raw.trim())?;
    Ok(at
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Micros, true))
}

async fn tag_id_for(
    conn: &mut SqliteConnection,
    name: &str,
    summary: &mut SeedSummary,
) -> Result<Option<i64>, sqlx::Error> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(None);
    }

    let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM tags WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

    if let Some((id,)) = existing {
        return Ok(Some(id));
    }

    let (id,): (i64,) = sqlx::query_as("INSERT INTO tags (name) VALUES (?) RETURNING id")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;
    summary.tags += 1;
    Ok(Some(id))
}
