#![allow(dead_code)]

use axum::body::Body;
use http_body_util::BodyExt;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
}

impl TestApp {
    pub async fn new() -> Self {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("Failed to create in-memory SQLite pool");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let router = blogly::build_app(pool.clone(), false)
            .await
            .expect("Failed to build app");

        Self { router, db: pool }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    /// Insert a user directly and return its id.
    pub async fn create_user(&self, first_name: &str, last_name: &str) -> i64 {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO users (first_name, last_name, image_url) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(first_name)
        .bind(last_name)
        .bind("https://example.com/avatar.png")
        .fetch_one(&self.db)
        .await
        .expect("Failed to create test user");
        id
    }

    /// Insert a post with an explicit creation time and return its id.
    pub async fn create_post(&self, user_id: i64, title: &str, created_at: &str) -> i64 {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO posts (title, content, created_at, user_id) VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(title)
        .bind(format!("Body of {title}"))
        .bind(created_at)
        .bind(user_id)
        .fetch_one(&self.db)
        .await
        .expect("Failed to create test post");
        id
    }

    /// Insert a tag and return its id.
    pub async fn create_tag(&self, name: &str) -> i64 {
        let (id,): (i64,) = sqlx::query_as("INSERT INTO tags (name) VALUES (?) RETURNING id")
            .bind(name)
            .fetch_one(&self.db)
            .await
            .expect("Failed to create test tag");
        id
    }

    pub async fn tag_post(&self, post_id: i64, tag_id: i64) {
        sqlx::query("INSERT INTO posts_tags (post_id, tag_id) VALUES (?, ?)")
            .bind(post_id)
            .bind(tag_id)
            .execute(&self.db)
            .await
            .expect("Failed to tag test post");
    }

    /// Tag ids linked to a post, in id order.
    pub async fn tag_ids_of(&self, post_id: i64) -> Vec<i64> {
        let rows: Vec<(i64,)> =
            sqlx::query_as("SELECT tag_id FROM posts_tags WHERE post_id = ? ORDER BY tag_id")
                .bind(post_id)
                .fetch_all(&self.db)
                .await
                .unwrap();
        rows.into_iter().map(|(id,)| id).collect()
    }

    pub async fn count(&self, table: &str) -> i64 {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.db)
            .await
            .unwrap();
        count
    }

    /// Send a GET request with an optional session cookie.
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let req = builder.body(Body::empty()).unwrap();
        self.request(req).await
    }

    /// Send a POST form request with an optional session cookie.
    pub async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .uri(uri)
            .method("POST")
            .header("content-type", "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let req = builder.body(Body::from(body.to_string())).unwrap();
        self.request(req).await
    }
}

/// Read the full response body as a String.
pub async fn body_string(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// The `name=value` part of the session cookie a response sets.
pub fn session_cookie(resp: &Response) -> String {
    resp.headers()
        .get("set-cookie")
        .expect("Response should set a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

/// Assert that a response is a redirect to the given location.
pub fn assert_redirect(resp: &Response, expected_location: &str) {
    assert!(
        resp.status().is_redirection(),
        "Expected redirect, got {}",
        resp.status()
    );
    let location = resp
        .headers()
        .get("location")
        .expect("Redirect should have location header")
        .to_str()
        .unwrap();
    assert_eq!(location, expected_location);
}

/// Assert that the page shows `message` as a flash. Quotes in the message are
/// HTML-escaped by the templates, so either numeric entity is accepted.
pub fn assert_flash(html: &str, message: &str) {
    let hex = message.replace('\'', "&#x27;");
    let dec = message.replace('\'', "&#39;");
    assert!(
        html.contains(&hex) || html.contains(&dec),
        "Expected flash {message:?} in page"
    );
}
