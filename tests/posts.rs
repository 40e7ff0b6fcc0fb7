mod common;

use axum::http::StatusCode;
use common::{assert_redirect, body_string, TestApp};

#[tokio::test]
async fn new_post_form_lists_all_tags() {
    let app = TestApp::new().await;
    let user_id = app.create_user("Ada", "Lovelace").await;
    app.create_tag("math").await;
    app.create_tag("poetry").await;

    let resp = app.get(&format!("/users/{user_id}/posts/new"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("math"));
    assert!(html.contains("poetry"));
    assert!(html.contains("Ada Lovelace"));
}

#[tokio::test]
async fn new_post_form_for_missing_user_is_not_found() {
    let app = TestApp::new().await;

    let resp = app.get("/users/9999/posts/new", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app
        .post_form("/users/9999/posts/new", "title=Orphan&content=Nobody", None)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.count("posts").await, 0);
}

#[tokio::test]
async fn create_post_redirects_to_author() {
    let app = TestApp::new().await;
    let user_id = app.create_user("Ada", "Lovelace").await;

    let resp = app
        .post_form(
            &format!("/users/{user_id}/posts/new"),
            "title=First+Post&content=Hello+there",
            None,
        )
        .await;
    assert_redirect(&resp, &format!("/users/{user_id}"));

    let (title, owner): (String, i64) = sqlx::query_as("SELECT title, user_id FROM posts")
        .fetch_one(&app.db)
        .await
        .unwrap();
    assert_eq!(title, "First Post");
    assert_eq!(owner, user_id);
}

#[tokio::test]
async fn create_post_drops_unknown_tag_ids() {
    let app = TestApp::new().await;
    let user_id = app.create_user("Ada", "Lovelace").await;
    let tag_id = app.create_tag("math").await;
    assert_eq!(tag_id, 1);

    app.post_form(
        &format!("/users/{user_id}/posts/new"),
        "title=Tagged&content=Body&tags=1&tags=3",
        None,
    )
    .await;

    let (post_id,): (i64,) = sqlx::query_as("SELECT id FROM posts WHERE title = 'Tagged'")
        .fetch_one(&app.db)
        .await
        .unwrap();
    assert_eq!(app.tag_ids_of(post_id).await, vec![1]);
}

#[tokio::test]
async fn create_post_missing_title_is_bad_request() {
    let app = TestApp::new().await;
    let user_id = app.create_user("Ada", "Lovelace").await;

    let resp = app
        .post_form(&format!("/users/{user_id}/posts/new"), "content=Body", None)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.count("posts").await, 0);
}

#[tokio::test]
async fn show_post_includes_author_tags_and_date() {
    let app = TestApp::new().await;
    let user_id = app.create_user("Ada", "Lovelace").await;
    let post_id = app
        .create_post(user_id, "On Engines", "2024-03-16T09:30:00.000000Z")
        .await;
    let tag_id = app.create_tag("machines").await;
    app.tag_post(post_id, tag_id).await;

    let resp = app.get(&format!("/posts/{post_id}"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("On Engines"));
    assert!(html.contains("Ada Lovelace"));
    assert!(html.contains("machines"));
    assert!(html.contains("2024"));
}

#[tokio::test]
async fn missing_post_is_not_found() {
    let app = TestApp::new().await;

    assert_eq!(app.get("/posts/9999", None).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.get("/posts/9999/edit", None).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        app.post_form("/posts/9999/delete", "", None).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn edit_form_checks_current_tags() {
    let app = TestApp::new().await;
    let user_id = app.create_user("Ada", "Lovelace").await;
    let post_id = app.create_post(user_id, "Draft", "2024-01-01T00:00:00.000000Z").await;
    let math = app.create_tag("math").await;
    app.create_tag("poetry").await;
    app.tag_post(post_id, math).await;

    let resp = app.get(&format!("/posts/{post_id}/edit"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains(&format!("value=\"{math}\" checked")));
    assert!(html.contains("value=\"Draft\""));
    assert_eq!(html.matches(" checked").count(), 1);
}

#[tokio::test]
async fn update_post_replaces_tag_set() {
    let app = TestApp::new().await;
    let user_id = app.create_user("Ada", "Lovelace").await;
    let post_id = app.create_post(user_id, "Draft", "2024-01-01T00:00:00.000000Z").await;
    let math = app.create_tag("math").await;
    let poetry = app.create_tag("poetry").await;
    let music = app.create_tag("music").await;
    app.tag_post(post_id, math).await;
    app.tag_post(post_id, poetry).await;

    let body = format!("title=Final&content=Done&tags={poetry}&tags={music}");
    let resp = app
        .post_form(&format!("/posts/{post_id}/edit"), &body, None)
        .await;
    assert_redirect(&resp, &format!("/users/{user_id}"));

    assert_eq!(app.tag_ids_of(post_id).await, vec![poetry, music]);
    let (title, content): (String, String) =
        sqlx::query_as("SELECT title, content FROM posts WHERE id = ?")
            .bind(post_id)
            .fetch_one(&app.db)
            .await
            .unwrap();
    assert_eq!(title, "Final");
    assert_eq!(content, "Done");
}

#[tokio::test]
async fn update_post_without_tags_clears_them() {
    let app = TestApp::new().await;
    let user_id = app.create_user("Ada", "Lovelace").await;
    let post_id = app.create_post(user_id, "Draft", "2024-01-01T00:00:00.000000Z").await;
    let math = app.create_tag("math").await;
    app.tag_post(post_id, math).await;

    app.post_form(
        &format!("/posts/{post_id}/edit"),
        "title=Draft&content=Untagged",
        None,
    )
    .await;

    assert!(app.tag_ids_of(post_id).await.is_empty());
    assert_eq!(app.count("tags").await, 1);
}

#[tokio::test]
async fn delete_post_redirects_to_author_and_keeps_tags() {
    let app = TestApp::new().await;
    let user_id = app.create_user("Ada", "Lovelace").await;
    let post_id = app.create_post(user_id, "Draft", "2024-01-01T00:00:00.000000Z").await;
    let math = app.create_tag("math").await;
    app.tag_post(post_id, math).await;

    let resp = app
        .post_form(&format!("/posts/{post_id}/delete"), "", None)
        .await;
    assert_redirect(&resp, &format!("/users/{user_id}"));

    assert_eq!(app.count("posts").await, 0);
    assert_eq!(app.count("posts_tags").await, 0);
    assert_eq!(app.count("tags").await, 1);
    assert_eq!(app.count("users").await, 1);
}
