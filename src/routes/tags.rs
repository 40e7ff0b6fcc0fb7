use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::{get, post},
    Form, Router,
};

use crate::error::AppError;
use crate::flash::{Flash, Flashes, Layout};
use crate::models::{Post, Tag, TagWithPosts};
use crate::routes::{Choice, FormFields, RecordId};
use crate::AppState;

#[derive(Template)]
#[template(path = "tags/list.html")]
struct TagListTemplate {
    layout: Layout,
    tags: Vec<Tag>,
}

#[derive(Template)]
#[template(path = "tags/form.html")]
struct TagFormTemplate {
    layout: Layout,
    tag: Option<Tag>,
    posts: Vec<Choice>,
}

#[derive(Template)]
#[template(path = "tags/show.html")]
struct TagShowTemplate {
    layout: Layout,
    tag: Tag,
    posts: Vec<Post>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tags", get(list_tags))
        .route("/tags/new", get(new_tag_form).post(create_tag))
        .route("/tags/{id}", get(show_tag))
        .route("/tags/{id}/edit", get(edit_tag_form).post(update_tag))
        .route("/tags/{id}/delete", post(delete_tag))
}

fn post_choices(all: Vec<Post>, selected: &[Post]) -> Vec<Choice> {
    all.into_iter()
        .map(|post| Choice {
            checked: selected.iter().any(|s| s.id == post.id),
            id: post.id,
            label: post.title,
        })
        .collect()
}

async fn list_tags(
    State(state): State<AppState>,
    flashes: Flashes,
) -> Result<impl IntoResponse, AppError> {
    let tags = Tag::list(&state.db).await?;

    let template = TagListTemplate {
        layout: Layout::new(flashes).await,
        tags,
    };
    Ok(Html(template.render()?))
}

async fn new_tag_form(
    State(state): State<AppState>,
    flashes: Flashes,
) -> Result<impl IntoResponse, AppError> {
    let posts = Post::list(&state.db).await?;

    let template = TagFormTemplate {
        layout: Layout::new(flashes).await,
        tag: None,
        posts: post_choices(posts, &[]),
    };
    Ok(Html(template.render()?))
}

async fn create_tag(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Flash, AppError> {
    let form = FormFields::new(pairs);
    let name = form.required("name")?;
    let tag = Tag::create(&state.db, &name, &form.ids("posts")).await?;

    Ok(Flash::new("/tags", format!("Tag '{}' added.", tag.name)))
}

async fn show_tag(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    flashes: Flashes,
) -> Result<impl IntoResponse, AppError> {
    let TagWithPosts { tag, posts } = Tag::with_posts(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;

    let template = TagShowTemplate {
        layout: Layout::new(flashes).await,
        tag,
        posts,
    };
    Ok(Html(template.render()?))
}

async fn edit_tag_form(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    flashes: Flashes,
) -> Result<impl IntoResponse, AppError> {
    let TagWithPosts { tag, posts } = Tag::with_posts(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let all_posts = Post::list(&state.db).await?;

    let template = TagFormTemplate {
        layout: Layout::new(flashes).await,
        tag: Some(tag),
        posts: post_choices(all_posts, &posts),
    };
    Ok(Html(template.render()?))
}

async fn update_tag(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Flash, AppError> {
    let form = FormFields::new(pairs);
    let name = form.required("name")?;
    let tag = Tag::update(&state.db, id, &name, &form.ids("posts"))
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Flash::new("/tags", format!("Tag '{}' edited.", tag.name)))
}

async fn delete_tag(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Flash, AppError> {
    let tag = Tag::delete(&state.db, id).await?.ok_or(AppError::NotFound)?;

    Ok(Flash::new("/tags", format!("Tag '{}' deleted.", tag.name)))
}
