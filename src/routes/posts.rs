use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::{get, post},
    Form, Router,
};

use crate::error::AppError;
use crate::flash::{Flash, Flashes, Layout};
use crate::models::{Post, PostFields, PostWithTags, Tag, User};
use crate::routes::{Choice, FormFields, RecordId};
use crate::AppState;

#[derive(Template)]
#[template(path = "posts/form.html")]
struct PostFormTemplate {
    layout: Layout,
    user: User,
    post: Option<Post>,
    tags: Vec<Choice>,
}

#[derive(Template)]
#[template(path = "posts/show.html")]
struct PostShowTemplate {
    layout: Layout,
    post: Post,
    author: User,
    tags: Vec<Tag>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/{id}/posts/new", get(new_post_form).post(create_post))
        .route("/posts/{id}", get(show_post))
        .route("/posts/{id}/edit", get(edit_post_form).post(update_post))
        .route("/posts/{id}/delete", post(delete_post))
}

fn tag_choices(all: Vec<Tag>, selected: &[Tag]) -> Vec<Choice> {
    all.into_iter()
        .map(|tag| Choice {
            checked: selected.iter().any(|s| s.id == tag.id),
            id: tag.id,
            label: tag.name,
        })
        .collect()
}

fn post_fields(form: &FormFields) -> Result<PostFields, AppError> {
    Ok(PostFields {
        title: form.required("title")?,
        content: form.required("content")?,
    })
}

async fn new_post_form(
    State(state): State<AppState>,
    RecordId(user_id): RecordId,
    flashes: Flashes,
) -> Result<impl IntoResponse, AppError> {
    let user = User::find(&state.db, user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let tags = Tag::list(&state.db).await?;

    let template = PostFormTemplate {
        layout: Layout::new(flashes).await,
        user,
        post: None,
        tags: tag_choices(tags, &[]),
    };
    Ok(Html(template.render()?))
}

async fn create_post(
    State(state): State<AppState>,
    RecordId(user_id): RecordId,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Flash, AppError> {
    let user = User::find(&state.db, user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let form = FormFields::new(pairs);
    let fields = post_fields(&form)?;
    let post = Post::create(&state.db, user.id, &fields, &form.ids("tags")).await?;

    Ok(Flash::new(
        format!("/users/{}", user.id),
        format!("Post '{}' added.", post.title),
    ))
}

async fn show_post(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    flashes: Flashes,
) -> Result<impl IntoResponse, AppError> {
    let PostWithTags { post, author, tags } = Post::with_tags(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;

    let template = PostShowTemplate {
        layout: Layout::new(flashes).await,
        post,
        author,
        tags,
    };
    Ok(Html(template.render()?))
}

async fn edit_post_form(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    flashes: Flashes,
) -> Result<impl IntoResponse, AppError> {
    let PostWithTags { post, author, tags } = Post::with_tags(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let all_tags = Tag::list(&state.db).await?;

    let template = PostFormTemplate {
        layout: Layout::new(flashes).await,
        user: author,
        post: Some(post),
        tags: tag_choices(all_tags, &tags),
    };
    Ok(Html(template.render()?))
}

async fn update_post(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Flash, AppError> {
    let form = FormFields::new(pairs);
    let fields = post_fields(&form)?;
    let post = Post::update(&state.db, id, &fields, &form.ids("tags"))
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Flash::new(
        format!("/users/{}", post.user_id),
        format!("Post '{}' edited.", post.title),
    ))
}

async fn delete_post(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Flash, AppError> {
    let post = Post::delete(&state.db, id).await?.ok_or(AppError::NotFound)?;

    Ok(Flash::new(
        format!("/users/{}", post.user_id),
        format!("Post '{}' deleted.", post.title),
    ))
}
