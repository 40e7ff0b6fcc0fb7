use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::{get, post},
    Form, Router,
};

use crate::error::AppError;
use crate::flash::{Flash, Flashes, Layout};
use crate::models::{Post, User, UserFields, UserWithPosts};
use crate::routes::{FormFields, RecordId};
use crate::AppState;

#[derive(Template)]
#[template(path = "users/list.html")]
struct UserListTemplate {
    layout: Layout,
    users: Vec<User>,
}

#[derive(Template)]
#[template(path = "users/form.html")]
struct UserFormTemplate {
    layout: Layout,
    user: Option<User>,
}

#[derive(Template)]
#[template(path = "users/show.html")]
struct UserShowTemplate {
    layout: Layout,
    user: User,
    posts: Vec<Post>,
}

fn user_fields(form: &FormFields) -> Result<UserFields, AppError> {
    Ok(UserFields {
        first_name: form.required("first_name")?,
        last_name: form.required("last_name")?,
        image_url: form.optional("image_url").unwrap_or_default(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/new", get(new_user_form).post(create_user))
        .route("/users/{id}", get(show_user))
        .route("/users/{id}/edit", get(edit_user_form).post(update_user))
        .route("/users/{id}/delete", post(delete_user))
}

async fn list_users(
    State(state): State<AppState>,
    flashes: Flashes,
) -> Result<impl IntoResponse, AppError> {
    let users = User::list(&state.db).await?;

    let template = UserListTemplate {
        layout: Layout::new(flashes).await,
        users,
    };
    Ok(Html(template.render()?))
}

async fn new_user_form(flashes: Flashes) -> Result<impl IntoResponse, AppError> {
    let template = UserFormTemplate {
        layout: Layout::new(flashes).await,
        user: None,
    };
    Ok(Html(template.render()?))
}

async fn create_user(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Flash, AppError> {
    let fields = user_fields(&FormFields::new(pairs))?;
    let user = User::create(&state.db, &fields).await?;

    Ok(Flash::new(
        "/users",
        format!("User '{}' added.", user.full_name()),
    ))
}

async fn show_user(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    flashes: Flashes,
) -> Result<impl IntoResponse, AppError> {
    let UserWithPosts { user, posts } = User::with_posts(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;

    let template = UserShowTemplate {
        layout: Layout::new(flashes).await,
        user,
        posts,
    };
    Ok(Html(template.render()?))
}

async fn edit_user_form(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    flashes: Flashes,
) -> Result<impl IntoResponse, AppError> {
    let user = User::find(&state.db, id).await?.ok_or(AppError::NotFound)?;

    let template = UserFormTemplate {
        layout: Layout::new(flashes).await,
        user: Some(user),
    };
    Ok(Html(template.render()?))
}

async fn update_user(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Flash, AppError> {
    let fields = user_fields(&FormFields::new(pairs))?;
    let user = User::update(&state.db, id, &fields)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Flash::new(
        "/users",
        format!("User '{}' edited.", user.full_name()),
    ))
}

async fn delete_user(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Flash, AppError> {
    let user = User::delete(&state.db, id).await?.ok_or(AppError::NotFound)?;

    Ok(Flash::new(
        "/users",
        format!("User '{}' deleted.", user.full_name()),
    ))
}
