use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

use crate::error::AppError;
use crate::flash::{Flashes, Layout};
use crate::models::{Post, RecentPost};
use crate::AppState;

const RECENT_POST_LIMIT: i64 = 5;

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    layout: Layout,
    posts: Vec<RecentPost>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(homepage))
}

async fn homepage(
    State(state): State<AppState>,
    flashes: Flashes,
) -> Result<impl IntoResponse, AppError> {
    let posts = Post::recent(&state.db, RECENT_POST_LIMIT).await?;

    let template = HomeTemplate {
        layout: Layout::new(flashes).await,
        posts,
    };
    Ok(Html(template.render()?))
}
