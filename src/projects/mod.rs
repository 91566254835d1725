mod new;
mod page;

use axum::{Router, routing::get};

use crate::AppState;

pub use new::{NewProject, create_project};
pub use page::{ProjectPatch, delete_project, get_project, list_projects, update_project};

pub(crate) const PROJECT_COLUMNS: &str = "id,title,description,skills_needed,owner_id,created_at";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projects", get(page::list_handler).post(new::create_handler))
        .route(
            "/projects/{id}",
            get(page::get_handler)
                .patch(page::update_handler)
                .delete(page::delete_handler),
        )
}
