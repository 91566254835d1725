mod profile;
mod register;

use axum::{Router, routing::{get, post}};

use crate::AppState;

pub use profile::{ProfilePatch, delete_user, get_user, update_profile};
pub use register::{NewUser, register};

pub(crate) const USER_COLUMNS: &str =
    "id,name,email,credential,college,skills,interests,bio,profile_url,created_at";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(register::register_handler))
        .route(
            "/users/{id}",
            get(profile::get_handler)
                .patch(profile::update_handler)
                .delete(profile::delete_handler),
        )
}
