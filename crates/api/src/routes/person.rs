use axum::routing::get;
use axum::Router;

use crate::handlers::person;
use crate::state::AppState;

/// Person card routes, mounted at the root.
///
/// ```text
/// GET    /                  -> list (?q=, ?page=)
/// GET    /add/              -> create_form
/// POST   /add/              -> create
/// GET    /{id}/             -> detail
/// GET    /{id}/edit/        -> edit_form
/// POST   /{id}/edit/        -> update
/// GET    /{id}/delete/      -> delete_confirm
/// POST   /{id}/delete/      -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(person::list))
        .route("/add/", get(person::create_form).post(person::create))
        .route("/{id}/", get(person::detail))
        .route("/{id}/edit/", get(person::edit_form).post(person::update))
        .route(
            "/{id}/delete/",
            get(person::delete_confirm).post(person::delete),
        )
}
