//! Handlers for person cards.
//!
//! Every page is a `{ "data": ... }` document carrying the current
//! `language` and its translation bundle `t` next to the page body.
//! Successful writes redirect to the list with `303 See Other`; a form that
//! fails validation comes back with `422` and the submitted values.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use cards_core::error::CoreError;
use cards_core::pagination::{Page, PageRequest, PAGE_SIZE};
use cards_core::person::FieldErrors;
use cards_core::translation::TranslationBundle;
use cards_core::types::DbId;
use cards_db::models::person::{Person, PersonListQuery};
use cards_db::repositories::PersonRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::forms::{read_submission, FormValues, PersonForm, PhotoChange};
use crate::media;
use crate::middleware::language::LanguageContext;
use crate::response::DataResponse;
use crate::state::AppState;

/// Where every successful write sends the client.
const LIST_PATH: &str = "/";

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct PageDocument<'a, T: Serialize> {
    language: &'static str,
    t: &'a TranslationBundle,
    #[serde(flatten)]
    body: T,
}

fn render<T: Serialize>(ctx: &LanguageContext, status: StatusCode, body: T) -> Response {
    let document = PageDocument {
        language: ctx.resolved_language(),
        t: ctx.bundle.as_ref(),
        body,
    };
    (status, Json(DataResponse { data: document })).into_response()
}

/// A person row plus the values pages display alongside it.
#[derive(Debug, Serialize)]
pub struct PersonView {
    #[serde(flatten)]
    pub person: Person,
    pub display_name: String,
    pub photo_url: Option<String>,
}

impl From<Person> for PersonView {
    fn from(person: Person) -> Self {
        Self {
            display_name: person.display_name(),
            photo_url: person.photo.as_deref().map(media::photo_url),
            person,
        }
    }
}

#[derive(Debug, Serialize)]
struct ListView {
    people: Vec<PersonView>,
    query: String,
    page: Page,
}

#[derive(Debug, Serialize)]
struct FormView {
    form: PersonForm,
    #[serde(skip_serializing_if = "Option::is_none")]
    person: Option<PersonView>,
}

#[derive(Debug, Serialize)]
struct PersonPageView {
    person: PersonView,
}

#[derive(Debug, Serialize)]
struct DeleteView {
    person: PersonView,
    action: String,
    method: &'static str,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Person",
        id,
    })
}

async fn find_person(state: &AppState, id: DbId) -> AppResult<Person> {
    PersonRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

fn edit_path(id: DbId) -> String {
    format!("/{id}/edit/")
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// Query parameters for the list page.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
    pub page: Option<String>,
}

/// GET /
///
/// Ten people per page in `last_name, first_name` order, optionally filtered
/// by `q`. Out-of-range `page` values clamp to the nearest valid page.
pub async fn list(
    State(state): State<AppState>,
    ctx: LanguageContext,
    Query(params): Query<ListParams>,
) -> AppResult<Response> {
    let query = params.q.unwrap_or_default().trim().to_string();
    let search = (!query.is_empty()).then_some(query.as_str());

    let count = PersonRepo::count(&state.pool, search).await?;
    let page = Page::resolve(PageRequest::parse(params.page.as_deref()), count, PAGE_SIZE);

    let people = PersonRepo::list(
        &state.pool,
        &PersonListQuery {
            search: search.map(str::to_string),
            limit: page.limit(),
            offset: page.offset(),
        },
    )
    .await?;

    let view = ListView {
        people: people.into_iter().map(PersonView::from).collect(),
        query,
        page,
    };
    Ok(render(&ctx, StatusCode::OK, view))
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// GET /add/
pub async fn create_form(ctx: LanguageContext) -> AppResult<Response> {
    let form = PersonForm::new(
        "/add/",
        &FormValues::default(),
        &FieldErrors::new(),
        ctx.bundle.group("label"),
    );
    Ok(render(&ctx, StatusCode::OK, FormView { form, person: None }))
}

/// POST /add/
pub async fn create(
    State(state): State<AppState>,
    ctx: LanguageContext,
    multipart: Multipart,
) -> AppResult<Response> {
    let submission = read_submission(multipart).await?;

    let (person, photo) = match submission.validate() {
        Ok(valid) => valid,
        Err(errors) => {
            tracing::debug!(errors = %errors, "Person form rejected");
            let mut values = submission.values;
            values.photo = None;
            let form = PersonForm::new("/add/", &values, &errors, ctx.bundle.group("label"));
            return Ok(render(
                &ctx,
                StatusCode::UNPROCESSABLE_ENTITY,
                FormView { form, person: None },
            ));
        }
    };

    let stored = match photo {
        PhotoChange::Replace(upload) => Some(
            media::store_photo(&state.config.media_root, &upload.bytes, upload.extension).await?,
        ),
        PhotoChange::Keep | PhotoChange::Clear => None,
    };

    let person = person.with_photo(stored.clone());
    let created = match PersonRepo::create(&state.pool, &person).await {
        Ok(created) => created,
        Err(e) => {
            if let Some(path) = &stored {
                media::discard(&state.config.media_root, path).await;
            }
            return Err(e.into());
        }
    };

    tracing::info!(person_id = created.id, name = %created.display_name(), "Person created");
    Ok(Redirect::to(LIST_PATH).into_response())
}

// ---------------------------------------------------------------------------
// Detail
// ---------------------------------------------------------------------------

/// GET /{id}/
pub async fn detail(
    State(state): State<AppState>,
    ctx: LanguageContext,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let person = find_person(&state, id).await?;
    Ok(render(
        &ctx,
        StatusCode::OK,
        PersonPageView {
            person: person.into(),
        },
    ))
}

// ---------------------------------------------------------------------------
// Edit
// ---------------------------------------------------------------------------

/// GET /{id}/edit/
pub async fn edit_form(
    State(state): State<AppState>,
    ctx: LanguageContext,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let person = find_person(&state, id).await?;
    let form = PersonForm::new(
        edit_path(id),
        &FormValues::from(&person),
        &FieldErrors::new(),
        ctx.bundle.group("label"),
    );
    let view = FormView {
        form,
        person: Some(person.into()),
    };
    Ok(render(&ctx, StatusCode::OK, view))
}

/// POST /{id}/edit/
///
/// A new upload replaces the photo reference and `photo-clear` drops it;
/// otherwise the current photo is kept. Replaced files stay on disk.
pub async fn update(
    State(state): State<AppState>,
    ctx: LanguageContext,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<Response> {
    let existing = find_person(&state, id).await?;
    let submission = read_submission(multipart).await?;

    let (person, photo) = match submission.validate() {
        Ok(valid) => valid,
        Err(errors) => {
            tracing::debug!(errors = %errors, "Person form rejected");
            let mut values = submission.values;
            values.photo = existing.photo.clone();
            let form = PersonForm::new(edit_path(id), &values, &errors, ctx.bundle.group("label"));
            let view = FormView {
                form,
                person: Some(existing.into()),
            };
            return Ok(render(&ctx, StatusCode::UNPROCESSABLE_ENTITY, view));
        }
    };

    let (photo, stored) = match photo {
        PhotoChange::Keep => (existing.photo.clone(), None),
        PhotoChange::Clear => (None, None),
        PhotoChange::Replace(upload) => {
            let path =
                media::store_photo(&state.config.media_root, &upload.bytes, upload.extension)
                    .await?;
            (Some(path.clone()), Some(path))
        }
    };

    let person = person.with_photo(photo);
    let updated = match PersonRepo::update(&state.pool, id, &person).await {
        Ok(Some(updated)) => updated,
        outcome => {
            if let Some(path) = &stored {
                media::discard(&state.config.media_root, path).await;
            }
            return Err(match outcome {
                Err(e) => e.into(),
                Ok(_) => not_found(id),
            });
        }
    };

    tracing::info!(person_id = updated.id, name = %updated.display_name(), "Person updated");
    Ok(Redirect::to(LIST_PATH).into_response())
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// GET /{id}/delete/
///
/// Confirmation only; nothing is removed.
pub async fn delete_confirm(
    State(state): State<AppState>,
    ctx: LanguageContext,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let person = find_person(&state, id).await?;
    let view = DeleteView {
        person: person.into(),
        action: format!("/{id}/delete/"),
        method: "post",
    };
    Ok(render(&ctx, StatusCode::OK, view))
}

/// POST /{id}/delete/
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<Response> {
    if !PersonRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(person_id = id, "Person deleted");
    Ok(Redirect::to(LIST_PATH).into_response())
}
