//! Wine catalog pages: list, detail, create, edit, delete.
//!
//! Every handler is a single read or write against the [`WineStore`]
//! followed by a rendered page or a redirect. Unknown or malformed ids
//! answer 404; invalid form submissions re-render the form with 422.
//!
//! [`WineStore`]: crate::traits::WineStore

use axum::extract::rejection::FormRejection;
use axum::extract::{Form, Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use cellar_core::{FormErrors, Wine, WineForm, WineId};
use tracing::{debug, info};

use super::AppState;
use crate::error::AppError;
use crate::render::FormMode;

fn parse_id(raw: &str) -> Result<WineId, AppError> {
    raw.parse().map_err(|_| AppError::NotFound)
}

async fn load(state: &AppState, raw: &str) -> Result<Wine, AppError> {
    let id = parse_id(raw)?;
    state.store.get(id).await?.ok_or(AppError::NotFound)
}

fn detail_url(id: WineId) -> String {
    format!("/{id}")
}

/// Raw `key=value` pairs of a urlencoded body.
type FormPairs = Vec<(String, String)>;

/// Decodes a submission with last-value-wins for repeated keys. A body that
/// cannot be read as a form counts as an empty submission.
fn submitted(body: Result<Form<FormPairs>, FormRejection>) -> WineForm {
    match body {
        Ok(Form(pairs)) => WineForm::from_pairs(pairs),
        Err(rejection) => {
            debug!(%rejection, "unreadable wine form body");
            WineForm::default()
        }
    }
}

fn page(html: String) -> Response {
    Html(html).into_response()
}

fn rejected_form(
    state: &AppState,
    mode: FormMode,
    form: &WineForm,
    errors: &FormErrors,
) -> Result<Response, AppError> {
    debug!(?mode, %errors, "wine form rejected");
    let html = state.views.wine_form(mode, form, Some(errors))?;
    Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response())
}

/// `GET /`
pub async fn wine_list(State(state): State<AppState>) -> Response {
    state.respond(list_page(&state).await)
}

async fn list_page(state: &AppState) -> Result<Response, AppError> {
    let wines = state.store.list().await?;
    Ok(page(state.views.wine_list(&wines)?))
}

/// `GET /{id}`
pub async fn wine_detail(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    state.respond(detail_page(&state, &raw).await)
}

async fn detail_page(state: &AppState, raw: &str) -> Result<Response, AppError> {
    let wine = load(state, raw).await?;
    Ok(page(state.views.wine_detail(&wine)?))
}

/// `GET /new`
pub async fn new_wine_form(State(state): State<AppState>) -> Response {
    let result = state
        .views
        .wine_form(FormMode::Create, &WineForm::default(), None)
        .map(page)
        .map_err(AppError::from);
    state.respond(result)
}

/// `POST /new`
pub async fn new_wine(
    State(state): State<AppState>,
    body: Result<Form<FormPairs>, FormRejection>,
) -> Response {
    state.respond(create(&state, &submitted(body)).await)
}

async fn create(state: &AppState, form: &WineForm) -> Result<Response, AppError> {
    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(errors) => return rejected_form(state, FormMode::Create, form, &errors),
    };
    let wine = state.store.create(&fields).await?;
    info!(id = %wine.id, name = %wine, "wine created");
    Ok(Redirect::to(&detail_url(wine.id)).into_response())
}

/// `GET /{id}/edit`
pub async fn edit_wine_form(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    state.respond(edit_page(&state, &raw).await)
}

async fn edit_page(state: &AppState, raw: &str) -> Result<Response, AppError> {
    let wine = load(state, raw).await?;
    let html = state
        .views
        .wine_form(FormMode::Edit(wine.id), &WineForm::from(&wine), None)?;
    Ok(page(html))
}

/// `POST /{id}/edit`
pub async fn edit_wine(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    body: Result<Form<FormPairs>, FormRejection>,
) -> Response {
    state.respond(update(&state, &raw, &submitted(body)).await)
}

async fn update(state: &AppState, raw: &str, form: &WineForm) -> Result<Response, AppError> {
    let id = load(state, raw).await?.id;
    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(errors) => return rejected_form(state, FormMode::Edit(id), form, &errors),
    };
    // The record may have been deleted since it was loaded.
    let wine = state
        .store
        .update(id, &fields)
        .await?
        .ok_or(AppError::NotFound)?;
    info!(id = %wine.id, name = %wine, "wine updated");
    Ok(Redirect::to(&detail_url(wine.id)).into_response())
}

/// `GET /{id}/delete`
pub async fn delete_wine_confirm(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Response {
    state.respond(confirm_page(&state, &raw).await)
}

async fn confirm_page(state: &AppState, raw: &str) -> Result<Response, AppError> {
    let wine = load(state, raw).await?;
    Ok(page(state.views.delete_confirm(&wine)?))
}

/// `POST /{id}/delete`
pub async fn delete_wine(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    state.respond(delete(&state, &raw).await)
}

async fn delete(state: &AppState, raw: &str) -> Result<Response, AppError> {
    let id = parse_id(raw)?;
    if !state.store.delete(id).await? {
        return Err(AppError::NotFound);
    }
    info!(%id, "wine deleted");
    Ok(Redirect::to("/").into_response())
}

/// Any path no route matches.
pub async fn not_found_handler(State(state): State<AppState>) -> Response {
    state.respond(Err(AppError::NotFound))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use axum::Router;
    use tower::ServiceExt;

    use super::*;
    use crate::network::handlers::test_support::{state_with, BrokenStore};
    use crate::network::module::build_router;
    use crate::storage::MemoryWineStore;
    use crate::traits::WineStore;

    const MALBEC_FORM: &str =
        "wine_name=Malbec+2020&price=15.99&varietal=Malbec&description=Dark+fruit+notes";

    fn test_app() -> (Router, Arc<dyn WineStore>) {
        let store: Arc<dyn WineStore> = Arc::new(MemoryWineStore::new());
        (build_router(state_with(Arc::clone(&store))), store)
    }

    struct Reply {
        status: StatusCode,
        location: Option<String>,
        body: String,
    }

    async fn send(router: &Router, method: Method, uri: &str, form: Option<&str>) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match form {
            Some(form) => {
                builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(form.to_string())
            }
            None => Body::empty(),
        };
        let response = router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        Reply {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    async fn get(router: &Router, uri: &str) -> Reply {
        send(router, Method::GET, uri, None).await
    }

    async fn post(router: &Router, uri: &str, form: &str) -> Reply {
        send(router, Method::POST, uri, Some(form)).await
    }

    #[tokio::test]
    async fn create_then_detail_then_delete() {
        let (router, store) = test_app();

        let created = post(&router, "/new", MALBEC_FORM).await;
        assert_eq!(created.status, StatusCode::SEE_OTHER);
        let location = created.location.unwrap();
        assert_eq!(location, "/1");

        let stored = store.get(WineId::new(1)).await.unwrap().unwrap();
        assert_eq!(stored.fields.wine_name(), "Malbec 2020");
        assert_eq!(stored.fields.price(), "15.99");
        assert_eq!(stored.fields.varietal(), "Malbec");
        assert_eq!(stored.fields.description(), "Dark fruit notes");

        let detail = get(&router, &location).await;
        assert_eq!(detail.status, StatusCode::OK);
        assert!(detail.body.contains("<h1>Malbec 2020</h1>"));
        assert!(detail.body.contains("15.99"));
        assert!(detail.body.contains("Dark fruit notes"));

        let deleted = post(&router, "/1/delete", "").await;
        assert_eq!(deleted.status, StatusCode::SEE_OTHER);
        assert_eq!(deleted.location.as_deref(), Some("/"));

        assert_eq!(get(&router, "/1").await.status, StatusCode::NOT_FOUND);
        assert!(store.get(WineId::new(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn new_form_renders_empty_inputs() {
        let (router, _) = test_app();
        let reply = get(&router, "/new").await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.body.contains(r#"name="wine_name""#));
        assert!(reply.body.contains(r#"name="description""#));
        assert!(!reply.body.contains(r#"name="id""#));
    }

    #[tokio::test]
    async fn overlong_name_is_rejected_and_not_stored() {
        let (router, store) = test_app();
        let form = format!(
            "wine_name={}&price=9&varietal=Syrah&description=Pepper",
            "n".repeat(51)
        );

        let reply = post(&router, "/new", &form).await;
        assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(reply
            .body
            .contains("Ensure this value has at most 50 characters (it has 51)."));
        // Submitted values are echoed back.
        assert!(reply.body.contains(r#"value="Syrah""#));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn null_characters_rerender_form() {
        let (router, store) = test_app();
        let reply = post(
            &router,
            "/new",
            "wine_name=Mal%00bec&price=15.99&varietal=Malbec&description=Dark",
        )
        .await;
        assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(reply.body.contains("Null characters are not allowed."));
        assert!(reply.body.contains("errorlist"));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn repeated_key_keeps_last_value() {
        let (router, store) = test_app();
        let reply = post(
            &router,
            "/new",
            "wine_name=first&wine_name=Barolo&price=30&varietal=Nebbiolo&description=Tar",
        )
        .await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER);
        let stored = store.get(WineId::new(1)).await.unwrap().unwrap();
        assert_eq!(stored.fields.wine_name(), "Barolo");
    }

    #[tokio::test]
    async fn body_without_form_content_type_renders_required_errors() {
        let (router, store) = test_app();
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/new")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"wine_name":"Rioja"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert_eq!(body.matches("This field is required.").count(), 4);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unreadable_edit_body_leaves_record_untouched() {
        let (router, store) = test_app();
        post(&router, "/new", MALBEC_FORM).await;

        let reply = send(&router, Method::POST, "/1/edit", None).await;
        assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(reply.body.contains(r#"action="/1/edit""#));
        let stored = store.get(WineId::new(1)).await.unwrap().unwrap();
        assert_eq!(stored.fields.price(), "15.99");
    }

    #[tokio::test]
    async fn missing_fields_are_required() {
        let (router, store) = test_app();
        let reply = post(&router, "/new", "wine_name=Rioja").await;
        assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(reply.body.matches("This field is required.").count(), 3);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn submitted_id_is_ignored() {
        let (router, store) = test_app();
        let reply = post(&router, "/new", &format!("id=77&{MALBEC_FORM}")).await;
        assert_eq!(reply.location.as_deref(), Some("/1"));
        assert!(store.get(WineId::new(77)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn edit_changes_fields_and_keeps_identity() {
        let (router, store) = test_app();
        post(&router, "/new", MALBEC_FORM).await;

        let form_page = get(&router, "/1/edit").await;
        assert_eq!(form_page.status, StatusCode::OK);
        assert!(form_page.body.contains(r#"value="Malbec 2020""#));
        assert!(form_page.body.contains(r#"action="/1/edit""#));

        let edited = post(
            &router,
            "/1/edit",
            "wine_name=Malbec+2020&price=18.50&varietal=Malbec&description=Dark+fruit+notes",
        )
        .await;
        assert_eq!(edited.status, StatusCode::SEE_OTHER);
        assert_eq!(edited.location.as_deref(), Some("/1"));

        let wines = store.list().await.unwrap();
        assert_eq!(wines.len(), 1);
        assert_eq!(wines[0].id, WineId::new(1));
        assert_eq!(wines[0].fields.price(), "18.50");
        assert_eq!(wines[0].fields.wine_name(), "Malbec 2020");
        assert_eq!(wines[0].fields.description(), "Dark fruit notes");
    }

    #[tokio::test]
    async fn invalid_edit_leaves_record_untouched() {
        let (router, store) = test_app();
        post(&router, "/new", MALBEC_FORM).await;

        let reply = post(
            &router,
            "/1/edit",
            "wine_name=Malbec&price=12345678901&varietal=Malbec&description=x",
        )
        .await;
        assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(reply.body.contains("at most 10 characters (it has 11)"));

        let stored = store.get(WineId::new(1)).await.unwrap().unwrap();
        assert_eq!(stored.fields.price(), "15.99");
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let (router, _) = test_app();
        assert_eq!(get(&router, "/42").await.status, StatusCode::NOT_FOUND);
        assert_eq!(get(&router, "/42/edit").await.status, StatusCode::NOT_FOUND);
        assert_eq!(get(&router, "/42/delete").await.status, StatusCode::NOT_FOUND);
        assert_eq!(
            post(&router, "/42/edit", MALBEC_FORM).await.status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            post(&router, "/42/delete", "").await.status,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn malformed_ids_are_not_found() {
        let (router, _) = test_app();
        for uri in ["/abc", "/-1", "/1.5/edit", "/99999999999999999999"] {
            let reply = get(&router, uri).await;
            assert_eq!(reply.status, StatusCode::NOT_FOUND, "{uri}");
            assert!(reply.body.contains("Not found"));
        }
    }

    #[tokio::test]
    async fn unmatched_paths_render_not_found_page() {
        let (router, _) = test_app();
        let reply = get(&router, "/1/edit/extra").await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert!(reply.body.contains("No wine exists at this address."));
    }

    #[tokio::test]
    async fn delete_confirmation_does_not_delete() {
        let (router, store) = test_app();
        post(&router, "/new", MALBEC_FORM).await;

        let reply = get(&router, "/1/delete").await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.body.contains("Delete Malbec 2020?"));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn list_shows_each_live_wine_once() {
        let (router, _) = test_app();
        for name in ["Alpha", "Bravo", "Charlie"] {
            let form = format!("wine_name={name}&price=1&varietal=Red&description=d");
            post(&router, "/new", &form).await;
        }
        post(&router, "/2/delete", "").await;

        let reply = get(&router, "/").await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body.matches(">Alpha</a>").count(), 1);
        assert_eq!(reply.body.matches(">Charlie</a>").count(), 1);
        assert!(!reply.body.contains("Bravo"));
    }

    #[tokio::test]
    async fn empty_list_renders() {
        let (router, _) = test_app();
        let reply = get(&router, "/").await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.body.contains("No wines yet."));
    }

    #[tokio::test]
    async fn health_routes_are_not_wine_ids() {
        let (router, _) = test_app();
        assert_eq!(get(&router, "/health/live").await.status, StatusCode::OK);
        let health = get(&router, "/health").await;
        assert_eq!(health.status, StatusCode::OK);
        assert!(health.body.contains(r#""wines":0"#));
    }

    #[tokio::test]
    async fn storage_failures_render_server_error_without_cause() {
        let router = build_router(state_with(Arc::new(BrokenStore)));

        for reply in [
            get(&router, "/").await,
            get(&router, "/1").await,
            post(&router, "/new", MALBEC_FORM).await,
        ] {
            assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
            assert!(reply.body.contains("Server error"));
            assert!(!reply.body.contains("disk on fire"));
        }

        let health = get(&router, "/health").await;
        assert!(health.body.contains(r#""wines":null"#));
    }
}
