//! Category and label HTTP handlers.
//!
//! Both resources share one shape and differ only in [`TagKind`]:
//!
//! ```text
//! GET|POST          /api/v1/categories
//! POST              /api/v1/categories/get-or-create {"name":"Work"}
//! GET|PUT|DELETE    /api/v1/categories/{id}
//! GET|POST          /api/v1/labels
//! GET|PUT|DELETE    /api/v1/labels/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::CreateTagRequest;
use crate::domain::{Error, Tag, TagColor, TagEdit, TagKind, TagName, TagValidationError, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, TagSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{invalid_field_error, missing_field_error, parse_uuid};

/// Request body for creating a category or label.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTagPayload {
    #[schema(example = "Work")]
    pub name: Option<String>,
    /// `#RRGGBB`; defaults to `#6B7280`.
    #[schema(example = "#2563EB")]
    pub color: Option<String>,
}

/// Request body for renaming or recolouring a tag.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTagPayload {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// Request body for `POST /api/v1/categories/get-or-create`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetOrCreateCategoryPayload {
    #[schema(example = "Errands")]
    pub name: Option<String>,
}

fn tag_field_error(error: TagValidationError) -> Error {
    invalid_field_error(error.field(), error)
}

fn parse_create_payload(
    user_id: UserId,
    kind: TagKind,
    payload: CreateTagPayload,
) -> Result<CreateTagRequest, Error> {
    let name = payload.name.ok_or_else(|| missing_field_error("name"))?;
    Ok(CreateTagRequest {
        user_id,
        kind,
        name: TagName::new(&name).map_err(tag_field_error)?,
        color: TagColor::or_default(payload.color.as_deref()).map_err(tag_field_error)?,
    })
}

fn parse_update_payload(payload: UpdateTagPayload) -> Result<TagEdit, Error> {
    TagEdit::new(payload.name.as_deref(), payload.color.as_deref()).map_err(tag_field_error)
}

fn parse_tag_id(raw: &str) -> Result<Uuid, Error> {
    parse_uuid(raw, "id")
}

async fn list(
    state: &HttpState,
    session: &SessionContext,
    kind: TagKind,
) -> ApiResult<web::Json<Vec<Tag>>> {
    let user_id = session.require_user_id()?;
    Ok(web::Json(state.tags_query.list(&user_id, kind).await?))
}

async fn create(
    state: &HttpState,
    session: &SessionContext,
    kind: TagKind,
    payload: CreateTagPayload,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let request = parse_create_payload(user_id, kind, payload)?;
    let tag = state.tags.create(request).await?;
    Ok(HttpResponse::Created().json(tag))
}

async fn fetch(
    state: &HttpState,
    session: &SessionContext,
    kind: TagKind,
    raw_id: &str,
) -> ApiResult<web::Json<Tag>> {
    let user_id = session.require_user_id()?;
    let tag_id = parse_tag_id(raw_id)?;
    Ok(web::Json(state.tags_query.get(&user_id, kind, tag_id).await?))
}

async fn update(
    state: &HttpState,
    session: &SessionContext,
    kind: TagKind,
    raw_id: &str,
    payload: UpdateTagPayload,
) -> ApiResult<web::Json<Tag>> {
    let user_id = session.require_user_id()?;
    let tag_id = parse_tag_id(raw_id)?;
    let edit = parse_update_payload(payload)?;
    Ok(web::Json(
        state.tags.update(&user_id, kind, tag_id, edit).await?,
    ))
}

async fn remove(
    state: &HttpState,
    session: &SessionContext,
    kind: TagKind,
    raw_id: &str,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let tag_id = parse_tag_id(raw_id)?;
    state.tags.delete(&user_id, kind, tag_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// List the signed-in user's categories with task counts.
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses(
        (status = 200, description = "Categories", body = [TagSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["categories"],
    operation_id = "listCategories"
)]
#[get("/categories")]
pub async fn list_categories(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Tag>>> {
    list(&state, &session, TagKind::Category).await
}

/// Create a category.
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CreateTagPayload,
    responses(
        (status = 201, description = "Created category", body = TagSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 409, description = "Name already used", body = ErrorSchema)
    ),
    tags = ["categories"],
    operation_id = "createCategory"
)]
#[post("/categories")]
pub async fn create_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateTagPayload>,
) -> ApiResult<HttpResponse> {
    create(&state, &session, TagKind::Category, payload.into_inner()).await
}

/// Find a category by name, creating it with the default colour if absent.
///
/// Responds 201 when a category was created and 200 when it already existed.
#[utoipa::path(
    post,
    path = "/api/v1/categories/get-or-create",
    request_body = GetOrCreateCategoryPayload,
    responses(
        (status = 200, description = "Existing category", body = TagSchema),
        (status = 201, description = "Created category", body = TagSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["categories"],
    operation_id = "getOrCreateCategory"
)]
#[post("/categories/get-or-create")]
pub async fn get_or_create_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<GetOrCreateCategoryPayload>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let name = payload
        .into_inner()
        .name
        .ok_or_else(|| missing_field_error("name"))?;
    let name = TagName::new(&name).map_err(tag_field_error)?;
    let response = state.tags.get_or_create_category(&user_id, name).await?;
    let mut builder = if response.created {
        HttpResponse::Created()
    } else {
        HttpResponse::Ok()
    };
    Ok(builder.json(response.tag))
}

/// Fetch one category.
#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    params(("id" = Uuid, Path, description = "Category identifier")),
    responses(
        (status = 200, description = "Category", body = TagSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Category not found", body = ErrorSchema)
    ),
    tags = ["categories"],
    operation_id = "getCategory"
)]
#[get("/categories/{id}")]
pub async fn get_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Tag>> {
    fetch(&state, &session, TagKind::Category, &path).await
}

/// Rename or recolour a category.
#[utoipa::path(
    put,
    path = "/api/v1/categories/{id}",
    params(("id" = Uuid, Path, description = "Category identifier")),
    request_body = UpdateTagPayload,
    responses(
        (status = 200, description = "Updated category", body = TagSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Category not found", body = ErrorSchema),
        (status = 409, description = "Name already used", body = ErrorSchema)
    ),
    tags = ["categories"],
    operation_id = "updateCategory"
)]
#[put("/categories/{id}")]
pub async fn update_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateTagPayload>,
) -> ApiResult<web::Json<Tag>> {
    update(&state, &session, TagKind::Category, &path, payload.into_inner()).await
}

/// Delete a category and detach it from every task.
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    params(("id" = Uuid, Path, description = "Category identifier")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found", body = ErrorSchema)
    ),
    tags = ["categories"],
    operation_id = "deleteCategory"
)]
#[delete("/categories/{id}")]
pub async fn delete_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    remove(&state, &session, TagKind::Category, &path).await
}

/// List the signed-in user's labels with task counts.
#[utoipa::path(
    get,
    path = "/api/v1/labels",
    responses(
        (status = 200, description = "Labels", body = [TagSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["labels"],
    operation_id = "listLabels"
)]
#[get("/labels")]
pub async fn list_labels(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Tag>>> {
    list(&state, &session, TagKind::Label).await
}

/// Create a label.
#[utoipa::path(
    post,
    path = "/api/v1/labels",
    request_body = CreateTagPayload,
    responses(
        (status = 201, description = "Created label", body = TagSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Name already used", body = ErrorSchema)
    ),
    tags = ["labels"],
    operation_id = "createLabel"
)]
#[post("/labels")]
pub async fn create_label(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateTagPayload>,
) -> ApiResult<HttpResponse> {
    create(&state, &session, TagKind::Label, payload.into_inner()).await
}

/// Fetch one label.
#[utoipa::path(
    get,
    path = "/api/v1/labels/{id}",
    params(("id" = Uuid, Path, description = "Label identifier")),
    responses(
        (status = 200, description = "Label", body = TagSchema),
        (status = 404, description = "Label not found", body = ErrorSchema)
    ),
    tags = ["labels"],
    operation_id = "getLabel"
)]
#[get("/labels/{id}")]
pub async fn get_label(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Tag>> {
    fetch(&state, &session, TagKind::Label, &path).await
}

/// Rename or recolour a label.
#[utoipa::path(
    put,
    path = "/api/v1/labels/{id}",
    params(("id" = Uuid, Path, description = "Label identifier")),
    request_body = UpdateTagPayload,
    responses(
        (status = 200, description = "Updated label", body = TagSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Label not found", body = ErrorSchema),
        (status = 409, description = "Name already used", body = ErrorSchema)
    ),
    tags = ["labels"],
    operation_id = "updateLabel"
)]
#[put("/labels/{id}")]
pub async fn update_label(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateTagPayload>,
) -> ApiResult<web::Json<Tag>> {
    update(&state, &session, TagKind::Label, &path, payload.into_inner()).await
}

/// Delete a label and detach it from every task.
#[utoipa::path(
    delete,
    path = "/api/v1/labels/{id}",
    params(("id" = Uuid, Path, description = "Label identifier")),
    responses(
        (status = 204, description = "Label deleted"),
        (status = 404, description = "Label not found", body = ErrorSchema)
    ),
    tags = ["labels"],
    operation_id = "deleteLabel"
)]
#[delete("/labels/{id}")]
pub async fn delete_label(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    remove(&state, &session, TagKind::Label, &path).await
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::DEFAULT_TAG_COLOR;
    use crate::domain::ports::GetOrCreateTagResponse;
    use crate::inbound::http::test_utils::{MockPorts, error_field, json_body, sign_in, test_app};

    fn tag(kind: TagKind, name: &str) -> Tag {
        Tag {
            id: Uuid::new_v4(),
            user_id: UserId::random(),
            kind,
            name: TagName::new(name).expect("valid name"),
            color: TagColor::default(),
            task_count: 2,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    fn create_defaults_the_colour() {
        let request = parse_create_payload(
            UserId::random(),
            TagKind::Label,
            CreateTagPayload {
                name: Some(" urgent ".into()),
                color: None,
            },
        )
        .expect("valid payload");
        assert_eq!(request.name.as_str(), "urgent");
        assert_eq!(request.color.as_str(), DEFAULT_TAG_COLOR);
    }

    #[rstest]
    #[case(CreateTagPayload { name: None, color: None }, "name")]
    #[case(CreateTagPayload { name: Some("  ".into()), color: None }, "name")]
    #[case(CreateTagPayload { name: Some("Work".into()), color: Some("blue".into()) }, "color")]
    fn create_rejects_invalid_fields(#[case] payload: CreateTagPayload, #[case] field: &str) {
        let error = parse_create_payload(UserId::random(), TagKind::Category, payload)
            .expect_err("invalid payload");
        assert_eq!(
            error
                .details()
                .and_then(|details| details.get("field"))
                .and_then(Value::as_str),
            Some(field)
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn labels_are_listed_by_kind() {
        let user_id = UserId::random();
        let mut ports = MockPorts::default();
        ports
            .tags_query
            .expect_list()
            .withf(|_, kind| *kind == TagKind::Label)
            .returning(|_, kind| Ok(vec![tag(kind, "urgent")]));
        let app = actix_test::init_service(test_app(ports)).await;
        let cookie = sign_in(&app, &user_id).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/labels")
            .cookie(cookie)
            .to_request();
        let body = json_body(actix_test::call_service(&app, request).await).await;
        assert_eq!(body.pointer("/0/name").and_then(Value::as_str), Some("urgent"));
        assert_eq!(body.pointer("/0/taskCount").and_then(Value::as_u64), Some(2));
        assert_eq!(body.pointer("/0/kind").and_then(Value::as_str), Some("label"));
    }

    #[rstest]
    #[case(true, StatusCode::CREATED)]
    #[case(false, StatusCode::OK)]
    #[actix_web::test]
    async fn get_or_create_reports_creation_in_the_status(
        #[case] created: bool,
        #[case] status: StatusCode,
    ) {
        let user_id = UserId::random();
        let mut ports = MockPorts::default();
        ports
            .tags
            .expect_get_or_create_category()
            .withf(|_, name| name.as_str() == "Errands")
            .returning(move |_, name| {
                Ok(GetOrCreateTagResponse {
                    tag: tag(TagKind::Category, name.as_str()),
                    created,
                })
            });
        let app = actix_test::init_service(test_app(ports)).await;
        let cookie = sign_in(&app, &user_id).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/categories/get-or-create")
            .cookie(cookie)
            .set_json(json!({"name": "Errands"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), status);
    }

    #[rstest]
    #[actix_web::test]
    async fn duplicate_names_conflict() {
        let user_id = UserId::random();
        let mut ports = MockPorts::default();
        ports
            .tags
            .expect_create()
            .returning(|_| Err(Error::conflict("Category named Work already exists")));
        let app = actix_test::init_service(test_app(ports)).await;
        let cookie = sign_in(&app, &user_id).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/categories")
            .cookie(cookie)
            .set_json(json!({"name": "Work"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[rstest]
    #[actix_web::test]
    async fn bad_colour_on_update_names_the_field() {
        let user_id = UserId::random();
        let mut ports = MockPorts::default();
        ports.tags.expect_update().times(0);
        let app = actix_test::init_service(test_app(ports)).await;
        let cookie = sign_in(&app, &user_id).await;

        let request = actix_test::TestRequest::put()
            .uri(&format!("/api/v1/labels/{}", Uuid::new_v4()))
            .cookie(cookie)
            .set_json(json!({"color": "#12345"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_field(&json_body(response).await), Some("color"));
    }

    #[rstest]
    #[actix_web::test]
    async fn missing_categories_are_not_found() {
        let user_id = UserId::random();
        let mut ports = MockPorts::default();
        ports
            .tags
            .expect_delete()
            .withf(|_, kind, _| *kind == TagKind::Category)
            .returning(|_, _, _| Err(Error::not_found("Category not found")));
        let app = actix_test::init_service(test_app(ports)).await;
        let cookie = sign_in(&app, &user_id).await;

        let request = actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/categories/{}", Uuid::new_v4()))
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
