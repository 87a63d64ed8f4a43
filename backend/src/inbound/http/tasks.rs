//! Task HTTP handlers.
//!
//! ```text
//! GET    /api/v1/tasks?status=open&priority=High,Urgent&categories=Work&page=1&limit=25
//! POST   /api/v1/tasks
//! GET    /api/v1/tasks/{id}
//! PUT    /api/v1/tasks/{id}
//! DELETE /api/v1/tasks/{id}
//! POST   /api/v1/tasks/{id}/complete
//! POST   /api/v1/tasks/{id}/archive
//! POST   /api/v1/tasks/{id}/unarchive
//! ```

use std::str::FromStr;

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use pagination::{PageRequest, Paginated};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::{CompleteTaskResponse, CreateTaskRequest, UpdateTaskRequest};
use crate::domain::{
    Achievement, Error, TASK_PAGE_LIMITS, TagAssignment, TagSummary, Task, TaskContent,
    TaskContentDraft, TaskEdit, TaskListQuery, TaskPriority, TaskStatus, TaskValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    AchievementSchema, ErrorSchema, PaginationMetaSchema, TagSummarySchema,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    invalid_enum_error, invalid_field_error, missing_field_error, nullable, page_error,
    parse_optional_rfc3339_timestamp, parse_uuid, parse_uuid_list, split_csv,
};

const PRIORITIES: &str = "Low, Medium, High, Urgent";
const STATUSES: &str = "open, completed, archived";

/// Request body for `POST /api/v1/tasks`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskPayload {
    #[schema(example = "Write quarterly report")]
    pub title: Option<String>,
    pub description: Option<String>,
    /// RFC 3339 timestamp.
    #[schema(example = "2026-03-06T17:00:00Z")]
    pub due_date: Option<String>,
    #[schema(example = "High")]
    pub priority: Option<String>,
    /// Free-text category label.
    pub category: Option<String>,
    pub category_ids: Option<Vec<String>>,
    pub label_ids: Option<Vec<String>>,
}

/// Request body for `PUT /api/v1/tasks/{id}`.
///
/// Omitted fields are left unchanged. `null` clears `description`,
/// `dueDate`, and `category`. Tag id lists replace the current attachments.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskPayload {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, nullable)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, nullable)]
    pub due_date: Option<Option<String>>,
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, nullable)]
    pub category: Option<Option<String>>,
    pub category_ids: Option<Vec<String>>,
    pub label_ids: Option<Vec<String>>,
}

/// Query string for `GET /api/v1/tasks`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TaskListParams {
    /// `open`, `completed`, or `archived`.
    pub status: Option<String>,
    /// Comma-separated priorities; any may match.
    pub priority: Option<String>,
    /// Comma-separated category names; any may match.
    pub categories: Option<String>,
    /// Comma-separated label names; any may match.
    pub labels: Option<String>,
    /// One-based page number.
    pub page: Option<u32>,
    /// Page size: 10, 25, or 50.
    pub limit: Option<u32>,
}

/// Task as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: Uuid,
    #[schema(value_type = String, format = Uuid)]
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    #[schema(example = "open")]
    pub status: String,
    #[schema(example = "High")]
    pub priority: String,
    /// XP awarded on completion.
    #[schema(example = 50)]
    pub xp_value: i32,
    pub category: Option<String>,
    #[schema(value_type = Vec<TagSummarySchema>)]
    pub categories: Vec<TagSummary>,
    #[schema(value_type = Vec<TagSummarySchema>)]
    pub labels: Vec<TagSummary>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        let parts = task.into_parts();
        Self {
            id: parts.id,
            user_id: parts.user_id.to_string(),
            title: parts.title,
            description: parts.description,
            due_date: parts.due_date,
            status: parts.status.to_string(),
            priority: parts.priority.to_string(),
            xp_value: parts.xp_value,
            category: parts.category,
            categories: parts.categories,
            labels: parts.labels,
            completed_at: parts.completed_at,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
        }
    }
}

/// Outcome of `POST /api/v1/tasks/{id}/complete`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTaskBody {
    pub task: TaskResponse,
    pub xp_awarded: i32,
    pub new_total_xp: i64,
    pub new_level: u32,
    pub leveled_up: bool,
    /// Achievements unlocked by this completion.
    #[schema(value_type = Vec<AchievementSchema>)]
    pub new_achievements: Vec<Achievement>,
}

impl From<CompleteTaskResponse> for CompleteTaskBody {
    fn from(value: CompleteTaskResponse) -> Self {
        Self {
            task: value.task.into(),
            xp_awarded: value.xp_awarded,
            new_total_xp: value.new_total_xp,
            new_level: value.new_level,
            leveled_up: value.leveled_up,
            new_achievements: value.new_achievements,
        }
    }
}

/// OpenAPI shape of the task listing envelope.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct TaskPageSchema {
    data: Vec<TaskResponse>,
    pagination: PaginationMetaSchema,
}

fn task_field_error(error: TaskValidationError) -> Error {
    invalid_field_error(error.field(), error)
}

fn parse_priority(raw: &str) -> Result<TaskPriority, Error> {
    TaskPriority::from_str(raw).map_err(|_| invalid_enum_error("priority", raw, PRIORITIES))
}

fn parse_task_id(raw: &str) -> Result<Uuid, Error> {
    parse_uuid(raw, "id")
}

fn parse_tags(
    category_ids: Option<Vec<String>>,
    label_ids: Option<Vec<String>>,
) -> Result<TagAssignment, Error> {
    let categories = category_ids
        .map(|ids| parse_uuid_list(ids, "categoryIds"))
        .transpose()?;
    let labels = label_ids
        .map(|ids| parse_uuid_list(ids, "labelIds"))
        .transpose()?;
    TagAssignment::new(categories, labels).map_err(task_field_error)
}

fn parse_create_payload(payload: CreateTaskPayload) -> Result<(TaskContent, TagAssignment), Error> {
    let title = payload.title.ok_or_else(|| missing_field_error("title"))?;
    let priority = payload
        .priority
        .as_deref()
        .ok_or_else(|| missing_field_error("priority"))
        .and_then(parse_priority)?;
    let due_date = parse_optional_rfc3339_timestamp(payload.due_date.as_deref(), "dueDate")?;
    let content = TaskContent::new(TaskContentDraft {
        title,
        description: payload.description,
        due_date,
        priority,
        category: payload.category,
    })
    .map_err(task_field_error)?;
    let tags = parse_tags(payload.category_ids, payload.label_ids)?;
    Ok((content, tags))
}

fn parse_update_payload(payload: UpdateTaskPayload) -> Result<(TaskEdit, TagAssignment), Error> {
    let due_date = payload
        .due_date
        .map(|value| parse_optional_rfc3339_timestamp(value.as_deref(), "dueDate"))
        .transpose()?;
    let priority = payload.priority.as_deref().map(parse_priority).transpose()?;
    let edit = TaskEdit {
        title: payload.title,
        description: payload.description,
        due_date,
        priority,
        category: payload.category,
    };
    let tags = parse_tags(payload.category_ids, payload.label_ids)?;
    Ok((edit, tags))
}

fn parse_list_params(params: TaskListParams) -> Result<TaskListQuery, Error> {
    let status = params
        .status
        .as_deref()
        .map(|raw| {
            TaskStatus::from_str(raw).map_err(|_| invalid_enum_error("status", raw, STATUSES))
        })
        .transpose()?;
    let priorities = split_csv(params.priority.as_deref())
        .iter()
        .map(|raw| parse_priority(raw))
        .collect::<Result<Vec<_>, _>>()?;
    let page = PageRequest::new(params.page, params.limit, &TASK_PAGE_LIMITS)
        .map_err(|error| page_error(&error))?;
    Ok(TaskListQuery {
        status,
        priorities,
        categories: split_csv(params.categories.as_deref()),
        labels: split_csv(params.labels.as_deref()),
        page,
    })
}

/// List the signed-in user's tasks.
#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    params(TaskListParams),
    responses(
        (status = 200, description = "One page of tasks", body = TaskPageSchema),
        (status = 400, description = "Invalid filter or page", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["tasks"],
    operation_id = "listTasks"
)]
#[get("/tasks")]
pub async fn list_tasks(
    state: web::Data<HttpState>,
    session: SessionContext,
    request: HttpRequest,
    params: web::Query<TaskListParams>,
) -> ApiResult<web::Json<Paginated<TaskResponse>>> {
    let user_id = session.require_user_id()?;
    let query = parse_list_params(params.into_inner())?;
    let page = query.page;
    let result = state.tasks_query.list(&user_id, query).await?;
    let envelope = Paginated::new(result.tasks, page, result.total)
        .map(TaskResponse::from)
        .with_links(&request.full_url());
    Ok(web::Json(envelope))
}

/// Create a task.
#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    request_body = CreateTaskPayload,
    responses(
        (status = 201, description = "Created task", body = TaskResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown category or label", body = ErrorSchema)
    ),
    tags = ["tasks"],
    operation_id = "createTask"
)]
#[post("/tasks")]
pub async fn create_task(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateTaskPayload>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let (content, tags) = parse_create_payload(payload.into_inner())?;
    let task = state
        .tasks
        .create(CreateTaskRequest {
            user_id,
            content,
            tags,
        })
        .await?;
    Ok(HttpResponse::Created().json(TaskResponse::from(task)))
}

/// Fetch one task.
#[utoipa::path(
    get,
    path = "/api/v1/tasks/{id}",
    params(("id" = Uuid, Path, description = "Task identifier")),
    responses(
        (status = 200, description = "Task", body = TaskResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Task not found", body = ErrorSchema)
    ),
    tags = ["tasks"],
    operation_id = "getTask"
)]
#[get("/tasks/{id}")]
pub async fn get_task(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<TaskResponse>> {
    let user_id = session.require_user_id()?;
    let task_id = parse_task_id(&path)?;
    let task = state.tasks_query.get(&user_id, task_id).await?;
    Ok(web::Json(task.into()))
}

/// Partially update a task.
///
/// Changing the priority of an unfinished task recomputes its XP value.
#[utoipa::path(
    put,
    path = "/api/v1/tasks/{id}",
    params(("id" = Uuid, Path, description = "Task identifier")),
    request_body = UpdateTaskPayload,
    responses(
        (status = 200, description = "Updated task", body = TaskResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Task, category, or label not found", body = ErrorSchema)
    ),
    tags = ["tasks"],
    operation_id = "updateTask"
)]
#[put("/tasks/{id}")]
pub async fn update_task(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateTaskPayload>,
) -> ApiResult<web::Json<TaskResponse>> {
    let user_id = session.require_user_id()?;
    let task_id = parse_task_id(&path)?;
    let (edit, tags) = parse_update_payload(payload.into_inner())?;
    let task = state
        .tasks
        .update(UpdateTaskRequest {
            user_id,
            task_id,
            edit,
            tags,
        })
        .await?;
    Ok(web::Json(task.into()))
}

/// Delete a task; its ledger entries survive unlinked.
#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{id}",
    params(("id" = Uuid, Path, description = "Task identifier")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Task not found", body = ErrorSchema)
    ),
    tags = ["tasks"],
    operation_id = "deleteTask"
)]
#[delete("/tasks/{id}")]
pub async fn delete_task(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let task_id = parse_task_id(&path)?;
    state.tasks.delete(&user_id, task_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Complete a task, award its XP, and evaluate achievements.
#[utoipa::path(
    post,
    path = "/api/v1/tasks/{id}/complete",
    params(("id" = Uuid, Path, description = "Task identifier")),
    responses(
        (status = 200, description = "Completion outcome", body = CompleteTaskBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Task not found", body = ErrorSchema),
        (status = 409, description = "Task already completed", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["tasks"],
    operation_id = "completeTask"
)]
#[post("/tasks/{id}/complete")]
pub async fn complete_task(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<CompleteTaskBody>> {
    let user_id = session.require_user_id()?;
    let task_id = parse_task_id(&path)?;
    let outcome = state.tasks.complete(&user_id, task_id).await?;
    Ok(web::Json(outcome.into()))
}

/// Archive an open task.
#[utoipa::path(
    post,
    path = "/api/v1/tasks/{id}/archive",
    params(("id" = Uuid, Path, description = "Task identifier")),
    responses(
        (status = 200, description = "Archived task", body = TaskResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Task not found", body = ErrorSchema),
        (status = 409, description = "Task is not open", body = ErrorSchema)
    ),
    tags = ["tasks"],
    operation_id = "archiveTask"
)]
#[post("/tasks/{id}/archive")]
pub async fn archive_task(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<TaskResponse>> {
    let user_id = session.require_user_id()?;
    let task_id = parse_task_id(&path)?;
    Ok(web::Json(state.tasks.archive(&user_id, task_id).await?.into()))
}

/// Return an archived task to the open list.
#[utoipa::path(
    post,
    path = "/api/v1/tasks/{id}/unarchive",
    params(("id" = Uuid, Path, description = "Task identifier")),
    responses(
        (status = 200, description = "Reopened task", body = TaskResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Task not found", body = ErrorSchema),
        (status = 409, description = "Task is not archived", body = ErrorSchema)
    ),
    tags = ["tasks"],
    operation_id = "unarchiveTask"
)]
#[post("/tasks/{id}/unarchive")]
pub async fn unarchive_task(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<TaskResponse>> {
    let user_id = session.require_user_id()?;
    let task_id = parse_task_id(&path)?;
    Ok(web::Json(state.tasks.unarchive(&user_id, task_id).await?.into()))
}

#[cfg(test)]
#[path = "tasks_tests.rs"]
mod tests;
