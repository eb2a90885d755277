use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use chrono::{Local, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::domain::{ChildId, ClassroomId, StaffId};
use super::repository::{RepositoryError, RosterRepository};
use super::service::{RosterError, RosterService};
use crate::auth::{require_roles, AuthenticatedUser, ProfileDirectory, Role, RoleGate};
use crate::dates::deserialize_optional_date;

type SharedService<R> = Arc<RosterService<R>>;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AsOfQuery {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) as_of: Option<NaiveDate>,
}

impl AsOfQuery {
    fn date(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Local::now().date_naive())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssignStaffRequest {
    pub(crate) staff_id: StaffId,
}

/// Router exposing ratio reads plus the attendance and assignment changes
/// that feed them. Each group sits behind its own role gate.
pub fn roster_router<R, D>(service: SharedService<R>, directory: Arc<D>) -> Router
where
    R: RosterRepository + 'static,
    D: ProfileDirectory + 'static,
{
    let ratio_routes: Router<SharedService<R>> = Router::new()
        .route(
            "/api/v1/ratio/classroom/:classroom_id",
            get(classroom_ratio_handler::<R>),
        )
        .route("/api/v1/ratio/overview", get(ratio_overview_handler::<R>))
        .route_layer(middleware::from_fn_with_state(
            RoleGate::new(directory.clone(), Role::RATIO_READERS),
            require_roles::<D>,
        ));

    let attendance_routes: Router<SharedService<R>> = Router::new()
        .route(
            "/api/v1/attendance/children/:child_id/check-in",
            post(check_in_handler::<R>),
        )
        .route(
            "/api/v1/attendance/children/:child_id/check-out",
            post(check_out_handler::<R>),
        )
        .route(
            "/api/v1/attendance/staff/:staff_id/sign-in",
            post(sign_in_handler::<R>),
        )
        .route(
            "/api/v1/attendance/staff/:staff_id/sign-out",
            post(sign_out_handler::<R>),
        )
        .route_layer(middleware::from_fn_with_state(
            RoleGate::new(directory.clone(), Role::ATTENDANCE_WRITERS),
            require_roles::<D>,
        ));

    let assignment_routes: Router<SharedService<R>> = Router::new()
        .route(
            "/api/v1/classrooms/:classroom_id/assignments",
            post(assign_handler::<R>),
        )
        .route(
            "/api/v1/classrooms/:classroom_id/assignments/:staff_id",
            delete(unassign_handler::<R>),
        )
        .route_layer(middleware::from_fn_with_state(
            RoleGate::new(directory, Role::ASSIGNMENT_WRITERS),
            require_roles::<D>,
        ));

    ratio_routes
        .merge(attendance_routes)
        .merge(assignment_routes)
        .with_state(service)
}

pub(crate) async fn classroom_ratio_handler<R>(
    State(service): State<SharedService<R>>,
    Path(classroom_id): Path<String>,
    Query(query): Query<AsOfQuery>,
) -> Response
where
    R: RosterRepository + 'static,
{
    match service.classroom_ratio(&ClassroomId(classroom_id), query.date()) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn ratio_overview_handler<R>(
    State(service): State<SharedService<R>>,
    Query(query): Query<AsOfQuery>,
) -> Response
where
    R: RosterRepository + 'static,
{
    match service.ratio_overview(query.date()) {
        Ok(overview) => (StatusCode::OK, Json(overview)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn check_in_handler<R>(
    State(service): State<SharedService<R>>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path(child_id): Path<String>,
) -> Response
where
    R: RosterRepository + 'static,
{
    info!(actor = %actor.user_id, %child_id, "check-in requested");
    match service.check_in_child(&ChildId(child_id), Utc::now()) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn check_out_handler<R>(
    State(service): State<SharedService<R>>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path(child_id): Path<String>,
) -> Response
where
    R: RosterRepository + 'static,
{
    info!(actor = %actor.user_id, %child_id, "check-out requested");
    match service.check_out_child(&ChildId(child_id), Utc::now()) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn sign_in_handler<R>(
    State(service): State<SharedService<R>>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path(staff_id): Path<String>,
) -> Response
where
    R: RosterRepository + 'static,
{
    info!(actor = %actor.user_id, %staff_id, "staff sign-in requested");
    match service.sign_in_staff(&StaffId(staff_id), Utc::now()) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn sign_out_handler<R>(
    State(service): State<SharedService<R>>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path(staff_id): Path<String>,
) -> Response
where
    R: RosterRepository + 'static,
{
    info!(actor = %actor.user_id, %staff_id, "staff sign-out requested");
    match service.sign_out_staff(&StaffId(staff_id), Utc::now()) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn assign_handler<R>(
    State(service): State<SharedService<R>>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path(classroom_id): Path<String>,
    Json(request): Json<AssignStaffRequest>,
) -> Response
where
    R: RosterRepository + 'static,
{
    info!(actor = %actor.user_id, %classroom_id, staff_id = %request.staff_id, "assignment requested");
    match service.assign_staff(&request.staff_id, &ClassroomId(classroom_id), Utc::now()) {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn unassign_handler<R>(
    State(service): State<SharedService<R>>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path((classroom_id, staff_id)): Path<(String, String)>,
) -> Response
where
    R: RosterRepository + 'static,
{
    info!(actor = %actor.user_id, %classroom_id, %staff_id, "assignment removal requested");
    match service.remove_assignment(
        &StaffId(staff_id),
        &ClassroomId(classroom_id),
        Utc::now(),
    ) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: RosterError) -> Response {
    let status = match &err {
        RosterError::ClassroomNotFound(_)
        | RosterError::ChildNotFound(_)
        | RosterError::StaffNotFound(_)
        | RosterError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        RosterError::AlreadyAssigned { .. }
        | RosterError::InvalidTransition { .. }
        | RosterError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        RosterError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": err.to_string(),
    });
    (status, Json(payload)).into_response()
}
