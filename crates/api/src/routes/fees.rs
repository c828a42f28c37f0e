//! Fee statement routes.
//!
//! Settlement status is derived from the payment ledger at read time; the
//! statement endpoint never reflects stored state that could go stale.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{
    AppState,
    middleware::{AuthUser, auth::check_school_access},
};
use scolara_db::{FeeScheduleRepository, StudentRepository};
use scolara_shared::Role;

/// Creates the fee statement routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/schools/{school_id}/students/{student_id}/fees",
        get(student_fee_statement),
    )
}

/// Response for one fee statement line.
#[derive(Debug, Serialize)]
pub struct FeeStatementLineResponse {
    /// Fee schedule line ID.
    pub fee_schedule_id: Uuid,
    /// Fee name.
    pub name: String,
    /// Academic term, if any.
    pub term: Option<String>,
    /// Billed amount in minor currency units.
    pub amount_cents: i64,
    /// Whether this line is an installment of a split fee.
    pub is_installment: bool,
    /// Parent principal fee, for installments.
    pub parent_fee_id: Option<Uuid>,
    /// Payment sequence number, for installments.
    pub installment_order: Option<i32>,
    /// Due date, if any.
    pub due_date: Option<String>,
    /// Sum paid so far in minor currency units.
    pub amount_paid: i64,
    /// Remaining balance in minor currency units.
    pub remaining_cents: i64,
    /// Derived settlement status.
    pub status: String,
}

/// GET `/schools/{school_id}/students/{student_id}/fees` - Fee statement.
///
/// ADMIN, BURSAR, and TEACHER may read any student in the school; PARENT
/// callers only their linked children.
async fn student_fee_statement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((school_id, student_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let all_roles = [Role::Admin, Role::Bursar, Role::Teacher, Role::Parent];
    if let Err(response) = check_school_access(&auth, school_id, &all_roles) {
        return response;
    }

    let student_repo = StudentRepository::new((*state.db).clone());

    if auth.role() == Some(Role::Parent) {
        match student_repo
            .linked_student_ids(school_id, auth.user_id())
            .await
        {
            Ok(linked) if linked.contains(&student_id) => {}
            Ok(_) => {
                return (
                    StatusCode::FORBIDDEN,
                    Json(json!({
                        "error": "forbidden",
                        "message": "You do not have access to this student"
                    })),
                )
                    .into_response();
            }
            Err(e) => {
                error!(error = %e, "Failed to resolve guardian links");
                return internal_error();
            }
        }
    }

    match student_repo.find_by_id(school_id, student_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "student_not_found",
                    "message": format!("Student {student_id} not found in this school")
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Failed to load student");
            return internal_error();
        }
    }

    let fee_repo = FeeScheduleRepository::new((*state.db).clone());
    match fee_repo.statement_for_student(school_id, student_id).await {
        Ok(lines) => {
            let items: Vec<FeeStatementLineResponse> = lines
                .into_iter()
                .map(|line| FeeStatementLineResponse {
                    fee_schedule_id: line.schedule.id,
                    name: line.schedule.name,
                    term: line.schedule.term,
                    amount_cents: line.schedule.amount_cents,
                    is_installment: line.schedule.is_installment,
                    parent_fee_id: line.schedule.parent_fee_id,
                    installment_order: line.schedule.installment_order,
                    due_date: line.schedule.due_date.map(|d| d.to_string()),
                    amount_paid: line.amount_paid,
                    remaining_cents: line.remaining_cents,
                    status: line.status.as_str().to_string(),
                })
                .collect();

            (StatusCode::OK, Json(json!({ "fees": items }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to build fee statement");
            internal_error()
        }
    }
}

fn internal_error() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}
