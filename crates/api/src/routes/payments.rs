//! Payment recording and listing routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    AppState,
    middleware::{AuthUser, auth::check_school_access},
};
use scolara_core::fees::AdmissionError;
use scolara_db::{
    StudentRepository,
    entities::sea_orm_active_enums::PaymentMethod,
    repositories::payment::{
        PaymentError, PaymentFilter, PaymentRepository, RecordPaymentInput,
    },
};
use scolara_shared::{
    Role,
    types::{PageRequest, PageResponse, money::is_positive_amount},
};

/// Creates the payment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/schools/{school_id}/payments", get(list_payments))
        .route("/schools/{school_id}/payments", post(record_payment))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing payments.
#[derive(Debug, Deserialize)]
pub struct ListPaymentsQuery {
    /// Filter by student.
    pub student_id: Option<Uuid>,
    /// Filter by fee schedule line.
    pub fee_schedule_id: Option<Uuid>,
    /// Filter by payment method.
    pub method: Option<String>,
    /// Filter by the students' grade level.
    pub grade_level_id: Option<Uuid>,
    /// Filter by the students' classroom.
    pub classroom_id: Option<Uuid>,
    /// Only payments on or after this date (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Only payments on or before this date (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size (default: 50).
    pub per_page: Option<u32>,
}

/// Request body for recording a payment.
#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    /// Paying student.
    pub student_id: Uuid,
    /// Target fee schedule line (principal or installment).
    pub fee_schedule_id: Uuid,
    /// Amount in minor currency units; must be a positive integer.
    pub amount_cents: i64,
    /// Payment method.
    pub method: String,
    /// When the money was received; defaults to now.
    pub paid_at: Option<chrono::DateTime<chrono::FixedOffset>>,
    /// Optional due date to carry on the record.
    pub due_date: Option<NaiveDate>,
    /// Optional free-form notes.
    pub notes: Option<String>,
}

/// Response for a recorded payment.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    /// Payment ID.
    pub id: Uuid,
    /// Student ID.
    pub student_id: Uuid,
    /// Student's full name.
    pub student_name: String,
    /// Fee schedule line ID.
    pub fee_schedule_id: Uuid,
    /// Fee schedule line name.
    pub fee_name: String,
    /// Academic term of the fee, if any.
    pub term: Option<String>,
    /// Amount in minor currency units.
    pub amount_cents: i64,
    /// Payment method.
    pub method: String,
    /// When the money was received.
    pub paid_at: String,
    /// Notes.
    pub notes: Option<String>,
    /// User that recorded the payment.
    pub recorded_by: Uuid,
}

/// Response for a payment list item.
#[derive(Debug, Serialize)]
pub struct PaymentListItem {
    /// Payment ID.
    pub id: Uuid,
    /// Student ID.
    pub student_id: Uuid,
    /// Fee schedule line ID.
    pub fee_schedule_id: Uuid,
    /// Amount in minor currency units.
    pub amount_cents: i64,
    /// Payment method.
    pub method: String,
    /// When the money was received.
    pub paid_at: String,
    /// Notes.
    pub notes: Option<String>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/schools/{school_id}/payments` - Record a payment.
///
/// Only ADMIN and BURSAR may record payments. The ledger reconciler decides
/// admissibility; a rejection writes nothing.
async fn record_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(school_id): Path<Uuid>,
    Json(payload): Json<RecordPaymentRequest>,
) -> impl IntoResponse {
    if let Err(response) = check_school_access(&auth, school_id, &[Role::Admin, Role::Bursar]) {
        return response;
    }

    if !is_positive_amount(payload.amount_cents) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_amount",
                "message": "Payment amount must be a positive integer"
            })),
        )
            .into_response();
    }

    let Some(method) = string_to_method(&payload.method) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_method",
                "message": "Unknown payment method"
            })),
        )
            .into_response();
    };

    let repo = PaymentRepository::new((*state.db).clone());
    let input = RecordPaymentInput {
        school_id,
        student_id: payload.student_id,
        fee_schedule_id: payload.fee_schedule_id,
        amount_cents: payload.amount_cents,
        method,
        paid_at: payload.paid_at,
        due_date: payload.due_date,
        notes: payload.notes,
        recorded_by: auth.user_id(),
    };

    match repo.record_payment(input).await {
        Ok(result) => {
            info!(
                school_id = %school_id,
                payment_id = %result.payment.id,
                "Payment accepted"
            );

            let response = PaymentResponse {
                id: result.payment.id,
                student_id: result.student.id,
                student_name: format!(
                    "{} {}",
                    result.student.first_name, result.student.last_name
                ),
                fee_schedule_id: result.fee_schedule.id,
                fee_name: result.fee_schedule.name,
                term: result.fee_schedule.term,
                amount_cents: result.payment.amount_cents,
                method: method_to_string(result.payment.method).to_string(),
                paid_at: result.payment.paid_at.to_rfc3339(),
                notes: result.payment.notes,
                recorded_by: result.payment.recorded_by,
            };

            (StatusCode::CREATED, Json(json!({ "payment": response }))).into_response()
        }
        Err(e) => rejection_response(&e),
    }
}

/// GET `/schools/{school_id}/payments` - List payments with filters.
///
/// All roles may list; PARENT callers only ever see payments for their
/// linked children, regardless of the filters they send.
async fn list_payments(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(school_id): Path<Uuid>,
    Query(query): Query<ListPaymentsQuery>,
) -> impl IntoResponse {
    let all_roles = [Role::Admin, Role::Bursar, Role::Teacher, Role::Parent];
    if let Err(response) = check_school_access(&auth, school_id, &all_roles) {
        return response;
    }

    if let Some(raw) = &query.method
        && string_to_method(raw).is_none()
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_method",
                "message": "Unknown payment method"
            })),
        )
            .into_response();
    }

    let restrict_to_students = if auth.role() == Some(Role::Parent) {
        let student_repo = StudentRepository::new((*state.db).clone());
        match student_repo
            .linked_student_ids(school_id, auth.user_id())
            .await
        {
            Ok(ids) => Some(ids),
            Err(e) => {
                error!(error = %e, "Failed to resolve guardian links");
                return internal_error();
            }
        }
    } else {
        None
    };

    let filter = PaymentFilter {
        student_id: query.student_id,
        fee_schedule_id: query.fee_schedule_id,
        method: query.method.as_deref().and_then(string_to_method),
        grade_level_id: query.grade_level_id,
        classroom_id: query.classroom_id,
        date_from: query.from,
        date_to: query.to,
        restrict_to_students,
    };

    let page = PageRequest {
        page: query.page.unwrap_or(1).max(1),
        per_page: query.per_page.unwrap_or(50).clamp(1, 100),
    };

    let repo = PaymentRepository::new((*state.db).clone());
    match repo.list_payments(school_id, filter, &page).await {
        Ok((payments, total)) => {
            let items: Vec<PaymentListItem> = payments
                .into_iter()
                .map(|p| PaymentListItem {
                    id: p.id,
                    student_id: p.student_id,
                    fee_schedule_id: p.fee_schedule_id,
                    amount_cents: p.amount_cents,
                    method: method_to_string(p.method).to_string(),
                    paid_at: p.paid_at.to_rfc3339(),
                    notes: p.notes,
                })
                .collect();

            let body = PageResponse::new(items, page.page, page.per_page, total);
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list payments");
            internal_error()
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Maps a repository error to its HTTP response.
fn rejection_response(e: &PaymentError) -> axum::response::Response {
    match e {
        PaymentError::StudentNotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "student_not_found",
                "message": format!("Student {id} not found in this school")
            })),
        )
            .into_response(),
        PaymentError::FeeScheduleNotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "fee_schedule_not_found",
                "message": format!("Fee schedule {id} not found in this school")
            })),
        )
            .into_response(),
        PaymentError::Rejected(rejection) => admission_rejection_response(rejection),
        PaymentError::Database(db_err) => {
            error!(error = %db_err, "Failed to record payment");
            internal_error()
        }
    }
}

/// Maps a reconciler rejection to its HTTP response.
fn admission_rejection_response(rejection: &AdmissionError) -> axum::response::Response {
    match rejection {
        AdmissionError::NonPositiveAmount { .. } => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_amount",
                "message": "Payment amount must be a positive integer"
            })),
        )
            .into_response(),
        AdmissionError::UnknownLine(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "fee_schedule_not_found",
                "message": format!("Fee schedule {} not found in this school", id.into_inner())
            })),
        )
            .into_response(),
        AdmissionError::SequenceViolation {
            unsettled_line,
            unsettled_order,
            outstanding_cents,
        } => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "installment_out_of_order",
                "message": format!(
                    "Installment {unsettled_order} must be fully settled first"
                ),
                "unsettled_fee_schedule_id": unsettled_line.into_inner(),
                "outstanding_cents": outstanding_cents
            })),
        )
            .into_response(),
        AdmissionError::LineOverpayment { remaining_cents }
        | AdmissionError::GlobalOverpayment { remaining_cents } => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "overpayment",
                "message": "Amount exceeds the remaining balance",
                "remaining_cents": remaining_cents
            })),
        )
            .into_response(),
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

/// Parses a payment method from its wire representation.
fn string_to_method(s: &str) -> Option<PaymentMethod> {
    match s.to_uppercase().as_str() {
        "CASH" => Some(PaymentMethod::Cash),
        "BANK_TRANSFER" => Some(PaymentMethod::BankTransfer),
        "MOBILE_MONEY" => Some(PaymentMethod::MobileMoney),
        "CHECK" => Some(PaymentMethod::Check),
        "CARD" => Some(PaymentMethod::Card),
        _ => None,
    }
}

/// Returns the wire representation of a payment method.
const fn method_to_string(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Cash => "CASH",
        PaymentMethod::BankTransfer => "BANK_TRANSFER",
        PaymentMethod::MobileMoney => "MOBILE_MONEY",
        PaymentMethod::Check => "CHECK",
        PaymentMethod::Card => "CARD",
    }
}
