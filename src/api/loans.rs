//! Loan lifecycle endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::loan::{CreateLoan, Loan},
};

use super::{AdminCaller, Caller, MessageResponse, OptionalCaller};

/// List all loans (admin only)
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of loans", body = Vec<Loan>),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    AdminCaller(_caller): AdminCaller,
) -> AppResult<Json<Vec<Loan>>> {
    let loans = state.services.loans.list().await?;
    Ok(Json(loans))
}

/// List active loans (admin only)
#[utoipa::path(
    get,
    path = "/loans/active",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active loans", body = Vec<Loan>),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_active_loans(
    State(state): State<crate::AppState>,
    AdminCaller(_caller): AdminCaller,
) -> AppResult<Json<Vec<Loan>>> {
    let loans = state.services.loans.list_active().await?;
    Ok(Json(loans))
}

/// List the authenticated caller's own loans.
///
/// Authentication is optional at the transport level so that a missing or
/// broken token surfaces as `Forbidden` rather than a challenge.
#[utoipa::path(
    get,
    path = "/loans/me",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's loans", body = Vec<Loan>),
        (status = 403, description = "Not authenticated")
    )
)]
pub async fn list_my_loans(
    State(state): State<crate::AppState>,
    OptionalCaller(caller): OptionalCaller,
) -> AppResult<Json<Vec<Loan>>> {
    let caller = caller
        .ok_or_else(|| AppError::Authorization("Authentication required".to_string()))?;

    let loans = state.services.loans.list_for_user(caller.user.id).await?;
    Ok(Json(loans))
}

/// Get a single loan. Visible to its owner and to administrators.
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan details", body = Loan),
        (status = 403, description = "Not the owner and not an admin"),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<crate::AppState>,
    Caller(caller): Caller,
    Path(id): Path<i32>,
) -> AppResult<Json<Loan>> {
    let loan = state.services.loans.get_by_id(id).await?;

    if loan.user_id != caller.user.id && !caller.is_admin() {
        return Err(AppError::Authorization("Access denied".to_string()));
    }

    Ok(Json(loan))
}

/// Create a loan.
///
/// A regular caller borrows for themselves; supplying a `user_id` other
/// than their own requires the admin role.
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateLoan,
    responses(
        (status = 200, description = "Loan created", body = Loan),
        (status = 400, description = "Book not available or user inactive"),
        (status = 403, description = "Borrowing for another user requires admin"),
        (status = 404, description = "Book or user not found")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    Caller(caller): Caller,
    Json(request): Json<CreateLoan>,
) -> AppResult<Json<Loan>> {
    let user_id = match request.user_id {
        Some(id) if id != caller.user.id => {
            if !caller.is_admin() {
                return Err(AppError::Authorization(
                    "Only administrators can issue loans for other users".to_string(),
                ));
            }
            id
        }
        _ => caller.user.id,
    };

    let loan = state
        .services
        .loans
        .create(request.book_id, user_id, request.loan_date)
        .await?;
    Ok(Json(loan))
}

/// Mark a loan as returned (admin only)
#[utoipa::path(
    put,
    path = "/loans/return/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan returned", body = Loan),
        (status = 400, description = "Loan already returned"),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    AdminCaller(_caller): AdminCaller,
    Path(id): Path<i32>,
) -> AppResult<Json<Loan>> {
    let loan = state.services.loans.return_loan(id).await?;
    Ok(Json(loan))
}

/// Hard-delete a loan (admin only). An active loan's book becomes
/// available again.
#[utoipa::path(
    delete,
    path = "/loans/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan deleted", body = MessageResponse),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn delete_loan(
    State(state): State<crate::AppState>,
    AdminCaller(_caller): AdminCaller,
    Path(id): Path<i32>,
) -> AppResult<Json<MessageResponse>> {
    state.services.loans.delete(id).await?;
    Ok(Json(MessageResponse {
        message: "Loan deleted successfully".to_string(),
    }))
}
