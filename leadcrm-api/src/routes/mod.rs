/// API route handlers
///
/// Organised by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Signup, login and token refresh
/// - `leads`: Lead CRUD, assignment and category moves
/// - `agents`: Agent management (organisors only)
/// - `categories`: Category listing and detail

pub mod agents;
pub mod auth;
pub mod categories;
pub mod health;
pub mod leads;

use axum::{http::StatusCode, Json};
use leadcrm_shared::notify::NotificationStatus;
use leadcrm_shared::services::Outcome;
use serde::Serialize;

/// Response body of a mutating endpoint
///
/// ```json
/// {
///   "data": { ... },
///   "redirect_to": "/leads",
///   "notification": "sent"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct MutationResponse<T> {
    /// Created or updated record (`null` after a delete)
    pub data: T,

    /// Where the client goes next
    pub redirect_to: String,

    /// Delivery status when the operation sent a notification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<NotificationStatus>,
}

impl<T> From<Outcome<T>> for MutationResponse<T> {
    fn from(outcome: Outcome<T>) -> Self {
        Self {
            data: outcome.value,
            redirect_to: outcome.redirect.path(),
            notification: outcome.notification,
        }
    }
}

pub(crate) fn ok<T>(outcome: Outcome<T>) -> Json<MutationResponse<T>> {
    Json(outcome.into())
}

pub(crate) fn created<T>(outcome: Outcome<T>) -> (StatusCode, Json<MutationResponse<T>>) {
    (StatusCode::CREATED, Json(outcome.into()))
}
