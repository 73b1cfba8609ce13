//! Request handlers, one module per resource.

pub mod calculator;
pub mod consumption;
pub mod energy;
pub mod users;

use crate::api::response::{ApiResponse, ApiResult, MessageBody};

/// GET /api
pub async fn status() -> ApiResult<MessageBody> {
    Ok(ApiResponse::Ok(MessageBody {
        message: "Horizons Solar backend connected",
    }))
}
