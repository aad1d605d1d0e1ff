pub mod auth;
pub mod cancellation;
pub mod response;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use cancellation::request_cancellation_middleware;
pub use response::{ApiResponse, ApiResult};
