use axum::{extract::Request, middleware::Next, response::Response};
use tokio_util::sync::CancellationToken;

/// Inserts a per-request `CancellationToken` so handlers can hand the core the
/// signal its operations take. The token fires when the request future is
/// dropped, which hyper does after the handler future is already gone, so a
/// handler never observes it cancelled; anything spawned with a clone of it
/// (outliving the request) does.
pub async fn request_cancellation_middleware(mut request: Request, next: Next) -> Response {
    let token = CancellationToken::new();
    let _guard = token.clone().drop_guard();
    request.extensions_mut().insert(token);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware::from_fn, routing::get, Extension, Router};
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    #[tokio::test]
    async fn token_is_live_in_handler_and_fires_after_request() {
        let seen: Arc<Mutex<Option<(CancellationToken, bool)>>> = Arc::new(Mutex::new(None));
        let slot = seen.clone();
        let app = Router::new()
            .route(
                "/",
                get(move |Extension(cancel): Extension<CancellationToken>| {
                    let slot = slot.clone();
                    async move {
                        let live = !cancel.is_cancelled();
                        *slot.lock().unwrap() = Some((cancel, live));
                        "ok"
                    }
                }),
            )
            .layer(from_fn(request_cancellation_middleware));

        let response = app.oneshot(axum::http::Request::get("/").body(Body::empty()).unwrap()).await.unwrap();
        assert!(response.status().is_success());

        let (token, live_in_handler) = seen.lock().unwrap().take().unwrap();
        assert!(live_in_handler);
        assert!(token.is_cancelled());
    }
}
