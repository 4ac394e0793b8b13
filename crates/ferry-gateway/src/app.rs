use axum::http::header::ACCESS_CONTROL_ALLOW_ORIGIN;
use axum::http::HeaderValue;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    admin_handler, create_text_mapping_handler, create_url_mapping_handler,
    delete_mapping_handler, gist_handler, health_handler, incomplete_resolve_path_handler,
    list_all_mappings_handler, list_user_mappings_handler, preflight_handler, qrcode_handler,
    resolve_mapping_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/m/{user_id}", get(incomplete_resolve_path_handler))
            .route("/m/{user_id}/{*custom_path}", get(resolve_mapping_handler))
            .nest(
                "/api",
                Router::new()
                    .route(
                        "/create-url-mapping",
                        post(create_url_mapping_handler).options(preflight_handler),
                    )
                    .route(
                        "/create-text-mapping",
                        post(create_text_mapping_handler).options(preflight_handler),
                    )
                    .route("/list-mappings", get(list_all_mappings_handler))
                    .route("/user/{user_id}/mappings", get(list_user_mappings_handler))
                    .route(
                        "/user/{user_id}/mappings/{custom_path}/delete",
                        delete(delete_mapping_handler).options(preflight_handler),
                    ),
            )
            .route("/admin", post(admin_handler).options(preflight_handler))
            .route("/gist/{*path}", get(gist_handler))
            .route("/qrcode/generate", get(qrcode_handler))
            .layer(SetResponseHeaderLayer::if_not_present(
                ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
