mod admin;
mod cors;
mod health;
mod mapping;
mod proxy;
mod resolve;

pub use admin::admin_handler;
pub use cors::preflight_handler;
pub use health::health_handler;
pub use mapping::{
    create_text_mapping_handler, create_url_mapping_handler, delete_mapping_handler,
    list_all_mappings_handler, list_user_mappings_handler,
};
pub use proxy::{gist_handler, qrcode_handler};
pub use resolve::{incomplete_resolve_path_handler, resolve_mapping_handler};
