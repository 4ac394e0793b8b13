mod admin;
mod health;
mod mapping;

pub use admin::{AdminCreateResponse, AdminDeleteAllResponse, AdminDeleteResponse, AdminRequest};
pub use health::HealthResponse;
pub use mapping::{
    CreateTextMappingForm, CreateTextMappingResponse, CreateUrlMappingForm,
    CreateUrlMappingResponse, DeleteMappingResponse, ListMappingsResponse, MappingView,
};

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
