//! Building blocks shared by the HTTP modules

pub mod api_response;
pub mod validated_json;

pub use api_response::ApiResponse;
pub use validated_json::{ValidatedJson, ValidatedJsonRejection};
