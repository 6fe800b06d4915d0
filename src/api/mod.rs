pub mod dto;
pub mod handlers;
pub mod router;
pub mod validated_json;

pub use router::{create_router, AppState};
pub use validated_json::ValidatedJson;
