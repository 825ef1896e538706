use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    delete_document, get_document, list_documents, update_document, upload_document,
};

pub fn init_documents_router() -> Router<AppState> {
    Router::new()
        .route("/", post(upload_document).get(list_documents))
        .route(
            "/{id}",
            get(get_document).put(update_document).delete(delete_document),
        )
}
