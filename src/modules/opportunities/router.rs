use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_opportunity, delete_opportunity, get_opportunity, list_opportunities,
    update_opportunity,
};

pub fn init_opportunities_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_opportunity).get(list_opportunities))
        .route(
            "/{id}",
            get(get_opportunity)
                .put(update_opportunity)
                .delete(delete_opportunity),
        )
}
