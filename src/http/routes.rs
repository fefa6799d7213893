use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    http::handlers::{
        create_object_rating_handler, create_rating_element_handler, create_user_handler,
        delete_current_user_handler, delete_object_rating_handler, delete_rating_element_handler,
        get_current_user_handler, get_object_rating_handler, get_object_rating_target_handler,
        get_rating_element_handler, list_object_ratings_handler, list_rating_elements_handler,
        patch_object_rating_handler, patch_rating_element_handler, put_object_rating_handler,
        put_rating_element_handler,
    },
    state::AppState,
};

pub fn create_http_routes(state: AppState) -> Router {
    Router::new()
        .route("/users", post(create_user_handler))
        .route(
            "/users/me",
            get(get_current_user_handler).delete(delete_current_user_handler),
        )
        .route(
            "/rating-elements",
            get(list_rating_elements_handler).post(create_rating_element_handler),
        )
        .route(
            "/rating-elements/{id}",
            get(get_rating_element_handler)
                .put(put_rating_element_handler)
                .patch(patch_rating_element_handler)
                .delete(delete_rating_element_handler),
        )
        .route(
            "/object-ratings",
            get(list_object_ratings_handler).post(create_object_rating_handler),
        )
        .route(
            "/object-ratings/{id}",
            get(get_object_rating_handler)
                .put(put_object_rating_handler)
                .patch(patch_object_rating_handler)
                .delete(delete_object_rating_handler),
        )
        .route(
            "/object-ratings/{id}/target",
            get(get_object_rating_target_handler),
        )
        .with_state(state)
}
