mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use object_rating::{
    config::{Choice, RatingValues},
    db::RatingStore,
};
use serde_json::json;

#[tokio::test]
async fn test_create_rating_element_success() {
    let app = TestApp::new();
    let (_, token) = app.user("user_1@test.com").await;

    let (status, body) = app
        .post("/rating-elements", &token, json!({ "element_type": "E", "score": 5 }))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["element_type"], "E");
    assert_eq!(body["score"], 5);
    assert_eq!(body["comment"], json!(null));
    assert!(body["id"].as_i64().is_some());
    assert!(body["created_at"].is_string());
    assert!(body["updated_at"].is_string());
}

#[tokio::test]
async fn test_create_rating_element_with_invalid_type_fail() {
    let app = TestApp::new();
    let (_, token) = app.user("user_1@test.com").await;

    let (status, body) = app
        .post(
            "/rating-elements",
            &token,
            json!({ "element_type": "invalid element type", "score": 5 }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "element_type": ["Invalid element type."] }));
}

#[tokio::test]
async fn test_create_rating_element_with_score_out_of_bounds_fail() {
    let app = TestApp::new();
    let (_, token) = app.user("user_1@test.com").await;

    for score in [-1, 11, i16::MIN as i64, i16::MAX as i64] {
        let (status, body) = app
            .post("/rating-elements", &token, json!({ "element_type": "E", "score": score }))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "score {score}");
        assert_eq!(body, json!({ "score": ["Invalid score."] }));
    }
}

#[tokio::test]
async fn test_score_bounds_are_inclusive_and_score_is_optional() {
    let values = RatingValues::new(
        vec![Choice::new("U", "USER_TYPE")],
        vec![Choice::new("E", "ELEMENT_TYPE")],
        3,
        7,
    )
    .unwrap();
    let app = TestApp::with_values(values);
    let (_, token) = app.user("user_1@test.com").await;

    for score in [3, 7] {
        let (status, body) = app
            .post("/rating-elements", &token, json!({ "element_type": "E", "score": score }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["score"], score);
    }

    for score in [0, 2, 8] {
        let (status, _) = app
            .post("/rating-elements", &token, json!({ "element_type": "E", "score": score }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "score {score}");
    }

    let (status, body) = app
        .post("/rating-elements", &token, json!({ "element_type": "E", "comment": "no score" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["score"], json!(null));
    assert_eq!(body["comment"], "no score");
}

#[tokio::test]
async fn test_multiple_invalid_fields_are_reported_together() {
    let app = TestApp::new();
    let (_, token) = app.user("user_1@test.com").await;

    let (status, body) = app
        .post("/rating-elements", &token, json!({ "element_type": "X", "score": 99 }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "element_type": ["Invalid element type."], "score": ["Invalid score."] })
    );
}

#[tokio::test]
async fn test_create_rating_element_requires_element_type() {
    let app = TestApp::new();
    let (_, token) = app.user("user_1@test.com").await;

    let (status, body) = app.post("/rating-elements", &token, json!({ "score": 1 })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "element_type": ["This field is required."] }));
}

#[tokio::test]
async fn test_get_rating_element() {
    let app = TestApp::new();
    let (_, token) = app.user("user_1@test.com").await;
    let element = app.element(Some(10), Some("super")).await;

    let (status, body) = app
        .get(&format!("/rating-elements/{}", element.id), &token)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["element_type"], "E");
    assert_eq!(body["score"], 10);
    assert_eq!(body["comment"], "super");
}

#[tokio::test]
async fn test_list_rating_elements_in_creation_order() {
    let app = TestApp::new();
    let (_, token) = app.user("user_1@test.com").await;
    let first = app.element(Some(10), Some("super")).await;
    let second = app.element(Some(9), Some("good")).await;

    let (status, body) = app.get("/rating-elements", &token).await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[tokio::test]
async fn test_patch_rating_element_keeps_omitted_fields() {
    let app = TestApp::new();
    let (_, token) = app.user("user_1@test.com").await;
    let element = app.element(Some(5), Some("fine")).await;
    let uri = format!("/rating-elements/{}", element.id);

    let (status, body) = app.patch(&uri, &token, json!({ "score": 4 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["element_type"], "E");
    assert_eq!(body["score"], 4);
    assert_eq!(body["comment"], "fine");

    // explicit null clears, a missing key does not
    let (status, body) = app.patch(&uri, &token, json!({ "comment": null })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 4);
    assert_eq!(body["comment"], json!(null));

    let (status, body) = app.patch(&uri, &token, json!({ "score": 11 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "score": ["Invalid score."] }));

    let (_, body) = app.get(&uri, &token).await;
    assert_eq!(body["score"], 4);
}

#[tokio::test]
async fn test_put_rating_element_keeps_omitted_optional_fields() {
    let app = TestApp::new();
    let (_, token) = app.user("user_1@test.com").await;
    let element = app.element(Some(5), Some("keep")).await;
    let uri = format!("/rating-elements/{}", element.id);

    let (status, body) = app.put(&uri, &token, json!({ "element_type": "E" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 5);
    assert_eq!(body["comment"], "keep");

    let (status, body) = app
        .put(&uri, &token, json!({ "element_type": "E", "score": null, "comment": "new" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], json!(null));
    assert_eq!(body["comment"], "new");

    let (status, body) = app.put(&uri, &token, json!({ "score": 2 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "element_type": ["This field is required."] }));
}

#[tokio::test]
async fn test_null_element_type_is_rejected() {
    let app = TestApp::new();
    let (_, token) = app.user("user_1@test.com").await;
    let element = app.element(Some(5), None).await;
    let uri = format!("/rating-elements/{}", element.id);

    let (status, body) = app.patch(&uri, &token, json!({ "element_type": null })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "element_type": ["This field may not be null."] }));

    let (status, body) = app
        .post("/rating-elements", &token, json!({ "element_type": null, "score": 1 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "element_type": ["This field may not be null."] }));

    let (_, body) = app.get(&uri, &token).await;
    assert_eq!(body["element_type"], "E");
}

#[tokio::test]
async fn test_wide_scores_are_out_of_bounds() {
    let app = TestApp::new();
    let (_, token) = app.user("user_1@test.com").await;
    let element = app.element(Some(5), None).await;
    let uri = format!("/rating-elements/{}", element.id);

    for score in [40_000_i64, -40_000, i64::MAX] {
        let (status, body) = app
            .post("/rating-elements", &token, json!({ "element_type": "E", "score": score }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "score {score}");
        assert_eq!(body, json!({ "score": ["Invalid score."] }));

        let (status, body) = app.patch(&uri, &token, json!({ "score": score })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "score {score}");
        assert_eq!(body, json!({ "score": ["Invalid score."] }));
    }
}

#[tokio::test]
async fn test_wrong_field_types_are_field_errors() {
    let app = TestApp::new();
    let (_, token) = app.user("user_1@test.com").await;

    let (status, body) = app
        .post(
            "/rating-elements",
            &token,
            json!({ "element_type": "E", "score": "high", "comment": 5 }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "comment": ["Not a valid string."],
            "score": ["A valid integer is required."],
        })
    );
    assert!(app.store.list_rating_elements().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_body_that_is_not_an_object_is_bad_request() {
    let app = TestApp::new();
    let (_, token) = app.user("user_1@test.com").await;

    let (status, body) = app.post("/rating-elements", &token, json!(["E", 5])).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_delete_rating_element() {
    let app = TestApp::new();
    let (_, token) = app.user("user_1@test.com").await;
    let element = app.element(Some(5), None).await;
    let uri = format!("/rating-elements/{}", element.id);

    let (status, body) = app.delete(&uri, &token).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, json!(null));

    let (status, _) = app.get(&uri, &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&uri, &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_rating_element_is_not_found() {
    let app = TestApp::new();
    let (_, token) = app.user("user_1@test.com").await;

    let (status, body) = app.get("/rating-elements/404", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].is_string());

    let (status, _) = app.patch("/rating-elements/404", &token, json!({ "score": 1 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rating_elements_require_authentication() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/rating-elements", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({ "detail": "Authentication credentials were not provided." })
    );

    let (status, _) = app
        .send(
            Method::POST,
            "/rating-elements",
            Some("not-a-jwt"),
            Some(json!({ "element_type": "E" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(app.store.list_rating_elements().await.unwrap().is_empty());
}
