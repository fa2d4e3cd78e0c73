/// Integration tests for tag endpoints

mod common;

use axum::http::StatusCode;
use common::{body_json, sample_recipe, TestContext};
use serde_json::json;

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_list_tags_descending_by_name_and_owner_scoped() {
    let ctx = TestContext::new().await.unwrap();
    let (_, other_auth) = ctx.other_user().await.unwrap();

    ctx.create_recipe(json!({
        "title": "Tagged",
        "time_minutes": 5,
        "price": "1.00",
        "tags": [{"name": "Apple"}, {"name": "Zebra"}]
    }))
    .await;

    // A foreign tag must never show up
    let response = ctx
        .request_as(
            "POST",
            "/v1/recipes",
            &other_auth,
            Some(json!({
                "title": "Foreign",
                "time_minutes": 5,
                "price": "1.00",
                "tags": [{"name": "Hidden"}]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = ctx.request("GET", "/v1/tags", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let tags = body_json(response).await;
    let names: Vec<&str> = tags
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Zebra", "Apple"]);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_assigned_only_filters_unlinked_tags() {
    let ctx = TestContext::new().await.unwrap();

    let recipe = ctx
        .create_recipe(json!({
            "title": "Linked",
            "time_minutes": 5,
            "price": "1.00",
            "tags": [{"name": "Used"}, {"name": "Dropped"}]
        }))
        .await;

    // Unlink "Dropped" by replacing the set
    let response = ctx
        .request(
            "PATCH",
            &format!("/v1/recipes/{}", recipe["id"]),
            Some(json!({ "tags": [{"name": "Used"}] })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx.request("GET", "/v1/tags?assigned_only=1", None).await;
    let tags = body_json(response).await;
    let names: Vec<&str> = tags
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Used"]);

    // Without the filter both remain visible
    let response = ctx.request("GET", "/v1/tags", None).await;
    let tags = body_json(response).await;
    assert_eq!(tags.as_array().unwrap().len(), 2);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_assigned_only_rejects_garbage() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.request("GET", "/v1/tags?assigned_only=maybe", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_rename_tag() {
    let ctx = TestContext::new().await.unwrap();

    let recipe = ctx
        .create_recipe(json!({
            "title": "Renamable",
            "time_minutes": 5,
            "price": "1.00",
            "tags": [{"name": "Supper"}]
        }))
        .await;
    let tag_id = recipe["tags"][0]["id"].as_i64().unwrap();

    let response = ctx
        .request(
            "PATCH",
            &format!("/v1/tags/{}", tag_id),
            Some(json!({ "name": "Dinner" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["name"], "Dinner");
    assert_eq!(body["id"], tag_id);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_rename_to_existing_name_conflicts() {
    let ctx = TestContext::new().await.unwrap();

    let recipe = ctx
        .create_recipe(json!({
            "title": "TwoTags",
            "time_minutes": 5,
            "price": "1.00",
            "tags": [{"name": "One"}, {"name": "Two"}]
        }))
        .await;
    // Lists come back ordered by name, so index 0 is "One"
    let tag_id = recipe["tags"][0]["id"].as_i64().unwrap();
    assert_eq!(recipe["tags"][0]["name"], "One");

    let response = ctx
        .request(
            "PATCH",
            &format!("/v1/tags/{}", tag_id),
            Some(json!({ "name": "Two" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_rename_foreign_tag_is_not_found() {
    let ctx = TestContext::new().await.unwrap();
    let (_, other_auth) = ctx.other_user().await.unwrap();

    let recipe = ctx
        .create_recipe(json!({
            "title": "Guarded",
            "time_minutes": 5,
            "price": "1.00",
            "tags": [{"name": "Private"}]
        }))
        .await;
    let tag_id = recipe["tags"][0]["id"].as_i64().unwrap();

    let response = ctx
        .request_as(
            "PATCH",
            &format!("/v1/tags/{}", tag_id),
            &other_auth,
            Some(json!({ "name": "Stolen" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_delete_tag_unlinks_but_keeps_recipe() {
    let ctx = TestContext::new().await.unwrap();

    let recipe = ctx
        .create_recipe(json!({
            "title": "Survivor",
            "time_minutes": 5,
            "price": "1.00",
            "tags": [{"name": "Ephemeral"}]
        }))
        .await;
    let tag_id = recipe["tags"][0]["id"].as_i64().unwrap();

    let response = ctx
        .request("DELETE", &format!("/v1/tags/{}", tag_id), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The recipe is intact, just untagged
    let response = ctx
        .request("GET", &format!("/v1/recipes/{}", recipe["id"]), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["tags"], json!([]));

    // Deleting again reports not-found
    let response = ctx
        .request("DELETE", &format!("/v1/tags/{}", tag_id), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_recipe_without_tags_creates_none() {
    let ctx = TestContext::new().await.unwrap();

    ctx.create_recipe(sample_recipe("Plain")).await;

    let response = ctx.request("GET", "/v1/tags", None).await;
    let tags = body_json(response).await;
    assert_eq!(tags.as_array().unwrap().len(), 0);

    ctx.cleanup().await.unwrap();
}
