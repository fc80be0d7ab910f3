mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

fn batch_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

async fn place(server: &common::TestServer, body: Value) -> Result<(StatusCode, Value)> {
    let response = common::client()
        .post(server.url("/orders"))
        .json(&body)
        .send()
        .await?;
    Ok((response.status(), response.json().await?))
}

/// Listed orders whose `order_id` starts with `prefix`
async fn orders_in_batch(
    server: &common::TestServer,
    statuses: &str,
    prefix: &str,
) -> Result<Vec<Value>> {
    let (status, listed) =
        common::admin_get(server, &format!("/orders?order_status={}", statuses)).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(listed
        .as_array()
        .unwrap()
        .iter()
        .filter(|o| o["order_id"].as_str().is_some_and(|id| id.starts_with(prefix)))
        .cloned()
        .collect())
}

#[tokio::test]
async fn public_order_carries_aggregated_details() -> Result<()> {
    let Some(server) = common::server().await? else {
        return Ok(());
    };
    let server = &server;

    let extra = common::create_ingredient(server, "3.00").await?;
    let removed = common::create_ingredient(server, "1.00").await?;
    let product = common::create_product(server, &[removed["id"].as_i64().unwrap()]).await?;

    let order_id = batch_id();
    let (status, order) = place(
        server,
        json!({
            "order_id": order_id,
            "product_id": product["id"],
            "price": "15.5",
            "table_number": 4,
            "observation": "sem açúcar",
            "additional_ingredients": [
                { "ingredient_id": extra["id"], "multiplied": 2, "price": "3.00" }
            ],
            "removed_ingredients": [removed["id"]],
        }),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["price"], "15.50");
    assert_eq!(order["product"][0]["name"], product["name"]);
    assert_eq!(order["additional_ingredients"][0]["name"], extra["name"]);
    assert_eq!(order["additional_ingredients"][0]["multiplied"], 2);
    assert_eq!(order["removed_ingredients"][0]["name"], removed["name"]);
    Ok(())
}

#[tokio::test]
async fn listing_filters_by_any_of_the_given_statuses() -> Result<()> {
    let Some(server) = common::server().await? else {
        return Ok(());
    };
    let server = &server;

    let product = common::create_product(server, &[]).await?;
    let prefix = batch_id();

    for next in ["pending", "accepted", "declined", "finished"] {
        let order_id = format!("{}-{}", prefix, next);
        let (status, _) = place(
            server,
            json!({
                "order_id": order_id,
                "product_id": product["id"],
                "price": "12.50",
                "table_number": 7,
            }),
        )
        .await?;
        assert_eq!(status, StatusCode::CREATED);

        let (status, updated) = common::admin_patch(
            server,
            &format!("/orders/{}", order_id),
            json!({ "order_status": [next] }),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated[0]["status"], next);
    }

    let listed = orders_in_batch(server, "pending,accepted", &prefix).await?;
    assert_eq!(listed.len(), 2);
    Ok(())
}

#[tokio::test]
async fn status_patch_moves_the_whole_batch() -> Result<()> {
    let Some(server) = common::server().await? else {
        return Ok(());
    };
    let server = &server;

    let product = common::create_product(server, &[]).await?;
    let order_id = batch_id();
    let line = json!({
        "order_id": order_id,
        "product_id": product["id"],
        "price": "12.50",
        "table_number": 3,
    });
    let (status, placed) = place(server, json!([line, line])).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(placed.as_array().unwrap().len(), 2);

    let (status, updated) = common::admin_patch(
        server,
        &format!("/orders/{}", order_id),
        json!({ "order_status": ["accepted"] }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let updated = updated.as_array().unwrap();
    assert_eq!(updated.len(), 2);
    assert!(updated.iter().all(|o| o["status"] == "accepted"));

    let accepted = orders_in_batch(server, "accepted", &order_id).await?;
    assert_eq!(accepted.len(), 2);
    assert!(orders_in_batch(server, "pending", &order_id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn status_patch_on_unknown_batch_is_not_found() -> Result<()> {
    let Some(server) = common::server().await? else {
        return Ok(());
    };
    let server = &server;

    let (status, body) = common::admin_patch(
        server,
        &format!("/orders/{}", batch_id()),
        json!({ "order_status": ["accepted"] }),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["key"], "order_id");
    assert_eq!(body["error_location_code"], "MODEL:ORDER:FIND_BY_ID:NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn unknown_additional_ingredient_rolls_back_the_batch() -> Result<()> {
    let Some(server) = common::server().await? else {
        return Ok(());
    };
    let server = &server;

    let product = common::create_product(server, &[]).await?;
    let order_id = batch_id();
    let (status, body) = place(
        server,
        json!([
            { "order_id": order_id, "product_id": product["id"], "price": "12.50", "table_number": 2 },
            {
                "order_id": order_id,
                "product_id": product["id"],
                "price": "12.50",
                "table_number": 2,
                "additional_ingredients": [
                    { "ingredient_id": 2147483000, "multiplied": 1, "price": "1.00" }
                ],
            },
        ]),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["key"], "ingredient_id");
    assert_eq!(
        body["error_location_code"],
        "MODEL:ORDER:CHECK_FOR_ORDER_INGREDIENT_ID:NOT_FOUND"
    );

    let persisted = orders_in_batch(server, "pending,accepted,declined,finished", &order_id).await?;
    assert!(persisted.is_empty());
    Ok(())
}

#[tokio::test]
async fn unknown_product_is_not_found() -> Result<()> {
    let Some(server) = common::server().await? else {
        return Ok(());
    };
    let server = &server;

    let (status, body) = place(
        server,
        json!({ "order_id": batch_id(), "product_id": 2147483000, "price": 1, "table_number": 1 }),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["key"], "product_id");
    Ok(())
}

#[tokio::test]
async fn empty_batch_is_rejected() -> Result<()> {
    let Some(server) = common::server().await? else {
        return Ok(());
    };
    let server = &server;

    let (status, body) = place(server, json!([])).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["type"], "array.min");
    Ok(())
}

#[tokio::test]
async fn listing_orders_requires_admin() -> Result<()> {
    let Some(server) = common::server().await? else {
        return Ok(());
    };
    let server = &server;

    let response = common::client()
        .get(server.url("/orders?order_status=pending"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    Ok(())
}
