#[macro_use]
mod common;

use actix_web::test::{self, TestRequest};
use sea_orm::{ActiveModelTrait, ActiveValue};
use serde_json::{json, Value};
use uuid::Uuid;

use blotter::auth::{self, user_for_token};
use blotter::core::errors::ApiError;
use blotter::entities::user;

use common::*;

#[actix_web::test]
async fn test_list_users_hides_private_fields() {
    let ctx = setup().await;
    create_user(ctx.db(), "alice").await;
    let app = test_app!(ctx.state);

    let resp = test::call_service(&app, TestRequest::get().uri("/api/users").to_request()).await;
    assert_eq!(resp.status(), 200);

    let users: Vec<Value> = test::read_body_json(resp).await;
    let names: Vec<&str> = users.iter().map(|u| u["username"].as_str().unwrap()).collect();
    assert!(names.contains(&"admin"));
    assert!(names.contains(&"alice"));
    for u in &users {
        assert!(u.get("password").is_none(), "password leaked: {:?}", u);
        assert!(u.get("email").is_none(), "email leaked: {:?}", u);
    }
}

#[actix_web::test]
async fn test_create_user_requires_token() {
    let ctx = setup().await;
    let app = test_app!(ctx.state);

    let req = TestRequest::post()
        .uri("/api/users")
        .set_json(json!({"username": "bob", "password": PASSWORD, "email": "bob@test.io"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_create_user_and_reject_duplicates() {
    let ctx = setup().await;
    let admin = admin(ctx.db()).await;
    let token = token_for(ctx.db(), admin.id).await;
    let app = test_app!(ctx.state);

    // 1. Create
    let req = TestRequest::post()
        .uri("/api/users")
        .insert_header(bearer(&token))
        .set_json(json!({
            "username": "bob",
            "password": PASSWORD,
            "email": "bob@test.io",
            "website": "https://bob.example"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["username"], "bob");
    assert_eq!(created["website"], "https://bob.example");
    assert!(created.get("password").is_none());

    // 2. Same username
    let req = TestRequest::post()
        .uri("/api/users")
        .insert_header(bearer(&token))
        .set_json(json!({"username": "bob", "password": PASSWORD, "email": "other@test.io"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 409);

    // 3. Same email
    let req = TestRequest::post()
        .uri("/api/users")
        .insert_header(bearer(&token))
        .set_json(json!({"username": "bobby", "password": PASSWORD, "email": "bob@test.io"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 409);
}

#[actix_web::test]
async fn test_create_user_validation() {
    let ctx = setup().await;
    let admin = admin(ctx.db()).await;
    let token = token_for(ctx.db(), admin.id).await;
    let app = test_app!(ctx.state);

    for body in [
        json!({"username": "bo", "password": PASSWORD, "email": "bo@test.io"}),
        json!({"username": "bob!", "password": PASSWORD, "email": "bob@test.io"}),
        json!({"username": "bob", "password": "short", "email": "bob@test.io"}),
        json!({"username": "bob", "password": PASSWORD, "email": "not-an-email"}),
    ] {
        let req = TestRequest::post()
            .uri("/api/users")
            .insert_header(bearer(&token))
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400, "accepted {}", body);
    }
}

#[actix_web::test]
async fn test_storage_rejects_duplicate_username() {
    let ctx = setup().await;
    create_user(ctx.db(), "carol").await;

    let duplicate = user::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        username: ActiveValue::Set("carol".to_string()),
        email: ActiveValue::Set("carol2@test.io".to_string()),
        password: ActiveValue::Set("x".to_string()),
        firstname: ActiveValue::Set(None),
        lastname: ActiveValue::Set(None),
        age: ActiveValue::Set(None),
        gender: ActiveValue::Set(None),
        address: ActiveValue::Set(None),
        website: ActiveValue::Set(None),
    };
    let err = duplicate
        .insert(ctx.db())
        .await
        .expect_err("duplicate username was stored");
    assert!(matches!(ApiError::from(err), ApiError::Conflict(_)));
}

#[actix_web::test]
async fn test_login_and_logout() {
    let ctx = setup().await;
    let alice = create_user(ctx.db(), "alice").await;
    let app = test_app!(ctx.state);

    // 1. Wrong password
    let req = TestRequest::post()
        .uri("/api/users/login")
        .set_json(json!({"username": "alice", "password": "wrong-password"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 401);

    // 2. Login
    let req = TestRequest::post()
        .uri("/api/users/login")
        .set_json(json!({"username": "alice", "password": PASSWORD}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user_id"], alice.id.to_string());
    let token = body["token"].as_str().unwrap().to_string();

    // 3. Token works
    let req = TestRequest::post()
        .uri("/api/categories")
        .insert_header(bearer(&token))
        .set_json(json!({"name": "rust"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 201);

    // 4. Logout revokes it
    let req = TestRequest::post()
        .uri("/api/users/logout")
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let req = TestRequest::post()
        .uri("/api/categories")
        .insert_header(bearer(&token))
        .set_json(json!({"name": "web"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 401);
}

#[actix_web::test]
async fn test_expired_and_unknown_tokens_resolve_to_nobody() {
    let ctx = setup().await;
    let alice = create_user(ctx.db(), "alice").await;
    let token = auth::issue_token(ctx.db(), alice.id).await.unwrap();

    let fresh = user_for_token(ctx.db(), &token.value, chrono::Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(fresh.map(|u| u.id), Some(alice.id));

    let expired = user_for_token(ctx.db(), &token.value, chrono::Duration::seconds(-1))
        .await
        .unwrap();
    assert!(expired.is_none());

    let unknown = user_for_token(ctx.db(), "nope", chrono::Duration::hours(1))
        .await
        .unwrap();
    assert!(unknown.is_none());
}

#[actix_web::test]
async fn test_get_user_and_posts() {
    let ctx = setup().await;
    let alice = create_user(ctx.db(), "alice").await;
    create_post(ctx.db(), alice.id, "OMG", "Oh My God").await;
    let app = test_app!(ctx.state);

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri(&format!("/api/users/{}", alice.id))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["username"], "alice");

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri(&format!("/api/users/{}/posts", alice.id))
            .to_request(),
    )
    .await;
    let posts: Vec<Value> = test::read_body_json(resp).await;
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"], "OMG");

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri(&format!("/api/users/{}", Uuid::new_v4()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 404);

    let resp = test::call_service(&app, TestRequest::get().uri("/api/users/nope").to_request()).await;
    assert_eq!(resp.status(), 400);
}
