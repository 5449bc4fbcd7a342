mod common;

use std::net::TcpListener;

use actix_web::cookie::Key;
use actix_web::{web, App, HttpServer};
use reqwest::redirect::Policy;
use serde_json::json;

use common::{csrf_from, setup, TestContext, PASSWORD};

/// Serves the whole application on a random local port.
async fn spawn_server() -> (String, TestContext) {
    let ctx = setup().await;
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind test port");
    let port = listener.local_addr().unwrap().port();

    let state = ctx.state.clone();
    let key = Key::generate();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(blotter::session_middleware(key.clone(), false))
            .configure(blotter::configure)
            .default_service(web::route().to(blotter::not_found))
    })
    .workers(1)
    .listen(listener)
    .expect("Failed to listen")
    .run();
    actix_web::rt::spawn(server);

    (format!("http://127.0.0.1:{}", port), ctx)
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client")
}

#[actix_web::test]
async fn test_full_blogging_flow() {
    let (base_url, _ctx) = spawn_server().await;
    let client = client();

    // 1. Register through the website
    let resp = client
        .post(format!("{}/register", base_url))
        .form(&[
            ("username", "flowuser"),
            ("password", PASSWORD),
            ("confirmPassword", PASSWORD),
            ("email", "flow@test.io"),
        ])
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/");

    // 2. Publish a post with the form
    let form_html = client
        .get(format!("{}/posts/create", base_url))
        .send()
        .await
        .expect("Failed to open the post form")
        .text()
        .await
        .unwrap();
    let token = csrf_from(&form_html);

    let resp = client
        .post(format!("{}/posts/create", base_url))
        .form(&[
            ("title", "Integration"),
            ("description", "end to end"),
            ("body", "Posted from the integration test"),
            ("categories", "testing"),
            ("comments", ""),
            ("csrfToken", token.as_str()),
        ])
        .send()
        .await
        .expect("Failed to create post");
    assert_eq!(resp.status(), 303);

    // 3. Log in to the API
    let resp = client
        .post(format!("{}/api/users/login", base_url))
        .json(&json!({"username": "flowuser", "password": PASSWORD}))
        .send()
        .await
        .expect("Failed to login");
    assert_eq!(resp.status(), 200);
    let login = resp.json::<serde_json::Value>().await.unwrap();
    let api_token = login["token"].as_str().unwrap().to_string();

    // 4. Find the post
    let found = client
        .get(format!("{}/api/posts/search?term=Integration", base_url))
        .send()
        .await
        .expect("Failed to search")
        .json::<Vec<serde_json::Value>>()
        .await
        .unwrap();
    assert_eq!(found.len(), 1, "search returned {:?}", found);
    let post_id = found[0]["id"].as_str().unwrap().to_string();

    let categories = client
        .get(format!("{}/api/posts/{}/categories", base_url, post_id))
        .send()
        .await
        .expect("Failed to list categories")
        .json::<Vec<serde_json::Value>>()
        .await
        .unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0]["name"], "testing");

    // 5. Edit it over the API
    let resp = client
        .put(format!("{}/api/posts/{}", base_url, post_id))
        .header("Authorization", format!("Bearer {}", api_token))
        .json(&json!({"title": "Integration, edited", "body": "Updated from the integration test"}))
        .send()
        .await
        .expect("Failed to edit post");
    assert_eq!(resp.status(), 200);
    let edited = resp.json::<serde_json::Value>().await.unwrap();
    assert!(edited["updated_at"].is_string(), "updated_at should be set after edit");

    let home = client
        .get(format!("{}/", base_url))
        .send()
        .await
        .expect("Failed to load home page")
        .text()
        .await
        .unwrap();
    assert!(home.contains("Integration, edited"));

    // 6. Delete it
    let resp = client
        .delete(format!("{}/api/posts/{}", base_url, post_id))
        .header("Authorization", format!("Bearer {}", api_token))
        .send()
        .await
        .expect("Failed to delete post");
    assert_eq!(resp.status(), 204);

    let resp = client
        .get(format!("{}/api/posts/{}", base_url, post_id))
        .send()
        .await
        .expect("Failed to fetch post");
    assert_eq!(resp.status(), 404);

    // 7. Log out of the website
    let resp = client
        .post(format!("{}/logout", base_url))
        .send()
        .await
        .expect("Failed to logout");
    assert_eq!(resp.status(), 303);

    let resp = client
        .get(format!("{}/", base_url))
        .send()
        .await
        .expect("Failed to load home page");
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/login");
}

#[actix_web::test]
async fn test_api_rejects_bad_credentials() {
    let (base_url, _ctx) = spawn_server().await;
    let client = client();

    let resp = client
        .post(format!("{}/api/users/login", base_url))
        .json(&json!({"username": "nonexistent_user", "password": "wrongpass"}))
        .send()
        .await
        .expect("Failed to make request");
    assert_eq!(resp.status(), 401);

    let resp = client
        .post(format!("{}/api/posts", base_url))
        .json(&json!({"title": "No auth", "body": "Test post without auth"}))
        .send()
        .await
        .expect("Failed to make request");
    assert_eq!(resp.status(), 401);
}
