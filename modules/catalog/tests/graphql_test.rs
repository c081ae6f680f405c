use async_graphql::{Request, Variables};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request as HttpRequest, StatusCode},
    Router,
};
use catalog::{Catalog, CatalogConfig, CatalogSchema};
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_config() -> CatalogConfig {
    CatalogConfig {
        bcrypt_cost: 4,
        ..CatalogConfig::default()
    }
}

fn schema() -> CatalogSchema {
    Catalog::in_memory(&test_config()).schema()
}

async fn run(schema: &CatalogSchema, query: &str, vars: Value) -> Value {
    let req = Request::new(query).variables(Variables::from_json(vars));
    let resp = schema.execute(req).await;
    serde_json::to_value(&resp).unwrap()
}

const ADD_USER: &str = r#"
    mutation($email: String!, $username: String!, $password: String!, $isAdmin: Boolean!) {
        addUser(email: $email, username: $username, password: $password, isAdmin: $isAdmin) {
            id email username password isAdmin createdAt updatedAt
        }
    }"#;

const ADD_MOVIE: &str = r#"
    mutation($title: String!, $genre: String!, $rating: Int!, $duration: String!) {
        addMovie(title: $title, genre: $genre, rating: $rating, duration: $duration) {
            id title genre rating duration createdAt updatedAt
        }
    }"#;

/// The failed field stays in `data` as `null` and its error carries the field path.
fn failed_field_message(resp: &Value, field: &str) -> String {
    let data = resp["data"]
        .as_object()
        .unwrap_or_else(|| panic!("data must be an object: {resp}"));
    assert_eq!(data.get(field), Some(&Value::Null), "{resp}");

    let error = resp["errors"]
        .as_array()
        .and_then(|errors| errors.iter().find(|e| e["path"] == json!([field])))
        .unwrap_or_else(|| panic!("no error for {field}: {resp}"));
    error["message"].as_str().unwrap().to_owned()
}

async fn add_user(schema: &CatalogSchema, email: &str, username: &str, password: &str) -> Value {
    run(
        schema,
        ADD_USER,
        json!({ "email": email, "username": username, "password": password, "isAdmin": false }),
    )
    .await
}

#[tokio::test]
async fn add_user_stores_a_hash_not_the_plaintext() {
    let schema = schema();
    let resp = add_user(&schema, "neo@matrix.io", "neo", "redpill").await;

    assert!(resp.get("errors").is_none(), "{resp}");
    let user = &resp["data"]["addUser"];
    assert_eq!(user["email"], "neo@matrix.io");
    assert_eq!(user["username"], "neo");
    assert_eq!(user["isAdmin"], false);
    assert_ne!(user["password"], "redpill");
    assert!(user["password"].as_str().unwrap().starts_with("$2"));
    assert_eq!(user["id"].as_str().unwrap().len(), 24);
    assert_eq!(user["createdAt"], user["updatedAt"]);
}

#[tokio::test]
async fn duplicate_email_fails_with_an_error() {
    let schema = schema();
    add_user(&schema, "dup@x.io", "first", "pw").await;

    let resp = add_user(&schema, "dup@x.io", "second", "pw").await;
    let message = failed_field_message(&resp, "addUser");
    assert!(message.contains("duplicate key"), "{message}");

    let users = run(&schema, "{ users { username } }", json!({})).await;
    assert_eq!(users["data"]["users"], json!([{ "username": "first" }]));
}

#[tokio::test]
async fn unknown_user_resolves_to_null_without_errors() {
    let schema = schema();
    let resp = run(
        &schema,
        r#"{ user(id: "65f0c0ffee0000000000abcd") { id } }"#,
        json!({}),
    )
    .await;
    assert_eq!(resp, json!({ "data": { "user": null } }));

    let malformed = run(&schema, r#"{ user(id: "nope") { id } }"#, json!({})).await;
    assert_eq!(malformed, json!({ "data": { "user": null } }));
}

#[tokio::test]
async fn malformed_movie_id_is_an_error() {
    let schema = schema();
    let resp = run(&schema, r#"{ movie(id: "nope") { id } }"#, json!({})).await;
    let message = failed_field_message(&resp, "movie");
    assert!(message.contains("Invalid id 'nope'"), "{message}");
}

#[tokio::test]
async fn failed_field_does_not_hide_its_siblings() {
    let schema = schema();
    let resp = run(
        &schema,
        r#"{ movie(id: "nope") { id } movies { id } }"#,
        json!({}),
    )
    .await;
    failed_field_message(&resp, "movie");
    assert_eq!(resp["data"]["movies"], json!([]));
    assert_eq!(resp["errors"].as_array().unwrap().len(), 1);

    let aliased = run(
        &schema,
        r#"mutation {
            a: addMovie(title: "Heat", genre: "Crime", rating: 8, duration: "170") { title }
            b: addMovie(title: "", genre: "Crime", rating: 8, duration: "170") { title }
        }"#,
        json!({}),
    )
    .await;
    assert_eq!(aliased["data"]["a"], json!({ "title": "Heat" }));
    let message = failed_field_message(&aliased, "b");
    assert!(message.contains("title: must not be blank"), "{message}");
}

#[tokio::test]
async fn update_user_is_a_full_replace() {
    let schema = schema();
    let created = add_user(&schema, "old@x.io", "old", "pw1").await;
    let id = created["data"]["addUser"]["id"].as_str().unwrap().to_owned();
    let old_hash = created["data"]["addUser"]["password"].clone();

    let updated = run(
        &schema,
        r#"mutation($id: String!) {
            updateUser(id: $id, email: "new@x.io", username: "new", password: "pw2", isAdmin: true) {
                id password
            }
        }"#,
        json!({ "id": id }),
    )
    .await;
    assert!(updated.get("errors").is_none(), "{updated}");
    assert_ne!(updated["data"]["updateUser"]["password"], "pw2");
    assert_ne!(updated["data"]["updateUser"]["password"], old_hash);

    let fetched = run(
        &schema,
        "query($id: String!) { user(id: $id) { id email username isAdmin createdAt } }",
        json!({ "id": id }),
    )
    .await;
    assert_eq!(
        fetched["data"]["user"],
        json!({
            "id": id,
            "email": "new@x.io",
            "username": "new",
            "isAdmin": true,
            "createdAt": created["data"]["addUser"]["createdAt"],
        })
    );
}

#[tokio::test]
async fn update_of_missing_user_fails() {
    let schema = schema();
    let resp = run(
        &schema,
        r#"mutation {
            updateUser(id: "65f0c0ffee0000000000abcd", email: "a@b.io", username: "a", password: "p", isAdmin: false) { id }
        }"#,
        json!({}),
    )
    .await;
    let message = failed_field_message(&resp, "updateUser");
    assert!(message.contains("User not found"), "{message}");
}

#[tokio::test]
async fn deleted_user_is_gone() {
    let schema = schema();
    let created = add_user(&schema, "trinity@matrix.io", "trinity", "pw").await;
    let id = created["data"]["addUser"]["id"].clone();

    let deleted = run(
        &schema,
        "mutation($id: String!) { deleteUser(id: $id) { id email } }",
        json!({ "id": id }),
    )
    .await;
    assert_eq!(
        deleted,
        json!({ "data": { "deleteUser": { "id": id, "email": "trinity@matrix.io" } } })
    );

    let fetched = run(
        &schema,
        "query($id: String!) { user(id: $id) { id } }",
        json!({ "id": id }),
    )
    .await;
    assert_eq!(fetched, json!({ "data": { "user": null } }));

    let again = run(
        &schema,
        "mutation($id: String!) { deleteUser(id: $id) { id } }",
        json!({ "id": id }),
    )
    .await;
    assert_eq!(again, json!({ "data": { "deleteUser": null } }));

    let users = run(&schema, "{ users { id } }", json!({})).await;
    assert_eq!(users, json!({ "data": { "users": [] } }));
}

#[tokio::test]
async fn dune_round_trips_through_add_and_fetch() {
    let schema = schema();
    let added = run(
        &schema,
        ADD_MOVIE,
        json!({ "title": "Dune", "genre": "Sci-Fi", "rating": 9, "duration": "155" }),
    )
    .await;
    assert!(added.get("errors").is_none(), "{added}");

    let movie = added["data"]["addMovie"].clone();
    assert_eq!(movie["title"], "Dune");
    assert_eq!(movie["genre"], "Sci-Fi");
    assert_eq!(movie["rating"], 9);
    assert_eq!(movie["duration"], "155");
    assert!(movie["createdAt"].is_string());
    assert!(movie["updatedAt"].is_string());

    let fetched = run(
        &schema,
        "query($id: String!) { movie(id: $id) { id title genre rating duration createdAt updatedAt } }",
        json!({ "id": movie["id"] }),
    )
    .await;
    assert_eq!(fetched["data"]["movie"], movie);
}

#[tokio::test]
async fn update_movie_is_a_full_replace() {
    let schema = schema();
    let added = run(
        &schema,
        ADD_MOVIE,
        json!({ "title": "Dune", "genre": "Sci-Fi", "rating": 9, "duration": "155" }),
    )
    .await;
    let original = added["data"]["addMovie"].clone();

    let updated = run(
        &schema,
        r#"mutation($id: String!) {
            updateMovie(id: $id, title: "Dune: Part Two", genre: "Epic", rating: 8, duration: "166") {
                id title genre rating duration createdAt
            }
        }"#,
        json!({ "id": original["id"] }),
    )
    .await;
    let expected = json!({
        "id": original["id"],
        "title": "Dune: Part Two",
        "genre": "Epic",
        "rating": 8,
        "duration": "166",
        "createdAt": original["createdAt"],
    });
    assert_eq!(updated, json!({ "data": { "updateMovie": expected } }));

    let fetched = run(
        &schema,
        "query($id: String!) { movie(id: $id) { id title genre rating duration createdAt } }",
        json!({ "id": original["id"] }),
    )
    .await;
    assert_eq!(fetched["data"]["movie"], expected);
}

#[tokio::test]
async fn update_of_missing_movie_fails() {
    let schema = schema();
    let resp = run(
        &schema,
        r#"mutation {
            updateMovie(id: "65f0c0ffee0000000000abcd", title: "X", genre: "Y", rating: 1, duration: "2") { id }
        }"#,
        json!({}),
    )
    .await;
    let message = failed_field_message(&resp, "updateMovie");
    assert_eq!(message, "Movie not found: 65f0c0ffee0000000000abcd");
}

#[tokio::test]
async fn deleted_movie_is_gone() {
    let schema = schema();
    let added = run(
        &schema,
        ADD_MOVIE,
        json!({ "title": "Alien", "genre": "Horror", "rating": 8, "duration": "117" }),
    )
    .await;
    let id = added["data"]["addMovie"]["id"].clone();

    let deleted = run(
        &schema,
        "mutation($id: String!) { deleteMovie(id: $id) { id title } }",
        json!({ "id": id }),
    )
    .await;
    assert_eq!(deleted["data"]["deleteMovie"]["title"], "Alien");

    let fetched = run(
        &schema,
        "query($id: String!) { movie(id: $id) { id } }",
        json!({ "id": id }),
    )
    .await;
    assert_eq!(fetched, json!({ "data": { "movie": null } }));

    let again = run(
        &schema,
        "mutation($id: String!) { deleteMovie(id: $id) { id } }",
        json!({ "id": id }),
    )
    .await;
    assert_eq!(again, json!({ "data": { "deleteMovie": null } }));
}

#[tokio::test]
async fn non_integer_rating_is_rejected_before_persistence() {
    let schema = schema();
    let resp = run(
        &schema,
        r#"mutation { addMovie(title: "Dune", genre: "Sci-Fi", rating: "nine", duration: "155") { id } }"#,
        json!({}),
    )
    .await;
    assert!(resp["errors"].as_array().is_some_and(|e| !e.is_empty()));

    let fractional = run(
        &schema,
        ADD_MOVIE,
        json!({ "title": "Dune", "genre": "Sci-Fi", "rating": 8.5, "duration": "155" }),
    )
    .await;
    assert!(fractional.get("errors").is_some());

    let movies = run(&schema, "{ movies { id } }", json!({})).await;
    assert_eq!(movies["data"]["movies"], json!([]));
}

#[tokio::test]
async fn validation_failures_share_the_generic_error_shape() {
    let schema = schema();
    let resp = run(
        &schema,
        ADD_MOVIE,
        json!({ "title": "", "genre": "Drama", "rating": 11, "duration": "90" }),
    )
    .await;
    assert_eq!(
        failed_field_message(&resp, "addMovie"),
        "Validation failed: rating: must be between 0 and 10; title: must not be blank"
    );

    let bad_email = add_user(&schema, "nope", "someone", "pw").await;
    let message = failed_field_message(&bad_email, "addUser");
    assert!(message.contains("email"), "{message}");
}

#[tokio::test]
async fn schema_exposes_the_expected_root_types() {
    let sdl = Catalog::in_memory(&test_config()).sdl();
    assert!(sdl.contains("type RootQueryType"));
    assert!(sdl.contains("type Mutation"));
    assert!(sdl.contains("user(id: String!): User"));
    assert!(sdl.contains("isAdmin: Boolean"));
}

fn router(graphiql: bool) -> Router {
    Catalog::in_memory(&test_config()).register_routes(Router::new(), "/graphql", graphiql)
}

#[tokio::test]
async fn post_graphql_over_http() {
    let body = json!({ "query": "{ movies { id } }" }).to_string();
    let resp = router(true)
        .oneshot(
            HttpRequest::builder()
                .method(Method::POST)
                .uri("/graphql")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json, json!({ "data": { "movies": [] } }));
}

#[tokio::test]
async fn graphiql_page_is_optional() {
    let get = || {
        HttpRequest::builder()
            .method(Method::GET)
            .uri("/graphql")
            .body(Body::empty())
            .unwrap()
    };

    let enabled = router(true).oneshot(get()).await.unwrap();
    assert_eq!(enabled.status(), StatusCode::OK);
    let bytes = to_bytes(enabled.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("graphiql"));

    let disabled = router(false).oneshot(get()).await.unwrap();
    assert_eq!(disabled.status(), StatusCode::METHOD_NOT_ALLOWED);
}
