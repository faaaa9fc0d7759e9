//! Integration tests for the notebook module.
//!
//! Each test runs on a fresh in-memory SQLite DB with migrations applied and
//! drives the real route registration through `tower::ServiceExt::oneshot`.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{create_test_app, header, split};
use notebook::infra::storage::entity::{note_book, share};
use serde_json::json;

const PROBLEM_JSON: &str = "application/problem+json";

#[tokio::test]
async fn create_notebook_assigns_id_and_emits_alert() {
    let app = create_test_app().await;

    let (resp, body) = app
        .json(
            "POST",
            "/api/note-books",
            Some(json!({"name": "Trip Notes", "handle": "trip01"})),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = body["id"].as_i64().expect("id assigned");
    assert_eq!(body["name"], "Trip Notes");
    assert_eq!(body["handle"], "trip01");
    assert_eq!(body["user"], json!(null));
    assert_eq!(
        header(&resp, "location"),
        Some(format!("/api/note-books/{id}").as_str())
    );
    assert_eq!(
        header(&resp, "x-notebookapp-alert"),
        Some("notebookApp.noteBook.created")
    );
    assert_eq!(
        header(&resp, "x-notebookapp-params"),
        Some(id.to_string().as_str())
    );
}

#[tokio::test]
async fn create_with_existing_id_is_rejected() {
    let app = create_test_app().await;

    let (resp, body) = app
        .json(
            "POST",
            "/api/note-books",
            Some(json!({"id": 1, "name": "Trip Notes", "handle": "trip01"})),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header(&resp, "content-type"), Some(PROBLEM_JSON));
    assert_eq!(body["code"], "idexists");
    assert_eq!(body["title"], "A new noteBook cannot already have an ID");
    assert_eq!(body["instance"], "/api/note-books");
    assert_eq!(header(&resp, "x-notebookapp-error"), Some("error.idexists"));
    assert_eq!(header(&resp, "x-notebookapp-params"), Some("noteBook"));
    assert_eq!(app.count(note_book::Entity).await, 0);
}

#[tokio::test]
async fn patch_changes_only_provided_fields() {
    let app = create_test_app().await;
    let (_, created) = app
        .json(
            "POST",
            "/api/note-books",
            Some(json!({"name": "Trip Notes", "handle": "trip01"})),
        )
        .await;
    let id = created["id"].as_i64().unwrap();

    let req = Request::builder()
        .method("PATCH")
        .uri(format!("/api/note-books/{id}"))
        .header(header::CONTENT_TYPE, "application/merge-patch+json")
        .body(Body::from(json!({"id": id, "handle": "trip02"}).to_string()))
        .unwrap();
    let (resp, body) = split(app.send(req).await).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body["name"], "Trip Notes");
    assert_eq!(body["handle"], "trip02");
    assert_eq!(
        header(&resp, "x-notebookapp-alert"),
        Some("notebookApp.noteBook.updated")
    );

    let (_, fetched) = app.json("GET", &format!("/api/note-books/{id}"), None).await;
    assert_eq!(fetched["name"], "Trip Notes");
    assert_eq!(fetched["handle"], "trip02");
}

#[tokio::test]
async fn update_guards_leave_store_unchanged() {
    let app = create_test_app().await;
    let (_, created) = app
        .json(
            "POST",
            "/api/note-books",
            Some(json!({"name": "Trip Notes", "handle": "trip01"})),
        )
        .await;
    let id = created["id"].as_i64().unwrap();
    let uri = format!("/api/note-books/{id}");

    let cases = [
        ("PUT", uri.clone(), json!({"name": "Other", "handle": "x2"}), "idnull"),
        ("PUT", uri.clone(), json!({"id": id + 1, "name": "Other", "handle": "x2"}), "idinvalid"),
        (
            "PUT",
            "/api/note-books/999".to_string(),
            json!({"id": 999, "name": "Other", "handle": "x2"}),
            "idnotfound",
        ),
        ("PATCH", uri.clone(), json!({"handle": "x2"}), "idnull"),
        ("PATCH", uri.clone(), json!({"id": id + 1, "handle": "x2"}), "idinvalid"),
        (
            "PATCH",
            "/api/note-books/999".to_string(),
            json!({"id": 999, "handle": "x2"}),
            "idnotfound",
        ),
    ];

    for (method, target, payload, code) in cases {
        let (resp, body) = app.json(method, &target, Some(payload)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{method} {target}");
        assert_eq!(body["code"], code, "{method} {target}");
        assert_eq!(
            header(&resp, "x-notebookapp-error"),
            Some(format!("error.{code}").as_str())
        );
    }

    let (_, stored) = app.json("GET", &uri, None).await;
    assert_eq!(stored["name"], "Trip Notes");
    assert_eq!(stored["handle"], "trip01");
    assert_eq!(app.count(note_book::Entity).await, 1);
}

#[tokio::test]
async fn share_update_guards_leave_store_unchanged() {
    let app = create_test_app().await;
    let (_, created) = app
        .json("POST", "/api/shares", Some(json!({"invite": "tok-1"})))
        .await;
    let id = created["id"].as_i64().unwrap();
    let uri = format!("/api/shares/{id}");

    let cases = [
        ("PUT", uri.clone(), json!({"invite": "tok-2"}), "idnull"),
        ("PUT", uri.clone(), json!({"id": id + 1, "invite": "tok-2"}), "idinvalid"),
        (
            "PUT",
            "/api/shares/999".to_string(),
            json!({"id": 999, "invite": "tok-2"}),
            "idnotfound",
        ),
        ("PATCH", uri.clone(), json!({"invite": "tok-2"}), "idnull"),
        ("PATCH", uri.clone(), json!({"id": id + 1, "invite": "tok-2"}), "idinvalid"),
        (
            "PATCH",
            "/api/shares/999".to_string(),
            json!({"id": 999, "invite": "tok-2"}),
            "idnotfound",
        ),
    ];

    for (method, target, payload, code) in cases {
        let (resp, body) = app.json(method, &target, Some(payload)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{method} {target}");
        assert_eq!(body["code"], code, "{method} {target}");
        assert_eq!(
            header(&resp, "x-notebookapp-error"),
            Some(format!("error.{code}").as_str())
        );
        assert_eq!(header(&resp, "x-notebookapp-params"), Some("share"));
    }

    let (_, stored) = app.json("GET", &uri, None).await;
    assert_eq!(stored["invite"], "tok-1");
    assert_eq!(app.count(share::Entity).await, 1);
}

#[tokio::test]
async fn id_guards_run_before_validation() {
    let app = create_test_app().await;

    // Invalid fields, but the mismatched id is reported first.
    let (resp, body) = app
        .json("PUT", "/api/note-books/1", Some(json!({"id": 2, "name": "x"})))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "idinvalid");
}

#[tokio::test]
async fn put_replaces_whole_row_and_clears_references() {
    let app = create_test_app().await;
    let alice = app.insert_user("alice").await;
    let (_, created) = app
        .json(
            "POST",
            "/api/note-books",
            Some(json!({"name": "Trip Notes", "handle": "trip01", "user": {"id": alice}})),
        )
        .await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["user"], json!({"id": alice}));

    let (resp, body) = app
        .json(
            "PUT",
            &format!("/api/note-books/{id}"),
            Some(json!({"id": id, "name": "Work Notes", "handle": "work"})),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body["name"], "Work Notes");
    assert_eq!(body["user"], json!(null));
}

#[tokio::test]
async fn validation_failure_lists_field_pointers() {
    let app = create_test_app().await;

    let (resp, body) = app
        .json("POST", "/api/note-books", Some(json!({"name": "ab"})))
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");
    assert_eq!(
        body["errors"],
        json!([
            {"pointer": "/name", "detail": "size must be at least 3"},
            {"pointer": "/handle", "detail": "must not be null"}
        ])
    );
    assert_eq!(app.count(note_book::Entity).await, 0);
}

#[tokio::test]
async fn share_without_invite_is_not_persisted() {
    let app = create_test_app().await;

    let (resp, body) = app
        .json("POST", "/api/shares", Some(json!({"invite": null})))
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["pointer"], "/invite");
    assert_eq!(header(&resp, "x-notebookapp-params"), Some("share"));
    assert_eq!(app.count(share::Entity).await, 0);
}

#[tokio::test]
async fn eager_listing_resolves_references() {
    let app = create_test_app().await;
    let alice = app.insert_user("alice").await;
    let bob = app.insert_user("bob").await;
    let note = app.insert_note("Packing list").await;

    app.json(
        "POST",
        "/api/note-books",
        Some(json!({"name": "Trip Notes", "handle": "trip01", "user": {"id": alice}})),
    )
    .await;
    app.json(
        "POST",
        "/api/note-books",
        Some(json!({"name": "Work Notes", "handle": "work"})),
    )
    .await;
    let (resp, _) = app
        .json(
            "POST",
            "/api/shares",
            Some(json!({
                "invite": "have a look",
                "author": {"id": alice},
                "withUser": {"id": bob},
                "sharing": {"id": note}
            })),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let (_, lazy) = app.json("GET", "/api/note-books", None).await;
    assert_eq!(lazy[0]["user"], json!({"id": alice}));
    assert_eq!(lazy[1]["user"], json!(null));

    let (_, eager) = app.json("GET", "/api/note-books?eagerload=true", None).await;
    assert_eq!(eager[0]["user"], json!({"id": alice, "login": "alice"}));
    assert!(eager[0]["id"].as_i64() < eager[1]["id"].as_i64());

    let (_, shares) = app.json("GET", "/api/shares?eagerload=true", None).await;
    assert_eq!(shares[0]["author"]["login"], "alice");
    assert_eq!(shares[0]["withUser"]["login"], "bob");
    assert_eq!(shares[0]["sharing"]["title"], "Packing list");
    assert_eq!(shares[0]["sharing"]["content"], "Packing list body");

    let (_, lazy_shares) = app.json("GET", "/api/shares", None).await;
    assert_eq!(lazy_shares[0]["withUser"], json!({"id": bob}));
    assert_eq!(lazy_shares[0]["sharing"], json!({"id": note}));
}

#[tokio::test]
async fn get_by_id_is_eager() {
    let app = create_test_app().await;
    let alice = app.insert_user("alice").await;
    let (_, created) = app
        .json(
            "POST",
            "/api/shares",
            Some(json!({"invite": "", "author": {"id": alice}})),
        )
        .await;
    let id = created["id"].as_i64().unwrap();

    let (resp, body) = app.json("GET", &format!("/api/shares/{id}"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body["invite"], "");
    assert_eq!(body["author"], json!({"id": alice, "login": "alice"}));
}

#[tokio::test]
async fn share_patch_merges_references() {
    let app = create_test_app().await;
    let alice = app.insert_user("alice").await;
    let bob = app.insert_user("bob").await;
    let (_, created) = app
        .json(
            "POST",
            "/api/shares",
            Some(json!({"invite": "hi", "author": {"id": alice}})),
        )
        .await;
    let id = created["id"].as_i64().unwrap();

    let (resp, body) = app
        .json(
            "PATCH",
            &format!("/api/shares/{id}"),
            Some(json!({"id": id, "withUser": {"id": bob}})),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body["invite"], "hi");
    assert_eq!(body["author"]["id"], alice);
    assert_eq!(body["withUser"]["id"], bob);
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let app = create_test_app().await;
    let (_, created) = app
        .json(
            "POST",
            "/api/note-books",
            Some(json!({"name": "Trip Notes", "handle": "trip01"})),
        )
        .await;
    let id = created["id"].as_i64().unwrap();
    let uri = format!("/api/note-books/{id}");

    let (resp, _) = app.json("DELETE", &uri, None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        header(&resp, "x-notebookapp-alert"),
        Some("notebookApp.noteBook.deleted")
    );
    assert_eq!(app.count(note_book::Entity).await, 0);

    let (resp, body) = app.json("GET", &uri, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "notfound");
    assert!(header(&resp, "x-notebookapp-error").is_none());

    // Deleting again is a no-op.
    let (resp, _) = app.json("DELETE", &uri, None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn delete_removes_only_the_addressed_row() {
    let app = create_test_app().await;
    let mut ids = Vec::new();
    for (name, handle) in [("Trip Notes", "trip01"), ("Recipes", "cook01")] {
        let (_, created) = app
            .json(
                "POST",
                "/api/note-books",
                Some(json!({"name": name, "handle": handle})),
            )
            .await;
        ids.push(created["id"].as_i64().unwrap());
    }
    for invite in ["tok-1", "tok-2"] {
        app.json("POST", "/api/shares", Some(json!({"invite": invite})))
            .await;
    }
    assert_eq!(app.count(note_book::Entity).await, 2);

    let (resp, _) = app
        .json("DELETE", &format!("/api/note-books/{}", ids[0]), None)
        .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.count(note_book::Entity).await, 1);
    assert_eq!(app.count(share::Entity).await, 2);

    let (resp, body) = app
        .json("GET", &format!("/api/note-books/{}", ids[1]), None)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body["name"], "Recipes");

    let (_, shares) = app.json("GET", "/api/shares", None).await;
    let first_share = shares[0]["id"].as_i64().unwrap();
    let (resp, _) = app
        .json("DELETE", &format!("/api/shares/{first_share}"), None)
        .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.count(share::Entity).await, 1);
    let (_, remaining) = app.json("GET", "/api/shares", None).await;
    assert_eq!(remaining[0]["invite"], "tok-2");
}

#[tokio::test]
async fn deleting_referenced_user_clears_reference() {
    let app = create_test_app().await;
    let alice = app.insert_user("alice").await;
    let (_, created) = app
        .json(
            "POST",
            "/api/note-books",
            Some(json!({"name": "Trip Notes", "handle": "trip01", "user": {"id": alice}})),
        )
        .await;
    let id = created["id"].as_i64().unwrap();

    use sea_orm::EntityTrait;
    notebook::infra::storage::entity::user::Entity::delete_by_id(alice)
        .exec(&app.db)
        .await
        .unwrap();

    let (_, body) = app.json("GET", &format!("/api/note-books/{id}"), None).await;
    assert_eq!(body["user"], json!(null));
}

#[tokio::test]
async fn unknown_reference_is_an_internal_error() {
    let app = create_test_app().await;

    let (resp, body) = app
        .json(
            "POST",
            "/api/note-books",
            Some(json!({"name": "Trip Notes", "handle": "trip01", "user": {"id": 4242}})),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "internal");
    assert!(!body["detail"].as_str().unwrap().contains("FOREIGN KEY"));
}

#[tokio::test]
async fn update_on_collection_root_is_not_allowed() {
    let app = create_test_app().await;

    for method in ["PUT", "PATCH"] {
        for path in ["/api/note-books", "/api/shares"] {
            let (resp, _) = app.json(method, path, Some(json!({"id": 1}))).await;
            assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{method} {path}");
        }
    }
}

#[tokio::test]
async fn malformed_input_is_a_bad_request() {
    let app = create_test_app().await;

    let req = Request::builder()
        .method("POST")
        .uri("/api/note-books")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (resp, body) = split(app.send(req).await).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header(&resp, "content-type"), Some(PROBLEM_JSON));
    assert_eq!(body["code"], "badrequest");

    let (resp, body) = app
        .json("POST", "/api/note-books", Some(json!({"name": 5})))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "badrequest");

    let (resp, body) = app.json("GET", "/api/note-books/abc", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "badrequest");

    let (resp, _) = app.json("GET", "/api/note-books?eagerload=maybe", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn domain_service_crud() -> anyhow::Result<()> {
    use notebook::contract::NoteBook;

    let app = create_test_app().await;
    let svc = app.module.notebooks();

    let created = svc
        .create(NoteBook {
            name: Some("Trip Notes".into()),
            handle: Some("trip01".into()),
            ..Default::default()
        })
        .await?;
    let id = created.id.expect("id assigned");

    let fetched = svc.get(id).await?;
    assert_eq!(fetched, created);
    assert_eq!(svc.list(false).await?.len(), 1);

    svc.delete(id).await?;
    assert!(svc.list(true).await?.is_empty());
    Ok(())
}
