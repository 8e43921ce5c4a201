//! Admin area tests: sign-in, the submissions screen, form management and
//! permission checks.

#[macro_use]
mod common;

use actix_web::cookie::Cookie;
use actix_web::http::{StatusCode, header::ContentType};
use actix_web::test;
use chrono::Duration;
use regex::Regex;

use safejoy::auth::password;
use safejoy::auth::session::FORMS_MANAGE;
use safejoy::db::seed_admin;
use safejoy::models::admin_user::{self, NewAdminUser};
use safejoy::models::{form, now_timestamp, submission};
use common::*;

const TOKEN_PATTERN: &str = r#"name="csrf_token" value="([0-9a-f]+)""#;
/// The header's sign-out form comes first on every admin page; this skips to
/// the create-form token.
const FORMS_TOKEN_PATTERN: &str =
    r#"(?s)action="/admin/forms" class="inline">.*?name="csrf_token" value="([0-9a-f]+)""#;

/// GET `$uri` with `$cookie`, returning (status, location, body, cookie after).
macro_rules! get_page {
    ($app:expr, $cookie:expr, $uri:expr) => {{
        let mut req = test::TestRequest::get().uri($uri);
        if let Some(c) = $cookie.as_ref() {
            req = req.cookie(Cookie::clone(c));
        }
        let resp = test::call_service(&$app, req.to_request()).await;
        let status = resp.status();
        let loc = location(&resp);
        let next_cookie = session_cookie(&resp).or($cookie.clone());
        let body = String::from_utf8(test::read_body(resp).await.to_vec()).expect("utf8");
        (status, loc, body, next_cookie)
    }};
}

/// POST a urlencoded form, returning (status, location, body, cookie after).
macro_rules! post_form {
    ($app:expr, $cookie:expr, $uri:expr, $pairs:expr) => {{
        let mut req = test::TestRequest::post()
            .uri($uri)
            .insert_header(ContentType::form_url_encoded())
            .set_payload(form_body($pairs));
        if let Some(c) = $cookie.as_ref() {
            req = req.cookie(Cookie::clone(c));
        }
        let resp = test::call_service(&$app, req.to_request()).await;
        let status = resp.status();
        let loc = location(&resp);
        let next_cookie = session_cookie(&resp).or($cookie.clone());
        let body = String::from_utf8(test::read_body(resp).await.to_vec()).expect("utf8");
        (status, loc, body, next_cookie)
    }};
}

/// Walk the sign-in form. Returns (status, location, body, cookie after).
macro_rules! sign_in {
    ($app:expr, $user:expr, $pass:expr) => {{
        let none: Option<Cookie<'static>> = None;
        let (_, _, html, cookie) = get_page!($app, none, "/admin/login");
        let token = extract(&html, TOKEN_PATTERN).expect("login token");
        post_form!(
            $app,
            cookie,
            "/admin/login",
            &[("username", $user), ("password", $pass), ("csrf_token", token.as_str()), ("next", "")]
        )
    }};
}

async fn seed_default_admin(pool: &sqlx::SqlitePool) {
    seed_admin(pool, ADMIN_USER, ADMIN_PASS).await.expect("seed admin");
}

fn delete_links(html: &str) -> Vec<(i64, String)> {
    Regex::new(r"action=delete&amp;id=(\d+)&amp;token=([0-9a-f]+)")
        .expect("regex")
        .captures_iter(html)
        .map(|c| (c[1].parse().expect("id"), c[2].to_string()))
        .collect()
}

#[actix_web::test]
async fn test_anonymous_is_sent_to_login() {
    let db = setup_test_db().await;
    let app = test_app!(db.pool());
    let none: Option<Cookie<'static>> = None;

    let (status, loc, _, _) = get_page!(app, none, "/admin/submissions?page=2");
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(loc, "/admin/login?next=%2Fadmin%2Fsubmissions%3Fpage%3D2");

    let (status, loc, _, _) = get_page!(app, none, "/admin/forms");
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert!(loc.starts_with("/admin/login"));
}

#[actix_web::test]
async fn test_seed_admin_runs_once() {
    let db = setup_test_db().await;
    let pool = db.pool();

    seed_default_admin(pool).await;
    seed_admin(pool, "other", "another-password").await.expect("second seed");

    assert_eq!(admin_user::count(pool).await.expect("count"), 1);
    assert!(admin_user::find_by_username(pool, "other").await.expect("query").is_none());
}

#[actix_web::test]
async fn test_sign_in_and_out() {
    let db = setup_test_db().await;
    seed_default_admin(db.pool()).await;
    let app = test_app!(db.pool());

    let (status, loc, _, cookie) = sign_in!(app, ADMIN_USER, ADMIN_PASS);
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(loc, "/admin/submissions");

    let (status, _, html, cookie) = get_page!(app, cookie, "/admin/submissions");
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("No submissions found."));
    assert!(html.contains(ADMIN_USER));

    let logout_token = extract(&html, TOKEN_PATTERN).expect("logout token");
    let (status, loc, _, cookie) =
        post_form!(app, cookie, "/admin/logout", &[("csrf_token", logout_token.as_str())]);
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(loc, "/admin/login");

    let (status, loc, _, _) = get_page!(app, cookie, "/admin/submissions");
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert!(loc.starts_with("/admin/login"));
}

#[actix_web::test]
async fn test_wrong_password_is_rejected() {
    let db = setup_test_db().await;
    seed_default_admin(db.pool()).await;
    let app = test_app!(db.pool());

    let (status, _, html, cookie) = sign_in!(app, ADMIN_USER, "wrong");
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Invalid username or password"));

    let (status, _, _, _) = get_page!(app, cookie, "/admin/submissions");
    assert_eq!(status, StatusCode::SEE_OTHER);
}

#[actix_web::test]
async fn test_repeated_failures_block_sign_in() {
    let db = setup_test_db().await;
    seed_default_admin(db.pool()).await;
    let config = safejoy::config::AppConfig { login_max_attempts: 2, ..test_config() };
    let app = test_app!(db.pool(), config);

    for _ in 0..2 {
        let (_, _, html, _) = sign_in!(app, ADMIN_USER, "wrong");
        assert!(html.contains("Invalid username or password"));
    }

    let (status, _, html, _) = sign_in!(app, ADMIN_USER, ADMIN_PASS);
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Too many failed sign-in attempts"));
}

#[actix_web::test]
async fn test_sign_in_requires_token() {
    let db = setup_test_db().await;
    seed_default_admin(db.pool()).await;
    let app = test_app!(db.pool());
    let none: Option<Cookie<'static>> = None;

    let (status, _, _, _) = post_form!(
        app,
        none,
        "/admin/login",
        &[("username", ADMIN_USER), ("password", ADMIN_PASS), ("csrf_token", "00")]
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_submission_list_paginates() {
    let db = setup_test_db().await;
    let pool = db.pool();
    seed_default_admin(pool).await;
    let base = now_timestamp();
    for (i, name) in ["Oldest", "Middle", "Newest"].iter().enumerate() {
        submission::insert_at(
            pool,
            &validated(name, FORM_TITLE, &["https://example.org/"]),
            "",
            base + Duration::seconds(i as i64),
        )
        .await
        .expect("insert");
    }
    let app = test_app!(pool);
    let (_, _, _, cookie) = sign_in!(app, ADMIN_USER, ADMIN_PASS);

    let (status, _, html, cookie) = get_page!(app, cookie, "/admin/submissions");
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Newest"));
    assert!(html.contains("Middle"));
    assert!(!html.contains("Oldest"));
    assert!(html.contains("Page 1 of 2"));
    assert!(html.contains("(3)"));

    let (status, _, html, cookie) = get_page!(app, cookie, "/admin/submissions?page=2");
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Oldest"));
    assert!(!html.contains("Newest"));

    let (status, _, html, _) = get_page!(app, cookie, "/admin/submissions?page=7");
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("No submissions found."));
}

#[actix_web::test]
async fn test_detail_view_shows_everything() {
    let db = setup_test_db().await;
    let pool = db.pool();
    seed_default_admin(pool).await;
    let links = ["https://a.example/", "https://b.example/", "https://c.example/"];
    let id = submission::insert(pool, &validated("Aid Group", FORM_TITLE, &links), "203.0.113.8")
        .await
        .expect("insert");
    let app = test_app!(pool);
    let (_, _, _, cookie) = sign_in!(app, ADMIN_USER, ADMIN_PASS);

    let (status, _, html, cookie) = get_page!(app, cookie, "/admin/submissions");
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("+1 more"));

    let uri = format!("/admin/submissions?action=view&id={id}");
    let (status, _, html, cookie) = get_page!(app, cookie, &uri);
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("203.0.113.8"));
    assert!(html.contains("Description for Aid Group"));
    for link in links {
        assert!(html.contains(link));
    }

    let (status, _, _, _) = get_page!(app, cookie, "/admin/submissions?action=view&id=999");
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_delete_requires_matching_token() {
    let db = setup_test_db().await;
    let pool = db.pool();
    seed_default_admin(pool).await;
    let first = submission::insert(pool, &validated("First", FORM_TITLE, &[]), "")
        .await
        .expect("insert");
    let second = submission::insert(pool, &validated("Second", FORM_TITLE, &[]), "")
        .await
        .expect("insert");
    let app = test_app!(pool);
    let (_, _, _, cookie) = sign_in!(app, ADMIN_USER, ADMIN_PASS);

    let (_, _, html, cookie) = get_page!(app, cookie, "/admin/submissions");
    let tokens = delete_links(&html);
    let token_for = |id: i64| {
        tokens
            .iter()
            .find(|(row, _)| *row == id)
            .map(|(_, t)| t.clone())
            .expect("delete link for row")
    };

    // A token issued for one row does not delete another
    let uri = format!("/admin/submissions?action=delete&id={second}&token={}", token_for(first));
    let (status, _, _, cookie) = get_page!(app, cookie, &uri);
    assert_eq!(status, StatusCode::FORBIDDEN);

    let uri = format!("/admin/submissions?action=delete&id={first}&token=deadbeef");
    let (status, _, _, cookie) = get_page!(app, cookie, &uri);
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(submission::get(pool, first).await.expect("query").is_some());

    let uri = format!("/admin/submissions?action=delete&id={first}&token={}", token_for(first));
    let (status, loc, _, cookie) = get_page!(app, cookie, &uri);
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(loc, "/admin/submissions?deleted=1");
    assert!(submission::get(pool, first).await.expect("query").is_none());
    assert!(submission::get(pool, second).await.expect("query").is_some());

    // Repeating the same delete is harmless
    let (status, loc, _, cookie) = get_page!(app, cookie, &uri);
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(loc, "/admin/submissions?deleted=1");

    let (_, _, html, _) = get_page!(app, cookie, "/admin/submissions?deleted=1");
    assert!(html.contains("Submission deleted."));
}

#[actix_web::test]
async fn test_missing_permission_is_forbidden() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let password_hash = password::hash_password("forms-only-pass").expect("hash");
    admin_user::create(
        pool,
        &NewAdminUser {
            username: "editor".to_string(),
            password_hash,
            permissions: FORMS_MANAGE.to_string(),
        },
    )
    .await
    .expect("create editor");
    let app = test_app!(pool);
    let (status, _, _, cookie) = sign_in!(app, "editor", "forms-only-pass");
    assert_eq!(status, StatusCode::SEE_OTHER);

    let (status, _, _, cookie) = get_page!(app, cookie, "/admin/submissions");
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, html, _) = get_page!(app, cookie, "/admin/forms");
    assert_eq!(status, StatusCode::OK);
    assert!(!html.contains(r#"href="/admin/submissions""#));
}

#[actix_web::test]
async fn test_manage_forms() {
    let db = setup_test_db().await;
    let pool = db.pool();
    seed_default_admin(pool).await;
    let app = test_app!(pool);
    let (_, _, _, cookie) = sign_in!(app, ADMIN_USER, ADMIN_PASS);

    let (status, _, html, cookie) = get_page!(app, cookie, "/admin/forms");
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("No forms yet."));
    let token = extract(&html, FORMS_TOKEN_PATTERN).expect("forms token");
    let logout_token = extract(&html, TOKEN_PATTERN).expect("logout token");
    assert_ne!(token, logout_token);

    let (status, loc, _, cookie) =
        post_form!(app, cookie, "/admin/forms", &[("title", "  Community   Aid "), ("csrf_token", token.as_str())]);
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(loc, "/admin/forms");
    let created = form::find_by_title(pool, FORM_TITLE)
        .await
        .expect("query")
        .expect("form created with sanitized title");

    let (_, _, html, cookie) = get_page!(app, cookie, "/admin/forms");
    assert!(html.contains("Community Aid"));
    assert!(html.contains("/embed?form=Community+Aid"));

    let (status, _, html, cookie) =
        post_form!(app, cookie, "/admin/forms", &[("title", FORM_TITLE), ("csrf_token", token.as_str())]);
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("already exists"));

    let (status, _, html, cookie) =
        post_form!(app, cookie, "/admin/forms", &[("title", "<b></b>"), ("csrf_token", token.as_str())]);
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Title is required"));

    let (status, _, _, cookie) =
        post_form!(app, cookie, "/admin/forms", &[("title", "Food Bank"), ("csrf_token", "bad")]);
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(!form::exists(pool, "Food Bank").await.expect("exists"));

    let uri = format!("/admin/forms/{}/delete", created.id);
    let (status, loc, _, _) = post_form!(app, cookie, &uri, &[("csrf_token", token.as_str())]);
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(loc, "/admin/forms");
    assert!(!form::exists(pool, FORM_TITLE).await.expect("exists"));
}

#[actix_web::test]
async fn test_unknown_route_is_404() {
    let db = setup_test_db().await;
    let app = test_app!(db.pool());
    let none: Option<Cookie<'static>> = None;

    let (status, _, html, _) = get_page!(app, none, "/no-such-page");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(html.contains("Page not found"));
}
