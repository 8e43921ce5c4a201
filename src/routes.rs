use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{HttpResponse, cookie::Key, web};

use crate::auth;
use crate::handlers;

/// Cookie-backed sessions carry the CSRF secret for visitors and the
/// signed-in administrator's identity.
pub fn session_middleware(key: Key, secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("safejoy_session".to_string())
        .cookie_secure(secure)
        .cookie_http_only(true)
        .build()
}

/// The full route table. Shared data (`SqlitePool`, `AppConfig`,
/// `RateLimiter`) must be registered by the caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Static widget assets
        .service(actix_files::Files::new("/static", "./static"))
        // Visitor routes
        .route("/", web::get().to(handlers::widget_handlers::index))
        .route("/embed", web::get().to(handlers::widget_handlers::embed))
        .service(
            web::resource("/submit")
                .app_data(
                    web::FormConfig::default()
                        .error_handler(handlers::intake_handlers::form_error_handler),
                )
                .route(web::post().to(handlers::intake_handlers::submit)),
        )
        // Admin sign-in
        .route("/admin/login", web::get().to(handlers::auth_handlers::login_page))
        .route("/admin/login", web::post().to(handlers::auth_handlers::login_submit))
        // Protected admin routes
        .service(
            web::scope("/admin")
                .wrap(actix_web::middleware::from_fn(auth::middleware::require_auth))
                .route("", web::get().to(admin_home))
                .route("/logout", web::post().to(handlers::auth_handlers::logout))
                .route("/submissions", web::get().to(handlers::submission_handlers::index))
                .route("/forms", web::get().to(handlers::form_handlers::list))
                .route("/forms", web::post().to(handlers::form_handlers::create))
                .route("/forms/{id}/delete", web::post().to(handlers::form_handlers::delete)),
        );
}

async fn admin_home() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", handlers::submission_handlers::LIST_PATH))
        .finish()
}

/// Default service: static 404 page.
pub async fn not_found() -> HttpResponse {
    let html = include_str!("../templates/errors/404.html");
    HttpResponse::NotFound()
        .content_type("text/html; charset=utf-8")
        .body(html)
}
