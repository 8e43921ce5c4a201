use askama::Template;
use rand::Rng;

/// Trigger button plus hidden modal form bound to one form title.
#[derive(Template)]
#[template(path = "widget.html")]
pub struct WidgetTemplate {
    pub form_title: String,
    pub modal_id: String,
    pub nonce: String,
}

impl WidgetTemplate {
    /// Each rendering gets its own DOM id so several widgets can share a page.
    pub fn new(form_title: &str, nonce: &str) -> Self {
        let mut rng = rand::rng();
        let suffix: [u8; 6] = rng.random();
        Self {
            form_title: form_title.to_string(),
            modal_id: format!("safejoy-modal-{}", hex::encode(suffix)),
            nonce: nonce.to_string(),
        }
    }
}

/// Public page embedding a widget for every registered form.
#[derive(Template)]
#[template(path = "public/index.html")]
pub struct PublicIndexTemplate {
    pub app_name: String,
    /// Pre-rendered widget fragments.
    pub widgets: Vec<String>,
}

#[derive(Template)]
#[template(path = "admin/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub app_name: String,
    pub csrf_token: String,
    pub next: String,
}
