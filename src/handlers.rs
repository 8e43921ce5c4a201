pub mod auth_handlers;
pub mod form_handlers;
pub mod intake_handlers;
pub mod request_meta;
pub mod submission_handlers;
pub mod widget_handlers;
