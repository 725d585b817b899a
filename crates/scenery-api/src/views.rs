//! Server-rendered HTML pages via `minijinja`.
//!
//! Templates are embedded at compile time so the binary does not depend
//! on a views directory at runtime. Names end in `.html`, which turns on
//! HTML auto-escaping.

use axum::http::StatusCode;
use minijinja::{Environment, context};
use scenery_types::AGE_MAX;

use crate::error::ApiError;

/// Greeting shown on the landing page.
pub const GREETING: &str = "Hi, Who are you?";

/// Loaded page templates.
#[derive(Debug)]
pub struct Views {
    env: Environment<'static>,
}

impl Views {
    /// Load all embedded templates.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Template`] if a template fails to parse.
    pub fn new() -> Result<Self, ApiError> {
        let mut env = Environment::new();
        for (name, source) in [
            ("layout.html", include_str!("../templates/layout.html")),
            ("index.html", include_str!("../templates/index.html")),
            ("user.html", include_str!("../templates/user.html")),
            ("404.html", include_str!("../templates/404.html")),
            ("error.html", include_str!("../templates/error.html")),
        ] {
            env.add_template(name, source)
                .map_err(|e| ApiError::Template(format!("{name} load failed: {e}")))?;
        }
        Ok(Self { env })
    }

    /// The landing page.
    pub fn index(&self) -> Result<String, ApiError> {
        self.render("index.html", context! { message => GREETING })
    }

    /// The user administration page.
    pub fn user_page(&self) -> Result<String, ApiError> {
        self.render("user.html", context! { age_max => AGE_MAX })
    }

    /// The error page: `404.html` for not found, `error.html` otherwise.
    pub fn error_page(
        &self,
        status: StatusCode,
        message: &str,
        path: &str,
    ) -> Result<String, ApiError> {
        let name = if status == StatusCode::NOT_FOUND {
            "404.html"
        } else {
            "error.html"
        };
        self.render(
            name,
            context! { status => status.as_u16(), message => message, path => path },
        )
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String, ApiError> {
        self.env
            .get_template(name)
            .and_then(|tpl| tpl.render(ctx))
            .map_err(|e| ApiError::Template(format!("{name} render failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn views() -> Views {
        Views::new().unwrap_or_else(|e| panic!("templates failed to load: {e}"))
    }

    #[test]
    fn index_shows_greeting() {
        let html = views().index().unwrap_or_default();
        assert!(html.contains(GREETING));
        assert!(html.contains("<!DOCTYPE html>"));
    }

    #[test]
    fn user_page_loads_client_script() {
        let html = views().user_page().unwrap_or_default();
        assert!(html.contains("/static/users.js"));
        assert!(html.contains("max=\"150\""));
    }

    #[test]
    fn not_found_uses_404_template() {
        let html = views()
            .error_page(StatusCode::NOT_FOUND, "Cannot GET /x", "/x")
            .unwrap_or_default();
        assert!(html.contains("<h1>404</h1>"));
        assert!(html.contains("Cannot GET /x"));
    }

    #[test]
    fn other_errors_use_error_template() {
        let html = views()
            .error_page(StatusCode::SERVICE_UNAVAILABLE, "down", "/user/list")
            .unwrap_or_default();
        assert!(html.contains("<h1>503</h1>"));
    }

    #[test]
    fn error_page_escapes_path() {
        let html = views()
            .error_page(StatusCode::NOT_FOUND, "missing", "/<script>")
            .unwrap_or_default();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
