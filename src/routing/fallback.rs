//! Built-in `default` error route.
//!
//! Developer mode renders the code, the message and the captured call stack,
//! with a hint to register a proper error route. Production renders only
//! `Error {code}`.

use crate::routing::error::HttpError;
use crate::routing::handler::{ErrorHandler, RenderResult, RequestContext};

pub fn default_error_handler() -> ErrorHandler {
    ErrorHandler::new(|error, ctx| Ok(render(error, ctx)))
}

fn render(error: &HttpError, ctx: &RequestContext<'_>) -> RenderResult {
    if !ctx.developer_mode() {
        return RenderResult::Body(format!("<p>Error {}</p>", error.code()));
    }

    RenderResult::Body(format!(
        "<p>You should set up an error page with <b>Router::add_error_route({}, handler)</b>.\
         <br><br>Error {} {}\
         <br><br><b>Stack Trace</b><br>\
         <pre>{}</pre></p>",
        error.code(),
        error.code(),
        escape_html(error.message()),
        escape_html(error.trace()),
    ))
}

/// Escape text for inclusion in HTML content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApplicationConfig;
    use crate::routing::matcher::Captures;
    use crate::routing::router::Router;

    fn render_with(developer_mode: bool, error: &HttpError) -> String {
        let config = ApplicationConfig {
            developer_mode,
            ..ApplicationConfig::default()
        };
        let router = Router::new(&config);
        let args = Captures::new();
        let ctx = RequestContext::new(&router, None, &args);
        match default_error_handler().call(error, &ctx).unwrap() {
            RenderResult::Body(body) => body,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_production_rendering() {
        let body = render_with(false, &HttpError::not_found("Route not found"));
        assert_eq!(body, "<p>Error 404</p>");
    }

    #[test]
    fn test_developer_rendering() {
        let body = render_with(true, &HttpError::new(403, "No <access>"));
        assert!(body.contains("Router::add_error_route(403, handler)"));
        assert!(body.contains("Error 403 No &lt;access&gt;"));
        assert!(body.contains("Stack Trace"));
    }

    #[test]
    fn test_developer_rendering_includes_trace() {
        let error = HttpError::internal("boom");
        let body = render_with(true, &error);

        let start = body.find("<pre>").unwrap() + "<pre>".len();
        let end = body.find("</pre>").unwrap();
        let trace = &body[start..end];
        assert!(!trace.trim().is_empty());
        assert!(!trace.contains("disabled backtrace"));
        assert_eq!(trace, escape_html(error.trace()));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a<b>&\"c"), "a&lt;b&gt;&amp;&quot;c");
    }
}
