//! Demo site served by the binary.
//!
//! Shows each kind of handler output: a plain body, named captures, a
//! structured result rendered by its paired view, a redirect, a handler
//! failing with a status code, and a counter kept in the JSON store.

use serde_json::{json, Value};

use front_router::routing::fallback::escape_html;
use front_router::routing::{ErrorHandler, Handler, HttpError, RenderResult, RouteError, Router};
use front_router::{Application, Bootstrap};

pub struct Site;

impl Application for Site {
    fn register_routes(&self, router: &mut Router, boot: Bootstrap<'_>) -> Result<(), RouteError> {
        router.add_route("/", Handler::new(home), Some("home"))?;
        router.add_route(
            "users/{id}",
            Handler::new(|ctx| {
                let id = escape_html(ctx.param("id")?);
                Ok(format!("<h1>User {id}</h1>").into())
            }),
            Some("user"),
        )?;
        router.add_route(
            "users/{id}/posts/{postId}",
            Handler::new(|ctx| {
                Ok(format!(
                    "<h1>Post {} by user {}</h1>",
                    escape_html(ctx.param("postId")?),
                    escape_html(ctx.param("id")?)
                )
                .into())
            }),
            Some("userPost"),
        )?;
        router.add_route(
            "posts/{slug}",
            Handler::new(|ctx| {
                let slug = ctx.param("slug")?;
                RenderResult::from_value(json!({
                    "title": slug.replace('-', " "),
                    "url": ctx.absolute_url("post", &[slug])?,
                }))
            })
            .with_view(post_view),
            Some("post"),
        )?;
        router.add_route(
            "old-home",
            Handler::new(|ctx| ctx.redirect_to("home", &[])),
            Some("oldHome"),
        )?;
        router.add_route(
            "admin",
            Handler::new(|_ctx| Err(HttpError::new(403, "Administrators only"))),
            Some("admin"),
        )?;

        if let Some(store) = boot.store.cloned() {
            router.add_route(
                "visits",
                Handler::new(move |_ctx| {
                    let visits = store.get("visits", json!(0)).as_u64().unwrap_or(0) + 1;
                    store.set("visits", json!(visits));
                    Ok(format!("{visits} visits").into())
                }),
                Some("visits"),
            )?;
        }

        Ok(())
    }

    fn register_error_routes(&self, router: &mut Router, _boot: Bootstrap<'_>) {
        router.add_error_route(
            404,
            ErrorHandler::new(|error, ctx| {
                Ok(format!(
                    "<h1>Not found</h1><p>{}</p><p><a href=\"{}\">Home</a></p>",
                    escape_html(error.message()),
                    ctx.absolute_url("home", &[])?
                )
                .into())
            }),
        );
    }
}

fn home(ctx: &front_router::RequestContext<'_>) -> Result<RenderResult, HttpError> {
    let links = [
        ("Ada", ctx.absolute_url("user", &["ada"])?),
        ("Ada's first post", ctx.absolute_url("userPost", &["ada", "1"])?),
        ("Hello world", ctx.absolute_url("post", &["hello-world"])?),
    ];
    let items: String = links
        .iter()
        .map(|(label, url)| format!("<li><a href=\"{url}\">{}</a></li>", escape_html(label)))
        .collect();
    Ok(format!("<h1>Home</h1><ul>{items}</ul>").into())
}

fn post_view(values: Vec<Value>) -> Result<String, HttpError> {
    let mut values = values.into_iter();
    let title = values.next().unwrap_or_default();
    let url = values.next().unwrap_or_default();
    Ok(format!(
        "<article><h1>{}</h1><a href=\"{}\">permalink</a></article>",
        escape_html(title.as_str().unwrap_or_default()),
        escape_html(url.as_str().unwrap_or_default())
    ))
}
