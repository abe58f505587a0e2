//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use front_router::config::AppConfig;
use front_router::routing::{ErrorHandler, Handler, HttpError, RenderResult, RouteError, Router};
use front_router::{Application, Bootstrap, HttpServer, Kernel};

/// Application deployed under `/shop/` with one route per kind of output.
pub struct ShopApp;

impl Application for ShopApp {
    fn register_routes(&self, router: &mut Router, boot: Bootstrap<'_>) -> Result<(), RouteError> {
        router.add_route("/", Handler::new(|_ctx| Ok("shop home".into())), Some("home"))?;
        router.add_route(
            "users/{id}/posts/{postId}",
            Handler::new(|ctx| {
                Ok(format!("post {} of {}", ctx.param("postId")?, ctx.param("id")?).into())
            }),
            Some("userPost"),
        )?;
        router.add_route(
            "items/{sku}",
            Handler::new(|ctx| {
                RenderResult::from_value(json!({"sku": ctx.param("sku")?, "price": 12}))
            })
            .with_view(|values| {
                Ok(format!(
                    "{} costs {}",
                    values[0].as_str().unwrap_or_default(),
                    values[1]
                ))
            }),
            Some("item"),
        )?;
        router.add_route(
            "legacy",
            Handler::new(|ctx| ctx.redirect_to("userPost", &["ada lovelace", "7"])),
            Some("legacy"),
        )?;
        router.add_route(
            "admin",
            Handler::new(|_ctx| Err(HttpError::new(403, "forbidden"))),
            Some("admin"),
        )?;
        router.add_route(
            "broken",
            Handler::new(|_ctx| Err(HttpError::internal("database unreachable"))),
            Some("broken"),
        )?;

        if let Some(store) = boot.store.cloned() {
            router.add_route(
                "visits",
                Handler::new(move |_ctx| {
                    let visits = store.get("visits", json!(0)).as_u64().unwrap_or(0) + 1;
                    store.set("visits", json!(visits));
                    Ok(visits.to_string().into())
                }),
                Some("visits"),
            )?;
        }
        Ok(())
    }

    fn register_error_routes(&self, router: &mut Router, _boot: Bootstrap<'_>) {
        router.add_error_route(
            404,
            ErrorHandler::new(|error, _ctx| Ok(format!("missing: {}", error.message()).into())),
        );
    }
}

pub fn shop_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.app.base_dir = "/var/www/html/shop".into();
    config.app.front_controller = "/shop/index.php".into();
    config
}

pub fn temp_store(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "front-router-it-{}-{}.json",
        std::process::id(),
        name
    ));
    std::fs::remove_file(&path).unwrap_or_default();
    path
}

/// A server bound to an ephemeral port, stopped by `stop()`.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    pub async fn start(config: AppConfig) -> Self {
        let kernel = Kernel::boot(config, &ShopApp).unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        let server = HttpServer::new(Arc::new(kernel));
        let handle = tokio::spawn(server.run_until(listener, async {
            rx.await.ok();
        }));

        Self {
            addr,
            shutdown: tx,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn stop(self) {
        self.shutdown.send(()).ok();
        self.handle.await.unwrap().unwrap();
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
