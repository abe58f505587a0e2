//! Application kernel.
//!
//! # Responsibilities
//! - Open shared resources (JSON store) from configuration
//! - Build the router once and let the application register its routes
//! - Freeze the router behind an `Arc` and dispatch requests through it
//! - Save pending store changes on shutdown
//!
//! # Design Decisions
//! - No global kernel: configuration is passed to whoever needs it
//! - Startup errors (duplicate routes, unreadable store) are fatal

use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::config::{AppConfig, JsonStore};
use crate::http::RequestDescriptor;
use crate::routing::{Dispatch, DispatchAbort, RouteError, Router};

/// What an application receives while registering routes.
#[derive(Debug, Clone, Copy)]
pub struct Bootstrap<'a> {
    pub config: &'a AppConfig,
    pub store: Option<&'a JsonStore>,
}

/// Hooks an application implements; called once at startup.
pub trait Application {
    fn register_routes(&self, router: &mut Router, boot: Bootstrap<'_>) -> Result<(), RouteError>;

    fn register_error_routes(&self, _router: &mut Router, _boot: Bootstrap<'_>) {}
}

#[derive(Debug, Error)]
pub enum KernelError {
    #[error("route registration failed: {0}")]
    Routes(#[from] RouteError),

    #[error("cannot open store: {0}")]
    Store(#[from] io::Error),
}

/// A booted application: configuration, router and shared resources.
#[derive(Debug)]
pub struct Kernel {
    config: AppConfig,
    router: Arc<Router>,
    store: Option<JsonStore>,
}

impl Kernel {
    pub fn boot<A: Application + ?Sized>(config: AppConfig, app: &A) -> Result<Self, KernelError> {
        let store = match &config.app.store_path {
            Some(path) => Some(JsonStore::open(path)?),
            None => None,
        };

        let mut router = Router::new(&config.app);
        let boot = Bootstrap {
            config: &config,
            store: store.as_ref(),
        };
        app.register_routes(&mut router, boot)?;
        app.register_error_routes(&mut router, boot);

        tracing::info!(
            routes = router.routes().len(),
            base_path = %router.base_path(),
            developer_mode = config.app.developer_mode,
            "Kernel booted"
        );

        Ok(Self {
            config,
            router: Arc::new(router),
            store,
        })
    }

    /// Dispatch one request through the router.
    pub fn handle(&self, request: &RequestDescriptor) -> Result<Dispatch, DispatchAbort> {
        self.router.route(request)
    }

    /// Describe a request for `url_path` the way the rewrite layer would.
    pub fn descriptor(&self, url_path: &str) -> RequestDescriptor {
        RequestDescriptor::new(
            url_path,
            self.config.app.front_controller.clone(),
            self.config.app.document_root.clone(),
        )
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn developer_mode(&self) -> bool {
        self.config.app.developer_mode
    }

    /// Locale file configured for `lang`.
    pub fn locale(&self, lang: &str) -> Option<&str> {
        self.config.locales.get(lang).map(String::as_str)
    }

    pub fn store(&self) -> Option<&JsonStore> {
        self.store.as_ref()
    }

    /// Flush pending store changes.
    pub fn shutdown(&self) -> io::Result<()> {
        if let Some(store) = &self.store {
            store.save()?;
        }
        tracing::info!("Kernel stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{ErrorHandler, Handler};

    struct TestApp;

    impl Application for TestApp {
        fn register_routes(
            &self,
            router: &mut Router,
            _boot: Bootstrap<'_>,
        ) -> Result<(), RouteError> {
            router.add_route("/", Handler::new(|_ctx| Ok("home".into())), Some("home"))?;
            router.add_route(
                "users/{id}",
                Handler::new(|ctx| Ok(format!("user {}", ctx.param("id")?).into())),
                Some("user"),
            )
        }

        fn register_error_routes(&self, router: &mut Router, _boot: Bootstrap<'_>) {
            router.add_error_route(404, ErrorHandler::new(|_err, _ctx| Ok("not here".into())));
        }
    }

    struct DuplicateApp;

    impl Application for DuplicateApp {
        fn register_routes(
            &self,
            router: &mut Router,
            _boot: Bootstrap<'_>,
        ) -> Result<(), RouteError> {
            router.add_route("a", Handler::new(|_ctx| Ok("a".into())), Some("x"))?;
            router.add_route("b", Handler::new(|_ctx| Ok("b".into())), Some("x"))
        }
    }

    fn subfolder_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.app.base_dir = "/var/www/html/shop".into();
        config.app.front_controller = "/shop/index.php".into();
        config
            .locales
            .insert("fr".into(), "locales/fr.json".into());
        config
    }

    #[test]
    fn test_boot_and_handle() {
        let kernel = Kernel::boot(subfolder_config(), &TestApp).unwrap();
        assert_eq!(kernel.router().base_path(), "/shop/");

        let dispatch = kernel.handle(&kernel.descriptor("/shop/users/42")).unwrap();
        assert_eq!(dispatch.active_route(), Some("user"));
        assert_eq!(dispatch.response().body(), "user 42");

        let dispatch = kernel.handle(&kernel.descriptor("/shop/")).unwrap();
        assert_eq!(dispatch.active_route(), Some("home"));

        let dispatch = kernel.handle(&kernel.descriptor("/shop/nope/nope")).unwrap();
        assert_eq!(dispatch.response().status(), 404);
        assert_eq!(dispatch.response().body(), "not here");
    }

    #[test]
    fn test_duplicate_route_is_fatal() {
        let err = Kernel::boot(AppConfig::default(), &DuplicateApp).unwrap_err();
        assert!(matches!(
            err,
            KernelError::Routes(RouteError::DuplicateName { .. })
        ));
    }

    #[test]
    fn test_locale_lookup() {
        let kernel = Kernel::boot(subfolder_config(), &TestApp).unwrap();
        assert_eq!(kernel.locale("fr"), Some("locales/fr.json"));
        assert_eq!(kernel.locale("de"), None);
        assert!(!kernel.developer_mode());
        assert!(kernel.store().is_none());
    }
}
