//! Inbound request description.
//!
//! # Responsibilities
//! - Carry what the rewrite layer hands the front controller:
//!   the redirected URL, the front controller's URL path, the document root
//! - Compute the path relative to the deployment subfolder
//! - Compute the deployment base path from project and document roots
//!
//! # Design Decisions
//! - A missing redirect URL is not an error here; the router turns it into a 500
//! - The subfolder offset is only stripped when the path actually starts with it

use std::path::Path;

/// What the web server tells the front controller about a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// Full requested path as seen by the rewrite layer, e.g. `/shop/users/42`.
    pub redirect_url: Option<String>,
    /// URL path of the front controller script, e.g. `/shop/index.php`.
    pub script_name: String,
    /// Web server document root on disk.
    pub document_root: String,
}

impl RequestDescriptor {
    pub fn new(
        redirect_url: impl Into<String>,
        script_name: impl Into<String>,
        document_root: impl Into<String>,
    ) -> Self {
        Self {
            redirect_url: Some(redirect_url.into()),
            script_name: script_name.into(),
            document_root: document_root.into(),
        }
    }

    /// A request whose front controller sits at the web root.
    pub fn at_root(redirect_url: impl Into<String>) -> Self {
        Self::new(redirect_url, "/index.php", "")
    }

    /// The redirect marker, treating an empty value as absent.
    pub fn redirect_url(&self) -> Option<&str> {
        self.redirect_url.as_deref().filter(|url| !url.is_empty())
    }

    /// Requested path with the front controller's directory removed.
    ///
    /// `/shop/users/42` under `/shop/index.php` becomes `/users/42`.
    pub fn relative_path(&self) -> Option<&str> {
        let url = self.redirect_url()?;
        let dir = script_dir(&self.script_name);
        match url.strip_prefix(dir) {
            Some(rest) if dir == "/" || rest.is_empty() || rest.starts_with('/') => Some(rest),
            _ => Some(url),
        }
    }
}

/// Directory part of a URL path, `/` when the script sits at the root.
fn script_dir(script_name: &str) -> &str {
    match script_name.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &script_name[..idx],
    }
}

/// URL prefix of the deployment subfolder: the project root minus the
/// document root, with a trailing `/`.
///
/// `/var/www/html/shop` under `/var/www/html` gives `/shop/`. Windows
/// separators are turned into `/`.
pub fn base_path(base_dir: &str, document_root: &str) -> String {
    let document_root = document_root.trim_end_matches(['/', '\\']);
    let base_dir = base_dir.trim_end_matches(['/', '\\']);
    let offset = base_dir.strip_prefix(document_root).unwrap_or("");

    let mut path = offset.replace('\\', "/");
    if !path.starts_with('/') {
        path.insert(0, '/');
    }
    if !path.ends_with('/') {
        path.push('/');
    }
    path
}

/// Whether `base_dir` lies inside `document_root`.
pub fn is_under(base_dir: &str, document_root: &str) -> bool {
    Path::new(base_dir).starts_with(Path::new(document_root))
}
