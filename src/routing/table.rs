//! Ordered route table.
//!
//! # Design Decisions
//! - Routes are tried in registration order; first match wins
//! - Names are unique; the name index is a side map over the ordered list
//! - Immutable once the router is frozen behind an `Arc`

use std::collections::HashMap;

use crate::routing::error::RouteError;
use crate::routing::handler::Handler;
use crate::routing::matcher::{derive_name, normalize_path, Captures, PathPattern};

/// A named binding between a path pattern and a handler.
#[derive(Debug, Clone)]
pub struct Route {
    name: String,
    pattern: PathPattern,
    handler: Handler,
}

impl Route {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }
}

/// Result of a successful lookup.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub args: Captures,
}

#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    by_name: HashMap<String, usize>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `path` under `name`, or under a name derived
    /// from the path when `name` is `None`.
    pub fn insert(
        &mut self,
        path: &str,
        handler: Handler,
        name: Option<&str>,
    ) -> Result<&Route, RouteError> {
        let pattern = PathPattern::parse(path)?;
        let name = match name {
            Some(name) => name.to_string(),
            None => derive_name(pattern.as_str()),
        };

        if let Some(&idx) = self.by_name.get(&name) {
            return Err(RouteError::DuplicateName {
                name,
                path: pattern.as_str().to_string(),
                existing: self.routes[idx].pattern.as_str().to_string(),
            });
        }

        let idx = self.routes.len();
        self.by_name.insert(name.clone(), idx);
        self.routes.push(Route {
            name,
            pattern,
            handler,
        });
        Ok(&self.routes[idx])
    }

    pub fn get(&self, name: &str) -> Option<&Route> {
        self.by_name.get(name).map(|&idx| &self.routes[idx])
    }

    /// First route, in registration order, matching every segment of `path`.
    /// `path` must already be relative to the deployment base.
    pub fn find(&self, path: &str) -> Option<RouteMatch<'_>> {
        let request: Vec<&str> = normalize_path(path).split('/').collect();
        self.find_segments(&request)
    }

    /// [`find`](Self::find) over an already split (and decoded) path.
    pub fn find_segments(&self, request: &[&str]) -> Option<RouteMatch<'_>> {
        self.routes.iter().find_map(|route| {
            route
                .pattern
                .match_segments(request)
                .map(|args| RouteMatch { route, args })
        })
    }

    /// Route names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.routes.iter().map(|r| r.name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler(body: &'static str) -> Handler {
        Handler::new(move |_ctx| Ok(body.into()))
    }

    #[test]
    fn test_insert_derives_name() {
        let mut table = RouteTable::new();
        let route = table.insert("/users/{id}/", handler("u"), None).unwrap();
        assert_eq!(route.name(), "usersid");
        assert_eq!(route.pattern().as_str(), "users/{id}");
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut table = RouteTable::new();
        table.insert("home", handler("a"), Some("home")).unwrap();
        let err = table.insert("index", handler("b"), Some("home")).unwrap_err();
        assert_eq!(
            err,
            RouteError::DuplicateName {
                name: "home".into(),
                path: "index".into(),
                existing: "home".into(),
            }
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_same_path_distinct_names() {
        let mut table = RouteTable::new();
        table.insert("home", handler("a"), Some("first")).unwrap();
        table.insert("home", handler("b"), Some("second")).unwrap();
        assert_eq!(table.names(), vec!["first", "second"]);

        // First registered wins
        let found = table.find("home").unwrap();
        assert_eq!(found.route.name(), "first");
    }

    #[test]
    fn test_derived_name_collision() {
        let mut table = RouteTable::new();
        table.insert("a/b", handler("a"), None).unwrap();
        // "a-b" derives to "ab" as well
        assert!(table.insert("a-b", handler("b"), None).is_err());
    }

    #[test]
    fn test_find() {
        let mut table = RouteTable::new();
        table.insert("users", handler("list"), Some("users")).unwrap();
        table
            .insert("users/{id}/posts/{postId}", handler("post"), Some("userPost"))
            .unwrap();

        let found = table.find("/users/42/posts/7/").unwrap();
        assert_eq!(found.route.name(), "userPost");
        assert_eq!(found.args.get("id"), Some("42"));
        assert_eq!(found.args.get("postId"), Some("7"));

        assert!(table.find("users/42").is_none());
        assert!(table.find("").is_none());
    }
}
