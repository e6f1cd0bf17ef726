//! Merging routes from every source into one ordered set
//!
//! Route names must be unique across all sources. There is no override or
//! precedence: a name defined twice is a [`RouteConflict`], whichever order
//! the sources arrive in. Order is kept only so the matcher can walk routes
//! the way discovery listed their sources.
//!
//! Patterns are compiled once, as routes enter the set. A pattern that does
//! not compile is reported here and the route never matches.

use log::warn;
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;

use crate::error::RouteConflict;
use crate::routes::Route;

/// Routes from all sources, in insertion order, with unique names
#[derive(Debug, Clone, Default)]
pub struct RouteSet {
    routes: Vec<Route>,

    /// Case-insensitive pattern per route; `None` when it failed to compile
    patterns: Vec<Option<Regex>>,
}

impl PartialEq for RouteSet {
    fn eq(&self, other: &Self) -> bool {
        self.routes == other.routes
    }
}

impl RouteSet {
    /// An empty set
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routes with a usable pattern, in order
    pub fn compiled(&self) -> impl Iterator<Item = (&Route, &Regex)> {
        self.routes
            .iter()
            .zip(&self.patterns)
            .filter_map(|(route, pattern)| pattern.as_ref().map(|regex| (route, regex)))
    }

    fn push(&mut self, route: Route) {
        self.patterns.push(compile_pattern(&route));
        self.routes.push(route);
    }

    /// Look up a route by name
    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// Distinct source labels in the order they first contributed a route
    pub fn sources(&self) -> Vec<&str> {
        let mut sources: Vec<&str> = Vec::new();
        for route in &self.routes {
            let label = route.source_label();
            if !sources.contains(&label) {
                sources.push(label);
            }
        }
        sources
    }

    /// Total number of inline tests
    pub fn test_count(&self) -> usize {
        self.routes.iter().map(|r| r.tests.len()).sum()
    }
}

impl<'a> IntoIterator for &'a RouteSet {
    type Item = &'a Route;
    type IntoIter = std::slice::Iter<'a, Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}

/// Merge per-source routes, labelling each route with its source.
///
/// Fails on the first name seen in two sources.
pub fn merge_routes<I, S>(sources: I) -> Result<RouteSet, RouteConflict>
where
    I: IntoIterator<Item = (Vec<Route>, S)>,
    S: Into<String>,
{
    let mut merged = RouteSet::new();
    let mut seen: HashMap<String, String> = HashMap::new();

    for (routes, label) in sources {
        let label = label.into();
        for mut route in routes {
            if let Some(first) = seen.get(&route.name) {
                return Err(RouteConflict {
                    name: route.name,
                    first: first.clone(),
                    second: label,
                });
            }
            seen.insert(route.name.clone(), label.clone());
            route.source = Some(label.clone());
            merged.push(route);
        }
    }

    Ok(merged)
}

fn compile_pattern(route: &Route) -> Option<Regex> {
    match RegexBuilder::new(&route.pattern).case_insensitive(true).build() {
        Ok(regex) => Some(regex),
        Err(e) => {
            warn!("route '{}' never matches: invalid pattern: {}", route.name, e);
            None
        }
    }
}
