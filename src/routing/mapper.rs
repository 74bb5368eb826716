use std::collections::BTreeMap;

use super::error::RoutingError;
use crate::traversal::segments;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Rest(String),
}

#[derive(Debug, Clone)]
struct Route {
    pattern: String,
    segments: Vec<Segment>,
    view: String,
}

impl Route {
    fn parse(pattern: &str, view: &str) -> Result<Self, RoutingError> {
        let invalid = |reason: &str| RoutingError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };
        if !pattern.starts_with('/') {
            return Err(invalid("must start with `/`"));
        }

        let raw = segments(pattern);
        let mut parsed = Vec::with_capacity(raw.len());
        let mut names = Vec::new();
        for (index, segment) in raw.iter().enumerate() {
            let captured = if let Some(name) = segment.strip_prefix(':') {
                Some((name, Segment::Param(name.to_string())))
            } else if let Some(name) = segment.strip_prefix('*') {
                if index + 1 != raw.len() {
                    return Err(invalid("`*` capture must be the last segment"));
                }
                Some((name, Segment::Rest(name.to_string())))
            } else {
                None
            };
            match captured {
                Some(("", _)) => return Err(invalid("capture needs a name")),
                Some((name, _)) if names.contains(&name) => {
                    return Err(invalid("capture names must be unique"))
                }
                Some((name, segment)) => {
                    names.push(name);
                    parsed.push(segment);
                }
                None => parsed.push(Segment::Literal(segment.clone())),
            }
        }

        Ok(Self {
            pattern: pattern.to_string(),
            segments: parsed,
            view: view.to_string(),
        })
    }

    fn matches(&self, path: &[String]) -> Option<BTreeMap<String, String>> {
        let mut params = BTreeMap::new();
        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(literal) => {
                    if path.get(index) != Some(literal) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    params.insert(name.clone(), path.get(index)?.clone());
                }
                Segment::Rest(name) => {
                    let rest = path.get(index..).unwrap_or_default().join("/");
                    params.insert(name.clone(), rest);
                    return Some(params);
                }
            }
        }
        (path.len() == self.segments.len()).then_some(params)
    }
}

/// A successful route match: the view to run and the captured values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub view: String,
    pub params: BTreeMap<String, String>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|value| value.as_str())
    }
}

/// Ordered route table. The first matching route wins.
///
/// Patterns are `/`-separated; `:name` captures one segment and `*name`
/// captures the rest of the path (possibly empty).
#[derive(Debug, Clone, Default)]
pub struct RouteMapper {
    routes: Vec<Route>,
}

impl RouteMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, pattern: &str, view: &str) -> Result<&mut Self, RoutingError> {
        self.routes.push(Route::parse(pattern, view)?);
        Ok(self)
    }

    pub fn match_path(&self, path: &str) -> Option<RouteMatch> {
        let path = segments(path);
        self.routes.iter().find_map(|route| {
            route.matches(&path).map(|params| RouteMatch {
                view: route.view.clone(),
                params,
            })
        })
    }

    /// Registered `(pattern, view)` pairs in match order.
    pub fn routes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.routes
            .iter()
            .map(|route| (route.pattern.as_str(), route.view.as_str()))
    }
}
