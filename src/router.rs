//! Named, radix-tree request router with reverse URL generation.
//!
//! One tree per HTTP method, O(path-length) lookup via [`matchit`]. Every
//! route carries a unique name so a URL can be rebuilt from the name and its
//! parameters, the inverse of matching.
//!
//! # Patterns
//!
//! Placeholders are `{name}` (any single segment) or `{name:REGEX}`, where the
//! whole segment must match the anchored regex:
//!
//! ```text
//! /articles                 literal
//! /articles/{id:[0-9]+}     numeric id
//! /articles/{id:[0-9]+}/edit
//! ```
//!
//! # Precedence
//!
//! `matchit` always prefers a static segment over a placeholder, so
//! `/articles/create` wins over `/articles/{id:[0-9]+}` whatever the
//! registration order. A segment that reaches a placeholder but fails its
//! regex (`/articles/abc`) is a miss and goes to the fallback handler.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;
use regex::Regex;

use crate::error::RouteError;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::status::Status;

// ── Reverse routing capability ────────────────────────────────────────────────

/// Builds a URL from a route name and its placeholder values.
///
/// This is the only piece of the router that templates and controllers get
/// to see.
pub trait ReverseUrl: Send + Sync {
    fn reverse_url(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RouteError>;
}

// ── Patterns ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
enum Segment {
    Literal(String),
    Param { name: String, constraint: Option<Regex> },
}

/// A parsed path pattern.
#[derive(Debug)]
struct Pattern {
    segments: Vec<Segment>,
}

impl Pattern {
    fn parse(raw: &str) -> Result<Self, RouteError> {
        let invalid = |reason: &str| RouteError::InvalidPattern {
            pattern: raw.to_owned(),
            reason: reason.to_owned(),
        };

        if !raw.starts_with('/') {
            return Err(invalid("must start with `/`"));
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.chars();

        while let Some(ch) = chars.next() {
            match ch {
                '{' => {
                    // Regex quantifiers such as `{2,4}` nest inside a placeholder.
                    let mut depth = 1;
                    let mut inner = String::new();
                    for c in chars.by_ref() {
                        match c {
                            '{' => depth += 1,
                            '}' => depth -= 1,
                            _ => {}
                        }
                        if depth == 0 {
                            break;
                        }
                        inner.push(c);
                    }
                    if depth != 0 {
                        return Err(invalid("unclosed `{`"));
                    }

                    let (name, constraint) = match inner.split_once(':') {
                        Some((name, re)) => (name, Some(re)),
                        None => (inner.as_str(), None),
                    };
                    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                        return Err(invalid("placeholder name must be non-empty [A-Za-z0-9_]"));
                    }
                    let constraint = constraint
                        .map(|re| Regex::new(&format!("^(?:{re})$")))
                        .transpose()
                        .map_err(|e| invalid(&e.to_string()))?;

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Param { name: name.to_owned(), constraint });
                }
                '}' => return Err(invalid("unmatched `}`")),
                _ => literal.push(ch),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    /// The path in `matchit` syntax: constraints stripped, `{name}` kept.
    fn tree_path(&self) -> String {
        self.segments.iter().fold(String::new(), |mut out, seg| {
            match seg {
                Segment::Literal(s) => out.push_str(s),
                Segment::Param { name, .. } => {
                    out.push('{');
                    out.push_str(name);
                    out.push('}');
                }
            }
            out
        })
    }

    /// True when every captured value satisfies its placeholder's regex.
    fn accepts(&self, params: &HashMap<String, String>) -> bool {
        self.segments.iter().all(|seg| match seg {
            Segment::Param { name, constraint: Some(re) } => {
                params.get(name).is_some_and(|v| re.is_match(v))
            }
            _ => true,
        })
    }

    fn reverse(&self, route: &str, params: &[(&str, &str)]) -> Result<String, RouteError> {
        let mut url = String::new();
        for seg in &self.segments {
            match seg {
                Segment::Literal(s) => url.push_str(s),
                Segment::Param { name, constraint } => {
                    let value = params
                        .iter()
                        .find(|(k, _)| k == name)
                        .map(|(_, v)| *v)
                        .ok_or_else(|| RouteError::MissingParam {
                            route: route.to_owned(),
                            param: name.clone(),
                        })?;
                    let fits = match constraint {
                        Some(re) => re.is_match(value),
                        None => !value.is_empty() && !value.contains('/'),
                    };
                    if !fits {
                        return Err(RouteError::InvalidParam {
                            route: route.to_owned(),
                            param: name.clone(),
                            value: value.to_owned(),
                        });
                    }
                    url.push_str(value);
                }
            }
        }
        Ok(url)
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

struct Endpoint<S> {
    handler: BoxedHandler<S>,
    pattern: Arc<Pattern>,
}

/// The application router.
///
/// Build it once at startup, wrap it in an `Arc`, hand a clone to whatever
/// needs [`ReverseUrl`], and pass it to [`Server::serve`](crate::Server::serve).
/// The table is read-only from then on.
pub struct Router<S> {
    routes: HashMap<Method, MatchitRouter<Endpoint<S>>>,
    names: HashMap<String, Arc<Pattern>>,
    fallback: BoxedHandler<S>,
}

impl<S: Send + Sync + 'static> Router<S> {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            names: HashMap::new(),
            fallback: not_found::<S>.into_boxed_handler(),
        }
    }

    /// Registers a named route. Returns `self` for chaining.
    ///
    /// # Panics
    ///
    /// Panics on a duplicate name, a malformed pattern, or a path that
    /// conflicts with one already registered for the same method. All three
    /// are wiring mistakes that must stop the process at startup. Use
    /// [`try_route`](Router::try_route) to handle them instead.
    pub fn route(self, name: &str, method: Method, pattern: &str, handler: impl Handler<S>) -> Self {
        self.try_route(name, method, pattern, handler)
            .unwrap_or_else(|e| panic!("invalid route `{name}`: {e}"))
    }

    /// Fallible form of [`route`](Router::route).
    pub fn try_route(
        mut self,
        name: &str,
        method: Method,
        pattern: &str,
        handler: impl Handler<S>,
    ) -> Result<Self, RouteError> {
        if self.names.contains_key(name) {
            return Err(RouteError::DuplicateName(name.to_owned()));
        }
        let pattern = Arc::new(Pattern::parse(pattern)?);
        let endpoint = Endpoint {
            handler: handler.into_boxed_handler(),
            pattern: Arc::clone(&pattern),
        };
        self.routes
            .entry(method)
            .or_default()
            .insert(pattern.tree_path(), endpoint)?;
        self.names.insert(name.to_owned(), pattern);
        Ok(self)
    }

    /// Replaces the handler answering requests no route matches.
    pub fn fallback(mut self, handler: impl Handler<S>) -> Self {
        self.fallback = handler.into_boxed_handler();
        self
    }

    pub(crate) fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler<S>, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let params: HashMap<String, String> = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        if !matched.value.pattern.accepts(&params) {
            return None;
        }
        Some((Arc::clone(&matched.value.handler), params))
    }

    /// Routes one request to its handler, or to the fallback on a miss.
    pub async fn handle(&self, state: Arc<S>, mut req: Request) -> Response {
        match req.method.and_then(|method| self.lookup(method, &req.path)) {
            Some((handler, params)) => {
                req.params = params;
                handler.call(state, req).await
            }
            None => self.fallback.call(state, req).await,
        }
    }
}

impl<S: Send + Sync + 'static> Default for Router<S> {
    fn default() -> Self { Self::new() }
}

impl<S: Send + Sync + 'static> ReverseUrl for Router<S> {
    fn reverse_url(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RouteError> {
        self.names
            .get(name)
            .ok_or_else(|| RouteError::UnknownRoute(name.to_owned()))?
            .reverse(name, params)
    }
}

async fn not_found<S>(_state: Arc<S>, _req: Request) -> Response {
    Status::NotFound.into_response()
}
