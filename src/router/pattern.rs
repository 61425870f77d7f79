use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use smallvec::SmallVec;

/// Maximum number of path parameters before heap allocation.
/// Most route patterns bind ≤4 params (e.g. `/users/:id/posts/:post_id`).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the dispatch hot path.
///
/// Param names are `Arc<str>` because they come from the static pattern
/// (known at registration); values are per-request data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

#[allow(clippy::expect_used)]
static PARAM_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("param name regex"));

/// A compiled path template.
///
/// A pattern is a sequence of literal segments and `:name` segments; each
/// `:name` matches exactly one non-empty path segment (never across a slash)
/// and binds it under `name`. Matching requires the same segment count as the
/// pattern; there is no implicit wildcard or suffix matching.
///
/// Compilation happens once at registration time; matching is a single
/// anchored regex test per candidate route.
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    regex: Regex,
    param_names: Vec<Arc<str>>,
}

impl PathPattern {
    /// Compile a path template.
    ///
    /// # Panics
    ///
    /// Panics at registration time on a malformed template: a pattern not
    /// starting with `/`, an empty or ill-formed `:name`, or the same name
    /// bound twice (two matches must never alias parameter names).
    #[must_use]
    pub fn compile(pattern: &str) -> Self {
        assert!(
            pattern.starts_with('/'),
            "route pattern {pattern:?} must start with '/'"
        );

        let (regex, param_names) = Self::path_to_regex(pattern);
        Self {
            raw: pattern.to_string(),
            regex,
            param_names,
        }
    }

    /// The original template text this pattern was compiled from.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.raw
    }

    /// Names bound by this pattern, in path order.
    #[must_use]
    pub fn param_names(&self) -> &[Arc<str>] {
        &self.param_names
    }

    /// Match a request path, extracting bound parameters.
    ///
    /// Returns `None` when the path does not match; a match with no `:name`
    /// segments yields an empty map.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<ParamVec> {
        let caps = self.regex.captures(path)?;
        let mut params = ParamVec::new();
        for (i, name) in self.param_names.iter().enumerate() {
            if let Some(m) = caps.get(i + 1) {
                params.push((Arc::clone(name), m.as_str().to_string()));
            }
        }
        Some(params)
    }

    /// Convert a path template into an anchored regex plus ordered parameter
    /// names. `/users/:id` becomes `^/users/([^/]+)$` with names `["id"]`.
    #[allow(clippy::expect_used)]
    fn path_to_regex(pattern: &str) -> (Regex, Vec<Arc<str>>) {
        if pattern == "/" {
            return (Regex::new(r"^/$").expect("root path regex"), Vec::new());
        }

        let mut source = String::with_capacity(pattern.len() + 8);
        source.push('^');
        let mut param_names: Vec<Arc<str>> = Vec::with_capacity(pattern.matches(':').count());

        for segment in pattern.split('/') {
            if let Some(name) = segment.strip_prefix(':') {
                assert!(
                    PARAM_NAME.is_match(name),
                    "route pattern {pattern:?} has invalid parameter name {name:?}"
                );
                assert!(
                    !param_names.iter().any(|n| n.as_ref() == name),
                    "route pattern {pattern:?} binds parameter {name:?} twice"
                );
                source.push_str("/([^/]+)");
                param_names.push(Arc::from(name));
            } else if !segment.is_empty() {
                source.push('/');
                source.push_str(&regex::escape(segment));
            }
        }

        source.push('$');
        let regex = Regex::new(&source).expect("compiled path regex");

        (regex, param_names)
    }
}
