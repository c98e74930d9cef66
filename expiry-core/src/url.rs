//! Minimal asset URL model.
//!
//! Asset references come in three shapes: a root-relative path
//! (`/css/main.css`), a protocol-relative URL (`//cdn.example.com/main.css`)
//! and an absolute URL (`https://cdn.example.com/main.css`). [`AssetUrl`]
//! splits any of them into origin, path, query and fragment and renders them
//! back byte for byte when nothing was changed.

use std::fmt;

/// An asset reference split into its URL components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetUrl {
    origin: Option<String>,
    path: String,
    query: Option<String>,
    fragment: Option<String>,
}

impl AssetUrl {
    /// Parses an asset reference. Parsing never fails; anything that is not
    /// recognised as an origin is treated as part of the path.
    pub fn parse(input: &str) -> Self {
        let (rest, fragment) = match input.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment.to_owned())),
            None => (input, None),
        };
        let (rest, query) = match rest.split_once('?') {
            Some((rest, query)) => (rest, Some(query.to_owned())),
            None => (rest, None),
        };
        let (origin, path) = split_origin(rest);

        Self {
            origin: origin.map(str::to_owned),
            path: path.to_owned(),
            query,
            fragment,
        }
    }

    /// Explicit `scheme://host` or `//host` prefix, if the reference carried one.
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Returns `true` when the reference names its own host.
    pub fn has_origin(&self) -> bool {
        self.origin.is_some()
    }

    /// The path component, e.g. `/css/main.css`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The raw query string without the leading `?`.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// The fragment without the leading `#`.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Path followed by `?query` when a query is present. This is the form an
    /// HTTP server sees in the request line.
    pub fn path_and_query(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }

    /// Returns a copy with the path replaced.
    pub fn with_path(&self, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..self.clone()
        }
    }

    /// Returns a copy with the origin replaced.
    pub fn with_origin(self, origin: impl Into<String>) -> Self {
        Self {
            origin: Some(origin.into()),
            ..self
        }
    }

    /// Returns a copy where query parameter `name` is set to `value`.
    ///
    /// The first existing `name` parameter is replaced in place and any later
    /// duplicates are dropped; otherwise the parameter is appended. All other
    /// parameters keep their order and raw encoding.
    pub fn with_query_param(&self, name: &str, value: &str) -> Self {
        let mut pairs: Vec<String> = Vec::new();
        let mut replaced = false;

        for pair in self.query.iter().flat_map(|query| query.split('&')) {
            if pair.is_empty() {
                continue;
            }
            let key = pair.split_once('=').map_or(pair, |(key, _)| key);
            if key == name {
                if !replaced {
                    pairs.push(format!("{name}={value}"));
                    replaced = true;
                }
            } else {
                pairs.push(pair.to_owned());
            }
        }
        if !replaced {
            pairs.push(format!("{name}={value}"));
        }

        Self {
            query: Some(pairs.join("&")),
            ..self.clone()
        }
    }
}

impl fmt::Display for AssetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(origin) = &self.origin {
            f.write_str(origin)?;
        }
        f.write_str(&self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

fn split_origin(input: &str) -> (Option<&str>, &str) {
    let authority_start = if input.starts_with("//") {
        Some(2)
    } else {
        input
            .find("://")
            .filter(|&idx| is_scheme(&input[..idx]))
            .map(|idx| idx + 3)
    };

    match authority_start {
        Some(start) => {
            let end = input[start..]
                .find('/')
                .map_or(input.len(), |offset| start + offset);
            (Some(&input[..end]), &input[end..])
        }
        None => (None, input),
    }
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
