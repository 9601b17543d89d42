use http::{HeaderName, HeaderValue, Method};

use super::errors::CorsError;
use super::types::{OriginMatcher, OriginPolicy};

const DEFAULT_METHODS: [&str; 6] = ["GET", "HEAD", "PUT", "PATCH", "POST", "DELETE"];

/// Static CORS options plus the origin policy.
///
/// Header values are rendered and validated once, when the config is built,
/// so writing them onto a response cannot fail.
#[derive(Clone, Debug)]
pub struct CorsConfig {
    origin: OriginPolicy,
    methods: Vec<String>,
    allowed_headers: Vec<String>,
    exposed_headers: Vec<String>,
    credentials: bool,
    max_age: Option<u64>,
    pub(crate) methods_value: HeaderValue,
    pub(crate) allowed_headers_value: Option<HeaderValue>,
    pub(crate) exposed_headers_value: Option<HeaderValue>,
    pub(crate) max_age_value: Option<HeaderValue>,
}

impl CorsConfig {
    pub fn builder() -> CorsConfigBuilder {
        CorsConfigBuilder::default()
    }

    /// Builds a config from `RG_CORS_*` environment variables.
    ///
    /// * `RG_CORS_ORIGIN` - `*`, `none`, or a comma list of origins and `regex:<pattern>` entries
    /// * `RG_CORS_METHODS` - comma list of methods
    /// * `RG_CORS_ALLOWED_HEADERS` / `RG_CORS_EXPOSED_HEADERS` - comma lists of header names
    /// * `RG_CORS_CREDENTIALS` - `true` or `false`
    /// * `RG_CORS_MAX_AGE` - seconds
    pub fn from_env() -> Result<Self, CorsError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_vars<F>(lookup: F) -> Result<Self, CorsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();

        if let Some(origin) = lookup("RG_CORS_ORIGIN") {
            builder = builder.origin(parse_origin_policy(&origin)?);
        }
        if let Some(methods) = lookup("RG_CORS_METHODS") {
            builder = builder.methods(split_list(&methods));
        }
        if let Some(headers) = lookup("RG_CORS_ALLOWED_HEADERS") {
            builder = builder.allowed_headers(split_list(&headers));
        }
        if let Some(headers) = lookup("RG_CORS_EXPOSED_HEADERS") {
            builder = builder.exposed_headers(split_list(&headers));
        }
        if let Some(credentials) = lookup("RG_CORS_CREDENTIALS") {
            let credentials = match credentials.trim().to_lowercase().as_str() {
                "true" => true,
                "false" => false,
                other => {
                    return Err(CorsError::Configuration(format!(
                        "RG_CORS_CREDENTIALS must be 'true' or 'false', got '{other}'"
                    )));
                }
            };
            builder = builder.credentials(credentials);
        }
        if let Some(max_age) = lookup("RG_CORS_MAX_AGE") {
            let max_age = max_age.trim().parse::<u64>().map_err(|_| {
                CorsError::Configuration(format!(
                    "RG_CORS_MAX_AGE must be a non-negative integer, got '{max_age}'"
                ))
            })?;
            builder = builder.max_age(max_age);
        }

        builder.build()
    }

    pub fn origin(&self) -> &OriginPolicy {
        &self.origin
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    pub fn allowed_headers(&self) -> &[String] {
        &self.allowed_headers
    }

    pub fn exposed_headers(&self) -> &[String] {
        &self.exposed_headers
    }

    pub fn credentials(&self) -> bool {
        self.credentials
    }

    pub fn max_age(&self) -> Option<u64> {
        self.max_age
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origin: OriginPolicy::AllowAll,
            methods: DEFAULT_METHODS.iter().map(|m| m.to_string()).collect(),
            allowed_headers: Vec::new(),
            exposed_headers: Vec::new(),
            credentials: false,
            max_age: None,
            methods_value: HeaderValue::from_static("GET, HEAD, PUT, PATCH, POST, DELETE"),
            allowed_headers_value: None,
            exposed_headers_value: None,
            max_age_value: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct CorsConfigBuilder {
    origin: Option<OriginPolicy>,
    methods: Option<Vec<String>>,
    allowed_headers: Vec<String>,
    exposed_headers: Vec<String>,
    credentials: bool,
    max_age: Option<u64>,
}

impl CorsConfigBuilder {
    pub fn origin(mut self, origin: OriginPolicy) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = Some(methods.into_iter().map(Into::into).collect());
        self
    }

    pub fn allowed_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    pub fn exposed_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exposed_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    pub fn credentials(mut self, credentials: bool) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn max_age(mut self, seconds: u64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    /// Validates every option and renders the header values.
    pub fn build(self) -> Result<CorsConfig, CorsError> {
        let methods = match self.methods {
            Some(methods) => normalize_methods(methods)?,
            None => DEFAULT_METHODS.iter().map(|m| m.to_string()).collect(),
        };
        validate_header_names(&self.allowed_headers)?;
        validate_header_names(&self.exposed_headers)?;

        let methods_value = render_list(&methods)?;
        let allowed_headers_value = render_optional_list(&self.allowed_headers)?;
        let exposed_headers_value = render_optional_list(&self.exposed_headers)?;
        let max_age_value = self.max_age.map(HeaderValue::from);

        let config = CorsConfig {
            origin: self.origin.unwrap_or_default(),
            methods,
            allowed_headers: self.allowed_headers,
            exposed_headers: self.exposed_headers,
            credentials: self.credentials,
            max_age: self.max_age,
            methods_value,
            allowed_headers_value,
            exposed_headers_value,
            max_age_value,
        };

        tracing::debug!("Built CORS config: {:?}", config.origin);
        Ok(config)
    }
}

/// Parses the `RG_CORS_ORIGIN` syntax into a policy.
pub(crate) fn parse_origin_policy(value: &str) -> Result<OriginPolicy, CorsError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CorsError::Configuration(
            "RG_CORS_ORIGIN must not be empty".to_string(),
        ));
    }
    if value == "*" {
        return Ok(OriginPolicy::AllowAll);
    }
    if value.eq_ignore_ascii_case("none") {
        return Ok(OriginPolicy::Deny);
    }

    let mut matchers = split_list(value)
        .into_iter()
        .map(|entry| match entry.strip_prefix("regex:") {
            Some(pattern) => OriginMatcher::pattern(pattern),
            None => OriginMatcher::exact(entry),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if matchers.len() == 1 {
        return match matchers.remove(0) {
            OriginMatcher::Exact(origin) => OriginPolicy::exact(origin),
            OriginMatcher::Pattern(pattern) => Ok(OriginPolicy::Pattern(pattern)),
        };
    }
    Ok(OriginPolicy::List(matchers))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize_methods(methods: Vec<String>) -> Result<Vec<String>, CorsError> {
    let mut normalized: Vec<String> = Vec::with_capacity(methods.len());
    for method in methods {
        let parsed = Method::from_bytes(method.trim().to_uppercase().as_bytes())
            .map_err(|_| CorsError::Configuration(format!("invalid HTTP method '{method}'")))?;
        let parsed = parsed.as_str().to_string();
        if !normalized.contains(&parsed) {
            normalized.push(parsed);
        }
    }
    Ok(normalized)
}

fn validate_header_names(names: &[String]) -> Result<(), CorsError> {
    for name in names {
        HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| CorsError::Configuration(format!("invalid header name '{name}'")))?;
    }
    Ok(())
}

fn render_list(items: &[String]) -> Result<HeaderValue, CorsError> {
    HeaderValue::from_str(&items.join(", "))
        .map_err(|e| CorsError::Configuration(format!("invalid header value: {e}")))
}

fn render_optional_list(items: &[String]) -> Result<Option<HeaderValue>, CorsError> {
    if items.is_empty() {
        return Ok(None);
    }
    render_list(items).map(Some)
}
