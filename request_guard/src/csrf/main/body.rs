use bytes::Bytes;
use std::collections::HashMap;
use std::convert::Infallible;

use crate::csrf::types::SubmittedFields;

/// String fields decoded from a form-urlencoded, multipart or JSON request body.
///
/// Only top-level string values are kept, and multipart file parts are
/// skipped. Other content types, and bodies that fail to decode, yield no
/// fields at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestBody {
    fields: HashMap<String, String>,
}

enum BodyKind {
    Form,
    Multipart,
    Json,
    Unsupported,
}

impl RequestBody {
    pub async fn parse(content_type: Option<&str>, body: &[u8]) -> Self {
        let fields = match (content_type, body_kind(content_type)) {
            (_, BodyKind::Form) => parse_form(body),
            (Some(content_type), BodyKind::Multipart) => parse_multipart(content_type, body).await,
            (_, BodyKind::Json) => parse_json(body),
            _ => {
                tracing::debug!("Unsupported body content type: {:?}", content_type);
                HashMap::new()
            }
        };
        Self { fields }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl SubmittedFields for RequestBody {
    fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

fn body_kind(content_type: Option<&str>) -> BodyKind {
    let Some(content_type) = content_type else {
        return BodyKind::Unsupported;
    };
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if media_type == "application/x-www-form-urlencoded" {
        BodyKind::Form
    } else if media_type == "multipart/form-data" {
        BodyKind::Multipart
    } else if media_type == "application/json" || media_type.ends_with("+json") {
        BodyKind::Json
    } else {
        BodyKind::Unsupported
    }
}

fn parse_form(body: &[u8]) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for (name, value) in url::form_urlencoded::parse(body) {
        // First occurrence wins
        fields
            .entry(name.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    fields
}

async fn parse_multipart(content_type: &str, body: &[u8]) -> HashMap<String, String> {
    let boundary = match multer::parse_boundary(content_type) {
        Ok(boundary) => boundary,
        Err(e) => {
            tracing::debug!("Multipart body without usable boundary: {}", e);
            return HashMap::new();
        }
    };

    let data = Bytes::copy_from_slice(body);
    let stream = futures_util::stream::once(async move { Ok::<_, Infallible>(data) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut fields = HashMap::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::debug!("Failed to parse multipart body: {}", e);
                return HashMap::new();
            }
        };
        // File uploads never carry the token
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        match field.text().await {
            Ok(value) => {
                fields.entry(name).or_insert(value);
            }
            Err(e) => {
                tracing::debug!("Failed to read multipart field '{}': {}", name, e);
                return HashMap::new();
            }
        }
    }
    fields
}

fn parse_json(body: &[u8]) -> HashMap<String, String> {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => map
            .into_iter()
            .filter_map(|(name, value)| match value {
                serde_json::Value::String(value) => Some((name, value)),
                _ => None,
            })
            .collect(),
        Ok(_) => {
            tracing::debug!("JSON body is not an object");
            HashMap::new()
        }
        Err(e) => {
            tracing::debug!("Failed to parse JSON body: {}", e);
            HashMap::new()
        }
    }
}
