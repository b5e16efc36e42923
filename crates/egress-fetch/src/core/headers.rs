use http::header::ACCEPT;
use http::{HeaderMap, HeaderName, HeaderValue};

use crate::data::RequestOptions;
use crate::error::TransportError;

fn append_all(map: &mut HeaderMap, headers: &[(String, String)]) -> Result<(), TransportError> {
    for (name, value) in headers {
        let header = HeaderName::try_from(name.trim())
            .map_err(|_| TransportError::InvalidRequest(format!("invalid header name `{name}`")))?;
        let value = HeaderValue::try_from(value.trim())
            .map_err(|_| TransportError::InvalidRequest(format!("invalid value for header `{name}`")))?;
        map.append(header, value);
    }
    Ok(())
}

/// Merge client defaults, caller headers and `accept_content` into a fresh map.
///
/// A caller header replaces every default value with the same name; repeated
/// caller headers are all kept. `accept_content` replaces any `Accept`.
pub fn effective_headers(
    defaults: &[(String, String)],
    options: &RequestOptions,
) -> Result<HeaderMap, TransportError> {
    let mut merged = HeaderMap::new();
    append_all(&mut merged, defaults)?;

    let mut caller = HeaderMap::new();
    append_all(&mut caller, &options.headers)?;
    if let Some(accept) = &options.accept_content {
        let value = HeaderValue::try_from(accept.trim())
            .map_err(|_| TransportError::InvalidRequest("invalid accept_content".to_string()))?;
        caller.insert(ACCEPT, value);
    }

    for name in caller.keys() {
        merged.remove(name);
    }
    for (name, value) in &caller {
        merged.append(name.clone(), value.clone());
    }
    Ok(merged)
}
