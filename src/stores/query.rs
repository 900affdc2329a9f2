//! URL query contract.
//!
//! - `q`: comma-joined list of committed term values.
//! - `topic`: selected topic id, omitted for "All Topics".
//!
//! Values are form-urlencoded on write and decoded on read. Each term in
//! `q` is encoded on its own and the separator stays a literal `,`, so
//! shared links read `q=MIT,Harvard`. Other parameters are preserved when
//! one is rewritten.

use reqwest::Url;

/// Parameter holding the committed terms.
pub const TERMS_PARAM: &str = "q";

/// Parameter holding the topic filter.
pub const TOPIC_PARAM: &str = "topic";

/// Decoded `(name, value)` pairs of a query string (leading `?` optional).
pub fn pairs(query: &str) -> Vec<(String, String)> {
    let query = query.strip_prefix('?').unwrap_or(query);
    if query.is_empty() {
        return Vec::new();
    }
    match Url::parse("http://localhost/") {
        Ok(mut url) => {
            url.set_query(Some(query));
            url.query_pairs()
                .map(|(name, value)| (name.into_owned(), value.into_owned()))
                .collect()
        }
        Err(_) => Vec::new(),
    }
}

/// First value of a parameter.
pub fn param(query: &str, name: &str) -> Option<String> {
    pairs(query)
        .into_iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value)
}

/// Terms listed in `q`, in order, with blanks dropped.
pub fn parse_terms(query: &str) -> Vec<String> {
    param(query, TERMS_PARAM)
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Topic id in `topic`, if non-empty.
pub fn parse_topic(query: &str) -> Option<String> {
    param(query, TOPIC_PARAM).filter(|topic| !topic.is_empty())
}

/// Rewrite one parameter, keeping the others in order.
///
/// `None` removes the parameter. Returns the encoded query without `?`.
pub fn with_param(query: &str, name: &str, value: Option<&str>) -> String {
    let mut pairs: Vec<(String, String)> = pairs(query)
        .into_iter()
        .filter(|(key, _)| key != name)
        .collect();
    if let Some(value) = value {
        pairs.push((name.to_string(), value.to_string()));
    }
    encode(&pairs)
}

/// Query string for a set of committed terms.
pub fn terms_query(query: &str, terms: &[&str]) -> String {
    let joined = terms.join(",");
    with_param(
        query,
        TERMS_PARAM,
        (!joined.is_empty()).then_some(joined.as_str()),
    )
}

fn encode(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(name, value)| {
            let value = if name == TERMS_PARAM {
                value
                    .split(',')
                    .map(encode_component)
                    .collect::<Vec<_>>()
                    .join(",")
            } else {
                encode_component(value)
            };
            format!("{}={}", encode_component(name), value)
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Form-urlencode a single name or value.
fn encode_component(raw: &str) -> String {
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return String::new();
    };
    url.query_pairs_mut().append_pair("", raw);
    url.query()
        .and_then(|query| query.strip_prefix('='))
        .unwrap_or_default()
        .to_string()
}
