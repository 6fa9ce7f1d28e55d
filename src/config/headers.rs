//! Default request header sets.
//!
//! Every target site expects a slightly different browser fingerprint. The
//! session factory applies one of these sets as the client's default headers;
//! the User-Agent is configured separately so it can be overridden from the CLI.

/// A fixed set of `(name, value)` header pairs.
pub type HeaderSet = &'static [(&'static str, &'static str)];

/// JSON endpoints of the City Electric Supply storefront.
pub const CES_HEADERS: HeaderSet = &[
    ("referer", "https://www.cityelectricsupply.com/"),
    ("origin", "https://www.cityelectricsupply.com"),
    ("accept", "application/json"),
    ("content-type", "application/json"),
];

/// Wait-time API behind the Port Authority airport sites.
pub const AIRPORT_HEADERS: HeaderSet = &[
    ("accept", "application/json, text/plain, */*"),
    ("accept-language", "en-GB,en-US;q=0.9,en;q=0.8"),
    ("origin", "https://www.jfkairport.com"),
    ("referer", "https://www.jfkairport.com/"),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-site", "cross-site"),
    (
        "sec-ch-ua",
        "\"Not(A:Brand\";v=\"99\", \"Google Chrome\";v=\"133\", \"Chromium\";v=\"133\"",
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", "\"Windows\""),
];

/// Dongchedi index API.
pub const DONGCHEDI_HEADERS: HeaderSet = &[
    ("referer", "https://index.dongchedi.com/"),
    ("accept", "application/json"),
];

/// BSE report pages (a regular top-level document navigation).
pub const BSE_HEADERS: HeaderSet = &[
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
    ),
    ("accept-language", "en-US,en;q=0.9"),
    ("sec-fetch-dest", "document"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-site", "none"),
    ("sec-fetch-user", "?1"),
    ("upgrade-insecure-requests", "1"),
    (
        "sec-ch-ua",
        "\"Chromium\";v=\"122\", \"Not(A:Brand\";v=\"24\", \"Google Chrome\";v=\"122\"",
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", "\"Linux\""),
];

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderName, HeaderValue};

    #[test]
    fn test_all_header_sets_are_valid_http_headers() {
        for set in [CES_HEADERS, AIRPORT_HEADERS, DONGCHEDI_HEADERS, BSE_HEADERS] {
            for (name, value) in set {
                assert!(
                    HeaderName::from_bytes(name.as_bytes()).is_ok(),
                    "invalid header name: {name}"
                );
                assert!(
                    HeaderValue::from_str(value).is_ok(),
                    "invalid header value for {name}"
                );
            }
        }
    }
}
