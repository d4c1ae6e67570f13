//! HTTP `Link` header parsing.
//!
//! Services answer creation commands with `Link` headers relating the
//! new entity to its proxy, resource map or annotation body. Several
//! links can share one header line, comma-separated, and the target
//! URIs themselves may contain commas, so splitting tracks `<...>`
//! nesting instead of splitting blindly.

/// One `<target>; rel="..."` relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRelation {
    pub target: String,
    pub rel: String,
}

/// Split a header value on commas that are outside `<...>`.
fn split_links(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in value.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
}

/// Parse every relation in one `Link` header value. Malformed segments
/// are skipped rather than failing the response.
pub fn parse_link_header(value: &str) -> Vec<LinkRelation> {
    let mut out = Vec::new();
    for part in split_links(value) {
        let part = part.trim();
        let Some(rest) = part.strip_prefix('<') else {
            continue;
        };
        let Some(close) = rest.find('>') else {
            continue;
        };
        let target = &rest[..close];
        let Some(rel) = rest[close + 1..].split(';').find_map(|param| {
            let param = param.trim();
            param
                .strip_prefix("rel=")
                .map(|v| v.trim_matches('"').to_string())
        }) else {
            continue;
        };
        out.push(LinkRelation {
            target: target.to_string(),
            rel,
        });
    }
    out
}
