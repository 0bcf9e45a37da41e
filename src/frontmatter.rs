//! Front-matter splitting and joining for markdown content.
//!
//! The on-disk format is an optional leading `---` block of YAML key/value
//! lines, closed by `---` and a blank line, followed by the body. A missing
//! block means "no metadata". Split and join are a lossless round trip for
//! representable scalar values.

use crate::error::Result;
use serde_yaml::Mapping;

const DELIMITER: &str = "---";

/// Split raw content into its metadata mapping and body.
///
/// Content without a leading `---` line (or with an unterminated block) is
/// returned whole as the body with an empty mapping. A present block with
/// malformed YAML is an error.
pub fn split(raw: &str) -> Result<(Mapping, String)> {
    if !raw.starts_with("---\n") {
        return Ok((Mapping::new(), raw.to_string()));
    }
    // Search from the newline ending the opening line so an immediately
    // following close ("---\n---\n") is still found.
    let (yaml, body) = if let Some(pos) = raw[3..].find("\n---\n").map(|p| p + 3) {
        let body = &raw[pos + 5..];
        // One blank line separates the block from the body.
        (&raw[4..pos + 1], body.strip_prefix('\n').unwrap_or(body))
    } else if let Some(head) = raw.strip_suffix("\n---") {
        (head.get(4..).unwrap_or(""), "")
    } else {
        return Ok((Mapping::new(), raw.to_string()));
    };
    let meta = if yaml.trim().is_empty() {
        Mapping::new()
    } else {
        serde_yaml::from_str(yaml)?
    };
    Ok((meta, body.to_string()))
}

/// Join a metadata mapping and body back into raw content.
///
/// An empty mapping yields the body unchanged.
pub fn join(meta: &Mapping, body: &str) -> Result<String> {
    if meta.is_empty() {
        return Ok(body.to_string());
    }
    let yaml = serde_yaml::to_string(meta)?;
    Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n\n{body}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;

    fn meta(pairs: &[(&str, Value)]) -> Mapping {
        pairs
            .iter()
            .map(|(k, v)| (Value::String(k.to_string()), v.clone()))
            .collect()
    }

    #[test]
    fn test_split_without_block() {
        let (m, body) = split("plain\ncontent\n").unwrap();
        assert!(m.is_empty());
        assert_eq!(body, "plain\ncontent\n");
    }

    #[test]
    fn test_split_with_block() {
        let (m, body) = split("---\ntitle: Home\ncount: 3\n---\n\nbody text\n").unwrap();
        assert_eq!(m, meta(&[("title", "Home".into()), ("count", 3.into())]));
        assert_eq!(body, "body text\n");
    }

    #[test]
    fn test_split_empty_block() {
        let (m, body) = split("---\n---\n\nbody").unwrap();
        assert!(m.is_empty());
        assert_eq!(body, "body");
    }

    #[test]
    fn test_unterminated_block_is_body() {
        let raw = "---\ntitle: Home\nno closing delimiter";
        let (m, body) = split(raw).unwrap();
        assert!(m.is_empty());
        assert_eq!(body, raw);
    }

    #[test]
    fn test_malformed_yaml_errors() {
        assert!(split("---\n{not yaml\n---\n\nbody").is_err());
    }

    #[test]
    fn test_round_trip() {
        let m = meta(&[("a", 1.into()), ("b", "x".into())]);
        let joined = join(&m, "body").unwrap();
        let (back_meta, back_body) = split(&joined).unwrap();
        assert_eq!(back_meta, m);
        assert_eq!(back_body, "body");
    }

    #[test]
    fn test_join_empty_meta_is_identity() {
        assert_eq!(join(&Mapping::new(), "body\n").unwrap(), "body\n");
    }
}
