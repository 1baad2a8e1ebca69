//! Root-relative rewrite of proxied HTML.
//!
//! Removes every literal occurrence of a mirror's origin from a body, so that
//! `https://mirror.example/app.js` becomes `/app.js` when served through the
//! proxy. This is plain substring removal with no HTML awareness: matches
//! inside inline scripts, comments or unrelated text are removed as well, and
//! the output is meant to be compared byte for byte.

use axum::body::Bytes;
use regex::bytes::Regex;

/// Pre-compiled literal matcher for one origin.
#[derive(Debug, Clone)]
pub struct ResponseRewriter {
    pattern: Regex,
}

impl ResponseRewriter {
    /// Compile a rewriter for `origin`. Regex metacharacters in the origin are
    /// escaped, so the match is always literal.
    pub fn for_origin(origin: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&regex::escape(origin))?;
        Ok(Self { pattern })
    }

    /// Strip all occurrences of the origin. Works on raw bytes, so bodies that
    /// are not valid UTF-8 are left otherwise untouched.
    pub fn rewrite(&self, body: Bytes) -> Bytes {
        if !self.pattern.is_match(&body) {
            return body;
        }
        Bytes::from(self.pattern.replace_all(&body, &b""[..]).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://mirror.example";

    fn rewrite(body: Bytes, origin: &str) -> Result<Bytes, regex::Error> {
        Ok(ResponseRewriter::for_origin(origin)?.rewrite(body))
    }

    fn occurrences(haystack: &[u8], needle: &str) -> usize {
        haystack
            .windows(needle.len())
            .filter(|w| *w == needle.as_bytes())
            .count()
    }

    #[test]
    fn test_removes_every_occurrence() {
        let html = format!(
            r#"<a href="{o}/a">a</a><img src="{o}/b.png"><script>fetch("{o}/api")</script>"#,
            o = ORIGIN
        );
        assert_eq!(occurrences(html.as_bytes(), ORIGIN), 3);

        let out = rewrite(Bytes::from(html), ORIGIN).unwrap();
        assert_eq!(occurrences(&out, ORIGIN), 0);
        assert_eq!(
            &out[..],
            br#"<a href="/a">a</a><img src="/b.png"><script>fetch("/api")</script>"#
        );
    }

    #[test]
    fn test_no_occurrence_is_noop() {
        let html = Bytes::from_static(b"<p>https://other.example/x</p>");
        let out = rewrite(html.clone(), ORIGIN).unwrap();
        assert_eq!(out, html);
    }

    #[test]
    fn test_origin_is_matched_literally() {
        // '.' must not match arbitrary characters
        let html = Bytes::from_static(b"https://mirrorXexample/page https://mirror.example/page");
        let out = rewrite(html, ORIGIN).unwrap();
        assert_eq!(&out[..], b"https://mirrorXexample/page /page");

        let weird = "http://a.example/(x)+?[y]";
        let html = Bytes::from(format!("<{weird}>"));
        let out = rewrite(html, weird).unwrap();
        assert_eq!(&out[..], b"<>");
    }

    #[test]
    fn test_substring_collisions_are_removed_too() {
        // Known limitation: longer hosts sharing the prefix get truncated.
        let html = Bytes::from_static(b"https://mirror.example.org/x");
        let out = rewrite(html, ORIGIN).unwrap();
        assert_eq!(&out[..], b".org/x");
    }

    #[test]
    fn test_non_utf8_bytes_survive() {
        let mut body = vec![0xff, 0xfe];
        body.extend_from_slice(ORIGIN.as_bytes());
        body.extend_from_slice(b"/z");
        let out = rewrite(Bytes::from(body), ORIGIN).unwrap();
        assert_eq!(&out[..], &[0xff, 0xfe, b'/', b'z']);
    }
}
