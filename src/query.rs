use url::form_urlencoded;

use crate::zoom::Zoom;

/// The three values carried across a navigation: `n`, `zoom`, `brightness`.
#[derive(Debug, Clone, PartialEq)]
pub struct NavParams {
    /// 1-based, not yet clamped against a gallery.
    pub n: usize,
    pub zoom: Zoom,
    pub brightness: f64,
}

impl Default for NavParams {
    fn default() -> Self {
        Self {
            n: 1,
            zoom: Zoom::default(),
            brightness: 0.0,
        }
    }
}

/// Split a query string into decoded pairs. A leading `?` or `#` is ignored.
pub fn pairs(query: &str) -> Vec<(String, String)> {
    let query = query.trim_start_matches(['?', '#']);
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Leading decimal digits of `value` as an index of at least 1. Trailing
/// text is ignored and values too large for `usize` saturate.
fn leading_index(value: &str) -> usize {
    let value = value.trim_start();
    let digits = value.strip_prefix('+').unwrap_or(value);
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    if end == 0 {
        return 1;
    }
    digits[..end]
        .bytes()
        .fold(0usize, |n, d| n.saturating_mul(10).saturating_add((d - b'0') as usize))
        .max(1)
}

impl NavParams {
    pub fn parse(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs(query) {
            match key.as_str() {
                "n" => params.n = leading_index(&value),
                "zoom" => params.zoom = Zoom::parse(&value),
                "brightness" => {
                    params.brightness = match value.trim().parse::<f64>() {
                        Ok(b) if b.is_finite() => b,
                        _ => 0.0,
                    }
                }
                _ => {}
            }
        }
        params
    }

    pub fn to_query(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("n", &self.n.to_string())
            .append_pair("zoom", &self.zoom.to_param())
            .append_pair("brightness", &self.brightness.to_string())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zoom::ZoomMode;

    #[test]
    fn defaults_when_absent() {
        assert_eq!(NavParams::parse(""), NavParams::default());
    }

    #[test]
    fn garbage_is_defaulted() {
        let p = NavParams::parse("?n=abc&zoom=huge&brightness=bright");
        assert_eq!(p, NavParams::default());
        assert_eq!(NavParams::parse("n=-4").n, 1);
        assert_eq!(NavParams::parse("n=0").n, 1);
    }

    #[test]
    fn index_takes_leading_digits_and_saturates() {
        assert_eq!(NavParams::parse("n=3.7").n, 3);
        assert_eq!(NavParams::parse("n=%2012px").n, 12);
        assert_eq!(NavParams::parse("n=99999999999999999999").n, usize::MAX);
        assert_eq!(NavParams::parse("n=-0").n, 1);
    }

    #[test]
    fn fragment_style_and_modes() {
        let p = NavParams::parse("#zoom=fit&n=3&brightness=0.5&extra=1");
        assert_eq!(p.n, 3);
        assert_eq!(p.zoom.mode, ZoomMode::Fit);
        assert_eq!(p.brightness, 0.5);
    }

    #[test]
    fn query_is_read_back_identically() {
        let p = NavParams {
            n: 7,
            zoom: Zoom::manual(1.375),
            brightness: -0.25,
        };
        assert_eq!(p.to_query(), "n=7&zoom=1.375&brightness=-0.25");
        assert_eq!(NavParams::parse(&p.to_query()), p);
    }
}
