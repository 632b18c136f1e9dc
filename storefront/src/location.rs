//! The storefront page address and its query parameters.

use reqwest::Url;
use std::fmt;

/// One-shot flag appended by the server after a successful purchase
pub const PURCHASE_SUCCESS_PARAM: &str = "compra_exitosa";

/// Range page selector
pub const RANGE_PARAM: &str = "rango";

/// Address of the storefront page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    url: Url,
}

impl PageLocation {
    /// Wrap an absolute page URL
    #[must_use]
    pub const fn new(url: Url) -> Self {
        Self { url }
    }

    /// Parse an absolute page URL
    ///
    /// # Errors
    ///
    /// Returns the parser message if `raw` is not an absolute URL.
    pub fn parse(raw: &str) -> Result<Self, String> {
        Url::parse(raw).map(Self::new).map_err(|e| e.to_string())
    }

    /// Resolve `path` (which may carry a query) against `base`
    ///
    /// # Errors
    ///
    /// Returns the parser message if the result is not a valid URL.
    pub fn resolve(base: &Url, path: &str) -> Result<Self, String> {
        base.join(path).map(Self::new).map_err(|e| e.to_string())
    }

    /// Whether the page was reached right after a successful purchase
    #[must_use]
    pub fn purchase_succeeded(&self) -> bool {
        self.url
            .query_pairs()
            .any(|(key, value)| key == PURCHASE_SUCCESS_PARAM && value == "true")
    }

    /// The same address without the purchase flag; other parameters are kept
    #[must_use]
    pub fn without_purchase_flag(&self) -> Self {
        self.with_pairs(|key| key != PURCHASE_SUCCESS_PARAM, None)
    }

    /// The `rango` value, if any
    #[must_use]
    pub fn range_param(&self) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == RANGE_PARAM)
            .map(|(_, value)| value.into_owned())
    }

    /// The same address showing range `label`
    #[must_use]
    pub fn with_range(&self, label: &str) -> Self {
        self.with_pairs(|key| key != RANGE_PARAM, Some((RANGE_PARAM, label)))
    }

    /// Path and query, as shown in the address bar
    #[must_use]
    pub fn address(&self) -> String {
        match self.url.query() {
            Some(query) => format!("{}?{query}", self.url.path()),
            None => self.url.path().to_string(),
        }
    }

    /// Full URL
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    fn with_pairs(&self, keep: impl Fn(&str) -> bool, extra: Option<(&str, &str)>) -> Self {
        let mut pairs: Vec<(String, String)> = self
            .url
            .query_pairs()
            .filter(|(key, _)| keep(key))
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        if let Some((key, value)) = extra {
            pairs.push((key.to_string(), value.to_string()));
        }

        let mut url = self.url.clone();
        if pairs.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(pairs);
        }
        Self { url }
    }
}

impl fmt::Display for PageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
