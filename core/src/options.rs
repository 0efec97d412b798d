//! Per-call query parameters and extra headers.

/// Query pairs and headers attached to a single request.
///
/// Both lists keep insertion order. A query pair whose value is `None` is
/// carried here but never reaches the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub(crate) query: Vec<(String, Option<String>)>,
    pub(crate) headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.query.push((key.into(), value.map(|v| v.to_string())));
        self
    }

    pub fn queries<K, V, I>(mut self, pairs: I) -> Self
    where
        K: Into<String>,
        V: ToString,
        I: IntoIterator<Item = (K, Option<V>)>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.map(|v| v.to_string()))));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers<K, V, I>(mut self, pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.headers
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Pairs that will actually be sent.
    pub(crate) fn present_query(&self) -> impl Iterator<Item = (&str, &str)> {
        self.query
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_values_are_filtered() {
        let opts = RequestOptions::new()
            .query("page", Some(2))
            .query("filter", None::<&str>)
            .query("q", Some("rust"));
        let sent: Vec<_> = opts.present_query().collect();
        assert_eq!(sent, vec![("page", "2"), ("q", "rust")]);
    }

    #[test]
    fn bulk_builders_preserve_order() {
        let opts = RequestOptions::new()
            .queries([("a", Some(1)), ("b", None), ("c", Some(3))])
            .headers([("X-One", "1"), ("X-Two", "2")]);
        assert_eq!(opts.present_query().count(), 2);
        assert_eq!(opts.headers[0], ("X-One".to_string(), "1".to_string()));
        assert_eq!(opts.headers[1], ("X-Two".to_string(), "2".to_string()));
    }
}
