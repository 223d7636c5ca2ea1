use super::{ParamStore, QueryParams};
use crate::error::Result;
use std::cell::{Cell, RefCell};
use url::Url;

/// Parameter store backed by a URL.
///
/// Commits rewrite the URL's query component and leave everything else
/// (path, fragment) alone. An empty snapshot removes the `?` entirely.
pub struct UrlParamStore {
    url: RefCell<Url>,
    version: Cell<u64>,
}

impl UrlParamStore {
    pub fn new(url: Url) -> Self {
        Self {
            url: RefCell::new(url),
            version: Cell::new(0),
        }
    }

    pub fn parse(input: &str) -> Result<Self> {
        Ok(Self::new(Url::parse(input)?))
    }

    /// The current URL, e.g. for a share link.
    pub fn url(&self) -> Url {
        self.url.borrow().clone()
    }

    /// Replace the whole URL, as when the user navigates back or follows a
    /// link. Bumps the version so filter sessions know to resync.
    pub fn navigate(&self, url: Url) -> u64 {
        tracing::debug!(%url, "external navigation");
        *self.url.borrow_mut() = url;
        self.bump()
    }

    fn bump(&self) -> u64 {
        let version = self.version.get() + 1;
        self.version.set(version);
        version
    }
}

impl ParamStore for UrlParamStore {
    fn snapshot(&self) -> QueryParams {
        QueryParams::from_pairs(self.url.borrow().query_pairs())
    }

    fn commit(&self, params: QueryParams) -> Result<u64> {
        {
            let mut url = self.url.borrow_mut();
            if params.is_empty() {
                url.set_query(None);
            } else {
                url.set_query(Some(&params.to_query_string()));
            }
        }
        Ok(self.bump())
    }

    fn version(&self) -> u64 {
        self.version.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reads_decoded_query() {
        let store =
            UrlParamStore::parse("https://shop.test/orders?statuses=%7Bcompleted%7D&page=2")
                .unwrap();
        let params = store.snapshot();
        assert_eq!(params.get("statuses"), Some("{completed}"));
        assert_eq!(params.get("page"), Some("2"));
    }

    #[test]
    fn commit_rewrites_only_the_query() {
        let store = UrlParamStore::parse("https://shop.test/orders?page=2#top").unwrap();
        let mut params = store.snapshot();
        params.set("age", "5");
        store.commit(params).unwrap();

        assert_eq!(
            store.url().as_str(),
            "https://shop.test/orders?page=2&age=5#top"
        );
    }

    #[test]
    fn empty_commit_drops_question_mark() {
        let store = UrlParamStore::parse("https://shop.test/orders?age=5").unwrap();
        store.commit(QueryParams::new()).unwrap();
        assert_eq!(store.url().as_str(), "https://shop.test/orders");
    }

    #[test]
    fn navigate_bumps_version() {
        let store = UrlParamStore::parse("https://shop.test/orders").unwrap();
        let next = Url::parse("https://shop.test/orders?age=3").unwrap();
        assert_eq!(store.navigate(next), 1);
        assert_eq!(store.get("age"), Some("3".to_string()));
    }

    #[test]
    fn invalid_url_is_reported() {
        assert!(UrlParamStore::parse("not a url").is_err());
    }
}
