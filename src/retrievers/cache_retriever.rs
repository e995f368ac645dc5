use crate::auth_headers::AuthHeaders;
use crate::token_cache::TokenCache;
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use super::token_retriever::TokenRetriever;

#[derive(Error, Debug)]
pub enum RetrieverError {
    #[error("Headers not found in the token cache")]
    NotFound,
}

pub struct CacheRetriever<'a> {
    cache: &'a dyn TokenCache,
    key: &'a str,
}

impl<'a> CacheRetriever<'a> {
    pub fn new(cache: &'a dyn TokenCache, key: &'a str) -> CacheRetriever<'a> {
        CacheRetriever { cache, key }
    }
}

#[async_trait(?Send)]
impl TokenRetriever for CacheRetriever<'_> {
    async fn retrieve(&mut self) -> Result<AuthHeaders> {
        match self.cache.get(self.key).await? {
            Some(headers) if !headers.is_empty() => Ok(headers),
            _ => Err(RetrieverError::NotFound.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token_cache::MemoryTokenCache;
    use std::time::Duration;

    #[tokio::test]
    async fn it_returns_cached_headers() {
        let cache = MemoryTokenCache::new();
        cache
            .set("key", &AuthHeaders::bearer("cached"), Duration::from_secs(60))
            .await
            .unwrap();

        let headers = CacheRetriever::new(&cache, "key").retrieve().await.unwrap();

        assert_eq!(headers, AuthHeaders::bearer("cached"));
    }

    #[tokio::test]
    async fn it_fails_on_missing_or_empty_headers() {
        let cache = MemoryTokenCache::new();
        cache
            .set("empty", &AuthHeaders::default(), Duration::from_secs(60))
            .await
            .unwrap();

        for key in ["missing", "empty"] {
            let err = CacheRetriever::new(&cache, key).retrieve().await.unwrap_err();

            assert!(matches!(
                err.downcast_ref::<RetrieverError>(),
                Some(RetrieverError::NotFound)
            ));
        }
    }
}
