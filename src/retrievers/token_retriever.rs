use anyhow::Result;
use async_trait::async_trait;

use crate::auth_headers::AuthHeaders;

#[async_trait(?Send)]
pub trait TokenRetriever {
    async fn retrieve(&mut self) -> Result<AuthHeaders>;
}
