use crate::domain::model::{NewAccount, RawListing, User};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 目錄資料來源：只負責讀取，正規化在 `Catalog` 進行
pub trait CatalogSource {
    fn load(&self) -> Result<Vec<RawListing>>;
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn authenticate(&self, email: &str, password: &str) -> Result<User>;
    async fn create_account(&self, account: NewAccount) -> Result<User>;
    async fn save_user(&self, user: &User) -> Result<()>;
}
