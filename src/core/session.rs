use crate::core::navigation::NavState;
use crate::core::AuthBackend;
use crate::domain::model::{Address, AddressDraft, NewAccount, Role, User};
use crate::utils::error::{MarketError, Result};
use crate::utils::validation::{require_email, require_min_length, require_non_empty, Validate};
use std::future::Future;
use std::time::Duration;

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 2,
            delay: Duration::from_millis(250),
        }
    }
}

/// 重試暫時性錯誤，其他錯誤直接回傳
async fn with_retry<T, F, Fut>(policy: &RetryPolicy, operation: &str, mut call: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match call().await {
            Err(e) if e.is_retryable() && attempt < policy.attempts => {
                attempt += 1;
                tracing::warn!(
                    "🔄 {} failed ({}), retry {}/{} in {:?}",
                    operation,
                    e,
                    attempt,
                    policy.attempts,
                    policy.delay
                );
                tokio::time::sleep(policy.delay).await;
            }
            other => return other,
        }
    }
}

impl Validate for AddressDraft {
    fn validate(&self) -> Result<()> {
        require_non_empty("street", &self.street)?;
        require_non_empty("city", &self.city)?;
        require_non_empty("state", &self.state)?;

        let zip = self.zip_code.trim();
        if !(4..=10).contains(&zip.len()) || !zip.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(MarketError::validation(format!(
                "'{}' is not a valid zip code",
                self.zip_code
            )));
        }

        if !self.coordinates.is_valid() {
            return Err(MarketError::validation("coordinates out of range"));
        }
        Ok(())
    }
}

/// 目前登入者的狀態。以值的方式傳遞給需要的元件，不使用全域變數。
pub struct Session<B: AuthBackend> {
    backend: B,
    retry: RetryPolicy,
    user: Option<User>,
    loading: bool,
}

impl<B: AuthBackend> Session<B> {
    pub fn new(backend: B) -> Self {
        Self::with_retry_policy(backend, RetryPolicy::default())
    }

    pub fn with_retry_policy(backend: B, retry: RetryPolicy) -> Self {
        Self {
            backend,
            retry,
            user: None,
            loading: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    pub fn nav_state(&self) -> NavState {
        NavState::resolve(self.loading, self.is_authenticated(), self.role())
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<&User> {
        require_email(email)?;
        require_non_empty("password", password)?;

        let email = email.trim();
        let backend = &self.backend;
        self.loading = true;
        let outcome = with_retry(&self.retry, "login", || backend.authenticate(email, password)).await;
        self.loading = false;

        let user = outcome?;
        tracing::info!("✅ {} signed in as {}", user.email, user.role);
        Ok(&*self.user.insert(user))
    }

    pub async fn register(
        &mut self,
        email: &str,
        password: &str,
        name: &str,
        role: Role,
    ) -> Result<&User> {
        require_non_empty("name", name)?;
        require_email(email)?;
        require_min_length("password", password, MIN_PASSWORD_LENGTH)?;

        let account = NewAccount {
            email: email.trim().to_string(),
            password: password.to_string(),
            name: name.trim().to_string(),
            role,
        };

        let backend = &self.backend;
        self.loading = true;
        let outcome = with_retry(&self.retry, "register", || {
            backend.create_account(account.clone())
        })
        .await;
        self.loading = false;

        let user = outcome?;
        tracing::info!("✅ Registered {} ({})", user.email, user.role);
        Ok(&*self.user.insert(user))
    }

    /// 註冊表單：先確認兩次密碼一致
    pub async fn register_with_confirmation(
        &mut self,
        email: &str,
        password: &str,
        confirm_password: &str,
        name: &str,
        role: Role,
    ) -> Result<&User> {
        if password != confirm_password {
            return Err(MarketError::validation("passwords do not match"));
        }
        self.register(email, password, name, role).await
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            tracing::info!("👋 {} signed out", user.email);
        }
    }

    pub async fn update_profile(&mut self, name: &str, phone: Option<&str>) -> Result<&User> {
        require_non_empty("name", name)?;
        let mut user = self.signed_in_user()?;
        user.name = name.trim().to_string();
        user.phone = phone.map(str::trim).filter(|p| !p.is_empty()).map(String::from);
        self.commit(user).await?;
        self.signed_in()
    }

    pub fn default_address(&self) -> Option<&Address> {
        self.user
            .as_ref()
            .and_then(|u| u.addresses.iter().find(|a| a.is_default))
    }

    pub async fn add_address(&mut self, draft: AddressDraft) -> Result<Address> {
        draft.validate()?;
        let mut user = self.signed_in_user()?;

        // 第一筆地址一定是預設地址
        let make_default = draft.is_default || user.addresses.is_empty();
        if make_default {
            user.addresses.iter_mut().for_each(|a| a.is_default = false);
        }

        let address = Address {
            id: next_address_id(&user),
            street: draft.street.trim().to_string(),
            city: draft.city.trim().to_string(),
            state: draft.state.trim().to_string(),
            zip_code: draft.zip_code.trim().to_string(),
            is_default: make_default,
            coordinates: draft.coordinates,
        };
        user.addresses.push(address.clone());

        self.commit(user).await?;
        tracing::debug!("Added address {}", address.id);
        Ok(address)
    }

    pub async fn update_address(&mut self, id: &str, draft: AddressDraft) -> Result<Address> {
        draft.validate()?;
        let mut user = self.signed_in_user()?;
        let index = address_index(&user, id)?;

        if user.addresses[index].is_default && !draft.is_default {
            return Err(MarketError::conflict(
                "the default address cannot be unset, choose another default instead",
            ));
        }
        if draft.is_default {
            user.addresses.iter_mut().for_each(|a| a.is_default = false);
        }

        let address = &mut user.addresses[index];
        address.street = draft.street.trim().to_string();
        address.city = draft.city.trim().to_string();
        address.state = draft.state.trim().to_string();
        address.zip_code = draft.zip_code.trim().to_string();
        address.is_default = draft.is_default;
        address.coordinates = draft.coordinates;
        let updated = address.clone();

        self.commit(user).await?;
        Ok(updated)
    }

    pub async fn delete_address(&mut self, id: &str) -> Result<()> {
        let mut user = self.signed_in_user()?;
        let index = address_index(&user, id)?;

        if user.addresses[index].is_default && user.addresses.len() > 1 {
            return Err(MarketError::conflict(
                "cannot delete the default address while other addresses exist",
            ));
        }
        user.addresses.remove(index);

        self.commit(user).await?;
        tracing::debug!("Deleted address {}", id);
        Ok(())
    }

    pub async fn set_default_address(&mut self, id: &str) -> Result<()> {
        let mut user = self.signed_in_user()?;
        address_index(&user, id)?;
        user.addresses
            .iter_mut()
            .for_each(|a| a.is_default = a.id == id);
        self.commit(user).await
    }

    fn signed_in(&self) -> Result<&User> {
        self.user
            .as_ref()
            .ok_or_else(|| MarketError::validation("not signed in"))
    }

    fn signed_in_user(&self) -> Result<User> {
        self.signed_in().cloned()
    }

    /// 先寫入後端，成功後才替換記憶體中的使用者
    async fn commit(&mut self, updated: User) -> Result<()> {
        let backend = &self.backend;
        self.loading = true;
        let outcome = with_retry(&self.retry, "save_user", || backend.save_user(&updated)).await;
        self.loading = false;

        outcome?;
        self.user = Some(updated);
        Ok(())
    }
}

fn address_index(user: &User, id: &str) -> Result<usize> {
    user.addresses
        .iter()
        .position(|a| a.id == id)
        .ok_or_else(|| MarketError::not_found("Address", id))
}

fn next_address_id(user: &User) -> String {
    let next = user
        .addresses
        .iter()
        .filter_map(|a| a.id.strip_prefix("addr-")?.parse::<u64>().ok())
        .max()
        .unwrap_or(0)
        + 1;
    format!("addr-{}", next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Coordinates;

    fn draft(street: &str) -> AddressDraft {
        AddressDraft {
            street: street.to_string(),
            city: "Ciudad de México".to_string(),
            state: "CDMX".to_string(),
            zip_code: "06000".to_string(),
            is_default: false,
            coordinates: Coordinates {
                latitude: 19.4326,
                longitude: -99.1332,
            },
        }
    }

    #[test]
    fn test_address_draft_validation() {
        assert!(draft("Calle Principal 123").validate().is_ok());
        assert!(draft("  ").validate().is_err());

        let mut bad_zip = draft("Calle Principal 123");
        bad_zip.zip_code = "06-000".to_string();
        assert!(bad_zip.validate().is_err());

        let mut bad_coords = draft("Calle Principal 123");
        bad_coords.coordinates.latitude = 120.0;
        assert!(bad_coords.validate().is_err());
    }

    #[test]
    fn test_next_address_id_skips_foreign_ids() {
        let mut user = User {
            id: "u1".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            role: Role::Client,
            addresses: vec![],
            phone: None,
        };
        assert_eq!(next_address_id(&user), "addr-1");

        for id in ["addr-3", "legacy"] {
            user.addresses.push(Address {
                id: id.to_string(),
                street: "x".to_string(),
                city: "x".to_string(),
                state: "x".to_string(),
                zip_code: "00000".to_string(),
                is_default: false,
                coordinates: Coordinates {
                    latitude: 0.0,
                    longitude: 0.0,
                },
            });
        }
        assert_eq!(next_address_id(&user), "addr-4");
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_policy_attempts() {
        let policy = RetryPolicy {
            attempts: 2,
            delay: Duration::from_millis(1),
        };
        let mut calls = 0;
        let result: Result<()> = with_retry(&policy, "probe", || {
            calls += 1;
            async { Err(MarketError::transient("timeout")) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_retry_does_not_repeat_validation_errors() {
        let policy = RetryPolicy::default();
        let mut calls = 0;
        let result: Result<()> = with_retry(&policy, "probe", || {
            calls += 1;
            async { Err(MarketError::validation("bad")) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
