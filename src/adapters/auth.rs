use crate::core::{AuthBackend, User};
use crate::domain::model::{NewAccount, Role};
use crate::utils::error::{MarketError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct Account {
    password: String,
    user: User,
}

/// 記憶體內的帳號後端，供示範與測試使用
#[derive(Debug, Default)]
pub struct InMemoryAuthBackend {
    accounts: Mutex<HashMap<String, Account>>,
    next_id: AtomicU64,
    pending_failures: AtomicU32,
}

pub const DEMO_PASSWORD: &str = "123456";
pub const DEMO_CLIENT_EMAIL: &str = "cliente@example.com";
pub const DEMO_PROVIDER_EMAIL: &str = "proveedor@example.com";

impl InMemoryAuthBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 預先建立一個客戶與一個服務提供者
    pub fn with_demo_accounts() -> Self {
        let backend = Self::new();
        let mut accounts = HashMap::new();
        for (email, name, role) in [
            (DEMO_CLIENT_EMAIL, "María García", Role::Client),
            (DEMO_PROVIDER_EMAIL, "Juan Pérez", Role::Provider),
        ] {
            let user = User {
                id: backend.allocate_id(),
                name: name.to_string(),
                email: email.to_string(),
                role,
                addresses: Vec::new(),
                phone: None,
            };
            accounts.insert(
                email.to_string(),
                Account {
                    password: DEMO_PASSWORD.to_string(),
                    user,
                },
            );
        }
        Self {
            accounts: Mutex::new(accounts),
            ..backend
        }
    }

    /// 讓接下來 `count` 次呼叫回傳暫時性錯誤
    pub fn fail_next(&self, count: u32) {
        self.pending_failures.store(count, Ordering::SeqCst);
    }

    pub async fn stored_user(&self, email: &str) -> Option<User> {
        let accounts = self.accounts.lock().await;
        accounts.get(&normalize(email)).map(|a| a.user.clone())
    }

    fn allocate_id(&self) -> String {
        format!("user-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn check_injected_failure(&self) -> Result<()> {
        let consumed = self
            .pending_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if consumed.is_ok() {
            return Err(MarketError::transient("simulated backend timeout"));
        }
        Ok(())
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl AuthBackend for InMemoryAuthBackend {
    async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        self.check_injected_failure()?;
        let accounts = self.accounts.lock().await;
        match accounts.get(&normalize(email)) {
            Some(account) if account.password == password => Ok(account.user.clone()),
            _ => {
                tracing::debug!("Rejected credentials for {}", email);
                Err(MarketError::validation("invalid email or password"))
            }
        }
    }

    async fn create_account(&self, account: NewAccount) -> Result<User> {
        self.check_injected_failure()?;
        let key = normalize(&account.email);
        let mut accounts = self.accounts.lock().await;
        if accounts.contains_key(&key) {
            return Err(MarketError::conflict(format!(
                "an account for {} already exists",
                account.email
            )));
        }

        let user = User {
            id: self.allocate_id(),
            name: account.name,
            email: key.clone(),
            role: account.role,
            addresses: Vec::new(),
            phone: None,
        };
        accounts.insert(
            key,
            Account {
                password: account.password,
                user: user.clone(),
            },
        );
        Ok(user)
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        self.check_injected_failure()?;
        let mut accounts = self.accounts.lock().await;
        let account = accounts
            .values_mut()
            .find(|a| a.user.id == user.id)
            .ok_or_else(|| MarketError::not_found("User", user.id.clone()))?;
        account.user = user.clone();
        Ok(())
    }
}
