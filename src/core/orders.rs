use crate::domain::model::{Address, OrderStatus, Role, ServiceListing, ServiceRequest, User};
use crate::utils::error::{MarketError, Result};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 服務提供者「我的訂單」畫面的分頁
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderOrderTab {
    Pending,
    Active,
    Completed,
}

impl ProviderOrderTab {
    pub fn includes(self, status: OrderStatus) -> bool {
        match self {
            ProviderOrderTab::Pending => {
                matches!(status, OrderStatus::Pending | OrderStatus::CounterOffer)
            }
            ProviderOrderTab::Active => status == OrderStatus::Accepted,
            ProviderOrderTab::Completed => status.is_final(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderRequest<'a> {
    pub client: &'a User,
    pub provider_id: &'a str,
    pub listing: &'a ServiceListing,
    pub address: &'a Address,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub notes: Option<String>,
}

#[derive(Debug, Default)]
pub struct OrderBook {
    requests: Vec<ServiceRequest>,
    next_id: u64,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// 還原既有的訂單；id 重複時拒絕整批
    pub fn from_requests(requests: Vec<ServiceRequest>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(requests.len());
        for request in &requests {
            if !seen.insert(request.id.as_str()) {
                return Err(MarketError::conflict(format!(
                    "duplicate request id '{}'",
                    request.id
                )));
            }
        }

        let next_id = requests
            .iter()
            .filter_map(|r| r.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Ok(Self { requests, next_id })
    }

    pub fn place(&mut self, order: OrderRequest<'_>) -> Result<&ServiceRequest> {
        if order.client.role != Role::Client {
            return Err(MarketError::validation("only clients can request services"));
        }
        if order.provider_id.trim().is_empty() {
            return Err(MarketError::validation("provider id cannot be empty"));
        }
        if !order.client.addresses.iter().any(|a| a.id == order.address.id) {
            return Err(MarketError::not_found("Address", order.address.id.clone()));
        }

        self.next_id += 1;
        let request = ServiceRequest {
            id: self.next_id.to_string(),
            listing_id: order.listing.id.clone(),
            service_name: order.listing.name.clone(),
            client_id: order.client.id.clone(),
            client_name: order.client.name.clone(),
            provider_id: order.provider_id.to_string(),
            provider_name: order.listing.provider_name.clone(),
            date: order.date,
            time: order.time,
            status: OrderStatus::Pending,
            price: order.listing.price,
            address_line: order.address.one_line(),
            notes: order.notes,
        };
        tracing::info!(
            "📝 Order {} placed by {} for '{}'",
            request.id,
            request.client_id,
            request.service_name
        );
        self.requests.push(request);
        Ok(&self.requests[self.requests.len() - 1])
    }

    pub fn get(&self, id: &str) -> Result<&ServiceRequest> {
        self.requests
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| MarketError::not_found("Order", id))
    }

    pub fn for_client(&self, client_id: &str) -> Vec<&ServiceRequest> {
        self.requests
            .iter()
            .filter(|r| r.client_id == client_id)
            .collect()
    }

    pub fn for_provider(&self, provider_id: &str) -> Vec<&ServiceRequest> {
        self.requests
            .iter()
            .filter(|r| r.provider_id == provider_id)
            .collect()
    }

    pub fn provider_tab(&self, provider_id: &str, tab: ProviderOrderTab) -> Vec<&ServiceRequest> {
        self.requests
            .iter()
            .filter(|r| r.provider_id == provider_id && tab.includes(r.status))
            .collect()
    }

    pub fn accept(&mut self, id: &str, provider: &User) -> Result<&ServiceRequest> {
        self.transition(id, provider, Role::Provider, &[OrderStatus::Pending], |r| {
            r.status = OrderStatus::Accepted;
        })
    }

    pub fn reject(&mut self, id: &str, provider: &User) -> Result<&ServiceRequest> {
        self.transition(id, provider, Role::Provider, &[OrderStatus::Pending], |r| {
            r.status = OrderStatus::Rejected;
        })
    }

    pub fn counter_offer(&mut self, id: &str, provider: &User, price: f64) -> Result<&ServiceRequest> {
        if !price.is_finite() || price <= 0.0 {
            return Err(MarketError::validation(format!(
                "counter offer must be a positive amount, got {}",
                price
            )));
        }
        self.transition(id, provider, Role::Provider, &[OrderStatus::Pending], |r| {
            r.status = OrderStatus::CounterOffer;
            r.price = price;
        })
    }

    pub fn accept_counter_offer(&mut self, id: &str, client: &User) -> Result<&ServiceRequest> {
        self.transition(id, client, Role::Client, &[OrderStatus::CounterOffer], |r| {
            r.status = OrderStatus::Accepted;
        })
    }

    pub fn complete(&mut self, id: &str, provider: &User) -> Result<&ServiceRequest> {
        self.transition(id, provider, Role::Provider, &[OrderStatus::Accepted], |r| {
            r.status = OrderStatus::Completed;
        })
    }

    pub fn cancel(&mut self, id: &str, client: &User) -> Result<&ServiceRequest> {
        self.transition(
            id,
            client,
            Role::Client,
            &[
                OrderStatus::Pending,
                OrderStatus::Accepted,
                OrderStatus::CounterOffer,
            ],
            |r| r.status = OrderStatus::Cancelled,
        )
    }

    fn transition<F>(
        &mut self,
        id: &str,
        actor: &User,
        role: Role,
        allowed_from: &[OrderStatus],
        apply: F,
    ) -> Result<&ServiceRequest>
    where
        F: FnOnce(&mut ServiceRequest),
    {
        let request = self
            .requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| MarketError::not_found("Order", id))?;

        let owner = match role {
            Role::Client => &request.client_id,
            Role::Provider => &request.provider_id,
        };
        if actor.role != role || *owner != actor.id {
            return Err(MarketError::validation(format!(
                "{} {} cannot act on order {}",
                actor.role, actor.id, id
            )));
        }

        if !allowed_from.contains(&request.status) {
            return Err(MarketError::conflict(format!(
                "order {} is {}",
                id,
                request.status.label()
            )));
        }

        let previous = request.status;
        apply(&mut *request);
        tracing::info!(
            "Order {}: {:?} -> {:?} by {}",
            id,
            previous,
            request.status,
            actor.id
        );
        Ok(&*request)
    }
}
