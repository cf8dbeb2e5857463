//! PostgREST-backed ledger store.
//!
//! Talks to a Supabase-style REST facade over the relational store. Row
//! filtering uses PostgREST's `column=eq.value` query syntax; the atomic
//! credit decrement is a stored procedure invoked through `/rpc/`, so the
//! decrement-if-positive happens server-side in one statement.

use super::error::StoreError;
use super::types::{ApiKeyRecord, KeyStatus, Plan, PromptHistoryEntry, TransactionEntry, UserRecord};
use super::LedgerStore;
use crate::genai::GenerationKind;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Ledger store over a PostgREST endpoint.
pub struct RestStore {
    base_url: String,
    service_key: String,
    client: Arc<Client>,
}

/// Wire row for the `enabled_apis` table (original column names).
#[derive(Debug, Serialize, Deserialize)]
struct KeyRow {
    uid: String,
    api_key: String,
    credits: i64,
    status: KeyStatus,
    account_status: Plan,
}

impl From<KeyRow> for ApiKeyRecord {
    fn from(row: KeyRow) -> Self {
        ApiKeyRecord {
            owner_id: row.uid,
            key: row.api_key,
            credits: row.credits.max(0) as u32,
            status: row.status,
            plan: row.account_status,
        }
    }
}

impl From<&ApiKeyRecord> for KeyRow {
    fn from(record: &ApiKeyRecord) -> Self {
        KeyRow {
            uid: record.owner_id.clone(),
            api_key: record.key.clone(),
            credits: record.credits as i64,
            status: record.status,
            account_status: record.plan,
        }
    }
}

/// Wire row for the `prompt_history` table.
#[derive(Debug, Serialize, Deserialize)]
struct HistoryRow {
    api_key: String,
    #[serde(rename = "type")]
    kind: GenerationKind,
    prompt: String,
    response: String,
    created_at: DateTime<Utc>,
}

/// Wire row for the `transaction_history` table.
#[derive(Debug, Serialize, Deserialize)]
struct TransactionRow {
    transaction_id: String,
    uid: String,
    timestamp: DateTime<Utc>,
    transaction_status: String,
}

/// Wire row for the `users` table.
#[derive(Debug, Serialize, Deserialize)]
struct UserRow {
    uid: String,
    name: String,
    email: String,
    profile_picture: Option<String>,
}

impl RestStore {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>, client: Arc<Client>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            client,
        }
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let url = format!("{}/rest/v1/{}", self.base_url, table);
        self.client
            .request(method, url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        filter: (&str, &str),
    ) -> Result<Vec<T>, StoreError> {
        let response = self
            .request(Method::GET, table)
            .query(&[(filter.0, format!("eq.{}", filter.1)), ("select", "*".to_string())])
            .send()
            .await?;
        let response = check_status(response).await?;
        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))
    }

    async fn patch_rows(
        &self,
        table: &str,
        filter: (&str, &str),
        body: serde_json::Value,
    ) -> Result<(), StoreError> {
        let response = self
            .request(Method::PATCH, table)
            .query(&[(filter.0, format!("eq.{}", filter.1))])
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn insert_row<T: Serialize>(&self, table: &str, row: &T) -> Result<(), StoreError> {
        let response = self.request(Method::POST, table).json(row).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(StoreError::Query {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl LedgerStore for RestStore {
    async fn find_key(&self, key: &str) -> Result<Option<ApiKeyRecord>, StoreError> {
        let rows: Vec<KeyRow> = self.fetch_rows("enabled_apis", ("api_key", key)).await?;
        Ok(rows.into_iter().next().map(Into::into))
    }

    async fn find_key_by_owner(&self, owner_id: &str) -> Result<Option<ApiKeyRecord>, StoreError> {
        let rows: Vec<KeyRow> = self.fetch_rows("enabled_apis", ("uid", owner_id)).await?;
        Ok(rows.into_iter().next().map(Into::into))
    }

    async fn insert_key(&self, record: ApiKeyRecord) -> Result<(), StoreError> {
        self.insert_row("enabled_apis", &KeyRow::from(&record)).await
    }

    async fn disable_key(&self, key: &str) -> Result<(), StoreError> {
        self.patch_rows("enabled_apis", ("api_key", key), json!({ "status": "disabled" }))
            .await
    }

    async fn consume_credit(&self, key: &str) -> Result<Option<u32>, StoreError> {
        let response = self
            .request(Method::POST, "rpc/consume_credit")
            .json(&json!({ "p_api_key": key }))
            .send()
            .await?;
        let response = check_status(response).await?;
        // The procedure returns the remaining balance, or null when the
        // key had no credits left (or does not exist).
        let remaining: Option<i64> = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
        Ok(remaining.map(|n| n.max(0) as u32))
    }

    async fn upgrade_plan(&self, owner_id: &str, credits: u32) -> Result<(), StoreError> {
        self.patch_rows(
            "enabled_apis",
            ("uid", owner_id),
            json!({
                "credits": credits,
                "status": "enabled",
                "account_status": "premium",
            }),
        )
        .await
    }

    async fn append_history(&self, entry: PromptHistoryEntry) -> Result<(), StoreError> {
        let row = HistoryRow {
            api_key: entry.key,
            kind: entry.kind,
            prompt: entry.prompt,
            response: entry.response_ref,
            created_at: entry.created_at,
        };
        self.insert_row("prompt_history", &row).await
    }

    async fn history_for_key(&self, key: &str) -> Result<Vec<PromptHistoryEntry>, StoreError> {
        let rows: Vec<HistoryRow> = self.fetch_rows("prompt_history", ("api_key", key)).await?;
        Ok(rows
            .into_iter()
            .map(|row| PromptHistoryEntry {
                key: row.api_key,
                kind: row.kind,
                prompt: row.prompt,
                response_ref: row.response,
                created_at: row.created_at,
            })
            .collect())
    }

    async fn append_transaction(&self, entry: TransactionEntry) -> Result<(), StoreError> {
        let row = TransactionRow {
            transaction_id: entry.transaction_id,
            uid: entry.owner_id,
            timestamp: entry.timestamp,
            transaction_status: entry.status,
        };
        self.insert_row("transaction_history", &row).await
    }

    async fn transactions_for_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<TransactionEntry>, StoreError> {
        let rows: Vec<TransactionRow> =
            self.fetch_rows("transaction_history", ("uid", owner_id)).await?;
        Ok(rows
            .into_iter()
            .map(|row| TransactionEntry {
                transaction_id: row.transaction_id,
                owner_id: row.uid,
                timestamp: row.timestamp,
                status: row.transaction_status,
            })
            .collect())
    }

    async fn transaction_exists(&self, transaction_id: &str) -> Result<bool, StoreError> {
        let rows: Vec<TransactionRow> = self
            .fetch_rows("transaction_history", ("transaction_id", transaction_id))
            .await?;
        Ok(!rows.is_empty())
    }

    async fn find_user(&self, owner_id: &str) -> Result<Option<UserRecord>, StoreError> {
        let rows: Vec<UserRow> = self.fetch_rows("users", ("uid", owner_id)).await?;
        Ok(rows.into_iter().next().map(|row| UserRecord {
            owner_id: row.uid,
            name: row.name,
            email: row.email,
            picture: row.profile_picture,
        }))
    }

    async fn upsert_user(&self, user: UserRecord) -> Result<UserRecord, StoreError> {
        if let Some(existing) = self.find_user(&user.owner_id).await? {
            return Ok(existing);
        }
        let row = UserRow {
            uid: user.owner_id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            profile_picture: user.picture.clone(),
        };
        self.insert_row("users", &row).await?;
        Ok(user)
    }
}
