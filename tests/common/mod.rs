#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use pharmacy_price_sync::database::Database;
use pharmacy_price_sync::models::PharmacyLink;
use pharmacy_price_sync::scrapers::FetchError;
use pharmacy_price_sync::traits::{LinkStore, PageFetcher};
use reqwest::StatusCode;

#[derive(Clone)]
pub enum Page {
    Body(String),
    Status(u16),
    Timeout,
    /// Times out `n` times, then serves the body
    Flaky(usize, String),
}

/// Serves canned pages and records every URL requested
#[derive(Clone, Default)]
pub struct StubFetcher {
    pages: Arc<Mutex<HashMap<String, Page>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, url: &str, page: Page) {
        self.pages.lock().unwrap().insert(url.to_string(), page);
    }

    pub fn body(&self, url: &str, html: &str) {
        self.serve(url, Page::Body(html.to_string()));
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());

        let mut pages = self.pages.lock().unwrap();
        match pages.get_mut(url) {
            Some(Page::Body(html)) => Ok(html.clone()),
            Some(Page::Status(code)) => Err(FetchError::Status(
                StatusCode::from_u16(*code).unwrap(),
            )),
            Some(Page::Timeout) => Err(FetchError::Timeout),
            Some(Page::Flaky(remaining, html)) => {
                if *remaining == 0 {
                    Ok(html.clone())
                } else {
                    *remaining -= 1;
                    Err(FetchError::Timeout)
                }
            }
            None => Err(FetchError::Status(StatusCode::NOT_FOUND)),
        }
    }
}

/// Store whose link query always fails
pub struct UnreachableStore;

#[async_trait]
impl LinkStore for UnreachableStore {
    async fn active_links(&self) -> Result<Vec<PharmacyLink>> {
        Err(anyhow!("connection refused"))
    }

    async fn update_prices(&self, _: &str, _: Option<i64>, _: Option<i64>) -> Result<()> {
        unreachable!("no links to update")
    }
}

/// Wraps a database and rejects writes to one link id
pub struct RejectingStore {
    pub inner: Database,
    pub reject_id: String,
}

#[async_trait]
impl LinkStore for RejectingStore {
    async fn active_links(&self) -> Result<Vec<PharmacyLink>> {
        self.inner.active_links().await
    }

    async fn update_prices(&self, id: &str, regular: Option<i64>, sale: Option<i64>) -> Result<()> {
        if id == self.reject_id {
            return Err(anyhow!("row level security rejected update"));
        }
        self.inner.update_prices(id, regular, sale).await
    }
}

pub async fn seed_link(
    db: &Database,
    id: &str,
    pharmacy: &str,
    url: &str,
    regular: Option<i64>,
    sale: Option<i64>,
) {
    sqlx::query(
        r"
        INSERT INTO pharmacy_links
            (id, medication_name, pharmacy_name, product_url, is_active, regular_price, sale_price)
        VALUES (?, 'Levotiroxina 100 mcg', ?, ?, 1, ?, ?)
        ",
    )
    .bind(id)
    .bind(pharmacy)
    .bind(url)
    .bind(regular)
    .bind(sale)
    .execute(db.pool())
    .await
    .unwrap();
}

pub async fn stored(db: &Database, id: &str) -> (Option<i64>, Option<i64>) {
    db.find_link(id).await.unwrap().unwrap().stored_prices()
}
