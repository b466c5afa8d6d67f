//! Runs the submission flow against PostgreSQL.
//! Needs `DATABASE_URL` pointing at a server where the user may create databases:
//! `cargo test -- --ignored`

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::json;
use sqlx::{Connection, PgConnection};
use tokio::task::JoinSet;
use uuid::Uuid;
use waitlist::{
    config::{DbConfig, WaitlistConfig, DATABASE_URL_ENV},
    database::DbManager,
    model::{InsertOutcome, WaitlistEntry, WaitlistStore},
};

use crate::helpers::TestApp;

/// Creates a throwaway database and a `DbManager` connected to it.
async fn fresh_db_manager() -> Result<DbManager> {
    let database_url = std::env::var(DATABASE_URL_ENV)
        .with_context(|| format!("{DATABASE_URL_ENV} must be set for postgres tests"))?;
    let mut db_config = DbConfig::try_from(database_url.as_str())?;
    db_config.db_name = format!("waitlist_test_{}", Uuid::new_v4().simple());

    let mut connection = PgConnection::connect_with(&db_config.server_options()).await?;
    let sql = format!(r#"CREATE DATABASE "{}";"#, db_config.db_name);
    sqlx::query(&sql).execute(&mut connection).await?;

    Ok(DbManager::init(&db_config).await?)
}

#[tokio::test]
#[ignore = "requires a running postgres instance"]
async fn postgres_insert_if_absent_keeps_first_entry() -> Result<()> {
    let dm = fresh_db_manager().await?;

    let first = WaitlistEntry::new("a@x.com", Some("A".to_string()));
    assert_eq!(InsertOutcome::Inserted, dm.insert_if_absent(first.clone()).await?);

    let second = WaitlistEntry::new("a@x.com", Some("B".to_string()));
    assert_eq!(InsertOutcome::AlreadyPresent, dm.insert_if_absent(second).await?);

    let stored = dm
        .find_by_email("a@x.com")
        .await?
        .context("entry was not stored")?;
    assert_eq!(first.id, stored.id);
    assert_eq!(first.name, stored.name);
    assert_eq!(None, dm.find_by_email("b@x.com").await?);
    assert_eq!(1, dm.count().await?);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running postgres instance"]
async fn postgres_submit_twice_conflicts() -> Result<()> {
    let app = TestApp::spawn_with_store(Arc::new(fresh_db_manager().await?), WaitlistConfig::default()).await?;
    let body = json!({"email": "a@x.com", "name": "A"});

    assert_eq!(StatusCode::CREATED, app.post_submit(&body).await?.status());
    assert_eq!(StatusCode::CONFLICT, app.post_submit(&body).await?.status());
    assert_eq!(1, app.store.count().await?);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running postgres instance"]
async fn postgres_concurrent_submissions_store_one_entry() -> Result<()> {
    let app = TestApp::spawn_with_store(Arc::new(fresh_db_manager().await?), WaitlistConfig::default()).await?;
    let body = json!({"email": "race@x.com"});

    let mut requests = JoinSet::new();
    for _ in 0..10 {
        let http_client = app.http_client.clone();
        let url = format!("http://{}/submit", app.addr);
        let body = body.clone();
        requests.spawn(async move { http_client.post(url).json(&body).send().await });
    }

    let mut created = 0;
    while let Some(res) = requests.join_next().await {
        let status = res??.status();
        assert!(
            status == StatusCode::CREATED || status == StatusCode::CONFLICT,
            "unexpected status: {status}"
        );
        if status == StatusCode::CREATED {
            created += 1;
        }
    }

    assert_eq!(1, created);
    assert_eq!(1, app.store.count().await?);

    Ok(())
}
