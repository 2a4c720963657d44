//! Shared fixtures for the live-database integration tests.
//!
//! Tests locate the database through the same flags' environment variables
//! as the binary: DB_HOST, DB_PORT, DB_USER, DB_PASSWORD, DB_NAME (or
//! DATABASE_URL). When neither DB_HOST nor DATABASE_URL is set the tests skip.
//!
//! Example:
//! DB_HOST=127.0.0.1 DB_PASSWORD=root DB_NAME=opencart cargo test

#![allow(dead_code)]

use chrono::{Local, SubsecRound};
use clap::Parser;
use customer_db::{ConnectionArgs, CustomerId, CustomerStore, NewCustomer, PoolOptions};
use futures_util::FutureExt;
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::future::Future;
use std::panic::AssertUnwindSafe;

/// An id far beyond anything the tests create.
pub const MISSING_ID: CustomerId = 999_999_999;

#[derive(Debug, Parser)]
struct TestArgs {
    #[command(flatten)]
    connection: ConnectionArgs,
}

/// Connect to the test database, or `None` when it is not configured.
pub async fn connect() -> Option<CustomerStore> {
    if std::env::var("DB_HOST").is_err() && std::env::var("DATABASE_URL").is_err() {
        eprintln!("Skipping test: DB_HOST / DATABASE_URL not set");
        return None;
    }

    let args = TestArgs::parse_from(["customer-db-tests"]);
    let pool = PoolOptions {
        max_connections: 2,
        ..PoolOptions::default()
    };
    Some(
        CustomerStore::connect(&args.connection, &pool)
            .await
            .expect("failed to connect to the test database"),
    )
}

pub fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

pub fn random_email() -> String {
    format!("{}@example.com", random_string(10).to_lowercase())
}

pub fn random_phone() -> String {
    format!("+79{}", rand::thread_rng().gen_range(100_000_000..=999_999_999))
}

/// A complete registration record with randomized email and phone.
pub fn raw_customer_data() -> NewCustomer {
    let mut customer = NewCustomer::new(
        "Test",
        "User",
        random_email(),
        random_phone(),
        // hashing is the caller's job; any opaque string will do
        "hashed_pass",
    );
    customer.customer_group_id = Some(1);
    customer.store_id = Some(0);
    customer.language_id = Some(1);
    customer.custom_field = Some("{}".to_string());
    customer.newsletter = 0;
    customer.ip = Some("192.168.0.2".to_string());
    customer.status = 1;
    customer.safe = Some(1);
    customer.token = Some("AAAAABBBBBCCCCDDDD".to_string());
    customer.code = Some("123123".to_string());
    customer.date_added = Some(Local::now().naive_local().trunc_subsecs(0));
    customer
}

/// Create a customer, run `body`, then delete the customer.
///
/// The row is deleted even when `body` panics; the panic is re-raised
/// afterwards. Deleting a row the body already removed returns 0 and is fine.
pub async fn with_created_customer<F, Fut>(store: &CustomerStore, data: &NewCustomer, body: F)
where
    F: FnOnce(CustomerStore, CustomerId) -> Fut,
    Fut: Future<Output = ()>,
{
    let id = store
        .create_customer(data)
        .await
        .expect("failed to create fixture customer");

    let outcome = AssertUnwindSafe(body(store.clone(), id))
        .catch_unwind()
        .await;

    store
        .delete(id)
        .await
        .expect("failed to delete fixture customer");

    if let Err(panic) = outcome {
        std::panic::resume_unwind(panic);
    }
}
