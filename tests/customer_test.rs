//! Integration tests for customer CRUD against a live MySQL/MariaDB.
//!
//! See `tests/common/mod.rs` for how the database is located.

mod common;

use common::{
    MISSING_ID, connect, random_email, random_string, raw_customer_data, with_created_customer,
};
use customer_db::{CustomerColumn, CustomerFields, CustomerStore, DbError};
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn test_create_customer_and_verify_by_id() {
    let Some(store) = connect().await else { return };
    let data = raw_customer_data();
    let expected = data.clone();

    with_created_customer(&store, &data, |store, id| async move {
        let customer = store
            .get_by_id(id)
            .await
            .unwrap()
            .expect("created customer should be readable");

        assert_eq!(customer.id(), Some(id));
        assert_eq!(customer.email(), Some(expected.email.as_str()));
        assert_eq!(customer.firstname(), Some(expected.firstname.as_str()));
        for (column, value) in expected.to_fields().iter() {
            assert!(
                customer.matches(column, value),
                "column {column}: stored {:?}, expected {:?}",
                customer.get(column),
                value
            );
        }
    })
    .await;
}

#[tokio::test]
async fn test_create_from_json_fields() {
    let Some(store) = connect().await else { return };
    let email = random_email();
    let fields = CustomerFields::from_json(&json!({
        "customer_group_id": 1,
        "store_id": 0,
        "language_id": 1,
        "firstname": "Json",
        "lastname": "Created",
        "email": email,
        "telephone": "+79001112233",
        "password": "hashed_pass",
        "custom_field": {},
        "newsletter": 1,
        "ip": "10.0.0.1",
        "status": 1,
        "safe": 0,
        "token": "",
        "code": "",
        "date_added": "2024-03-01 12:30:00",
    }))
    .unwrap();

    let id = store.create(&fields).await.unwrap();
    // Delete before any assertion so a failed read still cleans up.
    let fetched = store.get_by_id(id).await;
    let deleted = store.delete(id).await;

    let customer = fetched
        .unwrap()
        .expect("created customer should be readable");
    assert_eq!(deleted.unwrap(), 1);
    for (column, value) in fields.iter() {
        assert!(
            customer.matches(column, value),
            "column {column}: stored {:?}, expected {:?}",
            customer.get(column),
            value
        );
    }
}

#[tokio::test]
async fn test_update_existing_customer() {
    let Some(store) = connect().await else { return };
    let data = raw_customer_data();
    let expected = data.clone();

    with_created_customer(&store, &data, |store, id| async move {
        let updated = CustomerFields::new()
            .set(CustomerColumn::Firstname, "Updated")
            .set(CustomerColumn::Lastname, "User")
            .set(CustomerColumn::Email, random_email())
            .set(CustomerColumn::Telephone, "9999999999");

        let affected = store.update(id, &updated).await.unwrap();
        assert_eq!(affected, 1);

        let customer = store.get_by_id(id).await.unwrap().unwrap();
        for (column, value) in updated.iter() {
            assert!(customer.matches(column, value), "column {column} not updated");
        }
        assert_eq!(customer.as_str(CustomerColumn::Ip), expected.ip.as_deref());
    })
    .await;
}

#[tokio::test]
async fn test_update_nonexistent_customer() {
    let Some(store) = connect().await else { return };
    let updated = CustomerFields::new()
        .set(CustomerColumn::Firstname, "Ghost")
        .set(CustomerColumn::Lastname, "User")
        .set(CustomerColumn::Email, "ghost@example.com")
        .set(CustomerColumn::Telephone, "0000000000");

    let affected = store.update(MISSING_ID, &updated).await.unwrap();
    assert_eq!(affected, 0);
    assert!(store.get_by_id(MISSING_ID).await.unwrap().is_none());
}

#[tokio::test]
async fn test_empty_update_is_noop() {
    let Some(store) = connect().await else { return };
    let data = raw_customer_data();

    with_created_customer(&store, &data, |store, id| async move {
        let before = store.get_by_id(id).await.unwrap().unwrap();

        let affected = store.update(id, &CustomerFields::new()).await.unwrap();
        assert_eq!(affected, 0);

        let after = store.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(before, after);
    })
    .await;
}

#[tokio::test]
async fn test_delete_existing_customer() {
    let Some(store) = connect().await else { return };
    let data = raw_customer_data();
    let expected = data.clone();

    with_created_customer(&store, &data, |store, id| async move {
        assert_eq!(store.delete(id).await.unwrap(), 1);
        assert!(store.get_by_id(id).await.unwrap().is_none());
        assert!(store.get_by_email(&expected.email).await.unwrap().is_none());

        // A second delete finds nothing.
        assert_eq!(store.delete(id).await.unwrap(), 0);
    })
    .await;
}

#[tokio::test]
async fn test_delete_nonexistent_customer() {
    let Some(store) = connect().await else { return };
    assert_eq!(store.delete(MISSING_ID).await.unwrap(), 0);
    assert_eq!(store.delete(MISSING_ID).await.unwrap(), 0);
}

#[tokio::test]
async fn test_get_customer_by_email() {
    let Some(store) = connect().await else { return };
    let data = raw_customer_data();
    let expected = data.clone();

    with_created_customer(&store, &data, |store, id| async move {
        let customer = store
            .get_by_email(&expected.email)
            .await
            .unwrap()
            .expect("customer should be found by email");

        assert_eq!(customer.id(), Some(id));
        assert_eq!(customer.email(), Some(expected.email.as_str()));
        assert_eq!(customer.firstname(), Some(expected.firstname.as_str()));
    })
    .await;
}

#[tokio::test]
async fn test_get_nonexistent_customer_by_email() {
    let Some(store) = connect().await else { return };
    let email = format!("nonexistent_{}@example.com", random_string(8));
    assert!(store.get_by_email(&email).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_customer_status_existing() {
    let Some(store) = connect().await else { return };
    let data = raw_customer_data();

    with_created_customer(&store, &data, |store, id| async move {
        let before = store.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(before.status(), Some(1));

        let affected = store.update_status(id, 0).await.unwrap();
        assert_eq!(affected, 1);

        let after = store.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(after.status(), Some(0));

        // Every other column is untouched.
        for column in CustomerColumn::ALL {
            if column != CustomerColumn::Status {
                assert_eq!(before.get(column), after.get(column), "column {column} changed");
            }
        }
    })
    .await;
}

#[tokio::test]
async fn test_update_unchanged_values_counts_match() {
    let Some(store) = connect().await else { return };
    let data = raw_customer_data();
    let expected = data.clone();

    with_created_customer(&store, &data, |store, id| async move {
        // The fixture customer is already active.
        assert_eq!(store.update_status(id, 1).await.unwrap(), 1);

        let same =
            CustomerFields::new().set(CustomerColumn::Firstname, expected.firstname.as_str());
        assert_eq!(store.update(id, &same).await.unwrap(), 1);

        let customer = store.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(customer.status(), Some(1));
        assert_eq!(customer.firstname(), Some(expected.firstname.as_str()));
    })
    .await;
}

#[tokio::test]
async fn test_update_status_accepts_any_integer() {
    let Some(store) = connect().await else { return };
    let data = raw_customer_data();

    with_created_customer(&store, &data, |store, id| async move {
        assert_eq!(store.update_status(id, 2).await.unwrap(), 1);

        let customer = store.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(customer.status(), Some(2));
    })
    .await;
}

#[tokio::test]
async fn test_update_customer_status_nonexistent() {
    let Some(store) = connect().await else { return };
    let affected = store.update_status(MISSING_ID, 0).await.unwrap();
    assert_eq!(affected, 0);
    assert!(store.get_by_id(MISSING_ID).await.unwrap().is_none());
}

#[tokio::test]
async fn test_missing_table_error_propagates() {
    let Some(store) = connect().await else { return };
    let broken = CustomerStore::new(
        store.pool().clone(),
        format!("no_such_table_{}", random_string(6)),
        Duration::from_secs(10),
    )
    .unwrap();

    let err = broken.get_by_id(1).await.unwrap_err();
    match err {
        DbError::Database { sql_state, .. } => assert_eq!(sql_state.as_deref(), Some("42S02")),
        other => panic!("expected a database error, got {other:?}"),
    }
}
