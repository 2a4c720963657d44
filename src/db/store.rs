//! Customer data access.
//!
//! Every operation issues exactly one statement. Writes run in their own
//! transaction and are committed before the call returns. Absence is never an
//! error: reads return `None` and writes report zero affected rows.

use crate::config::{ConnectionArgs, PoolOptions, validate_identifier};
use crate::db::params::bind_all;
use crate::db::types::row_to_record;
use crate::db::{pool, statements};
use crate::error::{DbError, DbResult};
use crate::models::{CustomerColumn, CustomerFields, CustomerId, CustomerRecord, NewCustomer};
use sqlx::mysql::{MySqlArguments, MySqlQueryResult};
use sqlx::{MySql, MySqlPool};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info};

type MySqlQuery<'q> = sqlx::query::Query<'q, MySql, MySqlArguments>;

/// Data-access handle for the customer table.
#[derive(Debug, Clone)]
pub struct CustomerStore {
    pool: MySqlPool,
    table: String,
    query_timeout: Duration,
}

impl CustomerStore {
    /// Wrap an existing pool.
    pub fn new(
        pool: MySqlPool,
        table: impl Into<String>,
        query_timeout: Duration,
    ) -> DbResult<Self> {
        let table = table.into();
        validate_identifier(&table)?;
        Ok(Self {
            pool,
            table,
            query_timeout,
        })
    }

    /// Connect using CLI/environment configuration.
    pub async fn connect(args: &ConnectionArgs, pool_opts: &PoolOptions) -> DbResult<Self> {
        let table = args.table_name()?.to_string();
        let pool = pool::connect(args, pool_opts).await?;
        Self::new(pool, table, pool_opts.query_timeout())
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Close the connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn server_version(&self) -> DbResult<String> {
        self.with_timeout("server version", async {
            sqlx::query_scalar::<_, String>(statements::SERVER_VERSION)
                .fetch_one(&self.pool)
                .await
        })
        .await
    }

    /// Insert a row from an arbitrary set of columns and return its id.
    pub async fn create(&self, fields: &CustomerFields) -> DbResult<CustomerId> {
        if fields.is_empty() {
            return Err(DbError::invalid_input(
                "Cannot create a customer without any columns",
            ));
        }

        let sql = statements::insert(&self.table, fields);
        let query = bind_all(sqlx::query(&sql), fields.values());
        let result = self.execute_write("insert", &sql, fields.len(), query).await?;

        let id = result.last_insert_id();
        info!(customer_id = id, columns = fields.len(), "Customer created");
        Ok(id)
    }

    /// Register a customer from the known registration fields.
    pub async fn create_customer(&self, customer: &NewCustomer) -> DbResult<CustomerId> {
        self.create(&customer.to_fields()).await
    }

    pub async fn get_by_id(&self, id: CustomerId) -> DbResult<Option<CustomerRecord>> {
        let sql = statements::select_by(&self.table, CustomerColumn::CustomerId);
        self.fetch_record(&sql, sqlx::query(&sql).bind(id)).await
    }

    /// First customer with this email. Uniqueness is not enforced here.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<CustomerRecord>> {
        let sql = statements::select_by(&self.table, CustomerColumn::Email);
        self.fetch_record(&sql, sqlx::query(&sql).bind(email)).await
    }

    /// Overwrite the given columns. An empty mapping issues no statement.
    pub async fn update(&self, id: CustomerId, fields: &CustomerFields) -> DbResult<u64> {
        if fields.is_empty() {
            debug!(customer_id = id, "Empty update, nothing to do");
            return Ok(0);
        }
        if let Some(column) = fields.columns().find(|c| !c.is_writable()) {
            return Err(DbError::invalid_input(format!(
                "Column '{column}' cannot be updated"
            )));
        }

        let sql = statements::update(&self.table, fields);
        let query = bind_all(sqlx::query(&sql), fields.values()).bind(id);
        let result = self
            .execute_write("update", &sql, fields.len() + 1, query)
            .await?;

        let affected = result.rows_affected();
        debug!(customer_id = id, rows_affected = affected, "Customer updated");
        Ok(affected)
    }

    /// Write the status flag only. Any integer is accepted.
    pub async fn update_status(&self, id: CustomerId, status: i64) -> DbResult<u64> {
        let fields = CustomerFields::new().set(CustomerColumn::Status, status);
        self.update(id, &fields).await
    }

    pub async fn delete(&self, id: CustomerId) -> DbResult<u64> {
        let sql = statements::delete(&self.table);
        let query = sqlx::query(&sql).bind(id);
        let result = self.execute_write("delete", &sql, 1, query).await?;

        let affected = result.rows_affected();
        if affected > 0 {
            info!(customer_id = id, "Customer deleted");
        } else {
            debug!(customer_id = id, "No customer to delete");
        }
        Ok(affected)
    }

    async fn fetch_record(
        &self,
        sql: &str,
        query: MySqlQuery<'_>,
    ) -> DbResult<Option<CustomerRecord>> {
        debug!(sql = %sql, "Executing query");
        let row = self
            .with_timeout("query execution", query.fetch_optional(&self.pool))
            .await?;
        Ok(row.as_ref().map(row_to_record))
    }

    async fn execute_write(
        &self,
        operation: &str,
        sql: &str,
        params: usize,
        query: MySqlQuery<'_>,
    ) -> DbResult<MySqlQueryResult> {
        let start = Instant::now();
        debug!(
            sql = %sql,
            params = params,
            timeout_secs = self.query_timeout.as_secs(),
            "Executing write operation"
        );

        let result = self
            .with_timeout(operation, async {
                let mut tx = self.pool.begin().await?;
                let result = query.execute(&mut *tx).await?;
                tx.commit().await?;
                Ok::<_, sqlx::Error>(result)
            })
            .await?;

        debug!(
            operation = operation,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Write committed"
        );
        Ok(result)
    }

    /// A timed-out write is dropped mid-transaction and rolled back.
    async fn with_timeout<T, F>(&self, operation: &str, fut: F) -> DbResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match timeout(self.query_timeout, fut).await {
            Ok(result) => result.map_err(DbError::from),
            Err(_) => Err(DbError::timeout(
                operation,
                self.query_timeout.as_secs() as u32,
            )),
        }
    }
}
