//! Customer data models.
//!
//! Column names are a closed set ([`CustomerColumn`]); SQL text is only ever
//! built from these, so caller-supplied names never reach a statement.

use crate::error::{DbError, DbResult};
use crate::models::field::FieldValue;
use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Auto-assigned primary key of a customer row.
pub type CustomerId = u64;

/// Columns of the customer table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CustomerColumn {
    CustomerId,
    CustomerGroupId,
    StoreId,
    LanguageId,
    Firstname,
    Lastname,
    Email,
    Telephone,
    Password,
    CustomField,
    Newsletter,
    Ip,
    Status,
    Safe,
    Token,
    Code,
    DateAdded,
}

impl CustomerColumn {
    pub const ALL: [CustomerColumn; 17] = [
        Self::CustomerId,
        Self::CustomerGroupId,
        Self::StoreId,
        Self::LanguageId,
        Self::Firstname,
        Self::Lastname,
        Self::Email,
        Self::Telephone,
        Self::Password,
        Self::CustomField,
        Self::Newsletter,
        Self::Ip,
        Self::Status,
        Self::Safe,
        Self::Token,
        Self::Code,
        Self::DateAdded,
    ];

    /// Column name as it appears in the table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CustomerId => "customer_id",
            Self::CustomerGroupId => "customer_group_id",
            Self::StoreId => "store_id",
            Self::LanguageId => "language_id",
            Self::Firstname => "firstname",
            Self::Lastname => "lastname",
            Self::Email => "email",
            Self::Telephone => "telephone",
            Self::Password => "password",
            Self::CustomField => "custom_field",
            Self::Newsletter => "newsletter",
            Self::Ip => "ip",
            Self::Status => "status",
            Self::Safe => "safe",
            Self::Token => "token",
            Self::Code => "code",
            Self::DateAdded => "date_added",
        }
    }

    /// The id is assigned by the server and never written.
    pub fn is_writable(&self) -> bool {
        !matches!(self, Self::CustomerId)
    }
}

impl fmt::Display for CustomerColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CustomerColumn {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| DbError::invalid_input(format!("Unknown customer column '{s}'")))
    }
}

/// Column-to-value mapping for inserts and updates, ordered by column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerFields {
    values: BTreeMap<CustomerColumn, FieldValue>,
}

impl CustomerFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column, replacing any previous value.
    pub fn set(mut self, column: CustomerColumn, value: impl Into<FieldValue>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: CustomerColumn, value: impl Into<FieldValue>) {
        self.values.insert(column, value.into());
    }

    pub fn get(&self, column: CustomerColumn) -> Option<&FieldValue> {
        self.values.get(&column)
    }

    pub fn contains(&self, column: CustomerColumn) -> bool {
        self.values.contains_key(&column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = CustomerColumn> + '_ {
        self.values.keys().copied()
    }

    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.values.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CustomerColumn, &FieldValue)> {
        self.values.iter().map(|(c, v)| (*c, v))
    }

    /// Build from a JSON object of column names to scalar values.
    ///
    /// `custom_field` also accepts an object or array, stored as JSON text.
    pub fn from_json(value: &JsonValue) -> DbResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| DbError::invalid_input("Customer fields must be a JSON object"))?;

        let mut fields = Self::new();
        for (key, raw) in object {
            let column: CustomerColumn = key.parse()?;
            if !column.is_writable() {
                return Err(DbError::invalid_input(format!(
                    "Column '{column}' is assigned by the database and cannot be written"
                )));
            }
            let value = match (column, raw) {
                (CustomerColumn::CustomField, JsonValue::Object(_) | JsonValue::Array(_)) => {
                    FieldValue::String(raw.to_string())
                }
                _ => FieldValue::from_json(raw).ok_or_else(|| {
                    DbError::invalid_input(format!("Column '{column}' requires a scalar value"))
                })?,
            };
            fields.insert(column, value);
        }
        Ok(fields)
    }
}

impl FromIterator<(CustomerColumn, FieldValue)> for CustomerFields {
    fn from_iter<I: IntoIterator<Item = (CustomerColumn, FieldValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

fn default_status() -> i64 {
    1
}

/// Registration data for a new customer.
///
/// The password must already be hashed by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub telephone: String,
    pub password: String,
    #[serde(default)]
    pub newsletter: i64,
    #[serde(default = "default_status")]
    pub status: i64,
    #[serde(default)]
    pub customer_group_id: Option<i64>,
    #[serde(default)]
    pub store_id: Option<i64>,
    #[serde(default)]
    pub language_id: Option<i64>,
    /// JSON text
    #[serde(default)]
    pub custom_field: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub safe: Option<i64>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    /// Defaults to the current local time on insert.
    #[serde(default)]
    pub date_added: Option<NaiveDateTime>,
}

impl NewCustomer {
    pub fn new(
        firstname: impl Into<String>,
        lastname: impl Into<String>,
        email: impl Into<String>,
        telephone: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            firstname: firstname.into(),
            lastname: lastname.into(),
            email: email.into(),
            telephone: telephone.into(),
            password: password_hash.into(),
            newsletter: 0,
            status: default_status(),
            customer_group_id: None,
            store_id: None,
            language_id: None,
            custom_field: None,
            ip: None,
            safe: None,
            token: None,
            code: None,
            date_added: None,
        }
    }

    /// Columns to insert. Absent optional fields are left to table defaults.
    pub fn to_fields(&self) -> CustomerFields {
        use CustomerColumn as C;

        let mut fields = CustomerFields::new()
            .set(C::Firstname, self.firstname.as_str())
            .set(C::Lastname, self.lastname.as_str())
            .set(C::Email, self.email.as_str())
            .set(C::Telephone, self.telephone.as_str())
            .set(C::Password, self.password.as_str())
            .set(C::Newsletter, self.newsletter)
            .set(C::Status, self.status)
            .set(
                C::DateAdded,
                self.date_added
                    .unwrap_or_else(|| Local::now().naive_local().trunc_subsecs(0)),
            );

        let optional: [(CustomerColumn, Option<FieldValue>); 8] = [
            (C::CustomerGroupId, self.customer_group_id.map(Into::into)),
            (C::StoreId, self.store_id.map(Into::into)),
            (C::LanguageId, self.language_id.map(Into::into)),
            (C::CustomField, self.custom_field.clone().map(Into::into)),
            (C::Ip, self.ip.clone().map(Into::into)),
            (C::Safe, self.safe.map(Into::into)),
            (C::Token, self.token.clone().map(Into::into)),
            (C::Code, self.code.clone().map(Into::into)),
        ];
        for (column, value) in optional {
            if let Some(value) = value {
                fields.insert(column, value);
            }
        }
        fields
    }
}

/// One customer row as a column-name to value mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerRecord(Map<String, JsonValue>);

impl CustomerRecord {
    pub fn new(map: Map<String, JsonValue>) -> Self {
        Self(map)
    }

    pub fn get(&self, column: CustomerColumn) -> Option<&JsonValue> {
        self.0.get(column.as_str())
    }

    pub fn as_str(&self, column: CustomerColumn) -> Option<&str> {
        self.get(column).and_then(JsonValue::as_str)
    }

    /// Integer value of a column. Boolean columns read as 0/1.
    pub fn as_i64(&self, column: CustomerColumn) -> Option<i64> {
        match self.get(column)? {
            JsonValue::Number(n) => n.as_i64(),
            JsonValue::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn id(&self) -> Option<CustomerId> {
        self.get(CustomerColumn::CustomerId)
            .and_then(JsonValue::as_u64)
    }

    pub fn email(&self) -> Option<&str> {
        self.as_str(CustomerColumn::Email)
    }

    pub fn firstname(&self) -> Option<&str> {
        self.as_str(CustomerColumn::Firstname)
    }

    pub fn status(&self) -> Option<i64> {
        self.as_i64(CustomerColumn::Status)
    }

    /// True when the stored column equals what `value` would write.
    pub fn matches(&self, column: CustomerColumn, value: &FieldValue) -> bool {
        match value {
            FieldValue::Bool(b) => self.as_i64(column) == Some(i64::from(*b)),
            FieldValue::Int(i) => self.as_i64(column) == Some(*i),
            other => self.get(column) == Some(&other.to_json()),
        }
    }
}
