use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;

/// An untyped record as the external store sees it: field name → value,
/// in field order. Typed models exist only on our side of the gateway.
pub type Record = IndexMap<String, Value>;

/// Rejection from the external record store. The message is recorded
/// verbatim by the entity containers.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct StoreError(pub String);

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        StoreError(message.into())
    }
}

/// Sort direction for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// One ordering criterion
#[derive(Debug, Clone)]
pub struct OrderBy {
    pub field: &'static str,
    pub direction: Direction,
}

impl OrderBy {
    pub fn asc(field: &'static str) -> Self {
        OrderBy {
            field,
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: &'static str) -> Self {
        OrderBy {
            field,
            direction: Direction::Desc,
        }
    }
}

/// Filter operator: exact match or membership in an identifier set
#[derive(Debug, Clone)]
pub enum FilterOp {
    Eq(Value),
    In(Vec<Value>),
}

/// One filter criterion
#[derive(Debug, Clone)]
pub struct Filter {
    pub field: &'static str,
    pub op: FilterOp,
}

impl Filter {
    pub fn eq(field: &'static str, value: impl Into<Value>) -> Self {
        Filter {
            field,
            op: FilterOp::Eq(value.into()),
        }
    }

    pub fn is_in(field: &'static str, values: Vec<Value>) -> Self {
        Filter {
            field,
            op: FilterOp::In(values),
        }
    }

    /// Whether `record` satisfies this filter
    pub fn matches(&self, record: &Record) -> bool {
        let actual = record.get(self.field).unwrap_or(&Value::Null);
        match &self.op {
            FilterOp::Eq(expected) => actual == expected,
            FilterOp::In(set) => set.contains(actual),
        }
    }
}

/// A list/lookup query against one table
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Fields to return; empty means all
    pub fields: Vec<&'static str>,
    pub filters: Vec<Filter>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl ListQuery {
    pub fn new() -> Self {
        ListQuery::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn page(mut self, limit: usize, offset: usize) -> Self {
        self.limit = Some(limit);
        self.offset = offset;
        self
    }
}

/// The external record store contract. Table and field names are fixed
/// string identifiers agreed with the store; everything behind this
/// trait is opaque to the rest of the system.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// List records matching the query
    async fn list(&self, table: &str, query: &ListQuery) -> Result<Vec<Record>, StoreError>;

    /// First record matching the query, or `None` on zero matches
    async fn get_one(&self, table: &str, query: &ListQuery) -> Result<Option<Record>, StoreError>;

    /// Create a record; the store assigns the identifier and returns the
    /// stored shape.
    async fn create(&self, table: &str, record: Record) -> Result<Record, StoreError>;

    /// Update the fields present in `record` on the identified row and
    /// return the stored shape.
    async fn update(&self, table: &str, id: &str, record: Record) -> Result<Record, StoreError>;

    /// Delete the identified row
    async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError>;
}
