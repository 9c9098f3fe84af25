//! Read-only data sources

use async_trait::async_trait;
use serde_json::Value;

use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::schema::Schema;

pub mod database;
pub mod databases;
pub mod token;
pub mod tokens;

pub use database::DatabaseDataSource;
pub use databases::DatabasesDataSource;
pub use token::TokenDataSource;
pub use tokens::TokensDataSource;

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Full type name, e.g. `influxdb3_databases`
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    fn validate(&self, config: &Value) -> Diagnostics {
        self.schema().validate(config)
    }

    /// Read the data source for the given configuration
    async fn read(&self, config: &Value) -> Result<Value>;
}
