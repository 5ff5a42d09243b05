mod models;
mod queries;
mod schema;
mod store;

pub use models::*;
pub use queries::{QueryRegistry, WAREHOUSE_QUERIES};
pub use schema::{latest_schema, table_names, WAREHOUSE_VERSIONED_SCHEMAS};
pub use store::{FileLoad, SongLookup, SqliteWarehouse, WarehouseWriter};
