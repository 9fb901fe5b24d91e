//! Database table handlers.
//!
//! All tables can be further inspected in the `schema.rs` file.

pub mod contract;
pub mod contract_alert;
pub mod rest;

use crate::config::Config;
use crate::database::handler::contract::ContractHandler;
use crate::database::handler::contract_alert::ContractAlertHandler;
use crate::database::handler::rest::RestHandler;
use crate::error::Error;
use diesel::r2d2::ConnectionManager;
use diesel::r2d2::Pool;
use diesel::Connection;
use diesel::PgConnection;

/// Database client, providing all table handlers.
pub struct DatabaseClient {
    connection: PgConnection,
}

/// Same as [`DatabaseClient`] but threaded for the REST API.
pub struct DatabaseClientPooled {
    connection: Pool<ConnectionManager<PgConnection>>,
}

impl DatabaseClientPooled {
    /// Returns a new threaded database client.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let manager = diesel::r2d2::ConnectionManager::<PgConnection>::new(&config.database_url);
        let pool = diesel::r2d2::Pool::builder().build(manager).unwrap();

        Ok(DatabaseClientPooled { connection: pool })
    }

    /// Returns a handler for REST specific purposes.
    pub fn rest(&self) -> RestHandler {
        RestHandler::new(&self.connection)
    }
}

impl DatabaseClient {
    /// Returns a new database client.
    pub fn new(config: &Config) -> Result<Self, Error> {
        Ok(DatabaseClient {
            connection: PgConnection::establish(&config.database_url)?,
        })
    }

    /// Returns a handler for the `contract` table.
    pub fn contract(&self) -> ContractHandler {
        ContractHandler::new(&self.connection)
    }

    /// Returns a handler for the `contract_alert` table.
    pub fn contract_alert(&self) -> ContractAlertHandler {
        ContractAlertHandler::new(&self.connection)
    }
}
