use crate::database::handler::contract::ContractHandler;
use crate::database::handler::contract_alert::ContractAlertHandler;
use crate::model::Contract;
use crate::model::ContractAlert;
use diesel::r2d2::ConnectionManager;
use diesel::r2d2::Pool;
use diesel::PgConnection;

/// Upper bound on rows returned by a single listing / search request.
pub const MAX_FETCH_LIMIT: i64 = 500;

/// Pooled table access for the REST API and the Telegram webhook endpoint; each call
/// checks one connection out of the pool and delegates to the worker handlers.
pub struct RestHandler<'a> {
    connection: &'a Pool<ConnectionManager<PgConnection>>,
}

impl<'a> RestHandler<'a> {
    pub fn new(connection: &'a Pool<ConnectionManager<PgConnection>>) -> Self {
        RestHandler { connection }
    }

    pub fn get_contract(&self, address: &str) -> Option<Contract> {
        let conn = self.connection.get().unwrap();
        ContractHandler::new(&conn).get(address)
    }

    pub fn get_contracts(&self, skip: i64, limit: i64) -> Vec<Contract> {
        let conn = self.connection.get().unwrap();
        ContractHandler::new(&conn).get_most_recent(skip, limit.min(MAX_FETCH_LIMIT))
    }

    pub fn search_contracts(&self, query: &str, skip: i64, limit: i64) -> Vec<Contract> {
        let conn = self.connection.get().unwrap();
        ContractHandler::new(&conn).search(query, skip, limit.min(MAX_FETCH_LIMIT))
    }

    pub fn add_alert_subscriber(&self, keyword: &str, chat_id: i64) -> bool {
        let conn = self.connection.get().unwrap();
        ContractAlertHandler::new(&conn).add_subscriber(keyword, chat_id)
    }

    pub fn remove_alert_subscriber(&self, keyword: &str, chat_id: i64) -> bool {
        let conn = self.connection.get().unwrap();
        ContractAlertHandler::new(&conn).remove_subscriber(keyword, chat_id)
    }

    pub fn registered_alerts(&self, chat_id: i64) -> Vec<ContractAlert> {
        let conn = self.connection.get().unwrap();
        ContractAlertHandler::new(&conn).get_registered(chat_id)
    }
}
