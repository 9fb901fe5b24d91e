use crate::database::schema::contract_alert;
use crate::database::schema::contract_alert::dsl::*;
use crate::model::ContractAlert;
use crate::model::ContractAlertInsert;
use diesel::prelude::*;
use diesel::PgConnection;

pub struct ContractAlertHandler<'a> {
    connection: &'a PgConnection,
}

impl<'a> ContractAlertHandler<'a> {
    pub fn new(connection: &'a PgConnection) -> Self {
        ContractAlertHandler { connection }
    }

    pub fn get(&self, kw: &str) -> Option<ContractAlert> {
        contract_alert.filter(keyword.eq(kw)).first(self.connection).optional().unwrap()
    }

    /// Returns every alert that currently has at least one subscribed chat.
    pub fn get_with_subscribers(&self) -> Vec<ContractAlert> {
        let mut alerts: Vec<ContractAlert> = contract_alert.get_results(self.connection).unwrap();
        alerts.retain(|alert| !alert.chat_ids.is_empty());
        alerts
    }

    /// Returns all alerts the given chat is subscribed to.
    pub fn get_registered(&self, chat_id: i64) -> Vec<ContractAlert> {
        contract_alert.filter(chat_ids.contains(vec![chat_id])).get_results(self.connection).unwrap()
    }

    /// Subscribes a chat to a keyword, creating the alert row if it doesn't exist yet.
    /// Returns `false` if the chat is already subscribed.
    pub fn add_subscriber(&self, kw: &str, chat_id: i64) -> bool {
        match self.get(kw) {
            Some(alert) => {
                if alert.chat_ids.contains(&chat_id) {
                    return false;
                }

                let mut ids = alert.chat_ids;
                ids.push(chat_id);

                diesel::update(contract_alert.filter(keyword.eq(kw)))
                    .set(chat_ids.eq(ids))
                    .execute(self.connection)
                    .unwrap();
                true
            }

            None => {
                let entity = ContractAlertInsert {
                    keyword: kw,
                    chat_ids: vec![chat_id],
                };

                diesel::insert_into(contract_alert::table)
                    .values(&entity)
                    .execute(self.connection)
                    .unwrap();
                true
            }
        }
    }

    /// Unsubscribes a chat from a keyword; the alert row itself is kept even when its
    /// subscriber list becomes empty. Returns `false` if no such subscription exists.
    pub fn remove_subscriber(&self, kw: &str, chat_id: i64) -> bool {
        match self.get(kw) {
            Some(alert) if alert.chat_ids.contains(&chat_id) => {
                let mut ids = alert.chat_ids;
                ids.retain(|x| *x != chat_id);

                diesel::update(contract_alert.filter(keyword.eq(kw)))
                    .set(chat_ids.eq(ids))
                    .execute(self.connection)
                    .unwrap();
                true
            }

            _ => false,
        }
    }
}
