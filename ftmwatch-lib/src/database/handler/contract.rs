use crate::database::schema::contract;
use crate::database::schema::contract::dsl::*;
use crate::model::Contract;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::Array;
use diesel::sql_types::BigInt;
use diesel::sql_types::Text;
use diesel::PgConnection;

pub struct ContractHandler<'a> {
    connection: &'a PgConnection,
}

/// Full-text match over a contract's name and both fetched artifacts; `simple` so
/// identifiers like `ERC20Upgradeable` are matched verbatim, not stemmed.
const TS_VECTOR: &str = "to_tsvector('simple', name || ' ' || coalesce(abi, '') || ' ' || coalesce(source_code, ''))";

impl<'a> ContractHandler<'a> {
    pub fn new(connection: &'a PgConnection) -> Self {
        ContractHandler { connection }
    }

    pub fn get(&self, addr: &str) -> Option<Contract> {
        contract.filter(address.eq(addr.to_lowercase())).first(self.connection).optional().unwrap()
    }

    /// Inserts a new contract, returning the already present row if the address is known.
    pub fn insert(&self, entity: &Contract) -> Contract {
        if let Some(row) = self.get(&entity.address) {
            return row;
        }

        diesel::insert_into(contract::table).values(entity).get_result(self.connection).unwrap()
    }

    pub fn get_by_addresses(&self, addrs: &[String]) -> Vec<Contract> {
        let addrs_lower: Vec<String> = addrs.iter().map(|x| x.to_lowercase()).collect();
        contract.filter(address.eq_any(addrs_lower)).get_results(self.connection).unwrap()
    }

    /// Returns all contracts within `addrs` whose indexed text matches `keyword`.
    pub fn search_within(&self, addrs: &[String], keyword: &str) -> Vec<Contract> {
        let addrs_lower: Vec<String> = addrs.iter().map(|x| x.to_lowercase()).collect();

        sql_query(format!(
            "SELECT * FROM contract WHERE address = ANY($1) AND {TS_VECTOR} @@ plainto_tsquery('simple', $2)"
        ))
        .bind::<Array<Text>, _>(addrs_lower)
        .bind::<Text, _>(keyword)
        .get_results(self.connection)
        .unwrap()
    }

    pub fn get_most_recent(&self, skip: i64, limit: i64) -> Vec<Contract> {
        contract
            .order_by(added_at.desc())
            .offset(skip)
            .limit(limit)
            .get_results(self.connection)
            .unwrap()
    }

    /// Full-text search over the whole corpus, most recently ingested first.
    pub fn search(&self, keyword: &str, skip: i64, limit: i64) -> Vec<Contract> {
        sql_query(format!(
            "SELECT * FROM contract WHERE {TS_VECTOR} @@ plainto_tsquery('simple', $1) \
             ORDER BY added_at DESC OFFSET $2 LIMIT $3"
        ))
        .bind::<Text, _>(keyword)
        .bind::<BigInt, _>(skip)
        .bind::<BigInt, _>(limit)
        .get_results(self.connection)
        .unwrap()
    }
}
