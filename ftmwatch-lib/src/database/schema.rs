table! {
    use diesel::sql_types::*;
    use crate::model::*;

    contract (address) {
        address -> Text,
        name -> Text,
        compiler -> Text,
        version -> Text,
        verified_date -> Date,
        license -> Nullable<Text>,
        abi -> Nullable<Text>,
        source_code -> Nullable<Text>,
        network_id -> Network_id,
        added_at -> Timestamptz,
    }
}

table! {
    use diesel::sql_types::*;
    use crate::model::*;

    contract_alert (id) {
        id -> Int4,
        keyword -> Text,
        chat_ids -> Array<BigInt>,
    }
}

allow_tables_to_appear_in_same_query!(contract, contract_alert);
