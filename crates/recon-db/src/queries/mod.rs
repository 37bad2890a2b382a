pub mod balance;
pub mod cache_compare;
pub mod cross_db;
pub mod crm_alias;
pub mod dlq;
pub mod double_entry;
pub mod metadata;
pub mod orphan;
pub mod outbox;
pub mod referential;
