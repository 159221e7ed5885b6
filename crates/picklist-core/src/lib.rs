pub mod config;
pub mod doctor;
pub mod ingest;
pub mod record;
pub mod scan;
#[cfg(test)]
pub(crate) mod test_support;
pub mod time;
pub mod title_store;
