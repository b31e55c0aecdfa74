// Adapters layer: concrete implementations for external systems (input file, fatcat, Wikidata, local disk).

pub mod csv_input;
pub mod fatcat;
pub mod storage;
pub mod wikidata;
