mod activity;
mod catalog;
mod parse;

pub use activity::{ActivityEvent, LogBatch, NEXT_SONG_PAGE};
pub use catalog::CatalogRecord;
pub use parse::{
    parse_catalog_record, parse_log_batch, read_catalog_record, read_document, read_log_batch,
    ParsedDocument, RecordKind,
};
