use super::emit::emit_count;
use super::ExtractError;
use crate::sink::{MetricSink, Tally};
use crate::store::{CountFilter, DocumentStore, TRACKED_COLLECTIONS};

/// Raw document count of every tracked collection.
pub(super) fn extract(store: &dyn DocumentStore, sink: &MetricSink) -> Result<Tally, ExtractError> {
    let mut tally = Tally::default();
    for collection in TRACKED_COLLECTIONS {
        let count = store.count(collection, &CountFilter::All)?;
        tally.merge(emit_count(
            sink,
            "system.collection.count",
            count,
            vec![format!("collection:{collection}")],
        ));
    }
    Ok(tally)
}
