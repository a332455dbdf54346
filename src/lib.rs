pub mod config;
pub mod errors;
pub mod matcher;
pub mod playlist;
pub mod probe;
pub mod reconcile;
pub mod terminal;

#[cfg(test)]
mod tests {
    use crate::playlist::{parse, EntryStatus};
    use crate::reconcile::Reconciler;

    #[test]
    fn test_reconciler_new() {
        let entries = parse("#EXTINF:-1,One\nhttp://x.example/1\n");
        let rec = Reconciler::new(entries);
        assert_eq!(rec.entries().len(), 1);
        assert_eq!(rec.entries()[0].status, EntryStatus::Untested);
        assert!(rec.failed().is_empty());
    }

    #[test]
    fn test_counts_on_fresh_playlist() {
        let rec = Reconciler::new(parse("#EXTINF:-1,One\nhttp://x.example/1\n"));
        assert_eq!(rec.repaired_count(), 0);
        assert_eq!(rec.unrepaired_count(), 0);
    }
}
