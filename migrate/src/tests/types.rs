use mongodb::bson::{self, Bson};
use rstest::*;

use crate::core::client::database::{DatabaseError, MongoVersionStore, VersionStore};
use crate::tests::common::{journal, offline_database, Journal};
use crate::types::logger::step_line;
use crate::types::migration::{Capability, Direction, Migration};
use crate::types::record::{LedgerState, VersionRecord};

#[rstest]
#[case(Capability::Both, Direction::Up, true)]
#[case(Capability::Both, Direction::Down, true)]
#[case(Capability::ForwardOnly, Direction::Up, true)]
#[case(Capability::ForwardOnly, Direction::Down, false)]
#[case(Capability::BackwardOnly, Direction::Up, false)]
#[case(Capability::BackwardOnly, Direction::Down, true)]
#[case(Capability::None, Direction::Up, false)]
#[case(Capability::None, Direction::Down, false)]
fn capability_supports_direction(#[case] capability: Capability, #[case] direction: Direction, #[case] expected: bool) {
    assert_eq!(capability.supports(direction), expected);
}

#[rstest]
fn migration_capability_follows_registered_actions(journal: Journal) {
    let both = Migration::new(1, "").with_up(journal.action(Direction::Up, 1)).with_down(journal.action(Direction::Down, 1));
    let forward = Migration::new(2, "").with_up(journal.action(Direction::Up, 2));
    let backward = Migration::new(3, "").with_down(journal.action(Direction::Down, 3));
    let bare = Migration::new(4, "");

    assert_eq!(both.capability(), Capability::Both);
    assert_eq!(forward.capability(), Capability::ForwardOnly);
    assert!(forward.has_forward() && !forward.has_backward());
    assert_eq!(backward.capability(), Capability::BackwardOnly);
    assert!(backward.action(Direction::Up).is_none());
    assert!(backward.action(Direction::Down).is_some());
    assert_eq!(bare.capability(), Capability::None);
}

#[test]
fn step_line_format() {
    assert_eq!(step_line(Direction::Up, 3, "add index"), "MIGRATED UP: 3 add index");
    assert_eq!(step_line(Direction::Down, 0, ""), "MIGRATED DOWN: 0 ");
}

#[test]
fn record_document_layout() {
    let record = VersionRecord::new(42, "add users");

    let document = bson::to_document(&record).unwrap();

    assert_eq!(document.get("version"), Some(&Bson::Int64(42)));
    assert_eq!(document.get_str("description").unwrap(), "add users");
    assert!(matches!(document.get("timestamp"), Some(Bson::DateTime(_))));
}

#[test]
fn empty_description_is_omitted_and_read_back_as_empty() {
    let record = VersionRecord::new(7, "");

    let document = bson::to_document(&record).unwrap();
    assert!(!document.contains_key("description"));

    let read: VersionRecord = bson::from_document(document).unwrap();
    assert_eq!(LedgerState::from(read), LedgerState::new(7, ""));
}

#[rstest]
#[tokio::test]
async fn versions_beyond_int64_are_rejected_before_writing() {
    let store = MongoVersionStore::new(offline_database().await);

    let result = store.record_version(u64::MAX, "too far").await;

    assert!(matches!(result, Err(DatabaseError::VersionOutOfRange(u64::MAX))));
}

#[rstest]
#[tokio::test]
async fn collection_name_defaults_to_migrations() {
    let store = MongoVersionStore::new(offline_database().await);
    assert_eq!(store.collection_name(), "migrations");

    let store = store.with_collection_name("schema_versions");
    assert_eq!(store.collection_name(), "schema_versions");
}
