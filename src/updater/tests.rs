//! Orchestrator behavior tests against an in-memory update service.
//!
//! Downloaded content is never checksummed or size-validated by design, so
//! these tests assert which files were fetched and what the state records
//! say, not content integrity.

use super::*;
use crate::core::LiftoffError;
use crate::remote::ChangeSet;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;
use tempfile::{TempDir, tempdir};

struct MockService {
    latest: Version,
    changes: ChangeSet,
    fail_on: Option<String>,
    downloads: Mutex<Vec<String>>,
}

impl MockService {
    fn new(latest: u64, entries: &[(&str, u64)]) -> Self {
        let mut changes = ChangeSet::new();
        for (path, size) in entries {
            changes.insert(*path, *size);
        }
        Self {
            latest: Version(latest),
            changes,
            fail_on: None,
            downloads: Mutex::new(Vec::new()),
        }
    }

    fn failing_on(mut self, path: &str) -> Self {
        self.fail_on = Some(path.to_string());
        self
    }

    fn downloaded(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpdateService for MockService {
    async fn latest_version(&self) -> Result<Version> {
        Ok(self.latest)
    }

    async fn changes(&self, _from: Version, _to: Version) -> Result<ChangeSet> {
        Ok(self.changes.clone())
    }

    async fn download(&self, relative_path: &str, dest: &Path, version: Version) -> Result<()> {
        if self.fail_on.as_deref() == Some(relative_path) {
            return Err(LiftoffError::Network {
                operation: format!("download of {relative_path}"),
                reason: "connection reset".to_string(),
            }
            .into());
        }

        self.downloads.lock().unwrap().push(relative_path.to_string());
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(dest, format!("{relative_path}@{version}"))?;
        Ok(())
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Vec<(u64, u64)>,
}

impl ProgressSink for RecordingSink {
    fn file_completed(&mut self, _path: &str, bytes_done: u64, bytes_total: u64) {
        self.events.push((bytes_done, bytes_total));
    }
}

fn updater_at(temp: &TempDir, service: MockService) -> Updater<MockService> {
    Updater::new(service, temp.path())
}

#[tokio::test]
async fn test_up_to_date_short_circuits() {
    let temp = tempdir().unwrap();
    let updater = updater_at(&temp, MockService::new(5, &[("a.bin", 100)]));

    VersionRecord::new(Version(5)).save(&updater.version_file()).unwrap();
    let before = std::fs::read_to_string(updater.version_file()).unwrap();

    let outcome = updater.run(&mut Discard).await.unwrap();

    assert_eq!(
        outcome,
        Outcome::UpToDate {
            version: Version(5)
        }
    );
    assert!(updater.service().downloaded().is_empty());
    assert_eq!(std::fs::read_to_string(updater.version_file()).unwrap(), before);
    assert!(!updater.progress_file().exists());
}

#[tokio::test]
async fn test_local_ahead_of_server_is_up_to_date() {
    let temp = tempdir().unwrap();
    let updater = updater_at(&temp, MockService::new(5, &[("a.bin", 100)]));

    VersionRecord::new(Version(7)).save(&updater.version_file()).unwrap();

    let outcome = updater.run(&mut Discard).await.unwrap();

    assert_eq!(
        outcome,
        Outcome::UpToDate {
            version: Version(7)
        }
    );
    assert!(updater.service().downloaded().is_empty());
}

#[tokio::test]
async fn test_full_run_downloads_in_order_and_commits() {
    let temp = tempdir().unwrap();
    let updater = updater_at(&temp, MockService::new(5, &[("a.bin", 100), ("b.bin", 50)]));

    VersionRecord::new(Version(3)).save(&updater.version_file()).unwrap();

    let mut sink = RecordingSink::default();
    let outcome = updater.run(&mut sink).await.unwrap();

    assert_eq!(
        outcome,
        Outcome::Updated {
            from: Version(3),
            to: Version(5),
            files: 2,
            bytes: 150,
        }
    );
    assert_eq!(updater.service().downloaded(), vec!["a.bin", "b.bin"]);
    assert_eq!(sink.events, vec![(100, 150), (150, 150)]);

    let record = VersionRecord::load(&updater.version_file()).unwrap();
    assert_eq!(record.version, Version(5));
    assert!(!updater.progress_file().exists());
    assert!(temp.path().join("a.bin").exists());
    assert!(temp.path().join("b.bin").exists());
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let temp = tempdir().unwrap();
    let updater = updater_at(&temp, MockService::new(5, &[("a.bin", 100), ("b.bin", 50)]));

    updater.run(&mut Discard).await.unwrap();
    let outcome = updater.run(&mut Discard).await.unwrap();

    assert_eq!(
        outcome,
        Outcome::UpToDate {
            version: Version(5)
        }
    );
    // Still only the first run's downloads
    assert_eq!(updater.service().downloaded().len(), 2);
}

#[tokio::test]
async fn test_resume_downloads_only_the_complement() {
    let temp = tempdir().unwrap();
    let updater = updater_at(&temp, MockService::new(5, &[("a.bin", 100), ("b.bin", 50)]));

    VersionRecord::new(Version(3)).save(&updater.version_file()).unwrap();

    // a.bin already landed in a previous, interrupted run
    std::fs::write(temp.path().join("a.bin"), "from the interrupted run").unwrap();
    let mut prior = ProgressRecord::new(Version(5));
    prior.mark_downloaded("a.bin");
    prior.save(&updater.progress_file()).unwrap();

    let mut sink = RecordingSink::default();
    let outcome = updater.run(&mut sink).await.unwrap();

    assert_eq!(updater.service().downloaded(), vec!["b.bin"]);
    assert_eq!(sink.events, vec![(50, 50)]);
    assert_eq!(
        outcome,
        Outcome::Updated {
            from: Version(3),
            to: Version(5),
            files: 1,
            bytes: 50,
        }
    );

    // The completed file was neither re-fetched nor re-deleted
    assert_eq!(
        std::fs::read_to_string(temp.path().join("a.bin")).unwrap(),
        "from the interrupted run"
    );
    assert_eq!(VersionRecord::load(&updater.version_file()).unwrap().version, Version(5));
    assert!(!updater.progress_file().exists());
}

#[tokio::test]
async fn test_stale_progress_target_is_discarded() {
    let temp = tempdir().unwrap();
    let updater = updater_at(&temp, MockService::new(5, &[("a.bin", 100), ("b.bin", 50)]));

    VersionRecord::new(Version(3)).save(&updater.version_file()).unwrap();

    // Progress from an abandoned v4 download shares a path with the v5 set
    let mut stale = ProgressRecord::new(Version(4));
    stale.mark_downloaded("a.bin");
    stale.save(&updater.progress_file()).unwrap();

    let outcome = updater.run(&mut Discard).await.unwrap();

    // Everything was refetched, including the path the stale record claimed
    assert_eq!(updater.service().downloaded(), vec!["a.bin", "b.bin"]);
    assert_eq!(
        outcome,
        Outcome::Updated {
            from: Version(3),
            to: Version(5),
            files: 2,
            bytes: 150,
        }
    );
}

#[tokio::test]
async fn test_failure_keeps_partial_progress_and_old_version() {
    let temp = tempdir().unwrap();
    let updater = updater_at(
        &temp,
        MockService::new(5, &[("a.bin", 100), ("b.bin", 50)]).failing_on("b.bin"),
    );

    VersionRecord::new(Version(3)).save(&updater.version_file()).unwrap();

    let mut sink = RecordingSink::default();
    let err = updater.run(&mut sink).await.unwrap_err();

    let liftoff_err = err.downcast_ref::<LiftoffError>().expect("typed error");
    assert!(liftoff_err.is_transport());

    // a.bin completed and was persisted before the failure
    assert_eq!(sink.events, vec![(100, 150)]);
    let progress = ProgressRecord::load(&updater.progress_file());
    assert_eq!(progress.target_version, Version(5));
    assert_eq!(progress.downloaded_files, vec!["a.bin"]);

    // The version marker still points at the old install
    assert_eq!(VersionRecord::load(&updater.version_file()).unwrap().version, Version(3));
}

#[tokio::test]
async fn test_failed_run_resumes_where_it_stopped() {
    let temp = tempdir().unwrap();

    {
        let updater = updater_at(
            &temp,
            MockService::new(5, &[("a.bin", 100), ("b.bin", 50)]).failing_on("b.bin"),
        );
        updater.run(&mut Discard).await.unwrap_err();
    }

    let updater = updater_at(&temp, MockService::new(5, &[("a.bin", 100), ("b.bin", 50)]));
    let outcome = updater.run(&mut Discard).await.unwrap();

    assert_eq!(updater.service().downloaded(), vec!["b.bin"]);
    assert_eq!(
        outcome,
        Outcome::Updated {
            from: Version::NONE,
            to: Version(5),
            files: 1,
            bytes: 50,
        }
    );
}

#[tokio::test]
async fn test_corrupt_version_record_forces_full_install() {
    let temp = tempdir().unwrap();
    let updater = updater_at(&temp, MockService::new(5, &[("a.bin", 100)]));

    std::fs::write(updater.version_file(), "garbage").unwrap();

    let outcome = updater.run(&mut Discard).await.unwrap();

    assert_eq!(
        outcome,
        Outcome::Updated {
            from: Version::NONE,
            to: Version(5),
            files: 1,
            bytes: 100,
        }
    );
    assert_eq!(VersionRecord::load(&updater.version_file()).unwrap().version, Version(5));
}

#[tokio::test]
async fn test_corrupt_progress_record_is_ignored() {
    let temp = tempdir().unwrap();
    let updater = updater_at(&temp, MockService::new(5, &[("a.bin", 100), ("b.bin", 50)]));

    std::fs::create_dir_all(temp.path()).unwrap();
    std::fs::write(updater.progress_file(), "][").unwrap();

    let outcome = updater.run(&mut Discard).await.unwrap();

    assert_eq!(updater.service().downloaded(), vec!["a.bin", "b.bin"]);
    assert!(matches!(
        outcome,
        Outcome::Updated {
            files: 2,
            ..
        }
    ));
}

#[tokio::test]
async fn test_stale_progress_for_installed_version_is_left_alone() {
    // The crash window between writing the version record and deleting the
    // progress record leaves exactly this state on disk. It must be
    // harmless: the version check short-circuits before the progress file
    // is even consulted.
    let temp = tempdir().unwrap();
    let updater = updater_at(&temp, MockService::new(5, &[("a.bin", 100)]));

    VersionRecord::new(Version(5)).save(&updater.version_file()).unwrap();
    let mut leftover = ProgressRecord::new(Version(5));
    leftover.mark_downloaded("a.bin");
    leftover.save(&updater.progress_file()).unwrap();

    let outcome = updater.run(&mut Discard).await.unwrap();

    assert_eq!(
        outcome,
        Outcome::UpToDate {
            version: Version(5)
        }
    );
    assert!(updater.service().downloaded().is_empty());
    assert!(updater.progress_file().exists());
}

#[tokio::test]
async fn test_existing_destination_is_replaced() {
    let temp = tempdir().unwrap();
    let updater = updater_at(&temp, MockService::new(2, &[("a.bin", 10)]));

    std::fs::write(temp.path().join("a.bin"), "stale partial write").unwrap();

    updater.run(&mut Discard).await.unwrap();

    assert_eq!(std::fs::read_to_string(temp.path().join("a.bin")).unwrap(), "a.bin@v2");
}

#[tokio::test]
async fn test_nested_entry_creates_directories() {
    let temp = tempdir().unwrap();
    let updater = updater_at(&temp, MockService::new(1, &[("data\\maps\\level1.dat", 10)]));

    updater.run(&mut Discard).await.unwrap();

    let dest = temp.path().join("data").join("maps").join("level1.dat");
    assert!(dest.exists());
}

#[tokio::test]
async fn test_traversal_entry_aborts_run() {
    let temp = tempdir().unwrap();
    let updater = updater_at(&temp, MockService::new(1, &[("../escape.bin", 10)]));

    let err = updater.run(&mut Discard).await.unwrap_err();
    match err.downcast_ref::<LiftoffError>() {
        Some(LiftoffError::UnsafePath {
            ..
        }) => {}
        other => panic!("Expected UnsafePath, got {other:?}"),
    }
    assert!(updater.service().downloaded().is_empty());
}

#[tokio::test]
async fn test_empty_change_set_still_commits() {
    let temp = tempdir().unwrap();
    let updater = updater_at(&temp, MockService::new(1, &[]));

    let outcome = updater.run(&mut Discard).await.unwrap();

    assert_eq!(
        outcome,
        Outcome::Updated {
            from: Version::NONE,
            to: Version(1),
            files: 0,
            bytes: 0,
        }
    );
    assert_eq!(VersionRecord::load(&updater.version_file()).unwrap().version, Version(1));
}
