//! Unit tests for the repository delete lifecycle

use super::*;
use crate::domain::ProgressEvent;
use crate::port::cancellation::mocks::MockCancellationRegistry;
use crate::port::language_service::mocks::MockLanguageService;
use crate::port::progress_notifier::mocks::MockProgressNotifier;
use crate::port::repository_storage::mocks::MockRepositoryStorageFactory;
use crate::port::search_index::mocks::{MockSearchIndexClient, SearchCall};
use crate::port::time_provider::FixedTimeProvider;
use tokio_test::{assert_err, assert_ok};

const URI: &str = "github.com/elastic/kibana";
const DATA_PATH: &str = "mockpath";

struct Fixture {
    search: Arc<MockSearchIndexClient>,
    cancellation: Arc<MockCancellationRegistry>,
    language: Arc<MockLanguageService>,
    storage: Arc<MockRepositoryStorageFactory>,
    notifier: Arc<MockProgressNotifier>,
}

impl Fixture {
    fn new() -> Self {
        Self::with(
            MockSearchIndexClient::new(),
            MockCancellationRegistry::new(),
            MockLanguageService::new(),
            MockRepositoryStorageFactory::new(),
        )
    }

    fn with(
        search: MockSearchIndexClient,
        cancellation: MockCancellationRegistry,
        language: MockLanguageService,
        storage: MockRepositoryStorageFactory,
    ) -> Self {
        Self {
            search: Arc::new(search),
            cancellation: Arc::new(cancellation),
            language: Arc::new(language),
            storage: Arc::new(storage),
            notifier: Arc::new(MockProgressNotifier::new()),
        }
    }

    fn worker(&self) -> DeleteWorker {
        DeleteWorker::new(
            self.search.clone(),
            self.cancellation.clone(),
            self.language.clone(),
            self.storage.clone(),
            self.notifier.clone(),
            Arc::new(FixedTimeProvider::new(1_700_000_000_000)),
        )
    }
}

fn job() -> DeleteJob {
    DeleteJob::new(URI, DATA_PATH)
}

#[tokio::test]
async fn test_execute_delete_job() {
    let fx = Fixture::new();
    let worker = fx.worker();

    let result = worker.execute_job(&job()).await.unwrap();
    assert_eq!(result, JobResult::new(URI));

    assert_eq!(
        fx.notifier.events(),
        vec![ProgressEvent::new(URI, 0), ProgressEvent::new(URI, 100)]
    );
    assert_eq!(fx.cancellation.cancel_count(), 1);
    assert_eq!(fx.cancellation.cancelled_uris(), vec![URI.to_string()]);
    assert_eq!(fx.storage.instance_count(), 1);
    assert_eq!(
        fx.storage.instances(),
        vec![(URI.to_string(), DATA_PATH.to_string())]
    );
    assert_eq!(fx.storage.remove_count(), 1);
    assert_eq!(fx.search.delete_index_count(), 3);
    assert_eq!(fx.language.delete_count(), 1);
}

#[tokio::test]
async fn test_execute_deletes_symbol_reference_document_indices() {
    let fx = Fixture::new();
    fx.worker().execute_job(&job()).await.unwrap();

    let names = RepositoryIndexNames::new(DEFAULT_INDEX_PREFIX, URI);
    assert_eq!(
        fx.search.deleted_indices(),
        vec![
            format!("{}*", names.symbol()),
            format!("{}*", names.reference()),
            format!("{}*", names.document()),
        ]
    );
    // Nothing but index deletions during execute
    assert_eq!(fx.search.index_count(), 0);
    assert_eq!(fx.search.update_count(), 0);
    assert_eq!(fx.search.delete_document_count(), 0);
}

#[tokio::test]
async fn test_execute_honors_index_prefix() {
    let fx = Fixture::new();
    let worker = fx.worker().with_index_prefix(".test-code-");
    worker.execute_job(&job()).await.unwrap();

    assert!(fx
        .search
        .deleted_indices()
        .iter()
        .all(|name| name.starts_with(".test-code-")));
}

#[tokio::test]
async fn test_execute_twice_is_idempotent() {
    let fx = Fixture::new();
    let worker = fx.worker();

    assert_ok!(worker.execute_job(&job()).await);
    assert_ok!(worker.execute_job(&job()).await);

    assert_eq!(fx.notifier.progress_values(), vec![0, 100, 0, 100]);
    assert_eq!(fx.cancellation.cancel_count(), 2);
    assert_eq!(fx.storage.instance_count(), 2);
    assert_eq!(fx.storage.remove_count(), 2);
    assert_eq!(fx.search.delete_index_count(), 6);
    assert_eq!(fx.language.delete_count(), 2);
}

#[tokio::test]
async fn test_cancel_failure_stops_before_removing_data() {
    let fx = Fixture::with(
        MockSearchIndexClient::new(),
        MockCancellationRegistry::new_fail("registry unavailable"),
        MockLanguageService::new(),
        MockRepositoryStorageFactory::new(),
    );

    let err = assert_err!(fx.worker().execute_job(&job()).await);
    assert!(matches!(err, AppError::Cancellation(_)));

    assert_eq!(fx.notifier.progress_values(), vec![0]);
    assert_eq!(fx.storage.instance_count(), 0);
    assert_eq!(fx.storage.remove_count(), 0);
    assert_eq!(fx.search.delete_index_count(), 0);
    assert_eq!(fx.language.delete_count(), 0);
}

#[tokio::test]
async fn test_storage_failure_skips_remaining_steps() {
    let fx = Fixture::with(
        MockSearchIndexClient::new(),
        MockCancellationRegistry::new(),
        MockLanguageService::new(),
        MockRepositoryStorageFactory::new_fail("permission denied"),
    );

    let err = assert_err!(fx.worker().execute_job(&job()).await);
    assert!(matches!(err, AppError::Storage(_)));

    assert_eq!(fx.cancellation.cancel_count(), 1);
    assert_eq!(fx.storage.remove_count(), 1);
    assert_eq!(fx.search.delete_index_count(), 0);
    assert_eq!(fx.language.delete_count(), 0);
}

#[tokio::test]
async fn test_index_failure_aborts_on_first_delete() {
    let fx = Fixture::new();
    fx.search
        .set_fail_delete_index(Some("cluster unavailable".to_string()));

    let err = assert_err!(fx.worker().execute_job(&job()).await);
    assert!(matches!(err, AppError::SearchIndex(_)));

    assert_eq!(fx.search.delete_index_count(), 1);
    assert_eq!(fx.language.delete_count(), 0);
    assert_eq!(fx.notifier.progress_values(), vec![0]);

    // A retry after the cluster recovers runs every step again
    fx.search.set_fail_delete_index(None);
    fx.search.reset();
    assert_ok!(fx.worker().execute_job(&job()).await);
    assert_eq!(fx.search.delete_index_count(), 3);
    assert_eq!(fx.cancellation.cancel_count(), 2);
    assert_eq!(fx.language.delete_count(), 1);
}

#[tokio::test]
async fn test_workspace_failure_propagates() {
    let fx = Fixture::with(
        MockSearchIndexClient::new(),
        MockCancellationRegistry::new(),
        MockLanguageService::new_fail("language server busy"),
        MockRepositoryStorageFactory::new(),
    );

    let err = assert_err!(fx.worker().execute_job(&job()).await);
    assert!(matches!(err, AppError::Workspace(_)));
    assert_eq!(fx.search.delete_index_count(), 3);
    assert_eq!(fx.notifier.progress_values(), vec![0]);
}

#[tokio::test]
async fn test_on_job_enqueued_writes_status_once() {
    let fx = Fixture::new();
    fx.worker().on_job_enqueued(&job()).await.unwrap();

    assert_eq!(fx.search.index_count(), 1);
    assert_eq!(fx.search.update_count(), 0);
    assert_eq!(fx.search.delete_index_count(), 0);
    assert_eq!(fx.search.delete_document_count(), 0);

    match &fx.search.calls()[0] {
        SearchCall::Index { index, id, body } => {
            let names = RepositoryIndexNames::new(DEFAULT_INDEX_PREFIX, URI);
            assert_eq!(index, &names.document());
            assert_eq!(id, &delete_status_id(URI));
            assert_eq!(body[DELETE_STATUS_FIELD]["uri"], URI);
            assert_eq!(body[DELETE_STATUS_FIELD]["progress"], 0);
            assert!(body[DELETE_STATUS_FIELD]["timestamp"]
                .as_str()
                .unwrap()
                .starts_with("2023-11-14"));
        }
        other => panic!("unexpected call {:?}", other),
    }
}

#[tokio::test]
async fn test_on_job_enqueued_surfaces_write_failure() {
    let fx = Fixture::with(
        MockSearchIndexClient::new_failing_index("index closed"),
        MockCancellationRegistry::new(),
        MockLanguageService::new(),
        MockRepositoryStorageFactory::new(),
    );

    let err = assert_err!(fx.worker().on_job_enqueued(&job()).await);
    assert!(matches!(err, AppError::SearchIndex(_)));
}

#[tokio::test]
async fn test_on_job_completed_issues_no_update() {
    let fx = Fixture::new();
    let worker = fx.worker();

    assert_ok!(worker.on_job_completed(&job(), &JobResult::new(URI)).await);
    assert_ok!(
        worker
            .on_job_completed(&job(), &JobResult::new("github.com/other/repo"))
            .await
    );

    assert_eq!(fx.search.update_count(), 0);
    assert!(fx.search.calls().is_empty());
}

#[tokio::test]
async fn test_execution_error_records_error_status() {
    let fx = Fixture::new();
    let error = AppError::Storage("disk full".to_string());

    fx.worker().on_job_execution_error(&job(), &error).await;

    assert_eq!(fx.notifier.progress_values(), vec![-100]);
    assert_eq!(fx.search.update_count(), 0);
    match &fx.search.calls()[0] {
        SearchCall::Index { body, .. } => {
            assert_eq!(body[DELETE_STATUS_FIELD]["progress"], -100);
            assert!(body[DELETE_STATUS_FIELD]["error"]
                .as_str()
                .unwrap()
                .contains("disk full"));
        }
        other => panic!("unexpected call {:?}", other),
    }
}

#[tokio::test]
async fn test_error_hook_swallows_status_write_failure() {
    let fx = Fixture::with(
        MockSearchIndexClient::new_failing_index("index closed"),
        MockCancellationRegistry::new(),
        MockLanguageService::new(),
        MockRepositoryStorageFactory::new(),
    );

    fx.worker().on_job_timeout(&job()).await;

    assert_eq!(fx.notifier.progress_values(), vec![-200]);
    assert_eq!(fx.search.index_count(), 1);
}

/// One log shared by every collaborator, to observe cross-port ordering
#[derive(Clone, Default)]
struct CallLog(Arc<std::sync::Mutex<Vec<String>>>);

impl CallLog {
    fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

#[async_trait]
impl CancellationRegistry for CallLog {
    async fn register_index_job(&self, _uri: &str) -> crate::port::CancellationToken {
        crate::port::cancellation_pair().1
    }

    async fn cancel_index_job(&self, _uri: &str) -> Result<()> {
        self.push("cancel_index_job");
        Ok(())
    }

    async fn active_index_jobs(&self, _uri: &str) -> usize {
        0
    }
}

#[async_trait]
impl crate::port::RepositoryStorage for CallLog {
    async fn remove(&self) -> Result<()> {
        self.push("remove_repository");
        Ok(())
    }
}

impl RepositoryStorageFactory for CallLog {
    fn new_instance(&self, _uri: &str, _data_path: &str) -> Box<dyn crate::port::RepositoryStorage> {
        Box::new(self.clone())
    }
}

#[async_trait]
impl SearchIndexClient for CallLog {
    async fn index_document(&self, index: &str, _id: &str, _body: serde_json::Value) -> Result<()> {
        self.push(format!("index_document {}", index));
        Ok(())
    }

    async fn update_document(&self, index: &str, _id: &str, _body: serde_json::Value) -> Result<()> {
        self.push(format!("update_document {}", index));
        Ok(())
    }

    async fn delete_document(&self, index: &str, _id: &str) -> Result<()> {
        self.push(format!("delete_document {}", index));
        Ok(())
    }

    async fn delete_index(&self, name: &str) -> Result<()> {
        self.push(format!("delete_index {}", name));
        Ok(())
    }
}

#[async_trait]
impl LanguageService for CallLog {
    async fn delete_workspace(&self, _uri: &str) -> Result<()> {
        self.push("delete_workspace");
        Ok(())
    }
}

impl ProgressNotifier for CallLog {
    fn broadcast_delete_progress(&self, _uri: &str, progress: Progress) {
        self.push(format!("progress {}", progress));
    }
}

#[tokio::test]
async fn test_execute_runs_steps_in_order() {
    let log = CallLog::default();
    let shared = Arc::new(log.clone());
    let worker = DeleteWorker::new(
        shared.clone(),
        shared.clone(),
        shared.clone(),
        shared.clone(),
        shared,
        Arc::new(FixedTimeProvider::new(0)),
    );

    worker.execute_job(&job()).await.unwrap();

    let [symbol, reference, document] =
        RepositoryIndexNames::new(DEFAULT_INDEX_PREFIX, URI).deletion_patterns();
    assert_eq!(
        log.entries(),
        vec![
            "progress 0".to_string(),
            "cancel_index_job".to_string(),
            "remove_repository".to_string(),
            format!("delete_index {}", symbol),
            format!("delete_index {}", reference),
            format!("delete_index {}", document),
            "delete_workspace".to_string(),
            "progress 100".to_string(),
        ]
    );
}
