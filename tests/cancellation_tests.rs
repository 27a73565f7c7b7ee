use pgnav::async_task::{run_worker, Task, TaskResult};
use pgnav::catalog::{ChildrenLoader, DbKind};
use pgnav::error::LoaderError;
use pgnav::tree::ChildSpec;
use std::sync::{mpsc as std_mpsc, Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

/// Loader that blocks every call until the test releases it
struct GatedLoader {
    gate: Mutex<std_mpsc::Receiver<()>>,
}

impl GatedLoader {
    fn new() -> (Self, std_mpsc::Sender<()>) {
        let (release, gate) = std_mpsc::channel();
        (Self { gate: Mutex::new(gate) }, release)
    }
}

impl ChildrenLoader for GatedLoader {
    fn load_children(&self, id: &str) -> Result<Vec<ChildSpec<DbKind>>, LoaderError> {
        let gate = self.gate.lock().map_err(|e| LoaderError::Failed(e.to_string()))?;
        gate.recv_timeout(Duration::from_secs(2))
            .map_err(|_| LoaderError::Failed("gate timed out".into()))?;
        Ok(vec![ChildSpec::new(format!("{}.x", id), DbKind::Table, "x")])
    }
}

fn spawn_worker(
    loader: Arc<dyn ChildrenLoader>,
) -> (
    mpsc::Sender<Task>,
    mpsc::Receiver<TaskResult>,
    CancellationToken,
    tokio::task::JoinHandle<()>,
) {
    let (task_sender, task_receiver) = mpsc::channel(32);
    let (result_sender, result_receiver) = mpsc::channel(32);
    let token = CancellationToken::new();
    let handle = tokio::spawn(run_worker(task_receiver, result_sender, loader, token.clone()));
    (task_sender, result_receiver, token, handle)
}

#[tokio::test]
async fn test_cancel_interrupts_inflight_load() {
    let (loader, release) = GatedLoader::new();
    let (task_sender, mut result_receiver, token, handle) = spawn_worker(Arc::new(loader));

    task_sender
        .send(Task::LoadChildren { id: "shop".into() })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let start = Instant::now();
    token.cancel();
    let result = timeout(Duration::from_millis(500), result_receiver.recv())
        .await
        .expect("cancelled load should report promptly");
    match result {
        Some(TaskResult::ChildrenLoaded { id, result }) => {
            assert_eq!(id, "shop");
            assert_eq!(result.unwrap_err(), LoaderError::Cancelled);
        }
        None => panic!("worker dropped the result channel"),
    }
    assert!(start.elapsed() < Duration::from_millis(500));

    timeout(Duration::from_secs(1), handle)
        .await
        .expect("worker should stop after cancel")
        .unwrap();

    // let the abandoned blocking call finish
    let _ = release.send(());
}

#[tokio::test]
async fn test_results_arrive_in_request_order() {
    let (loader, release) = GatedLoader::new();
    let (task_sender, mut result_receiver, token, _handle) = spawn_worker(Arc::new(loader));

    for id in ["a", "b", "c"] {
        task_sender
            .send(Task::LoadChildren { id: id.into() })
            .await
            .unwrap();
        release.send(()).unwrap();
    }

    let mut ids = Vec::new();
    for _ in 0..3 {
        match timeout(Duration::from_secs(1), result_receiver.recv()).await {
            Ok(Some(TaskResult::ChildrenLoaded { id, result })) => {
                assert!(result.is_ok());
                ids.push(id);
            }
            other => panic!("unexpected worker output: {:?}", other.is_ok()),
        }
    }
    assert_eq!(ids, vec!["a", "b", "c"]);
    token.cancel();
}

#[tokio::test]
async fn test_worker_exits_when_ui_drops_results() {
    let (loader, release) = GatedLoader::new();
    let (task_sender, result_receiver, _token, handle) = spawn_worker(Arc::new(loader));
    drop(result_receiver);

    release.send(()).unwrap();
    task_sender
        .send(Task::LoadChildren { id: "shop".into() })
        .await
        .unwrap();

    timeout(Duration::from_secs(1), handle)
        .await
        .expect("worker should notice the closed channel")
        .unwrap();
}
