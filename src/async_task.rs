use crate::catalog::{ChildrenLoader, DbKind};
use crate::error::LoaderError;
use crate::tree::ChildSpec;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    LoadChildren { id: String },
}

#[derive(Debug, Clone)]
pub enum TaskResult {
    ChildrenLoaded {
        id: String,
        result: Result<Vec<ChildSpec<DbKind>>, LoaderError>,
    },
}

/// Run a task on the current thread. Used by the worker and by headless
/// commands that have no runtime to spare.
pub fn execute_task(loader: &dyn ChildrenLoader, task: Task) -> TaskResult {
    match task {
        Task::LoadChildren { id } => {
            let start = std::time::Instant::now();
            let result = loader.load_children(&id);
            log::debug!(
                "load_children({:?}) -> {} in {:?}",
                id,
                match &result {
                    Ok(children) => format!("{} children", children.len()),
                    Err(e) => e.to_string(),
                },
                start.elapsed()
            );
            TaskResult::ChildrenLoaded { id, result }
        }
    }
}

/// Background loader loop. Loads run on the blocking pool; results go back
/// to the UI thread, which installs them. Cancelling the token stops the
/// loop and turns an in-flight load into [`LoaderError::Cancelled`].
pub async fn run_worker(
    mut task_receiver: mpsc::Receiver<Task>,
    result_sender: mpsc::Sender<TaskResult>,
    loader: Arc<dyn ChildrenLoader>,
    cancellation_token: CancellationToken,
) {
    loop {
        let task = tokio::select! {
            _ = cancellation_token.cancelled() => break,
            task = task_receiver.recv() => match task {
                Some(task) => task,
                None => break,
            },
        };
        log::debug!("worker: received {:?}", task);

        let Task::LoadChildren { id } = task.clone();
        let worker_loader = Arc::clone(&loader);
        let result = tokio::select! {
            _ = cancellation_token.cancelled() => TaskResult::ChildrenLoaded {
                id,
                result: Err(LoaderError::Cancelled),
            },
            joined = tokio::task::spawn_blocking(move || execute_task(worker_loader.as_ref(), task)) => {
                match joined {
                    Ok(result) => result,
                    Err(e) => TaskResult::ChildrenLoaded {
                        id,
                        result: Err(LoaderError::Failed(e.to_string())),
                    },
                }
            }
        };

        if result_sender.send(result).await.is_err() {
            // Main thread has dropped the receiver, exit worker
            break;
        }
    }
    log::debug!("worker: stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MockChildrenLoader;
    use assert_matches::assert_matches;
    use std::time::Duration;

    fn column(id: &str) -> ChildSpec<DbKind> {
        ChildSpec::new(id, DbKind::Column, id.rsplit('.').next().unwrap_or(id))
    }

    #[test]
    fn test_execute_task_passes_id_through() {
        let mut loader = MockChildrenLoader::new();
        loader
            .expect_load_children()
            .withf(|id: &str| id == "app.public#tables.plan")
            .times(1)
            .returning(|_| Ok(vec![column("app.public#tables.plan#col.id")]));

        let result = execute_task(
            &loader,
            Task::LoadChildren {
                id: "app.public#tables.plan".into(),
            },
        );
        assert_matches!(
            result,
            TaskResult::ChildrenLoaded { id, result: Ok(children) }
                if id == "app.public#tables.plan" && children.len() == 1
        );
    }

    #[tokio::test]
    async fn test_worker_round_trip() {
        let mut loader = MockChildrenLoader::new();
        loader
            .expect_load_children()
            .returning(|id| match id {
                "app" => Ok(vec![column("app.x")]),
                other => Err(LoaderError::NotFound(other.to_string())),
            });

        let (task_sender, task_receiver) = mpsc::channel(8);
        let (result_sender, mut result_receiver) = mpsc::channel(8);
        let token = CancellationToken::new();
        let handle = tokio::spawn(run_worker(
            task_receiver,
            result_sender,
            Arc::new(loader),
            token.clone(),
        ));

        task_sender
            .send(Task::LoadChildren { id: "app".into() })
            .await
            .unwrap();
        task_sender
            .send(Task::LoadChildren { id: "gone".into() })
            .await
            .unwrap();

        assert_matches!(
            result_receiver.recv().await,
            Some(TaskResult::ChildrenLoaded { id, result: Ok(_) }) if id == "app"
        );
        assert_matches!(
            result_receiver.recv().await,
            Some(TaskResult::ChildrenLoaded { result: Err(LoaderError::NotFound(_)), .. })
        );

        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("worker should stop after cancel")
            .unwrap();
    }

    #[tokio::test]
    async fn test_worker_stops_when_senders_drop() {
        let loader = MockChildrenLoader::new();
        let (task_sender, task_receiver) = mpsc::channel::<Task>(1);
        let (result_sender, _result_receiver) = mpsc::channel(1);
        let handle = tokio::spawn(run_worker(
            task_receiver,
            result_sender,
            Arc::new(loader),
            CancellationToken::new(),
        ));
        drop(task_sender);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("worker should stop")
            .unwrap();
    }
}
