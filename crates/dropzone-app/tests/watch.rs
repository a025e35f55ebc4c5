use std::sync::Arc;
use std::time::Duration;

use dropzone_app::{Dispatcher, watch};
use dropzone_route::Program;
use dropzone_telemetry::Metrics;
use dropzone_test_support::{FakeProgram, Workspace, wait_for};
use tokio::sync::oneshot;

const TIMEOUT: Duration = Duration::from_secs(10);

async fn drive(
    workspace: &Workspace,
    sorter: &FakeProgram,
    stop: oneshot::Sender<()>,
) -> anyhow::Result<()> {
    // Give the backend a moment to install its watch before files land.
    tokio::time::sleep(Duration::from_millis(200)).await;
    let dropped = async {
        workspace.drop_file("acme_report.tmp", b"partial")?;
        workspace.drop_file("acme_dupes_202401.csv", b"a,b\n")?;
        wait_for(TIMEOUT, || async {
            Ok(sorter.invocations()?.len() == 1
                && !workspace.watch_dir().join("acme_dupes_202401.csv").exists())
        })
        .await
    };
    let result: anyhow::Result<()> = dropped.await;
    stop.send(()).ok();
    result
}

#[tokio::test]
async fn watcher_dispatches_arrivals_and_skips_ignored_paths() -> anyhow::Result<()> {
    let workspace = Workspace::new()?;
    let sorter = workspace.program(Program::DupesSort.relative_path(), 0)?;
    let transform = workspace.program(Program::Transform.relative_path(), 0)?;
    let config = workspace.config();
    let dispatcher = Dispatcher::new(Arc::new(config.clone()), Metrics::new()?);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let watching = watch(workspace.watch_dir(), &config, &dispatcher, async {
        stop_rx.await.ok();
    });
    let driving = drive(&workspace, &sorter, stop_tx);

    let (cycles, waited) = tokio::join!(watching, driving);
    waited?;
    let cycles = cycles?;

    assert!(cycles >= 1);
    assert!(transform.invocations()?.is_empty());
    assert_eq!(workspace.incoming()?, ["acme_report.tmp"]);
    assert!(workspace.archived()?.is_empty());

    let snapshot = dispatcher.metrics().snapshot();
    assert!(snapshot.ignored_events >= 1);
    assert_eq!(snapshot.files_deleted, 1);
    Ok(())
}

#[tokio::test]
async fn shutdown_before_any_arrival_runs_no_cycles() -> anyhow::Result<()> {
    let workspace = Workspace::new()?;
    let config = workspace.config();
    let dispatcher = Dispatcher::new(Arc::new(config.clone()), Metrics::new()?);

    let cycles = watch(workspace.watch_dir(), &config, &dispatcher, async {}).await?;

    assert_eq!(cycles, 0);
    Ok(())
}

#[tokio::test]
async fn watching_a_missing_directory_fails_at_startup() -> anyhow::Result<()> {
    let workspace = Workspace::new()?;
    let config = workspace.config();
    let dispatcher = Dispatcher::new(Arc::new(config.clone()), Metrics::new()?);
    let missing = workspace.watch_dir().join("gone");

    let result = watch(&missing, &config, &dispatcher, std::future::pending()).await;

    assert!(result.is_err());
    Ok(())
}
