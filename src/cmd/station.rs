//! Scanner station commands — `scanstation scan` and `scanstation complete`.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use scanstation::capture::{Key, NamedKey};
use scanstation::client::{HttpStationClient, StationApi};
use scanstation::errors::ClientError;
use scanstation::protocol::{CompletionEnvelope, CompletionRequest, Station};
use scanstation::station::{PageController, SubmissionResult, spawn_submission};
use scanstation::station_config::StationConfig;
use scanstation::ui::{RequestSpinner, StationScreen};

pub async fn cmd_scan(config: &StationConfig, station: Station) -> Result<()> {
    let api: Arc<dyn StationApi> = Arc::new(HttpStationClient::new(config.server())?);
    let mut page = PageController::new(station, config.capture_mode());
    let mut screen = StationScreen::new();

    let term = screen.term().clone();
    if !term.is_term() {
        anyhow::bail!("scan needs an interactive terminal");
    }

    info!(
        %station,
        mode = %config.capture_mode(),
        server = %config.server().base_url,
        "station started"
    );

    // console reads keys synchronously; feed them to the async loop.
    let (key_tx, mut key_rx) = mpsc::unbounded_channel::<std::io::Result<console::Key>>();
    std::thread::spawn(move || {
        loop {
            let key = term.read_key();
            let failed = key.is_err();
            if key_tx.send(key).is_err() || failed {
                break;
            }
        }
    });

    let (log_tx, mut log_rx) = mpsc::unbounded_channel::<SubmissionResult>();
    let (done_tx, mut done_rx) =
        mpsc::unbounded_channel::<Result<CompletionEnvelope, ClientError>>();

    screen.draw(&page)?;
    loop {
        tokio::select! {
            key = key_rx.recv() => {
                let key = match key {
                    Some(Ok(key)) => Key::from(key),
                    Some(Err(e)) if e.kind() == std::io::ErrorKind::Interrupted => break,
                    Some(Err(e)) => return Err(e).context("Failed to read key"),
                    None => break,
                };
                match key {
                    Key::Named(NamedKey::CtrlC) => break,
                    Key::Named(NamedKey::Enter) => match page.begin_completion() {
                        Ok(request) => {
                            spawn_completion(Arc::clone(&api), station, request, done_tx.clone())
                        }
                        Err(e) => debug!(error = %e, "completion not started"),
                    },
                    Key::Named(NamedKey::Tab) => {
                        page.toggle_photo();
                    }
                    Key::Named(NamedKey::Escape) => page.reset(),
                    key => {
                        for pending in page.on_key(&key) {
                            spawn_submission(Arc::clone(&api), station, pending, log_tx.clone());
                        }
                    }
                }
            }
            Some((pending, result)) = log_rx.recv() => {
                page.apply_log_response(&pending, result);
            }
            Some(result) = done_rx.recv() => {
                page.apply_completion(result);
            }
            _ = tokio::signal::ctrl_c() => break,
        }
        screen.draw(&page)?;
    }

    info!(%station, "station stopped");
    Ok(())
}

fn spawn_completion(
    api: Arc<dyn StationApi>,
    station: Station,
    request: CompletionRequest,
    tx: mpsc::UnboundedSender<Result<CompletionEnvelope, ClientError>>,
) {
    tokio::spawn(async move {
        let result = api.complete_task(station, &request).await;
        if tx.send(result).is_err() {
            debug!("scan loop closed before completion arrived");
        }
    });
}

pub async fn cmd_complete(
    config: &StationConfig,
    station: Station,
    employee_sequence: &str,
    task_id: Option<i64>,
) -> Result<()> {
    let client = HttpStationClient::new(config.server())?;
    let mut request = CompletionRequest::new(employee_sequence.trim_matches(|c| c == '(' || c == ')'));
    if let Some(task_id) = task_id {
        request = request.with_task_id(task_id);
    }

    let spinner = RequestSpinner::start(format!("Завершение задачи ({})", station.title()));
    let envelope = match client.complete_task(station, &request).await {
        Ok(envelope) => envelope,
        Err(e) => {
            spinner.fail("Сервер недоступен");
            return Err(e).context("Completion request failed");
        }
    };

    if envelope.ok {
        info!(%station, employee = %request.employee_sequence, "task completed");
        spinner.succeed("Задача завершена");
        Ok(())
    } else {
        spinner.fail(&envelope.message);
        anyhow::bail!("Server refused completion: {}", envelope.message)
    }
}
