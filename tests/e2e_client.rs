mod support;

use std::future::Future;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use reqgate::client::{ClientConfig, HttpClient, RequestConfig};
use reqgate::error::{ClientError, GateError};

use support::spawn_http_server;

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

fn client_for(base_url: &str) -> Result<Arc<HttpClient>, String> {
    let config = ClientConfig {
        base_url: Some(base_url.to_owned()),
        timeout: Some(Duration::from_secs(5)),
        token: None,
        client_id: None,
        default_headers: Vec::new(),
        queue_timeout: None,
    };
    HttpClient::new(config)
        .map(Arc::new)
        .map_err(|err| format!("client build failed: {}", err))
}

async fn wait_seen(seen_rx: &mpsc::Receiver<String>) -> Result<String, String> {
    for _ in 0..500 {
        if let Ok(line) = seen_rx.try_recv() {
            return Ok(line);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    Err("timed out waiting for the server to see a request".to_owned())
}

#[test]
fn e2e_basic_get() -> Result<(), String> {
    run_async_test(async {
        let (url, _server, _seen) = spawn_http_server(Duration::ZERO)?;
        let client = client_for(&url)?;

        let response = client
            .request(RequestConfig::get("ping"))
            .await
            .map_err(|err| format!("request failed: {}", err))?;
        let body = response
            .text()
            .await
            .map_err(|err| format!("body read failed: {}", err))?;
        if body != "OK" {
            return Err(format!("unexpected body: {}", body));
        }
        Ok(())
    })
}

#[test]
fn e2e_duplicate_request_is_superseded() -> Result<(), String> {
    run_async_test(async {
        let (url, _server, seen_rx) = spawn_http_server(Duration::from_millis(300))?;
        let client = client_for(&url)?;

        let first = tokio::spawn({
            let client = Arc::clone(&client);
            async move { client.request(RequestConfig::get("dup")).await }
        });

        // The duplicate is only issued once the first request is on the wire.
        let line = wait_seen(&seen_rx).await?;
        if line != "GET /dup" {
            return Err(format!("unexpected request line: {}", line));
        }

        let second = client
            .request(RequestConfig::get("dup"))
            .await
            .map_err(|err| format!("second request failed: {}", err))?;
        let body = second
            .text()
            .await
            .map_err(|err| format!("body read failed: {}", err))?;
        if body != "OK" {
            return Err(format!("unexpected body: {}", body));
        }

        match first.await {
            Ok(Err(GateError::Client(ClientError::Superseded { key }))) => {
                if key != "GET-dup" {
                    return Err(format!("unexpected key in error: {}", key));
                }
                Ok(())
            }
            Ok(Ok(_)) => Err("first request should have been canceled".to_owned()),
            Ok(Err(other)) => Err(format!("unexpected error: {}", other)),
            Err(err) => Err(format!("join failed: {}", err)),
        }
    })
}

#[test]
fn e2e_same_url_requests_are_serialized() -> Result<(), String> {
    run_async_test(async {
        let (url, _server, seen_rx) = spawn_http_server(Duration::from_millis(100))?;
        let client = client_for(&url)?;
        client.serialize_url("q");

        let get = tokio::spawn({
            let client = Arc::clone(&client);
            async move { client.request(RequestConfig::get("q")).await }
        });
        let line = wait_seen(&seen_rx).await?;
        if line != "GET /q" {
            return Err(format!("unexpected request line: {}", line));
        }

        // Same URL, different method: no duplicate cancellation, but the
        // serializer parks it until the GET completes.
        let post = tokio::spawn({
            let client = Arc::clone(&client);
            async move {
                client
                    .request(RequestConfig::post("q", serde_json::json!({"n": 1})))
                    .await
            }
        });
        tokio::time::sleep(Duration::from_millis(30)).await;
        if client.serializer().pending("q") != 1 {
            return Err("POST should be parked behind the GET".to_owned());
        }

        get.await
            .map_err(|err| format!("join failed: {}", err))?
            .map_err(|err| format!("GET failed: {}", err))?;
        post.await
            .map_err(|err| format!("join failed: {}", err))?
            .map_err(|err| format!("POST failed: {}", err))?;

        let next_line = wait_seen(&seen_rx).await?;
        if next_line != "POST /q" {
            return Err(format!("POST reached the server out of turn: {}", next_line));
        }
        if client.serializer().pending("q") != 0 {
            return Err("queue should be drained".to_owned());
        }
        Ok(())
    })
}

#[test]
fn e2e_sequential_identical_requests_both_succeed() -> Result<(), String> {
    run_async_test(async {
        let (url, _server, _seen) = spawn_http_server(Duration::ZERO)?;
        let client = client_for(&url)?;

        for _ in 0..2 {
            client
                .request(RequestConfig::get("twice"))
                .await
                .map_err(|err| format!("request failed: {}", err))?;
        }
        Ok(())
    })
}
