//! JSON-lines transport: one request per input line, one response per output line.
//!
//! Requests run concurrently; responses are written as they complete and
//! carry the request's `id` when one was given.

use color_eyre::{eyre::eyre, Result};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::tools::{ToolError, ToolRequest, ToolResponse, Toolbox};

/// Serve requests from `reader` until EOF, then wait for in-flight calls.
pub async fn serve<R, W>(toolbox: Toolbox, reader: R, mut writer: W) -> Result<()>
where
  R: AsyncBufRead + Unpin,
  W: AsyncWrite + Unpin,
{
  let (tx, mut rx) = mpsc::unbounded_channel::<Value>();
  let mut lines = reader.lines();

  let read = async move {
    loop {
      // The receiver only goes away when the writer failed, stop taking requests then
      let line = tokio::select! {
        line = lines.next_line() => line.map_err(|e| eyre!("Failed to read request: {}", e))?,
        _ = tx.closed() => break,
      };
      let Some(line) = line else { break };
      if line.trim().is_empty() {
        continue;
      }
      let toolbox = toolbox.clone();
      let tx = tx.clone();
      tokio::spawn(async move {
        let response = handle_line(&toolbox, &line).await;
        if tx.send(response).is_err() {
          tracing::debug!("dropping response, output closed");
        }
      });
    }
    Ok::<_, color_eyre::Report>(())
  };

  let write = async move {
    while let Some(response) = rx.recv().await {
      let mut line = response.to_string();
      line.push('\n');
      writer
        .write_all(line.as_bytes())
        .await
        .map_err(|e| eyre!("Failed to write response: {}", e))?;
      writer
        .flush()
        .await
        .map_err(|e| eyre!("Failed to flush response: {}", e))?;
    }
    Ok::<_, color_eyre::Report>(())
  };

  let (read, write) = tokio::join!(read, write);
  read?;
  write?;
  Ok(())
}

/// Decode one request line, run it, and encode the response.
pub async fn handle_line(toolbox: &Toolbox, line: &str) -> Value {
  let (id, response) = match serde_json::from_str::<Value>(line) {
    Ok(mut value) => {
      let id = value.as_object_mut().and_then(|o| o.remove("id"));
      let response = match ToolRequest::from_json(value) {
        Ok(request) => toolbox.call(request).await,
        Err(e) => {
          tracing::warn!(error = %e, "rejected tool call");
          ToolResponse::from(e)
        }
      };
      (id, response)
    }
    Err(e) => {
      let e = ToolError::InvalidArguments(format!("request is not valid JSON: {}", e));
      (None, ToolResponse::from(e))
    }
  };

  let mut encoded = serde_json::to_value(&response).unwrap_or_else(|e| {
    json!({"status": "error", "kind": "internal", "message": e.to_string()})
  });
  if let (Some(id), Some(object)) = (id, encoded.as_object_mut()) {
    object.insert("id".to_string(), id);
  }
  encoded
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{CaseSet, CaseSetStore};
  use crate::gdc::{CaseSource, Predicate, SourceError};
  use async_trait::async_trait;
  use std::io;
  use std::pin::Pin;
  use std::sync::Arc;
  use std::task::{Context, Poll};
  use std::time::Duration;

  /// Every project has cases a, b; every other predicate has case a.
  struct StaticSource;

  #[async_trait]
  impl CaseSource for StaticSource {
    async fn fetch_cases(&self, predicate: &Predicate) -> Result<CaseSet, SourceError> {
      Ok(match predicate {
        Predicate::Project { .. } => ["a", "b"].into_iter().collect(),
        _ => ["a"].into_iter().collect(),
      })
    }
  }

  fn toolbox() -> Toolbox {
    Toolbox::new(Arc::new(CaseSetStore::new()), Arc::new(StaticSource))
  }

  #[tokio::test]
  async fn test_handle_line_echoes_id() {
    let response = handle_line(
      &toolbox(),
      r#"{"id": 7, "tool": "get_cases_by_project", "arguments": {"project": "TCGA-LUAD"}}"#,
    )
    .await;
    assert_eq!(response["id"], 7);
    assert_eq!(response["status"], "ok");
    assert!(response["result"]["handle"]
      .as_str()
      .unwrap()
      .starts_with("project-"));
  }

  #[tokio::test]
  async fn test_handle_line_rejects_bad_json() {
    let response = handle_line(&toolbox(), "{not json").await;
    assert_eq!(response["status"], "error");
    assert_eq!(response["kind"], "invalid_arguments");
    assert!(response.get("id").is_none());
  }

  #[tokio::test]
  async fn test_handle_line_reports_missing_arguments() {
    let response = handle_line(
      &toolbox(),
      r#"{"id": "x", "tool": "compute_case_intersection", "arguments": {"case_set_a": "ssm-0123456789abcdef"}}"#,
    )
    .await;
    assert_eq!(response["id"], "x");
    assert_eq!(response["kind"], "invalid_arguments");
    assert!(response["message"].as_str().unwrap().contains("case_set_b"));
  }

  #[tokio::test]
  async fn test_serve_answers_every_line() {
    let input = concat!(
      r#"{"id": 1, "tool": "get_cases_by_project", "arguments": {"project": "TCGA-COAD"}}"#,
      "\n\n",
      r#"{"id": 2, "tool": "get_microsatellite_instability_occurrences", "arguments": {}}"#,
      "\n",
      r#"{"id": 3, "tool": "no_such_tool", "arguments": {}}"#,
      "\n",
    );
    let mut output = Vec::new();

    serve(toolbox(), input.as_bytes(), &mut output).await.unwrap();

    let mut responses: Vec<Value> = String::from_utf8(output)
      .unwrap()
      .lines()
      .map(|line| serde_json::from_str(line).unwrap())
      .collect();
    responses.sort_by_key(|r| r["id"].as_u64());

    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["status"], "ok");
    assert_eq!(responses[1]["status"], "ok");
    assert_eq!(responses[1]["result"]["empty"], false);
    assert_eq!(responses[2]["kind"], "invalid_arguments");
  }

  /// Output whose every write fails, like a closed pipe.
  struct BrokenPipe;

  impl AsyncWrite for BrokenPipe {
    fn poll_write(self: Pin<&mut Self>, _: &mut Context<'_>, _: &[u8]) -> Poll<io::Result<usize>> {
      Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
    }

    fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
      Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
      Poll::Ready(Ok(()))
    }
  }

  #[tokio::test]
  async fn test_serve_stops_reading_when_output_fails() {
    let (mut agent, input) = tokio::io::duplex(1024);
    agent
      .write_all(b"{\"tool\": \"get_cases_by_project\", \"arguments\": {\"project\": \"TCGA-COAD\"}}\n")
      .await
      .unwrap();

    // `agent` stays open, so input never reaches EOF
    let result = tokio::time::timeout(
      Duration::from_secs(5),
      serve(toolbox(), tokio::io::BufReader::new(input), BrokenPipe),
    )
    .await
    .expect("serve kept reading after its output failed");

    assert!(result.unwrap_err().to_string().contains("Failed to write response"));
    drop(agent);
  }
}
