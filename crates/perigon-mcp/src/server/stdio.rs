//! Stdio transport: newline-delimited JSON-RPC 2.0 over stdin/stdout.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::protocol::{JsonRpcRequest, JsonRpcResponse, codes, handle_request};
use super::session::McpConnection;
use crate::tools::ToolRegistry;

/// Serve MCP over the process's stdin and stdout until stdin closes.
///
/// # Errors
///
/// Returns error on I/O failure.
pub async fn run_stdio(registry: &ToolRegistry, conn: &McpConnection) -> anyhow::Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    let writer = tokio::io::stdout();
    serve(reader, writer, registry, conn).await
}

/// Serve MCP over any line-oriented reader/writer pair.
///
/// # Errors
///
/// Returns error on I/O failure.
pub async fn serve<R, W>(
    mut reader: R,
    mut writer: W,
    registry: &ToolRegistry,
    conn: &McpConnection,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();
    tracing::info!("MCP stdio server ready");

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            tracing::info!("Stdin closed, shutting down");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<JsonRpcRequest>(trimmed) {
            Ok(request) => {
                tracing::debug!(method = %request.method, "Received request");
                handle_request(&request, registry, conn).await
            }
            Err(err) => Some(JsonRpcResponse::error(
                None,
                codes::PARSE_ERROR,
                format!("Parse error: {err}"),
            )),
        };

        if let Some(response) = response {
            let mut payload = serde_json::to_vec(&response)?;
            payload.push(b'\n');
            writer.write_all(&payload).await?;
            writer.flush().await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::PerigonClient;
    use crate::config::Config;
    use crate::tools::{ToolContext, ToolName};

    #[tokio::test]
    async fn test_serves_line_by_line() {
        let client = PerigonClient::new(&Config::for_testing("http://127.0.0.1:9")).unwrap();
        let conn = McpConnection::with_tools(
            ToolContext::new(client),
            vec![ToolName::SearchNewsArticles],
        );
        let registry = ToolRegistry::new();

        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            "not json\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n",
        );
        let mut output = Vec::new();
        serve(input.as_bytes(), &mut output, &registry, &conn).await.unwrap();

        let lines: Vec<serde_json::Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["result"]["serverInfo"]["name"], "perigon-mcp");
        assert_eq!(lines[1]["error"]["code"], codes::PARSE_ERROR);
        assert_eq!(lines[2]["result"]["tools"][0]["name"], "search_news_articles");
    }
}
