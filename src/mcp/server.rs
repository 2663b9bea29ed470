use crate::error::{BspecError, Result};
use crate::mcp::tools;
use crate::mcp::types::*;
use crate::query::QueryEngine;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader as AsyncBufReader};

/// MCP Server implementation
///
/// Owns the engine (and through it the collection and taxonomy) built once at
/// startup. Requests only read from it.
pub struct McpServer {
    engine: QueryEngine,
    similar_limit: usize,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(engine: QueryEngine, similar_limit: usize) -> Self {
        Self {
            engine,
            similar_limit,
        }
    }

    /// Process an MCP JSON-RPC request
    ///
    /// # Arguments
    /// * `request` - The JSON-RPC request to process
    /// * `initialized` - Set once the client sends `notifications/initialized`
    ///
    /// # Returns
    /// * `Some(response)` - Response to send back to client
    /// * `None` - Notification (no response needed)
    pub fn process_mcp_request(
        &self,
        request: JsonRpcRequest,
        initialized: &mut bool,
    ) -> Option<JsonRpcResponse> {
        // Notifications carry no id and get no response
        let id = match &request.id {
            Some(id) => id.clone(),
            None => {
                if request.method == "notifications/initialized" {
                    *initialized = true;
                }
                return None;
            }
        };

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(&id, &request.params),
            "tools/list" => self.handle_tools_list(&id),
            "tools/call" => self.handle_tools_call(&id, &request.params),
            "shutdown" => Ok(JsonRpcResponse::result(id.clone().into(), Value::Null)),
            _ => Ok(JsonRpcResponse::error(
                id.clone().into(),
                error_codes::METHOD_NOT_FOUND,
                format!("Unknown method: {}", request.method),
            )),
        };

        Some(response.unwrap_or_else(|e| {
            let code = match e {
                BspecError::McpProtocol(_) => error_codes::INVALID_PARAMS,
                _ => error_codes::INTERNAL_ERROR,
            };
            log::warn!("{} failed: {}", request.method, e);
            JsonRpcResponse::error(id.into(), code, e.to_string())
        }))
    }

    /// Run the MCP server (reads from stdin, writes to stdout)
    pub async fn run(&self) -> Result<()> {
        let stdin = AsyncBufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();

        log::info!(
            "BSpec MCP server v{} starting with {} documents",
            env!("CARGO_PKG_VERSION"),
            self.engine.documents().len()
        );

        self.serve(stdin, stdout).await?;

        log::info!("MCP server shutting down");
        Ok(())
    }

    /// Newline-delimited JSON-RPC loop over any reader/writer pair, until EOF
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();
        let mut initialized = false;

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            // EOF - client disconnected
            if bytes_read == 0 {
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str(trimmed) {
                Ok(req) => req,
                Err(e) => {
                    let response = JsonRpcResponse::error(
                        extract_id_from_line(trimmed),
                        error_codes::PARSE_ERROR,
                        format!("Parse error: {}", e),
                    );
                    send_response(&mut writer, &response).await?;
                    continue;
                }
            };

            let was_initialized = initialized;
            match self.process_mcp_request(request, &mut initialized) {
                Some(response) => send_response(&mut writer, &response).await?,
                None => {
                    if initialized && !was_initialized {
                        log::info!("Client initialized");
                    }
                }
            }
        }

        Ok(())
    }

    /// Handle initialize request
    fn handle_initialize(&self, id: &JsonRpcId, params: &Option<Value>) -> Result<JsonRpcResponse> {
        let params: InitializeParams =
            serde_json::from_value(params.clone().unwrap_or(serde_json::json!({})))
                .map_err(|e| BspecError::McpProtocol(format!("Invalid initialize params: {}", e)))?;

        // Answer 2024/2025 clients with the stable version
        let protocol_version = if params.protocol_version.starts_with("2024")
            || params.protocol_version.starts_with("2025")
        {
            "2024-11-05".to_string()
        } else {
            params.protocol_version
        };

        let result = InitializeResult {
            protocol_version,
            capabilities: serde_json::json!({
                "tools": {}
            }),
            server_info: ServerInfo {
                name: "bspec-graph".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        Ok(JsonRpcResponse::result(id.clone().into(), serde_json::to_value(&result)?))
    }

    /// Handle tools/list request
    fn handle_tools_list(&self, id: &JsonRpcId) -> Result<JsonRpcResponse> {
        let result = ToolsListResult {
            tools: tools::get_tool_definitions(),
        };

        Ok(JsonRpcResponse::result(id.clone().into(), serde_json::to_value(&result)?))
    }

    /// Handle tools/call request
    fn handle_tools_call(&self, id: &JsonRpcId, params: &Option<Value>) -> Result<JsonRpcResponse> {
        let params: ToolsCallParams = serde_json::from_value(
            params
                .clone()
                .ok_or_else(|| BspecError::McpProtocol("Missing params for tools/call".to_string()))?,
        )
        .map_err(|e| BspecError::McpProtocol(format!("Invalid tools/call params: {}", e)))?;

        let call = ToolCall::try_from(params)?;
        log::debug!("tools/call {:?}", call);

        let result = tools::handle_tool_call(call, &self.engine, self.similar_limit)?;

        Ok(JsonRpcResponse::result(id.clone().into(), serde_json::to_value(&result)?))
    }
}

/// Send JSON-RPC response (newline-delimited)
async fn send_response<W: AsyncWrite + Unpin>(writer: &mut W, response: &JsonRpcResponse) -> Result<()> {
    let json = serde_json::to_string(response)?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

/// Id of a request that failed to decode, or null when there is none
fn extract_id_from_line(line: &str) -> Value {
    serde_json::from_str::<Value>(line)
        .ok()
        .and_then(|value| value.get("id").cloned())
        .filter(|id| id.is_string() || id.is_number())
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::DocumentCollection;
    use crate::model::Document;
    use crate::taxonomy::Taxonomy;

    fn server() -> McpServer {
        let msn = Document::new("MSN-core", "MSN");
        let mut str_doc = Document::new("STR-growth", "STR");
        str_doc.depends_on = vec!["MSN-core".into()];
        let engine = QueryEngine::new(DocumentCollection::new(vec![msn, str_doc]), Taxonomy::default());
        McpServer::new(engine, 5)
    }

    async fn exchange(server: &McpServer, input: &str) -> Vec<Value> {
        let mut output = Vec::new();
        server.serve(input.as_bytes(), &mut output).await.unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_extract_id_from_line() {
        let line = r#"{"jsonrpc":"2.0","id":"test-123"}"#;
        assert_eq!(extract_id_from_line(line), Value::String("test-123".to_string()));

        let line = r#"{"jsonrpc":"2.0","id":42,"params":[]}"#;
        assert_eq!(extract_id_from_line(line), serde_json::json!(42));

        assert_eq!(extract_id_from_line("{not json"), Value::Null);
    }

    #[test]
    fn test_json_rpc_request_parsing() {
        let json = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#;
        let request: JsonRpcRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.method, "initialize");
        assert_eq!(request.jsonrpc, "2.0");
        assert_eq!(request.id, Some(JsonRpcId::Number(1)));
    }

    #[tokio::test]
    async fn test_session_over_stdio_framing() {
        let server = server();
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-06-18"}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"bspec_impact","arguments":{"id":"MSN-core"}}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":4,"method":"shutdown"}"#,
            "\n",
        );

        let responses = exchange(&server, input).await;
        assert_eq!(responses.len(), 4);

        assert_eq!(responses[0]["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(responses[0]["result"]["serverInfo"]["name"], "bspec-graph");
        assert_eq!(responses[1]["result"]["tools"].as_array().unwrap().len(), 10);

        let text = responses[2]["result"]["content"][0]["text"].as_str().unwrap();
        let impact: Value = serde_json::from_str(text).unwrap();
        assert_eq!(impact["directlyAffected"], serde_json::json!(["STR-growth"]));

        assert_eq!(responses[3]["id"], 4);
        assert!(responses[3]["result"].is_null());
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let server = server();
        let input = concat!(
            "{broken\n",
            r#"{"jsonrpc":"2.0","id":"a","method":"resources/list"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":"b","method":"tools/call","params":{"name":"bspec_unknown"}}"#,
            "\n",
        );

        let responses = exchange(&server, input).await;
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["error"]["code"], error_codes::PARSE_ERROR);
        assert!(responses[0]["id"].is_null());
        assert_eq!(responses[1]["error"]["code"], error_codes::METHOD_NOT_FOUND);
        assert_eq!(responses[2]["id"], "b");
        assert_eq!(responses[2]["error"]["code"], error_codes::INVALID_PARAMS);
    }
}
