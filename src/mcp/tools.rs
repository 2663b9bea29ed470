use serde::Serialize;
use serde_json::json;

use crate::analysis::{analyze_impact, critical_path, find_chains};
use crate::error::Result;
use crate::graph::build_graph;
use crate::mcp::types::{Tool, ToolCall, ToolsCallResult};
use crate::query::QueryEngine;
use crate::validate::{validate_collection, validate_document, ValidationOptions};

/// Get all tool definitions for tools/list
pub fn get_tool_definitions() -> Vec<Tool> {
    let id_only = |description: &str| {
        json!({
            "type": "object",
            "properties": {
                "id": { "type": "string", "description": description }
            },
            "required": ["id"]
        })
    };
    let no_arguments = || json!({ "type": "object", "properties": {} });

    vec![
        Tool {
            name: "bspec_query".to_string(),
            description: "Filter, search, sort and page BSpec documents. Returns matches, total count, applied filters and suggestions.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "types": { "type": "array", "items": {"type": "string"}, "description": "Type codes, e.g. MSN, STR" },
                    "domains": { "type": "array", "items": {"type": "string"}, "description": "Business domains, e.g. strategic, market" },
                    "statuses": { "type": "array", "items": {"type": "string", "enum": ["Draft", "Review", "Accepted", "Deprecated"]} },
                    "priorities": { "type": "array", "items": {"type": "string", "enum": ["critical", "high", "medium", "low"]} },
                    "textSearch": { "type": "string", "description": "Case-insensitive substring" },
                    "searchFields": { "type": "array", "items": {"type": "string", "enum": ["title", "content", "tags", "id"]} },
                    "dependsOn": { "type": "array", "items": {"type": "string"} },
                    "enables": { "type": "array", "items": {"type": "string"} },
                    "relatedTo": { "type": "array", "items": {"type": "string"} },
                    "conflictsWith": { "type": "array", "items": {"type": "string"} },
                    "createdAfter": { "type": "string", "description": "YYYY-MM-DD, inclusive" },
                    "createdBefore": { "type": "string", "description": "YYYY-MM-DD, inclusive" },
                    "updatedAfter": { "type": "string", "description": "YYYY-MM-DD, inclusive" },
                    "updatedBefore": { "type": "string", "description": "YYYY-MM-DD, inclusive" },
                    "owner": { "type": "string" },
                    "stakeholders": { "type": "array", "items": {"type": "string"} },
                    "reviewers": { "type": "array", "items": {"type": "string"} },
                    "hasSuccessCriteria": { "type": "boolean" },
                    "hasRisks": { "type": "boolean" },
                    "hasMetrics": { "type": "boolean" },
                    "sortBy": { "type": "string", "enum": ["created", "updated", "title", "type", "status", "relationships"] },
                    "sortOrder": { "type": "string", "enum": ["asc", "desc"], "default": "asc" },
                    "offset": { "type": "integer", "minimum": 0, "default": 0 },
                    "limit": { "type": "integer", "minimum": 0 },
                    "includeContent": { "type": "boolean", "default": false }
                }
            }),
        },
        Tool {
            name: "bspec_get".to_string(),
            description: "Retrieve a single document by id".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": { "type": "string", "description": "Document id, e.g. STR-growth" },
                    "includeContent": { "type": "boolean", "default": true, "description": "Include the markdown body" }
                },
                "required": ["id"]
            }),
        },
        Tool {
            name: "bspec_graph".to_string(),
            description: "Build the relationship graph: nodes, edges, domain clusters and metrics".to_string(),
            input_schema: no_arguments(),
        },
        Tool {
            name: "bspec_impact".to_string(),
            description: "Which documents are affected if the given document changes, with a risk level".to_string(),
            input_schema: id_only("Document id to analyse"),
        },
        Tool {
            name: "bspec_chains".to_string(),
            description: "Dependency chains in the collection, longest first, with circularity and risk factors".to_string(),
            input_schema: no_arguments(),
        },
        Tool {
            name: "bspec_similar".to_string(),
            description: "Documents most similar to the given one by domain, type family, shared relationships and content words".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": { "type": "string", "description": "Reference document id" },
                    "limit": { "type": "integer", "minimum": 1, "description": "Defaults to the configured similar_limit" }
                },
                "required": ["id"]
            }),
        },
        Tool {
            name: "bspec_stats".to_string(),
            description: "Collection statistics by type, domain and status, plus relationship and age figures".to_string(),
            input_schema: no_arguments(),
        },
        Tool {
            name: "bspec_validate".to_string(),
            description: "Validate one document (when id is given) or the whole collection".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": { "type": "string", "description": "Document id; omit to validate every document" }
                }
            }),
        },
        Tool {
            name: "bspec_critical_path".to_string(),
            description: "Foundation-first implementation path, estimated duration and blocking drafts".to_string(),
            input_schema: no_arguments(),
        },
        Tool {
            name: "bspec_recommendations".to_string(),
            description: "Missing document types, dangling relationships and empty domains".to_string(),
            input_schema: no_arguments(),
        },
    ]
}

/// Run a decoded tool call against the engine.
///
/// Unknown document ids are reported as tool errors (`isError: true`), not
/// protocol errors, except for impact analysis which answers with an empty
/// result.
pub fn handle_tool_call(
    call: ToolCall,
    engine: &QueryEngine,
    similar_limit: usize,
) -> Result<ToolsCallResult> {
    let documents = engine.documents();

    match call {
        ToolCall::Query(options) => json_result(&engine.query(&options)),
        ToolCall::Get { id, include_content } => match engine.collection().get(&id) {
            Some(doc) if include_content => json_result(doc),
            Some(doc) => json_result(&doc.without_content()),
            None => Ok(not_found(&id)),
        },
        ToolCall::Graph {} => json_result(&build_graph(documents, engine.taxonomy())),
        ToolCall::Impact { id } => json_result(&analyze_impact(&id, documents)),
        ToolCall::Chains {} => json_result(&find_chains(documents)),
        ToolCall::Similar { id, limit } => {
            if !engine.collection().contains(&id) {
                return Ok(not_found(&id));
            }
            json_result(&engine.similar(&id, limit.unwrap_or(similar_limit)))
        }
        ToolCall::Stats {} => json_result(&engine.stats()),
        ToolCall::Validate { id: Some(id) } => match engine.collection().get(&id) {
            Some(doc) => {
                let options = ValidationOptions {
                    taxonomy: engine.taxonomy(),
                    collection: Some(engine.collection()),
                };
                json_result(&validate_document(doc, &options))
            }
            None => Ok(not_found(&id)),
        },
        ToolCall::Validate { id: None } => {
            json_result(&validate_collection(engine.collection(), engine.taxonomy()))
        }
        ToolCall::CriticalPath {} => json_result(&critical_path(documents, engine.taxonomy())),
        ToolCall::Recommendations {} => json_result(&engine.recommendations()),
    }
}

fn json_result<T: Serialize + ?Sized>(value: &T) -> Result<ToolsCallResult> {
    Ok(ToolsCallResult::text(serde_json::to_string_pretty(value)?))
}

fn not_found(id: &str) -> ToolsCallResult {
    ToolsCallResult::error(format!("Document not found: {}", id))
}
