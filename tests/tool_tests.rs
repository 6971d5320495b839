//! Tests for the tool system.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use courier::error::CourierError;
use courier::executor::{ConnectionDirectory, RemoteTaskExecutor};
use courier::generation::text::execute_tool_call;
use courier::tools::builtin::{list_connections_tool, think_tool};
use courier::tools::*;
use courier::types::AgentToolCall;

#[test]
fn parameter_builder_constructs_schema() {
    let params = AgentToolParameters::object()
        .string("task", "What to do", true)
        .integer("count", "How many", false)
        .boolean("verbose", "Enable verbose output", false)
        .build();

    let schema = &params.schema;
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["properties"]["task"]["type"], "string");
    assert_eq!(schema["properties"]["count"]["type"], "integer");
    assert_eq!(schema["required"], json!(["task"]));
}

#[test]
fn empty_parameters() {
    let params = AgentToolParameters::empty();
    assert_eq!(params.schema["type"], "object");
}

#[test]
fn tool_arguments_accessors() {
    let args = ToolArguments::new(json!({"task": "star", "count": "3"}));
    assert_eq!(args.get_str("task").unwrap(), "star");
    assert!(args.get_str("missing").is_err());
    assert_eq!(args.get_u64_opt("count"), Some(3));
    assert_eq!(args.get_str_opt("missing"), None);
}

#[test]
fn tool_arguments_deserialize() {
    #[derive(serde::Deserialize, PartialEq, Debug)]
    struct Params {
        task: String,
        count: Option<u32>,
    }

    let args = ToolArguments::new(json!({"task": "star", "count": 5}));
    let params: Params = args.deserialize().unwrap();
    assert_eq!(
        params,
        Params {
            task: "star".into(),
            count: Some(5)
        }
    );
}

#[tokio::test]
async fn agent_tool_executes() {
    let tool = AgentTool::new(
        "greet",
        "Greet a person",
        AgentToolParameters::object()
            .string("name", "Name", true)
            .build(),
        |args, _ctx| async move {
            let name = args.get_str("name")?;
            Ok(json!({"greeting": format!("Hello, {name}!")}))
        },
    );

    assert_eq!(tool.name(), "greet");
    let args = ToolArguments::new(json!({"name": "World"}));
    let result = tool
        .execute(&args, &ToolExecutionContext::default())
        .await
        .unwrap();
    assert_eq!(result["greeting"], "Hello, World!");
}

struct FixedExecutor(Result<&'static str, u16>);

#[async_trait]
impl RemoteTaskExecutor for FixedExecutor {
    async fn execute(&self, _instruction: &str) -> Result<String, CourierError> {
        match self.0 {
            Ok(output) => Ok(output.to_string()),
            Err(status) => Err(CourierError::api(status, "unavailable")),
        }
    }
}

#[tokio::test]
async fn delegation_tool_returns_result_text_to_the_model() {
    let tools = ToolSet::new().with(Arc::new(DelegationTool::new(Arc::new(FixedExecutor(Ok(
        "Starred 2 emails",
    ))))));
    let call = AgentToolCall {
        id: "call_1".into(),
        name: DELEGATION_TOOL_NAME.into(),
        arguments: json!("{\"task\": \"Star emails\"}"),
    };

    let result = execute_tool_call(&tools, &call).await;
    assert!(!result.is_error);
    assert_eq!(result.tool_call_id, "call_1");
    assert_eq!(result.result, json!("Starred 2 emails"));
}

#[tokio::test]
async fn delegation_failures_reach_the_model_as_text() {
    let tools = ToolSet::new().with(Arc::new(DelegationTool::new(Arc::new(FixedExecutor(
        Err(503),
    )))));
    let call = AgentToolCall {
        id: "call_2".into(),
        name: DELEGATION_TOOL_NAME.into(),
        arguments: json!({"task": "Star emails"}),
    };

    let result = execute_tool_call(&tools, &call).await;
    assert!(!result.is_error);
    assert!(result
        .result
        .as_str()
        .unwrap()
        .starts_with("Error using delegated agent: "));
}

#[tokio::test]
async fn missing_task_argument_is_a_tool_error() {
    let tools = ToolSet::new().with(Arc::new(DelegationTool::new(Arc::new(FixedExecutor(Ok(
        "unused",
    ))))));
    let call = AgentToolCall {
        id: "call_3".into(),
        name: DELEGATION_TOOL_NAME.into(),
        arguments: json!({}),
    };

    let result = execute_tool_call(&tools, &call).await;
    assert!(result.is_error);
}

#[tokio::test]
async fn unknown_tool_is_reported_not_fatal() {
    let tools = ToolSet::new().with(think_tool());
    let call = AgentToolCall {
        id: "call_4".into(),
        name: "send_fax".into(),
        arguments: json!({}),
    };

    let result = execute_tool_call(&tools, &call).await;
    assert!(result.is_error);
    assert_eq!(result.result["error"], "Tool 'send_fax' not found");
}

struct Directory(Result<serde_json::Value, ()>);

#[async_trait]
impl ConnectionDirectory for Directory {
    async fn list_connections(&self) -> Result<serde_json::Value, CourierError> {
        self.0
            .clone()
            .map_err(|_| CourierError::Authentication("invalid secret".into()))
    }
}

#[tokio::test]
async fn list_connections_relays_directory_output_and_errors() {
    let ok = list_connections_tool(Arc::new(Directory(Ok(json!({"rows": [{"platform": "gmail"}]})))));
    let value = ok
        .execute(&ToolArguments::new(json!({})), &ToolExecutionContext::default())
        .await
        .unwrap();
    assert!(value.to_string().contains("gmail"));

    let failing = list_connections_tool(Arc::new(Directory(Err(()))));
    let value = failing
        .execute(&ToolArguments::new(json!({})), &ToolExecutionContext::default())
        .await
        .unwrap();
    assert!(value["error"].as_str().unwrap().contains("invalid secret"));
}

#[test]
fn tool_set_replaces_tools_with_the_same_name() {
    let mut tools = ToolSet::new();
    tools.register(think_tool());
    tools.register(think_tool());
    assert_eq!(tools.len(), 1);
    assert_eq!(tools.names(), vec!["think"]);
}
