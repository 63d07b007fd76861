// SPDX-License-Identifier: MIT

//! Integration tests for graph execution and workflow loading
//!
//! These tests run the prebuilt graphs and the sample workflow files end to
//! end, with mock models standing in for the hosted API.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use pathway_rs::adk::error::{PathwayError, Result};
use pathway_rs::adk::model::{GenerationConfig, Message, Model, Part, Role};
use pathway_rs::adk::tool::Tool;
use pathway_rs::pathway::agents::{
    calculator_graph, calculator_state, conditional_calculator_graph,
    conditional_calculator_state, profile_graph, profile_state, react_graph, ChatSession,
    REACT_SYSTEM_PROMPT,
};
use pathway_rs::pathway::graph::{FnStep, GraphBuilder, GraphEvent, PredicateRouter, END};
use pathway_rs::pathway::state::{FieldType, Operation, State, StateSchema, StateUpdate, Value};
use pathway_rs::pathway::steps::fields::{MESSAGE, MESSAGES, RESULT};
use pathway_rs::pathway::tools::{calculator_tools, ToolRegistry};
use pathway_rs::pathway::workflow::{WorkflowBuilder, WorkflowLoader};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

// ============================================================================
// Mock Components
// ============================================================================

/// Mock model that returns predefined responses
struct MockModel {
    responses: Vec<Message>,
    response_index: AtomicUsize,
}

impl MockModel {
    fn new(responses: Vec<Message>) -> Self {
        Self {
            responses,
            response_index: AtomicUsize::new(0),
        }
    }

    fn tool_call_response(id: &str, tool_name: &str, args: serde_json::Value) -> Message {
        Message {
            role: Role::Assistant,
            parts: vec![Part::FunctionCall {
                id: id.to_string(),
                name: tool_name.to_string(),
                args,
            }],
        }
    }
}

#[async_trait]
impl Model for MockModel {
    fn provider(&self) -> &str {
        "mock"
    }

    async fn generate_content(
        &self,
        _history: &[Message],
        _config: Option<&GenerationConfig>,
        _tools: Option<&[Arc<dyn Tool>]>,
    ) -> Result<Message> {
        let idx = self.response_index.fetch_add(1, Ordering::SeqCst);
        if idx < self.responses.len() {
            Ok(self.responses[idx].clone())
        } else {
            Ok(Message::assistant("Max responses reached"))
        }
    }
}

/// Static schema for MockTool
static MOCK_TOOL_SCHEMA: Lazy<serde_json::Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "query": {"type": "string"}
        }
    })
});

/// Mock tool that returns a predefined response
struct MockTool {
    name: String,
    description: String,
    response: serde_json::Value,
}

impl MockTool {
    fn new(name: &str, response: serde_json::Value) -> Self {
        Self {
            name: name.to_string(),
            description: format!("Mock tool: {}", name),
            response,
        }
    }
}

#[async_trait]
impl Tool for MockTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn schema(&self) -> &serde_json::Value {
        &MOCK_TOOL_SCHEMA
    }

    async fn execute(&self, _input: serde_json::Value) -> Result<serde_json::Value> {
        Ok(self.response.clone())
    }
}

fn tool_results(messages: &[Message]) -> Vec<serde_json::Value> {
    messages
        .iter()
        .filter(|m| m.role == Role::Tool)
        .flat_map(|m| m.parts.iter())
        .filter_map(|p| match p {
            Part::FunctionResponse { response, .. } => Some(response.clone()),
            _ => None,
        })
        .collect()
}

fn workflow_path(name: &str) -> String {
    format!("{}/workflows/{}", env!("CARGO_MANIFEST_DIR"), name)
}

// ============================================================================
// Playground Graphs
// ============================================================================

#[tokio::test]
async fn test_subtraction_result() {
    let state = calculator_state(vec![1.0, 2.0, 3.0, 4.0], Operation::Subtract).unwrap();
    let state = calculator_graph().unwrap().invoke(state).await.unwrap();

    assert_eq!(
        state.get(RESULT),
        Some(&Value::from("The subtraction of [1, 2, 3, 4] is -8"))
    );
}

#[tokio::test]
async fn test_profile_message() {
    let skills = vec!["Python".to_string(), "AWS".to_string()];
    let state = profile_state("Benjamin", 20.0, skills).unwrap();
    let state = profile_graph().unwrap().invoke(state).await.unwrap();

    assert_eq!(
        state.get(MESSAGE),
        Some(&Value::from(
            "Hello Benjamin! You are an adult. Your skills are: Python, AWS."
        ))
    );
}

#[tokio::test]
async fn test_conditional_calculator_streams_route() {
    let state =
        conditional_calculator_state("Benjamin", vec![1.0, 2.0, 3.0, 4.0], Operation::Subtract)
            .unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let state = conditional_calculator_graph()
        .unwrap()
        .stream(state, tx)
        .await
        .unwrap();
    assert_eq!(
        state.get(MESSAGE),
        Some(&Value::from(
            "Hello Benjamin from aws-agent! The subtraction of [1, 2, 3, 4] is -8."
        ))
    );

    let mut routes = Vec::new();
    while let Some(event) = rx.recv().await {
        if let GraphEvent::Routed { from, to } = event {
            routes.push(format!("{} -> {}", from, to));
        }
    }
    assert_eq!(routes, vec!["greet -> subtract", "subtract -> END"]);
}

#[tokio::test]
async fn test_unknown_operation_is_rejected() {
    let err = "%".parse::<Operation>().unwrap_err();
    assert!(matches!(err, PathwayError::UnknownOperation(op) if op == "%"));

    let err = FieldType::Operation.parse("operation", "^").unwrap_err();
    assert!(matches!(err, PathwayError::UnknownOperation(_)));
}

// ============================================================================
// Execution Budget
// ============================================================================

#[tokio::test]
async fn test_cycle_without_exit_exceeds_budget() {
    let schema = StateSchema::new().field("count", FieldType::Number);
    let graph = GraphBuilder::new("ping_pong")
        .add_step(
            "ping",
            FnStep::new(&["count"], &["count"], |v| {
                Ok(StateUpdate::new().set("count", v.number("count")? + 1.0))
            }),
        )
        .add_step(
            "pong",
            FnStep::new(&[], &[], |_| Ok(StateUpdate::new())),
        )
        .set_entry_point("ping")
        .add_edge("ping", "pong")
        .add_conditional_edges(
            "pong",
            PredicateRouter::new(&[]).branch("ping", |_| Ok(true)).branch(END, |_| Ok(false)),
        )
        .max_iterations(7)
        .compile()
        .unwrap();

    let state = State::new(&schema).unwrap().with("count", 0.0).unwrap();
    let err = graph.invoke(state).await.unwrap_err();
    assert!(matches!(err, PathwayError::ExecutionBudgetExceeded { limit: 7 }));
}

// ============================================================================
// ReAct Loop
// ============================================================================

#[tokio::test]
async fn test_react_loop_with_mock_model() {
    let model = Arc::new(MockModel::new(vec![
        MockModel::tool_call_response("call_1", "subtract", json!({"a": 12, "b": 5})),
        MockModel::tool_call_response("call_2", "add", json!({"a": 7, "b": 3})),
        Message::assistant("12 minus 5, plus 3 is 10."),
    ]));
    let registry = ToolRegistry::with_tools(calculator_tools()).await;
    let graph = react_graph(model, &registry, GenerationConfig::default())
        .await
        .unwrap();

    let mut session = ChatSession::new(graph).with_system_prompt(REACT_SYSTEM_PROMPT);
    let reply = session.send("What is 12 minus 5, plus 3?").await.unwrap();

    assert_eq!(reply.text(), "12 minus 5, plus 3 is 10.");
    // system, human, call, result, call, result, answer
    assert_eq!(session.history().len(), 7);
    assert_eq!(
        tool_results(session.history()),
        vec![json!({"result": 7.0}), json!({"result": 10.0})]
    );
}

#[tokio::test]
async fn test_react_loop_reports_tool_errors_to_model() {
    let model = Arc::new(MockModel::new(vec![
        MockModel::tool_call_response("call_1", "lookup", json!({"query": "pi"})),
        MockModel::tool_call_response("call_2", "square_root", json!({"a": 4})),
        Message::assistant("done"),
    ]));
    let registry = ToolRegistry::with_tools(calculator_tools()).await;
    registry
        .register(Arc::new(MockTool::new("lookup", json!({"value": 3.14}))))
        .await;
    let graph = react_graph(model, &registry, GenerationConfig::default())
        .await
        .unwrap();

    let mut session = ChatSession::new(graph);
    session.send("pi?").await.unwrap();

    let results = tool_results(session.history());
    assert_eq!(results[0], json!({"value": 3.14}));
    assert!(results[1]["error"].as_str().unwrap().contains("square_root"));
}

#[tokio::test]
async fn test_react_loop_budget() {
    let looping = MockModel::tool_call_response("again", "add", json!({"a": 1, "b": 1}));
    let model = Arc::new(MockModel::new(vec![looping; 100]));
    let registry = ToolRegistry::with_tools(calculator_tools()).await;
    let graph = react_graph(model, &registry, GenerationConfig::default())
        .await
        .unwrap();

    let mut session = ChatSession::new(graph);
    let err = session.send("loop").await.unwrap_err();
    assert!(matches!(err, PathwayError::ExecutionBudgetExceeded { limit: 50 }));
    assert!(session.history().is_empty());
}

// ============================================================================
// Workflow Files
// ============================================================================

#[test]
fn test_sample_workflows_parse() {
    let loader = WorkflowLoader::new();
    for file in ["profile.yaml", "calculator.yaml", "react_calculator.yaml"] {
        let def = loader
            .load_workflow(workflow_path(file))
            .expect("Failed to parse workflow");
        assert!(!def.nodes.is_empty(), "{} has no nodes", file);
    }
}

#[tokio::test]
async fn test_profile_workflow_file() {
    let workflow = WorkflowBuilder::new()
        .build_file(workflow_path("profile.yaml"))
        .await
        .unwrap();

    assert_eq!(
        workflow.run().await.unwrap(),
        Value::from("Hello Benjamin! You are an adult. Your skills are: Python, AWS.")
    );
}

#[tokio::test]
async fn test_calculator_workflow_file_with_overrides() {
    let mut workflow = WorkflowBuilder::new()
        .build_file(workflow_path("calculator.yaml"))
        .await
        .unwrap();
    assert_eq!(
        workflow.run().await.unwrap(),
        Value::from("Hello Benjamin from aws-agent! The subtraction of [1, 2, 3, 4] is -8.")
    );

    workflow.set("operation", "*").unwrap();
    workflow.set("numbers", "2, 5").unwrap();
    assert_eq!(
        workflow.run().await.unwrap(),
        Value::from("Hello Benjamin from aws-agent! The multiplication of [2, 5] is 10.")
    );

    workflow.set("numbers", "1,0").unwrap();
    workflow.set("operation", "/").unwrap();
    let err = workflow.run().await.unwrap_err();
    assert!(matches!(err, PathwayError::DivisionByZero { position: 1 }));
}

#[tokio::test]
async fn test_react_workflow_file() {
    let model = Arc::new(MockModel::new(vec![
        MockModel::tool_call_response("call_1", "subtract", json!({"a": 12, "b": 5})),
        Message::assistant("7"),
    ]));
    let registry = ToolRegistry::with_tools(calculator_tools()).await;
    let workflow = WorkflowBuilder::new()
        .with_model(model, GenerationConfig::default())
        .with_registry(registry)
        .build_file(workflow_path("react_calculator.yaml"))
        .await
        .unwrap();

    match workflow.run().await.unwrap() {
        Value::Messages(messages) => {
            assert_eq!(messages.len(), 4);
            assert_eq!(messages[0].role, Role::Human);
            assert_eq!(tool_results(&messages), vec![json!({"result": 7.0})]);
            assert_eq!(messages[3].text(), "7");
        }
        other => panic!("unexpected output {:?}", other),
    }
    assert!(workflow.state().get(MESSAGES).is_some());
}
