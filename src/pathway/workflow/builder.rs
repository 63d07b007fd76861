// SPDX-License-Identifier: MIT

//! Workflow builder - turns a parsed definition into a runnable graph

use super::loader::WorkflowLoader;
use super::types::{EdgeDefinition, NodeDefinition, StepKind, WorkflowDefinition};
use crate::adk::error::{PathwayError, Result};
use crate::adk::model::{GenerationConfig, Model};
use crate::pathway::graph::{CompiledGraph, ConditionRouter, GraphBuilder, Step, ToolCallRouter};
use crate::pathway::state::{Reducer, State, StateSchema, Value};
use crate::pathway::steps::fields::MESSAGES;
use crate::pathway::steps::{
    AgeCheckStep, AggregateStep, CalculateStep, GreetingStep, ModelCallStep, SkillsStep, ToolStep,
};
use crate::pathway::tools::ToolRegistry;
use std::path::Path;
use std::sync::Arc;

/// A compiled workflow with its initial state
pub struct Workflow {
    graph: CompiledGraph,
    state: State,
    output: String,
}

impl Workflow {
    pub fn graph(&self) -> &CompiledGraph {
        &self.graph
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Field reported by [`run`](Self::run)
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Override an initial value from its text form (`numbers=1,2,3`)
    pub fn set(&mut self, key: &str, raw: &str) -> Result<()> {
        let field_type = self
            .state
            .field_type(key)
            .ok_or_else(|| PathwayError::undeclared("state schema", key))?;
        let value = field_type.parse(key, raw)?;
        self.state.set(key, value)
    }

    /// Run the graph on a copy of the initial state and return the output field
    pub async fn run(&self) -> Result<Value> {
        let state = self.graph.invoke(self.state.clone()).await?;
        state
            .get(&self.output)
            .cloned()
            .ok_or_else(|| PathwayError::MissingField(self.output.clone()))
    }
}

/// Builds workflows from YAML definitions.
///
/// `model_call` and `tools` nodes need a model and a tool registry; a
/// workflow that uses them without one is a configuration error.
#[derive(Default)]
pub struct WorkflowBuilder {
    loader: WorkflowLoader,
    model: Option<(Arc<dyn Model>, GenerationConfig)>,
    model_unavailable: Option<String>,
    registry: Option<ToolRegistry>,
}

impl WorkflowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: Arc<dyn Model>, config: GenerationConfig) -> Self {
        self.model = Some((model, config));
        self
    }

    /// Record why no model could be configured; `model_call` nodes fail with it
    pub fn with_model_unavailable(mut self, reason: impl Into<String>) -> Self {
        self.model_unavailable = Some(reason.into());
        self
    }

    pub fn with_registry(mut self, registry: ToolRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Build a workflow from a YAML file path
    pub async fn build_file<P: AsRef<Path>>(&self, path: P) -> Result<Workflow> {
        let def = self.loader.load_workflow(path)?;
        self.build(&def).await
    }

    /// Build a workflow from a parsed definition
    pub async fn build(&self, def: &WorkflowDefinition) -> Result<Workflow> {
        let mut builder = GraphBuilder::new(&def.name).set_entry_point(&def.entry);
        if let Some(limit) = def.max_iterations {
            builder = builder.max_iterations(limit);
        }

        for node in &def.nodes {
            let step = self.build_step(node).await?;
            check_reducers(&node.id, step.as_ref(), &def.state)?;
            builder = builder.add_shared_step(&node.id, step);
        }
        for edge in &def.edges {
            builder = add_edge(builder, edge)?;
        }
        let graph = builder.compile()?;

        let mut state = State::new(&def.state)?;
        for (key, json) in &def.input {
            let field_type = state
                .field_type(key)
                .ok_or_else(|| PathwayError::undeclared("state schema", key.as_str()))?;
            state.set(key, field_type.from_json(key, json)?)?;
        }

        if def.state.get(&def.output).is_none() {
            return Err(PathwayError::config(format!(
                "workflow '{}': output field '{}' is not declared in state",
                def.name, def.output
            )));
        }

        log::info!(
            "Built workflow '{}' with {} nodes and {} edges",
            def.name,
            def.nodes.len(),
            def.edges.len()
        );

        Ok(Workflow {
            graph,
            state,
            output: def.output.clone(),
        })
    }

    async fn build_step(&self, node: &NodeDefinition) -> Result<Arc<dyn Step>> {
        let step: Arc<dyn Step> = match &node.step {
            StepKind::Greeting { sign_off } => Arc::new(match sign_off {
                Some(from) => GreetingStep::with_sign_off(from),
                None => GreetingStep::new(),
            }),
            StepKind::AgeCheck => Arc::new(AgeCheckStep),
            StepKind::Skills => Arc::new(SkillsStep),
            StepKind::Aggregate { operation, output } => {
                Arc::new(AggregateStep::new(*operation, *output))
            }
            StepKind::Calculate => Arc::new(CalculateStep),
            StepKind::ModelCall { system } => {
                let (model, config) = self.model.clone().ok_or_else(|| {
                    PathwayError::config(match &self.model_unavailable {
                        Some(reason) => format!("node '{}' needs a model: {}", node.id, reason),
                        None => format!("node '{}' needs a model", node.id),
                    })
                })?;
                let tools = match &self.registry {
                    Some(registry) => registry.list().await,
                    None => Vec::new(),
                };
                let mut step = ModelCallStep::new(model)
                    .with_tools(tools)
                    .with_config(config);
                if let Some(prompt) = system {
                    step = step.with_system_prompt(prompt.as_str());
                }
                Arc::new(step)
            }
            StepKind::Tools => {
                let registry = self.registry.clone().ok_or_else(|| {
                    PathwayError::config(format!("node '{}' needs a tool registry", node.id))
                })?;
                Arc::new(ToolStep::new(registry))
            }
        };
        Ok(step)
    }
}

/// A step's written fields must be merged the way its updates are shaped:
/// appended entries need `append`, whole values need `overwrite`.
fn check_reducers(node: &str, step: &dyn Step, schema: &StateSchema) -> Result<()> {
    let appends = step.appends();
    for field in step.writes() {
        let Some(def) = schema.get(field) else {
            continue;
        };
        let expected = if appends.contains(&field) {
            Reducer::Append
        } else {
            Reducer::Overwrite
        };
        if def.reducer != expected {
            return Err(PathwayError::config(format!(
                "node '{}' writes '{}', which must use the {:?} reducer",
                node, field, expected
            )));
        }
    }
    Ok(())
}

fn add_edge(builder: GraphBuilder, edge: &EdgeDefinition) -> Result<GraphBuilder> {
    let forms = [
        edge.to.is_some(),
        !edge.branches.is_empty(),
        edge.tool_calls.is_some(),
    ];
    if forms.iter().filter(|set| **set).count() != 1 {
        return Err(PathwayError::invalid_graph(format!(
            "edge from '{}' needs exactly one of 'to', 'branches' or 'tool_calls'",
            edge.from
        )));
    }

    if let Some(to) = &edge.to {
        return Ok(builder.add_edge(&edge.from, to.as_str()));
    }

    if let Some(tools) = &edge.tool_calls {
        let mut router = ToolCallRouter::new(MESSAGES, tools.as_str());
        if let Some(otherwise) = &edge.otherwise {
            router = router.otherwise(otherwise.as_str());
        }
        return Ok(builder.add_conditional_edges(&edge.from, router));
    }

    let mut router = ConditionRouter::new();
    for branch in &edge.branches {
        router = router.branch(&branch.when, branch.to.as_str())?;
    }
    if let Some(otherwise) = &edge.otherwise {
        router = router.otherwise(otherwise.as_str());
    }
    Ok(builder.add_conditional_edges(&edge.from, router))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adk::model::Message;
    use crate::adk::tool::Tool;
    use async_trait::async_trait;

    const PROFILE: &str = r#"
name: profile
entry: greet
output: message
state:
  name: { type: text, default: "" }
  age: { type: number }
  skills: { type: texts, default: [] }
  message: { type: text, default: "" }
input:
  name: Benjamin
  age: 20
  skills: [Python, AWS]
nodes:
  - id: greet
    step: greeting
  - id: check_age
    step: age_check
  - id: check_skills
    step: skills
edges:
  - from: greet
    to: check_age
  - from: check_age
    to: check_skills
  - from: check_skills
    to: END
"#;

    struct FixedModel;

    #[async_trait]
    impl Model for FixedModel {
        fn provider(&self) -> &str {
            "fixed"
        }

        async fn generate_content(
            &self,
            _history: &[Message],
            _config: Option<&GenerationConfig>,
            _tools: Option<&[Arc<dyn Tool>]>,
        ) -> Result<Message> {
            Ok(Message::assistant("Hi!"))
        }
    }

    async fn build(yaml: &str, builder: WorkflowBuilder) -> Result<Workflow> {
        let def = WorkflowLoader::parse_yaml(yaml)?;
        builder.build(&def).await
    }

    #[tokio::test]
    async fn test_profile_workflow() {
        let workflow = build(PROFILE, WorkflowBuilder::new()).await.unwrap();
        assert_eq!(workflow.output(), "message");
        assert_eq!(
            workflow.run().await.unwrap(),
            Value::from("Hello Benjamin! You are an adult. Your skills are: Python, AWS.")
        );
    }

    #[tokio::test]
    async fn test_overrides_parse_by_field_type() {
        let mut workflow = build(PROFILE, WorkflowBuilder::new()).await.unwrap();
        workflow.set("age", "9").unwrap();
        workflow.set("skills", "").unwrap();
        assert_eq!(
            workflow.run().await.unwrap(),
            Value::from("Hello Benjamin! You are a minor. You have no skills listed.")
        );

        let err = workflow.set("height", "180").unwrap_err();
        assert!(matches!(err, PathwayError::UndeclaredField { .. }));
        let err = workflow.set("age", "old").unwrap_err();
        assert!(matches!(err, PathwayError::FieldType { .. }));
    }

    #[tokio::test]
    async fn test_branching_workflow() {
        let yaml = r#"
name: branching
entry: greet
output: message
state:
  name: { type: text, default: "" }
  message: { type: text, default: "" }
  numbers: { type: numbers }
  operation: { type: operation }
input:
  numbers: [6, 3]
  operation: "/"
nodes:
  - id: greet
    step: greeting
    sign_off: aws-agent
  - id: divide
    step: aggregate
    operation: "/"
  - id: multiply
    step: aggregate
    operation: "*"
edges:
  - from: greet
    branches:
      - when: "operation == '/'"
        to: divide
      - when: "operation == '*'"
        to: multiply
    otherwise: END
"#;
        let mut workflow = build(yaml, WorkflowBuilder::new()).await.unwrap();
        assert_eq!(
            workflow.run().await.unwrap(),
            Value::from("Hello from aws-agent! The division of [6, 3] is 2.")
        );

        workflow.set("operation", "+").unwrap();
        assert_eq!(workflow.run().await.unwrap(), Value::from("Hello from aws-agent!"));
    }

    #[tokio::test]
    async fn test_model_call_needs_model() {
        let yaml = r#"
name: chat
entry: model
output: messages
state:
  messages: { type: messages, reducer: append }
input:
  messages: ["hello"]
nodes:
  - id: model
    step: model_call
"#;
        let err = build(yaml, WorkflowBuilder::new()).await.err().unwrap();
        assert!(matches!(err, PathwayError::Config(_)));

        let unavailable = WorkflowBuilder::new()
            .with_model_unavailable("Missing credential: set GITHUB_TOKEN");
        let err = build(yaml, unavailable).await.err().unwrap();
        assert!(
            matches!(err, PathwayError::Config(msg) if msg.contains("'model'") && msg.contains("GITHUB_TOKEN"))
        );

        let builder = WorkflowBuilder::new().with_model(Arc::new(FixedModel), GenerationConfig::default());
        let workflow = build(yaml, builder).await.unwrap();
        match workflow.run().await.unwrap() {
            Value::Messages(messages) => {
                assert_eq!(messages.len(), 2);
                assert_eq!(messages[1].text(), "Hi!");
            }
            other => panic!("unexpected output {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_edge_needs_exactly_one_form() {
        let yaml = r#"
name: bad
entry: greet
output: message
state:
  name: { type: text, default: "" }
  message: { type: text }
nodes:
  - id: greet
    step: greeting
edges:
  - from: greet
"#;
        let err = build(yaml, WorkflowBuilder::new()).await.err().unwrap();
        assert!(matches!(err, PathwayError::InvalidGraph(_)));
    }

    #[tokio::test]
    async fn test_undeclared_input() {
        let yaml = r#"
name: bad
entry: greet
output: message
state:
  message: { type: text }
input:
  nickname: Ben
nodes:
  - id: greet
    step: greeting
"#;
        let err = build(yaml, WorkflowBuilder::new()).await.err().unwrap();
        assert!(matches!(err, PathwayError::UndeclaredField { .. }));
    }

    #[tokio::test]
    async fn test_tool_loop_edge() {
        let yaml = r#"
name: loop
entry: model
output: messages
state:
  messages: { type: messages, reducer: append }
input:
  messages: ["2 + 3?"]
nodes:
  - id: model
    step: model_call
  - id: run_tools
    step: tools
edges:
  - from: model
    tool_calls: run_tools
    otherwise: END
  - from: run_tools
    to: model
"#;
        let with_model =
            WorkflowBuilder::new().with_model(Arc::new(FixedModel), GenerationConfig::default());
        let err = build(yaml, with_model).await.err().unwrap();
        assert!(matches!(err, PathwayError::Config(msg) if msg.contains("run_tools")));

        let builder = WorkflowBuilder::new()
            .with_model(Arc::new(FixedModel), GenerationConfig::default())
            .with_registry(ToolRegistry::new());
        let workflow = build(yaml, builder).await.unwrap();
        assert_eq!(workflow.graph().step_names(), &["model", "run_tools"]);
        assert!(matches!(workflow.run().await.unwrap(), Value::Messages(m) if m.len() == 2));
    }

    #[tokio::test]
    async fn test_message_steps_need_append_reducer() {
        let yaml = r#"
name: loop
entry: model
output: messages
state:
  messages: { type: messages }
input:
  messages: ["2 + 3?"]
nodes:
  - id: model
    step: model_call
"#;
        let builder =
            WorkflowBuilder::new().with_model(Arc::new(FixedModel), GenerationConfig::default());
        let err = build(yaml, builder).await.err().unwrap();
        assert!(
            matches!(err, PathwayError::Config(msg) if msg.contains("'model'") && msg.contains("Append"))
        );

        let yaml = yaml.replace("{ type: messages }", "{ type: messages, reducer: overwrite }");
        let builder = WorkflowBuilder::new().with_registry(ToolRegistry::new());
        let yaml = yaml.replace("step: model_call", "step: tools");
        let err = build(&yaml, builder).await.err().unwrap();
        assert!(matches!(err, PathwayError::Config(msg) if msg.contains("Append")));
    }

    #[tokio::test]
    async fn test_text_steps_reject_append_reducer() {
        let yaml = PROFILE.replace(
            "message: { type: text, default: \"\" }",
            "message: { type: text, default: \"\", reducer: append }",
        );
        assert_ne!(yaml, PROFILE);
        let err = build(&yaml, WorkflowBuilder::new()).await.err().unwrap();
        assert!(
            matches!(err, PathwayError::Config(msg) if msg.contains("'greet'") && msg.contains("Overwrite"))
        );
    }
}
