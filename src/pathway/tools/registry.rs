// SPDX-License-Identifier: MIT

use crate::adk::tool::Tool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct ToolRegistry {
    tools: Arc<RwLock<HashMap<String, Arc<dyn Tool>>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registry pre-loaded with `tools`
    pub async fn with_tools(tools: Vec<Arc<dyn Tool>>) -> Self {
        let registry = Self::new();
        for tool in tools {
            registry.register(tool).await;
        }
        registry
    }

    /// Register a tool, replacing any tool of the same name
    pub async fn register(&self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        let mut tools = self.tools.write().await;
        if tools.insert(name.clone(), tool).is_some() {
            log::warn!("Replaced existing tool '{}'", name);
        }
    }

    pub async fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().await;
        tools.get(name).cloned()
    }

    /// All tools, sorted by name
    pub async fn list(&self) -> Vec<Arc<dyn Tool>> {
        let tools = self.tools.read().await;
        let mut list: Vec<Arc<dyn Tool>> = tools.values().cloned().collect();
        list.sort_by(|a, b| a.name().cmp(b.name()));
        list
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adk::error::Result;
    use async_trait::async_trait;
    use once_cell::sync::Lazy;
    use serde_json::{json, Value};

    static MOCK_SCHEMA: Lazy<Value> = Lazy::new(|| {
        json!({
            "type": "object",
            "properties": {}
        })
    });

    struct MockTool {
        name: String,
        description: String,
    }

    impl MockTool {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                description: format!("Mock tool: {}", name),
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

        fn schema(&self) -> &Value {
            &MOCK_SCHEMA
        }

        async fn execute(&self, _input: Value) -> Result<Value> {
            Ok(json!({"result": "mock"}))
        }
    }

    #[tokio::test]
    async fn test_register_and_get_tool() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(MockTool::new("add"))).await;

        let retrieved = registry.get("add").await;
        assert_eq!(retrieved.map(|t| t.name().to_string()), Some("add".to_string()));
        assert!(registry.get("nonexistent").await.is_none());
    }

    #[tokio::test]
    async fn test_list_is_sorted() {
        let registry = ToolRegistry::with_tools(vec![
            Arc::new(MockTool::new("subtract")),
            Arc::new(MockTool::new("add")),
            Arc::new(MockTool::new("multiply")),
        ])
        .await;

        let names: Vec<String> = registry
            .list()
            .await
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, vec!["add", "multiply", "subtract"]);
    }

    #[tokio::test]
    async fn test_register_replaces_same_name() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(MockTool::new("add"))).await;
        registry.register(Arc::new(MockTool::new("add"))).await;
        assert_eq!(registry.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_tools() {
        let registry = ToolRegistry::new();
        let clone = registry.clone();
        clone.register(Arc::new(MockTool::new("add"))).await;
        assert!(registry.get("add").await.is_some());
    }
}
