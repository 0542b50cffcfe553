//! The build graph handed to the emitter.
//!
//! A `BuildGraph` is an ordered list of statements (comments, variables,
//! rules, build edges, defaults). Order is preserved exactly so that the
//! emitted text is reproducible.

use std::collections::{HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;

use super::command::CommandTemplate;

/// The built-in rule that groups targets without running anything.
pub const PHONY: &str = "phony";

/// How the build engine reads compiler-emitted header dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepsFormat {
    Gcc,
    Msvc,
}

impl DepsFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepsFormat::Gcc => "gcc",
            DepsFormat::Msvc => "msvc",
        }
    }
}

/// A named, reusable command template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: String,
    pub command: CommandTemplate,
    pub description: Option<String>,
    pub depfile: Option<String>,
    pub deps: Option<DepsFormat>,
    /// Re-running this rule does not invalidate the running build.
    pub generator: bool,
}

impl Rule {
    /// Create a new rule.
    pub fn new(name: impl Into<String>, command: impl Into<CommandTemplate>) -> Self {
        Rule {
            name: name.into(),
            command: command.into(),
            description: None,
            depfile: None,
            deps: None,
            generator: false,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn depfile(mut self, depfile: impl Into<String>) -> Self {
        self.depfile = Some(depfile.into());
        self
    }

    pub fn deps(mut self, deps: DepsFormat) -> Self {
        self.deps = Some(deps);
        self
    }

    pub fn generator(mut self) -> Self {
        self.generator = true;
        self
    }
}

/// One production step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEdge {
    pub outputs: Vec<String>,
    pub rule: String,
    /// Explicit inputs, passed to the command as `$in`
    pub inputs: Vec<String>,
    /// Inputs that only order the build and trigger rebuilds
    pub implicit: Vec<String>,
    /// Edge-local variable bindings, in order
    pub variables: Vec<(String, String)>,
}

impl BuildEdge {
    /// Create an edge producing `output` with `rule`.
    pub fn new(output: impl Into<String>, rule: impl Into<String>) -> Self {
        BuildEdge {
            outputs: vec![output.into()],
            rule: rule.into(),
            inputs: Vec::new(),
            implicit: Vec::new(),
            variables: Vec::new(),
        }
    }

    pub fn input(mut self, input: impl Into<String>) -> Self {
        self.inputs.push(input.into());
        self
    }

    pub fn inputs(mut self, inputs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.inputs.extend(inputs.into_iter().map(Into::into));
        self
    }

    pub fn implicit(mut self, inputs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.implicit.extend(inputs.into_iter().map(Into::into));
        self
    }

    pub fn variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.push((key.into(), value.into()));
        self
    }

    /// Look up an edge-local binding.
    pub fn binding(&self, key: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// One top-level statement, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Comment(String),
    Newline,
    Variable { name: String, value: String },
    Rule(Rule),
    Build(BuildEdge),
    Default(Vec<String>),
}

/// Structural problems in a graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("edge `{output}` uses undeclared rule `{rule}`")]
    UnknownRule { rule: String, output: String },

    #[error("rule `{0}` is declared more than once")]
    DuplicateRule(String),

    #[error("variable `{0}` is assigned more than once")]
    DuplicateVariable(String),

    #[error("output `{0}` is produced by more than one edge")]
    DuplicateOutput(String),

    #[error("default target `{0}` is not produced by any edge")]
    UnknownDefault(String),

    #[error("dependency cycle through `{0}`")]
    Cycle(String),
}

/// Ordered build graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildGraph {
    statements: Vec<Statement>,
}

impl BuildGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        BuildGraph {
            statements: Vec::new(),
        }
    }

    pub fn comment(&mut self, text: impl Into<String>) {
        self.statements.push(Statement::Comment(text.into()));
    }

    pub fn newline(&mut self) {
        self.statements.push(Statement::Newline);
    }

    pub fn variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.statements.push(Statement::Variable {
            name: name.into(),
            value: value.into(),
        });
    }

    pub fn rule(&mut self, rule: Rule) {
        self.statements.push(Statement::Rule(rule));
    }

    /// Add an edge and return its outputs.
    pub fn build(&mut self, edge: BuildEdge) -> Vec<String> {
        let outputs = edge.outputs.clone();
        self.statements.push(Statement::Build(edge));
        outputs
    }

    /// Declare the targets built when none are requested.
    pub fn set_default(&mut self, targets: impl IntoIterator<Item = impl Into<String>>) {
        self.statements
            .push(Statement::Default(targets.into_iter().map(Into::into).collect()));
    }

    /// All statements in emission order.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// All build edges in emission order.
    pub fn edges(&self) -> impl Iterator<Item = &BuildEdge> {
        self.statements.iter().filter_map(|s| match s {
            Statement::Build(edge) => Some(edge),
            _ => None,
        })
    }

    /// All rules in emission order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.statements.iter().filter_map(|s| match s {
            Statement::Rule(rule) => Some(rule),
            _ => None,
        })
    }

    /// Find a rule by name.
    pub fn find_rule(&self, name: &str) -> Option<&Rule> {
        self.rules().find(|r| r.name == name)
    }

    /// Value of a top-level variable.
    pub fn find_variable(&self, name: &str) -> Option<&str> {
        self.statements.iter().find_map(|s| match s {
            Statement::Variable { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// The edge producing `output`.
    pub fn edge_for(&self, output: &str) -> Option<&BuildEdge> {
        self.edges().find(|e| e.outputs.iter().any(|o| o == output))
    }

    /// Targets named by `default` statements.
    pub fn defaults(&self) -> Vec<&str> {
        self.statements
            .iter()
            .filter_map(|s| match s {
                Statement::Default(targets) => Some(targets),
                _ => None,
            })
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// Check that the graph is well formed.
    ///
    /// Every edge uses a declared rule, no output or top-level variable is
    /// defined twice, defaults refer to produced outputs, and no edge
    /// depends on itself transitively.
    pub fn validate(&self) -> Result<(), GraphError> {
        let mut rules = HashSet::new();
        let mut variables = HashSet::new();
        for statement in &self.statements {
            match statement {
                Statement::Rule(rule) => {
                    if !rules.insert(rule.name.as_str()) {
                        return Err(GraphError::DuplicateRule(rule.name.clone()));
                    }
                }
                Statement::Variable { name, .. } => {
                    if !variables.insert(name.as_str()) {
                        return Err(GraphError::DuplicateVariable(name.clone()));
                    }
                }
                _ => {}
            }
        }

        let mut graph: DiGraph<&BuildEdge, ()> = DiGraph::new();
        let mut producers: HashMap<&str, NodeIndex> = HashMap::new();

        for edge in self.edges() {
            if edge.rule != PHONY && !rules.contains(edge.rule.as_str()) {
                return Err(GraphError::UnknownRule {
                    rule: edge.rule.clone(),
                    output: edge.outputs.join(" "),
                });
            }

            let node = graph.add_node(edge);
            for output in &edge.outputs {
                if producers.insert(output.as_str(), node).is_some() {
                    return Err(GraphError::DuplicateOutput(output.clone()));
                }
            }
        }

        for node in graph.node_indices().collect::<Vec<_>>() {
            let edge = graph[node];
            for input in edge.inputs.iter().chain(&edge.implicit) {
                if let Some(&producer) = producers.get(input.as_str()) {
                    graph.add_edge(producer, node, ());
                }
            }
        }

        toposort(&graph, None)
            .map_err(|cycle| GraphError::Cycle(graph[cycle.node_id()].outputs.join(" ")))?;

        for target in self.defaults() {
            if !producers.contains_key(target) {
                return Err(GraphError::UnknownDefault(target.to_string()));
            }
        }

        Ok(())
    }
}
