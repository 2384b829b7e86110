//! Playbook and test-playbook records.
//!
//! Task reachability is computed on a directed graph rooted at `starttaskid`.
//! A task is mandatory when at least one path to it only crosses tasks that are
//! not `skipunavailable`; the scripts, sub-playbooks and commands of tasks that
//! are not mandatory are reported in `skippable_tasks`.

use anyhow::Result;
use petgraph::graph::{DiGraph, NodeIndex};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use super::ExtractContext;
use super::common::{common_record, complex_operators, flag, id_or_dash, incident_field_refs, insert_ids, text, text_for};
use crate::constants::is_built_in_field;
use crate::content::node::string_list;
use crate::id_set::Entry;

/// A reachable task and whether it always runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskNode {
    pub id: String,
    pub mandatory: bool,
}

/// Reachability graph of a playbook's tasks.
pub struct TaskGraph {
    graph: DiGraph<TaskNode, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl TaskGraph {
    /// Builds the graph from `starttaskid` following every `nexttasks` branch.
    pub fn build(playbook_id: &str, start: &str, tasks: &Map<String, Value>) -> Self {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();
        let root = graph.add_node(TaskNode {
            id: start.to_string(),
            mandatory: true,
        });
        node_map.insert(start.to_string(), root);

        let mut queue = VecDeque::from([root]);
        while let Some(current) = queue.pop_front() {
            let current_id = graph[current].id.clone();
            let current_mandatory = graph[current].mandatory;
            let Some(task) = tasks.get(&current_id) else {
                tracing::warn!(target: "id_set::walk", "{playbook_id}: no such task {current_id} in playbook");
                continue;
            };

            for next_id in next_task_ids(task) {
                let Some(next_task) = tasks.get(&next_id) else {
                    tracing::warn!(target: "id_set::walk", "{playbook_id}: no such task {next_id} in playbook");
                    continue;
                };
                let mandatory = current_mandatory && !skip_unavailable(next_task);
                let next = match node_map.get(&next_id) {
                    Some(&index) => {
                        if mandatory && !graph[index].mandatory {
                            graph[index].mandatory = true;
                            queue.push_back(index);
                        }
                        index
                    }
                    None => {
                        let index = graph.add_node(TaskNode {
                            id: next_id.clone(),
                            mandatory,
                        });
                        node_map.insert(next_id, index);
                        queue.push_back(index);
                        index
                    }
                };
                graph.update_edge(current, next, ());
            }
        }
        Self {
            graph,
            node_map,
        }
    }

    /// The node of `task_id`, `None` when the task is unreachable.
    #[must_use]
    pub fn node(&self, task_id: &str) -> Option<&TaskNode> {
        self.node_map.get(task_id).map(|index| &self.graph[*index])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

fn next_task_ids(task: &Value) -> Vec<String> {
    match task.get("nexttasks") {
        Some(Value::Object(branches)) => branches.values().flat_map(|ids| string_list(Some(ids))).collect(),
        _ => Vec::new(),
    }
}

fn skip_unavailable(task: &Value) -> bool {
    task.get("skipunavailable").and_then(Value::as_bool).unwrap_or(false)
}

fn task_detail<'a>(task: &'a Value, key: &str) -> Option<&'a str> {
    task.get("task")?.get(key)?.as_str().filter(|s| !s.is_empty())
}

/// Ids named by `task.<key>` in reachable tasks, and the subset in non-mandatory tasks.
fn task_ids(
    playbook_id: &str,
    key: &str,
    tasks: &BTreeMap<&String, &Value>,
    graph: &TaskGraph,
) -> (BTreeSet<String>, BTreeSet<String>) {
    let mut all = BTreeSet::new();
    let mut skippable = BTreeSet::new();
    for (task_id, task) in tasks {
        let Some(target) = task_detail(task, key) else {
            continue;
        };
        let Some(node) = graph.node(task_id) else {
            tracing::debug!(target: "id_set::walk", "{playbook_id}: task {task_id} is not connected");
            continue;
        };
        all.insert(target.to_string());
        if !node.mandatory {
            skippable.insert(target.to_string());
        }
    }
    (all, skippable)
}

/// `command → brand` of `brand|…|command` task scripts; built-in commands are skipped.
fn task_commands(tasks: &BTreeMap<&String, &Value>) -> (BTreeMap<String, String>, BTreeSet<String>) {
    let mut command_to_integration = BTreeMap::new();
    let mut skippable = BTreeSet::new();
    for task in tasks.values() {
        let Some(script) = task_detail(task, "script") else {
            continue;
        };
        if script.contains("Builtin") {
            continue;
        }
        let parts: Vec<&str> = script.split('|').collect();
        let command = parts.last().copied().unwrap_or_default().to_string();
        command_to_integration.insert(command.clone(), parts[0].to_string());
        if skip_unavailable(task) {
            skippable.insert(command);
        }
    }
    (command_to_integration, skippable)
}

/// Non-empty script argument names of a `setIncident`/`setIndicator` task.
///
/// `customFields` holds a JSON list of single-key objects; each key is a field.
fn fields_by_script_argument(task: &Value) -> BTreeSet<String> {
    let mut fields = BTreeSet::new();
    let Some(Value::Object(arguments)) = task.get("scriptarguments") else {
        return fields;
    };
    for (name, value) in arguments {
        let empty = match value {
            Value::Null => true,
            Value::Object(m) => m.is_empty(),
            Value::String(s) => s.is_empty(),
            _ => false,
        };
        if empty || is_built_in_field(name) {
            continue;
        }
        if name != "customFields" {
            fields.insert(name.clone());
            continue;
        }
        let Some(raw) = value.as_object().and_then(|m| m.values().next()).and_then(Value::as_str) else {
            continue;
        };
        match serde_json::from_str::<Vec<Map<String, Value>>>(raw) {
            Ok(custom_fields) => {
                fields.extend(
                    custom_fields
                        .iter()
                        .filter_map(|f| f.keys().next())
                        .filter(|f| !is_built_in_field(f))
                        .cloned(),
                );
            }
            Err(e) => tracing::debug!(target: "id_set::walk", "Ignoring unparsable customFields value: {e}"),
        }
    }
    fields
}

/// Incident and indicator fields the playbook reads or writes.
fn dependent_fields(tasks: &BTreeMap<&String, &Value>, inputs: Option<&Value>) -> (BTreeSet<String>, BTreeSet<String>) {
    let mut incident_fields = BTreeSet::new();
    let mut indicator_fields = BTreeSet::new();

    for task in tasks.values() {
        if let Some(Value::Array(mappings)) = task.get("fieldMapping") {
            incident_fields.extend(
                mappings
                    .iter()
                    .filter_map(|m| m.get("incidentfield")?.as_str())
                    .filter(|f| !is_built_in_field(f))
                    .map(str::to_string),
            );
        }
        let script = task_detail(task, "script").unwrap_or_default();
        if script.contains("setIncident") {
            incident_fields.extend(fields_by_script_argument(task));
        }
        if script.contains("setIndicator") {
            indicator_fields.extend(fields_by_script_argument(task));
        }
        if let Some(arguments) = task.get("scriptarguments") {
            incident_fields.extend(incident_field_refs(arguments));
        }
    }

    if let Some(Value::Array(inputs)) = inputs {
        for input in inputs {
            if let Some(value @ Value::Object(_)) = input.get("value") {
                incident_fields.extend(incident_field_refs(value));
            }
        }
    }
    (incident_fields, indicator_fields)
}

/// Filter and transformer operators of task arguments and conditions.
fn task_operators(tasks: &BTreeMap<&String, &Value>) -> (BTreeSet<String>, BTreeSet<String>) {
    let mut filters = BTreeSet::new();
    let mut transformers = BTreeSet::new();
    for task in tasks.values() {
        for key in ["scriptarguments", "conditions"] {
            if let Some(node) = task.get(key) {
                let (f, t) = complex_operators(node);
                filters.extend(f);
                transformers.extend(t);
            }
        }
    }
    (filters, transformers)
}

pub fn extract(ctx: &ExtractContext<'_>, doc: &Map<String, Value>) -> Result<Entry> {
    let id = id_or_dash(doc, "id");
    let name = text_for(ctx, doc, "name").unwrap_or("-");
    let mut record = common_record(ctx, doc, Some(name), None);

    let empty = Map::new();
    let tasks = ctx.mapping_at(doc, "tasks")?.unwrap_or(&empty);
    let ordered: BTreeMap<&String, &Value> = tasks.iter().collect();
    let start = doc.get("starttaskid").and_then(|v| v.as_str().map(str::to_string).or_else(|| v.as_u64().map(|n| n.to_string())));
    let graph = TaskGraph::build(&id, start.as_deref().unwrap_or_default(), tasks);

    let (scripts, skippable_scripts) = task_ids(&id, "scriptName", &ordered, &graph);
    let (playbooks, skippable_playbooks) = task_ids(&id, "playbookName", &ordered, &graph);
    let (command_to_integration, skippable_commands) = task_commands(&ordered);
    insert_ids(&mut record, "implementing_scripts", scripts);
    insert_ids(&mut record, "implementing_playbooks", playbooks);
    if !command_to_integration.is_empty() {
        let map: Map<String, Value> =
            command_to_integration.into_iter().map(|(cmd, brand)| (cmd, Value::String(brand))).collect();
        record.insert("command_to_integration".to_string(), Value::Object(map));
    }
    insert_ids(&mut record, "tests", string_list(doc.get("tests")).into_iter().collect());
    if flag(doc, "hidden") {
        record.insert("deprecated".to_string(), Value::Bool(true));
    }

    let mut skippable = skippable_scripts;
    skippable.extend(skippable_playbooks);
    skippable.extend(skippable_commands);
    insert_ids(&mut record, "skippable_tasks", skippable);

    let (incident_fields, indicator_fields) = dependent_fields(&ordered, doc.get("inputs"));
    insert_ids(&mut record, "incident_fields", incident_fields);
    insert_ids(&mut record, "indicator_fields", indicator_fields);

    let (filters, transformers) = task_operators(&ordered);
    insert_ids(&mut record, "filters", filters);
    insert_ids(&mut record, "transformers", transformers);

    if text(doc, "id").is_none() {
        tracing::debug!(target: "id_set::walk", "Playbook {} has no id", ctx.path.display());
    }
    Ok((id, record))
}
