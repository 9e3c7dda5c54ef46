//! Job node payload and its step list.

use serde::{Deserialize, Serialize};

use crate::error::{check_index, EditError};

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// One step of a job.
///
/// By convention exactly one of `uses` / `run` is set. The edit operations
/// below keep it that way; deserialization does not enforce it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,
}

impl Step {
    /// A step that invokes a published action.
    pub fn uses(name: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uses: Some(action.into()),
            run: None,
        }
    }

    /// A step that runs a shell command.
    pub fn run(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uses: None,
            run: Some(command.into()),
        }
    }

    /// The step a freshly added row starts with.
    pub fn template() -> Self {
        Self::run("New Step", "echo \"hello\"")
    }

    /// `uses`, if set to a non-empty value.
    pub fn action(&self) -> Option<&str> {
        self.uses.as_deref().filter(|s| !s.is_empty())
    }

    /// `run`, if set to a non-empty value.
    pub fn command(&self) -> Option<&str> {
        self.run.as_deref().filter(|s| !s.is_empty())
    }
}

/// Editable field of a [`Step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepField {
    Name,
    Uses,
    Run,
}

// ---------------------------------------------------------------------------
// JobNodeData
// ---------------------------------------------------------------------------

/// Payload of a job node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobNodeData {
    /// Unique among job nodes; used as the `needs` cross-reference key.
    pub job_name: String,
    #[serde(default)]
    pub runs_on: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl JobNodeData {
    pub fn new(job_name: impl Into<String>, runs_on: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            job_name: job_name.into(),
            runs_on: runs_on.into(),
            steps,
        }
    }

    /// The payload of a job added from the toolbox.
    pub fn template() -> Self {
        Self::new("new-job", "ubuntu-latest", Vec::new())
    }

    pub fn add_step(&mut self) -> usize {
        self.steps.push(Step::template());
        self.steps.len() - 1
    }

    pub fn delete_step(&mut self, index: usize) -> Result<Step, EditError> {
        check_index("step", index, self.steps.len())?;
        Ok(self.steps.remove(index))
    }

    /// Set one field of a step.
    ///
    /// A non-empty `uses` clears `run` and a non-empty `run` clears `uses`.
    pub fn set_step_field(
        &mut self,
        index: usize,
        field: StepField,
        value: impl Into<String>,
    ) -> Result<(), EditError> {
        check_index("step", index, self.steps.len())?;
        let step = &mut self.steps[index];
        let value = value.into();

        match field {
            StepField::Name => step.name = value,
            StepField::Uses => {
                if !value.is_empty() {
                    step.run = None;
                }
                step.uses = Some(value);
            }
            StepField::Run => {
                if !value.is_empty() {
                    step.uses = None;
                }
                step.run = Some(value);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_camel_case_payload() {
        let data: JobNodeData = serde_json::from_value(json!({
            "jobName": "build",
            "runsOn": "ubuntu-latest",
            "steps": [{ "name": "Checkout code", "uses": "actions/checkout@v4" }]
        }))
        .unwrap();

        assert_eq!(data.job_name, "build");
        assert_eq!(data.steps, vec![Step::uses("Checkout code", "actions/checkout@v4")]);
    }

    #[test]
    fn setting_uses_clears_run() {
        let mut job = JobNodeData::template();
        let i = job.add_step();
        job.set_step_field(i, StepField::Uses, "actions/setup-node@v4").unwrap();

        assert_eq!(job.steps[i].action(), Some("actions/setup-node@v4"));
        assert_eq!(job.steps[i].run, None);
    }

    #[test]
    fn setting_run_clears_uses() {
        let mut job = JobNodeData::new("lint", "ubuntu-latest", vec![Step::uses("x", "a/b@v1")]);
        job.set_step_field(0, StepField::Run, "cargo clippy").unwrap();

        assert_eq!(job.steps[0].command(), Some("cargo clippy"));
        assert_eq!(job.steps[0].uses, None);
    }

    #[test]
    fn emptying_a_field_keeps_the_other() {
        let mut job = JobNodeData::new("lint", "ubuntu-latest", vec![Step::run("x", "make")]);
        job.set_step_field(0, StepField::Uses, "").unwrap();

        assert_eq!(job.steps[0].command(), Some("make"));
        assert_eq!(job.steps[0].action(), None);
    }

    #[test]
    fn delete_step_out_of_range() {
        let mut job = JobNodeData::template();
        assert!(matches!(
            job.delete_step(0),
            Err(EditError::IndexOutOfRange { what: "step", index: 0, len: 0 })
        ));
    }
}
