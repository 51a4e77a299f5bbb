//! Schema provider.
//!
//! A `SchemaProvider` is built once per process from the built-in form
//! definition or from the JSON artifact on disk, compiles every field pattern
//! up front and is shared read-only afterwards. `builtin_provider()` exposes
//! a lazily initialised process-wide instance of the built-in schema.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::SchemaError;
use crate::types::{FieldDefinition, FieldType, FormSchema, StepDefinition};

/// Default location of the scraped schema artifact, relative to the repo root.
pub const DEFAULT_SCHEMA_PATH: &str = "shared/schemas/udyam-steps.json";

/// Where the schema is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    Builtin,
    File(PathBuf),
}

impl SchemaSource {
    /// `"builtin"` selects the compiled-in schema, anything else is a path.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "builtin" => SchemaSource::Builtin,
            path => SchemaSource::File(PathBuf::from(path)),
        }
    }
}

impl Default for SchemaSource {
    fn default() -> Self {
        SchemaSource::File(PathBuf::from(DEFAULT_SCHEMA_PATH))
    }
}

impl std::fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaSource::Builtin => write!(f, "builtin"),
            SchemaSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A field paired with its compiled, fully anchored pattern.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub definition: FieldDefinition,
    pub pattern: Option<Regex>,
}

impl FieldRule {
    pub fn compile(step: u32, definition: &FieldDefinition) -> Result<Self, SchemaError> {
        let pattern = match definition.pattern.as_deref() {
            Some(raw) => Some(full_match_regex(raw).map_err(|source| {
                SchemaError::InvalidPattern {
                    step,
                    field: definition.name.clone(),
                    source,
                }
            })?),
            None => None,
        };
        Ok(Self {
            definition: definition.clone(),
            pattern,
        })
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn label(&self) -> &str {
        &self.definition.label
    }

    pub fn matches(&self, value: &str) -> bool {
        self.pattern.as_ref().map_or(true, |re| re.is_match(value))
    }
}

/// Wrap a pattern so it must match the entire value.
fn full_match_regex(raw: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{raw})$"))
}

#[derive(Debug)]
struct CompiledStep {
    step: u32,
    rules: Vec<FieldRule>,
}

/// Read-only, pre-compiled view of the form schema.
#[derive(Debug)]
pub struct SchemaProvider {
    schema: FormSchema,
    compiled: Vec<CompiledStep>,
}

impl SchemaProvider {
    /// Check the structural invariants and compile every pattern.
    pub fn new(schema: FormSchema) -> Result<Self, SchemaError> {
        let mut seen_steps = HashSet::new();
        let mut compiled = Vec::with_capacity(schema.steps.len());

        for step in &schema.steps {
            if step.step == 0 {
                return Err(SchemaError::InvalidStepNumber);
            }
            if !seen_steps.insert(step.step) {
                return Err(SchemaError::DuplicateStep(step.step));
            }

            let mut seen_fields = HashSet::new();
            let mut rules = Vec::with_capacity(step.fields.len());
            for field in &step.fields {
                if !seen_fields.insert(field.name.as_str()) {
                    return Err(SchemaError::DuplicateField {
                        step: step.step,
                        field: field.name.clone(),
                    });
                }
                rules.push(FieldRule::compile(step.step, field)?);
            }
            compiled.push(CompiledStep {
                step: step.step,
                rules,
            });
        }

        Ok(Self { schema, compiled })
    }

    pub fn builtin() -> Result<Self, SchemaError> {
        Self::new(builtin_schema())
    }

    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        Self::new(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn load(source: &SchemaSource) -> Result<Self, SchemaError> {
        let provider = match source {
            SchemaSource::Builtin => Self::builtin()?,
            SchemaSource::File(path) => Self::from_file(path)?,
        };
        tracing::debug!(
            %source,
            steps = provider.schema.steps.len(),
            fields = provider.schema.field_count(),
            "form schema loaded"
        );
        Ok(provider)
    }

    /// The full schema. Same value on every call.
    pub fn get_schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn get_step(&self, step: u32) -> Option<&StepDefinition> {
        self.schema.step(step)
    }

    /// Declared fields of `step`, or an empty slice for an unknown step.
    pub fn get_fields_for_step(&self, step: u32) -> &[FieldDefinition] {
        self.schema
            .step(step)
            .map(|s| s.fields.as_slice())
            .unwrap_or(&[])
    }

    /// Compiled rules of `step`, or an empty slice for an unknown step.
    pub fn rules_for_step(&self, step: u32) -> &[FieldRule] {
        self.compiled
            .iter()
            .find(|c| c.step == step)
            .map(|c| c.rules.as_slice())
            .unwrap_or(&[])
    }

    pub fn rule(&self, step: u32, field: &str) -> Option<&FieldRule> {
        self.rules_for_step(step).iter().find(|r| r.name() == field)
    }

    /// Whether any step declares a field called `field`.
    pub fn declares(&self, field: &str) -> bool {
        self.compiled
            .iter()
            .any(|c| c.rules.iter().any(|r| r.name() == field))
    }

    /// Rules of every step other than `step`.
    pub fn rules_outside_step(&self, step: u32) -> impl Iterator<Item = &FieldRule> {
        self.compiled
            .iter()
            .filter(move |c| c.step != step)
            .flat_map(|c| c.rules.iter())
    }

    /// Zero-based position of `step` in declaration order.
    pub fn step_position(&self, step: u32) -> Option<usize> {
        self.compiled.iter().position(|c| c.step == step)
    }

    /// The step declared after `step`. Step numbers need not be contiguous.
    pub fn next_step(&self, step: u32) -> Option<u32> {
        let pos = self.step_position(step)?;
        self.compiled.get(pos + 1).map(|c| c.step)
    }

    /// The step declared before `step`.
    pub fn previous_step(&self, step: u32) -> Option<u32> {
        let pos = self.step_position(step)?;
        pos.checked_sub(1).map(|p| self.compiled[p].step)
    }

    pub fn first_step(&self) -> Option<u32> {
        self.schema.steps.first().map(|s| s.step)
    }

    pub fn last_step(&self) -> Option<u32> {
        self.schema.steps.last().map(|s| s.step)
    }

    pub fn step_count(&self) -> usize {
        self.schema.steps.len()
    }
}

static BUILTIN: OnceLock<SchemaProvider> = OnceLock::new();

/// Process-wide provider for the built-in schema, initialised on first use.
pub fn builtin_provider() -> &'static SchemaProvider {
    BUILTIN.get_or_init(|| SchemaProvider::builtin().expect("built-in schema is valid"))
}

/// The predefined Udyam form: Aadhaar/OTP on step 1, PAN/address on step 2.
pub fn builtin_schema() -> FormSchema {
    FormSchema {
        steps: vec![
            StepDefinition {
                step: 1,
                title: "Aadhaar & OTP Validation".into(),
                fields: vec![
                    FieldDefinition::text("aadhaar", "Aadhaar Number")
                        .required()
                        .with_pattern("^[2-9]{1}[0-9]{11}$"),
                    FieldDefinition::text("mobile", "Mobile Number (linked to Aadhaar)")
                        .with_type(FieldType::Tel)
                        .required()
                        .with_pattern("^[6-9][0-9]{9}$"),
                    FieldDefinition::text("otp", "OTP"),
                ],
            },
            StepDefinition {
                step: 2,
                title: "PAN Validation".into(),
                fields: vec![
                    FieldDefinition::text("pan", "PAN Number")
                        .required()
                        .with_pattern("^[A-Za-z]{5}[0-9]{4}[A-Za-z]{1}$"),
                    FieldDefinition::text("pincode", "PIN Code")
                        .required()
                        .with_pattern("^[1-9][0-9]{5}$"),
                    FieldDefinition::text("state", "State").required(),
                    FieldDefinition::text("city", "City").required(),
                ],
            },
        ],
    }
}
