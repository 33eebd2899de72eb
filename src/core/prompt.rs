//! Prompt construction for action-item extraction.
//!
//! The prompt is a system message followed by a user message carrying the
//! full document text and the format contract. Rendering is deterministic
//! and never truncates the document.

/// Name of the single extraction tool advertised to the model
pub const EXTRACT_TOOL_NAME: &str = "ExtractActions";

// Continuation lines keep a four-space indent, blank lines included.
const SYSTEM_TEMPLATE: &str = concat!(
    "You are an AI assistant that extracts ALL action items and todos from meeting notes.\n",
    "    For each action or todo, include:\n",
    "    - The action/todo description\n",
    "    - Owner/assigned person\n",
    "    - Due date if specified if not return 'None'\n",
    "    - Current status\n",
    "    \n",
    "    Return ALL items found, not just one.\n",
    "    \n",
    "    Available tools: {tool_names}",
);

const USER_TEMPLATE: &str = concat!(
    "Extract ALL actions and todos from these meeting notes:\n",
    "    {content}\n",
    "    \n",
    "    {format_instructions}\n",
    "    \n",
    "    Return as a list of items.",
);

/// One field of the declared response schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseField {
    pub name: String,
    pub field_type: String,
    pub description: String,
}

impl ResponseField {
    pub fn new(
        name: impl Into<String>,
        field_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            description: description.into(),
        }
    }
}

/// The output shape the model is asked to produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatContract {
    fields: Vec<ResponseField>,
}

impl Default for FormatContract {
    /// `{"items": array}`, the shape the normalizer expects
    fn default() -> Self {
        Self::new(vec![ResponseField::new(
            "items",
            "array",
            "List of action items with their details",
        )])
    }
}

impl FormatContract {
    pub fn new(fields: Vec<ResponseField>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[ResponseField] {
        &self.fields
    }

    /// Render the instruction text describing the required output
    pub fn instructions(&self) -> String {
        let schema = self
            .fields
            .iter()
            .map(|f| format!("\t\"{}\": {}  // {}", f.name, f.field_type, f.description))
            .collect::<Vec<_>>()
            .join(",\n");

        format!(
            "The output should be a markdown code snippet formatted in the following schema, \
             including the leading and trailing \"```json\" and \"```\":\n\n```json\n{{\n{}\n}}\n```",
            schema
        )
    }
}

/// Builds the extraction prompt for one document
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    tool_names: Vec<String>,
    contract: FormatContract,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(vec![EXTRACT_TOOL_NAME.to_string()], FormatContract::default())
    }
}

impl PromptBuilder {
    pub fn new(tool_names: Vec<String>, contract: FormatContract) -> Self {
        Self {
            tool_names,
            contract,
        }
    }

    pub fn contract(&self) -> &FormatContract {
        &self.contract
    }

    /// Render the complete prompt text for `content`
    pub fn build(&self, content: &str) -> String {
        let system = SYSTEM_TEMPLATE.replace("{tool_names}", &self.tool_names.join(", "));

        // Substitute the document last so braces inside it are left alone.
        let user = USER_TEMPLATE
            .replace("{format_instructions}", &self.contract.instructions())
            .replacen("{content}", content, 1);

        format!("System: {}\nHuman: {}", system, user)
    }
}
