use trimsight_core::RetrievalResult;

const DEFAULT_ROLE: &str = "You are a car expert helping users choose Toyota vehicles.";
const DEFAULT_INSTRUCTION: &str = "Answer in a helpful, clear way.";

/// Fixed prompt layout: role, retrieved context, question, answer instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub role: String,
    pub instruction: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            role: DEFAULT_ROLE.to_string(),
            instruction: DEFAULT_INSTRUCTION.to_string(),
        }
    }
}

impl PromptTemplate {
    /// Retrieved texts in ranked order, separated by blank lines
    pub fn context(retrieval: &RetrievalResult) -> String {
        retrieval
            .hits
            .iter()
            .map(|hit| hit.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn render(&self, context: &str, question: &str) -> String {
        format!(
            "{}\nUse the following context to answer:\n\n{}\n\nQuestion: {}\n{}\n",
            self.role, context, question, self.instruction
        )
    }
}
