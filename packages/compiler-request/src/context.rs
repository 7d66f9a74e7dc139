/// Options for request assembly
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Render `explain` templates into sentences
    pub include_explanations: bool,
    /// Attach each definition's opaque project data
    pub include_project: bool,
    /// Refuse prompts with no text and no blocks
    pub reject_empty: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            include_explanations: true,
            include_project: true,
            reject_empty: true,
        }
    }
}
