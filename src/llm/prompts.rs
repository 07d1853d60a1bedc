//! Prompt builders for the two answering modes.

/// Baseline prompt: the whole knowledge base as a flat listing.
pub fn flat_prompt(flat_context: &str, question: &str) -> String {
    format!(
        "Based on the following knowledge base, please provide a detailed and accurate answer:\n\n\
         {flat_context}\n\
         Question: {question}\n\n\
         Please provide a clear and specific answer focusing on the relationships and mechanisms involved."
    )
}

/// Graph-augmented prompt built from a rendered knowledge graph analysis.
pub fn graph_prompt(graph_analysis: &str, question: &str) -> String {
    format!(
        "Analyze this knowledge graph data:\n\n\
         {graph_analysis}\n\n\
         Question: {question}\n\n\
         Based on the knowledge graph relationships shown above, provide a comprehensive explanation that:\n\
         1. Explains the key relationships\n\
         2. Describes the underlying mechanisms\n\
         3. Highlights the practical implications\n\n\
         Focus on the specific pathways and interactions shown in the knowledge graph."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_prompt_contains_context_and_question() {
        let prompt = flat_prompt("Knowledge Base:\n\n• A (drug):\n", "What does A do?");
        assert!(prompt.contains("• A (drug):"));
        assert!(prompt.contains("Question: What does A do?"));
    }

    #[test]
    fn test_graph_prompt_lists_instructions() {
        let prompt = graph_prompt("Knowledge Graph Analysis:", "Why?");
        assert!(prompt.starts_with("Analyze this knowledge graph data:\n\nKnowledge Graph Analysis:"));
        assert!(prompt.contains("Question: Why?"));
        assert!(prompt.contains("1. Explains the key relationships"));
    }
}
