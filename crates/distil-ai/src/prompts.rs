//! Prompt builders for each refinement capability.
//!
//! The wording here is deliberate: the synthesis prompt asks for a dense
//! rewrite rather than a short summary, and the simplify prompt pins the
//! target reading level so repeated passes keep lowering the grade instead
//! of just shortening the text.

/// System prompt for the synthesis pass over freshly extracted page content.
pub fn synthesize_system_prompt() -> &'static str {
    "You are a critical-thinking assistant. Given a block of content, extract the core ideas, \
     strip marketing fluff, and rewrite it for maximum clarity and insight (no summarising for \
     brevity). Return a dense, coherent, refined rewrite."
}

/// System prompt for one simplification pass over the working summary.
pub fn simplify_system_prompt() -> &'static str {
    "You are a simplification assistant. Rewrite the provided summary to make it easier to \
     understand by a general audience without removing names, dates, brands, or factual \
     content. Use plain English, short sentences, and aim for a reading level of around year 9."
}

/// System prompt for the detail-expansion pass.
pub fn expand_system_prompt() -> &'static str {
    "You are a detail expansion assistant. Take the provided summary and elaborate on it by \
     adding relevant context, background, and details to make it richer and more informative. \
     Keep the original facts intact and avoid speculation."
}

/// System prompt for condensing to a hard word budget.
pub fn condense_system_prompt(max_words: usize) -> String {
    format!(
        "You are a concise summarization assistant. Summarize the input into a maximum of \
         {max_words} words."
    )
}

/// System prompt for turning a summary into a four-panel comic script.
pub fn script_system_prompt() -> &'static str {
    "You are a comic scriptwriter. Turn the provided summary into a script for a four-panel \
     comic strip. For each panel, give a brief visual description and a one-sentence caption, \
     so the four panels retell the summary's key moments in order. Stay faithful to the facts \
     in the summary and do not invent new information."
}

/// Image-generation prompt wrapping a finished comic script.
pub fn comic_image_prompt(script: &str) -> String {
    format!(
        "Create a clean, semi-realistic editorial cartoon with four distinct panels in a \
         horizontal strip. Each panel visualizes a moment from the summary below, using \
         consistent characters and color schemes.\n\nStyle: Consistent line art, semi-realistic \
         but expressive, slightly exaggerated expressions for emphasis. Clean layout. Use \
         labeled signs, props, and character expressions to communicate each caption \
         clearly.\n\nNarrative:\n{script}\n\nInstructions:\n    - Arrange panels left to \
         right.\n    - Ensure character continuity (e.g. same couple throughout).\n    - Use \
         clean typography for captions.\n    - Do not add speech bubbles unless specified."
    )
}
