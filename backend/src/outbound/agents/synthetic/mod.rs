//! Local stand-ins for the agent servers.
//!
//! Selected when an agent base URL is the `mock` sentinel. Output is canned
//! text, except analyst research and scoring which draw from a seedable RNG.

mod analyst;
mod chatbot;
mod questionnaire;

pub use analyst::{SyntheticAnalystAgent, verification_probability};
pub use chatbot::SyntheticChatbotAgent;
pub use questionnaire::{SyntheticQuestionnaireAgent, template_questions};

const MARKET_SIZE_ADVICE: &str = "To answer the market size question effectively:\n\n\
Be specific about your TAM/SAM/SOM with credible sources. Explain how you arrived at these numbers and why your segment is attractive.\n\n\
Include:\n\
- Total addressable market (TAM) with source (e.g., Gartner, McKinsey)\n\
- Serviceable addressable market (SAM)\n\
- Serviceable obtainable market (SOM)\n\
- Growth rate (CAGR) with source\n\
- Key market drivers and trends";

const TRACTION_ADVICE: &str = "For the traction metrics question:\n\n\
Focus on concrete metrics like MRR, growth rate, and customer acquisition. Investors want to see evidence of product-market fit and scalability.\n\n\
Include:\n\
- Revenue metrics (ARR/MRR) and growth rate\n\
- Customer count and growth rate\n\
- User engagement metrics\n\
- CAC, LTV, and payback period\n\
- Conversion rates at each funnel stage";

const COMPETITION_ADVICE: &str = "For the competition question:\n\n\
Don't just list competitors - explain your unique advantages. Create a matrix showing how you compare on key factors that matter to customers.\n\n\
Include:\n\
- Direct and indirect competitors\n\
- Your key differentiators and why they matter\n\
- Competitive moats and barriers to entry\n\
- Why customers choose you over alternatives\n\
- How you plan to maintain your competitive advantage";

const GENERIC_ADVICE: &str = "Here's how you might approach answering this question:\n\n\
Investors are looking for specific metrics and clear explanations. Make sure to include concrete numbers and examples in your response.\n\n\
Focus on your key differentiators and market position. Provide specific metrics and examples rather than general statements.";

/// Reply of the first rule with a keyword contained in `text`, ignoring case.
fn first_match(text: &str, rules: &[(&[&str], &'static str)], fallback: &'static str) -> &'static str {
    let lowered = text.to_lowercase();
    rules
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| lowered.contains(keyword)))
        .map_or(fallback, |(_, reply)| *reply)
}
