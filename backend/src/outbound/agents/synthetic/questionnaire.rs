//! Fixed questionnaire template and keyword-matched answering advice.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::domain::ports::{AgentError, QuestionnaireAgent, QuestionnaireContext};

use super::{COMPETITION_ADVICE, GENERIC_ADVICE, MARKET_SIZE_ADVICE, TRACTION_ADVICE, first_match};

const TEMPLATE: [(&str, &str, &str); 7] = [
    ("q1", "What is your total addressable market size?", "market"),
    ("q2", "How many active users/customers do you have?", "traction"),
    ("q3", "Who are your top 3 competitors and how do you differentiate?", "competition"),
    ("q4", "What relevant experience does your founding team have?", "team"),
    ("q5", "What is your product roadmap for the next 12 months?", "product"),
    ("q6", "What are your current unit economics?", "finance"),
    ("q7", "How do you plan to use the funds you're raising?", "fundraising"),
];

const TEAM_ADVICE: &str = "For the team experience question:\n\n\
Highlight relevant domain expertise and previous startup experience. Explain why your team is uniquely positioned to solve this problem.\n\n\
Include:\n\
- Relevant industry experience\n\
- Technical expertise and credentials\n\
- Previous startup experience (especially exits)\n\
- How long the team has worked together\n\
- Key advisors and their contributions";

const PRODUCT_ADVICE: &str = "For the product roadmap question:\n\n\
Describe your product differentiation and technical moats. Share customer testimonials and usage metrics that demonstrate value.\n\n\
Include:\n\
- Current product status and key features\n\
- Planned features and timeline\n\
- How roadmap aligns with customer needs\n\
- Technical challenges and solutions\n\
- IP protection strategy";

const UNIT_ECONOMICS_ADVICE: &str = "For the unit economics question:\n\n\
Be transparent about your unit economics and path to profitability. Include CAC, LTV, payback period, and gross margins.\n\n\
Include:\n\
- Customer acquisition cost (CAC)\n\
- Lifetime value (LTV)\n\
- LTV/CAC ratio\n\
- Gross margin\n\
- Payback period\n\
- Path to profitability";

const FUNDRAISING_ADVICE: &str = "For the fundraising question:\n\n\
Clearly tie your fundraising amount to specific milestones. Show how this round gets you to the next inflection point.\n\n\
Include:\n\
- Specific allocation of funds (e.g., 40% engineering, 30% sales)\n\
- Key milestones this funding will help you achieve\n\
- Runway this funding provides\n\
- How these milestones set you up for the next round\n\
- Expected valuation increase after achieving these milestones";

const ASSIST_RULES: &[(&[&str], &str)] = &[
    (&["market size", "tam"], MARKET_SIZE_ADVICE),
    (&["traction", "customers", "users"], TRACTION_ADVICE),
    (&["competitor", "differentiate"], COMPETITION_ADVICE),
    (&["team", "founder", "experience"], TEAM_ADVICE),
    (&["product", "roadmap"], PRODUCT_ADVICE),
    (&["unit", "economics"], UNIT_ECONOMICS_ADVICE),
    (&["funds", "raising", "use"], FUNDRAISING_ADVICE),
];

/// The seven template questions, every one of type `open`.
pub fn template_questions() -> Vec<Value> {
    TEMPLATE
        .iter()
        .map(|(id, text, category)| {
            json!({"id": id, "text": text, "category": category, "type": "open"})
        })
        .collect()
}

/// Questionnaire stand-in used when the agent base URL is `mock`.
#[derive(Debug, Default)]
pub struct SyntheticQuestionnaireAgent;

#[async_trait]
impl QuestionnaireAgent for SyntheticQuestionnaireAgent {
    async fn generate(&self, _context: &QuestionnaireContext) -> Result<Vec<Value>, AgentError> {
        Ok(template_questions())
    }

    async fn assist(&self, _questionnaire_id: &str, question: &str) -> Result<String, AgentError> {
        Ok(first_match(question, ASSIST_RULES, GENERIC_ADVICE).to_owned())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[tokio::test]
    async fn generates_the_seven_question_template() {
        let questions = SyntheticQuestionnaireAgent
            .generate(&QuestionnaireContext::default())
            .await
            .expect("questions");
        let ids: Vec<_> = questions.iter().filter_map(|q| q["id"].as_str()).collect();
        assert_eq!(ids, vec!["q1", "q2", "q3", "q4", "q5", "q6", "q7"]);
        assert!(questions.iter().all(|q| q["type"] == "open"));
    }

    #[rstest]
    #[case::market("What is our TAM?", "To answer the market size question")]
    #[case::traction("How many customers?", "For the traction metrics question")]
    #[case::competition("Who are the competitors?", "For the competition question")]
    #[case::team("Tell me about the founder", "For the team experience question")]
    #[case::product("Roadmap please", "For the product roadmap question")]
    #[case::economics("Unit margins", "For the unit economics question")]
    #[case::funds("Where do the funds go?", "For the fundraising question")]
    #[case::fallback("Why now?", "Here's how you might approach")]
    #[tokio::test]
    async fn advice_follows_the_first_matching_keyword(
        #[case] question: &str,
        #[case] opening: &str,
    ) {
        let advice = SyntheticQuestionnaireAgent
            .assist("qn", question)
            .await
            .expect("advice");
        assert!(advice.starts_with(opening), "{advice}");
    }
}
