//! Keyword-matched chatbot replies.

use async_trait::async_trait;

use crate::domain::ports::{AgentError, ChatbotAgent};

use super::{COMPETITION_ADVICE, GENERIC_ADVICE, MARKET_SIZE_ADVICE, TRACTION_ADVICE, first_match};

const HEALTHCARE_SCREEN: &str = "Here are some AI startups in the healthcare sector:\n\n\
1. MediMind AI - Healthcare diagnostics, Score: 8.7/10\n\
2. BioTechAI - Drug discovery platform, Score: 8.2/10\n\
3. CareBot - Patient monitoring system, Score: 7.9/10";

const FINTECH_SCREEN: &str = "Here are some AI startups in the fintech sector:\n\n\
1. AlgoTrade - AI trading platform, Score: 8.5/10\n\
2. FraudShield - Fraud detection system, Score: 8.3/10\n\
3. WealthBot - Automated financial advisor, Score: 7.8/10";

const DEFAULT_SCREEN: &str = "Here are some AI startups with strong traction:\n\n\
1. DataMind - NLP for enterprise, Score: 8.9/10\n\
2. RoboVision - Computer vision platform, Score: 8.6/10\n\
3. CloudAI - ML infrastructure, Score: 8.4/10\n\
4. NeuralSystems - AI chip design, Score: 8.1/10\n\
5. SynthGen - Synthetic data generation, Score: 7.9/10";

const TEAM_DIVE: &str = "The founding team has strong technical credentials:\n\n\
- CEO: Former ML research lead at Google with PhD in Computer Science\n\
- CTO: 15+ years experience building scalable AI systems\n\
- CPO: Previously founded and exited a B2B SaaS startup\n\
- The team has worked together for 3+ years before founding";

const MARKET_DIVE: &str = "Market analysis:\n\n\
- Total addressable market (TAM): $45B by 2027\n\
- Growing at 32% CAGR\n\
- Current penetration is only 8%\n\
- Key growth drivers: enterprise AI adoption, regulatory changes, cloud migration";

const COMPETITION_DIVE: &str = "Competitive landscape:\n\n\
- 3 main competitors: BigAI (public), TechML (Series C), SmartSys (Series B)\n\
- Key differentiator: proprietary algorithm with 40% better performance\n\
- Barriers to entry: 2 pending patents, exclusive data partnerships\n\
- Pricing advantage: 30% lower TCO than closest competitor";

const OVERVIEW_DIVE: &str = "Company overview:\n\n\
- Founded in 2023, headquartered in San Francisco\n\
- Strong technical team with previous exits\n\
- Product: AI platform for automated decision-making\n\
- Traction: $1.2M ARR, growing 25% MoM\n\
- 35 enterprise customers including 2 Fortune 500\n\
- Key metrics: 92% gross retention, 130% net retention\n\
- Main risks: scaling sales team, potential regulatory changes";

const SCREEN_RULES: &[(&[&str], &str)] = &[
    (&["healthcare", "health"], HEALTHCARE_SCREEN),
    (&["fintech", "finance"], FINTECH_SCREEN),
];

const DIVE_RULES: &[(&[&str], &str)] = &[
    (&["team", "founder"], TEAM_DIVE),
    (&["market", "opportunity"], MARKET_DIVE),
    (&["competitor", "competition"], COMPETITION_DIVE),
];

const COACHING_RULES: &[(&[&str], &str)] = &[
    (&["market size", "tam"], MARKET_SIZE_ADVICE),
    (&["traction", "metrics"], TRACTION_ADVICE),
    (&["competitor", "differentiate"], COMPETITION_ADVICE),
];

/// Chatbot stand-in used when the chatbot base URL is `mock`.
#[derive(Debug, Default)]
pub struct SyntheticChatbotAgent;

#[async_trait]
impl ChatbotAgent for SyntheticChatbotAgent {
    async fn screen(&self, _session_id: &str, message: &str) -> Result<String, AgentError> {
        Ok(first_match(message, SCREEN_RULES, DEFAULT_SCREEN).to_owned())
    }

    async fn deep_dive(
        &self,
        _session_id: &str,
        message: &str,
        _deal_note_id: Option<String>,
    ) -> Result<String, AgentError> {
        Ok(first_match(message, DIVE_RULES, OVERVIEW_DIVE).to_owned())
    }

    async fn questionnaire(
        &self,
        _questionnaire_id: &str,
        message: &str,
    ) -> Result<String, AgentError> {
        Ok(first_match(message, COACHING_RULES, GENERIC_ADVICE).to_owned())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::health("Any HEALTH startups?", HEALTHCARE_SCREEN)]
    #[case::finance("finance deals", FINTECH_SCREEN)]
    #[case::other("show me robotics", DEFAULT_SCREEN)]
    #[tokio::test]
    async fn screener_matches_sectors(#[case] message: &str, #[case] expected: &str) {
        let reply = SyntheticChatbotAgent.screen("s", message).await.expect("reply");
        assert_eq!(reply, expected);
    }

    #[rstest]
    #[case::team("Who is on the team?", TEAM_DIVE)]
    #[case::market("How big is the opportunity?", MARKET_DIVE)]
    #[case::competition("What about competition?", COMPETITION_DIVE)]
    #[case::overview("Tell me more", OVERVIEW_DIVE)]
    #[tokio::test]
    async fn deep_dive_matches_topics(#[case] message: &str, #[case] expected: &str) {
        let reply = SyntheticChatbotAgent
            .deep_dive("s", message, None)
            .await
            .expect("reply");
        assert_eq!(reply, expected);
    }

    #[tokio::test]
    async fn coaching_shares_the_assistance_paragraphs() {
        let reply = SyntheticChatbotAgent
            .questionnaire("q", "Which metrics matter?")
            .await
            .expect("reply");
        assert_eq!(reply, TRACTION_ADVICE);
    }
}
