//! Intent and emotion classification.
//!
//! Keyword heuristics over already-sanitized text. No model, no state, no
//! side effects: identical text and trace always classify identically.
//!
//! Single words match whole tokens ("help" does not match "helpful"), stems
//! marked with a trailing `*` match by token prefix ("frustrat*" matches
//! "frustrating") and phrases match by substring ("how do i"). Each table
//! scores one point per keyword hit; the highest score wins, ties go to the
//! earlier entry in [`Intent::USER_INTENTS`].

use crate::history::SanitizedTraceSnapshot;
use serde::{Deserialize, Serialize};
use toron_config::ClassifierConfig;
use toron_core::{Emotion, Intent, score};

// ── Keyword tables ────────────────────────────────────────────────────────

const SUPPORT: &[&str] = &[
    "help", "fix", "error*", "bug", "bugs", "broken", "issue*", "problem*", "crash*",
    "fail*", "not working", "doesn't work", "can't", "cannot", "outage*",
];

const PLANNING: &[&str] = &[
    "plan", "plans", "plann*", "roadmap*", "schedul*", "timeline*", "rollout*",
    "milestone*", "strateg*", "organiz*", "prioritiz*", "next steps", "sprint*", "launch*",
];

const GUIDANCE: &[&str] = &[
    "how do i", "how to", "how can", "should i", "advice", "recommend*", "explain*",
    "guide", "best way", "what is", "why",
];

const IDEATION: &[&str] = &[
    "idea*", "brainstorm*", "imagin*", "invent*", "creativ*", "what if", "concept*",
    "story", "stories", "inspir*", "name for",
];

const FRUSTRATED: &[&str] = &[
    "frustrat*", "annoy*", "angry", "furious", "hate", "hates", "hated", "useless",
    "ridiculous", "stuck", "ugh", "sick of", "fed up", "terrible", "awful", "wtf",
];

const CONCERNED: &[&str] = &[
    "worr*", "concern*", "afraid", "anxious", "nervous", "scared", "risk", "risks",
    "risky", "unsure", "uncertain*", "fear*",
];

const APPRECIATIVE: &[&str] = &[
    "thank*", "appreciat*", "great", "awesome", "love", "loved", "perfect", "excellent",
    "wonderful", "helpful", "brilliant",
];

const URGENT: &[&str] = &[
    "urgent*", "asap", "immediately", "right now", "quickly", "emergency", "critical",
    "deadline*", "today", "hurry",
];

const STRUCTURAL: &[&str] = &[
    "architect*", "integrat*", "deploy*", "rollout*", "database*", "algorithm*",
    "system*", "migrat*", "pipeline*", "concurren*", "distributed", "security",
    "performance", "api", "apis", "config*", "plan", "plans", "plann*", "strateg*",
    "tradeoff*", "optimi*",
];

/// Token count at which the length term of complexity saturates.
const COMPLEXITY_TOKEN_SATURATION: f64 = 25.0;

/// Words at least this long count as "long" for complexity.
const LONG_WORD: usize = 7;

// ── Types ─────────────────────────────────────────────────────────────────

/// The one-shot analysis of an utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentClassification {
    pub intent: Intent,
    pub emotion: Emotion,
    pub confidence: f64,
    pub urgency: f64,
    pub complexity: f64,
    /// Lexical variety weighted by length.
    pub semantic_density: f64,
    /// Share of emotionally loaded tokens.
    pub emotional_density: f64,
}

impl IntentClassification {
    /// The fixed classification given to assistant output.
    pub fn respond() -> Self {
        Self {
            intent: Intent::Respond,
            emotion: Emotion::Neutral,
            confidence: 0.7,
            urgency: 0.1,
            complexity: 0.3,
            semantic_density: 0.5,
            emotional_density: 0.0,
        }
    }
}

impl Default for IntentClassification {
    fn default() -> Self {
        Self {
            intent: Intent::Dialogue,
            emotion: Emotion::Neutral,
            confidence: 0.3,
            urgency: 0.0,
            complexity: 0.0,
            semantic_density: 0.0,
            emotional_density: 0.0,
        }
    }
}

/// Keyword-driven classifier.
#[derive(Debug, Clone, Default)]
pub struct IntentClassifier {
    config: ClassifierConfig,
}

impl IntentClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Classify sanitized text, optionally boosted by the session trace.
    pub fn classify(
        &self,
        text: &str,
        trace: Option<&SanitizedTraceSnapshot>,
    ) -> IntentClassification {
        let lower = text.to_lowercase();
        let tokens = tokenize(&lower);
        let token_count = tokens.len() as f64;

        // ── Intent ───────────────────────────────────────────────────────
        let intent_scores = [
            (Intent::Support, hits(&lower, &tokens, SUPPORT)),
            (Intent::Planning, hits(&lower, &tokens, PLANNING)),
            (Intent::Guidance, hits(&lower, &tokens, GUIDANCE)),
            (Intent::Ideation, hits(&lower, &tokens, IDEATION)),
        ];
        let (intent, intent_hits) = strongest(&intent_scores, Intent::Dialogue);

        // ── Emotion ──────────────────────────────────────────────────────
        let emotion_scores = [
            (Emotion::Frustrated, hits(&lower, &tokens, FRUSTRATED)),
            (Emotion::Concerned, hits(&lower, &tokens, CONCERNED)),
            (Emotion::Appreciative, hits(&lower, &tokens, APPRECIATIVE)),
        ];
        let (emotion, emotion_hits) = strongest(&emotion_scores, Emotion::Neutral);

        // ── Scores ───────────────────────────────────────────────────────
        let momentum = trace.map_or(0.0, |t| score::unit(t.conversation_momentum));
        let confidence = score::within(
            self.config.min_confidence
                + 0.02 * token_count
                + 0.05 * (intent_hits + emotion_hits) as f64
                + momentum * self.config.momentum_boost,
            self.config.min_confidence,
            self.config.max_confidence,
        );

        let exclamations = text.matches('!').count().min(3) as f64;
        let negative = if emotion.is_negative() { 0.15 } else { 0.0 };
        let urgency = score::unit(
            0.25 * hits(&lower, &tokens, URGENT) as f64 + 0.1 * exclamations + negative,
        );

        let complexity = if tokens.is_empty() {
            0.0
        } else {
            let long_ratio =
                tokens.iter().filter(|t| t.chars().count() >= LONG_WORD).count() as f64
                    / token_count;
            let structural = hits(&lower, &tokens, STRUCTURAL).min(4) as f64;
            score::unit(
                0.5 * (token_count / COMPLEXITY_TOKEN_SATURATION).min(1.0)
                    + 0.3 * long_ratio
                    + 0.1 * structural,
            )
        };

        let semantic_density = if tokens.is_empty() {
            0.0
        } else {
            let mut unique = tokens.clone();
            unique.sort_unstable();
            unique.dedup();
            score::unit(unique.len() as f64 / token_count * (token_count / 12.0).min(1.0))
        };
        let emotional_density = score::unit(emotion_hits as f64 / token_count.max(1.0) * 4.0);

        IntentClassification {
            intent,
            emotion,
            confidence,
            urgency,
            complexity,
            semantic_density,
            emotional_density,
        }
    }
}

/// A short scrubbed topic label: the first few content words.
pub fn extract_topic(text: &str) -> String {
    const STOPWORDS: &[&str] = &[
        "about", "after", "could", "from", "have", "just", "need", "please", "should",
        "that", "their", "there", "this", "what", "when", "where", "which", "with",
        "would", "your",
    ];
    let lower = text.to_lowercase();
    tokenize(&lower)
        .into_iter()
        .filter(|t| t.chars().count() > 3 && !STOPWORDS.contains(t))
        .take(5)
        .collect::<Vec<_>>()
        .join(" ")
}

fn tokenize(lower: &str) -> Vec<&str> {
    lower
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|t| !t.is_empty())
        .collect()
}

/// Count keywords present: phrases by substring, `*` stems by token prefix,
/// other words by whole token.
fn hits(lower: &str, tokens: &[&str], keywords: &[&str]) -> usize {
    keywords
        .iter()
        .filter(|kw| {
            if kw.contains(' ') {
                lower.contains(*kw)
            } else if let Some(stem) = kw.strip_suffix('*') {
                tokens.iter().any(|t| t.starts_with(stem))
            } else {
                tokens.contains(*kw)
            }
        })
        .count()
}

/// Highest-scoring label; earlier entries win ties; zero hits yields the fallback.
fn strongest<T: Copy>(scores: &[(T, usize)], fallback: T) -> (T, usize) {
    scores
        .iter()
        .fold((fallback, 0), |best, &(label, hits)| {
            if hits > best.1 { (label, hits) } else { best }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> IntentClassification {
        IntentClassifier::default().classify(text, None)
    }

    #[test]
    fn rollout_question_is_planning() {
        let c = classify("Can you help me plan the rollout?");
        assert_eq!(c.intent, Intent::Planning);
        assert_eq!(c.emotion, Emotion::Neutral);
        assert!(c.complexity > 0.2, "complexity was {}", c.complexity);
    }

    #[test]
    fn broken_things_are_support() {
        let c = classify("the login page is broken and throws an error");
        assert_eq!(c.intent, Intent::Support);
    }

    #[test]
    fn how_to_questions_are_guidance() {
        let c = classify("how do i choose between these two options");
        assert_eq!(c.intent, Intent::Guidance);
    }

    #[test]
    fn brainstorming_is_ideation() {
        let c = classify("let's brainstorm a name for the new cafe");
        assert_eq!(c.intent, Intent::Ideation);
    }

    #[test]
    fn small_talk_is_dialogue() {
        let c = classify("nice weather today, isn't it");
        assert_eq!(c.intent, Intent::Dialogue);
    }

    #[test]
    fn emotions_are_detected() {
        assert_eq!(
            classify("I'm so frustrated, this is useless").emotion,
            Emotion::Frustrated
        );
        assert_eq!(
            classify("I'm worried about the risk here").emotion,
            Emotion::Concerned
        );
        assert_eq!(
            classify("thanks, that was really helpful").emotion,
            Emotion::Appreciative
        );
    }

    #[test]
    fn words_only_match_whole_tokens() {
        let c = classify("thanks, that was really helpful");
        assert_eq!(c.intent, Intent::Dialogue);
        assert_eq!(c.emotion, Emotion::Appreciative);

        assert_eq!(classify("tell me about the planet mars").intent, Intent::Dialogue);
        assert_eq!(classify("the ocean is greater than the sea").emotion, Emotion::Neutral);
    }

    #[test]
    fn stems_match_inflections() {
        assert_eq!(classify("I keep failing the build").intent, Intent::Support);
        assert_eq!(classify("we are planning the launch").intent, Intent::Planning);
        assert_eq!(classify("this is so frustrating").emotion, Emotion::Frustrated);
    }

    #[test]
    fn inverted_bounds_do_not_panic() {
        let classifier = IntentClassifier::new(ClassifierConfig {
            min_confidence: 0.8,
            max_confidence: 0.4,
            ..ClassifierConfig::default()
        });
        let c = classifier.classify("hello there", None);
        assert!((0.4..=0.8).contains(&c.confidence));
    }

    #[test]
    fn urgency_rises_with_markers() {
        let calm = classify("whenever you have time, review the doc");
        let urgent = classify("this is urgent, fix it asap!!!");
        assert!(urgent.urgency > calm.urgency);
        assert!(urgent.urgency > 0.5);
    }

    #[test]
    fn confidence_is_bounded() {
        let short = classify("hi");
        let long = classify(&"plan the database migration rollout strategy ".repeat(20));
        assert!(short.confidence >= 0.3);
        assert!(long.confidence <= 0.9);
        assert!(long.confidence > short.confidence);
    }

    #[test]
    fn momentum_boosts_confidence() {
        let classifier = IntentClassifier::default();
        let mut trace = SanitizedTraceSnapshot::default();
        let cold = classifier.classify("tell me more", Some(&trace));
        trace.conversation_momentum = 1.0;
        let warm = classifier.classify("tell me more", Some(&trace));
        assert!(warm.confidence > cold.confidence);
    }

    #[test]
    fn classification_is_deterministic() {
        let text = "I'm worried the deploy pipeline will fail tomorrow";
        assert_eq!(classify(text), classify(text));
    }

    #[test]
    fn empty_text_has_floor_scores() {
        let c = classify("");
        assert_eq!(c.intent, Intent::Dialogue);
        assert_eq!(c.emotion, Emotion::Neutral);
        assert_eq!(c.confidence, 0.3);
        assert_eq!(c.complexity, 0.0);
        assert_eq!(c.semantic_density, 0.0);
    }

    #[test]
    fn all_scores_in_unit_range() {
        for text in ["", "!!!!!!!!", "urgent asap emergency critical now!!!", &"x ".repeat(500)] {
            let c = classify(text);
            for v in [
                c.confidence,
                c.urgency,
                c.complexity,
                c.semantic_density,
                c.emotional_density,
            ] {
                assert!((0.0..=1.0).contains(&v), "{v} out of range for {text:?}");
            }
        }
    }

    #[test]
    fn topic_skips_short_and_stop_words() {
        assert_eq!(
            extract_topic("Could you review the database migration plan for [num]"),
            "review database migration plan"
        );
        assert_eq!(extract_topic(""), "");
    }
}
