//! crates/serenica_core/src/questionnaires.rs
//!
//! CBT-based self-report questionnaires: PHQ-9, GAD-7, DASS-21, and the
//! CBT thought record. The question banks are typed data; scoring is a set
//! of pure functions over fixed-weight answer maps with published cut-points.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::ChatbotKind;

//=========================================================================================
// Question Banks
//=========================================================================================

/// One selectable option on a scale or multiselect question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOption {
    pub value: AnswerValue,
    pub label: String,
}

impl QuestionOption {
    fn scale(value: i64, label: &str) -> Self {
        Self { value: AnswerValue::Integer(value), label: label.to_string() }
    }

    fn choice(value: &str, label: &str) -> Self {
        Self { value: AnswerValue::Text(value.to_string()), label: label.to_string() }
    }
}

/// The shape of a question, carrying its own validation contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    /// A fixed-weight integer scale (e.g. 0..=3 frequency ratings).
    Scale { options: Vec<QuestionOption> },
    /// Free text.
    Textarea { placeholder: String },
    /// Zero or more selections from a fixed option list.
    Multiselect { options: Vec<QuestionOption> },
    /// An integer in `min..=max`, stepping by `step`.
    Slider { min: i64, max: i64, step: i64 },
}

/// Which DASS-21 subscale an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subscale {
    Depression,
    Anxiety,
    Stress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscale: Option<Subscale>,
}

impl Question {
    fn scale(id: &str, text: &str, options: Vec<QuestionOption>) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
            kind: QuestionKind::Scale { options },
            subscale: None,
        }
    }

    fn with_subscale(mut self, subscale: Subscale) -> Self {
        self.subscale = Some(subscale);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Questionnaire {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub duration_minutes: u32,
    pub questions: Vec<Question>,
}

impl Questionnaire {
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

/// A single submitted answer. The variant must match the question kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Integer(i64),
    Text(String),
    Selections(Vec<String>),
}

impl AnswerValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AnswerValue::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

/// Why a submitted answer map was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("unknown questionnaire '{0}'")]
    UnknownQuestionnaire(String),
    #[error("question '{0}' was not answered")]
    MissingAnswer(String),
    #[error("answer for unknown question '{0}'")]
    UnknownQuestion(String),
    #[error("answer for question '{id}' is invalid: {reason}")]
    InvalidAnswer { id: String, reason: String },
}

impl QuestionKind {
    /// Checks one answer against this question's contract.
    pub fn validate(&self, id: &str, answer: &AnswerValue) -> Result<(), ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidAnswer {
            id: id.to_string(),
            reason: reason.to_string(),
        };
        match self {
            QuestionKind::Scale { options } => {
                let value = answer.as_integer().ok_or_else(|| invalid("expected an integer"))?;
                let allowed = options
                    .iter()
                    .any(|o| o.value.as_integer() == Some(value));
                if !allowed {
                    return Err(invalid("value is not one of the scale options"));
                }
                Ok(())
            }
            QuestionKind::Textarea { .. } => match answer {
                AnswerValue::Text(t) if !t.trim().is_empty() => Ok(()),
                AnswerValue::Text(_) => Err(invalid("text must not be empty")),
                _ => Err(invalid("expected text")),
            },
            QuestionKind::Multiselect { options } => match answer {
                AnswerValue::Selections(values) => {
                    for v in values {
                        let known = options.iter().any(|o| match &o.value {
                            AnswerValue::Text(t) => t == v,
                            _ => false,
                        });
                        if !known {
                            return Err(invalid("selection is not one of the options"));
                        }
                    }
                    Ok(())
                }
                _ => Err(invalid("expected a list of selections")),
            },
            QuestionKind::Slider { min, max, step } => {
                let value = answer.as_integer().ok_or_else(|| invalid("expected an integer"))?;
                if value < *min || value > *max {
                    return Err(invalid("value is outside the slider range"));
                }
                if *step > 0 && (value - min) % step != 0 {
                    return Err(invalid("value does not land on a slider step"));
                }
                Ok(())
            }
        }
    }
}

/// Validates a complete answer map against a questionnaire: every question
/// answered, no stray answers, every value within its question's contract.
pub fn validate_answers(
    questionnaire: &Questionnaire,
    answers: &BTreeMap<String, AnswerValue>,
) -> Result<(), ValidationError> {
    for question in &questionnaire.questions {
        let answer = answers
            .get(&question.id)
            .ok_or_else(|| ValidationError::MissingAnswer(question.id.clone()))?;
        question.kind.validate(&question.id, answer)?;
    }
    for id in answers.keys() {
        if questionnaire.question(id).is_none() {
            return Err(ValidationError::UnknownQuestion(id.clone()));
        }
    }
    Ok(())
}

fn frequency_options() -> Vec<QuestionOption> {
    vec![
        QuestionOption::scale(0, "Not at all"),
        QuestionOption::scale(1, "Several days"),
        QuestionOption::scale(2, "More than half the days"),
        QuestionOption::scale(3, "Nearly every day"),
    ]
}

fn applicability_options() -> Vec<QuestionOption> {
    vec![
        QuestionOption::scale(0, "Did not apply to me at all"),
        QuestionOption::scale(1, "Applied to me to some degree"),
        QuestionOption::scale(2, "Applied to me a considerable degree"),
        QuestionOption::scale(3, "Applied to me very much"),
    ]
}

/// PHQ-9: Patient Health Questionnaire for depression.
pub fn phq9() -> Questionnaire {
    let items = [
        ("phq9_q1", "Little interest or pleasure in doing things"),
        ("phq9_q2", "Feeling down, depressed, or hopeless"),
        ("phq9_q3", "Trouble falling or staying asleep, or sleeping too much"),
        ("phq9_q4", "Feeling tired or having little energy"),
        ("phq9_q5", "Poor appetite or overeating"),
        (
            "phq9_q6",
            "Feeling bad about yourself - or that you are a failure or have let yourself or your family down",
        ),
        (
            "phq9_q7",
            "Trouble concentrating on things, such as reading the newspaper or watching television",
        ),
        (
            "phq9_q8",
            "Moving or speaking so slowly that other people could have noticed. Or the opposite - being so fidgety or restless that you have been moving around a lot more than usual",
        ),
        (
            "phq9_q9",
            "Thoughts that you would be better off dead, or of hurting yourself",
        ),
    ];
    Questionnaire {
        id: "phq9".to_string(),
        title: "PHQ-9 Depression Screening".to_string(),
        description: "A 9-item questionnaire to screen for depression severity".to_string(),
        category: "depression".to_string(),
        duration_minutes: 5,
        questions: items
            .iter()
            .map(|(id, text)| Question::scale(id, text, frequency_options()))
            .collect(),
    }
}

/// GAD-7: Generalized Anxiety Disorder scale.
pub fn gad7() -> Questionnaire {
    let items = [
        ("gad7_q1", "Feeling nervous, anxious, or on edge"),
        ("gad7_q2", "Not being able to stop or control worrying"),
        ("gad7_q3", "Worrying too much about different things"),
        ("gad7_q4", "Trouble relaxing"),
        ("gad7_q5", "Being so restless that it is hard to sit still"),
        ("gad7_q6", "Becoming easily annoyed or irritable"),
        ("gad7_q7", "Feeling afraid, as if something awful might happen"),
    ];
    Questionnaire {
        id: "gad7".to_string(),
        title: "GAD-7 Anxiety Screening".to_string(),
        description: "A 7-item questionnaire to screen for generalized anxiety disorder"
            .to_string(),
        category: "anxiety".to_string(),
        duration_minutes: 3,
        questions: items
            .iter()
            .map(|(id, text)| Question::scale(id, text, frequency_options()))
            .collect(),
    }
}

/// DASS-21: Depression, Anxiety and Stress Scale, 7 items per subscale.
pub fn dass21() -> Questionnaire {
    use Subscale::*;
    let items: [(&str, &str, Subscale); 21] = [
        ("dass21_q3", "I couldn't seem to experience any positive feeling at all", Depression),
        ("dass21_q5", "I found it difficult to work up the initiative to do things", Depression),
        ("dass21_q10", "I felt that I had nothing to look forward to", Depression),
        ("dass21_q13", "I felt down-hearted and blue", Depression),
        ("dass21_q16", "I was unable to become enthusiastic about anything", Depression),
        ("dass21_q17", "I felt I wasn't worth much as a person", Depression),
        ("dass21_q21", "I felt that life was meaningless", Depression),
        ("dass21_q2", "I was aware of dryness of my mouth", Anxiety),
        (
            "dass21_q4",
            "I experienced breathing difficulty (e.g., rapid breathing, breathlessness)",
            Anxiety,
        ),
        ("dass21_q7", "I experienced trembling (e.g., in the hands)", Anxiety),
        (
            "dass21_q9",
            "I found myself in situations that made me so anxious I was relieved when they ended",
            Anxiety,
        ),
        ("dass21_q15", "I felt I was close to panic", Anxiety),
        (
            "dass21_q19",
            "I was aware of the action of my heart without physical exertion",
            Anxiety,
        ),
        ("dass21_q20", "I felt scared without any good reason", Anxiety),
        ("dass21_q1", "I found it hard to wind down", Stress),
        ("dass21_q6", "I tended to over-react to situations", Stress),
        ("dass21_q8", "I felt that I was using a lot of nervous energy", Stress),
        ("dass21_q11", "I found myself getting agitated", Stress),
        ("dass21_q12", "I found it difficult to relax", Stress),
        (
            "dass21_q14",
            "I was intolerant of anything that kept me from getting on with what I was doing",
            Stress,
        ),
        ("dass21_q18", "I felt that I was rather touchy", Stress),
    ];
    Questionnaire {
        id: "dass21".to_string(),
        title: "DASS-21 Assessment".to_string(),
        description: "A 21-item scale measuring depression, anxiety, and stress".to_string(),
        category: "comprehensive".to_string(),
        duration_minutes: 10,
        questions: items
            .iter()
            .map(|(id, text, subscale)| {
                Question::scale(id, text, applicability_options()).with_subscale(*subscale)
            })
            .collect(),
    }
}

/// CBT thought record: record and challenge negative automatic thoughts.
pub fn thought_record() -> Questionnaire {
    let emotions = [
        ("anxious", "Anxious"),
        ("sad", "Sad"),
        ("angry", "Angry"),
        ("guilty", "Guilty"),
        ("ashamed", "Ashamed"),
        ("frustrated", "Frustrated"),
        ("disappointed", "Disappointed"),
        ("hopeless", "Hopeless"),
    ];
    let distortions = [
        ("all_or_nothing", "All-or-Nothing Thinking"),
        ("overgeneralization", "Overgeneralization"),
        ("mental_filter", "Mental Filter"),
        ("disqualifying_positive", "Disqualifying the Positive"),
        ("jumping_conclusions", "Jumping to Conclusions"),
        ("magnification", "Magnification/Minimization"),
        ("emotional_reasoning", "Emotional Reasoning"),
        ("should_statements", "\"Should\" Statements"),
        ("labeling", "Labeling"),
        ("personalization", "Personalization"),
    ];
    let textarea = |id: &str, text: &str, placeholder: &str| Question {
        id: id.to_string(),
        text: text.to_string(),
        kind: QuestionKind::Textarea { placeholder: placeholder.to_string() },
        subscale: None,
    };
    let multiselect = |id: &str, text: &str, opts: &[(&str, &str)]| Question {
        id: id.to_string(),
        text: text.to_string(),
        kind: QuestionKind::Multiselect {
            options: opts.iter().map(|(v, l)| QuestionOption::choice(v, l)).collect(),
        },
        subscale: None,
    };
    let slider = |id: &str, text: &str| Question {
        id: id.to_string(),
        text: text.to_string(),
        kind: QuestionKind::Slider { min: 0, max: 100, step: 10 },
        subscale: None,
    };
    Questionnaire {
        id: "thought_record".to_string(),
        title: "CBT Thought Record".to_string(),
        description: "Record and challenge negative automatic thoughts".to_string(),
        category: "cbt".to_string(),
        duration_minutes: 15,
        questions: vec![
            textarea(
                "tr_situation",
                "Describe the situation that triggered your distress",
                "What happened? Where were you? Who was involved?",
            ),
            multiselect("tr_emotions", "What emotions did you feel?", &emotions),
            slider("tr_emotion_intensity", "Rate the intensity of your emotions (0-100)"),
            textarea(
                "tr_automatic_thoughts",
                "What automatic thoughts went through your mind?",
                "What were you thinking at that moment?",
            ),
            textarea(
                "tr_evidence_for",
                "What evidence supports this thought?",
                "Facts that support the thought...",
            ),
            textarea(
                "tr_evidence_against",
                "What evidence contradicts this thought?",
                "Facts that contradict the thought...",
            ),
            multiselect(
                "tr_cognitive_distortions",
                "What thinking patterns might be at play?",
                &distortions,
            ),
            textarea(
                "tr_alternative_thought",
                "What is a more balanced alternative thought?",
                "A more realistic and helpful way to think about this...",
            ),
            slider(
                "tr_new_emotion_intensity",
                "Re-rate the intensity of your emotions now (0-100)",
            ),
        ],
    }
}

/// All available questionnaires.
pub fn all() -> Vec<Questionnaire> {
    vec![phq9(), gad7(), dass21(), thought_record()]
}

pub fn by_id(id: &str) -> Option<Questionnaire> {
    all().into_iter().find(|q| q.id == id)
}

//=========================================================================================
// Scoring
//=========================================================================================

/// Severity bands for the screening instruments (PHQ-9 / GAD-7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Minimal,
    Mild,
    Moderate,
    ModeratelySevere,
    Severe,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Minimal => "Minimal",
            Severity::Mild => "Mild",
            Severity::Moderate => "Moderate",
            Severity::ModeratelySevere => "Moderately Severe",
            Severity::Severe => "Severe",
        }
    }
}

/// Severity bands for the DASS-21 subscales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DassSeverity {
    Normal,
    Mild,
    Moderate,
    Severe,
    ExtremelySevere,
}

impl DassSeverity {
    pub fn label(&self) -> &'static str {
        match self {
            DassSeverity::Normal => "Normal",
            DassSeverity::Mild => "Mild",
            DassSeverity::Moderate => "Moderate",
            DassSeverity::Severe => "Severe",
            DassSeverity::ExtremelySevere => "Extremely Severe",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningOutcome {
    pub total_score: i64,
    pub severity: Severity,
    pub interpretation: String,
    pub recommendations: Vec<String>,
    pub requires_attention: bool,
    pub crisis_flag: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dass21Outcome {
    pub depression_score: i64,
    pub anxiety_score: i64,
    pub stress_score: i64,
    pub depression_severity: DassSeverity,
    pub anxiety_severity: DassSeverity,
    pub stress_severity: DassSeverity,
    pub recommendations: Vec<String>,
    pub requires_attention: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThoughtRecordOutcome {
    pub initial_intensity: i64,
    pub final_intensity: i64,
    pub improvement: i64,
    pub improvement_percentage: i64,
    pub interpretation: String,
    pub cognitive_distortions: Vec<String>,
    pub emotions: Vec<String>,
}

/// The computed result of any questionnaire, tagged by instrument family.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreOutcome {
    Screening(ScreeningOutcome),
    Dass21(Dass21Outcome),
    ThoughtRecord(ThoughtRecordOutcome),
}

impl ScoreOutcome {
    /// A one-line summary used to ground the chat system prompt.
    pub fn summary(&self, title: &str) -> String {
        match self {
            ScoreOutcome::Screening(s) => format!(
                "{}: total score {} ({})",
                title,
                s.total_score,
                s.severity.label()
            ),
            ScoreOutcome::Dass21(d) => format!(
                "{}: depression {} ({}), anxiety {} ({}), stress {} ({})",
                title,
                d.depression_score,
                d.depression_severity.label(),
                d.anxiety_score,
                d.anxiety_severity.label(),
                d.stress_score,
                d.stress_severity.label()
            ),
            ScoreOutcome::ThoughtRecord(t) => format!(
                "{}: emotion intensity {} -> {} ({}% improvement)",
                title, t.initial_intensity, t.final_intensity, t.improvement_percentage
            ),
        }
    }
}

fn integer_answer(answers: &BTreeMap<String, AnswerValue>, id: &str) -> i64 {
    answers.get(id).and_then(AnswerValue::as_integer).unwrap_or(0)
}

fn sum_items(answers: &BTreeMap<String, AnswerValue>, ids: &[&str]) -> i64 {
    ids.iter().map(|id| integer_answer(answers, id)).sum()
}

/// Scores a PHQ-9 answer map against the published cut-points {4, 9, 14, 19}.
pub fn score_phq9(answers: &BTreeMap<String, AnswerValue>) -> ScreeningOutcome {
    let ids: Vec<String> = (1..=9).map(|n| format!("phq9_q{n}")).collect();
    let total_score: i64 = ids.iter().map(|id| integer_answer(answers, id)).sum();

    let (severity, interpretation, mut recommendations) = if total_score <= 4 {
        (
            Severity::Minimal,
            "Your responses suggest minimal or no depression symptoms.",
            vec![
                "Continue with healthy lifestyle habits",
                "Practice regular self-care",
                "Stay connected with friends and family",
            ],
        )
    } else if total_score <= 9 {
        (
            Severity::Mild,
            "Your responses suggest mild depression symptoms.",
            vec![
                "Consider talking to someone you trust",
                "Engage in activities you enjoy",
                "Monitor your symptoms",
                "Try our CBT chatbot for support",
            ],
        )
    } else if total_score <= 14 {
        (
            Severity::Moderate,
            "Your responses suggest moderate depression symptoms.",
            vec![
                "Consider consulting with a mental health professional",
                "Use our CBT chatbot for guided support",
                "Practice self-care strategies regularly",
                "Book an appointment with a therapist through our platform",
            ],
        )
    } else if total_score <= 19 {
        (
            Severity::ModeratelySevere,
            "Your responses suggest moderately severe depression symptoms.",
            vec![
                "We strongly recommend speaking with a mental health professional",
                "Book an appointment through our platform",
                "Use our crisis resources if needed",
                "Reach out to trusted friends or family",
            ],
        )
    } else {
        (
            Severity::Severe,
            "Your responses suggest severe depression symptoms.",
            vec![
                "Please seek professional help immediately",
                "Contact a mental health professional",
                "Use crisis hotlines if you're in immediate distress",
                "You're not alone - help is available",
            ],
        )
    };

    let mut recommendations: Vec<String> =
        recommendations.drain(..).map(str::to_string).collect();

    // Item 9 asks about self-harm ideation; any nonzero response raises the
    // crisis flag regardless of the total score.
    let crisis_flag = integer_answer(answers, "phq9_q9") > 0;
    if crisis_flag {
        recommendations.insert(
            0,
            "IMPORTANT: You indicated thoughts of self-harm. Please contact a crisis hotline immediately: National Suicide Prevention Lifeline 988"
                .to_string(),
        );
    }

    ScreeningOutcome {
        total_score,
        severity,
        interpretation: interpretation.to_string(),
        recommendations,
        requires_attention: total_score >= 10 || crisis_flag,
        crisis_flag,
    }
}

/// Scores a GAD-7 answer map against the published cut-points {4, 9, 14}.
pub fn score_gad7(answers: &BTreeMap<String, AnswerValue>) -> ScreeningOutcome {
    let ids: Vec<String> = (1..=7).map(|n| format!("gad7_q{n}")).collect();
    let total_score: i64 = ids.iter().map(|id| integer_answer(answers, id)).sum();

    let (severity, interpretation, recommendations) = if total_score <= 4 {
        (
            Severity::Minimal,
            "Your responses suggest minimal anxiety symptoms.",
            vec![
                "Continue with stress management practices",
                "Practice mindfulness exercises",
                "Maintain healthy sleep and exercise habits",
            ],
        )
    } else if total_score <= 9 {
        (
            Severity::Mild,
            "Your responses suggest mild anxiety symptoms.",
            vec![
                "Try relaxation techniques like deep breathing",
                "Use our Mindfulness chatbot for guided exercises",
                "Consider journaling your worries",
                "Maintain a regular routine",
            ],
        )
    } else if total_score <= 14 {
        (
            Severity::Moderate,
            "Your responses suggest moderate anxiety symptoms.",
            vec![
                "Consider professional support",
                "Practice CBT techniques through our chatbot",
                "Try our neurobic exercises for stress relief",
                "Book an appointment with a therapist",
            ],
        )
    } else {
        (
            Severity::Severe,
            "Your responses suggest severe anxiety symptoms.",
            vec![
                "We recommend consulting with a mental health professional",
                "Book an appointment through our platform",
                "Use grounding techniques during high anxiety",
                "Consider medication evaluation with a psychiatrist",
            ],
        )
    };

    ScreeningOutcome {
        total_score,
        severity,
        interpretation: interpretation.to_string(),
        recommendations: recommendations.into_iter().map(str::to_string).collect(),
        requires_attention: total_score >= 10,
        crisis_flag: false,
    }
}

const DASS_DEPRESSION_ITEMS: [&str; 7] = [
    "dass21_q3", "dass21_q5", "dass21_q10", "dass21_q13", "dass21_q16", "dass21_q17", "dass21_q21",
];
const DASS_ANXIETY_ITEMS: [&str; 7] = [
    "dass21_q2", "dass21_q4", "dass21_q7", "dass21_q9", "dass21_q15", "dass21_q19", "dass21_q20",
];
const DASS_STRESS_ITEMS: [&str; 7] = [
    "dass21_q1", "dass21_q6", "dass21_q8", "dass21_q11", "dass21_q12", "dass21_q14", "dass21_q18",
];

fn dass_depression_severity(score: i64) -> DassSeverity {
    match score {
        ..=9 => DassSeverity::Normal,
        10..=13 => DassSeverity::Mild,
        14..=20 => DassSeverity::Moderate,
        21..=27 => DassSeverity::Severe,
        _ => DassSeverity::ExtremelySevere,
    }
}

fn dass_anxiety_severity(score: i64) -> DassSeverity {
    match score {
        ..=7 => DassSeverity::Normal,
        8..=9 => DassSeverity::Mild,
        10..=14 => DassSeverity::Moderate,
        15..=19 => DassSeverity::Severe,
        _ => DassSeverity::ExtremelySevere,
    }
}

fn dass_stress_severity(score: i64) -> DassSeverity {
    match score {
        ..=14 => DassSeverity::Normal,
        15..=18 => DassSeverity::Mild,
        19..=25 => DassSeverity::Moderate,
        26..=33 => DassSeverity::Severe,
        _ => DassSeverity::ExtremelySevere,
    }
}

/// Scores DASS-21: each raw 7-item subscale sum is doubled before bucketing,
/// matching the published short-form instrument.
pub fn score_dass21(answers: &BTreeMap<String, AnswerValue>) -> Dass21Outcome {
    let depression_score = sum_items(answers, &DASS_DEPRESSION_ITEMS) * 2;
    let anxiety_score = sum_items(answers, &DASS_ANXIETY_ITEMS) * 2;
    let stress_score = sum_items(answers, &DASS_STRESS_ITEMS) * 2;

    let mut recommendations = Vec::new();
    if depression_score > 13 {
        recommendations.push("Consider CBT therapy for depression management".to_string());
    }
    if anxiety_score > 9 {
        recommendations.push("Try mindfulness exercises for anxiety relief".to_string());
    }
    if stress_score > 18 {
        recommendations.push("Practice stress management techniques".to_string());
    }
    if depression_score <= 9 && anxiety_score <= 7 && stress_score <= 14 {
        recommendations.push(
            "Your scores are in the normal range - keep up your self-care practices".to_string(),
        );
    } else {
        recommendations
            .push("Consider booking an appointment with one of our therapists".to_string());
        recommendations.push("Use our AI chatbots for daily support".to_string());
    }

    Dass21Outcome {
        depression_score,
        anxiety_score,
        stress_score,
        depression_severity: dass_depression_severity(depression_score),
        anxiety_severity: dass_anxiety_severity(anxiety_score),
        stress_severity: dass_stress_severity(stress_score),
        recommendations,
        requires_attention: depression_score > 13 || anxiety_score > 9 || stress_score > 18,
    }
}

/// Scores a CBT thought record by the drop in self-rated emotion intensity.
pub fn score_thought_record(answers: &BTreeMap<String, AnswerValue>) -> ThoughtRecordOutcome {
    let initial_intensity = integer_answer(answers, "tr_emotion_intensity");
    let final_intensity = integer_answer(answers, "tr_new_emotion_intensity");
    let improvement = initial_intensity - final_intensity;
    let improvement_percentage = if initial_intensity > 0 {
        ((improvement as f64 / initial_intensity as f64) * 100.0).round() as i64
    } else {
        0
    };

    let interpretation = if improvement_percentage > 25 {
        "Great work! You've successfully reduced the intensity of your distressing emotions through cognitive restructuring."
    } else if improvement_percentage > 0 {
        "You've made some progress in reframing your thoughts. Keep practicing!"
    } else {
        "Sometimes it takes time to shift our thinking patterns. Don't give up - keep practicing."
    };

    let selections = |id: &str| match answers.get(id) {
        Some(AnswerValue::Selections(v)) => v.clone(),
        _ => Vec::new(),
    };

    ThoughtRecordOutcome {
        initial_intensity,
        final_intensity,
        improvement,
        improvement_percentage,
        interpretation: interpretation.to_string(),
        cognitive_distortions: selections("tr_cognitive_distortions"),
        emotions: selections("tr_emotions"),
    }
}

/// Validates, then scores, an answer map for the named questionnaire.
pub fn score(
    questionnaire_id: &str,
    answers: &BTreeMap<String, AnswerValue>,
) -> Result<ScoreOutcome, ValidationError> {
    let questionnaire = by_id(questionnaire_id)
        .ok_or_else(|| ValidationError::UnknownQuestionnaire(questionnaire_id.to_string()))?;
    validate_answers(&questionnaire, answers)?;
    Ok(match questionnaire_id {
        "phq9" => ScoreOutcome::Screening(score_phq9(answers)),
        "gad7" => ScoreOutcome::Screening(score_gad7(answers)),
        "dass21" => ScoreOutcome::Dass21(score_dass21(answers)),
        _ => ScoreOutcome::ThoughtRecord(score_thought_record(answers)),
    })
}

/// Which chatbot to suggest after a questionnaire, and why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatbotRecommendation {
    pub chatbot: ChatbotKind,
    pub message: String,
}

/// Maps a scored outcome to the most helpful chatbot.
pub fn chatbot_recommendation(
    questionnaire_id: &str,
    outcome: &ScoreOutcome,
) -> ChatbotRecommendation {
    match (questionnaire_id, outcome) {
        ("phq9", ScoreOutcome::Screening(s)) if s.total_score >= 10 => ChatbotRecommendation {
            chatbot: ChatbotKind::Cbt,
            message: "Our Cognitive Behavioral Therapy chatbot can help you work through depressive thoughts and develop coping strategies.".to_string(),
        },
        ("gad7", ScoreOutcome::Screening(s)) if s.total_score >= 10 => ChatbotRecommendation {
            chatbot: ChatbotKind::Mindfulness,
            message: "Our Mindfulness chatbot can guide you through anxiety-reducing exercises and help you stay grounded in the present.".to_string(),
        },
        ("dass21", ScoreOutcome::Dass21(d))
            if d.depression_score > d.anxiety_score && d.depression_score > d.stress_score =>
        {
            ChatbotRecommendation {
                chatbot: ChatbotKind::Cbt,
                message: "Based on your results, our CBT chatbot may be most helpful for addressing depressive symptoms.".to_string(),
            }
        }
        ("dass21", ScoreOutcome::Dass21(d))
            if d.anxiety_score > d.depression_score && d.anxiety_score > d.stress_score =>
        {
            ChatbotRecommendation {
                chatbot: ChatbotKind::Mindfulness,
                message: "Based on your results, our Mindfulness chatbot may be most helpful for managing anxiety.".to_string(),
            }
        }
        _ => ChatbotRecommendation {
            chatbot: ChatbotKind::Cbt,
            message: "Our AI chatbots are here to support you. Choose the one that best fits your needs.".to_string(),
        },
    }
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn scale_answers(prefix: &str, count: usize, value: i64) -> BTreeMap<String, AnswerValue> {
        (1..=count)
            .map(|n| (format!("{prefix}_q{n}"), AnswerValue::Integer(value)))
            .collect()
    }

    #[test]
    fn phq9_total_is_sum_of_items() {
        let mut answers = scale_answers("phq9", 9, 0);
        answers.insert("phq9_q2".to_string(), AnswerValue::Integer(3));
        answers.insert("phq9_q5".to_string(), AnswerValue::Integer(2));
        let outcome = score_phq9(&answers);
        assert_eq!(outcome.total_score, 5);
        assert_eq!(outcome.severity, Severity::Mild);
    }

    #[test]
    fn phq9_all_twos_is_moderately_severe() {
        let answers = scale_answers("phq9", 9, 2);
        let outcome = score_phq9(&answers);
        assert_eq!(outcome.total_score, 18);
        assert_eq!(outcome.severity, Severity::ModeratelySevere);
        assert!(outcome.requires_attention);
    }

    #[test]
    fn phq9_severity_is_monotonic_in_total() {
        let mut last = Severity::Minimal;
        for total in 0..=27 {
            // Spread the total across items without exceeding the 0..=3 range.
            let mut answers = BTreeMap::new();
            let mut remaining = total;
            for n in 1..=9 {
                let v = remaining.min(3);
                remaining -= v;
                answers.insert(format!("phq9_q{n}"), AnswerValue::Integer(v));
            }
            let outcome = score_phq9(&answers);
            assert!(outcome.severity >= last, "severity regressed at total {total}");
            last = outcome.severity;
        }
        assert_eq!(last, Severity::Severe);
    }

    #[test]
    fn phq9_self_harm_item_raises_crisis_flag() {
        let mut answers = scale_answers("phq9", 9, 0);
        answers.insert("phq9_q9".to_string(), AnswerValue::Integer(1));
        let outcome = score_phq9(&answers);
        assert!(outcome.crisis_flag);
        assert!(outcome.requires_attention);
        assert!(outcome.recommendations[0].contains("988"));
        assert_eq!(outcome.severity, Severity::Minimal);
    }

    #[test]
    fn gad7_bands_match_cut_points() {
        for (value, expected) in [
            (0, Severity::Minimal),
            (1, Severity::Mild),   // 7 items * 1 = 7
            (2, Severity::Moderate), // 14
            (3, Severity::Severe), // 21
        ] {
            let answers = scale_answers("gad7", 7, value);
            assert_eq!(score_gad7(&answers).severity, expected);
        }
    }

    #[test]
    fn dass21_subscale_is_doubled_raw_sum() {
        let questionnaire = dass21();
        let answers: BTreeMap<String, AnswerValue> = questionnaire
            .questions
            .iter()
            .map(|q| {
                let v = if q.subscale == Some(Subscale::Depression) { 1 } else { 0 };
                (q.id.clone(), AnswerValue::Integer(v))
            })
            .collect();
        let outcome = score_dass21(&answers);
        assert_eq!(outcome.depression_score, 14);
        // 14 sits at the bottom of the 14..=20 moderate band.
        assert_eq!(outcome.depression_severity, DassSeverity::Moderate);
        assert_eq!(outcome.anxiety_score, 0);
        assert_eq!(outcome.stress_score, 0);
    }

    #[test]
    fn dass21_score_invariant_under_item_reordering() {
        // BTreeMap iteration order is fixed, so reordering is exercised by
        // inserting in reverse id order and comparing against forward order.
        let questionnaire = dass21();
        let forward: BTreeMap<String, AnswerValue> = questionnaire
            .questions
            .iter()
            .enumerate()
            .map(|(i, q)| (q.id.clone(), AnswerValue::Integer((i % 4) as i64)))
            .collect();
        let mut reversed = BTreeMap::new();
        for (k, v) in forward.iter().rev() {
            reversed.insert(k.clone(), v.clone());
        }
        let a = score_dass21(&forward);
        let b = score_dass21(&reversed);
        assert_eq!(a.depression_score, b.depression_score);
        assert_eq!(a.anxiety_score, b.anxiety_score);
        assert_eq!(a.stress_score, b.stress_score);
    }

    #[test]
    fn thought_record_improvement_percentage() {
        let mut answers = BTreeMap::new();
        answers.insert("tr_emotion_intensity".to_string(), AnswerValue::Integer(80));
        answers.insert("tr_new_emotion_intensity".to_string(), AnswerValue::Integer(40));
        let outcome = score_thought_record(&answers);
        assert_eq!(outcome.improvement, 40);
        assert_eq!(outcome.improvement_percentage, 50);
        assert!(outcome.interpretation.starts_with("Great work"));
    }

    #[test]
    fn thought_record_zero_initial_intensity_is_zero_percent() {
        let mut answers = BTreeMap::new();
        answers.insert("tr_emotion_intensity".to_string(), AnswerValue::Integer(0));
        answers.insert("tr_new_emotion_intensity".to_string(), AnswerValue::Integer(0));
        let outcome = score_thought_record(&answers);
        assert_eq!(outcome.improvement_percentage, 0);
    }

    #[test]
    fn validation_rejects_missing_and_out_of_range_answers() {
        let questionnaire = phq9();
        let mut answers = scale_answers("phq9", 9, 1);
        answers.remove("phq9_q4");
        assert_eq!(
            validate_answers(&questionnaire, &answers),
            Err(ValidationError::MissingAnswer("phq9_q4".to_string()))
        );

        let mut answers = scale_answers("phq9", 9, 1);
        answers.insert("phq9_q4".to_string(), AnswerValue::Integer(7));
        assert!(matches!(
            validate_answers(&questionnaire, &answers),
            Err(ValidationError::InvalidAnswer { .. })
        ));
    }

    #[test]
    fn validation_rejects_slider_off_step() {
        let kind = QuestionKind::Slider { min: 0, max: 100, step: 10 };
        assert!(kind.validate("tr_emotion_intensity", &AnswerValue::Integer(50)).is_ok());
        assert!(kind.validate("tr_emotion_intensity", &AnswerValue::Integer(55)).is_err());
        assert!(kind.validate("tr_emotion_intensity", &AnswerValue::Integer(110)).is_err());
    }

    #[test]
    fn validation_rejects_unknown_multiselect_choice() {
        let questionnaire = thought_record();
        let q = questionnaire.question("tr_emotions").unwrap();
        assert!(q
            .kind
            .validate("tr_emotions", &AnswerValue::Selections(vec!["sad".to_string()]))
            .is_ok());
        assert!(q
            .kind
            .validate("tr_emotions", &AnswerValue::Selections(vec!["elated".to_string()]))
            .is_err());
    }

    #[test]
    fn chatbot_recommendation_routes_by_instrument() {
        let answers = scale_answers("phq9", 9, 2);
        let outcome = ScoreOutcome::Screening(score_phq9(&answers));
        let rec = chatbot_recommendation("phq9", &outcome);
        assert_eq!(rec.chatbot, ChatbotKind::Cbt);

        let answers = scale_answers("gad7", 7, 2);
        let outcome = ScoreOutcome::Screening(score_gad7(&answers));
        let rec = chatbot_recommendation("gad7", &outcome);
        assert_eq!(rec.chatbot, ChatbotKind::Mindfulness);
    }

    #[test]
    fn dass21_recommendation_follows_dominant_subscale() {
        let questionnaire = dass21();
        let answers: BTreeMap<String, AnswerValue> = questionnaire
            .questions
            .iter()
            .map(|q| {
                let v = if q.subscale == Some(Subscale::Anxiety) { 3 } else { 0 };
                (q.id.clone(), AnswerValue::Integer(v))
            })
            .collect();
        let outcome = ScoreOutcome::Dass21(score_dass21(&answers));
        let rec = chatbot_recommendation("dass21", &outcome);
        assert_eq!(rec.chatbot, ChatbotKind::Mindfulness);
    }

    #[test]
    fn full_score_entry_point_validates_first() {
        let answers = BTreeMap::new();
        assert!(score("phq9", &answers).is_err());
        assert!(matches!(
            score("nope", &answers),
            Err(ValidationError::UnknownQuestionnaire(_))
        ));
    }
}
