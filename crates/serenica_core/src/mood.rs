//! crates/serenica_core/src/mood.rs
//!
//! Facial-expression mood detection, modeled as an explicit state machine.
//! The camera and the expression classifier live on the client; this module
//! owns everything that is not I/O: lifecycle phases, per-frame backpressure,
//! thresholds, the expression-to-mood mapping, and chatbot suggestions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ChatbotKind;

/// Confidence a classification must reach before it counts as a detection.
pub const DETECTION_THRESHOLD: f32 = 0.3;
/// Confidence a detection must reach before a chatbot suggestion is shown.
pub const SUGGESTION_THRESHOLD: f32 = 0.35;
/// How many samples the in-memory mood history retains.
pub const HISTORY_CAP: usize = 5;

/// The seven expression classes the face model emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    Neutral,
    Happy,
    Sad,
    Angry,
    Fearful,
    Disgusted,
    Surprised,
}

impl Expression {
    pub const ALL: [Expression; 7] = [
        Expression::Neutral,
        Expression::Happy,
        Expression::Sad,
        Expression::Angry,
        Expression::Fearful,
        Expression::Disgusted,
        Expression::Surprised,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Expression::Neutral => "neutral",
            Expression::Happy => "happy",
            Expression::Sad => "sad",
            Expression::Angry => "angry",
            Expression::Fearful => "fearful",
            Expression::Disgusted => "disgusted",
            Expression::Surprised => "surprised",
        }
    }
}

/// Per-expression confidence scores from one classified frame.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ExpressionScores {
    pub neutral: f32,
    pub happy: f32,
    pub sad: f32,
    pub angry: f32,
    pub fearful: f32,
    pub disgusted: f32,
    pub surprised: f32,
}

impl ExpressionScores {
    pub fn get(&self, expression: Expression) -> f32 {
        match expression {
            Expression::Neutral => self.neutral,
            Expression::Happy => self.happy,
            Expression::Sad => self.sad,
            Expression::Angry => self.angry,
            Expression::Fearful => self.fearful,
            Expression::Disgusted => self.disgusted,
            Expression::Surprised => self.surprised,
        }
    }

    /// The arg-max expression and its confidence.
    pub fn dominant(&self) -> (Expression, f32) {
        let mut best = (Expression::Neutral, self.neutral);
        for expression in Expression::ALL {
            let score = self.get(expression);
            if score > best.1 {
                best = (expression, score);
            }
        }
        best
    }
}

/// The four coarse moods an expression collapses to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodBucket {
    Happy,
    Sad,
    Angry,
    Neutral,
}

impl MoodBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoodBucket::Happy => "happy",
            MoodBucket::Sad => "sad",
            MoodBucket::Angry => "angry",
            MoodBucket::Neutral => "neutral",
        }
    }
}

/// Fixed lookup from a raw expression to its coarse mood bucket.
pub fn bucket(expression: Expression) -> MoodBucket {
    match expression {
        Expression::Happy | Expression::Surprised => MoodBucket::Happy,
        Expression::Sad | Expression::Fearful => MoodBucket::Sad,
        Expression::Angry | Expression::Disgusted => MoodBucket::Angry,
        Expression::Neutral => MoodBucket::Neutral,
    }
}

/// A chatbot suggestion keyed on the raw detected expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodSuggestion {
    pub chatbot: ChatbotKind,
    pub message: String,
}

/// The suggestion to surface for a detection, or `None` when confidence
/// is below the suggestion threshold.
pub fn suggestion_for(expression: Expression, confidence: f32) -> Option<MoodSuggestion> {
    if confidence < SUGGESTION_THRESHOLD {
        return None;
    }
    let (chatbot, message) = match expression {
        Expression::Sad => (
            ChatbotKind::Cbt,
            "I notice you seem sad. Our Cognitive Behavior Therapy chatbot can help you process these feelings.",
        ),
        Expression::Angry => (
            ChatbotKind::Mindfulness,
            "You appear to be feeling angry. Our Mindfulness chatbot can help you find calm and balance.",
        ),
        Expression::Disgusted => (
            ChatbotKind::CareerCoach,
            "You seem to be feeling uneasy. Our Career Coach can help you focus on positive aspects and goals.",
        ),
        Expression::Fearful => (
            ChatbotKind::Cbt,
            "I notice you might be feeling anxious. Our CBT chatbot can help you manage these feelings.",
        ),
        Expression::Neutral => (
            ChatbotKind::CareerCoach,
            "You seem calm. Would you like to explore personal growth with our Career Coach?",
        ),
        Expression::Surprised => (
            ChatbotKind::Mindfulness,
            "You seem surprised. Our Mindfulness chatbot can help you process and understand this feeling.",
        ),
        Expression::Happy => (
            ChatbotKind::CareerCoach,
            "Great to see you in good spirits! Maintain this positive energy with our Career Coach.",
        ),
    };
    Some(MoodSuggestion { chatbot, message: message.to_string() })
}

/// One recorded detection. Samples live only in memory and are discarded
/// on reset; they are never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodSample {
    pub mood: MoodBucket,
    pub expression: Expression,
    pub confidence: f32,
    pub at: DateTime<Utc>,
}

/// Detector lifecycle phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorPhase {
    Idle,
    AwaitingCamera,
    LoadingModel,
    Detecting,
    /// A detection crossed the threshold; the loop stays stopped until reset.
    Halted,
    CameraDenied,
    /// The client reported no WebGL support; detection cannot run at all.
    Unsupported,
}

/// The outcome of feeding one frame's classification into the detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FrameOutcome {
    /// A previous frame is still being processed; this one was discarded.
    Dropped,
    /// The detector is not in the detecting phase.
    Inactive,
    /// No face was found in the frame.
    NoFace,
    /// A face was found but the dominant expression was below threshold.
    BelowThreshold { expression: Expression, confidence: f32 },
    /// A detection crossed the threshold; the detector is now halted.
    Detected {
        mood: MoodBucket,
        expression: Expression,
        confidence: f32,
        suggestion: Option<MoodSuggestion>,
    },
}

/// Mood detection state machine. One instance per user session.
#[derive(Debug, Clone)]
pub struct MoodDetector {
    phase: DetectorPhase,
    frame_in_flight: bool,
    current_mood: Option<MoodBucket>,
    history: Vec<MoodSample>,
}

impl Default for MoodDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl MoodDetector {
    pub fn new() -> Self {
        Self {
            phase: DetectorPhase::Idle,
            frame_in_flight: false,
            current_mood: None,
            history: Vec::new(),
        }
    }

    pub fn phase(&self) -> DetectorPhase {
        self.phase
    }

    pub fn current_mood(&self) -> Option<MoodBucket> {
        self.current_mood
    }

    pub fn history(&self) -> &[MoodSample] {
        &self.history
    }

    /// Begins the camera permission request. A no-op from `Unsupported`.
    pub fn start(&mut self) {
        if self.phase == DetectorPhase::Idle {
            self.phase = DetectorPhase::AwaitingCamera;
        }
    }

    pub fn camera_granted(&mut self) {
        if self.phase == DetectorPhase::AwaitingCamera {
            self.phase = DetectorPhase::LoadingModel;
        }
    }

    pub fn camera_denied(&mut self) {
        if self.phase == DetectorPhase::AwaitingCamera {
            self.phase = DetectorPhase::CameraDenied;
        }
    }

    pub fn models_loaded(&mut self) {
        if self.phase == DetectorPhase::LoadingModel {
            self.phase = DetectorPhase::Detecting;
        }
    }

    /// Marks the client as unable to run detection at all. Terminal until
    /// reset.
    pub fn mark_unsupported(&mut self) {
        self.phase = DetectorPhase::Unsupported;
    }

    /// Claims the frame slot. Returns false if a previous frame is still
    /// outstanding or the detector is not detecting; such frames are
    /// dropped, never queued.
    pub fn try_begin_frame(&mut self) -> bool {
        if self.phase != DetectorPhase::Detecting || self.frame_in_flight {
            return false;
        }
        self.frame_in_flight = true;
        true
    }

    /// Releases the frame slot and applies the classification result.
    pub fn complete_frame(
        &mut self,
        scores: Option<ExpressionScores>,
        at: DateTime<Utc>,
    ) -> FrameOutcome {
        self.frame_in_flight = false;
        if self.phase != DetectorPhase::Detecting {
            return FrameOutcome::Inactive;
        }
        let Some(scores) = scores else {
            return FrameOutcome::NoFace;
        };
        let (expression, confidence) = scores.dominant();
        if confidence <= DETECTION_THRESHOLD {
            return FrameOutcome::BelowThreshold { expression, confidence };
        }

        let mood = bucket(expression);
        self.current_mood = Some(mood);
        self.history.push(MoodSample { mood, expression, confidence, at });
        if self.history.len() > HISTORY_CAP {
            let excess = self.history.len() - HISTORY_CAP;
            self.history.drain(..excess);
        }

        // First threshold-crossing detection halts the loop; the camera is
        // released and nothing runs again until reset.
        self.phase = DetectorPhase::Halted;
        FrameOutcome::Detected {
            mood,
            expression,
            confidence,
            suggestion: suggestion_for(expression, confidence),
        }
    }

    /// Feeds one frame through the claim/complete cycle in a single call.
    pub fn observe(
        &mut self,
        scores: Option<ExpressionScores>,
        at: DateTime<Utc>,
    ) -> FrameOutcome {
        if !self.try_begin_frame() {
            return if self.frame_in_flight {
                FrameOutcome::Dropped
            } else {
                FrameOutcome::Inactive
            };
        }
        self.complete_frame(scores, at)
    }

    /// Returns to `Idle` and clears the mood history, as when the user
    /// revisits the host page.
    pub fn reset(&mut self) {
        self.phase = DetectorPhase::Idle;
        self.frame_in_flight = false;
        self.current_mood = None;
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(expression: Expression, confidence: f32) -> ExpressionScores {
        let mut s = ExpressionScores::default();
        match expression {
            Expression::Neutral => s.neutral = confidence,
            Expression::Happy => s.happy = confidence,
            Expression::Sad => s.sad = confidence,
            Expression::Angry => s.angry = confidence,
            Expression::Fearful => s.fearful = confidence,
            Expression::Disgusted => s.disgusted = confidence,
            Expression::Surprised => s.surprised = confidence,
        }
        s
    }

    fn detecting() -> MoodDetector {
        let mut detector = MoodDetector::new();
        detector.start();
        detector.camera_granted();
        detector.models_loaded();
        assert_eq!(detector.phase(), DetectorPhase::Detecting);
        detector
    }

    #[test]
    fn lifecycle_reaches_detecting_through_expected_phases() {
        let mut detector = MoodDetector::new();
        assert_eq!(detector.phase(), DetectorPhase::Idle);
        detector.start();
        assert_eq!(detector.phase(), DetectorPhase::AwaitingCamera);
        detector.camera_granted();
        assert_eq!(detector.phase(), DetectorPhase::LoadingModel);
        detector.models_loaded();
        assert_eq!(detector.phase(), DetectorPhase::Detecting);
    }

    #[test]
    fn camera_denial_is_terminal_until_reset() {
        let mut detector = MoodDetector::new();
        detector.start();
        detector.camera_denied();
        assert_eq!(detector.phase(), DetectorPhase::CameraDenied);
        detector.camera_granted();
        assert_eq!(detector.phase(), DetectorPhase::CameraDenied);
        detector.reset();
        assert_eq!(detector.phase(), DetectorPhase::Idle);
    }

    #[test]
    fn first_detection_halts_the_loop() {
        let mut detector = detecting();
        let outcome = detector.observe(Some(scores(Expression::Sad, 0.8)), Utc::now());
        match outcome {
            FrameOutcome::Detected { mood, suggestion, .. } => {
                assert_eq!(mood, MoodBucket::Sad);
                assert_eq!(suggestion.unwrap().chatbot, ChatbotKind::Cbt);
            }
            other => panic!("expected detection, got {other:?}"),
        }
        assert_eq!(detector.phase(), DetectorPhase::Halted);
        assert_eq!(detector.current_mood(), Some(MoodBucket::Sad));
    }

    #[test]
    fn halted_detector_rejects_further_frames() {
        let mut detector = detecting();
        detector.observe(Some(scores(Expression::Happy, 0.9)), Utc::now());
        let outcome = detector.observe(Some(scores(Expression::Angry, 0.9)), Utc::now());
        assert!(matches!(outcome, FrameOutcome::Inactive));
        assert_eq!(detector.current_mood(), Some(MoodBucket::Happy));
    }

    #[test]
    fn in_flight_frame_drops_the_next_one() {
        let mut detector = detecting();
        assert!(detector.try_begin_frame());
        let outcome = detector.observe(Some(scores(Expression::Happy, 0.9)), Utc::now());
        assert!(matches!(outcome, FrameOutcome::Dropped));
        // Completing the outstanding frame frees the slot again.
        detector.complete_frame(None, Utc::now());
        assert!(detector.try_begin_frame());
    }

    #[test]
    fn below_threshold_keeps_detecting() {
        let mut detector = detecting();
        let outcome = detector.observe(Some(scores(Expression::Sad, 0.25)), Utc::now());
        assert!(matches!(outcome, FrameOutcome::BelowThreshold { .. }));
        assert_eq!(detector.phase(), DetectorPhase::Detecting);
        assert!(detector.history().is_empty());
    }

    #[test]
    fn no_face_keeps_detecting() {
        let mut detector = detecting();
        let outcome = detector.observe(None, Utc::now());
        assert!(matches!(outcome, FrameOutcome::NoFace));
        assert_eq!(detector.phase(), DetectorPhase::Detecting);
    }

    #[test]
    fn history_is_capped_at_five_samples() {
        let mut detector = detecting();
        for i in 0..8 {
            detector.observe(Some(scores(Expression::Happy, 0.9)), Utc::now());
            assert!(detector.history().len() <= HISTORY_CAP, "iteration {i}");
            detector.phase = DetectorPhase::Detecting;
        }
        assert_eq!(detector.history().len(), HISTORY_CAP);
    }

    #[test]
    fn bucket_mapping_matches_fixed_table() {
        assert_eq!(bucket(Expression::Happy), MoodBucket::Happy);
        assert_eq!(bucket(Expression::Surprised), MoodBucket::Happy);
        assert_eq!(bucket(Expression::Sad), MoodBucket::Sad);
        assert_eq!(bucket(Expression::Fearful), MoodBucket::Sad);
        assert_eq!(bucket(Expression::Angry), MoodBucket::Angry);
        assert_eq!(bucket(Expression::Disgusted), MoodBucket::Angry);
        assert_eq!(bucket(Expression::Neutral), MoodBucket::Neutral);
    }

    #[test]
    fn suggestion_requires_higher_confidence_than_detection() {
        // 0.32 crosses the detection threshold but not the suggestion one.
        let mut detector = detecting();
        let outcome = detector.observe(Some(scores(Expression::Sad, 0.32)), Utc::now());
        match outcome {
            FrameOutcome::Detected { suggestion, .. } => assert!(suggestion.is_none()),
            other => panic!("expected detection, got {other:?}"),
        }
    }

    #[test]
    fn dominant_expression_is_arg_max() {
        let scores = ExpressionScores {
            neutral: 0.1,
            happy: 0.2,
            sad: 0.6,
            angry: 0.05,
            fearful: 0.02,
            disgusted: 0.01,
            surprised: 0.02,
        };
        let (expression, confidence) = scores.dominant();
        assert_eq!(expression, Expression::Sad);
        assert!((confidence - 0.6).abs() < f32::EPSILON);
    }

    #[test]
    fn reset_clears_mood_and_history() {
        let mut detector = detecting();
        detector.observe(Some(scores(Expression::Angry, 0.9)), Utc::now());
        detector.reset();
        assert_eq!(detector.phase(), DetectorPhase::Idle);
        assert!(detector.current_mood().is_none());
        assert!(detector.history().is_empty());
    }
}
