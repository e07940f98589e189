//! crates/serenica_core/src/neurobic.rs
//!
//! Neurobic brain-training exercises: the exercise catalog, content
//! generators for the interactive exercises, and scoring. Generators take a
//! caller-supplied `Rng` so the web layer can use a thread rng while tests
//! use a seeded one.

use chrono::{Datelike, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

//=========================================================================================
// Catalog
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseCategory {
    Memory,
    Attention,
    ProblemSolving,
    Creativity,
    Sensory,
}

impl ExerciseCategory {
    pub const ALL: [ExerciseCategory; 5] = [
        ExerciseCategory::Memory,
        ExerciseCategory::Attention,
        ExerciseCategory::ProblemSolving,
        ExerciseCategory::Creativity,
        ExerciseCategory::Sensory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseCategory::Memory => "memory",
            ExerciseCategory::Attention => "attention",
            ExerciseCategory::ProblemSolving => "problem_solving",
            ExerciseCategory::Creativity => "creativity",
            ExerciseCategory::Sensory => "sensory",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "memory" => Some(ExerciseCategory::Memory),
            "attention" => Some(ExerciseCategory::Attention),
            "problem_solving" => Some(ExerciseCategory::ProblemSolving),
            "creativity" => Some(ExerciseCategory::Creativity),
            "sensory" => Some(ExerciseCategory::Sensory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "beginner" => Some(Difficulty::Beginner),
            "intermediate" => Some(Difficulty::Intermediate),
            "advanced" => Some(Difficulty::Advanced),
            _ => None,
        }
    }
}

/// How the client renders an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    Interactive,
    Game,
    Quiz,
    Guided,
}

/// Per-exercise tuning parameters, varying by exercise shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExerciseSettings {
    Sequence {
        initial_length: u32,
        max_length: u32,
        display_time_ms: u32,
        progression_rate: u32,
    },
    Pairs {
        grid_size: u32,
        card_types: u32,
        time_limit_seconds: u32,
    },
    Timed {
        rounds: u32,
        time_per_round_ms: u32,
    },
    Search {
        item_count: u32,
        target_count: u32,
        time_limit_seconds: u32,
    },
    Grid {
        grid_size: u32,
        items_to_remember: u32,
        display_time_ms: u32,
    },
    Vigilance {
        duration_seconds: u32,
        event_frequency_seconds: u32,
    },
    Quiz {
        question_count: u32,
    },
    Tower {
        disk_count: u32,
        show_optimal_moves: bool,
    },
    OpenEnded {
        time_limit_seconds: u32,
        minimum_responses: u32,
    },
    Breathing {
        breath_cycles: u32,
        inhale_seconds: u32,
        hold_seconds: u32,
        exhale_seconds: u32,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct Exercise {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub category: ExerciseCategory,
    pub difficulty: Difficulty,
    pub duration_minutes: u32,
    pub instructions: &'static str,
    pub benefits: &'static [&'static str],
    pub kind: ExerciseKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<ExerciseSettings>,
}

/// The complete exercise library.
pub fn catalog() -> Vec<Exercise> {
    use Difficulty::*;
    use ExerciseCategory::*;
    use ExerciseKind::*;
    vec![
        Exercise {
            id: "memory_sequence",
            title: "Number Sequence Memory",
            description: "Remember and recall sequences of numbers to enhance short-term memory",
            category: Memory,
            difficulty: Beginner,
            duration_minutes: 3,
            instructions: "You will see a sequence of numbers for a few seconds. Memorize them and type them back in the correct order.",
            benefits: &["Improves working memory", "Enhances concentration", "Boosts attention span"],
            kind: Interactive,
            settings: Some(ExerciseSettings::Sequence {
                initial_length: 4,
                max_length: 10,
                display_time_ms: 3000,
                progression_rate: 1,
            }),
        },
        Exercise {
            id: "memory_pairs",
            title: "Memory Pairs",
            description: "Match pairs of cards to improve visual memory and pattern recognition",
            category: Memory,
            difficulty: Beginner,
            duration_minutes: 5,
            instructions: "Click on cards to reveal them. Find all matching pairs. Try to complete in minimum moves.",
            benefits: &["Strengthens visual memory", "Improves pattern recognition", "Enhances focus"],
            kind: Game,
            settings: Some(ExerciseSettings::Pairs {
                grid_size: 4,
                card_types: 8,
                time_limit_seconds: 180,
            }),
        },
        Exercise {
            id: "story_recall",
            title: "Story Recall",
            description: "Read a short story and answer questions to test comprehension and memory",
            category: Memory,
            difficulty: Intermediate,
            duration_minutes: 8,
            instructions: "Read the story carefully. Then answer questions about it without looking back.",
            benefits: &["Improves verbal memory", "Enhances comprehension", "Boosts retention"],
            kind: Quiz,
            settings: None,
        },
        Exercise {
            id: "spatial_memory",
            title: "Spatial Memory Grid",
            description: "Remember positions of objects on a grid to enhance spatial memory",
            category: Memory,
            difficulty: Intermediate,
            duration_minutes: 5,
            instructions: "Observe the positions of highlighted squares. Then click on the same squares from memory.",
            benefits: &["Develops spatial memory", "Improves visual processing", "Enhances attention to detail"],
            kind: Interactive,
            settings: Some(ExerciseSettings::Grid {
                grid_size: 5,
                items_to_remember: 5,
                display_time_ms: 4000,
            }),
        },
        Exercise {
            id: "stroop_test",
            title: "Color-Word Challenge",
            description: "Test your attention control by identifying colors while ignoring word meanings",
            category: Attention,
            difficulty: Intermediate,
            duration_minutes: 4,
            instructions: "Select the COLOR of the word shown, not what the word says. Be quick and accurate!",
            benefits: &["Improves selective attention", "Enhances cognitive flexibility", "Boosts processing speed"],
            kind: Game,
            settings: Some(ExerciseSettings::Timed { rounds: 20, time_per_round_ms: 3000 }),
        },
        Exercise {
            id: "visual_search",
            title: "Visual Search Task",
            description: "Find specific items among distractors to improve visual attention",
            category: Attention,
            difficulty: Beginner,
            duration_minutes: 5,
            instructions: "Find all instances of the target item as quickly as possible.",
            benefits: &["Sharpens visual attention", "Improves scanning ability", "Enhances focus"],
            kind: Interactive,
            settings: Some(ExerciseSettings::Search {
                item_count: 50,
                target_count: 5,
                time_limit_seconds: 60,
            }),
        },
        Exercise {
            id: "divided_attention",
            title: "Dual Task Challenge",
            description: "Perform two tasks simultaneously to enhance divided attention",
            category: Attention,
            difficulty: Advanced,
            duration_minutes: 6,
            instructions: "Listen to numbers and sort shapes simultaneously. Respond to both tasks correctly.",
            benefits: &["Improves multitasking", "Enhances cognitive control", "Boosts mental flexibility"],
            kind: Interactive,
            settings: None,
        },
        Exercise {
            id: "sustained_attention",
            title: "Vigilance Test",
            description: "Maintain focus over time by detecting rare events",
            category: Attention,
            difficulty: Intermediate,
            duration_minutes: 7,
            instructions: "Watch for a specific pattern among many similar items. Stay alert!",
            benefits: &["Builds sustained attention", "Improves concentration endurance", "Enhances vigilance"],
            kind: Game,
            settings: Some(ExerciseSettings::Vigilance {
                duration_seconds: 420,
                event_frequency_seconds: 15,
            }),
        },
        Exercise {
            id: "pattern_completion",
            title: "Pattern Completion",
            description: "Complete visual patterns to enhance logical reasoning",
            category: ProblemSolving,
            difficulty: Intermediate,
            duration_minutes: 6,
            instructions: "Study the pattern and select the missing piece that completes it logically.",
            benefits: &["Enhances logical reasoning", "Improves pattern recognition", "Boosts abstract thinking"],
            kind: Quiz,
            settings: Some(ExerciseSettings::Quiz { question_count: 10 }),
        },
        Exercise {
            id: "riddle_solver",
            title: "Logic Riddles",
            description: "Solve riddles and brain teasers to stimulate creative problem-solving",
            category: ProblemSolving,
            difficulty: Beginner,
            duration_minutes: 5,
            instructions: "Read each riddle carefully and think creatively to find the solution.",
            benefits: &["Stimulates creative thinking", "Improves lateral thinking", "Enhances problem-solving"],
            kind: Quiz,
            settings: None,
        },
        Exercise {
            id: "number_puzzles",
            title: "Mathematical Reasoning",
            description: "Solve number sequences and mathematical puzzles",
            category: ProblemSolving,
            difficulty: Intermediate,
            duration_minutes: 8,
            instructions: "Find the pattern in number sequences and solve mathematical challenges.",
            benefits: &["Sharpens mathematical thinking", "Improves logical reasoning", "Enhances analytical skills"],
            kind: Quiz,
            settings: Some(ExerciseSettings::Quiz { question_count: 12 }),
        },
        Exercise {
            id: "tower_puzzle",
            title: "Tower of Hanoi",
            description: "Move disks between pegs following specific rules to solve the puzzle",
            category: ProblemSolving,
            difficulty: Advanced,
            duration_minutes: 10,
            instructions: "Move all disks to the target peg. Only smaller disks can go on larger ones.",
            benefits: &["Develops strategic thinking", "Enhances planning skills", "Improves problem-solving"],
            kind: Game,
            settings: Some(ExerciseSettings::Tower { disk_count: 4, show_optimal_moves: true }),
        },
        Exercise {
            id: "word_association",
            title: "Creative Word Association",
            description: "Generate creative associations between seemingly unrelated words",
            category: Creativity,
            difficulty: Beginner,
            duration_minutes: 5,
            instructions: "Think of creative connections between given words. The more unique, the better!",
            benefits: &["Boosts creative thinking", "Enhances divergent thinking", "Improves mental flexibility"],
            kind: Interactive,
            settings: None,
        },
        Exercise {
            id: "drawing_prompt",
            title: "Visual Creativity Challenge",
            description: "Complete drawings from simple prompts to stimulate visual creativity",
            category: Creativity,
            difficulty: Beginner,
            duration_minutes: 7,
            instructions: "You'll see a simple shape. Turn it into a creative drawing. Let your imagination flow!",
            benefits: &["Stimulates visual creativity", "Enhances imagination", "Improves artistic expression"],
            kind: Interactive,
            settings: None,
        },
        Exercise {
            id: "alternative_uses",
            title: "Alternative Uses Test",
            description: "Think of creative uses for common objects",
            category: Creativity,
            difficulty: Intermediate,
            duration_minutes: 5,
            instructions: "List as many creative and unusual uses as you can for the given object.",
            benefits: &["Enhances creative thinking", "Improves flexibility", "Boosts innovation"],
            kind: Interactive,
            settings: Some(ExerciseSettings::OpenEnded {
                time_limit_seconds: 120,
                minimum_responses: 5,
            }),
        },
        Exercise {
            id: "story_builder",
            title: "Collaborative Story Building",
            description: "Create stories from random word prompts to enhance narrative creativity",
            category: Creativity,
            difficulty: Intermediate,
            duration_minutes: 10,
            instructions: "Create a coherent story using all the given words. Be creative and imaginative!",
            benefits: &["Develops narrative skills", "Enhances creative writing", "Improves verbal fluency"],
            kind: Interactive,
            settings: None,
        },
        Exercise {
            id: "color_distinction",
            title: "Color Discrimination",
            description: "Identify subtle differences in colors to enhance visual perception",
            category: Sensory,
            difficulty: Beginner,
            duration_minutes: 4,
            instructions: "Find the square that is slightly different in color from the others.",
            benefits: &["Sharpens visual perception", "Improves color discrimination", "Enhances attention to detail"],
            kind: Game,
            settings: Some(ExerciseSettings::Timed { rounds: 15, time_per_round_ms: 0 }),
        },
        Exercise {
            id: "rhythm_pattern",
            title: "Rhythm Reproduction",
            description: "Listen to and reproduce rhythmic patterns to enhance auditory processing",
            category: Sensory,
            difficulty: Intermediate,
            duration_minutes: 6,
            instructions: "Listen carefully to the rhythm pattern, then reproduce it by tapping.",
            benefits: &["Improves auditory processing", "Enhances rhythmic perception", "Boosts timing skills"],
            kind: Interactive,
            settings: Some(ExerciseSettings::Sequence {
                initial_length: 6,
                max_length: 6,
                display_time_ms: 0,
                progression_rate: 0,
            }),
        },
        Exercise {
            id: "sensory_integration",
            title: "Multi-Sensory Matching",
            description: "Match information across different senses to improve sensory integration",
            category: Sensory,
            difficulty: Advanced,
            duration_minutes: 8,
            instructions: "Match visual, auditory, and tactile descriptions to the correct object.",
            benefits: &["Enhances sensory integration", "Improves cross-modal processing", "Boosts cognitive flexibility"],
            kind: Interactive,
            settings: None,
        },
        Exercise {
            id: "mindfulness_breathing",
            title: "Mindful Breathing Exercise",
            description: "Focus on your breath to enhance body awareness and reduce stress",
            category: Sensory,
            difficulty: Beginner,
            duration_minutes: 5,
            instructions: "Follow the guided breathing pattern. Focus on the sensation of breathing.",
            benefits: &["Reduces stress", "Improves focus", "Enhances body awareness", "Promotes relaxation"],
            kind: Guided,
            settings: Some(ExerciseSettings::Breathing {
                breath_cycles: 10,
                inhale_seconds: 4,
                hold_seconds: 4,
                exhale_seconds: 6,
            }),
        },
    ]
}

pub fn by_id(id: &str) -> Option<Exercise> {
    catalog().into_iter().find(|e| e.id == id)
}

pub fn by_category(category: ExerciseCategory) -> Vec<Exercise> {
    catalog().into_iter().filter(|e| e.category == category).collect()
}

pub fn by_difficulty(difficulty: Difficulty) -> Vec<Exercise> {
    catalog().into_iter().filter(|e| e.difficulty == difficulty).collect()
}

/// Exercises that fit within the time the user has available.
pub fn by_max_duration(max_minutes: u32) -> Vec<Exercise> {
    catalog().into_iter().filter(|e| e.duration_minutes <= max_minutes).collect()
}

/// The exercise of the day, rotating through the catalog by day of year.
/// Every user sees the same daily exercise on a given date.
pub fn daily_exercise(today: NaiveDate) -> Exercise {
    let exercises = catalog();
    let index = (today.ordinal() as usize) % exercises.len();
    exercises[index].clone()
}

//=========================================================================================
// Content generators
//=========================================================================================

/// Digits to memorize for the number sequence exercise.
pub fn generate_number_sequence(rng: &mut impl Rng, length: u32) -> Vec<u8> {
    (0..length).map(|_| rng.gen_range(0..10)).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryCard {
    pub id: u32,
    pub symbol: String,
}

/// A shuffled deck of `card_types` matching pairs.
pub fn generate_memory_pairs(rng: &mut impl Rng, card_types: u32) -> Vec<MemoryCard> {
    const SYMBOLS: [&str; 16] = [
        "🌟", "🎨", "🎭", "🎪", "🎯", "🎲", "🎸", "🎹", "🎺", "🎻", "🎮", "🧩", "🌈", "🌺",
        "🌻", "🌸",
    ];
    let card_types = (card_types as usize).min(SYMBOLS.len());
    let mut deck: Vec<&str> = SYMBOLS[..card_types]
        .iter()
        .flat_map(|s| [*s, *s])
        .collect();
    deck.shuffle(rng);
    deck.into_iter()
        .enumerate()
        .map(|(id, symbol)| MemoryCard { id: id as u32, symbol: symbol.to_string() })
        .collect()
}

/// Distinct cell indices to highlight on a `grid_size` x `grid_size` grid.
pub fn generate_spatial_pattern(rng: &mut impl Rng, grid_size: u32, items: u32) -> Vec<u32> {
    let cells = grid_size * grid_size;
    let items = items.min(cells);
    let mut positions = Vec::with_capacity(items as usize);
    while (positions.len() as u32) < items {
        let pos = rng.gen_range(0..cells);
        if !positions.contains(&pos) {
            positions.push(pos);
        }
    }
    positions
}

pub const STROOP_COLORS: [&str; 6] = ["red", "blue", "green", "yellow", "purple", "orange"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StroopItem {
    pub word: String,
    pub color: String,
    pub is_congruent: bool,
}

/// A color word rendered in an independently chosen ink color.
pub fn generate_stroop_item(rng: &mut impl Rng) -> StroopItem {
    let word = STROOP_COLORS[rng.gen_range(0..STROOP_COLORS.len())];
    let color = STROOP_COLORS[rng.gen_range(0..STROOP_COLORS.len())];
    StroopItem {
        word: word.to_string(),
        color: color.to_string(),
        is_congruent: word == color,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchCellKind {
    Target,
    Distractor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCell {
    pub id: u32,
    pub kind: SearchCellKind,
    pub symbol: String,
}

/// A shuffled visual-search grid of `target_count` targets among distractors.
pub fn generate_visual_search_grid(
    rng: &mut impl Rng,
    item_count: u32,
    target_count: u32,
) -> Vec<SearchCell> {
    const DISTRACTORS: [&str; 5] = ["○", "□", "△", "◇", "☆"];
    const TARGET: &str = "●";
    let target_count = target_count.min(item_count);
    let mut grid: Vec<SearchCell> = (0..target_count)
        .map(|id| SearchCell {
            id,
            kind: SearchCellKind::Target,
            symbol: TARGET.to_string(),
        })
        .collect();
    for id in target_count..item_count {
        let symbol = DISTRACTORS[rng.gen_range(0..DISTRACTORS.len())];
        grid.push(SearchCell {
            id,
            kind: SearchCellKind::Distractor,
            symbol: symbol.to_string(),
        });
    }
    grid.shuffle(rng);
    grid
}

#[derive(Debug, Clone, Serialize)]
pub struct StoryPrompts {
    pub nouns: Vec<&'static str>,
    pub adjectives: Vec<&'static str>,
    pub verbs: Vec<&'static str>,
}

/// Three random words from each part of speech for the story builder.
pub fn generate_story_prompts(rng: &mut impl Rng) -> StoryPrompts {
    const NOUNS: [&str; 10] = [
        "castle", "robot", "ocean", "forest", "dragon", "scientist", "astronaut", "wizard",
        "mountain", "city",
    ];
    const ADJECTIVES: [&str; 10] = [
        "mysterious", "ancient", "glowing", "invisible", "tiny", "giant", "magical", "frozen",
        "golden", "hidden",
    ];
    const VERBS: [&str; 10] = [
        "discovered", "transformed", "vanished", "created", "protected", "explored", "awakened",
        "shattered", "united", "escaped",
    ];
    fn pick(rng: &mut impl Rng, pool: &[&'static str]) -> Vec<&'static str> {
        (0..3).map(|_| pool[rng.gen_range(0..pool.len())]).collect()
    }
    StoryPrompts {
        nouns: pick(rng, &NOUNS),
        adjectives: pick(rng, &ADJECTIVES),
        verbs: pick(rng, &VERBS),
    }
}

/// A tap/rest beat pattern for the rhythm exercise. The first beat is
/// always a tap so the pattern has an audible anchor.
pub fn generate_rhythm_pattern(rng: &mut impl Rng, length: u32) -> Vec<bool> {
    let mut beats: Vec<bool> = (0..length).map(|_| rng.gen_bool(0.6)).collect();
    if let Some(first) = beats.first_mut() {
        *first = true;
    }
    beats
}

//=========================================================================================
// Static puzzle banks
//=========================================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PatternPuzzle {
    pub pattern: &'static [i64],
    pub answer: i64,
    pub options: &'static [i64],
    pub explanation: &'static str,
}

pub fn pattern_puzzles() -> Vec<PatternPuzzle> {
    vec![
        PatternPuzzle {
            pattern: &[1, 2, 4, 7, 11],
            answer: 16,
            options: &[14, 15, 16, 17],
            explanation: "Add increasing numbers: +1, +2, +3, +4, +5",
        },
        PatternPuzzle {
            pattern: &[2, 4, 8, 16],
            answer: 32,
            options: &[24, 28, 32, 36],
            explanation: "Each number is multiplied by 2",
        },
        PatternPuzzle {
            pattern: &[1, 1, 2, 3, 5, 8],
            answer: 13,
            options: &[11, 12, 13, 14],
            explanation: "Fibonacci sequence: each number is the sum of the previous two",
        },
        PatternPuzzle {
            pattern: &[100, 95, 85, 70, 50],
            answer: 25,
            options: &[20, 25, 30, 35],
            explanation: "Subtract increasing values: -5, -10, -15, -20, -25",
        },
        PatternPuzzle {
            pattern: &[3, 9, 27, 81],
            answer: 243,
            options: &[162, 216, 243, 324],
            explanation: "Each number is multiplied by 3",
        },
    ]
}

#[derive(Debug, Clone, Serialize)]
pub struct LogicRiddle {
    pub question: &'static str,
    pub answer: &'static str,
    pub hints: &'static [&'static str],
    pub category: &'static str,
}

pub fn logic_riddles() -> Vec<LogicRiddle> {
    vec![
        LogicRiddle {
            question: "I speak without a mouth and hear without ears. I have no body, but I come alive with wind. What am I?",
            answer: "echo",
            hints: &["Think about sound", "It needs empty space", "Caves and mountains have this"],
            category: "nature",
        },
        LogicRiddle {
            question: "The more you take, the more you leave behind. What am I?",
            answer: "footsteps",
            hints: &["Think about walking", "It's something physical", "You can see them in sand"],
            category: "physical",
        },
        LogicRiddle {
            question: "What has keys but no locks, space but no room, and you can enter but can't go inside?",
            answer: "keyboard",
            hints: &[
                "It's something you use daily",
                "Related to technology",
                "You're probably using one now",
            ],
            category: "technology",
        },
        LogicRiddle {
            question: "I am not alive, but I grow; I don't have lungs, but I need air; I don't have a mouth, but water kills me. What am I?",
            answer: "fire",
            hints: &["Think about elements", "It's hot", "Used for cooking and warmth"],
            category: "nature",
        },
        LogicRiddle {
            question: "What comes once in a minute, twice in a moment, but never in a thousand years?",
            answer: "m",
            hints: &["Think about the words themselves", "It's not about time", "Look at the letters"],
            category: "wordplay",
        },
    ]
}

#[derive(Debug, Clone, Serialize)]
pub struct AlternativeUsesObject {
    pub object: &'static str,
    pub common_uses: &'static [&'static str],
    pub example_creative_uses: &'static [&'static str],
}

pub fn alternative_uses_objects() -> Vec<AlternativeUsesObject> {
    vec![
        AlternativeUsesObject {
            object: "paperclip",
            common_uses: &["Hold papers together", "Bookmark"],
            example_creative_uses: &[
                "Make jewelry",
                "Unlock simple locks",
                "Create sculptures",
                "Use as a zipper pull",
            ],
        },
        AlternativeUsesObject {
            object: "brick",
            common_uses: &["Building material", "Doorstop"],
            example_creative_uses: &["Paperweight", "Garden edging", "Art canvas", "Exercise weight"],
        },
        AlternativeUsesObject {
            object: "rubber band",
            common_uses: &["Bundle items", "Hair tie"],
            example_creative_uses: &[
                "Make a ball",
                "Create grip on jars",
                "Mini slingshot",
                "Mark book pages",
            ],
        },
        AlternativeUsesObject {
            object: "newspaper",
            common_uses: &["Read news", "Wrap items"],
            example_creative_uses: &[
                "Plant pots",
                "Insulation",
                "Papier-mâché",
                "Clean windows",
                "Compost material",
            ],
        },
        AlternativeUsesObject {
            object: "shoe",
            common_uses: &["Wear on feet", "Protection"],
            example_creative_uses: &[
                "Plant holder",
                "Door stop",
                "Hammer substitute",
                "Art piece",
                "Dog toy",
            ],
        },
    ]
}

//=========================================================================================
// Scoring
//=========================================================================================

/// Raw metrics a client reports after finishing a round. Which fields are
/// meaningful depends on the exercise; absent fields score as zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Performance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pairs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moves: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_time_ms: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseScore {
    pub score: u8,
    pub feedback: String,
}

fn ratio_score(correct: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    ((correct as f64 / total as f64) * 100.0).round().min(100.0) as u8
}

/// Maps a round's raw metrics to a 0..=100 score with a feedback line.
pub fn calculate_score(exercise_id: &str, performance: &Performance) -> ExerciseScore {
    let correct = performance.correct.unwrap_or(0);
    let total = performance.total.unwrap_or(0);
    match exercise_id {
        "memory_pairs" => {
            let pairs = performance.pairs.unwrap_or(0);
            let moves = performance.moves.unwrap_or(0);
            let score = if moves == 0 {
                0
            } else {
                let efficiency = (pairs as f64 / moves as f64) * 100.0;
                ((efficiency * 1.5).round() as u32).min(100) as u8
            };
            let feedback = if score >= 80 {
                "Outstanding!"
            } else if score >= 60 {
                "Well done!"
            } else {
                "Try to remember card positions!"
            };
            ExerciseScore { score, feedback: feedback.to_string() }
        }
        "stroop_test" => {
            let accuracy = if total == 0 {
                0.0
            } else {
                (correct as f64 / total as f64) * 100.0
            };
            let speed_bonus = match performance.avg_time_ms {
                Some(t) if t < 2000 => 10.0,
                _ => 0.0,
            };
            let score = ((accuracy + speed_bonus).round() as u32).min(100) as u8;
            let feedback = if score >= 90 {
                "Lightning fast!"
            } else if score >= 70 {
                "Great focus!"
            } else {
                "Take your time to be accurate!"
            };
            ExerciseScore { score, feedback: feedback.to_string() }
        }
        "memory_sequence" => {
            let score = ratio_score(correct, total);
            let feedback = if score >= 80 {
                "Excellent memory!"
            } else if score >= 60 {
                "Good effort!"
            } else {
                "Keep practicing!"
            };
            ExerciseScore { score, feedback: feedback.to_string() }
        }
        _ => {
            let score = ratio_score(correct, total);
            let feedback = if score >= 80 {
                "Excellent!"
            } else if score >= 60 {
                "Good job!"
            } else {
                "Keep practicing!"
            };
            ExerciseScore { score, feedback: feedback.to_string() }
        }
    }
}

//=========================================================================================
// Progress heuristics
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyChange {
    Increase,
    Decrease,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultySuggestion {
    pub change: DifficultyChange,
    pub message: String,
}

/// Looks at the last three scores for an exercise and suggests moving up
/// or down a difficulty level. Fewer than three sessions is not enough
/// signal to adjust.
pub fn suggest_difficulty(recent_scores: &[u8]) -> Option<DifficultySuggestion> {
    if recent_scores.len() < 3 {
        return None;
    }
    let last_three = &recent_scores[recent_scores.len() - 3..];
    let avg = last_three.iter().map(|s| *s as f64).sum::<f64>() / 3.0;
    if avg >= 90.0 {
        Some(DifficultySuggestion {
            change: DifficultyChange::Increase,
            message: "You're doing great! Try a harder level for more challenge.".to_string(),
        })
    } else if avg < 50.0 {
        Some(DifficultySuggestion {
            change: DifficultyChange::Decrease,
            message: "Let's try an easier level to build your confidence.".to_string(),
        })
    } else {
        None
    }
}

/// Average score across a user's completed rounds in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAverage {
    pub category: ExerciseCategory,
    pub average: f64,
    pub sessions: usize,
}

/// Per-category score averages over a user's history. Categories with no
/// completed rounds are omitted.
pub fn category_averages(progress: &[ProgressEntry]) -> Vec<CategoryAverage> {
    let category_of = |exercise_id: &str| by_id(exercise_id).map(|e| e.category);
    let mut averages = Vec::new();
    for category in ExerciseCategory::ALL {
        let scores: Vec<f64> = progress
            .iter()
            .filter(|p| category_of(&p.exercise_id) == Some(category))
            .map(|p| p.score as f64)
            .collect();
        if scores.is_empty() {
            continue;
        }
        averages.push(CategoryAverage {
            category,
            average: scores.iter().sum::<f64>() / scores.len() as f64,
            sessions: scores.len(),
        });
    }
    averages
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationReason {
    Improvement,
    Variety,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub reason: RecommendationReason,
    pub category: ExerciseCategory,
    pub exercises: Vec<Exercise>,
    pub message: String,
}

/// A completed round, as seen by the recommendation heuristics.
#[derive(Debug, Clone)]
pub struct ProgressEntry {
    pub exercise_id: String,
    pub score: u8,
}

/// Recommends exercises from the user's weakest category (average below 70)
/// and, when fewer than three categories have been tried, from an
/// unexplored one.
pub fn personalized_recommendations(progress: &[ProgressEntry]) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    let category_of = |exercise_id: &str| by_id(exercise_id).map(|e| e.category);

    let weakest = category_averages(progress)
        .into_iter()
        .min_by(|a, b| a.average.total_cmp(&b.average));
    if let Some(CategoryAverage { category, average, .. }) = weakest {
        if average < 70.0 {
            let exercises: Vec<Exercise> = by_category(category)
                .into_iter()
                .filter(|e| e.difficulty == Difficulty::Beginner)
                .take(2)
                .collect();
            recommendations.push(Recommendation {
                reason: RecommendationReason::Improvement,
                category,
                exercises,
                message: format!(
                    "Focus on {} exercises to improve this cognitive area.",
                    category.as_str()
                ),
            });
        }
    }

    let exercised: std::collections::HashSet<ExerciseCategory> = progress
        .iter()
        .filter_map(|p| category_of(&p.exercise_id))
        .collect();
    if exercised.len() < 3 {
        if let Some(category) = ExerciseCategory::ALL
            .into_iter()
            .find(|c| !exercised.contains(c))
        {
            recommendations.push(Recommendation {
                reason: RecommendationReason::Variety,
                category,
                exercises: by_category(category).into_iter().take(2).collect(),
                message: "Try exercises from different categories for balanced cognitive development."
                    .to_string(),
            });
        }
    }

    recommendations
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn catalog_covers_all_categories() {
        let exercises = catalog();
        assert_eq!(exercises.len(), 20);
        for category in ExerciseCategory::ALL {
            assert_eq!(
                exercises.iter().filter(|e| e.category == category).count(),
                4,
                "category {:?}",
                category
            );
        }
        let mut ids: Vec<&str> = exercises.iter().map(|e| e.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 20, "exercise ids must be unique");
    }

    #[test]
    fn daily_exercise_is_stable_per_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let a = daily_exercise(date);
        let b = daily_exercise(date);
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn number_sequence_has_requested_length_and_digit_range() {
        let seq = generate_number_sequence(&mut rng(), 10);
        assert_eq!(seq.len(), 10);
        assert!(seq.iter().all(|d| *d < 10));
    }

    #[test]
    fn memory_pairs_deck_contains_each_symbol_twice() {
        let deck = generate_memory_pairs(&mut rng(), 8);
        assert_eq!(deck.len(), 16);
        let mut counts = std::collections::HashMap::new();
        for card in &deck {
            *counts.entry(card.symbol.clone()).or_insert(0u32) += 1;
        }
        assert_eq!(counts.len(), 8);
        assert!(counts.values().all(|c| *c == 2));
    }

    #[test]
    fn spatial_pattern_positions_are_distinct_and_in_bounds() {
        let positions = generate_spatial_pattern(&mut rng(), 5, 5);
        assert_eq!(positions.len(), 5);
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 5);
        assert!(positions.iter().all(|p| *p < 25));
    }

    #[test]
    fn stroop_congruence_matches_word_and_color() {
        let mut r = rng();
        for _ in 0..50 {
            let item = generate_stroop_item(&mut r);
            assert_eq!(item.is_congruent, item.word == item.color);
        }
    }

    #[test]
    fn visual_search_grid_has_exact_target_count() {
        let grid = generate_visual_search_grid(&mut rng(), 50, 5);
        assert_eq!(grid.len(), 50);
        let targets = grid
            .iter()
            .filter(|c| c.kind == SearchCellKind::Target)
            .count();
        assert_eq!(targets, 5);
        assert!(grid
            .iter()
            .filter(|c| c.kind == SearchCellKind::Target)
            .all(|c| c.symbol == "●"));
    }

    #[test]
    fn pairs_score_is_capped_at_100() {
        // A perfect game: 8 pairs in 8 moves gives 100 * 1.5, capped.
        let performance = Performance {
            pairs: Some(8),
            moves: Some(8),
            ..Default::default()
        };
        let result = calculate_score("memory_pairs", &performance);
        assert_eq!(result.score, 100);
        assert_eq!(result.feedback, "Outstanding!");
    }

    #[test]
    fn pairs_score_with_zero_moves_is_zero() {
        let result = calculate_score("memory_pairs", &Performance::default());
        assert_eq!(result.score, 0);
    }

    #[test]
    fn stroop_speed_bonus_applies_under_two_seconds() {
        let fast = Performance {
            correct: Some(18),
            total: Some(20),
            avg_time_ms: Some(1500),
            ..Default::default()
        };
        let slow = Performance {
            correct: Some(18),
            total: Some(20),
            avg_time_ms: Some(2500),
            ..Default::default()
        };
        assert_eq!(calculate_score("stroop_test", &fast).score, 100);
        assert_eq!(calculate_score("stroop_test", &slow).score, 90);
    }

    #[test]
    fn default_scoring_is_percent_correct() {
        let performance = Performance {
            correct: Some(7),
            total: Some(10),
            ..Default::default()
        };
        let result = calculate_score("riddle_solver", &performance);
        assert_eq!(result.score, 70);
        assert_eq!(result.feedback, "Good job!");
    }

    #[test]
    fn difficulty_suggestion_needs_three_sessions() {
        assert!(suggest_difficulty(&[95, 95]).is_none());
        let up = suggest_difficulty(&[95, 92, 90]).unwrap();
        assert_eq!(up.change, DifficultyChange::Increase);
        let down = suggest_difficulty(&[40, 45, 50]).unwrap();
        assert_eq!(down.change, DifficultyChange::Decrease);
        assert!(suggest_difficulty(&[70, 75, 80]).is_none());
    }

    #[test]
    fn difficulty_suggestion_uses_only_last_three() {
        // Early low scores must not drag the average down.
        let suggestion = suggest_difficulty(&[10, 10, 95, 95, 95]).unwrap();
        assert_eq!(suggestion.change, DifficultyChange::Increase);
    }

    #[test]
    fn recommendations_flag_weak_category() {
        let progress = vec![
            ProgressEntry { exercise_id: "memory_sequence".to_string(), score: 40 },
            ProgressEntry { exercise_id: "memory_pairs".to_string(), score: 50 },
            ProgressEntry { exercise_id: "stroop_test".to_string(), score: 95 },
            ProgressEntry { exercise_id: "riddle_solver".to_string(), score: 90 },
        ];
        let recs = personalized_recommendations(&progress);
        let improvement = recs
            .iter()
            .find(|r| r.reason == RecommendationReason::Improvement)
            .unwrap();
        assert_eq!(improvement.category, ExerciseCategory::Memory);
        assert!(improvement
            .exercises
            .iter()
            .all(|e| e.difficulty == Difficulty::Beginner));
    }

    #[test]
    fn recommendations_suggest_variety_for_narrow_practice() {
        let progress = vec![ProgressEntry {
            exercise_id: "memory_sequence".to_string(),
            score: 85,
        }];
        let recs = personalized_recommendations(&progress);
        let variety = recs
            .iter()
            .find(|r| r.reason == RecommendationReason::Variety)
            .unwrap();
        assert_ne!(variety.category, ExerciseCategory::Memory);
        assert!(!variety.exercises.is_empty());
    }

    #[test]
    fn category_averages_cover_exercised_categories_only() {
        let progress = vec![
            ProgressEntry { exercise_id: "memory_sequence".to_string(), score: 40 },
            ProgressEntry { exercise_id: "memory_pairs".to_string(), score: 60 },
            ProgressEntry { exercise_id: "stroop_test".to_string(), score: 90 },
        ];
        let averages = category_averages(&progress);
        assert_eq!(averages.len(), 2);
        let memory = averages
            .iter()
            .find(|a| a.category == ExerciseCategory::Memory)
            .unwrap();
        assert_eq!(memory.sessions, 2);
        assert!((memory.average - 50.0).abs() < f64::EPSILON);
        let attention = averages
            .iter()
            .find(|a| a.category == ExerciseCategory::Attention)
            .unwrap();
        assert_eq!(attention.sessions, 1);
        assert!((attention.average - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rhythm_pattern_has_requested_length_and_anchor_tap() {
        let mut rng = StdRng::seed_from_u64(7);
        let beats = generate_rhythm_pattern(&mut rng, 6);
        assert_eq!(beats.len(), 6);
        assert!(beats[0]);
    }

    #[test]
    fn catalog_and_round_payloads_serialize() {
        let mut rng = StdRng::seed_from_u64(7);
        let prompts = serde_json::to_value(generate_story_prompts(&mut rng)).unwrap();
        assert_eq!(prompts["nouns"].as_array().unwrap().len(), 3);

        let progress = vec![ProgressEntry {
            exercise_id: "memory_pairs".to_string(),
            score: 40,
        }];
        let recs = serde_json::to_value(personalized_recommendations(&progress)).unwrap();
        let first = &recs.as_array().unwrap()[0];
        assert!(first["exercises"].as_array().is_some());
    }
}
