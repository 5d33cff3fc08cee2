use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};

use crate::{Category, Exercise, ExerciseCache, ExerciseID};

pub const DEFAULT_LIMIT: usize = 15;
pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::milliseconds(300);

/// Queries shorter than this are matched by substring only.
pub const FUZZY_MIN_QUERY_LEN: usize = 3;

/// Minimum match quality of at least one field for an exercise to be included.
pub const THRESHOLD: f32 = 0.55;

/// Word similarity below this value does not count as a match.
const MIN_WORD_SIMILARITY: f32 = 0.5;

const MIN_PREFIX_LEN: usize = 2;
const PREFIX_FACTOR: f32 = 0.9;

const EXACT_NAME_BOOST: f32 = 1.0;
const PREFIX_NAME_BOOST: f32 = 0.5;
const SUBSTRING_NAME_BOOST: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Description,
    Instructions,
    Muscles,
    Equipment,
    BodyPart,
}

impl Field {
    const ALL: [Field; 6] = [
        Field::Name,
        Field::Description,
        Field::Instructions,
        Field::Muscles,
        Field::Equipment,
        Field::BodyPart,
    ];

    fn weight(self) -> f32 {
        match self {
            Field::Name => 1.0,
            Field::Description => 0.7,
            Field::Instructions => 0.5,
            Field::Muscles => 0.4,
            Field::Equipment => 0.3,
            Field::BodyPart => 0.2,
        }
    }

    // Subsequence matching on long prose matches almost anything.
    fn subsequence(self) -> bool {
        !matches!(self, Field::Description | Field::Instructions)
    }

    fn text(self, exercise: &Exercise) -> String {
        match self {
            Field::Name => exercise.name.to_string(),
            Field::Description => exercise.description.clone(),
            Field::Instructions => exercise.instructions.join(" "),
            Field::Muscles => exercise.muscle_names(),
            Field::Equipment => exercise.equipment_names(),
            Field::BodyPart => exercise.body_part().to_string(),
        }
        .to_lowercase()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExerciseQuery {
    pub text: String,
    pub muscle_group: Option<Category>,
}

impl ExerciseQuery {
    #[must_use]
    pub fn new(text: &str, muscle_group: Option<Category>) -> Self {
        Self {
            text: text.to_string(),
            muscle_group,
        }
    }

    fn normalized_text(&self) -> String {
        self.text.trim().to_lowercase()
    }

    fn accepts(&self, exercise: &Exercise) -> bool {
        self.muscle_group
            .is_none_or(|group| exercise.category == Some(group))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub exercises: Vec<Exercise>,
    pub total: usize,
}

impl SearchResults {
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.total > self.exercises.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

struct CachedSearch {
    query: ExerciseQuery,
    cache_version: u64,
    ranking: Vec<ExerciseID>,
}

/// Ranks exercises of an [`ExerciseCache`] against a query.
///
/// The complete ranking of the most recent query is kept and reused as long as neither the
/// query nor the cached exercises change.
pub struct SearchEngine {
    matcher: SkimMatcherV2,
    last: Option<CachedSearch>,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            matcher: SkimMatcherV2::default().ignore_case(),
            last: None,
        }
    }

    pub fn search(
        &mut self,
        query: &ExerciseQuery,
        exercises: &ExerciseCache,
        limit: usize,
    ) -> SearchResults {
        let outdated = !matches!(
            &self.last,
            Some(last) if last.query == *query && last.cache_version == exercises.version()
        );

        if outdated {
            self.last = Some(CachedSearch {
                query: query.clone(),
                cache_version: exercises.version(),
                ranking: self.rank(query, exercises),
            });
        }

        let ranking = self
            .last
            .as_ref()
            .map(|last| last.ranking.as_slice())
            .unwrap_or_default();

        SearchResults {
            exercises: ranking
                .iter()
                .take(limit)
                .filter_map(|id| exercises.get(*id).cloned())
                .collect(),
            total: ranking.len(),
        }
    }

    fn rank(&self, query: &ExerciseQuery, exercises: &ExerciseCache) -> Vec<ExerciseID> {
        let text = query.normalized_text();
        let candidates = exercises.values().filter(|e| query.accepts(e));

        if text.chars().count() < FUZZY_MIN_QUERY_LEN {
            let mut matches = candidates
                .filter(|e| text.is_empty() || matches_substring(e, &text))
                .map(|e| (!e.name.as_ref().to_lowercase().starts_with(&text), e))
                .collect::<Vec<_>>();
            matches.sort_by(|(a_later, a), (b_later, b)| {
                a_later.cmp(b_later).then_with(|| a.name.cmp(&b.name))
            });
            return matches.into_iter().map(|(_, e)| e.id).collect();
        }

        let mut matches = candidates
            .filter_map(|e| self.score(e, &text).map(|score| (score, e)))
            .collect::<Vec<_>>();
        matches.sort_by(|(a_score, a), (b_score, b)| {
            b_score
                .partial_cmp(a_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });
        matches.into_iter().map(|(_, e)| e.id).collect()
    }

    /// Weighted relevance, or `None` if no field matches well enough.
    fn score(&self, exercise: &Exercise, query: &str) -> Option<f32> {
        let (quality, relevance) = Field::ALL
            .iter()
            .map(|field| {
                let text = field.text(exercise);
                let mut score = word_score(&text, query);
                if field.subsequence() {
                    score = score.max(self.subsequence_score(&text, query));
                }
                (score, field.weight() * score)
            })
            .fold((0.0, 0.0), |(q, r), (score, weighted)| {
                (f32::max(q, score), f32::max(r, weighted))
            });

        if quality < THRESHOLD {
            return None;
        }

        let name = exercise.name.as_ref().to_lowercase();
        Some(
            relevance
                + if name == query {
                    EXACT_NAME_BOOST
                } else if name.starts_with(query) {
                    PREFIX_NAME_BOOST
                } else if name.contains(query) {
                    SUBSTRING_NAME_BOOST
                } else {
                    0.0
                },
        )
    }

    /// Skim score relative to the score of a perfect match.
    #[allow(clippy::cast_precision_loss)]
    fn subsequence_score(&self, text: &str, query: &str) -> f32 {
        let Some(perfect) = self.matcher.fuzzy_match(query, query) else {
            return 0.0;
        };
        if perfect <= 0 {
            return 0.0;
        }
        self.matcher
            .fuzzy_match(text, query)
            .map_or(0.0, |score| (score as f32 / perfect as f32).clamp(0.0, 1.0))
    }
}

fn matches_substring(exercise: &Exercise, text: &str) -> bool {
    exercise.name.as_ref().to_lowercase().contains(text)
        || exercise.target().to_lowercase().contains(text)
        || exercise.equipment_names().to_lowercase().contains(text)
}

/// Mean over all query words of the best similarity to a word of the text.
fn word_score(text: &str, query: &str) -> f32 {
    let words = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>();
    let query_words = query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>();

    if words.is_empty() || query_words.is_empty() {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let len = query_words.len() as f32;
    query_words
        .iter()
        .map(|q| {
            words
                .iter()
                .map(|w| word_similarity(q, w))
                .fold(0.0, f32::max)
        })
        .sum::<f32>()
        / len
}

/// Similarity of two words in [0, 1] based on the edit distance.
///
/// A query word may also be the beginning of a longer word, so that partially typed words are
/// found.
#[allow(clippy::cast_precision_loss)]
fn word_similarity(query: &str, word: &str) -> f32 {
    let q = query.chars().collect::<Vec<_>>();
    let w = word.chars().collect::<Vec<_>>();

    let full = 1.0 - edit_distance(&q, &w) as f32 / q.len().max(w.len()) as f32;
    let prefix = if q.len() >= MIN_PREFIX_LEN && w.len() > q.len() && w.starts_with(&q) {
        PREFIX_FACTOR
    } else {
        0.0
    };

    let similarity = full.max(prefix);
    if similarity < MIN_WORD_SIMILARITY {
        0.0
    } else {
        similarity
    }
}

fn edit_distance(a: &[char], b: &[char]) -> usize {
    let mut previous = (0..=b.len()).collect::<Vec<_>>();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Delays a search until the input has been stable for a fixed time.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    pending: Option<(String, DateTime<Utc>)>,
    generation: u64,
}

impl Default for Debounce {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_DELAY)
    }
}

impl Debounce {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            generation: 0,
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replaces any pending input and returns the generation of the new input.
    pub fn schedule(&mut self, input: &str, now: DateTime<Utc>) -> u64 {
        self.generation += 1;
        self.pending = Some((input.to_string(), now + self.delay));
        self.generation
    }

    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        self.pending.is_some() && self.generation == generation
    }

    /// Takes the pending input if its delay has passed.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Option<String> {
        match &self.pending {
            Some((_, due)) if *due <= now => self.pending.take().map(|(input, _)| input),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
