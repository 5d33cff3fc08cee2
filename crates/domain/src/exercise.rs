use std::{
    collections::BTreeMap,
    ops::{Add, AddAssign, Mul},
};

use derive_more::{Deref, Display};
use log::debug;

use crate::{
    Category, Equipment, ExerciseQuery, Muscle, Name, NameError, Property, ReadError,
    SearchResults, UNKNOWN_LABEL,
};

#[allow(async_fn_in_trait)]
pub trait ExerciseRepository {
    async fn read_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    async fn read_exercise(&self, id: ExerciseID) -> Result<Exercise, ReadError>;
    async fn search_exercises(&self, term: &str) -> Result<Vec<ExerciseID>, ReadError>;
    async fn read_muscles(&self) -> Result<Vec<MuscleInfo>, ReadError>;
}

#[allow(async_fn_in_trait)]
pub trait ExerciseService {
    /// All known exercises. The built-in catalog is used if the exercise database cannot be
    /// reached.
    async fn get_exercises(&self) -> Vec<Exercise>;
    async fn get_exercise(&self, id: ExerciseID) -> Result<Exercise, ReadError>;
    async fn get_muscles(&self) -> Vec<MuscleInfo>;
    async fn search_exercises(&self, query: &ExerciseQuery, limit: usize) -> SearchResults;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub name: Name,
    pub description: String,
    pub category: Option<Category>,
    pub equipment: Vec<Equipment>,
    pub primary_muscles: Vec<Muscle>,
    pub secondary_muscles: Vec<Muscle>,
    pub instructions: Vec<String>,
    pub weighted: bool,
    pub image: Option<String>,
}

impl Exercise {
    #[must_use]
    pub fn body_part(&self) -> &'static str {
        self.category.map_or(UNKNOWN_LABEL.name, Category::name)
    }

    /// The muscle the exercise is primarily aimed at.
    #[must_use]
    pub fn target(&self) -> &'static str {
        self.primary_muscles
            .first()
            .or(self.secondary_muscles.first())
            .map_or_else(|| self.body_part(), |m| m.name())
    }

    #[must_use]
    pub fn equipment_names(&self) -> String {
        if self.equipment.is_empty() {
            return Equipment::Bodyweight.name().to_string();
        }
        self.equipment
            .iter()
            .map(|e| e.name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    #[must_use]
    pub fn muscle_names(&self) -> String {
        self.primary_muscles
            .iter()
            .chain(&self.secondary_muscles)
            .map(|m| m.name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Secondary muscles that are also primary keep the primary stimulus.
    #[must_use]
    pub fn muscle_stimulus(&self) -> BTreeMap<Muscle, Stimulus> {
        let mut result = BTreeMap::new();
        for muscle in &self.secondary_muscles {
            result.insert(*muscle, Stimulus::SECONDARY);
        }
        for muscle in &self.primary_muscles {
            result.insert(*muscle, Stimulus::PRIMARY);
        }
        result
    }
}

#[derive(
    Deref,
    Debug,
    Display,
    Default,
    Clone,
    Copy,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct ExerciseID(u32);

impl From<u32> for ExerciseID {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

#[derive(Deref, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Stimulus(u32);

impl Stimulus {
    pub const PRIMARY: Stimulus = Stimulus(100);
    pub const SECONDARY: Stimulus = Stimulus(50);
    pub const NONE: Stimulus = Stimulus(0);

    pub fn new(value: u32) -> Result<Self, StimulusError> {
        if value > 100 {
            return Err(StimulusError::OutOfRange(value));
        }
        Ok(Self(value))
    }
}

impl Add for Stimulus {
    type Output = Stimulus;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Stimulus {
    fn add_assign(&mut self, rhs: Self) {
        *self = Self(self.0 + rhs.0);
    }
}

impl Mul<u32> for Stimulus {
    type Output = Stimulus;

    fn mul(self, rhs: u32) -> Self::Output {
        Self(self.0 * rhs)
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum StimulusError {
    #[error("Stimulus must be 100 or less ({0} > 100)")]
    OutOfRange(u32),
}

/// Muscle metadata as provided by the exercise database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuscleInfo {
    pub id: u32,
    pub name: String,
    pub name_en: String,
    pub is_front: bool,
}

impl MuscleInfo {
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name_en.trim().is_empty() {
            &self.name
        } else {
            &self.name_en
        }
    }
}

impl From<Muscle> for MuscleInfo {
    fn from(value: Muscle) -> Self {
        Self {
            id: value.id(),
            name: value.latin_name().to_string(),
            name_en: value.name().to_string(),
            is_front: value.side() == crate::Side::Front,
        }
    }
}

pub const ENGLISH: u32 = 2;

/// Raw exercise as delivered by the exercise database, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExerciseRecord {
    pub id: u32,
    pub category: u32,
    pub equipment: Vec<u32>,
    pub muscles: Vec<u32>,
    pub muscles_secondary: Vec<u32>,
    pub translations: Vec<Translation>,
    pub images: Vec<ImageRecord>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Translation {
    pub language: u32,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageRecord {
    pub url: String,
    pub is_main: bool,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum NormalizeError {
    #[error("exercise {0} has no translation")]
    MissingTranslation(u32),
    #[error("exercise {0} has an invalid name: {1}")]
    InvalidName(u32, NameError),
}

impl TryFrom<ExerciseRecord> for Exercise {
    type Error = NormalizeError;

    fn try_from(record: ExerciseRecord) -> Result<Self, Self::Error> {
        let translation = record
            .translations
            .iter()
            .find(|t| t.language == ENGLISH)
            .or(record.translations.first())
            .ok_or(NormalizeError::MissingTranslation(record.id))?;
        let name = Name::new(&translation.name)
            .map_err(|err| NormalizeError::InvalidName(record.id, err))?;
        let instructions = strip_html(&translation.description);
        let equipment = known(record.id, &record.equipment, Equipment::from_id);
        let weighted = is_weighted(&equipment);
        let primary_muscles = known(record.id, &record.muscles, Muscle::from_id);
        let secondary_muscles = known(record.id, &record.muscles_secondary, Muscle::from_id)
            .into_iter()
            .filter(|m| !primary_muscles.contains(m))
            .collect();

        Ok(Exercise {
            id: record.id.into(),
            name,
            description: instructions.first().cloned().unwrap_or_default(),
            category: Category::from_id(record.category),
            equipment,
            primary_muscles,
            secondary_muscles,
            instructions,
            weighted,
            image: record
                .images
                .iter()
                .find(|i| i.is_main)
                .or(record.images.first())
                .map(|i| i.url.clone()),
        })
    }
}

/// Exercises are weighted unless they use no equipment besides the own body weight.
#[must_use]
pub fn is_weighted(equipment: &[Equipment]) -> bool {
    !equipment.iter().all(|e| *e == Equipment::Bodyweight)
}

fn known<T: PartialEq>(exercise_id: u32, ids: &[u32], lookup: impl Fn(u32) -> Option<T>) -> Vec<T> {
    let mut result = Vec::with_capacity(ids.len());
    for id in ids {
        match lookup(*id) {
            Some(value) if !result.contains(&value) => result.push(value),
            Some(_) => {}
            None => debug!("ignoring unknown id {id} in exercise {exercise_id}"),
        }
    }
    result
}

/// Converts an HTML fragment into plain text lines.
///
/// Block-level tags start a new line, all other tags are dropped. A `<` that does not open a tag
/// is kept as text. Common character entities are decoded, unknown ones are kept verbatim, and
/// whitespace is collapsed. Empty lines are removed.
#[must_use]
pub fn strip_html(html: &str) -> Vec<String> {
    let mut text = String::with_capacity(html.len());
    let mut chars = html.chars();

    while let Some(c) = chars.next() {
        match c {
            '<' if starts_tag(chars.as_str()) => {
                let tag = chars
                    .by_ref()
                    .take_while(|c| *c != '>')
                    .collect::<String>();
                if is_block_tag(&tag) {
                    text.push('\n');
                }
            }
            '&' => {
                let mut entity = String::new();
                let mut terminated = false;
                for c in chars.by_ref() {
                    if c == ';' {
                        terminated = true;
                        break;
                    }
                    entity.push(c);
                    if entity.len() > 8 || c.is_whitespace() {
                        break;
                    }
                }
                match decode_entity(&entity).filter(|_| terminated) {
                    Some(decoded) => text.push(decoded),
                    None => {
                        text.push('&');
                        text.push_str(&entity);
                        if terminated {
                            text.push(';');
                        }
                    }
                }
            }
            _ => text.push(c),
        }
    }

    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}

/// A `<` opens a tag only if a tag name or `/` or `!` follows and the tag is closed.
fn starts_tag(rest: &str) -> bool {
    rest.starts_with(|c: char| c.is_ascii_alphabetic() || c == '/' || c == '!')
        && rest.contains('>')
}

fn is_block_tag(tag: &str) -> bool {
    let name = tag
        .trim_start_matches('/')
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or_default()
        .to_lowercase();
    matches!(
        name.as_str(),
        "p" | "br" | "li" | "ul" | "ol" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
    )
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" | "#39" => Some('\''),
        "nbsp" => Some(' '),
        _ => entity
            .strip_prefix('#')
            .and_then(|code| code.parse::<u32>().ok())
            .and_then(char::from_u32),
    }
}

/// Exercises fetched so far, keyed by ID.
///
/// Exercises are immutable once fetched, so an entry is never replaced.
#[derive(Debug, Default)]
pub struct ExerciseCache {
    exercises: BTreeMap<ExerciseID, Exercise>,
    version: u64,
}

impl ExerciseCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the exercise was not cached before.
    pub fn insert(&mut self, exercise: Exercise) -> bool {
        if self.exercises.contains_key(&exercise.id) {
            return false;
        }
        self.exercises.insert(exercise.id, exercise);
        self.version += 1;
        true
    }

    pub fn extend(&mut self, exercises: impl IntoIterator<Item = Exercise>) {
        for exercise in exercises {
            self.insert(exercise);
        }
    }

    /// Removes all exercises for which `keep` returns `false`.
    pub fn retain(&mut self, mut keep: impl FnMut(&Exercise) -> bool) {
        let len = self.exercises.len();
        self.exercises.retain(|_, exercise| keep(exercise));
        if self.exercises.len() != len {
            self.version += 1;
        }
    }

    #[must_use]
    pub fn get(&self, id: ExerciseID) -> Option<&Exercise> {
        self.exercises.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: ExerciseID) -> bool {
        self.exercises.contains_key(&id)
    }

    pub fn values(&self) -> impl Iterator<Item = &Exercise> {
        self.exercises.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Changes whenever an exercise is added or removed.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }
}
