//! Lookup tables for the numeric identifiers used by the WGER exercise database.

use std::slice::Iter;

pub const UNKNOWN_LABEL: Label = Label {
    name: "Other",
    icon: "🏋️",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    pub name: &'static str,
    pub icon: &'static str,
}

pub trait Property: Clone + Copy + Sized + 'static {
    fn iter() -> Iter<'static, Self>;
    fn id(self) -> u32;
    fn name(self) -> &'static str;

    fn from_id(id: u32) -> Option<Self> {
        Self::iter().find(|p| p.id() == id).copied()
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Side {
    Front,
    Back,
}

#[derive(
    Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum Muscle {
    BicepsBrachii = 1,
    AnteriorDeltoid = 2,
    SerratusAnterior = 3,
    PectoralisMajor = 4,
    TricepsBrachii = 5,
    RectusAbdominis = 6,
    Gastrocnemius = 7,
    GluteusMaximus = 8,
    Trapezius = 9,
    QuadricepsFemoris = 10,
    BicepsFemoris = 11,
    LatissimusDorsi = 12,
    Brachialis = 13,
    ObliquusExternusAbdominis = 14,
    Soleus = 15,
}

impl Property for Muscle {
    fn iter() -> Iter<'static, Muscle> {
        static MUSCLES: [Muscle; 15] = [
            Muscle::BicepsBrachii,
            Muscle::AnteriorDeltoid,
            Muscle::SerratusAnterior,
            Muscle::PectoralisMajor,
            Muscle::TricepsBrachii,
            Muscle::RectusAbdominis,
            Muscle::Gastrocnemius,
            Muscle::GluteusMaximus,
            Muscle::Trapezius,
            Muscle::QuadricepsFemoris,
            Muscle::BicepsFemoris,
            Muscle::LatissimusDorsi,
            Muscle::Brachialis,
            Muscle::ObliquusExternusAbdominis,
            Muscle::Soleus,
        ];
        MUSCLES.iter()
    }

    fn id(self) -> u32 {
        self as u32
    }

    fn name(self) -> &'static str {
        match self {
            Muscle::BicepsBrachii => "Biceps",
            Muscle::AnteriorDeltoid => "Shoulders",
            Muscle::SerratusAnterior => "Serratus",
            Muscle::PectoralisMajor => "Chest",
            Muscle::TricepsBrachii => "Triceps",
            Muscle::RectusAbdominis => "Abs",
            Muscle::Gastrocnemius => "Calves",
            Muscle::GluteusMaximus => "Glutes",
            Muscle::Trapezius => "Traps",
            Muscle::QuadricepsFemoris => "Quads",
            Muscle::BicepsFemoris => "Hamstrings",
            Muscle::LatissimusDorsi => "Lats",
            Muscle::Brachialis => "Brachialis",
            Muscle::ObliquusExternusAbdominis => "Obliques",
            Muscle::Soleus => "Soleus",
        }
    }
}

impl Muscle {
    #[must_use]
    pub fn latin_name(self) -> &'static str {
        match self {
            Muscle::BicepsBrachii => "Biceps brachii",
            Muscle::AnteriorDeltoid => "Anterior deltoid",
            Muscle::SerratusAnterior => "Serratus anterior",
            Muscle::PectoralisMajor => "Pectoralis major",
            Muscle::TricepsBrachii => "Triceps brachii",
            Muscle::RectusAbdominis => "Rectus abdominis",
            Muscle::Gastrocnemius => "Gastrocnemius",
            Muscle::GluteusMaximus => "Gluteus maximus",
            Muscle::Trapezius => "Trapezius",
            Muscle::QuadricepsFemoris => "Quadriceps femoris",
            Muscle::BicepsFemoris => "Biceps femoris",
            Muscle::LatissimusDorsi => "Latissimus dorsi",
            Muscle::Brachialis => "Brachialis",
            Muscle::ObliquusExternusAbdominis => "Obliquus externus abdominis",
            Muscle::Soleus => "Soleus",
        }
    }

    #[must_use]
    pub fn side(self) -> Side {
        match self {
            Muscle::BicepsBrachii
            | Muscle::AnteriorDeltoid
            | Muscle::SerratusAnterior
            | Muscle::PectoralisMajor
            | Muscle::RectusAbdominis
            | Muscle::QuadricepsFemoris
            | Muscle::Brachialis
            | Muscle::ObliquusExternusAbdominis => Side::Front,
            Muscle::TricepsBrachii
            | Muscle::Gastrocnemius
            | Muscle::GluteusMaximus
            | Muscle::Trapezius
            | Muscle::BicepsFemoris
            | Muscle::LatissimusDorsi
            | Muscle::Soleus => Side::Back,
        }
    }

    #[must_use]
    pub fn region(self) -> BodyRegion {
        match self {
            Muscle::BicepsBrachii | Muscle::Brachialis => BodyRegion::Biceps,
            Muscle::AnteriorDeltoid => BodyRegion::Shoulders,
            Muscle::SerratusAnterior => BodyRegion::Serratus,
            Muscle::PectoralisMajor => BodyRegion::Chest,
            Muscle::TricepsBrachii => BodyRegion::Triceps,
            Muscle::RectusAbdominis => BodyRegion::Abs,
            Muscle::ObliquusExternusAbdominis => BodyRegion::Obliques,
            Muscle::Gastrocnemius | Muscle::Soleus => BodyRegion::Calves,
            Muscle::GluteusMaximus => BodyRegion::Glutes,
            Muscle::Trapezius => BodyRegion::Traps,
            Muscle::QuadricepsFemoris => BodyRegion::Quads,
            Muscle::BicepsFemoris => BodyRegion::Hamstrings,
            Muscle::LatissimusDorsi => BodyRegion::Lats,
        }
    }
}

#[derive(
    Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum BodyRegion {
    Chest,
    Shoulders,
    Serratus,
    Biceps,
    Triceps,
    Abs,
    Obliques,
    Traps,
    Lats,
    Glutes,
    Quads,
    Hamstrings,
    Calves,
}

impl BodyRegion {
    pub fn iter() -> Iter<'static, BodyRegion> {
        static REGIONS: [BodyRegion; 13] = [
            BodyRegion::Chest,
            BodyRegion::Shoulders,
            BodyRegion::Serratus,
            BodyRegion::Biceps,
            BodyRegion::Triceps,
            BodyRegion::Abs,
            BodyRegion::Obliques,
            BodyRegion::Traps,
            BodyRegion::Lats,
            BodyRegion::Glutes,
            BodyRegion::Quads,
            BodyRegion::Hamstrings,
            BodyRegion::Calves,
        ];
        REGIONS.iter()
    }

    /// Identifier of the region in the body map.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            BodyRegion::Chest => "chest",
            BodyRegion::Shoulders => "shoulders",
            BodyRegion::Serratus => "serratus",
            BodyRegion::Biceps => "biceps",
            BodyRegion::Triceps => "triceps",
            BodyRegion::Abs => "abs",
            BodyRegion::Obliques => "obliques",
            BodyRegion::Traps => "traps",
            BodyRegion::Lats => "lats",
            BodyRegion::Glutes => "glutes",
            BodyRegion::Quads => "quads",
            BodyRegion::Hamstrings => "hamstrings",
            BodyRegion::Calves => "calves",
        }
    }

    #[must_use]
    pub fn from_slug(slug: &str) -> Option<BodyRegion> {
        BodyRegion::iter().find(|r| r.slug() == slug).copied()
    }
}

#[derive(
    Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum Category {
    Arms = 8,
    Legs = 9,
    Abs = 10,
    Chest = 11,
    Back = 12,
    Shoulders = 13,
    Calves = 14,
    Cardio = 15,
}

impl Property for Category {
    fn iter() -> Iter<'static, Category> {
        static CATEGORIES: [Category; 8] = [
            Category::Arms,
            Category::Legs,
            Category::Abs,
            Category::Chest,
            Category::Back,
            Category::Shoulders,
            Category::Calves,
            Category::Cardio,
        ];
        CATEGORIES.iter()
    }

    fn id(self) -> u32 {
        self as u32
    }

    fn name(self) -> &'static str {
        match self {
            Category::Arms => "Arms",
            Category::Legs => "Legs",
            Category::Abs => "Abs",
            Category::Chest => "Chest",
            Category::Back => "Back",
            Category::Shoulders => "Shoulders",
            Category::Calves => "Calves",
            Category::Cardio => "Cardio",
        }
    }
}

impl Category {
    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Category::Arms => "💪",
            Category::Legs | Category::Calves => "🦵",
            Category::Abs => "🎯",
            Category::Chest => "🫁",
            Category::Back => "🔙",
            Category::Shoulders => "🤷",
            Category::Cardio => "🏃",
        }
    }
}

#[derive(
    Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum Equipment {
    Barbell = 1,
    SZBar = 2,
    Dumbbell = 3,
    GymMat = 4,
    SwissBall = 5,
    PullUpBar = 6,
    Bodyweight = 7,
    Bench = 8,
    InclineBench = 9,
    Kettlebell = 10,
}

impl Property for Equipment {
    fn iter() -> Iter<'static, Equipment> {
        static EQUIPMENT: [Equipment; 10] = [
            Equipment::Barbell,
            Equipment::SZBar,
            Equipment::Dumbbell,
            Equipment::GymMat,
            Equipment::SwissBall,
            Equipment::PullUpBar,
            Equipment::Bodyweight,
            Equipment::Bench,
            Equipment::InclineBench,
            Equipment::Kettlebell,
        ];
        EQUIPMENT.iter()
    }

    fn id(self) -> u32 {
        self as u32
    }

    fn name(self) -> &'static str {
        match self {
            Equipment::Barbell => "Barbell",
            Equipment::SZBar => "SZ-Bar",
            Equipment::Dumbbell => "Dumbbell",
            Equipment::GymMat => "Gym Mat",
            Equipment::SwissBall => "Swiss Ball",
            Equipment::PullUpBar => "Pull-up Bar",
            Equipment::Bodyweight => "Bodyweight",
            Equipment::Bench => "Bench",
            Equipment::InclineBench => "Incline Bench",
            Equipment::Kettlebell => "Kettlebell",
        }
    }
}

impl Equipment {
    #[must_use]
    pub fn icon(self) -> &'static str {
        #[allow(clippy::match_same_arms)]
        match self {
            Equipment::Barbell | Equipment::SZBar => "🏋️",
            Equipment::Dumbbell => "🏋",
            Equipment::GymMat => "🧘",
            Equipment::SwissBall => "⚪",
            Equipment::PullUpBar => "🤸",
            Equipment::Bodyweight => "🧍",
            Equipment::Bench | Equipment::InclineBench => "🪑",
            Equipment::Kettlebell => "🔔",
        }
    }
}

#[must_use]
pub fn muscle_label(id: u32) -> Label {
    Muscle::from_id(id).map_or(UNKNOWN_LABEL, |m| Label {
        name: m.name(),
        icon: Category::from_region(m.region()).icon(),
    })
}

#[must_use]
pub fn category_label(id: u32) -> Label {
    Category::from_id(id).map_or(UNKNOWN_LABEL, |c| Label {
        name: c.name(),
        icon: c.icon(),
    })
}

#[must_use]
pub fn equipment_label(id: u32) -> Label {
    Equipment::from_id(id).map_or(UNKNOWN_LABEL, |e| Label {
        name: e.name(),
        icon: e.icon(),
    })
}

#[must_use]
pub fn region_slug(muscle_id: u32) -> Option<&'static str> {
    Muscle::from_id(muscle_id).map(|m| m.region().slug())
}

impl Category {
    #[must_use]
    pub fn from_region(region: BodyRegion) -> Category {
        match region {
            BodyRegion::Chest | BodyRegion::Serratus => Category::Chest,
            BodyRegion::Shoulders => Category::Shoulders,
            BodyRegion::Biceps | BodyRegion::Triceps => Category::Arms,
            BodyRegion::Abs | BodyRegion::Obliques => Category::Abs,
            BodyRegion::Traps | BodyRegion::Lats => Category::Back,
            BodyRegion::Glutes | BodyRegion::Quads | BodyRegion::Hamstrings => Category::Legs,
            BodyRegion::Calves => Category::Calves,
        }
    }
}
