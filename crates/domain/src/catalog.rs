//! Exercises that are available when the exercise database cannot be reached.

use crate::{Category, Equipment, Exercise, Muscle, Name, is_weighted};

/// IDs of built-in exercises start here to avoid collisions with exercise database IDs.
pub const FIRST_ID: u32 = 900_000;

struct BuiltIn {
    name: &'static str,
    category: Category,
    equipment: &'static [Equipment],
    primary: &'static [Muscle],
    secondary: &'static [Muscle],
    instructions: &'static [&'static str],
}

const EXERCISES: &[BuiltIn] = &[
    BuiltIn {
        name: "Bench Press",
        category: Category::Chest,
        equipment: &[Equipment::Barbell, Equipment::Bench],
        primary: &[Muscle::PectoralisMajor],
        secondary: &[Muscle::AnteriorDeltoid, Muscle::TricepsBrachii],
        instructions: &[
            "Lie on the bench with the eyes under the bar.",
            "Lower the bar to the middle of the chest.",
            "Press the bar up until the arms are straight.",
        ],
    },
    BuiltIn {
        name: "Squat",
        category: Category::Legs,
        equipment: &[Equipment::Barbell],
        primary: &[Muscle::QuadricepsFemoris, Muscle::GluteusMaximus],
        secondary: &[Muscle::BicepsFemoris, Muscle::Soleus],
        instructions: &[
            "Rest the bar on the upper back.",
            "Sit down between the heels until the thighs are parallel to the floor.",
            "Stand up while keeping the chest up.",
        ],
    },
    BuiltIn {
        name: "Deadlift",
        category: Category::Back,
        equipment: &[Equipment::Barbell],
        primary: &[Muscle::GluteusMaximus, Muscle::BicepsFemoris],
        secondary: &[Muscle::Trapezius, Muscle::QuadricepsFemoris],
        instructions: &[
            "Stand with the mid-foot under the bar.",
            "Grip the bar and straighten the back.",
            "Pull the bar up along the legs until standing upright.",
        ],
    },
    BuiltIn {
        name: "Overhead Press",
        category: Category::Shoulders,
        equipment: &[Equipment::Barbell],
        primary: &[Muscle::AnteriorDeltoid],
        secondary: &[Muscle::TricepsBrachii, Muscle::Trapezius],
        instructions: &[
            "Hold the bar in front of the shoulders.",
            "Press the bar over the head until the arms are locked out.",
        ],
    },
    BuiltIn {
        name: "Pull Up",
        category: Category::Back,
        equipment: &[Equipment::PullUpBar],
        primary: &[Muscle::LatissimusDorsi],
        secondary: &[Muscle::BicepsBrachii, Muscle::Brachialis],
        instructions: &[
            "Hang from the bar with an overhand grip.",
            "Pull up until the chin is over the bar.",
        ],
    },
    BuiltIn {
        name: "Push Up",
        category: Category::Chest,
        equipment: &[Equipment::Bodyweight],
        primary: &[Muscle::PectoralisMajor],
        secondary: &[Muscle::TricepsBrachii, Muscle::AnteriorDeltoid],
        instructions: &[
            "Support the body on hands and toes.",
            "Lower the chest to the floor and push back up.",
        ],
    },
    BuiltIn {
        name: "Dumbbell Curl",
        category: Category::Arms,
        equipment: &[Equipment::Dumbbell],
        primary: &[Muscle::BicepsBrachii],
        secondary: &[Muscle::Brachialis],
        instructions: &[
            "Hold the dumbbells with the palms facing forward.",
            "Curl the weights up while keeping the elbows still.",
        ],
    },
    BuiltIn {
        name: "Triceps Dip",
        category: Category::Arms,
        equipment: &[Equipment::Bodyweight],
        primary: &[Muscle::TricepsBrachii],
        secondary: &[Muscle::PectoralisMajor, Muscle::AnteriorDeltoid],
        instructions: &[
            "Support the body on the edge of the bench.",
            "Bend the elbows until the upper arms are parallel to the floor and push back up.",
        ],
    },
    BuiltIn {
        name: "Crunch",
        category: Category::Abs,
        equipment: &[Equipment::GymMat],
        primary: &[Muscle::RectusAbdominis],
        secondary: &[Muscle::ObliquusExternusAbdominis],
        instructions: &[
            "Lie on the back with the knees bent.",
            "Curl the shoulders towards the hips.",
        ],
    },
    BuiltIn {
        name: "Standing Calf Raise",
        category: Category::Calves,
        equipment: &[Equipment::Dumbbell],
        primary: &[Muscle::Gastrocnemius],
        secondary: &[Muscle::Soleus],
        instructions: &[
            "Stand on the balls of the feet.",
            "Raise the heels as high as possible and lower them slowly.",
        ],
    },
];

#[must_use]
pub fn fallback_exercises() -> Vec<Exercise> {
    (FIRST_ID..)
        .zip(EXERCISES)
        .filter_map(|(id, e)| {
            Some(Exercise {
                id: id.into(),
                name: Name::new(e.name).ok()?,
                description: e
                    .instructions
                    .first()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                category: Some(e.category),
                equipment: e.equipment.to_vec(),
                primary_muscles: e.primary.to_vec(),
                secondary_muscles: e.secondary.to_vec(),
                instructions: e.instructions.iter().map(ToString::to_string).collect(),
                weighted: is_weighted(e.equipment),
                image: None,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_fallback_exercises() {
        let exercises = fallback_exercises();

        assert_eq!(exercises.len(), EXERCISES.len());
        assert_eq!(
            exercises.iter().map(|e| e.id).collect::<HashSet<_>>().len(),
            exercises.len()
        );
        assert_eq!(
            exercises.iter().map(|e| &e.name).collect::<HashSet<_>>().len(),
            exercises.len()
        );

        for exercise in &exercises {
            assert!(*exercise.id >= FIRST_ID);
            assert!(!exercise.primary_muscles.is_empty());
            assert!(!exercise.instructions.is_empty());
            for muscle in &exercise.secondary_muscles {
                assert!(!exercise.primary_muscles.contains(muscle));
            }
        }
    }

    #[test]
    fn test_fallback_exercises_weighted() {
        let exercises = fallback_exercises();

        let push_up = exercises.iter().find(|e| e.name.as_ref() == "Push Up").unwrap();
        let squat = exercises.iter().find(|e| e.name.as_ref() == "Squat").unwrap();
        let dip = exercises.iter().find(|e| e.name.as_ref() == "Triceps Dip").unwrap();

        assert!(!push_up.weighted);
        assert!(squat.weighted);
        assert!(!dip.weighted);
    }
}
