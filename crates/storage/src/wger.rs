//! WGER
//!
//! Read-only access to the public WGER exercise database. Records are deserialized into wire types
//! first and normalized into domain exercises afterwards.

use anyhow::anyhow;
use gloo_net::http::{Request, Response};
use liftlog_domain as domain;
use log::warn;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

pub const BASE_URL: &str = "https://wger.de/api/v2";
pub const PAGE_SIZE: usize = 100;
/// Upper bound for the number of pages read when listing exercises.
pub const MAX_PAGES: usize = 20;

#[allow(async_fn_in_trait)]
pub trait SendRequest {
    async fn send_request(&self, request: Request) -> Result<Response, gloo_net::Error>;
}

#[derive(Clone, Default)]
pub struct GlooNetSendRequest;

impl SendRequest for GlooNetSendRequest {
    async fn send_request(&self, request: Request) -> Result<Response, gloo_net::Error> {
        request.send().await
    }
}

#[derive(Clone)]
pub struct Wger<S: SendRequest> {
    pub sender: S,
    pub base_url: String,
}

impl Wger<GlooNetSendRequest> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sender: GlooNetSendRequest,
            base_url: BASE_URL.to_string(),
        }
    }
}

impl Default for Wger<GlooNetSendRequest> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SendRequest> domain::ExerciseRepository for Wger<S> {
    async fn read_exercises(&self) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        let mut exercises = vec![];
        let mut offset = 0;
        for _ in 0..MAX_PAGES {
            let page: Page<serde_json::Value> = self
                .fetch(
                    "exerciseinfo/",
                    &[
                        ("limit", PAGE_SIZE.to_string()),
                        ("offset", offset.to_string()),
                    ],
                )
                .await?;
            let received = page.results.len();
            exercises.extend(page.results.into_iter().filter_map(normalize));
            offset += received;
            if page.next.is_none() || received == 0 {
                break;
            }
        }
        Ok(exercises)
    }

    async fn read_exercise(
        &self,
        id: domain::ExerciseID,
    ) -> Result<domain::Exercise, domain::ReadError> {
        let mut info: ExerciseInfo = self.fetch(&format!("exerciseinfo/{id}/"), &[]).await?;
        if info.images.is_empty() {
            info.images = self.read_exercise_images(id).await.unwrap_or_default();
        }
        domain::Exercise::try_from(domain::ExerciseRecord::from(info))
            .map_err(|err| other(anyhow!("invalid exercise: {err}")))
    }

    async fn search_exercises(
        &self,
        term: &str,
    ) -> Result<Vec<domain::ExerciseID>, domain::ReadError> {
        let result: SearchResponse = self
            .fetch(
                "exercise/search/",
                &[("term", term.to_string()), ("language", "en".to_string())],
            )
            .await?;
        let mut ids = vec![];
        for suggestion in result.suggestions {
            let id =
                domain::ExerciseID::from(suggestion.data.base_id.unwrap_or(suggestion.data.id));
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    async fn read_muscles(&self) -> Result<Vec<domain::MuscleInfo>, domain::ReadError> {
        let page: Page<MuscleRecord> = self
            .fetch("muscle/", &[("limit", PAGE_SIZE.to_string())])
            .await?;
        Ok(page
            .results
            .into_iter()
            .map(domain::MuscleInfo::from)
            .collect())
    }
}

impl<S: SendRequest> Wger<S> {
    async fn read_exercise_images(
        &self,
        id: domain::ExerciseID,
    ) -> Result<Vec<ImageRecord>, domain::ReadError> {
        let page: Page<ImageRecord> = self
            .fetch("exerciseimage/", &[("exercise_base", id.to_string())])
            .await?;
        Ok(page.results)
    }

    async fn fetch<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, domain::ReadError>
    where
        T: DeserializeOwned,
    {
        let request = Request::get(&format!("{}/{path}", self.base_url))
            .query(query.iter().map(|(key, value)| (*key, value.as_str())))
            .header("Accept", "application/json")
            .build()
            .map_err(|err| other(anyhow!("failed to build request: {err}")))?;
        let response = self
            .sender
            .send_request(request)
            .await
            .map_err(|_| domain::StorageError::NoConnection)?;
        if response.status() == 404 {
            return Err(domain::StorageError::NotFound.into());
        }
        if !response.ok() {
            return Err(other(anyhow!(
                "{} {}",
                response.status(),
                response.status_text()
            )));
        }
        response
            .json::<T>()
            .await
            .map_err(|err| other(anyhow!("deserialization failed: {err}")))
    }
}

fn other(err: anyhow::Error) -> domain::ReadError {
    domain::ReadError::Other(err.into())
}

fn normalize(value: serde_json::Value) -> Option<domain::Exercise> {
    let info = match serde_json::from_value::<ExerciseInfo>(value) {
        Ok(info) => info,
        Err(err) => {
            warn!("skipping malformed exercise: {err}");
            return None;
        }
    };
    match domain::Exercise::try_from(domain::ExerciseRecord::from(info)) {
        Ok(exercise) => Some(exercise),
        Err(err) => {
            warn!("skipping exercise: {err}");
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub next: Option<String>,
    pub results: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseInfo {
    pub id: u32,
    pub category: Reference,
    #[serde(default)]
    pub equipment: Vec<Reference>,
    #[serde(default)]
    pub muscles: Vec<MuscleRecord>,
    #[serde(default)]
    pub muscles_secondary: Vec<MuscleRecord>,
    #[serde(default)]
    pub images: Vec<ImageRecord>,
    #[serde(default, alias = "exercises")]
    pub translations: Vec<TranslationRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub id: u32,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuscleRecord {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub is_front: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub image: String,
    #[serde(default)]
    pub is_main: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRecord {
    pub language: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub value: String,
    pub data: SuggestionData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionData {
    pub id: u32,
    #[serde(default)]
    pub base_id: Option<u32>,
    pub name: String,
}

impl From<ExerciseInfo> for domain::ExerciseRecord {
    fn from(value: ExerciseInfo) -> Self {
        Self {
            id: value.id,
            category: value.category.id,
            equipment: value.equipment.iter().map(|e| e.id).collect(),
            muscles: value.muscles.iter().map(|m| m.id).collect(),
            muscles_secondary: value.muscles_secondary.iter().map(|m| m.id).collect(),
            translations: value
                .translations
                .into_iter()
                .map(|t| domain::Translation {
                    language: t.language,
                    name: t.name,
                    description: t.description,
                })
                .collect(),
            images: value
                .images
                .into_iter()
                .map(|i| domain::ImageRecord {
                    url: i.image,
                    is_main: i.is_main,
                })
                .collect(),
        }
    }
}

impl From<MuscleRecord> for domain::MuscleInfo {
    fn from(value: MuscleRecord) -> Self {
        Self {
            id: value.id,
            name: value.name,
            name_en: value.name_en,
            is_front: value.is_front,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::tests::data::{BENCH_PRESS_ID, bench_press_info, exercise_page, squat_info};

    #[test]
    fn test_exercise_info_to_exercise() {
        let info = serde_json::from_value::<ExerciseInfo>(bench_press_info()).unwrap();
        let exercise =
            domain::Exercise::try_from(domain::ExerciseRecord::from(info)).unwrap();

        assert_eq!(exercise.id, BENCH_PRESS_ID.into());
        assert_eq!(exercise.name.as_ref(), "Bench Press");
        assert_eq!(exercise.category, Some(domain::Category::Chest));
        assert_eq!(
            exercise.equipment,
            vec![domain::Equipment::Barbell, domain::Equipment::Bench]
        );
        assert_eq!(exercise.primary_muscles, vec![domain::Muscle::PectoralisMajor]);
        assert_eq!(
            exercise.secondary_muscles,
            vec![domain::Muscle::AnteriorDeltoid, domain::Muscle::TricepsBrachii]
        );
        assert_eq!(
            exercise.instructions,
            vec![
                "Lie on the bench.".to_string(),
                "Press the bar up & lock out.".to_string()
            ]
        );
        assert!(exercise.weighted);
        assert_eq!(
            exercise.image,
            Some("https://wger.de/media/exercise-images/192/Bench-press-1.png".to_string())
        );
    }

    #[test]
    fn test_exercise_info_legacy_translations() {
        let info = serde_json::from_value::<ExerciseInfo>(json!({
            "id": 9,
            "category": { "id": 10, "name": "Abs" },
            "exercises": [{ "language": 2, "name": "Crunches", "description": "" }]
        }))
        .unwrap();

        assert_eq!(info.translations.len(), 1);
        assert_eq!(info.translations[0].name, "Crunches");
    }

    #[test]
    fn test_normalize_skips_malformed_records() {
        let page = serde_json::from_value::<Page<serde_json::Value>>(exercise_page()).unwrap();

        let exercises = page
            .results
            .into_iter()
            .filter_map(normalize)
            .map(|e| e.name.to_string())
            .collect::<Vec<_>>();

        assert_eq!(exercises, vec!["Bench Press", "Squat"]);
    }

    #[test]
    fn test_normalize_skips_untranslated_exercises() {
        let mut info = squat_info();
        info["translations"] = json!([]);

        assert_eq!(normalize(info), None);
    }

    #[test]
    fn test_muscle_record_to_muscle_info() {
        let record = serde_json::from_value::<MuscleRecord>(json!({
            "id": 4,
            "name": "Pectoralis major",
            "name_en": "Chest",
            "is_front": true,
            "image_url_main": "/static/images/muscles/main/muscle-4.svg"
        }))
        .unwrap();

        assert_eq!(
            domain::MuscleInfo::from(record),
            domain::MuscleInfo {
                id: 4,
                name: "Pectoralis major".to_string(),
                name_en: "Chest".to_string(),
                is_front: true,
            }
        );
    }

    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    mod wasm {
        use std::{cell::RefCell, collections::VecDeque};

        use domain::ExerciseRepository;
        use pretty_assertions::assert_eq;
        use wasm_bindgen_test::wasm_bindgen_test;

        use super::*;

        #[wasm_bindgen_test]
        async fn test_read_exercises() {
            let mut first = exercise_page();
            first["next"] = json!("https://wger.de/api/v2/exerciseinfo/?limit=100&offset=100");
            let second = json!({
                "count": 4,
                "next": null,
                "results": [squat_info()]
            });
            let wger = wger_with_responses(vec![ok(&first), ok(&second)]);

            let exercises = wger.read_exercises().await.unwrap();

            assert_eq!(
                exercises.iter().map(|e| e.name.to_string()).collect::<Vec<_>>(),
                vec!["Bench Press", "Squat", "Squat"]
            );
            assert_eq!(wger.sender.requests.borrow().len(), 2);
            assert!(wger.sender.requests.borrow()[1].contains("offset=3"));
        }

        #[wasm_bindgen_test]
        async fn test_read_exercises_no_connection() {
            assert!(matches!(
                wger_with_responses(vec![]).read_exercises().await,
                Err(domain::ReadError::Storage(domain::StorageError::NoConnection))
            ));
        }

        #[wasm_bindgen_test]
        async fn test_read_exercise() {
            let wger = wger_with_responses(vec![ok(&bench_press_info())]);

            let exercise = wger.read_exercise(BENCH_PRESS_ID.into()).await.unwrap();

            assert_eq!(exercise.name.as_ref(), "Bench Press");
            assert!(wger.sender.requests.borrow()[0].contains("exerciseinfo/192/"));
        }

        #[wasm_bindgen_test]
        async fn test_read_exercise_not_found() {
            let wger = wger_with_responses(vec![
                gloo_net::http::Response::builder()
                    .status(404)
                    .json(&json!({ "detail": "Not found." })),
            ]);

            assert!(matches!(
                wger.read_exercise(1.into()).await,
                Err(domain::ReadError::Storage(domain::StorageError::NotFound))
            ));
        }

        #[wasm_bindgen_test]
        async fn test_read_exercise_images() {
            let mut info = squat_info();
            info["images"] = json!([]);
            let images = json!({
                "count": 1,
                "next": null,
                "results": [{ "image": "https://wger.de/media/squat.png", "is_main": false }]
            });
            let wger = wger_with_responses(vec![ok(&info), ok(&images)]);

            let exercise = wger.read_exercise(111.into()).await.unwrap();

            assert_eq!(
                exercise.image,
                Some("https://wger.de/media/squat.png".to_string())
            );
        }

        #[wasm_bindgen_test]
        async fn test_search_exercises() {
            let wger = wger_with_responses(vec![ok(&json!({
                "suggestions": [
                    { "value": "Bench Press", "data": { "id": 73, "base_id": 192, "name": "Bench Press" } },
                    { "value": "Bench Press (EN)", "data": { "id": 74, "base_id": 192, "name": "Bench Press" } },
                    { "value": "Bench Dip", "data": { "id": 80, "name": "Bench Dip" } }
                ]
            }))]);

            assert_eq!(
                wger.search_exercises("bench").await.unwrap(),
                vec![192.into(), 80.into()]
            );
            assert!(wger.sender.requests.borrow()[0].contains("term=bench"));
        }

        #[wasm_bindgen_test]
        async fn test_read_muscles() {
            let wger = wger_with_responses(vec![ok(&json!({
                "count": 1,
                "next": null,
                "results": [{ "id": 1, "name": "Biceps brachii", "name_en": "Biceps", "is_front": true }]
            }))]);

            let muscles = wger.read_muscles().await.unwrap();

            assert_eq!(muscles.len(), 1);
            assert_eq!(muscles[0].display_name(), "Biceps");
        }

        fn ok(value: &serde_json::Value) -> Result<gloo_net::http::Response, gloo_net::Error> {
            gloo_net::http::Response::builder().status(200).json(value)
        }

        fn wger_with_responses(
            responses: Vec<Result<gloo_net::http::Response, gloo_net::Error>>,
        ) -> Wger<MockSendRequest> {
            Wger {
                sender: MockSendRequest {
                    requests: RefCell::new(vec![]),
                    responses: RefCell::new(responses.into()),
                },
                base_url: BASE_URL.to_string(),
            }
        }

        struct MockSendRequest {
            requests: RefCell<Vec<String>>,
            responses: RefCell<VecDeque<Result<gloo_net::http::Response, gloo_net::Error>>>,
        }

        impl SendRequest for MockSendRequest {
            async fn send_request(
                &self,
                request: gloo_net::http::Request,
            ) -> Result<gloo_net::http::Response, gloo_net::Error> {
                self.requests.borrow_mut().push(request.url());
                self.responses
                    .borrow_mut()
                    .pop_front()
                    .unwrap_or(Err(gloo_net::Error::GlooError("no response".to_string())))
            }
        }
    }
}
