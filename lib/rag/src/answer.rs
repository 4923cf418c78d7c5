use serde::{Deserialize, Serialize};
use trimsight_core::RetrievalResult;

/// Synthesized answer with the records it was grounded on, best first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub hack_ids: Vec<String>,
    pub descriptions: Vec<String>,
    /// Similarity of each cited record, parallel to `hack_ids`
    #[serde(skip)]
    pub scores: Vec<f32>,
}

/// A cited record, shaped for a presentation layer that links to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarLink {
    pub hack_id: String,
    pub description: String,
    pub link: String,
}

impl Answer {
    pub fn from_retrieval(answer: String, retrieval: &RetrievalResult) -> Self {
        Self {
            answer,
            hack_ids: retrieval.hack_ids(),
            descriptions: retrieval.texts(),
            scores: retrieval.scores(),
        }
    }

    pub fn citations(&self) -> Vec<CarLink> {
        self.hack_ids
            .iter()
            .zip(&self.descriptions)
            .map(|(hack_id, description)| CarLink {
                hack_id: hack_id.clone(),
                description: description.clone(),
                link: format!("/data/cars?hack-id={}", hack_id),
            })
            .collect()
    }
}
