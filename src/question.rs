//! The minimal view of a question that the selection engine needs, plus the concrete
//! question record stored in exam files.
use serde::{Deserialize, Serialize};


/// Label used to group questions that carry no domain.
pub const FALLBACK_DOMAIN: &str = "General";


/// Anything the sampler can choose. Only the ID and the domain are ever inspected;
/// every other field of the implementing type is passed through untouched.
pub trait Question {
    fn id(&self) -> &str;
    fn domain(&self) -> Option<&str>;

    /// The domain used for grouping and weight lookup.
    fn domain_or_fallback(&self) -> &str {
        self.domain().unwrap_or(FALLBACK_DOMAIN)
    }
}


/// A question as it appears in an exam file. `payload` holds the rest of the record
/// (text, choices, explanations and so on) in whatever shape the exam author used.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BankQuestion<P = serde_json::Map<String, serde_json::Value>> {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(flatten)]
    pub payload: P,
}


impl<P> Question for BankQuestion<P> {
    fn id(&self) -> &str {
        &self.id
    }

    fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }
}


impl BankQuestion {
    /// Construct a question with an empty payload.
    pub fn new(id: &str, domain: Option<&str>) -> Self {
        BankQuestion {
            id: String::from(id),
            domain: domain.map(String::from),
            payload: serde_json::Map::new(),
        }
    }

    /// Return the `text` field of the payload, if there is one and it is a string.
    pub fn text(&self) -> Option<&str> {
        self.payload.get("text").and_then(|v| v.as_str())
    }
}


/// A question chosen for a practice set, annotated with why it was chosen.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeightedQuestion<'a, Q> {
    #[serde(flatten)]
    pub question: &'a Q,
    /// The weight of the question's domain at selection time.
    pub weight: f64,
    pub previously_wrong: bool,
}
