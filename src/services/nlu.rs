use crate::models::{Plan, PlanAction, RiderProfile};
use reqwest::Client;
use serde_json::{json, Map, Value};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when asking the chat model for a plan
#[derive(Debug, Error)]
pub enum NluError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Completion had no content")]
    EmptyCompletion,

    #[error("Completion is not a JSON plan: {0}")]
    InvalidPlan(String),
}

const SYSTEM_PROMPT: &str = "You are RideReady's assistant and help beginners choose a first motorcycle. \
Stay strictly within motorcycle topics. Reply with a single JSON object: \
{\"topic\": \"MOTO_DOMAIN\" | \"AMBIGUOUS\" | \"OFFTOPIC\", \"message\": string, \"actions\": [...]}. \
Each action is either {\"type\": \"UPDATE_PROFILE\", \"patch\": {...}} where patch may contain \
experience (no_experience | little_experience), height_cm, budget_usd, k and bike_types \
(cruiser, standard, sportbike, naked, adventure, touring, dual_sport), or \
{\"type\": \"RECOMMEND\", \"pin_ids\": [catalog ids], \"items\": [{\"manufacturer\", \"model\", \"category\"}]}.";

const BRANDS: &[&str] = &[
    "Royal Enfield",
    "Moto Guzzi",
    "Harley-Davidson",
    "Honda",
    "Yamaha",
    "Kawasaki",
    "Suzuki",
    "BMW",
    "KTM",
    "Ducati",
    "Triumph",
    "Harley",
    "Aprilia",
    "CFMoto",
    "Benelli",
    "Bajaj",
    "Husqvarna",
    "Zero",
];

const STYLE_WORDS: &[(&str, &[&str])] = &[
    ("cruiser", &["cruiser"]),
    ("cruisers", &["cruiser"]),
    ("standard", &["standard"]),
    ("sport", &["sportbike"]),
    ("sporty", &["sportbike"]),
    ("sportbike", &["sportbike"]),
    ("sportbikes", &["sportbike"]),
    ("naked", &["naked"]),
    ("streetfighter", &["naked"]),
    ("adventure", &["adventure"]),
    ("adv", &["adventure", "dual_sport"]),
    ("touring", &["touring"]),
    ("tourer", &["touring"]),
    ("dualsport", &["dual_sport"]),
    ("dual", &["adventure", "dual_sport"]),
    ("enduro", &["dual_sport"]),
    ("dirt", &["dual_sport"]),
];

const MOTO_WORDS: &[&str] = &[
    "bike", "bikes", "motorcycle", "motorcycles", "moto", "motorbike", "ride", "riding", "rider",
    "seat", "abs", "cc", "engine", "beginner", "license",
];

const RECOMMEND_WORDS: &[&str] = &[
    "recommend", "recommendation", "recommendations", "suggest", "show", "options", "which", "what",
    "find", "looking", "need", "want",
];

const TALL_HEIGHT_CM: u16 = 180;
const SHORT_HEIGHT_CM: u16 = 165;
const CHEAP_BUDGET_USD: u32 = 6000;

/// Turns chat messages into plans
///
/// Uses an OpenAI-compatible chat model when configured; otherwise, and on
/// any model failure, falls back to keyword rules.
pub struct NluClient {
    llm: Option<LlmPlanner>,
}

struct LlmPlanner {
    endpoint: String,
    api_key: String,
    model: String,
    client: Client,
}

impl NluClient {
    /// Offline client using only keyword rules
    pub fn keyword_only() -> Self {
        Self { llm: None }
    }

    pub fn with_model(endpoint: String, api_key: String, model: String, timeout: Duration) -> Result<Self, NluError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            llm: Some(LlmPlanner {
                endpoint,
                api_key,
                model,
                client,
            }),
        })
    }

    pub fn uses_model(&self) -> bool {
        self.llm.is_some()
    }

    /// Interpret one message in the context of the current profile
    pub async fn make_plan(&self, message: &str, profile: &RiderProfile) -> Plan {
        if message.trim().is_empty() {
            return Plan::new("EMPTY", "Please type something.", Vec::new());
        }

        let Some(llm) = &self.llm else {
            tracing::debug!("Chat model disabled, using keyword rules");
            return keyword_plan(message);
        };

        match llm.plan(message, profile).await {
            Ok(plan) => plan,
            Err(e) => {
                tracing::warn!("Chat model failed, using keyword rules: {}", e);
                keyword_plan(message)
            }
        }
    }
}

impl LlmPlanner {
    async fn plan(&self, message: &str, profile: &RiderProfile) -> Result<Plan, NluError> {
        let url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));
        let profile_json = serde_json::to_string(profile).unwrap_or_default();

        let body = json!({
            "model": self.model,
            "temperature": 0.2,
            "max_tokens": 400,
            "response_format": {"type": "json_object"},
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": format!("Current profile: {}\nMessage: {}", profile_json, message)},
            ],
        });

        tracing::info!("Calling chat model {}", self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(NluError::ApiError(format!("{} - {}", status, detail)));
        }

        let json: Value = response.json().await?;
        let content = json
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(NluError::EmptyCompletion)?;

        tracing::debug!("Chat model content: {}", content);

        let object = outermost_json_object(content)
            .ok_or_else(|| NluError::InvalidPlan("no JSON object found".into()))?;
        let raw: Value =
            serde_json::from_str(object).map_err(|e| NluError::InvalidPlan(e.to_string()))?;
        if !raw.is_object() {
            return Err(NluError::InvalidPlan("plan is not an object".into()));
        }

        let mut plan = Plan::from_value(&raw);
        if plan.topic.is_empty() {
            plan.topic = "MOTO_DOMAIN".to_string();
        }

        // Models often name bikes in prose without a RECOMMEND action
        if !plan.wants_recommendation() {
            let models = extract_models(&plan.message);
            if !models.is_empty() {
                plan.actions.push(recommend_models(&models));
            }
        }

        Ok(plan)
    }
}

/// The text between the first `{` and the last `}`
fn outermost_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn recommend_models(models: &[String]) -> PlanAction {
    PlanAction::Recommend {
        pin_ids: Value::Null,
        items: Value::Array(models.iter().map(|m| json!({ "label": m })).collect()),
    }
}

/// Keyword interpretation used offline and as the model fallback
pub fn keyword_plan(message: &str) -> Plan {
    if message.trim().is_empty() {
        return Plan::new("EMPTY", "Please type something.", Vec::new());
    }

    let normalized = message
        .to_lowercase()
        .replace("dual-sport", "dualsport")
        .replace("dual sport", "dualsport")
        .replace(',', "");
    let words: Vec<&str> = normalized
        .split(|c: char| !(c.is_alphanumeric() || c == '$'))
        .filter(|w| !w.is_empty())
        .collect();
    let has = |candidates: &[&str]| words.iter().any(|w| candidates.contains(w));

    let mut patch = Map::new();

    let mut styles: Vec<&str> = Vec::new();
    for word in &words {
        if let Some((_, tags)) = STYLE_WORDS.iter().find(|(w, _)| w == word) {
            for tag in tags.iter() {
                if !styles.contains(tag) {
                    styles.push(*tag);
                }
            }
        }
    }
    if !styles.is_empty() {
        patch.insert("bike_types".into(), json!(styles));
    }

    if let Some(height) = explicit_height_cm(&words) {
        patch.insert("height_cm".into(), json!(height));
    } else if has(&["tall", "taller"]) {
        patch.insert("height_cm".into(), json!(TALL_HEIGHT_CM));
    } else if has(&["short", "shorter", "low"]) {
        patch.insert("height_cm".into(), json!(SHORT_HEIGHT_CM));
    }

    if let Some(budget) = explicit_budget_usd(&words) {
        patch.insert("budget_usd".into(), json!(budget));
    } else if has(&["cheap", "affordable", "inexpensive"]) {
        patch.insert("budget_usd".into(), json!(CHEAP_BUDGET_USD));
    }

    if normalized.contains("little experience") || normalized.contains("some experience") {
        patch.insert("experience".into(), json!("little_experience"));
    } else if normalized.contains("no experience")
        || normalized.contains("never ridden")
        || normalized.contains("first bike")
    {
        patch.insert("experience".into(), json!("no_experience"));
    }

    let models = extract_models(message);
    let mentions_moto = has(MOTO_WORDS) || !styles.is_empty() || !models.is_empty();

    let mut actions = Vec::new();
    if !patch.is_empty() {
        actions.push(PlanAction::UpdateProfile {
            patch: Value::Object(patch),
        });
    }
    if !actions.is_empty() || !models.is_empty() || (mentions_moto && has(RECOMMEND_WORDS)) {
        actions.push(recommend_models(&models));
    }

    if !actions.is_empty() {
        Plan::new(
            "MOTO_DOMAIN",
            "Updating your preferences and refreshing recommendations.",
            actions,
        )
    } else if mentions_moto {
        Plan::new(
            "AMBIGUOUS",
            "What would you like to change: style, budget or size?",
            Vec::new(),
        )
    } else {
        Plan::new(
            "OFFTOPIC",
            "I can only help with choosing a beginner motorcycle.",
            Vec::new(),
        )
    }
}

/// "175 cm" or "175cm" within the profile's height bounds
fn explicit_height_cm(words: &[&str]) -> Option<u16> {
    words.iter().enumerate().find_map(|(i, word)| {
        let number = match word.strip_suffix("cm") {
            Some(number) if !number.is_empty() => number,
            _ if words.get(i + 1) == Some(&"cm") => *word,
            _ => return None,
        };
        number.parse::<u16>().ok().filter(|h| (140..=210).contains(h))
    })
}

/// "$7000", "7k", or a four/five digit number in a money context
fn explicit_budget_usd(words: &[&str]) -> Option<u32> {
    let money_context = words.iter().any(|w| {
        matches!(
            *w,
            "budget" | "under" | "usd" | "dollars" | "spend" | "price" | "cost" | "max" | "around"
        ) || w.starts_with('$')
    });

    words.iter().find_map(|word| {
        let word = word.trim_start_matches('$');
        if let Some(thousands) = word.strip_suffix('k') {
            return thousands.parse::<u32>().ok().map(|v| v.saturating_mul(1000));
        }
        if !money_context {
            return None;
        }
        word.parse::<u32>().ok().filter(|v| *v >= 1000)
    })
}

/// Brand + model mentions such as "Yamaha R3" or "Royal Enfield Himalayan"
///
/// A brand counts only when followed by at least one capitalized or
/// numeric token; mentions are returned once, in order of appearance.
pub fn extract_models(text: &str) -> Vec<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut found: Vec<String> = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let Some((brand, brand_len)) = brand_at(&tokens[i..]) else {
            i += 1;
            continue;
        };

        let mut model_tokens: Vec<&str> = Vec::new();
        let mut j = i + brand_len;
        // A brand ending a sentence has no model
        let brand_closed = tokens[j - 1].ends_with(|c: char| ".,;:!?".contains(c));
        while !brand_closed && j < tokens.len() && model_tokens.len() < 3 {
            let token = tokens[j];
            let trimmed = token.trim_end_matches(|c: char| ".,;:!?)".contains(c));
            let starts_model = trimmed
                .chars()
                .next()
                .is_some_and(|c| c.is_uppercase() || c.is_ascii_digit());
            if trimmed.is_empty() || !starts_model || brand_at(&tokens[j..]).is_some() {
                break;
            }
            model_tokens.push(trimmed);
            j += 1;
            if trimmed.len() != token.len() {
                break;
            }
        }

        if !model_tokens.is_empty() {
            let mention = format!("{} {}", brand, model_tokens.join(" "));
            if !found.contains(&mention) {
                found.push(mention);
            }
        }
        i = j.max(i + 1);
    }

    found
}

/// Brand starting at the first token, with the number of tokens it spans
fn brand_at(tokens: &[&str]) -> Option<(String, usize)> {
    BRANDS.iter().find_map(|brand| {
        let parts: Vec<&str> = brand.split(' ').collect();
        if tokens.len() < parts.len() {
            return None;
        }
        let matches = parts.iter().zip(tokens).all(|(part, token)| {
            token
                .trim_end_matches(|c: char| ".,;:!?".contains(c))
                .eq_ignore_ascii_case(part)
        });
        matches.then(|| {
            let written: Vec<&str> = tokens[..parts.len()]
                .iter()
                .map(|t| t.trim_end_matches(|c: char| ".,;:!?".contains(c)))
                .collect();
            (written.join(" "), parts.len())
        })
    })
}
