use serde::{Deserialize, Serialize};

use super::{ChatTurn, Speaker};
use crate::diagnosis::MetricsInput;
use crate::workspace::BusinessProfile;
use crate::{Result, SmartAdsError};

/// The twenty persuasion angles every ad copy batch covers, in order.
pub const COPY_ANGLES: [&str; 20] = [
    "Resultado / Transformación",
    "Dolor / Problema",
    "Deseo / Aspiración",
    "Rapidez",
    "Ahorro (dinero)",
    "Educación / Autoridad",
    "Descubrimiento / Secreto",
    "Seguridad / Confianza",
    "Prueba Social",
    "Comparación",
    "Evitar error",
    "Comodidad / Facilidad",
    "Oferta / Escasez",
    "Exclusividad",
    "Sistema / Método",
    "Contexto local",
    "Prevención",
    "Innovación",
    "Simplicidad",
    "Identidad",
];

const NOT_DEFINED: &str = "Not defined";

/// One message as the dashboard keeps it. Sales simulations send `text`
/// instead of `content`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: String,
    #[serde(alias = "text")]
    pub content: String,
}

/// A normalized exchange: alternating turns that always end with the user
/// message about to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    turns: Vec<ChatTurn>,
}

impl Conversation {
    pub fn turns(&self) -> impl Iterator<Item = &ChatTurn> {
        self.turns.iter()
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.turns[..self.turns.len().saturating_sub(1)]
    }

    pub fn message(&self) -> &str {
        self.turns.last().map(|turn| turn.text.as_str()).unwrap_or("")
    }
}

/// Merges consecutive same-speaker turns and folds a trailing user turn into
/// the outgoing message. Without `message`, the trailing user turn itself is
/// sent. Leading model turns are dropped so the exchange opens with the user.
pub fn build_conversation(history: &[HistoryMessage], message: Option<&str>) -> Result<Conversation> {
    let mut turns: Vec<ChatTurn> = Vec::new();
    for entry in history {
        let text = entry.content.trim();
        if text.is_empty() {
            continue;
        }
        let speaker = Speaker::from_role(&entry.role);
        match turns.last_mut() {
            Some(last) if last.speaker == speaker => {
                last.text.push_str("\n\n");
                last.text.push_str(text);
            }
            _ => turns.push(ChatTurn {
                speaker,
                text: text.to_string(),
            }),
        }
    }

    let leading_model = turns
        .iter()
        .take_while(|turn| turn.speaker == Speaker::Model)
        .count();
    turns.drain(..leading_model);

    let incoming = message.map(str::trim).filter(|text| !text.is_empty());
    let trailing_user = turns.last().map_or(false, |turn| turn.speaker == Speaker::User);
    let outgoing = match (trailing_user, incoming) {
        (true, Some(incoming)) => {
            let pending = turns.pop().map(|turn| turn.text).unwrap_or_default();
            format!("{}\n\n{}", pending, incoming)
        }
        (true, None) => turns.pop().map(|turn| turn.text).unwrap_or_default(),
        (false, Some(incoming)) => incoming.to_string(),
        (false, None) => return Err(SmartAdsError::invalid("Message is required")),
    };

    turns.push(ChatTurn {
        speaker: Speaker::User,
        text: outgoing,
    });
    Ok(Conversation { turns })
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsContext {
    #[serde(flatten)]
    pub metrics: MetricsInput,
    #[serde(default)]
    pub diagnosis: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CopyBrief {
    pub niche: String,
    pub product: String,
    #[serde(deserialize_with = "crate::lenient::text")]
    pub ticket: String,
    pub audience: String,
    pub pain_point: String,
    pub objective: String,
    pub demographics: String,
    pub benefits: String,
    pub differentiation: String,
    pub objections: String,
    pub guarantee: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CopyContext {
    pub inputs: CopyBrief,
    pub outputs: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureContext {
    pub inputs: Option<serde_json::Value>,
    pub outputs: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowBrief {
    pub objective: String,
    pub niche: String,
    pub product: String,
    pub tone: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganicBrief {
    pub niche: String,
    pub audience: String,
    pub profile: String,
    pub pillars: String,
    pub objective: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportBrief {
    pub client_name: String,
    pub timeframe: String,
    pub objective: String,
    pub metrics_extracted: Option<MetricsInput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SalesTraining {
    pub product: String,
    #[serde(deserialize_with = "crate::lenient::text")]
    pub price: String,
    pub niche: String,
    pub demographics: String,
    pub audience_desc: String,
    pub differentiation: String,
    pub pain_point: String,
    pub benefits: String,
    pub guarantee: String,
    pub sales_role: String,
    pub tone: String,
    pub objections: String,
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn with_context(persona: &str, context: &str) -> String {
    format!(
        "{}\n\n=== CONTEXT START ===\n{}\n=== CONTEXT END ===",
        persona.trim(),
        context.trim()
    )
}

pub fn metrics_analyst_prompt(context: Option<&MetricsContext>) -> String {
    let context = match context {
        Some(ctx) => {
            let metrics = &ctx.metrics;
            let roas = metrics
                .roas
                .map(|value| format!("{:.2}", value))
                .unwrap_or_else(|| "N/A".to_string());
            let diagnosis = ctx
                .diagnosis
                .as_ref()
                .map(pretty)
                .unwrap_or_else(|| "No diagnosis yet.".to_string());
            format!(
                "Current campaign metrics:\n- CPM: ${:.2}\n- CTR: {:.2}%\n- CPC: ${:.2}\n\
                 - Cost per result: ${:.2}\n- Total results: {}\n- Spend: ${:.2}\n- ROAS: {}\n\n\
                 Diagnosis:\n{}",
                metrics.cpm,
                metrics.ctr,
                metrics.cpc,
                metrics.cost_per_result,
                metrics.results,
                metrics.spend,
                roas,
                diagnosis
            )
        }
        None => "No metrics provided yet.".to_string(),
    };

    with_context(
        r#"You are "Smarty", an expert media buyer, conversion rate optimizer and marketing strategist.
Be friendly and empathetic. Explain marketing concepts with simple analogies.
Always close by asking a clarifying question about the creative, the offer or the audience.
Help the user understand their Meta Ads data and give concise, high-ROI advice formatted in markdown.
Never invent data: base every statement on the context below.
Reply in the language the user writes in."#,
        &context,
    )
}

pub fn copy_refiner_prompt(context: Option<&CopyContext>) -> String {
    let context = match context {
        Some(ctx) => {
            let angles = ctx
                .outputs
                .as_ref()
                .and_then(|outputs| outputs.get("angles"))
                .map(pretty)
                .unwrap_or_else(|| "[]".to_string());
            format!(
                "Niche: {}\nProduct: {}\nTarget audience: {}\nObjective: {}\n\nRecently generated assets:\n{}",
                ctx.inputs.niche, ctx.inputs.product, ctx.inputs.audience, ctx.inputs.objective, angles
            )
        }
        None => "No copy generated yet.".to_string(),
    };

    with_context(
        r#"You are "Smarty", an expert direct response copywriter.
Help the user refine, translate or rewrite the ad copy generated for them.
Keep answers concise and ready to paste into Ads Manager.
Reply in the language the user writes in."#,
        &context,
    )
}

pub fn structure_strategist_prompt(context: Option<&StructureContext>) -> String {
    let context = match context {
        Some(ctx) => format!(
            "User inputs:\n{}\n\nGenerated architecture:\n{}",
            ctx.inputs.as_ref().map(pretty).unwrap_or_else(|| "{}".to_string()),
            ctx.outputs.as_ref().map(pretty).unwrap_or_else(|| "{}".to_string())
        ),
        None => "No structure generated yet.".to_string(),
    };

    with_context(
        r#"You are "Smarty", an expert media buyer and campaign strategist.
Explain, justify or tweak the campaign architecture that was just generated for the user.
Say exactly why budgets are split this way and why the current phase calls for this structure.
Reply in the language the user writes in."#,
        &context,
    )
}

pub fn business_coach_prompt(profile: Option<&BusinessProfile>) -> String {
    let persona = r#"You are "Smarty Coach", an elite business coach and project manager for agency owners, freelancers and creators.
You structure businesses, price high-ticket offers, scale operations, design irresistible offers and build roadmaps.
Be direct and actionable: give the exact step by step, never generic advice.
Reply in the language the user writes in."#;

    match profile.filter(|profile| !profile.is_empty()) {
        Some(profile) => format!(
            "{}\n\n========================================\nCURRENT CLIENT BUSINESS CONTEXT:\n\
             - Niche / industry: {}\n- Ideal client (avatar): {}\n- Main offer / service: {}\n\
             - Current revenue level: {}\n- Main short-term goal: {}\n- Current bottleneck: {}\n\
             ========================================\n\
             Use this context in every answer. Pricing advice must consider the niche and revenue; \
             plans must target the main goal and attack the bottleneck.",
            persona,
            or_default(&profile.niche, NOT_DEFINED),
            or_default(&profile.avatar, NOT_DEFINED),
            or_default(&profile.offer, NOT_DEFINED),
            or_default(&profile.revenue, NOT_DEFINED),
            or_default(&profile.goal, NOT_DEFINED),
            or_default(&profile.bottleneck, NOT_DEFINED),
        ),
        None => persona.to_string(),
    }
}

pub fn sales_assistant_prompt(training: &SalesTraining) -> String {
    format!(
        r#"ACT AS A STAR SALESPERSON. You are not an AI: you are the official representative of this business.
You are answering a prospect who is interested in, or has doubts about, your offer. Never break character.

======= BUSINESS INSTRUCTIONS =======
- Product(s) or service(s) you sell: {}
- Official price range (NEVER invent other prices): {}
- Business niche: {}
- Audience: {} {}
- Main differentiator (show it off subtly): {}
- The prospect's current problem: {}
- Your exact solution and benefits: {}
- Guarantee: {}
- Seller type: {}
- Tone, culture and personality: {}

======= FREQUENT OBJECTIONS =======
{}

======= RESPONSE RULES =======
- Answer only what the prospect asked.
- End messages with a question that moves toward the close.
- Be respectful and persuasive in the configured tone.
- Keep messages at chat/DM length.
- Never mention that this context was given to you."#,
        training.product,
        or_default(&training.price, "Not specified"),
        training.niche,
        training.demographics,
        training.audience_desc,
        training.differentiation,
        training.pain_point,
        training.benefits,
        training.guarantee,
        training.sales_role,
        training.tone,
        training.objections,
    )
}

const JSON_ONLY: &str =
    "Return ONLY a valid, parseable JSON object with exactly this structure, no markdown, no backticks, no extra text:";

pub fn ad_copy_prompt(brief: &CopyBrief) -> String {
    let angles = COPY_ANGLES
        .iter()
        .enumerate()
        .map(|(index, name)| format!("{}. {}", index + 1, name))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"Act as a world-class direct response copywriter for Meta Ads.
Using these inputs, write magnetic, high-converting ad copy in Spanish:
Niche: {}
Product: {}
Price: {}
Target audience: {}
Audience demographics: {}
Biggest pain points: {}
Solutions and benefits: {}
Differentiation: {}
Main objections to overcome: {}
Guarantee: {}
Campaign objective: {}

Write EXACTLY 20 distinct medium-to-long ad copies (2 to 3 paragraphs each), one per angle, in this order:
{}

{}
{{
  "angles": [{{ "name": "<angle name>", "copy": "..." }}],
  "hooks": ["hook 1", "hook 2", "hook 3", "hook 4", "hook 5"],
  "scripts": ["video script 1", "video script 2"],
  "ctas": ["call to action 1", "call to action 2", "call to action 3"]
}}"#,
        brief.niche,
        brief.product,
        brief.ticket,
        brief.audience,
        brief.demographics,
        brief.pain_point,
        brief.benefits,
        brief.differentiation,
        brief.objections,
        brief.guarantee,
        brief.objective,
        angles,
        JSON_ONLY,
    )
}

pub fn chat_flow_prompt(brief: &FlowBrief) -> String {
    format!(
        r#"Act as a chat marketing expert and ManyChat funnel architect for Instagram and Facebook.
Design a persuasive, natural, high-converting conversation flow in Spanish.

Campaign objective: {}
Business niche: {}
Main product: {}
Conversation tone: {}

The tree starts when the user interacts with an ad or sends a keyword by DM.
The "nodes" array must cover the full path and always start with id "node-1".
Node "type" is one of "message", "collect_data" or "action".

{}
{{
  "title": "Flow name",
  "trigger": "What starts the flow",
  "strategyRationale": "Why the funnel is built this way",
  "nodes": [
    {{ "id": "node-1", "type": "message", "text": "...", "options": [{{ "text": "Option 1", "nextId": "node-2" }}] }},
    {{ "id": "node-2", "type": "collect_data", "text": "...", "options": [{{ "text": "Send number", "nextId": "node-3" }}] }},
    {{ "id": "node-3", "type": "action", "text": "[INTERNAL ACTION: tag as hot lead]", "options": [] }}
  ]
}}"#,
        brief.objective, brief.niche, brief.product, brief.tone, JSON_ONLY,
    )
}

pub fn organic_plan_prompt(brief: &OrganicBrief) -> String {
    format!(
        r#"Act as a personal brand and viral content strategist (TikTok, Instagram Reels, LinkedIn).
Create high-value organic content ideas in Spanish from these brand pillars:

Niche / market: {}
Target audience: {}
Creator profile / authority: {}
Content pillars: {}
Main content objective: {}

This is organic content that educates and positions the creator as an authority, not direct-response ads.
Write exactly 10 viral hooks, 5 sixty-second video scripts and 3 carousel outlines of 5 to 8 slides.

{}
{{
  "viralHooks": ["hook 1", "..."],
  "videoScripts": [{{ "title": "...", "hook": "...", "body": "...", "cta": "..." }}],
  "carouselOutlines": [{{ "title": "...", "slides": ["Slide 1 (cover): ...", "Final slide (CTA): ..."] }}]
}}"#,
        brief.niche, brief.audience, brief.profile, brief.pillars, brief.objective, JSON_ONLY,
    )
}

pub fn report_prompt(brief: &ReportBrief, metrics: &MetricsInput) -> String {
    format!(
        r#"Act as a senior marketing analyst and media buyer.
Analyze hard data pulled from a client's Meta Ads campaign and write the report in Spanish.

Client / brand: {}
Period: {}
Campaign objective: {}

Metrics:
- Total spend: ${:.2}
- Total results: {}
- Cost per result (CPA): ${:.2}
- CTR: {:.2}%
- CPC: ${:.2}
- CPM: ${:.2}

Do not just repeat the numbers. Judge whether the CTR is good, whether the CPM is expensive and
whether the cost per result is profitable, speaking as a strategic performance marketer to a business owner.

{}
{{
  "resumenEjecutivo": "One direct paragraph summarizing performance against the objective",
  "puntosPositivos": ["Strength grounded in the data", "..."],
  "oportunidadesMejora": ["Strategic improvement opportunity", "..."]
}}"#,
        or_default(&brief.client_name, "Not specified"),
        or_default(&brief.timeframe, "Last 30 days"),
        or_default(&brief.objective, "Not specified"),
        metrics.spend,
        metrics.results,
        metrics.cost_per_result,
        metrics.ctr,
        metrics.cpc,
        metrics.cpm,
        JSON_ONLY,
    )
}

pub fn ad_teardown_prompt(product_context: Option<&str>) -> String {
    let context = product_context
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or("Not specified; infer the niche from the ad itself.");
    format!(
        r#"Act as a senior media buyer and ad reverse-engineering expert.
Analyze this image, a winning competitor ad, and extract its formula. Answer in Spanish.

Additional context (my product or niche): {}

{}
{{
  "psychology": "The deep psychological angle in 2-3 lines",
  "hookVisual": "The visual element that stops the scroll",
  "hookTextual": "The first textual hook",
  "offer": "The offer or main call to action",
  "replicationFramework": ["Step 1: ...", "Step 2: ...", "Step 3: ...", "Step 4: ..."],
  "suggestedCopy": "Example copy for MY product using the same psychology"
}}"#,
        context, JSON_ONLY,
    )
}
