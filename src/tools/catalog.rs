//! 演示数据层：旅游平台的内存版工具集
//!
//! 真实部署时这些工具由外部数据层（景点、内容发布、用户档案、审核评分）提供；
//! 这里给出内存实现，使二进制和测试无需数据库即可跑通。

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::context::AppContext;
use crate::tools::{Tool, ToolRegistry};

#[derive(Debug, Clone, Serialize)]
pub struct Attraction {
    pub id: String,
    pub name: String,
    pub city: String,
    pub category: String,
    pub published: bool,
    pub rating: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Draft {
    pub id: String,
    pub title: String,
    pub author: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlaggedItem {
    pub id: String,
    pub title: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user_id: String,
    pub display_name: String,
    pub home_city: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub id: String,
    pub title: String,
    pub evidence_items: u32,
}

/// 内存数据
#[derive(Debug, Default)]
pub struct CatalogData {
    pub attractions: Vec<Attraction>,
    pub drafts: Vec<Draft>,
    pub flagged: Vec<FlaggedItem>,
    pub profiles: Vec<Profile>,
    pub pending: Vec<Submission>,
}

/// 共享的内存数据存储（各工具持有同一份）
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    inner: Arc<RwLock<CatalogData>>,
}

impl CatalogStore {
    pub fn new(data: CatalogData) -> Self {
        Self {
            inner: Arc::new(RwLock::new(data)),
        }
    }

    /// 带少量示例数据的存储
    pub fn sample() -> Self {
        let attraction = |id: &str, name: &str, city: &str, category: &str, published: bool, rating: f32| Attraction {
            id: id.into(),
            name: name.into(),
            city: city.into(),
            category: category.into(),
            published,
            rating,
        };
        Self::new(CatalogData {
            attractions: vec![
                attraction("a1", "Old Town Square", "Prague", "history", true, 4.7),
                attraction("a2", "Petrin Tower", "Prague", "viewpoint", true, 4.4),
                attraction("a3", "Charles Bridge", "Prague", "history", true, 4.8),
                attraction("a4", "Riverside Food Market", "Prague", "food", false, 4.1),
                attraction("a5", "Castle Gardens", "Brno", "nature", true, 4.2),
            ],
            drafts: vec![Draft {
                id: "a4".into(),
                title: "Riverside Food Market".into(),
                author: "editor-1".into(),
            }],
            flagged: vec![FlaggedItem {
                id: "r17".into(),
                title: "Review of Petrin Tower".into(),
                reason: "spam link".into(),
            }],
            profiles: vec![Profile {
                user_id: "u1".into(),
                display_name: "Alex".into(),
                home_city: "Prague".into(),
            }],
            pending: vec![Submission {
                id: "s9".into(),
                title: "Castle Gardens opening hours".into(),
                evidence_items: 3,
            }],
        })
    }

    pub async fn read(&self) -> tokio::sync::RwLockReadGuard<'_, CatalogData> {
        self.inner.read().await
    }
}

fn to_value<T: Serialize>(v: &T) -> Result<Value, String> {
    serde_json::to_value(v).map_err(|e| e.to_string())
}

/// list_published_attractions：已发布景点，可按 city 过滤
pub struct ListPublishedAttractionsTool {
    store: CatalogStore,
}

#[async_trait]
impl Tool for ListPublishedAttractionsTool {
    fn name(&self) -> &str {
        "list_published_attractions"
    }

    fn description(&self) -> &str {
        "List published attractions. Args: {\"city\": optional string}"
    }

    async fn execute(&self, args: Value, _ctx: &AppContext) -> Result<Value, String> {
        let city = args.get("city").and_then(|v| v.as_str());
        let data = self.store.read().await;
        let items: Vec<&Attraction> = data
            .attractions
            .iter()
            .filter(|a| a.published)
            .filter(|a| city.map_or(true, |c| a.city.eq_ignore_ascii_case(c)))
            .collect();
        to_value(&items)
    }
}

/// search_attractions：按名称或类别子串检索已发布景点
pub struct SearchAttractionsTool {
    store: CatalogStore,
}

#[async_trait]
impl Tool for SearchAttractionsTool {
    fn name(&self) -> &str {
        "search_attractions"
    }

    fn description(&self) -> &str {
        "Search published attractions by name or category. Args: {\"query\": string}"
    }

    async fn execute(&self, args: Value, _ctx: &AppContext) -> Result<Value, String> {
        let query = args
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or("missing 'query'")?
            .to_lowercase();
        let data = self.store.read().await;
        let items: Vec<&Attraction> = data
            .attractions
            .iter()
            .filter(|a| a.published)
            .filter(|a| a.name.to_lowercase().contains(&query) || a.category.to_lowercase().contains(&query))
            .collect();
        to_value(&items)
    }
}

/// 行程天数上限
pub const MAX_ITINERARY_DAYS: u64 = 14;

/// suggest_itinerary：按评分把已发布景点分配到若干天（1..=MAX_ITINERARY_DAYS）
pub struct SuggestItineraryTool {
    store: CatalogStore,
}

#[async_trait]
impl Tool for SuggestItineraryTool {
    fn name(&self) -> &str {
        "suggest_itinerary"
    }

    fn description(&self) -> &str {
        "Suggest a day-by-day itinerary. Args: {\"days\": number, \"city\": optional string}"
    }

    async fn execute(&self, args: Value, _ctx: &AppContext) -> Result<Value, String> {
        let days = args
            .get("days")
            .and_then(|v| v.as_u64())
            .unwrap_or(1)
            .clamp(1, MAX_ITINERARY_DAYS) as usize;
        let city = args.get("city").and_then(|v| v.as_str());
        let data = self.store.read().await;
        let mut picks: Vec<&Attraction> = data
            .attractions
            .iter()
            .filter(|a| a.published)
            .filter(|a| city.map_or(true, |c| a.city.eq_ignore_ascii_case(c)))
            .collect();
        picks.sort_by(|a, b| b.rating.total_cmp(&a.rating));

        let mut plan = vec![Vec::new(); days];
        for (i, a) in picks.iter().enumerate() {
            plan[i % days].push(a.name.clone());
        }
        let plan: Vec<Value> = plan
            .into_iter()
            .enumerate()
            .map(|(i, stops)| json!({ "day": i + 1, "stops": stops }))
            .collect();
        Ok(Value::Array(plan))
    }
}

/// list_drafts：待发布草稿
pub struct ListDraftsTool {
    store: CatalogStore,
}

#[async_trait]
impl Tool for ListDraftsTool {
    fn name(&self) -> &str {
        "list_drafts"
    }

    fn description(&self) -> &str {
        "List content drafts awaiting publication. Args: {}"
    }

    async fn execute(&self, _args: Value, _ctx: &AppContext) -> Result<Value, String> {
        let data = self.store.read().await;
        to_value(&data.drafts)
    }
}

/// publish_content：发布草稿（同 id 的景点置为已发布）
pub struct PublishContentTool {
    store: CatalogStore,
}

#[async_trait]
impl Tool for PublishContentTool {
    fn name(&self) -> &str {
        "publish_content"
    }

    fn description(&self) -> &str {
        "Publish a draft. Args: {\"draft_id\": string}"
    }

    async fn execute(&self, args: Value, _ctx: &AppContext) -> Result<Value, String> {
        let draft_id = args
            .get("draft_id")
            .and_then(|v| v.as_str())
            .ok_or("missing 'draft_id'")?;
        let mut data = self.store.inner.write().await;
        let pos = data
            .drafts
            .iter()
            .position(|d| d.id == draft_id)
            .ok_or_else(|| format!("draft not found: {draft_id}"))?;
        let draft = data.drafts.remove(pos);
        if let Some(a) = data.attractions.iter_mut().find(|a| a.id == draft.id) {
            a.published = true;
        }
        Ok(json!({ "published": draft.id, "title": draft.title }))
    }
}

/// list_flagged_content：被举报待审内容
pub struct ListFlaggedContentTool {
    store: CatalogStore,
}

#[async_trait]
impl Tool for ListFlaggedContentTool {
    fn name(&self) -> &str {
        "list_flagged_content"
    }

    fn description(&self) -> &str {
        "List user content flagged for moderation. Args: {}"
    }

    async fn execute(&self, _args: Value, _ctx: &AppContext) -> Result<Value, String> {
        let data = self.store.read().await;
        to_value(&data.flagged)
    }
}

/// get_profile：用户档案
pub struct GetProfileTool {
    store: CatalogStore,
}

#[async_trait]
impl Tool for GetProfileTool {
    fn name(&self) -> &str {
        "get_profile"
    }

    fn description(&self) -> &str {
        "Fetch a user profile. Args: {\"user_id\": optional string, defaults to the caller}"
    }

    async fn execute(&self, args: Value, ctx: &AppContext) -> Result<Value, String> {
        let user_id = args
            .get("user_id")
            .and_then(|v| v.as_str())
            .or(ctx.user_id.as_deref())
            .ok_or("missing 'user_id'")?;
        let data = self.store.read().await;
        let profile = data
            .profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .ok_or_else(|| format!("profile not found: {user_id}"))?;
        to_value(profile)
    }
}

/// list_pending_verifications：待核验提交
pub struct ListPendingVerificationsTool {
    store: CatalogStore,
}

#[async_trait]
impl Tool for ListPendingVerificationsTool {
    fn name(&self) -> &str {
        "list_pending_verifications"
    }

    fn description(&self) -> &str {
        "List submissions awaiting verification. Args: {}"
    }

    async fn execute(&self, _args: Value, _ctx: &AppContext) -> Result<Value, String> {
        let data = self.store.read().await;
        to_value(&data.pending)
    }
}

/// score_submission：按证据条数给出 0-100 分
pub struct ScoreSubmissionTool {
    store: CatalogStore,
}

#[async_trait]
impl Tool for ScoreSubmissionTool {
    fn name(&self) -> &str {
        "score_submission"
    }

    fn description(&self) -> &str {
        "Score a pending submission by its evidence. Args: {\"submission_id\": string}"
    }

    async fn execute(&self, args: Value, _ctx: &AppContext) -> Result<Value, String> {
        let id = args
            .get("submission_id")
            .and_then(|v| v.as_str())
            .ok_or("missing 'submission_id'")?;
        let data = self.store.read().await;
        let sub = data
            .pending
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| format!("submission not found: {id}"))?;
        let score = sub.evidence_items.saturating_mul(25).min(100);
        Ok(json!({ "submission_id": sub.id, "score": score }))
    }
}

/// 注册全部演示工具（共享同一存储）
pub fn register_catalog_tools(registry: &mut ToolRegistry, store: &CatalogStore) {
    registry.register(ListPublishedAttractionsTool { store: store.clone() });
    registry.register(SearchAttractionsTool { store: store.clone() });
    registry.register(SuggestItineraryTool { store: store.clone() });
    registry.register(ListDraftsTool { store: store.clone() });
    registry.register(PublishContentTool { store: store.clone() });
    registry.register(ListFlaggedContentTool { store: store.clone() });
    registry.register(GetProfileTool { store: store.clone() });
    registry.register(ListPendingVerificationsTool { store: store.clone() });
    registry.register(ScoreSubmissionTool { store: store.clone() });
}

/// 示例数据 + 全部演示工具
pub fn sample_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    register_catalog_tools(&mut registry, &CatalogStore::sample());
    registry
}
