use crate::{
    builder::{PageConfig, ResolvedTheme},
    error::{AppError, AppResult},
    models::{page, Page, PageModel, User},
    services::{auth::is_unique_violation, cache::CacheService},
    utils::{format_slug, is_reserved, normalize_slug},
};
use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};

const CACHE_TTL_PAGE: u64 = 300; // 5 minutes

fn page_cache_key(slug: &str) -> String {
    format!("pages:slug:{slug}")
}

pub struct SavePageInput {
    pub slug: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub config: PageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageOwner {
    pub id: i32,
    pub name: String,
    pub image: Option<String>,
}

/// Everything a public visit needs, in one cacheable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedPage {
    pub id: i32,
    pub slug: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub config: PageConfig,
    pub theme: ResolvedTheme,
    pub owner: PageOwner,
    pub meta_title: String,
    pub meta_description: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

pub struct PageService {
    db: DatabaseConnection,
    cache: Option<CacheService>,
}

impl PageService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, cache: None }
    }

    pub fn with_cache(mut self, cache: CacheService) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Advisory availability check. Returns the normalized slug and whether
    /// any page, owned by anyone, already uses it.
    pub async fn check_slug(&self, raw: &str) -> AppResult<(String, bool)> {
        let slug = normalize_slug(raw);
        if slug.is_empty() || is_reserved(&slug) {
            return Err(AppError::Validation("Invalid slug".to_string()));
        }

        let existing = Page::find()
            .filter(page::Column::Slug.eq(slug.as_str()))
            .one(&self.db)
            .await?;

        Ok((slug, existing.is_none()))
    }

    /// Create or overwrite the caller's page at `input.slug` and publish it.
    pub async fn save(&self, user_id: i32, input: SavePageInput) -> AppResult<PageModel> {
        let slug = format_slug(&input.slug);
        if slug.is_empty() {
            return Err(AppError::Validation(
                "Slug must contain at least one letter or digit".to_string(),
            ));
        }
        if is_reserved(&slug) {
            return Err(AppError::Validation(format!("'{slug}' is a reserved slug")));
        }
        input.config.validate().map_err(AppError::Validation)?;

        let config = serde_json::to_value(&input.config)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode page config: {e}")))?;

        let saved = self
            .upsert(user_id, &slug, input.title, input.description, config)
            .await
            .map_err(|e| {
                tracing::error!("Error saving page '{slug}' for user {user_id}: {e:?}");
                if is_unique_violation(&e) {
                    AppError::Conflict("Slug is already taken".to_string())
                } else {
                    AppError::ServerError("Failed to save page".to_string())
                }
            })?;

        self.invalidate(&slug).await;
        tracing::info!("User {user_id} published page '{slug}'");
        Ok(saved)
    }

    async fn upsert(
        &self,
        user_id: i32,
        slug: &str,
        title: Option<String>,
        description: Option<String>,
        config: serde_json::Value,
    ) -> Result<PageModel, DbErr> {
        let now = chrono::Utc::now().naive_utc();

        let existing = Page::find()
            .filter(page::Column::UserId.eq(user_id))
            .filter(page::Column::Slug.eq(slug))
            .one(&self.db)
            .await?;

        match existing {
            Some(existing) => {
                let mut active: page::ActiveModel = existing.into();
                active.title = Set(title);
                active.description = Set(description);
                active.config = Set(config);
                active.is_published = Set(true);
                active.updated_at = Set(now);
                active.update(&self.db).await
            }
            None => {
                page::ActiveModel {
                    user_id: Set(user_id),
                    slug: Set(slug.to_string()),
                    title: Set(title),
                    description: Set(description),
                    config: Set(config),
                    is_published: Set(true),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&self.db)
                .await
            }
        }
    }

    /// Resolve a published page for a public visit.
    pub async fn get_published(&self, raw_slug: &str) -> AppResult<PublishedPage> {
        let slug = normalize_slug(raw_slug);
        let key = page_cache_key(&slug);

        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get::<PublishedPage>(&key).await {
                return Ok(cached);
            }
        }

        let (page, owner) = Page::find()
            .filter(page::Column::Slug.eq(slug.as_str()))
            .find_also_related(User)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if !page.is_published {
            return Err(AppError::NotFound);
        }
        let owner = owner.ok_or(AppError::NotFound)?;

        let config: PageConfig = serde_json::from_value(page.config).map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "Stored config for page '{}' is invalid: {}",
                page.slug,
                e
            ))
        })?;
        let config = config.in_display_order();

        let published = PublishedPage {
            id: page.id,
            meta_title: page
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| format!("{}'s Page", owner.name)),
            meta_description: page
                .description
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| format!("Visit {}'s link in bio page", owner.name)),
            slug: page.slug,
            title: page.title,
            description: page.description,
            theme: config.resolved_theme(),
            config,
            owner: PageOwner {
                id: owner.id,
                name: owner.name,
                image: owner.image,
            },
            created_at: page.created_at,
            updated_at: page.updated_at,
        };

        if let Some(cache) = &self.cache {
            cache.set(&key, &published, CACHE_TTL_PAGE).await;
        }

        Ok(published)
    }

    /// The caller's pages, most recently edited first.
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<PageModel>> {
        Ok(Page::find()
            .filter(page::Column::UserId.eq(user_id))
            .order_by_desc(page::Column::UpdatedAt)
            .all(&self.db)
            .await?)
    }

    async fn invalidate(&self, slug: &str) {
        if let Some(cache) = &self.cache {
            cache.invalidate(&page_cache_key(slug)).await;
        }
    }
}
