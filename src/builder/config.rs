use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Most components a single page may hold.
pub const MAX_COMPONENTS: usize = 3;

pub const DEFAULT_BACKGROUND_COLOR: &str = "bg-background";
pub const DEFAULT_TEXT_COLOR: &str = "text-foreground";
pub const DEFAULT_BUTTON_COLOR: &str = "bg-primary";
pub const DEFAULT_BUTTON_TEXT_COLOR: &str = "text-primary-foreground";
pub const DEFAULT_FONT_FAMILY: &str = "inherit";

/// The document stored in `pages.config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    pub profile: Profile,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    pub order: u32,
    #[serde(flatten)]
    pub content: ComponentContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Link,
    Video,
    Social,
    Text,
    Image,
    Button,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    Twitter,
    Instagram,
    Linkedin,
    Github,
    Youtube,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSize {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonVariant {
    Primary,
    Secondary,
    Outline,
}

/// Type-specific fields, tagged by `type` in the stored JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ComponentContent {
    Link {
        title: String,
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
    },
    Video {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    Social {
        platform: SocialPlatform,
        username: String,
    },
    Text {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        size: Option<TextSize>,
    },
    Image {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<u32>,
    },
    Button {
        text: String,
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        variant: Option<ButtonVariant>,
    },
}

impl ComponentContent {
    /// Content a freshly added component of `kind` starts with.
    pub fn placeholder(kind: ComponentType) -> Self {
        match kind {
            ComponentType::Link => Self::Link {
                title: "Link".to_string(),
                url: "https://www.google.com".to_string(),
                icon: None,
            },
            ComponentType::Video => Self::Video {
                url: String::new(),
                title: Some(String::new()),
            },
            ComponentType::Social => Self::Social {
                platform: SocialPlatform::Twitter,
                username: String::new(),
            },
            ComponentType::Text => Self::Text {
                content: String::new(),
                size: Some(TextSize::Medium),
            },
            ComponentType::Image => Self::Image {
                url: String::new(),
                alt: Some(String::new()),
                width: None,
                height: None,
            },
            ComponentType::Button => Self::Button {
                text: String::new(),
                url: String::new(),
                variant: Some(ButtonVariant::Primary),
            },
        }
    }

    pub fn component_type(&self) -> ComponentType {
        match self {
            Self::Link { .. } => ComponentType::Link,
            Self::Video { .. } => ComponentType::Video,
            Self::Social { .. } => ComponentType::Social,
            Self::Text { .. } => ComponentType::Text,
            Self::Image { .. } => ComponentType::Image,
            Self::Button { .. } => ComponentType::Button,
        }
    }
}

/// Optional per-page overrides. Unset fields fall back to the defaults above.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTheme {
    pub background_color: String,
    pub text_color: String,
    pub button_color: String,
    pub button_text_color: String,
    pub font_family: String,
}

impl ResolvedTheme {
    pub fn resolve(theme: Option<&Theme>) -> Self {
        let pick = |value: Option<&String>, default: &str| {
            value
                .filter(|v| !v.trim().is_empty())
                .cloned()
                .unwrap_or_else(|| default.to_string())
        };
        let theme = theme.cloned().unwrap_or_default();

        Self {
            background_color: pick(theme.background_color.as_ref(), DEFAULT_BACKGROUND_COLOR),
            text_color: pick(theme.text_color.as_ref(), DEFAULT_TEXT_COLOR),
            button_color: pick(theme.button_color.as_ref(), DEFAULT_BUTTON_COLOR),
            button_text_color: pick(theme.button_text_color.as_ref(), DEFAULT_BUTTON_TEXT_COLOR),
            font_family: pick(theme.font_family.as_ref(), DEFAULT_FONT_FAMILY),
        }
    }
}

impl PageConfig {
    /// Structural checks applied before a document is persisted.
    pub fn validate(&self) -> Result<(), String> {
        if self.components.len() > MAX_COMPONENTS {
            return Err(format!(
                "A page can hold at most {} components",
                MAX_COMPONENTS
            ));
        }

        let mut seen = HashSet::new();
        for component in &self.components {
            if component.id.trim().is_empty() {
                return Err("Component id must not be empty".to_string());
            }
            if !seen.insert(component.id.as_str()) {
                return Err(format!("Duplicate component id '{}'", component.id));
            }
        }
        Ok(())
    }

    /// Components sorted by their `order` field, ties kept in list order.
    pub fn in_display_order(mut self) -> Self {
        self.components.sort_by_key(|c| c.order);
        self
    }

    pub fn resolved_theme(&self) -> ResolvedTheme {
        ResolvedTheme::resolve(self.theme.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "profile": { "name": "Jane", "bio": "hi" },
            "components": [
                { "id": "b", "type": "button", "order": 2, "text": "Go", "url": "https://x.io", "variant": "outline" },
                { "id": "a", "type": "social", "order": 0, "platform": "github", "username": "jane" },
                { "id": "c", "type": "image", "order": 1, "url": "https://x.io/i.png", "width": 320 }
            ],
            "theme": { "textColor": "#fff" }
        })
    }

    #[test]
    fn parses_stored_document() {
        let config: PageConfig = serde_json::from_value(sample()).unwrap();
        assert_eq!(config.profile.name, "Jane");
        assert_eq!(config.components.len(), 3);
        assert_eq!(
            config.components[1].content,
            ComponentContent::Social {
                platform: SocialPlatform::Github,
                username: "jane".to_string()
            }
        );
        match &config.components[2].content {
            ComponentContent::Image { width, height, alt, .. } => {
                assert_eq!(*width, Some(320));
                assert_eq!(*height, None);
                assert_eq!(*alt, None);
            }
            other => panic!("unexpected content {other:?}"),
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn serializes_with_type_tag_and_camel_case_theme() {
        let config: PageConfig = serde_json::from_value(sample()).unwrap();
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["components"][0]["type"], "button");
        assert_eq!(value["components"][0]["id"], "b");
        assert_eq!(value["theme"]["textColor"], "#fff");
        assert!(value["theme"].get("backgroundColor").is_none());
    }

    #[test]
    fn rejects_unknown_platform() {
        let mut doc = sample();
        doc["components"][1]["platform"] = json!("myspace");
        assert!(serde_json::from_value::<PageConfig>(doc).is_err());
    }

    #[test]
    fn validate_caps_component_count() {
        let mut config: PageConfig = serde_json::from_value(sample()).unwrap();
        let mut extra = config.components[0].clone();
        extra.id = "d".to_string();
        config.components.push(extra);
        assert!(config.validate().unwrap_err().contains("at most 3"));
    }

    #[test]
    fn validate_rejects_duplicate_ids() {
        let mut config: PageConfig = serde_json::from_value(sample()).unwrap();
        config.components[1].id = "b".to_string();
        assert!(config.validate().unwrap_err().contains("Duplicate"));
    }

    #[test]
    fn display_order_sorts_by_order_field() {
        let config: PageConfig = serde_json::from_value(sample()).unwrap();
        let ids: Vec<_> = config
            .in_display_order()
            .components
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, ["a", "c", "b"]);
    }

    #[test]
    fn theme_falls_back_per_field() {
        let config: PageConfig = serde_json::from_value(sample()).unwrap();
        let theme = config.resolved_theme();
        assert_eq!(theme.text_color, "#fff");
        assert_eq!(theme.background_color, DEFAULT_BACKGROUND_COLOR);
        assert_eq!(theme.button_color, DEFAULT_BUTTON_COLOR);
        assert_eq!(theme.button_text_color, DEFAULT_BUTTON_TEXT_COLOR);
        assert_eq!(theme.font_family, DEFAULT_FONT_FAMILY);

        let bare = ResolvedTheme::resolve(None);
        assert_eq!(bare.text_color, DEFAULT_TEXT_COLOR);
    }

    #[test]
    fn placeholder_matches_requested_type() {
        for kind in [
            ComponentType::Link,
            ComponentType::Video,
            ComponentType::Social,
            ComponentType::Text,
            ComponentType::Image,
            ComponentType::Button,
        ] {
            assert_eq!(ComponentContent::placeholder(kind).component_type(), kind);
        }
    }
}
