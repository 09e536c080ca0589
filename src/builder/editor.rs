use serde::{Deserialize, Serialize};

use super::config::{
    Component, ComponentContent, ComponentType, PageConfig, Profile, Theme, MAX_COMPONENTS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

/// In-memory editing session over a page document. Nothing here touches
/// storage; the result is persisted by saving `into_config()` wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct PageEditor {
    config: PageConfig,
}

impl PageEditor {
    pub fn new(config: PageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn into_config(self) -> PageConfig {
        self.config
    }

    pub fn components(&self) -> &[Component] {
        &self.config.components
    }

    pub fn is_limit_reached(&self) -> bool {
        self.config.components.len() >= MAX_COMPONENTS
    }

    /// Append a placeholder component. Returns `None`, leaving the list
    /// untouched, once the page already holds `MAX_COMPONENTS`.
    pub fn add_component(&mut self, kind: ComponentType) -> Option<&Component> {
        if self.is_limit_reached() {
            return None;
        }

        let component = Component {
            id: uuid::Uuid::new_v4().to_string(),
            order: self.config.components.len() as u32,
            content: ComponentContent::placeholder(kind),
        };
        self.config.components.push(component);
        self.config.components.last()
    }

    /// Edit the content of the component with `id` in place. Its id and
    /// order are not reachable from `edit`.
    pub fn update_component<F>(&mut self, id: &str, edit: F) -> bool
    where
        F: FnOnce(&mut ComponentContent),
    {
        match self.config.components.iter_mut().find(|c| c.id == id) {
            Some(component) => {
                edit(&mut component.content);
                true
            }
            None => false,
        }
    }

    /// Remove by id. Remaining `order` values are left as they were.
    pub fn delete_component(&mut self, id: &str) -> bool {
        let before = self.config.components.len();
        self.config.components.retain(|c| c.id != id);
        self.config.components.len() != before
    }

    /// Swap with the adjacent neighbour, then renumber every component's
    /// `order` to its position. Unknown ids and moves off either end are
    /// no-ops.
    pub fn move_component(&mut self, id: &str, direction: MoveDirection) -> bool {
        let components = &mut self.config.components;
        let Some(current) = components.iter().position(|c| c.id == id) else {
            return false;
        };

        let target = match direction {
            MoveDirection::Up => current.checked_sub(1),
            MoveDirection::Down => Some(current + 1).filter(|i| *i < components.len()),
        };
        let Some(target) = target else {
            return false;
        };

        components.swap(current, target);
        for (index, component) in components.iter_mut().enumerate() {
            component.order = index as u32;
        }
        true
    }

    pub fn update_profile<F>(&mut self, edit: F)
    where
        F: FnOnce(&mut Profile),
    {
        edit(&mut self.config.profile);
    }

    pub fn set_theme(&mut self, theme: Option<Theme>) {
        self.config.theme = theme;
    }
}
