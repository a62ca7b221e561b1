use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::category::is_block_tag;
use crate::dom::Attrs;
use crate::error::{EditError, Result};
use crate::hooks::HostHooks;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassNames {
    pub font_family: String,
    pub font_size: String,
    pub color: String,
    pub highlight: String,
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            font_family: "font".to_string(),
            font_size: "size".to_string(),
            color: "color".to_string(),
            highlight: "highlight".to_string(),
        }
    }
}

/// Marks opaque inline tokens: elements of `tag` carrying `type_attribute`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub tag: String,
    pub type_attribute: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            tag: "SPAN".to_string(),
            type_attribute: "sc-type".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    pub block_tag: String,
    pub block_attributes: Attrs,
    /// Attributes for newly created elements, keyed by upper-case tag.
    pub tag_attributes: IndexMap<String, Attrs>,
    pub class_names: ClassNames,
    pub avoid_slashy_replacements: bool,
    pub tab_text: String,
    pub token: Option<TokenConfig>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            block_tag: "DIV".to_string(),
            block_attributes: Attrs::new(),
            tag_attributes: IndexMap::new(),
            class_names: ClassNames::default(),
            avoid_slashy_replacements: false,
            tab_text: "   ".to_string(),
            token: None,
        }
    }
}

impl EditorConfig {
    pub fn with_block_tag(mut self, tag: &str) -> Self {
        self.block_tag = tag.to_string();
        self
    }

    pub fn with_block_attributes(mut self, attrs: Attrs) -> Self {
        self.block_attributes = attrs;
        self
    }

    pub fn with_tag_attributes(mut self, tag: &str, attrs: Attrs) -> Self {
        self.tag_attributes.insert(tag.to_ascii_uppercase(), attrs);
        self
    }

    pub fn with_tab_text(mut self, text: impl Into<String>) -> Self {
        self.tab_text = text.into();
        self
    }

    pub fn with_avoid_slashy_replacements(mut self, avoid: bool) -> Self {
        self.avoid_slashy_replacements = avoid;
        self
    }

    pub fn with_token(mut self, token: TokenConfig) -> Self {
        self.token = Some(token);
        self
    }

    pub fn tag_attributes_for(&self, tag: &str) -> Attrs {
        self.tag_attributes.get(tag).cloned().unwrap_or_default()
    }

    fn normalized(mut self) -> Self {
        self.block_tag = self.block_tag.to_ascii_uppercase();
        self.tag_attributes = self
            .tag_attributes
            .into_iter()
            .map(|(tag, attrs)| (tag.to_ascii_uppercase(), attrs))
            .collect();
        if let Some(token) = self.token.as_mut() {
            token.tag = token.tag.to_ascii_uppercase();
        }
        self
    }

    fn validate(&self) -> Result<()> {
        if !is_block_tag(&self.block_tag) {
            return Err(EditError::InvalidConfig(format!(
                "block tag {:?} is not a block element",
                self.block_tag
            )));
        }
        if let Some(token) = &self.token
            && (token.tag.is_empty() || token.type_attribute.is_empty())
        {
            return Err(EditError::InvalidConfig("token tag and attribute must be set".into()));
        }
        Ok(())
    }

    /// Host overrides on top of the deployment defaults from `hooks`, on top
    /// of the engine defaults.
    pub fn resolve(hooks: &dyn HostHooks, overrides: ConfigOverrides) -> Result<Self> {
        let config = overrides
            .apply(hooks.make_config(EditorConfig::default()))
            .normalized();
        config.validate()?;
        Ok(config)
    }
}

/// Host-supplied settings; every field left out keeps the lower layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    pub block_tag: Option<String>,
    pub block_attributes: Option<Attrs>,
    pub tag_attributes: Option<IndexMap<String, Attrs>>,
    pub class_names: Option<ClassNames>,
    pub avoid_slashy_replacements: Option<bool>,
    pub tab_text: Option<String>,
    pub token: Option<TokenConfig>,
}

impl ConfigOverrides {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn apply(self, mut base: EditorConfig) -> EditorConfig {
        if let Some(tag) = self.block_tag {
            base.block_tag = tag;
        }
        if let Some(attrs) = self.block_attributes {
            base.block_attributes = attrs;
        }
        if let Some(tag_attributes) = self.tag_attributes {
            base.tag_attributes.extend(tag_attributes);
        }
        if let Some(class_names) = self.class_names {
            base.class_names = class_names;
        }
        if let Some(avoid) = self.avoid_slashy_replacements {
            base.avoid_slashy_replacements = avoid;
        }
        if let Some(text) = self.tab_text {
            base.tab_text = text;
        }
        if let Some(token) = self.token {
            base.token = Some(token);
        }
        base
    }
}
