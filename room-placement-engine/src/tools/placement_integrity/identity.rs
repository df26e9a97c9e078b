//! Instance identifiers and furniture type tags.
//!
//! Instance ids have the form `{original_store_id}_{uuid-v4}` and custom
//! furniture type tags the form `custom_{original_store_id}`. The catalog id
//! is recovered by string decomposition alone, so store ids containing `_`
//! only round-trip up to their first underscore.

use constants::placement::{CUSTOM_TYPE_PREFIX, INSTANCE_ID_SEPARATOR};
use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

static UUID_V4: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("uuid v4 pattern compiles")
});

pub fn generate_instance_id(original_store_id: &str) -> String {
    format!(
        "{}{}{}",
        original_store_id,
        INSTANCE_ID_SEPARATOR,
        Uuid::new_v4()
    )
}

/// Prefix before the first separator. Not the full store id when the store id
/// itself contains `_`.
pub fn extract_original_store_id(instance_id: &str) -> String {
    instance_id
        .split(INSTANCE_ID_SEPARATOR)
        .next()
        .unwrap_or_default()
        .to_string()
}

pub fn is_valid_instance_id(id: &str) -> bool {
    match id.split_once(INSTANCE_ID_SEPARATOR) {
        Some((_, suffix)) => UUID_V4.is_match(suffix),
        None => false,
    }
}

pub fn generate_furniture_type_tag(original_store_id: &str) -> String {
    format!("{CUSTOM_TYPE_PREFIX}{original_store_id}")
}

/// Strips the custom prefix; tags without it are returned unchanged.
pub fn extract_store_id_from_type_tag(tag: &str) -> String {
    tag.strip_prefix(CUSTOM_TYPE_PREFIX).unwrap_or(tag).to_string()
}

pub fn is_custom_type_tag(tag: &str) -> bool {
    tag.strip_prefix(CUSTOM_TYPE_PREFIX)
        .is_some_and(|rest| !rest.is_empty())
}

/// Classification of a type tag used by the placement factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FurnitureType {
    BuiltIn(String),
    Custom { store_id: String },
}

impl FurnitureType {
    pub fn classify(tag: &str) -> Self {
        if is_custom_type_tag(tag) {
            Self::Custom {
                store_id: extract_store_id_from_type_tag(tag),
            }
        } else {
            Self::BuiltIn(tag.to_string())
        }
    }

    pub fn tag(&self) -> String {
        match self {
            Self::BuiltIn(tag) => tag.clone(),
            Self::Custom { store_id } => generate_furniture_type_tag(store_id),
        }
    }
}
