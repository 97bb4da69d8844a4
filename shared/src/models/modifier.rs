//! Modifier Group / Option Models
//!
//! Groups are tenant-wide templates. Items bind to a group and may switch
//! individual options off; a group edit rewrites the options for every
//! bound item.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Selection semantics of a modifier group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum ModifierGroupType {
    /// Pick one
    Single,
    /// Pick several
    Multiple,
    /// On/off toggle (one option)
    Boolean,
}

impl ModifierGroupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multiple => "multiple",
            Self::Boolean => "boolean",
        }
    }

    /// Single and boolean groups never allow more than one selection
    pub fn forces_single_selection(&self) -> bool {
        matches!(self, Self::Single | Self::Boolean)
    }
}

/// One choice within a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierOption {
    pub id: i64,
    pub group_id: String,
    pub label: String,
    /// Signed price delta added per unit
    pub price_modifier: Decimal,
    pub is_default: bool,
    pub position: i32,
}

/// Modifier group with its options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierGroup {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub group_type: ModifierGroupType,
    pub required: bool,
    pub min_selections: i32,
    /// `None` = unbounded
    pub max_selections: Option<i32>,
    pub position: i32,
    pub options: Vec<ModifierOption>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierOptionInput {
    pub label: String,
    #[serde(default)]
    pub price_modifier: Decimal,
    #[serde(default)]
    pub is_default: bool,
}

/// Create modifier group payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierGroupCreate {
    /// Optional caller-chosen slug; generated from the name otherwise
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub group_type: ModifierGroupType,
    #[serde(default)]
    pub required: bool,
    pub min_selections: Option<i32>,
    pub max_selections: Option<i32>,
    pub position: Option<i32>,
    #[serde(default)]
    pub options: Vec<ModifierOptionInput>,
}

/// Update modifier group payload
///
/// `options`, when present, replaces every option of the group (fresh ids)
/// for all items bound to it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModifierGroupUpdate {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub group_type: Option<ModifierGroupType>,
    pub required: Option<bool>,
    pub min_selections: Option<i32>,
    /// `Some(None)` clears the upper bound
    #[serde(default, with = "super::double_option")]
    pub max_selections: Option<Option<i32>>,
    pub position: Option<i32>,
    pub options: Option<Vec<ModifierOptionInput>>,
    /// Must be `true` when the group is bound to any item
    #[serde(default)]
    pub acknowledge_shared_edit: bool,
}

/// Selection rules after normalisation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRules {
    pub required: bool,
    pub min_selections: i32,
    pub max_selections: Option<i32>,
}

impl SelectionRules {
    /// Normalise and validate cardinality rules for a group type.
    ///
    /// Single/boolean force `max = 1`; `required` lifts `min` to at least 1.
    pub fn normalize(
        group_type: ModifierGroupType,
        required: bool,
        min_selections: Option<i32>,
        max_selections: Option<i32>,
    ) -> Result<Self, String> {
        let mut min = min_selections.unwrap_or(0);
        if min < 0 {
            return Err("min_selections must not be negative".to_string());
        }
        if required && min < 1 {
            min = 1;
        }
        let max = if group_type.forces_single_selection() {
            Some(1)
        } else {
            max_selections
        };
        if let Some(max) = max {
            if max < 1 {
                return Err("max_selections must be at least 1".to_string());
            }
            if min > max {
                return Err(format!(
                    "min_selections ({min}) exceeds max_selections ({max})"
                ));
            }
        }
        Ok(Self {
            required,
            min_selections: min,
            max_selections: max,
        })
    }
}

/// Items that would be affected by editing a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupUsage {
    pub group_id: String,
    pub bound_item_count: usize,
    pub bound_item_names: Vec<String>,
}

/// Option as seen through one item's binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundModifierOption {
    #[serde(flatten)]
    pub option: ModifierOption,
    pub enabled: bool,
}

/// Binding listing entry for the admin editor (all options, with flags)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemModifierBinding {
    pub group_id: String,
    pub group_name: String,
    #[serde(rename = "type")]
    pub group_type: ModifierGroupType,
    pub position: i32,
    pub options: Vec<BoundModifierOption>,
}

/// Assembled group for an item: only the options enabled for that item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundModifierGroup {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub group_type: ModifierGroupType,
    pub required: bool,
    pub min_selections: i32,
    pub max_selections: Option<i32>,
    /// Binding position on the item
    pub position: i32,
    pub options: Vec<ModifierOption>,
}

/// PUT /menu-items/{id}/modifier-groups body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierAssignment {
    pub group_ids: Vec<String>,
}

/// PUT /menu-items/{id}/modifier-options/{option_id} body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionEnablement {
    pub enabled: bool,
}
