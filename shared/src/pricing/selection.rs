use crate::models::BoundModifierGroup;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What is wrong with the selection for one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionViolation {
    /// Required group with nothing selected
    Required,
    TooFew { min: i32, selected: usize },
    TooMany { max: i32, selected: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionError {
    pub group_id: String,
    pub group_name: String,
    #[serde(flatten)]
    pub violation: SelectionViolation,
}

/// Check a selection against each bound group's cardinality rules.
///
/// Ids that match no enabled option of a bound group are skipped, same as
/// in pricing. Returns every violation, one per offending group.
pub fn validate_selection(
    groups: &[BoundModifierGroup],
    selected_option_ids: &[i64],
) -> Result<(), Vec<SelectionError>> {
    let owner: HashMap<i64, usize> = groups
        .iter()
        .enumerate()
        .flat_map(|(idx, group)| group.options.iter().map(move |o| (o.id, idx)))
        .collect();

    let mut counts = vec![0usize; groups.len()];
    for id in selected_option_ids {
        if let Some(idx) = owner.get(id) {
            counts[*idx] += 1;
        }
    }

    let errors: Vec<SelectionError> = groups
        .iter()
        .zip(counts)
        .filter_map(|(group, selected)| {
            violation_for(group, selected).map(|violation| SelectionError {
                group_id: group.id.clone(),
                group_name: group.name.clone(),
                violation,
            })
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn violation_for(group: &BoundModifierGroup, selected: usize) -> Option<SelectionViolation> {
    if group.required && selected == 0 {
        return Some(SelectionViolation::Required);
    }
    let min = group.min_selections.max(0) as usize;
    // Optional groups may be left empty; min applies once something is picked
    if selected > 0 && selected < min {
        return Some(SelectionViolation::TooFew {
            min: group.min_selections,
            selected,
        });
    }
    let max = if group.group_type.forces_single_selection() {
        Some(1)
    } else {
        group.max_selections
    };
    match max {
        Some(max) if selected > max.max(0) as usize => {
            Some(SelectionViolation::TooMany { max, selected })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ModifierGroupType, ModifierOption};
    use rust_decimal::Decimal;

    fn group(
        id: &str,
        group_type: ModifierGroupType,
        required: bool,
        min: i32,
        max: Option<i32>,
        option_ids: &[i64],
    ) -> BoundModifierGroup {
        BoundModifierGroup {
            id: id.to_string(),
            name: id.to_uppercase(),
            group_type,
            required,
            min_selections: min,
            max_selections: max,
            position: 0,
            options: option_ids
                .iter()
                .map(|oid| ModifierOption {
                    id: *oid,
                    group_id: id.to_string(),
                    label: format!("opt-{oid}"),
                    price_modifier: Decimal::ZERO,
                    is_default: false,
                    position: 0,
                })
                .collect(),
        }
    }

    #[test]
    fn required_single_group_needs_one() {
        let groups = [group("milk", ModifierGroupType::Single, true, 1, Some(1), &[1, 2])];
        let errors = validate_selection(&groups, &[]).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].group_id, "milk");
        assert_eq!(errors[0].violation, SelectionViolation::Required);

        assert!(validate_selection(&groups, &[2]).is_ok());
    }

    #[test]
    fn single_group_rejects_two_picks() {
        // max stored as None still means one for single groups
        let groups = [group("milk", ModifierGroupType::Single, false, 0, None, &[1, 2])];
        let errors = validate_selection(&groups, &[1, 2]).unwrap_err();
        assert_eq!(
            errors[0].violation,
            SelectionViolation::TooMany { max: 1, selected: 2 }
        );
    }

    #[test]
    fn multiple_group_bounds() {
        let groups = [group(
            "extras",
            ModifierGroupType::Multiple,
            false,
            2,
            Some(3),
            &[10, 11, 12, 13],
        )];
        assert!(validate_selection(&groups, &[]).is_ok());
        assert_eq!(
            validate_selection(&groups, &[10]).unwrap_err()[0].violation,
            SelectionViolation::TooFew { min: 2, selected: 1 }
        );
        assert!(validate_selection(&groups, &[10, 11]).is_ok());
        assert_eq!(
            validate_selection(&groups, &[10, 11, 12, 13]).unwrap_err()[0].violation,
            SelectionViolation::TooMany { max: 3, selected: 4 }
        );
    }

    #[test]
    fn unknown_ids_are_skipped_and_all_groups_reported() {
        let groups = [
            group("milk", ModifierGroupType::Single, true, 1, Some(1), &[1, 2]),
            group("ice", ModifierGroupType::Boolean, true, 1, Some(1), &[5]),
        ];
        let errors = validate_selection(&groups, &[999]).unwrap_err();
        let ids: Vec<&str> = errors.iter().map(|e| e.group_id.as_str()).collect();
        assert_eq!(ids, vec!["milk", "ice"]);
    }
}
