use serde_yaml::{Mapping, Value};

use crate::document::mapping;
use crate::region::{RegionKind, RegionRecord};

use super::{GenerationContext, is_start, start_region, unique_by_key};

pub const ACHIEVEMENT_TYPE: &str = "normal";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementText {
    pub goal: String,
    pub message: String,
    pub display_name: String,
}

/// Goal/message/label for one record. Hearts only vary their label by
/// world, villages not at all; plain regions get an overworld and a nether
/// wording. The start region always gets the arrival wording.
pub fn text_for(record: &RegionRecord, name: &str, is_start: bool) -> AchievementText {
    if is_start {
        return AchievementText {
            goal: format!("Begin your journey in {name}"),
            message: format!("Your journey begins in {name}!"),
            display_name: name.to_string(),
        };
    }
    let overworld = record.uses_overworld_variant();
    match record.kind {
        RegionKind::Heart => {
            let label = if overworld {
                name.to_string()
            } else {
                format!("{name} ({})", record.world.label())
            };
            AchievementText {
                goal: format!("Find the {label}"),
                message: format!("You found the {label}!"),
                display_name: label,
            }
        }
        RegionKind::Village => AchievementText {
            goal: format!("Discover the village of {name}"),
            message: format!("Welcome to the village of {name}!"),
            display_name: name.to_string(),
        },
        RegionKind::Region | RegionKind::System if overworld => AchievementText {
            goal: format!("Discover {name}"),
            message: format!("You discovered {name}!"),
            display_name: name.to_string(),
        },
        RegionKind::Region | RegionKind::System => AchievementText {
            goal: format!("Brave the depths of {name}"),
            message: format!("You survived the trek into {name}!"),
            display_name: name.to_string(),
        },
    }
}

/// The `Commands` section: one entry per qualifying region keyed by its
/// command id.
pub fn generate(ctx: &GenerationContext<'_>) -> Mapping {
    let start = start_region(ctx.regions, ctx.onboarding);

    unique_by_key(ctx.regions, "command", RegionRecord::command_id)
        .into_iter()
        .map(|(command_id, record)| {
            let name = ctx.regions.display_name(record);
            let text = text_for(record, &name, is_start(record, start));
            let entry = mapping([
                ("Goal", Value::from(text.goal)),
                ("Message", Value::from(text.message)),
                ("Name", Value::from(command_id.as_str())),
                ("DisplayName", Value::from(text.display_name)),
                ("Type", Value::from(ACHIEVEMENT_TYPE)),
            ]);
            (Value::from(command_id), Value::Mapping(entry))
        })
        .collect()
}
