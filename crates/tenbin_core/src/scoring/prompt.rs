//! Scoring prompt construction.

use crate::model::task::{Priority, PriorityScale, TaskType};

/// Builds the prompt sent to the scoring oracle.
///
/// The prompt embeds the category and the raw task text and asks for a
/// single JSON object `{"priority": <integer>}` with nothing around it.
pub fn build_priority_prompt(text: &str, kind: TaskType, scale: PriorityScale) -> String {
    let min = Priority::MIN;
    let max = scale.max;
    let category = match kind {
        TaskType::Work => "work (an obligation)",
        TaskType::Play => "play (leisure)",
    };

    format!(
        "You rate how important a personal task is.\n\
         Category: {category}\n\
         Task: {text}\n\
         \n\
         Weigh these factors:\n\
         - urgency: how soon it must happen\n\
         - impact: what is gained or lost\n\
         - commitment: whether it is booked, reserved or promised to someone\n\
         - relationship capital: whether other people depend on it\n\
         - health and safety\n\
         - replaceability: whether it can easily be done another time\n\
         \n\
         Answer with a single JSON object of the form {{\"priority\": <integer>}} \
         where the integer is between {min} and {max} inclusive and {max} is the most important.\n\
         Do not add any other text.",
        text = text.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::build_priority_prompt;
    use crate::model::task::{PriorityScale, TaskType};

    #[test]
    fn prompt_embeds_text_category_and_range() {
        let prompt = build_priority_prompt("  病院の予約 ", TaskType::Work, PriorityScale::SCORED);
        assert!(prompt.contains("Task: 病院の予約\n"));
        assert!(prompt.contains("Category: work"));
        assert!(prompt.contains("between 1 and 10"));
        assert!(prompt.contains(r#"{"priority": <integer>}"#));
        for factor in [
            "urgency",
            "impact",
            "reserved",
            "relationship capital",
            "health and safety",
            "replaceability",
        ] {
            assert!(prompt.contains(factor), "missing factor {factor}");
        }
    }
}
