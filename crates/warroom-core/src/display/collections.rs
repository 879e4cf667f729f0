//! Collection wrapper types.

use std::fmt;

use crate::models::{AutocompleteItem, Playbook};

/// A team's playbooks as a compact list.
pub struct Playbooks(pub Vec<Playbook>);

impl fmt::Display for Playbooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No playbooks found.");
        }
        for playbook in &self.0 {
            let visibility = if playbook.create_public_playbook_run {
                "public"
            } else {
                "private"
            };
            writeln!(
                f,
                "- **{}** `{}` ({visibility}, {} members)",
                playbook.title,
                playbook.id,
                playbook.member_ids.len()
            )?;
        }
        Ok(())
    }
}

/// Checklist autocomplete suggestions.
pub struct AutocompleteItems(pub Vec<AutocompleteItem>);

impl fmt::Display for AutocompleteItems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No checklist items.");
        }
        for item in &self.0 {
            writeln!(f, "- `{}` {}: {}", item.item, item.hint, item.help_text)?;
        }
        Ok(())
    }
}
