use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::ids::CoachId;

const STAFF_RULES: [Rule; 2] = [Rule::ViewAllCoaches, Rule::MarkAttendance];
const TRAINER_RULES: [Rule; 1] = [Rule::MarkAttendance];
const MEMBER_RULES: [Rule; 1] = [Rule::ViewAllCoaches];

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Rights {
    full: bool,
    rights: Vec<Rule>,
}

impl Rights {
    pub fn full() -> Self {
        Rights {
            full: true,
            rights: vec![],
        }
    }

    pub fn for_role(role: Role) -> Self {
        let rules: &[Rule] = match role {
            Role::Admin => return Rights::full(),
            Role::Staff => &STAFF_RULES,
            Role::Trainer => &TRAINER_RULES,
            Role::Member => &MEMBER_RULES,
        };
        Rights {
            full: false,
            rights: rules.to_vec(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.full
    }

    pub fn has_rule(&self, rule: Rule) -> bool {
        if self.full {
            return true;
        }
        self.rights.contains(&rule)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Sees sessions of every coach. Without it the calendar is hard-scoped
    /// to the viewer's own sessions.
    ViewAllCoaches,
    MarkAttendance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    Trainer,
    Member,
}

#[derive(Debug, Clone)]
pub struct Viewer {
    pub id: i64,
    pub role: Role,
    rights: Rights,
}

impl Viewer {
    pub fn new(id: i64, role: Role) -> Self {
        Viewer {
            id,
            role,
            rights: Rights::for_role(role),
        }
    }

    pub fn admin() -> Self {
        Viewer::new(0, Role::Admin)
    }

    pub fn trainer(coach: CoachId) -> Self {
        Viewer::new(coach.0, Role::Trainer)
    }

    pub fn rights(&self) -> &Rights {
        &self.rights
    }

    pub fn has_rule(&self, rule: Rule) -> bool {
        self.rights.has_rule(rule)
    }

    /// The coach every visible session must belong to, if the viewer is
    /// scoped to a single coach.
    pub fn scoped_coach(&self) -> Option<CoachId> {
        if self.has_rule(Rule::ViewAllCoaches) {
            None
        } else {
            Some(CoachId(self.id))
        }
    }

    pub fn is_trainer(&self) -> bool {
        self.role == Role::Trainer
    }
}
