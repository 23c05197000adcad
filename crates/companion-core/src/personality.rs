use std::collections::BTreeMap;

use crate::models::PersonalityInfo;

/// Response styles the companion service ships with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Personality {
    CalmMentor,
    WittyFriend,
    Therapist,
    ProfessionalCoach,
    CuriousExplorer,
}

impl Personality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Personality::CalmMentor => "calm_mentor",
            Personality::WittyFriend => "witty_friend",
            Personality::Therapist => "therapist",
            Personality::ProfessionalCoach => "professional_coach",
            Personality::CuriousExplorer => "curious_explorer",
        }
    }

    pub fn all() -> Vec<Personality> {
        vec![
            Personality::CalmMentor,
            Personality::WittyFriend,
            Personality::Therapist,
            Personality::ProfessionalCoach,
            Personality::CuriousExplorer,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Personality::CalmMentor => "Calm Mentor",
            Personality::WittyFriend => "Witty Friend",
            Personality::Therapist => "Therapist",
            Personality::ProfessionalCoach => "Professional Coach",
            Personality::CuriousExplorer => "Curious Explorer",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Personality::CalmMentor => {
                "Wise, patient, and guidance-focused. Speaks with measured wisdom and encourages reflection."
            }
            Personality::WittyFriend => {
                "Casual, humorous, and relatable. Like chatting with a close friend who makes you laugh."
            }
            Personality::Therapist => {
                "Empathetic, reflective, and supportive. Creates a safe space for emotional exploration."
            }
            Personality::ProfessionalCoach => {
                "Direct, goal-oriented, and motivational. Pushes you toward action and results."
            }
            Personality::CuriousExplorer => {
                "Inquisitive, enthusiastic, and discovery-focused. Loves diving deep into ideas."
            }
        }
    }
}

/// An ordered list of selectable personalities, keyed by service id.
///
/// Built from the service's `/api/personalities` answer, or from the built-in
/// set when the service cannot be reached.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    entries: Vec<(String, PersonalityInfo)>,
}

impl Catalog {
    pub fn builtin() -> Self {
        let entries = Personality::all()
            .into_iter()
            .map(|p| {
                (
                    p.as_str().to_string(),
                    PersonalityInfo {
                        name: p.display_name().to_string(),
                        description: p.description().to_string(),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Falls back to the built-in set when the map is empty
    pub fn from_service(map: BTreeMap<String, PersonalityInfo>) -> Self {
        if map.is_empty() {
            return Self::builtin();
        }
        Self {
            entries: map.into_iter().collect(),
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn get(&self, index: usize) -> Option<(&str, &PersonalityInfo)> {
        self.entries.get(index).map(|(id, info)| (id.as_str(), info))
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|(known, _)| known == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Readable name for an id, or the id itself when unknown
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.entries
            .iter()
            .find(|(known, _)| known == id)
            .map(|(_, info)| info.name.as_str())
            .unwrap_or(id)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
