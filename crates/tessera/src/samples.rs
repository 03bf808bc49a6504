//! Built-in example diagrams and insert templates.

use std::{fmt, str::FromStr};

use rand::{Rng, seq::IndexedRandom};

use tessera_core::kind::{DiagramKind, ParseKindError};

/// Kinds that ship with an example and a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleKind {
    Flowchart,
    Sequence,
    Class,
    Pie,
    Gantt,
}

impl SampleKind {
    pub const ALL: [SampleKind; 5] = [
        Self::Flowchart,
        Self::Sequence,
        Self::Class,
        Self::Pie,
        Self::Gantt,
    ];

    pub fn kind(self) -> DiagramKind {
        match self {
            Self::Flowchart => DiagramKind::Flowchart,
            Self::Sequence => DiagramKind::Sequence,
            Self::Class => DiagramKind::Class,
            Self::Pie => DiagramKind::Pie,
            Self::Gantt => DiagramKind::Gantt,
        }
    }

    /// A complete example diagram.
    pub fn example(self) -> &'static str {
        match self {
            Self::Flowchart => FLOWCHART_EXAMPLE,
            Self::Sequence => SEQUENCE_EXAMPLE,
            Self::Class => CLASS_EXAMPLE,
            Self::Pie => PIE_EXAMPLE,
            Self::Gantt => GANTT_EXAMPLE,
        }
    }

    /// A short skeleton to start from.
    pub fn template(self) -> &'static str {
        match self {
            Self::Flowchart => FLOWCHART_TEMPLATE,
            Self::Sequence => SEQUENCE_TEMPLATE,
            Self::Class => CLASS_TEMPLATE,
            Self::Pie => PIE_TEMPLATE,
            Self::Gantt => GANTT_TEMPLATE,
        }
    }

    /// Picks a kind uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        *Self::ALL
            .choose(rng)
            .unwrap_or(&Self::Flowchart)
    }
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind(), f)
    }
}

impl TryFrom<DiagramKind> for SampleKind {
    type Error = ParseKindError;

    fn try_from(kind: DiagramKind) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|sample| sample.kind() == kind)
            .ok_or_else(|| ParseKindError(kind.to_string()))
    }
}

impl FromStr for SampleKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<DiagramKind>()?.try_into()
    }
}

const FLOWCHART_EXAMPLE: &str = "graph TD
    A[Start] --> B{Is it working?}
    B -->|Yes| C[Process Successfully]
    B -->|No| D[Debug Issue]
    C --> E[End]
    D --> F[Fix Problem]
    F --> B";

const SEQUENCE_EXAMPLE: &str = "sequenceDiagram
    participant User
    participant Frontend
    participant Backend
    participant Database

    User->>Frontend: Submit Request
    Frontend->>Backend: API Call
    Backend->>Database: Query Data
    Database-->>Backend: Return Data
    Backend-->>Frontend: JSON Response
    Frontend-->>User: Display Results";

const CLASS_EXAMPLE: &str = "classDiagram
    class Animal {
        +String name
        +int age
        +void eat()
        +void sleep()
    }

    class Dog {
        +String breed
        +void bark()
    }

    class Cat {
        +String color
        +void meow()
    }

    Animal <|-- Dog
    Animal <|-- Cat";

const PIE_EXAMPLE: &str = r#"pie title Programming Languages Used
    "JavaScript" : 40
    "Python" : 25
    "Java" : 15
    "C++" : 10
    "Other" : 10"#;

const GANTT_EXAMPLE: &str = "gantt
    title Project Timeline
    dateFormat  YYYY-MM-DD
    section Design
    Research     :active, 2024-01-01, 30d
    Mockups      :2024-01-15, 20d
    section Development
    Frontend     :2024-02-01, 45d
    Backend      :2024-02-10, 40d
    section Testing
    Unit Tests   :2024-03-15, 20d
    Integration  :2024-03-25, 15d";

const FLOWCHART_TEMPLATE: &str = "graph TD
    A[Start] --> B{Decision}
    B -->|Yes| C[Action 1]
    B -->|No| D[Action 2]
    C --> E[End]
    D --> E";

const SEQUENCE_TEMPLATE: &str = "sequenceDiagram
    participant A as Client
    participant B as Server
    A->>B: Request
    B-->>A: Response";

const CLASS_TEMPLATE: &str = "classDiagram
    class ClassName {
        +attribute: type
        +method(): returnType
    }";

const PIE_TEMPLATE: &str = r#"pie title Title
    "Label 1" : 30
    "Label 2" : 20
    "Label 3" : 50"#;

const GANTT_TEMPLATE: &str = "gantt
    title Title
    dateFormat  YYYY-MM-DD
    section Section
    Task :a1, 2024-01-01, 30d";

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use tessera_classify::detect;

    use super::*;

    #[test]
    fn test_examples_and_templates_detect_as_their_kind() {
        for sample in SampleKind::ALL {
            assert_eq!(detect(sample.example()), sample.kind(), "{sample} example");
            assert_eq!(detect(sample.template()), sample.kind(), "{sample} template");
        }
    }

    #[test]
    fn test_parse_sample_kind() {
        assert_eq!("pie".parse::<SampleKind>(), Ok(SampleKind::Pie));
        assert_eq!("Gantt".parse::<SampleKind>(), Ok(SampleKind::Gantt));
        assert!("state".parse::<SampleKind>().is_err());
        assert!("nonsense".parse::<SampleKind>().is_err());
    }

    #[test]
    fn test_random_selection_covers_every_kind() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(SampleKind::random(&mut rng));
        }
        assert_eq!(seen.len(), SampleKind::ALL.len());
    }
}
