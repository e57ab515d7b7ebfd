//! Comprehensive patterns that only run in deep mode
//!
//! These add the material a careful reviewer would ask for after a first
//! read: edge cases, hidden assumptions, domain pitfalls, prerequisites,
//! alternatives and a closing verification pass.

use super::{
    default_applicable, Impact, Pattern, PatternContext, PatternDescriptor, PatternResult, PatternScope,
    ALL_INTENTS,
};
use crate::intent::Intent;
use crate::quality::{self, Dimension};
use crate::utils::text::{self, ListStyle, Section, MIN_SECTION_ITEMS};
use crate::utils::Result;

pub(super) fn patterns() -> Vec<Box<dyn Pattern>> {
    vec![
        Box::new(EdgeCaseIdentifier),
        Box::new(AssumptionExplicitizer),
        Box::new(DomainContextEnricher),
        Box::new(PrerequisiteIdentifier),
        Box::new(AlternativeApproaches),
        Box::new(CompletenessValidator),
        Box::new(ValidationChecklist),
    ]
}

// ==================== Edge Case Identifier ====================

/// Lists boundary conditions for the request.
///
/// Skips when the current text already discusses edge cases. The
/// request-specific items are keyed to [`PatternContext::original_prompt`],
/// so wording appended by earlier patterns does not trigger them.
pub struct EdgeCaseIdentifier;

static EDGE_CASE_IDENTIFIER: PatternDescriptor = PatternDescriptor {
    id: "edge-case-identifier",
    name: "Edge Case Identifier",
    description: "Lists boundary conditions and failure cases suggested by the request",
    intents: &[
        Intent::CodeGeneration,
        Intent::Testing,
        Intent::Debugging,
        Intent::Refinement,
    ],
    scope: PatternScope::Deep,
    priority: 7,
};

const EDGE_CASE_MARKERS: &[&str] = &["edge case", "edge cases", "corner case", "corner cases"];

const BASE_EDGE_CASES: &[&str] = &[
    "Empty, missing or null input",
    "Maximum sizes and boundary values",
    "Invalid or malformed input",
];

/// Keyword triggers for request-specific edge cases
const TRIGGERED_EDGE_CASES: &[(&[&str], &str)] = &[
    (&["concurrent", "parallel", "async", "thread", "threads"], "Concurrent access and race conditions"),
    (&["network", "api", "http", "request", "fetch"], "Network failures, timeouts and retries"),
    (&["file", "files", "upload", "disk"], "Missing files, permission errors and partial writes"),
    (&["date", "dates", "time", "timezone", "schedule"], "Time zones, daylight saving changes and leap years"),
    (&["user", "users", "login", "auth", "account"], "Unauthenticated users and expired sessions"),
    (&["text", "string", "strings", "name", "names", "unicode"], "Unicode, very long strings and special characters"),
    (&["payment", "payments", "money", "price", "currency"], "Rounding, currency precision and duplicate charges"),
    (&["list", "array", "collection", "pagination", "results"], "Single-element and very large collections"),
];

impl Pattern for EdgeCaseIdentifier {
    fn descriptor(&self) -> &'static PatternDescriptor {
        &EDGE_CASE_IDENTIFIER
    }

    fn apply(&self, current: &str, ctx: &PatternContext<'_>) -> Result<PatternResult> {
        let lower = current.to_lowercase();
        if text::has_heading_about(current, &["edge cases"]) || text::contains_any(&lower, EDGE_CASE_MARKERS) {
            return Ok(PatternResult::unchanged(current, Dimension::Completeness, "Edge cases already covered"));
        }

        let request = ctx.original_prompt.to_lowercase();
        let triggered: Vec<&str> = TRIGGERED_EDGE_CASES
            .iter()
            .filter(|(keywords, _)| text::contains_any(&request, keywords))
            .map(|(_, item)| *item)
            .collect();

        let specific = triggered.len();
        let section = Section::new("Edge Cases to Consider", ListStyle::Bullet)
            .items(BASE_EDGE_CASES.iter().copied())
            .items(triggered);

        Ok(PatternResult::appended(
            current,
            &section,
            Dimension::Completeness,
            format!("Listed edge cases ({} specific to the request)", specific),
            if specific > 0 { Impact::High } else { Impact::Medium },
        ))
    }
}

// ==================== Assumption Explicitizer ====================

/// Surfaces the assumptions an implementer would otherwise make silently
pub struct AssumptionExplicitizer;

static ASSUMPTION_EXPLICITIZER: PatternDescriptor = PatternDescriptor {
    id: "assumption-explicitizer",
    name: "Assumption Explicitizer",
    description: "States the implicit assumptions so they can be confirmed or corrected",
    intents: &[
        Intent::CodeGeneration,
        Intent::Planning,
        Intent::PrdGeneration,
        Intent::Migration,
        Intent::SecurityReview,
    ],
    scope: PatternScope::Deep,
    priority: 6,
};

const ASSUMPTION_MARKERS: &[&str] = &["assume", "assuming", "assumption", "assumptions"];

impl Pattern for AssumptionExplicitizer {
    fn descriptor(&self) -> &'static PatternDescriptor {
        &ASSUMPTION_EXPLICITIZER
    }

    fn apply(&self, current: &str, ctx: &PatternContext<'_>) -> Result<PatternResult> {
        let lower = current.to_lowercase();
        if text::has_heading_about(current, &["assumptions"]) || text::contains_any(&lower, ASSUMPTION_MARKERS) {
            return Ok(PatternResult::unchanged(current, Dimension::Clarity, "Assumptions already stated"));
        }

        let mut section = Section::new("Assumptions to Confirm", ListStyle::Bullet)
            .item("Existing code and conventions are followed unless stated otherwise")
            .item("Behavior outside the requested change stays as it is");

        section = match ctx.intent.primary_intent {
            Intent::Planning | Intent::PrdGeneration => section
                .item("Team size, budget and timeline are open until confirmed")
                .item("The first release targets a single platform"),
            Intent::Migration => section
                .item("Downtime during the switch is not acceptable")
                .item("Source and target can run at the same time"),
            Intent::SecurityReview => section
                .item("The review covers application code, not infrastructure")
                .item("Findings are reported, not fixed, unless asked"),
            _ => section.item("Runtime and library versions match the current project"),
        };

        if !ctx.intent.characteristics.has_technical_terms {
            section = section.item("The technology stack is chosen to fit the existing project");
        }

        Ok(PatternResult::appended(
            current,
            &section,
            Dimension::Clarity,
            "Made implicit assumptions explicit",
            Impact::Medium,
        ))
    }
}

// ==================== Domain Context Enricher ====================

/// Adds well-known pitfalls for the business domains the request touches
///
/// Domains are detected in [`PatternContext::original_prompt`]; only the
/// section heading is looked up in the current text.
pub struct DomainContextEnricher;

static DOMAIN_CONTEXT_ENRICHER: PatternDescriptor = PatternDescriptor {
    id: "domain-context-enricher",
    name: "Domain Context Enricher",
    description: "Adds domain-specific pitfalls for authentication, payments, APIs and similar areas",
    intents: &[
        Intent::CodeGeneration,
        Intent::Planning,
        Intent::PrdGeneration,
        Intent::SecurityReview,
    ],
    scope: PatternScope::Deep,
    priority: 6,
};

struct Domain {
    keywords: &'static [&'static str],
    considerations: &'static [&'static str],
}

const DOMAINS: &[Domain] = &[
    Domain {
        keywords: &["login", "auth", "authentication", "password", "signup", "sign up", "oauth", "session"],
        considerations: &[
            "Password storage with a slow adaptive hash",
            "Rate limiting and lockout after failed attempts",
            "Session expiry and secure cookie flags",
        ],
    },
    Domain {
        keywords: &["payment", "payments", "checkout", "billing", "subscription", "invoice", "stripe"],
        considerations: &[
            "Idempotent charge requests",
            "Never store raw card numbers",
            "Refunds, disputes and failed payments",
        ],
    },
    Domain {
        keywords: &["cart", "inventory", "order", "orders", "shop", "catalog"],
        considerations: &[
            "Inventory consistency under concurrent orders",
            "Tax and shipping calculation rules",
        ],
    },
    Domain {
        keywords: &["analytics", "dashboard", "report", "reports", "chart", "charts"],
        considerations: &[
            "Data freshness and aggregation windows",
            "Handling of missing or late data",
        ],
    },
    Domain {
        keywords: &["api", "endpoint", "endpoints", "rest", "graphql"],
        considerations: &[
            "Versioning and backward compatibility",
            "Consistent error format and status codes",
            "Pagination and rate limits",
        ],
    },
    Domain {
        keywords: &["page", "form", "button", "ui", "screen", "component"],
        considerations: &[
            "Loading, empty and error states",
            "Keyboard navigation and screen reader labels",
        ],
    },
    Domain {
        keywords: &["realtime", "real-time", "websocket", "chat", "live", "notifications"],
        considerations: &[
            "Reconnection and message ordering",
            "Presence and delivery guarantees",
        ],
    },
];

const DOMAIN_FILLERS: &[&str] = &[
    "Regulatory or compliance rules that apply",
    "Conventions users of this kind of product expect",
];

impl Pattern for DomainContextEnricher {
    fn descriptor(&self) -> &'static PatternDescriptor {
        &DOMAIN_CONTEXT_ENRICHER
    }

    fn apply(&self, current: &str, ctx: &PatternContext<'_>) -> Result<PatternResult> {
        if text::has_heading_about(current, &["domain considerations"]) {
            return Ok(PatternResult::unchanged(current, Dimension::Specificity, "Domain context already added"));
        }

        let request = ctx.original_prompt.to_lowercase();
        let matched: Vec<&Domain> = DOMAINS
            .iter()
            .filter(|d| text::contains_any(&request, d.keywords))
            .collect();
        if matched.is_empty() {
            return Ok(PatternResult::unchanged(current, Dimension::Specificity, "No known domain detected"));
        }

        let mut section = Section::new("Domain Considerations", ListStyle::Bullet)
            .items(matched.iter().flat_map(|d| d.considerations.iter().copied()));
        for filler in DOMAIN_FILLERS {
            if section.len() < MIN_SECTION_ITEMS {
                section = section.item(*filler);
            }
        }

        Ok(PatternResult::appended(
            current,
            &section,
            Dimension::Specificity,
            format!("Added considerations for {} domain(s)", matched.len()),
            Impact::Medium,
        ))
    }
}

// ==================== Prerequisite Identifier ====================

pub struct PrerequisiteIdentifier;

static PREREQUISITE_IDENTIFIER: PatternDescriptor = PatternDescriptor {
    id: "prerequisite-identifier",
    name: "Prerequisite Identifier",
    description: "Lists what must be in place before work starts",
    intents: &[
        Intent::CodeGeneration,
        Intent::Planning,
        Intent::Migration,
        Intent::Learning,
    ],
    scope: PatternScope::Deep,
    priority: 5,
};

const PREREQUISITE_MARKERS: &[&str] = &["prerequisite", "prerequisites", "depends on", "before starting"];

impl Pattern for PrerequisiteIdentifier {
    fn descriptor(&self) -> &'static PatternDescriptor {
        &PREREQUISITE_IDENTIFIER
    }

    fn apply(&self, current: &str, ctx: &PatternContext<'_>) -> Result<PatternResult> {
        let lower = current.to_lowercase();
        if text::has_heading_about(current, &["prerequisites"]) || text::contains_any(&lower, PREREQUISITE_MARKERS) {
            return Ok(PatternResult::unchanged(current, Dimension::Completeness, "Prerequisites already listed"));
        }

        let items: &[&str] = match ctx.intent.primary_intent {
            Intent::Learning => &[
                "Concepts you should already know",
                "Tools to install to follow along",
                "A small project to practice on",
            ],
            Intent::Migration => &[
                "Current and target versions",
                "Inventory of affected services and data",
                "Access to staging and production environments",
            ],
            _ => &[
                "Access to the relevant repository and environments",
                "Accounts, API keys or credentials required",
                "Libraries that must be installed or upgraded first",
                "Upstream work or decisions this relies on",
            ],
        };

        let section = Section::new("Prerequisites", ListStyle::Bullet).items(items.iter().copied());
        Ok(PatternResult::appended(
            current,
            &section,
            Dimension::Completeness,
            "Listed prerequisites",
            Impact::Low,
        ))
    }
}

// ==================== Alternative Approaches ====================

/// Asks for competing approaches on open-ended requests
pub struct AlternativeApproaches;

static ALTERNATIVE_APPROACHES: PatternDescriptor = PatternDescriptor {
    id: "alternative-approaches",
    name: "Alternative Approaches",
    description: "Asks for competing approaches and their trade-offs",
    intents: &[Intent::CodeGeneration, Intent::Planning, Intent::Refinement],
    scope: PatternScope::Deep,
    priority: 3,
};

const ALTERNATIVE_MARKERS: &[&str] = &[
    "alternative",
    "alternatives",
    "trade-off",
    "trade-offs",
    "tradeoff",
    "tradeoffs",
    "compare",
];

impl Pattern for AlternativeApproaches {
    fn descriptor(&self) -> &'static PatternDescriptor {
        &ALTERNATIVE_APPROACHES
    }

    fn is_applicable(&self, ctx: &PatternContext<'_>) -> bool {
        default_applicable(self.descriptor(), ctx) && ctx.intent.characteristics.is_open_ended
    }

    fn apply(&self, current: &str, _ctx: &PatternContext<'_>) -> Result<PatternResult> {
        let lower = current.to_lowercase();
        if text::has_heading_about(current, &["alternative approaches"]) || text::contains_any(&lower, ALTERNATIVE_MARKERS) {
            return Ok(PatternResult::unchanged(current, Dimension::Actionability, "Alternatives already requested"));
        }

        let section = Section::new("Alternative Approaches", ListStyle::Numbered)
            .item("Describe at least two viable approaches")
            .item("Weigh them on complexity, risk and maintenance cost")
            .item("Recommend one and explain why")
            .item("Note what would change the recommendation");

        Ok(PatternResult::appended(
            current,
            &section,
            Dimension::Actionability,
            "Requested alternative approaches",
            Impact::Low,
        ))
    }
}

// ==================== Completeness Validator ====================

/// Closes the prompt with checks for whatever is still missing
pub struct CompletenessValidator;

static COMPLETENESS_VALIDATOR: PatternDescriptor = PatternDescriptor {
    id: "completeness-validator",
    name: "Completeness Validator",
    description: "Flags required information the prompt still lacks",
    intents: ALL_INTENTS,
    scope: PatternScope::Deep,
    priority: 2,
};

const COMPLETENESS_FILLERS: &[&str] = &[
    "Questions raised above are answered or marked as open",
    "The request can be understood without outside context",
    "Every requirement can be verified",
];

impl Pattern for CompletenessValidator {
    fn descriptor(&self) -> &'static PatternDescriptor {
        &COMPLETENESS_VALIDATOR
    }

    fn apply(&self, current: &str, ctx: &PatternContext<'_>) -> Result<PatternResult> {
        if text::has_heading_about(current, &["completeness check"]) {
            return Ok(PatternResult::unchanged(current, Dimension::Completeness, "Completeness check present"));
        }

        let missing = quality::missing_criteria(&current.to_lowercase(), ctx.intent.primary_intent);
        let gaps = missing.len();
        let mut section = Section::new("Completeness Check", ListStyle::Checkbox)
            .items(missing.iter().map(|name| format!("Specify the {}", name)));
        for filler in COMPLETENESS_FILLERS {
            if section.len() < MIN_SECTION_ITEMS {
                section = section.item(*filler);
            }
        }

        Ok(PatternResult::appended(
            current,
            &section,
            Dimension::Completeness,
            format!("Flagged {} missing criteria", gaps),
            if gaps > 0 { Impact::Medium } else { Impact::Low },
        ))
    }
}

// ==================== Validation Checklist ====================

/// Appends an intent-specific checklist for verifying the result
pub struct ValidationChecklist;

static VALIDATION_CHECKLIST: PatternDescriptor = PatternDescriptor {
    id: "validation-checklist",
    name: "Validation Checklist",
    description: "Appends a checklist for verifying the finished work",
    intents: ALL_INTENTS,
    scope: PatternScope::Deep,
    priority: 1,
};

fn checklist_for(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::CodeGeneration => &[
            "Code compiles and existing tests pass",
            "New behavior is covered by tests",
            "Errors are handled and reported clearly",
            "No unrelated files changed",
        ],
        Intent::Planning => &[
            "Every phase has an owner and exit criteria",
            "Dependencies between phases are explicit",
            "Risks have mitigations",
        ],
        Intent::Refinement => &[
            "Behavior is unchanged for existing callers",
            "Tests pass before and after the change",
            "The result is measurably better on the stated target",
        ],
        Intent::Debugging => &[
            "Root cause identified, not just the symptom",
            "A regression test reproduces the bug",
            "The fix is verified in the original environment",
        ],
        Intent::Documentation => &[
            "Examples run as written",
            "Terminology is consistent",
            "Links and references resolve",
        ],
        Intent::PrdGeneration => &[
            "Every requirement traces to a user need",
            "Success metrics have targets",
            "Open questions have owners",
        ],
        Intent::Testing => &[
            "Tests fail when the behavior breaks",
            "Tests are independent and deterministic",
            "Test names describe the behavior",
        ],
        Intent::Migration => &[
            "Record counts match before and after",
            "Rollback was rehearsed",
            "Monitoring shows no new errors",
        ],
        Intent::SecurityReview => &[
            "Each finding has a severity and a fix",
            "Fixes are verified",
            "No secrets appear in the report",
        ],
        Intent::Learning => &[
            "The explanation answers the original question",
            "Examples match the stated level",
            "Key terms are defined",
        ],
        Intent::Summarization => &[
            "Every key point from the source is covered",
            "No new claims were introduced",
            "Length matches the target",
        ],
    }
}

impl Pattern for ValidationChecklist {
    fn descriptor(&self) -> &'static PatternDescriptor {
        &VALIDATION_CHECKLIST
    }

    fn apply(&self, current: &str, ctx: &PatternContext<'_>) -> Result<PatternResult> {
        if text::has_heading_about(current, &["verification checklist"]) {
            return Ok(PatternResult::unchanged(current, Dimension::Actionability, "Checklist already present"));
        }

        let section = Section::new("Verification Checklist", ListStyle::Checkbox)
            .items(checklist_for(ctx.intent.primary_intent).iter().copied());
        Ok(PatternResult::appended(
            current,
            &section,
            Dimension::Actionability,
            "Added a verification checklist",
            Impact::Medium,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::Characteristics;
    use crate::patterns::test_support::*;
    use crate::patterns::Mode;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_edge_cases_include_request_specific_items() {
        let intent = analysis(Intent::CodeGeneration);
        let result = run(&EdgeCaseIdentifier, "Create a login page", &intent, Mode::Deep);
        assert!(result.applied);
        assert!(result.enhanced_prompt.contains("- Empty, missing or null input"));
        assert!(result.enhanced_prompt.contains("- Unauthenticated users and expired sessions"));
        assert!(!result.enhanced_prompt.contains("currency precision"));
    }

    #[test]
    fn test_edge_cases_ignore_appended_wording() {
        let intent = analysis(Intent::CodeGeneration);
        let request = "Create a settings form";
        let current = format!("{request}\n\n## Technical Context\n- Payment provider and currency rules");
        let result = match EdgeCaseIdentifier.apply(&current, &ctx(Mode::Deep, request, &intent)) {
            Ok(result) => result,
            Err(e) => panic!("edge-case-identifier failed: {}", e),
        };
        assert!(result.applied);
        assert!(result.enhanced_prompt.starts_with(&current));
        assert!(!result.enhanced_prompt.contains("currency precision"));
    }

    #[test]
    fn test_edge_cases_skipped_when_mentioned() {
        let intent = analysis(Intent::Testing);
        let prompt = "Test the parser, including edge cases";
        assert_eq!(run(&EdgeCaseIdentifier, prompt, &intent, Mode::Deep).enhanced_prompt, prompt);
    }

    #[test]
    fn test_assumptions_vary_by_intent() {
        let migration = analysis(Intent::Migration);
        let result = run(&AssumptionExplicitizer, "Move to Postgres", &migration, Mode::Deep);
        assert!(result.enhanced_prompt.contains("Downtime during the switch"));

        let technical = analysis_with(
            Intent::CodeGeneration,
            Characteristics {
                has_technical_terms: true,
                ..Characteristics::default()
            },
        );
        let result = run(&AssumptionExplicitizer, "Build a REST API", &technical, Mode::Deep);
        assert!(!result.enhanced_prompt.contains("technology stack"));
    }

    #[test]
    fn test_domain_enricher_matches_request_domains() {
        let intent = analysis(Intent::Planning);
        let prompt = "Plan a checkout API";
        let result = run(&DomainContextEnricher, prompt, &intent, Mode::Deep);
        assert!(result.applied);
        assert!(result.enhanced_prompt.contains("Idempotent charge requests"));
        assert!(result.enhanced_prompt.contains("Versioning and backward compatibility"));

        let none = run(&DomainContextEnricher, "Plan the offsite agenda", &intent, Mode::Deep);
        assert!(!none.applied);
    }

    #[test]
    fn test_domain_enricher_reads_domains_from_request() {
        let intent = analysis(Intent::Planning);
        let request = "Plan the offsite agenda";
        let current = format!("{request}\n\n## Scope\n- Which API endpoints are in scope");
        let result = match DomainContextEnricher.apply(&current, &ctx(Mode::Deep, request, &intent)) {
            Ok(result) => result,
            Err(e) => panic!("domain-context-enricher failed: {}", e),
        };
        assert!(!result.applied);
        assert_eq!(result.enhanced_prompt, current);
    }

    #[test]
    fn test_domain_enricher_pads_single_small_domain() {
        let intent = analysis(Intent::CodeGeneration);
        let result = run(&DomainContextEnricher, "Build a chat", &intent, Mode::Deep);
        let added = &result.enhanced_prompt["Build a chat".len()..];
        assert_eq!(text::count_list_items(added), MIN_SECTION_ITEMS);
        assert!(added.contains("Regulatory or compliance rules"));
    }

    #[test]
    fn test_prerequisites_for_learning() {
        let intent = analysis(Intent::Learning);
        let result = run(&PrerequisiteIdentifier, "Teach me Rust lifetimes", &intent, Mode::Deep);
        assert!(result.enhanced_prompt.contains("- Concepts you should already know"));
    }

    #[test]
    fn test_alternatives_require_open_ended_request() {
        let closed = analysis(Intent::CodeGeneration);
        let ctx_closed = ctx(Mode::Deep, "", &closed);
        assert!(!AlternativeApproaches.is_applicable(&ctx_closed));

        let open = analysis_with(
            Intent::CodeGeneration,
            Characteristics {
                is_open_ended: true,
                ..Characteristics::default()
            },
        );
        let ctx_open = ctx(Mode::Deep, "", &open);
        assert!(AlternativeApproaches.is_applicable(&ctx_open));
        assert!(!AlternativeApproaches.is_applicable(&ctx(Mode::Fast, "", &open)));
    }

    #[test]
    fn test_completeness_validator_names_missing_criteria() {
        let intent = analysis(Intent::Migration);
        let result = run(&CompletenessValidator, "Move the data to the new cluster", &intent, Mode::Deep);
        assert!(result.enhanced_prompt.contains("- [ ] Specify the rollback"));
        assert!(result.enhanced_prompt.contains("- [ ] Specify the compatibility"));
        assert!(!result.enhanced_prompt.contains("Specify the data"));
    }

    #[test]
    fn test_validation_checklist_is_last_and_intent_specific() {
        let intent = analysis(Intent::Debugging);
        let result = run(&ValidationChecklist, "Fix the crash", &intent, Mode::Deep);
        assert!(result.enhanced_prompt.ends_with("- [ ] The fix is verified in the original environment\n"));
        let min = patterns().iter().map(|p| p.priority()).min();
        assert_eq!(min, Some(ValidationChecklist.priority()));
    }
}
