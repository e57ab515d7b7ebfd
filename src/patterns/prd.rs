//! Product requirement patterns (deep mode only)

use super::{uncovered, Check, Impact, Pattern, PatternContext, PatternDescriptor, PatternResult, PatternScope};
use crate::intent::Intent;
use crate::quality::Dimension;
use crate::utils::text::{self, ListStyle, Section, MIN_SECTION_ITEMS};
use crate::utils::Result;

pub(super) fn patterns() -> Vec<Box<dyn Pattern>> {
    vec![
        Box::new(PrdStructureEnforcer),
        Box::new(UserPersonaEnricher),
        Box::new(RequirementPrioritizer),
        Box::new(NonFunctionalRequirements),
    ]
}

// ==================== PRD Structure Enforcer ====================

/// Lays out the standard PRD sections the request does not mention
pub struct PrdStructureEnforcer;

static PRD_STRUCTURE_ENFORCER: PatternDescriptor = PatternDescriptor {
    id: "prd-structure-enforcer",
    name: "PRD Structure Enforcer",
    description: "Lays out the standard sections of a product requirements document",
    intents: &[Intent::PrdGeneration],
    scope: PatternScope::Deep,
    priority: 10,
};

const PRD_SECTIONS: &[Check] = &[
    (&["problem statement", "problem", "pain point", "pain points"], "Problem Statement: the user problem and why it matters"),
    (&["goals", "objectives"], "Goals and Non-Goals: measurable outcomes and what is explicitly excluded"),
    (&["target users", "audience", "customers", "who uses"], "Target Users: who the product serves and the context they work in"),
    (&["user stories", "user story", "use cases", "as a user"], "User Stories: key journeys in the form 'As a ..., I want ...'"),
    (&["functional requirements", "features", "capabilities"], "Functional Requirements: the capabilities the product provides"),
    (&["non-functional", "quality attributes", "nfr", "nfrs"], "Non-Functional Requirements: quality attributes the system must meet"),
    (&["success metrics", "kpi", "kpis"], "Success Metrics: how adoption and impact will be measured"),
    (&["release plan", "milestones", "timeline", "rollout"], "Release Plan: milestones, sequencing and launch criteria"),
    (&["open questions", "risks", "unknowns"], "Open Questions: risks and decisions still pending"),
];

impl Pattern for PrdStructureEnforcer {
    fn descriptor(&self) -> &'static PatternDescriptor {
        &PRD_STRUCTURE_ENFORCER
    }

    fn apply(&self, current: &str, ctx: &PatternContext<'_>) -> Result<PatternResult> {
        if text::has_heading_about(current, &["prd structure"]) {
            return Ok(PatternResult::unchanged(current, Dimension::Structure, "PRD structure already laid out"));
        }

        let missing = uncovered(&ctx.original_prompt.to_lowercase(), PRD_SECTIONS);
        if missing.len() < MIN_SECTION_ITEMS {
            return Ok(PatternResult::unchanged(current, Dimension::Structure, "PRD sections already covered"));
        }

        let count = missing.len();
        let section = Section::new("PRD Structure", ListStyle::Numbered).items(missing);
        Ok(PatternResult::appended(
            current,
            &section,
            Dimension::Structure,
            format!("Outlined {} missing PRD section(s)", count),
            Impact::High,
        ))
    }
}

// ==================== User Persona Enricher ====================

/// Asks for concrete user personas
pub struct UserPersonaEnricher;

static USER_PERSONA_ENRICHER: PatternDescriptor = PatternDescriptor {
    id: "user-persona-enricher",
    name: "User Persona Enricher",
    description: "Requests primary and secondary personas with their pain points",
    intents: &[Intent::PrdGeneration, Intent::Planning],
    scope: PatternScope::Deep,
    priority: 7,
};

const PERSONA_MARKERS: &[&str] = &["persona", "personas"];

impl Pattern for UserPersonaEnricher {
    fn descriptor(&self) -> &'static PatternDescriptor {
        &USER_PERSONA_ENRICHER
    }

    fn apply(&self, current: &str, _ctx: &PatternContext<'_>) -> Result<PatternResult> {
        let lower = current.to_lowercase();
        if text::has_heading_about(current, &["personas"]) || text::contains_any(&lower, PERSONA_MARKERS) {
            return Ok(PatternResult::unchanged(current, Dimension::Completeness, "Personas already described"));
        }

        let section = Section::new("User Personas", ListStyle::Bullet)
            .item("Primary persona: role, goals and level of expertise")
            .item("Secondary personas: other roles that interact with the product")
            .item("Pain points each persona has today")
            .item("Context of use: devices, frequency and setting");

        Ok(PatternResult::appended(
            current,
            &section,
            Dimension::Completeness,
            "Requested user personas",
            Impact::Medium,
        ))
    }
}

// ==================== Requirement Prioritizer ====================

/// Sorts requirements into MoSCoW buckets
pub struct RequirementPrioritizer;

static REQUIREMENT_PRIORITIZER: PatternDescriptor = PatternDescriptor {
    id: "requirement-prioritizer",
    name: "Requirement Prioritizer",
    description: "Groups requirements by MoSCoW priority",
    intents: &[Intent::PrdGeneration, Intent::Planning],
    scope: PatternScope::Deep,
    priority: 5,
};

const PRIORITY_MARKERS: &[&str] = &[
    "must have",
    "must-have",
    "should have",
    "nice to have",
    "moscow",
    "p0",
    "p1",
    "priority",
    "priorities",
    "prioritize",
];

impl Pattern for RequirementPrioritizer {
    fn descriptor(&self) -> &'static PatternDescriptor {
        &REQUIREMENT_PRIORITIZER
    }

    fn apply(&self, current: &str, _ctx: &PatternContext<'_>) -> Result<PatternResult> {
        let lower = current.to_lowercase();
        if text::has_heading_about(current, &["priorities"]) || text::contains_any(&lower, PRIORITY_MARKERS) {
            return Ok(PatternResult::unchanged(current, Dimension::Actionability, "Priorities already assigned"));
        }

        let section = Section::new("Requirement Priorities", ListStyle::Bullet)
            .item("Must have: required for the first release")
            .item("Should have: important but can follow shortly after")
            .item("Could have: valuable if capacity allows")
            .item("Won't have (this time): explicitly deferred")
            .item("Tie each requirement to the user problem it solves");

        Ok(PatternResult::appended(
            current,
            &section,
            Dimension::Actionability,
            "Grouped requirements by MoSCoW priority",
            Impact::Medium,
        ))
    }
}

// ==================== Non-Functional Requirements ====================

/// Covers the quality attributes feature lists tend to omit
pub struct NonFunctionalRequirements;

static NON_FUNCTIONAL_REQUIREMENTS: PatternDescriptor = PatternDescriptor {
    id: "non-functional-requirements",
    name: "Non-Functional Requirements",
    description: "Adds performance, security, accessibility and operability requirements",
    intents: &[Intent::PrdGeneration, Intent::Planning, Intent::CodeGeneration],
    scope: PatternScope::Deep,
    priority: 4,
};

const NFR_CHECKS: &[Check] = &[
    (&["performance", "latency", "response time", "response times"], "Performance: target response times under expected load"),
    (&["scalability", "scalable", "scale", "concurrent users"], "Scalability: expected growth in users and data volume"),
    (&["security", "encryption", "authorization"], "Security: authentication, authorization and data protection"),
    (&["accessibility", "wcag", "a11y", "screen reader"], "Accessibility: the WCAG level to meet"),
    (&["availability", "uptime", "sla", "downtime"], "Availability: uptime target and acceptable downtime"),
    (&["observability", "monitoring", "logging", "alerting"], "Observability: logging, monitoring and alerting in production"),
];

impl Pattern for NonFunctionalRequirements {
    fn descriptor(&self) -> &'static PatternDescriptor {
        &NON_FUNCTIONAL_REQUIREMENTS
    }

    fn apply(&self, current: &str, ctx: &PatternContext<'_>) -> Result<PatternResult> {
        if text::has_heading_about(current, &["non-functional requirements"]) {
            return Ok(PatternResult::unchanged(current, Dimension::Completeness, "Non-functional requirements present"));
        }

        let missing = uncovered(&ctx.original_prompt.to_lowercase(), NFR_CHECKS);
        if missing.len() < MIN_SECTION_ITEMS {
            return Ok(PatternResult::unchanged(current, Dimension::Completeness, "Quality attributes mostly covered"));
        }

        let count = missing.len();
        let section = Section::new("Non-Functional Requirements", ListStyle::Bullet).items(missing);
        Ok(PatternResult::appended(
            current,
            &section,
            Dimension::Completeness,
            format!("Added {} non-functional requirement(s)", count),
            Impact::Medium,
        ))
    }
}
