//! Policy object fixtures.

use policy_model::{
    Direction, IpProtocol, Rule, RuleAction, ScopeTarget, Section, SectionType, Tag,
};

/// A stateful layer-3 section with the acceptance-test description.
pub fn layer3_section(name: &str) -> Section {
    Section::new(name, SectionType::Layer3).with_description("Acceptance Test")
}

/// An ALLOW rule, logged, IPv4, inbound.
pub fn allow_rule(name: &str) -> Rule {
    let mut rule = Rule::new(name, RuleAction::Allow);
    rule.description = name.to_string();
    rule.logged = true;
    rule.ip_protocol = IpProtocol::Ipv4;
    rule.direction = Direction::In;
    rule
}

/// A rule with sources, destinations and a service, like the full
/// acceptance-test rule.
pub fn scoped_rule(name: &str) -> Rule {
    let mut rule = allow_rule(name);
    rule.notes = "test rule".to_string();
    rule.rule_tag = "test rule tag".to_string();
    rule.sources = vec![group("grp1"), group("grp2")];
    rule.destinations = vec![group("grp3"), group("grp4")];
    rule.services = vec![ScopeTarget::service("svc-tcp")];
    rule
}

pub fn single_tag() -> Vec<Tag> {
    vec![Tag::new("scope1", "tag1")]
}

pub fn double_tags() -> Vec<Tag> {
    vec![Tag::new("scope1", "tag1"), Tag::new("scope2", "tag2")]
}

pub fn group(id: &str) -> ScopeTarget {
    ScopeTarget::group(id)
}
