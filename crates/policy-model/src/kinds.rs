//! Enumerations shared by sections, rules and scope targets
//!
//! Every enum serializes to the spelling the policy controller uses on the
//! wire (`LAYER3`, `IPV4_IPV6`, `NSGroup`, ...) and parses that spelling
//! case-insensitively, mirroring how desired state arrives from configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident as $field:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $wire)] $variant, )+
        }

        impl $name {
            /// Wire spelling of this value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $wire, )+
                }
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($wire) {
                        return Ok($name::$variant);
                    }
                )+
                Err(Error::InvalidValue {
                    field: $field.to_string(),
                    value: s.to_string(),
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum! {
    /// Network layer a firewall section filters on.
    pub enum SectionType as "section_type" {
        /// Ethernet (MAC-level) section
        Layer2 => "LAYER2",
        /// IP-level section
        Layer3 => "LAYER3",
    }
}

wire_enum! {
    /// What a rule does with matching traffic.
    pub enum RuleAction as "action" {
        Allow => "ALLOW",
        /// Silently discard
        Deny => "DROP",
        /// Discard and notify the sender
        Reject => "REJECT",
    }
}

wire_enum! {
    /// IP version(s) a rule matches.
    pub enum IpProtocol as "ip_protocol" {
        Ipv4 => "IPV4",
        Ipv6 => "IPV6",
        Ipv4Ipv6 => "IPV4_IPV6",
    }
}

wire_enum! {
    /// Traffic direction a rule matches.
    pub enum Direction as "direction" {
        In => "IN",
        Out => "OUT",
        InOut => "IN_OUT",
    }
}

wire_enum! {
    /// Kind of policy object a [`crate::ScopeTarget`] points at.
    pub enum TargetType as "target_type" {
        Group => "NSGroup",
        Service => "NSService",
        ServiceGroup => "NSServiceGroup",
        IpSet => "IPSet",
        MacSet => "MACSet",
        LogicalSwitch => "LogicalSwitch",
        LogicalPort => "LogicalPort",
    }
}

impl Default for SectionType {
    fn default() -> Self {
        SectionType::Layer3
    }
}

impl Default for IpProtocol {
    fn default() -> Self {
        IpProtocol::Ipv4Ipv6
    }
}

impl Default for Direction {
    fn default() -> Self {
        Direction::InOut
    }
}
